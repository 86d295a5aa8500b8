use std::io::{self, IsTerminal, Read, Write};
use std::process::ExitCode;
use std::str;

use anyhow::Context;
use clap::Parser;

use qrterm::animate::{Animation, CancelToken, WallClock};
use qrterm::error::Error;
use qrterm::matrix::ModuleMatrix;
use qrterm::qrcode::{EncodeError, QrCode, QrCodeEcc, QrSegment, Version};
use qrterm::render::{self, RenderMode, RenderOptions};

/// UTF-8 byte order mark, prepended on request so scanners that default
/// to another charset pick the right one.
const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Parser, Debug)]
#[command(version, about = "Draw QR codes in the terminal")]
struct Args {
    /// Payload to encode; read from stdin when omitted
    text: Option<String>,

    /// Segment mode: n(umeric), a(lphanumeric) or 8(-bit bytes);
    /// picks the densest fitting mode when omitted
    #[arg(short, long, value_parser = parse_segment_mode)]
    mode: Option<SegmentMode>,

    /// Minimum symbol version, 1 to 40; 0 means the smallest that fits
    #[arg(
        short = 'v',
        long = "qr-version",
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=40)
    )]
    min_version: u8,

    /// Error correction level: l, m, q, h or 1-4
    #[arg(short = 'e', long = "ec-level", default_value = "m", value_parser = parse_ecl)]
    level: QrCodeEcc,

    /// One module per glyph (twice as wide as tall)
    #[arg(short, long, conflicts_with = "compact")]
    large: bool,

    /// Four modules per glyph (quarter size)
    #[arg(short, long)]
    compact: bool,

    /// Light border width in modules, 1 to 4
    #[arg(
        short,
        long,
        default_value_t = 2,
        value_parser = clap::value_parser!(i32).range(1..=4)
    )]
    border: i32,

    /// Swap dark and light modules
    #[arg(short, long)]
    invert: bool,

    /// Never emit color escapes
    #[arg(short, long)]
    plain: bool,

    /// Prefix the payload with a UTF-8 byte order mark
    #[arg(long)]
    bom: bool,

    /// Cycle through 100-byte chunks of the payload in place
    #[arg(short, long)]
    animate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentMode {
    Numeric,
    Alphanumeric,
    Bytes,
}

fn parse_segment_mode(s: &str) -> Result<SegmentMode, String> {
    match s {
        "n" | "numeric" => Ok(SegmentMode::Numeric),
        "a" | "alphanumeric" => Ok(SegmentMode::Alphanumeric),
        "8" | "byte" | "bytes" => Ok(SegmentMode::Bytes),
        _ => Err(format!("unknown mode '{s}' (expected n, a or 8)")),
    }
}

fn parse_ecl(s: &str) -> Result<QrCodeEcc, String> {
    match s {
        "l" | "L" | "1" => Ok(QrCodeEcc::Low),
        "m" | "M" | "2" => Ok(QrCodeEcc::Medium),
        "q" | "Q" | "3" => Ok(QrCodeEcc::Quartile),
        "h" | "H" | "4" => Ok(QrCodeEcc::High),
        _ => Err(format!("unknown level '{s}' (expected l, m, q or h)")),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut payload = read_payload(&args)?;
    if args.bom && !payload.starts_with(&UTF8_BOM) {
        payload.splice(0..0, UTF8_BOM);
    }

    let opts = RenderOptions {
        mode: if args.large {
            RenderMode::Large
        } else if args.compact {
            RenderMode::Compact
        } else {
            RenderMode::Normal
        },
        border: args.border,
        invert: args.invert,
        paint: io::stdout().is_terminal() && !args.plain,
    };

    if args.animate {
        animate(&args, &payload, &opts)?;
    } else {
        let code = encode(&args, &payload)?;
        let matrix = ModuleMatrix::from(&code);
        let text = render::render(&matrix, &opts)?;
        io::stdout()
            .lock()
            .write_all(text.as_bytes())
            .context("writing to stdout")?;
    }
    Ok(())
}

/// Takes the payload from the argument or from piped stdin, refusing
/// both at once so a typo does not silently pick one. An empty payload
/// is refused too; there is nothing to encode.
fn read_payload(args: &Args) -> Result<Vec<u8>, Error> {
    let stdin = io::stdin();
    let piped = !stdin.is_terminal();
    let payload = match (&args.text, piped) {
        (Some(_), true) => return Err(Error::AmbiguousInput),
        (Some(text), false) => text.clone().into_bytes(),
        (None, true) => {
            let mut payload = Vec::new();
            stdin.lock().read_to_end(&mut payload)?;
            payload
        }
        (None, false) => return Err(Error::NoInput),
    };
    if payload.is_empty() {
        return Err(Error::NoInput);
    }
    Ok(payload)
}

fn min_version(args: &Args) -> Version {
    if args.min_version == 0 {
        Version::MIN
    } else {
        Version::new(args.min_version)
    }
}

fn encode(args: &Args, payload: &[u8]) -> Result<QrCode, EncodeError> {
    let segs = build_segments(args.mode, payload)?;
    QrCode::encode_segments(
        &segs,
        args.level,
        min_version(args),
        Version::MAX,
        None,
        false,
    )
}

fn build_segments(
    mode: Option<SegmentMode>,
    payload: &[u8],
) -> Result<Vec<QrSegment>, EncodeError> {
    match mode {
        Some(SegmentMode::Numeric) => {
            let text = str::from_utf8(payload)
                .map_err(|_| EncodeError::CharsetMismatch("numeric"))?;
            Ok(vec![QrSegment::make_numeric(text)?])
        }
        Some(SegmentMode::Alphanumeric) => {
            let text = str::from_utf8(payload)
                .map_err(|_| EncodeError::CharsetMismatch("alphanumeric"))?;
            Ok(vec![QrSegment::make_alphanumeric(text)?])
        }
        Some(SegmentMode::Bytes) => Ok(vec![QrSegment::make_bytes(payload)]),
        None => match str::from_utf8(payload) {
            Ok(text) => Ok(QrSegment::make_segments(text)),
            Err(_) => Ok(vec![QrSegment::make_bytes(payload)]),
        },
    }
}

fn animate(args: &Args, payload: &[u8], opts: &RenderOptions) -> Result<(), Error> {
    // Chunks are zero-padded, so only byte mode can represent them
    if matches!(args.mode, Some(m) if m != SegmentMode::Bytes) {
        return Err(Error::InvalidOptions(
            "animation always encodes in byte mode; drop -m or pass -m 8".into(),
        ));
    }
    let level = args.level;
    let minversion = min_version(args);
    let stdout = io::stdout();
    let interactive = stdout.is_terminal();
    let cancel = CancelToken::new();
    let mut animation = Animation::new(
        stdout.lock(),
        WallClock,
        move |chunk: &[u8]| {
            QrCode::encode_binary(chunk, level, minversion, Version::MAX, None, false)
        },
        opts,
        cancel,
        interactive,
    );
    animation.run(payload)
}
