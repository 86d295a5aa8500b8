//! Chunked payload animation.
//!
//! Payloads too large (or too awkward) to scan as one code are split
//! into fixed-size chunks, each encoded and drawn in place of the
//! previous one. Every chunk is zero-padded to the full chunk size so
//! all frames encode at the same version and render with identical
//! geometry; the in-place redraw then only has to move the cursor up by
//! the previous frame's line count.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::ansi;
use crate::error::Error;
use crate::matrix::ModuleMatrix;
use crate::qrcode::{EncodeError, QrCode};
use crate::render::{self, RenderOptions};

/// Bytes of payload per animation frame.
pub const CHUNK_SIZE: usize = 100;

/// Pause between frames on an interactive terminal.
pub const FRAME_DELAY: Duration = Duration::from_millis(100);

/// Sleep source, injectable so tests run without waiting.
pub trait Clock {
    fn sleep(&self, duration: Duration);
}

/// The real thing.
pub struct WallClock;

impl Clock for WallClock {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Cooperative stop flag shared with a signal handler or another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drives the frame loop. The encoder is injected as a closure so the
/// loop stays ignorant of encoding parameters (version floor, error
/// correction level, mask).
pub struct Animation<'a, W, C, E>
where
    W: Write,
    C: Clock,
    E: Fn(&[u8]) -> Result<QrCode, EncodeError>,
{
    sink: W,
    clock: C,
    encode: E,
    opts: &'a RenderOptions,
    cancel: CancelToken,
    /// Whether the sink is an interactive terminal. Off-terminal output
    /// gets a single pass with no delays and no cursor movement.
    interactive: bool,
}

impl<'a, W, C, E> Animation<'a, W, C, E>
where
    W: Write,
    C: Clock,
    E: Fn(&[u8]) -> Result<QrCode, EncodeError>,
{
    pub fn new(
        sink: W,
        clock: C,
        encode: E,
        opts: &'a RenderOptions,
        cancel: CancelToken,
        interactive: bool,
    ) -> Self {
        Animation {
            sink,
            clock,
            encode,
            opts,
            cancel,
            interactive,
        }
    }

    /// Splits `payload` into zero-padded chunks and draws them in a loop
    /// until cancelled. A single-chunk payload on a terminal is drawn
    /// once and then held so the code stays on screen; off a terminal
    /// every chunk is written exactly once and the call returns.
    pub fn run(&mut self, payload: &[u8]) -> Result<(), Error> {
        let chunks = chunk_payload(payload);
        log::info!(
            "animating {} bytes as {} frame(s) of {} bytes",
            payload.len(),
            chunks.len(),
            CHUNK_SIZE
        );

        let mut prior_lines = 0usize;
        loop {
            for chunk in &chunks {
                if self.cancel.is_cancelled() {
                    return Ok(());
                }
                let code = (self.encode)(chunk)?;
                let matrix = ModuleMatrix::from(&code);
                let frame = render::render(&matrix, self.opts)?;
                if self.interactive && prior_lines > 0 {
                    for _ in 0..prior_lines {
                        self.sink.write_all(ansi::CURSOR_UP_ERASE.as_bytes())?;
                    }
                }
                self.sink.write_all(frame.as_bytes())?;
                self.sink.flush()?;
                prior_lines = render::line_count(matrix.size(), self.opts);
                if !self.interactive {
                    continue;
                }
                if chunks.len() == 1 {
                    // Nothing to cycle; keep the code up until cancelled
                    while !self.cancel.is_cancelled() {
                        self.clock.sleep(FRAME_DELAY);
                    }
                    return Ok(());
                }
                self.clock.sleep(FRAME_DELAY);
            }
            if !self.interactive {
                return Ok(());
            }
        }
    }
}

/// Splits the payload into `CHUNK_SIZE`-byte pieces, zero-padding the
/// last one so every frame carries the same number of bytes. An empty
/// payload still yields one all-zero chunk.
fn chunk_payload(payload: &[u8]) -> Vec<Vec<u8>> {
    let mut chunks: Vec<Vec<u8>> = payload
        .chunks(CHUNK_SIZE)
        .map(|chunk| {
            let mut padded = chunk.to_vec();
            padded.resize(CHUNK_SIZE, 0);
            padded
        })
        .collect();
    if chunks.is_empty() {
        chunks.push(vec![0; CHUNK_SIZE]);
    }
    chunks
}
