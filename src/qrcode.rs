//! QR Code Model 2 encoder.
//!
//! Turns text or binary payloads into a square grid of dark and light
//! modules, supporting versions 1 to 40, all four error correction levels,
//! and numeric, alphanumeric, byte, and ECI segment modes. The rest of the
//! crate consumes the result only through [`QrCode::size`] and
//! [`QrCode::get_module`].

use thiserror::Error;

/// A finished QR Code symbol: an immutable square grid of modules.
///
/// # Example
///
/// ```rust
/// use qrterm::qrcode::{QrCode, QrCodeEcc, Version};
///
/// let qr = QrCode::encode_text(
///     "Hello, World!",
///     QrCodeEcc::Low,
///     Version::MIN,
///     Version::MAX,
///     None,
///     true,
/// ).unwrap();
/// assert_eq!(qr.size(), i32::from(qr.version().value()) * 4 + 17);
/// ```
pub struct QrCode {
    version: Version,
    /// Width and height in modules, equal to `version * 4 + 17`.
    size: i32,
    ecl: QrCodeEcc,
    mask: Mask,
    /// Row-major module colors; `true` is dark.
    modules: Vec<bool>,
}

impl QrCode {
    /// Encodes a text string, automatically choosing the densest segment
    /// mode that fits the payload and the smallest version in
    /// `minversion..=maxversion` that can hold it.
    ///
    /// When `boostecl` is true the error correction level is raised as far
    /// as possible without increasing the version. `mask` may be `None`
    /// for automatic selection by penalty score.
    pub fn encode_text(
        text: &str,
        ecl: QrCodeEcc,
        minversion: Version,
        maxversion: Version,
        mask: Option<Mask>,
        boostecl: bool,
    ) -> Result<QrCode, EncodeError> {
        let segs = QrSegment::make_segments(text);
        Self::encode_segments(&segs, ecl, minversion, maxversion, mask, boostecl)
    }

    /// Encodes arbitrary bytes in byte mode.
    pub fn encode_binary(
        data: &[u8],
        ecl: QrCodeEcc,
        minversion: Version,
        maxversion: Version,
        mask: Option<Mask>,
        boostecl: bool,
    ) -> Result<QrCode, EncodeError> {
        let seg = QrSegment::make_bytes(data);
        Self::encode_segments(&[seg], ecl, minversion, maxversion, mask, boostecl)
    }

    /// Encodes prepared segments with the given parameters.
    ///
    /// This is the mid-level entry point: the caller controls segment
    /// construction while version search, error correction boosting,
    /// codeword assembly, and masking happen here.
    pub fn encode_segments(
        segs: &[QrSegment],
        mut ecl: QrCodeEcc,
        minversion: Version,
        maxversion: Version,
        mask: Option<Mask>,
        boostecl: bool,
    ) -> Result<QrCode, EncodeError> {
        assert!(minversion <= maxversion, "invalid version range");

        // Find the minimal version number to use
        let mut version = minversion;
        let datausedbits: usize = loop {
            let datacapacitybits: usize = Self::get_num_data_codewords(version, ecl) * 8;
            let dataused = QrSegment::get_total_bits(segs, version);
            match dataused {
                Some(n) if n <= datacapacitybits => break n,
                _ if version >= maxversion => {
                    return Err(match dataused {
                        None => EncodeError::SegmentTooLong,
                        Some(n) => EncodeError::DataOverCapacity {
                            needed: n,
                            capacity: datacapacitybits,
                        },
                    });
                }
                _ => version = Version::new(version.value() + 1),
            }
        };

        // Raise the error correction level while the data still fits
        for &newecl in &[QrCodeEcc::Medium, QrCodeEcc::Quartile, QrCodeEcc::High] {
            if boostecl && datausedbits <= Self::get_num_data_codewords(version, newecl) * 8 {
                ecl = newecl;
            }
        }
        log::debug!(
            "encoding {} bits as version {} at {:?}",
            datausedbits,
            version.value(),
            ecl
        );

        // Concatenate all segments to create the data bit string
        let datacapacitybits: usize = Self::get_num_data_codewords(version, ecl) * 8;
        let mut bb = BitBuffer(Vec::with_capacity(datacapacitybits));
        for seg in segs {
            bb.append_bits(seg.mode.mode_bits(), 4);
            bb.append_bits(seg.numchars as u32, seg.mode.num_char_count_bits(version));
            bb.0.extend_from_slice(&seg.data);
        }
        debug_assert_eq!(bb.0.len(), datausedbits);

        // Add terminator and pad up to a byte if applicable
        let numzerobits = 4.min(datacapacitybits - bb.0.len());
        bb.append_bits(0, numzerobits as u8);
        let numzerobits = bb.0.len().wrapping_neg() & 7;
        bb.append_bits(0, numzerobits as u8);
        debug_assert_eq!(bb.0.len() % 8, 0);

        // Pad with alternating bytes until data capacity is reached
        for &padbyte in [0xec, 0x11].iter().cycle() {
            if bb.0.len() >= datacapacitybits {
                break;
            }
            bb.append_bits(padbyte, 8);
        }

        let mut datacodewords = vec![0u8; bb.0.len() / 8];
        for (i, &bit) in bb.0.iter().enumerate() {
            datacodewords[i >> 3] |= u8::from(bit) << (7 - (i & 7));
        }
        Ok(Self::new(version, ecl, &datacodewords, mask))
    }

    /// Assembles a symbol from finished data codewords.
    fn new(version: Version, ecl: QrCodeEcc, datacodewords: &[u8], mask: Option<Mask>) -> QrCode {
        let size = i32::from(version.value()) * 4 + 17;
        let mut canvas = Canvas::new(size);
        canvas.draw_function_patterns(version, ecl);
        let allcodewords = add_ecc_and_interleave(datacodewords, version, ecl);
        canvas.draw_codewords(&allcodewords);

        let mask = mask.unwrap_or_else(|| {
            let mut best = Mask::new(0);
            let mut minpenalty = i32::MAX;
            for i in 0u8..8 {
                let candidate = Mask::new(i);
                canvas.apply_mask(candidate);
                canvas.draw_format_bits(ecl, candidate);
                let penalty = canvas.get_penalty_score();
                if penalty < minpenalty {
                    best = candidate;
                    minpenalty = penalty;
                }
                canvas.apply_mask(candidate); // Undoes the mask due to XOR
            }
            best
        });
        canvas.apply_mask(mask);
        canvas.draw_format_bits(ecl, mask);
        log::debug!("selected mask pattern {}", mask.value());

        QrCode {
            version,
            size,
            ecl,
            mask,
            modules: canvas.modules,
        }
    }

    /// Returns this QR Code's version, in the range [1, 40].
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns this QR Code's size, in the range [21, 177].
    pub fn size(&self) -> i32 {
        self.size
    }

    /// Returns this QR Code's error correction level.
    pub fn error_correction_level(&self) -> QrCodeEcc {
        self.ecl
    }

    /// Returns this QR Code's mask, in the range [0, 7].
    pub fn mask(&self) -> Mask {
        self.mask
    }

    /// Returns the color of the module at the given coordinates.
    ///
    /// `true` is dark. Coordinates outside the symbol's bounds resolve to
    /// light, which lets callers scan across the quiet zone without bounds
    /// branching.
    pub fn get_module(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size;
        range.contains(&x) && range.contains(&y) && self.modules[(y * self.size + x) as usize]
    }

    fn get_num_raw_data_modules(ver: Version) -> usize {
        let ver = usize::from(ver.value());
        let mut result: usize = (16 * ver + 128) * ver + 64;
        if ver >= 2 {
            let numalign: usize = ver / 7 + 2;
            result -= (25 * numalign - 10) * numalign - 55;
            if ver >= 7 {
                result -= 36;
            }
        }
        result
    }

    fn get_num_data_codewords(ver: Version, ecl: QrCodeEcc) -> usize {
        Self::get_num_raw_data_modules(ver) / 8
            - table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl)
                * table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl)
    }
}

/// Mutable module grid used while a symbol is being drawn.
///
/// Tracks which modules belong to function patterns so that codeword
/// placement and masking skip them.
struct Canvas {
    size: i32,
    modules: Vec<bool>,
    isfunction: Vec<bool>,
}

impl Canvas {
    fn new(size: i32) -> Self {
        let area = (size * size) as usize;
        Self {
            size,
            modules: vec![false; area],
            isfunction: vec![false; area],
        }
    }

    fn module(&self, x: i32, y: i32) -> bool {
        self.modules[(y * self.size + x) as usize]
    }

    fn set_function_module(&mut self, x: i32, y: i32, isdark: bool) {
        let index = (y * self.size + x) as usize;
        self.modules[index] = isdark;
        self.isfunction[index] = true;
    }

    fn draw_function_patterns(&mut self, version: Version, ecl: QrCodeEcc) {
        let size = self.size;
        for i in 0..size {
            self.set_function_module(6, i, i % 2 == 0);
            self.set_function_module(i, 6, i % 2 == 0);
        }
        self.draw_finder_pattern(3, 3);
        self.draw_finder_pattern(size - 4, 3);
        self.draw_finder_pattern(3, size - 4);

        let alignpatpos = get_alignment_pattern_positions(version);
        let numalign = alignpatpos.len();
        for i in 0..numalign {
            for j in 0..numalign {
                // Skip the three finder corners
                if !((i == 0 && j == 0)
                    || (i == 0 && j == numalign - 1)
                    || (i == numalign - 1 && j == 0))
                {
                    self.draw_alignment_pattern(alignpatpos[i], alignpatpos[j]);
                }
            }
        }

        // Placeholder format bits reserve the cells before codeword
        // placement; overwritten once the mask is chosen
        self.draw_format_bits(ecl, Mask::new(0));
        self.draw_version(version);
    }

    fn draw_finder_pattern(&mut self, x: i32, y: i32) {
        for dy in -4..=4 {
            for dx in -4..=4 {
                let xx = x + dx;
                let yy = y + dy;
                if (0..self.size).contains(&xx) && (0..self.size).contains(&yy) {
                    let dist: i32 = dx.abs().max(dy.abs());
                    self.set_function_module(xx, yy, dist != 2 && dist != 4);
                }
            }
        }
    }

    fn draw_alignment_pattern(&mut self, x: i32, y: i32) {
        for dy in -2..=2 {
            for dx in -2..=2 {
                self.set_function_module(x + dx, y + dy, dx.abs().max(dy.abs()) != 1);
            }
        }
    }

    fn draw_format_bits(&mut self, ecl: QrCodeEcc, mask: Mask) {
        // 15-bit BCH-protected format word
        let bits: u32 = {
            let data = u32::from((ecl.format_bits() << 3) | mask.value());
            let mut rem: u32 = data;
            for _ in 0..10 {
                rem = (rem << 1) ^ ((rem >> 9) * 0x537);
            }
            ((data << 10) | rem) ^ 0x5412
        };
        debug_assert_eq!(bits >> 15, 0);

        for i in 0..6 {
            self.set_function_module(8, i, get_bit(bits, i as u8));
        }
        self.set_function_module(8, 7, get_bit(bits, 6));
        self.set_function_module(8, 8, get_bit(bits, 7));
        self.set_function_module(7, 8, get_bit(bits, 8));
        for i in 9..15 {
            self.set_function_module(14 - i, 8, get_bit(bits, i as u8));
        }
        let size = self.size;
        for i in 0..8 {
            self.set_function_module(size - 1 - i, 8, get_bit(bits, i as u8));
        }
        for i in 8..15 {
            self.set_function_module(8, size - 15 + i, get_bit(bits, i as u8));
        }
        self.set_function_module(8, size - 8, true);
    }

    fn draw_version(&mut self, version: Version) {
        let ver = u32::from(version.value());
        if ver < 7 {
            return;
        }
        // 18-bit Golay-protected version word
        let bits: u32 = {
            let mut rem: u32 = ver;
            for _ in 0..12 {
                rem = (rem << 1) ^ ((rem >> 11) * 0x1f25);
            }
            (ver << 12) | rem
        };
        for i in 0u8..18 {
            let bit = get_bit(bits, i);
            let a = self.size - 11 + i32::from(i % 3);
            let b = i32::from(i / 3);
            self.set_function_module(a, b, bit);
            self.set_function_module(b, a, bit);
        }
    }

    /// Places the interleaved codeword bits in the standard zigzag order,
    /// skipping function modules.
    fn draw_codewords(&mut self, data: &[u8]) {
        let size = self.size;
        let mut i: usize = 0;
        let mut right: i32 = size - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            for vert in 0..size {
                for j in 0..2 {
                    let x = right - j;
                    let upward = ((right + 1) & 2) == 0;
                    let y = if upward { size - 1 - vert } else { vert };
                    let index = (y * size + x) as usize;
                    if !self.isfunction[index] && i < data.len() * 8 {
                        self.modules[index] = get_bit(data[i >> 3].into(), 7 - ((i as u8) & 7));
                        i += 1;
                    }
                }
            }
            right -= 2;
        }
        debug_assert_eq!(i, data.len() * 8);
    }

    /// XORs the mask pattern over the data modules. Applying the same mask
    /// twice restores the previous state.
    fn apply_mask(&mut self, mask: Mask) {
        for y in 0..self.size {
            for x in 0..self.size {
                let index = (y * self.size + x) as usize;
                if self.isfunction[index] {
                    continue;
                }
                let invert = match mask.value() {
                    0 => (x + y) % 2 == 0,
                    1 => y % 2 == 0,
                    2 => x % 3 == 0,
                    3 => (x + y) % 3 == 0,
                    4 => (x / 3 + y / 2) % 2 == 0,
                    5 => ((x * y) % 2) + ((x * y) % 3) == 0,
                    6 => (((x * y) % 2) + ((x * y) % 3)) % 2 == 0,
                    7 => (((x + y) % 2) + ((x * y) % 3)) % 2 == 0,
                    _ => unreachable!(),
                };
                self.modules[index] ^= invert;
            }
        }
    }

    fn get_penalty_score(&self) -> i32 {
        let mut result: i32 = 0;
        let size = self.size;

        // Adjacent same-color runs and finder-like patterns, horizontally
        for y in 0..size {
            let mut runcolor = false;
            let mut runx: i32 = 0;
            let mut runhistory = FinderPenalty::new(size);
            for x in 0..size {
                if self.module(x, y) == runcolor {
                    runx += 1;
                    if runx == 5 {
                        result += PENALTY_N1;
                    } else if runx > 5 {
                        result += 1;
                    }
                } else {
                    runhistory.add_history(runx);
                    if !runcolor {
                        result += runhistory.count_patterns() * PENALTY_N3;
                    }
                    runcolor = self.module(x, y);
                    runx = 1;
                }
            }
            result += runhistory.terminate_and_count(runcolor, runx) * PENALTY_N3;
        }
        // Same, vertically
        for x in 0..size {
            let mut runcolor = false;
            let mut runy: i32 = 0;
            let mut runhistory = FinderPenalty::new(size);
            for y in 0..size {
                if self.module(x, y) == runcolor {
                    runy += 1;
                    if runy == 5 {
                        result += PENALTY_N1;
                    } else if runy > 5 {
                        result += 1;
                    }
                } else {
                    runhistory.add_history(runy);
                    if !runcolor {
                        result += runhistory.count_patterns() * PENALTY_N3;
                    }
                    runcolor = self.module(x, y);
                    runy = 1;
                }
            }
            result += runhistory.terminate_and_count(runcolor, runy) * PENALTY_N3;
        }

        // 2x2 blocks of the same color
        for y in 0..size - 1 {
            for x in 0..size - 1 {
                let color = self.module(x, y);
                if color == self.module(x + 1, y)
                    && color == self.module(x, y + 1)
                    && color == self.module(x + 1, y + 1)
                {
                    result += PENALTY_N2;
                }
            }
        }

        // Balance of dark and light modules
        let dark = self.modules.iter().filter(|&&b| b).count() as i32;
        let total = size * size;
        let k: i32 = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
        result + k * PENALTY_N4
    }
}

fn add_ecc_and_interleave(data: &[u8], ver: Version, ecl: QrCodeEcc) -> Vec<u8> {
    assert_eq!(data.len(), QrCode::get_num_data_codewords(ver, ecl));
    let numblocks = table_get(&NUM_ERROR_CORRECTION_BLOCKS, ver, ecl);
    let blockecclen = table_get(&ECC_CODEWORDS_PER_BLOCK, ver, ecl);
    let rawcodewords = QrCode::get_num_raw_data_modules(ver) / 8;
    let numshortblocks = numblocks - (rawcodewords % numblocks);
    let shortblockdatalen = rawcodewords / numblocks - blockecclen;

    let mut result = vec![0u8; rawcodewords];
    let rs = ReedSolomonGenerator::new(blockecclen);
    let mut ecc = vec![0u8; blockecclen];
    let mut dat: &[u8] = data;
    for i in 0..numblocks {
        let datlen = shortblockdatalen + usize::from(i >= numshortblocks);
        rs.compute_remainder(&dat[..datlen], &mut ecc);
        let mut k = i;
        for j in 0..datlen {
            if j == shortblockdatalen {
                k -= numshortblocks;
            }
            result[k] = dat[j];
            k += numblocks;
        }
        let mut k = data.len() + i;
        for &e in &ecc {
            result[k] = e;
            k += numblocks;
        }
        dat = &dat[datlen..];
    }
    debug_assert!(dat.is_empty());
    result
}

fn get_alignment_pattern_positions(version: Version) -> Vec<i32> {
    let ver = i32::from(version.value());
    if ver == 1 {
        return Vec::new();
    }
    let size = ver * 4 + 17;
    let numalign = ver / 7 + 2;
    let step: i32 = if ver == 32 {
        26
    } else {
        ((ver * 4 + numalign * 2 + 1) / (numalign * 2 - 2)) * 2
    };
    let mut result: Vec<i32> = (0..numalign - 1).map(|i| size - 7 - i * step).collect();
    result.push(6);
    result.reverse();
    result
}

fn table_get(table: &'static [[i8; 41]; 4], ver: Version, ecl: QrCodeEcc) -> usize {
    table[ecl.ordinal()][usize::from(ver.value())] as usize
}

struct ReedSolomonGenerator {
    divisor: Vec<u8>,
}

impl ReedSolomonGenerator {
    fn new(degree: usize) -> Self {
        assert!((1..=30).contains(&degree), "degree out of range");
        let mut divisor = vec![0u8; degree];
        divisor[degree - 1] = 1; // Monic polynomial, leading coefficient dropped
        let mut root: u8 = 1;
        for _ in 0..degree {
            for j in 0..degree {
                divisor[j] = Self::multiply(divisor[j], root);
                if j + 1 < degree {
                    divisor[j] ^= divisor[j + 1];
                }
            }
            root = Self::multiply(root, 0x02);
        }
        Self { divisor }
    }

    fn compute_remainder(&self, data: &[u8], result: &mut [u8]) {
        assert_eq!(result.len(), self.divisor.len());
        result.fill(0);
        for &b in data {
            let factor: u8 = b ^ result[0];
            result.copy_within(1.., 0);
            result[self.divisor.len() - 1] = 0;
            for (x, &y) in result.iter_mut().zip(self.divisor.iter()) {
                *x ^= Self::multiply(y, factor);
            }
        }
    }

    /// Product in GF(2^8) modulo 0x11d.
    fn multiply(x: u8, y: u8) -> u8 {
        let mut z: u8 = 0;
        for i in (0..8).rev() {
            z = (z << 1) ^ ((z >> 7) * 0x1d);
            z ^= ((y >> i) & 1) * x;
        }
        z
    }
}

struct FinderPenalty {
    qr_size: i32,
    run_history: [i32; 7],
}

impl FinderPenalty {
    fn new(size: i32) -> Self {
        Self {
            qr_size: size,
            run_history: [0; 7],
        }
    }

    fn add_history(&mut self, mut currentrunlength: i32) {
        if self.run_history[0] == 0 {
            currentrunlength += self.qr_size; // Add light border to initial run
        }
        let len = self.run_history.len();
        self.run_history.copy_within(0..len - 1, 1);
        self.run_history[0] = currentrunlength;
    }

    fn count_patterns(&self) -> i32 {
        let rh = &self.run_history;
        let n = rh[1];
        i32::from(
            n > 0
                && rh[2] == n
                && rh[3] == n * 3
                && rh[4] == n
                && rh[5] == n
                && (rh[0] >= n * 4 || rh[6] >= n * 4),
        )
    }

    fn terminate_and_count(mut self, currentruncolor: bool, mut currentrunlength: i32) -> i32 {
        if currentruncolor {
            self.add_history(currentrunlength);
            currentrunlength = 0;
        }
        currentrunlength += self.qr_size; // Add light border to final run
        self.add_history(currentrunlength);
        self.count_patterns()
    }
}

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

static ECC_CODEWORDS_PER_BLOCK: [[i8; 41]; 4] = [
    [
        -1, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28,
        30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Low
    [
        -1, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28,
        28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    ], // Medium
    [
        -1, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30,
        30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // Quartile
    [
        -1, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24,
        30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    ], // High
];

static NUM_ERROR_CORRECTION_BLOCKS: [[i8; 41]; 4] = [
    [
        -1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12,
        13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25,
    ], // Low
    [
        -1, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21,
        23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49,
    ], // Medium
    [
        -1, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27,
        29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68,
    ], // Quartile
    [
        -1, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32,
        35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81,
    ], // High
];

/// Error correction level for a QR code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum QrCodeEcc {
    /// Tolerates ~7% erroneous codewords.
    Low,
    /// Tolerates ~15% erroneous codewords.
    Medium,
    /// Tolerates ~25% erroneous codewords.
    Quartile,
    /// Tolerates ~30% erroneous codewords.
    High,
}

impl QrCodeEcc {
    fn ordinal(self) -> usize {
        use QrCodeEcc::*;
        match self {
            Low => 0,
            Medium => 1,
            Quartile => 2,
            High => 3,
        }
    }

    fn format_bits(self) -> u8 {
        use QrCodeEcc::*;
        match self {
            Low => 1,
            Medium => 0,
            Quartile => 3,
            High => 2,
        }
    }
}

/// One segment of payload data, already reduced to its bit representation.
pub struct QrSegment {
    mode: QrSegmentMode,
    numchars: usize,
    data: Vec<bool>,
}

impl QrSegment {
    /// Creates a byte-mode segment from arbitrary data.
    pub fn make_bytes(data: &[u8]) -> QrSegment {
        let mut bb = BitBuffer(Vec::with_capacity(data.len() * 8));
        for &b in data {
            bb.append_bits(b.into(), 8);
        }
        QrSegment {
            mode: QrSegmentMode::Byte,
            numchars: data.len(),
            data: bb.0,
        }
    }

    /// Creates a numeric-mode segment. The text may only contain the
    /// digits 0 through 9.
    pub fn make_numeric(text: &str) -> Result<QrSegment, EncodeError> {
        if !Self::is_numeric(text) {
            return Err(EncodeError::CharsetMismatch("numeric"));
        }
        Ok(Self::numeric_unchecked(text))
    }

    /// Creates an alphanumeric-mode segment. Allowed characters:
    /// 0–9, A–Z (uppercase), space, `$`, `%`, `*`, `+`, `-`, `.`, `/`, `:`.
    pub fn make_alphanumeric(text: &str) -> Result<QrSegment, EncodeError> {
        if !Self::is_alphanumeric(text) {
            return Err(EncodeError::CharsetMismatch("alphanumeric"));
        }
        Ok(Self::alphanumeric_unchecked(text))
    }

    /// Creates a segment representing an Extended Channel Interpretation
    /// (ECI) designator with the given assignment value.
    pub fn make_eci(assignval: u32) -> Result<QrSegment, EncodeError> {
        let mut bb = BitBuffer(Vec::with_capacity(24));
        if assignval < 1 << 7 {
            bb.append_bits(assignval, 8);
        } else if assignval < 1 << 14 {
            bb.append_bits(0b10, 2);
            bb.append_bits(assignval, 14);
        } else if assignval < 1_000_000 {
            bb.append_bits(0b110, 3);
            bb.append_bits(assignval, 21);
        } else {
            return Err(EncodeError::EciOutOfRange(assignval));
        }
        Ok(QrSegment {
            mode: QrSegmentMode::Eci,
            numchars: 0,
            data: bb.0,
        })
    }

    /// Reduces a string to its densest single-segment representation:
    /// numeric when possible, then alphanumeric, then bytes.
    pub fn make_segments(text: &str) -> Vec<QrSegment> {
        if text.is_empty() {
            Vec::new()
        } else if Self::is_numeric(text) {
            vec![Self::numeric_unchecked(text)]
        } else if Self::is_alphanumeric(text) {
            vec![Self::alphanumeric_unchecked(text)]
        } else {
            vec![Self::make_bytes(text.as_bytes())]
        }
    }

    fn numeric_unchecked(text: &str) -> QrSegment {
        let mut bb = BitBuffer(Vec::with_capacity(text.len() * 10 / 3 + 10));
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for b in text.bytes() {
            accumdata = accumdata * 10 + u32::from(b - b'0');
            accumcount += 1;
            if accumcount == 3 {
                bb.append_bits(accumdata, 10);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            bb.append_bits(accumdata, accumcount * 3 + 1);
        }
        QrSegment {
            mode: QrSegmentMode::Numeric,
            numchars: text.len(),
            data: bb.0,
        }
    }

    fn alphanumeric_unchecked(text: &str) -> QrSegment {
        let mut bb = BitBuffer(Vec::with_capacity(text.len() * 11 / 2 + 11));
        let mut accumdata: u32 = 0;
        let mut accumcount: u8 = 0;
        for c in text.chars() {
            let i = ALPHANUMERIC_CHARSET.find(c).unwrap_or_default();
            accumdata = accumdata * 45 + i as u32;
            accumcount += 1;
            if accumcount == 2 {
                bb.append_bits(accumdata, 11);
                accumdata = 0;
                accumcount = 0;
            }
        }
        if accumcount > 0 {
            bb.append_bits(accumdata, 6);
        }
        QrSegment {
            mode: QrSegmentMode::Alphanumeric,
            numchars: text.len(),
            data: bb.0,
        }
    }

    pub fn mode(&self) -> QrSegmentMode {
        self.mode
    }

    pub fn num_chars(&self) -> usize {
        self.numchars
    }

    /// Total bit count of the segments at the given version, or `None` if
    /// a segment's character count overflows its count field.
    fn get_total_bits(segs: &[QrSegment], version: Version) -> Option<usize> {
        let mut result: usize = 0;
        for seg in segs {
            let ccbits = seg.mode.num_char_count_bits(version);
            if let Some(limit) = 1usize.checked_shl(ccbits.into()) {
                if seg.numchars >= limit {
                    return None;
                }
            }
            result = result.checked_add(4 + usize::from(ccbits))?;
            result = result.checked_add(seg.data.len())?;
        }
        Some(result)
    }

    pub fn is_numeric(text: &str) -> bool {
        text.chars().all(|c| c.is_ascii_digit())
    }

    pub fn is_alphanumeric(text: &str) -> bool {
        text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
    }
}

static ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QrSegmentMode {
    Numeric,
    Alphanumeric,
    Byte,
    Eci,
}

impl QrSegmentMode {
    fn mode_bits(self) -> u32 {
        use QrSegmentMode::*;
        match self {
            Numeric => 0x1,
            Alphanumeric => 0x2,
            Byte => 0x4,
            Eci => 0x7,
        }
    }

    fn num_char_count_bits(self, ver: Version) -> u8 {
        use QrSegmentMode::*;
        (match self {
            Numeric => [10, 12, 14],
            Alphanumeric => [9, 11, 13],
            Byte => [8, 16, 16],
            Eci => [0, 0, 0],
        })[usize::from((ver.value() + 7) / 17)]
    }
}

/// Appendable bit string, most significant bit first.
struct BitBuffer(Vec<bool>);

impl BitBuffer {
    fn append_bits(&mut self, val: u32, len: u8) {
        assert!(len <= 31 && (val >> len) == 0, "value out of range");
        self.0.extend((0..len).rev().map(|i| get_bit(val, i)));
    }
}

/// Reasons a payload cannot be encoded at the requested parameters.
#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    /// A segment's character count does not fit its count field at any
    /// allowed version.
    #[error("segment too long")]
    SegmentTooLong,
    /// The payload needs more bits than the largest allowed version holds.
    #[error("data length = {needed} bits, max capacity = {capacity} bits")]
    DataOverCapacity { needed: usize, capacity: usize },
    /// The payload contains characters outside the requested mode's charset.
    #[error("payload contains characters outside the {0} character set")]
    CharsetMismatch(&'static str),
    #[error("ECI assignment value {0} out of range")]
    EciOutOfRange(u32),
}

/// A QR code version (1–40).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [1, 40].
    pub const fn new(ver: u8) -> Self {
        assert!(
            Version::MIN.value() <= ver && ver <= Version::MAX.value(),
            "version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// A mask pattern (0–7).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Mask(u8);

impl Mask {
    /// Creates a mask object from the given number.
    ///
    /// # Panics
    ///
    /// Panics if the number is outside the range [0, 7].
    pub const fn new(mask: u8) -> Self {
        assert!(mask <= 7, "mask value out of range");
        Self(mask)
    }

    /// Returns the value, which is in the range [0, 7].
    pub const fn value(self) -> u8 {
        self.0
    }
}

fn get_bit(x: u32, i: u8) -> bool {
    ((x >> i) & 1) != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric() {
        assert!(QrSegment::is_numeric("1234567890"));
        assert!(!QrSegment::is_numeric("1234abc"));
    }

    #[test]
    fn test_is_alphanumeric() {
        assert!(QrSegment::is_alphanumeric("HELLO WORLD"));
        assert!(!QrSegment::is_alphanumeric("Hello World"));
    }

    #[test]
    fn test_charset_mismatch_is_an_error() {
        assert!(QrSegment::make_numeric("12a").is_err());
        assert!(QrSegment::make_alphanumeric("lowercase").is_err());
    }

    #[test]
    fn test_size_follows_version() {
        let qr = QrCode::encode_text(
            "HELLO WORLD",
            QrCodeEcc::Low,
            Version::MIN,
            Version::MAX,
            None,
            true,
        )
        .unwrap();
        assert_eq!(qr.version().value(), 1);
        assert_eq!(qr.size(), 21);
        // 74 data bits fit Quartile at version 1 but not High
        assert_eq!(qr.error_correction_level(), QrCodeEcc::Quartile);
    }

    #[test]
    fn test_segment_accessors() {
        let seg = QrSegment::make_bytes(b"abc");
        assert_eq!(seg.mode(), QrSegmentMode::Byte);
        assert_eq!(seg.num_chars(), 3);
        let seg = QrSegment::make_numeric("0123").unwrap();
        assert_eq!(seg.mode(), QrSegmentMode::Numeric);
        assert_eq!(seg.num_chars(), 4);
    }

    #[test]
    fn test_eci_segment_encodes() {
        // ECI 26 designates UTF-8; the designator carries no characters
        // of its own and precedes the data segment
        let eci = QrSegment::make_eci(26).unwrap();
        assert_eq!(eci.mode(), QrSegmentMode::Eci);
        assert_eq!(eci.num_chars(), 0);
        let mut segs = vec![eci];
        segs.push(QrSegment::make_bytes("π ≈ 3.14".as_bytes()));
        let qr = QrCode::encode_segments(
            &segs,
            QrCodeEcc::Low,
            Version::MIN,
            Version::MAX,
            None,
            true,
        )
        .unwrap();
        assert_eq!(qr.version().value(), 1);
    }

    #[test]
    fn test_eci_out_of_range() {
        assert!(QrSegment::make_eci(999_999).is_ok());
        assert!(matches!(
            QrSegment::make_eci(1_000_000),
            Err(EncodeError::EciOutOfRange(_))
        ));
    }

    #[test]
    fn test_minimum_version_is_honored() {
        let qr = QrCode::encode_text(
            "HELLO WORLD",
            QrCodeEcc::Low,
            Version::new(5),
            Version::MAX,
            None,
            true,
        )
        .unwrap();
        assert_eq!(qr.version().value(), 5);
        assert_eq!(qr.size(), 5 * 4 + 17);
    }

    #[test]
    fn test_data_over_capacity() {
        let payload = vec![b'x'; 200];
        let result = QrCode::encode_binary(
            &payload,
            QrCodeEcc::High,
            Version::MIN,
            Version::new(2),
            None,
            false,
        );
        assert!(matches!(result, Err(EncodeError::DataOverCapacity { .. })));
    }

    #[test]
    fn test_out_of_range_modules_are_light() {
        let qr = QrCode::encode_text(
            "HELLO WORLD",
            QrCodeEcc::Low,
            Version::MIN,
            Version::MAX,
            None,
            true,
        )
        .unwrap();
        assert!(!qr.get_module(-1, 0));
        assert!(!qr.get_module(0, -1));
        assert!(!qr.get_module(qr.size(), 0));
        assert!(!qr.get_module(0, qr.size()));
        // Finder pattern corner is always dark
        assert!(qr.get_module(0, 0));
    }

    #[test]
    fn test_fixed_mask_round_trips() {
        let qr = QrCode::encode_text(
            "HELLO WORLD",
            QrCodeEcc::Low,
            Version::MIN,
            Version::MAX,
            Some(Mask::new(3)),
            true,
        )
        .unwrap();
        assert_eq!(qr.mask().value(), 3);
    }
}
