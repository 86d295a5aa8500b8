//! ANSI escape sequences and per-line color framing.

/// SGR set foreground to white.
pub const FG_WHITE: &str = "\x1b[37m";
/// SGR reset foreground to the terminal default.
pub const FG_DEFAULT: &str = "\x1b[39m";
/// SGR set background to black.
pub const BG_BLACK: &str = "\x1b[40m";
/// SGR reset background to the terminal default.
pub const BG_DEFAULT: &str = "\x1b[49m";
/// Move the cursor up one line and erase it.
pub const CURSOR_UP_ERASE: &str = "\x1b[1A\x1b[2K";

/// Wraps rendered lines in palette escapes.
///
/// Every line gets a black-background/white-foreground prefix and a
/// reset suffix. The trailing bottom-edge line is special: its lower
/// half lies outside the symbol and must show the terminal's own
/// background, so the painter re-resets the background right after the
/// palette prefix — unless the render is inverted, in which case the
/// trailing glyphs are already the dark fill. A disabled painter writes
/// nothing at all.
#[derive(Debug, Clone, Copy)]
pub struct Painter {
    enabled: bool,
    invert: bool,
}

impl Painter {
    pub fn new(enabled: bool, invert: bool) -> Painter {
        Painter { enabled, invert }
    }

    /// Starts a regular line.
    pub fn open(&self, out: &mut String) {
        if self.enabled {
            out.push_str(BG_BLACK);
            out.push_str(FG_WHITE);
        }
    }

    /// Starts the trailing bottom-edge line, keeping its transparent half
    /// uncolored.
    pub fn open_trailing(&self, out: &mut String) {
        self.open(out);
        if self.enabled && !self.invert {
            out.push_str(BG_DEFAULT);
        }
    }

    /// Ends a line, restoring the terminal palette.
    pub fn close(&self, out: &mut String) {
        if self.enabled {
            out.push_str(BG_DEFAULT);
            out.push_str(FG_DEFAULT);
        }
    }

    /// Upper bound on escape bytes added per line.
    pub fn line_overhead(&self) -> usize {
        if self.enabled {
            BG_BLACK.len() + FG_WHITE.len() + BG_DEFAULT.len() * 2 + FG_DEFAULT.len()
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_painter_writes_nothing() {
        let p = Painter::new(false, false);
        let mut s = String::new();
        p.open(&mut s);
        p.open_trailing(&mut s);
        p.close(&mut s);
        assert!(s.is_empty());
        assert_eq!(p.line_overhead(), 0);
    }

    #[test]
    fn test_enabled_painter_frames_lines() {
        let p = Painter::new(true, false);
        let mut s = String::new();
        p.open(&mut s);
        s.push('x');
        p.close(&mut s);
        assert_eq!(s, "\x1b[40m\x1b[37mx\x1b[49m\x1b[39m");
    }

    #[test]
    fn test_trailing_line_resets_background() {
        let p = Painter::new(true, false);
        let mut s = String::new();
        p.open_trailing(&mut s);
        assert_eq!(s, "\x1b[40m\x1b[37m\x1b[49m");

        // Inverted output keeps the black background on the trailing line
        let p = Painter::new(true, true);
        let mut s = String::new();
        p.open_trailing(&mut s);
        assert_eq!(s, "\x1b[40m\x1b[37m");
    }
}
