//! Owned module grid consumed by the renderer.
//!
//! Decouples rendering from the encoder: the renderer only ever asks
//! "is the module at (x, y) dark?", and any coordinate outside the grid
//! answers light. That clamp is what lets border and seam glyphs be
//! computed with plain arithmetic instead of boundary branching.

use crate::qrcode::QrCode;

/// A square grid of dark/light cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    size: i32,
    cells: Vec<bool>,
}

impl ModuleMatrix {
    /// Builds a matrix from row-major cells. `cells.len()` must equal
    /// `size * size`.
    pub fn new(size: i32, cells: Vec<bool>) -> Option<ModuleMatrix> {
        if size < 0 || cells.len() != (size as usize).pow(2) {
            return None;
        }
        Some(ModuleMatrix { size, cells })
    }

    /// Matrix filled with a single color, mostly useful in tests.
    pub fn filled(size: i32, dark: bool) -> ModuleMatrix {
        ModuleMatrix {
            size: size.max(0),
            cells: vec![dark; (size.max(0) as usize).pow(2)],
        }
    }

    /// Width and height in modules.
    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Color of the module at the given coordinates; out-of-range
    /// coordinates are light.
    pub fn dark(&self, x: i32, y: i32) -> bool {
        let range = 0..self.size;
        range.contains(&x) && range.contains(&y) && self.cells[(y * self.size + x) as usize]
    }
}

impl From<&QrCode> for ModuleMatrix {
    fn from(qr: &QrCode) -> ModuleMatrix {
        let size = qr.size();
        let mut cells = Vec::with_capacity((size * size) as usize);
        for y in 0..size {
            for x in 0..size {
                cells.push(qr.get_module(x, y));
            }
        }
        ModuleMatrix { size, cells }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_mismatched_cells() {
        assert!(ModuleMatrix::new(2, vec![true; 3]).is_none());
        assert!(ModuleMatrix::new(2, vec![false; 4]).is_some());
    }

    #[test]
    fn test_out_of_range_is_light() {
        let m = ModuleMatrix::filled(2, true);
        assert!(m.dark(0, 0) && m.dark(1, 1));
        assert!(!m.dark(-1, 0));
        assert!(!m.dark(0, -1));
        assert!(!m.dark(2, 0));
        assert!(!m.dark(0, 2));
        assert!(!m.dark(i32::MIN, i32::MAX));
    }

    #[test]
    fn test_empty_matrix() {
        let m = ModuleMatrix::new(0, Vec::new()).unwrap();
        assert!(m.is_empty());
        assert!(!m.dark(0, 0));
    }
}
