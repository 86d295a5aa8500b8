//! Block-glyph lookup tables.
//!
//! Terminal QR output draws the *light* modules: on the usual dark
//! terminal a light module becomes a white block and a dark module
//! becomes empty space. Each table is therefore stored indexed by the
//! set of filled (drawn) positions, and the public constructors index it
//! by dark-module bitmask: the normal table reads the complement entry,
//! the inverted table reads the entry directly. This makes inversion a
//! pure complement, `glyphs(invert)[k] == glyphs(!invert)[COMPLEMENT - k]`.

/// Glyphs for one module per cell, two characters wide, indexed by the
/// set bit: 0 = nothing drawn, 1 = full block.
const SOLID_FILLED: [&str; 2] = ["  ", "██"];

/// Glyphs for a vertical pair of modules, indexed by drawn halves
/// (bit 0 = top, bit 1 = bottom).
const HALF_FILLED: [&str; 4] = [" ", "▀", "▄", "█"];

/// Glyphs for a 2x2 block of modules, indexed by drawn quadrants
/// (bit 0 = top-left, bit 1 = bottom-left, bit 2 = top-right,
/// bit 3 = bottom-right).
const QUAD_FILLED: [&str; 16] = [
    " ", "▘", "▖", "▌", "▝", "▀", "▞", "▛", "▗", "▚", "▄", "▙", "▐", "▜", "▟", "█",
];

/// A vertical pair of module states, `true` meaning dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfBits {
    pub top: bool,
    pub bottom: bool,
}

impl HalfBits {
    /// Table index: `top + 2 * bottom`.
    pub fn index(self) -> usize {
        usize::from(self.top) | usize::from(self.bottom) << 1
    }
}

/// A 2x2 block of module states, `true` meaning dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadBits {
    pub top_left: bool,
    pub top_right: bool,
    pub bottom_left: bool,
    pub bottom_right: bool,
}

impl QuadBits {
    /// Table index: `top_left + 2 * bottom_left + 4 * top_right +
    /// 8 * bottom_right`. The bit order must stay in sync with
    /// [`QUAD_FILLED`]; swapping any two bits mirrors the table.
    pub fn index(self) -> usize {
        usize::from(self.top_left)
            | usize::from(self.bottom_left) << 1
            | usize::from(self.top_right) << 2
            | usize::from(self.bottom_right) << 3
    }
}

/// One-module-per-glyph table, indexed by the module's dark bit.
pub fn solid_glyphs(invert: bool) -> [&'static str; 2] {
    core::array::from_fn(|k| SOLID_FILLED[if invert { k } else { 1 - k }])
}

/// Two-modules-per-glyph table, indexed by [`HalfBits::index`].
pub fn half_glyphs(invert: bool) -> [&'static str; 4] {
    core::array::from_fn(|k| HALF_FILLED[if invert { k } else { 3 - k }])
}

/// Four-modules-per-glyph table, indexed by [`QuadBits::index`].
pub fn quad_glyphs(invert: bool) -> [&'static str; 16] {
    core::array::from_fn(|k| QUAD_FILLED[if invert { k } else { 15 - k }])
}
