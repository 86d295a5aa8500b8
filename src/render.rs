//! Glyph-packing renderer.
//!
//! Converts a [`ModuleMatrix`] into terminal text. Depending on the mode
//! a printed glyph covers one module (two characters wide), a vertical
//! pair of modules, or a 2x2 block. The whole frame — light border
//! included — is produced by one scan over `-border..size+border` per
//! axis: the matrix answers light for every out-of-range coordinate, so
//! border glyphs and the seam glyphs straddling the border/data boundary
//! fall out of the same lookup as interior ones.
//!
//! Below the last module row the renderer always closes the bottom edge
//! with a trailing half-glyph line whose lower half stays transparent;
//! with an odd border the compact mode closes the right edge the same
//! way with a trailing half-glyph column.

use thiserror::Error;

use crate::ansi::Painter;
use crate::glyph::{self, HalfBits, QuadBits};
use crate::matrix::ModuleMatrix;

/// How many modules one printed glyph covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// One module per glyph, two characters wide.
    Large,
    /// A vertical pair of modules per glyph.
    #[default]
    Normal,
    /// A 2x2 block of modules per glyph.
    Compact,
}

/// Renderer knobs. The caller decides about color; the renderer never
/// inspects the terminal itself.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub mode: RenderMode,
    /// Light border width in modules. Negative values render as zero.
    pub border: i32,
    pub invert: bool,
    pub paint: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            mode: RenderMode::Normal,
            border: 2,
            invert: false,
            paint: false,
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("module matrix is empty")]
    EmptyMatrix,
}

/// How a border of a given width divides into glyphs spanning
/// `modules_per_glyph` modules on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderSplit {
    /// Whole glyph rows/columns of pure border.
    pub full: i32,
    /// Sub-glyph remainder merged into a boundary-straddling glyph.
    pub leftover: i32,
}

/// Splits `border` into whole glyph units and the leftover, such that
/// `full * modules_per_glyph + leftover == border`.
pub fn border_split(border: i32, modules_per_glyph: i32) -> BorderSplit {
    debug_assert!(modules_per_glyph > 0);
    let border = border.max(0);
    BorderSplit {
        full: border / modules_per_glyph,
        leftover: border % modules_per_glyph,
    }
}

/// Number of terminal lines a render occupies, including the trailing
/// bottom-edge line. The animator sizes its cursor-reset sequence with
/// this.
pub fn line_count(size: i32, opts: &RenderOptions) -> usize {
    let l = (size + 2 * opts.border.max(0)) as usize;
    match opts.mode {
        RenderMode::Large => l,
        RenderMode::Normal | RenderMode::Compact => (l + 1) / 2 + 1,
    }
}

/// Number of glyphs per rendered line.
pub fn glyph_width(size: i32, opts: &RenderOptions) -> usize {
    let l = (size + 2 * opts.border.max(0)) as usize;
    match opts.mode {
        RenderMode::Large | RenderMode::Normal => l,
        RenderMode::Compact => (l + 1) / 2,
    }
}

/// Renders the matrix to newline-terminated text.
///
/// Fails only when the matrix is empty; any in-range geometry (including
/// `border == 0`) renders without panicking.
pub fn render(matrix: &ModuleMatrix, opts: &RenderOptions) -> Result<String, RenderError> {
    if matrix.is_empty() {
        return Err(RenderError::EmptyMatrix);
    }
    let painter = Painter::new(opts.paint, opts.invert);
    let mut out = String::with_capacity(buffer_bound(matrix.size(), opts, &painter));
    match opts.mode {
        RenderMode::Large => render_large(matrix, opts, &painter, &mut out),
        RenderMode::Normal => render_normal(matrix, opts, &painter, &mut out),
        RenderMode::Compact => render_compact(matrix, opts, &painter, &mut out),
    }
    log::debug!(
        "rendered {} modules as {} lines, {} bytes",
        matrix.size(),
        line_count(matrix.size(), opts),
        out.len()
    );
    Ok(out)
}

/// Upper bound on the output size, so the buffer never reallocates while
/// rendering. Glyphs are at most three bytes ("██" in large mode is two
/// three-byte characters but two glyph slots wide per module, folded into
/// the per-glyph factor below).
fn buffer_bound(size: i32, opts: &RenderOptions, painter: &Painter) -> usize {
    let rows = line_count(size, opts);
    let cols = glyph_width(size, opts);
    let glyph_bytes = match opts.mode {
        RenderMode::Large => 6,
        RenderMode::Normal | RenderMode::Compact => 3,
    };
    rows * (cols * glyph_bytes + painter.line_overhead() + 1)
}

fn render_large(matrix: &ModuleMatrix, opts: &RenderOptions, painter: &Painter, out: &mut String) {
    let border = opts.border.max(0);
    let size = matrix.size();
    let glyphs = glyph::solid_glyphs(opts.invert);
    for y in -border..size + border {
        painter.open(out);
        for x in -border..size + border {
            out.push_str(glyphs[usize::from(matrix.dark(x, y))]);
        }
        painter.close(out);
        out.push('\n');
    }
}

fn render_normal(matrix: &ModuleMatrix, opts: &RenderOptions, painter: &Painter, out: &mut String) {
    let border = opts.border.max(0);
    let size = matrix.size();
    let glyphs = glyph::half_glyphs(opts.invert);

    // Rows pair up starting at the top border edge; with an odd border
    // the pair at y == -1 straddles the boundary, its top half falling
    // on border (light) and its bottom half on the first data row.
    let mut y = -border;
    while y < size + border {
        painter.open(out);
        for x in -border..size + border {
            let bits = HalfBits {
                top: matrix.dark(x, y),
                bottom: matrix.dark(x, y + 1),
            };
            out.push_str(glyphs[bits.index()]);
        }
        painter.close(out);
        out.push('\n');
        y += 2;
    }

    // Trailing bottom-edge line: upper half light, lower half transparent
    let trailing = trailing_half(&glyphs, opts.invert);
    painter.open_trailing(out);
    for _ in -border..size + border {
        out.push_str(trailing);
    }
    painter.close(out);
    out.push('\n');
}

fn render_compact(
    matrix: &ModuleMatrix,
    opts: &RenderOptions,
    painter: &Painter,
    out: &mut String,
) {
    let border = opts.border.max(0);
    let size = matrix.size();
    let glyphs = glyph::quad_glyphs(opts.invert);
    let leftover_h = border_split(border, 2).leftover;
    // With an odd border the pair walk can end mid-glyph on a lone
    // border column; that column is drawn like the trailing row, its
    // outer half kept transparent. When the overall span is even the
    // pairs tile exactly and no such column exists.
    let trailing_col = leftover_h != 0 && (size + 2 * border) % 2 != 0;
    let edge = size + border - i32::from(trailing_col);

    let mut y = -border;
    while y < size + border {
        painter.open(out);
        let mut x = -border;
        while x < edge {
            let bits = QuadBits {
                top_left: matrix.dark(x, y),
                top_right: matrix.dark(x + 1, y),
                bottom_left: matrix.dark(x, y + 1),
                bottom_right: matrix.dark(x + 1, y + 1),
            };
            out.push_str(glyphs[bits.index()]);
            x += 2;
        }
        if trailing_col {
            let bits = QuadBits {
                top_left: matrix.dark(edge, y),
                top_right: !opts.invert,
                bottom_left: matrix.dark(edge, y + 1),
                bottom_right: !opts.invert,
            };
            out.push_str(glyphs[bits.index()]);
        }
        painter.close(out);
        out.push('\n');
        y += 2;
    }

    // Trailing bottom-edge line, with the matching corner glyph when the
    // right edge is also open
    let trailing = trailing_quad(&glyphs, opts.invert);
    painter.open_trailing(out);
    let mut x = -border;
    while x < edge {
        out.push_str(trailing);
        x += 2;
    }
    if trailing_col {
        let bits = QuadBits {
            top_left: false,
            top_right: !opts.invert,
            bottom_left: !opts.invert,
            bottom_right: !opts.invert,
        };
        out.push_str(glyphs[bits.index()]);
    }
    painter.close(out);
    out.push('\n');
}

/// Glyph for the trailing line in normal mode: the upper half shows the
/// light edge, the lower half is left undrawn so the terminal background
/// shows through. Inverted output draws nothing there instead.
fn trailing_half(glyphs: &[&'static str; 4], invert: bool) -> &'static str {
    let bits = HalfBits {
        top: false,
        bottom: !invert,
    };
    glyphs[bits.index()]
}

/// Compact-mode counterpart of [`trailing_half`].
fn trailing_quad(glyphs: &[&'static str; 16], invert: bool) -> &'static str {
    let bits = QuadBits {
        top_left: false,
        top_right: false,
        bottom_left: !invert,
        bottom_right: !invert,
    };
    glyphs[bits.index()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi;

    fn single_dark() -> ModuleMatrix {
        ModuleMatrix::new(1, vec![true]).unwrap()
    }

    fn opts(mode: RenderMode, border: i32) -> RenderOptions {
        RenderOptions {
            mode,
            border,
            invert: false,
            paint: false,
        }
    }

    #[test]
    fn test_large_single_module() {
        let text = render(&single_dark(), &opts(RenderMode::Large, 1)).unwrap();
        assert_eq!(text, "██████\n██  ██\n██████\n");
    }

    #[test]
    fn test_normal_single_module() {
        // Pair at y = -1 straddles the border: top light, bottom dark.
        // The line after it is pure border, then the trailing edge.
        let text = render(&single_dark(), &opts(RenderMode::Normal, 1)).unwrap();
        assert_eq!(text, "█▀█\n███\n▀▀▀\n");
    }

    #[test]
    fn test_compact_single_module() {
        let text = render(&single_dark(), &opts(RenderMode::Compact, 1)).unwrap();
        assert_eq!(text, "▛▌\n█▌\n▀▘\n");
    }

    #[test]
    fn test_inverted_large_single_module() {
        let mut o = opts(RenderMode::Large, 1);
        o.invert = true;
        let text = render(&single_dark(), &o).unwrap();
        assert_eq!(text, "      \n  ██  \n      \n");
    }

    #[test]
    fn test_empty_matrix_is_an_error() {
        let empty = ModuleMatrix::new(0, Vec::new()).unwrap();
        for mode in [RenderMode::Large, RenderMode::Normal, RenderMode::Compact] {
            assert!(render(&empty, &opts(mode, 2)).is_err());
        }
    }

    #[test]
    fn test_border_split_invariant() {
        for border in 0..12 {
            for span in 1..3 {
                let split = border_split(border, span);
                assert_eq!(split.full * span + split.leftover, border);
                assert!(split.leftover < span);
            }
        }
    }

    #[test]
    fn test_even_size_compact_tiles_exactly() {
        // An even span pairs up with no lone column, odd border or not
        let matrix = ModuleMatrix::filled(2, true);
        let text = render(&matrix, &opts(RenderMode::Compact, 1)).unwrap();
        assert_eq!(text, "▛▜\n▙▟\n▀▀\n");
    }

    #[test]
    fn test_line_and_glyph_counts() {
        for &size in &[1, 2, 21, 25, 177] {
            let matrix = ModuleMatrix::filled(size, true);
            for border in 1..=4 {
                for mode in [RenderMode::Large, RenderMode::Normal, RenderMode::Compact] {
                    let o = opts(mode, border);
                    let text = render(&matrix, &o).unwrap();
                    let lines: Vec<&str> = text.lines().collect();
                    assert_eq!(lines.len(), line_count(size, &o), "{mode:?} b={border}");
                    assert!(text.ends_with('\n'));
                    let chars_per_glyph = match mode {
                        RenderMode::Large => 2,
                        _ => 1,
                    };
                    for line in lines {
                        assert_eq!(
                            line.chars().count(),
                            glyph_width(size, &o) * chars_per_glyph,
                            "{mode:?} b={border}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_trailing_row_is_always_there() {
        // The edge-closing line exists for every border parity
        for border in 1..=4 {
            for mode in [RenderMode::Normal, RenderMode::Compact] {
                let text = render(&single_dark(), &opts(mode, border)).unwrap();
                let last = text.lines().last().unwrap();
                assert!(last.chars().all(|c| c == '▀' || c == '▘'), "b={border}");
            }
        }
    }

    #[test]
    fn test_output_never_exceeds_capacity_bound() {
        for &size in &[1, 2, 21, 25, 177] {
            let matrix = ModuleMatrix::filled(size, size % 2 == 1);
            for border in 1..=4 {
                for mode in [RenderMode::Large, RenderMode::Normal, RenderMode::Compact] {
                    for (invert, paint) in [(false, false), (true, false), (false, true), (true, true)] {
                        let o = RenderOptions { mode, border, invert, paint };
                        let painter = Painter::new(paint, invert);
                        let text = render(&matrix, &o).unwrap();
                        assert!(text.len() <= buffer_bound(size, &o, &painter));
                    }
                }
            }
        }
    }

    #[test]
    fn test_painted_lines_are_framed() {
        let o = RenderOptions {
            mode: RenderMode::Normal,
            border: 2,
            invert: false,
            paint: true,
        };
        let set = format!("{}{}", ansi::BG_BLACK, ansi::FG_WHITE);
        let reset = format!("{}{}", ansi::BG_DEFAULT, ansi::FG_DEFAULT);
        let text = render(&single_dark(), &o).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        for line in &lines {
            assert!(line.starts_with(set.as_str()));
            assert!(line.ends_with(reset.as_str()));
        }
        // Trailing line keeps its transparent half uncolored
        let trailing = lines.last().unwrap();
        assert!(trailing.starts_with(&format!("{set}{}", ansi::BG_DEFAULT)));
    }

    #[test]
    fn test_inverted_trailing_line_stays_painted() {
        let o = RenderOptions {
            mode: RenderMode::Normal,
            border: 2,
            invert: true,
            paint: true,
        };
        let set = format!("{}{}", ansi::BG_BLACK, ansi::FG_WHITE);
        let text = render(&single_dark(), &o).unwrap();
        let trailing = text.lines().last().unwrap();
        assert!(trailing.starts_with(set.as_str()));
        assert!(!trailing.starts_with(&format!("{set}{}", ansi::BG_DEFAULT)));
    }

    #[test]
    fn test_zero_border_renders() {
        let matrix = ModuleMatrix::filled(3, true);
        for mode in [RenderMode::Large, RenderMode::Normal, RenderMode::Compact] {
            let o = opts(mode, 0);
            let text = render(&matrix, &o).unwrap();
            assert_eq!(text.lines().count(), line_count(3, &o));
        }
    }
}
