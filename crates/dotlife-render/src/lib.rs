//! Braille-glyph frame rendering for dotlife grids.
//!
//! Packs each 4×2 block of cells into one codepoint from the Unicode
//! Braille Patterns block, shrinking a frame 4× vertically and 2×
//! horizontally compared to one character per cell. The encoding is purely
//! visual density; it has nothing to do with tactile reading.

use std::io::{self, Write};

use dotlife_core::{BLOCK_COLS, BLOCK_ROWS, Grid};

/// First codepoint of the Unicode Braille Patterns block.
pub const GLYPH_BASE: u32 = 0x2800;

/// Dot bit for each cell of a block, indexed in row-major order.
///
/// Follows the Braille dot numbering: dots run top-to-bottom within the
/// left column, then the right column, with the bottom pair last, so live
/// cells appear as raised dots.
pub const DOT_BITS: [u8; 8] = [0, 3, 1, 4, 2, 5, 6, 7];

/// Packs the 4×2 block whose top-left cell is `(row, col)` into a dot
/// pattern.
#[must_use]
pub fn block_pattern(grid: &Grid, row: usize, col: usize) -> u8 {
    let mut pattern = 0u8;
    for (i, bit) in DOT_BITS.iter().enumerate() {
        if grid.get(row + i / BLOCK_COLS, col + i % BLOCK_COLS) {
            pattern |= 1 << bit;
        }
    }
    pattern
}

/// Maps a dot pattern to its glyph.
#[must_use]
pub fn glyph(pattern: u8) -> char {
    // The Braille Patterns block covers every 8-bit pattern.
    char::from_u32(GLYPH_BASE + u32::from(pattern)).expect("braille codepoint")
}

/// Renders one full frame of `grid`, one text line per block row.
///
/// Block rows scan top-to-bottom in steps of four cell rows, block columns
/// left-to-right in steps of two cell columns. Only whole blocks render:
/// trailing rows or columns short of a full block are dropped.
#[must_use]
pub fn frame_string(grid: &Grid) -> String {
    let block_rows = grid.rows() / BLOCK_ROWS;
    let block_cols = grid.cols() / BLOCK_COLS;

    // Each braille glyph is three bytes of UTF-8, plus one newline per line.
    let mut frame = String::with_capacity(block_rows * (block_cols * 3 + 1));
    for block_row in 0..block_rows {
        for block_col in 0..block_cols {
            let pattern = block_pattern(grid, block_row * BLOCK_ROWS, block_col * BLOCK_COLS);
            frame.push(glyph(pattern));
        }
        frame.push('\n');
    }
    frame
}

/// Writes one full frame of `grid` to `out`.
pub fn write_frame<W: Write>(grid: &Grid, out: &mut W) -> io::Result<()> {
    out.write_all(frame_string(grid).as_bytes())
}
