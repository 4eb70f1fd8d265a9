//! Byte offset <-> grid cell <-> pixel conversions for the hex area.
//!
//! Every byte column is three character cells wide: two hex digits and
//! one separating space.

use crate::geometry::{PointF, Rect};
use crate::layout::LayoutMetrics;

/// Which hex digit of a byte the caret addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nibble {
    #[default]
    High = 0,
    Low = 1,
}

impl Nibble {
    pub fn index(self) -> i32 {
        self as i32
    }
}

/// Column and row of a byte within the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub col: u64,
    pub row: u64,
}

/// Result of mapping a pixel back onto the grid.
///
/// `byte_index` is not range-checked; it may be negative or past the end
/// of the data for points outside the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BytePositionInfo {
    pub byte_index: i64,
    pub nibble: Nibble,
}

impl BytePositionInfo {
    /// The byte offset if it addresses real data.
    pub fn in_range(&self, len: u64) -> Option<u64> {
        u64::try_from(self.byte_index).ok().filter(|&i| i < len)
    }
}

/// Absorbs float error when a point sits exactly on a cell's left or top edge.
const EDGE_EPSILON: f64 = 1e-3;

pub fn grid_point(byte_index: u64, bytes_per_line: usize) -> GridCell {
    let bpl = bytes_per_line.max(1) as u64;
    GridCell {
        col: byte_index % bpl,
        row: byte_index / bpl,
    }
}

/// Grid geometry for one frame: where the hex area starts, the cell size,
/// and which byte sits in the top-left cell.
///
/// Pixel math runs in `f64` so rows of multi-megabyte files still map back
/// to the byte they came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapper {
    pub hex_area_x: f64,
    pub hex_area_y: f64,
    pub char_width: f64,
    pub char_height: f64,
    pub bytes_per_line: usize,
    pub start_byte: u64,
}

impl GridMapper {
    pub fn new(layout: &LayoutMetrics, hex_area_x: f32, hex_area_y: f32, bytes_per_line: usize, start_byte: u64) -> Self {
        GridMapper {
            hex_area_x: hex_area_x as f64,
            hex_area_y: hex_area_y as f64,
            char_width: layout.char_width as f64,
            char_height: layout.char_height as f64,
            bytes_per_line: bytes_per_line.max(1),
            start_byte,
        }
    }

    /// Top-left pixel of a grid cell.
    pub fn pixel_point(&self, cell: GridCell) -> PointF {
        PointF::new(
            (3 * cell.col) as f64 * self.char_width + self.hex_area_x,
            cell.row as f64 * self.char_height + self.hex_area_y,
        )
    }

    /// Top-left pixel of a byte, relative to the first visible byte.
    /// Bytes before `start_byte` land on the first visible row.
    pub fn byte_point(&self, byte_index: u64) -> PointF {
        let relative = byte_index.saturating_sub(self.start_byte);
        self.pixel_point(grid_point(relative, self.bytes_per_line))
    }

    /// Map a pixel to the byte and nibble under it. The separator cell
    /// after a byte belongs to its low nibble. No clamping is applied.
    pub fn byte_from_pixel(&self, x: f64, y: f64) -> BytePositionInfo {
        let rel_x = x - self.hex_area_x;
        let rel_y = y - self.hex_area_y;
        let char_col = (rel_x / self.char_width + EDGE_EPSILON).floor() as i64;
        let char_row = (rel_y / self.char_height + EDGE_EPSILON).floor() as i64;

        let column = char_col.div_euclid(3);
        let nibble = if char_col.rem_euclid(3) == 0 {
            Nibble::High
        } else {
            Nibble::Low
        };
        BytePositionInfo {
            byte_index: self.start_byte as i64 + char_row * self.bytes_per_line as i64 + column,
            nibble,
        }
    }

    /// Like `byte_from_pixel`, but only for points inside the hex columns of
    /// visible rows that address existing data.
    pub fn hit_test(&self, x: f64, y: f64, visible_lines: usize, len: u64) -> Option<(u64, Nibble)> {
        let rel_x = x - self.hex_area_x;
        let rel_y = y - self.hex_area_y;
        let grid_w = 3.0 * self.char_width * self.bytes_per_line as f64;
        let grid_h = self.char_height * visible_lines as f64;
        if rel_x < 0.0 || rel_y < 0.0 || rel_x >= grid_w || rel_y >= grid_h {
            return None;
        }
        let info = self.byte_from_pixel(x, y);
        info.in_range(len).map(|index| (index, info.nibble))
    }

    /// One past the last byte that fits in `visible_lines` rows.
    pub fn visible_end(&self, visible_lines: usize) -> u64 {
        self.start_byte + (self.bytes_per_line * visible_lines) as u64
    }

    /// Thin bar one cell tall at the caret, or `None` when the caret is
    /// scrolled out of view.
    pub fn caret_rect(&self, caret: u64, nibble: Nibble, visible_lines: usize) -> Option<Rect> {
        if caret < self.start_byte || caret >= self.visible_end(visible_lines) {
            return None;
        }
        let p = self.byte_point(caret);
        let x = p.x + nibble.index() as f64 * self.char_width;
        Some(Rect::new(
            x.round() as i32,
            p.y.round() as i32,
            2,
            self.char_height.round() as i32,
        ))
    }
}
