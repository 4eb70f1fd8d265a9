//! Scrollable two-column hex view: offset + hex + ASCII on the left,
//! disassembly on the right.

use crate::canvas::Canvas;
use crate::coords::{GridMapper, Nibble, grid_point};
use crate::geometry::Rect;
use crate::layout::LayoutMetrics;
use crate::source::{ByteSource, Disassembler, line_annotation};
use crate::surface::Surface;
use crate::theme::Theme;

/// Width of the disassembly column, in pixels.
pub const DISASSEMBLY_WIDTH: i32 = 300;

fn printable(byte: u8) -> char {
    if (32..127).contains(&byte) { byte as char } else { '.' }
}

/// `"{offset:08X}  "`, `"HH "` per byte (blank past the end), a space, then
/// the ASCII column.
pub fn format_hex_line(source: &(impl ByteSource + ?Sized), offset: u64, bytes_per_line: usize) -> String {
    let bytes = source.read(offset, bytes_per_line);
    let mut line = String::with_capacity(11 + bytes_per_line * 4);
    line.push_str(&format!("{:08X}  ", offset));
    for i in 0..bytes_per_line {
        match bytes.get(i) {
            Some(b) => line.push_str(&format!("{:02X} ", b)),
            None => line.push_str("   "),
        }
    }
    line.push(' ');
    line.extend(bytes.iter().copied().map(printable));
    line
}

pub fn format_header(bytes_per_line: usize) -> String {
    let mut header = String::from("Offset    ");
    for col in 0..bytes_per_line {
        header.push_str(&format!("{:02} ", col));
    }
    header.push_str(" Decoded text");
    header
}

pub fn total_lines(len: u64, bytes_per_line: usize) -> u64 {
    len.div_ceil(bytes_per_line.max(1) as u64)
}

/// Inclusive byte range; the ends may be given in either order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub anchor: u64,
    pub cursor: u64,
}

impl Selection {
    pub fn new(anchor: u64, cursor: u64) -> Self {
        Selection { anchor, cursor }
    }

    pub fn start(&self) -> u64 {
        self.anchor.min(self.cursor)
    }

    pub fn end(&self) -> u64 {
        self.anchor.max(self.cursor)
    }

    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.start() && offset <= self.end()
    }
}

/// Pixel layout of the grid for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub content: Rect,
    pub header_y: i32,
    pub rule_y: i32,
    pub text_x: i32,
    pub hex_x: f32,
    pub hex_y: f32,
    pub separator_x: i32,
    pub visible_lines: usize,
    pub scrollbar_area: Rect,
}

impl GridGeometry {
    pub fn compute(
        layout: &LayoutMetrics,
        window_width: i32,
        window_height: i32,
        left_panel_width: i32,
        menu_bar_height: i32,
    ) -> Self {
        let hex_y = layout.hex_area_y(menu_bar_height);
        let content_height = (window_height - hex_y as i32 - layout.margin).max(0);
        let visible_lines = (content_height / layout.line_height.max(1)) as usize;
        let separator_x = window_width - layout.scrollbar_width - DISASSEMBLY_WIDTH;
        GridGeometry {
            content: Rect::new(
                left_panel_width,
                menu_bar_height,
                window_width - left_panel_width,
                window_height - menu_bar_height,
            ),
            header_y: menu_bar_height + layout.margin,
            rule_y: menu_bar_height + layout.margin + layout.header_height,
            text_x: left_panel_width + layout.margin,
            hex_x: layout.hex_area_x(left_panel_width),
            hex_y,
            separator_x,
            visible_lines,
            scrollbar_area: Rect::new(
                window_width - layout.scrollbar_width,
                hex_y as i32,
                layout.scrollbar_width,
                content_height,
            ),
        }
    }

    pub fn mapper(&self, layout: &LayoutMetrics, bytes_per_line: usize, start_byte: u64) -> GridMapper {
        GridMapper::new(layout, self.hex_x, self.hex_y, bytes_per_line, start_byte)
    }

    /// x of the first ASCII cell.
    pub fn ascii_x(&self, layout: &LayoutMetrics, bytes_per_line: usize) -> f32 {
        self.hex_x + (bytes_per_line * 3) as f32 * layout.char_width + layout.char_width
    }
}

/// Everything the grid renderer reads for one frame.
pub struct GridFrame<'a> {
    pub source: &'a dyn ByteSource,
    pub disassembler: &'a dyn Disassembler,
    pub theme: &'a Theme,
    pub layout: LayoutMetrics,
    pub geometry: GridGeometry,
    pub bytes_per_line: usize,
    pub scroll_line: u64,
    pub caret: Option<(u64, Nibble)>,
    pub selection: Option<Selection>,
}

impl GridFrame<'_> {
    /// First and one-past-last line on screen.
    pub fn line_window(&self) -> (u64, u64) {
        let total = total_lines(self.source.len(), self.bytes_per_line);
        let end = (self.scroll_line + self.geometry.visible_lines as u64).min(total);
        (self.scroll_line.min(end), end)
    }

    fn mapper(&self) -> GridMapper {
        self.geometry
            .mapper(&self.layout, self.bytes_per_line, self.scroll_line * self.bytes_per_line as u64)
    }
}

pub fn draw_hex_grid<S: Surface>(canvas: &mut Canvas<S>, frame: &GridFrame<'_>) {
    let g = &frame.geometry;
    let layout = &frame.layout;
    let theme = frame.theme;
    let bpl = frame.bytes_per_line;

    canvas.fill_rect(g.content, theme.window_background);

    canvas.draw_text(&format_header(bpl), g.text_x, g.header_y, theme.header);
    canvas.draw_text("Disassembly", g.separator_x + 10, g.header_y, theme.disassembly);

    let rule_end = g.content.right() - layout.scrollbar_width;
    canvas.draw_line(g.text_x, g.rule_y, rule_end, g.rule_y, theme.separator);
    let bottom = g.content.bottom() - layout.margin;
    canvas.draw_line(g.separator_x, g.rule_y, g.separator_x, bottom, theme.separator);

    let (first, end) = frame.line_window();
    let mapper = frame.mapper();
    let hex_y = g.hex_y.round() as i32;

    if let Some(selection) = frame.selection {
        draw_selection(canvas, frame, &mapper, selection, first, end);
    }

    let column = Rect::new(g.content.x, hex_y, g.separator_x - g.content.x, g.content.bottom() - hex_y);
    canvas.push_clip(column);
    for (k, line) in (first..end).enumerate() {
        let offset = line * bpl as u64;
        let y = hex_y + k as i32 * layout.line_height;
        canvas.draw_text(&format_hex_line(frame.source, offset, bpl), g.text_x, y, theme.text);
    }
    canvas.pop_clip();

    for (k, line) in (first..end).enumerate() {
        let offset = line * bpl as u64;
        if let Some(text) = line_annotation(frame.source, frame.disassembler, offset, 16) {
            let y = hex_y + k as i32 * layout.line_height;
            canvas.draw_text(&text, g.separator_x + 10, y, theme.disassembly);
        }
    }

    if let Some((caret, nibble)) = frame.caret
        && caret < frame.source.len()
        && let Some(rect) = mapper.caret_rect(caret, nibble, g.visible_lines)
    {
        canvas.fill_rect(rect, theme.text);
    }
}

fn draw_selection<S: Surface>(
    canvas: &mut Canvas<S>,
    frame: &GridFrame<'_>,
    mapper: &GridMapper,
    selection: Selection,
    first: u64,
    end: u64,
) {
    let layout = &frame.layout;
    let bpl = frame.bytes_per_line as u64;
    let len = frame.source.len();
    if len == 0 {
        return;
    }
    let color = frame.theme.control_check.with_alpha(80);
    let cw = layout.char_width;
    let ascii_x = frame.geometry.ascii_x(layout, frame.bytes_per_line);

    let from = selection.start().max(first * bpl);
    let to = selection.end().min(end * bpl).min(len - 1);
    if from > to {
        return;
    }
    for offset in from..=to {
        let p = mapper.byte_point(offset);
        let cell = grid_point(offset, frame.bytes_per_line);
        let hex = Rect::new(
            p.x.round() as i32,
            p.y.round() as i32,
            (3.0 * cw).round() as i32,
            layout.line_height,
        );
        canvas.fill_rect(hex, color);
        let ascii = Rect::new(
            (ascii_x + cell.col as f32 * cw).round() as i32,
            p.y.round() as i32,
            cw.round() as i32,
            layout.line_height,
        );
        canvas.fill_rect(ascii, color);
    }
}
