// Drawing backend trait - abstracts over the native drawing layer
use std::fmt;

use thiserror::Error;

use crate::geometry::Rect;
use crate::layout::{FontMetrics, Platform};
use crate::theme::Color;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("no native window handle")]
    NoWindowHandle,
    #[error("no display connection")]
    NoDisplay,
    #[error("no device context")]
    NoDeviceContext,
    #[error("could not allocate a {width}x{height} backbuffer")]
    BufferAllocation { width: i32, height: i32 },
}

/// A concrete backend. Primitives draw into the backbuffer; nothing is
/// visible until `present`.
///
/// Implementations may assume the owning `Canvas` has already validated
/// sizes and dropped primitives that fall outside the buffer.
pub trait Surface {
    fn platform(&self) -> Platform;

    /// Acquire the native drawing context.
    fn acquire(&mut self) -> Result<(), SurfaceError>;

    /// Replace the backbuffer with one of the given size. On failure the
    /// previous buffer stays in place.
    fn allocate_buffer(&mut self, width: i32, height: i32) -> Result<(), SurfaceError>;

    fn release_buffer(&mut self);

    fn supports_alpha(&self) -> bool {
        true
    }

    fn supports_rounded_rects(&self) -> bool {
        true
    }

    /// Measured cell of the monospace font, if the backend has one loaded.
    fn font_metrics(&self) -> Option<FontMetrics> {
        None
    }

    fn begin_frame(&mut self) {}

    fn set_color(&mut self, color: Color);
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32);
    fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32);

    fn fill_rounded_rect(&mut self, x: i32, y: i32, w: i32, h: i32, _radius: i32) {
        self.fill_rect(x, y, w, h);
    }

    fn stroke_rounded_rect(&mut self, x: i32, y: i32, w: i32, h: i32, _radius: i32) {
        self.stroke_rect(x, y, w, h);
    }

    fn fill_ellipse(&mut self, x: i32, y: i32, w: i32, h: i32);
    fn stroke_ellipse(&mut self, x: i32, y: i32, w: i32, h: i32);
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32);

    /// Draw text with the top of its cell at `y`.
    fn draw_text(&mut self, text: &str, x: i32, y: i32);

    fn push_clip(&mut self, x: i32, y: i32, w: i32, h: i32);
    fn pop_clip(&mut self);

    /// Copy the finished backbuffer to the visible surface.
    fn present(&mut self);
}

/// One primitive as recorded by `RecordingSurface`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect(Rect, Color),
    StrokeRect(Rect, Color),
    FillRoundedRect(Rect, i32, Color),
    StrokeRoundedRect(Rect, i32, Color),
    FillEllipse(Rect, Color),
    StrokeEllipse(Rect, Color),
    Line(i32, i32, i32, i32, Color),
    Text(i32, i32, String, Color),
    PushClip(Rect),
    PopClip,
}

fn fmt_color(color: &Color) -> String {
    format!("#{:08x}", color.to_rgba_u32())
}

impl fmt::Display for DrawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rect = |r: &Rect| format!("{},{} {}x{}", r.x, r.y, r.width, r.height);
        match self {
            DrawCommand::FillRect(r, c) => write!(f, "fill {} {}", rect(r), fmt_color(c)),
            DrawCommand::StrokeRect(r, c) => write!(f, "stroke {} {}", rect(r), fmt_color(c)),
            DrawCommand::FillRoundedRect(r, radius, c) => {
                write!(f, "fill_round {} r{} {}", rect(r), radius, fmt_color(c))
            }
            DrawCommand::StrokeRoundedRect(r, radius, c) => {
                write!(f, "stroke_round {} r{} {}", rect(r), radius, fmt_color(c))
            }
            DrawCommand::FillEllipse(r, c) => write!(f, "fill_ellipse {} {}", rect(r), fmt_color(c)),
            DrawCommand::StrokeEllipse(r, c) => {
                write!(f, "stroke_ellipse {} {}", rect(r), fmt_color(c))
            }
            DrawCommand::Line(x1, y1, x2, y2, c) => {
                write!(f, "line {},{} -> {},{} {}", x1, y1, x2, y2, fmt_color(c))
            }
            DrawCommand::Text(x, y, text, c) => write!(f, "text {},{} {:?} {}", x, y, text, fmt_color(c)),
            DrawCommand::PushClip(r) => write!(f, "clip {}", rect(r)),
            DrawCommand::PopClip => write!(f, "unclip"),
        }
    }
}

/// Headless backend that records every primitive.
///
/// The backbuffer is the command list of the frame in progress; `present`
/// moves it into `frames`. Allocation counters let callers observe buffer
/// reallocation.
#[derive(Debug)]
pub struct RecordingSurface {
    platform: Platform,
    acquire_error: Option<SurfaceError>,
    font: Option<FontMetrics>,
    alpha: bool,
    rounded: bool,
    current_color: Color,
    buffer: Option<(i32, i32)>,
    commands: Vec<DrawCommand>,
    frames: Vec<Vec<DrawCommand>>,
    allocations: usize,
    releases: usize,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        RecordingSurface::new()
    }
}

impl RecordingSurface {
    /// An X11-style surface with an 8x16 font cell.
    pub fn new() -> Self {
        RecordingSurface {
            platform: Platform::X11,
            acquire_error: None,
            font: Some(FontMetrics {
                char_width: 8.0,
                char_height: 16.0,
            }),
            alpha: true,
            rounded: true,
            current_color: Color::BLACK,
            buffer: None,
            commands: Vec::new(),
            frames: Vec::new(),
            allocations: 0,
            releases: 0,
        }
    }

    /// A surface whose acquisition always fails with `error`.
    pub fn failing(error: SurfaceError) -> Self {
        RecordingSurface {
            acquire_error: Some(error),
            ..RecordingSurface::new()
        }
    }

    pub fn without_alpha(mut self) -> Self {
        self.alpha = false;
        self
    }

    pub fn without_rounded_rects(mut self) -> Self {
        self.rounded = false;
        self
    }

    pub fn buffer_size(&self) -> Option<(i32, i32)> {
        self.buffer
    }

    pub fn allocations(&self) -> usize {
        self.allocations
    }

    pub fn releases(&self) -> usize {
        self.releases
    }

    /// Commands drawn since the last present.
    pub fn pending(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn frames(&self) -> &[Vec<DrawCommand>] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&[DrawCommand]> {
        self.frames.last().map(Vec::as_slice)
    }

    fn record(&mut self, command: DrawCommand) {
        if self.buffer.is_some() {
            self.commands.push(command);
        }
    }
}

impl Surface for RecordingSurface {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn acquire(&mut self) -> Result<(), SurfaceError> {
        match &self.acquire_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn allocate_buffer(&mut self, width: i32, height: i32) -> Result<(), SurfaceError> {
        if self.buffer.take().is_some() {
            self.releases += 1;
        }
        self.buffer = Some((width, height));
        self.allocations += 1;
        self.commands.clear();
        Ok(())
    }

    fn release_buffer(&mut self) {
        if self.buffer.take().is_some() {
            self.releases += 1;
        }
        self.commands.clear();
    }

    fn supports_alpha(&self) -> bool {
        self.alpha
    }

    fn supports_rounded_rects(&self) -> bool {
        self.rounded
    }

    fn font_metrics(&self) -> Option<FontMetrics> {
        self.font
    }

    fn begin_frame(&mut self) {
        self.commands.clear();
    }

    fn set_color(&mut self, color: Color) {
        self.current_color = color;
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.record(DrawCommand::FillRect(Rect::new(x, y, w, h), self.current_color));
    }

    fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.record(DrawCommand::StrokeRect(Rect::new(x, y, w, h), self.current_color));
    }

    fn fill_rounded_rect(&mut self, x: i32, y: i32, w: i32, h: i32, radius: i32) {
        let color = self.current_color;
        self.record(DrawCommand::FillRoundedRect(Rect::new(x, y, w, h), radius, color));
    }

    fn stroke_rounded_rect(&mut self, x: i32, y: i32, w: i32, h: i32, radius: i32) {
        let color = self.current_color;
        self.record(DrawCommand::StrokeRoundedRect(Rect::new(x, y, w, h), radius, color));
    }

    fn fill_ellipse(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.record(DrawCommand::FillEllipse(Rect::new(x, y, w, h), self.current_color));
    }

    fn stroke_ellipse(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.record(DrawCommand::StrokeEllipse(Rect::new(x, y, w, h), self.current_color));
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.record(DrawCommand::Line(x1, y1, x2, y2, self.current_color));
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        self.record(DrawCommand::Text(x, y, text.to_string(), self.current_color));
    }

    fn push_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        self.record(DrawCommand::PushClip(Rect::new(x, y, w, h)));
    }

    fn pop_clip(&mut self) {
        self.record(DrawCommand::PopClip);
    }

    fn present(&mut self) {
        if self.buffer.is_some() {
            self.frames.push(std::mem::take(&mut self.commands));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_recorded_without_buffer() {
        let mut surface = RecordingSurface::new();
        surface.fill_rect(0, 0, 10, 10);
        surface.present();
        assert!(surface.pending().is_empty());
        assert!(surface.frames().is_empty());
    }

    #[test]
    fn test_reallocation_releases_previous_buffer() {
        let mut surface = RecordingSurface::new();
        surface.allocate_buffer(100, 100).unwrap();
        surface.allocate_buffer(200, 50).unwrap();
        assert_eq!(surface.allocations(), 2);
        assert_eq!(surface.releases(), 1);
        assert_eq!(surface.buffer_size(), Some((200, 50)));
        surface.release_buffer();
        assert_eq!(surface.releases(), 2);
    }

    #[test]
    fn test_present_moves_backbuffer_into_frames() {
        let mut surface = RecordingSurface::new();
        surface.allocate_buffer(50, 50).unwrap();
        surface.set_color(Color::rgb(1, 2, 3));
        surface.fill_rect(1, 2, 3, 4);
        assert!(surface.frames().is_empty());
        surface.present();
        assert_eq!(surface.frames().len(), 1);
        assert!(surface.pending().is_empty());
        insta::assert_snapshot!(surface.frames()[0][0].to_string(), @"fill 1,2 3x4 #010203ff");
    }

    #[test]
    fn test_failing_surface() {
        let mut surface = RecordingSurface::failing(SurfaceError::NoDisplay);
        assert_eq!(surface.acquire(), Err(SurfaceError::NoDisplay));
    }
}
