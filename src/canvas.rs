use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::geometry::Rect;
use crate::layout::{FontMetrics, LayoutMetrics, Platform};
use crate::surface::Surface;
use crate::theme::Color;

/// Largest accepted backbuffer edge, in pixels.
pub const MAX_DIMENSION: i32 = 8192;

/// Validating front end over a `Surface`.
///
/// The canvas owns the frame bracket and the clip stack. Primitives issued
/// outside `begin_frame`/`end_frame`, or before a successful `initialize`,
/// are ignored. Primitives entirely outside the current clip are dropped
/// before they reach the surface.
pub struct Canvas<S: Surface> {
    surface: S,
    initialized: bool,
    width: i32,
    height: i32,
    in_frame: bool,
    clear_color: Color,
    clip_stack: Vec<Rect>,
    font: FontMetrics,
}

impl<S: Surface> Canvas<S> {
    pub fn new(surface: S) -> Self {
        let font = FontMetrics::for_platform(surface.platform(), surface.font_metrics());
        Canvas {
            surface,
            initialized: false,
            width: 0,
            height: 0,
            in_frame: false,
            clear_color: Color::BLACK,
            clip_stack: Vec::new(),
            font,
        }
    }

    /// Acquire the surface and allocate the first backbuffer.
    ///
    /// Returns false when the surface cannot be acquired or the buffer
    /// cannot be allocated; the canvas then stays unusable.
    pub fn initialize(&mut self, width: i32, height: i32) -> bool {
        if let Err(err) = self.surface.acquire() {
            warn!("canvas initialization failed: {}", err);
            self.initialized = false;
            return false;
        }
        if !valid_dimensions(width, height) {
            warn!("canvas initialization rejected size {}x{}", width, height);
            return false;
        }
        if let Err(err) = self.surface.allocate_buffer(width, height) {
            warn!("canvas initialization failed: {}", err);
            return false;
        }
        self.initialized = true;
        self.width = width;
        self.height = height;
        self.font = FontMetrics::for_platform(self.surface.platform(), self.surface.font_metrics());
        debug!("canvas initialized at {}x{} on {:?}", width, height, self.surface.platform());
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Reallocate the backbuffer for a new size.
    ///
    /// Ignored unless the canvas is initialized and both edges lie in
    /// `(0, MAX_DIMENSION]`. Re-applying the current size is a no-op.
    /// Returns whether a new buffer is now in place.
    pub fn resize(&mut self, width: i32, height: i32) -> bool {
        if !self.initialized {
            return false;
        }
        if !valid_dimensions(width, height) {
            debug!("ignoring resize to {}x{}", width, height);
            return false;
        }
        if width == self.width && height == self.height {
            return false;
        }
        match self.surface.allocate_buffer(width, height) {
            Ok(()) => {
                debug!("backbuffer reallocated {}x{} -> {}x{}", self.width, self.height, width, height);
                self.width = width;
                self.height = height;
                true
            }
            Err(err) => {
                warn!("resize failed, keeping {}x{}: {}", self.width, self.height, err);
                false
            }
        }
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn platform(&self) -> Platform {
        self.surface.platform()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn font(&self) -> FontMetrics {
        self.font
    }

    pub fn layout(&self) -> LayoutMetrics {
        LayoutMetrics::for_font(self.font)
    }

    /// Width of `text` in pixels: one cell per grapheme.
    pub fn measure_text(&self, text: &str) -> i32 {
        (text.graphemes(true).count() as f32 * self.font.char_width).round() as i32
    }

    pub fn char_height(&self) -> i32 {
        self.font.char_height.round() as i32
    }

    /// Start a frame. Font metrics are re-read so the frame's layout is
    /// fixed for its whole duration.
    pub fn begin_frame(&mut self) -> bool {
        if !self.initialized {
            return false;
        }
        self.font = FontMetrics::for_platform(self.surface.platform(), self.surface.font_metrics());
        self.clip_stack.clear();
        self.in_frame = true;
        self.surface.begin_frame();
        true
    }

    /// Finish the frame and present it. Unbalanced clips are popped first.
    pub fn end_frame(&mut self) {
        if !self.in_frame {
            return;
        }
        while self.clip_stack.pop().is_some() {
            self.surface.pop_clip();
        }
        self.in_frame = false;
        self.surface.present();
    }

    pub fn in_frame(&self) -> bool {
        self.in_frame
    }

    fn clip(&self) -> Rect {
        self.clip_stack.last().copied().unwrap_or_else(|| self.bounds())
    }

    fn visible(&self, bounds: Rect) -> Option<Rect> {
        if !self.in_frame || bounds.is_empty() {
            return None;
        }
        bounds.intersect(&self.clip())
    }

    /// Set the surface color. Returns false for fully transparent colors.
    fn apply_color(&mut self, color: Color) -> bool {
        if color.a == 0 {
            return false;
        }
        let resolved = if color.a == 255 || self.surface.supports_alpha() {
            color
        } else {
            color.blend_over(self.clear_color)
        };
        self.surface.set_color(resolved);
        true
    }

    pub fn clear(&mut self, color: Color) {
        if !self.in_frame {
            return;
        }
        self.clear_color = color.with_alpha(255);
        let clear_color = self.clear_color;
        self.fill_rect(self.bounds(), clear_color);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(visible) = self.visible(rect) else {
            return;
        };
        if self.apply_color(color) {
            self.surface
                .fill_rect(visible.x, visible.y, visible.width, visible.height);
        }
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Color) {
        let Some(visible) = self.visible(rect) else {
            return;
        };
        if self.apply_color(color) {
            self.clipped(rect, visible, |s| s.stroke_rect(rect.x, rect.y, rect.width, rect.height));
        }
    }

    /// Rounded rectangle. Surfaces without rounded corners get a plain one.
    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: i32, color: Color) {
        if radius <= 0 || !self.surface.supports_rounded_rects() {
            self.fill_rect(rect, color);
            return;
        }
        let Some(visible) = self.visible(rect) else {
            return;
        };
        if self.apply_color(color) {
            self.clipped(rect, visible, |s| {
                s.fill_rounded_rect(rect.x, rect.y, rect.width, rect.height, radius)
            });
        }
    }

    pub fn stroke_rounded_rect(&mut self, rect: Rect, radius: i32, color: Color) {
        if radius <= 0 || !self.surface.supports_rounded_rects() {
            self.stroke_rect(rect, color);
            return;
        }
        let Some(visible) = self.visible(rect) else {
            return;
        };
        if self.apply_color(color) {
            self.clipped(rect, visible, |s| {
                s.stroke_rounded_rect(rect.x, rect.y, rect.width, rect.height, radius)
            });
        }
    }

    pub fn fill_ellipse(&mut self, rect: Rect, color: Color) {
        let Some(visible) = self.visible(rect) else {
            return;
        };
        if self.apply_color(color) {
            self.clipped(rect, visible, |s| s.fill_ellipse(rect.x, rect.y, rect.width, rect.height));
        }
    }

    pub fn stroke_ellipse(&mut self, rect: Rect, color: Color) {
        let Some(visible) = self.visible(rect) else {
            return;
        };
        if self.apply_color(color) {
            self.clipped(rect, visible, |s| s.stroke_ellipse(rect.x, rect.y, rect.width, rect.height));
        }
    }

    /// Straight line, cut to the current clip before it reaches the surface.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, color: Color) {
        if !self.in_frame {
            return;
        }
        let Some((x1, y1, x2, y2)) = clip_line(self.clip(), x1, y1, x2, y2) else {
            return;
        };
        if self.apply_color(color) {
            self.surface.draw_line(x1, y1, x2, y2);
        }
    }

    /// Draw a polyline through `points`.
    pub fn draw_polyline(&mut self, points: &[(i32, i32)], color: Color) {
        for pair in points.windows(2) {
            self.draw_line(pair[0].0, pair[0].1, pair[1].0, pair[1].1, color);
        }
    }

    /// Draw text with the top of its cell at `y`.
    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, color: Color) {
        if text.is_empty() {
            return;
        }
        let bounds = Rect::new(x, y, self.measure_text(text), self.char_height());
        let Some(visible) = self.visible(bounds) else {
            return;
        };
        if self.apply_color(color) {
            self.clipped(bounds, visible, |s| s.draw_text(text, x, y));
        }
    }

    /// Run `draw` on the surface, wrapped in a surface clip when only part
    /// of `bounds` is visible.
    fn clipped(&mut self, bounds: Rect, visible: Rect, draw: impl FnOnce(&mut S)) {
        let partial = visible != bounds;
        if partial {
            self.surface
                .push_clip(visible.x, visible.y, visible.width, visible.height);
        }
        draw(&mut self.surface);
        if partial {
            self.surface.pop_clip();
        }
    }

    /// Restrict drawing to `rect` intersected with the current clip.
    pub fn push_clip(&mut self, rect: Rect) {
        if !self.in_frame {
            return;
        }
        let clipped = rect.intersect(&self.clip()).unwrap_or_default();
        self.clip_stack.push(clipped);
        self.surface
            .push_clip(clipped.x, clipped.y, clipped.width, clipped.height);
    }

    pub fn pop_clip(&mut self) {
        if self.in_frame && self.clip_stack.pop().is_some() {
            self.surface.pop_clip();
        }
    }
}

impl<S: Surface> Drop for Canvas<S> {
    fn drop(&mut self) {
        if self.initialized {
            self.surface.release_buffer();
        }
    }
}

fn valid_dimensions(width: i32, height: i32) -> bool {
    width > 0 && height > 0 && width <= MAX_DIMENSION && height <= MAX_DIMENSION
}

/// Liang-Barsky clipping of a segment to the pixels of `clip`. Endpoints
/// are rounded back to whole pixels inside the rectangle.
fn clip_line(clip: Rect, x1: i32, y1: i32, x2: i32, y2: i32) -> Option<(i32, i32, i32, i32)> {
    if clip.is_empty() {
        return None;
    }
    let (x1, y1, x2, y2) = (x1 as f64, y1 as f64, x2 as f64, y2 as f64);
    let (dx, dy) = (x2 - x1, y2 - y1);
    let (left, top) = (clip.x as f64, clip.y as f64);
    let (right, bottom) = ((clip.right() - 1) as f64, (clip.bottom() - 1) as f64);

    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, x1 - left), (dx, right - x1), (-dy, y1 - top), (dy, bottom - y1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let at = |t: f64| ((x1 + t * dx).round() as i32, (y1 + t * dy).round() as i32);
    let (ax, ay) = at(t0);
    let (bx, by) = at(t1);
    Some((ax, ay, bx, by))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface, SurfaceError};

    fn canvas() -> Canvas<RecordingSurface> {
        let mut canvas = Canvas::new(RecordingSurface::new());
        assert!(canvas.initialize(200, 100));
        canvas
    }

    #[test]
    fn test_initialize_failure_leaves_canvas_unusable() {
        let mut canvas = Canvas::new(RecordingSurface::failing(SurfaceError::NoWindowHandle));
        assert!(!canvas.initialize(200, 100));
        assert!(!canvas.is_initialized());
        assert!(!canvas.begin_frame());
        canvas.fill_rect(Rect::new(0, 0, 10, 10), Color::WHITE);
        canvas.end_frame();
        assert!(canvas.surface().frames().is_empty());
        assert!(!canvas.resize(300, 300));
        assert_eq!(canvas.surface().allocations(), 0);
    }

    #[test]
    fn test_resize_rejects_out_of_range() {
        let mut canvas = canvas();
        assert!(!canvas.resize(9000, 9000));
        assert!(!canvas.resize(0, 50));
        assert!(!canvas.resize(50, -1));
        assert_eq!(canvas.size(), (200, 100));
        assert_eq!(canvas.surface().allocations(), 1);
    }

    #[test]
    fn test_resize_reallocates_once() {
        let mut canvas = canvas();
        assert!(canvas.resize(8192, 300));
        assert!(!canvas.resize(8192, 300));
        assert_eq!(canvas.size(), (8192, 300));
        assert_eq!(canvas.surface().allocations(), 2);
        assert_eq!(canvas.surface().releases(), 1);
    }

    #[test]
    fn test_frame_is_presented_only_at_end() {
        let mut canvas = canvas();
        assert!(canvas.begin_frame());
        canvas.clear(Color::gray(32));
        canvas.fill_rect(Rect::new(10, 10, 5, 5), Color::WHITE);
        assert!(canvas.surface().frames().is_empty());
        canvas.end_frame();
        assert_eq!(canvas.surface().frames().len(), 1);
        assert_eq!(canvas.surface().frames()[0].len(), 2);
    }

    #[test]
    fn test_primitives_outside_frame_are_ignored() {
        let mut canvas = canvas();
        canvas.fill_rect(Rect::new(0, 0, 10, 10), Color::WHITE);
        canvas.draw_text("x", 0, 0, Color::WHITE);
        assert!(canvas.surface().pending().is_empty());
    }

    #[test]
    fn test_off_surface_primitives_are_clipped_or_dropped() {
        let mut canvas = canvas();
        canvas.begin_frame();
        canvas.fill_rect(Rect::new(-50, -50, 60, 70), Color::WHITE);
        canvas.fill_rect(Rect::new(500, 500, 10, 10), Color::WHITE);
        canvas.draw_line(-10, 500, -5, 600, Color::WHITE);
        canvas.draw_text("hidden", 190, 200, Color::WHITE);
        canvas.end_frame();
        let frame = canvas.surface().last_frame().unwrap();
        assert_eq!(frame, &[DrawCommand::FillRect(Rect::new(0, 0, 10, 20), Color::WHITE)]);
    }

    #[test]
    fn test_extreme_coordinates_do_not_overflow() {
        let mut canvas = canvas();
        canvas.begin_frame();
        canvas.draw_line(i32::MIN, 0, 10, 10, Color::WHITE);
        canvas.fill_rect(Rect::new(i32::MAX - 5, 0, 100, 10), Color::WHITE);
        canvas.draw_line(i32::MIN, i32::MIN, i32::MAX, i32::MAX, Color::WHITE);
        canvas.stroke_rect(Rect::new(i32::MIN, i32::MIN, i32::MAX, i32::MAX), Color::WHITE);
        canvas.draw_text("x", i32::MAX, i32::MAX, Color::WHITE);
        canvas.end_frame();
        let frame = canvas.surface().last_frame().unwrap();
        assert_eq!(
            frame,
            &[
                DrawCommand::Line(0, 10, 10, 10, Color::WHITE),
                DrawCommand::Line(0, 0, 99, 99, Color::WHITE),
            ]
        );
    }

    #[test]
    fn test_partly_visible_primitives_are_clipped() {
        let mut canvas = canvas();
        canvas.begin_frame();
        canvas.draw_line(-100, 50, 300, 50, Color::WHITE);
        canvas.stroke_rect(Rect::new(150, 80, 100, 40), Color::WHITE);
        canvas.draw_text("abc", 190, 0, Color::WHITE);
        canvas.fill_ellipse(Rect::new(10, 10, 20, 20), Color::WHITE);
        canvas.end_frame();
        let frame = canvas.surface().last_frame().unwrap();
        assert_eq!(
            frame,
            &[
                DrawCommand::Line(0, 50, 199, 50, Color::WHITE),
                DrawCommand::PushClip(Rect::new(150, 80, 50, 20)),
                DrawCommand::StrokeRect(Rect::new(150, 80, 100, 40), Color::WHITE),
                DrawCommand::PopClip,
                DrawCommand::PushClip(Rect::new(190, 0, 10, 16)),
                DrawCommand::Text(190, 0, "abc".into(), Color::WHITE),
                DrawCommand::PopClip,
                DrawCommand::FillEllipse(Rect::new(10, 10, 20, 20), Color::WHITE),
            ]
        );
    }

    #[test]
    fn test_alpha_is_blended_without_surface_support() {
        let mut canvas = Canvas::new(RecordingSurface::new().without_alpha());
        canvas.initialize(50, 50);
        canvas.begin_frame();
        canvas.clear(Color::BLACK);
        canvas.fill_rect(Rect::new(0, 0, 5, 5), Color::rgba(255, 255, 255, 0));
        canvas.fill_rect(Rect::new(0, 0, 5, 5), Color::rgba(200, 100, 50, 255));
        canvas.fill_rect(Rect::new(0, 0, 5, 5), Color::rgba(255, 255, 255, 51));
        canvas.end_frame();
        let frame = canvas.surface().last_frame().unwrap();
        assert_eq!(frame.len(), 3);
        assert_eq!(frame[1], DrawCommand::FillRect(Rect::new(0, 0, 5, 5), Color::rgb(200, 100, 50)));
        assert_eq!(frame[2], DrawCommand::FillRect(Rect::new(0, 0, 5, 5), Color::gray(51)));
    }

    #[test]
    fn test_rounded_rect_fallback() {
        let mut canvas = Canvas::new(RecordingSurface::new().without_rounded_rects());
        canvas.initialize(50, 50);
        canvas.begin_frame();
        canvas.fill_rounded_rect(Rect::new(1, 1, 10, 10), 4, Color::WHITE);
        canvas.end_frame();
        let frame = canvas.surface().last_frame().unwrap();
        assert_eq!(frame, &[DrawCommand::FillRect(Rect::new(1, 1, 10, 10), Color::WHITE)]);
    }

    #[test]
    fn test_measure_text_counts_graphemes() {
        let canvas = canvas();
        assert_eq!(canvas.measure_text("abc"), 24);
        assert_eq!(canvas.measure_text("e\u{301}"), 8);
        assert_eq!(canvas.measure_text(""), 0);
    }

    #[test]
    fn test_clip_stack_is_balanced_at_frame_end() {
        let mut canvas = canvas();
        canvas.begin_frame();
        canvas.push_clip(Rect::new(10, 10, 20, 20));
        canvas.fill_rect(Rect::new(0, 0, 100, 100), Color::WHITE);
        canvas.end_frame();
        let frame = canvas.surface().last_frame().unwrap();
        assert_eq!(
            frame,
            &[
                DrawCommand::PushClip(Rect::new(10, 10, 20, 20)),
                DrawCommand::FillRect(Rect::new(10, 10, 20, 20), Color::WHITE),
                DrawCommand::PopClip,
            ]
        );
    }
}
