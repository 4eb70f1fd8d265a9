// FLTK drawing backend
// FLTK supplies the native layer (GDI, Xlib or Quartz); frames are drawn into
// an offscreen buffer and copied to the window on present

use fltk::draw::{self as fltk_draw, Offscreen};
use fltk::enums::{Align, Color as FltkColor, Font};
use fltk::prelude::*;
use fltk::window::DoubleWindow;

use crate::layout::{FontMetrics, Platform};
use crate::surface::{Surface, SurfaceError};
use crate::theme::Color;

pub const FONT: Font = Font::Courier;
pub const FONT_SIZE: i32 = 14;

pub struct FltkSurface {
    window: DoubleWindow,
    platform: Platform,
    acquired: bool,
    buffer: Option<Offscreen>,
    size: (i32, i32),
    color: FltkColor,
    drawing: bool,
}

impl FltkSurface {
    pub fn new(window: &DoubleWindow) -> Self {
        FltkSurface {
            window: window.clone(),
            platform: Platform::detect(),
            acquired: false,
            buffer: None,
            size: (0, 0),
            color: FltkColor::Black,
            drawing: false,
        }
    }
}

impl Surface for FltkSurface {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn acquire(&mut self) -> Result<(), SurfaceError> {
        if fltk::app::screen_count() < 1 {
            return Err(SurfaceError::NoDisplay);
        }
        if !self.window.shown() {
            return Err(SurfaceError::NoWindowHandle);
        }
        self.acquired = true;
        Ok(())
    }

    fn allocate_buffer(&mut self, width: i32, height: i32) -> Result<(), SurfaceError> {
        let buffer = Offscreen::new(width, height).ok_or(SurfaceError::BufferAllocation { width, height })?;
        self.buffer = Some(buffer);
        self.size = (width, height);
        Ok(())
    }

    fn release_buffer(&mut self) {
        if self.drawing
            && let Some(buffer) = &self.buffer
        {
            buffer.end();
        }
        self.drawing = false;
        self.buffer = None;
    }

    fn supports_alpha(&self) -> bool {
        false
    }

    fn font_metrics(&self) -> Option<FontMetrics> {
        if !self.acquired {
            return None;
        }
        fltk_draw::set_font(FONT, FONT_SIZE);
        let char_width = fltk_draw::width("0") as f32;
        let char_height = fltk_draw::height() as f32;
        (char_width > 0.0 && char_height > 0.0).then_some(FontMetrics {
            char_width,
            char_height,
        })
    }

    fn begin_frame(&mut self) {
        if let Some(buffer) = &self.buffer {
            buffer.begin();
            self.drawing = true;
            fltk_draw::set_font(FONT, FONT_SIZE);
        }
    }

    fn set_color(&mut self, color: Color) {
        self.color = FltkColor::from_rgb(color.r, color.g, color.b);
        fltk_draw::set_draw_color(self.color);
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        fltk_draw::draw_rectf(x, y, w, h);
    }

    fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        fltk_draw::draw_rect(x, y, w, h);
    }

    fn fill_rounded_rect(&mut self, x: i32, y: i32, w: i32, h: i32, radius: i32) {
        fltk_draw::draw_rbox(x, y, w, h, radius, true, self.color);
    }

    fn stroke_rounded_rect(&mut self, x: i32, y: i32, w: i32, h: i32, radius: i32) {
        fltk_draw::draw_rbox(x, y, w, h, radius, false, self.color);
    }

    fn fill_ellipse(&mut self, x: i32, y: i32, w: i32, h: i32) {
        fltk_draw::draw_pie(x, y, w, h, 0.0, 360.0);
    }

    fn stroke_ellipse(&mut self, x: i32, y: i32, w: i32, h: i32) {
        fltk_draw::draw_arc(x, y, w, h, 0.0, 360.0);
    }

    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        fltk_draw::draw_line(x1, y1, x2, y2);
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32) {
        let h = fltk_draw::height();
        fltk_draw::draw_text2(text, x, y, 0, h, Align::Left);
    }

    fn push_clip(&mut self, x: i32, y: i32, w: i32, h: i32) {
        fltk_draw::push_clip(x, y, w, h);
    }

    fn pop_clip(&mut self) {
        fltk_draw::pop_clip();
    }

    fn present(&mut self) {
        let Some(buffer) = &self.buffer else {
            return;
        };
        if self.drawing {
            buffer.end();
            self.drawing = false;
        }
        let (w, h) = self.size;
        buffer.copy(0, 0, w, h, 0, 0);
    }
}
