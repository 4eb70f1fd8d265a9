// Responsive scrollbar: a thin bar that widens while the pointer is over it
// Pure state plus a canvas renderer; the owner maps position to scroll lines

use crate::canvas::Canvas;
use crate::geometry::Rect;
use crate::input::{InputEvent, MouseButton};
use crate::surface::Surface;
use crate::theme::Theme;

const THIN_WIDTH: i32 = 8;
const WIDE_WIDTH: i32 = 12;
const MIN_THUMB: f32 = 20.0;
const RADIUS: i32 = 8;

/// Interaction state of the scrollbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollbarState {
    /// Pointer elsewhere; only the thin thumb is drawn
    Idle,
    /// Pointer over the track
    Hovered,
    /// Thumb grabbed
    Dragging,
}

#[derive(Debug, Clone)]
pub struct ResponsiveScrollbar {
    area: Rect,
    visible: bool,
    thumb_size: f32,
    position: f32,
    state: ScrollbarState,
    thumb_hovered: bool,
    grab_offset: f32,
}

impl Default for ResponsiveScrollbar {
    fn default() -> Self {
        ResponsiveScrollbar::new()
    }
}

impl ResponsiveScrollbar {
    pub fn new() -> Self {
        ResponsiveScrollbar {
            area: Rect::default(),
            visible: false,
            thumb_size: 1.0,
            position: 0.0,
            state: ScrollbarState::Idle,
            thumb_hovered: false,
            grab_offset: 0.0,
        }
    }

    /// Recompute visibility and thumb size. `area` is the strip the bar may
    /// occupy; the track hugs its right edge.
    pub fn update_metrics(&mut self, area: Rect, content: f32, viewport: f32) {
        self.area = area;
        self.visible = content > viewport && content > 0.0;
        self.thumb_size = if content > 0.0 {
            (viewport / content).clamp(0.05, 1.0)
        } else {
            1.0
        };
        if !self.visible && self.state == ScrollbarState::Dragging {
            self.state = ScrollbarState::Idle;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn state(&self) -> ScrollbarState {
        self.state
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn set_position(&mut self, position: f32) {
        self.position = position.clamp(0.0, 1.0);
    }

    pub fn thumb_size(&self) -> f32 {
        self.thumb_size
    }

    pub fn width(&self) -> i32 {
        match self.state {
            ScrollbarState::Idle => THIN_WIDTH,
            ScrollbarState::Hovered | ScrollbarState::Dragging => WIDE_WIDTH,
        }
    }

    pub fn track_rect(&self) -> Rect {
        let w = self.width();
        Rect::new(self.area.right() - w, self.area.y, w, self.area.height)
    }

    fn thumb_height(&self) -> f32 {
        let available = (self.area.height - 4) as f32;
        (available * self.thumb_size).max(MIN_THUMB).min(available.max(0.0))
    }

    pub fn thumb_rect(&self) -> Rect {
        let track = self.track_rect();
        let available = (track.height - 4) as f32;
        let thumb_h = self.thumb_height();
        let thumb_y = track.y as f32 + 2.0 + (available - thumb_h) * self.position;
        Rect::new(track.x + 2, thumb_y.round() as i32, track.width - 3, thumb_h.round() as i32)
    }

    /// Map a pointer y coordinate to a position in `[0, 1]`.
    pub fn position_from_pointer(&self, y: i32) -> f32 {
        let travel = (self.area.height - 4) as f32 - self.thumb_height();
        if travel <= 0.0 {
            return 0.0;
        }
        ((y - self.area.y - 2) as f32 - self.grab_offset) / travel
    }

    fn hit(&self, x: i32, y: i32) -> bool {
        // hit-test against the wide track so widening does not shift the target
        let wide = Rect::new(self.area.right() - WIDE_WIDTH, self.area.y, WIDE_WIDTH, self.area.height);
        self.visible && wide.contains(x, y)
    }

    /// Feed one event. Returns the new position when the pointer moved it.
    /// `consumed` reports whether the event belonged to the scrollbar.
    pub fn handle_event(&mut self, event: &InputEvent) -> (bool, Option<f32>) {
        match *event {
            InputEvent::PointerMove { x, y } => {
                if self.state == ScrollbarState::Dragging {
                    return (true, self.drag_to(y));
                }
                let over = self.hit(x, y);
                self.state = if over { ScrollbarState::Hovered } else { ScrollbarState::Idle };
                self.thumb_hovered = over && self.thumb_rect().contains(x, y);
                (over, None)
            }
            InputEvent::PointerDown {
                x,
                y,
                button: MouseButton::Left,
            } if self.hit(x, y) => {
                let thumb = self.thumb_rect();
                self.state = ScrollbarState::Dragging;
                if thumb.contains(x, y) {
                    self.grab_offset = (y - thumb.y) as f32;
                    (true, None)
                } else {
                    // jump so the thumb centers on the pointer
                    self.grab_offset = thumb.height as f32 / 2.0;
                    (true, self.drag_to(y))
                }
            }
            InputEvent::PointerUp { x, y, .. } if self.state == ScrollbarState::Dragging => {
                self.state = if self.hit(x, y) {
                    ScrollbarState::Hovered
                } else {
                    ScrollbarState::Idle
                };
                self.grab_offset = 0.0;
                (true, None)
            }
            _ => (false, None),
        }
    }

    fn drag_to(&mut self, y: i32) -> Option<f32> {
        let position = self.position_from_pointer(y).clamp(0.0, 1.0);
        if (position - self.position).abs() > f32::EPSILON {
            self.position = position;
            Some(position)
        } else {
            None
        }
    }

    pub fn draw<S: Surface>(&self, canvas: &mut Canvas<S>, theme: &Theme) {
        if !self.visible {
            return;
        }
        let active = self.state != ScrollbarState::Idle;
        let track_alpha = if active { 20 } else { 0 };
        canvas.fill_rounded_rect(self.track_rect(), RADIUS, theme.scrollbar_bg.with_alpha(track_alpha));

        let mut thumb = theme.scrollbar_thumb.with_alpha(match self.state {
            ScrollbarState::Idle => 100,
            ScrollbarState::Hovered => 200,
            ScrollbarState::Dragging => 240,
        });
        if self.thumb_hovered && self.state == ScrollbarState::Hovered {
            thumb = thumb.scale_alpha(1.3);
        }
        canvas.fill_rounded_rect(self.thumb_rect(), RADIUS, thumb);
    }
}
