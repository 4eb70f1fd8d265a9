//! Stateless renderers for the custom-drawn controls.
//!
//! Each function reads only its arguments and emits canvas calls.

use crate::canvas::Canvas;
use crate::dropdown::DropdownList;
use crate::geometry::Rect;
use crate::surface::Surface;
use crate::theme::{Color, Theme};

/// Pointer-derived state of one control, rebuilt for every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetState {
    pub rect: Rect,
    pub hovered: bool,
    pub pressed: bool,
    pub enabled: bool,
}

impl WidgetState {
    pub fn new(rect: Rect) -> Self {
        WidgetState {
            rect,
            hovered: false,
            pressed: false,
            enabled: true,
        }
    }

    pub fn hovered(mut self, hovered: bool) -> Self {
        self.hovered = hovered;
        self
    }

    pub fn pressed(mut self, pressed: bool) -> Self {
        self.pressed = pressed;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

const BUTTON_RADIUS: i32 = 4;
const CHECKBOX_RADIUS: i32 = 3;
const DROPDOWN_RADIUS: i32 = 4;
const LIST_RADIUS: i32 = 8;
const HOVER_BRIGHTEN: u8 = 30;

/// Button fill: disabled, then pressed, then hovered, then normal.
pub fn button_fill(state: &WidgetState, theme: &Theme) -> Color {
    if !state.enabled {
        theme.button_disabled
    } else if state.pressed {
        theme.button_pressed
    } else if state.hovered {
        theme.button_hover
    } else {
        theme.button_normal
    }
}

fn text_color(state: &WidgetState, theme: &Theme) -> Color {
    if state.enabled { theme.text } else { theme.disabled_text }
}

fn control_border(state: &WidgetState, theme: &Theme) -> Color {
    if state.enabled && state.hovered {
        theme.control_border.brighten(HOVER_BRIGHTEN).with_alpha(theme.control_border.a)
    } else {
        theme.control_border
    }
}

pub fn draw_button<S: Surface>(canvas: &mut Canvas<S>, state: &WidgetState, theme: &Theme, label: &str) {
    let r = state.rect;
    if state.enabled && state.hovered {
        canvas.fill_rounded_rect(r.offset(1, 2), BUTTON_RADIUS, Color::rgba(0, 0, 0, 30));
    }
    canvas.fill_rounded_rect(r, BUTTON_RADIUS, button_fill(state, theme));
    if state.enabled {
        let alpha = if state.hovered { 30 } else { 15 };
        canvas.stroke_rounded_rect(r, BUTTON_RADIUS, Color::rgba(255, 255, 255, alpha));
    }

    let text_w = canvas.measure_text(label);
    let text_h = canvas.char_height();
    let color = if state.enabled { theme.button_text } else { theme.disabled_text };
    canvas.draw_text(
        label,
        r.x + (r.width - text_w) / 2,
        r.y + (r.height - text_h) / 2,
        color,
    );
}

/// Label to the right of a box or circle control.
fn draw_control_label<S: Surface>(canvas: &mut Canvas<S>, state: &WidgetState, theme: &Theme, label: &str) {
    if label.is_empty() {
        return;
    }
    let r = state.rect;
    let y = r.y + (r.height - canvas.char_height()) / 2;
    canvas.draw_text(label, r.right() + 8, y, text_color(state, theme));
}

pub fn draw_checkbox<S: Surface>(
    canvas: &mut Canvas<S>,
    state: &WidgetState,
    theme: &Theme,
    checked: bool,
    label: &str,
) {
    let r = state.rect;
    let (bg, border) = if checked && state.enabled && state.hovered {
        (theme.control_check, theme.control_check.brighten(HOVER_BRIGHTEN))
    } else if checked {
        (theme.control_check, theme.control_check)
    } else {
        (theme.control_background, control_border(state, theme))
    };
    canvas.fill_rounded_rect(r, CHECKBOX_RADIUS, bg);
    if !checked || state.hovered {
        canvas.stroke_rounded_rect(r, CHECKBOX_RADIUS, border);
    }
    if checked {
        let (cx, cy) = (r.x + 4, r.y + 9);
        let white = Color::WHITE;
        canvas.draw_line(cx, cy, cx + 3, cy + 4, white);
        canvas.draw_line(cx + 1, cy, cx + 4, cy + 4, white);
        canvas.draw_line(cx + 3, cy + 4, cx + 10, cy - 4, white);
        canvas.draw_line(cx + 4, cy + 4, cx + 11, cy - 4, white);
    }
    draw_control_label(canvas, state, theme, label);
}

pub fn draw_radio<S: Surface>(
    canvas: &mut Canvas<S>,
    state: &WidgetState,
    theme: &Theme,
    selected: bool,
    label: &str,
) {
    let r = state.rect;
    canvas.fill_ellipse(r, theme.control_background);
    canvas.stroke_ellipse(r, control_border(state, theme));
    if selected {
        let inner = r.width / 2 - 4;
        if inner > 0 {
            let (cx, cy) = (r.x + r.width / 2, r.y + r.height / 2);
            canvas.fill_ellipse(
                Rect::new(cx - inner, cy - inner, inner * 2, inner * 2),
                theme.control_check,
            );
        }
    }
    draw_control_label(canvas, state, theme, label);
}

/// Closed dropdown control with its chevron. `open` flips the chevron.
pub fn draw_dropdown<S: Surface>(
    canvas: &mut Canvas<S>,
    state: &WidgetState,
    theme: &Theme,
    list: &DropdownList,
    open: bool,
) {
    let r = state.rect;
    let highlight = state.enabled && state.hovered && !open;
    let (bg, border) = if highlight {
        (theme.control_background.scale_alpha(1.15), theme.control_border.scale_alpha(1.5))
    } else {
        (theme.control_background, theme.control_border)
    };
    canvas.fill_rounded_rect(r, DROPDOWN_RADIUS, bg);
    canvas.stroke_rounded_rect(r, DROPDOWN_RADIUS, border);

    let color = text_color(state, theme);
    canvas.draw_text(list.selected_label(), r.x + 12, r.y + r.height / 2 - 8, color);

    let (cx, cy) = (r.x + r.width - 20, r.y + r.height / 2);
    let chevron = color.with_alpha(150);
    if open {
        canvas.draw_polyline(&[(cx, cy + 2), (cx + 4, cy - 2), (cx + 8, cy + 2)], chevron);
    } else {
        canvas.draw_polyline(&[(cx, cy - 2), (cx + 4, cy + 2), (cx + 8, cy - 2)], chevron);
    }
}

/// Floating list of an open dropdown anchored below `anchor`.
pub fn draw_dropdown_list<S: Surface>(canvas: &mut Canvas<S>, anchor: Rect, theme: &Theme, list: &DropdownList) {
    if list.is_empty() {
        return;
    }
    let bounds = list.list_rect(anchor);
    canvas.fill_rounded_rect(bounds.offset(2, 3), LIST_RADIUS, Color::rgba(0, 0, 0, 40));
    canvas.fill_rounded_rect(bounds, LIST_RADIUS, theme.dropdown_background);
    canvas.stroke_rounded_rect(bounds, LIST_RADIUS, theme.menu_border);

    let visible = list.visible_count();
    for slot in 0..visible {
        let index = slot + list.scroll_offset();
        let Some(label) = list.items().get(index) else {
            break;
        };
        let row = list.row_rect(anchor, slot);

        // hovered wins over selected
        if list.hovered() == Some(index) {
            canvas.fill_rounded_rect(row, CHECKBOX_RADIUS, theme.menu_hover);
        } else if list.selected() == Some(index) {
            canvas.fill_rounded_rect(row, CHECKBOX_RADIUS, theme.control_background.with_alpha(60));
        }

        canvas.draw_text(label, row.x + 12, row.y + row.height / 2 - 8, theme.text);

        if list.selected() == Some(index) {
            let (x, y) = (row.x + row.width - 24, row.y + row.height / 2);
            let check = theme.control_check;
            canvas.draw_line(x, y, x + 2, y + 3, check);
            canvas.draw_line(x + 2, y + 3, x + 7, y - 3, check);
            canvas.draw_line(x + 1, y, x + 3, y + 3, check);
            canvas.draw_line(x + 3, y + 3, x + 8, y - 3, check);
        }

        if slot + 1 < visible {
            let sep_y = row.y + row.height;
            canvas.draw_line(
                row.x + 12,
                sep_y,
                row.x + row.width - 12,
                sep_y,
                theme.separator.with_alpha(30),
            );
        }
    }

    let hint = theme.text.with_alpha(120);
    let ax = anchor.x + anchor.width / 2 - 4;
    if list.scroll_offset() > 0 {
        let ay = bounds.y + 10;
        canvas.draw_polyline(&[(ax, ay + 2), (ax + 4, ay - 2), (ax + 8, ay + 2)], hint);
    }
    if list.scroll_offset() < list.max_scroll() {
        let ay = bounds.y + bounds.height - 14;
        canvas.draw_polyline(&[(ax, ay - 2), (ax + 4, ay + 2), (ax + 8, ay - 2)], hint);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};

    fn render(f: impl FnOnce(&mut Canvas<RecordingSurface>)) -> Vec<DrawCommand> {
        let mut canvas = Canvas::new(RecordingSurface::new());
        canvas.initialize(400, 300);
        canvas.begin_frame();
        f(&mut canvas);
        canvas.end_frame();
        canvas.surface().last_frame().unwrap_or_default().to_vec()
    }

    fn first_fill(commands: &[DrawCommand]) -> Option<Color> {
        commands.iter().find_map(|c| match c {
            DrawCommand::FillRoundedRect(_, _, color) => Some(*color),
            _ => None,
        })
    }

    #[test]
    fn test_fill_precedence_disabled_wins() {
        let theme = Theme::dark();
        let rect = Rect::new(0, 0, 75, 25);
        let state = WidgetState::new(rect).enabled(false).pressed(true).hovered(true);
        assert_eq!(button_fill(&state, &theme), theme.button_disabled);
        assert_eq!(
            button_fill(&WidgetState::new(rect).pressed(true).hovered(true), &theme),
            theme.button_pressed
        );
        assert_eq!(button_fill(&WidgetState::new(rect).hovered(true), &theme), theme.button_hover);
        assert_eq!(button_fill(&WidgetState::new(rect), &theme), theme.button_normal);
    }

    #[test]
    fn test_disabled_button_draws_no_shadow_or_border() {
        let theme = Theme::dark();
        let state = WidgetState::new(Rect::new(10, 10, 75, 25)).enabled(false).hovered(true);
        let commands = render(|c| draw_button(c, &state, &theme, "OK"));
        assert_eq!(first_fill(&commands), Some(theme.button_disabled));
        assert!(!commands.iter().any(|c| matches!(c, DrawCommand::StrokeRoundedRect(..))));
        assert!(commands.contains(&DrawCommand::Text(39, 14, "OK".into(), theme.disabled_text)));
    }

    #[test]
    fn test_hovered_button() {
        let theme = Theme::light();
        let state = WidgetState::new(Rect::new(10, 10, 75, 25)).hovered(true);
        let commands = render(|c| draw_button(c, &state, &theme, "OK"));
        let listing: Vec<String> = commands.iter().map(ToString::to_string).collect();
        insta::assert_snapshot!(listing.join("\n"), @r#"
        fill_round 11,12 75x25 r4 #0000001e
        fill_round 10,10 75x25 r4 #0000000c
        stroke_round 10,10 75x25 r4 #ffffff1e
        text 39,14 "OK" #000000ff
        "#);
    }

    #[test]
    fn test_checked_checkbox() {
        let theme = Theme::dark();
        let state = WidgetState::new(Rect::new(20, 20, 18, 18));
        let commands = render(|c| draw_checkbox(c, &state, &theme, true, ""));
        assert_eq!(first_fill(&commands), Some(theme.control_check));
        // border is skipped when checked and not hovered
        assert!(!commands.iter().any(|c| matches!(c, DrawCommand::StrokeRoundedRect(..))));
        let lines = commands.iter().filter(|c| matches!(c, DrawCommand::Line(..))).count();
        assert_eq!(lines, 4);
        assert!(commands.contains(&DrawCommand::Line(24, 29, 27, 33, Color::WHITE)));
    }

    #[test]
    fn test_checked_checkbox_hover_brightens_border() {
        let theme = Theme::light();
        let state = WidgetState::new(Rect::new(20, 20, 18, 18)).hovered(true);
        let commands = render(|c| draw_checkbox(c, &state, &theme, true, ""));
        let border = commands.iter().find_map(|c| match c {
            DrawCommand::StrokeRoundedRect(_, _, color) => Some(*color),
            _ => None,
        });
        assert_eq!(border, Some(theme.control_check.brighten(30)));
        assert_ne!(border, Some(theme.control_check));
    }

    #[test]
    fn test_unchecked_checkbox_hover_brightens_border() {
        let theme = Theme::dark();
        let state = WidgetState::new(Rect::new(20, 20, 18, 18)).hovered(true);
        let commands = render(|c| draw_checkbox(c, &state, &theme, false, "Dark mode"));
        assert!(commands.contains(&DrawCommand::StrokeRoundedRect(
            Rect::new(20, 20, 18, 18),
            3,
            Color::rgba(255, 255, 255, 30)
        )));
        assert!(commands.contains(&DrawCommand::Text(46, 21, "Dark mode".into(), theme.text)));
    }

    #[test]
    fn test_selected_radio_has_inner_dot() {
        let theme = Theme::light();
        let state = WidgetState::new(Rect::new(0, 0, 16, 16));
        let commands = render(|c| draw_radio(c, &state, &theme, true, ""));
        assert!(commands.contains(&DrawCommand::FillEllipse(Rect::new(4, 4, 8, 8), theme.control_check)));
        let unselected = render(|c| draw_radio(c, &state, &theme, false, ""));
        assert_eq!(unselected.len(), 2);
    }

    #[test]
    fn test_dropdown_chevron_direction() {
        let theme = Theme::dark();
        let list = DropdownList::new(["English", "German"], Some(0));
        let state = WidgetState::new(Rect::new(0, 0, 200, 30));
        let chevron = theme.text.with_alpha(150);
        let closed = render(|c| draw_dropdown(c, &state, &theme, &list, false));
        assert!(closed.contains(&DrawCommand::Line(180, 13, 184, 17, chevron)));
        let open = render(|c| draw_dropdown(c, &state, &theme, &list, true));
        assert!(open.contains(&DrawCommand::Line(180, 17, 184, 13, chevron)));
        assert!(open.contains(&DrawCommand::Text(12, 7, "English".into(), theme.text)));
    }

    #[test]
    fn test_dropdown_list_row_precedence_and_hints() {
        let theme = Theme::dark();
        let mut list = DropdownList::new(["a", "b", "c", "d", "e"], Some(1));
        let anchor = Rect::new(0, 0, 200, 30);
        list.hover_at(anchor, 50, 40);
        assert_eq!(list.hovered(), Some(0));
        let commands = render(|c| draw_dropdown_list(c, anchor, &theme, &list));
        let row0 = list.row_rect(anchor, 0);
        let row1 = list.row_rect(anchor, 1);
        assert!(commands.contains(&DrawCommand::FillRoundedRect(row0, 3, theme.menu_hover)));
        assert!(commands.contains(&DrawCommand::FillRoundedRect(
            row1,
            3,
            theme.control_background.with_alpha(60)
        )));
        let hint = theme.text.with_alpha(120);
        // only the "more below" hint at offset 0
        let list_bottom = list.list_rect(anchor).bottom();
        assert!(commands.contains(&DrawCommand::Line(96, list_bottom - 16, 100, list_bottom - 12, hint)));
        assert!(!commands.iter().any(|c| matches!(c, DrawCommand::Line(96, 46, ..))));

        list.scroll_by(5);
        let commands = render(|c| draw_dropdown_list(c, anchor, &theme, &list));
        assert!(commands.contains(&DrawCommand::Line(96, 46, 100, 42, hint)));
        assert!(!commands.iter().any(|c| matches!(c, DrawCommand::Line(96, y, ..) if *y == list_bottom - 16)));
    }
}
