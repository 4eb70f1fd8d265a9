//! Overlay state machine: which menu, dropdown list or context menu is open.
//!
//! A single `OverlayState` slot is shared by every overlay in a window, so
//! opening one overlay replaces whatever was open before in one transition.

use tracing::{debug, info};

use crate::canvas::Canvas;
use crate::dropdown::DropdownList;
use crate::geometry::Rect;
use crate::input::{InputEvent, Key, MouseButton};
use crate::menu::{Menu, MenuMetrics, next_selectable};
use crate::surface::Surface;
use crate::theme::{Color, Theme};

pub const MENU_BAR_HEIGHT: i32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayId {
    Menu(usize),
    Dropdown(usize),
    ContextMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Closed,
    Open(OverlayId),
}

#[derive(Debug, Default)]
pub struct OverlayController {
    state: OverlayState,
    transitions: usize,
}

impl OverlayController {
    pub fn new() -> Self {
        OverlayController::default()
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Number of state changes so far.
    pub fn transitions(&self) -> usize {
        self.transitions
    }

    pub fn is_open(&self, id: OverlayId) -> bool {
        self.state == OverlayState::Open(id)
    }

    pub fn is_any_open(&self) -> bool {
        self.state != OverlayState::Closed
    }

    pub fn open_menu(&self) -> Option<usize> {
        match self.state {
            OverlayState::Open(OverlayId::Menu(i)) => Some(i),
            _ => None,
        }
    }

    pub fn open_dropdown(&self) -> Option<usize> {
        match self.state {
            OverlayState::Open(OverlayId::Dropdown(i)) => Some(i),
            _ => None,
        }
    }

    /// Open `id`, replacing any other open overlay directly.
    pub fn open(&mut self, id: OverlayId) {
        self.set(OverlayState::Open(id));
    }

    pub fn close(&mut self) {
        self.set(OverlayState::Closed);
    }

    fn set(&mut self, state: OverlayState) {
        if self.state != state {
            debug!("overlay {:?} -> {:?}", self.state, state);
            self.state = state;
            self.transitions += 1;
        }
    }
}

/// Horizontal menu bar with drop-down menus.
#[derive(Debug)]
pub struct MenuBar {
    menus: Vec<Menu>,
    bounds: Rect,
    char_width: f32,
    hovered_header: Option<usize>,
}

impl MenuBar {
    pub fn new(menus: Vec<Menu>) -> Self {
        let mut bar = MenuBar {
            menus,
            bounds: Rect::new(0, 0, 0, MENU_BAR_HEIGHT),
            char_width: 8.0,
            hovered_header: None,
        };
        bar.layout(bar.bounds, bar.char_width);
        bar
    }

    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    pub fn menus_mut(&mut self) -> &mut [Menu] {
        &mut self.menus
    }

    pub fn menu_index(&self, title: &str) -> Option<usize> {
        self.menus.iter().position(|m| m.title == title)
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn hovered_header(&self) -> Option<usize> {
        self.hovered_header
    }

    /// Place the bar and lay out its headers for the current font.
    pub fn layout(&mut self, bounds: Rect, char_width: f32) {
        self.bounds = bounds;
        self.char_width = char_width;
        let mut x = bounds.x + 15;
        for menu in &mut self.menus {
            let title_len = menu.title.chars().count() as f32;
            let width = (title_len * char_width).round() as i32 + 30;
            menu.bounds = Rect::new(x, bounds.y, width, bounds.height);
            x += width;
        }
    }

    pub fn header_at(&self, x: i32, y: i32) -> Option<usize> {
        self.menus.iter().position(|m| m.bounds.contains(x, y))
    }

    pub fn dropdown_rect(&self, index: usize) -> Option<Rect> {
        let menu = self.menus.get(index)?;
        Some(MenuMetrics::MENU_BAR.list_rect(menu.bounds.x, menu.bounds.bottom(), &menu.items))
    }

    fn item_at(&self, index: usize, x: i32, y: i32) -> Option<usize> {
        let menu = self.menus.get(index)?;
        MenuMetrics::MENU_BAR.item_at(menu.bounds.x, menu.bounds.bottom(), &menu.items, x, y)
    }

    fn open_menu(&mut self, overlay: &mut OverlayController, index: usize) {
        if let Some(menu) = self.menus.get_mut(index) {
            menu.hovered_item = None;
            debug!("opening menu {}: {}", index, menu.title);
            overlay.open(OverlayId::Menu(index));
        }
    }

    fn close_menu(&mut self, overlay: &mut OverlayController) {
        if let Some(open) = overlay.open_menu() {
            if let Some(menu) = self.menus.get_mut(open) {
                menu.hovered_item = None;
            }
            overlay.close();
        }
    }

    /// Run an item of the open menu and close it. Items that cannot run
    /// leave the menu open.
    fn execute(&mut self, overlay: &mut OverlayController, menu_index: usize, item_index: usize) -> bool {
        let Some(item) = self
            .menus
            .get_mut(menu_index)
            .and_then(|m| m.items.get_mut(item_index))
        else {
            return false;
        };
        if !item.invoke() {
            return false;
        }
        info!("menu item executed: {}", item.label);
        self.close_menu(overlay);
        true
    }

    /// Feed one input event. Returns true when the menu bar consumed it.
    pub fn handle_event(&mut self, overlay: &mut OverlayController, event: &InputEvent) -> bool {
        match *event {
            InputEvent::PointerMove { x, y } => self.pointer_move(overlay, x, y),
            InputEvent::PointerDown { x, y, button } => self.pointer_down(overlay, x, y, button),
            InputEvent::PointerUp { .. } => overlay.open_menu().is_some(),
            InputEvent::Scroll { .. } => overlay.open_menu().is_some(),
            InputEvent::Key { key, .. } => self.key(overlay, key),
        }
    }

    fn pointer_move(&mut self, overlay: &mut OverlayController, x: i32, y: i32) -> bool {
        let previous = self.hovered_header;
        self.hovered_header = self.header_at(x, y);

        if let Some(open) = overlay.open_menu() {
            let hovered_item = self.item_at(open, x, y);
            if let Some(menu) = self.menus.get_mut(open) {
                menu.hovered_item = hovered_item;
            }
            if let Some(header) = self.hovered_header
                && header != open
            {
                self.open_menu(overlay, header);
            }
            return true;
        }
        previous != self.hovered_header
    }

    fn pointer_down(&mut self, overlay: &mut OverlayController, x: i32, y: i32, button: MouseButton) -> bool {
        if let Some(header) = self.header_at(x, y) {
            if button != MouseButton::Left {
                return true;
            }
            if overlay.is_open(OverlayId::Menu(header)) {
                self.close_menu(overlay);
            } else {
                self.open_menu(overlay, header);
            }
            return true;
        }

        let Some(open) = overlay.open_menu() else {
            return false;
        };
        let inside = self.dropdown_rect(open).is_some_and(|r| r.contains(x, y));
        if inside {
            if button == MouseButton::Left
                && let Some(item) = self.item_at(open, x, y)
            {
                self.execute(overlay, open, item);
            }
        } else {
            self.close_menu(overlay);
        }
        true
    }

    fn key(&mut self, overlay: &mut OverlayController, key: Key) -> bool {
        let Some(open) = overlay.open_menu() else {
            return false;
        };
        match key {
            Key::Escape => self.close_menu(overlay),
            Key::Up | Key::Down => {
                if let Some(menu) = self.menus.get_mut(open) {
                    menu.hovered_item = next_selectable(&menu.items, menu.hovered_item, key == Key::Down);
                }
            }
            Key::Left | Key::Right => {
                let n = self.menus.len();
                let next = if key == Key::Right { (open + 1) % n } else { (open + n - 1) % n };
                self.open_menu(overlay, next);
            }
            Key::Enter => {
                if let Some(item) = self.menus.get(open).and_then(|m| m.hovered_item) {
                    self.execute(overlay, open, item);
                }
            }
            _ => {}
        }
        true
    }

    /// Bar background and headers.
    pub fn draw_bar<S: Surface>(&self, canvas: &mut Canvas<S>, theme: &Theme, overlay: &OverlayController) {
        let b = self.bounds;
        canvas.fill_rect(b, theme.menu_background);
        canvas.draw_line(b.x, b.bottom() - 1, b.right(), b.bottom() - 1, theme.separator);

        let text_y = b.y + (b.height - canvas.char_height()) / 2;
        for (i, menu) in self.menus.iter().enumerate() {
            if self.hovered_header == Some(i) || overlay.is_open(OverlayId::Menu(i)) {
                canvas.fill_rect(menu.bounds, theme.menu_hover);
            }
            canvas.draw_text(&menu.title, menu.bounds.x + 15, text_y, theme.text);
        }
    }

    /// Drop-down list of the open menu, if any.
    pub fn draw_overlay<S: Surface>(&self, canvas: &mut Canvas<S>, theme: &Theme, overlay: &OverlayController) {
        let Some(open) = overlay.open_menu() else {
            return;
        };
        let (Some(menu), Some(rect)) = (self.menus.get(open), self.dropdown_rect(open)) else {
            return;
        };
        let metrics = MenuMetrics::MENU_BAR;
        canvas.fill_rect(rect.offset(3, 3), Color::rgba(0, 0, 0, 80));
        canvas.fill_rect(rect, theme.menu_background);
        canvas.stroke_rect(rect, theme.menu_border);

        let char_h = canvas.char_height();
        let rows = metrics.row_rects(rect.x, rect.y, &menu.items);
        for (i, (item, row)) in menu.items.iter().zip(rows).enumerate() {
            if item.is_separator() {
                let sep_y = row.y + 4;
                canvas.draw_line(row.x + 10, sep_y, row.x + metrics.width - 10, sep_y, theme.separator);
                continue;
            }
            if menu.hovered_item == Some(i) && item.enabled {
                canvas.fill_rounded_rect(row, 3, theme.menu_hover);
            }
            let color = if item.enabled { theme.text } else { theme.disabled_text };
            let text_y = row.y + (row.height - char_h) / 2;
            if item.checked {
                canvas.draw_text("\u{2713}", row.x + 10, text_y, color);
            }
            let label_x = row.x + if item.checked { 35 } else { 15 };
            canvas.draw_text(&item.label, label_x, text_y, color);
            if !item.shortcut.is_empty() {
                let shortcut_x = row.x + metrics.width - canvas.measure_text(&item.shortcut) - 15;
                canvas.draw_text(&item.shortcut, shortcut_x, text_y, theme.disabled_text);
            }
            if item.has_submenu() {
                canvas.draw_text(">", row.x + metrics.width - 20, text_y, color);
            }
        }
    }
}

/// Outcome of feeding an event to a dropdown control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownResponse {
    Ignored,
    Consumed,
    /// A new item was picked and the list closed.
    Selected(usize),
}

/// Drive one dropdown control through the shared overlay slot.
///
/// `anchor` is the closed control; the list floats below it.
pub fn handle_dropdown_event(
    overlay: &mut OverlayController,
    id: usize,
    anchor: Rect,
    list: &mut DropdownList,
    event: &InputEvent,
) -> DropdownResponse {
    let open = overlay.is_open(OverlayId::Dropdown(id));
    let close = |overlay: &mut OverlayController, list: &mut DropdownList| {
        list.reset_scroll();
        overlay.close();
    };
    match *event {
        InputEvent::PointerDown { x, y, .. } => {
            if anchor.contains(x, y) {
                if open {
                    close(overlay, list);
                } else {
                    list.reset_scroll();
                    list.reveal_selected();
                    overlay.open(OverlayId::Dropdown(id));
                }
                return DropdownResponse::Consumed;
            }
            if !open {
                return DropdownResponse::Ignored;
            }
            if let Some(index) = list.item_at(anchor, x, y) {
                list.select(index);
                close(overlay, list);
                return DropdownResponse::Selected(index);
            }
            if !list.list_rect(anchor).contains(x, y) {
                close(overlay, list);
            }
            DropdownResponse::Consumed
        }
        InputEvent::PointerMove { x, y } if open => {
            list.hover_at(anchor, x, y);
            DropdownResponse::Consumed
        }
        InputEvent::Scroll { delta, .. } if open => {
            list.scroll_by(delta.signum());
            DropdownResponse::Consumed
        }
        InputEvent::Key { key, .. } if open => match key {
            Key::Escape => {
                close(overlay, list);
                DropdownResponse::Consumed
            }
            Key::Up | Key::Down => {
                list.move_hover(key == Key::Down);
                DropdownResponse::Consumed
            }
            Key::Enter => match list.hovered() {
                Some(index) => {
                    list.select(index);
                    close(overlay, list);
                    DropdownResponse::Selected(index)
                }
                None => {
                    close(overlay, list);
                    DropdownResponse::Consumed
                }
            },
            _ => DropdownResponse::Consumed,
        },
        _ => DropdownResponse::Ignored,
    }
}
