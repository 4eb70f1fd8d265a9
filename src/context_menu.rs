//! Right-click menu with one level of hover-opened submenus.
//!
//! The context menu occupies the same overlay slot as the menu bar and the
//! dropdowns, so opening it closes them and vice versa.

use tracing::{debug, info};

use crate::canvas::Canvas;
use crate::command::{Command, CommandQueue};
use crate::controller::{OverlayController, OverlayId};
use crate::geometry::{Point, Rect};
use crate::input::{InputEvent, Key};
use crate::menu::{MenuItem, MenuMetrics, next_selectable};
use crate::surface::Surface;
use crate::theme::{Color, Theme};

const RADIUS: i32 = 8;
const SHORTCUT_X: i32 = 140;

/// Items of the hex view's context menu.
pub fn hex_context_items(queue: &CommandQueue, has_data: bool) -> Vec<MenuItem> {
    vec![
        MenuItem::action("Copy offset", queue.sender(Command::CopyOffset))
            .with_shortcut("Ctrl+Shift+C")
            .with_enabled(has_data),
        MenuItem::action("Copy hex", queue.sender(Command::CopyHex))
            .with_shortcut("Ctrl+C")
            .with_enabled(has_data),
        MenuItem::action("Select all", queue.sender(Command::SelectAll)).with_shortcut("Ctrl+A"),
        MenuItem::separator(),
        MenuItem::submenu(
            "Go to",
            vec![
                MenuItem::action("Start", queue.sender(Command::GoToStart)).with_shortcut("Ctrl+Home"),
                MenuItem::action("End", queue.sender(Command::GoToEnd)).with_shortcut("Ctrl+End"),
            ],
        ),
    ]
}

#[derive(Debug)]
pub struct ContextMenu {
    items: Vec<MenuItem>,
    origin: Point,
    hovered: Option<usize>,
    submenu: Option<usize>,
    submenu_hovered: Option<usize>,
}

impl ContextMenu {
    pub fn new(items: Vec<MenuItem>) -> Self {
        ContextMenu {
            items,
            origin: Point::default(),
            hovered: None,
            submenu: None,
            submenu_hovered: None,
        }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [MenuItem] {
        &mut self.items
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn open_submenu(&self) -> Option<usize> {
        self.submenu
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    fn metrics() -> MenuMetrics {
        MenuMetrics::CONTEXT
    }

    pub fn rect(&self) -> Rect {
        Self::metrics().list_rect(self.origin.x, self.origin.y, &self.items)
    }

    /// Open at `(x, y)`, shifted so the menu stays inside `window`.
    pub fn open_at(&mut self, overlay: &mut OverlayController, x: i32, y: i32, window: Rect) {
        let size = Self::metrics().list_rect(0, 0, &self.items);
        let max_x = (window.right() - size.width).max(window.x);
        let max_y = (window.bottom() - size.height).max(window.y);
        self.origin = Point::new(x.clamp(window.x, max_x), y.clamp(window.y, max_y));
        self.hovered = None;
        self.submenu = None;
        self.submenu_hovered = None;
        debug!("context menu at {},{}", self.origin.x, self.origin.y);
        overlay.open(OverlayId::ContextMenu);
    }

    pub fn close(&mut self, overlay: &mut OverlayController) {
        self.reset();
        if overlay.is_open(OverlayId::ContextMenu) {
            overlay.close();
        }
    }

    /// Forget hover and submenu state. Used when another overlay takes the
    /// slot over directly.
    pub fn reset(&mut self) {
        self.hovered = None;
        self.submenu = None;
        self.submenu_hovered = None;
    }

    /// Nested list of submenu item `index`, placed beside its row and kept
    /// vertically inside the parent menu.
    pub fn submenu_rect(&self, index: usize) -> Option<Rect> {
        let item = self.items.get(index).filter(|i| i.has_submenu())?;
        let metrics = Self::metrics();
        let parent = self.rect();
        let row = metrics.row_rects(parent.x, parent.y, &self.items)[index];
        let height = metrics.list_height(&item.submenu);
        let y = row.y.min(parent.bottom() - height).max(parent.y);
        Some(Rect::new(parent.x + metrics.width - 2, y, metrics.width, height))
    }

    fn item_at(&self, x: i32, y: i32) -> Option<usize> {
        Self::metrics().item_at(self.origin.x, self.origin.y, &self.items, x, y)
    }

    fn submenu_item_at(&self, x: i32, y: i32) -> Option<usize> {
        let index = self.submenu?;
        let rect = self.submenu_rect(index)?;
        Self::metrics().item_at(rect.x, rect.y, &self.items[index].submenu, x, y)
    }

    fn in_submenu(&self, x: i32, y: i32) -> bool {
        self.submenu
            .and_then(|i| self.submenu_rect(i))
            .is_some_and(|r| r.contains(x, y))
    }

    fn execute(&mut self, overlay: &mut OverlayController, index: usize, sub_index: Option<usize>) -> bool {
        let item = match sub_index {
            Some(sub) => self.items.get_mut(index).and_then(|i| i.submenu.get_mut(sub)),
            None => self.items.get_mut(index),
        };
        let Some(item) = item else {
            return false;
        };
        if !item.invoke() {
            return false;
        }
        info!("context menu item executed: {}", item.label);
        self.close(overlay);
        true
    }

    /// Feed one input event. Returns true when the context menu consumed it.
    pub fn handle_event(&mut self, overlay: &mut OverlayController, event: &InputEvent) -> bool {
        if !overlay.is_open(OverlayId::ContextMenu) {
            return false;
        }
        match *event {
            InputEvent::PointerMove { x, y } => {
                if self.in_submenu(x, y) {
                    self.submenu_hovered = self.submenu_item_at(x, y);
                    return true;
                }
                self.submenu_hovered = None;
                self.hovered = self.item_at(x, y);
                match self.hovered {
                    Some(i) if self.items[i].has_submenu() => self.submenu = Some(i),
                    Some(_) => self.submenu = None,
                    None => {}
                }
                true
            }
            InputEvent::PointerDown { x, y, .. } => {
                if self.in_submenu(x, y) {
                    if let (Some(parent), Some(sub)) = (self.submenu, self.submenu_item_at(x, y)) {
                        self.execute(overlay, parent, Some(sub));
                    }
                    return true;
                }
                if self.rect().contains(x, y) {
                    if let Some(i) = self.item_at(x, y) {
                        if self.items[i].has_submenu() {
                            self.submenu = Some(i);
                        } else {
                            self.execute(overlay, i, None);
                        }
                    }
                    return true;
                }
                self.close(overlay);
                true
            }
            InputEvent::PointerUp { .. } | InputEvent::Scroll { .. } => true,
            InputEvent::Key { key, .. } => {
                self.key(overlay, key);
                true
            }
        }
    }

    fn key(&mut self, overlay: &mut OverlayController, key: Key) {
        match key {
            Key::Escape => self.close(overlay),
            Key::Up | Key::Down => {
                let down = key == Key::Down;
                match self.submenu.filter(|_| self.submenu_hovered.is_some()) {
                    Some(parent) => {
                        self.submenu_hovered = next_selectable(&self.items[parent].submenu, self.submenu_hovered, down);
                    }
                    None => self.hovered = next_selectable(&self.items, self.hovered, down),
                }
            }
            Key::Right => {
                if let Some(i) = self.hovered.filter(|&i| self.items[i].has_submenu()) {
                    self.submenu = Some(i);
                    self.submenu_hovered = next_selectable(&self.items[i].submenu, None, true);
                }
            }
            Key::Left => {
                self.submenu = None;
                self.submenu_hovered = None;
            }
            Key::Enter => match (self.submenu, self.submenu_hovered, self.hovered) {
                (Some(parent), Some(sub), _) => {
                    self.execute(overlay, parent, Some(sub));
                }
                (_, None, Some(i)) => {
                    if self.items[i].has_submenu() {
                        self.submenu = Some(i);
                        self.submenu_hovered = next_selectable(&self.items[i].submenu, None, true);
                    } else {
                        self.execute(overlay, i, None);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    pub fn draw<S: Surface>(&self, canvas: &mut Canvas<S>, theme: &Theme, overlay: &OverlayController) {
        if !overlay.is_open(OverlayId::ContextMenu) {
            return;
        }
        draw_list(canvas, theme, self.rect(), &self.items, self.hovered, self.submenu);
        if let Some(parent) = self.submenu
            && let Some(rect) = self.submenu_rect(parent)
        {
            draw_list(canvas, theme, rect, &self.items[parent].submenu, self.submenu_hovered, None);
        }
    }
}

fn draw_list<S: Surface>(
    canvas: &mut Canvas<S>,
    theme: &Theme,
    rect: Rect,
    items: &[MenuItem],
    hovered: Option<usize>,
    expanded: Option<usize>,
) {
    let metrics = MenuMetrics::CONTEXT;
    canvas.fill_rounded_rect(rect.offset(2, 4), RADIUS, Color::rgba(0, 0, 0, 90));
    canvas.fill_rounded_rect(rect, RADIUS, theme.menu_background);
    canvas.stroke_rounded_rect(rect, RADIUS, theme.menu_border);

    let char_h = canvas.char_height();
    let rows = metrics.row_rects(rect.x, rect.y, items);
    for (i, (item, row)) in items.iter().zip(rows).enumerate() {
        if item.is_separator() {
            let sep_y = row.y + row.height / 2;
            canvas.draw_line(row.x + 12, sep_y, row.right() - 12, sep_y, theme.separator);
            continue;
        }
        let highlighted = hovered == Some(i) || expanded == Some(i);
        if highlighted && item.enabled {
            canvas.fill_rounded_rect(Rect::new(row.x + 4, row.y, row.width - 8, row.height), 4, theme.menu_hover);
        }
        let color = if item.enabled { theme.text } else { theme.disabled_text };
        let text_y = row.y + (row.height - char_h) / 2;
        if item.checked {
            canvas.draw_text("\u{2713}", row.x + 12, text_y, color);
        }
        canvas.draw_text(&item.label, row.x + if item.checked { 32 } else { 16 }, text_y, color);
        if !item.shortcut.is_empty() {
            canvas.draw_text(&item.shortcut, row.x + SHORTCUT_X, text_y, theme.disabled_text);
        }
        if item.has_submenu() {
            canvas.draw_text(">", row.right() - 24, text_y, color);
        }
    }
}
