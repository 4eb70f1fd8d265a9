//! Menu and menu item tree.
//!
//! A `Menu` exclusively owns its items; a submenu item exclusively owns its
//! nested items. Trees are built once and afterwards only hover/open state
//! changes.

use std::fmt;

use crate::geometry::Rect;

pub type Callback = Box<dyn FnMut()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItemKind {
    Normal,
    Separator,
    Submenu,
}

pub struct MenuItem {
    pub label: String,
    pub shortcut: String,
    pub kind: MenuItemKind,
    pub enabled: bool,
    pub checked: bool,
    pub submenu: Vec<MenuItem>,
    callback: Option<Callback>,
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("label", &self.label)
            .field("shortcut", &self.shortcut)
            .field("kind", &self.kind)
            .field("enabled", &self.enabled)
            .field("checked", &self.checked)
            .field("submenu", &self.submenu)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

impl MenuItem {
    pub fn action(label: impl Into<String>, callback: impl FnMut() + 'static) -> Self {
        MenuItem {
            label: label.into(),
            shortcut: String::new(),
            kind: MenuItemKind::Normal,
            enabled: true,
            checked: false,
            submenu: Vec::new(),
            callback: Some(Box::new(callback)),
        }
    }

    pub fn separator() -> Self {
        MenuItem {
            label: String::new(),
            shortcut: String::new(),
            kind: MenuItemKind::Separator,
            enabled: false,
            checked: false,
            submenu: Vec::new(),
            callback: None,
        }
    }

    pub fn submenu(label: impl Into<String>, items: Vec<MenuItem>) -> Self {
        MenuItem {
            label: label.into(),
            shortcut: String::new(),
            kind: MenuItemKind::Submenu,
            enabled: true,
            checked: false,
            submenu: items,
            callback: None,
        }
    }

    pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = shortcut.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn is_separator(&self) -> bool {
        self.kind == MenuItemKind::Separator
    }

    pub fn has_submenu(&self) -> bool {
        self.kind == MenuItemKind::Submenu && !self.submenu.is_empty()
    }

    /// Run the callback of an enabled `Normal` item. Returns whether the
    /// item counts as executed.
    pub fn invoke(&mut self) -> bool {
        if self.kind != MenuItemKind::Normal || !self.enabled {
            return false;
        }
        if let Some(callback) = self.callback.as_mut() {
            callback();
        }
        true
    }
}

/// Top-level menu of the menu bar.
#[derive(Debug)]
pub struct Menu {
    pub title: String,
    pub items: Vec<MenuItem>,
    /// Header rectangle, assigned by the menu bar layout.
    pub bounds: Rect,
    pub hovered_item: Option<usize>,
}

impl Menu {
    pub fn new(title: impl Into<String>, items: Vec<MenuItem>) -> Self {
        Menu {
            title: title.into(),
            items,
            bounds: Rect::default(),
            hovered_item: None,
        }
    }

    /// Find an item by label, descending into submenus.
    pub fn find_mut(&mut self, label: &str) -> Option<&mut MenuItem> {
        find_in(&mut self.items, label)
    }
}

fn find_in<'a>(items: &'a mut [MenuItem], label: &str) -> Option<&'a mut MenuItem> {
    for item in items.iter_mut() {
        if item.label == label {
            return Some(item);
        }
        if item.kind == MenuItemKind::Submenu
            && let Some(found) = find_in(&mut item.submenu, label)
        {
            return Some(found);
        }
    }
    None
}

/// Row geometry of a floating item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuMetrics {
    pub width: i32,
    pub item_height: i32,
    pub separator_height: i32,
    pub padding: i32,
}

impl MenuMetrics {
    pub const MENU_BAR: MenuMetrics = MenuMetrics {
        width: 250,
        item_height: 32,
        separator_height: 8,
        padding: 8,
    };

    pub const CONTEXT: MenuMetrics = MenuMetrics {
        width: 220,
        item_height: 32,
        separator_height: 9,
        padding: 4,
    };

    pub fn row_height(&self, item: &MenuItem) -> i32 {
        if item.is_separator() {
            self.separator_height
        } else {
            self.item_height
        }
    }

    pub fn list_height(&self, items: &[MenuItem]) -> i32 {
        2 * self.padding + items.iter().map(|item| self.row_height(item)).sum::<i32>()
    }

    pub fn list_rect(&self, x: i32, y: i32, items: &[MenuItem]) -> Rect {
        Rect::new(x, y, self.width, self.list_height(items))
    }

    /// Full-width row rectangles of a list whose top-left is `(x, y)`.
    pub fn row_rects(&self, x: i32, y: i32, items: &[MenuItem]) -> Vec<Rect> {
        let mut row_y = y + self.padding;
        items
            .iter()
            .map(|item| {
                let h = self.row_height(item);
                let rect = Rect::new(x, row_y, self.width, h);
                row_y += h;
                rect
            })
            .collect()
    }

    /// Index of the non-separator item under a point.
    pub fn item_at(&self, x: i32, y: i32, items: &[MenuItem], px: i32, py: i32) -> Option<usize> {
        self.row_rects(x, y, items)
            .iter()
            .position(|row| row.contains(px, py))
            .filter(|&i| !items[i].is_separator())
    }
}

/// Next non-separator index moving up or down, wrapping at both ends.
/// From `None` the walk starts just outside the list.
pub fn next_selectable(items: &[MenuItem], current: Option<usize>, down: bool) -> Option<usize> {
    let n = items.len();
    if n == 0 {
        return None;
    }
    let mut index = match current {
        Some(i) => i.min(n - 1),
        None if down => n - 1,
        None => 0,
    };
    for _ in 0..n {
        index = if down { (index + 1) % n } else { (index + n - 1) % n };
        if !items[index].is_separator() {
            return Some(index);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn items() -> Vec<MenuItem> {
        vec![
            MenuItem::action("Open…", || {}).with_shortcut("Ctrl+O"),
            MenuItem::action("Save", || {}),
            MenuItem::separator(),
            MenuItem::action("Exit", || {}),
        ]
    }

    #[test]
    fn test_next_selectable_skips_separators_and_wraps() {
        let items = items();
        assert_eq!(next_selectable(&items, None, true), Some(0));
        assert_eq!(next_selectable(&items, Some(1), true), Some(3));
        assert_eq!(next_selectable(&items, Some(3), true), Some(0));
        assert_eq!(next_selectable(&items, Some(0), false), Some(3));
        assert_eq!(next_selectable(&items, Some(3), false), Some(1));
        assert_eq!(next_selectable(&items, None, false), Some(3));
        assert_eq!(next_selectable(&[MenuItem::separator()], None, true), None);
    }

    #[test]
    fn test_invoke_only_enabled_normal_items() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let mut item = MenuItem::action("Go", move || counter.set(counter.get() + 1));
        assert!(item.invoke());
        assert_eq!(hits.get(), 1);

        let counter = hits.clone();
        let mut disabled = MenuItem::action("No", move || counter.set(counter.get() + 1)).with_enabled(false);
        assert!(!disabled.invoke());
        assert!(!MenuItem::separator().invoke());
        assert!(!MenuItem::submenu("Sub", items()).invoke());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_row_geometry() {
        let items = items();
        let metrics = MenuMetrics::MENU_BAR;
        assert_eq!(metrics.list_height(&items), 8 + 32 * 3 + 8 + 8);
        let rows = metrics.row_rects(0, 24, &items);
        assert_eq!(rows[0], Rect::new(0, 32, 250, 32));
        assert_eq!(rows[2], Rect::new(0, 96, 250, 8));
        assert_eq!(rows[3], Rect::new(0, 104, 250, 32));
        assert_eq!(metrics.item_at(0, 24, &items, 10, 100), None);
        assert_eq!(metrics.item_at(0, 24, &items, 10, 110), Some(3));
    }

    #[test]
    fn test_find_descends_into_submenus() {
        let mut menu = Menu::new(
            "Search",
            vec![MenuItem::submenu("Go to", vec![MenuItem::action("End", || {})])],
        );
        assert!(menu.find_mut("End").is_some());
        assert!(menu.find_mut("Missing").is_none());
    }
}
