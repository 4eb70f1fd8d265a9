use tracing::debug;

use crate::geometry::Rect;

/// Rows shown at once in an open dropdown list.
pub const VISIBLE_ROWS: usize = 3;
pub const ITEM_HEIGHT: i32 = 32;
/// Gap between the closed control and the floating list.
pub const LIST_GAP: i32 = 4;

/// Items and scroll/hover/selection state of a combo-box.
///
/// `scroll_offset` always lies in `[0, max_scroll()]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownList {
    items: Vec<String>,
    selected: Option<usize>,
    scroll_offset: usize,
    hovered: Option<usize>,
}

impl DropdownList {
    pub fn new<I, S>(items: I, selected: Option<usize>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        let selected = selected.filter(|&i| i < items.len());
        DropdownList {
            items,
            selected,
            scroll_offset: 0,
            hovered: None,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_label(&self) -> &str {
        self.selected
            .and_then(|i| self.items.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn max_scroll(&self) -> usize {
        self.items.len().saturating_sub(VISIBLE_ROWS)
    }

    pub fn visible_count(&self) -> usize {
        self.items.len().min(VISIBLE_ROWS)
    }

    /// Scroll by whole rows; positive moves down. The result is clamped.
    pub fn scroll_by(&mut self, delta: i32) {
        let target = self.scroll_offset as i64 + delta as i64;
        self.scroll_offset = target.clamp(0, self.max_scroll() as i64) as usize;
    }

    /// Called when the list closes.
    pub fn reset_scroll(&mut self) {
        self.scroll_offset = 0;
        self.hovered = None;
    }

    /// Scroll just enough to show the selected row.
    pub fn reveal_selected(&mut self) {
        if let Some(selected) = self.selected {
            if selected < self.scroll_offset {
                self.scroll_offset = selected;
            } else if selected >= self.scroll_offset + VISIBLE_ROWS {
                self.scroll_offset = selected + 1 - VISIBLE_ROWS;
            }
            self.scroll_offset = self.scroll_offset.min(self.max_scroll());
        }
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        debug!("dropdown selected {:?}", self.items[index]);
        self.selected = Some(index);
        true
    }

    pub fn select_label(&mut self, label: &str) -> bool {
        match self.items.iter().position(|item| item == label) {
            Some(index) => self.select(index),
            None => false,
        }
    }

    /// Floating list rectangle below `anchor`, the closed control.
    pub fn list_rect(&self, anchor: Rect) -> Rect {
        Rect::new(
            anchor.x,
            anchor.bottom() + LIST_GAP,
            anchor.width,
            self.visible_count() as i32 * ITEM_HEIGHT + 8,
        )
    }

    /// Row rectangle for visible slot `slot` (0-based from the top of the list).
    pub fn row_rect(&self, anchor: Rect, slot: usize) -> Rect {
        let list = self.list_rect(anchor);
        Rect::new(
            anchor.x + 4,
            list.y + slot as i32 * ITEM_HEIGHT + 4,
            anchor.width - 8,
            ITEM_HEIGHT - 4,
        )
    }

    /// Item under a point of the open list.
    pub fn item_at(&self, anchor: Rect, x: i32, y: i32) -> Option<usize> {
        let list = self.list_rect(anchor);
        if !list.contains(x, y) {
            return None;
        }
        (0..self.visible_count())
            .find(|&slot| self.row_rect(anchor, slot).contains(x, y))
            .map(|slot| slot + self.scroll_offset)
            .filter(|&i| i < self.items.len())
    }

    pub fn hover_at(&mut self, anchor: Rect, x: i32, y: i32) -> bool {
        let hovered = self.item_at(anchor, x, y);
        let changed = hovered != self.hovered;
        self.hovered = hovered;
        changed
    }

    /// Move the hover by one row, wrapping at both ends, and keep it in view.
    pub fn move_hover(&mut self, down: bool) {
        let n = self.items.len();
        if n == 0 {
            return;
        }
        let current = self.hovered.or(self.selected);
        let next = match (current, down) {
            (None, true) => 0,
            (None, false) => n - 1,
            (Some(i), true) => (i + 1) % n,
            (Some(i), false) => (i + n - 1) % n,
        };
        self.hovered = Some(next);
        if next < self.scroll_offset {
            self.scroll_offset = next;
        } else if next >= self.scroll_offset + VISIBLE_ROWS {
            self.scroll_offset = next + 1 - VISIBLE_ROWS;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn languages() -> DropdownList {
        DropdownList::new(["English", "Spanish", "French", "German", "Japanese"], Some(0))
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut list = languages();
        list.scroll_by(-1);
        assert_eq!(list.scroll_offset(), 0);
        list.scroll_by(10);
        assert_eq!(list.scroll_offset(), 2);
        list.scroll_by(-1);
        assert_eq!(list.scroll_offset(), 1);
    }

    #[test]
    fn test_short_list_never_scrolls() {
        let mut list = DropdownList::new(["a", "b"], None);
        list.scroll_by(3);
        assert_eq!(list.scroll_offset(), 0);
        assert_eq!(list.max_scroll(), 0);
    }

    #[test]
    fn test_item_at_accounts_for_scroll() {
        let mut list = languages();
        let anchor = Rect::new(10, 10, 200, 30);
        // list starts at y = 44, first row at y = 48
        assert_eq!(list.item_at(anchor, 50, 50), Some(0));
        list.scroll_by(2);
        assert_eq!(list.item_at(anchor, 50, 50), Some(2));
        assert_eq!(list.item_at(anchor, 50, 48 + 2 * 32 + 5), Some(4));
        assert_eq!(list.item_at(anchor, 50, 20), None);
    }

    #[test]
    fn test_reveal_selected_and_reset() {
        let mut list = languages();
        list.select(4);
        list.reveal_selected();
        assert_eq!(list.scroll_offset(), 2);
        list.reset_scroll();
        assert_eq!(list.scroll_offset(), 0);
    }

    #[test]
    fn test_move_hover_wraps_and_scrolls() {
        let mut list = languages();
        list.move_hover(false);
        assert_eq!(list.hovered(), Some(4));
        assert_eq!(list.scroll_offset(), 2);
        list.move_hover(true);
        assert_eq!(list.hovered(), Some(0));
        assert_eq!(list.scroll_offset(), 0);
    }

    #[test]
    fn test_select_out_of_range() {
        let mut list = languages();
        assert!(!list.select(5));
        assert_eq!(list.selected_label(), "English");
        assert!(list.select_label("German"));
        assert_eq!(list.selected(), Some(3));
    }
}
