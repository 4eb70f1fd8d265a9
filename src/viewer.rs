//! The hex viewer window contents: menu bar, grid, scrollbar and context
//! menu, all sharing one overlay slot.

use tracing::{debug, info};

use crate::canvas::Canvas;
use crate::command::{Command, CommandQueue};
use crate::context_menu::{ContextMenu, hex_context_items};
use crate::controller::{MENU_BAR_HEIGHT, MenuBar, OverlayController, OverlayId};
use crate::coords::Nibble;
use crate::geometry::Rect;
use crate::hex_grid::{GridFrame, GridGeometry, Selection, draw_hex_grid, total_lines};
use crate::input::{InputEvent, Key, Modifiers, MouseButton};
use crate::layout::LayoutMetrics;
use crate::menu::{Menu, MenuItem};
use crate::options::AppOptions;
use crate::responsive_scrollbar::ResponsiveScrollbar;
use crate::source::{ByteSource, Disassembler, DocumentError, HexDocument, NullDisassembler};
use crate::surface::Surface;
use crate::theme::Theme;

/// Lines scrolled per wheel notch.
const WHEEL_LINES: i64 = 3;

const DARK_MODE_LABEL: &str = "Dark mode";
const EIGHT_BYTES_LABEL: &str = "8 bytes/line";
const SIXTEEN_BYTES_LABEL: &str = "16 bytes/line";

/// Menu bar contents. Every item only enqueues a command.
pub fn app_menus(queue: &CommandQueue, options: &AppOptions) -> Vec<Menu> {
    vec![
        Menu::new(
            "File",
            vec![
                MenuItem::action("Open...", queue.sender(Command::OpenFile)).with_shortcut("Ctrl+O"),
                MenuItem::action("Save", queue.sender(Command::Save)).with_shortcut("Ctrl+S"),
                MenuItem::separator(),
                MenuItem::action("Exit", queue.sender(Command::Exit)),
            ],
        ),
        Menu::new(
            "Edit",
            vec![
                MenuItem::action("Copy offset", queue.sender(Command::CopyOffset)).with_shortcut("Ctrl+Shift+C"),
                MenuItem::action("Copy hex", queue.sender(Command::CopyHex)).with_shortcut("Ctrl+C"),
                MenuItem::action("Select all", queue.sender(Command::SelectAll)).with_shortcut("Ctrl+A"),
            ],
        ),
        Menu::new(
            "Search",
            vec![
                MenuItem::action("Go to start", queue.sender(Command::GoToStart)).with_shortcut("Ctrl+Home"),
                MenuItem::action("Go to end", queue.sender(Command::GoToEnd)).with_shortcut("Ctrl+End"),
            ],
        ),
        Menu::new(
            "View",
            vec![
                MenuItem::action(DARK_MODE_LABEL, queue.sender(Command::ToggleDarkMode))
                    .with_checked(options.dark_mode),
                MenuItem::separator(),
                MenuItem::action(EIGHT_BYTES_LABEL, queue.sender(Command::SetBytesPerLine(8)))
                    .with_checked(options.bytes_per_line == 8),
                MenuItem::action(SIXTEEN_BYTES_LABEL, queue.sender(Command::SetBytesPerLine(16)))
                    .with_checked(options.bytes_per_line == 16),
                MenuItem::separator(),
                MenuItem::action("Options...", queue.sender(Command::ShowOptions)),
            ],
        ),
        Menu::new("Help", vec![MenuItem::action("About", queue.sender(Command::About))]),
    ]
}

pub struct HexViewer {
    menu_bar: MenuBar,
    context_menu: ContextMenu,
    overlay: OverlayController,
    scrollbar: ResponsiveScrollbar,
    document: HexDocument,
    disassembler: Box<dyn Disassembler>,
    options: AppOptions,
    queue: CommandQueue,
    layout: LayoutMetrics,
    width: i32,
    height: i32,
    caret: u64,
    nibble: Nibble,
    selection: Option<Selection>,
    scroll_line: u64,
    selecting: bool,
}

impl HexViewer {
    pub fn new(document: HexDocument, options: AppOptions) -> Self {
        let queue = CommandQueue::new();
        let menu_bar = MenuBar::new(app_menus(&queue, &options));
        let context_menu = ContextMenu::new(hex_context_items(&queue, !document.is_empty()));
        HexViewer {
            menu_bar,
            context_menu,
            overlay: OverlayController::new(),
            scrollbar: ResponsiveScrollbar::new(),
            document,
            disassembler: Box::new(NullDisassembler),
            options,
            queue,
            layout: LayoutMetrics::default(),
            width: 0,
            height: 0,
            caret: 0,
            nibble: Nibble::High,
            selection: None,
            scroll_line: 0,
            selecting: false,
        }
    }

    pub fn with_disassembler(mut self, disassembler: Box<dyn Disassembler>) -> Self {
        self.disassembler = disassembler;
        self
    }

    pub fn document(&self) -> &HexDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut HexDocument {
        &mut self.document
    }

    /// Replace the document and reset caret, selection and scroll.
    pub fn set_document(&mut self, document: HexDocument) {
        self.document = document;
        self.caret = 0;
        self.nibble = Nibble::High;
        self.selection = None;
        self.scroll_line = 0;
        self.refresh_context_items();
    }

    /// Re-read the document from disk, keeping the caret where possible.
    pub fn reload(&mut self) -> Result<(), DocumentError> {
        self.document.reload()?;
        let (caret, nibble) = (self.caret, self.nibble);
        self.selection = None;
        self.clamp_scroll();
        self.move_caret(caret, nibble, false);
        self.refresh_context_items();
        Ok(())
    }

    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: AppOptions) {
        let caret = self.caret;
        self.options = options;
        for menu in self.menu_bar.menus_mut() {
            if let Some(item) = menu.find_mut(DARK_MODE_LABEL) {
                item.checked = self.options.dark_mode;
            }
            if let Some(item) = menu.find_mut(EIGHT_BYTES_LABEL) {
                item.checked = self.options.bytes_per_line == 8;
            }
            if let Some(item) = menu.find_mut(SIXTEEN_BYTES_LABEL) {
                item.checked = self.options.bytes_per_line == 16;
            }
        }
        self.clamp_scroll();
        self.reveal(caret);
    }

    pub fn theme(&self) -> Theme {
        Theme::for_mode(self.options.dark_mode)
    }

    pub fn overlay(&self) -> &OverlayController {
        &self.overlay
    }

    pub fn menu_bar(&self) -> &MenuBar {
        &self.menu_bar
    }

    pub fn context_menu(&self) -> &ContextMenu {
        &self.context_menu
    }

    pub fn caret(&self) -> (u64, Nibble) {
        (self.caret, self.nibble)
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn scroll_line(&self) -> u64 {
        self.scroll_line
    }

    pub fn bytes_per_line(&self) -> usize {
        self.options.bytes_per_line
    }

    /// Window size and font-derived metrics; called on resize and before
    /// every frame.
    pub fn set_viewport(&mut self, width: i32, height: i32, layout: LayoutMetrics) {
        self.width = width;
        self.height = height;
        self.layout = layout;
        self.menu_bar
            .layout(Rect::new(0, 0, width, MENU_BAR_HEIGHT), layout.char_width);
        self.clamp_scroll();
        self.sync_scrollbar();
    }

    pub fn geometry(&self) -> GridGeometry {
        GridGeometry::compute(&self.layout, self.width, self.height, 0, MENU_BAR_HEIGHT)
    }

    fn total_lines(&self) -> u64 {
        total_lines(self.document.len(), self.bytes_per_line())
    }

    pub fn max_scroll_line(&self) -> u64 {
        self.total_lines()
            .saturating_sub(self.geometry().visible_lines as u64)
    }

    pub fn set_scroll_line(&mut self, line: u64) {
        self.scroll_line = line.min(self.max_scroll_line());
        self.sync_scrollbar();
    }

    fn scroll_by(&mut self, lines: i64) {
        let target = if lines < 0 {
            self.scroll_line.saturating_sub(lines.unsigned_abs())
        } else {
            self.scroll_line.saturating_add(lines as u64)
        };
        self.set_scroll_line(target);
    }

    fn clamp_scroll(&mut self) {
        self.scroll_line = self.scroll_line.min(self.max_scroll_line());
    }

    fn sync_scrollbar(&mut self) {
        let g = self.geometry();
        self.scrollbar
            .update_metrics(g.scrollbar_area, self.total_lines() as f32, g.visible_lines as f32);
        let max = self.max_scroll_line();
        let position = if max == 0 { 0.0 } else { self.scroll_line as f32 / max as f32 };
        self.scrollbar.set_position(position);
    }

    /// Scroll just enough to show the line holding `offset`.
    fn reveal(&mut self, offset: u64) {
        let bpl = self.bytes_per_line() as u64;
        let line = offset / bpl;
        let visible = (self.geometry().visible_lines as u64).max(1);
        if line < self.scroll_line {
            self.set_scroll_line(line);
        } else if line >= self.scroll_line + visible {
            self.set_scroll_line(line + 1 - visible);
        }
    }

    fn last_offset(&self) -> u64 {
        self.document.len().saturating_sub(1)
    }

    /// Move the caret, clamped to the data. `extend` grows the selection
    /// from the previous caret instead of clearing it.
    pub fn move_caret(&mut self, offset: u64, nibble: Nibble, extend: bool) {
        let previous = self.caret;
        self.caret = offset.min(self.last_offset());
        self.nibble = nibble;
        self.selection = if extend && !self.document.is_empty() {
            let anchor = self.selection.map_or(previous, |s| s.anchor);
            Some(Selection::new(anchor, self.caret))
        } else {
            None
        };
        self.reveal(self.caret);
    }

    pub fn select_all(&mut self) {
        if self.document.is_empty() {
            return;
        }
        self.selection = Some(Selection::new(0, self.last_offset()));
    }

    /// Replace the nibble under the caret and advance by one nibble.
    pub fn type_hex_digit(&mut self, digit: u8) -> bool {
        let Some(current) = self.document.byte_at(self.caret) else {
            return false;
        };
        let value = match self.nibble {
            Nibble::High => (digit << 4) | (current & 0x0F),
            Nibble::Low => (current & 0xF0) | (digit & 0x0F),
        };
        self.document.edit_byte(self.caret, value);
        match self.nibble {
            Nibble::High => self.nibble = Nibble::Low,
            Nibble::Low if self.caret < self.last_offset() => {
                self.move_caret(self.caret + 1, Nibble::High, false);
            }
            Nibble::Low => {}
        }
        true
    }

    /// Caret offset as eight hex digits, or the selection start.
    pub fn copy_offset_text(&self) -> String {
        let offset = self.selection.map_or(self.caret, |s| s.start());
        format!("{:08X}", offset)
    }

    /// Selected bytes (or the byte under the caret) as spaced hex pairs.
    pub fn copy_hex_text(&self) -> String {
        let (start, end) = match self.selection {
            Some(s) => (s.start(), s.end()),
            None => (self.caret, self.caret),
        };
        let len = (end - start + 1) as usize;
        self.document
            .read(start, len)
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn refresh_context_items(&mut self) {
        let has_data = !self.document.is_empty();
        for item in self.context_menu.items_mut() {
            if item.label.starts_with("Copy") {
                item.enabled = has_data;
            }
        }
    }

    /// Feed one event. Returns the commands the host has to carry out
    /// (file dialogs, clipboard, persistence, exit).
    pub fn handle_event(&mut self, event: &InputEvent) -> Vec<Command> {
        self.dispatch(event);
        self.take_commands()
    }

    fn dispatch(&mut self, event: &InputEvent) {
        // a header click switches from the context menu straight to that menu
        if self.overlay.is_open(OverlayId::ContextMenu)
            && let InputEvent::PointerDown {
                x,
                y,
                button: MouseButton::Left,
            } = *event
            && self.menu_bar.header_at(x, y).is_some()
        {
            self.context_menu.reset();
            self.menu_bar.handle_event(&mut self.overlay, event);
            return;
        }
        if self.context_menu.handle_event(&mut self.overlay, event) {
            return;
        }
        if self.menu_bar.handle_event(&mut self.overlay, event) {
            return;
        }
        let (consumed, position) = self.scrollbar.handle_event(event);
        if let Some(position) = position {
            let line = (position * self.max_scroll_line() as f32).round() as u64;
            self.scroll_line = line.min(self.max_scroll_line());
        }
        if consumed {
            return;
        }

        match *event {
            InputEvent::PointerDown { x, y, button } => self.pointer_down(x, y, button),
            InputEvent::PointerMove { x, y } if self.selecting => {
                if let Some((offset, nibble)) = self.hit(x, y) {
                    self.move_caret(offset, nibble, true);
                }
            }
            InputEvent::PointerUp { .. } => self.selecting = false,
            InputEvent::Scroll { delta, .. } => self.scroll_by(delta as i64 * WHEEL_LINES),
            InputEvent::Key { key, modifiers } => self.key(key, modifiers),
            _ => {}
        }
    }

    fn hit(&self, x: i32, y: i32) -> Option<(u64, Nibble)> {
        let g = self.geometry();
        let bpl = self.bytes_per_line();
        g.mapper(&self.layout, bpl, self.scroll_line * bpl as u64)
            .hit_test(x as f64, y as f64, g.visible_lines, self.document.len())
    }

    fn pointer_down(&mut self, x: i32, y: i32, button: MouseButton) {
        let hit = self.hit(x, y);
        match button {
            MouseButton::Left => {
                if let Some((offset, nibble)) = hit {
                    self.move_caret(offset, nibble, false);
                    self.selecting = true;
                }
            }
            MouseButton::Right => {
                if let Some((offset, nibble)) = hit
                    && !self.selection.is_some_and(|s| s.contains(offset))
                {
                    self.move_caret(offset, nibble, false);
                }
                self.refresh_context_items();
                let window = Rect::new(0, 0, self.width, self.height);
                self.context_menu.open_at(&mut self.overlay, x, y, window);
            }
            MouseButton::Middle => {}
        }
    }

    fn key(&mut self, key: Key, modifiers: Modifiers) {
        if modifiers.ctrl {
            let command = match key {
                Key::Char('c' | 'C') if modifiers.shift => Some(Command::CopyOffset),
                Key::Char('c' | 'C') => Some(Command::CopyHex),
                Key::Char('a' | 'A') => Some(Command::SelectAll),
                Key::Char('o' | 'O') => Some(Command::OpenFile),
                Key::Char('s' | 'S') => Some(Command::Save),
                Key::Home => Some(Command::GoToStart),
                Key::End => Some(Command::GoToEnd),
                _ => None,
            };
            if let Some(command) = command {
                self.queue.push(command);
            }
            return;
        }
        if self.document.is_empty() {
            return;
        }

        let bpl = self.bytes_per_line() as u64;
        let page = self.geometry().visible_lines.max(1) as u64 * bpl;
        let extend = modifiers.shift;
        let (caret, nibble) = (self.caret, self.nibble);
        match key {
            Key::Left => match nibble {
                Nibble::Low => self.move_caret(caret, Nibble::High, extend),
                Nibble::High if caret > 0 => self.move_caret(caret - 1, Nibble::Low, extend),
                Nibble::High => {}
            },
            Key::Right => match nibble {
                Nibble::High => self.move_caret(caret, Nibble::Low, extend),
                Nibble::Low if caret < self.last_offset() => self.move_caret(caret + 1, Nibble::High, extend),
                Nibble::Low => {}
            },
            Key::Up if caret >= bpl => self.move_caret(caret - bpl, nibble, extend),
            Key::Down if caret + bpl <= self.last_offset() => self.move_caret(caret + bpl, nibble, extend),
            Key::PageUp => self.move_caret(caret.saturating_sub(page), nibble, extend),
            Key::PageDown => self.move_caret(caret.saturating_add(page), nibble, extend),
            Key::Home => self.move_caret(caret - caret % bpl, Nibble::High, extend),
            Key::End => self.move_caret(caret - caret % bpl + bpl - 1, Nibble::Low, extend),
            Key::Escape => self.selection = None,
            other => {
                if let Some(digit) = other.hex_digit() {
                    self.type_hex_digit(digit);
                }
            }
        }
    }

    /// Apply view-local commands and hand the rest to the host. Option
    /// changes are applied here and also passed on so the host can persist
    /// them.
    fn take_commands(&mut self) -> Vec<Command> {
        let mut host = Vec::new();
        for command in self.queue.drain() {
            debug!("command {:?}", command);
            match command {
                Command::SelectAll => self.select_all(),
                Command::GoToStart => self.move_caret(0, Nibble::High, false),
                Command::GoToEnd => self.move_caret(self.last_offset(), Nibble::High, false),
                Command::ToggleDarkMode => {
                    let mut options = self.options.clone();
                    options.dark_mode = !options.dark_mode;
                    self.set_options(options);
                    host.push(command);
                }
                Command::SetBytesPerLine(bpl) => {
                    let mut options = self.options.clone();
                    options.bytes_per_line = bpl;
                    self.set_options(options.normalized());
                    host.push(command);
                }
                other => host.push(other),
            }
        }
        host
    }

    /// Draw one frame. Returns false when the canvas is not ready.
    pub fn render<S: Surface>(&mut self, canvas: &mut Canvas<S>) -> bool {
        if !canvas.begin_frame() {
            return false;
        }
        let (width, height) = canvas.size();
        self.set_viewport(width, height, canvas.layout());
        self.draw(canvas);
        canvas.end_frame();
        true
    }

    fn draw<S: Surface>(&self, canvas: &mut Canvas<S>) {
        let theme = self.theme();
        canvas.clear(theme.window_background);

        let frame = GridFrame {
            source: &self.document,
            disassembler: self.disassembler.as_ref(),
            theme: &theme,
            layout: self.layout,
            geometry: self.geometry(),
            bytes_per_line: self.bytes_per_line(),
            scroll_line: self.scroll_line,
            caret: Some((self.caret, self.nibble)),
            selection: self.selection,
        };
        draw_hex_grid(canvas, &frame);
        self.scrollbar.draw(canvas, &theme);

        self.menu_bar.draw_bar(canvas, &theme, &self.overlay);
        self.menu_bar.draw_overlay(canvas, &theme, &self.overlay);
        self.context_menu.draw(canvas, &theme, &self.overlay);
    }

    /// Close whatever overlay is open, e.g. when the window loses focus.
    pub fn close_overlays(&mut self) {
        if self.overlay.is_open(OverlayId::ContextMenu) {
            self.context_menu.close(&mut self.overlay);
        } else if self.overlay.is_any_open() {
            info!("closing overlay {:?}", self.overlay.state());
            self.overlay.close();
        }
    }
}
