//! Options dialog state, created when the dialog opens and dropped when it
//! closes. Every handler takes the dialog explicitly; nothing is global.

use tracing::debug;

use crate::canvas::Canvas;
use crate::controller::{DropdownResponse, OverlayController, handle_dropdown_event};
use crate::dropdown::DropdownList;
use crate::geometry::Rect;
use crate::input::{InputEvent, Key, MouseButton};
use crate::options::{AppOptions, LANGUAGES};
use crate::surface::Surface;
use crate::theme::Theme;
use crate::widgets::{WidgetState, draw_button, draw_checkbox, draw_dropdown, draw_dropdown_list, draw_radio};

pub const DIALOG_WIDTH: i32 = 450;
pub const DIALOG_HEIGHT: i32 = 330;

const LANGUAGE_DROPDOWN: usize = 0;
const BUTTON_WIDTH: i32 = 75;
const BUTTON_HEIGHT: i32 = 25;
const TOGGLE_SIZE: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogWidget {
    DarkMode,
    AutoReload,
    EightBytes,
    SixteenBytes,
    Language,
    Ok,
    Cancel,
}

impl DialogWidget {
    const ALL: [DialogWidget; 7] = [
        DialogWidget::DarkMode,
        DialogWidget::AutoReload,
        DialogWidget::EightBytes,
        DialogWidget::SixteenBytes,
        DialogWidget::Language,
        DialogWidget::Ok,
        DialogWidget::Cancel,
    ];

    pub fn rect(self) -> Rect {
        let button_y = DIALOG_HEIGHT - 20 - BUTTON_HEIGHT;
        match self {
            DialogWidget::DarkMode => Rect::new(20, 40, TOGGLE_SIZE, TOGGLE_SIZE),
            DialogWidget::AutoReload => Rect::new(20, 75, TOGGLE_SIZE, TOGGLE_SIZE),
            DialogWidget::EightBytes => Rect::new(20, 140, TOGGLE_SIZE, TOGGLE_SIZE),
            DialogWidget::SixteenBytes => Rect::new(160, 140, TOGGLE_SIZE, TOGGLE_SIZE),
            DialogWidget::Language => Rect::new(20, 205, 200, 32),
            DialogWidget::Ok => Rect::new(
                DIALOG_WIDTH - 20 - BUTTON_WIDTH * 2 - 10,
                button_y,
                BUTTON_WIDTH,
                BUTTON_HEIGHT,
            ),
            DialogWidget::Cancel => Rect::new(DIALOG_WIDTH - 20 - BUTTON_WIDTH, button_y, BUTTON_WIDTH, BUTTON_HEIGHT),
        }
    }

    /// Clickable area: the control plus its label for toggles.
    fn hit_rect(self) -> Rect {
        let r = self.rect();
        match self {
            DialogWidget::DarkMode | DialogWidget::AutoReload => Rect::new(r.x, r.y, 220, r.height),
            DialogWidget::EightBytes | DialogWidget::SixteenBytes => Rect::new(r.x, r.y, 120, r.height),
            _ => r,
        }
    }
}

/// What the host should do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogOutcome {
    Continue,
    Accepted(AppOptions),
    Cancelled,
}

#[derive(Debug)]
pub struct OptionsDialog {
    options: AppOptions,
    languages: DropdownList,
    overlay: OverlayController,
    hovered: Option<DialogWidget>,
    pressed: Option<DialogWidget>,
}

impl OptionsDialog {
    /// Open the dialog on a working copy of `current`.
    pub fn new(current: &AppOptions) -> Self {
        let mut languages = DropdownList::new(LANGUAGES, Some(0));
        languages.select_label(&current.language);
        OptionsDialog {
            options: current.clone(),
            languages,
            overlay: OverlayController::new(),
            hovered: None,
            pressed: None,
        }
    }

    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    pub fn languages(&self) -> &DropdownList {
        &self.languages
    }

    pub fn is_language_list_open(&self) -> bool {
        self.overlay.open_dropdown() == Some(LANGUAGE_DROPDOWN)
    }

    pub fn hovered(&self) -> Option<DialogWidget> {
        self.hovered
    }

    fn widget_at(&self, x: i32, y: i32) -> Option<DialogWidget> {
        DialogWidget::ALL.into_iter().find(|w| w.hit_rect().contains(x, y))
    }

    pub fn handle_event(&mut self, event: &InputEvent) -> DialogOutcome {
        let anchor = DialogWidget::Language.rect();
        match handle_dropdown_event(
            &mut self.overlay,
            LANGUAGE_DROPDOWN,
            anchor,
            &mut self.languages,
            event,
        ) {
            DropdownResponse::Selected(_) => {
                self.options.language = self.languages.selected_label().to_string();
                debug!("language set to {}", self.options.language);
                return DialogOutcome::Continue;
            }
            DropdownResponse::Consumed => {
                self.pressed = None;
                return DialogOutcome::Continue;
            }
            DropdownResponse::Ignored => {}
        }

        match *event {
            InputEvent::PointerMove { x, y } => {
                self.hovered = self.widget_at(x, y);
                DialogOutcome::Continue
            }
            InputEvent::PointerDown {
                x,
                y,
                button: MouseButton::Left,
            } => {
                self.pressed = self.widget_at(x, y);
                DialogOutcome::Continue
            }
            InputEvent::PointerUp {
                x,
                y,
                button: MouseButton::Left,
            } => {
                let pressed = self.pressed.take();
                match pressed {
                    Some(widget) if self.widget_at(x, y) == Some(widget) => self.activate(widget),
                    _ => DialogOutcome::Continue,
                }
            }
            InputEvent::Key { key: Key::Escape, .. } => DialogOutcome::Cancelled,
            InputEvent::Key { key: Key::Enter, .. } => DialogOutcome::Accepted(self.options.clone()),
            _ => DialogOutcome::Continue,
        }
    }

    fn activate(&mut self, widget: DialogWidget) -> DialogOutcome {
        match widget {
            DialogWidget::DarkMode => self.options.dark_mode = !self.options.dark_mode,
            DialogWidget::AutoReload => self.options.auto_reload = !self.options.auto_reload,
            DialogWidget::EightBytes => self.options.bytes_per_line = 8,
            DialogWidget::SixteenBytes => self.options.bytes_per_line = 16,
            DialogWidget::Language => {}
            DialogWidget::Ok => return DialogOutcome::Accepted(self.options.clone()),
            DialogWidget::Cancel => return DialogOutcome::Cancelled,
        }
        DialogOutcome::Continue
    }

    fn state(&self, widget: DialogWidget) -> WidgetState {
        WidgetState::new(widget.rect())
            .hovered(self.hovered == Some(widget))
            .pressed(self.pressed == Some(widget))
    }

    pub fn draw<S: Surface>(&self, canvas: &mut Canvas<S>, theme: &Theme) {
        canvas.clear(theme.window_background);
        canvas.draw_text("Appearance", 20, 12, theme.header);
        draw_checkbox(
            canvas,
            &self.state(DialogWidget::DarkMode),
            theme,
            self.options.dark_mode,
            "Dark mode",
        );
        draw_checkbox(
            canvas,
            &self.state(DialogWidget::AutoReload),
            theme,
            self.options.auto_reload,
            "Reload file when changed",
        );

        canvas.draw_text("Bytes per line", 20, 112, theme.header);
        draw_radio(
            canvas,
            &self.state(DialogWidget::EightBytes),
            theme,
            self.options.bytes_per_line == 8,
            "8",
        );
        draw_radio(
            canvas,
            &self.state(DialogWidget::SixteenBytes),
            theme,
            self.options.bytes_per_line == 16,
            "16",
        );

        canvas.draw_text("Language", 20, 177, theme.header);
        let open = self.is_language_list_open();
        draw_dropdown(
            canvas,
            &self.state(DialogWidget::Language),
            theme,
            &self.languages,
            open,
        );

        draw_button(canvas, &self.state(DialogWidget::Ok), theme, "OK");
        draw_button(canvas, &self.state(DialogWidget::Cancel), theme, "Cancel");

        if open {
            draw_dropdown_list(canvas, DialogWidget::Language.rect(), theme, &self.languages);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click(dialog: &mut OptionsDialog, widget: DialogWidget) -> DialogOutcome {
        let r = widget.rect();
        let (x, y) = (r.x + 2, r.y + 2);
        dialog.handle_event(&InputEvent::click(x, y));
        dialog.handle_event(&InputEvent::PointerUp {
            x,
            y,
            button: MouseButton::Left,
        })
    }

    #[test]
    fn test_toggles_edit_working_copy_only() {
        let current = AppOptions::default();
        let mut dialog = OptionsDialog::new(&current);
        assert_eq!(click(&mut dialog, DialogWidget::DarkMode), DialogOutcome::Continue);
        assert_eq!(click(&mut dialog, DialogWidget::EightBytes), DialogOutcome::Continue);
        assert!(!dialog.options().dark_mode);
        assert_eq!(dialog.options().bytes_per_line, 8);
        assert!(current.dark_mode);

        match click(&mut dialog, DialogWidget::Ok) {
            DialogOutcome::Accepted(options) => {
                assert!(!options.dark_mode);
                assert_eq!(options.bytes_per_line, 8);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn test_cancel_and_escape() {
        let mut dialog = OptionsDialog::new(&AppOptions::default());
        assert_eq!(click(&mut dialog, DialogWidget::Cancel), DialogOutcome::Cancelled);
        assert_eq!(
            dialog.handle_event(&InputEvent::key(Key::Escape)),
            DialogOutcome::Cancelled
        );
    }

    #[test]
    fn test_release_outside_pressed_widget_does_nothing() {
        let mut dialog = OptionsDialog::new(&AppOptions::default());
        let r = DialogWidget::AutoReload.rect();
        dialog.handle_event(&InputEvent::click(r.x + 1, r.y + 1));
        let outcome = dialog.handle_event(&InputEvent::PointerUp {
            x: 400,
            y: 10,
            button: MouseButton::Left,
        });
        assert_eq!(outcome, DialogOutcome::Continue);
        assert!(dialog.options().auto_reload);
    }

    #[test]
    fn test_language_dropdown() {
        let mut dialog = OptionsDialog::new(&AppOptions::default());
        assert_eq!(dialog.languages().len(), 22);
        assert_eq!(dialog.languages().selected_label(), "English");

        let anchor = DialogWidget::Language.rect();
        dialog.handle_event(&InputEvent::click(anchor.x + 5, anchor.y + 5));
        assert!(dialog.is_language_list_open());

        // Escape closes only the list while it is open
        assert_eq!(
            dialog.handle_event(&InputEvent::key(Key::Escape)),
            DialogOutcome::Continue
        );
        assert!(!dialog.is_language_list_open());

        dialog.handle_event(&InputEvent::click(anchor.x + 5, anchor.y + 5));
        let row = dialog.languages().row_rect(anchor, 1);
        dialog.handle_event(&InputEvent::click(row.x + 5, row.y + 5));
        assert!(!dialog.is_language_list_open());
        assert_eq!(dialog.options().language, "Spanish");
    }

    #[test]
    fn test_language_list_starts_on_current_language() {
        let current = AppOptions {
            language: "German".to_string(),
            ..AppOptions::default()
        };
        let dialog = OptionsDialog::new(&current);
        assert_eq!(dialog.languages().selected(), Some(3));
        assert_eq!(dialog.languages().selected_label(), "German");
    }

    #[test]
    fn test_draws_buttons() {
        use crate::surface::{DrawCommand, RecordingSurface};

        let mut canvas = Canvas::new(RecordingSurface::new());
        assert!(canvas.initialize(DIALOG_WIDTH, DIALOG_HEIGHT));
        canvas.begin_frame();
        OptionsDialog::new(&AppOptions::default()).draw(&mut canvas, &Theme::dark());
        canvas.end_frame();
        let frame = canvas.surface().last_frame().unwrap_or_default();
        let texts: Vec<&str> = frame
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text(_, _, text, _) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        for label in ["Dark mode", "8", "16", "English", "OK", "Cancel"] {
            assert!(texts.contains(&label), "missing {label}");
        }
    }
}
