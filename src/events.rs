// Translation of FLTK events into the platform-neutral input model

use fltk::app::{self, MouseWheel};
use fltk::enums::{Event, Key as FltkKey};
use hexview::input::{InputEvent, Key, Modifiers, MouseButton};

fn modifiers() -> Modifiers {
    Modifiers {
        shift: app::is_event_shift(),
        // Cmd on macOS, Ctrl elsewhere
        ctrl: app::is_event_command(),
        alt: app::is_event_alt(),
    }
}

fn button() -> MouseButton {
    match app::event_mouse_button() {
        app::MouseButton::Right => MouseButton::Right,
        app::MouseButton::Middle => MouseButton::Middle,
        _ => MouseButton::Left,
    }
}

fn key(key: FltkKey) -> Option<Key> {
    let mapped = match key {
        FltkKey::Escape => Key::Escape,
        FltkKey::Enter | FltkKey::KPEnter => Key::Enter,
        FltkKey::Up => Key::Up,
        FltkKey::Down => Key::Down,
        FltkKey::Left => Key::Left,
        FltkKey::Right => Key::Right,
        FltkKey::PageUp => Key::PageUp,
        FltkKey::PageDown => Key::PageDown,
        FltkKey::Home => Key::Home,
        FltkKey::End => Key::End,
        FltkKey::Tab => Key::Tab,
        other => Key::Char(other.to_char()?),
    };
    Some(mapped)
}

pub fn translate(event: Event) -> Option<InputEvent> {
    let (x, y) = (app::event_x(), app::event_y());
    match event {
        Event::Move | Event::Drag => Some(InputEvent::PointerMove { x, y }),
        Event::Push => Some(InputEvent::PointerDown { x, y, button: button() }),
        Event::Released => Some(InputEvent::PointerUp { x, y, button: button() }),
        Event::MouseWheel => {
            let delta = match app::event_dy() {
                MouseWheel::Down => 1,
                MouseWheel::Up => -1,
                _ => return None,
            };
            Some(InputEvent::Scroll { x, y, delta })
        }
        Event::KeyDown | Event::Shortcut => key(app::event_key()).map(|key| InputEvent::Key {
            key,
            modifiers: modifiers(),
        }),
        _ => None,
    }
}
