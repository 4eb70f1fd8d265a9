/// Platform-neutral input, already in window-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    PointerMove { x: i32, y: i32 },
    PointerDown { x: i32, y: i32, button: MouseButton },
    PointerUp { x: i32, y: i32, button: MouseButton },
    /// Positive `delta` scrolls down, in whole lines.
    Scroll { x: i32, y: i32, delta: i32 },
    Key { key: Key, modifiers: Modifiers },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
        alt: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Enter,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Tab,
    Char(char),
}

impl Key {
    /// Value of a hex digit key.
    pub fn hex_digit(self) -> Option<u8> {
        match self {
            Key::Char(c) => c.to_digit(16).map(|d| d as u8),
            _ => None,
        }
    }
}

impl InputEvent {
    pub fn key(key: Key) -> Self {
        InputEvent::Key {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn click(x: i32, y: i32) -> Self {
        InputEvent::PointerDown {
            x,
            y,
            button: MouseButton::Left,
        }
    }

    pub fn position(&self) -> Option<(i32, i32)> {
        match *self {
            InputEvent::PointerMove { x, y }
            | InputEvent::PointerDown { x, y, .. }
            | InputEvent::PointerUp { x, y, .. }
            | InputEvent::Scroll { x, y, .. } => Some((x, y)),
            InputEvent::Key { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_digit() {
        assert_eq!(Key::Char('a').hex_digit(), Some(10));
        assert_eq!(Key::Char('F').hex_digit(), Some(15));
        assert_eq!(Key::Char('7').hex_digit(), Some(7));
        assert_eq!(Key::Char('g').hex_digit(), None);
        assert_eq!(Key::Enter.hex_digit(), None);
    }
}
