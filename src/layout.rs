/// Native drawing layer underneath the surface, detected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    X11,
    Cocoa,
}

impl Platform {
    pub fn detect() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Cocoa
        } else {
            Platform::X11
        }
    }
}

/// Width and height of one monospace character cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    pub char_width: f32,
    pub char_height: f32,
}

impl FontMetrics {
    pub const WINDOWS_FALLBACK: FontMetrics = FontMetrics {
        char_width: 8.0,
        char_height: 16.0,
    };
    pub const DEFAULT: FontMetrics = FontMetrics {
        char_width: 9.6,
        char_height: 20.0,
    };

    /// Pick the cell size for a platform. Only X11 trusts the measured font;
    /// the other platforms render with a fixed cell.
    pub fn for_platform(platform: Platform, measured: Option<FontMetrics>) -> FontMetrics {
        match platform {
            Platform::Windows => FontMetrics::WINDOWS_FALLBACK,
            Platform::Cocoa => FontMetrics::DEFAULT,
            Platform::X11 => measured
                .filter(|m| m.char_width > 0.0 && m.char_height > 0.0)
                .unwrap_or(FontMetrics::DEFAULT),
        }
    }
}

/// Per-frame layout constants. Rebuilt wholesale at the start of every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub margin: i32,
    pub header_height: i32,
    pub line_height: i32,
    pub char_width: f32,
    pub char_height: f32,
    pub scrollbar_width: i32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        LayoutMetrics {
            margin: 20,
            header_height: 20,
            line_height: 20,
            char_width: 9.6,
            char_height: 20.0,
            scrollbar_width: 20,
        }
    }
}

impl LayoutMetrics {
    pub fn for_font(font: FontMetrics) -> Self {
        let line_height = font.char_height.round().max(1.0) as i32;
        LayoutMetrics {
            margin: 10,
            header_height: line_height,
            line_height,
            char_width: font.char_width,
            char_height: font.char_height,
            scrollbar_width: 16,
        }
    }

    /// Left edge of the first hex column: past the margin and the
    /// ten-character offset field.
    pub fn hex_area_x(&self, left_panel_width: i32) -> f32 {
        left_panel_width as f32 + self.margin as f32 + 10.0 * self.char_width
    }

    pub fn hex_area_y(&self, menu_bar_height: i32) -> f32 {
        (menu_bar_height + self.margin + self.header_height + 2) as f32
    }
}
