/// RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color { r, g, b, a }
    }

    pub const fn gray(level: u8) -> Self {
        Color::rgb(level, level, level)
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Color { a, ..self }
    }

    /// Multiply alpha by `factor`, saturating at 255.
    pub fn scale_alpha(self, factor: f32) -> Self {
        let a = (self.a as f32 * factor).min(255.0) as u8;
        self.with_alpha(a)
    }

    /// Add `amount` to each RGB channel, saturating. Alpha becomes opaque.
    pub fn brighten(self, amount: u8) -> Self {
        Color::rgb(
            self.r.saturating_add(amount),
            self.g.saturating_add(amount),
            self.b.saturating_add(amount),
        )
    }

    /// Packed as 0xRRGGBBAA.
    pub fn to_rgba_u32(self) -> u32 {
        ((self.r as u32) << 24) | ((self.g as u32) << 16) | ((self.b as u32) << 8) | self.a as u32
    }

    /// Composite `self` over an opaque `backdrop` using the alpha channel.
    pub fn blend_over(self, backdrop: Color) -> Color {
        let weight = self.a as f32 / 255.0;
        let mix = |fg: u8, bg: u8| (bg as f32 * (1.0 - weight) + fg as f32 * weight).round() as u8;
        Color::rgb(
            mix(self.r, backdrop.r),
            mix(self.g, backdrop.g),
            mix(self.b, backdrop.b),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeKind {
    Dark,
    Light,
}

/// Fixed bundle of named colors. Selected wholesale per frame, never edited field by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub kind: ThemeKind,

    pub window_background: Color,
    pub text: Color,
    pub header: Color,
    pub separator: Color,
    pub scrollbar_bg: Color,
    pub scrollbar_thumb: Color,
    pub disassembly: Color,

    pub button_normal: Color,
    pub button_hover: Color,
    pub button_pressed: Color,
    pub button_text: Color,
    pub button_disabled: Color,

    pub control_border: Color,
    pub control_background: Color,
    pub control_check: Color,

    pub dropdown_background: Color,
    pub menu_background: Color,
    pub menu_hover: Color,
    pub menu_border: Color,
    pub disabled_text: Color,
}

impl Theme {
    pub fn for_mode(dark_mode: bool) -> Self {
        if dark_mode { Theme::dark() } else { Theme::light() }
    }

    pub fn dark() -> Self {
        Theme {
            kind: ThemeKind::Dark,
            window_background: Color::rgb(32, 32, 32),
            text: Color::rgb(255, 255, 255),
            header: Color::rgb(118, 185, 237),
            separator: Color::rgba(255, 255, 255, 20),
            scrollbar_bg: Color::rgba(45, 45, 45, 100),
            scrollbar_thumb: Color::rgba(90, 90, 90, 180),
            disassembly: Color::rgb(144, 238, 144),

            button_normal: Color::rgba(255, 255, 255, 15),
            button_hover: Color::rgba(255, 255, 255, 25),
            button_pressed: Color::rgba(255, 255, 255, 10),
            button_text: Color::rgb(255, 255, 255),
            button_disabled: Color::rgba(255, 255, 255, 8),

            control_border: Color::rgba(255, 255, 255, 30),
            control_background: Color::rgba(50, 50, 50, 200),
            control_check: Color::rgb(96, 150, 227),

            dropdown_background: Color::rgb(44, 44, 44),
            menu_background: Color::rgba(44, 44, 44, 245),
            menu_hover: Color::rgb(60, 60, 60),
            menu_border: Color::rgba(255, 255, 255, 15),
            disabled_text: Color::rgba(255, 255, 255, 80),
        }
    }

    pub fn light() -> Self {
        Theme {
            kind: ThemeKind::Light,
            window_background: Color::rgb(243, 243, 243),
            text: Color::rgb(0, 0, 0),
            header: Color::rgb(0, 95, 184),
            separator: Color::rgba(0, 0, 0, 15),
            scrollbar_bg: Color::rgba(240, 240, 240, 150),
            scrollbar_thumb: Color::rgba(150, 150, 150, 180),
            disassembly: Color::rgb(16, 124, 16),

            button_normal: Color::rgba(0, 0, 0, 8),
            button_hover: Color::rgba(0, 0, 0, 12),
            button_pressed: Color::rgba(0, 0, 0, 6),
            button_text: Color::rgb(0, 0, 0),
            button_disabled: Color::rgba(0, 0, 0, 5),

            control_border: Color::rgba(0, 0, 0, 20),
            control_background: Color::rgba(255, 255, 255, 230),
            control_check: Color::rgb(0, 95, 184),

            dropdown_background: Color::rgb(249, 249, 249),
            menu_background: Color::rgba(249, 249, 249, 250),
            menu_hover: Color::rgba(0, 0, 0, 10),
            menu_border: Color::rgba(0, 0, 0, 15),
            disabled_text: Color::rgba(0, 0, 0, 90),
        }
    }
}
