use ratatui::style::Color;

use tally_core::Tone;

#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub accent: Color,
    pub muted: Color,
    /// Background of the focused field and the highlighted candidate.
    pub selection: Color,
    pub date: Color,
    pub payee: Color,
    pub tag: Color,
    pub amount: Color,
    pub success: Color,
    pub error: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeName {
    CatppuccinMocha,
    TokyoNight,
    Nord,
}

impl ThemeName {
    /// Parse a config string into a [`ThemeName`].  Falls back to
    /// `CatppuccinMocha` for unrecognised values.
    pub fn from_config(s: &str) -> Self {
        match s.to_lowercase().replace('_', "-").as_str() {
            "tokyo-night" | "tokyonight" => Self::TokyoNight,
            "nord" => Self::Nord,
            _ => Self::CatppuccinMocha,
        }
    }
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        match name {
            ThemeName::CatppuccinMocha => Self {
                background: Color::Rgb(30, 30, 46),
                foreground: Color::Rgb(205, 214, 244),
                accent: Color::Rgb(137, 180, 250),
                muted: Color::Rgb(108, 112, 134),
                selection: Color::Rgb(69, 71, 90),
                date: Color::Rgb(249, 226, 175),
                payee: Color::Rgb(245, 194, 231),
                tag: Color::Rgb(148, 226, 213),
                amount: Color::Rgb(250, 179, 135),
                success: Color::Rgb(166, 227, 161),
                error: Color::Rgb(243, 139, 168),
            },
            ThemeName::TokyoNight => Self {
                background: Color::Rgb(26, 27, 38),
                foreground: Color::Rgb(192, 202, 245),
                accent: Color::Rgb(122, 162, 247),
                muted: Color::Rgb(86, 95, 137),
                selection: Color::Rgb(41, 46, 66),
                date: Color::Rgb(224, 175, 104),
                payee: Color::Rgb(187, 154, 247),
                tag: Color::Rgb(125, 207, 255),
                amount: Color::Rgb(255, 158, 100),
                success: Color::Rgb(158, 206, 106),
                error: Color::Rgb(247, 118, 142),
            },
            ThemeName::Nord => Self {
                background: Color::Rgb(46, 52, 64),
                foreground: Color::Rgb(236, 239, 244),
                accent: Color::Rgb(136, 192, 208),
                muted: Color::Rgb(129, 161, 193),
                selection: Color::Rgb(67, 76, 94),
                date: Color::Rgb(235, 203, 139),
                payee: Color::Rgb(180, 142, 173),
                tag: Color::Rgb(143, 188, 187),
                amount: Color::Rgb(208, 135, 112),
                success: Color::Rgb(163, 190, 140),
                error: Color::Rgb(191, 97, 106),
            },
        }
    }

    /// Build a theme from a config string (e.g. `"tokyo-night"`).
    pub fn from_config(s: &str) -> Self {
        Self::from_name(ThemeName::from_config(s))
    }

    pub fn tone(&self, tone: Tone) -> Color {
        match tone {
            Tone::Date => self.date,
            Tone::Flag => self.accent,
            Tone::Payee => self.payee,
            Tone::Narration | Tone::Plain => self.foreground,
            Tone::Tag | Tone::Link => self.tag,
            Tone::Account => self.accent,
            Tone::Amount => self.amount,
            Tone::Placeholder => self.muted,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_name(ThemeName::CatppuccinMocha)
    }
}
