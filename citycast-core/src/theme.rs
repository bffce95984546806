//! Presentation theme for a weather record.
//!
//! [`classify`] walks [`THEME_RULES`] top to bottom and returns the theme of
//! the first rule whose predicate matches. Description matching is
//! case-insensitive substring matching.

use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self::rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 0xFF {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

impl FromStr for Color {
    type Err = String;

    /// Accepts `#RRGGBB` or `#RRGGBBAA`; the leading `#` is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if !(hex.len() == 6 || hex.len() == 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("invalid color '{s}', expected #RRGGBB or #RRGGBBAA"));
        }

        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| e.to_string());
        let a = if hex.len() == 8 { byte(6)? } else { 0xFF };

        Ok(Self::rgba(byte(0)?, byte(2)?, byte(4)?, a))
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    Warm,
    Rain,
    Overcast,
    Snow,
    Storm,
}

impl ThemeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeKind::Warm => "warm",
            ThemeKind::Rain => "rain",
            ThemeKind::Overcast => "overcast",
            ThemeKind::Snow => "snow",
            ThemeKind::Storm => "storm",
        }
    }
}

impl fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeSpec {
    pub kind: ThemeKind,
    pub gradient_start: Color,
    pub gradient_end: Color,
    pub icon_id: &'static str,
    /// Dark foreground text on a light gradient.
    pub is_dark: bool,
}

const DARK_TEXT: Color = Color::from_hex(0x1F2937);
const DARK_SECONDARY_TEXT: Color = Color::from_hex(0x6B7280);
const LIGHT_TEXT: Color = Color::from_hex(0xFFFFFF);
const LIGHT_SECONDARY_TEXT: Color = Color::rgba(0xFF, 0xFF, 0xFF, 0xB3);

impl ThemeSpec {
    pub fn text_color(&self) -> Color {
        if self.is_dark { DARK_TEXT } else { LIGHT_TEXT }
    }

    pub fn secondary_text_color(&self) -> Color {
        if self.is_dark { DARK_SECONDARY_TEXT } else { LIGHT_SECONDARY_TEXT }
    }
}

pub const WARM: ThemeSpec = ThemeSpec {
    kind: ThemeKind::Warm,
    gradient_start: Color::from_hex(0xF59E0B),
    gradient_end: Color::from_hex(0xEF4444),
    icon_id: "sun",
    is_dark: false,
};

pub const RAIN: ThemeSpec = ThemeSpec {
    kind: ThemeKind::Rain,
    gradient_start: Color::from_hex(0x3B82F6),
    gradient_end: Color::from_hex(0x06B6D4),
    icon_id: "cloud-rain",
    is_dark: false,
};

pub const OVERCAST: ThemeSpec = ThemeSpec {
    kind: ThemeKind::Overcast,
    gradient_start: Color::from_hex(0x6B7280),
    gradient_end: Color::from_hex(0x9CA3AF),
    icon_id: "cloud",
    is_dark: true,
};

pub const SNOW: ThemeSpec = ThemeSpec {
    kind: ThemeKind::Snow,
    gradient_start: Color::from_hex(0xE5E7EB),
    gradient_end: Color::from_hex(0x9CA3AF),
    icon_id: "cloud-snow",
    is_dark: true,
};

pub const STORM: ThemeSpec = ThemeSpec {
    kind: ThemeKind::Storm,
    gradient_start: Color::from_hex(0x8B5CF6),
    gradient_end: Color::from_hex(0xEC4899),
    icon_id: "cloud-lightning",
    is_dark: false,
};

/// One entry of the classification chain. `matches` receives the temperature
/// and the lowercased description.
#[derive(Debug, Clone, Copy)]
pub struct ThemeRule {
    pub matches: fn(i32, &str) -> bool,
    pub theme: ThemeSpec,
}

/// Evaluated in order; first match wins. [`STORM`] is the fallback.
pub const THEME_RULES: &[ThemeRule] = &[
    ThemeRule {
        matches: |temp, desc| temp > 30 || desc.contains("clear") || desc.contains("sun"),
        theme: WARM,
    },
    ThemeRule {
        matches: |_, desc| desc.contains("rain") || desc.contains("drizzle"),
        theme: RAIN,
    },
    ThemeRule { matches: |_, desc| desc.contains("cloud"), theme: OVERCAST },
    ThemeRule { matches: |_, desc| desc.contains("snow"), theme: SNOW },
];

pub fn classify(temperature: i32, description: &str) -> ThemeSpec {
    let desc = description.to_lowercase();

    THEME_RULES
        .iter()
        .find(|rule| (rule.matches)(temperature, &desc))
        .map(|rule| rule.theme)
        .unwrap_or(STORM)
}
