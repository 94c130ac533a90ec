use serde::{Deserialize, Serialize};

/// The sixteen-entry legacy color palette.
///
/// Each palette entry has a single-character legacy code (consumed after the
/// escape marker, e.g. `&c`) and a structural tag name (e.g. `<red>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamedColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl NamedColor {
    pub const ALL: [NamedColor; 16] = [
        NamedColor::Black,
        NamedColor::DarkBlue,
        NamedColor::DarkGreen,
        NamedColor::DarkAqua,
        NamedColor::DarkRed,
        NamedColor::DarkPurple,
        NamedColor::Gold,
        NamedColor::Gray,
        NamedColor::DarkGray,
        NamedColor::Blue,
        NamedColor::Green,
        NamedColor::Aqua,
        NamedColor::Red,
        NamedColor::LightPurple,
        NamedColor::Yellow,
        NamedColor::White,
    ];

    /// The single-character legacy code for this color.
    pub fn code(self) -> char {
        match self {
            NamedColor::Black => '0',
            NamedColor::DarkBlue => '1',
            NamedColor::DarkGreen => '2',
            NamedColor::DarkAqua => '3',
            NamedColor::DarkRed => '4',
            NamedColor::DarkPurple => '5',
            NamedColor::Gold => '6',
            NamedColor::Gray => '7',
            NamedColor::DarkGray => '8',
            NamedColor::Blue => '9',
            NamedColor::Green => 'a',
            NamedColor::Aqua => 'b',
            NamedColor::Red => 'c',
            NamedColor::LightPurple => 'd',
            NamedColor::Yellow => 'e',
            NamedColor::White => 'f',
        }
    }

    /// Resolve a legacy code character (case-insensitive) to a palette color.
    pub fn from_code(c: char) -> Option<NamedColor> {
        match c.to_ascii_lowercase() {
            '0' => Some(NamedColor::Black),
            '1' => Some(NamedColor::DarkBlue),
            '2' => Some(NamedColor::DarkGreen),
            '3' => Some(NamedColor::DarkAqua),
            '4' => Some(NamedColor::DarkRed),
            '5' => Some(NamedColor::DarkPurple),
            '6' => Some(NamedColor::Gold),
            '7' => Some(NamedColor::Gray),
            '8' => Some(NamedColor::DarkGray),
            '9' => Some(NamedColor::Blue),
            'a' => Some(NamedColor::Green),
            'b' => Some(NamedColor::Aqua),
            'c' => Some(NamedColor::Red),
            'd' => Some(NamedColor::LightPurple),
            'e' => Some(NamedColor::Yellow),
            'f' => Some(NamedColor::White),
            _ => None,
        }
    }

    /// The structural tag name for this color (`red`, `dark_aqua`, ...).
    pub fn tag_name(self) -> &'static str {
        match self {
            NamedColor::Black => "black",
            NamedColor::DarkBlue => "dark_blue",
            NamedColor::DarkGreen => "dark_green",
            NamedColor::DarkAqua => "dark_aqua",
            NamedColor::DarkRed => "dark_red",
            NamedColor::DarkPurple => "dark_purple",
            NamedColor::Gold => "gold",
            NamedColor::Gray => "gray",
            NamedColor::DarkGray => "dark_gray",
            NamedColor::Blue => "blue",
            NamedColor::Green => "green",
            NamedColor::Aqua => "aqua",
            NamedColor::Red => "red",
            NamedColor::LightPurple => "light_purple",
            NamedColor::Yellow => "yellow",
            NamedColor::White => "white",
        }
    }

    /// Resolve a structural tag name (case-insensitive) to a palette color.
    pub fn from_tag_name(name: &str) -> Option<NamedColor> {
        let lower = name.to_ascii_lowercase();
        NamedColor::ALL
            .iter()
            .copied()
            .find(|c| c.tag_name() == lower)
    }
}

/// A span color: a named palette entry or an explicit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Color {
    Named(NamedColor),
    Rgb(u8, u8, u8),
}

impl Color {
    /// Parse a six-digit hex color, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Color> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
        let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
        let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
        Some(Color::Rgb(r, g, b))
    }

    /// Lowercase `rrggbb` form for RGB colors; `None` for palette entries.
    pub fn hex(&self) -> Option<String> {
        match self {
            Color::Rgb(r, g, b) => Some(format!("{:02x}{:02x}{:02x}", r, g, b)),
            Color::Named(_) => None,
        }
    }
}

/// Whether `c` is a recognized single-character code (color, style or reset),
/// in either case.
pub(crate) fn is_code_char(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r')
}

/// Structural tag name for a style/reset code; `None` for color codes.
pub(crate) fn style_tag(code: char) -> Option<&'static str> {
    match code.to_ascii_lowercase() {
        'k' => Some("obfuscated"),
        'l' => Some("bold"),
        'm' => Some("strikethrough"),
        'n' => Some("underlined"),
        'o' => Some("italic"),
        'r' => Some("reset"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trip() {
        for color in NamedColor::ALL {
            assert_eq!(NamedColor::from_code(color.code()), Some(color));
        }
    }

    #[test]
    fn from_code_is_case_insensitive() {
        assert_eq!(NamedColor::from_code('C'), Some(NamedColor::Red));
        assert_eq!(NamedColor::from_code('c'), Some(NamedColor::Red));
        assert_eq!(NamedColor::from_code('B'), Some(NamedColor::Aqua));
    }

    #[test]
    fn tag_name_round_trip() {
        for color in NamedColor::ALL {
            assert_eq!(NamedColor::from_tag_name(color.tag_name()), Some(color));
        }
        assert_eq!(
            NamedColor::from_tag_name("LIGHT_PURPLE"),
            Some(NamedColor::LightPurple)
        );
        assert_eq!(NamedColor::from_tag_name("crimson"), None);
    }

    #[test]
    fn hex_parsing() {
        assert_eq!(Color::from_hex("#ff0000"), Some(Color::Rgb(255, 0, 0)));
        assert_eq!(Color::from_hex("00FF00"), Some(Color::Rgb(0, 255, 0)));
        assert_eq!(Color::from_hex("#ff00"), None);
        assert_eq!(Color::from_hex("gggggg"), None);
    }

    #[test]
    fn code_chars() {
        assert!(is_code_char('a'));
        assert!(is_code_char('R'));
        assert!(is_code_char('0'));
        assert!(!is_code_char('g'));
        assert!(!is_code_char('#'));
    }
}
