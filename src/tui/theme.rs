//! Color palette for the dialog chrome and the demo screen

use ratatui::style::Color;

/// A slim theme: the colors the chrome and demo actually draw with
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub is_dark: bool,
    pub primary: Color,
    pub text: Color,
    pub muted: Color,
    pub border: Color,
    pub surface: Color,
    pub error: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            is_dark: true,
            primary: Color::Cyan,
            text: Color::White,
            muted: Color::DarkGray,
            border: Color::Gray,
            surface: Color::Black,
            error: Color::Red,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            is_dark: false,
            primary: Color::Blue,
            text: Color::Black,
            muted: Color::Gray,
            border: Color::DarkGray,
            surface: Color::White,
            error: Color::Red,
        }
    }

    /// Resolve a theme by name; unknown names fall back to dark
    pub fn by_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name_resolves_presets() {
        assert!(Theme::by_name("dark").is_dark);
        assert!(!Theme::by_name("light").is_dark);
        // Unknown names fall back to dark
        assert_eq!(Theme::by_name("nope").name, "dark");
    }
}
