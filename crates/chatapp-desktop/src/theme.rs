//! Theme colors for the desktop app

use chatapp_core::models::Theme;

/// Color palette for the application
#[derive(Debug, Clone, Copy)]
pub struct ColorPalette {
    pub bg_primary: &'static str,
    pub bg_secondary: &'static str,
    pub bg_tertiary: &'static str,
    pub text_primary: &'static str,
    pub text_secondary: &'static str,
    pub text_muted: &'static str,
    pub border: &'static str,
    pub accent: &'static str,
    pub accent_text: &'static str,
    pub own_bubble: &'static str,
    pub other_bubble: &'static str,
    pub unread: &'static str,
    pub error: &'static str,
    pub success: &'static str,
}

/// Light theme colors
pub const LIGHT_PALETTE: ColorPalette = ColorPalette {
    bg_primary: "#ffffff",
    bg_secondary: "#f8f9fa",
    bg_tertiary: "#f1f3f4",
    text_primary: "#1a1a1a",
    text_secondary: "#5f6368",
    text_muted: "#9aa0a6",
    border: "#dadce0",
    accent: "#4f46e5",
    accent_text: "#ffffff",
    own_bubble: "#e0e7ff",
    other_bubble: "#f1f3f4",
    unread: "#2563eb",
    error: "#dc2626",
    success: "#16a34a",
};

/// Dark theme colors
pub const DARK_PALETTE: ColorPalette = ColorPalette {
    bg_primary: "#1a1a1a",
    bg_secondary: "#242424",
    bg_tertiary: "#2d2d2d",
    text_primary: "#e8eaed",
    text_secondary: "#9aa0a6",
    text_muted: "#5f6368",
    border: "#3c4043",
    accent: "#818cf8",
    accent_text: "#1a1a1a",
    own_bubble: "#312e81",
    other_bubble: "#2d2d2d",
    unread: "#60a5fa",
    error: "#f87171",
    success: "#4ade80",
};

/// Get the color palette for a theme
#[must_use]
pub const fn palette(theme: Theme) -> &'static ColorPalette {
    match theme {
        Theme::Light => &LIGHT_PALETTE,
        Theme::Dark => &DARK_PALETTE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_theme_has_its_own_palette() {
        assert_eq!(palette(Theme::Light).bg_primary, LIGHT_PALETTE.bg_primary);
        assert_eq!(palette(Theme::Dark).bg_primary, DARK_PALETTE.bg_primary);
        assert_ne!(
            palette(Theme::Light).text_primary,
            palette(Theme::Dark).text_primary
        );
    }
}
