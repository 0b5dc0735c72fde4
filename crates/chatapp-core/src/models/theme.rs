//! UI theme model

use serde::{Deserialize, Serialize};

/// Two-valued UI theme. Not persisted across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Shell background image for this theme
    pub const fn background_image(self) -> &'static str {
        match self {
            Self::Light => "/Images/background_light.png",
            Self::Dark => "/Images/background_dark.png",
        }
    }
}
