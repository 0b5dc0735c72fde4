use crate::models::Theme;

use super::Reducer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    Set(Theme),
    Toggle,
}

/// Process-wide UI theme, light on startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeState {
    pub theme: Theme,
}

impl Reducer for ThemeState {
    type Action = ThemeAction;

    fn reduce(&mut self, action: ThemeAction) {
        self.theme = match action {
            ThemeAction::Set(theme) => theme,
            ThemeAction::Toggle => self.theme.toggled(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_two_values() {
        let mut state = ThemeState::default();
        state.reduce(ThemeAction::Toggle);
        assert_eq!(state.theme, Theme::Dark);
        state.reduce(ThemeAction::Toggle);
        assert_eq!(state.theme, Theme::Light);
    }

    #[test]
    fn set_is_idempotent() {
        let mut state = ThemeState::default();
        state.reduce(ThemeAction::Set(Theme::Dark));
        state.reduce(ThemeAction::Set(Theme::Dark));
        assert_eq!(state.theme, Theme::Dark);
    }
}
