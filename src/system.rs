//! Collaborators the UI store talks to outside the state container: the
//! presentation layer that styles itself off a theme attribute, and the
//! host's dark-mode preference.

/// Attribute carrying the active theme token for external stylesheets.
pub const THEME_ATTRIBUTE: &str = "data-theme";

pub trait ThemeSink {
    fn set_attribute(&self, name: &str, value: &str);
}

impl<F: Fn(&str, &str)> ThemeSink for F {
    fn set_attribute(&self, name: &str, value: &str) {
        self(name, value)
    }
}

pub trait SystemTheme {
    fn prefers_dark(&self) -> bool;
}

/// Emits theme changes as log events. Used when no styling layer is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingThemeSink;

impl ThemeSink for TracingThemeSink {
    fn set_attribute(&self, name: &str, value: &str) {
        tracing::info!(attribute = name, value, "presentation attribute changed");
    }
}

/// Reads the terminal's `COLORFGBG` hint (`fg;bg`); a background of 0-6 or 8 is dark.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSystemTheme;

impl SystemTheme for EnvSystemTheme {
    fn prefers_dark(&self) -> bool {
        std::env::var("COLORFGBG")
            .map(|value| background_is_dark(&value))
            .unwrap_or(false)
    }
}

fn background_is_dark(colorfgbg: &str) -> bool {
    colorfgbg
        .rsplit(';')
        .next()
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .map(|bg| bg <= 6 || bg == 8)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_dark() {
        assert!(background_is_dark("15;0"));
        assert!(background_is_dark("15;default;8"));
        assert!(!background_is_dark("0;15"));
        assert!(!background_is_dark(""));
        assert!(!background_is_dark("garbage"));
    }
}
