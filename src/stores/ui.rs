use crate::{
    models::ui::{Theme, UiState, View},
    storage::{KeyValueStorage, StorageError, THEME_KEY},
    system::{SystemTheme, THEME_ATTRIBUTE, ThemeSink},
};

/// Presentation state. Every theme change is mirrored to the attached [`ThemeSink`].
pub struct UiStore {
    state: UiState,
    sink: Box<dyn ThemeSink>,
}

impl UiStore {
    pub fn new(sink: Box<dyn ThemeSink>) -> Self {
        Self {
            state: UiState::default(),
            sink,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    pub fn is_dark_theme(&self) -> bool {
        self.state.theme == Theme::Dark
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.state.sidebar_open
    }

    pub fn current_view(&self) -> View {
        self.state.current_view
    }

    /// Resolves the starting theme: saved preference, then the system's dark-mode
    /// hint, then light.
    pub fn init_theme(
        &mut self,
        storage: &impl KeyValueStorage,
        system: &impl SystemTheme,
    ) -> Result<Theme, StorageError> {
        let saved = match storage.get(THEME_KEY)? {
            Some(raw) => match raw.parse::<Theme>() {
                Ok(theme) => Some(theme),
                Err(e) => {
                    tracing::warn!(error = %e, "ignoring saved theme");
                    None
                }
            },
            None => None,
        };

        let theme = match saved {
            Some(theme) => theme,
            None if system.prefers_dark() => Theme::Dark,
            None => Theme::Light,
        };
        self.set_theme(theme);
        Ok(theme)
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.state.theme = theme;
        self.sink.set_attribute(THEME_ATTRIBUTE, theme.as_str());
    }

    /// Flips the theme and persists the new choice.
    ///
    /// The in-memory theme changes even when persisting fails.
    pub fn toggle_theme(&mut self, storage: &impl KeyValueStorage) -> Result<Theme, StorageError> {
        let theme = self.state.theme.toggled();
        self.set_theme(theme);
        self.save_to_storage(storage)?;
        Ok(theme)
    }

    pub fn set_sidebar_open(&mut self, open: bool) {
        self.state.sidebar_open = open;
    }

    pub fn toggle_sidebar(&mut self) -> bool {
        self.state.sidebar_open = !self.state.sidebar_open;
        self.state.sidebar_open
    }

    pub fn set_current_view(&mut self, view: View) {
        self.state.current_view = view;
    }

    pub fn save_to_storage(&self, storage: &impl KeyValueStorage) -> Result<(), StorageError> {
        storage.set(THEME_KEY, self.state.theme.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::storage::memory::MemoryStorage;

    struct FixedSystemTheme(bool);

    impl SystemTheme for FixedSystemTheme {
        fn prefers_dark(&self) -> bool {
            self.0
        }
    }

    fn recording_store() -> (UiStore, Arc<Mutex<Vec<(String, String)>>>) {
        let signals = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&signals);
        let sink = move |name: &str, value: &str| {
            recorded
                .lock()
                .unwrap()
                .push((name.to_string(), value.to_string()));
        };
        (UiStore::new(Box::new(sink)), signals)
    }

    #[test]
    fn test_defaults() {
        let (ui, signals) = recording_store();
        assert!(!ui.is_dark_theme());
        assert!(ui.is_sidebar_open());
        assert_eq!(ui.current_view(), View::Tasks);
        assert!(signals.lock().unwrap().is_empty());
    }

    #[test]
    fn test_init_theme_prefers_saved_value() {
        let storage = MemoryStorage::with_entries([(THEME_KEY, "light")]);
        let (mut ui, _) = recording_store();

        let theme = ui.init_theme(&storage, &FixedSystemTheme(true)).unwrap();

        assert_eq!(theme, Theme::Light);
    }

    #[test]
    fn test_init_theme_falls_back_to_system_then_light() {
        let storage = MemoryStorage::new();

        let (mut ui, signals) = recording_store();
        assert_eq!(ui.init_theme(&storage, &FixedSystemTheme(true)).unwrap(), Theme::Dark);
        assert_eq!(
            signals.lock().unwrap().last(),
            Some(&("data-theme".to_string(), "dark".to_string()))
        );

        let (mut ui, _) = recording_store();
        assert_eq!(ui.init_theme(&storage, &FixedSystemTheme(false)).unwrap(), Theme::Light);
    }

    #[test]
    fn test_init_theme_ignores_unknown_saved_token() {
        let storage = MemoryStorage::with_entries([(THEME_KEY, "sepia")]);
        let (mut ui, _) = recording_store();

        let theme = ui.init_theme(&storage, &FixedSystemTheme(true)).unwrap();

        assert_eq!(theme, Theme::Dark);
    }

    #[test]
    fn test_toggle_theme_signals_and_persists() {
        let storage = MemoryStorage::new();
        let (mut ui, signals) = recording_store();

        assert_eq!(ui.toggle_theme(&storage).unwrap(), Theme::Dark);
        assert!(ui.is_dark_theme());
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("dark"));

        assert_eq!(ui.toggle_theme(&storage).unwrap(), Theme::Light);
        assert_eq!(storage.get(THEME_KEY).unwrap().as_deref(), Some("light"));

        let values: Vec<String> = signals.lock().unwrap().iter().map(|(_, v)| v.clone()).collect();
        assert_eq!(values, vec!["dark", "light"]);
    }

    #[test]
    fn test_sidebar_and_view() {
        let (mut ui, _) = recording_store();
        assert!(!ui.toggle_sidebar());
        ui.set_sidebar_open(true);
        assert!(ui.is_sidebar_open());

        ui.set_current_view(View::Analytics);
        assert_eq!(ui.current_view(), View::Analytics);
    }
}
