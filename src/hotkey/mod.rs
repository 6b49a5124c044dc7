//! Global hotkey dispatch
//!
//! Maps key combinations to rewrite modes. The listener runs on its own
//! thread and posts [`HotkeyEvent`]s to a bounded channel; events are
//! dropped rather than queued when the consumer falls behind.

pub mod combo;
pub mod rdev_listener;

use crate::error::HotkeyError;
use crate::mode::RewriteMode;
use combo::KeyCombo;
use std::collections::BTreeMap;
use tokio::sync::mpsc;

/// A registered combination was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyEvent {
    pub mode: RewriteMode,
}

/// A combination bound to a mode
#[derive(Debug, Clone)]
pub struct Binding {
    /// Combination as written in the config
    pub combo_str: String,
    pub combo: KeyCombo,
    pub mode: RewriteMode,
}

/// Trait for hotkey detection implementations
#[async_trait::async_trait]
pub trait HotkeyListener: Send {
    /// Bind a combination string such as `cmd+shift+g` to a mode
    fn register(&mut self, combo: &str, mode: RewriteMode) -> Result<(), HotkeyError>;

    /// Start listening for hotkey events
    /// Returns a channel receiver for events
    async fn start(&mut self) -> Result<mpsc::Receiver<HotkeyEvent>, HotkeyError>;

    /// Stop listening and clean up
    async fn stop(&mut self) -> Result<(), HotkeyError>;

    /// Currently registered bindings, in registration order
    fn bindings(&self) -> &[Binding];
}

/// Register every configured hotkey, skipping invalid entries.
///
/// Returns the number of bindings registered; fails only if none were.
pub fn register_hotkeys(
    listener: &mut dyn HotkeyListener,
    hotkeys: &BTreeMap<String, String>,
) -> Result<usize, HotkeyError> {
    let mut registered = 0;

    for (mode_name, combo) in hotkeys {
        let mode: RewriteMode = match mode_name.parse() {
            Ok(mode) => mode,
            Err(e) => {
                tracing::error!("Skipping hotkey '{}': {}", combo, e);
                continue;
            }
        };

        match listener.register(combo, mode) {
            Ok(()) => registered += 1,
            Err(e) => tracing::error!("Failed to register hotkey for {}: {}", mode, e),
        }
    }

    if registered == 0 {
        return Err(HotkeyError::NoBindings);
    }
    Ok(registered)
}

/// Factory function to create the hotkey listener with configured bindings
pub fn create_listener(
    hotkeys: &BTreeMap<String, String>,
) -> Result<Box<dyn HotkeyListener>, HotkeyError> {
    let mut listener = rdev_listener::RdevListener::new();
    register_hotkeys(&mut listener, hotkeys)?;
    Ok(Box::new(listener))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdev_listener::RdevListener;

    fn hotkeys(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_register_skips_invalid_entries() {
        let mut listener = RdevListener::new();
        let count = register_hotkeys(
            &mut listener,
            &hotkeys(&[
                ("grammar_fix", "cmd+shift+g"),
                ("pirate", "cmd+shift+p"),
                ("formal", "cmd+shift+nope"),
            ]),
        )
        .unwrap();

        assert_eq!(count, 1);
        assert_eq!(listener.bindings()[0].mode, RewriteMode::GrammarFix);
    }

    #[test]
    fn test_register_fails_when_nothing_binds() {
        let mut listener = RdevListener::new();
        let result = register_hotkeys(&mut listener, &hotkeys(&[("formal", "shift")]));
        assert!(matches!(result, Err(HotkeyError::NoBindings)));

        let result = register_hotkeys(&mut listener, &BTreeMap::new());
        assert!(matches!(result, Err(HotkeyError::NoBindings)));
    }

    #[test]
    fn test_default_hotkeys_register() {
        let config = crate::config::Config::default();
        let listener = create_listener(config.hotkeys()).unwrap();
        assert_eq!(listener.bindings().len(), RewriteMode::ALL.len());
    }
}
