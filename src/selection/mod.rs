//! Selected-text capture and replacement
//!
//! There is no portable API for reading another application's selection,
//! so both directions go through the clipboard: simulate copy and read the
//! clipboard, or put text on the clipboard and simulate paste. The user's
//! clipboard content is saved beforehand and restored afterwards.

pub mod clipboard;
pub mod keystroke;

use clipboard::{Clipboard, SystemClipboard};
use keystroke::{create_keystrokes, Chord, Keystrokes};
use std::time::Duration;

use crate::error::SelectionError;

/// Time for the clipboard to settle after a simulated keystroke
pub const SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Time for the user to release the hotkey's modifiers before copying
pub const MODIFIER_RELEASE_DELAY: Duration = Duration::from_millis(150);

/// Capture and replace the focused application's selected text
#[async_trait::async_trait]
pub trait SelectionIo: Send + Sync {
    /// Selected text, or None if nothing (or only whitespace) is selected
    async fn capture(&self) -> Option<String>;

    /// Replace the current selection with `text`; true on success
    async fn replace(&self, text: &str) -> bool;
}

/// Clipboard-swap implementation of [`SelectionIo`]
pub struct ClipboardSelection {
    clipboard: Box<dyn Clipboard>,
    keys: Box<dyn Keystrokes>,
    settle: Duration,
    modifier_release: Duration,
}

impl ClipboardSelection {
    pub fn new(clipboard: Box<dyn Clipboard>, keys: Box<dyn Keystrokes>) -> Self {
        Self {
            clipboard,
            keys,
            settle: SETTLE_DELAY,
            modifier_release: MODIFIER_RELEASE_DELAY,
        }
    }

    /// System clipboard plus the platform keystroke chain
    pub fn system() -> Result<Self, SelectionError> {
        let keys = create_keystrokes();
        if !keys.is_available() {
            tracing::warn!("{}", SelectionError::NoKeystrokeTool);
        }
        Ok(Self::new(Box::new(SystemClipboard::new()?), Box::new(keys)))
    }

    /// Snapshot the clipboard; `Ok(None)` means it held no text
    fn save(&self) -> Result<Option<String>, SelectionError> {
        self.clipboard.get_text()
    }

    fn restore(&self, saved: Result<Option<String>, SelectionError>) {
        let result = match saved {
            Ok(Some(text)) => self.clipboard.set_text(&text),
            Ok(None) => self.clipboard.clear(),
            Err(e) => {
                // Unknown prior content; clearing would destroy it
                tracing::warn!("Clipboard could not be saved, not restoring: {}", e);
                return;
            }
        };
        if let Err(e) = result {
            tracing::warn!("Failed to restore clipboard: {}", e);
        }
    }

    async fn copy_selection(&self) -> Result<Option<String>, SelectionError> {
        // Stale content must not be mistaken for a fresh copy
        self.clipboard.clear()?;
        self.keys.send(Chord::Copy).await?;
        tokio::time::sleep(self.settle).await;
        self.clipboard.get_text()
    }

    async fn paste_text(&self, text: &str) -> Result<(), SelectionError> {
        self.clipboard.set_text(text)?;
        tokio::time::sleep(self.settle).await;
        self.keys.send(Chord::Paste).await?;
        tokio::time::sleep(self.settle).await;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SelectionIo for ClipboardSelection {
    async fn capture(&self) -> Option<String> {
        tokio::time::sleep(self.modifier_release).await;

        let saved = self.save();
        let copied = self.copy_selection().await;
        self.restore(saved);

        match copied {
            Ok(Some(text)) if !text.trim().is_empty() => {
                tracing::debug!("Captured {} chars", text.chars().count());
                Some(text)
            }
            Ok(_) => {
                tracing::debug!("No text selected");
                None
            }
            Err(e) => {
                tracing::error!("Failed to get selected text: {}", e);
                None
            }
        }
    }

    async fn replace(&self, text: &str) -> bool {
        if text.is_empty() {
            tracing::warn!("Refusing to replace selection with empty text");
            return false;
        }

        let saved = self.save();
        let pasted = self.paste_text(text).await;
        self.restore(saved);

        match pasted {
            Ok(()) => {
                tracing::debug!("Replaced selection ({} chars)", text.chars().count());
                true
            }
            Err(e) => {
                tracing::error!("Failed to replace text: {}", e);
                false
            }
        }
    }
}
