//! System clipboard access
//!
//! Uses arboard, which talks to the native pasteboard on macOS and to
//! X11/Wayland selections on Linux. The handle is kept open for the life of
//! the process: on X11 the last open handle owns the selection, so dropping
//! it between "set" and "paste" would lose the text.

use crate::error::SelectionError;
use std::sync::Mutex;

/// Plain-text clipboard access
pub trait Clipboard: Send + Sync {
    /// Current text content, or None if the clipboard holds no text
    fn get_text(&self) -> Result<Option<String>, SelectionError>;

    /// Replace the clipboard content with `text`
    fn set_text(&self, text: &str) -> Result<(), SelectionError>;

    /// Remove all clipboard content
    fn clear(&self) -> Result<(), SelectionError>;
}

/// Clipboard backed by the OS clipboard
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self, SelectionError> {
        Ok(Self {
            inner: Mutex::new(arboard::Clipboard::new()?),
        })
    }

    fn with<T>(
        &self,
        op: impl FnOnce(&mut arboard::Clipboard) -> Result<T, arboard::Error>,
    ) -> Result<T, SelectionError> {
        let mut clipboard = self
            .inner
            .lock()
            .map_err(|_| SelectionError::Clipboard("clipboard lock poisoned".to_string()))?;
        Ok(op(&mut *clipboard)?)
    }
}

impl Clipboard for SystemClipboard {
    fn get_text(&self) -> Result<Option<String>, SelectionError> {
        self.with(|clipboard| match clipboard.get_text() {
            Ok(text) => Ok(Some(text)),
            // Images or an empty clipboard are not an error here
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => Err(e),
        })
    }

    fn set_text(&self, text: &str) -> Result<(), SelectionError> {
        self.with(|clipboard| clipboard.set_text(text))
    }

    fn clear(&self) -> Result<(), SelectionError> {
        self.with(|clipboard| clipboard.clear())
    }
}
