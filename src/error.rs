//! Error types for redraft
//!
//! Uses thiserror for ergonomic error definitions with clear messages
//! that guide users toward fixing common issues.

use thiserror::Error;

/// Top-level error type for the redraft application
#[derive(Error, Debug)]
pub enum RedraftError {
    #[error("{0}")]
    Config(String),

    #[error("Hotkey error: {0}")]
    Hotkey(#[from] HotkeyError),

    #[error("Rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    #[error("Selection error: {0}")]
    Selection(#[from] SelectionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to hotkey parsing and detection
#[derive(Error, Debug)]
pub enum HotkeyError {
    #[error("Unknown key name '{key}' in hotkey '{combo}'")]
    UnknownKey { combo: String, key: String },

    #[error("No key specified in hotkey '{0}' (only modifiers found)")]
    MissingKey(String),

    #[error("Hotkey '{0}' names more than one non-modifier key")]
    TooManyKeys(String),

    #[error("No hotkeys could be registered. Check the [hotkeys] section of your config.")]
    NoBindings,

    #[error("Hotkey listener is already running")]
    AlreadyRunning,

    #[error("Global key listener failed: {0}")]
    Listen(String),
}

/// Errors related to rewriting text through the generative API
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("Empty text provided")]
    EmptyInput,

    #[error("Invalid mode: '{0}'. Valid modes: grammar_fix, formal, casual, simplify, expand")]
    UnknownMode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("All {0} attempts failed")]
    RetriesExhausted(u32),
}

/// Errors related to capturing and replacing the selection
#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("{0} not found in PATH. Install it via your package manager.")]
    ToolNotFound(&'static str),

    #[error("Keystroke simulation failed: {0}")]
    Keystroke(String),

    #[error("Keystroke script timed out after {0}s")]
    Timeout(u64),

    #[error("No keystroke tool available. Install xdotool (X11) or ydotool (Wayland).")]
    NoKeystrokeTool,
}

/// Result type alias using RedraftError
pub type Result<T> = std::result::Result<T, RedraftError>;

impl From<arboard::Error> for SelectionError {
    fn from(e: arboard::Error) -> Self {
        SelectionError::Clipboard(e.to_string())
    }
}
