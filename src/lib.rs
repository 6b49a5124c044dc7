//! Redraft: rewrite selected text anywhere with a hotkey
//!
//! This library provides the core functionality for:
//! - Detecting global key combinations via rdev
//! - Capturing the focused application's selection through the clipboard
//! - Rewriting text with Google Gemini under a per-minute quota
//! - Pasting the result back and restoring the user's clipboard
//!
//! # Architecture
//!
//! ```text
//!                      ┌─────────────────────────────────────┐
//!                      │               Daemon                │
//!                      └─────────────────────────────────────┘
//!                           │                        │
//!                           ▼                        ▼
//!                  ┌──────────────┐          ┌──────────────┐
//!                  │    Hotkey    │  mode    │ Orchestrator │
//!                  │    (rdev)    │ ───────▶ │ (busy lock)  │
//!                  └──────────────┘          └──────────────┘
//!                                                   │
//!              ┌────────────────────────────────────┼───────────────────┐
//!              │                                    │                   │
//!              ▼                                    ▼                   ▼
//!     ┌─────────────────┐                 ┌──────────────────┐  ┌──────────────┐
//!     │   Selection     │  selected text  │  Rewrite client  │  │ Notification │
//!     │ (clipboard swap)│ ──────────────▶ │ (quota + retry)  │  │ notify-send/ │
//!     │ arboard + keys  │ ◀────────────── │     Gemini       │  │  osascript   │
//!     └─────────────────┘  rewritten text └──────────────────┘  └──────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod hotkey;
pub mod mode;
pub mod notification;
pub mod orchestrator;
pub mod rewrite;
pub mod selection;

pub use config::Config;
pub use daemon::Daemon;
pub use error::{RedraftError, Result};
pub use mode::RewriteMode;
