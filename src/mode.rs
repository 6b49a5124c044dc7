//! Rewrite modes and their prompt templates
//!
//! Each mode is bound to exactly one template with a single `{text}` slot.

use crate::error::RewriteError;
use std::fmt;
use std::str::FromStr;

/// Placeholder substituted with the selected text
const TEXT_SLOT: &str = "{text}";

/// A text transformation intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RewriteMode {
    /// Fix grammar, spelling, and punctuation
    GrammarFix,
    /// Make the text formal and professional
    Formal,
    /// Make the text casual and friendly
    Casual,
    /// Shorter sentences, simpler words
    Simplify,
    /// Elaborate with more detail
    Expand,
}

impl RewriteMode {
    /// Every supported mode, in display order
    pub const ALL: [RewriteMode; 5] = [
        RewriteMode::GrammarFix,
        RewriteMode::Formal,
        RewriteMode::Casual,
        RewriteMode::Simplify,
        RewriteMode::Expand,
    ];

    /// Config key for this mode
    pub fn as_str(self) -> &'static str {
        match self {
            RewriteMode::GrammarFix => "grammar_fix",
            RewriteMode::Formal => "formal",
            RewriteMode::Casual => "casual",
            RewriteMode::Simplify => "simplify",
            RewriteMode::Expand => "expand",
        }
    }

    /// Human-readable description shown next to the hotkey on startup
    pub fn description(self) -> &'static str {
        match self {
            RewriteMode::GrammarFix => "Fix grammar, spelling, and punctuation",
            RewriteMode::Formal => "Make more formal and professional",
            RewriteMode::Casual => "Make more casual and friendly",
            RewriteMode::Simplify => "Simplify and clarify",
            RewriteMode::Expand => "Expand with more detail",
        }
    }

    fn template(self) -> &'static str {
        match self {
            RewriteMode::GrammarFix => {
                "Fix any grammar, spelling, and punctuation errors in the following text.\n\
                 Maintain the original tone and style. Only return the corrected text, nothing else.\n\
                 \n\
                 Text: {text}"
            }
            RewriteMode::Formal => {
                "Rewrite the following text in a more formal and professional style.\n\
                 Maintain the core message. Only return the rewritten text, nothing else.\n\
                 \n\
                 Text: {text}"
            }
            RewriteMode::Casual => {
                "Rewrite the following text in a more casual and friendly style.\n\
                 Maintain the core message. Only return the rewritten text, nothing else.\n\
                 \n\
                 Text: {text}"
            }
            RewriteMode::Simplify => {
                "Simplify the following text to make it clearer and easier to understand.\n\
                 Use simpler words and shorter sentences. Only return the simplified text, nothing else.\n\
                 \n\
                 Text: {text}"
            }
            RewriteMode::Expand => {
                "Expand and elaborate on the following text with more detail and context.\n\
                 Maintain the original style. Only return the expanded text, nothing else.\n\
                 \n\
                 Text: {text}"
            }
        }
    }

    /// Build the prompt sent to the model for `text`
    pub fn prompt(self, text: &str) -> String {
        self.template().replacen(TEXT_SLOT, text, 1)
    }
}

impl fmt::Display for RewriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RewriteMode {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RewriteMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| RewriteError::UnknownMode(s.to_string()))
    }
}
