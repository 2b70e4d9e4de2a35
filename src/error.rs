//! Structured error types for the Placard layout core.
//!
//! Layout itself never fails on degenerate input. The variants here cover the
//! faults raised by collaborators (text measurement, path geometry) and by the
//! adapter layers that build inputs (JSON, image sources, font bytes).

use thiserror::Error;

/// The unified error type returned by all public Placard API functions.
#[derive(Debug, Error)]
pub enum PlacardError {
    /// JSON input failed to parse as a valid Placard document.
    #[error("Failed to parse document: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
    /// A shape's path source could not be turned into geometry.
    #[error("Invalid path source {source_text:?}: {reason}")]
    InvalidPath { source_text: String, reason: String },
    /// The text-measurement provider failed for a substring.
    #[error("Text measurement failed: {0}")]
    Measure(String),
    /// An image source could not be read or its header decoded.
    #[error("Image error: {0}")]
    Image(String),
    /// Font bytes could not be parsed.
    #[error("Font error: {0}")]
    Font(String),
}

pub type Result<T, E = PlacardError> = std::result::Result<T, E>;

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl PlacardError {
    pub(crate) fn invalid_path(source_text: &str, reason: impl Into<String>) -> Self {
        // Long inline SVG documents make unreadable messages.
        let mut shown: String = source_text.chars().take(48).collect();
        if shown.len() < source_text.len() {
            shown.push('…');
        }
        PlacardError::InvalidPath {
            source_text: shown,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for PlacardError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the Placard content schema. Check \"type\" tags and field names.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        PlacardError::Parse { source: e, hint }
    }
}
