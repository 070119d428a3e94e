//! Parser error types for ASS script parsing
//!
//! Structural problems that prevent a [`Document`](super::Document) from being
//! built. Field-level value errors (times, numbers, colors) surface later as
//! [`FxError`](crate::utils::FxError) when the fields are interpreted.

use thiserror::Error;

/// Primary parse error type for ASS scripts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Section header not properly closed
    #[error("Unclosed section header at line {line}")]
    UnclosedSectionHeader { line: usize },

    /// Invalid format line for styles or events
    #[error("Invalid format line at line {line}: {reason}")]
    InvalidFormatLine { line: usize, reason: String },

    /// Data line with fewer fields than its format line declares
    #[error("Insufficient fields at line {line}: expected {expected}, found {found}")]
    InsufficientFields {
        expected: usize,
        found: usize,
        line: usize,
    },

    /// Line in [Events] that is not a known event type
    #[error("Invalid event type at line {line}")]
    InvalidEventType { line: usize },

    /// Line in [V4+ Styles] that is neither `Format:` nor `Style:`
    #[error("Invalid style line at line {line}")]
    InvalidStyleLine { line: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let error = ParseError::InsufficientFields {
            expected: 10,
            found: 4,
            line: 12,
        };
        assert_eq!(
            error.to_string(),
            "Insufficient fields at line 12: expected 10, found 4"
        );
        assert_eq!(
            ParseError::InvalidEventType { line: 3 }.to_string(),
            "Invalid event type at line 3"
        );
    }
}
