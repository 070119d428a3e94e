//! Error type for karaoke decomposition and effect generation
//!
//! Provides the `FxError` enum that wraps parser failures and every error
//! raised while timing, measuring and re-emitting units.
//!
//! # Error Philosophy
//!
//! - Use `thiserror` for structured error handling
//! - Malformed input and font failures are fatal and propagate with `?`
//! - Unsupported values passed to the emitter are non-fatal and skipped
//!
//! # Examples
//!
//! ```rust
//! use ass_fx::utils::FxError;
//!
//! let err = FxError::invalid_time("1:23", "missing seconds");
//! assert!(err.is_fatal());
//! assert!(!FxError::UnsupportedUnit("u32".into()).is_fatal());
//! ```

use core::fmt;
use std::{io, num};

use thiserror::Error;

use crate::parser::ParseError;

/// Main error type for effect generation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FxError {
    /// Structural errors from the script parser
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Time field that is not `H:MM:SS.CC`
    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    /// Numeric style or event field that does not parse
    #[error("Invalid numeric value: {0}")]
    InvalidNumeric(String),

    /// Color field that is not `&HAABBGGRR`, `&HBBGGRR&` or `#RRGGBB`
    #[error("Invalid color format: {0}")]
    InvalidColor(String),

    /// Karaoke tag whose duration is not a number of centiseconds
    #[error("Invalid karaoke duration {value:?} in \\{tag} tag")]
    InvalidKaraokeDuration {
        /// Tag name without the backslash (`k`, `kf`, `ko`, `K`)
        tag: String,
        /// Raw argument following the tag name
        value: String,
    },

    /// Dialogue references a style that is not defined
    #[error("Style not found: {0}")]
    MissingStyle(String),

    /// Font could not be located or parsed
    #[error("Font error: {0}")]
    FontLoad(String),

    /// Value handed to the emitter is not a line, syllable or character
    #[error("Unsupported unit for emission: {0}")]
    UnsupportedUnit(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl FxError {
    /// Create time error from invalid format
    pub fn invalid_time<T: fmt::Display>(time: T, reason: &str) -> Self {
        Self::InvalidTime(format!("{time}: {reason}"))
    }

    /// Create numeric error from parsing failure
    pub fn invalid_numeric<T: fmt::Display>(value: T, reason: &str) -> Self {
        Self::InvalidNumeric(format!("{value}: {reason}"))
    }

    /// Create color error from invalid format
    pub fn invalid_color<T: fmt::Display>(value: T) -> Self {
        Self::InvalidColor(format!("{value}"))
    }

    /// Create font error for a family that failed to load
    pub fn font_load<T: fmt::Display>(family: &str, reason: T) -> Self {
        Self::FontLoad(format!("{family}: {reason}"))
    }

    /// Check if the error aborts processing
    ///
    /// Only unsupported emitter values are recoverable; the caller logs and
    /// continues with the next unit.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, Self::UnsupportedUnit(_))
    }
}

/// Result type alias for convenience
pub type Result<T> = core::result::Result<T, FxError>;

impl From<num::ParseIntError> for FxError {
    fn from(err: num::ParseIntError) -> Self {
        Self::InvalidNumeric(format!("Integer parse error: {err}"))
    }
}

impl From<num::ParseFloatError> for FxError {
    fn from(err: num::ParseFloatError) -> Self {
        Self::InvalidNumeric(format!("Float parse error: {err}"))
    }
}

impl From<io::Error> for FxError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn karaoke_duration_message_names_tag() {
        let err = FxError::InvalidKaraokeDuration {
            tag: "kf".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid karaoke duration \"abc\" in \\kf tag"
        );
    }

    #[test]
    fn fatal_classification() {
        assert!(FxError::MissingStyle("Main".into()).is_fatal());
        assert!(FxError::font_load("Arial", "not found").is_fatal());
        assert!(FxError::invalid_time("x", "bad").is_fatal());
        assert!(!FxError::UnsupportedUnit("u8".into()).is_fatal());
    }

    #[test]
    fn conversions() {
        let int_err: FxError = "x".parse::<u32>().unwrap_err().into();
        assert!(matches!(int_err, FxError::InvalidNumeric(_)));

        let float_err: FxError = "y".parse::<f64>().unwrap_err().into();
        assert!(matches!(float_err, FxError::InvalidNumeric(_)));

        let io_err: FxError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert_eq!(io_err, FxError::Io("gone".to_string()));
    }

    #[test]
    fn parse_error_wraps() {
        let err: FxError = ParseError::UnclosedSectionHeader { line: 3 }.into();
        assert!(err.to_string().starts_with("Parse error:"));
    }
}
