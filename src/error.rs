//! # Error Types
//!
//! The running trainer never fails: unknown pitches fall back to defaults and
//! audio problems degrade to a silent, visual-only session. Errors therefore
//! only appear while building a session from configuration or pattern data.
//!
//! ## Error Types
//! - `TrainerError` - Invalid configuration or pattern data, raised at construction
//! - `AudioError` - Backend failures, swallowed and logged by `AudioGateway`
//!
//! ## Usage
//! ```rust
//! use fretscroll::{TrainerConfig, TrainerError};
//!
//! match TrainerConfig::from_yaml("transport:\n  min-tempo: 200\n  max-tempo: 100\n") {
//!     Ok(_) => println!("loaded"),
//!     Err(TrainerError::Config(message)) => eprintln!("bad config: {}", message),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainerError {
    /// Invalid configuration.
    ///
    /// Occurs when YAML cannot be parsed or values are out of range.
    ///
    /// # Example
    /// ```
    /// # use fretscroll::TrainerError;
    /// let err = TrainerError::Config("note-spacing must be positive".to_string());
    /// assert_eq!(err.to_string(), "Invalid configuration: note-spacing must be positive");
    /// ```
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Invalid pattern data.
    ///
    /// Occurs when a pattern in a custom catalog is empty or names a
    /// position that does not exist on a six-string fretboard.
    ///
    /// # Example
    /// ```
    /// # use fretscroll::TrainerError;
    /// let err = TrainerError::Pattern {
    ///     index: 2,
    ///     message: "string 7 is outside 1..=6".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Invalid pattern 2: string 7 is outside 1..=6");
    /// ```
    #[error("Invalid pattern {index}: {message}")]
    Pattern { index: usize, message: String },

    /// A catalog must hold at least one pattern.
    #[error("Pattern catalog is empty")]
    EmptyCatalog,
}

/// Failures reported by a [`crate::audio::SampleBackend`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    #[error("Audio engine has not been started")]
    NotStarted,

    #[error("Audio engine failed to start: {0}")]
    InitFailed(String),

    #[error("No sample loaded for {0}")]
    SampleUnavailable(String),
}
