//! # Error Types
//!
//! This module defines all error types for the ISiS score converter.
//!
//! ## Error Types
//! - `Metadata` - Invalid YAML source or invalid score settings
//! - `InvalidEvent` - Validation errors with the index of the offending event
//! - `UnsupportedShape` - Polyphonic input, which ISiS cannot sing
//! - `Io` - Score file could not be written or removed
//! - `Launch` - The ISiS executable could not be started
//! - `ExternalTool` - ISiS ran but exited unsuccessfully
//!
//! Events that merely lack an attribute are not errors: they are sung as
//! rests (see [`crate::extract`]).

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IsisError {
    /// Invalid YAML source or invalid score settings.
    ///
    /// # Example
    /// ```
    /// # use isis_score::IsisError;
    /// let err = IsisError::Metadata("tempo must be positive".to_string());
    /// assert_eq!(err.to_string(), "Invalid metadata: tempo must be positive");
    /// ```
    #[error("Invalid metadata: {0}")]
    Metadata(String),

    /// An event failed validation.
    ///
    /// `index` counts simple events in playing order, starting at 0.
    ///
    /// # Example
    /// ```
    /// # use isis_score::IsisError;
    /// let err = IsisError::InvalidEvent {
    ///     index: 3,
    ///     message: "duration must be positive, got 0".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Invalid event 3: duration must be positive, got 0");
    /// ```
    #[error("Invalid event {index}: {message}")]
    InvalidEvent { index: usize, message: String },

    /// The input contains simultaneous voices.
    #[error("Unsupported input: {0}")]
    UnsupportedShape(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to launch {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} exited unsuccessfully ({status})", .program.display())]
    ExternalTool { program: PathBuf, status: ExitStatus },
}

impl IsisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IsisError::Io {
            path: path.into(),
            source,
        }
    }
}
