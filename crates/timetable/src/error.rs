//! Error types shared by the schedule engine, the remote client and the
//! upload pipeline.

use thiserror::Error;

/// Errors that can occur while editing, syncing or importing a timetable.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimetableError {
    /// A start time was not two colon-separated integers in range
    #[error("Invalid time format: {value:?} (expected HH:MM)")]
    InvalidTimeFormat { value: String },

    /// A repeat count of zero was supplied
    #[error("Invalid repeat count: {value} (must be at least 1)")]
    InvalidRepeatCount { value: u32 },

    /// Network/HTTP request failed
    #[error("Network error: {message}")]
    Network { message: String },

    /// Server answered with a non-success status
    #[error("Unexpected response ({status}): {message}")]
    UnexpectedResponse { status: u16, message: String },

    /// The derived id belongs to a different, already existing record
    #[error("ID {id} already exists in the database, please select another ID")]
    DuplicateIdentifier { id: String },

    /// University, program, semester and section are not all filled in
    #[error("University, program, semester and section are all required")]
    IncompleteIdentity,

    /// A record delete was requested with no record loaded
    #[error("Nothing is selected")]
    NothingSelected,

    /// The bulk import was rejected (not a timetable, or the server failed)
    #[error("Upload rejected: {reason}")]
    UploadRejected { reason: String },

    /// A single server-sent event frame could not be decoded
    #[error("Stream decode error: {message}")]
    StreamDecode { message: String },

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl TimetableError {
    /// Returns true if the caller can surface this error and carry on with
    /// the same state.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, TimetableError::Config { .. })
    }

    /// Returns true if this error came from talking to the remote API.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            TimetableError::Network { .. } | TimetableError::UnexpectedResponse { .. }
        )
    }
}

impl From<reqwest::Error> for TimetableError {
    fn from(err: reqwest::Error) -> Self {
        TimetableError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for TimetableError {
    fn from(err: url::ParseError) -> Self {
        TimetableError::Config {
            message: format!("invalid URL: {}", err),
        }
    }
}

impl From<std::io::Error> for TimetableError {
    fn from(err: std::io::Error) -> Self {
        TimetableError::Config {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for TimetableError {
    fn from(err: serde_json::Error) -> Self {
        TimetableError::StreamDecode {
            message: err.to_string(),
        }
    }
}
