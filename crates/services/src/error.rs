//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{DataUriError, QuestionError};
use quiz_core::normalize::NormalizeError;

/// Errors emitted by `IngestService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum IngestError {
    #[error("upload timed out after the transport deadline")]
    Timeout,
    #[error("could not connect to the processing service")]
    Connect,
    #[error("processing service failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(reqwest::Error),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    DataUri(#[from] DataUriError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

impl IngestError {
    /// One user-facing message per failure kind, for the UI error sink.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            IngestError::Timeout => {
                "Upload timed out. Check the processing service and your network.".to_string()
            }
            IngestError::Connect => {
                "Could not reach the processing service. Make sure it is running and listening."
                    .to_string()
            }
            IngestError::HttpStatus(_) => "The server failed to process the file.".to_string(),
            other => format!("File import failed: {other}"),
        }
    }
}

/// The quiz was asked to draw from a bank holding zero questions.
///
/// Recoverable: the user re-imports a file.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no questions loaded in the bank")]
pub struct EmptyBankError;
