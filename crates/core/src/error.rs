use thiserror::Error;

use crate::model::{DataUriError, QuestionError};
use crate::normalize::NormalizeError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    DataUri(#[from] DataUriError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}
