use serde::Serialize;
use thiserror::Error;

use crate::model::image::DataUri;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question name cannot be empty")]
    EmptyName,
}

/// A normalized (name, image) pair. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    name: String,
    image: DataUri,
}

impl Question {
    /// Builds a question from a raw name and a resolved image.
    ///
    /// The name is trimmed; a name that is empty after trimming is rejected.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyName` for blank names.
    pub fn new(name: impl Into<String>, image: DataUri) -> Result<Self, QuestionError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(QuestionError::EmptyName);
        }
        Ok(Self { name, image })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn image(&self) -> &DataUri {
        &self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::image::ImageKind;

    #[test]
    fn name_is_trimmed() {
        let q = Question::new("  张三 ", DataUri::wrap(ImageKind::Jpeg, "AAAA")).unwrap();
        assert_eq!(q.name(), "张三");
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Question::new("   ", DataUri::wrap(ImageKind::Jpeg, "AAAA")).unwrap_err();
        assert_eq!(err, QuestionError::EmptyName);
    }
}
