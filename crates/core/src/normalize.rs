use thiserror::Error;
use tracing::warn;

use crate::decode::{ImageResolutionFailure, resolve_image};
use crate::model::{CellValue, Question, RawRow};

/// Required column label for a row's name.
pub const NAME_COLUMN: &str = "姓名";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum NormalizeError {
    #[error("no rows to process")]
    EmptyInput,

    #[error("row {row}: missing required field 姓名")]
    MissingField { row: u32 },

    #[error("row {row}: no strategy could resolve an image")]
    ImageResolution {
        row: u32,
        failure: ImageResolutionFailure,
    },
}

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// What to do with a row that lacks a name or a resolvable image.
///
/// `Abort` fails the whole batch on the first bad row, so the caller is
/// never handed a silently-shrunk question set. `Skip` drops bad rows and
/// keeps going.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidRowPolicy {
    #[default]
    Abort,
    Skip,
}

//
// ─── NORMALIZER ────────────────────────────────────────────────────────────────
//

/// Validates raw rows and maps them to questions, preserving input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowNormalizer {
    policy: InvalidRowPolicy,
}

impl RowNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policy(mut self, policy: InvalidRowPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn policy(&self) -> InvalidRowPolicy {
        self.policy
    }

    /// Maps each row to a question: a non-empty name plus a resolved image.
    ///
    /// # Errors
    ///
    /// Returns `NormalizeError::EmptyInput` for an empty batch. Under the
    /// `Abort` policy, the first row without a name fails with
    /// `MissingField` and the first row without a resolvable image fails
    /// with `ImageResolution` carrying the diagnostic payload.
    pub fn normalize(&self, rows: &[RawRow]) -> Result<Vec<Question>, NormalizeError> {
        if rows.is_empty() {
            return Err(NormalizeError::EmptyInput);
        }

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            let name = row
                .cell(NAME_COLUMN)
                .and_then(CellValue::as_text)
                .map(str::trim)
                .filter(|name| !name.is_empty());

            let Some(name) = name else {
                match self.policy {
                    InvalidRowPolicy::Abort => {
                        return Err(NormalizeError::MissingField { row: row.index() });
                    }
                    InvalidRowPolicy::Skip => {
                        warn!(row = row.index(), "dropping row without a name");
                        continue;
                    }
                }
            };

            let image = match resolve_image(row) {
                Ok(image) => image,
                Err(failure) => match self.policy {
                    InvalidRowPolicy::Abort => {
                        return Err(NormalizeError::ImageResolution {
                            row: row.index(),
                            failure,
                        });
                    }
                    InvalidRowPolicy::Skip => {
                        warn!(row = row.index(), "dropping row without a resolvable image");
                        continue;
                    }
                },
            };

            match Question::new(name, image) {
                Ok(question) => questions.push(question),
                // Name and image were both validated above; a failure here
                // is the final guard against an invalid record slipping out.
                Err(err) => warn!(row = row.index(), %err, "dropping invalid record"),
            }
        }

        Ok(questions)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImageKind;
    use base64::Engine;

    fn blob() -> String {
        base64::engine::general_purpose::STANDARD.encode(b"fake image bytes, long enough")
    }

    fn valid_row(index: u32, name: &str) -> RawRow {
        RawRow::new(index)
            .with_cell(NAME_COLUMN, CellValue::text(name))
            .with_cell("图", CellValue::text(blob()))
    }

    fn nameless_row(index: u32) -> RawRow {
        RawRow::new(index).with_cell("图", CellValue::text(blob()))
    }

    fn imageless_row(index: u32, name: &str) -> RawRow {
        RawRow::new(index).with_cell(NAME_COLUMN, CellValue::text(name))
    }

    #[test]
    fn empty_batch_is_rejected() {
        let err = RowNormalizer::new().normalize(&[]).unwrap_err();
        assert_eq!(err, NormalizeError::EmptyInput);
    }

    #[test]
    fn valid_rows_map_to_trimmed_questions_in_order() {
        let rows = vec![valid_row(1, " 张三 "), valid_row(2, "李四")];
        let questions = RowNormalizer::new().normalize(&rows).unwrap();

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].name(), "张三");
        assert_eq!(questions[1].name(), "李四");
    }

    #[test]
    fn missing_name_aborts_whole_batch() {
        let rows = vec![valid_row(1, "张三"), nameless_row(2), valid_row(3, "李四")];
        let err = RowNormalizer::new().normalize(&rows).unwrap_err();
        assert_eq!(err, NormalizeError::MissingField { row: 2 });
    }

    #[test]
    fn whitespace_name_counts_as_missing() {
        let rows = vec![valid_row(1, "   ")];
        let err = RowNormalizer::new().normalize(&rows).unwrap_err();
        assert_eq!(err, NormalizeError::MissingField { row: 1 });
    }

    #[test]
    fn unresolvable_image_aborts_with_diagnostics() {
        let rows = vec![imageless_row(4, "张三")];
        let err = RowNormalizer::new().normalize(&rows).unwrap_err();

        match err {
            NormalizeError::ImageResolution { row, failure } => {
                assert_eq!(row, 4);
                assert_eq!(failure.available_columns, vec![NAME_COLUMN]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn skip_policy_drops_bad_rows_and_preserves_order() {
        let rows = vec![
            valid_row(1, "张三"),
            nameless_row(2),
            imageless_row(3, "王五"),
            valid_row(4, "李四"),
        ];
        let questions = RowNormalizer::new()
            .with_policy(InvalidRowPolicy::Skip)
            .normalize(&rows)
            .unwrap();

        let names: Vec<&str> = questions.iter().map(Question::name).collect();
        assert_eq!(names, ["张三", "李四"]);
    }

    #[test]
    fn skip_policy_still_rejects_empty_batch() {
        let err = RowNormalizer::new()
            .with_policy(InvalidRowPolicy::Skip)
            .normalize(&[])
            .unwrap_err();
        assert_eq!(err, NormalizeError::EmptyInput);
    }
}
