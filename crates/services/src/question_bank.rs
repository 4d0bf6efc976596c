use std::sync::Arc;

use rand::Rng;

use quiz_core::model::Question;

use crate::error::EmptyBankError;

/// In-memory set of questions for the current session.
///
/// Selection is uniformly random with replacement by default; the
/// `avoid_immediate_repeat` flag excludes only the previously drawn index,
/// for users who expect a quiz never to show the same face twice in a row.
#[derive(Debug, Default)]
pub struct QuestionBank {
    questions: Vec<Arc<Question>>,
    last_drawn: Option<usize>,
    avoid_immediate_repeat: bool,
}

impl QuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_avoid_immediate_repeat(mut self, avoid: bool) -> Self {
        self.avoid_immediate_repeat = avoid;
        self
    }

    /// Replaces the bank contents.
    pub fn load(&mut self, questions: Vec<Question>) {
        self.questions = questions.into_iter().map(Arc::new).collect();
        self.last_drawn = None;
    }

    pub fn clear(&mut self) {
        self.questions.clear();
        self.last_drawn = None;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Draws a random question.
    ///
    /// # Errors
    ///
    /// Returns `EmptyBankError` when no questions are loaded.
    pub fn next(&mut self) -> Result<Arc<Question>, EmptyBankError> {
        if self.questions.is_empty() {
            return Err(EmptyBankError);
        }

        let len = self.questions.len();
        let mut rng = rand::rng();
        let index = match self.last_drawn {
            Some(last) if self.avoid_immediate_repeat && len > 1 => {
                // Draw from len - 1 slots and shift past the excluded index.
                let drawn = rng.random_range(0..len - 1);
                if drawn >= last { drawn + 1 } else { drawn }
            }
            _ => rng.random_range(0..len),
        };

        self.last_drawn = Some(index);
        Ok(Arc::clone(&self.questions[index]))
    }
}
