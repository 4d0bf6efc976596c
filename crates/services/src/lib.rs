#![forbid(unsafe_code)]

pub mod error;
pub mod events;
pub mod ingest_service;
pub mod question_bank;
pub mod quiz_loop;
pub mod quiz_service;

pub use quiz_core::Clock;
pub use quiz_core::normalize::{InvalidRowPolicy, RowNormalizer};

pub use error::{EmptyBankError, IngestError};
pub use events::{EventSink, Feedback, RecordingSink, SessionStats, UiEvent};
pub use ingest_service::{IngestConfig, IngestService};
pub use question_bank::QuestionBank;
pub use quiz_loop::{QuizLoopService, run_timers};
pub use quiz_service::{QuizConfig, QuizPhase, QuizSession, TimerRequest, TimerToken};
