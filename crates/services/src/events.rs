//! Outbound event model for the external UI sink.

use std::sync::Arc;

use serde::Serialize;

use quiz_core::model::Question;

/// Transient visual verdict after an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Correct,
    Wrong,
}

/// Running counters plus the derived accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionStats {
    pub answered: u32,
    pub correct: u32,
    pub skipped: u32,
    /// `round(correct / answered * 100, 1)`, or `0` before the first answer.
    pub accuracy_percent: f64,
}

impl SessionStats {
    #[must_use]
    pub fn from_counters(answered: u32, correct: u32, skipped: u32) -> Self {
        let accuracy_percent = if answered == 0 {
            0.0
        } else {
            (f64::from(correct) / f64::from(answered) * 1000.0).round() / 10.0
        };
        Self {
            answered,
            correct,
            skipped,
            accuracy_percent,
        }
    }

    /// Renders the accuracy the way the stats panel displays it: one decimal
    /// place, `"0%"` before the first answer.
    #[must_use]
    pub fn accuracy_label(&self) -> String {
        if self.answered == 0 {
            "0%".to_string()
        } else {
            format!("{:.1}%", self.accuracy_percent)
        }
    }
}

/// Events the session pushes to the external renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiEvent {
    QuestionChanged { question: Arc<Question> },
    Feedback { feedback: Feedback },
    Reveal { name: String },
    RevealFading,
    StatsUpdated { stats: SessionStats },
    Error { message: String },
}

impl UiEvent {
    /// Serializes the event for sinks that sit behind a JSON bridge
    /// (web view, IPC).
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Sink the external renderer implements.
pub trait EventSink {
    fn emit(&mut self, event: UiEvent);
}

/// Event sink that records everything, for tests and headless drivers.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<UiEvent>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last stats event seen, if any.
    #[must_use]
    pub fn last_stats(&self) -> Option<SessionStats> {
        self.events.iter().rev().find_map(|event| match event {
            UiEvent::StatsUpdated { stats } => Some(*stats),
            _ => None,
        })
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: UiEvent) {
        self.events.push(event);
    }
}
