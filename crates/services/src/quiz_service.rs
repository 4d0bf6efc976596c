use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use quiz_core::model::Question;
use quiz_core::time::Clock;

use crate::events::{EventSink, Feedback, SessionStats, UiEvent};
use crate::question_bank::QuestionBank;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

/// Timing windows and selection behavior for a quiz session.
///
/// Defaults match the original display timings: 1 s answer feedback, 3 s
/// skip reveal, 500 ms fade before the next question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    feedback_window: Duration,
    reveal_window: Duration,
    fade_window: Duration,
    avoid_immediate_repeat: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            feedback_window: Duration::from_millis(1000),
            reveal_window: Duration::from_millis(3000),
            fade_window: Duration::from_millis(500),
            avoid_immediate_repeat: false,
        }
    }
}

impl QuizConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_feedback_window(mut self, window: Duration) -> Self {
        self.feedback_window = window;
        self
    }

    #[must_use]
    pub fn with_reveal_window(mut self, window: Duration) -> Self {
        self.reveal_window = window;
        self
    }

    #[must_use]
    pub fn with_fade_window(mut self, window: Duration) -> Self {
        self.fade_window = window;
        self
    }

    #[must_use]
    pub fn with_avoid_immediate_repeat(mut self, avoid: bool) -> Self {
        self.avoid_immediate_repeat = avoid;
        self
    }
}

//
// ─── PHASES & TIMERS ───────────────────────────────────────────────────────────
//

/// Where the session is in its answer/reveal cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuizPhase {
    #[default]
    Idle,
    AwaitingAnswer,
    Revealing,
}

/// Which reveal step a pending timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RevealStage {
    FeedbackHold,
    RevealHold,
    FadeHold,
}

/// Identity of one scheduled deferred callback.
///
/// Carries the epoch current at scheduling time; `reset` and a fresh
/// `start` bump the epoch, so a token fired late compares unequal and is
/// dropped instead of advancing a session it no longer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    epoch: u64,
    stage: RevealStage,
}

/// A deferred callback the driver must schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub token: TimerToken,
    pub after: Duration,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Finite state machine for one interactive quiz session.
///
/// Event handlers are synchronous transitions on this owned struct: they
/// mutate counters/phase, push [`UiEvent`]s through the sink, and hand any
/// deferred work back to the caller as a [`TimerRequest`]. The session
/// never spawns or sleeps itself, which keeps every transition unit
/// testable without a live UI or runtime.
pub struct QuizSession {
    config: QuizConfig,
    clock: Clock,
    bank: QuestionBank,
    phase: QuizPhase,
    current: Option<Arc<Question>>,
    answered: u32,
    correct: u32,
    skipped: u32,
    epoch: u64,
    pending: Option<TimerToken>,
    loaded_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    #[must_use]
    pub fn new(config: QuizConfig) -> Self {
        Self {
            bank: QuestionBank::new().with_avoid_immediate_repeat(config.avoid_immediate_repeat),
            config,
            clock: Clock::default(),
            phase: QuizPhase::Idle,
            current: None,
            answered: 0,
            correct: 0,
            skipped: 0,
            epoch: 0,
            pending: None,
            loaded_at: None,
        }
    }

    /// Override the clock (usually for deterministic testing).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Arc<Question>> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats::from_counters(self.answered, self.correct, self.skipped)
    }

    /// Loads a fresh question set and draws the first question.
    ///
    /// Valid from any phase; a pending reveal timer is invalidated. An
    /// empty set surfaces as a user-visible error notice and leaves the
    /// session idle. Counters are not reset: importing a new file
    /// mid-session keeps the running score.
    pub fn start(&mut self, questions: Vec<Question>, sink: &mut dyn EventSink) {
        self.cancel_pending();
        self.bank.load(questions);
        self.current = None;
        if !self.bank.is_empty() {
            self.loaded_at = Some(self.clock.now());
        }
        self.advance(sink);
    }

    /// Checks a typed answer against the current question.
    ///
    /// Only valid while awaiting an answer; blank input is a strict no-op
    /// (no counter or phase change). Comparison is exact string equality
    /// after trimming, case-sensitive.
    pub fn submit(&mut self, input: &str, sink: &mut dyn EventSink) -> Option<TimerRequest> {
        if self.phase != QuizPhase::AwaitingAnswer {
            return None;
        }
        let input = input.trim();
        if input.is_empty() {
            return None;
        }
        let is_correct = match self.current.as_ref() {
            Some(current) => input == current.name(),
            None => return None,
        };

        self.answered += 1;
        let feedback = if is_correct {
            self.correct += 1;
            Feedback::Correct
        } else {
            Feedback::Wrong
        };

        sink.emit(UiEvent::Feedback { feedback });
        sink.emit(UiEvent::StatsUpdated { stats: self.stats() });

        Some(self.enter_revealing(RevealStage::FeedbackHold, self.config.feedback_window))
    }

    /// Gives up on the current question and reveals the answer.
    ///
    /// Only valid while awaiting an answer with a question on screen.
    pub fn skip(&mut self, sink: &mut dyn EventSink) -> Option<TimerRequest> {
        if self.phase != QuizPhase::AwaitingAnswer {
            return None;
        }
        let name = self.current.as_ref()?.name().to_string();

        self.skipped += 1;
        sink.emit(UiEvent::Reveal { name });
        sink.emit(UiEvent::StatsUpdated { stats: self.stats() });

        Some(self.enter_revealing(RevealStage::RevealHold, self.config.reveal_window))
    }

    /// Drops everything: bank, current question, counters, pending timers.
    pub fn reset(&mut self, sink: &mut dyn EventSink) {
        self.cancel_pending();
        self.bank.clear();
        self.current = None;
        self.phase = QuizPhase::Idle;
        self.answered = 0;
        self.correct = 0;
        self.skipped = 0;
        self.loaded_at = None;
        sink.emit(UiEvent::StatsUpdated { stats: self.stats() });
    }

    /// Delivers an expired timer back to the session.
    ///
    /// Tokens that no longer match the pending timer (the session was
    /// reset or restarted while the callback was in flight) are dropped.
    pub fn timer_fired(&mut self, token: TimerToken, sink: &mut dyn EventSink) -> Option<TimerRequest> {
        if self.pending != Some(token) {
            debug!(?token, "suppressing stale timer");
            return None;
        }
        self.pending = None;

        match token.stage {
            RevealStage::FeedbackHold | RevealStage::FadeHold => {
                self.advance(sink);
                None
            }
            RevealStage::RevealHold => {
                sink.emit(UiEvent::RevealFading);
                Some(self.enter_revealing(RevealStage::FadeHold, self.config.fade_window))
            }
        }
    }

    /// Draws the next question and presents it.
    fn advance(&mut self, sink: &mut dyn EventSink) {
        match self.bank.next() {
            Ok(question) => {
                self.current = Some(Arc::clone(&question));
                self.phase = QuizPhase::AwaitingAnswer;
                sink.emit(UiEvent::QuestionChanged { question });
            }
            Err(err) => {
                sink.emit(UiEvent::Error {
                    message: "No valid questions loaded. Check the file format.".to_string(),
                });
                debug!(%err, "cannot advance");
                // Keep whatever is on screen; without a question the only
                // consistent phase is Idle.
                self.phase = if self.current.is_some() {
                    QuizPhase::AwaitingAnswer
                } else {
                    QuizPhase::Idle
                };
            }
        }
    }

    fn enter_revealing(&mut self, stage: RevealStage, after: Duration) -> TimerRequest {
        self.phase = QuizPhase::Revealing;
        let token = TimerToken {
            epoch: self.epoch,
            stage,
        };
        self.pending = Some(token);
        TimerRequest { token, after }
    }

    fn cancel_pending(&mut self) {
        self.pending = None;
        self.epoch += 1;
    }
}

impl std::fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizSession")
            .field("phase", &self.phase)
            .field("bank_len", &self.bank.len())
            .field("answered", &self.answered)
            .field("correct", &self.correct)
            .field("skipped", &self.skipped)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingSink;
    use quiz_core::model::{DataUri, ImageKind};
    use quiz_core::time::fixed_clock;

    fn question(name: &str) -> Question {
        Question::new(name, DataUri::wrap(ImageKind::Jpeg, "QUJDREVGR0hJSktMTU5PUA==")).unwrap()
    }

    /// Session with a single question, so every draw is deterministic.
    fn started_session(name: &str) -> (QuizSession, RecordingSink) {
        let mut sink = RecordingSink::new();
        let mut session = QuizSession::new(QuizConfig::default()).with_clock(fixed_clock());
        session.start(vec![question(name)], &mut sink);
        (session, sink)
    }

    #[test]
    fn start_presents_a_question() {
        let (session, sink) = started_session("张三");

        assert_eq!(session.phase(), QuizPhase::AwaitingAnswer);
        assert_eq!(session.current_question().unwrap().name(), "张三");
        assert!(session.loaded_at().is_some());
        assert!(matches!(
            sink.events.as_slice(),
            [UiEvent::QuestionChanged { .. }]
        ));
    }

    #[test]
    fn start_with_no_questions_reports_and_stays_idle() {
        let mut sink = RecordingSink::new();
        let mut session = QuizSession::new(QuizConfig::default());
        session.start(Vec::new(), &mut sink);

        assert_eq!(session.phase(), QuizPhase::Idle);
        assert!(session.current_question().is_none());
        assert!(matches!(sink.events.as_slice(), [UiEvent::Error { .. }]));
    }

    #[test]
    fn blank_submit_changes_nothing() {
        let (mut session, mut sink) = started_session("张三");
        sink.events.clear();

        assert!(session.submit("   ", &mut sink).is_none());
        assert_eq!(session.phase(), QuizPhase::AwaitingAnswer);
        assert_eq!(session.stats().answered, 0);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn exact_answer_scores_correct() {
        let (mut session, mut sink) = started_session("张三");
        sink.events.clear();

        let request = session.submit(" 张三 ", &mut sink).unwrap();

        assert_eq!(session.phase(), QuizPhase::Revealing);
        assert_eq!(request.after, Duration::from_millis(1000));
        let stats = session.stats();
        assert_eq!((stats.answered, stats.correct), (1, 1));
        assert_eq!(
            sink.events,
            vec![
                UiEvent::Feedback {
                    feedback: Feedback::Correct
                },
                UiEvent::StatsUpdated {
                    stats: session.stats()
                },
            ]
        );
    }

    #[test]
    fn wrong_answer_counts_answered_only() {
        let (mut session, mut sink) = started_session("张三");
        sink.events.clear();

        session.submit("李四", &mut sink).unwrap();

        let stats = session.stats();
        assert_eq!((stats.answered, stats.correct), (1, 0));
        assert!(matches!(
            sink.events.first(),
            Some(UiEvent::Feedback {
                feedback: Feedback::Wrong
            })
        ));
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let (mut session, mut sink) = started_session("Ada");
        session.submit("ada", &mut sink).unwrap();
        assert_eq!(session.stats().correct, 0);
    }

    #[test]
    fn submit_is_ignored_while_revealing() {
        let (mut session, mut sink) = started_session("张三");
        session.submit("张三", &mut sink).unwrap();

        assert!(session.submit("张三", &mut sink).is_none());
        assert_eq!(session.stats().answered, 1);
    }

    #[test]
    fn feedback_timer_advances_to_next_question() {
        let (mut session, mut sink) = started_session("张三");
        let request = session.submit("张三", &mut sink).unwrap();
        sink.events.clear();

        assert!(session.timer_fired(request.token, &mut sink).is_none());
        assert_eq!(session.phase(), QuizPhase::AwaitingAnswer);
        assert!(matches!(
            sink.events.as_slice(),
            [UiEvent::QuestionChanged { .. }]
        ));
    }

    #[test]
    fn skip_reveals_and_counts() {
        let (mut session, mut sink) = started_session("张三");
        sink.events.clear();

        let request = session.skip(&mut sink).unwrap();

        assert_eq!(request.after, Duration::from_millis(3000));
        let stats = session.stats();
        assert_eq!((stats.answered, stats.correct, stats.skipped), (0, 0, 1));
        assert_eq!(
            sink.events,
            vec![
                UiEvent::Reveal {
                    name: "张三".to_string()
                },
                UiEvent::StatsUpdated {
                    stats: session.stats()
                },
            ]
        );
    }

    #[test]
    fn skip_chain_fades_then_advances() {
        let (mut session, mut sink) = started_session("张三");
        let reveal = session.skip(&mut sink).unwrap();
        sink.events.clear();

        let fade = session.timer_fired(reveal.token, &mut sink).unwrap();
        assert_eq!(fade.after, Duration::from_millis(500));
        assert_eq!(sink.events, vec![UiEvent::RevealFading]);
        assert_eq!(session.phase(), QuizPhase::Revealing);

        sink.events.clear();
        assert!(session.timer_fired(fade.token, &mut sink).is_none());
        assert_eq!(session.phase(), QuizPhase::AwaitingAnswer);
        assert!(matches!(
            sink.events.as_slice(),
            [UiEvent::QuestionChanged { .. }]
        ));
    }

    #[test]
    fn skip_is_ignored_without_a_question() {
        let mut sink = RecordingSink::new();
        let mut session = QuizSession::new(QuizConfig::default());

        assert!(session.skip(&mut sink).is_none());
        assert_eq!(session.stats().skipped, 0);
    }

    #[test]
    fn reset_zeroes_everything_from_any_state() {
        let (mut session, mut sink) = started_session("张三");
        session.submit("张三", &mut sink).unwrap();
        session.reset(&mut sink);

        let stats = session.stats();
        assert_eq!((stats.answered, stats.correct, stats.skipped), (0, 0, 0));
        assert_eq!(session.phase(), QuizPhase::Idle);
        assert!(session.current_question().is_none());
        assert!(session.loaded_at().is_none());
        assert!(matches!(
            sink.events.last(),
            Some(UiEvent::StatsUpdated { .. })
        ));
    }

    #[test]
    fn timer_pending_at_reset_is_stale() {
        let (mut session, mut sink) = started_session("张三");
        let request = session.submit("张三", &mut sink).unwrap();
        session.reset(&mut sink);
        sink.events.clear();

        assert!(session.timer_fired(request.token, &mut sink).is_none());
        assert_eq!(session.phase(), QuizPhase::Idle);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn timer_from_before_restart_is_stale() {
        let (mut session, mut sink) = started_session("张三");
        let old = session.submit("张三", &mut sink).unwrap();

        // Restart mid-reveal and enter a new reveal of the same stage; the
        // old token must not satisfy the new pending timer.
        session.start(vec![question("李四")], &mut sink);
        let fresh = session.submit("李四", &mut sink).unwrap();
        sink.events.clear();

        assert!(session.timer_fired(old.token, &mut sink).is_none());
        assert!(sink.events.is_empty());
        assert_eq!(session.phase(), QuizPhase::Revealing);

        assert!(session.timer_fired(fresh.token, &mut sink).is_none());
        assert_eq!(session.phase(), QuizPhase::AwaitingAnswer);
    }

    #[test]
    fn start_keeps_running_counters() {
        let (mut session, mut sink) = started_session("张三");
        session.submit("张三", &mut sink).unwrap();

        session.start(vec![question("李四")], &mut sink);

        assert_eq!(session.stats().answered, 1);
        assert_eq!(session.current_question().unwrap().name(), "李四");
    }

    #[test]
    fn scripted_sequence_reports_66_7_percent() {
        // 2 correct, 1 wrong, 1 skip ⇒ answered=3, correct=2, skipped=1.
        let (mut session, mut sink) = started_session("张三");

        let t = session.submit("张三", &mut sink).unwrap();
        session.timer_fired(t.token, &mut sink);
        let t = session.submit("张三", &mut sink).unwrap();
        session.timer_fired(t.token, &mut sink);
        let t = session.submit("不对", &mut sink).unwrap();
        session.timer_fired(t.token, &mut sink);
        let t = session.skip(&mut sink).unwrap();
        let t = session.timer_fired(t.token, &mut sink).unwrap();
        session.timer_fired(t.token, &mut sink);

        let stats = session.stats();
        assert_eq!((stats.answered, stats.correct, stats.skipped), (3, 2, 1));
        assert_eq!(stats.accuracy_label(), "66.7%");
        assert_eq!(sink.last_stats().unwrap(), stats);
    }
}
