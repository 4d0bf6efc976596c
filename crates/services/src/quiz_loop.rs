use tokio::time::sleep;
use tracing::warn;

use crate::error::IngestError;
use crate::events::{EventSink, UiEvent};
use crate::ingest_service::IngestService;
use crate::quiz_service::{QuizSession, TimerRequest};

/// Executes a chain of reveal timers against a session.
///
/// Sleeps for each requested window, feeds the expiry back into the
/// session, and keeps going while the session requests more (a skip
/// produces reveal-then-fade, an answer a single feedback hold). Stale
/// tokens are suppressed inside the session.
pub async fn run_timers(
    session: &mut QuizSession,
    sink: &mut dyn EventSink,
    first: TimerRequest,
) {
    let mut next = Some(first);
    while let Some(request) = next {
        sleep(request.after).await;
        next = session.timer_fired(request.token, sink);
    }
}

/// Wires the upload transport into a quiz session.
#[derive(Clone)]
pub struct QuizLoopService {
    ingest: IngestService,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(ingest: IngestService) -> Self {
        Self { ingest }
    }

    /// Uploads a spreadsheet, converts the response to questions, and
    /// starts the session on them.
    ///
    /// Transport failures are translated to a kind-specific user notice on
    /// the sink before being returned, so the UI always hears about them.
    ///
    /// # Errors
    ///
    /// Returns `IngestError` when the upload or record validation fails.
    pub async fn import_and_start(
        &self,
        session: &mut QuizSession,
        sink: &mut dyn EventSink,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<(), IngestError> {
        match self.ingest.upload(file_name, bytes).await {
            Ok(questions) => {
                session.start(questions, sink);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "import failed");
                sink.emit(UiEvent::Error {
                    message: err.user_message(),
                });
                Err(err)
            }
        }
    }
}
