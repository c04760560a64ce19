//! Stream controller: orchestrates one video-detection run.
//!
//! Owns the session state for the duration of a run, drives the
//! frame→decode→reduce loop strictly in arrival order, and broadcasts
//! [`RunEvent`]s to observers. Cancellation is cooperative via a
//! [`CancellationToken`] checked between chunk reads.

use std::sync::Arc;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::events::RunEvent;
use crate::framer::LineFramer;
use crate::messages::{parse_event, StreamEvent};
use crate::session::{reduce, SessionState};
use crate::stream::StreamError;

/// Broadcast channel capacity for run events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Failure message used when an upstream error event carries none.
const GENERIC_UPSTREAM_ERROR: &str = "An error occurred";

/// Lifecycle phase of a detection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Streaming,
    Completed,
    Errored,
    Canceled,
}

/// Drives one video-detection run from raw chunks to terminal phase.
///
/// One controller instance runs exactly once; terminal phases are final
/// and a new run means a new controller with fresh state. The last
/// snapshot survives every terminal phase, so a cancelled run still
/// exposes its partial results.
pub struct StreamController {
    phase: RunPhase,
    snapshot: Arc<SessionState>,
    failure: Option<String>,
    cancel: CancellationToken,
    event_tx: broadcast::Sender<RunEvent>,
    download_complete_sent: bool,
}

impl StreamController {
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            phase: RunPhase::Idle,
            snapshot: Arc::new(SessionState::default()),
            failure: None,
            cancel: CancellationToken::new(),
            event_tx,
            download_complete_sent: false,
        }
    }

    /// Subscribe to run events.
    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.event_tx.subscribe()
    }

    /// Token that cancels this run when triggered. Cancellation preserves
    /// the state reduced so far.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Snapshot of the accumulated session state.
    pub fn state(&self) -> Arc<SessionState> {
        self.snapshot.clone()
    }

    /// The failure reason, when the run ended in [`RunPhase::Errored`].
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Consume the chunk stream until a terminal phase is reached.
    ///
    /// Events are framed, decoded, and reduced strictly in arrival
    /// order; framing, decoding, and reduction are synchronous per
    /// chunk — awaiting the next chunk is the only suspension point.
    pub async fn run<S>(&mut self, mut chunks: S) -> RunPhase
    where
        S: Stream<Item = Result<Bytes, StreamError>> + Unpin,
    {
        if self.phase != RunPhase::Idle {
            tracing::warn!(phase = ?self.phase, "Controller already ran; start a new one");
            return self.phase;
        }

        let run_id = uuid::Uuid::new_v4().to_string();
        self.phase = RunPhase::Streaming;
        self.snapshot = Arc::new(SessionState::default());
        self.failure = None;
        self.download_complete_sent = false;
        let _ = self.event_tx.send(RunEvent::Started {
            run_id: run_id.clone(),
        });
        tracing::info!(run_id = %run_id, "Detection run started");

        let mut framer = LineFramer::new();
        let cancel = self.cancel.clone();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    // Deliberate stop: keep partial state, suppress
                    // completion/error notifications.
                    tracing::info!(run_id = %run_id, frames = self.snapshot.frames.len(), "Run cancelled");
                    self.phase = RunPhase::Canceled;
                    let _ = self.event_tx.send(RunEvent::Cancelled);
                    return self.phase;
                }
                chunk = chunks.next() => match chunk {
                    Some(Ok(bytes)) => {
                        for payload in framer.push(&bytes) {
                            if !self.handle_record(&run_id, &payload) {
                                return self.phase;
                            }
                        }
                    }
                    Some(Err(e)) => {
                        self.fail(&run_id, e.to_string());
                        return self.phase;
                    }
                    None => {
                        if framer.pending_len() > 0 {
                            tracing::debug!(
                                run_id = %run_id,
                                discarded_bytes = framer.pending_len(),
                                "Discarding unterminated trailing record",
                            );
                        }
                        tracing::info!(
                            run_id = %run_id,
                            frames = self.snapshot.frames.len(),
                            "Detection run completed",
                        );
                        self.phase = RunPhase::Completed;
                        let _ = self.event_tx.send(RunEvent::Completed {
                            snapshot: self.snapshot.clone(),
                        });
                        return self.phase;
                    }
                }
            }
        }
    }

    // ---- private helpers ----

    /// Decode and apply one record. Returns `false` when the run has
    /// reached a terminal phase and reading must stop.
    fn handle_record(&mut self, run_id: &str, payload: &str) -> bool {
        let event = match parse_event(payload) {
            Ok(event) => event,
            Err(e) => {
                // Recoverable: one corrupt record must not abort the run.
                tracing::warn!(
                    run_id = %run_id,
                    error = %e,
                    raw_record = %payload,
                    "Failed to parse stream event",
                );
                return true;
            }
        };

        match event {
            StreamEvent::Error { message } => {
                let message = message.unwrap_or_else(|| GENERIC_UPSTREAM_ERROR.to_string());
                self.fail(run_id, message);
                false
            }
            StreamEvent::DownloadStatus {
                ref percentage,
                ref status,
            } => {
                let percentage = *percentage;
                let status = status.clone();
                self.apply(&event);
                let _ = self.event_tx.send(RunEvent::DownloadProgress {
                    percentage,
                    status,
                });
                if percentage >= 100.0 && !self.download_complete_sent {
                    self.download_complete_sent = true;
                    let _ = self.event_tx.send(RunEvent::DownloadCompleted);
                }
                true
            }
            event => {
                self.apply(&event);
                let _ = self.event_tx.send(RunEvent::StateChanged {
                    snapshot: self.snapshot.clone(),
                });
                true
            }
        }
    }

    fn apply(&mut self, event: &StreamEvent) {
        let next = reduce((*self.snapshot).clone(), event);
        self.snapshot = Arc::new(next);
    }

    fn fail(&mut self, run_id: &str, message: String) {
        tracing::error!(run_id = %run_id, error = %message, "Detection run failed");
        self.phase = RunPhase::Errored;
        let _ = self.event_tx.send(RunEvent::Failed {
            message: message.clone(),
        });
        self.failure = Some(message);
    }
}

impl Default for StreamController {
    fn default() -> Self {
        Self::new()
    }
}
