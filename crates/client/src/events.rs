//! Run-level events emitted by the stream controller.
//!
//! These are the notifications external consumers (a dashboard, the CLI)
//! subscribe to. They carry state snapshots, never mutable access — the
//! active controller is the sole writer of session state.

use std::sync::Arc;

use crate::session::SessionState;

/// An observer notification for one video-detection run.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// The run has started streaming.
    Started {
        /// Client-generated correlation id for this run.
        run_id: String,
    },

    /// A non-terminal event was reduced into the state.
    StateChanged { snapshot: Arc<SessionState> },

    /// Progress of the service-side source download. Orthogonal to frame
    /// progress; causes no phase transition.
    DownloadProgress { percentage: f32, status: String },

    /// The source download reached 100%. Fired at most once per run.
    DownloadCompleted,

    /// The stream ended normally.
    Completed { snapshot: Arc<SessionState> },

    /// The run failed: transport error or an upstream error event.
    Failed { message: String },

    /// The run was cancelled; partial state is retained on the
    /// controller.
    Cancelled,
}
