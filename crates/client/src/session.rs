//! Session state and the event reducer.
//!
//! [`SessionState`] is the accumulator for one video-detection run. It is
//! owned by the active [`StreamController`](crate::controller::StreamController)
//! and advanced exclusively through [`reduce`], a pure fold step over
//! decoded [`StreamEvent`]s. External consumers only ever read snapshots.

use std::collections::BTreeMap;

use serde::Serialize;

use logolens_core::detection::FrameRecord;
use logolens_core::session::SessionSummary;
use logolens_core::types::{CsvFileMap, FrameNumber, LogoCounts};

use crate::messages::{CompletionMessage, FrameMessage, StreamEvent};

/// Progress of the service-side source-video download, independent of
/// frame progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadProgress {
    pub percentage: f32,
    pub status: String,
}

/// Accumulated state of one video-detection run.
///
/// Created empty when a run starts, rebuilt fully per run, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    /// Frame records keyed by frame number; upsert on re-delivery, display
    /// order ascending by key.
    pub frames: BTreeMap<FrameNumber, FrameRecord>,
    /// Frame number of the latest `frame` event. Monotonic under a
    /// well-formed stream, but the reducer does not assume it.
    pub progress: FrameNumber,
    /// Best current estimate of the total frame count, refined as the
    /// stream progresses (status estimate, frame-embedded totals, then
    /// the completion events).
    pub total_frames: u64,
    pub session_id: Option<String>,
    /// Per-logo totals, replaced wholesale on each summary.
    pub logo_counts: LogoCounts,
    pub processed_video_url: Option<String>,
    pub download_progress: Option<DownloadProgress>,
    /// The service is rendering the annotated output video.
    pub is_video_creating: bool,
    /// Frames are still being processed.
    pub is_video_processing: bool,
    /// Realtime CSV exports, replaced wholesale when a summary carries
    /// them.
    pub realtime_csv_files: CsvFileMap,
}

impl SessionState {
    /// Total detections across all accumulated frames.
    pub fn total_detections(&self) -> u64 {
        self.frames.values().map(|f| u64::from(f.total_detections)).sum()
    }

    /// Frame records in ascending frame order.
    pub fn frames_ordered(&self) -> impl Iterator<Item = &FrameRecord> {
        self.frames.values()
    }
}

/// Advance the state by one decoded event.
///
/// Pure fold step: takes the current state by value, returns the next.
/// Event order matters — later events are allowed to overwrite earlier
/// derived fields — but re-reducing an identical `frame` event is a
/// no-op thanks to upsert semantics.
pub fn reduce(state: SessionState, event: &StreamEvent) -> SessionState {
    let mut next = state;

    match event {
        StreamEvent::Status {
            estimated_total_frames,
        } => {
            if let Some(estimate) = estimated_total_frames {
                next.total_frames = *estimate;
            }
            next.is_video_processing = true;
        }

        StreamEvent::Frame(frame) => {
            next.frames.insert(frame.frame_number, frame_record(frame));
            next.progress = frame.frame_number;
            if let Some(total) = frame.total_frames {
                next.total_frames = total;
            }
        }

        StreamEvent::Summary(summary) => {
            if let Some(session_id) = &summary.session_id {
                next.session_id = Some(session_id.clone());
            }
            if let Some(logo_totals) = &summary.logo_totals {
                next.logo_counts = logo_totals.clone();
            }
            if let Some(csv_files) = &summary.realtime_csv_files {
                next.realtime_csv_files = csv_files.clone();
            }
        }

        StreamEvent::Complete(completion) => {
            next.is_video_creating = true;
            next.is_video_processing = false;
            apply_completion(&mut next, completion);
        }

        StreamEvent::VideoReady(completion) => {
            next.is_video_creating = false;
            next.is_video_processing = false;
            apply_completion(&mut next, completion);
        }

        StreamEvent::DownloadStatus { percentage, status } => {
            next.download_progress = Some(DownloadProgress {
                percentage: *percentage,
                status: status.clone(),
            });
        }

        // Terminal handling is the controller's job; an error event does
        // not change accumulated state.
        StreamEvent::Error { .. } => {}
    }

    // Legacy producers embed the session aggregate inside frame events;
    // normalize it to the same effect as a summary event.
    if let Some(summary) = event.session_summary() {
        apply_embedded_summary(&mut next, summary);
    }

    // Cross-cutting: whichever event carries the output URL sets it.
    if let Some(url) = event.processed_video_url() {
        next.processed_video_url = Some(url.to_string());
    }

    next
}

// ---------------------------------------------------------------------------
// Reduction helpers
// ---------------------------------------------------------------------------

fn frame_record(frame: &FrameMessage) -> FrameRecord {
    FrameRecord {
        frame_number: frame.frame_number,
        frame_url: frame.frame_url.clone(),
        detections: frame.detections.clone(),
        total_detections: frame.total_detections,
        timestamp: frame.timestamp,
    }
}

fn apply_completion(state: &mut SessionState, completion: &CompletionMessage) {
    state.total_frames = completion
        .total_frames
        .unwrap_or(state.frames.len() as u64);
    if let Some(url) = &completion.processed_video_url {
        state.processed_video_url = Some(url.clone());
    }
}

fn apply_embedded_summary(state: &mut SessionState, summary: &SessionSummary) {
    state.session_id = Some(summary.session_id.clone());
    state.logo_counts = summary.logo_totals.clone();
    if let Some(csv_files) = &summary.realtime_csv_files {
        state.realtime_csv_files = csv_files.clone();
    }
}
