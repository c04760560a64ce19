//! Stream event types and parser.
//!
//! The video-detect endpoint responds with a chunked body of
//! newline-delimited records; each payload is a JSON object tagged by a
//! `"type"` field with the remaining fields alongside it. This module
//! deserializes payloads into a strongly-typed [`StreamEvent`] enum.

use serde::Deserialize;

use logolens_core::detection::Detection;
use logolens_core::session::SessionSummary;
use logolens_core::types::{CsvFileMap, FrameNumber, LogoCounts};

/// All known stream event types.
///
/// Deserialized via the internally-tagged `"type"` field; payload fields
/// sit flat beside the tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Run preamble: the service has probed the video and is processing.
    Status {
        estimated_total_frames: Option<u64>,
    },

    /// One sampled frame with its detections.
    Frame(FrameMessage),

    /// Session aggregate update (id, per-logo totals, realtime CSV files).
    Summary(SummaryMessage),

    /// All frames processed; annotated-video rendering may follow.
    Complete(CompletionMessage),

    /// The annotated output video is ready.
    VideoReady(CompletionMessage),

    /// Progress of the source-video download on the service side.
    DownloadStatus {
        #[serde(default)]
        percentage: f32,
        #[serde(default)]
        status: String,
    },

    /// The run failed upstream. Terminal: the carried message is the
    /// user-visible failure reason and no further records follow.
    Error { message: Option<String> },
}

/// Payload for `frame` events.
#[derive(Debug, Clone, Deserialize)]
pub struct FrameMessage {
    pub frame_number: FrameNumber,
    pub frame_url: Option<String>,
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub total_detections: u32,
    /// Position in the source video, in seconds.
    pub timestamp: Option<f64>,
    /// Actual frame total, once the service knows it.
    pub total_frames: Option<u64>,
    /// Legacy producers embed the session aggregate here instead of
    /// sending a separate `summary` event.
    pub session_summary: Option<SessionSummary>,
    pub processed_video_url: Option<String>,
}

/// Payload for `summary` events.
#[derive(Debug, Clone, Deserialize)]
pub struct SummaryMessage {
    pub session_id: Option<String>,
    pub logo_totals: Option<LogoCounts>,
    pub total_frames_processed: Option<u64>,
    pub realtime_csv_files: Option<CsvFileMap>,
    pub processed_video_url: Option<String>,
}

/// Shared payload for `complete` and `video_ready` events.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionMessage {
    pub total_frames: Option<u64>,
    pub processed_video_url: Option<String>,
    pub session_summary: Option<SessionSummary>,
}

impl StreamEvent {
    /// The annotated-video URL, whichever event type carried it.
    ///
    /// Applied by the reducer after the type-specific rule, so a producer
    /// may attach the URL to any of the carrying variants.
    pub fn processed_video_url(&self) -> Option<&str> {
        match self {
            Self::Frame(m) => m.processed_video_url.as_deref(),
            Self::Summary(m) => m.processed_video_url.as_deref(),
            Self::Complete(m) | Self::VideoReady(m) => m.processed_video_url.as_deref(),
            _ => None,
        }
    }

    /// A legacy embedded session aggregate, whichever event carried it.
    pub fn session_summary(&self) -> Option<&SessionSummary> {
        match self {
            Self::Frame(m) => m.session_summary.as_ref(),
            Self::Complete(m) | Self::VideoReady(m) => m.session_summary.as_ref(),
            _ => None,
        }
    }
}

/// Parse one record payload into a typed event.
///
/// Returns `Err` for malformed JSON or unknown `type` values. Callers
/// should log the failure and continue — one corrupt record must not
/// abort the run.
pub fn parse_event(payload: &str) -> Result<StreamEvent, serde_json::Error> {
    serde_json::from_str(payload)
}
