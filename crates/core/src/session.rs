//! Session summaries and logo analytics.
//!
//! A session is one end-to-end processing run identified by a server-side
//! session id. [`SessionSummary`] is the service's aggregate for that run;
//! the pure helpers below derive the dashboard's top-brand views from a
//! logo-count map.

use serde::{Deserialize, Serialize};

use crate::types::{CsvFileMap, LogoCounts};

/// Aggregate results for one processing session.
///
/// Returned by the session-summary endpoint, and also embedded by legacy
/// producers inside frame events of the video stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    #[serde(default)]
    pub total_frames_processed: u64,
    #[serde(default)]
    pub logo_totals: LogoCounts,
    #[serde(default)]
    pub total_detections: u64,
    #[serde(default)]
    pub unique_logos: Vec<String>,
    pub realtime_csv_files: Option<CsvFileMap>,
}

// ---------------------------------------------------------------------------
// Logo analytics
// ---------------------------------------------------------------------------

/// The `n` most-detected logos, count descending.
///
/// Ties break by name ascending so repeated calls over the same counts
/// produce a stable ordering.
pub fn top_logos(counts: &LogoCounts, n: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(String, u64)> =
        counts.iter().map(|(name, &count)| (name.clone(), count)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(n);
    entries
}

/// Per-logo share of all detections, as a percentage in [0, 100].
///
/// Returns an empty vec when the counts sum to zero.
pub fn logo_percentages(counts: &LogoCounts) -> Vec<(String, f64)> {
    let total: u64 = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }
    let mut entries: Vec<(String, f64)> = counts
        .iter()
        .map(|(name, &count)| (name.clone(), count as f64 / total as f64 * 100.0))
        .collect();
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}
