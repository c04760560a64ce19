use std::collections::HashMap;

/// Frame indices are non-negative and may exceed 32 bits for long runs.
pub type FrameNumber = u64;

/// Per-brand detection counts, keyed by class name.
pub type LogoCounts = HashMap<String, u64>;

/// Realtime CSV exports, keyed by logical name (e.g. `"detections"`),
/// valued by server-side file path.
pub type CsvFileMap = HashMap<String, String>;
