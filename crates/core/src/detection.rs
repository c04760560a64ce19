//! Detection and frame record types.
//!
//! These mirror the detection service's JSON contract: a [`Detection`] is
//! one located brand instance within an image or sampled video frame, a
//! [`FrameRecord`] is one sampled frame together with everything detected
//! in it.

use serde::{Deserialize, Serialize};

use crate::types::FrameNumber;

/// Secondary, finer-grained label attached to a detection when the
/// classification stage is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub class_id: i64,
    pub class_name: String,
    /// Classifier confidence in [0, 1].
    pub confidence: f32,
}

/// One located, classified object instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Bounding box as `[x1, y1, x2, y2]` in source-image pixel space.
    ///
    /// The producer guarantees non-negative coordinates with `x1 <= x2`
    /// and `y1 <= y2`, but consumers must tolerate violations — use
    /// [`bbox_is_well_formed`](Self::bbox_is_well_formed) to check.
    pub bbox: [f32; 4],
    /// Detector confidence in [0, 1].
    pub confidence: f32,
    pub class_id: i64,
    pub class_name: String,
    /// Secondary classification results, highest confidence first when
    /// the producer sorts them. Empty when classification is disabled.
    #[serde(default)]
    pub classification: Vec<Classification>,
}

impl Detection {
    /// Whether the bounding box satisfies the producer-side invariant
    /// (non-negative, `x1 <= x2`, `y1 <= y2`).
    pub fn bbox_is_well_formed(&self) -> bool {
        let [x1, y1, x2, y2] = self.bbox;
        x1 >= 0.0 && y1 >= 0.0 && x1 <= x2 && y1 <= y2
    }

    /// The highest-confidence secondary classification, if any.
    pub fn top_classification(&self) -> Option<&Classification> {
        self.classification
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }
}

/// One sampled instant from a video with its detected objects.
///
/// Identity key is `frame_number`; display order is ascending by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub frame_number: FrameNumber,
    /// URL of the annotated frame image, when the service rendered one.
    pub frame_url: Option<String>,
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub total_detections: u32,
    /// Position of the frame in the source video, in seconds.
    pub timestamp: Option<f64>,
}
