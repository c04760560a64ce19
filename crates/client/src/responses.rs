//! Typed response payloads for the detection service's REST endpoints.
//!
//! Field names match the service contract verbatim; everything here is
//! deserialize-only from the client's point of view.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;

use logolens_core::detection::{Classification, Detection};
use logolens_core::types::CsvFileMap;

/// `GET /health`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

// ---------------------------------------------------------------------------
// Model weights
// ---------------------------------------------------------------------------

/// One selectable model weight file.
#[derive(Debug, Clone, Deserialize)]
pub struct WeightInfo {
    pub name: String,
    pub path: String,
    /// File size in bytes.
    pub size: u64,
    pub description: Option<String>,
}

/// `GET /weights` and `GET /classification/weights`.
#[derive(Debug, Clone, Deserialize)]
pub struct WeightsResponse {
    pub available_weights: Vec<WeightInfo>,
    pub current_weight: String,
}

// ---------------------------------------------------------------------------
// Image detection & classification
// ---------------------------------------------------------------------------

/// Detection output for a single image.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionResult {
    #[serde(default)]
    pub detections: Vec<Detection>,
    #[serde(default)]
    pub total_detections: u32,
    /// Source image `[width, height]`, when the service reports it.
    pub image_size: Option<[u32; 2]>,
    /// Data URL of the annotated image, when rendering was requested.
    pub annotated_image: Option<String>,
    /// Per-image failure; the batch itself still succeeds.
    pub error: Option<String>,
}

/// `POST /images/detect`.
#[derive(Debug, Clone, Deserialize)]
pub struct MultipleImagesResponse {
    pub results: Vec<DetectionResult>,
}

/// Classification output for a single image.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationResult {
    #[serde(default)]
    pub classifications: Vec<Classification>,
    pub top_prediction: Option<Classification>,
    pub filename: String,
    pub error: Option<String>,
}

/// `POST /classification/images/classify`.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassificationResponse {
    pub results: Vec<ClassificationResult>,
}

// ---------------------------------------------------------------------------
// CSV exports
// ---------------------------------------------------------------------------

/// `POST /session/export-csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct CsvExportResponse {
    pub message: String,
    pub csv_files: CsvFileMap,
    pub session_id: String,
}

/// One exported CSV file on the service host.
#[derive(Debug, Clone, Deserialize)]
pub struct CsvFile {
    pub filename: String,
    pub path: String,
    /// File size in bytes.
    pub size: u64,
    pub created: DateTime<Utc>,
}

/// `GET /csv-files`.
#[derive(Debug, Clone, Deserialize)]
pub struct CsvFilesResponse {
    pub csv_files: Vec<CsvFile>,
}

/// `GET /session/{id}/realtime-csv`.
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeCsvResponse {
    pub csv_files: CsvFileMap,
    pub session_id: String,
}

// ---------------------------------------------------------------------------
// Dashboard stats
// ---------------------------------------------------------------------------

/// `GET /dashboard/stats`.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardStats {
    pub overview: OverviewStats,
    pub top_brands: Vec<BrandStats>,
    pub top_assets: Vec<AssetStats>,
    /// Per-brand asset breakdown, keyed by brand name.
    #[serde(default)]
    pub assets_per_brand: HashMap<String, Vec<AssetCount>>,
    pub detection_types: DetectionTypeCounts,
    #[serde(default)]
    pub recent_activity: Vec<ActivityEntry>,
    #[serde(default)]
    pub processing_queue: Vec<QueueEntry>,
    #[serde(default)]
    pub brand_distribution: Vec<BrandDistributionPoint>,
}

/// Headline counters.
#[derive(Debug, Clone, Deserialize)]
pub struct OverviewStats {
    pub total_detections: u64,
    pub images_processed: u64,
    pub videos_processed: u64,
    pub total_sessions: u64,
    pub total_assets: u64,
}

/// One brand's share of all detections.
#[derive(Debug, Clone, Deserialize)]
pub struct BrandStats {
    pub name: String,
    pub detections: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetStats {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetCount {
    pub asset_name: String,
    pub count: u64,
}

/// Detection counts split by media type.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionTypeCounts {
    pub video: u64,
    pub image: u64,
}

/// One row of the recent-activity feed.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub session_id: String,
    /// `"video"` or `"image"`.
    #[serde(rename = "type")]
    pub media_type: String,
    pub name: String,
    pub detections: u64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// One in-flight run in the processing queue.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueEntry {
    pub session_id: String,
    pub name: String,
    /// Completion percentage (0-100).
    pub progress: f64,
    pub status: String,
}

/// One point of the brand-distribution time series: a date plus dynamic
/// per-brand detection counts.
#[derive(Debug, Clone, Deserialize)]
pub struct BrandDistributionPoint {
    pub date: String,
    #[serde(flatten)]
    pub counts: HashMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_distribution_flattens_dynamic_keys() {
        let json = r#"{"date":"2025-06-01","Nike":4,"Adidas":1}"#;
        let point: BrandDistributionPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.date, "2025-06-01");
        assert_eq!(point.counts.get("Nike"), Some(&4));
        assert_eq!(point.counts.get("Adidas"), Some(&1));
    }

    #[test]
    fn dashboard_stats_decodes_full_payload() {
        let json = r#"{
            "overview": {
                "total_detections": 120,
                "images_processed": 30,
                "videos_processed": 4,
                "total_sessions": 34,
                "total_assets": 12
            },
            "top_brands": [
                {"name": "Nike", "detections": 80, "percentage": 66.7}
            ],
            "top_assets": [{"name": "billboard.jpg", "count": 9}],
            "assets_per_brand": {
                "Nike": [{"asset_name": "billboard.jpg", "count": 9}]
            },
            "detection_types": {"video": 90, "image": 30},
            "recent_activity": [{
                "id": 1,
                "session_id": "s-9",
                "type": "video",
                "name": "match.mp4",
                "detections": 41,
                "status": "completed",
                "created_at": "2025-06-01T10:00:00Z"
            }],
            "processing_queue": [{
                "session_id": "s-10",
                "name": "ad.mp4",
                "progress": 55.0,
                "status": "processing"
            }]
        }"#;
        let stats: DashboardStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.overview.total_detections, 120);
        assert_eq!(stats.top_brands[0].name, "Nike");
        assert_eq!(stats.recent_activity[0].media_type, "video");
        assert_eq!(stats.processing_queue[0].progress, 55.0);
        assert!(stats.brand_distribution.is_empty());
    }

    #[test]
    fn detection_result_tolerates_per_image_error() {
        let json = r#"{"error": "unreadable image"}"#;
        let result: DetectionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.error.as_deref(), Some("unreadable image"));
        assert!(result.detections.is_empty());
    }
}
