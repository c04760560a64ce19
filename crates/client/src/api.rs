//! REST API client for the detection service's HTTP endpoints.
//!
//! Wraps health/config, model-weight management, image detection and
//! classification, session analytics, and CSV export using [`reqwest`].
//! The streaming video endpoint lives in [`crate::stream`] and is reached
//! through [`DetectorApi::stream_video`].

use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

use logolens_core::config::DetectorConfig;
use logolens_core::session::SessionSummary;

use crate::responses::{
    ClassificationResponse, CsvExportResponse, CsvFilesResponse, DashboardStats, HealthResponse,
    MultipleImagesResponse, RealtimeCsvResponse, WeightsResponse,
};
use crate::stream::{open_video_stream, ChunkStream, StreamError, VideoStreamRequest};

/// An in-memory image upload for the batch endpoints.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// HTTP client for one detection service deployment.
pub struct DetectorApi {
    client: reqwest::Client,
    base_url: String,
}

/// Errors from the REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum DetectorApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Detection service error ({status}): {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided `detail` when available, else the raw body.
        detail: String,
    },
}

impl DetectorApi {
    /// Create an API client for a service deployment.
    ///
    /// * `base_url` - Base API URL, e.g. `http://localhost:8000/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (useful for connection pooling across deployments).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Base API URL this client targets.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ---- health & config ----

    /// `GET /health` — service liveness and model readiness.
    pub async fn health(&self) -> Result<HealthResponse, DetectorApiError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /config` — current shared detector settings.
    pub async fn get_config(&self) -> Result<DetectorConfig, DetectorApiError> {
        let response = self
            .client
            .get(format!("{}/config", self.base_url))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /config` — update the shared detector settings.
    pub async fn update_config(&self, config: &DetectorConfig) -> Result<(), DetectorApiError> {
        let response = self
            .client
            .post(format!("{}/config", self.base_url))
            .json(config)
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- model weights ----

    /// `GET /weights` — detection weights available on the service.
    pub async fn weights(&self) -> Result<WeightsResponse, DetectorApiError> {
        let response = self
            .client
            .get(format!("{}/weights", self.base_url))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /weights/switch` — switch the active detection weight.
    pub async fn switch_weight(&self, weight_name: &str) -> Result<(), DetectorApiError> {
        let body = serde_json::json!({ "weight_name": weight_name });
        let response = self
            .client
            .post(format!("{}/weights/switch", self.base_url))
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// `GET /classification/weights` — classifier weights available.
    pub async fn classification_weights(&self) -> Result<WeightsResponse, DetectorApiError> {
        let response = self
            .client
            .get(format!("{}/classification/weights", self.base_url))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /classification/weights/switch` — switch the active
    /// classifier weight.
    pub async fn switch_classification_weight(
        &self,
        weight_name: &str,
    ) -> Result<(), DetectorApiError> {
        let body = serde_json::json!({ "weight_name": weight_name });
        let response = self
            .client
            .post(format!("{}/classification/weights/switch", self.base_url))
            .json(&body)
            .send()
            .await?;
        Self::check_status(response).await
    }

    // ---- image detection & classification ----

    /// `POST /images/detect` — run detection over a batch of images.
    ///
    /// Results come back in upload order, one entry per image; a
    /// per-image failure is carried in that entry's `error` field.
    pub async fn detect_images(
        &self,
        files: Vec<ImageUpload>,
        confidence_threshold: f32,
    ) -> Result<MultipleImagesResponse, DetectorApiError> {
        let mut form = Form::new();
        for upload in files {
            form = form.part("files", Part::bytes(upload.bytes).file_name(upload.file_name));
        }
        form = form.text("confidence_threshold", confidence_threshold.to_string());

        let response = self
            .client
            .post(format!("{}/images/detect", self.base_url))
            .multipart(form)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /classification/images/classify` — classify a batch of
    /// images, returning the top `top_k` labels per image.
    pub async fn classify_images(
        &self,
        files: Vec<ImageUpload>,
        top_k: u32,
    ) -> Result<ClassificationResponse, DetectorApiError> {
        let mut form = Form::new();
        for upload in files {
            form = form.part("files", Part::bytes(upload.bytes).file_name(upload.file_name));
        }
        form = form.text("top_k", top_k.to_string());

        let response = self
            .client
            .post(format!(
                "{}/classification/images/classify",
                self.base_url
            ))
            .multipart(form)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- sessions & analytics ----

    /// `GET /session/{id}/summary` — aggregate results for one session.
    pub async fn session_summary(
        &self,
        session_id: &str,
    ) -> Result<SessionSummary, DetectorApiError> {
        let response = self
            .client
            .get(format!("{}/session/{}/summary", self.base_url, session_id))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /dashboard/stats` — aggregate analytics for the dashboard.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, DetectorApiError> {
        let response = self
            .client
            .get(format!("{}/dashboard/stats", self.base_url))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    // ---- CSV export ----

    /// `GET /session/{id}/realtime-csv` — CSV files written live during
    /// a run.
    pub async fn realtime_csv_files(
        &self,
        session_id: &str,
    ) -> Result<RealtimeCsvResponse, DetectorApiError> {
        let response = self
            .client
            .get(format!(
                "{}/session/{}/realtime-csv",
                self.base_url, session_id
            ))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `POST /session/export-csv` — export one session's results.
    pub async fn export_session_csv(
        &self,
        session_id: &str,
        filename_prefix: Option<&str>,
    ) -> Result<CsvExportResponse, DetectorApiError> {
        let body = serde_json::json!({
            "session_id": session_id,
            "filename_prefix": filename_prefix,
        });
        let response = self
            .client
            .post(format!("{}/session/export-csv", self.base_url))
            .json(&body)
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `GET /csv-files` — all exported CSV files on the service host.
    pub async fn csv_files(&self) -> Result<CsvFilesResponse, DetectorApiError> {
        let response = self
            .client
            .get(format!("{}/csv-files", self.base_url))
            .send()
            .await?;
        Self::parse_response(response).await
    }

    /// `DELETE /csv-files/cleanup` — prune old exports, keeping at most
    /// `max_files`.
    pub async fn cleanup_csv_files(&self, max_files: u32) -> Result<(), DetectorApiError> {
        let response = self
            .client
            .delete(format!(
                "{}/csv-files/cleanup?max_files={max_files}",
                self.base_url
            ))
            .send()
            .await?;
        Self::check_status(response).await
    }

    /// Absolute download URL for an exported CSV file.
    pub fn csv_download_url(&self, filename: &str) -> String {
        format!("{}/csv-files/download/{filename}", self.base_url)
    }

    // ---- video streaming ----

    /// Open a streaming video-detection run. See [`crate::stream`].
    pub async fn stream_video(
        &self,
        request: VideoStreamRequest,
    ) -> Result<ChunkStream, StreamError> {
        open_video_stream(&self.client, &self.base_url, request).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`DetectorApiError::Api`]
    /// carrying the status and the server's `detail` message on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, DetectorApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            let detail = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
                .unwrap_or(body);
            return Err(DetectorApiError::Api {
                status: status.as_u16(),
                detail,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, DetectorApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), DetectorApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
