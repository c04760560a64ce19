//! Stream transport for video-detection runs.
//!
//! Builds the multipart request for the video-detect endpoint and exposes
//! the chunked response body as a [`ChunkStream`]. Exactly one network
//! operation is issued per invocation; all failure modes before the first
//! chunk surface as a [`StreamError`].

use std::pin::Pin;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::multipart::{Form, Part};

/// Raw body chunks of an in-flight detection stream.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, StreamError>> + Send>>;

/// An in-memory video upload.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Parameters for one video-detection run.
///
/// Exactly one of `file` / `file_url` must be set, mirroring the
/// service's mutually-exclusive multipart fields.
#[derive(Debug, Clone)]
pub struct VideoStreamRequest {
    pub file: Option<VideoUpload>,
    pub file_url: Option<String>,
    pub frames_per_second: u32,
    pub confidence_threshold: f32,
    /// Ask the service to render an annotated output video.
    pub create_video: bool,
    /// Run secondary classification on every detection.
    pub enable_classification: bool,
}

impl VideoStreamRequest {
    /// Request streaming detection of an uploaded video.
    pub fn from_file(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file: Some(VideoUpload {
                file_name: file_name.into(),
                bytes,
            }),
            file_url: None,
            ..Self::defaults()
        }
    }

    /// Request streaming detection of a video the service downloads
    /// itself.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            file: None,
            file_url: Some(url.into()),
            ..Self::defaults()
        }
    }

    fn defaults() -> Self {
        Self {
            file: None,
            file_url: None,
            frames_per_second: logolens_core::config::DEFAULT_FRAMES_PER_SECOND,
            confidence_threshold: logolens_core::config::DEFAULT_CONFIDENCE_THRESHOLD,
            create_video: false,
            enable_classification: false,
        }
    }

    /// Check the exactly-one-source constraint.
    pub fn validate_source(&self) -> Result<(), StreamError> {
        match (&self.file, &self.file_url) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(StreamError::MissingSource),
        }
    }

    /// Build the multipart form the video-detect endpoint expects.
    ///
    /// Numbers are stringified, matching the service's form-field
    /// contract.
    fn into_form(self) -> Form {
        let mut form = Form::new();
        if let Some(upload) = self.file {
            form = form.part(
                "file",
                Part::bytes(upload.bytes).file_name(upload.file_name),
            );
        } else if let Some(url) = self.file_url {
            form = form.text("file_url", url);
        }
        form.text("frames_per_second", self.frames_per_second.to_string())
            .text(
                "confidence_threshold",
                self.confidence_threshold.to_string(),
            )
            .text("create_video", self.create_video.to_string())
            .text(
                "enable_classification",
                self.enable_classification.to_string(),
            )
    }
}

/// Errors raised by the stream transport.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Neither or both of file / file_url were supplied. Raised before
    /// any network activity.
    #[error("Either a video file or a file URL must be provided (exactly one)")]
    MissingSource,

    /// Network-level failure: DNS, connection reset, mid-stream cut.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The service rejected the request before streaming began.
    #[error("Detection service error ({status}): {detail}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided detail when available, generic otherwise.
        detail: String,
    },
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Open a detection stream against the video-detect endpoint.
///
/// Validates the source constraint, issues the single multipart POST, and
/// returns the chunked body as a [`ChunkStream`]. A non-success status
/// before streaming begins is reported with the server's `detail` message
/// when the body carries one.
pub async fn open_video_stream(
    client: &reqwest::Client,
    base_url: &str,
    request: VideoStreamRequest,
) -> Result<ChunkStream, StreamError> {
    request.validate_source()?;

    let url = format!("{base_url}/video/detect");
    let response = client
        .post(&url)
        .multipart(request.into_form())
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(StreamError::Api {
            status: status.as_u16(),
            detail: extract_detail(&body),
        });
    }

    let stream = response.bytes_stream().map(|result| result.map_err(StreamError::from));
    Ok(Box::pin(stream))
}

/// Pull the `detail` field out of an error body, falling back to a
/// generic message.
fn extract_detail(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
        .unwrap_or_else(|| "Video processing failed".to_string())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn missing_both_sources_is_rejected() {
        let request = VideoStreamRequest {
            file: None,
            file_url: None,
            ..VideoStreamRequest::from_url("unused")
        };
        assert_matches!(request.validate_source(), Err(StreamError::MissingSource));
    }

    #[test]
    fn both_sources_is_rejected() {
        let mut request = VideoStreamRequest::from_file("clip.mp4", vec![0u8; 4]);
        request.file_url = Some("http://example.com/clip.mp4".to_string());
        assert_matches!(request.validate_source(), Err(StreamError::MissingSource));
    }

    #[test]
    fn single_source_is_accepted() {
        assert!(VideoStreamRequest::from_file("clip.mp4", vec![0u8; 4])
            .validate_source()
            .is_ok());
        assert!(VideoStreamRequest::from_url("http://example.com/clip.mp4")
            .validate_source()
            .is_ok());
    }

    #[test]
    fn detail_extracted_from_error_body() {
        assert_eq!(
            extract_detail(r#"{"detail":"Unsupported codec"}"#),
            "Unsupported codec"
        );
    }

    #[test]
    fn detail_falls_back_on_non_json_body() {
        assert_eq!(extract_detail("<html>502</html>"), "Video processing failed");
    }
}
