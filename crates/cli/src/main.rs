//! Command-line runner for the logolens detection pipeline.
//!
//! Streams one video (local file or remote URL) through the detection
//! service and logs progress and final results. Configuration comes from
//! the environment:
//!
//! * `LOGOLENS_API_URL`    - service base URL (default `http://localhost:8000/api`)
//! * `LOGOLENS_FPS`        - sampling rate (default 5)
//! * `LOGOLENS_CONFIDENCE` - confidence threshold (default 0.5)
//! * `LOGOLENS_CLASSIFY`   - enable secondary classification (default true)

use std::path::Path;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logolens_client::api::DetectorApi;
use logolens_client::controller::{RunPhase, StreamController};
use logolens_client::events::RunEvent;
use logolens_client::stream::VideoStreamRequest;
use logolens_core::config::{
    validate_confidence_threshold, validate_frames_per_second, DEFAULT_CONFIDENCE_THRESHOLD,
    DEFAULT_FRAMES_PER_SECOND,
};
use logolens_core::session::top_logos;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "logolens=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_url = std::env::var("LOGOLENS_API_URL")
        .unwrap_or_else(|_| "http://localhost:8000/api".to_string());
    let source = std::env::args()
        .nth(1)
        .context("usage: logolens <video-path-or-url>")?;

    let frames_per_second = env_parse("LOGOLENS_FPS", DEFAULT_FRAMES_PER_SECOND)?;
    let confidence_threshold = env_parse("LOGOLENS_CONFIDENCE", DEFAULT_CONFIDENCE_THRESHOLD)?;
    let enable_classification = env_parse("LOGOLENS_CLASSIFY", true)?;
    validate_frames_per_second(frames_per_second)?;
    validate_confidence_threshold(confidence_threshold)?;

    let mut request = if source.starts_with("http://") || source.starts_with("https://") {
        VideoStreamRequest::from_url(&source)
    } else {
        let bytes = tokio::fs::read(&source)
            .await
            .with_context(|| format!("Failed to read video file {source}"))?;
        let file_name = Path::new(&source)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string());
        VideoStreamRequest::from_file(file_name, bytes)
    };
    request.frames_per_second = frames_per_second;
    request.confidence_threshold = confidence_threshold;
    request.enable_classification = enable_classification;

    let api = DetectorApi::new(base_url);
    let chunks = api.stream_video(request).await?;

    let mut controller = StreamController::new();
    let events = controller.subscribe();
    let logger = tokio::spawn(log_run_events(events));

    // Ctrl-C stops the run but keeps the partial results.
    let cancel = controller.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let phase = controller.run(chunks).await;
    logger.abort();

    let state = controller.state();
    tracing::info!(
        frames = state.frames.len(),
        detections = state.total_detections(),
        session_id = state.session_id.as_deref().unwrap_or("-"),
        "Final results",
    );
    for (logo, count) in top_logos(&state.logo_counts, 5) {
        tracing::info!(logo = %logo, count, "Top logo");
    }
    if let Some(url) = &state.processed_video_url {
        tracing::info!(url = %url, "Annotated video available");
    }

    if phase == RunPhase::Errored {
        anyhow::bail!(
            "run failed: {}",
            controller.failure().unwrap_or("unknown error")
        );
    }
    Ok(())
}

/// Forward run events to the log until the controller goes away.
async fn log_run_events(
    mut events: tokio::sync::broadcast::Receiver<RunEvent>,
) {
    loop {
        match events.recv().await {
            Ok(RunEvent::Started { run_id }) => {
                tracing::info!(run_id = %run_id, "Run started");
            }
            Ok(RunEvent::StateChanged { snapshot }) => {
                tracing::debug!(
                    progress = snapshot.progress,
                    total_frames = snapshot.total_frames,
                    frames = snapshot.frames.len(),
                    "Progress",
                );
            }
            Ok(RunEvent::DownloadProgress { percentage, status }) => {
                tracing::info!(percentage, status = %status, "Source download");
            }
            Ok(RunEvent::DownloadCompleted) => {
                tracing::info!("Source download completed");
            }
            Ok(RunEvent::Completed { snapshot }) => {
                tracing::info!(frames = snapshot.frames.len(), "Run completed");
            }
            Ok(RunEvent::Failed { message }) => {
                tracing::error!(error = %message, "Run failed");
            }
            Ok(RunEvent::Cancelled) => {
                tracing::info!("Run cancelled, partial results kept");
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event logger lagged");
            }
            Err(RecvError::Closed) => return,
        }
    }
}

/// Read a value from the environment, falling back to a default.
fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value for {name}: {raw}")),
        Err(_) => Ok(default),
    }
}
