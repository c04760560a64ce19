//! Detector configuration constants, types, and validation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defaults and bounds
// ---------------------------------------------------------------------------

/// Default video sampling rate.
pub const DEFAULT_FRAMES_PER_SECOND: u32 = 5;
/// Default detector confidence threshold.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;
/// Upper bound on the sampling rate the service accepts.
pub const MAX_FRAMES_PER_SECOND: u32 = 60;

// ---------------------------------------------------------------------------
// Config type
// ---------------------------------------------------------------------------

/// Shared detector settings, as served and accepted by the config endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub frames_per_second: u32,
    pub confidence_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            frames_per_second: DEFAULT_FRAMES_PER_SECOND,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl DetectorConfig {
    /// Validate both fields, reporting the first violation.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_frames_per_second(self.frames_per_second)?;
        validate_confidence_threshold(self.confidence_threshold)
    }
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate that the sampling rate is positive and within service bounds.
pub fn validate_frames_per_second(fps: u32) -> Result<(), CoreError> {
    if fps == 0 {
        return Err(CoreError::Validation(
            "frames_per_second must be positive".to_string(),
        ));
    }
    if fps > MAX_FRAMES_PER_SECOND {
        return Err(CoreError::Validation(format!(
            "frames_per_second must be at most {MAX_FRAMES_PER_SECOND}, got {fps}"
        )));
    }
    Ok(())
}

/// Validate that a confidence threshold lies in [0, 1].
pub fn validate_confidence_threshold(threshold: f32) -> Result<(), CoreError> {
    if !(0.0..=1.0).contains(&threshold) || threshold.is_nan() {
        return Err(CoreError::Validation(format!(
            "confidence_threshold must be in [0, 1], got {threshold}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_fps_rejected() {
        assert!(validate_frames_per_second(0).is_err());
    }

    #[test]
    fn excessive_fps_rejected() {
        assert!(validate_frames_per_second(MAX_FRAMES_PER_SECOND + 1).is_err());
    }

    #[test]
    fn boundary_fps_accepted() {
        assert!(validate_frames_per_second(MAX_FRAMES_PER_SECOND).is_ok());
    }

    #[test]
    fn confidence_bounds_enforced() {
        assert!(validate_confidence_threshold(0.0).is_ok());
        assert!(validate_confidence_threshold(1.0).is_ok());
        assert!(validate_confidence_threshold(-0.1).is_err());
        assert!(validate_confidence_threshold(1.1).is_err());
        assert!(validate_confidence_threshold(f32::NAN).is_err());
    }
}
