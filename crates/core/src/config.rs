//! Immutable per-phase generation settings and their validation.
//!
//! [`AnalysisConfig`] drives Phase 1; [`ImageGenerationConfig`] drives the
//! two image phases and carries the retry/backoff bounds.

use std::time::Duration;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default model for audio analysis.
pub const DEFAULT_ANALYSIS_MODEL: &str = "gemini-2.5-flash";

/// Default model for image generation.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Moderate-low creativity for storyboard inference.
pub const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Upper bound accepted for `temperature`.
pub const MAX_TEMPERATURE: f32 = 2.0;

/// Retries after the first failed image attempt.
pub const DEFAULT_IMAGE_RETRIES: u32 = 2;

/// Lower backoff bound in seconds.
pub const DEFAULT_MIN_WAIT_SECS: f64 = 2.0;

/// Upper backoff bound in seconds.
pub const DEFAULT_MAX_WAIT_SECS: f64 = 10.0;

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    model: String,
    temperature: f32,
}

impl AnalysisConfig {
    /// Build a validated analysis config.
    ///
    /// The model id must be non-blank and `temperature` must be finite and
    /// within `0.0..=MAX_TEMPERATURE`.
    pub fn new(model: impl Into<String>, temperature: f32) -> Result<Self, CoreError> {
        let model = model.into();
        validate_model(&model)?;
        if !temperature.is_finite() || !(0.0..=MAX_TEMPERATURE).contains(&temperature) {
            return Err(CoreError::Validation(format!(
                "temperature must be between 0 and {MAX_TEMPERATURE}, got {temperature}"
            )));
        }
        Ok(Self { model, temperature })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_ANALYSIS_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

// ---------------------------------------------------------------------------
// ImageGenerationConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ImageGenerationConfig {
    model: String,
    retries: u32,
    min_wait: Duration,
    max_wait: Duration,
}

impl ImageGenerationConfig {
    /// Build a validated image config. Waits are given in seconds.
    ///
    /// Both waits must be finite and non-negative, and `min_wait_secs` must
    /// not exceed `max_wait_secs`.
    pub fn new(
        model: impl Into<String>,
        retries: u32,
        min_wait_secs: f64,
        max_wait_secs: f64,
    ) -> Result<Self, CoreError> {
        let model = model.into();
        validate_model(&model)?;
        let min_wait = wait_from_secs("min_wait", min_wait_secs)?;
        let max_wait = wait_from_secs("max_wait", max_wait_secs)?;
        if min_wait > max_wait {
            return Err(CoreError::Validation(format!(
                "min_wait ({min_wait_secs}s) must not exceed max_wait ({max_wait_secs}s)"
            )));
        }
        Ok(Self {
            model,
            retries,
            min_wait,
            max_wait,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Total attempts per image: the first try plus `retries`.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    pub fn min_wait(&self) -> Duration {
        self.min_wait
    }

    pub fn max_wait(&self) -> Duration {
        self.max_wait
    }
}

impl Default for ImageGenerationConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_IMAGE_MODEL.to_string(),
            retries: DEFAULT_IMAGE_RETRIES,
            min_wait: Duration::from_secs_f64(DEFAULT_MIN_WAIT_SECS),
            max_wait: Duration::from_secs_f64(DEFAULT_MAX_WAIT_SECS),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_model(model: &str) -> Result<(), CoreError> {
    if model.trim().is_empty() {
        return Err(CoreError::Validation(
            "model identifier must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn wait_from_secs(field: &str, secs: f64) -> Result<Duration, CoreError> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be a finite, non-negative number of seconds, got {secs}"
        )));
    }
    Ok(Duration::from_secs_f64(secs))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- AnalysisConfig ------------------------------------------------------

    #[test]
    fn analysis_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.model(), DEFAULT_ANALYSIS_MODEL);
        assert_eq!(config.temperature(), 0.4);
    }

    #[test]
    fn analysis_accepts_bounds() {
        assert!(AnalysisConfig::new("m", 0.0).is_ok());
        assert!(AnalysisConfig::new("m", MAX_TEMPERATURE).is_ok());
    }

    #[test]
    fn analysis_rejects_bad_temperature() {
        assert!(AnalysisConfig::new("m", -0.1).is_err());
        assert!(AnalysisConfig::new("m", 2.5).is_err());
        assert!(AnalysisConfig::new("m", f32::NAN).is_err());
    }

    #[test]
    fn analysis_rejects_blank_model() {
        assert!(AnalysisConfig::new("   ", 0.4).is_err());
    }

    // -- ImageGenerationConfig -----------------------------------------------

    #[test]
    fn image_defaults() {
        let config = ImageGenerationConfig::default();
        assert_eq!(config.model(), DEFAULT_IMAGE_MODEL);
        assert_eq!(config.retries(), 2);
        assert_eq!(config.max_attempts(), 3);
        assert_eq!(config.min_wait(), Duration::from_secs(2));
        assert_eq!(config.max_wait(), Duration::from_secs(10));
    }

    #[test]
    fn image_zero_waits_allowed() {
        let config = ImageGenerationConfig::new("m", 0, 0.0, 0.0).unwrap();
        assert_eq!(config.max_attempts(), 1);
        assert_eq!(config.max_wait(), Duration::ZERO);
    }

    #[test]
    fn image_rejects_inverted_bounds() {
        let err = ImageGenerationConfig::new("m", 2, 5.0, 1.0).unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    }

    #[test]
    fn image_rejects_negative_or_nan_wait() {
        assert!(ImageGenerationConfig::new("m", 2, -1.0, 10.0).is_err());
        assert!(ImageGenerationConfig::new("m", 2, 1.0, f64::INFINITY).is_err());
        assert!(ImageGenerationConfig::new("m", 2, f64::NAN, 10.0).is_err());
    }

    #[test]
    fn max_attempts_saturates() {
        let config = ImageGenerationConfig::new("m", u32::MAX, 0.0, 0.0).unwrap();
        assert_eq!(config.max_attempts(), u32::MAX);
    }
}
