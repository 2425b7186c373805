//! Generation parameters, defaults, and request validation.
//!
//! The same validation runs twice by design: at the HTTP boundary (so bad
//! requests are rejected synchronously with a 4xx) and again as the first
//! pipeline step (so programmatic callers cannot reach a backend with an
//! invalid request).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::export::ExportFormat;

// ---------------------------------------------------------------------------
// Parameter ranges and defaults
// ---------------------------------------------------------------------------

/// Lowest accepted classifier-free guidance scale.
pub const GUIDANCE_SCALE_MIN: f32 = 1.0;
/// Highest accepted classifier-free guidance scale.
pub const GUIDANCE_SCALE_MAX: f32 = 50.0;
/// Default guidance scale.
pub const DEFAULT_GUIDANCE_SCALE: f32 = 15.0;

/// Minimum number of Karras sampling steps.
pub const KARRAS_STEPS_MIN: u32 = 1;
/// Maximum number of Karras sampling steps.
pub const KARRAS_STEPS_MAX: u32 = 256;
/// Default number of Karras sampling steps.
pub const DEFAULT_KARRAS_STEPS: u32 = 64;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Numeric knobs forwarded to the generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Classifier-free guidance scale, `[1.0, 50.0]`.
    pub guidance_scale: f32,
    /// Sampling steps, `[1, 256]`. Hosted backends map this onto their own
    /// quality tiers.
    pub karras_steps: u32,
    /// Random seed for reproducible generation, if the backend supports it.
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            guidance_scale: DEFAULT_GUIDANCE_SCALE,
            karras_steps: DEFAULT_KARRAS_STEPS,
            seed: None,
        }
    }
}

/// A complete generation request, as handed to the task engine.
///
/// HTTP DTO parsing and defaulting happen in the api crate; by the time a
/// value of this type exists, every field is populated.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Text prompt. Must be non-empty after trimming.
    pub prompt: String,
    /// Whether to attempt VLM prompt enhancement.
    pub use_vlm: bool,
    /// Backend parameters.
    pub config: GenerationConfig,
    /// Output file format.
    pub format: ExportFormat,
    /// Optional cap on exported points (XYZ only).
    pub max_points: Option<usize>,
    /// Optional reference image for the VLM (multipart uploads only).
    pub image: Option<Vec<u8>>,
}

impl GenerationRequest {
    /// Build a request with service defaults (`use_vlm = true`, OBJ output).
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            use_vlm: true,
            config: GenerationConfig::default(),
            format: ExportFormat::default(),
            max_points: None,
            image: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a prompt is non-empty after trimming.
pub fn validate_prompt(prompt: &str) -> Result<(), CoreError> {
    if prompt.trim().is_empty() {
        return Err(CoreError::Validation(
            "Prompt must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validate numeric generation parameters against their allowed ranges.
pub fn validate_config(config: &GenerationConfig) -> Result<(), CoreError> {
    if !(GUIDANCE_SCALE_MIN..=GUIDANCE_SCALE_MAX).contains(&config.guidance_scale) {
        return Err(CoreError::Validation(format!(
            "guidance_scale must be between {GUIDANCE_SCALE_MIN} and {GUIDANCE_SCALE_MAX} (got {})",
            config.guidance_scale
        )));
    }
    if !(KARRAS_STEPS_MIN..=KARRAS_STEPS_MAX).contains(&config.karras_steps) {
        return Err(CoreError::Validation(format!(
            "karras_steps must be between {KARRAS_STEPS_MIN} and {KARRAS_STEPS_MAX} (got {})",
            config.karras_steps
        )));
    }
    Ok(())
}

/// Validate the optional point cap.
pub fn validate_max_points(max_points: Option<usize>) -> Result<(), CoreError> {
    match max_points {
        Some(0) => Err(CoreError::Validation(
            "max_points must be at least 1".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Validate a complete request. Runs every check and returns the first
/// failure.
pub fn validate_request(request: &GenerationRequest) -> Result<(), CoreError> {
    validate_prompt(&request.prompt)?;
    validate_config(&request.config)?;
    validate_max_points(request.max_points)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
