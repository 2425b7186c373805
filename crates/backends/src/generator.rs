//! The generation backend capability and shared client plumbing.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;

use meshforge_core::error::CoreError;
use meshforge_core::generation::GenerationConfig;
use meshforge_core::mesh::MeshResult;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from a generation backend.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The backend has no credentials configured.
    #[error("Backend '{0}' is not configured (missing API credentials)")]
    NotConfigured(&'static str),

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Backend API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service reported the generation itself as failed.
    #[error("Backend reported failure: {0}")]
    Backend(String),

    /// Polling exceeded the maximum wait.
    #[error("Generation timed out after {0} seconds")]
    Timeout(u64),

    /// The service answered with something we could not turn into a mesh.
    #[error("Failed to parse backend response: {0}")]
    Parse(String),
}

// ---------------------------------------------------------------------------
// Capability
// ---------------------------------------------------------------------------

/// A text-to-3D generation service.
#[async_trait]
pub trait MeshGenerator: Send + Sync {
    /// Short backend identifier used in logs and health reporting.
    fn name(&self) -> &'static str;

    /// Whether the backend is usable with its current configuration.
    ///
    /// Checks configuration only (credentials present), never the
    /// network -- the health endpoint calls this on every request.
    async fn is_available(&self) -> bool;

    /// Generate a mesh for `prompt`. Blocks (asynchronously) until the
    /// service has produced a result or failed.
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<MeshResult, GeneratorError>;
}

// ---------------------------------------------------------------------------
// Backend selection
// ---------------------------------------------------------------------------

/// The generation services this build knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Neural4d,
    Instant3d,
    HuggingFace,
}

impl FromStr for BackendKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neural4d" => Ok(BackendKind::Neural4d),
            "instant3d" => Ok(BackendKind::Instant3d),
            "huggingface" => Ok(BackendKind::HuggingFace),
            other => Err(CoreError::Validation(format!(
                "Unknown generator backend '{other}' (expected one of: neural4d, instant3d, huggingface)"
            ))),
        }
    }
}

/// Build the selected backend from its environment credentials.
///
/// Always succeeds; a backend without credentials is constructed in the
/// not-configured state and reports itself unavailable.
pub fn generator_from_env(kind: BackendKind) -> Arc<dyn MeshGenerator> {
    match kind {
        BackendKind::Neural4d => Arc::new(crate::neural4d::Neural4DGenerator::from_env()),
        BackendKind::Instant3d => Arc::new(crate::instant3d::Instant3DGenerator::from_env()),
        BackendKind::HuggingFace => Arc::new(crate::huggingface::HuggingFaceGenerator::from_env()),
    }
}

// ---------------------------------------------------------------------------
// Shared client plumbing
// ---------------------------------------------------------------------------

/// Environment variable value, with empty and whitespace-only treated as
/// unset.
pub(crate) fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Service quality level derived from the requested sampling step count.
pub(crate) fn quality_level(config: &GenerationConfig) -> &'static str {
    if config.karras_steps <= 64 {
        "fast"
    } else if config.karras_steps >= 128 {
        "high"
    } else {
        "standard"
    }
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success, or a [`GeneratorError::Api`] containing the
/// status and body text on failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, GeneratorError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(GeneratorError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GeneratorError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}
