//! The prompt enhancement capability.

use async_trait::async_trait;

/// Errors from a prompt enhancer.
#[derive(Debug, thiserror::Error)]
pub enum EnhancerError {
    /// The provider has no credentials configured.
    #[error("Enhancer '{0}' is not configured (missing API credentials)")]
    NotConfigured(&'static str),

    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Enhancer API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider answered with an unexpected payload.
    #[error("Failed to parse enhancer response: {0}")]
    Parse(String),
}

/// An enhanced prompt returned by a vision-language model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedPrompt {
    /// The rewritten prompt text.
    pub text: String,
    /// Model that produced it.
    pub model: String,
    /// Token usage, when the provider reports it.
    pub tokens_used: Option<u32>,
}

/// A vision-language model that rewrites prompts for 3D generation.
#[async_trait]
pub trait PromptEnhancer: Send + Sync {
    /// Short provider identifier used in logs and health reporting.
    fn name(&self) -> &'static str;

    /// Whether the provider is usable with its current configuration.
    /// Checks configuration only, never the network.
    async fn is_available(&self) -> bool;

    /// Rewrite `prompt`, optionally grounded in a reference image.
    async fn enhance(
        &self,
        prompt: &str,
        image: Option<&[u8]>,
    ) -> Result<EnhancedPrompt, EnhancerError>;
}
