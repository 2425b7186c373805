//! OpenAI chat-completions provider.
//!
//! One round-trip per enhancement: a system prompt steering the model
//! toward single-object 3D descriptions, the user prompt, and the
//! reference image (if any) inlined as a base64 data URL.

use async_trait::async_trait;
use base64::Engine as _;
use serde_json::Value;

use crate::enhancer::{EnhancedPrompt, EnhancerError, PromptEnhancer};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Cap on the rewritten prompt length.
const MAX_TOKENS: u32 = 200;

/// Instructions steering the model toward single-object, geometry-heavy
/// descriptions that downstream mesh generators handle well.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
Create a detailed, high-quality 3D-friendly prompt describing a single object. Be specific about:
- Shape and geometry (dimensions, proportions, curves, angles)
- Surface details (texture, patterns, smoothness, roughness)
- Material properties (metallic, matte, glossy, transparent, etc.)
- Fine details (decorations, engravings, structural elements)
- Overall form and structure

Avoid scenes, backgrounds, or multiple objects. Focus on creating a detailed, \
high-quality 3D model with clear geometric features and surface characteristics. \
Use technical and descriptive language that will help generate a precise 3D mesh.";

pub struct OpenAIEnhancer {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl OpenAIEnhancer {
    pub fn new(api_key: Option<String>, model: Option<String>, endpoint: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }

    /// Build a provider from `OPENAI_API_KEY`, `OPENAI_MODEL` and
    /// `OPENAI_API_ENDPOINT`.
    pub fn from_env() -> Self {
        Self::new(
            env_nonempty("OPENAI_API_KEY"),
            env_nonempty("OPENAI_MODEL"),
            env_nonempty("OPENAI_API_ENDPOINT"),
        )
    }

    fn api_key(&self) -> Result<&str, EnhancerError> {
        self.api_key
            .as_deref()
            .ok_or(EnhancerError::NotConfigured("openai"))
    }

    /// User-message content blocks: the text prompt plus an optional
    /// base64 data URL for the reference image.
    fn content_blocks(prompt: &str, image: Option<&[u8]>) -> Vec<Value> {
        let mut content = vec![serde_json::json!({"type": "text", "text": prompt})];
        if let Some(bytes) = image.filter(|bytes| !bytes.is_empty()) {
            let mime = image_mime(bytes);
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            content.push(serde_json::json!({
                "type": "image_url",
                "image_url": { "url": format!("data:{mime};base64,{encoded}") },
            }));
        }
        content
    }

    fn parse_completion(&self, data: &Value) -> Result<EnhancedPrompt, EnhancerError> {
        let text = data
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| EnhancerError::Parse("Completion has no message content".into()))?;
        let tokens_used = data
            .pointer("/usage/total_tokens")
            .and_then(Value::as_u64)
            .map(|tokens| tokens as u32);
        Ok(EnhancedPrompt {
            text: text.to_string(),
            model: self.model.clone(),
            tokens_used,
        })
    }
}

/// MIME type for the reference image, sniffed from its magic bytes.
fn image_mime(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Jpeg) => "image/jpeg",
        Ok(image::ImageFormat::WebP) => "image/webp",
        Ok(image::ImageFormat::Gif) => "image/gif",
        _ => "image/png",
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl PromptEnhancer for OpenAIEnhancer {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn enhance(
        &self,
        prompt: &str,
        image: Option<&[u8]>,
    ) -> Result<EnhancedPrompt, EnhancerError> {
        let key = self.api_key()?;
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": DEFAULT_SYSTEM_PROMPT },
                { "role": "user", "content": Self::content_blocks(prompt, image) },
            ],
            "max_tokens": MAX_TOKENS,
        });

        tracing::debug!(model = %self.model, with_image = image.is_some(), "Enhancing prompt");
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(key)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(EnhancerError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let data: Value = response.json().await?;
        self.parse_completion(&data)
    }
}
