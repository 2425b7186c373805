//! Client for Hugging Face hosted inference.
//!
//! Two deployment modes: the serverless Inference API (addressed by model
//! id) or a dedicated Inference Endpoint (explicit URL). Text-to-3D
//! models on the hub do not share an output contract, so response
//! decoding accepts inline mesh JSON, base64-embedded model files and
//! URL references.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde_json::Value;

use meshforge_core::generation::GenerationConfig;
use meshforge_core::mesh::MeshResult;

use crate::generator::{
    ensure_success, env_nonempty, parse_response, GeneratorError, MeshGenerator,
};
use crate::hosted::string_field;
use crate::parse;

pub const INFERENCE_API_BASE: &str = "https://api-inference.huggingface.co/models";

/// Hosted models can cold-start, so the request budget is far above the
/// usual API timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct HuggingFaceGenerator {
    client: reqwest::Client,
    model_id: Option<String>,
    endpoint_url: Option<String>,
    api_token: Option<String>,
}

/// How one response payload carries the model data.
#[derive(Debug)]
enum HfPayload {
    /// Mesh JSON directly in the response body.
    Inline(MeshResult),
    /// Base64-embedded model file.
    Embedded(Vec<u8>),
    /// Model file must be fetched from a URL.
    Fetch(String),
}

impl HuggingFaceGenerator {
    pub fn new(
        model_id: Option<String>,
        endpoint_url: Option<String>,
        api_token: Option<String>,
    ) -> Self {
        let nonempty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            client: reqwest::Client::new(),
            model_id: nonempty(model_id),
            endpoint_url: nonempty(endpoint_url),
            api_token: nonempty(api_token),
        }
    }

    /// Build a client from `HF_MODEL_ID`, `HF_ENDPOINT_URL` and
    /// `HF_API_TOKEN`.
    pub fn from_env() -> Self {
        Self::new(
            env_nonempty("HF_MODEL_ID"),
            env_nonempty("HF_ENDPOINT_URL"),
            env_nonempty("HF_API_TOKEN"),
        )
    }

    fn api_token(&self) -> Result<&str, GeneratorError> {
        self.api_token
            .as_deref()
            .ok_or(GeneratorError::NotConfigured("huggingface"))
    }

    /// Endpoint to POST against: a dedicated endpoint wins over the
    /// serverless Inference API.
    fn inference_url(&self) -> Result<String, GeneratorError> {
        if let Some(url) = &self.endpoint_url {
            return Ok(url.clone());
        }
        match &self.model_id {
            Some(model_id) => Ok(format!("{INFERENCE_API_BASE}/{model_id}")),
            None => Err(GeneratorError::NotConfigured("huggingface")),
        }
    }

    fn request_payload(prompt: &str, config: &GenerationConfig) -> Value {
        let mut parameters = serde_json::json!({
            "num_inference_steps": config.karras_steps,
            "guidance_scale": config.guidance_scale,
        });
        if let Some(seed) = config.seed {
            parameters["seed"] = seed.into();
        }
        serde_json::json!({
            "inputs": prompt,
            "parameters": parameters,
        })
    }

    /// Classify a response body by how it carries the model data.
    fn classify_response(data: &Value) -> Result<HfPayload, GeneratorError> {
        if data.get("vertices").is_some() {
            let mesh: MeshResult = serde_json::from_value(data.clone())
                .map_err(|e| GeneratorError::Parse(format!("Bad inline mesh JSON: {e}")))?;
            return Ok(HfPayload::Inline(mesh));
        }
        if let Some(encoded) = string_field(data, &["file", "mesh"]) {
            return decode_base64(&encoded).map(HfPayload::Embedded);
        }
        if let Some(url) = string_field(data, &["url", "download_url"]) {
            return Ok(HfPayload::Fetch(url));
        }
        if let Some(encoded) = string_field(data, &["data"]) {
            return decode_base64(&encoded).map(HfPayload::Embedded);
        }
        let keys: Vec<&str> = data
            .as_object()
            .map(|obj| obj.keys().map(String::as_str).collect())
            .unwrap_or_default();
        Err(GeneratorError::Parse(format!(
            "Unrecognized response shape (keys: {keys:?})"
        )))
    }
}

fn decode_base64(encoded: &str) -> Result<Vec<u8>, GeneratorError> {
    base64::engine::general_purpose::STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| GeneratorError::Parse(format!("Bad base64 model data: {e}")))
}

#[async_trait]
impl MeshGenerator for HuggingFaceGenerator {
    fn name(&self) -> &'static str {
        "huggingface"
    }

    async fn is_available(&self) -> bool {
        self.api_token.is_some() && (self.endpoint_url.is_some() || self.model_id.is_some())
    }

    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<MeshResult, GeneratorError> {
        let token = self.api_token()?.to_string();
        let url = self.inference_url()?;
        tracing::debug!(url = %url, "Calling Hugging Face inference");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .timeout(REQUEST_TIMEOUT)
            .json(&Self::request_payload(prompt, config))
            .send()
            .await?;
        let data: Value = parse_response(response).await?;

        match Self::classify_response(&data)? {
            HfPayload::Inline(mesh) => Ok(mesh),
            HfPayload::Embedded(bytes) => parse::parse_model_bytes(&bytes, "obj"),
            HfPayload::Fetch(url) => {
                let response = self.client.get(&url).bearer_auth(&token).send().await?;
                let response = ensure_success(response).await?;
                let bytes = response.bytes().await?;
                parse::parse_model_bytes(&bytes, "obj")
            }
        }
    }
}
