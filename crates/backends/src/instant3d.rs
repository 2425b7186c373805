//! Client for the Instant3D generation API.
//!
//! Dialect: `X-API-Key` auth, `POST /generate` with `{prompt, type,
//! quality}`, job state at `GET /jobs/{id}`. Instant3D uses a looser
//! status vocabulary than Neural4D (`done`/`success`, `error`,
//! `generating`/`in_progress`), normalized here.

use async_trait::async_trait;
use serde_json::Value;

use meshforge_core::generation::GenerationConfig;
use meshforge_core::mesh::MeshResult;

use crate::generator::{
    ensure_success, env_nonempty, parse_response, quality_level, GeneratorError, MeshGenerator,
};
use crate::hosted::{self, string_field, HostedJobApi, RemoteJob};

pub const DEFAULT_BASE_URL: &str = "https://api.instant3d.co/v1";

const API_KEY_HEADER: &str = "X-API-Key";

pub struct Instant3DGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl Instant3DGenerator {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Build a client from `INSTANT3D_API_KEY` and `INSTANT3D_API_BASE_URL`.
    pub fn from_env() -> Self {
        Self::new(
            env_nonempty("INSTANT3D_API_KEY"),
            env_nonempty("INSTANT3D_API_BASE_URL"),
        )
    }

    fn api_key(&self) -> Result<&str, GeneratorError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GeneratorError::NotConfigured("instant3d"))
    }

    /// Map one Instant3D status payload onto the normalized job state.
    fn job_state(data: &Value) -> Result<RemoteJob, GeneratorError> {
        let status = data
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("pending")
            .to_ascii_lowercase();
        Ok(match status.as_str() {
            "completed" | "done" | "success" => {
                let result_url =
                    string_field(data, &["download_url", "model_url"]).ok_or_else(|| {
                        GeneratorError::Parse(
                            "Job completed but no download URL was provided".into(),
                        )
                    })?;
                let format =
                    string_field(data, &["format"]).unwrap_or_else(|| "obj".to_string());
                RemoteJob::Completed { result_url, format }
            }
            "failed" | "error" => RemoteJob::Failed {
                error: string_field(data, &["error"])
                    .unwrap_or_else(|| "Generation failed".to_string()),
            },
            _ => RemoteJob::InFlight,
        })
    }
}

#[async_trait]
impl HostedJobApi for Instant3DGenerator {
    async fn submit(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, GeneratorError> {
        let body = serde_json::json!({
            "prompt": prompt,
            "type": "text_to_3d",
            "quality": quality_level(config),
        });
        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .header(API_KEY_HEADER, self.api_key()?)
            .json(&body)
            .send()
            .await?;
        let data: Value = parse_response(response).await?;
        string_field(&data, &["job_id", "id", "task_id"])
            .ok_or_else(|| GeneratorError::Parse("No job id in submit response".into()))
    }

    async fn poll(&self, job_id: &str) -> Result<RemoteJob, GeneratorError> {
        let response = self
            .client
            .get(format!("{}/jobs/{job_id}", self.base_url))
            .header(API_KEY_HEADER, self.api_key()?)
            .send()
            .await?;
        let data: Value = parse_response(response).await?;
        Self::job_state(&data)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, GeneratorError> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, self.api_key()?)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl MeshGenerator for Instant3DGenerator {
    fn name(&self) -> &'static str {
        "instant3d"
    }

    async fn is_available(&self) -> bool {
        self.api_key().is_ok()
    }

    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<MeshResult, GeneratorError> {
        self.api_key()?;
        hosted::run_to_completion(self, prompt, config).await
    }
}
