//! Client for the Neural4D generation API.
//!
//! Dialect: Bearer auth, `POST /generate` with `{prompt, mode, quality}`,
//! job state at `GET /tasks/{id}`, finished models fetched from the
//! download URL carried in the completed status payload.

use async_trait::async_trait;
use serde_json::Value;

use meshforge_core::generation::GenerationConfig;
use meshforge_core::mesh::MeshResult;

use crate::generator::{
    env_nonempty, parse_response, quality_level, GeneratorError, MeshGenerator,
};
use crate::hosted::{self, string_field, HostedJobApi, RemoteJob};

pub const DEFAULT_BASE_URL: &str = "https://api.neural4d.com/v1";

pub struct Neural4DGenerator {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl Neural4DGenerator {
    pub fn new(api_key: Option<String>, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Build a client from `NEURAL4D_API_KEY` and `NEURAL4D_API_BASE_URL`.
    pub fn from_env() -> Self {
        Self::new(
            env_nonempty("NEURAL4D_API_KEY"),
            env_nonempty("NEURAL4D_API_BASE_URL"),
        )
    }

    fn api_key(&self) -> Result<&str, GeneratorError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GeneratorError::NotConfigured("neural4d"))
    }

    /// Map one Neural4D status payload onto the normalized job state.
    fn job_state(data: &Value) -> Result<RemoteJob, GeneratorError> {
        let status = data
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("pending")
            .to_ascii_lowercase();
        Ok(match status.as_str() {
            "completed" => {
                let result_url =
                    string_field(data, &["download_url", "result_url"]).ok_or_else(|| {
                        GeneratorError::Parse(
                            "Job completed but no download URL was provided".into(),
                        )
                    })?;
                let format =
                    string_field(data, &["format"]).unwrap_or_else(|| "obj".to_string());
                RemoteJob::Completed { result_url, format }
            }
            "failed" => RemoteJob::Failed {
                error: string_field(data, &["error"])
                    .unwrap_or_else(|| "Generation failed".to_string()),
            },
            _ => RemoteJob::InFlight,
        })
    }
}

#[async_trait]
impl HostedJobApi for Neural4DGenerator {
    async fn submit(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, GeneratorError> {
        let body = serde_json::json!({
            "prompt": prompt,
            "mode": "text_to_3d",
            "quality": quality_level(config),
        });
        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .bearer_auth(self.api_key()?)
            .json(&body)
            .send()
            .await?;
        let data: Value = parse_response(response).await?;
        string_field(&data, &["task_id", "id"])
            .ok_or_else(|| GeneratorError::Parse("No task id in submit response".into()))
    }

    async fn poll(&self, job_id: &str) -> Result<RemoteJob, GeneratorError> {
        let response = self
            .client
            .get(format!("{}/tasks/{job_id}", self.base_url))
            .bearer_auth(self.api_key()?)
            .send()
            .await?;
        let data: Value = parse_response(response).await?;
        Self::job_state(&data)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, GeneratorError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(self.api_key()?)
            .send()
            .await?;
        let response = crate::generator::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl MeshGenerator for Neural4DGenerator {
    fn name(&self) -> &'static str {
        "neural4d"
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
