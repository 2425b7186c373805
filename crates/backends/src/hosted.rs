//! Shared submit/poll/download flow for job-based generation services.
//!
//! Neural4D and Instant3D both queue a job, expose its state at a status
//! endpoint and finally hand out a download URL. Implementors translate
//! their service dialect (payload shapes, status vocabulary, auth) behind
//! [`HostedJobApi`]; [`run_to_completion`] owns the polling loop.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use meshforge_core::generation::GenerationConfig;
use meshforge_core::mesh::MeshResult;

use crate::generator::GeneratorError;
use crate::parse;

/// How often a remote job is polled.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Give up on a remote job after this long.
pub const MAX_WAIT: Duration = Duration::from_secs(300);

/// State of a remote generation job, normalized across service dialects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteJob {
    /// Queued or running.
    InFlight,
    /// Finished; the model file is at `result_url` in `format`.
    Completed { result_url: String, format: String },
    /// The service reported failure.
    Failed { error: String },
}

/// A service that queues generation jobs and serves results by URL.
#[async_trait]
pub trait HostedJobApi: Send + Sync {
    /// Submit a generation job, returning the remote job id.
    async fn submit(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, GeneratorError>;

    /// Fetch the current state of a job.
    async fn poll(&self, job_id: &str) -> Result<RemoteJob, GeneratorError>;

    /// Download the finished model file.
    async fn download(&self, url: &str) -> Result<Vec<u8>, GeneratorError>;
}

/// Drive a hosted job to completion.
///
/// Submits, polls on a fixed interval until the job is terminal or
/// [`MAX_WAIT`] has elapsed, then downloads and parses the model file.
pub async fn run_to_completion<A: HostedJobApi + ?Sized>(
    api: &A,
    prompt: &str,
    config: &GenerationConfig,
) -> Result<MeshResult, GeneratorError> {
    let job_id = api.submit(prompt, config).await?;
    tracing::debug!(job_id = %job_id, "Generation job submitted");

    let deadline = tokio::time::Instant::now() + MAX_WAIT;
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    loop {
        ticker.tick().await;
        if tokio::time::Instant::now() >= deadline {
            return Err(GeneratorError::Timeout(MAX_WAIT.as_secs()));
        }
        match api.poll(&job_id).await? {
            RemoteJob::InFlight => continue,
            RemoteJob::Completed { result_url, format } => {
                tracing::debug!(job_id = %job_id, url = %result_url, "Generation job completed");
                let bytes = api.download(&result_url).await?;
                return parse::parse_model_bytes(&bytes, &format);
            }
            RemoteJob::Failed { error } => {
                return Err(GeneratorError::Backend(error));
            }
        }
    }
}

/// First of `keys` present in `data` as a non-empty string.
pub(crate) fn string_field(data: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| data.get(key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Scripted fake service: pops one poll answer per call and serves a
    /// fixed OBJ body on download.
    struct ScriptedApi {
        polls: Mutex<Vec<RemoteJob>>,
    }

    impl ScriptedApi {
        fn new(mut polls: Vec<RemoteJob>) -> Self {
            polls.reverse();
            Self {
                polls: Mutex::new(polls),
            }
        }
    }

    #[async_trait]
    impl HostedJobApi for ScriptedApi {
        async fn submit(
            &self,
            _prompt: &str,
            _config: &GenerationConfig,
        ) -> Result<String, GeneratorError> {
            Ok("job-1".to_string())
        }

        async fn poll(&self, _job_id: &str) -> Result<RemoteJob, GeneratorError> {
            Ok(self
                .polls
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(RemoteJob::InFlight))
        }

        async fn download(&self, _url: &str) -> Result<Vec<u8>, GeneratorError> {
            Ok(b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n".to_vec())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn completes_after_in_flight_polls() {
        let api = ScriptedApi::new(vec![
            RemoteJob::InFlight,
            RemoteJob::InFlight,
            RemoteJob::Completed {
                result_url: "https://example.test/model.obj".to_string(),
                format: "obj".to_string(),
            },
        ]);

        let mesh = run_to_completion(&api, "a chair", &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn remote_failure_surfaces_as_backend_error() {
        let api = ScriptedApi::new(vec![
            RemoteJob::InFlight,
            RemoteJob::Failed {
                error: "quota exceeded".to_string(),
            },
        ]);

        let err = run_to_completion(&api, "a chair", &GenerationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Backend(ref msg) if msg == "quota exceeded"));
    }

    #[tokio::test(start_paused = true)]
    async fn never_finishing_job_times_out() {
        let api = ScriptedApi::new(vec![]);

        let err = run_to_completion(&api, "a chair", &GenerationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GeneratorError::Timeout(_)));
    }

    // -- string_field --

    #[test]
    fn string_field_takes_first_present_key() {
        let data = serde_json::json!({"id": "abc", "task_id": "xyz"});
        assert_eq!(
            string_field(&data, &["task_id", "id"]),
            Some("xyz".to_string())
        );
    }

    #[test]
    fn string_field_skips_empty_and_non_string_values() {
        let data = serde_json::json!({"task_id": "", "id": 7, "job_id": "j-9"});
        assert_eq!(
            string_field(&data, &["task_id", "id", "job_id"]),
            Some("j-9".to_string())
        );
        assert_eq!(string_field(&data, &["missing"]), None);
    }
}
