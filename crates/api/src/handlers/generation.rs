//! Handlers that accept generation requests.
//!
//! Routes:
//! - `POST /api/generate`       -- multipart form (supports an image upload)
//! - `POST /api/generate/json`  -- JSON body
//!
//! Both validate the request, register a task, and return `202 Accepted`
//! immediately; generation runs in the background.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use meshforge_core::export::ExportFormat;
use meshforge_core::generation::{
    GenerationConfig, GenerationRequest, DEFAULT_GUIDANCE_SCALE, DEFAULT_KARRAS_STEPS,
};
use meshforge_core::task::TaskStatus;
use meshforge_core::types::TaskId;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppJson, AppResult};
use crate::state::AppState;

/// JSON body for `POST /api/generate/json`.
#[derive(Debug, Deserialize)]
pub struct GenerateParams {
    pub prompt: String,
    #[serde(default = "default_use_vlm")]
    pub use_vlm: bool,
    #[serde(default = "default_guidance_scale")]
    pub guidance_scale: f32,
    #[serde(default = "default_karras_steps")]
    pub karras_steps: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub format: ExportFormat,
    #[serde(default)]
    pub max_points: Option<usize>,
}

fn default_use_vlm() -> bool {
    true
}

fn default_guidance_scale() -> f32 {
    DEFAULT_GUIDANCE_SCALE
}

fn default_karras_steps() -> u32 {
    DEFAULT_KARRAS_STEPS
}

impl GenerateParams {
    fn into_request(self, image: Option<Vec<u8>>) -> GenerationRequest {
        GenerationRequest {
            prompt: self.prompt,
            use_vlm: self.use_vlm,
            config: GenerationConfig {
                guidance_scale: self.guidance_scale,
                karras_steps: self.karras_steps,
                seed: self.seed,
            },
            format: self.format,
            max_points: self.max_points,
            image,
        }
    }
}

/// `202 Accepted` payload for both generate endpoints.
#[derive(Debug, Serialize)]
pub struct TaskCreated {
    task_id: TaskId,
    status: TaskStatus,
    message: &'static str,
}

fn accepted(task_id: TaskId) -> (StatusCode, Json<TaskCreated>) {
    (
        StatusCode::ACCEPTED,
        Json(TaskCreated {
            task_id,
            status: TaskStatus::Pending,
            message: "Generation task created",
        }),
    )
}

/// POST /api/generate
///
/// Multipart form endpoint. Text fields mirror [`GenerateParams`]; an
/// optional `image` file part is forwarded to the prompt enhancer.
pub async fn generate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut prompt = String::new();
    let mut use_vlm = true;
    let mut config = GenerationConfig::default();
    let mut format = ExportFormat::default();
    let mut max_points = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "prompt" => prompt = text_field(&name, field).await?,
            "use_vlm" => use_vlm = parse_bool(&name, &text_field(&name, field).await?)?,
            "guidance_scale" => {
                config.guidance_scale = parse_field(&name, &text_field(&name, field).await?)?;
            }
            "karras_steps" => {
                config.karras_steps = parse_field(&name, &text_field(&name, field).await?)?;
            }
            "seed" => {
                let value = text_field(&name, field).await?;
                if !value.trim().is_empty() {
                    config.seed = Some(parse_field(&name, &value)?);
                }
            }
            "format" => {
                format = text_field(&name, field)
                    .await?
                    .parse()
                    .map_err(AppError::Core)?;
            }
            "max_points" => {
                let value = text_field(&name, field).await?;
                if !value.trim().is_empty() {
                    max_points = Some(parse_field(&name, &value)?);
                }
            }
            "image" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                // An empty file part means "no image selected".
                if !data.is_empty() {
                    image = Some(data.to_vec());
                }
            }
            // Unknown fields are ignored.
            _ => {}
        }
    }

    let request = GenerationRequest {
        prompt,
        use_vlm,
        config,
        format,
        max_points,
        image,
    };
    let task_id = state.engine.create_task(request).await?;

    Ok(accepted(task_id))
}

/// POST /api/generate/json
///
/// JSON alternative to the form endpoint. Does not accept an image.
pub async fn generate_json(
    State(state): State<AppState>,
    AppJson(params): AppJson<GenerateParams>,
) -> AppResult<impl IntoResponse> {
    let task_id = state.engine.create_task(params.into_request(None)).await?;

    Ok(accepted(task_id))
}

// ---------------------------------------------------------------------------
// Form field parsing
// ---------------------------------------------------------------------------

async fn text_field(
    name: &str,
    field: axum::extract::multipart::Field<'_>,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid field '{name}': {e}")))
}

/// Parse a typed form value, naming the field on failure.
fn parse_field<T>(name: &str, value: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| AppError::BadRequest(format!("Invalid value for '{name}': {e}")))
}

/// Parse an HTML-form style boolean.
fn parse_bool(name: &str, value: &str) -> Result<bool, AppError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(AppError::BadRequest(format!(
            "Invalid value for '{name}': expected a boolean, got '{other}'"
        ))),
    }
}
