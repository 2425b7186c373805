/// Domain-level error type shared across the meshforge crates.
///
/// HTTP-specific variants live in the api crate's `AppError`; backend
/// client errors are converted into [`CoreError::Generation`] /
/// [`CoreError::Export`] strings at the pipeline boundary.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
