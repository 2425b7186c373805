//! HTTP clients for hosted text-to-3D generation services.
//!
//! Every service implements [`MeshGenerator`]; the concrete backend is
//! chosen once at startup via [`BackendKind`] and
//! [`generator_from_env`]. Job-based services share the submit/poll/
//! download flow in [`hosted`], and downloaded model files are decoded
//! by the parsers in [`parse`].

pub mod generator;
pub mod hosted;
pub mod huggingface;
pub mod instant3d;
pub mod neural4d;
pub mod parse;

pub use generator::{generator_from_env, BackendKind, GeneratorError, MeshGenerator};
pub use huggingface::HuggingFaceGenerator;
pub use instant3d::Instant3DGenerator;
pub use neural4d::Neural4DGenerator;
