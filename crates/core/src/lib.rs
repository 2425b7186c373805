//! Core domain model for the meshforge generation service.
//!
//! Pure logic only: mesh data, generation parameters and their validation,
//! the task lifecycle model, and file exporters. No HTTP, no backend
//! clients, no async -- those live in `meshforge-backends`, `meshforge-vlm`
//! and `meshforge-api`.

pub mod error;
pub mod export;
pub mod generation;
pub mod mesh;
pub mod task;
pub mod types;
