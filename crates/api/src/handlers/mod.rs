//! Request handlers for the generation service.
//!
//! Each submodule provides async handler functions for one resource.
//! Handlers delegate to the task engine and map errors via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod files;
pub mod generation;
pub mod tasks;
