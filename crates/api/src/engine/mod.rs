//! Task execution engine.
//!
//! Contains the in-memory registry that tracks generation tasks and the
//! pipeline that drives each accepted task through prompt enhancement,
//! mesh generation, and export.

pub mod pipeline;
pub mod registry;

pub use pipeline::TaskEngine;
pub use registry::TaskRegistry;
