//! Vision-language prompt enhancement.
//!
//! Short user prompts make for poor 3D generations; a VLM rewrites them
//! into detailed single-object descriptions first, optionally grounded
//! in an uploaded reference image. The capability lives behind
//! [`PromptEnhancer`]; [`OpenAIEnhancer`] is the production provider.

pub mod enhancer;
pub mod openai;

pub use enhancer::{EnhancedPrompt, EnhancerError, PromptEnhancer};
pub use openai::OpenAIEnhancer;
