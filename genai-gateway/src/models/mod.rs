//! Request and response bodies of the generation endpoint.

pub mod generation;

pub use generation::{GenerationRequest, GenerationResponse, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
