//! Protocol module for generation request structures
//!
//! This module defines the provider-agnostic data model callers use to ask
//! for a completion. Results are plain text and need no type of their own.

pub mod types;

pub use types::{
    GenerationInput, GenerationOptions, GenerationRequest, GenerationRequestBuilder,
    RequestError, MAX_TEMPERATURE,
};
