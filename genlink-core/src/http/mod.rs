//! HTTP layer for reaching provider APIs
//!
//! This module handles:
//! - Connection pooling and client construction
//! - JSON request/response exchange with request ID correlation
//! - Turning error bodies into readable messages

pub mod client;
pub mod error;

pub use client::HttpClient;
pub use error::error_message_from_body;
