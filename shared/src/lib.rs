//! Shared types for the order engine
//!
//! Common types used across crates: error codes and API envelopes,
//! data models, order request/response payloads and small utilities.

pub mod error;
pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
