//! HTTP interface for ragex
//!
//! Exposes `GET /ollama`, which streams the model's answer to a fixed demo
//! prompt as plain text, and `GET /health`.

mod error;
mod routes;


pub use error::ApiError;
pub use routes::{DEMO_PROMPT, router, serve};
