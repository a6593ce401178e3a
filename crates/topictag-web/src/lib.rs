//! topictag-web: Topic Tagging API
//! Serves the OpenAlex topic classifier over HTTP:
//!   - POST /classify  top-k topics for a title/abstract pair
//!   - GET  /health    liveness
//!   - GET  /version   API and model metadata
//!   - GET  /          endpoint index

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;
