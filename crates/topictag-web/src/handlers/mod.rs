//! HTTP handlers for all API routes.

pub mod classify;
pub mod status;
