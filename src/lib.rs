//! Library crate for podium-back, exposing modules for binaries and integration tests.

/// Configuration loading.
pub mod config;
/// Wire types of the HTTP, SSE and WebSocket surfaces.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// Axum route trees.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// Shared state, the showcase machine and its data model.
pub mod state;
