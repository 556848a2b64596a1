/// Admin service for announcements and ranking replacement.
pub mod admin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Per-frame projection of a running showcase.
pub mod overlay;
/// Public service for read-only podium information.
pub mod public_service;
/// HTTP client for the upstream ranking source.
pub mod ranking_source;
/// Upstream ranking poller with degraded-mode backoff.
pub mod ranking_supervisor;
/// Tokio driver around the showcase state machine.
pub mod showcase_runtime;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Podium derivation from a ranking.
pub mod top_three;
/// WebSocket client used by passive viewers.
pub mod viewer_client;
/// WebSocket connection and message handling service.
pub mod websocket_service;
