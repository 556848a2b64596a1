use axum::Router;

use crate::state::SharedState;

/// Token-guarded admin routes.
pub mod admin;
/// Swagger UI and OpenAPI document.
pub mod docs;
/// Health check route.
pub mod health;
/// Read-only public routes.
pub mod public;
/// SSE stream routes.
pub mod sse;
/// Winners socket route.
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(websocket::router())
        .merge(public::router())
        .merge(admin::router(state.clone()));

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
