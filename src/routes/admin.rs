use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    routing::{post, put},
};
use validator::Validate;

use crate::{
    dto::admin::{AnnounceRequest, AnnounceResponse, RankingUpdateResponse, ReplaceRankingRequest},
    error::AppError,
    services::admin_service,
    state::SharedState,
};

const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Admin-only endpoints driving the winner reveal and the ranking snapshot.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/admin/ranking", put(replace_ranking))
        .route("/admin/ranking/refresh", post(refresh_ranking))
        .route("/admin/winners/announce", post(announce))
        .route("/admin/winners/reset", post(reset))
        .route_layer(middleware::from_fn_with_state(state, require_admin_token))
}

/// Broadcast a winner announcement to every viewer and the controller view.
#[utoipa::path(
    post,
    path = "/admin/winners/announce",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    request_body = AnnounceRequest,
    responses(
        (status = 200, description = "Announcement broadcast", body = AnnounceResponse),
        (status = 400, description = "Invalid place/action pair"),
        (status = 409, description = "Announcement out of order or showcase already running")
    )
)]
pub async fn announce(
    State(state): State<SharedState>,
    Json(payload): Json<AnnounceRequest>,
) -> Result<Json<AnnounceResponse>, AppError> {
    let announcement = payload.announcement()?;
    Ok(Json(admin_service::announce(&state, announcement).await?))
}

/// Reset every viewer and forget the places revealed so far.
#[utoipa::path(
    post,
    path = "/admin/winners/reset",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    responses((status = 200, description = "Reset broadcast", body = AnnounceResponse))
)]
pub async fn reset(State(state): State<SharedState>) -> Result<Json<AnnounceResponse>, AppError> {
    Ok(Json(admin_service::reset(&state).await?))
}

/// Replace the ranking snapshot wholesale.
#[utoipa::path(
    put,
    path = "/admin/ranking",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    request_body = ReplaceRankingRequest,
    responses(
        (status = 200, description = "Ranking replaced", body = RankingUpdateResponse),
        (status = 400, description = "Duplicate team identifiers")
    )
)]
pub async fn replace_ranking(
    State(state): State<SharedState>,
    Json(payload): Json<ReplaceRankingRequest>,
) -> Result<Json<RankingUpdateResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        admin_service::replace_ranking(&state, payload.ranking).await?,
    ))
}

/// Pull the ranking from the upstream judging backend now.
#[utoipa::path(
    post,
    path = "/admin/ranking/refresh",
    tag = "admin",
    params(("X-Admin-Token" = String, Header, description = "Admin token issued by the /sse/admin stream")),
    responses(
        (status = 200, description = "Ranking refreshed", body = RankingUpdateResponse),
        (status = 503, description = "Upstream not configured or unreachable")
    )
)]
pub async fn refresh_ranking(
    State(state): State<SharedState>,
) -> Result<Json<RankingUpdateResponse>, AppError> {
    Ok(Json(admin_service::refresh_ranking(&state).await?))
}

async fn require_admin_token(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let provided = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_owned())
        .ok_or_else(|| {
            AppError::Unauthorized("missing admin token header `X-Admin-Token`".into())
        })?;

    let expected = state.admin_token().lock().await.clone();

    match expected {
        Some(token) if token == provided => Ok(next.run(req).await),
        Some(_) => Err(AppError::Unauthorized("invalid admin token".into())),
        None => Err(AppError::Unauthorized(
            "admin SSE stream not initialised yet".into(),
        )),
    }
}
