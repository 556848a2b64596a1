use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::public::{PodiumResponse, RankingResponse, ShowcaseResponse},
    services::public_service,
    state::{SharedState, theme::PlaceTheme},
};

/// Public read-only endpoints exposing the ranking and the reveal progress.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/public/ranking", get(get_ranking))
        .route("/public/podium", get(get_podium))
        .route("/public/themes/{place}", get(get_theme))
        .route("/public/showcase", get(get_showcase))
}

#[utoipa::path(
    get,
    path = "/public/ranking",
    tag = "public",
    responses((status = 200, description = "Current ranking snapshot", body = RankingResponse))
)]
/// Return the ranking snapshot winners are resolved from.
pub async fn get_ranking(State(state): State<SharedState>) -> Json<RankingResponse> {
    Json(public_service::get_ranking(&state).await)
}

#[utoipa::path(
    get,
    path = "/public/podium",
    tag = "public",
    responses((status = 200, description = "Podium buckets and revealed places", body = PodiumResponse))
)]
/// Return the teams holding each podium place.
pub async fn get_podium(State(state): State<SharedState>) -> Json<PodiumResponse> {
    Json(public_service::get_podium(&state).await)
}

#[utoipa::path(
    get,
    path = "/public/themes/{place}",
    tag = "public",
    params(("place" = u8, Path, description = "Podium place; anything but 1 to 3 yields the finalist theme")),
    responses((status = 200, description = "Theme for the place", body = PlaceTheme))
)]
/// Return the colors used while `place` is revealed.
pub async fn get_theme(
    State(state): State<SharedState>,
    Path(place): Path<u8>,
) -> Json<PlaceTheme> {
    Json(public_service::get_theme(&state, place))
}

#[utoipa::path(
    get,
    path = "/public/showcase",
    tag = "public",
    responses((status = 200, description = "Controller view state and overlay frame", body = ShowcaseResponse))
)]
/// Return what the controller view is drawing right now.
pub async fn get_showcase(State(state): State<SharedState>) -> Json<ShowcaseResponse> {
    Json(public_service::get_showcase(&state))
}
