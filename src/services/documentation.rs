use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the podium backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::public_stream,
        crate::routes::sse::admin_stream,
        crate::routes::websocket::ws_handler,
        crate::routes::public::get_ranking,
        crate::routes::public::get_podium,
        crate::routes::public::get_theme,
        crate::routes::public::get_showcase,
        crate::routes::admin::announce,
        crate::routes::admin::reset,
        crate::routes::admin::replace_ranking,
        crate::routes::admin::refresh_ranking,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::ws::ViewerInboundMessage,
            crate::dto::ws::ViewerOutboundMessage,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::AnnouncementEvent,
            crate::dto::sse::RankingUpdatedEvent,
            crate::dto::phase::ShowcaseStatus,
            crate::dto::admin::AnnounceRequest,
            crate::dto::admin::AnnounceResponse,
            crate::dto::admin::ReplaceRankingRequest,
            crate::dto::admin::RankingUpdateResponse,
            crate::dto::public::RankingResponse,
            crate::dto::public::PodiumResponse,
            crate::dto::public::ShowcaseResponse,
            crate::services::overlay::OverlayFrame,
            crate::state::ranking::RankingItem,
            crate::state::theme::PlaceTheme,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "viewers", description = "WebSocket feed for podium displays"),
        (name = "public", description = "Read-only ranking and reveal progress"),
        (name = "admin", description = "Announcements and ranking management"),
    )
)]
/// OpenAPI document for every route.
pub struct ApiDoc;
