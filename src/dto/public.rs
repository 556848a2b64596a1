use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::phase::ShowcaseStatus,
    services::{overlay::OverlayFrame, top_three::TopThree},
    state::ranking::RankingItem,
};

/// Current ranking snapshot.
#[derive(Debug, Serialize, ToSchema)]
pub struct RankingResponse {
    /// Snapshot version, bumped on every replacement.
    pub version: u64,
    /// Entries in backend order.
    pub ranking: Vec<RankingItem>,
}

/// Podium derived from the current ranking.
#[derive(Debug, Serialize, ToSchema)]
pub struct PodiumResponse {
    /// Tied teams grouped by place.
    pub podium: TopThree,
    /// Places announced since the last reset, in announcement order.
    pub revealed_places: Vec<u8>,
}

/// Controller view state plus the overlay a display would draw right now.
#[derive(Debug, Serialize, ToSchema)]
pub struct ShowcaseResponse {
    /// Controller view status.
    #[serde(flatten)]
    pub status: ShowcaseStatus,
    /// Frame to draw, absent while idle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<OverlayFrame>,
}
