use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{
    ranking::RankingItem,
    state_machine::{ShowcasePhase, ShowcaseSnapshot},
};

/// Publicly visible state of the controller view (REST/SSE).
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct ShowcaseStatus {
    /// Current phase of the controller view.
    pub phase: ShowcasePhase,
    /// Place being revealed while a showcase runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place: Option<u8>,
    /// Most recently revealed place.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revealed_place: Option<u8>,
    /// Teams revealed so far, in reveal order.
    pub revealed_teams: Vec<RankingItem>,
    /// Carousel rotation in degrees.
    pub rotation: f64,
}

impl From<&ShowcaseSnapshot> for ShowcaseStatus {
    fn from(value: &ShowcaseSnapshot) -> Self {
        Self {
            phase: value.phase,
            place: value.session.as_ref().map(|session| session.place.number()),
            revealed_place: value.revealed_place.map(|place| place.number()),
            revealed_teams: value.revealed_teams.clone(),
            rotation: value.rotation,
        }
    }
}
