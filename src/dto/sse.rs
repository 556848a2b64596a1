use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::phase::ShowcaseStatus,
    state::{announcement::AnnouncementAction, ranking::RankingItem},
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE event name.
    pub event: Option<String>,
    /// JSON payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the SSE stream (`public` or `admin`).
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the upstream ranking source is currently failing.
    pub degraded: bool,
    /// Optional admin token returned when the stream is privileged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the ranking source starts or stops failing.
pub struct SystemStatus {
    /// Whether the upstream ranking source is failing.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Mirror of a winner announcement on the SSE streams.
pub struct AnnouncementEvent {
    /// Announced place (0 for resets).
    pub place: u8,
    /// Announced action.
    pub action: AnnouncementAction,
    /// RFC 3339 timestamp of the announcement.
    pub issued_at: String,
    /// Viewer sockets the announcement was queued on.
    pub delivered: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever the ranking snapshot is replaced.
pub struct RankingUpdatedEvent {
    /// Snapshot version after the replacement.
    pub version: u64,
    /// Full replacement ranking.
    pub ranking: Vec<RankingItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Broadcast whenever the controller view changes phase or reveals a place.
pub struct ShowcaseChangedEvent(pub ShowcaseStatus);
