use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::{
    announcement::{Announcement, AnnouncementAction, AnnouncementError},
    ranking::RankingItem,
};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Messages accepted from viewer WebSocket clients.
#[serde(tag = "type")]
pub enum ViewerInboundMessage {
    /// Ask for the current ranking snapshot (answered with `initial_ranking`).
    #[serde(rename = "get_ranking")]
    GetRanking,
    /// Any other message type; ignored.
    #[serde(other)]
    Unknown,
}

impl ViewerInboundMessage {
    /// Parse a raw text frame.
    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
/// Messages pushed to viewers on the winners socket.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewerOutboundMessage {
    /// Admin announcement. `place` is 0 only together with `reset`.
    WinnerAnnouncement {
        /// Announced place.
        place: u8,
        /// Announced action.
        action: AnnouncementAction,
    },
    /// Full ranking sent on request or right after connecting.
    InitialRanking {
        /// Current snapshot.
        ranking: Vec<RankingItem>,
    },
    /// Full ranking pushed whenever the server-side snapshot is replaced.
    RankingUpdate {
        /// New snapshot.
        ranking: Vec<RankingItem>,
    },
}

impl ViewerOutboundMessage {
    /// Wire message for a validated announcement.
    pub fn announcement(announcement: Announcement) -> Self {
        Self::WinnerAnnouncement {
            place: announcement.place_number(),
            action: announcement.action(),
        }
    }

    /// Validate a received `winner_announcement`; `None` for ranking messages.
    pub fn as_announcement(&self) -> Option<Result<Announcement, AnnouncementError>> {
        match self {
            Self::WinnerAnnouncement { place, action } => {
                Some(Announcement::from_parts(*place, *action))
            }
            _ => None,
        }
    }
}
