//! DTO definitions used by the admin REST API and documentation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::validation::{validate_announcement, validate_unique_teams},
    state::{
        announcement::{Announcement, AnnouncementAction},
        ranking::RankingItem,
    },
};

/// Request broadcasting a winner announcement to every viewer.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AnnounceRequest {
    /// Place 1 to 3, or 0 together with `reset`.
    pub place: i64,
    /// Action every viewer performs.
    pub action: AnnouncementAction,
}

impl AnnounceRequest {
    /// Convert into a validated announcement.
    pub fn announcement(&self) -> Result<Announcement, ValidationErrors> {
        validate_announcement(self.place, self.action).map_err(|err| {
            let mut errors = ValidationErrors::new();
            errors.add("place", err);
            errors
        })
    }
}

impl Validate for AnnounceRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        self.announcement().map(|_| ())
    }
}

/// Outcome of an announcement.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnnounceResponse {
    /// Announced place (0 for resets).
    pub place: u8,
    /// Announced action.
    pub action: AnnouncementAction,
    /// Number of viewer sockets the announcement was queued on.
    pub delivered: usize,
    /// RFC 3339 timestamp of the announcement.
    pub issued_at: String,
    /// Non-fatal problem, e.g. no viewer connected. The controller view applied it anyway.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Full ranking pushed by an administrator, replacing the current snapshot.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceRankingRequest {
    /// Complete replacement ranking.
    pub ranking: Vec<RankingItem>,
}

impl Validate for ReplaceRankingRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(err) = validate_unique_teams(&self.ranking) {
            errors.add("ranking", err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Summary of the ranking snapshot after a replacement.
#[derive(Debug, Serialize, ToSchema)]
pub struct RankingUpdateResponse {
    /// Number of teams in the new snapshot.
    pub teams: usize,
    /// Snapshot version after the replacement.
    pub version: u64,
    /// Viewer sockets that received the `ranking_update`.
    pub delivered: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announce_request_validation() {
        let ok: AnnounceRequest =
            serde_json::from_str(r#"{"place":3,"action":"start_animation"}"#).unwrap();
        assert!(ok.validate().is_ok());

        let missing: AnnounceRequest =
            serde_json::from_str(r#"{"place":0,"action":"start_animation"}"#).unwrap();
        let errors = missing.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("place"));

        let wide: AnnounceRequest =
            serde_json::from_str(r#"{"place":300,"action":"reveal"}"#).unwrap();
        assert!(wide.validate().unwrap_err().field_errors().contains_key("place"));
        let negative: AnnounceRequest =
            serde_json::from_str(r#"{"place":-2,"action":"reset"}"#).unwrap();
        assert!(negative.validate().is_err());
    }

    #[test]
    fn replace_ranking_rejects_duplicates() {
        let request: ReplaceRankingRequest = serde_json::from_str(
            r#"{"ranking":[{"team_id":1,"display_name":"A"},{"team_id":1,"display_name":"B"}]}"#,
        )
        .unwrap();
        assert!(request.validate().is_err());
    }
}
