//! Validation helpers for DTOs.

use std::collections::HashSet;

use validator::ValidationError;

use crate::state::{
    announcement::{Announcement, AnnouncementAction, AnnouncementError},
    ranking::RankingItem,
};

/// Validates the `(place, action)` pair of an announcement.
///
/// # Examples
///
/// ```ignore
/// validate_announcement(3, AnnouncementAction::StartAnimation) // Ok
/// validate_announcement(0, AnnouncementAction::Reset)          // Ok
/// validate_announcement(0, AnnouncementAction::Reveal)         // Err - place required
/// validate_announcement(4, AnnouncementAction::Reset)          // Err - out of range
/// ```
pub fn validate_announcement(
    place: i64,
    action: AnnouncementAction,
) -> Result<Announcement, ValidationError> {
    u8::try_from(place)
        .map_err(|_| AnnouncementError::PlaceOutOfRange(place))
        .and_then(|place| Announcement::from_parts(place, action))
        .map_err(|err| {
            let code = match err {
                AnnouncementError::PlaceOutOfRange(_) => "place_range",
                AnnouncementError::MissingPlace => "place_required",
            };
            let mut validation = ValidationError::new(code);
            validation.message = Some(err.to_string().into());
            validation
        })
}

/// Validates that every team appears at most once in a ranking.
pub fn validate_unique_teams(ranking: &[RankingItem]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for item in ranking {
        if !seen.insert(&item.team_id) {
            let mut err = ValidationError::new("duplicate_team");
            err.message = Some(format!("team `{}` is listed more than once", item.team_id).into());
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_announcement_valid() {
        assert!(validate_announcement(1, AnnouncementAction::StartAnimation).is_ok());
        assert!(validate_announcement(3, AnnouncementAction::Reveal).is_ok());
        assert!(validate_announcement(0, AnnouncementAction::Reset).is_ok());
        assert!(validate_announcement(2, AnnouncementAction::Reset).is_ok());
    }

    #[test]
    fn test_validate_announcement_invalid() {
        let err = validate_announcement(0, AnnouncementAction::StartAnimation).unwrap_err();
        assert_eq!(err.code, "place_required");
        let err = validate_announcement(4, AnnouncementAction::Reset).unwrap_err();
        assert_eq!(err.code, "place_range");
        let err = validate_announcement(256, AnnouncementAction::Reveal).unwrap_err();
        assert_eq!(err.code, "place_range");
        let err = validate_announcement(-1, AnnouncementAction::Reset).unwrap_err();
        assert_eq!(err.code, "place_range");
    }

    #[test]
    fn test_validate_unique_teams() {
        let ranking = vec![RankingItem::new(1, "A", 2.0), RankingItem::new("1", "B", 1.0)];
        assert!(validate_unique_teams(&ranking).is_ok());

        let duplicated = vec![RankingItem::new(1, "A", 2.0), RankingItem::new(1, "A'", 1.0)];
        assert!(validate_unique_teams(&duplicated).is_err());
    }
}
