//! Winner announcement vocabulary shared by the admin producer and every viewer.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// One of the three podium positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Place {
    /// Winner.
    First,
    /// Runner-up.
    Second,
    /// Third place, revealed first.
    Third,
}

impl Place {
    /// All places in reveal order (third place is announced first).
    pub const REVEAL_ORDER: [Place; 3] = [Place::Third, Place::Second, Place::First];

    /// Numeric rank (1, 2 or 3).
    pub fn number(self) -> u8 {
        match self {
            Place::First => 1,
            Place::Second => 2,
            Place::Third => 3,
        }
    }

    /// Map a rank number onto a place, rejecting anything outside 1..=3.
    pub fn from_number(value: u8) -> Option<Self> {
        match value {
            1 => Some(Place::First),
            2 => Some(Place::Second),
            3 => Some(Place::Third),
            _ => None,
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl Serialize for Place {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.number())
    }
}

impl<'de> Deserialize<'de> for Place {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = u8::deserialize(deserializer)?;
        Place::from_number(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("place must be 1, 2 or 3 (got {raw})")))
    }
}

/// What the admin asks every viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnnouncementAction {
    /// Play the full showcase for the place.
    StartAnimation,
    /// Jump straight to the revealed state, no animation.
    Reveal,
    /// Tear everything down and forget revealed places.
    Reset,
}

/// Reasons an announcement is rejected before it reaches the channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnouncementError {
    /// Place outside `0..=3`.
    #[error("place {0} is out of range (expected 0 to 3)")]
    PlaceOutOfRange(i64),
    /// Place 0 paired with an action other than reset.
    #[error("place 0 is only valid with the reset action")]
    MissingPlace,
}

/// A validated announcement. `place` is absent only for resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Announcement {
    /// Play the showcase for a place.
    StartAnimation(Place),
    /// Reveal a place without animation.
    Reveal(Place),
    /// Forget everything.
    Reset,
}

impl Announcement {
    /// Validate the raw wire pair `(place, action)`.
    pub fn from_parts(place: u8, action: AnnouncementAction) -> Result<Self, AnnouncementError> {
        if place > 3 {
            return Err(AnnouncementError::PlaceOutOfRange(place.into()));
        }
        match (action, Place::from_number(place)) {
            (AnnouncementAction::Reset, _) => Ok(Announcement::Reset),
            (AnnouncementAction::StartAnimation, Some(place)) => {
                Ok(Announcement::StartAnimation(place))
            }
            (AnnouncementAction::Reveal, Some(place)) => Ok(Announcement::Reveal(place)),
            (_, None) => Err(AnnouncementError::MissingPlace),
        }
    }

    /// Wire representation of the place (0 for resets).
    pub fn place_number(&self) -> u8 {
        match self {
            Announcement::StartAnimation(place) | Announcement::Reveal(place) => place.number(),
            Announcement::Reset => 0,
        }
    }

    /// Wire action of this announcement.
    pub fn action(&self) -> AnnouncementAction {
        match self {
            Announcement::StartAnimation(_) => AnnouncementAction::StartAnimation,
            Announcement::Reveal(_) => AnnouncementAction::Reveal,
            Announcement::Reset => AnnouncementAction::Reset,
        }
    }

    /// Announced place, `None` for resets.
    pub fn place(&self) -> Option<Place> {
        match self {
            Announcement::StartAnimation(place) | Announcement::Reveal(place) => Some(*place),
            Announcement::Reset => None,
        }
    }
}
