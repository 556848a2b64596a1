//! Stateless projection of a running showcase into what a display should draw.

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{
    ranking::{RankingItem, TeamId},
    state_machine::{ShowcasePhase, ShowcaseSession},
    theme::PlaceTheme,
};

/// Horizontal spacing between centered winners, in pixels.
pub const CENTER_SPACING_PX: f64 = 180.0;
/// Number of bursts drawn during the celebration.
pub const FIREWORK_BURSTS: usize = 12;

/// Inputs of one overlay frame.
#[derive(Debug, Clone, Copy)]
pub struct OverlayInput<'a> {
    /// Cards on the orbit, in orbit order.
    pub participants: &'a [RankingItem],
    /// Teams holding the revealed place.
    pub winners: &'a [RankingItem],
    /// Current orbit rotation in degrees.
    pub rotation: f64,
    /// Phase being drawn.
    pub phase: ShowcasePhase,
    /// Theme of the revealed place.
    pub theme: &'a PlaceTheme,
    /// Revealed place number.
    pub place: u8,
    /// Whether winner cards are highlighted.
    pub show_highlights: bool,
}

impl<'a> OverlayInput<'a> {
    /// Input for `session`, with highlights shown in every phase after the carousel.
    pub fn from_session(session: &'a ShowcaseSession, phase: ShowcasePhase, rotation: f64) -> Self {
        Self {
            participants: &session.participants,
            winners: &session.winners,
            rotation,
            phase,
            theme: &session.theme,
            place: session.place.number(),
            show_highlights: phase != ShowcasePhase::Carousel,
        }
    }
}

/// How a card is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardPlacement {
    /// Regular card riding the orbit.
    Orbit,
    /// Highlighted winner kept on the orbit.
    Hero,
    /// Winner pulled to the center of the stage.
    Centered {
        /// Horizontal offset from the stage center.
        offset_px: f64,
    },
}

/// A single participant card.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OverlayCard {
    /// Team shown on the card.
    pub team_id: TeamId,
    /// Name printed on the card.
    pub display_name: String,
    /// Average score with two decimals.
    pub score: String,
    /// Fixed position of the card on the orbit.
    pub item_angle: f64,
    /// Position after applying the orbit rotation.
    pub angle: f64,
    /// Whether the team holds the revealed place.
    pub winner: bool,
    /// Layout of the card.
    pub placement: CardPlacement,
}

/// Side of the stage a burst starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BurstSide {
    /// Left edge.
    Left,
    /// Right edge.
    Right,
}

/// One firework burst of the celebration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FireworkBurst {
    /// Stage side.
    pub side: BurstSide,
    /// Burst color from the theme palette.
    pub color: String,
}

/// Everything needed to draw the showcase at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OverlayFrame {
    /// Phase being drawn.
    pub phase: ShowcasePhase,
    /// Revealed place number.
    pub place: u8,
    /// Theme of the revealed place.
    pub theme: PlaceTheme,
    /// Orbit rotation in degrees.
    pub rotation: f64,
    /// Participant cards in orbit order.
    pub cards: Vec<OverlayCard>,
    /// Flare behind the stage center.
    pub center_stage: bool,
    /// Celebration bursts, empty outside the celebration.
    pub fireworks: Vec<FireworkBurst>,
}

/// Project the showcase state into a drawable frame.
pub fn project(input: &OverlayInput<'_>) -> OverlayFrame {
    let count = input.participants.len();
    let step = if count == 0 { 0.0 } else { 360.0 / count as f64 };
    let centered = input.show_highlights
        && matches!(
            input.phase,
            ShowcasePhase::Spotlight | ShowcasePhase::Celebration
        );
    let half_span = input.winners.len().saturating_sub(1) as f64 / 2.0;

    let cards = input
        .participants
        .iter()
        .enumerate()
        .map(|(index, team)| {
            let item_angle = step * index as f64;
            let winner_index = input
                .winners
                .iter()
                .position(|winner| winner.team_id == team.team_id);
            let winner = winner_index.is_some();

            let placement = match winner_index {
                Some(position) if centered => CardPlacement::Centered {
                    offset_px: (position as f64 - half_span) * CENTER_SPACING_PX,
                },
                Some(_) if input.show_highlights => CardPlacement::Hero,
                _ => CardPlacement::Orbit,
            };

            OverlayCard {
                team_id: team.team_id.clone(),
                display_name: team.display_name.clone(),
                score: team.average_score.display(),
                item_angle,
                angle: item_angle + input.rotation,
                winner: winner && input.show_highlights,
                placement,
            }
        })
        .collect();

    OverlayFrame {
        phase: input.phase,
        place: input.place,
        theme: input.theme.clone(),
        rotation: input.rotation,
        cards,
        center_stage: input.show_highlights && input.phase != ShowcasePhase::Carousel,
        fireworks: fireworks(input.phase, &input.theme.firework_colors),
    }
}

fn fireworks(phase: ShowcasePhase, palette: &[String]) -> Vec<FireworkBurst> {
    if phase != ShowcasePhase::Celebration || palette.is_empty() {
        return Vec::new();
    }
    (0..FIREWORK_BURSTS)
        .map(|index| FireworkBurst {
            side: if index % 2 == 0 {
                BurstSide::Left
            } else {
                BurstSide::Right
            },
            color: palette[index % palette.len()].clone(),
        })
        .collect()
}
