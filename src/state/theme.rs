//! Visual themes attached to each podium place.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Colors and label used by the overlay while a place is being revealed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlaceTheme {
    /// Place label such as "Champion".
    pub label: String,
    /// CSS gradient of the stage.
    pub gradient: String,
    /// Accent color.
    pub accent: String,
    /// Text color.
    pub text: String,
    /// Glow color.
    pub glow: String,
    /// Spotlight beam color.
    pub beam: String,
    /// Firework palette.
    pub firework_colors: Vec<String>,
}

impl PlaceTheme {
    fn build(
        label: &str,
        gradient: &str,
        accent: &str,
        text: &str,
        glow: &str,
        beam: &str,
        firework_colors: [&str; 3],
    ) -> Self {
        Self {
            label: label.into(),
            gradient: gradient.into(),
            accent: accent.into(),
            text: text.into(),
            glow: glow.into(),
            beam: beam.into(),
            firework_colors: firework_colors.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Gold theme for the winner.
    pub fn first() -> Self {
        Self::build(
            "1st Place",
            "linear-gradient(135deg, #f8c365 0%, #f1aa26 35%, #f8c365 100%)",
            "#f5b74a",
            "#2c1600",
            "rgba(248, 195, 101, 0.55)",
            "rgba(248, 195, 101, 0.35)",
            ["#fff6da", "#f6d579", "#ff6b35"],
        )
    }

    /// Silver theme.
    pub fn second() -> Self {
        Self::build(
            "2nd Place",
            "linear-gradient(135deg, #d1e4ff 0%, #96b5ff 35%, #d1e4ff 100%)",
            "#8aaef8",
            "#0b1c33",
            "rgba(150, 181, 255, 0.45)",
            "rgba(150, 181, 255, 0.3)",
            ["#cfe0ff", "#8eb8ff", "#4ecdc4"],
        )
    }

    /// Bronze theme.
    pub fn third() -> Self {
        Self::build(
            "3rd Place",
            "linear-gradient(135deg, #ffd9c7 0%, #ff9f72 35%, #ffd9c7 100%)",
            "#ff9f72",
            "#331103",
            "rgba(255, 159, 114, 0.5)",
            "rgba(255, 159, 114, 0.28)",
            ["#ffe2d4", "#ffb184", "#ffd83d"],
        )
    }

    /// Fallback for anything that is not a podium place.
    pub fn finalist() -> Self {
        Self::build(
            "Finalist",
            "linear-gradient(135deg, #dfe8ff 0%, #c7d7ff 100%)",
            "#9fb4ff",
            "#0d1a32",
            "rgba(159, 180, 255, 0.35)",
            "rgba(159, 180, 255, 0.25)",
            ["#e2edff", "#c3d3ff", "#96aaff"],
        )
    }
}

/// Theme table keyed by place number, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceThemes {
    first: PlaceTheme,
    second: PlaceTheme,
    third: PlaceTheme,
    finalist: PlaceTheme,
}

impl Default for PlaceThemes {
    fn default() -> Self {
        Self {
            first: PlaceTheme::first(),
            second: PlaceTheme::second(),
            third: PlaceTheme::third(),
            finalist: PlaceTheme::finalist(),
        }
    }
}

impl PlaceThemes {
    /// Build a table, keeping the built-in theme wherever no override is given.
    pub fn with_overrides(
        first: Option<PlaceTheme>,
        second: Option<PlaceTheme>,
        third: Option<PlaceTheme>,
        finalist: Option<PlaceTheme>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            first: first.unwrap_or(defaults.first),
            second: second.unwrap_or(defaults.second),
            third: third.unwrap_or(defaults.third),
            finalist: finalist.unwrap_or(defaults.finalist),
        }
    }

    /// Look up the theme for a place number. Unknown numbers get the finalist theme.
    pub fn get(&self, place: u8) -> &PlaceTheme {
        match place {
            1 => &self.first,
            2 => &self.second,
            3 => &self.third,
            _ => &self.finalist,
        }
    }
}

/// Built-in theme for `place`; never fails.
pub fn place_theme(place: u8) -> PlaceTheme {
    match place {
        1 => PlaceTheme::first(),
        2 => PlaceTheme::second(),
        3 => PlaceTheme::third(),
        _ => PlaceTheme::finalist(),
    }
}
