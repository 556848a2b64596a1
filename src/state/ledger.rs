use indexmap::IndexMap;

use crate::state::ranking::{RankingItem, TeamId};

/// Teams revealed so far in the current viewing session, in reveal order.
///
/// Only grows (union on every reveal) until a full reset clears it. Lives in
/// memory only: a viewer that reloads starts from an empty ledger.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevealedWinnersLedger {
    teams: IndexMap<TeamId, RankingItem>,
}

impl RevealedWinnersLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `winners` into the ledger. Known teams keep their position but take
    /// the newer entry.
    pub fn merge<'a>(&mut self, winners: impl IntoIterator<Item = &'a RankingItem>) {
        for team in winners {
            self.teams.insert(team.team_id.clone(), team.clone());
        }
    }

    /// Whether `team_id` was revealed.
    pub fn contains(&self, team_id: &TeamId) -> bool {
        self.teams.contains_key(team_id)
    }

    /// Revealed teams in reveal order.
    pub fn iter(&self) -> impl Iterator<Item = &RankingItem> {
        self.teams.values()
    }

    /// Number of revealed teams.
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Whether nothing was revealed yet.
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Forget every revealed team.
    pub fn clear(&mut self) {
        self.teams.clear();
    }
}
