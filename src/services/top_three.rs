//! Podium derivation: group a ranking into first/second/third place buckets.

use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{announcement::Place, ranking::RankingItem};

/// Two scores closer than this share a place.
pub const SCORE_EPSILON: f64 = 0.0001;

/// Teams holding each podium place. Several teams share a bucket on a tie.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct TopThree {
    /// Teams tied for first place.
    pub first: Vec<RankingItem>,
    /// Teams tied for second place.
    pub second: Vec<RankingItem>,
    /// Teams tied for third place.
    pub third: Vec<RankingItem>,
}

impl TopThree {
    /// Teams tied at `place`.
    pub fn bucket(&self, place: Place) -> &[RankingItem] {
        match place {
            Place::First => &self.first,
            Place::Second => &self.second,
            Place::Third => &self.third,
        }
    }

    /// Whether anyone holds `place` yet.
    pub fn has(&self, place: Place) -> bool {
        !self.bucket(place).is_empty()
    }

    fn bucket_mut(&mut self, rank: usize) -> Option<&mut Vec<RankingItem>> {
        match rank {
            1 => Some(&mut self.first),
            2 => Some(&mut self.second),
            3 => Some(&mut self.third),
            _ => None,
        }
    }
}

/// Bucket `rankings` into the three podium places.
///
/// Rank advances by one per distinct score group (scores within
/// [`SCORE_EPSILON`] of the group's first score are tied) and everything past
/// the third group is dropped. Bad scores count as zero; the function never
/// fails and does not depend on input order.
pub fn compute_top_three(rankings: &[RankingItem]) -> TopThree {
    let mut result = TopThree::default();
    if rankings.is_empty() {
        return result;
    }

    let mut sorted: Vec<&RankingItem> = rankings.iter().collect();
    sorted.sort_by(|a, b| {
        b.score()
            .total_cmp(&a.score())
            .then_with(|| a.team_id.cmp(&b.team_id))
    });

    let mut current_rank = 0usize;
    let mut last_score: Option<f64> = None;

    for team in sorted {
        let score = team.score();
        let starts_group = match last_score {
            None => true,
            Some(last) => (score - last).abs() > SCORE_EPSILON,
        };
        if starts_group {
            current_rank += 1;
            last_score = Some(score);
        }

        if current_rank > 3 {
            break;
        }

        if let Some(bucket) = result.bucket_mut(current_rank) {
            bucket.push(team.clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::state::ranking::{Score, TeamId};

    fn team(id: i64, score: f64) -> RankingItem {
        RankingItem::new(id, format!("Team {id}"), score)
    }

    fn ids(bucket: &[RankingItem]) -> BTreeSet<TeamId> {
        bucket.iter().map(|t| t.team_id.clone()).collect()
    }

    fn set(values: &[i64]) -> BTreeSet<TeamId> {
        values.iter().map(|v| TeamId::Number(*v)).collect()
    }

    #[test]
    fn empty_input_yields_empty_buckets() {
        assert_eq!(compute_top_three(&[]), TopThree::default());
    }

    #[test]
    fn ties_share_a_place_and_rank_advances_by_one() {
        let rankings = vec![
            team(0, 9.0),
            team(1, 9.0),
            team(2, 8.5),
            team(3, 8.5),
            team(4, 8.5),
            team(5, 7.0),
        ];
        let top = compute_top_three(&rankings);
        assert_eq!(ids(&top.first), set(&[0, 1]));
        assert_eq!(ids(&top.second), set(&[2, 3, 4]));
        assert_eq!(ids(&top.third), set(&[5]));
    }

    #[test]
    fn groups_beyond_third_are_discarded() {
        let rankings = vec![team(1, 4.0), team(2, 3.0), team(3, 2.0), team(4, 1.0)];
        let top = compute_top_three(&rankings);
        assert_eq!(ids(&top.third), set(&[3]));
        assert!(
            [&top.first, &top.second, &top.third]
                .iter()
                .all(|bucket| !ids(bucket).contains(&TeamId::Number(4)))
        );
    }

    #[test]
    fn epsilon_boundary() {
        let tied = compute_top_three(&[team(1, 5.00005), team(2, 5.0)]);
        assert_eq!(ids(&tied.first), set(&[1, 2]));
        assert!(tied.second.is_empty());

        let split = compute_top_three(&[team(1, 5.001), team(2, 5.0)]);
        assert_eq!(ids(&split.first), set(&[1]));
        assert_eq!(ids(&split.second), set(&[2]));
    }

    #[test]
    fn result_does_not_depend_on_input_order() {
        let base = vec![
            team(1, 7.5),
            team(2, 9.0),
            team(3, 7.5),
            team(4, 8.25),
            team(5, 6.0),
            team(6, 9.00001),
        ];
        let expected = compute_top_three(&base);

        let mut rotated = base.clone();
        for _ in 0..base.len() {
            rotated.rotate_left(1);
            assert_eq!(compute_top_three(&rotated), expected);
        }

        let mut reversed = base;
        reversed.reverse();
        assert_eq!(compute_top_three(&reversed), expected);
    }

    #[test]
    fn unparseable_scores_rank_as_zero() {
        let mut broken = team(9, 0.0);
        broken.average_score = Score::Decimal("not a number".into());
        let rankings = vec![team(1, 2.0), broken, team(2, 1.0)];

        let top = compute_top_three(&rankings);
        assert_eq!(ids(&top.third), set(&[9]));
    }

    #[test]
    fn bucket_lookup_by_place() {
        let top = compute_top_three(&[team(1, 3.0), team(2, 2.0)]);
        assert!(top.has(Place::First));
        assert!(top.has(Place::Second));
        assert!(!top.has(Place::Third));
        assert_eq!(top.bucket(Place::Second)[0].team_id, TeamId::Number(2));
    }
}
