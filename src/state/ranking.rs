//! Ranking data as delivered by the judging backend.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier of a team. Depending on the backend generation this is either a
/// JSON integer or a JSON string, so both are accepted and echoed back as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TeamId {
    /// Numeric id.
    Number(i64),
    /// Textual id such as `"E-1"`.
    Text(String),
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamId::Number(value) => write!(f, "{value}"),
            TeamId::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for TeamId {
    fn from(value: i64) -> Self {
        TeamId::Number(value)
    }
}

impl From<i32> for TeamId {
    fn from(value: i32) -> Self {
        TeamId::Number(value.into())
    }
}

impl From<&str> for TeamId {
    fn from(value: &str) -> Self {
        TeamId::Text(value.to_string())
    }
}

/// Average score as it appears on the wire: a decimal string or a plain number.
///
/// Any other JSON shape (`null`, booleans, objects) reads as a zero score so a
/// single bad entry never rejects the ranking it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Score {
    /// Plain JSON number.
    Number(f64),
    /// Decimal string such as `"4.1000"`.
    Decimal(String),
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(number) => Score::Number(number.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(raw) => Score::Decimal(raw),
            _ => Score::default(),
        })
    }
}

impl Score {
    /// Numeric value used for ranking. Anything unparseable or non-finite counts as zero.
    pub fn value(&self) -> f64 {
        let parsed = match self {
            Score::Number(value) => *value,
            Score::Decimal(raw) => raw.trim().parse::<f64>().unwrap_or(0.0),
        };
        if parsed.is_finite() { parsed } else { 0.0 }
    }

    /// Score rendered with two decimals, the way it is shown on the podium.
    pub fn display(&self) -> String {
        format!("{:.2}", self.value())
    }
}

impl Default for Score {
    fn default() -> Self {
        Score::Number(0.0)
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Score::Number(value)
    }
}

/// Per-criterion aggregate attached to a ranking entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CriterionStat {
    /// Mean of the criterion across evaluations. Bad data reads as zero.
    #[serde(default, deserialize_with = "lenient_average")]
    pub average: f64,
    /// Number of evaluations that scored the criterion.
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u32,
}

/// One ranked team. Never mutated locally; snapshots are replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RankingItem {
    /// Team identifier (`num_equipe` on older backends).
    #[serde(alias = "num_equipe")]
    pub team_id: TeamId,
    /// Name shown on the card.
    #[serde(alias = "project_name", alias = "nom_equipe")]
    pub display_name: String,
    /// Average score; missing or malformed values rank as zero.
    #[serde(default)]
    pub average_score: Score,
    /// Number of evaluations behind the average.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_evaluations: u32,
    /// Per-criterion averages, keyed by criterion label.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    #[schema(value_type = Object)]
    pub criterion_breakdown: IndexMap<String, CriterionStat>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_average<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Score::deserialize(deserializer)?.value())
}

impl RankingItem {
    /// Build a bare entry without criterion details.
    pub fn new(team_id: impl Into<TeamId>, display_name: impl Into<String>, score: impl Into<Score>) -> Self {
        Self {
            team_id: team_id.into(),
            display_name: display_name.into(),
            average_score: score.into(),
            total_evaluations: 0,
            criterion_breakdown: IndexMap::new(),
        }
    }

    /// Ranking value of this entry.
    pub fn score(&self) -> f64 {
        self.average_score.value()
    }
}

/// A complete ranking as last received from the ranking source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingSnapshot {
    items: Vec<RankingItem>,
    version: u64,
}

impl RankingSnapshot {
    /// Wrap a list of ranking entries received from the backend.
    pub fn new(items: Vec<RankingItem>) -> Self {
        Self { items, version: 0 }
    }

    /// Entries in the order the backend delivered them.
    pub fn items(&self) -> &[RankingItem] {
        &self.items
    }

    /// Number of replacements applied since startup.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the whole snapshot. Partial updates are never applied.
    pub fn replace(&mut self, items: Vec<RankingItem>) {
        self.items = items;
        self.version += 1;
    }

    /// Whether no entry has been received yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn team_id_accepts_numbers_and_strings() {
        let numeric: TeamId = serde_json::from_str("42").unwrap();
        let text: TeamId = serde_json::from_str("\"T-07\"").unwrap();
        assert_eq!(numeric, TeamId::Number(42));
        assert_eq!(text, TeamId::Text("T-07".into()));
        assert_eq!(text.to_string(), "T-07");
    }

    #[test]
    fn score_parsing_degrades_to_zero() {
        assert_eq!(Score::Decimal("4.25".into()).value(), 4.25);
        assert_eq!(Score::Decimal("n/a".into()).value(), 0.0);
        assert_eq!(Score::Number(f64::NAN).value(), 0.0);
        assert_eq!(Score::Number(f64::INFINITY).value(), 0.0);
        assert_eq!(Score::Decimal("3.456".into()).display(), "3.46");
    }

    #[test]
    fn ranking_item_accepts_backend_field_names() {
        let raw = r#"{
            "team_id": 3,
            "project_name": "Solar Kiosk",
            "average_score": "4.1000",
            "total_evaluations": 5,
            "criterion_breakdown": { "Impact": { "average": 4.5, "count": 5 } }
        }"#;
        let item: RankingItem = serde_json::from_str(raw).unwrap();
        assert_eq!(item.display_name, "Solar Kiosk");
        assert_eq!(item.score(), 4.1);
        assert_eq!(item.criterion_breakdown["Impact"].count, 5);
    }

    #[test]
    fn ranking_item_accepts_legacy_team_fields() {
        let raw = r#"[{"num_equipe":"E-1","nom_equipe":"Alpha","average_score":"9.0"}]"#;
        let items: Vec<RankingItem> = serde_json::from_str(raw).unwrap();
        assert_eq!(items[0].team_id, TeamId::Text("E-1".into()));
        assert_eq!(items[0].display_name, "Alpha");
        assert_eq!(items[0].score(), 9.0);
    }

    #[test]
    fn malformed_scores_keep_the_ranking() {
        let raw = r#"[
            {"team_id":1,"display_name":"A","average_score":"9.0"},
            {"team_id":2,"display_name":"B","average_score":null,
             "total_evaluations":null,"criterion_breakdown":null},
            {"team_id":3,"display_name":"C","average_score":{"avg":4}},
            {"team_id":4,"display_name":"D","average_score":true,
             "criterion_breakdown":{"Impact":{"average":null,"count":2}}},
            {"team_id":5,"display_name":"E","average_score":"7.0"}
        ]"#;
        let items: Vec<RankingItem> = serde_json::from_str(raw).unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[1].score(), 0.0);
        assert_eq!(items[1].total_evaluations, 0);
        assert!(items[1].criterion_breakdown.is_empty());
        assert_eq!(items[2].score(), 0.0);
        assert_eq!(items[3].score(), 0.0);
        assert_eq!(items[3].criterion_breakdown["Impact"].average, 0.0);
        assert_eq!(items[4].score(), 7.0);

        let top = crate::services::top_three::compute_top_three(&items);
        assert_eq!(top.third.len(), 3);
        assert!(top.third.iter().any(|item| item.team_id == TeamId::Number(2)));
    }

    #[test]
    fn snapshot_replacement_bumps_version() {
        let mut snapshot = RankingSnapshot::default();
        assert!(snapshot.is_empty());
        snapshot.replace(vec![RankingItem::new(1, "A", 3.0)]);
        assert_eq!(snapshot.version(), 1);
        assert_eq!(snapshot.items().len(), 1);
    }
}
