//! Typed response and request schemas for the backend API
//!
//! Every endpoint decodes into one of these types at the gateway edge, so a
//! malformed payload fails with [`ApiError::Decode`](crate::gateway::ApiError)
//! instead of reaching the UI.
//!
//! The backend serialises decimal fields as strings (`"7.5"`); those fields
//! accept either a string or a number.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Deserializers for Django decimal fields
mod decimal {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    fn parse<E: de::Error>(raw: Raw) -> Result<f64, E> {
        match raw {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid decimal '{}'", s))),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        parse(Raw::deserialize(deserializer)?)
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<f64>, D::Error> {
            Option::<Raw>::deserialize(deserializer)?
                .map(parse)
                .transpose()
        }
    }
}

/// A Premier League club
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub fpl_id: u32,
    pub name: String,
    pub short_name: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub strength: u32,
    #[serde(default)]
    pub strength_overall_home: u32,
    #[serde(default)]
    pub strength_overall_away: u32,
    #[serde(default)]
    pub strength_attack_home: u32,
    #[serde(default)]
    pub strength_attack_away: u32,
    #[serde(default)]
    pub strength_defence_home: u32,
    #[serde(default)]
    pub strength_defence_away: u32,
    /// League table position
    #[serde(default)]
    pub position: u32,
}

impl Team {
    /// Mean of home and away attack strength
    pub fn attack_strength(&self) -> f64 {
        (self.strength_attack_home + self.strength_attack_away) as f64 / 2.0
    }
}

/// Playing position as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: u32,
    pub singular_name: String,
    pub singular_name_short: String,
    #[serde(default)]
    pub plural_name: String,
    #[serde(default)]
    pub plural_name_short: String,
}

/// One row of a player list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: u32,
    pub fpl_id: u32,
    pub web_name: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub team_short_name: String,
    #[serde(default)]
    pub position_name: String,
    #[serde(default)]
    pub position_short: String,
    /// Price in millions
    #[serde(deserialize_with = "decimal::deserialize")]
    pub current_price: f64,
    pub total_points: i32,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub form: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub points_per_game: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub selected_by_percent: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub value_score: f64,
    #[serde(default = "available")]
    pub is_available: bool,
    #[serde(default)]
    pub injury_status: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub minutes: u32,
}

fn available() -> bool {
    true
}

/// Last few gameweek scores of a player, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentPerformance {
    #[serde(default)]
    pub games: u32,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub average_points: f64,
    #[serde(default)]
    pub scores: Vec<i32>,
    #[serde(default)]
    pub trend: Option<String>,
}

/// Full player record from `players/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDetail {
    pub id: u32,
    pub fpl_id: u32,
    pub web_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub second_name: String,
    pub team: Team,
    pub position: Position,
    #[serde(default)]
    pub status: String,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub current_price: f64,
    pub total_points: i32,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub form: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub points_per_game: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub selected_by_percent: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub value_score: f64,
    #[serde(default)]
    pub form_trend: String,
    #[serde(default)]
    pub recent_performance: RecentPerformance,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub influence: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub creativity: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub threat: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub ict_index: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub expected_goals: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub expected_assists: f64,
    #[serde(default)]
    pub news: String,
    #[serde(default)]
    pub chance_of_playing_next_round: Option<u8>,
}

impl PlayerDetail {
    /// Status `a` means available to play
    pub fn is_available(&self) -> bool {
        self.status.is_empty() || self.status == "a"
    }

    /// Expected goals plus expected assists
    pub fn expected_involvements(&self) -> f64 {
        self.expected_goals + self.expected_assists
    }
}

/// Pagination details the backend adds next to `results`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    pub current_page: u32,
    pub total_pages: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_previous: bool,
}

/// A page of a paginated list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total item count; omitted by the backend for very large sets
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub page_info: Option<PageInfo>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }
}

/// A list endpoint response, paginated or not
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paged(Page<T>),
    Bare(Vec<T>),
}

impl<T> From<Listing<T>> for Page<T> {
    fn from(listing: Listing<T>) -> Self {
        match listing {
            Listing::Paged(page) => page,
            Listing::Bare(results) => Page {
                count: Some(results.len() as u64),
                next: None,
                previous: None,
                page_info: None,
                results,
            },
        }
    }
}

/// A player slot in a user's squad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamPick {
    pub player: PlayerSummary,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub purchase_price: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub selling_price: f64,
    #[serde(default)]
    pub is_captain: bool,
    #[serde(default)]
    pub is_vice_captain: bool,
    #[serde(default = "single")]
    pub multiplier: u8,
    /// Squad slot, 1-11 starting, 12-15 bench
    pub position: u8,
    #[serde(default)]
    pub is_starter: bool,
    #[serde(default)]
    pub role: String,
}

fn single() -> u8 {
    1
}

/// A user's fantasy team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTeam {
    pub fpl_team_id: u32,
    pub team_name: String,
    #[serde(default)]
    pub manager_name: String,
    #[serde(default)]
    pub current_event: Option<u32>,
    #[serde(default)]
    pub total_points: i32,
    #[serde(default)]
    pub overall_rank: Option<u64>,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub bank_balance: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub team_value: f64,
    #[serde(default)]
    pub free_transfers: u32,
    #[serde(default)]
    pub players: Vec<TeamPick>,
}

impl UserTeam {
    /// Starting eleven in slot order
    pub fn starters(&self) -> Vec<&TeamPick> {
        let mut picks: Vec<&TeamPick> = self.players.iter().filter(|p| p.is_starter).collect();
        picks.sort_by_key(|p| p.position);
        picks
    }

    /// Bench in slot order
    pub fn bench(&self) -> Vec<&TeamPick> {
        let mut picks: Vec<&TeamPick> = self.players.iter().filter(|p| !p.is_starter).collect();
        picks.sort_by_key(|p| p.position);
        picks
    }

    pub fn captain(&self) -> Option<&TeamPick> {
        self.players.iter().find(|p| p.is_captain)
    }
}

/// Response of `user-teams/load_team`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoadTeamResponse {
    #[serde(default)]
    pub message: String,
    pub team: UserTeam,
    #[serde(default)]
    pub cached: bool,
}

/// A server-generated transfer recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferSuggestion {
    #[serde(default)]
    pub id: u64,
    pub player_out: PlayerSummary,
    pub player_in: PlayerSummary,
    pub suggestion_type: String,
    #[serde(default)]
    pub reason: String,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub priority_score: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub cost_change: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub predicted_points_gain: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub confidence_score: f64,
    #[serde(default, deserialize_with = "decimal::option::deserialize")]
    pub expected_roi: Option<f64>,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub is_implemented: bool,
}

/// Body of `suggestions/generate`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateSuggestions {
    pub team_id: u32,
    pub max_suggestions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_filter: Option<u8>,
}

impl GenerateSuggestions {
    pub fn for_team(team_id: u32) -> Self {
        Self {
            team_id,
            max_suggestions: 10,
            position_filter: None,
        }
    }
}

/// Response of `suggestions/generate`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeneratedSuggestions {
    #[serde(default)]
    pub message: String,
    pub team_id: u32,
    #[serde(default)]
    pub count: usize,
    pub suggestions: Vec<TransferSuggestion>,
}

/// Body of `players/search`; unset criteria are omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerSearch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_points: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
}

/// Body of `players/compare`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareRequest {
    pub player_ids: Vec<u32>,
    pub metrics: Vec<String>,
}

/// Metrics requested when none are given
pub const DEFAULT_COMPARE_METRICS: [&str; 6] = [
    "total_points",
    "form",
    "points_per_game",
    "current_price",
    "selected_by_percent",
    "ict_index",
];

/// One player's row in a comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparedPlayer {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub stats: BTreeMap<String, Value>,
}

impl ComparedPlayer {
    /// Numeric value of a metric, accepting decimal strings
    pub fn stat(&self, metric: &str) -> Option<f64> {
        match self.stats.get(metric)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// Spread of one metric across the compared players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub best_player: String,
}

/// Response of `players/compare`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerComparison {
    pub players: Vec<ComparedPlayer>,
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub summary: BTreeMap<String, MetricSummary>,
}

/// Headline numbers of an analysed team
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamInfo {
    pub name: String,
    #[serde(default)]
    pub manager: String,
    #[serde(default)]
    pub total_points: i32,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub team_value: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub bank_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SquadAnalysis {
    pub total_players: u32,
    pub starters: u32,
    pub bench_players: u32,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub total_squad_value: f64,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub bench_value: f64,
    #[serde(default)]
    pub most_expensive: String,
    #[serde(default)]
    pub cheapest: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PerformanceMetrics {
    pub squad_total_points: i32,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub average_player_points: f64,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub squad_average_form: f64,
    #[serde(default, deserialize_with = "decimal::deserialize")]
    pub bench_strength: f64,
}

/// A quick recommendation from the team analysis
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    #[serde(default)]
    pub players: Vec<String>,
}

/// Response of `user-teams/{id}/analysis`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeamAnalysis {
    pub team_info: TeamInfo,
    #[serde(default)]
    pub squad_analysis: Option<SquadAnalysis>,
    #[serde(default)]
    pub performance_metrics: Option<PerformanceMetrics>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

/// One gameweek of a player's history
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameweekPerformance {
    pub gameweek: u32,
    pub points: i32,
    #[serde(default)]
    pub minutes: u32,
    #[serde(default)]
    pub goals_scored: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub bonus: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryAnalysis {
    pub games_played: u32,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub average_points: f64,
    pub best_performance: i32,
    pub worst_performance: i32,
    pub trend: String,
}

/// Response of `players/{id}/performance_history`, newest gameweek first
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PerformanceHistory {
    pub performances: Vec<GameweekPerformance>,
    pub analysis: HistoryAnalysis,
}

/// Response of `players/top_performers`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopPerformers {
    pub metric: String,
    #[serde(default)]
    pub position_filter: Option<String>,
    #[serde(default)]
    pub count: usize,
    pub players: Vec<PlayerSummary>,
}
