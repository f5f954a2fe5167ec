//! Local transfer heuristic for comparing two players
//!
//! Scores a swap (player out, player in) on seven factors, each scaled to
//! 0-10, and combines them with fixed weights into a priority score. The
//! result mirrors the cards the backend produces, so the Compare view can
//! show the same kind of verdict for any two players without a round trip.

use std::fmt;

use crate::api::models::PlayerDetail;

/// Weights of the individual factors; they sum to 1.0
const WEIGHT_FORM: f64 = 0.25;
const WEIGHT_PPG: f64 = 0.20;
const WEIGHT_VALUE: f64 = 0.15;
const WEIGHT_FIXTURES: f64 = 0.15;
const WEIGHT_OWNERSHIP: f64 = 0.10;
const WEIGHT_ICT: f64 = 0.10;
const WEIGHT_EXPECTED: f64 = 0.05;

/// Maximum number of reasons joined into the summary
const MAX_REASONS: usize = 3;

/// Kind of transfer, decided by cost first, then availability and form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionType {
    Upgrade,
    Downgrade,
    Injury,
    Form,
    Sideways,
}

impl SuggestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionType::Upgrade => "upgrade",
            SuggestionType::Downgrade => "downgrade",
            SuggestionType::Injury => "injury",
            SuggestionType::Form => "form",
            SuggestionType::Sideways => "sideways",
        }
    }
}

impl fmt::Display for SuggestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk bucket derived from the confidence score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 80.0 {
            RiskLevel::Low
        } else if confidence >= 60.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

/// Factor scores, each in 0-10
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorScores {
    pub form: f64,
    pub points_per_game: f64,
    pub value: f64,
    pub fixtures: f64,
    pub ownership: f64,
    pub ict: f64,
    pub expected: f64,
}

impl FactorScores {
    fn weighted(&self) -> f64 {
        self.form * WEIGHT_FORM
            + self.points_per_game * WEIGHT_PPG
            + self.value * WEIGHT_VALUE
            + self.fixtures * WEIGHT_FIXTURES
            + self.ownership * WEIGHT_OWNERSHIP
            + self.ict * WEIGHT_ICT
            + self.expected * WEIGHT_EXPECTED
    }
}

/// Verdict on swapping `out` for `in`
#[derive(Debug, Clone, PartialEq)]
pub struct TransferAnalysis {
    pub suggestion_type: SuggestionType,
    pub scores: FactorScores,
    /// Weighted score, rounded to 2 decimals
    pub priority_score: f64,
    /// Price difference in millions, positive when the swap costs money
    pub cost_change: f64,
    /// Expected extra points over the next five gameweeks
    pub predicted_points_gain: f64,
    /// 20-95
    pub confidence_score: f64,
    pub risk_level: RiskLevel,
    pub reason: String,
}

/// Scores swapping `player_out` for `player_in` at the given cost
pub fn analyze_transfer(
    player_out: &PlayerDetail,
    player_in: &PlayerDetail,
    cost_change: f64,
) -> TransferAnalysis {
    let scores = FactorScores {
        form: form_score(player_out, player_in),
        points_per_game: ppg_score(player_out, player_in),
        value: value_score(player_out, player_in),
        fixtures: fixture_score(player_out, player_in),
        ownership: ownership_score(player_out, player_in),
        ict: ict_score(player_out, player_in),
        expected: expected_score(player_out, player_in),
    };
    let priority = scores.weighted();
    let confidence = round2(confidence(player_out, player_in, priority));

    TransferAnalysis {
        suggestion_type: suggestion_type(player_out, player_in, cost_change),
        scores,
        priority_score: round2(priority),
        cost_change,
        predicted_points_gain: round2(predicted_gain(player_out, player_in, priority)),
        confidence_score: confidence,
        risk_level: RiskLevel::from_confidence(confidence),
        reason: reason(player_out, player_in, &scores),
    }
}

/// Swap analysis using the current prices of both players
pub fn analyze_swap(player_out: &PlayerDetail, player_in: &PlayerDetail) -> TransferAnalysis {
    let cost = round2(player_in.current_price - player_out.current_price);
    analyze_transfer(player_out, player_in, cost)
}

/// High-scoring, in-form, widely owned players are not worth selling
pub fn is_essential(player: &PlayerDetail) -> bool {
    player.total_points > 150 && player.form > 6.0 && player.selected_by_percent > 30.0
}

fn form_score(out: &PlayerDetail, inn: &PlayerDetail) -> f64 {
    ((inn.form - out.form) * 2.0).clamp(0.0, 10.0)
}

fn ppg_score(out: &PlayerDetail, inn: &PlayerDetail) -> f64 {
    (inn.points_per_game - out.points_per_game).clamp(0.0, 10.0)
}

fn value_score(out: &PlayerDetail, inn: &PlayerDetail) -> f64 {
    if out.value_score == 0.0 {
        return 5.0;
    }
    ((inn.value_score / out.value_score - 1.0) * 10.0).clamp(0.0, 10.0)
}

fn fixture_score(out: &PlayerDetail, inn: &PlayerDetail) -> f64 {
    ((inn.team.attack_strength() - out.team.attack_strength()) / 100.0).clamp(0.0, 10.0)
}

/// Lower ownership scores higher (differential picks)
fn ownership_score(out: &PlayerDetail, inn: &PlayerDetail) -> f64 {
    let diff = inn.selected_by_percent - out.selected_by_percent;
    if diff < 0.0 {
        (diff.abs() / 2.0).min(10.0)
    } else {
        (5.0 - diff / 4.0).max(0.0)
    }
}

fn ict_score(out: &PlayerDetail, inn: &PlayerDetail) -> f64 {
    ((inn.ict_index - out.ict_index) / 5.0).clamp(0.0, 10.0)
}

fn expected_score(out: &PlayerDetail, inn: &PlayerDetail) -> f64 {
    ((inn.expected_involvements() - out.expected_involvements()) * 2.0).clamp(0.0, 10.0)
}

fn suggestion_type(out: &PlayerDetail, inn: &PlayerDetail, cost_change: f64) -> SuggestionType {
    if cost_change > 0.5 {
        SuggestionType::Upgrade
    } else if cost_change < -0.5 {
        SuggestionType::Downgrade
    } else if !out.is_available() {
        SuggestionType::Injury
    } else if inn.form > out.form + 1.0 {
        SuggestionType::Form
    } else {
        SuggestionType::Sideways
    }
}

fn predicted_gain(out: &PlayerDetail, inn: &PlayerDetail, priority: f64) -> f64 {
    (inn.points_per_game - out.points_per_game) * 5.0 * (priority / 10.0)
}

fn confidence(out: &PlayerDetail, inn: &PlayerDetail, priority: f64) -> f64 {
    let mut confidence = 50.0;
    if inn.minutes > out.minutes {
        confidence += 10.0;
    }
    if inn.form > out.form {
        confidence += 15.0;
    }
    if inn.total_points > out.total_points {
        confidence += 10.0;
    }
    (confidence + priority / 10.0 * 15.0).clamp(20.0, 95.0)
}

fn reason(out: &PlayerDetail, inn: &PlayerDetail, scores: &FactorScores) -> String {
    let mut reasons = Vec::new();

    if scores.form > 2.0 {
        reasons.push(format!("Better recent form ({:.1} vs {:.1})", inn.form, out.form));
    }
    if scores.points_per_game > 1.0 {
        reasons.push(format!(
            "Higher points per game ({:.1} vs {:.1})",
            inn.points_per_game, out.points_per_game
        ));
    }
    if scores.value > 2.0 {
        reasons.push("Better value for money".to_string());
    }
    if inn.minutes > out.minutes + 200 {
        reasons.push("More game time".to_string());
    }
    if !out.is_available() {
        reasons.push(format!("Current player is {}", status_label(&out.status)));
    }
    if reasons.is_empty() {
        reasons.push("Potential upgrade based on overall statistics".to_string());
    }

    reasons.truncate(MAX_REASONS);
    reasons.join("; ")
}

fn status_label(status: &str) -> &'static str {
    match status {
        "i" => "injured",
        "d" => "doubtful",
        "s" => "suspended",
        "u" => "unavailable",
        _ => "not available",
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
