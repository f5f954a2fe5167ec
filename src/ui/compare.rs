//! Side-by-side player comparison modal
//!
//! Shows both players' headline stats and recent scores, the local swap
//! verdict (first player out, second in), and the backend's per-metric
//! summary when it could be fetched.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::help_overlay::centered_rect;
use super::widgets::ScoreSparkline;
use super::{form_color, price, status_color};
use crate::analysis::{analyze_swap, is_essential, RiskLevel, TransferAnalysis};
use crate::api::models::{PerformanceHistory, PlayerComparison, PlayerDetail};
use crate::fetch::CompareData;

fn risk_color(risk: RiskLevel) -> Color {
    match risk {
        RiskLevel::Low => Color::Green,
        RiskLevel::Medium => Color::Yellow,
        RiskLevel::High => Color::Red,
    }
}

/// Renders the comparison on top of the current view
pub fn render(frame: &mut Frame, data: &CompareData) {
    let area = centered_rect(96, 27, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Compare (Esc to close) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(13), // Player cards
            Constraint::Min(4),     // Verdict and summary
        ])
        .split(inner);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    let [out, incoming] = &data.players;
    let [out_history, in_history] = &data.history;
    render_player(frame, out, out_history.as_ref(), &data.recent_scores(0), "OUT", columns[0]);
    render_player(frame, incoming, in_history.as_ref(), &data.recent_scores(1), "IN", columns[1]);

    let analysis = analyze_swap(out, incoming);
    let mut lines = verdict_lines(out, incoming, &analysis);
    if let Some(comparison) = &data.comparison {
        lines.push(Line::from(""));
        lines.extend(summary_lines(comparison));
    }
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), rows[1]);
}

fn render_player(
    frame: &mut Frame,
    player: &PlayerDetail,
    history: Option<&PerformanceHistory>,
    scores: &[i32],
    role: &str,
    area: Rect,
) {
    let block = Block::default()
        .title(format!(" {} ", role))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                player.web_name.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} {}", player.team.short_name, player.position.singular_name_short),
                Style::default().fg(Color::Gray),
            ),
        ]),
        stat_line("Price", price(player.current_price)),
        stat_line("Points", player.total_points.to_string()),
        Line::from(vec![
            Span::styled(format!("{:<10}", "Form"), Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{:.1}", player.form),
                Style::default().fg(form_color(player.form)),
            ),
            Span::styled(
                format!("  {}", player.form_trend),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        stat_line("PPG", format!("{:.1}", player.points_per_game)),
        stat_line("Selected", format!("{:.1}%", player.selected_by_percent)),
        stat_line("ICT", format!("{:.1}", player.ict_index)),
        stat_line(
            "xG / xA",
            format!("{:.2} / {:.2}", player.expected_goals, player.expected_assists),
        ),
        stat_line("Minutes", player.minutes.to_string()),
    ];

    if let Some(history) = history {
        lines.push(stat_line(
            "Trend",
            format!(
                "{} ({:.1} avg over {})",
                history.analysis.trend.replace('_', " "),
                history.analysis.average_points,
                history.analysis.games_played
            ),
        ));
    }

    if !player.news.is_empty() {
        lines.push(Line::from(Span::styled(
            player.news.clone(),
            Style::default().fg(status_color(&player.status)),
        )));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    if scores.is_empty() {
        return;
    }
    let label = "Recent    ";
    let spark_area = Rect {
        x: chunks[1].x + label.len() as u16,
        width: chunks[1].width.saturating_sub(label.len() as u16),
        ..chunks[1]
    };
    frame.render_widget(
        Paragraph::new(label).style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );
    frame.render_widget(ScoreSparkline::new(scores).highlight_best(), spark_area);
}

fn stat_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<10}", label), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn verdict_lines(
    out: &PlayerDetail,
    incoming: &PlayerDetail,
    analysis: &TransferAnalysis,
) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                format!("{} → {}", out.web_name, incoming.web_name),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", analysis.suggestion_type),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!("+{:.1} pts", analysis.predicted_points_gain),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(format!(
                "  priority {:.2}  {:.0}% sure  ",
                analysis.priority_score, analysis.confidence_score
            )),
            Span::styled(
                format!("{} risk", analysis.risk_level.label()),
                Style::default().fg(risk_color(analysis.risk_level)),
            ),
        ]),
        Line::from(Span::styled(
            analysis.reason.clone(),
            Style::default().fg(Color::Gray),
        )),
    ];

    if is_essential(out) {
        lines.push(Line::from(Span::styled(
            format!("{} is a core pick; think twice before selling", out.web_name),
            Style::default().fg(Color::Yellow),
        )));
    }
    lines
}

fn summary_lines(comparison: &PlayerComparison) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for metric in &comparison.metrics {
        let Some(summary) = comparison.summary.get(metric) else {
            continue;
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<20}", metric), Style::default().fg(Color::DarkGray)),
            Span::styled(
                summary.best_player.clone(),
                Style::default().fg(Color::Green),
            ),
            Span::styled(
                format!("  ({:.1} - {:.1})", summary.min, summary.max),
                Style::default().fg(Color::Gray),
            ),
        ]));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_data::detail;
    use crate::ui::buffer_text;
    use ratatui::{backend::TestBackend, Terminal};
    use serde_json::json;

    fn draw(data: &CompareData) -> String {
        let backend = TestBackend::new(100, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, data)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_cards_and_verdict() {
        let data = CompareData {
            players: [detail(1, "Havertz", "3.0"), detail(2, "Saka", "7.5")],
            comparison: None,
            history: [None, None],
        };
        let content = draw(&data);

        assert!(content.contains("OUT"));
        assert!(content.contains("Havertz"));
        assert!(content.contains("Saka"));
        assert!(content.contains("Havertz → Saka"));
        assert!(content.contains("risk"));
        // 9 of a 15-point scale
        assert!(content.contains("Recent"));
        assert!(content.contains("▅"));
    }

    #[test]
    fn test_history_drives_sparkline_and_trend() {
        let history: PerformanceHistory = serde_json::from_value(json!({
            "performances": [
                {"gameweek": 12, "points": 15},
                {"gameweek": 11, "points": 0}
            ],
            "analysis": {"games_played": 2, "average_points": 7.5, "best_performance": 15,
                         "worst_performance": 0, "trend": "insufficient_data"}
        }))
        .unwrap();
        let data = CompareData {
            players: [detail(1, "Havertz", "3.0"), detail(2, "Saka", "7.5")],
            comparison: None,
            history: [Some(history), None],
        };
        let content = draw(&data);

        assert!(content.contains("insufficient data (7.5 avg over 2)"));
        assert!(content.contains("█"));
    }

    #[test]
    fn test_server_summary_rows() {
        let comparison: PlayerComparison = serde_json::from_value(json!({
            "players": [],
            "metrics": ["form"],
            "summary": {"form": {"min": 3.0, "max": 7.5, "avg": 5.25, "best_player": "Saka"}}
        }))
        .unwrap();
        let data = CompareData {
            players: [detail(1, "Havertz", "3.0"), detail(2, "Saka", "7.5")],
            comparison: Some(comparison),
            history: [None, None],
        };
        let content = draw(&data);

        assert!(content.contains("(3.0 - 7.5)"));
    }
}
