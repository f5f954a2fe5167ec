//! Squad screen rendering
//!
//! Shows the loaded team's starting eleven grouped by position, the bench,
//! and the server's squad analysis.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use super::{form_color, price, render_placeholder, status_color};
use crate::api::models::{TeamAnalysis, TeamPick, UserTeam};
use crate::app::App;
use crate::fetch::FetchSlot;

const LINES: [(&str, &str); 4] = [("GKP", "GK"), ("DEF", "DEF"), ("MID", "MID"), ("FWD", "FWD")];

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(squad) = &app.squad else {
        let empty = if app.team_id.is_some() {
            "Squad not loaded (press r)"
        } else {
            "No team loaded. Press t to enter your FPL team id"
        };
        render_placeholder(frame, area, app, FetchSlot::Squad, empty);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_team(frame, &squad.team, chunks[0]);
    render_analysis(frame, squad.analysis.as_ref(), chunks[1]);
}

fn render_team(frame: &mut Frame, team: &UserTeam, area: Rect) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                team.team_name.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", team.manager_name),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(Span::styled(
            format!(
                "{} pts  rank {}  bank {}  value {}  {} FT",
                team.total_points,
                team.overall_rank
                    .map(|rank| rank.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                price(team.bank_balance),
                price(team.team_value),
                team.free_transfers
            ),
            Style::default().fg(Color::White),
        )),
        Line::from(""),
    ];

    let starters = team.starters();
    for (position, label) in LINES {
        let picks: Vec<&TeamPick> = starters
            .iter()
            .copied()
            .filter(|pick| pick.player.position_short == position)
            .collect();
        if picks.is_empty() {
            continue;
        }
        let mut spans = vec![Span::styled(
            format!("{:<4}", label),
            Style::default().fg(Color::DarkGray),
        )];
        for pick in picks {
            spans.extend(pick_spans(pick));
        }
        lines.push(Line::from(spans));
    }

    // Players with a position the lines above do not know about
    let others: Vec<&TeamPick> = starters
        .iter()
        .copied()
        .filter(|pick| !LINES.iter().any(|(p, _)| *p == pick.player.position_short))
        .collect();
    if !others.is_empty() {
        let mut spans = vec![Span::styled("    ", Style::default())];
        for pick in others {
            spans.extend(pick_spans(pick));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    let mut bench = vec![Span::styled("Bench ", Style::default().fg(Color::DarkGray))];
    for pick in team.bench() {
        bench.extend(pick_spans(pick));
    }
    lines.push(Line::from(bench));

    let block = Block::default()
        .title(format!(" Squad {} ", team.fpl_team_id))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Name, armband and form of one pick
fn pick_spans(pick: &TeamPick) -> Vec<Span<'static>> {
    let armband = if pick.is_captain {
        " (C)"
    } else if pick.is_vice_captain {
        " (V)"
    } else {
        ""
    };
    vec![
        Span::styled(
            pick.player.web_name.clone(),
            Style::default().fg(status_color(&pick.player.status)),
        ),
        Span::styled(armband, Style::default().fg(Color::Yellow)),
        Span::styled(
            format!(" {:.1}", pick.player.form),
            Style::default().fg(form_color(pick.player.form)),
        ),
        Span::raw("  "),
    ]
}

fn render_analysis(frame: &mut Frame, analysis: Option<&TeamAnalysis>, area: Rect) {
    let block = Block::default()
        .title(" Analysis ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(analysis) = analysis else {
        let paragraph = Paragraph::new("Analysis unavailable")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    };

    let mut lines = Vec::new();

    if let Some(metrics) = &analysis.performance_metrics {
        lines.push(Line::from(format!(
            "Avg points {:.1}  form {:.1}",
            metrics.average_player_points, metrics.squad_average_form
        )));
        lines.push(Line::from(format!("Bench strength {:.1}", metrics.bench_strength)));
    }
    if let Some(squad) = &analysis.squad_analysis {
        lines.push(Line::from(format!(
            "Bench value {} of {}",
            price(squad.bench_value),
            price(squad.total_squad_value)
        )));
        lines.push(Line::from(Span::styled(
            format!("Priciest {}  cheapest {}", squad.most_expensive, squad.cheapest),
            Style::default().fg(Color::Gray),
        )));
    }

    lines.push(Line::from(""));
    if analysis.recommendations.is_empty() {
        lines.push(Line::from(Span::styled(
            "No concerns",
            Style::default().fg(Color::Green),
        )));
    }
    for recommendation in &analysis.recommendations {
        lines.push(Line::from(vec![
            Span::styled("! ", Style::default().fg(Color::Yellow)),
            Span::raw(recommendation.message.clone()),
        ]));
        if !recommendation.players.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("  {}", recommendation.players.join(", ")),
                Style::default().fg(Color::Gray),
            )));
        }
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
