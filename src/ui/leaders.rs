//! Leaderboard and club table
//!
//! The left pane ranks available regulars by the chosen metric; the right
//! pane lists the clubs in league order.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{form_color, price, render_placeholder};
use crate::api::models::{PlayerSummary, Team};
use crate::api::LeaderMetric;
use crate::app::App;
use crate::fetch::FetchSlot;

/// Column header and cell for the ranking metric
///
/// List rows carry no ICT index, so that board shows total points.
fn metric_cell(metric: LeaderMetric, player: &PlayerSummary) -> (&'static str, String) {
    match metric {
        LeaderMetric::TotalPoints | LeaderMetric::IctIndex => ("Pts", player.total_points.to_string()),
        LeaderMetric::Form => ("Form", format!("{:.1}", player.form)),
        LeaderMetric::PointsPerGame => ("PPG", format!("{:.1}", player.points_per_game)),
        LeaderMetric::Value => ("Pts/£m", format!("{:.1}", player.value_score)),
        LeaderMetric::Selected => ("Sel%", format!("{:.1}", player.selected_by_percent)),
    }
}

fn position_label(position: Option<u8>) -> &'static str {
    match position {
        Some(1) => "GK",
        Some(2) => "DEF",
        Some(3) => "MID",
        Some(4) => "FWD",
        _ => "All",
    }
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let Some(data) = &app.leaders else {
        render_placeholder(frame, area, app, FetchSlot::Leaders, "No leaderboard loaded");
        return;
    };

    render_board(frame, app, &data.top.players, columns[0]);

    match &data.teams {
        Some(teams) => render_clubs(frame, teams, columns[1]),
        None => render_placeholder(frame, columns[1], app, FetchSlot::Leaders, "Club list unavailable"),
    }
}

fn render_board(frame: &mut Frame, app: &App, players: &[PlayerSummary], area: Rect) {
    let title = format!(
        " Top {} by {} · {}{} ",
        players.len(),
        app.leader_metric.label(),
        position_label(app.leader_position),
        if app.is_loading(FetchSlot::Leaders) { " (updating)" } else { "" }
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if players.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_placeholder(frame, inner, app, FetchSlot::Leaders, "Nobody qualifies");
        return;
    }

    let (metric_header, _) = metric_cell(app.leader_metric, &players[0]);
    let header = Line::from(Span::styled(
        format!(
            "      {:<3} {:<14} {:<4} {:<4} {:>7} {:>7}",
            "#", "Name", "Club", "Pos", "Price", metric_header
        ),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    ));

    let visible = area.height.saturating_sub(3) as usize;
    let offset = if visible > 0 && app.leader_index >= visible {
        app.leader_index + 1 - visible
    } else {
        0
    };

    let mut lines = vec![header];
    for (index, player) in players.iter().enumerate().skip(offset) {
        let is_selected = index == app.leader_index;
        let cursor = if is_selected { "\u{25B8} " } else { "  " };
        let (marker, marker_color) = if app.is_marked(player) {
            ("◆", Color::Magenta)
        } else if app.prefs.is_favourite(player.fpl_id) {
            ("★", Color::Yellow)
        } else {
            (" ", Color::Reset)
        };
        let name_style = if is_selected {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let (_, value) = metric_cell(app.leader_metric, player);

        lines.push(Line::from(vec![
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
            Span::styled(format!("{} ", marker), Style::default().fg(marker_color)),
            Span::styled(format!(" {:<3}", index + 1), Style::default().fg(Color::DarkGray)),
            Span::styled(format!(" {:<14.14}", player.web_name), name_style),
            Span::styled(
                format!(" {:<4} {:<4}", player.team_short_name, player.position_short),
                Style::default().fg(Color::Gray),
            ),
            Span::raw(format!(" {:>7}", price(player.current_price))),
            Span::styled(
                format!(" {:>7}", value),
                Style::default()
                    .fg(form_color(player.form))
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_clubs(frame: &mut Frame, teams: &[Team], area: Rect) {
    let mut clubs: Vec<&Team> = teams.iter().collect();
    // Clubs without a table position go last
    clubs.sort_by_key(|team| (team.position == 0, team.position, team.name.clone()));

    let lines: Vec<Line> = clubs
        .iter()
        .map(|team| {
            let rank = if team.position > 0 {
                team.position.to_string()
            } else {
                "-".to_string()
            };
            Line::from(vec![
                Span::styled(format!("{:>3} ", rank), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{:<4}", team.short_name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(team.name.clone(), Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let block = Block::default()
        .title(format!(" Clubs ({}) ", teams.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
