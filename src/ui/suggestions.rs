//! Transfer suggestion cards

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{price, render_placeholder};
use crate::api::models::TransferSuggestion;
use crate::app::App;
use crate::fetch::FetchSlot;

/// Color for a server risk label
fn risk_color(risk: &str) -> Color {
    match risk {
        "Low" => Color::Green,
        "Medium" => Color::Yellow,
        "High" => Color::Red,
        _ => Color::Gray,
    }
}

/// Signed price change, e.g. `+£1.5m`
fn cost_label(cost: f64) -> String {
    if cost > 0.0 {
        format!("+{}", price(cost))
    } else if cost < 0.0 {
        format!("-{}", price(-cost))
    } else {
        "free".to_string()
    }
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let generated = match &app.suggestions {
        Some(generated) if !generated.suggestions.is_empty() => generated,
        Some(_) => {
            render_placeholder(frame, area, app, FetchSlot::Suggestions, "No suggestions for this squad");
            return;
        }
        None => {
            let empty = if app.team_id.is_some() {
                "Press g to generate transfer suggestions"
            } else {
                "Load a team first (press t)"
            };
            render_placeholder(frame, area, app, FetchSlot::Suggestions, empty);
            return;
        }
    };

    // Each card takes three lines
    let per_screen = (area.height.saturating_sub(2) / 3).max(1) as usize;
    let offset = app.suggestion_index.saturating_sub(per_screen - 1);

    let mut lines = Vec::new();
    for (index, suggestion) in generated.suggestions.iter().enumerate().skip(offset) {
        lines.extend(card(index, suggestion, index == app.suggestion_index));
    }

    let block = Block::default()
        .title(format!(" {} suggestions for team {} ", generated.suggestions.len(), generated.team_id))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn card(index: usize, suggestion: &TransferSuggestion, is_selected: bool) -> Vec<Line<'static>> {
    let cursor = if is_selected { "\u{25B8} " } else { "  " };
    let name_style = if is_selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let out = &suggestion.player_out;
    let incoming = &suggestion.player_in;

    vec![
        Line::from(vec![
            Span::styled(cursor, Style::default().fg(Color::Cyan)),
            Span::styled(format!("{:>2}. ", index + 1), Style::default().fg(Color::DarkGray)),
            Span::styled(out.web_name.clone(), name_style.fg(Color::Red)),
            Span::styled(format!(" ({})", price(out.current_price)), Style::default().fg(Color::Gray)),
            Span::raw(" → "),
            Span::styled(incoming.web_name.clone(), name_style.fg(Color::Green)),
            Span::styled(
                format!(" ({})", price(incoming.current_price)),
                Style::default().fg(Color::Gray),
            ),
            Span::raw(format!("  {}", cost_label(suggestion.cost_change))),
        ]),
        Line::from(vec![
            Span::raw("      "),
            Span::styled(
                format!("+{:.1} pts", suggestion.predicted_points_gain),
                Style::default().fg(Color::Cyan),
            ),
            Span::raw(format!("  {:.0}% sure  ", suggestion.confidence_score)),
            Span::styled(
                format!("{} risk", suggestion.risk_level),
                Style::default().fg(risk_color(&suggestion.risk_level)),
            ),
            Span::styled(
                format!("  {}  priority {:.1}", suggestion.suggestion_type, suggestion.priority_score),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        Line::from(Span::styled(
            format!("      {}", suggestion.reason),
            Style::default().fg(Color::Gray),
        )),
    ]
}
