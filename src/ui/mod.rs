//! UI rendering module for fplhelp
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components. Rendering only reads [`App`];
//! it never triggers fetches.

pub mod compare;
pub mod help_overlay;
pub mod leaders;
pub mod player_list;
pub mod squad;
pub mod suggestions;
pub mod widgets;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, InputMode, Status, View};
use crate::fetch::FetchSlot;

/// Renders the whole screen for the current state
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Tabs
            Constraint::Min(3),    // Current view
            Constraint::Length(1), // Input / status
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    render_tabs(frame, app, chunks[0]);

    match app.view {
        View::Players => player_list::render(frame, app, chunks[1]),
        View::Squad => squad::render(frame, app, chunks[1]),
        View::Suggestions => suggestions::render(frame, app, chunks[1]),
        View::Leaders => leaders::render(frame, app, chunks[1]),
    }

    render_status(frame, app, chunks[2]);
    render_hints(frame, app, chunks[3]);

    if app.show_compare {
        if let Some(data) = &app.compare {
            compare::render(frame, data);
        }
    }

    if app.show_help {
        help_overlay::render(frame);
    }
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![
        Span::styled(
            "FPLHELP",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
    ];

    for view in View::ALL {
        let style = if view == app.view {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", view.label()), style));
        spans.push(Span::raw(" "));
    }

    if let Some(team_id) = app.team_id {
        spans.push(Span::styled(
            format!("  team {}", team_id),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let separator = "─".repeat(area.width as usize);
    let lines = vec![
        Line::from(spans),
        Line::from(Span::styled(separator, Style::default().fg(Color::DarkGray))),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.input {
        InputMode::Search(text) => Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::Yellow)),
            Span::raw(text.clone()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ]),
        InputMode::TeamId(text) => Line::from(vec![
            Span::styled("Team id: ", Style::default().fg(Color::Yellow)),
            Span::raw(text.clone()),
            Span::styled("█", Style::default().fg(Color::Yellow)),
        ]),
        InputMode::Normal => {
            let style = match app.status {
                Some(Status::Error { .. }) => Style::default().fg(Color::Red),
                Some(Status::Info(_)) => Style::default().fg(Color::Yellow),
                None => Style::default().fg(Color::DarkGray),
            };
            let mut spans = Vec::new();
            if !app.loading.is_empty() {
                spans.push(Span::styled("⟳ ", Style::default().fg(Color::Cyan)));
            }
            spans.push(Span::styled(app.status_line(), style));
            Line::from(spans)
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_hints(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match app.view {
        View::Players => "↑↓ Move  n/p Page  / Search  1-4 Pos  o Sort  c Compare  f Fav  ? Help  q Quit",
        View::Squad => "Tab View  t Team  g Suggest  r Refresh  ? Help  q Quit",
        View::Suggestions => "↑↓ Move  Enter Compare  g Generate  Tab View  ? Help  q Quit",
        View::Leaders => "↑↓ Move  m Metric  1-4 Pos  0 All  c Compare  f Fav  r Refresh  ? Help  q Quit",
    };
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

/// Centered placeholder for a view without data
pub(crate) fn render_placeholder(frame: &mut Frame, area: Rect, app: &App, slot: FetchSlot, empty: &str) {
    let (text, color) = if app.is_loading(slot) {
        ("Loading...", Color::Cyan)
    } else {
        (empty, Color::DarkGray)
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(1),
            Constraint::Percentage(45),
        ])
        .split(area);
    frame.render_widget(
        Paragraph::new(text)
            .style(Style::default().fg(color))
            .alignment(ratatui::layout::Alignment::Center),
        chunks[1],
    );
}

/// Color for a form value (points per game over the last month)
pub(crate) fn form_color(form: f64) -> Color {
    if form >= 6.0 {
        Color::Green
    } else if form >= 4.0 {
        Color::Yellow
    } else if form >= 2.0 {
        Color::White
    } else {
        Color::Red
    }
}

/// Color for a player availability status code
pub(crate) fn status_color(status: &str) -> Color {
    match status {
        "" | "a" => Color::Green,
        "d" => Color::Yellow,
        "i" | "s" | "u" | "n" => Color::Red,
        _ => Color::Gray,
    }
}

/// Formats a price in millions
pub(crate) fn price(value: f64) -> String {
    format!("£{:.1}m", value)
}

/// Collects the text of a rendered buffer, for tests
#[cfg(test)]
pub(crate) fn buffer_text(buffer: &ratatui::buffer::Buffer) -> String {
    buffer.content().iter().map(|cell| cell.symbol()).collect()
}
