//! Player table rendering
//!
//! Renders one page of the player list with the active filters, sort order,
//! favourite and comparison markers.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{form_color, price, render_placeholder, status_color};
use crate::api::models::{Page, PlayerSummary};
use crate::app::App;
use crate::fetch::FetchSlot;

/// Short name for a position id
fn position_label(position: Option<u8>) -> &'static str {
    match position {
        Some(1) => "GK",
        Some(2) => "DEF",
        Some(3) => "MID",
        Some(4) => "FWD",
        _ => "All",
    }
}

/// Describes the page and filters, e.g. `Page 2/14 · 523 players · MID · Form`
fn filter_summary(app: &App, page: Option<&Page<PlayerSummary>>) -> String {
    let query = &app.player_query;
    let mut parts = Vec::new();

    match page.and_then(|p| p.page_info.as_ref()) {
        Some(info) => parts.push(format!("Page {}/{}", info.current_page, info.total_pages)),
        None => parts.push(format!("Page {}", query.page)),
    }
    if let Some(count) = page.and_then(|p| p.count) {
        parts.push(format!("{} players", count));
    }
    parts.push(position_label(query.position).to_string());
    parts.push(format!("by {}", query.ordering.label()));
    if let Some(search) = &query.search {
        parts.push(format!("\"{}\"", search));
    }

    parts.join(" · ")
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Filters
            Constraint::Min(3),    // Table
        ])
        .split(area);

    frame.render_widget(
        Paragraph::new(filter_summary(app, app.players.as_ref()))
            .style(Style::default().fg(Color::Gray)),
        chunks[0],
    );

    let Some(page) = &app.players else {
        render_placeholder(frame, chunks[1], app, FetchSlot::Players, "No players loaded");
        return;
    };

    if page.results.is_empty() {
        render_placeholder(frame, chunks[1], app, FetchSlot::Players, "No players match");
        return;
    }

    let header = Line::from(Span::styled(
        format!(
            "    {:<16} {:<4} {:<4} {:>7} {:>5} {:>5} {:>5} {:>6}  {}",
            "Name", "Club", "Pos", "Price", "Pts", "Form", "PPG", "Sel%", "News"
        ),
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    ));

    // Keep the selection visible on short terminals
    let visible = chunks[1].height.saturating_sub(3) as usize;
    let offset = if visible > 0 && app.selected_index >= visible {
        app.selected_index + 1 - visible
    } else {
        0
    };

    let mut lines = vec![header];
    for (index, player) in page.results.iter().enumerate().skip(offset) {
        lines.push(player_line(app, player, index == app.selected_index));
    }

    let title = if app.is_loading(FetchSlot::Players) {
        " Players (updating) "
    } else {
        " Players "
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    frame.render_widget(Paragraph::new(lines).block(block), chunks[1]);
}

fn player_line(app: &App, player: &PlayerSummary, is_selected: bool) -> Line<'static> {
    let cursor = if is_selected { "\u{25B8} " } else { "  " }; // ▸ or space

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

    let news = player.injury_status.clone().unwrap_or_default();

    Line::from(vec![
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
        Span::styled(format!("{} ", marker), Style::default().fg(marker_color)),
        Span::styled(format!("{:<16.16}", player.web_name), name_style),
        Span::raw(" "),
        Span::styled(
            format!("{:<4} {:<4}", player.team_short_name, player.position_short),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(format!(" {:>7}", price(player.current_price))),
        Span::styled(
            format!(" {:>5}", player.total_points),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {:>5.1}", player.form),
            Style::default().fg(form_color(player.form)),
        ),
        Span::raw(format!(" {:>5.1} {:>5.1}%", player.points_per_game, player.selected_by_percent)),
        Span::raw("  "),
        Span::styled(news, Style::default().fg(status_color(&player.status))),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::test_data::page;
    use crate::fetch::{FetchData, FetchOutcome};
    use crate::ui::buffer_text;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(app: &App) -> String {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render(frame, app, area);
            })
            .unwrap();
        buffer_text(terminal.backend().buffer())
    }

    fn loaded(names: &[&str]) -> App {
        let mut app = App::new();
        app.apply(FetchOutcome {
            generation: 1,
            slot: FetchSlot::Players,
            result: Ok(FetchData::Players(page(names, true))),
        });
        app
    }

    #[test]
    fn test_renders_rows_and_filters() {
        let app = loaded(&["Saka", "Palmer"]);
        let content = draw(&app);

        assert!(content.contains("Saka"));
        assert!(content.contains("Palmer"));
        assert!(content.contains("£7.5m"));
        assert!(content.contains("Page 1 · 2 players · All · by Points"));
    }

    #[test]
    fn test_loading_placeholder() {
        let mut app = App::new();
        app.loading.insert(FetchSlot::Players);
        assert!(draw(&app).contains("Loading..."));
    }

    #[test]
    fn test_empty_result_placeholder() {
        let app = loaded(&[]);
        assert!(draw(&app).contains("No players match"));
    }

    #[test]
    fn test_favourite_marker() {
        let mut app = loaded(&["Saka"]);
        app.handle_key(KeyEvent::new(KeyCode::Char('f'), KeyModifiers::NONE));
        assert!(draw(&app).contains("★ Saka"));
    }

    #[test]
    fn test_selection_cursor() {
        let app = loaded(&["Saka", "Palmer"]);
        assert!(draw(&app).contains("▸   Saka"));
    }

    #[test]
    fn test_position_label() {
        assert_eq!(position_label(Some(1)), "GK");
        assert_eq!(position_label(None), "All");
    }
}
