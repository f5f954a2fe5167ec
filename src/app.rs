//! Application state management for fplhelp
//!
//! This module contains the main application state and keyboard handling.
//! Key handling never performs I/O: actions that need data return a
//! [`FetchRequest`] for the event loop to dispatch, and results come back
//! through [`App::apply`].

use std::collections::HashSet;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::api::models::{GeneratedSuggestions, Page, PlayerSummary};
use crate::api::{Freshness, LeaderMetric, PlayerQuery};
use crate::cache::{PreferenceStore, Preferences};
use crate::cli::StartupConfig;
use crate::fetch::{
    CompareData, FetchData, FetchOutcome, FetchRequest, FetchSlot, LeadersData, PlayerKey, SquadData,
};
use crate::gateway::ApiError;

/// Main views, cycled with Tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Paginated player table
    Players,
    /// The loaded user squad and its analysis
    Squad,
    /// Server-generated transfer suggestions
    Suggestions,
    /// Leaderboards and the club table
    Leaders,
}

impl View {
    /// Parses a view name, accepting a few aliases (case-insensitive)
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "players" | "player" => Some(View::Players),
            "squad" | "team" => Some(View::Squad),
            "suggestions" | "suggest" | "transfers" => Some(View::Suggestions),
            "leaders" | "leaderboard" | "dashboard" => Some(View::Leaders),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Players => "Players",
            View::Squad => "Squad",
            View::Suggestions => "Suggestions",
            View::Leaders => "Leaders",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            View::Players => View::Squad,
            View::Squad => View::Suggestions,
            View::Suggestions => View::Leaders,
            View::Leaders => View::Players,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            View::Players => View::Leaders,
            View::Squad => View::Players,
            View::Suggestions => View::Squad,
            View::Leaders => View::Suggestions,
        }
    }

    pub const ALL: [View; 4] = [View::Players, View::Squad, View::Suggestions, View::Leaders];
}

/// What typed characters are routed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Keys are commands
    Normal,
    /// Editing the player search text
    Search(String),
    /// Editing the team id to load
    TeamId(String),
}

/// Message shown in the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    /// Failure of the last action; only status and message are kept
    Error { status: Option<u16>, message: String },
}

impl Status {
    fn from_error(error: &ApiError) -> Self {
        Status::Error {
            status: error.status(),
            message: error.to_string(),
        }
    }
}

/// Main application struct managing state and data
pub struct App {
    /// Current main view
    pub view: View,
    pub input: InputMode,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Flag to show the comparison modal
    pub show_compare: bool,
    /// Filters of the player table
    pub player_query: PlayerQuery,
    /// Last successfully fetched player page
    pub players: Option<Page<PlayerSummary>>,
    /// Selected row in the player table
    pub selected_index: usize,
    /// Selected card in the suggestions view
    pub suggestion_index: usize,
    /// Players marked for comparison (at most two)
    pub compare_marks: Vec<PlayerKey>,
    pub compare: Option<CompareData>,
    /// Team to show in the squad and suggestions views
    pub team_id: Option<u32>,
    pub squad: Option<SquadData>,
    pub suggestions: Option<GeneratedSuggestions>,
    /// Ranking of the leaderboard
    pub leader_metric: LeaderMetric,
    /// Position filter of the leaderboard
    pub leader_position: Option<u8>,
    pub leaders: Option<LeadersData>,
    /// Selected row of the leaderboard
    pub leader_index: usize,
    /// Views with a fetch in flight
    pub loading: HashSet<FetchSlot>,
    pub status: Option<Status>,
    /// Timestamp of the last successful fetch
    pub last_refresh: Option<DateTime<Local>>,
    pub prefs: Preferences,
    prefs_store: Option<PreferenceStore>,
}

impl App {
    /// Creates an app with default state and no preference file
    pub fn new() -> Self {
        Self {
            view: View::Players,
            input: InputMode::Normal,
            should_quit: false,
            show_help: false,
            show_compare: false,
            player_query: PlayerQuery {
                page: 1,
                ..Default::default()
            },
            players: None,
            selected_index: 0,
            suggestion_index: 0,
            compare_marks: Vec::new(),
            compare: None,
            team_id: None,
            squad: None,
            suggestions: None,
            leader_metric: LeaderMetric::default(),
            leader_position: None,
            leaders: None,
            leader_index: 0,
            loading: HashSet::new(),
            status: None,
            last_refresh: None,
            prefs: Preferences::default(),
            prefs_store: None,
        }
    }

    /// Creates an app from CLI startup settings and stored preferences
    ///
    /// A team given on the command line wins over the remembered one.
    pub fn with_startup_config(config: StartupConfig, prefs_store: Option<PreferenceStore>) -> Self {
        let mut app = Self::new();
        if let Some(store) = &prefs_store {
            app.prefs = store.load();
        }
        app.prefs_store = prefs_store;
        app.team_id = config.team_id.or(app.prefs.last_team_id);
        if let Some(view) = config.initial_view {
            app.view = view;
        }
        app
    }

    /// Fetches needed before the first useful render
    pub fn initial_requests(&mut self) -> Vec<FetchRequest> {
        let mut requests = vec![self.players_request(Freshness::Cached)];
        if let Some(team_id) = self.team_id {
            requests.push(self.request(FetchRequest::Squad { team_id }));
        }
        if self.view == View::Leaders {
            requests.push(self.leaders_request(Freshness::Cached));
        }
        requests
    }

    pub fn is_loading(&self, slot: FetchSlot) -> bool {
        self.loading.contains(&slot)
    }

    /// Currently selected row of the player table
    pub fn selected_player(&self) -> Option<&PlayerSummary> {
        self.players
            .as_ref()
            .and_then(|page| page.results.get(self.selected_index))
    }

    /// Currently selected row of the leaderboard
    pub fn selected_leader(&self) -> Option<&PlayerSummary> {
        self.leaders
            .as_ref()
            .and_then(|data| data.top.players.get(self.leader_index))
    }

    pub fn is_marked(&self, player: &PlayerSummary) -> bool {
        self.compare_marks.contains(&PlayerKey::from(player))
    }

    /// Handles keyboard input
    ///
    /// # Key Bindings
    /// - `q`: Quit (`Esc` quits when nothing is open)
    /// - `Tab`/`BackTab`: Next/previous view
    /// - `?`: Toggle help overlay
    /// - `t`: Enter a team id to load
    /// - `g`: Generate transfer suggestions for the loaded team
    /// - `r`: Refresh the current view, bypassing the cache
    /// - `Up`/`k`, `Down`/`j`: Move selection
    /// - Players view: `n`/`p` page, `/` search, `1`-`4` position, `0` clear,
    ///   `o` ordering, `c` mark for comparison, `f` favourite
    /// - Suggestions view: `Enter` compares the suggested swap
    /// - Leaders view: `m` metric, `1`-`4` position, `0` clear, `c`, `f` as above
    ///
    /// # Returns
    /// A fetch to dispatch, if the key asks for data
    pub fn handle_key(&mut self, key_event: KeyEvent) -> Option<FetchRequest> {
        if key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return None;
        }

        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return None;
        }

        match self.input.clone() {
            InputMode::Search(buffer) => return self.handle_search_key(key_event, buffer),
            InputMode::TeamId(buffer) => return self.handle_team_key(key_event, buffer),
            InputMode::Normal => {}
        }

        if self.show_compare {
            match key_event.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Esc | KeyCode::Char('c') | KeyCode::Enter => self.show_compare = false,
                KeyCode::Char('?') => self.show_help = true,
                _ => {}
            }
            return None;
        }

        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                None
            }
            KeyCode::Esc => {
                if self.compare_marks.is_empty() {
                    self.should_quit = true;
                } else {
                    self.compare_marks.clear();
                }
                None
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                None
            }
            KeyCode::Tab => self.switch_view(self.view.next()),
            KeyCode::BackTab => self.switch_view(self.view.previous()),
            KeyCode::Char('t') => {
                self.input = InputMode::TeamId(
                    self.team_id.map(|id| id.to_string()).unwrap_or_default(),
                );
                None
            }
            KeyCode::Char('g') => {
                self.view = View::Suggestions;
                self.suggestions_request()
            }
            KeyCode::Char('r') => self.refresh(),
            _ => match self.view {
                View::Players => self.handle_players_key(key_event),
                View::Squad => None,
                View::Suggestions => self.handle_suggestions_key(key_event),
                View::Leaders => self.handle_leaders_key(key_event),
            },
        }
    }

    fn handle_players_key(&mut self, key_event: KeyEvent) -> Option<FetchRequest> {
        match key_event.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection_up();
                None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection_down();
                None
            }
            KeyCode::Char('n') | KeyCode::Right => {
                if self.players.as_ref().is_some_and(|page| page.has_next()) {
                    self.player_query.page += 1;
                    Some(self.players_request(Freshness::Cached))
                } else {
                    None
                }
            }
            KeyCode::Char('p') | KeyCode::Left => {
                if self.player_query.page > 1 {
                    self.player_query.page -= 1;
                    Some(self.players_request(Freshness::Cached))
                } else {
                    None
                }
            }
            KeyCode::Char('/') => {
                self.input = InputMode::Search(self.player_query.search.clone().unwrap_or_default());
                None
            }
            KeyCode::Char(c @ '1'..='4') => {
                let position = c as u8 - b'0';
                self.filter_players(|query| query.position = Some(position))
            }
            KeyCode::Char('0') => self.filter_players(|query| query.position = None),
            KeyCode::Char('o') => self.filter_players(|query| query.ordering = query.ordering.next()),
            KeyCode::Char('c') => {
                let key = PlayerKey::from(self.selected_player()?);
                self.toggle_compare_mark(key)
            }
            KeyCode::Char('f') => {
                let fpl_id = self.selected_player()?.fpl_id;
                self.toggle_favourite(fpl_id);
                None
            }
            _ => None,
        }
    }

    fn handle_leaders_key(&mut self, key_event: KeyEvent) -> Option<FetchRequest> {
        let count = self.leaders.as_ref().map_or(0, |data| data.top.players.len());
        match key_event.code {
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                self.leader_index = (self.leader_index + count - 1) % count;
                None
            }
            KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                self.leader_index = (self.leader_index + 1) % count;
                None
            }
            KeyCode::Char('m') => {
                self.leader_metric = self.leader_metric.next();
                self.leader_index = 0;
                Some(self.leaders_request(Freshness::Cached))
            }
            KeyCode::Char(c @ '1'..='4') => {
                self.leader_position = Some(c as u8 - b'0');
                self.leader_index = 0;
                Some(self.leaders_request(Freshness::Cached))
            }
            KeyCode::Char('0') => {
                self.leader_position = None;
                self.leader_index = 0;
                Some(self.leaders_request(Freshness::Cached))
            }
            KeyCode::Char('c') => {
                let key = PlayerKey::from(self.selected_leader()?);
                self.toggle_compare_mark(key)
            }
            KeyCode::Char('f') => {
                let fpl_id = self.selected_leader()?.fpl_id;
                self.toggle_favourite(fpl_id);
                None
            }
            _ => None,
        }
    }

    fn handle_suggestions_key(&mut self, key_event: KeyEvent) -> Option<FetchRequest> {
        let count = self
            .suggestions
            .as_ref()
            .map_or(0, |generated| generated.suggestions.len());
        match key_event.code {
            KeyCode::Up | KeyCode::Char('k') if count > 0 => {
                self.suggestion_index = (self.suggestion_index + count - 1) % count;
                None
            }
            KeyCode::Down | KeyCode::Char('j') if count > 0 => {
                self.suggestion_index = (self.suggestion_index + 1) % count;
                None
            }
            KeyCode::Enter => {
                let suggestion = self.suggestions.as_ref()?.suggestions.get(self.suggestion_index)?;
                let players = [
                    PlayerKey::from(&suggestion.player_out),
                    PlayerKey::from(&suggestion.player_in),
                ];
                Some(self.request(FetchRequest::Compare {
                    players,
                    freshness: Freshness::Cached,
                }))
            }
            _ => None,
        }
    }

    fn handle_search_key(&mut self, key_event: KeyEvent, mut buffer: String) -> Option<FetchRequest> {
        match key_event.code {
            KeyCode::Esc => {
                self.input = InputMode::Normal;
                None
            }
            KeyCode::Enter => {
                self.input = InputMode::Normal;
                let search = Some(buffer.trim().to_string()).filter(|s| !s.is_empty());
                self.view = View::Players;
                self.filter_players(|query| query.search = search)
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.input = InputMode::Search(buffer);
                None
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                self.input = InputMode::Search(buffer);
                None
            }
            _ => None,
        }
    }

    fn handle_team_key(&mut self, key_event: KeyEvent, mut buffer: String) -> Option<FetchRequest> {
        match key_event.code {
            KeyCode::Esc => {
                self.input = InputMode::Normal;
                None
            }
            KeyCode::Enter => {
                self.input = InputMode::Normal;
                match buffer.trim().parse::<u32>() {
                    Ok(team_id) if team_id > 0 => {
                        if self.team_id != Some(team_id) {
                            self.squad = None;
                            self.suggestions = None;
                        }
                        self.team_id = Some(team_id);
                        self.view = View::Squad;
                        Some(self.request(FetchRequest::Squad { team_id }))
                    }
                    _ => {
                        self.status = Some(Status::Error {
                            status: None,
                            message: format!("Invalid team id: '{}'", buffer.trim()),
                        });
                        None
                    }
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
                self.input = InputMode::TeamId(buffer);
                None
            }
            KeyCode::Char(c) if c.is_ascii_digit() => {
                buffer.push(c);
                self.input = InputMode::TeamId(buffer);
                None
            }
            _ => None,
        }
    }

    /// Applies a fetch outcome
    ///
    /// Data is replaced only on success; a failure only updates the status bar.
    pub fn apply(&mut self, outcome: FetchOutcome) {
        self.loading.remove(&outcome.slot);

        let data = match outcome.result {
            Ok(data) => data,
            Err(error) => {
                warn!(slot = ?outcome.slot, error = %error, "fetch failed");
                self.status = Some(Status::from_error(&error));
                return;
            }
        };

        self.last_refresh = Some(Local::now());
        self.status = None;

        match data {
            FetchData::Players(page) => {
                if self.selected_index >= page.results.len() {
                    self.selected_index = page.results.len().saturating_sub(1);
                }
                self.players = Some(page);
            }
            FetchData::Squad(squad) => {
                let team_id = squad.team.fpl_team_id;
                info!(team_id, "squad loaded");
                self.team_id = Some(team_id);
                self.squad = Some(squad);
                self.remember_team(team_id);
            }
            FetchData::Suggestions(generated) => {
                self.suggestion_index = 0;
                if generated.suggestions.is_empty() {
                    self.status = Some(Status::Info("No transfer suggestions for this squad".to_string()));
                }
                self.suggestions = Some(generated);
            }
            FetchData::Compare(data) => {
                self.compare = Some(*data);
                self.show_compare = true;
            }
            FetchData::Leaders(data) => {
                if self.leader_index >= data.top.players.len() {
                    self.leader_index = data.top.players.len().saturating_sub(1);
                }
                self.leaders = Some(data);
            }
        }
    }

    /// Text for the status bar
    pub fn status_line(&self) -> String {
        match &self.status {
            Some(Status::Error {
                status: Some(status),
                message,
            }) => format!("[{}] {}", status, message),
            Some(Status::Error { status: None, message }) => message.clone(),
            Some(Status::Info(message)) => message.clone(),
            None => match self.last_refresh {
                Some(at) => format!("Updated {}", at.format("%H:%M:%S")),
                None => "Press ? for help".to_string(),
            },
        }
    }

    fn switch_view(&mut self, view: View) -> Option<FetchRequest> {
        self.view = view;
        match (view, self.team_id) {
            (View::Squad, Some(team_id)) if self.squad.is_none() && !self.is_loading(FetchSlot::Squad) => {
                Some(self.request(FetchRequest::Squad { team_id }))
            }
            (View::Leaders, _) if self.leaders.is_none() && !self.is_loading(FetchSlot::Leaders) => {
                Some(self.leaders_request(Freshness::Cached))
            }
            _ => None,
        }
    }

    fn refresh(&mut self) -> Option<FetchRequest> {
        match self.view {
            View::Players => Some(self.players_request(Freshness::Refresh)),
            View::Squad => match self.team_id {
                Some(team_id) => Some(self.request(FetchRequest::Squad { team_id })),
                None => self.need_team(),
            },
            View::Suggestions => self.suggestions_request(),
            View::Leaders => Some(self.leaders_request(Freshness::Refresh)),
        }
    }

    fn suggestions_request(&mut self) -> Option<FetchRequest> {
        match self.team_id {
            Some(team_id) => Some(self.request(FetchRequest::Suggestions { team_id })),
            None => self.need_team(),
        }
    }

    fn need_team(&mut self) -> Option<FetchRequest> {
        self.status = Some(Status::Info("Load a team first (press t)".to_string()));
        None
    }

    /// Changes the player filters and goes back to the first page
    fn filter_players(&mut self, change: impl FnOnce(&mut PlayerQuery)) -> Option<FetchRequest> {
        change(&mut self.player_query);
        self.player_query.page = 1;
        self.selected_index = 0;
        Some(self.players_request(Freshness::Cached))
    }

    fn players_request(&mut self, freshness: Freshness) -> FetchRequest {
        self.request(FetchRequest::Players {
            query: self.player_query.clone(),
            freshness,
        })
    }

    fn leaders_request(&mut self, freshness: Freshness) -> FetchRequest {
        self.request(FetchRequest::Leaders {
            metric: self.leader_metric,
            position: self.leader_position,
            freshness,
        })
    }

    fn request(&mut self, request: FetchRequest) -> FetchRequest {
        self.loading.insert(request.slot());
        request
    }

    fn toggle_compare_mark(&mut self, key: PlayerKey) -> Option<FetchRequest> {
        if let Some(index) = self.compare_marks.iter().position(|k| *k == key) {
            self.compare_marks.remove(index);
            return None;
        }
        self.compare_marks.push(key);
        if self.compare_marks.len() < 2 {
            self.status = Some(Status::Info("Marked for comparison; mark one more (c)".to_string()));
            return None;
        }
        let players = [self.compare_marks[0], self.compare_marks[1]];
        self.compare_marks.clear();
        Some(self.request(FetchRequest::Compare {
            players,
            freshness: Freshness::Cached,
        }))
    }

    fn toggle_favourite(&mut self, fpl_id: u32) {
        self.prefs.toggle_favourite(fpl_id);
        self.save_prefs();
    }

    fn remember_team(&mut self, team_id: u32) {
        if self.prefs.last_team_id != Some(team_id) {
            self.prefs.last_team_id = Some(team_id);
            self.save_prefs();
        }
    }

    fn save_prefs(&mut self) {
        if let Some(store) = &self.prefs_store {
            if let Err(err) = store.save(&self.prefs) {
                warn!(error = %err, "could not save preferences");
                self.status = Some(Status::Error {
                    status: None,
                    message: err.to_string(),
                });
            }
        }
    }

    /// Moves the selection up in the table, wrapping to bottom if at top
    fn move_selection_up(&mut self) {
        let count = self.players.as_ref().map_or(0, |page| page.results.len());
        if count == 0 {
            return;
        }
        self.selected_index = if self.selected_index == 0 {
            count - 1
        } else {
            self.selected_index - 1
        };
    }

    /// Moves the selection down in the table, wrapping to top if at bottom
    fn move_selection_down(&mut self) {
        let count = self.players.as_ref().map_or(0, |page| page.results.len());
        if count == 0 {
            return;
        }
        self.selected_index = (self.selected_index + 1) % count;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}


#[cfg(test)]
mod tests {
    use super::test_data::*;
    use super::*;
    use crate::api::PlayerOrdering;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tempfile::TempDir;

    /// Helper to create a KeyEvent for testing
    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn outcome(slot: FetchSlot, result: Result<FetchData, ApiError>) -> FetchOutcome {
        FetchOutcome {
            generation: 1,
            slot,
            result,
        }
    }

    fn app_with_players(names: &[&str], has_next: bool) -> App {
        let mut app = App::new();
        app.apply(outcome(FetchSlot::Players, Ok(FetchData::Players(page(names, has_next)))));
        app
    }

    fn server_error() -> ApiError {
        ApiError::Server {
            status: 503,
            message: "Service unavailable".to_string(),
            data: crate::gateway::Payload::Empty,
        }
    }

    #[test]
    fn test_new_starts_on_players_view() {
        let app = App::new();
        assert_eq!(app.view, View::Players);
        assert_eq!(app.input, InputMode::Normal);
        assert_eq!(app.player_query.page, 1);
        assert!(app.players.is_none());
    }

    #[test]
    fn test_view_from_str_and_cycle() {
        assert_eq!(View::from_str("Squad"), Some(View::Squad));
        assert_eq!(View::from_str("nope"), None);
        for view in View::ALL {
            assert_eq!(view.next().previous(), view);
        }
    }

    #[test]
    fn test_initial_requests_include_squad_when_team_known() {
        let mut app = App::with_startup_config(
            StartupConfig {
                team_id: Some(1234567),
                initial_view: Some(View::Squad),
            },
            None,
        );
        let requests = app.initial_requests();

        assert_eq!(app.view, View::Squad);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1], FetchRequest::Squad { team_id: 1234567 });
        assert!(app.is_loading(FetchSlot::Players));
        assert!(app.is_loading(FetchSlot::Squad));
    }

    #[test]
    fn test_q_quits() {
        let mut app = App::new();
        assert!(app.handle_key(key_event(KeyCode::Char('q'))).is_none());
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_even_while_typing() {
        let mut app = App::new();
        app.input = InputMode::Search("sal".to_string());
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_overlay_intercepts_keys() {
        let mut app = App::new();
        app.handle_key(key_event(KeyCode::Char('?')));
        assert!(app.show_help);

        app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(app.view, View::Players, "Tab ignored while help is shown");

        app.handle_key(key_event(KeyCode::Esc));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_tab_cycles_views() {
        let mut app = App::new();
        app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(app.view, View::Squad);
        app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(app.view, View::Suggestions);
        app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(app.view, View::Leaders);
        app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(app.view, View::Players);
        app.handle_key(key_event(KeyCode::BackTab));
        assert_eq!(app.view, View::Leaders);
    }

    #[test]
    fn test_leaders_view_fetches_once() {
        let mut app = App::new();
        app.view = View::Suggestions;
        let request = app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(
            request,
            Some(FetchRequest::Leaders {
                metric: LeaderMetric::TotalPoints,
                position: None,
                freshness: Freshness::Cached,
            })
        );
        assert!(app.is_loading(FetchSlot::Leaders));

        app.apply(outcome(FetchSlot::Leaders, Ok(FetchData::Leaders(leaders(&["A", "B"])))));
        app.handle_key(key_event(KeyCode::Tab));
        assert!(app.handle_key(key_event(KeyCode::BackTab)).is_none());
    }

    #[test]
    fn test_leader_filters_request_new_board() {
        let mut app = App::new();
        app.view = View::Leaders;
        app.apply(outcome(FetchSlot::Leaders, Ok(FetchData::Leaders(leaders(&["A", "B", "C"])))));
        app.handle_key(key_event(KeyCode::Up));
        assert_eq!(app.selected_leader().unwrap().web_name, "C");

        let request = app.handle_key(key_event(KeyCode::Char('m')));
        assert!(matches!(
            request,
            Some(FetchRequest::Leaders { metric: LeaderMetric::Form, position: None, .. })
        ));
        assert_eq!(app.leader_index, 0);

        let request = app.handle_key(key_event(KeyCode::Char('3')));
        assert!(matches!(
            request,
            Some(FetchRequest::Leaders { metric: LeaderMetric::Form, position: Some(3), .. })
        ));

        let request = app.handle_key(key_event(KeyCode::Char('r')));
        assert!(matches!(
            request,
            Some(FetchRequest::Leaders { freshness: Freshness::Refresh, .. })
        ));
    }

    #[test]
    fn test_leaders_feed_comparison() {
        let mut app = App::new();
        app.view = View::Leaders;
        app.apply(outcome(FetchSlot::Leaders, Ok(FetchData::Leaders(leaders(&["A", "B"])))));

        app.handle_key(key_event(KeyCode::Char('c')));
        app.handle_key(key_event(KeyCode::Down));
        let request = app.handle_key(key_event(KeyCode::Char('c')));

        assert!(matches!(request, Some(FetchRequest::Compare { .. })));
    }

    #[test]
    fn test_tab_to_squad_fetches_when_team_known() {
        let mut app = App::new();
        app.team_id = Some(42);
        let request = app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(request, Some(FetchRequest::Squad { team_id: 42 }));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = app_with_players(&["A", "B", "C"], false);
        app.handle_key(key_event(KeyCode::Char('k')));
        assert_eq!(app.selected_index, 2);
        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.selected_index, 0);
        app.handle_key(key_event(KeyCode::Char('j')));
        assert_eq!(app.selected_player().unwrap().web_name, "B");
    }

    #[test]
    fn test_next_page_only_when_server_has_more() {
        let mut app = app_with_players(&["A"], false);
        assert!(app.handle_key(key_event(KeyCode::Char('n'))).is_none());
        assert_eq!(app.player_query.page, 1);

        let mut app = app_with_players(&["A"], true);
        let request = app.handle_key(key_event(KeyCode::Char('n')));
        match request {
            Some(FetchRequest::Players { query, freshness }) => {
                assert_eq!(query.page, 2);
                assert_eq!(freshness, Freshness::Cached);
            }
            other => panic!("Expected players request, got {:?}", other),
        }

        let request = app.handle_key(key_event(KeyCode::Char('p')));
        assert!(matches!(request, Some(FetchRequest::Players { ref query, .. }) if query.page == 1));
        assert!(app.handle_key(key_event(KeyCode::Char('p'))).is_none());
    }

    #[test]
    fn test_position_filter_resets_page() {
        let mut app = app_with_players(&["A"], true);
        app.player_query.page = 3;

        let request = app.handle_key(key_event(KeyCode::Char('2')));
        assert_eq!(app.player_query.position, Some(2));
        assert_eq!(app.player_query.page, 1);
        assert!(request.is_some());

        app.handle_key(key_event(KeyCode::Char('0')));
        assert_eq!(app.player_query.position, None);
    }

    #[test]
    fn test_ordering_cycles() {
        let mut app = App::new();
        app.handle_key(key_event(KeyCode::Char('o')));
        assert_eq!(app.player_query.ordering, PlayerOrdering::Form);
    }

    #[test]
    fn test_search_input_submits_query() {
        let mut app = App::new();
        app.handle_key(key_event(KeyCode::Char('/')));
        for c in "salahx".chars() {
            app.handle_key(key_event(KeyCode::Char(c)));
        }
        app.handle_key(key_event(KeyCode::Backspace));
        assert_eq!(app.input, InputMode::Search("salah".to_string()));

        // Command keys are typed, not executed
        assert!(!app.should_quit);

        let request = app.handle_key(key_event(KeyCode::Enter));
        assert_eq!(app.input, InputMode::Normal);
        assert_eq!(app.player_query.search.as_deref(), Some("salah"));
        assert!(matches!(request, Some(FetchRequest::Players { .. })));
    }

    #[test]
    fn test_search_escape_keeps_old_query() {
        let mut app = App::new();
        app.handle_key(key_event(KeyCode::Char('/')));
        app.handle_key(key_event(KeyCode::Char('x')));
        assert!(app.handle_key(key_event(KeyCode::Esc)).is_none());
        assert_eq!(app.player_query.search, None);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_team_input_loads_squad() {
        let mut app = App::new();
        app.handle_key(key_event(KeyCode::Char('t')));
        for c in "12a34".chars() {
            app.handle_key(key_event(KeyCode::Char(c)));
        }
        assert_eq!(app.input, InputMode::TeamId("1234".to_string()));

        let request = app.handle_key(key_event(KeyCode::Enter));
        assert_eq!(request, Some(FetchRequest::Squad { team_id: 1234 }));
        assert_eq!(app.view, View::Squad);
        assert_eq!(app.team_id, Some(1234));
    }

    #[test]
    fn test_empty_team_input_is_an_error() {
        let mut app = App::new();
        app.handle_key(key_event(KeyCode::Char('t')));
        assert!(app.handle_key(key_event(KeyCode::Enter)).is_none());
        assert!(matches!(app.status, Some(Status::Error { .. })));
    }

    #[test]
    fn test_generate_without_team_asks_for_one() {
        let mut app = App::new();
        assert!(app.handle_key(key_event(KeyCode::Char('g'))).is_none());
        assert_eq!(app.view, View::Suggestions);
        assert!(app.status_line().contains("press t"));
    }

    #[test]
    fn test_generate_with_team() {
        let mut app = App::new();
        app.team_id = Some(9);
        let request = app.handle_key(key_event(KeyCode::Char('g')));
        assert_eq!(request, Some(FetchRequest::Suggestions { team_id: 9 }));
        assert!(app.is_loading(FetchSlot::Suggestions));
    }

    #[test]
    fn test_refresh_bypasses_cache() {
        let mut app = App::new();
        let request = app.handle_key(key_event(KeyCode::Char('r')));
        assert!(matches!(
            request,
            Some(FetchRequest::Players {
                freshness: Freshness::Refresh,
                ..
            })
        ));
    }

    #[test]
    fn test_two_marks_request_comparison() {
        let mut app = app_with_players(&["A", "B"], false);
        assert!(app.handle_key(key_event(KeyCode::Char('c'))).is_none());
        assert!(app.is_marked(&summary(1, "A")));

        app.handle_key(key_event(KeyCode::Char('j')));
        let request = app.handle_key(key_event(KeyCode::Char('c')));
        match request {
            Some(FetchRequest::Compare { players, .. }) => {
                assert_eq!(players[0], PlayerKey { id: 1, fpl_id: 101 });
                assert_eq!(players[1], PlayerKey { id: 2, fpl_id: 102 });
            }
            other => panic!("Expected compare request, got {:?}", other),
        }
        assert!(app.compare_marks.is_empty());
    }

    #[test]
    fn test_mark_toggles_off() {
        let mut app = app_with_players(&["A", "B"], false);
        app.handle_key(key_event(KeyCode::Char('c')));
        app.handle_key(key_event(KeyCode::Char('c')));
        assert!(app.compare_marks.is_empty());
    }

    #[test]
    fn test_esc_clears_marks_before_quitting() {
        let mut app = app_with_players(&["A", "B"], false);
        app.handle_key(key_event(KeyCode::Char('c')));
        app.handle_key(key_event(KeyCode::Esc));
        assert!(app.compare_marks.is_empty());
        assert!(!app.should_quit);
        app.handle_key(key_event(KeyCode::Esc));
        assert!(app.should_quit);
    }

    #[test]
    fn test_compare_outcome_opens_modal_and_esc_closes_it() {
        let mut app = App::new();
        let data = CompareData {
            players: [detail(1, "A", "4.0"), detail(2, "B", "6.0")],
            comparison: None,
            history: [None, None],
        };
        app.apply(outcome(FetchSlot::Compare, Ok(FetchData::Compare(Box::new(data)))));
        assert!(app.show_compare);

        app.handle_key(key_event(KeyCode::Tab));
        assert_eq!(app.view, View::Players, "Modal swallows view keys");

        app.handle_key(key_event(KeyCode::Esc));
        assert!(!app.show_compare);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_enter_on_suggestion_compares_swap() {
        let mut app = App::new();
        app.view = View::Suggestions;
        app.apply(outcome(FetchSlot::Suggestions, Ok(FetchData::Suggestions(suggestions(9)))));

        app.handle_key(key_event(KeyCode::Down));
        assert_eq!(app.suggestion_index, 1);

        let request = app.handle_key(key_event(KeyCode::Enter));
        match request {
            Some(FetchRequest::Compare { players, .. }) => {
                assert_eq!(players[0].id, 3);
                assert_eq!(players[1].id, 4);
            }
            other => panic!("Expected compare request, got {:?}", other),
        }
    }

    #[test]
    fn test_failed_fetch_keeps_last_data() {
        let mut app = app_with_players(&["A", "B"], false);
        app.loading.insert(FetchSlot::Players);

        app.apply(outcome(FetchSlot::Players, Err(server_error())));

        assert_eq!(app.players.as_ref().unwrap().results.len(), 2);
        assert!(!app.is_loading(FetchSlot::Players));
        assert_eq!(app.status_line(), "[503] Server error 503: Service unavailable");
    }

    #[test]
    fn test_success_clears_error_and_stamps_refresh() {
        let mut app = App::new();
        app.apply(outcome(FetchSlot::Players, Err(server_error())));
        app.apply(outcome(FetchSlot::Players, Ok(FetchData::Players(page(&["A"], false)))));

        assert!(app.status.is_none());
        assert!(app.last_refresh.is_some());
        assert!(app.status_line().starts_with("Updated "));
    }

    #[test]
    fn test_selection_clamped_to_new_page() {
        let mut app = app_with_players(&["A", "B", "C"], false);
        app.selected_index = 2;
        app.apply(outcome(FetchSlot::Players, Ok(FetchData::Players(page(&["X"], false)))));
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_loaded_squad_is_remembered() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = PreferenceStore::with_dir(temp_dir.path().to_path_buf());
        let mut app = App::with_startup_config(StartupConfig::default(), Some(store.clone()));

        app.apply(outcome(
            FetchSlot::Squad,
            Ok(FetchData::Squad(SquadData {
                team: squad(7654321),
                analysis: None,
            })),
        ));

        assert_eq!(app.team_id, Some(7654321));
        assert_eq!(store.load().last_team_id, Some(7654321));

        let restored = App::with_startup_config(StartupConfig::default(), Some(store));
        assert_eq!(restored.team_id, Some(7654321));
    }

    #[test]
    fn test_favourite_toggle_persists() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = PreferenceStore::with_dir(temp_dir.path().to_path_buf());
        let mut app = App::with_startup_config(StartupConfig::default(), Some(store.clone()));
        app.apply(outcome(FetchSlot::Players, Ok(FetchData::Players(page(&["A"], false)))));

        app.handle_key(key_event(KeyCode::Char('f')));

        assert!(app.prefs.is_favourite(101));
        assert_eq!(store.load().favourite_players, vec![101]);
    }
}
