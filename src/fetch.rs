//! Background fetch dispatch
//!
//! Data needed by a view is fetched on the tokio runtime so the event loop
//! keeps drawing. Results come back over an mpsc channel that the event loop
//! drains with [`FetchDispatcher::try_recv`].
//!
//! Every fetch gets a generation number. Starting a new fetch for a view
//! aborts the one still running for that view, and any outcome that is not
//! from the latest generation of its view is dropped on receipt.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::api::models::{
    GenerateSuggestions, GeneratedSuggestions, Page, PerformanceHistory, PlayerComparison,
    PlayerDetail, PlayerSummary, Team, TeamAnalysis, TopPerformers, UserTeam,
};
use crate::api::{Freshness, FplApi, LeaderMetric, PlayerQuery};
use crate::gateway::ApiError;

/// Capacity of the outcome channel
const CHANNEL_CAPACITY: usize = 32;

/// Entries shown on the leaderboard
pub const LEADERBOARD_SIZE: u32 = 20;

/// Gameweeks of history loaded for a comparison
pub const HISTORY_GAMEWEEKS: u32 = 10;

/// The two ids a player is known by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerKey {
    /// Backend database id (used by `players/compare`)
    pub id: u32,
    /// FPL id (used in player URLs)
    pub fpl_id: u32,
}

impl From<&PlayerSummary> for PlayerKey {
    fn from(player: &PlayerSummary) -> Self {
        Self {
            id: player.id,
            fpl_id: player.fpl_id,
        }
    }
}

/// View a fetch belongs to; one fetch per slot is live at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchSlot {
    Players,
    Squad,
    Suggestions,
    Compare,
    Leaders,
}

/// Data a user action asks for
#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    /// A page of the player list
    Players {
        query: PlayerQuery,
        freshness: Freshness,
    },
    /// Load (or re-sync) a squad, then its analysis
    Squad { team_id: u32 },
    /// Generate transfer suggestions for a loaded squad
    Suggestions { team_id: u32 },
    /// Details of two players side by side
    Compare {
        players: [PlayerKey; 2],
        freshness: Freshness,
    },
    /// Leaderboard plus the club table
    Leaders {
        metric: LeaderMetric,
        position: Option<u8>,
        freshness: Freshness,
    },
}

impl FetchRequest {
    pub fn slot(&self) -> FetchSlot {
        match self {
            FetchRequest::Players { .. } => FetchSlot::Players,
            FetchRequest::Squad { .. } => FetchSlot::Squad,
            FetchRequest::Suggestions { .. } => FetchSlot::Suggestions,
            FetchRequest::Compare { .. } => FetchSlot::Compare,
            FetchRequest::Leaders { .. } => FetchSlot::Leaders,
        }
    }
}

/// A squad with its server-side analysis
#[derive(Debug, Clone, PartialEq)]
pub struct SquadData {
    pub team: UserTeam,
    /// Missing when the analysis call failed; the squad is still shown
    pub analysis: Option<TeamAnalysis>,
}

/// Both players of a comparison
#[derive(Debug, Clone, PartialEq)]
pub struct CompareData {
    pub players: [PlayerDetail; 2],
    /// Server-side metric summary; the backend refuses players of different positions
    pub comparison: Option<PlayerComparison>,
    /// Recent gameweek history per player, when it could be loaded
    pub history: [Option<PerformanceHistory>; 2],
}

impl CompareData {
    /// Gameweek points of one player, oldest first
    ///
    /// Prefers the loaded history and falls back to the short score list
    /// embedded in the player record.
    pub fn recent_scores(&self, index: usize) -> Vec<i32> {
        let from_history = self.history[index]
            .as_ref()
            .map(|history| {
                history
                    .performances
                    .iter()
                    .rev()
                    .map(|gameweek| gameweek.points)
                    .collect::<Vec<_>>()
            })
            .filter(|scores| !scores.is_empty());
        from_history.unwrap_or_else(|| {
            let mut scores = self.players[index].recent_performance.scores.clone();
            scores.reverse();
            scores
        })
    }
}

/// Leaderboard with the club table
#[derive(Debug, Clone, PartialEq)]
pub struct LeadersData {
    pub top: TopPerformers,
    /// Missing when the club list failed; the leaderboard is still shown
    pub teams: Option<Vec<Team>>,
}

/// Successful fetch results
#[derive(Debug, Clone, PartialEq)]
pub enum FetchData {
    Players(Page<PlayerSummary>),
    Squad(SquadData),
    Suggestions(GeneratedSuggestions),
    Compare(Box<CompareData>),
    Leaders(LeadersData),
}

/// Message sent from a fetch task back to the event loop
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub generation: u64,
    pub slot: FetchSlot,
    pub result: Result<FetchData, ApiError>,
}

/// Spawns fetches and collects their outcomes
pub struct FetchDispatcher {
    api: FplApi,
    sender: mpsc::Sender<FetchOutcome>,
    receiver: mpsc::Receiver<FetchOutcome>,
    next_generation: u64,
    /// Latest fetch per slot; finished entries are removed on receipt
    in_flight: HashMap<FetchSlot, (u64, JoinHandle<()>)>,
    /// Latest generation per slot, kept after completion
    latest: HashMap<FetchSlot, u64>,
}

impl FetchDispatcher {
    pub fn new(api: FplApi) -> Self {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            api,
            sender,
            receiver,
            next_generation: 1,
            in_flight: HashMap::new(),
            latest: HashMap::new(),
        }
    }

    /// Starts a fetch, superseding any running fetch for the same view
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    /// The generation number assigned to this fetch
    pub fn dispatch(&mut self, request: FetchRequest) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        let slot = request.slot();

        if let Some((old, handle)) = self.in_flight.remove(&slot) {
            debug!(?slot, generation = old, "aborting superseded fetch");
            handle.abort();
        }
        self.latest.insert(slot, generation);

        let api = self.api.clone();
        let tx = self.sender.clone();
        let handle = tokio::spawn(async move {
            let result = run(&api, request).await;
            let _ = tx
                .send(FetchOutcome {
                    generation,
                    slot,
                    result,
                })
                .await;
        });
        self.in_flight.insert(slot, (generation, handle));
        generation
    }

    /// Returns the next current outcome without blocking
    ///
    /// Outcomes superseded by a later fetch for the same view are discarded.
    pub fn try_recv(&mut self) -> Option<FetchOutcome> {
        while let Ok(outcome) = self.receiver.try_recv() {
            if self.is_current(&outcome) {
                self.in_flight.remove(&outcome.slot);
                return Some(outcome);
            }
            debug!(
                slot = ?outcome.slot,
                generation = outcome.generation,
                "discarding stale fetch outcome"
            );
        }
        None
    }

    /// Waits for the next current outcome
    pub async fn recv(&mut self) -> Option<FetchOutcome> {
        while let Some(outcome) = self.receiver.recv().await {
            if self.is_current(&outcome) {
                self.in_flight.remove(&outcome.slot);
                return Some(outcome);
            }
        }
        None
    }

    pub fn is_current(&self, outcome: &FetchOutcome) -> bool {
        self.latest.get(&outcome.slot) == Some(&outcome.generation)
    }

    /// True while a fetch for the slot has not reported back
    pub fn is_pending(&self, slot: FetchSlot) -> bool {
        self.in_flight.contains_key(&slot)
    }

    /// Aborts every running fetch
    pub fn cancel_all(&mut self) {
        for (slot, (generation, handle)) in self.in_flight.drain() {
            debug!(?slot, generation, "cancelling fetch");
            handle.abort();
        }
    }
}

impl Drop for FetchDispatcher {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

async fn run(api: &FplApi, request: FetchRequest) -> Result<FetchData, ApiError> {
    match request {
        FetchRequest::Players { query, freshness } => {
            api.players(&query, freshness).await.map(FetchData::Players)
        }
        FetchRequest::Squad { team_id } => {
            let loaded = api.load_team(team_id).await?;
            // The squad is synced by now; analysis reflects it
            let analysis = match api.team_analysis(team_id, Freshness::Refresh).await {
                Ok(analysis) => Some(analysis),
                Err(err) => {
                    warn!(team_id, error = %err, "team analysis unavailable");
                    None
                }
            };
            Ok(FetchData::Squad(SquadData {
                team: loaded.team,
                analysis,
            }))
        }
        FetchRequest::Suggestions { team_id } => api
            .generate_suggestions(&GenerateSuggestions::for_team(team_id))
            .await
            .map(FetchData::Suggestions),
        FetchRequest::Compare { players, freshness } => {
            let [a, b] = players;
            let ids = [a.id, b.id];
            let (first, second, comparison, first_history, second_history) = futures::join!(
                api.player(a.fpl_id, freshness),
                api.player(b.fpl_id, freshness),
                api.compare_players(&ids, &[]),
                api.performance_history(a.fpl_id, Some(HISTORY_GAMEWEEKS), freshness),
                api.performance_history(b.fpl_id, Some(HISTORY_GAMEWEEKS), freshness),
            );
            let comparison = match comparison {
                Ok(comparison) => Some(comparison),
                Err(err) => {
                    debug!(error = %err, "server comparison unavailable");
                    None
                }
            };
            let history = [first_history, second_history].map(|history| match history {
                Ok(history) => Some(history),
                Err(err) => {
                    debug!(error = %err, "performance history unavailable");
                    None
                }
            });
            Ok(FetchData::Compare(Box::new(CompareData {
                players: [first?, second?],
                comparison,
                history,
            })))
        }
        FetchRequest::Leaders {
            metric,
            position,
            freshness,
        } => {
            let (top, teams) = futures::join!(
                api.top_performers(metric, position, LEADERBOARD_SIZE, freshness),
                api.teams(freshness),
            );
            let teams = match teams {
                Ok(teams) => Some(teams),
                Err(err) => {
                    warn!(error = %err, "club list unavailable");
                    None
                }
            };
            Ok(FetchData::Leaders(LeadersData { top: top?, teams }))
        }
    }
}
