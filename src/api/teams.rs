//! Club list and user team endpoints

use serde::Serialize;

use super::models::{Listing, LoadTeamResponse, Page, Team, TeamAnalysis};
use super::{FplApi, Freshness, ANALYSIS_TTL, TEAMS_TTL};
use crate::gateway::{ApiError, ApiRequest};

#[derive(Serialize)]
struct LoadTeam {
    team_id: u32,
}

impl FplApi {
    /// All Premier League clubs
    pub async fn teams(&self, freshness: Freshness) -> Result<Vec<Team>, ApiError> {
        let listing: Listing<Team> = self
            .cached_get(ApiRequest::get("teams"), TEAMS_TTL, freshness)
            .await?;
        Ok(Page::from(listing).results)
    }

    /// Loads a user's squad, syncing it from FPL on the server when stale
    pub async fn load_team(&self, team_id: u32) -> Result<LoadTeamResponse, ApiError> {
        self.post_json("user-teams/load_team", &LoadTeam { team_id })
            .await
    }

    /// Squad analysis and quick recommendations for a loaded team
    pub async fn team_analysis(
        &self,
        team_id: u32,
        freshness: Freshness,
    ) -> Result<TeamAnalysis, ApiError> {
        let request = ApiRequest::get(format!("user-teams/{}/analysis", team_id));
        self.cached_get(request, ANALYSIS_TTL, freshness).await
    }
}
