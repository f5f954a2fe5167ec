//! Player endpoints: list, detail, search, compare, leaderboards, history

use super::models::{
    CompareRequest, Listing, Page, PerformanceHistory, PlayerComparison, PlayerDetail,
    PlayerSearch, PlayerSummary, TopPerformers, DEFAULT_COMPARE_METRICS,
};
use super::{json_body, FplApi, Freshness, HISTORY_TTL, PLAYER_DETAIL_TTL, PLAYER_LIST_TTL};
use crate::gateway::{ApiError, ApiRequest};

/// Sort order of the player list, always descending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerOrdering {
    #[default]
    TotalPoints,
    Form,
    Price,
    PointsPerGame,
    Ownership,
}

impl PlayerOrdering {
    /// Value of the backend `ordering` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            PlayerOrdering::TotalPoints => "-total_points",
            PlayerOrdering::Form => "-form",
            PlayerOrdering::Price => "-current_price",
            PlayerOrdering::PointsPerGame => "-points_per_game",
            PlayerOrdering::Ownership => "-selected_by_percent",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlayerOrdering::TotalPoints => "Points",
            PlayerOrdering::Form => "Form",
            PlayerOrdering::Price => "Price",
            PlayerOrdering::PointsPerGame => "Pts/Game",
            PlayerOrdering::Ownership => "Selected",
        }
    }

    /// Next ordering in the cycle
    pub fn next(&self) -> Self {
        match self {
            PlayerOrdering::TotalPoints => PlayerOrdering::Form,
            PlayerOrdering::Form => PlayerOrdering::Price,
            PlayerOrdering::Price => PlayerOrdering::PointsPerGame,
            PlayerOrdering::PointsPerGame => PlayerOrdering::Ownership,
            PlayerOrdering::Ownership => PlayerOrdering::TotalPoints,
        }
    }
}

/// Metric a leaderboard is ranked by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaderMetric {
    #[default]
    TotalPoints,
    Form,
    PointsPerGame,
    /// Points per million
    Value,
    IctIndex,
    Selected,
}

impl LeaderMetric {
    /// Value of the backend `metric` query parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            LeaderMetric::TotalPoints => "total_points",
            LeaderMetric::Form => "form",
            LeaderMetric::PointsPerGame => "points_per_game",
            LeaderMetric::Value => "value",
            LeaderMetric::IctIndex => "ict_index",
            LeaderMetric::Selected => "selected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LeaderMetric::TotalPoints => "Points",
            LeaderMetric::Form => "Form",
            LeaderMetric::PointsPerGame => "Pts/Game",
            LeaderMetric::Value => "Value",
            LeaderMetric::IctIndex => "ICT",
            LeaderMetric::Selected => "Selected",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            LeaderMetric::TotalPoints => LeaderMetric::Form,
            LeaderMetric::Form => LeaderMetric::PointsPerGame,
            LeaderMetric::PointsPerGame => LeaderMetric::Value,
            LeaderMetric::Value => LeaderMetric::IctIndex,
            LeaderMetric::IctIndex => LeaderMetric::Selected,
            LeaderMetric::Selected => LeaderMetric::TotalPoints,
        }
    }
}

/// Filters for the paginated player list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerQuery {
    /// 1-based page number
    pub page: u32,
    /// Position id: 1 GK, 2 DEF, 3 MID, 4 FWD
    pub position: Option<u8>,
    /// Free-text search over names and club
    pub search: Option<String>,
    pub ordering: PlayerOrdering,
}

impl PlayerQuery {
    fn to_request(&self) -> ApiRequest {
        ApiRequest::get("players")
            .with_query("page", self.page.max(1))
            .with_query("ordering", self.ordering.as_param())
            .with_optional_query("position", self.position)
    }

    /// Search body when the query carries search text
    fn to_search(&self) -> Option<PlayerSearch> {
        let text = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some(PlayerSearch {
            query: Some(text.to_string()),
            position: self.position,
            sort_by: Some(self.ordering.as_param().to_string()),
            ..Default::default()
        })
    }
}

impl FplApi {
    /// One page of the player list
    ///
    /// Text searches go through the multi-criteria search endpoint and are
    /// therefore never cached.
    pub async fn players(
        &self,
        query: &PlayerQuery,
        freshness: Freshness,
    ) -> Result<Page<PlayerSummary>, ApiError> {
        if let Some(search) = query.to_search() {
            return self.search_players(&search, query.page).await;
        }
        let listing: Listing<PlayerSummary> = self
            .cached_get(query.to_request(), PLAYER_LIST_TTL, freshness)
            .await?;
        Ok(listing.into())
    }

    /// Full record of one player by FPL id
    pub async fn player(&self, fpl_id: u32, freshness: Freshness) -> Result<PlayerDetail, ApiError> {
        let request = ApiRequest::get(format!("players/{}", fpl_id));
        self.cached_get(request, PLAYER_DETAIL_TTL, freshness).await
    }

    /// Multi-criteria search, one page at a time
    pub async fn search_players(
        &self,
        search: &PlayerSearch,
        page: u32,
    ) -> Result<Page<PlayerSummary>, ApiError> {
        let request = ApiRequest::post("players/search", json_body(search)?)
            .with_query("page", page.max(1));
        let listing: Listing<PlayerSummary> = self.post(request).await?;
        Ok(listing.into())
    }

    /// Side-by-side metrics for two or more players
    ///
    /// An empty metric list asks for the default set.
    pub async fn compare_players(
        &self,
        player_ids: &[u32],
        metrics: &[&str],
    ) -> Result<PlayerComparison, ApiError> {
        let metrics: &[&str] = if metrics.is_empty() {
            &DEFAULT_COMPARE_METRICS
        } else {
            metrics
        };
        let body = CompareRequest {
            player_ids: player_ids.to_vec(),
            metrics: metrics.iter().map(|m| m.to_string()).collect(),
        };
        self.post_json("players/compare", &body).await
    }

    /// Leaderboard of available regulars, at most 50 entries
    pub async fn top_performers(
        &self,
        metric: LeaderMetric,
        position: Option<u8>,
        limit: u32,
        freshness: Freshness,
    ) -> Result<TopPerformers, ApiError> {
        let request = ApiRequest::get("players/top_performers")
            .with_query("metric", metric.as_param())
            .with_query("limit", limit.min(50))
            .with_optional_query("position", position);
        self.cached_get(request, PLAYER_LIST_TTL, freshness).await
    }

    /// Gameweek history, optionally limited to the latest `gameweeks`
    pub async fn performance_history(
        &self,
        fpl_id: u32,
        gameweeks: Option<u32>,
        freshness: Freshness,
    ) -> Result<PerformanceHistory, ApiError> {
        let request = ApiRequest::get(format!("players/{}/performance_history", fpl_id))
            .with_optional_query("gameweeks", gameweeks);
        self.cached_get(request, HISTORY_TTL, freshness).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::api_for;
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn player_json(fpl_id: u32, name: &str) -> serde_json::Value {
        json!({
            "id": fpl_id, "fpl_id": fpl_id, "web_name": name,
            "team_name": "Arsenal", "team_short_name": "ARS",
            "position_name": "Midfielder", "position_short": "MID",
            "current_price": "8.5", "total_points": 120, "form": "5.0",
            "points_per_game": "5.2", "selected_by_percent": "22.1",
            "value_score": 14.1, "is_available": true, "injury_status": null,
            "status": "a", "minutes": 1800
        })
    }

    #[test]
    fn test_ordering_cycles_back_to_points() {
        let mut ordering = PlayerOrdering::default();
        for _ in 0..5 {
            ordering = ordering.next();
        }
        assert_eq!(ordering, PlayerOrdering::TotalPoints);
        assert_eq!(PlayerOrdering::Price.as_param(), "-current_price");
    }

    #[test]
    fn test_query_skips_blank_search() {
        let query = PlayerQuery {
            page: 0,
            search: Some("  ".to_string()),
            ..Default::default()
        };
        let request = query.to_request();
        assert_eq!(request.query.get("page").map(String::as_str), Some("1"));
        assert!(!request.query.contains_key("position"));
        assert!(query.to_search().is_none());
    }

    #[test]
    fn test_search_body_carries_filters() {
        let query = PlayerQuery {
            page: 2,
            position: Some(4),
            search: Some(" haaland ".to_string()),
            ordering: PlayerOrdering::Form,
        };
        let search = query.to_search().unwrap();
        assert_eq!(search.query.as_deref(), Some("haaland"));
        assert_eq!(search.position, Some(4));
        assert_eq!(search.sort_by.as_deref(), Some("-form"));
    }

    #[test]
    fn test_leader_metric_cycles() {
        let mut metric = LeaderMetric::default();
        for _ in 0..6 {
            metric = metric.next();
        }
        assert_eq!(metric, LeaderMetric::TotalPoints);
        assert_eq!(LeaderMetric::Selected.as_param(), "selected");
    }

    #[tokio::test]
    async fn test_players_sends_filters_as_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/players")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page".into(), "2".into()),
                Matcher::UrlEncoded("position".into(), "3".into()),
                Matcher::UrlEncoded("ordering".into(), "-form".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "count": 21, "next": null, "previous": "http://x/?page=1",
                    "results": [player_json(7, "Saka")]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let api = api_for(&server.url());
        let query = PlayerQuery {
            page: 2,
            position: Some(3),
            search: None,
            ordering: PlayerOrdering::Form,
        };
        let page = api.players(&query, Freshness::Cached).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.results[0].web_name, "Saka");
        assert!(page.has_previous());
    }

    #[tokio::test]
    async fn test_player_detail_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mut detail = player_json(7, "Saka");
        detail["team"] = json!({"id": 1, "fpl_id": 1, "name": "Arsenal", "short_name": "ARS",
            "strength_attack_home": 1300, "strength_attack_away": 1340});
        detail["position"] = json!({"id": 3, "singular_name": "Midfielder", "singular_name_short": "MID"});
        let mock = server
            .mock("GET", "/api/v2/players/7")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(detail.to_string())
            .expect(1)
            .create_async()
            .await;

        let api = api_for(&server.url());
        let first = api.player(7, Freshness::Cached).await.unwrap();
        let second = api.player(7, Freshness::Cached).await.unwrap();

        mock.assert_async().await;
        assert_eq!(first, second);
        assert_eq!(first.team.attack_strength(), 1320.0);
    }

    #[tokio::test]
    async fn test_compare_posts_ids_and_default_metrics() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/players/compare")
            .match_body(Matcher::PartialJson(json!({"player_ids": [7, 9]})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "players": [
                        {"id": 7, "name": "Saka", "team": "ARS", "position": "MID", "stats": {"form": 5.0}},
                        {"id": 9, "name": "Palmer", "team": "CHE", "position": "MID", "stats": {"form": 7.5}}
                    ],
                    "metrics": ["form"],
                    "summary": {"form": {"min": 5.0, "max": 7.5, "avg": 6.25, "best_player": "Palmer"}}
                })
                .to_string(),
            )
            .expect(2)
            .create_async()
            .await;

        let api = api_for(&server.url());
        let comparison = api.compare_players(&[7, 9], &[]).await.unwrap();
        // POST responses are never cached
        api.compare_players(&[7, 9], &[]).await.unwrap();

        mock.assert_async().await;
        assert_eq!(comparison.summary["form"].best_player, "Palmer");
        assert_eq!(comparison.players[1].stat("form"), Some(7.5));
    }

    #[tokio::test]
    async fn test_text_search_posts_to_search_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/players/search")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .match_body(Matcher::Json(
                json!({"query": "saka", "position": 3, "sort_by": "-total_points"}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"count": 1, "next": null, "previous": null,
                       "results": [player_json(7, "Saka")]})
                .to_string(),
            )
            .expect(2)
            .create_async()
            .await;

        let api = api_for(&server.url());
        let query = PlayerQuery {
            page: 1,
            position: Some(3),
            search: Some("saka".to_string()),
            ..Default::default()
        };
        let page = api.players(&query, Freshness::Cached).await.unwrap();
        // Searches are POSTs and never come from the cache
        api.players(&query, Freshness::Cached).await.unwrap();

        mock.assert_async().await;
        assert_eq!(page.results[0].web_name, "Saka");
        assert!(api.lock_cache().is_empty());
    }

    #[tokio::test]
    async fn test_search_accepts_bare_array() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v2/players/search")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .match_body(Matcher::Json(json!({"query": "saka"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!([player_json(7, "Saka")]).to_string())
            .create_async()
            .await;

        let api = api_for(&server.url());
        let search = PlayerSearch {
            query: Some("saka".to_string()),
            ..Default::default()
        };
        let page = api.search_players(&search, 1).await.unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.count, Some(1));
    }

    #[tokio::test]
    async fn test_top_performers_caps_limit() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/players/top_performers")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("metric".into(), "form".into()),
                Matcher::UrlEncoded("limit".into(), "50".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"metric": "form", "position_filter": null, "count": 1,
                       "players": [player_json(7, "Saka")]})
                .to_string(),
            )
            .create_async()
            .await;

        let api = api_for(&server.url());
        let top = api
            .top_performers(LeaderMetric::Form, None, 500, Freshness::Cached)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(top.players[0].fpl_id, 7);
    }

    #[tokio::test]
    async fn test_performance_history_decodes_analysis() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/players/7/performance_history")
            .match_query(Matcher::UrlEncoded("gameweeks".into(), "5".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "performances": [
                        {"gameweek": 12, "points": 9, "minutes": 90},
                        {"gameweek": 11, "points": 2, "minutes": 75}
                    ],
                    "analysis": {"games_played": 2, "average_points": 5.5,
                                 "best_performance": 9, "worst_performance": 2,
                                 "trend": "insufficient_data"}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let api = api_for(&server.url());
        let history = api
            .performance_history(7, Some(5), Freshness::Cached)
            .await
            .unwrap();

        assert_eq!(history.performances.len(), 2);
        assert_eq!(history.analysis.best_performance, 9);
    }
}
