//! Typed endpoints of the fantasy football backend
//!
//! [`FplApi`] puts the response cache and the concurrency limiter in front of
//! the gateway client. Reads go through the cache with a per-endpoint TTL;
//! writes (POST) always reach the server. Every call that reaches the network
//! is submitted to the limiter.

pub mod models;
mod players;
mod suggestions;
mod teams;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::cache::ResponseCache;
use crate::gateway::{decode, ApiClient, ApiError, ApiRequest, ApiResponse, Payload};
use crate::limiter::RequestQueue;

pub use players::{LeaderMetric, PlayerOrdering, PlayerQuery};

/// Reference data that barely changes during a season
pub const TEAMS_TTL: Duration = Duration::from_secs(3600);
/// Single player records
pub const PLAYER_DETAIL_TTL: Duration = Duration::from_secs(1800);
/// Player lists and leaderboards
pub const PLAYER_LIST_TTL: Duration = Duration::from_secs(900);
/// Gameweek history of one player
pub const HISTORY_TTL: Duration = Duration::from_secs(1800);
/// Analysis of a user's squad
pub const ANALYSIS_TTL: Duration = Duration::from_secs(600);

/// Whether a read may be answered from the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Freshness {
    /// Use a cached value when one is still valid
    #[default]
    Cached,
    /// Skip the cache lookup; the fresh value replaces the cached one
    Refresh,
}

/// Shared response cache handle
pub type SharedCache = Arc<Mutex<ResponseCache>>;

/// Backend API with caching and request limiting
///
/// Cheap to clone; clones share the client, cache and queue.
#[derive(Debug, Clone)]
pub struct FplApi {
    client: ApiClient,
    cache: SharedCache,
    queue: RequestQueue,
}

impl FplApi {
    pub fn new(client: ApiClient, cache: SharedCache, queue: RequestQueue) -> Self {
        Self {
            client,
            cache,
            queue,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    /// GET through the cache
    ///
    /// Only a response that decodes into `T` is stored, so a malformed
    /// payload is never served from the cache later.
    async fn cached_get<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        ttl: Duration,
        freshness: Freshness,
    ) -> Result<T, ApiError> {
        let key = request.cache_key();
        let path = request.path.clone();

        if freshness == Freshness::Cached {
            let hit = self.lock_cache().get(&key);
            if let Some(value) = hit {
                debug!(%key, "cache hit");
                return decode(&path, Payload::Json(value));
            }
        }

        let response = self.send(request).await?;
        let value = match response.body {
            Payload::Json(value) => value,
            other => return decode(&path, other),
        };
        let typed = decode(&path, Payload::Json(value.clone()))?;
        self.lock_cache().set(key, value, ttl);
        Ok(typed)
    }

    /// POST a JSON body and decode the answer; never cached
    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.post(ApiRequest::post(path, json_body(body)?)).await
    }

    /// Sends a prepared write request and decodes the answer; never cached
    async fn post<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path.clone();
        let response = self.send(request).await?;
        decode(&path, response.body)
    }

    /// Dispatches a request through the limiter
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let client = self.client.clone();
        self.queue
            .submit(move || async move { client.execute(request).await })
            .await
    }

    fn lock_cache(&self) -> MutexGuard<'_, ResponseCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn json_body<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body)
        .map_err(|e| ApiError::InvalidRequest(format!("Unserializable body: {}", e)))
}
