//! Ordered request/response transforms applied by the gateway
//!
//! Interceptors are pure functions over owned values. The chain folds a
//! request through every request interceptor in registration order before
//! dispatch, and folds each received response through the response
//! interceptors the same way.

use std::fmt;
use std::sync::Arc;

use super::request::{ApiRequest, ApiResponse};

/// Transform applied to a request before it is sent
pub type RequestInterceptor = Arc<dyn Fn(ApiRequest) -> ApiRequest + Send + Sync>;

/// Transform applied to a response after it is received
pub type ResponseInterceptor = Arc<dyn Fn(ApiResponse) -> ApiResponse + Send + Sync>;

/// Immutable, ordered interceptor lists
#[derive(Clone, Default)]
pub struct InterceptorChain {
    request: Vec<RequestInterceptor>,
    response: Vec<ResponseInterceptor>,
}

impl fmt::Debug for InterceptorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorChain")
            .field("request", &self.request.len())
            .field("response", &self.response.len())
            .finish()
    }
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_request(&mut self, interceptor: RequestInterceptor) {
        self.request.push(interceptor);
    }

    pub fn push_response(&mut self, interceptor: ResponseInterceptor) {
        self.response.push(interceptor);
    }

    pub fn apply_request(&self, request: ApiRequest) -> ApiRequest {
        self.request
            .iter()
            .fold(request, |request, interceptor| interceptor(request))
    }

    pub fn apply_response(&self, response: ApiResponse) -> ApiResponse {
        self.response
            .iter()
            .fold(response, |response, interceptor| interceptor(response))
    }
}

/// Sets `Accept` and `User-Agent` unless the request already carries them
pub fn default_headers(user_agent: &str) -> RequestInterceptor {
    let user_agent = user_agent.to_string();
    Arc::new(move |mut request: ApiRequest| {
        request
            .headers
            .entry("accept".to_string())
            .or_insert_with(|| "application/json".to_string());
        request
            .headers
            .entry("user-agent".to_string())
            .or_insert_with(|| user_agent.clone());
        request
    })
}

/// Adds a bearer token for the backend's JWT authentication
pub fn bearer_token(token: &str) -> RequestInterceptor {
    let value = format!("Bearer {}", token);
    Arc::new(move |request: ApiRequest| request.with_header("authorization", value.clone()))
}
