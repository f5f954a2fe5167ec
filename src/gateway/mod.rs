//! HTTP gateway to the backend REST API
//!
//! Wraps outgoing calls with a hard per-attempt timeout, retry with linear
//! backoff for transient failures, and an ordered chain of pure request and
//! response interceptors. Responses are decoded by content type and, through
//! [`ApiClient::fetch`], into typed schemas.

mod client;
mod error;
mod interceptor;
mod request;

pub use client::{decode, ApiClient, ApiClientBuilder, RetryPolicy};
pub use error::{ApiError, TIMEOUT_STATUS};
pub use interceptor::{
    bearer_token, default_headers, InterceptorChain, RequestInterceptor, ResponseInterceptor,
};
pub use request::{ApiRequest, ApiResponse, Method, Payload};
