//! fplhelp library
//!
//! Everything the binary uses, exposed for integration tests: the HTTP
//! gateway, the response cache, the request limiter, typed endpoints, and
//! the TUI state and rendering.

pub mod analysis;
pub mod api;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod fetch;
pub mod gateway;
pub mod limiter;
pub mod ui;
