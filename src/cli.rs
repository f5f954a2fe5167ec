//! Command-line interface parsing for fplhelp
//!
//! Flags override the environment configuration and choose what the app
//! shows on startup.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::app::View;
use crate::config::Config;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified view name is not recognized
    #[error("Invalid view: '{0}'. Valid views: players, squad, suggestions, leaders")]
    InvalidView(String),
}

/// fplhelp - Fantasy Premier League companion for the terminal
#[derive(Parser, Debug)]
#[command(name = "fplhelp")]
#[command(about = "Player stats, squad analysis and transfer suggestions")]
#[command(version)]
pub struct Cli {
    /// FPL team id to load on startup (defaults to the last loaded team)
    #[arg(long, value_name = "ID")]
    pub team: Option<u32>,

    /// View to open first
    ///
    /// Valid views: players, squad, suggestions, leaders
    #[arg(long, value_name = "VIEW")]
    pub view: Option<String>,

    /// Backend base URL (overrides FPLHELP_BASE_URL)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Per-attempt request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Total attempts for transient failures
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Maximum simultaneous requests
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// Team to load before the first render
    pub team_id: Option<u32>,
    /// View shown first; `None` means the players view
    pub initial_view: Option<View>,
}

/// Parses a view name argument
pub fn parse_view_arg(s: &str) -> Result<View, CliError> {
    View::from_str(s).ok_or_else(|| CliError::InvalidView(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if an invalid view was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let initial_view = cli.view.as_deref().map(parse_view_arg).transpose()?;
        Ok(StartupConfig {
            team_id: cli.team,
            initial_view,
        })
    }
}

impl Cli {
    /// Applies flag values on top of the environment configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = self.retries {
            config.retry_attempts = retries;
        }
        if let Some(limit) = self.concurrency {
            config.max_concurrent = limit;
        }
    }
}
