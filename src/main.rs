//! fplhelp - Fantasy Premier League companion for the terminal
//!
//! A terminal UI over the fantasy football suggestions backend: browse and
//! search players, load a squad, compare two players and review transfer
//! suggestions.

use std::fs::OpenOptions;
use std::io;
use std::panic;
use std::path::Path;
use std::process;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::prelude::*;

use fplhelp::api::FplApi;
use fplhelp::app::App;
use fplhelp::cache::{PreferenceStore, ResponseCache};
use fplhelp::cli::{Cli, StartupConfig};
use fplhelp::config::Config;
use fplhelp::fetch::FetchDispatcher;
use fplhelp::gateway::ApiClient;
use fplhelp::limiter::RequestQueue;
use fplhelp::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Logs go to a file when one is configured; the terminal belongs to the UI
fn init_tracing(log_file: Option<&Path>) -> io::Result<()> {
    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "fplhelp=debug,warn".into()),
                )
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| "off".into()),
                )
                .with(tracing_subscriber::fmt::layer().with_writer(io::sink))
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let startup = match StartupConfig::from_cli(&cli) {
        Ok(startup) => startup,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };
    cli.apply_overrides(&mut config);

    init_tracing(config.log_file.as_deref())?;
    info!(base_url = %config.base_url, "starting fplhelp");

    let cache = Arc::new(Mutex::new(ResponseCache::new(config.cache_ttl)));
    let api = FplApi::new(
        ApiClient::from_config(&config),
        cache,
        RequestQueue::new(config.max_concurrent),
    );
    let mut dispatcher = FetchDispatcher::new(api);
    let mut app = App::with_startup_config(startup, PreferenceStore::new());

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    for request in app.initial_requests() {
        dispatcher.dispatch(request);
    }

    // Main event loop
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(request) = app.handle_key(key) {
                        dispatcher.dispatch(request);
                    }
                }
            }
        }

        while let Some(outcome) = dispatcher.try_recv() {
            app.apply(outcome);
        }

        if app.should_quit {
            break;
        }
    }

    dispatcher.cancel_all();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
