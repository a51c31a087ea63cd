//! # compass-quiz
//!
//! A terminal client for two backend-scored career assessments: an MBTI
//! personality quiz and a RIASEC interest inventory. Progress survives
//! restarts of the client, and once both results exist the dashboard asks
//! the recommender for matching career clusters.
//!
//! ```rust,no_run
//! use compass_quiz::{CompassError, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CompassError> {
//!     let config = Config::new("http://localhost:8000", ".compass", 30, "info")?;
//!     compass_quiz::run(config).await
//! }
//! ```

pub mod api;
mod app;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod presentation;
pub mod protocol;
pub mod session;
pub mod storage;
mod terminal;
#[cfg(test)]
mod testing;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::info;

pub use app::{App, View};

use api::{HttpAssessmentClient, HttpRecommendationClient, RecommendationBackend};
use config::{Config, ConfigError};
use models::QuizKind;
use session::QuizSession;
use storage::{FileStore, KeyValueStore, ResultCache, StoreError};
use terminal::TerminalGuard;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Error)]
pub enum CompassError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("state directory unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),
}

pub fn build_http_client(config: &Config) -> Result<Client, CompassError> {
    let client = Client::builder()
        .timeout(config.timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Everything the UI talks to, wired from a [`Config`].
pub struct Services {
    pub store: Arc<dyn KeyValueStore>,
    pub mbti: Arc<QuizSession>,
    pub riasec: Arc<QuizSession>,
    pub recommender: Arc<dyn RecommendationBackend>,
}

impl Services {
    pub fn connect(config: &Config) -> Result<Self, CompassError> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&config.state_dir)?);
        let http = build_http_client(config)?;
        let session = |kind| {
            let backend = HttpAssessmentClient::new(http.clone(), config.api_url.clone(), kind);
            Arc::new(QuizSession::restore(Arc::new(backend), Arc::clone(&store)))
        };

        Ok(Self {
            mbti: session(QuizKind::Mbti),
            riasec: session(QuizKind::Riasec),
            recommender: Arc::new(HttpRecommendationClient::new(
                http.clone(),
                config.api_url.clone(),
            )),
            store: Arc::clone(&store),
        })
    }

    pub fn cache(&self) -> ResultCache {
        ResultCache::new(Arc::clone(&self.store))
    }
}

/// Both cached results, as printed by the `results` command.
pub fn cached_results(cache: &ResultCache) -> serde_json::Value {
    json!({
        "mbti": cache.mbti(),
        "riasec": cache.riasec(),
    })
}

/// Clear persisted state for each of `kinds`, with the same cascade as a restart.
pub fn reset(store: &dyn KeyValueStore, kinds: &[QuizKind]) {
    for &kind in kinds {
        QuizSession::clear_persisted(store, kind);
        info!(%kind, "persisted state cleared");
    }
}

/// Run the interactive client until the user quits.
pub async fn run(config: Config) -> Result<(), CompassError> {
    let services = Services::connect(&config)?;
    info!(api = %config.api_url, state_dir = %config.state_dir.display(), "starting client");

    let mut app = App::new(
        Arc::clone(&services.mbti),
        Arc::clone(&services.riasec),
        services.cache(),
        Arc::clone(&services.recommender),
    );
    app.enter_dashboard();

    let mut terminal = TerminalGuard::enter()?;
    loop {
        app.tick();
        terminal.draw(|frame| ui::render(frame, &app))?;

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            break;
        }
        if app.handle_key(key.code) {
            break;
        }
    }

    info!("client exiting");
    Ok(())
}
