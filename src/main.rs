use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use compass_quiz::config::{Config, DEFAULT_API_URL, DEFAULT_STATE_DIR, DEFAULT_TIMEOUT_SECS};
use compass_quiz::models::QuizKind;
use compass_quiz::storage::FileStore;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(version, about = "Terminal client for the MBTI and RIASEC career assessments")]
struct Args {
    /// Base URL of the assessment backend
    #[arg(long, env = "COMPASS_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Directory holding saved progress, results, and the log file
    #[arg(long, env = "COMPASS_STATE_DIR", default_value = DEFAULT_STATE_DIR)]
    state_dir: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, env = "COMPASS_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Log level used when RUST_LOG is unset
    #[arg(long, env = "COMPASS_LOG", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the cached assessment results as JSON
    Results,
    /// Forget saved progress and results
    Reset {
        #[arg(value_enum)]
        target: ResetTarget,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ResetTarget {
    Mbti,
    Riasec,
    All,
}

impl ResetTarget {
    fn kinds(self) -> &'static [QuizKind] {
        match self {
            ResetTarget::Mbti => &[QuizKind::Mbti],
            ResetTarget::Riasec => &[QuizKind::Riasec],
            ResetTarget::All => &QuizKind::ALL,
        }
    }
}

/// The TUI owns the terminal, so logs go to a file in the state directory.
fn init_logging(config: &Config) -> Result<()> {
    fs::create_dir_all(&config.state_dir).with_context(|| {
        format!("failed to create state directory {}", config.state_dir.display())
    })?;
    let log_path = config.log_path();
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("compass_quiz={}", config.log_level))
        }))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::new(&args.api_url, &args.state_dir, args.timeout_secs, &args.log_level)
        .context("invalid configuration")?;
    init_logging(&config)?;

    match args.command {
        None => compass_quiz::run(config).await.context("client failed")?,
        Some(Command::Results) => {
            let store = Arc::new(FileStore::open(&config.state_dir)?);
            let cache = compass_quiz::storage::ResultCache::new(store);
            let results = compass_quiz::cached_results(&cache);
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Some(Command::Reset { target }) => {
            let store = FileStore::open(&config.state_dir)?;
            compass_quiz::reset(&store, target.kinds());
            println!("Cleared saved state in {}", store.dir().display());
        }
    }

    Ok(())
}
