//! Binary entry point: resolve where the database lives, route logs to a file
//! beside it (the terminal belongs to the TUI), wire the repository to the
//! process-wide store, and drive the Ratatui loop until the user exits.
use std::fs::{self, OpenOptions};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use wordbook::{
    run_app, seed_sample_words, App, SeedHook, StoreConfig, StoreManager, WordRepository,
    WritePool, DEFAULT_WORKERS,
};

/// Log file written next to the database.
const LOG_FILE_NAME: &str = "wordbook.log";

fn main() -> Result<()> {
    let config = StoreConfig::from_env()?;
    init_tracing(&config)?;

    let pool = Arc::new(WritePool::new(DEFAULT_WORKERS).context("failed to start write pool")?);
    let seed: Arc<SeedHook> = Arc::new(seed_sample_words);
    let repository = WordRepository::with_parts(StoreManager::global(), pool, config, Some(seed));

    let mut app = App::new(repository);
    run_app(&mut app)
}

fn init_tracing(config: &StoreConfig) -> Result<()> {
    let log_path = config.path().with_file_name(LOG_FILE_NAME);
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("wordbook=info,warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .with_target(true)
        .init();
    Ok(())
}
