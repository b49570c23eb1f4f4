//! Burrow — a line-oriented file browser shell.
//!
//! This binary loads the configuration, sends logs to a file, opens a
//! browsing session on the local disk, and reads commands from stdin until
//! `quit` or end of input.

mod input;
mod render;
mod shell;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use burrow_core::config::settings::LoggingConfig;
use burrow_core::{Config, LocalFileSystem};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::shell::{Flow, Shell};

/// Returns the path to the config file (~/.config/burrow/config.toml).
fn config_path() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
        .join(".config")
        .join("burrow")
        .join("config.toml")
}

/// Logs go to a file so they don't interleave with the shell's output.
fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.file)
        .with_context(|| format!("failed to open log file {}", config.file.display()))?;
    let level = config
        .level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_file = config_path();
    let config = Config::load_or_default(&config_file)
        .with_context(|| format!("failed to load {}", config_file.display()))?;
    init_logging(&config.logging)?;

    let start_dir = match std::env::args().nth(1).map(PathBuf::from) {
        Some(dir) if dir.is_relative() => Some(std::env::current_dir()?.join(dir)),
        Some(dir) => Some(dir),
        None => config.general.start_dir.clone(),
    };
    tracing::info!("burrow starting (start dir: {start_dir:?})");

    let service = Arc::new(LocalFileSystem::new());
    let mut shell = Shell::start(
        service,
        start_dir,
        config.general.confirm_delete,
        std::io::stdout(),
    )
    .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        shell.prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if shell.handle_line(&line).await? == Flow::Quit {
            break;
        }
    }

    tracing::info!("burrow exiting");
    Ok(())
}
