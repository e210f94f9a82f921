// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! urs: operator surface over the form-automation engine.
//!
//! Read-only views of the discovery catalogue and the task queue
//! (including the `needs_human` escalation list), plus offline path
//! tracing. All logic lives in the library crates.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use urs_core::{short, AnswerMap, SystemClock, TaskStatus};
use urs_discovery::FingerprintStore;
use urs_engine::{DispatchQueue, EngineConfig};
use urs_navigator::{page_name, NavigationGraph};

#[derive(Parser)]
#[command(name = "urs", about = "URS form-automation operations", version)]
struct Cli {
    /// Engine config file (defaults used when absent)
    #[arg(long, global = true, default_value = "urs.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Discovery catalogue views
    Discovery {
        #[command(subcommand)]
        command: DiscoveryCommand,
    },
    /// Task queue views
    Queue {
        #[command(subcommand)]
        command: QueueCommand,
    },
    /// Simulate the page path for an answers JSON file, offline
    Trace {
        answers: PathBuf,
    },
}

#[derive(Subcommand)]
enum DiscoveryCommand {
    /// Markdown report of every discovered page
    Report,
    /// Catalogue size
    Stats,
}

#[derive(Subcommand)]
enum QueueCommand {
    /// List tasks, optionally filtered by status
    /// (needs_human is the escalation view)
    List {
        #[arg(long)]
        status: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = if cli.config.exists() {
        EngineConfig::load(&cli.config)
            .with_context(|| format!("loading {}", cli.config.display()))?
    } else {
        EngineConfig::default()
    };

    match cli.command {
        Command::Discovery { command } => discovery(&config, command),
        Command::Queue { command } => queue(&config, command),
        Command::Trace { answers } => trace(&answers),
    }
}

fn discovery(config: &EngineConfig, command: DiscoveryCommand) -> Result<()> {
    let store = FingerprintStore::open(&config.discovery_dir, SystemClock)
        .with_context(|| format!("opening catalogue at {}", config.discovery_dir.display()))?;
    match command {
        DiscoveryCommand::Report => print!("{}", store.report()),
        DiscoveryCommand::Stats => {
            println!("{} unique pages discovered", store.stats().count);
        }
    }
    Ok(())
}

fn queue(config: &EngineConfig, command: QueueCommand) -> Result<()> {
    if config.queue_table.is_none() {
        bail!("no queue_table configured; nothing to inspect");
    }
    let queue = DispatchQueue::open(config.queue_config(), SystemClock)
        .context("opening task queue")?;

    match command {
        QueueCommand::List { status } => {
            let filter = status.map(|s| parse_status(&s)).transpose()?;
            let tasks = queue.list(filter);
            if tasks.is_empty() {
                println!("no tasks");
                return Ok(());
            }
            println!(
                "{:<12} {:<8} {:<12} {:<9} {}",
                "ID", "PRIO", "STATUS", "ATTEMPT", "LAST ERROR"
            );
            for task in tasks {
                println!(
                    "{:<12} {:<8} {:<12} {:<9} {}",
                    short(task.id.as_str(), 12),
                    task.priority.to_string(),
                    task.status.to_string(),
                    format!("{}/{}", task.attempt, task.max_attempts),
                    task.last_error.as_deref().unwrap_or("-"),
                );
            }
        }
    }
    Ok(())
}

fn trace(answers_path: &PathBuf) -> Result<()> {
    let raw = std::fs::read_to_string(answers_path)
        .with_context(|| format!("reading {}", answers_path.display()))?;
    let answers: AnswerMap = serde_json::from_str(&raw).context("parsing answers")?;

    let path = NavigationGraph::standard().trace_path(&answers)?;
    println!("{} pages:", path.len());
    for page in path {
        println!("  {page:>3}  {}", page_name(page));
    }
    Ok(())
}

fn parse_status(s: &str) -> Result<TaskStatus> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .with_context(|| format!("unknown status '{s}'"))
}
