// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recall - remember where you put things.
//!
//! This is the command-line entry point for the Recall memory store.

mod app;
mod ask;
mod memories;
mod speech;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use recall_config::RecallConfig;
use recall_core::RecallError;

use crate::app::App;

/// Recall - remember where you put things.
#[derive(Parser, Debug)]
#[command(name = "recall", version, about, long_about = None)]
struct Cli {
    /// Path to a configuration file (defaults to the XDG lookup).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Remember where an item is.
    Add(memories::AddArgs),
    /// List every memory, newest first.
    List,
    /// Find memories whose item, location, or notes contain the text.
    Find {
        /// Text to look for.
        text: String,
    },
    /// Ask where something is.
    Ask(ask::AskArgs),
    /// Launch an interactive question prompt.
    Shell,
    /// Change a memory.
    Edit(memories::EditArgs),
    /// Delete a memory.
    Delete {
        /// Memory id.
        id: i64,
    },
    /// Delete every memory.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Embed memories that are missing a vector.
    Reindex,
    /// Manage the speech-to-text model.
    Speech {
        #[command(subcommand)]
        action: speech::SpeechAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => recall_config::load_and_validate_path(path),
        None => recall_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            recall_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.app.log_level);

    let Some(command) = cli.command else {
        println!("recall: use --help for available commands");
        return;
    };

    if let Err(e) = run(config, command).await {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

async fn run(config: RecallConfig, command: Commands) -> Result<(), RecallError> {
    let app = App::build(config).await?;
    let result = match command {
        Commands::Add(args) => memories::add(&app, args).await,
        Commands::List => memories::list(&app).await,
        Commands::Find { text } => memories::find(&app, &text).await,
        Commands::Ask(args) => ask::ask(&app, args).await,
        Commands::Shell => ask::run_shell(&app).await,
        Commands::Edit(args) => memories::edit(&app, args).await,
        Commands::Delete { id } => memories::delete(&app, id).await,
        Commands::Clear { yes } => memories::clear(&app, yes).await,
        Commands::Reindex => memories::reindex(&app).await,
        Commands::Speech { action } => speech::run(&app, action).await,
    };
    app.shutdown().await?;
    result
}

/// Initializes the tracing subscriber on stderr.
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let directives = [
        "recall",
        "recall_config",
        "recall_memory",
        "recall_openai",
        "recall_storage",
        "recall_voice",
    ]
    .iter()
    .map(|target| format!("{target}={log_level}"))
    .collect::<Vec<_>>()
    .join(",");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{directives},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_ask_with_global_config() {
        let cli = Cli::try_parse_from(["recall", "ask", "where is my passport", "--config", "r.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("r.toml")));
        match cli.command {
            Some(Commands::Ask(args)) => {
                assert_eq!(args.query.as_deref(), Some("where is my passport"));
                assert!(!args.text);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn clear_requires_nothing_but_accepts_yes() {
        let cli = Cli::try_parse_from(["recall", "clear", "--yes"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Clear { yes: true })));
    }

    #[test]
    fn speech_subcommands() {
        let cli = Cli::try_parse_from(["recall", "speech", "download"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Speech {
                action: speech::SpeechAction::Download
            })
        ));
    }
}
