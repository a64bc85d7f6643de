// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recall ask` and `recall shell`.
//!
//! Questions go through the query orchestrator; the configured search mode
//! decides between semantic answers and plain text matching.

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use recall_config::SearchMode;
use recall_core::RecallError;
use recall_memory::{QueryMode, QueryOutcome, QueryState};
use recall_voice::append_transcription;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use crate::app::App;
use crate::memories::render;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The question, e.g. "where is my passport?".
    pub query: Option<String>,
    /// Match text instead of asking semantically.
    #[arg(long)]
    pub text: bool,
    /// Audio clip whose transcript is appended to the question.
    #[arg(long, value_name = "FILE")]
    pub voice: Option<PathBuf>,
}

pub async fn ask(app: &App, args: AskArgs) -> Result<(), RecallError> {
    let mut query = args.query.unwrap_or_default();
    if let Some(clip) = &args.voice
        && let Some(spoken) = app.transcribe_clip(clip).await?
    {
        query = append_transcription(&query, &spoken);
    }
    if query.trim().is_empty() {
        return Err(RecallError::Validation("nothing to ask".to_string()));
    }

    let outcome = run_query(app, &query, args.text).await;
    print_outcome(&outcome);
    Ok(())
}

async fn run_query(app: &App, query: &str, force_text: bool) -> QueryOutcome {
    if force_text || app.config.search.mode == SearchMode::Text {
        app.orchestrator.search_text(query).await
    } else {
        app.orchestrator.ask(query).await
    }
}

/// Prints an outcome: the answer, then matches, then any message.
pub fn print_outcome(outcome: &QueryOutcome) {
    debug!(state = %outcome.state, hits = outcome.hits.len(), "query finished");
    if outcome.state == QueryState::Idle {
        return;
    }
    if let Some(answer) = &outcome.answer {
        println!("{}", answer.bold());
        if !outcome.hits.is_empty() {
            println!();
        }
    }
    for hit in &outcome.hits {
        match hit.similarity {
            Some(score) => println!("{} {}", format_score(score).cyan(), render(&hit.memory)),
            None => println!("{}", render(&hit.memory)),
        }
    }
    if let Some(message) = &outcome.message {
        let styled = if outcome.state == QueryState::Error {
            message.red()
        } else {
            message.dimmed()
        };
        println!("{styled}");
    }
    if outcome.mode == QueryMode::Text && outcome.state == QueryState::Done && outcome.hits.len() > 1
    {
        println!("{}", format!("{} matches", outcome.hits.len()).dimmed());
    }
}

fn format_score(score: f32) -> String {
    format!("{:>3.0}%", score * 100.0)
}

/// Runs the interactive question prompt.
///
/// Lines starting with `/text ` are matched as text. `/quit` or `/exit`
/// leaves the prompt.
pub async fn run_shell(app: &App) -> Result<(), RecallError> {
    let mut rl = DefaultEditor::new().map_err(|e| RecallError::Internal(e.to_string()))?;
    println!(
        "{}",
        "Ask where something is. /text <words> to match text, /quit to exit.".dimmed()
    );

    loop {
        let prompt = format!("{}> ", "recall".green());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);
                match ShellInput::parse(line) {
                    ShellInput::Quit => break,
                    ShellInput::Text(q) => print_outcome(&run_query(app, q, true).await),
                    ShellInput::Ask(q) => print_outcome(&run_query(app, q, false).await),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum ShellInput<'a> {
    Quit,
    Text(&'a str),
    Ask(&'a str),
}

impl<'a> ShellInput<'a> {
    fn parse(line: &'a str) -> Self {
        match line {
            "/quit" | "/exit" => Self::Quit,
            _ => match line.strip_prefix("/text ") {
                Some(rest) => Self::Text(rest.trim()),
                None => Self::Ask(line),
            },
        }
    }
}
