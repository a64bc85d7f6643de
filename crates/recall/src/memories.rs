// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory management commands: add, list, find, edit, delete, clear, reindex.

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use recall_core::types::{MemoryFields, MemoryRecord};
use recall_core::RecallError;
use recall_voice::append_transcription;
use rustyline::DefaultEditor;
use tracing::info;

use crate::app::App;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// What you put away.
    pub item: Option<String>,
    /// Where you put it.
    pub location: Option<String>,
    /// Optional notes.
    #[arg(long)]
    pub notes: Option<String>,
    /// Audio clip whose transcript is appended to the item name.
    #[arg(long, value_name = "FILE")]
    pub voice_item: Option<PathBuf>,
    /// Audio clip whose transcript is appended to the location.
    #[arg(long, value_name = "FILE")]
    pub voice_location: Option<PathBuf>,
    /// Audio clip whose transcript is appended to the notes.
    #[arg(long, value_name = "FILE")]
    pub voice_notes: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Memory id.
    pub id: i64,
    /// New item name.
    #[arg(long)]
    pub item: Option<String>,
    /// New location.
    #[arg(long)]
    pub location: Option<String>,
    /// New notes.
    #[arg(long, conflicts_with = "clear_notes")]
    pub notes: Option<String>,
    /// Remove the notes.
    #[arg(long)]
    pub clear_notes: bool,
}

/// Typed text followed by the transcript of an optional clip.
async fn field_with_voice(
    app: &App,
    typed: Option<String>,
    clip: Option<&PathBuf>,
) -> Result<String, RecallError> {
    let typed = typed.unwrap_or_default();
    let Some(clip) = clip else {
        return Ok(typed);
    };
    match app.transcribe_clip(clip).await? {
        Some(text) => Ok(append_transcription(&typed, &text)),
        None => {
            eprintln!("{}", format!("no speech heard in {}", clip.display()).dimmed());
            Ok(typed)
        }
    }
}

pub async fn add(app: &App, args: AddArgs) -> Result<(), RecallError> {
    let item = field_with_voice(app, args.item, args.voice_item.as_ref()).await?;
    let location = field_with_voice(app, args.location, args.voice_location.as_ref()).await?;
    let notes = field_with_voice(app, args.notes, args.voice_notes.as_ref()).await?;

    let mut fields = MemoryFields::new(item, location);
    if !notes.trim().is_empty() {
        fields = fields.with_notes(notes);
    }
    let id = app.index.remember(fields).await?;
    let saved = app
        .store
        .get(id)
        .await?
        .ok_or(RecallError::NotFound { id })?;

    println!("{} {}", "remembered".green(), render(&saved));
    if !saved.has_embedding() {
        println!(
            "{}",
            "semantic search is unavailable for this memory until `recall reindex` succeeds".dimmed()
        );
    }
    Ok(())
}

pub async fn list(app: &App) -> Result<(), RecallError> {
    let all = app.store.get_all().await?;
    if all.is_empty() {
        println!("{}", "No memories yet.".dimmed());
        return Ok(());
    }
    for memory in &all {
        println!("{}", render(memory));
    }
    Ok(())
}

pub async fn find(app: &App, text: &str) -> Result<(), RecallError> {
    let outcome = app.orchestrator.search_text(text).await;
    crate::ask::print_outcome(&outcome);
    Ok(())
}

pub async fn edit(app: &App, args: EditArgs) -> Result<(), RecallError> {
    let current = app
        .store
        .get(args.id)
        .await?
        .ok_or(RecallError::NotFound { id: args.id })?;
    let fields = merge_edit(&current, args.item, args.location, args.notes, args.clear_notes);
    app.index.revise(current.id, fields).await?;

    let updated = app
        .store
        .get(current.id)
        .await?
        .ok_or(RecallError::NotFound { id: current.id })?;
    println!("{} {}", "updated".green(), render(&updated));
    Ok(())
}

/// Applies the edited fields to a record; unspecified fields keep their value.
fn merge_edit(
    current: &MemoryRecord,
    item: Option<String>,
    location: Option<String>,
    notes: Option<String>,
    clear_notes: bool,
) -> MemoryFields {
    let notes = if clear_notes {
        None
    } else {
        notes.or_else(|| current.notes.clone())
    };
    MemoryFields {
        item_name: item.unwrap_or_else(|| current.item_name.clone()),
        location: location.unwrap_or_else(|| current.location.clone()),
        notes,
        embedding: None,
    }
}

pub async fn delete(app: &App, id: i64) -> Result<(), RecallError> {
    if app.store.get(id).await?.is_none() {
        return Err(RecallError::NotFound { id });
    }
    app.store.delete(id).await?;
    println!("{} memory {id}", "deleted".green());
    Ok(())
}

pub async fn clear(app: &App, yes: bool) -> Result<(), RecallError> {
    let count = app.store.get_all().await?.len();
    if count == 0 {
        println!("{}", "No memories to delete.".dimmed());
        return Ok(());
    }
    if !yes && !confirm(&format!("Delete all {count} memories? [y/N] "))? {
        println!("{}", "cancelled".dimmed());
        return Ok(());
    }
    app.store.clear_all().await?;
    info!(count, "all memories deleted");
    println!("{} {count} memories", "deleted".green());
    Ok(())
}

pub async fn reindex(app: &App) -> Result<(), RecallError> {
    let report = app.index.reindex().await?;
    println!(
        "{} {} embedded, {} skipped",
        "reindex".green(),
        report.embedded,
        report.skipped
    );
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool, RecallError> {
    let mut rl = DefaultEditor::new().map_err(|e| RecallError::Internal(e.to_string()))?;
    match rl.readline(prompt) {
        Ok(answer) => Ok(is_yes(&answer)),
        Err(_) => Ok(false),
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// One-line rendering: `#id item -> location (notes)`.
pub fn render(memory: &MemoryRecord) -> String {
    let mut line = format!(
        "{} {} {} {}",
        format!("#{}", memory.id).dimmed(),
        memory.item_name.bold(),
        "->".dimmed(),
        memory.location
    );
    if let Some(notes) = &memory.notes {
        line.push_str(&format!(" ({notes})"));
    }
    line
}
