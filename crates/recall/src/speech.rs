// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `recall speech` subcommands.

use clap::Subcommand;
use colored::Colorize;
use recall_core::RecallError;
use recall_voice::ModelStatus;

use crate::app::App;

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum SpeechAction {
    /// Show whether the speech model is present.
    Status,
    /// Download the speech model.
    Download,
}

pub async fn run(app: &App, action: SpeechAction) -> Result<(), RecallError> {
    match action {
        SpeechAction::Status => {
            println!(
                "{} {}",
                describe(&app.speech.status()),
                app.speech.model_path().display().to_string().dimmed()
            );
            if !app.config.speech.enabled {
                println!("{}", "voice input is disabled (speech.enabled = false)".dimmed());
            }
            Ok(())
        }
        SpeechAction::Download => download(app).await,
    }
}

async fn download(app: &App) -> Result<(), RecallError> {
    let mut rx = app.speech.subscribe();
    let progress = tokio::spawn(async move {
        let mut last = -1i32;
        while rx.changed().await.is_ok() {
            let status = *rx.borrow_and_update();
            if !status.downloading {
                break;
            }
            let percent = (status.progress * 100.0) as i32;
            if percent / 10 != last / 10 {
                eprintln!("{}", format!("downloading... {percent}%").dimmed());
                last = percent;
            }
        }
    });

    let result = app.speech.download().await;
    progress.abort();
    let path = result?;
    println!("{} {}", "speech model ready".green(), path.display());
    Ok(())
}

fn describe(status: &ModelStatus) -> String {
    if status.ready {
        "ready".green().to_string()
    } else if status.downloading {
        format!("downloading ({:.0}%)", status.progress * 100.0)
            .yellow()
            .to_string()
    } else {
        "not downloaded (run `recall speech download`)".yellow().to_string()
    }
}
