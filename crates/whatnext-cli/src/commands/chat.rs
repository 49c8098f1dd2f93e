use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use rustyline::error::ReadlineError;
use tokio::sync::watch;
use uuid::Uuid;
use whatnext_application::{BrowseUseCase, ChatSessionRunner, ChatSnapshot, SessionError};
use whatnext_core::chat::HistoryEntry;
use whatnext_core::config::{AppConfig, ChatConfig};
use whatnext_interaction::{ChatService, LocationService};

use crate::{browse, helper};

#[derive(Args, Debug, Default)]
pub struct ChatArgs {
    /// User id sent with every turn (a random one is used when unset)
    #[arg(long)]
    user_id: Option<String>,
    /// Latitude of the user
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,
    /// Longitude of the user
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,
}

impl ChatArgs {
    fn apply(self, mut chat: ChatConfig) -> ChatConfig {
        if let Some(user_id) = self.user_id {
            chat.user_id = user_id;
        }
        if let Some(lat) = self.lat {
            chat.latitude = lat;
        }
        if let Some(lon) = self.lon {
            chat.longitude = lon;
        }
        if chat.user_id.trim().is_empty() {
            chat.user_id = Uuid::new_v4().to_string();
            tracing::info!("[Chat] no user id configured, using {}", chat.user_id);
        }
        chat
    }
}

pub async fn run(config: AppConfig, args: ChatArgs) -> Result<()> {
    let chat_config = args.apply(config.chat.clone());
    let origin = chat_config.coordinates();

    let client = Arc::new(ChatService::from_config(&config.api)?);
    let handle = ChatSessionRunner::from_config(&chat_config, client).spawn();
    let browser = BrowseUseCase::new(
        Arc::new(LocationService::from_config(&config.api)?),
        config.cards,
    );
    let renderer = tokio::spawn(render_snapshots(handle.subscribe()));

    let mut rl = helper::editor()?;

    println!("{}", "=== WhatNext ===".bright_magenta().bold());
    println!(
        "{}",
        "Tell me what you are looking for. '/new' starts over, '/quit' exits.".bright_black()
    );
    println!();

    let mut browsed: Option<Uuid> = None;
    let outcome = loop {
        let latest = handle.snapshot().latest_locations().cloned();
        if let Some(batch) = latest.filter(|batch| browsed != Some(batch.id)) {
            browsed = Some(batch.id);
            let mut stack = browser.from_batch(&batch);
            if !stack.is_empty() {
                if let Err(err) = browse::run(&mut rl, &mut stack, origin) {
                    break Err(err);
                }
            }
        }

        match tokio::task::block_in_place(|| rl.readline(">> ")) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let result = match trimmed {
                    "/quit" | "/exit" => {
                        println!("{}", "Goodbye!".bright_green());
                        break Ok(());
                    }
                    "/new" => handle.restart().await,
                    text => handle.submit(text).await,
                };
                if let Err(err) = accept_guard(result) {
                    break Err(err);
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break Ok(());
            }
            Err(err) => break Err(err.into()),
        }
    };

    handle.shutdown().await;
    let _ = renderer.await;
    outcome
}

/// Guard rejections are shown through the advisory, so only a closed
/// session is an error here.
fn accept_guard(result: std::result::Result<(), SessionError>) -> Result<()> {
    match result {
        Ok(()) | Err(SessionError::Guard(_)) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[derive(Default)]
struct RenderState {
    shown: HashSet<Uuid>,
    was_waiting: bool,
    advisory: Option<String>,
}

async fn render_snapshots(mut snapshots: watch::Receiver<ChatSnapshot>) {
    let mut state = RenderState::default();
    loop {
        let snapshot = snapshots.borrow_and_update().clone();
        render(&snapshot, &mut state);
        if snapshots.changed().await.is_err() {
            break;
        }
    }
}

fn render(snapshot: &ChatSnapshot, state: &mut RenderState) {
    if snapshot.history.is_empty() && !state.shown.is_empty() {
        state.shown.clear();
        println!("{}", "-- new conversation --".bright_black());
    }

    for entry in &snapshot.history {
        match entry {
            HistoryEntry::Message(message) => {
                if message.is_typing() || !state.shown.insert(message.id) {
                    continue;
                }
                if !message.is_user_authored {
                    for line in message.content.lines() {
                        println!("{}", line.bright_blue());
                    }
                }
            }
            HistoryEntry::Locations(batch) => {
                if !state.shown.insert(batch.id) {
                    continue;
                }
                println!(
                    "{}",
                    format!("Found {} places:", batch.locations.len()).bright_magenta()
                );
                for (rank, location) in batch.locations.iter().enumerate() {
                    println!("  {:>2}. {}", rank + 1, location.name);
                }
                println!("{}", "(press Enter to browse them)".bright_black());
            }
        }
    }

    if snapshot.awaiting_response && !state.was_waiting {
        println!("{}", "...".bright_black());
    }
    state.was_waiting = snapshot.awaiting_response;

    if snapshot.advisory != state.advisory {
        if let Some(advisory) = &snapshot.advisory {
            println!("{}", advisory.yellow());
        }
        state.advisory = snapshot.advisory.clone();
    }
}
