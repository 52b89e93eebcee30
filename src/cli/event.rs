//! Event commands: import, list.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Subcommand;

use crate::{roster::Roster, storage::Storage};

use super::short_id;

#[derive(Debug, Subcommand)]
pub enum EventCommand {
    /// Import an event from a JSON roster. Prints the event ID.
    Import {
        /// Roster file: event settings, guests, and constraints.
        file: PathBuf,
    },

    /// List events.
    List,
}

pub(super) fn run(storage: &Storage, command: EventCommand) -> Result<(), String> {
    match command {
        EventCommand::Import { file } => cmd_import(storage, &file),
        EventCommand::List => cmd_list(storage),
    }
}

fn cmd_import(storage: &Storage, file: &Path) -> Result<(), String> {
    let json = fs::read_to_string(file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;

    let event = Roster::parse(&json)
        .and_then(|roster| roster.import(storage))
        .map_err(|e| format!("failed to import {}: {e}", file.display()))?;

    println!("{}", event.id);
    Ok(())
}

fn cmd_list(storage: &Storage) -> Result<(), String> {
    let events = storage
        .list_events()
        .map_err(|e| format!("failed to list events: {e}"))?;

    if events.is_empty() {
        println!("No events");
        return Ok(());
    }

    for e in &events {
        println!(
            "{}  [{}]  {} ({} per table, {} round(s))",
            short_id(e.id),
            e.status.as_str(),
            e.name,
            e.table_size,
            e.number_of_rounds
        );
    }

    Ok(())
}
