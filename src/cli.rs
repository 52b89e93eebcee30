//! CLI interface for seating.
//!
//! Each subcommand is non-interactive: arguments in, structured output out.
//!
//! Commands split into two groups:
//!
//! - `seating event import|list` and `seating preview expire` — no event context needed.
//! - `seating --event <id> <command>` — everything else, operating within an event.
//!
//! The `--event` flag takes a full UUID or unambiguous prefix.

mod event;
mod format;
mod preview;

use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::config::Config;
use crate::model::{Event, Guest};
use crate::staging;
use crate::storage::Storage;

use event::EventCommand;
use format::{format_tables, format_violation};
use preview::PreviewCommand;

/// Seating — assign guests to tables, round by round.
#[derive(Debug, Parser)]
#[command(name = "seating", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// Event ID: full UUID or unambiguous prefix (e.g. `a3b`).
    #[arg(long, global = true)]
    event: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: seating an event
  1. seating event import roster.json
     → prints an event ID (e.g. a3b0fc12)
  2. seating --event a3b preview generate
  3. seating --event a3b preview show
  4. seating --event a3b preview move Ada --round 1 --table 3
  5. seating --event a3b preview commit

Review:
  seating --event a3b assignments
  seating --event a3b conflicts";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage events: import a roster, list existing.
    Event {
        #[command(subcommand)]
        command: EventCommand,
    },

    /// Stage, review, and commit a candidate seating.
    Preview {
        #[command(subcommand)]
        command: PreviewCommand,
    },

    /// Show the committed seating. Requires `--event`.
    Assignments,

    /// Check the committed seating against the event's constraints.
    /// Requires `--event`.
    Conflicts,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Event { command } => event::run(storage, command),
        Command::Preview { command } => {
            preview::run(config, storage, cli.event.as_deref(), command)
        }
        Command::Assignments => {
            let event = require_event(storage, cli.event.as_deref())?;
            cmd_assignments(config, storage, &event)
        }
        Command::Conflicts => {
            let event = require_event(storage, cli.event.as_deref())?;
            cmd_conflicts(storage, &event)
        }
    }
}

fn cmd_assignments(config: &Config, storage: &Storage, event: &Event) -> Result<(), String> {
    let assignments = storage
        .load_assignments(event.id)
        .map_err(|e| format!("failed to load assignments: {e}"))?;

    if assignments.is_empty() {
        println!("No committed assignments");
        return Ok(());
    }

    let guests = load_guests(storage, event)?;
    let weights = storage
        .load_weights(event.id)
        .map_err(|e| format!("failed to load weights: {e}"))?
        .unwrap_or(config.weights);

    let mut rounds: BTreeMap<u32, Vec<(u32, Uuid)>> = BTreeMap::new();
    for a in &assignments {
        rounds.entry(a.round).or_default().push((a.table, a.guest_id));
    }

    for (round, seats) in &rounds {
        println!("Round {round}");
        for line in format_tables(seats, &guests, &weights) {
            println!("  {line}");
        }
    }

    Ok(())
}

fn cmd_conflicts(storage: &Storage, event: &Event) -> Result<(), String> {
    let violations = staging::check_committed(storage, event.id)
        .map_err(|e| format!("failed to check conflicts: {e}"))?;

    if violations.is_empty() {
        println!("No conflicts");
        return Ok(());
    }

    for v in &violations {
        println!("{}", format_violation(v));
    }

    Ok(())
}

/// Require that `--event` was provided and resolve it.
fn require_event(storage: &Storage, event_ref: Option<&str>) -> Result<Event, String> {
    let event_ref = event_ref.ok_or("this command requires --event <id>")?;
    resolve_event(storage, event_ref)
}

fn load_guests(storage: &Storage, event: &Event) -> Result<Vec<Guest>, String> {
    storage
        .load_guests(event.id)
        .map_err(|e| format!("failed to load guests: {e}"))
}

/// Resolve an event reference (full UUID or unambiguous prefix) to an event.
fn resolve_event(storage: &Storage, reference: &str) -> Result<Event, String> {
    // Try full UUID first.
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_event(id)
            .map_err(|e| format!("event not found: {e}"));
    }

    // Try as a prefix match against all events.
    let events = storage
        .list_events()
        .map_err(|e| format!("failed to list events: {e}"))?;

    let matches: Vec<&Event> = events
        .iter()
        .filter(|e| e.id.to_string().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no event matching '{reference}'")),
        1 => Ok(matches[0].clone()),
        n => {
            let ids: Vec<String> = matches.iter().map(|e| short_id(e.id)).collect();
            Err(format!(
                "'{reference}' is ambiguous — matches {n} events: {}",
                ids.join(", ")
            ))
        }
    }
}

/// Resolve a guest reference (full UUID, unambiguous prefix, or exact name).
fn resolve_guest<'a>(guests: &'a [Guest], reference: &str) -> Result<&'a Guest, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return guests
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| format!("no guest with id {id}"));
    }

    let by_name: Vec<&Guest> = guests.iter().filter(|g| g.name == reference).collect();
    let matches = if by_name.is_empty() {
        guests
            .iter()
            .filter(|g| g.id.to_string().starts_with(reference))
            .collect()
    } else {
        by_name
    };

    match matches.len() {
        0 => Err(format!("no guest matching '{reference}'")),
        1 => Ok(matches[0]),
        n => Err(format!(
            "'{reference}' is ambiguous — matches {n} guests; use an id"
        )),
    }
}

fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}
