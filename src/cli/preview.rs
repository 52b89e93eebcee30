//! Preview commands: generate, show, move, commit, discard, expire.

use clap::Subcommand;
use jiff::Timestamp;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::Config;
use crate::model::Event;
use crate::staging::{self, PreviewView};
use crate::storage::Storage;

use super::format::{format_tables, format_violation};
use super::{load_guests, require_event, resolve_guest, short_id};

#[derive(Debug, Subcommand)]
pub enum PreviewCommand {
    /// Seat every round and stage the result. Replaces any existing preview.
    Generate {
        /// Shuffle seed, for a reproducible seating. Overrides the config seed.
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show the staged preview.
    Show {
        /// Print the preview as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Move one guest to another table in one round.
    Move {
        /// Guest: full UUID, unambiguous prefix, or exact name.
        guest: String,

        #[arg(long)]
        round: u32,

        #[arg(long)]
        table: u32,
    },

    /// Replace the committed seating with the preview.
    Commit,

    /// Throw the preview away.
    Discard,

    /// Remove previews older than 30 minutes, across all events.
    Expire,
}

pub(super) fn run(
    config: &Config,
    storage: &Storage,
    event_ref: Option<&str>,
    command: PreviewCommand,
) -> Result<(), String> {
    if let PreviewCommand::Expire = command {
        return cmd_expire(storage);
    }

    let event = require_event(storage, event_ref)?;
    match command {
        PreviewCommand::Generate { seed } => cmd_generate(config, storage, &event, seed),
        PreviewCommand::Show { json } => cmd_show(config, storage, &event, json),
        PreviewCommand::Move {
            guest,
            round,
            table,
        } => cmd_move(storage, &event, &guest, round, table),
        PreviewCommand::Commit => cmd_commit(storage, &event),
        PreviewCommand::Discard => cmd_discard(storage, &event),
        PreviewCommand::Expire => cmd_expire(storage),
    }
}

fn cmd_generate(
    config: &Config,
    storage: &Storage,
    event: &Event,
    seed: Option<u64>,
) -> Result<(), String> {
    let mut rng = match seed.or(config.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let report = staging::generate(storage, event.id, &config.weights, &mut rng)
        .map_err(|e| format!("failed to generate preview: {e}"))?;

    println!("{}", report.session_id);
    eprintln!(
        "Staged {} assignment(s) across {} round(s)",
        report.total_assignments, report.rounds
    );
    for v in &report.constraint_violations {
        eprintln!("  {}", format_violation(v));
    }

    Ok(())
}

fn cmd_show(config: &Config, storage: &Storage, event: &Event, json: bool) -> Result<(), String> {
    let view = staging::get(storage, event.id)
        .map_err(|e| format!("failed to load preview: {e}"))?;

    let Some(view) = view else {
        println!("No preview");
        return Ok(());
    };

    if json {
        let json = serde_json::to_string_pretty(&view)
            .map_err(|e| format!("failed to serialize preview: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    print_view(config, storage, event, &view)
}

fn print_view(
    config: &Config,
    storage: &Storage,
    event: &Event,
    view: &PreviewView,
) -> Result<(), String> {
    let guests = load_guests(storage, event)?;
    let weights = storage
        .load_weights(event.id)
        .map_err(|e| format!("failed to load weights: {e}"))?
        .unwrap_or(config.weights);

    println!(
        "Preview {} (staged {})",
        short_id(view.session_id),
        view.created_at
    );
    for (round, seats) in &view.by_round {
        let seats: Vec<(u32, _)> = seats.iter().map(|s| (s.table, s.guest_id)).collect();
        println!("Round {round}");
        for line in format_tables(&seats, &guests, &weights) {
            println!("  {line}");
        }
    }

    Ok(())
}

fn cmd_move(
    storage: &Storage,
    event: &Event,
    guest_ref: &str,
    round: u32,
    table: u32,
) -> Result<(), String> {
    let guests = load_guests(storage, event)?;
    let guest = resolve_guest(&guests, guest_ref)?;

    let table_count = event.table_count(guests.len());
    if table == 0 || table > table_count {
        return Err(format!("table must be between 1 and {table_count}"));
    }

    let staged = storage
        .load_preview(event.id)
        .map_err(|e| format!("failed to load preview: {e}"))?;
    let seated = staged
        .iter()
        .filter(|s| s.round == round && s.table == table && s.guest_id != guest.id)
        .count();
    if seated >= event.table_size as usize {
        return Err(format!("table {table} is full in round {round}"));
    }

    staging::update_single(storage, event.id, guest.id, round, table)
        .map_err(|e| format!("failed to move {}: {e}", guest.name))?;

    eprintln!("Moved {} to table {table} in round {round}", guest.name);
    Ok(())
}

fn cmd_commit(storage: &Storage, event: &Event) -> Result<(), String> {
    let assigned = staging::commit(storage, event.id)
        .map_err(|e| format!("failed to commit preview: {e}"))?;

    eprintln!("Committed {assigned} assignment(s) for {}", event.name);
    Ok(())
}

fn cmd_discard(storage: &Storage, event: &Event) -> Result<(), String> {
    let deleted = staging::discard(storage, event.id)
        .map_err(|e| format!("failed to discard preview: {e}"))?;

    eprintln!("Discarded {deleted} staged assignment(s)");
    Ok(())
}

fn cmd_expire(storage: &Storage) -> Result<(), String> {
    let removed = staging::expire_stale(storage, Timestamp::now())
        .map_err(|e| format!("failed to expire previews: {e}"))?;

    eprintln!("Removed {removed} stale staged assignment(s)");
    Ok(())
}
