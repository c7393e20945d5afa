//! Tournament command - persistent single-elimination tournaments
//!
//! State lives in a directory store, so a tournament can be created, played a
//! match at a time, and inspected across invocations.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - dispatch
//! - Level 2: one function per action
//! - Level 3: load_active(), finish_match()
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use brain_tug_core::{MatchConfig, MatchOutcome};
use brain_tug_tournament::{
    BotProfile, DirStore, MatchRunner, SeedingPolicy, Storage, Tournament,
};

use crate::presenter::LogPresenter;
use crate::{parse_bot_spec, ModeArg};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct TournamentArgs {
    /// Directory holding tournament state
    #[arg(long, value_name = "DIR", default_value = ".brain-tug")]
    pub store: PathBuf,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub action: TournamentAction,
}

#[derive(Subcommand)]
pub enum TournamentAction {
    /// Enter players and seed a new bracket
    New {
        /// Player names
        #[arg(required = true, num_args = 2..)]
        players: Vec<String>,

        /// Question set
        #[arg(long, value_enum, default_value = "math")]
        mode: ModeArg,

        /// How entrants are ordered before pairing
        #[arg(long, value_enum, default_value = "shuffle")]
        seeding: SeedingArg,

        /// Replace an unfinished tournament
        #[arg(long)]
        force: bool,
    },
    /// Show the bracket and the next match
    Status,
    /// Play the next match (or every remaining match) with bots
    Play {
        /// Play until a champion is crowned
        #[arg(long)]
        all: bool,

        /// Accuracy for bots without an override
        #[arg(long, default_value = "0.8")]
        accuracy: f64,

        /// Per-player override, NAME=ACCURACY (repeatable)
        #[arg(long = "bot", value_name = "NAME=ACC")]
        bots: Vec<String>,
    },
    /// List finished tournaments, newest first
    History,
    /// Per-player statistics
    Stats,
    /// Discard the unfinished tournament
    Abandon,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum SeedingArg {
    Shuffle,
    AsEntered,
    ByRating,
}

impl From<SeedingArg> for SeedingPolicy {
    fn from(arg: SeedingArg) -> Self {
        match arg {
            SeedingArg::Shuffle => SeedingPolicy::Shuffle,
            SeedingArg::AsEntered => SeedingPolicy::AsEntered,
            SeedingArg::ByRating => SeedingPolicy::ByRating,
        }
    }
}

type DirStorage = Storage<DirStore>;

// ============================================================================
// LEVEL 1 - DISPATCH
// ============================================================================

pub fn run(args: TournamentArgs, config: MatchConfig, seed: Option<u64>) -> Result<()> {
    let mut storage = Storage::new(DirStore::new(&args.store));
    let mut rng = create_rng(seed);

    match args.action {
        TournamentAction::New {
            players,
            mode,
            seeding,
            force,
        } => new_tournament(&mut storage, &players, mode, seeding, force, &mut rng),
        TournamentAction::Status => show_status(&storage),
        TournamentAction::Play {
            all,
            accuracy,
            bots,
        } => play(&mut storage, config, all, accuracy, &bots, &mut rng),
        TournamentAction::History => show_history(&storage, args.json),
        TournamentAction::Stats => show_stats(&storage, args.json),
        TournamentAction::Abandon => {
            storage
                .clear_active_tournament()
                .context("Failed to clear tournament")?;
            println!("Tournament abandoned");
            Ok(())
        }
    }
}

// ============================================================================
// LEVEL 2 - ACTIONS
// ============================================================================

fn new_tournament(
    storage: &mut DirStorage,
    players: &[String],
    mode: ModeArg,
    seeding: SeedingArg,
    force: bool,
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    if !force && storage.load_active_tournament()?.is_some() {
        anyhow::bail!("A tournament is already in progress (use --force to replace it)");
    }

    let mut tournament = Tournament::new(mode.into());
    for name in players {
        tournament
            .add_player(name)
            .with_context(|| format!("Cannot enter {:?}", name))?;
    }

    let stats = storage.load_player_stats()?;
    tournament.seed_bracket(seeding.into(), rng, &stats)?;
    storage.save_active_tournament(&tournament.snapshot())?;

    tracing::info!("New {:?} tournament with {} players", tournament.mode(), players.len());
    print_bracket(&tournament);
    Ok(())
}

fn show_status(storage: &DirStorage) -> Result<()> {
    let tournament = load_active(storage)?;
    print_bracket(&tournament);
    print_log(&tournament);
    Ok(())
}

fn play(
    storage: &mut DirStorage,
    config: MatchConfig,
    all: bool,
    accuracy: f64,
    bot_specs: &[String],
    rng: &mut ChaCha8Rng,
) -> Result<()> {
    let mut tournament = load_active(storage)?;

    let mut runner = MatchRunner::new(config, tournament.mode(), LogPresenter::new(), rng.gen())
        .with_default_bot(BotProfile::new(accuracy));
    for spec in bot_specs {
        let (name, profile) = parse_bot_spec(spec)?;
        runner = runner.with_bot(&name, profile);
    }

    loop {
        let outcome = tournament.play_next(&mut runner)?;
        finish_match(storage, &tournament, &outcome)?;
        print_outcome(&outcome);

        if tournament.is_complete() || !all {
            break;
        }
    }

    if let Some(record) = tournament.history_record() {
        println!("\nCHAMPION: {}", record.champion);
        storage.append_history(record)?;
        storage.clear_active_tournament()?;
    } else if let Some((_, next)) = tournament.active_match() {
        println!("Next: {} vs {}", next.player1, next.player2);
    }
    Ok(())
}

fn show_history(storage: &DirStorage, json: bool) -> Result<()> {
    let history = storage.load_history()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }
    if history.is_empty() {
        println!("No finished tournaments");
    }
    for record in &history {
        println!(
            "{}  {:<10} champion {:<12} ({} players)",
            record.finished_at.format("%Y-%m-%d %H:%M"),
            format!("{:?}", record.mode),
            record.champion,
            record.players.len()
        );
    }
    Ok(())
}

fn show_stats(storage: &DirStorage, json: bool) -> Result<()> {
    let stats = storage.load_player_stats()?;
    let board = stats.leaderboard();

    if json {
        #[derive(serde::Serialize)]
        struct JsonRow<'a> {
            name: &'a str,
            matches: u32,
            wins: u32,
            accuracy: f32,
            avg_answer_ms: f32,
        }
        let rows: Vec<JsonRow> = board
            .iter()
            .map(|&(name, s)| JsonRow {
                name,
                matches: s.matches,
                wins: s.wins,
                accuracy: s.accuracy(),
                avg_answer_ms: s.avg_answer_ms(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("{:<16} {:>7} {:>5} {:>9} {:>9}", "Player", "Matches", "Wins", "Accuracy", "Avg ms");
    for (name, s) in board {
        println!(
            "{:<16} {:>7} {:>5} {:>8.1}% {:>9.0}",
            name,
            s.matches,
            s.wins,
            s.accuracy() * 100.0,
            s.avg_answer_ms()
        );
    }
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn load_active(storage: &DirStorage) -> Result<Tournament> {
    let snapshot = storage
        .load_active_tournament()
        .context("Failed to read tournament state")?
        .context("No tournament in progress (start one with `tournament new`)")?;
    Ok(Tournament::resume_from(snapshot)?)
}

/// Persist progress and fold the match into player statistics
fn finish_match(storage: &mut DirStorage, tournament: &Tournament, outcome: &MatchOutcome) -> Result<()> {
    storage.save_active_tournament(&tournament.snapshot())?;
    let mut stats = storage.load_player_stats()?;
    stats.record_match(outcome);
    storage.save_player_stats(&stats)?;
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn print_bracket(tournament: &Tournament) {
    let Some(bracket) = tournament.bracket() else {
        return;
    };
    let active = bracket.active_match();
    for (round, matches) in bracket.rounds().iter().enumerate() {
        println!("\n{}", bracket.round_name(round));
        for (index, m) in matches.iter().enumerate() {
            let marker = if active.is_some_and(|a| a.round == round && a.index == index) {
                ">"
            } else {
                " "
            };
            let result = m
                .winner
                .as_deref()
                .map(|w| format!("  -> {}", w))
                .unwrap_or_default();
            println!("{} {}: {} vs {}{}", marker, m.id, m.player1, m.player2, result);
        }
    }
    if let Some(champion) = tournament.champion() {
        println!("\nCHAMPION: {}", champion);
    }
}

fn print_log(tournament: &Tournament) {
    if tournament.winners_log().is_empty() {
        return;
    }
    println!("\nResults:");
    for line in tournament.winners_log() {
        println!("  {}", line);
    }
}

fn print_outcome(outcome: &MatchOutcome) {
    println!(
        "{} vs {}: {} by {} ({}-{})",
        outcome.p1.name,
        outcome.p2.name,
        outcome.winner_name().unwrap_or("nobody"),
        outcome.reason,
        outcome.p1.score,
        outcome.p2.score
    );
}
