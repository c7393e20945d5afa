//! Balance command - play many bot matches in parallel
//!
//! Used to check how a match configuration plays out: how often the stronger
//! bot wins, how matches end, and how long they take.
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_matches(), report_results()
//! - Level 3: play_single_match(), compute_statistics()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use brain_tug_core::{EndReason, MatchConfig, TournamentContext};
use brain_tug_tournament::{BotProfile, MatchRunner, TournamentError};

use crate::ModeArg;

const BOT_A: &str = "Bot A";
const BOT_B: &str = "Bot B";

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BalanceArgs {
    /// Number of matches to play (seats alternate)
    #[arg(long, default_value = "200")]
    pub matches: usize,

    /// Accuracy of bot A
    #[arg(long, default_value = "0.9")]
    pub a_accuracy: f64,

    /// Accuracy of bot B
    #[arg(long, default_value = "0.7")]
    pub b_accuracy: f64,

    /// Question set
    #[arg(long, value_enum, default_value = "math")]
    pub mode: ModeArg,

    /// Play as tournament matches with this many rounds left
    #[arg(long)]
    pub rounds_remaining: Option<usize>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// One finished match from bot A's point of view
#[derive(Clone, Debug)]
struct MatchRecord {
    a_won: Option<bool>,
    reason: EndReason,
    duration_ms: u64,
}

#[derive(Clone, Debug, Default, PartialEq)]
struct BalanceResults {
    played: usize,
    a_wins: usize,
    b_wins: usize,
    draws: usize,
    knockouts: usize,
    time_decisions: usize,
    sudden_deaths: usize,
    stalled: usize,
    avg_duration_ms: f64,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run balance command
///
/// 1. Derive one seed per match
/// 2. Play all matches in parallel
/// 3. Report aggregate results
pub fn run(args: BalanceArgs, config: MatchConfig, seed: Option<u64>) -> Result<()> {
    tracing::info!(
        "Balancing: {} matches, A={:.2} vs B={:.2}",
        args.matches,
        args.a_accuracy,
        args.b_accuracy
    );

    let results = play_matches(&args, &config, seed)?;
    report_results(&results, &args);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_matches(args: &BalanceArgs, config: &MatchConfig, seed: Option<u64>) -> Result<BalanceResults> {
    let mut rng = create_rng(seed);
    let seeds: Vec<u64> = (0..args.matches).map(|_| rng.gen()).collect();

    let outcomes: Vec<Result<MatchRecord, TournamentError>> = seeds
        .par_iter()
        .enumerate()
        .map(|(i, &match_seed)| play_single_match(args, config, i % 2 == 1, match_seed))
        .collect();

    let mut records = Vec::with_capacity(outcomes.len());
    let mut stalled = 0;
    for outcome in outcomes {
        match outcome {
            Ok(record) => records.push(record),
            Err(TournamentError::MatchStalled(_)) => stalled += 1,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(compute_statistics(&records, stalled))
}

fn report_results(results: &BalanceResults, args: &BalanceArgs) {
    if args.json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

fn play_single_match(
    args: &BalanceArgs,
    config: &MatchConfig,
    swap_seats: bool,
    seed: u64,
) -> Result<MatchRecord, TournamentError> {
    let mut runner = MatchRunner::headless(config.clone(), args.mode.into(), seed)
        .with_bot(BOT_A, BotProfile::new(args.a_accuracy))
        .with_bot(BOT_B, BotProfile::new(args.b_accuracy));
    let context = args
        .rounds_remaining
        .map(|rounds_remaining| TournamentContext { rounds_remaining });

    let (p1, p2) = if swap_seats { (BOT_B, BOT_A) } else { (BOT_A, BOT_B) };
    let outcome = runner.run(p1, p2, context)?;

    Ok(MatchRecord {
        a_won: outcome.winner_name().map(|name| name == BOT_A),
        reason: outcome.reason,
        duration_ms: outcome.duration_ms,
    })
}

fn compute_statistics(records: &[MatchRecord], stalled: usize) -> BalanceResults {
    let count = |f: &dyn Fn(&MatchRecord) -> bool| records.iter().filter(|r| f(r)).count();

    let total_ms: u64 = records.iter().map(|r| r.duration_ms).sum();
    BalanceResults {
        played: records.len(),
        a_wins: count(&|r| r.a_won == Some(true)),
        b_wins: count(&|r| r.a_won == Some(false)),
        draws: count(&|r| r.a_won.is_none()),
        knockouts: count(&|r| r.reason == EndReason::Knockout),
        time_decisions: count(&|r| r.reason == EndReason::TimeDecision),
        sudden_deaths: count(&|r| r.reason == EndReason::SuddenDeathVictory),
        stalled,
        avg_duration_ms: if records.is_empty() {
            0.0
        } else {
            total_ms as f64 / records.len() as f64
        },
    }
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

fn percent(part: usize, total: usize) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

fn print_json_results(results: &BalanceResults) {
    #[derive(serde::Serialize)]
    struct JsonOutput {
        played: usize,
        a_wins: usize,
        b_wins: usize,
        draws: usize,
        a_win_rate: f64,
        knockouts: usize,
        time_decisions: usize,
        sudden_deaths: usize,
        stalled: usize,
        avg_duration_ms: f64,
    }

    let output = JsonOutput {
        played: results.played,
        a_wins: results.a_wins,
        b_wins: results.b_wins,
        draws: results.draws,
        a_win_rate: percent(results.a_wins, results.played) / 100.0,
        knockouts: results.knockouts,
        time_decisions: results.time_decisions,
        sudden_deaths: results.sudden_deaths,
        stalled: results.stalled,
        avg_duration_ms: results.avg_duration_ms,
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

fn print_text_results(results: &BalanceResults) {
    let total = results.played;

    println!("\n=== Balance Results ===");
    println!("Matches played: {}", total);
    println!("Bot A wins:     {} ({:.1}%)", results.a_wins, percent(results.a_wins, total));
    println!("Bot B wins:     {} ({:.1}%)", results.b_wins, percent(results.b_wins, total));
    if results.draws > 0 {
        println!("Draws:          {}", results.draws);
    }
    println!("\nEndings:");
    println!("  Knockout:      {} ({:.1}%)", results.knockouts, percent(results.knockouts, total));
    println!(
        "  Time decision: {} ({:.1}%)",
        results.time_decisions,
        percent(results.time_decisions, total)
    );
    println!(
        "  Sudden death:  {} ({:.1}%)",
        results.sudden_deaths,
        percent(results.sudden_deaths, total)
    );
    if results.stalled > 0 {
        println!("  Stalled:       {}", results.stalled);
    }
    println!("Avg duration:   {:.1}s", results.avg_duration_ms / 1000.0);
}

// ============================================================================
// TESTS
// ============================================================================
