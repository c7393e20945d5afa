//! Duel command - play one match between two bots
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_duel(), report_results()
//! - Level 4: formatting utilities

use anyhow::{Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use brain_tug_core::{MatchConfig, MatchOutcome, TournamentContext};
use brain_tug_tournament::{BotProfile, MatchRunner};

use crate::presenter::LogPresenter;
use crate::ModeArg;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct DuelArgs {
    /// Left player name
    #[arg(long, default_value = "Player 1")]
    pub p1: String,

    /// Right player name
    #[arg(long, default_value = "Player 2")]
    pub p2: String,

    /// Question set
    #[arg(long, value_enum, default_value = "math")]
    pub mode: ModeArg,

    /// Chance the left bot answers correctly
    #[arg(long, default_value = "0.8")]
    pub p1_accuracy: f64,

    /// Chance the right bot answers correctly
    #[arg(long, default_value = "0.8")]
    pub p2_accuracy: f64,

    /// Play as a tournament match with this many rounds left (1 = final)
    #[arg(long)]
    pub rounds_remaining: Option<usize>,

    /// Override the match length from the config
    #[arg(long)]
    pub seconds: Option<u32>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run duel command
pub fn run(args: DuelArgs, config: MatchConfig, seed: Option<u64>) -> Result<()> {
    let outcome = play_duel(&args, config, seed)?;
    report_results(&outcome, &args);
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_duel(args: &DuelArgs, config: MatchConfig, seed: Option<u64>) -> Result<MatchOutcome> {
    let match_seed = create_rng(seed).gen::<u64>();
    let context = args
        .rounds_remaining
        .map(|rounds_remaining| TournamentContext { rounds_remaining });
    let config = match args.seconds {
        Some(seconds) => config.with_match_seconds(seconds),
        None => config,
    };

    let mut runner = MatchRunner::new(config, args.mode.into(), LogPresenter::new(), match_seed)
        .with_bot(&args.p1, BotProfile::new(args.p1_accuracy))
        .with_bot(&args.p2, BotProfile::new(args.p2_accuracy));

    runner
        .run(&args.p1, &args.p2, context)
        .with_context(|| format!("Duel {} vs {} did not finish", args.p1, args.p2))
}

fn report_results(outcome: &MatchOutcome, args: &DuelArgs) {
    if args.json {
        print_json_results(outcome);
    } else {
        print_text_results(outcome);
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

fn print_json_results(outcome: &MatchOutcome) {
    if let Ok(json) = serde_json::to_string_pretty(outcome) {
        println!("{}", json);
    }
}

fn print_text_results(outcome: &MatchOutcome) {
    println!("\n=== Duel Result ===");
    if outcome.is_draw() {
        println!("Result:   draw ({})", outcome.reason);
    } else if let Some(name) = outcome.winner_name() {
        println!("Winner:   {} by {}", name, outcome.reason);
    }
    println!("Rope:     {}", outcome.final_tug);
    println!("Duration: {:.1}s", outcome.duration_ms as f64 / 1000.0);
    for summary in [&outcome.p1, &outcome.p2] {
        let answers = summary.answer_times_ms.len();
        let avg = if answers > 0 {
            summary.answer_times_ms.iter().sum::<u64>() as f64 / answers as f64
        } else {
            0.0
        };
        println!(
            "  {:<12} {:>3} correct {:>3} wrong  avg {:.0}ms",
            summary.name, summary.score, summary.wrong, avg
        );
    }
}
