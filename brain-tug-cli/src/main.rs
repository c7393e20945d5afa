//! Brain Tug CLI - Command-line interface
//!
//! Commands:
//! - duel: Play a single bot-vs-bot match
//! - tournament: Create, play and inspect a persistent tournament
//! - balance: Play many matches in parallel to check tuning

mod balance_cmd;
mod duel_cmd;
mod presenter;
mod tournament_cmd;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use brain_tug_core::{GameMode, MatchConfig};
use brain_tug_tournament::BotProfile;

#[derive(Parser)]
#[command(name = "brain-tug")]
#[command(about = "Brain Tug two-player trivia duel and tournament runner")]
struct Cli {
    /// Random seed for deterministic runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Match configuration JSON file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single bot-vs-bot match
    Duel(duel_cmd::DuelArgs),
    /// Manage the active tournament
    Tournament(tournament_cmd::TournamentArgs),
    /// Play many matches in parallel and report how they end
    Balance(balance_cmd::BalanceArgs),
}

/// Question set selectable on the command line
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    Math,
    Vocabulary,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Math => GameMode::Math,
            ModeArg::Vocabulary => GameMode::Vocabulary,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Duel(args) => duel_cmd::run(args, config, cli.seed),
        Commands::Tournament(args) => tournament_cmd::run(args, config, cli.seed),
        Commands::Balance(args) => balance_cmd::run(args, config, cli.seed),
    }
}

/// Match configuration from a file, or the defaults
fn load_config(path: Option<&Path>) -> Result<MatchConfig> {
    match path {
        Some(path) => MatchConfig::load(path)
            .with_context(|| format!("Failed to load match config: {}", path.display())),
        None => Ok(MatchConfig::default()),
    }
}

/// Parse a `NAME=ACCURACY` bot override
pub fn parse_bot_spec(spec: &str) -> Result<(String, BotProfile)> {
    let (name, accuracy) = spec
        .split_once('=')
        .with_context(|| format!("Expected NAME=ACCURACY, got {:?}", spec))?;
    let accuracy: f64 = accuracy
        .trim()
        .parse()
        .with_context(|| format!("Invalid accuracy in {:?}", spec))?;
    if !(0.0..=1.0).contains(&accuracy) {
        anyhow::bail!("Accuracy must be between 0 and 1, got {}", accuracy);
    }
    Ok((name.trim().to_string(), BotProfile::new(accuracy)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bot_spec() {
        let (name, profile) = parse_bot_spec("Ada = 0.95").unwrap();
        assert_eq!(name, "Ada");
        assert_eq!(profile.accuracy, 0.95);

        assert!(parse_bot_spec("Ada").is_err());
        assert!(parse_bot_spec("Ada=fast").is_err());
        assert!(parse_bot_spec("Ada=1.5").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "brain-tug", "--seed", "7", "duel", "--p1", "Ada", "--p2", "Bob",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(7));
        assert!(matches!(cli.command, Commands::Duel(_)));
    }
}
