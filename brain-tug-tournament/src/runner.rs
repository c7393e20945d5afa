//! Match runner - plays matches between bots on virtual time
//!
//! Level 2 - Phases

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;

use brain_tug_core::{
    GameMode, MatchConfig, MatchEngine, MatchOutcome, NullPresenter, PlayerId, Presenter,
    TournamentContext,
};

use crate::bot::{digits, BotProfile};
use crate::error::TournamentError;

/// Default wake-up limit before a match is declared stalled
pub const DEFAULT_MAX_ACTIONS: usize = 10_000;

/// Anything that can play a bracket match to completion
pub trait MatchHost {
    fn play_match(
        &mut self,
        p1: &str,
        p2: &str,
        context: Option<TournamentContext>,
    ) -> Result<MatchOutcome, TournamentError>;
}

/// An answer a bot has decided on but not yet typed
#[derive(Clone, Debug)]
struct PendingAnswer {
    at_ms: u64,
    answer: u32,
}

/// Drives a [`MatchEngine`] with bot players.
///
/// The engine is reused for every match, like a single game screen hosting a
/// whole tournament.
pub struct MatchRunner<P: Presenter = NullPresenter> {
    engine: MatchEngine<P>,
    rng: ChaCha8Rng,
    roster: FxHashMap<String, BotProfile>,
    default_bot: BotProfile,
    max_actions: usize,
}

impl MatchRunner<NullPresenter> {
    /// Runner without any presentation
    pub fn headless(config: MatchConfig, mode: GameMode, seed: u64) -> Self {
        Self::new(config, mode, NullPresenter, seed)
    }
}

impl<P: Presenter> MatchRunner<P> {
    pub fn new(config: MatchConfig, mode: GameMode, presenter: P, seed: u64) -> Self {
        Self {
            engine: MatchEngine::new(config, mode, presenter).with_seed(seed),
            rng: ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
            roster: FxHashMap::default(),
            default_bot: BotProfile::default(),
            max_actions: DEFAULT_MAX_ACTIONS,
        }
    }

    /// Give the named player a specific profile
    pub fn with_bot(mut self, name: &str, profile: BotProfile) -> Self {
        self.roster.insert(name.to_string(), profile);
        self
    }

    /// Profile for players without their own entry
    pub fn with_default_bot(mut self, profile: BotProfile) -> Self {
        self.default_bot = profile;
        self
    }

    pub fn with_max_actions(mut self, max_actions: usize) -> Self {
        self.max_actions = max_actions;
        self
    }

    pub fn engine(&self) -> &MatchEngine<P> {
        &self.engine
    }

    pub fn bot_for(&self, name: &str) -> &BotProfile {
        self.roster.get(name).unwrap_or(&self.default_bot)
    }

    // ========================================================================
    // LEVEL 2 - MATCH LOOP
    // ========================================================================

    /// Play one match from countdown to result.
    ///
    /// Each step jumps virtual time to the earlier of the next engine timer
    /// and the next bot answer. The match is aborted and reported stalled
    /// after `max_actions` steps.
    pub fn run(
        &mut self,
        p1: &str,
        p2: &str,
        context: Option<TournamentContext>,
    ) -> Result<MatchOutcome, TournamentError> {
        let bots = [self.bot_for(p1).clone(), self.bot_for(p2).clone()];
        let mut pending: [Option<PendingAnswer>; 2] = [None, None];

        self.engine.start_match(p1, p2, context);

        for _ in 0..self.max_actions {
            if let Some(outcome) = self.engine.outcome() {
                return Ok(outcome.clone());
            }

            self.plan_answers(&bots, &mut pending);

            let next_answer = pending.iter().flatten().map(|p| p.at_ms).min();
            let next = match (self.engine.next_event_due(), next_answer) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => break,
            };
            self.engine.advance_to(next);

            for player in PlayerId::BOTH {
                let slot = &mut pending[player_index(player)];
                if slot.as_ref().is_some_and(|p| p.at_ms <= next) {
                    if let Some(plan) = slot.take() {
                        self.type_answer(player, plan.answer)?;
                    }
                }
            }
        }

        if let Some(outcome) = self.engine.outcome() {
            return Ok(outcome.clone());
        }
        tracing::warn!(
            "{} vs {} stalled after {} steps, aborting",
            p1,
            p2,
            self.max_actions
        );
        self.engine.abort();
        Err(TournamentError::MatchStalled(self.max_actions))
    }

    // ========================================================================
    // LEVEL 3 - STEPS
    // ========================================================================

    /// Decide answers for every unfrozen player who has a question and no plan
    fn plan_answers(&mut self, bots: &[BotProfile; 2], pending: &mut [Option<PendingAnswer>; 2]) {
        if !self.engine.is_active() {
            return;
        }
        let now = self.engine.now();
        for player in PlayerId::BOTH {
            let i = player_index(player);
            if pending[i].is_some() {
                continue;
            }
            let session = self.engine.session(player);
            if session.frozen {
                continue;
            }
            let Some(question) = &session.current_question else {
                continue;
            };
            let answer = bots[i].choose_answer(&mut self.rng, question);
            let at_ms = now + bots[i].think_time(&mut self.rng);
            pending[i] = Some(PendingAnswer { at_ms, answer });
        }
    }

    fn type_answer(&mut self, player: PlayerId, answer: u32) -> Result<(), TournamentError> {
        if !self.engine.is_active() || self.engine.session(player).frozen {
            return Ok(());
        }
        for digit in digits(answer) {
            self.engine.on_digit(player, digit)?;
        }
        Ok(())
    }
}

impl<P: Presenter> MatchHost for MatchRunner<P> {
    fn play_match(
        &mut self,
        p1: &str,
        p2: &str,
        context: Option<TournamentContext>,
    ) -> Result<MatchOutcome, TournamentError> {
        self.run(p1, p2, context)
    }
}

fn player_index(player: PlayerId) -> usize {
    match player {
        PlayerId::P1 => 0,
        PlayerId::P2 => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_tug_core::{EndReason, MatchPhase};

    use crate::tournament::Tournament;

    fn runner(seed: u64) -> MatchRunner {
        MatchRunner::headless(MatchConfig::default(), GameMode::Math, seed)
    }

    #[test]
    fn test_strong_bot_wins_by_knockout() {
        let mut runner = runner(7)
            .with_bot("Ace", BotProfile::new(1.0).with_think_range(400, 600))
            .with_bot("Dud", BotProfile::new(0.0));

        let outcome = runner.run("Ace", "Dud", None).unwrap();
        assert_eq!(outcome.winner, Some(PlayerId::P1));
        assert_eq!(outcome.winner_name(), Some("Ace"));
        assert_eq!(outcome.reason, EndReason::Knockout);
        assert_eq!(outcome.final_tug, 0);
        assert_eq!(outcome.p2.score, 0);
    }

    #[test]
    fn test_same_seed_same_match() {
        let a = runner(11).run("Ada", "Bob", None).unwrap();
        let b = runner(11).run("Ada", "Bob", None).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_vocabulary_match_finishes() {
        let mut runner = MatchRunner::headless(MatchConfig::default(), GameMode::Vocabulary, 5)
            .with_bot("Ada", BotProfile::new(1.0));
        let outcome = runner.run("Ada", "Bob", None).unwrap();
        assert!(outcome.winner.is_some());
        assert!(outcome.p1.score > 0);
    }

    #[test]
    fn test_step_limit_reports_stall() {
        let mut runner = runner(3).with_max_actions(5);
        assert!(matches!(
            runner.run("Ada", "Bob", None),
            Err(TournamentError::MatchStalled(5))
        ));
        assert_eq!(runner.engine().phase(), MatchPhase::Idle);
    }

    #[test]
    fn test_mirrored_bots_never_break_sudden_death() {
        // Both answer correctly at the same instant, so the rope returns to center
        let twin = BotProfile::new(1.0).with_think_range(59_000, 59_000);
        let mut runner = runner(9)
            .with_default_bot(twin)
            .with_max_actions(500);
        assert!(matches!(
            runner.run("Ada", "Bob", None),
            Err(TournamentError::MatchStalled(500))
        ));
    }

    #[test]
    fn test_runner_plays_full_tournament() {
        let mut tournament = Tournament::new(GameMode::Math);
        for name in ["Ace", "B", "C", "D", "E", "F"] {
            tournament.add_player(name).unwrap();
        }
        tournament.seed_in_order().unwrap();

        let mut runner = runner(21)
            .with_bot("Ace", BotProfile::new(1.0).with_think_range(300, 500))
            .with_default_bot(BotProfile::new(0.0));
        while !tournament.is_complete() {
            tournament.play_next(&mut runner).unwrap();
        }
        assert_eq!(tournament.champion(), Some("Ace"));
    }
}
