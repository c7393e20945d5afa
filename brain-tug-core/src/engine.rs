//! Match engine - the per-match state machine
//!
//! `Idle -> Countdown -> Running -> (SuddenDeath) -> Ended`
//!
//! Time only moves when the caller calls [`MatchEngine::advance`]; input arrives
//! through [`MatchEngine::on_digit`] and [`MatchEngine::on_clear`]. Each event
//! runs to completion before the next one is processed.

use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::clock::{Scheduler, TimerId};
use crate::config::MatchConfig;
use crate::error::EngineError;
use crate::player::{PlayerId, PlayerPair, PlayerSession};
use crate::presenter::{CountdownStep, Feedback, NullPresenter, Presenter, SoundEvent};
use crate::question::{generate_avoiding, GameMode};

// ============================================================================
// CONSTANTS
// ============================================================================

pub const TUG_MIN: i32 = 0;
pub const TUG_CENTER: i32 = 50;
pub const TUG_MAX: i32 = 100;

const SECOND_MS: u64 = 1000;

// ============================================================================
// TYPES
// ============================================================================

/// Where a tournament match sits relative to the final
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentContext {
    /// Rounds left including the current one (the final has 1)
    pub rounds_remaining: usize,
}

impl TournamentContext {
    /// Late rounds start harder
    pub fn starting_difficulty(&self) -> u8 {
        match self.rounds_remaining {
            0..=2 => 3,
            3 => 2,
            _ => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchPhase {
    Idle,
    Countdown,
    Running,
    SuddenDeath,
    Ended,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    Knockout,
    TimeDecision,
    SuddenDeathVictory,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EndReason::Knockout => "knockout",
            EndReason::TimeDecision => "time decision",
            EndReason::SuddenDeathVictory => "sudden death victory",
        };
        f.write_str(text)
    }
}

/// Per-player numbers copied out when a match ends
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub score: u32,
    pub wrong: u32,
    pub answer_times_ms: Vec<u64>,
}

impl PlayerSummary {
    fn from_session(session: &PlayerSession) -> Self {
        Self {
            name: session.name.clone(),
            score: session.score,
            wrong: session.wrong,
            answer_times_ms: session.answer_times_ms.clone(),
        }
    }
}

/// Final result of a match
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// `None` for a draw
    pub winner: Option<PlayerId>,
    pub reason: EndReason,
    pub final_tug: i32,
    /// Time from "FIGHT" to the end
    pub duration_ms: u64,
    pub p1: PlayerSummary,
    pub p2: PlayerSummary,
}

impl MatchOutcome {
    pub fn summary(&self, player: PlayerId) -> &PlayerSummary {
        match player {
            PlayerId::P1 => &self.p1,
            PlayerId::P2 => &self.p2,
        }
    }

    pub fn winner_name(&self) -> Option<&str> {
        self.winner.map(|p| self.summary(p).name.as_str())
    }

    pub fn loser_name(&self) -> Option<&str> {
        self.winner.map(|p| self.summary(p.opponent()).name.as_str())
    }

    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }
}

/// Live match numbers
#[derive(Clone, Debug)]
pub struct MatchState {
    pub active: bool,
    pub difficulty: u8,
    pub seconds_remaining: u32,
    /// 0 = player 1 wins, 100 = player 2 wins
    pub tug: i32,
    pub sudden_death: bool,
    pub players: PlayerPair,
}

impl MatchState {
    fn new(p1: &str, p2: &str, difficulty: u8, seconds: u32) -> Self {
        Self {
            active: false,
            difficulty,
            seconds_remaining: seconds,
            tug: TUG_CENTER,
            sudden_death: false,
            players: PlayerPair::new(PlayerSession::new(p1), PlayerSession::new(p2)),
        }
    }

    /// Player the rope currently leans toward
    pub fn leader(&self) -> Option<PlayerId> {
        match self.tug.cmp(&TUG_CENTER) {
            std::cmp::Ordering::Less => Some(PlayerId::P1),
            std::cmp::Ordering::Greater => Some(PlayerId::P2),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerEvent {
    Countdown(u8),
    Tick,
    Unfreeze(PlayerId),
    ClearFeedback(PlayerId),
}

/// Timer event tagged with the match it belongs to
#[derive(Clone, Copy, Debug)]
struct Scheduled {
    epoch: u64,
    event: TimerEvent,
}

// ============================================================================
// ENGINE
// ============================================================================

pub struct MatchEngine<P: Presenter = NullPresenter> {
    config: MatchConfig,
    mode: GameMode,
    presenter: P,
    rng: ChaCha8Rng,
    scheduler: Scheduler<Scheduled>,
    /// Incremented per match; events from older matches are dropped
    epoch: u64,
    phase: MatchPhase,
    state: MatchState,
    outcome: Option<MatchOutcome>,
    started_at: u64,
    tick_timer: Option<TimerId>,
    feedback_timers: [Option<TimerId>; 2],
}

impl MatchEngine<NullPresenter> {
    /// Engine without any presentation
    pub fn headless(config: MatchConfig, mode: GameMode) -> Self {
        Self::new(config, mode, NullPresenter)
    }
}

impl<P: Presenter> MatchEngine<P> {
    pub fn new(config: MatchConfig, mode: GameMode, presenter: P) -> Self {
        let state = MatchState::new("", "", 1, config.match_seconds);
        Self {
            config,
            mode,
            presenter,
            rng: ChaCha8Rng::from_entropy(),
            scheduler: Scheduler::new(),
            epoch: 0,
            phase: MatchPhase::Idle,
            state,
            outcome: None,
            started_at: 0,
            tick_timer: None,
            feedback_timers: [None, None],
        }
    }

    /// Use a fixed seed for question generation
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn session(&self, player: PlayerId) -> &PlayerSession {
        self.state.players.get(player)
    }

    pub fn outcome(&self) -> Option<&MatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Current virtual time in milliseconds
    pub fn now(&self) -> u64 {
        self.scheduler.now()
    }

    /// Due time of the next timer event, if any
    pub fn next_event_due(&self) -> Option<u64> {
        self.scheduler.next_due()
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    // ========================================================================
    // LIFECYCLE
    // ========================================================================

    /// Prepare a new match and start its countdown.
    ///
    /// Any timer from a previous match is cancelled. Blank names are replaced
    /// with "Player 1" / "Player 2".
    pub fn start_match(&mut self, p1: &str, p2: &str, context: Option<TournamentContext>) {
        self.cancel_all_timers();

        let p1 = display_name(p1, "Player 1");
        let p2 = display_name(p2, "Player 2");
        let difficulty = context
            .map(|c| c.starting_difficulty())
            .unwrap_or(1)
            .min(self.config.max_difficulty);

        self.state = MatchState::new(&p1, &p2, difficulty, self.config.match_seconds);
        self.outcome = None;
        self.phase = MatchPhase::Countdown;

        tracing::info!(
            "Match starting: {} vs {} ({:?}, difficulty {})",
            p1,
            p2,
            self.mode,
            difficulty
        );

        self.presenter.render_names(&p1, &p2);
        for player in PlayerId::BOTH {
            self.presenter.render_score(player, 0);
            self.presenter.show_freeze(player, false);
            self.presenter.show_combo(player, false);
            self.presenter.show_feedback(player, None);
        }
        self.presenter.render_timer(self.state.seconds_remaining);
        self.presenter.render_tug(self.state.tug);

        self.countdown(self.config.countdown_seconds);
    }

    /// Abandon the current match without a result
    pub fn abort(&mut self) {
        if self.phase != MatchPhase::Idle {
            tracing::info!("Match aborted in phase {:?}", self.phase);
        }
        self.cancel_all_timers();
        self.state.active = false;
        self.outcome = None;
        self.phase = MatchPhase::Idle;
    }

    /// Advance virtual time by `ms`, firing every timer that falls due
    pub fn advance(&mut self, ms: u64) {
        let target = self.now() + ms;
        self.advance_to(target);
    }

    /// Advance virtual time to an absolute instant
    pub fn advance_to(&mut self, target_ms: u64) {
        while let Some(scheduled) = self.scheduler.pop_due(target_ms) {
            if scheduled.epoch == self.epoch {
                self.handle(scheduled.event);
            }
        }
        self.scheduler.set_now(target_ms);
    }

    // ========================================================================
    // INPUT
    // ========================================================================

    /// A player pressed a digit key
    pub fn on_digit(&mut self, player: PlayerId, digit: u8) -> Result<(), EngineError> {
        if digit > 9 {
            tracing::warn!("{:?} sent invalid digit {}", player, digit);
            return Err(EngineError::InvalidDigit(digit));
        }
        if !self.accepts_input(player) {
            return Ok(());
        }

        let session = self.state.players.get_mut(player);
        let complete = session.push_digit(digit);
        self.presenter
            .render_answer_buffer(player, &self.state.players.get(player).answer_buffer);

        if complete {
            self.validate(player);
        }
        Ok(())
    }

    /// A player pressed their clear key
    pub fn on_clear(&mut self, player: PlayerId) {
        if !self.accepts_input(player) {
            return;
        }
        self.state.players.get_mut(player).clear_buffer();
        self.presenter.render_answer_buffer(player, "");
    }

    fn accepts_input(&self, player: PlayerId) -> bool {
        self.state.active && !self.state.players.get(player).frozen
    }

    // ========================================================================
    // TIMER EVENTS
    // ========================================================================

    fn handle(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::Countdown(remaining) => self.countdown(remaining),
            TimerEvent::Tick => self.tick(),
            TimerEvent::Unfreeze(player) => self.unfreeze(player),
            TimerEvent::ClearFeedback(player) => {
                *self.feedback_timer(player) = None;
                if self.state.active {
                    self.presenter.show_feedback(player, None);
                }
            }
        }
    }

    fn countdown(&mut self, remaining: u8) {
        if self.phase != MatchPhase::Countdown {
            return;
        }
        self.presenter
            .show_countdown(CountdownStep::from_remaining(remaining));
        if remaining == 0 {
            self.begin_running();
        } else {
            self.presenter.play_sound(SoundEvent::Countdown);
            self.schedule(SECOND_MS, TimerEvent::Countdown(remaining - 1));
        }
    }

    fn begin_running(&mut self) {
        self.phase = MatchPhase::Running;
        self.state.active = true;
        self.started_at = self.now();
        self.presenter.play_sound(SoundEvent::MatchStart);

        for player in PlayerId::BOTH {
            self.next_question(player);
        }
        self.tick_timer = Some(self.schedule(SECOND_MS, TimerEvent::Tick));
    }

    fn tick(&mut self) {
        self.tick_timer = None;
        if !self.state.active || self.state.sudden_death {
            return;
        }

        self.state.seconds_remaining = self.state.seconds_remaining.saturating_sub(1);
        let seconds = self.state.seconds_remaining;
        self.presenter.render_timer(seconds);

        if self.config.ramp_interval_secs > 0
            && seconds % self.config.ramp_interval_secs == 0
            && self.state.difficulty < self.config.max_difficulty
        {
            self.state.difficulty += 1;
            tracing::debug!("Difficulty raised to {}", self.state.difficulty);
        }

        if seconds == 0 {
            if self.state.tug == TUG_CENTER {
                self.enter_sudden_death();
            } else {
                self.end_match(EndReason::TimeDecision);
            }
        } else {
            self.tick_timer = Some(self.schedule(SECOND_MS, TimerEvent::Tick));
        }
    }

    fn enter_sudden_death(&mut self) {
        tracing::info!("Time expired on a dead-even rope, sudden death");
        self.state.sudden_death = true;
        self.phase = MatchPhase::SuddenDeath;
        self.presenter.show_sudden_death();
        self.presenter.play_sound(SoundEvent::SuddenDeath);
    }

    fn unfreeze(&mut self, player: PlayerId) {
        if !self.state.active {
            return;
        }
        self.state.players.get_mut(player).frozen = false;
        self.presenter.show_freeze(player, false);
        tracing::debug!("{:?} unfrozen", player);
    }

    // ========================================================================
    // SCORING
    // ========================================================================

    fn validate(&mut self, player: PlayerId) {
        let now = self.now();
        let session = self.state.players.get_mut(player);
        let correct = match (&session.current_question, session.buffered_answer()) {
            (Some(question), Some(answer)) => question.is_correct(answer),
            _ => false,
        };
        let elapsed = session.elapsed_on_question(now);
        session.answer_times_ms.push(elapsed);

        tracing::debug!(
            "{:?} answered {} ({}) in {}ms",
            player,
            session.answer_buffer,
            if correct { "correct" } else { "wrong" },
            elapsed
        );

        if correct {
            self.apply_correct(player);
        } else {
            self.apply_wrong(player, now);
        }

        self.state.players.get_mut(player).clear_buffer();
        self.presenter.render_answer_buffer(player, "");
        self.flash_feedback(player, if correct { Feedback::Correct } else { Feedback::Wrong });

        if self.check_knockout() {
            return;
        }
        self.next_question(player);
    }

    fn apply_correct(&mut self, player: PlayerId) {
        let far_behind = self.is_far_behind(player);
        let session = self.state.players.get_mut(player);
        session.score += 1;
        session.streak += 1;

        let mut power = self.config.base_power;
        let combo_started = session.streak >= self.config.combo_streak && !session.combo;
        if session.streak >= self.config.combo_streak {
            power = self.config.combo_power;
            session.combo = true;
        }
        if far_behind {
            power += self.config.comeback_bonus;
        }
        let score = session.score;

        self.presenter.render_score(player, score);
        self.presenter.play_sound(SoundEvent::Correct);
        if combo_started {
            self.presenter.show_combo(player, true);
        }
        self.shift_tug(player.pull_sign() * power);
    }

    fn apply_wrong(&mut self, player: PlayerId, now: u64) {
        let session = self.state.players.get_mut(player);
        session.streak = 0;
        session.wrong += 1;
        let combo_lost = session.combo;
        session.combo = false;
        let tripped = session.record_mistake(
            now,
            self.config.freeze_mistakes,
            self.config.mistake_window_ms,
        );

        if combo_lost {
            self.presenter.show_combo(player, false);
        }
        self.presenter.play_sound(SoundEvent::Wrong);
        self.shift_tug(player.opponent().pull_sign() * self.config.wrong_penalty);

        if tripped {
            self.freeze(player);
        }
    }

    /// Scorer is deep on their own losing side
    fn is_far_behind(&self, player: PlayerId) -> bool {
        match player {
            PlayerId::P1 => self.state.tug > TUG_MAX - self.config.comeback_margin,
            PlayerId::P2 => self.state.tug < TUG_MIN + self.config.comeback_margin,
        }
    }

    fn freeze(&mut self, player: PlayerId) {
        tracing::debug!("{:?} frozen for {}ms", player, self.config.freeze_ms);
        self.state.players.get_mut(player).frozen = true;
        self.presenter.show_freeze(player, true);
        self.presenter.play_sound(SoundEvent::Freeze);
        self.schedule(self.config.freeze_ms, TimerEvent::Unfreeze(player));
    }

    fn shift_tug(&mut self, delta: i32) {
        self.state.tug = (self.state.tug + delta).clamp(TUG_MIN, TUG_MAX);
        self.presenter.render_tug(self.state.tug);
    }

    /// End the match if the rope hit either edge
    fn check_knockout(&mut self) -> bool {
        if self.state.tug > TUG_MIN && self.state.tug < TUG_MAX {
            return false;
        }
        let reason = if self.state.sudden_death {
            EndReason::SuddenDeathVictory
        } else {
            EndReason::Knockout
        };
        self.end_match(reason);
        true
    }

    fn end_match(&mut self, reason: EndReason) {
        self.state.active = false;
        self.phase = MatchPhase::Ended;
        if let Some(id) = self.tick_timer.take() {
            self.scheduler.cancel(id);
        }

        let outcome = MatchOutcome {
            winner: self.state.leader(),
            reason,
            final_tug: self.state.tug,
            duration_ms: self.now().saturating_sub(self.started_at),
            p1: PlayerSummary::from_session(self.state.players.get(PlayerId::P1)),
            p2: PlayerSummary::from_session(self.state.players.get(PlayerId::P2)),
        };

        tracing::info!(
            "Match over: {} by {} (tug {}, {} - {})",
            outcome.winner_name().unwrap_or("draw"),
            reason,
            outcome.final_tug,
            outcome.p1.score,
            outcome.p2.score
        );

        self.presenter.play_sound(SoundEvent::Win);
        self.presenter.show_winner(&outcome);
        self.outcome = Some(outcome);
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn next_question(&mut self, player: PlayerId) {
        let now = self.now();
        let question = generate_avoiding(
            &mut self.rng,
            self.mode,
            self.state.difficulty,
            self.state.players.get(player.opponent()).current_question.as_ref(),
        );
        self.presenter.render_question(player, &question);
        self.state.players.get_mut(player).set_question(question, now);
    }

    fn flash_feedback(&mut self, player: PlayerId, feedback: Feedback) {
        if let Some(id) = self.feedback_timer(player).take() {
            self.scheduler.cancel(id);
        }
        self.presenter.show_feedback(player, Some(feedback));
        let id = self.schedule(self.config.feedback_ms, TimerEvent::ClearFeedback(player));
        *self.feedback_timer(player) = Some(id);
    }

    fn feedback_timer(&mut self, player: PlayerId) -> &mut Option<TimerId> {
        match player {
            PlayerId::P1 => &mut self.feedback_timers[0],
            PlayerId::P2 => &mut self.feedback_timers[1],
        }
    }

    fn schedule(&mut self, delay_ms: u64, event: TimerEvent) -> TimerId {
        let epoch = self.epoch;
        self.scheduler.schedule(delay_ms, Scheduled { epoch, event })
    }

    fn cancel_all_timers(&mut self) {
        self.scheduler.clear();
        self.epoch += 1;
        self.tick_timer = None;
        self.feedback_timers = [None, None];
    }
}

fn display_name(name: &str, fallback: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
