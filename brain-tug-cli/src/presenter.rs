//! Presenter that narrates a match through tracing

use brain_tug_core::{
    CountdownStep, Feedback, MatchOutcome, PlayerId, Presenter, Question, SoundEvent,
};

/// Logs match events; per-answer detail goes to `debug`
#[derive(Clone, Debug, Default)]
pub struct LogPresenter {
    names: [String; 2],
}

impl LogPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    fn name(&self, player: PlayerId) -> &str {
        match player {
            PlayerId::P1 => &self.names[0],
            PlayerId::P2 => &self.names[1],
        }
    }
}

impl Presenter for LogPresenter {
    fn render_names(&mut self, p1: &str, p2: &str) {
        self.names = [p1.to_string(), p2.to_string()];
    }

    fn render_question(&mut self, player: PlayerId, question: &Question) {
        match question.options() {
            Some([a, b, c]) => tracing::debug!(
                "{} gets {} [1:{} 2:{} 3:{}]",
                self.name(player),
                question.text,
                a,
                b,
                c
            ),
            None => tracing::debug!("{} gets {} = ?", self.name(player), question.text),
        }
    }

    fn render_tug(&mut self, value: i32) {
        tracing::debug!("Rope at {}", value);
    }

    fn show_countdown(&mut self, step: CountdownStep) {
        tracing::debug!("Countdown: {:?}", step);
    }

    fn show_freeze(&mut self, player: PlayerId, frozen: bool) {
        if frozen {
            tracing::info!("{} is frozen", self.name(player));
        }
    }

    fn show_combo(&mut self, player: PlayerId, active: bool) {
        if active {
            tracing::info!("{} is on a combo", self.name(player));
        }
    }

    fn show_feedback(&mut self, player: PlayerId, feedback: Option<Feedback>) {
        if let Some(feedback) = feedback {
            tracing::debug!("{}: {:?}", self.name(player), feedback);
        }
    }

    fn show_sudden_death(&mut self) {
        tracing::info!("SUDDEN DEATH");
    }

    fn play_sound(&mut self, event: SoundEvent) {
        tracing::trace!("Sound: {:?}", event);
    }

    fn show_winner(&mut self, outcome: &MatchOutcome) {
        match outcome.winner_name() {
            Some(name) => tracing::info!("{} wins ({})", name, outcome.reason),
            None => tracing::info!("No winner ({})", outcome.reason),
        }
    }
}
