//! Simulated players
//!
//! Level 4 - Utilities

use rand::Rng;
use serde::{Deserialize, Serialize};

use brain_tug_core::Question;

/// How a bot plays: how often it is right and how long it thinks
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotProfile {
    /// Probability of a correct answer (0.0 to 1.0)
    pub accuracy: f64,
    pub min_think_ms: u64,
    pub max_think_ms: u64,
}

impl Default for BotProfile {
    fn default() -> Self {
        Self {
            accuracy: 0.8,
            min_think_ms: 800,
            max_think_ms: 2500,
        }
    }
}

impl BotProfile {
    pub fn new(accuracy: f64) -> Self {
        Self {
            accuracy,
            ..Default::default()
        }
    }

    pub fn with_think_range(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.min_think_ms = min_ms;
        self.max_think_ms = max_ms;
        self
    }

    /// Delay before the bot types its answer
    pub fn think_time<R: Rng>(&self, rng: &mut R) -> u64 {
        let lo = self.min_think_ms.min(self.max_think_ms);
        let hi = self.min_think_ms.max(self.max_think_ms);
        rng.gen_range(lo..=hi)
    }

    /// The answer the bot will type for `question`
    pub fn choose_answer<R: Rng>(&self, rng: &mut R, question: &Question) -> u32 {
        if rng.gen_bool(self.accuracy.clamp(0.0, 1.0)) {
            question.correct_answer
        } else {
            question.decoy_answer()
        }
    }
}

/// Digits of `answer`, most significant first
pub(crate) fn digits(answer: u32) -> Vec<u8> {
    answer.to_string().bytes().map(|b| b - b'0').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_tug_core::question::Operation;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_think_time_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let bot = BotProfile::default().with_think_range(300, 700);
        for _ in 0..200 {
            let t = bot.think_time(&mut rng);
            assert!((300..=700).contains(&t));
        }

        let reversed = BotProfile::default().with_think_range(900, 100);
        assert!((100..=900).contains(&reversed.think_time(&mut rng)));
    }

    #[test]
    fn test_accuracy_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let question = Question::math(Operation::Multiply, 7, 8);

        let perfect = BotProfile::new(1.0);
        let hopeless = BotProfile::new(0.0);
        for _ in 0..50 {
            assert_eq!(perfect.choose_answer(&mut rng, &question), 56);
            assert_eq!(hopeless.choose_answer(&mut rng, &question), 57);
        }

        let overconfident = BotProfile::new(3.0);
        assert_eq!(overconfident.choose_answer(&mut rng, &question), 56);
    }

    #[test]
    fn test_digits() {
        assert_eq!(digits(0), vec![0]);
        assert_eq!(digits(7), vec![7]);
        assert_eq!(digits(144), vec![1, 4, 4]);
    }
}
