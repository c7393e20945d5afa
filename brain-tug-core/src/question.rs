//! Question generation - math drills and vocabulary gaps
//!
//! Difficulty selects the operation mix and numeric ranges for math questions.
//! Vocabulary questions are drawn from the fixed dictionary in [`crate::words`].
//! Every question's answer is a non-negative integer; its digit count decides how
//! many keystrokes the match engine waits for before validating.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::words::WORDS;

/// Redraw attempts when a vocabulary word collides with the opponent's word
const MAX_VOCAB_REDRAWS: usize = 10;

/// Which question family a match uses
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Math,
    Vocabulary,
}

/// Arithmetic operation of a math question
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "x",
            Operation::Divide => "÷",
        }
    }

    fn apply(self, lhs: u32, rhs: u32) -> u32 {
        match self {
            Operation::Add => lhs + rhs,
            Operation::Subtract => lhs - rhs,
            Operation::Multiply => lhs * rhs,
            Operation::Divide => lhs / rhs,
        }
    }
}

/// Question payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestionKind {
    Math { op: Operation, lhs: u32, rhs: u32 },
    Vocabulary { word: String, options: [String; 3] },
}

/// A single question shown to one player
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub kind: QuestionKind,
    /// Text shown to the player ("7 x 8", "TI_ER")
    pub text: String,
    /// For vocabulary this is the 1-based option index, not the letter
    pub correct_answer: u32,
}

impl Question {
    /// Build a math question from its operands
    pub fn math(op: Operation, lhs: u32, rhs: u32) -> Self {
        Self {
            kind: QuestionKind::Math { op, lhs, rhs },
            text: format!("{} {} {}", lhs, op.symbol(), rhs),
            correct_answer: op.apply(lhs, rhs),
        }
    }

    fn vocabulary(index: usize) -> Self {
        let entry = &WORDS[index];
        Self {
            kind: QuestionKind::Vocabulary {
                word: entry.word.to_string(),
                options: entry.options.map(str::to_string),
            },
            text: entry.masked.to_string(),
            correct_answer: entry.answer as u32,
        }
    }

    /// Number of digits the player must type
    pub fn answer_len(&self) -> usize {
        self.correct_answer.to_string().len()
    }

    /// Candidate letters for vocabulary questions
    pub fn options(&self) -> Option<&[String; 3]> {
        match &self.kind {
            QuestionKind::Vocabulary { options, .. } => Some(options),
            QuestionKind::Math { .. } => None,
        }
    }

    pub fn is_correct(&self, answer: u32) -> bool {
        answer == self.correct_answer
    }

    /// A wrong answer with the same number of digits as the correct one
    pub fn decoy_answer(&self) -> u32 {
        let answer = self.correct_answer;
        match self.kind {
            QuestionKind::Vocabulary { .. } => answer % 3 + 1,
            QuestionKind::Math { .. } if answer < 10 => (answer + 1) % 10,
            QuestionKind::Math { .. } => answer - answer % 10 + (answer % 10 + 1) % 10,
        }
    }

    pub fn mode(&self) -> GameMode {
        match self.kind {
            QuestionKind::Math { .. } => GameMode::Math,
            QuestionKind::Vocabulary { .. } => GameMode::Vocabulary,
        }
    }
}

// ============================================================================
// GENERATION
// ============================================================================

/// Generate a question for the given mode and difficulty level
pub fn generate<R: Rng>(rng: &mut R, mode: GameMode, difficulty: u8) -> Question {
    generate_avoiding(rng, mode, difficulty, None)
}

/// Generate a question, trying not to repeat the opponent's current vocabulary word
pub fn generate_avoiding<R: Rng>(
    rng: &mut R,
    mode: GameMode,
    difficulty: u8,
    avoid: Option<&Question>,
) -> Question {
    match mode {
        GameMode::Math => generate_math(rng, difficulty),
        GameMode::Vocabulary => {
            let mut index = rng.gen_range(0..WORDS.len());
            if let Some(other) = avoid {
                let mut attempts = 1;
                while WORDS[index].masked == other.text && attempts < MAX_VOCAB_REDRAWS {
                    index = rng.gen_range(0..WORDS.len());
                    attempts += 1;
                }
            }
            Question::vocabulary(index)
        }
    }
}

fn generate_math<R: Rng>(rng: &mut R, difficulty: u8) -> Question {
    match difficulty {
        0 | 1 => {
            if rng.gen_bool(0.5) {
                Question::math(Operation::Add, draw(rng, 10), draw(rng, 10))
            } else {
                let minuend = draw(rng, 15) + 3;
                let subtrahend = draw(rng, minuend);
                Question::math(Operation::Subtract, minuend, subtrahend)
            }
        }
        2 => {
            if rng.gen_bool(0.6) {
                Question::math(Operation::Multiply, draw(rng, 9), draw(rng, 9))
            } else {
                Question::math(Operation::Add, rng.gen_range(0..=20), rng.gen_range(0..=20))
            }
        }
        _ => match rng.gen_range(0..4) {
            0 => {
                let divisor = rng.gen_range(2..=9);
                let dividend = divisor * draw(rng, 9);
                Question::math(Operation::Divide, dividend, divisor)
            }
            1 => Question::math(
                Operation::Multiply,
                rng.gen_range(2..=13),
                rng.gen_range(2..=13),
            ),
            _ => Question::math(Operation::Add, rng.gen_range(0..=49), rng.gen_range(0..=49)),
        },
    }
}

/// Uniform integer in `[1, n]`
fn draw<R: Rng>(rng: &mut R, n: u32) -> u32 {
    rng.gen_range(1..=n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_math_answers_valid_at_every_level() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for level in 1..=5 {
            for _ in 0..1000 {
                let q = generate(&mut rng, GameMode::Math, level);
                let QuestionKind::Math { op, lhs, rhs } = q.kind else {
                    panic!("math mode produced {:?}", q.kind);
                };
                match op {
                    Operation::Divide => {
                        assert!(rhs >= 2 && rhs <= 9);
                        assert_eq!(lhs % rhs, 0);
                        assert!((1..=9).contains(&q.correct_answer));
                    }
                    Operation::Subtract => {
                        assert!(rhs >= 1 && rhs <= lhs);
                        assert!((4..=18).contains(&lhs));
                    }
                    _ => {}
                }
                assert_eq!(q.answer_len(), q.correct_answer.to_string().len());
            }
        }
    }

    #[test]
    fn test_level_one_only_adds_and_subtracts() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..500 {
            let q = generate(&mut rng, GameMode::Math, 1);
            match q.kind {
                QuestionKind::Math { op: Operation::Add, lhs, rhs } => {
                    assert!((1..=10).contains(&lhs) && (1..=10).contains(&rhs));
                }
                QuestionKind::Math { op: Operation::Subtract, .. } => {}
                other => panic!("unexpected question at level 1: {:?}", other),
            }
        }
    }

    #[test]
    fn test_level_two_mix() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut multiplications = 0;
        for _ in 0..1000 {
            let q = generate(&mut rng, GameMode::Math, 2);
            match q.kind {
                QuestionKind::Math { op: Operation::Multiply, lhs, rhs } => {
                    assert!((1..=9).contains(&lhs) && (1..=9).contains(&rhs));
                    multiplications += 1;
                }
                QuestionKind::Math { op: Operation::Add, lhs, rhs } => {
                    assert!(lhs <= 20 && rhs <= 20);
                }
                other => panic!("unexpected question at level 2: {:?}", other),
            }
        }
        // 60% expected; generous bounds
        assert!(multiplications > 500 && multiplications < 700);
    }

    #[test]
    fn test_high_levels_share_distribution() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for level in [3, 4, 5] {
            for _ in 0..300 {
                let q = generate(&mut rng, GameMode::Math, level);
                if let QuestionKind::Math { op: Operation::Multiply, lhs, rhs } = q.kind {
                    assert!((2..=13).contains(&lhs) && (2..=13).contains(&rhs));
                }
                if let QuestionKind::Math { op: Operation::Add, lhs, rhs } = q.kind {
                    assert!(lhs <= 49 && rhs <= 49);
                }
            }
        }
    }

    #[test]
    fn test_vocabulary_answers_index_options() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..500 {
            let q = generate(&mut rng, GameMode::Vocabulary, 1);
            assert!((1..=3).contains(&q.correct_answer));
            assert_eq!(q.options().map(|o| o.len()), Some(3));
            assert_eq!(q.answer_len(), 1);
            assert_eq!(q.mode(), GameMode::Vocabulary);
        }
    }

    #[test]
    fn test_vocabulary_avoids_opponent_word() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut collisions = 0;
        for _ in 0..200 {
            let other = generate(&mut rng, GameMode::Vocabulary, 1);
            let q = generate_avoiding(&mut rng, GameMode::Vocabulary, 1, Some(&other));
            if q.text == other.text {
                collisions += 1;
            }
        }
        assert_eq!(collisions, 0);
    }

    #[test]
    fn test_decoy_answer_is_wrong_with_same_length() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for mode in [GameMode::Math, GameMode::Vocabulary] {
            for level in 1..=5 {
                for _ in 0..200 {
                    let q = generate(&mut rng, mode, level);
                    let decoy = q.decoy_answer();
                    assert!(!q.is_correct(decoy));
                    assert_eq!(decoy.to_string().len(), q.answer_len());
                }
            }
        }
    }

    #[test]
    fn test_math_text_format() {
        let q = Question::math(Operation::Divide, 56, 8);
        assert_eq!(q.text, "56 ÷ 8");
        assert_eq!(q.correct_answer, 7);
        assert!(q.options().is_none());
    }
}
