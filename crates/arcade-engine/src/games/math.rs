use rand::rngs::StdRng;
use rand::Rng;

use super::{GameInput, GameStrategy, GameType, Verdict};
use crate::error::{ArcadeError, Result};
use crate::round::{Choice, OptionSet, RoundContent, RoundSpec};

const OPTIONS: usize = 3;

/// Arithmetic questions: sums on the first two levels, subtraction after.
#[derive(Debug, Default, Clone, Copy)]
pub struct Math;

impl Math {
    fn question(level: u32, rng: &mut StdRng) -> (String, u32) {
        match level {
            1 => {
                let (a, b) = (rng.random_range(1..=4), rng.random_range(1..=4));
                (format!("{a} + {b}"), a + b)
            }
            2 => {
                let (a, b) = (rng.random_range(2..=6), rng.random_range(2..=6));
                (format!("{a} + {b}"), a + b)
            }
            _ => {
                let a = rng.random_range(5..=10);
                let b = rng.random_range(1..=a);
                (format!("{a} - {b}"), a - b)
            }
        }
    }
}

impl GameStrategy for Math {
    fn game_type(&self) -> GameType {
        GameType::Math
    }

    fn generate_round(&mut self, level: u32, rng: &mut StdRng) -> Result<RoundSpec> {
        let (question, answer) = Self::question(level, rng);
        let near = (1..=3).flat_map(|d| [answer.checked_sub(d), answer.checked_add(d)]);
        let distractors = near.flatten().map(|n| Choice::text(n.to_string()));
        let options = OptionSet::build(
            Choice::text(answer.to_string()),
            distractors,
            OPTIONS,
            rng,
        )
        .map_err(|source| ArcadeError::invalid_round(GameType::Math, level, source))?;
        Ok(RoundSpec::new(
            level,
            format!("¿Cuánto es {question}?"),
            RoundContent::Choice(options),
        ))
    }

    fn evaluate(&mut self, round: &RoundSpec, input: &GameInput) -> Verdict {
        choose(round, input)
    }
}

/// Shared predicate for multiple-choice rounds.
pub(super) fn choose(round: &RoundSpec, input: &GameInput) -> Verdict {
    let (RoundContent::Choice(options), GameInput::Choose(index)) = (&round.content, input) else {
        return Verdict::Ignored;
    };
    if *index >= options.len() {
        Verdict::Ignored
    } else if options.is_correct(*index) {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}
