use rand::rngs::StdRng;

use super::math::choose;
use super::{GameInput, GameStrategy, GameType, Verdict};
use crate::error::{ArcadeError, Result};
use crate::round::{Choice, OptionSet, RoundContent, RoundSpec};

/// One word per vowel.
static WORDS: [(char, &str, &str); 5] = [
    ('A', "Abeja", "🐝"),
    ('E', "Elefante", "🐘"),
    ('I', "Isla", "🏝️"),
    ('O', "Oso", "🐻"),
    ('U', "Uvas", "🍇"),
];

const OPTIONS: usize = 3;

/// Pick the picture whose word starts with the level's vowel.
#[derive(Debug, Default, Clone, Copy)]
pub struct Vowels;

impl GameStrategy for Vowels {
    fn game_type(&self) -> GameType {
        GameType::Vowels
    }

    fn generate_round(&mut self, level: u32, rng: &mut StdRng) -> Result<RoundSpec> {
        let target = usize::try_from(level.saturating_sub(1)).unwrap_or(0) % WORDS.len();
        let (vowel, word, icon) = WORDS[target];
        let distractors = WORDS
            .iter()
            .filter(|(other, _, _)| *other != vowel)
            .map(|(_, word, icon)| Choice::new(*word, *icon));
        let options = OptionSet::build(Choice::new(word, icon), distractors, OPTIONS, rng)
            .map_err(|source| ArcadeError::invalid_round(GameType::Vowels, level, source))?;
        Ok(RoundSpec::new(
            level,
            format!("Toca lo que empieza con {vowel}"),
            RoundContent::Choice(options),
        ))
    }

    fn evaluate(&mut self, round: &RoundSpec, input: &GameInput) -> Verdict {
        choose(round, input)
    }
}
