use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use super::math::choose;
use super::{GameInput, GameStrategy, GameType, Verdict};
use crate::error::{ArcadeError, Result};
use crate::round::{Choice, OptionSet, RoundContent, RoundError, RoundSpec};

/// Suspects and their traits. No trait is shared between suspects.
static SUSPECTS: [(&str, &str, [&str; 2]); 4] = [
    ("Barbudo", "🧔", ["barba", "gorro"]),
    ("Anteojos", "👓", ["lentes", "calvo"]),
    ("Moñito", "🎀", ["moño", "pelo largo"]),
    ("Payaso", "🤡", ["maquillaje", "nariz roja"]),
];

/// Find the culprit from a single distinguishing trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogicClue;

impl GameStrategy for LogicClue {
    fn game_type(&self) -> GameType {
        GameType::LogicClue
    }

    fn generate_round(&mut self, level: u32, rng: &mut StdRng) -> Result<RoundSpec> {
        let invalid =
            |source: RoundError| ArcadeError::invalid_round(GameType::LogicClue, level, source);
        let (name, icon, traits) = *SUSPECTS
            .choose(rng)
            .ok_or_else(|| invalid(RoundError::EmptyOptions))?;
        let clue = traits
            .choose(rng)
            .ok_or_else(|| invalid(RoundError::EmptyQueue("traits")))?;
        let others = SUSPECTS
            .iter()
            .filter(|(other, _, _)| *other != name)
            .map(|(other, icon, _)| Choice::new(*other, *icon));
        let options = OptionSet::build(Choice::new(name, icon), others, SUSPECTS.len(), rng)
            .map_err(invalid)?;
        Ok(RoundSpec::new(
            level,
            format!("El culpable tiene {clue}"),
            RoundContent::Choice(options),
        ))
    }

    fn evaluate(&mut self, round: &RoundSpec, input: &GameInput) -> Verdict {
        choose(round, input)
    }
}
