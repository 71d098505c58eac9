use rand::rngs::StdRng;

use super::{level_index, GameInput, GameStrategy, GameType, Verdict};
use crate::error::Result;
use crate::round::{RoundContent, RoundSpec, SpokenTarget};

const RIGHTS: [(&str, &str, [&str; 3]); 3] = [
    ("ALIMENTACIÓN", "🍎", ["alimentación", "comida", "comer"]),
    ("SALUD", "🏥", ["salud", "médico", "hospital"]),
    ("EDUCACIÓN", "📖", ["educación", "escuela", "estudiar"]),
];

/// Say the name of a right, or a word related to it.
#[derive(Debug, Default, Clone, Copy)]
pub struct RightsLogic;

impl GameStrategy for RightsLogic {
    fn game_type(&self) -> GameType {
        GameType::RightsLogic
    }

    fn generate_round(&mut self, level: u32, _rng: &mut StdRng) -> Result<RoundSpec> {
        let (label, icon, accepted) = RIGHTS[level_index(level, RIGHTS.len())];
        Ok(RoundSpec::new(
            level,
            format!("{icon} ¿Qué derecho es este?"),
            RoundContent::Spoken(SpokenTarget {
                label: label.to_string(),
                icon: icon.to_string(),
                accepted: accepted.iter().map(ToString::to_string).collect(),
            }),
        ))
    }

    fn evaluate(&mut self, round: &RoundSpec, input: &GameInput) -> Verdict {
        let (RoundContent::Spoken(target), GameInput::Transcript(heard)) = (&round.content, input)
        else {
            return Verdict::Ignored;
        };
        let heard = heard.to_lowercase();
        if heard.trim().is_empty() {
            return Verdict::Ignored;
        }
        if target.accepted.iter().any(|word| heard.contains(word.as_str())) {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn transcript(text: &str) -> GameInput {
        GameInput::Transcript(text.to_string())
    }

    #[test]
    fn test_transcript_containing_accepted_word() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut game = RightsLogic;
        let round = game.generate_round(2, &mut rng).unwrap();
        assert_eq!(
            game.evaluate(&round, &transcript("Hay que ir al MÉDICO")),
            Verdict::Correct
        );
        assert_eq!(
            game.evaluate(&round, &transcript("jugar a la pelota")),
            Verdict::Incorrect
        );
        assert_eq!(game.evaluate(&round, &transcript("   ")), Verdict::Ignored);
    }

    #[test]
    fn test_typed_target_label_is_accepted() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut game = RightsLogic;
        for level in 1..=3 {
            let round = game.generate_round(level, &mut rng).unwrap();
            let RoundContent::Spoken(target) = &round.content else {
                unreachable!("rights rounds are spoken rounds");
            };
            let typed = transcript(&target.label);
            assert_eq!(game.evaluate(&round, &typed), Verdict::Correct);
        }
    }
}
