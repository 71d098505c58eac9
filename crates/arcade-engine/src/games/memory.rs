use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::{GameInput, GameStrategy, GameType, ScoringRule, Verdict, POINTS_PER_ITEM};
use crate::error::{ArcadeError, Result};
use crate::round::{Card, RoundContent, RoundError, RoundSpec};

const INSTRUMENTS: [(&str, &str); 8] = [
    ("Guitarra", "🎸"),
    ("Piano", "🎹"),
    ("Batería", "🥁"),
    ("Trompeta", "🎺"),
    ("Violín", "🎻"),
    ("Saxofón", "🎷"),
    ("Micrófono", "🎤"),
    ("Radio", "📻"),
];

/// Turn cards two at a time to find `level + 1` pairs.
#[derive(Debug, Default)]
pub struct Memory {
    face_up: Option<usize>,
    matched: Vec<usize>,
}

impl Memory {
    /// Cards already paired in the current round.
    #[must_use]
    pub fn matched(&self) -> &[usize] {
        &self.matched
    }

    /// The unmatched card currently face up, if any.
    #[must_use]
    pub const fn face_up(&self) -> Option<usize> {
        self.face_up
    }
}

impl GameStrategy for Memory {
    fn game_type(&self) -> GameType {
        GameType::Memory
    }

    fn scoring(&self) -> ScoringRule {
        ScoringRule::PerItem(POINTS_PER_ITEM)
    }

    fn generate_round(&mut self, level: u32, rng: &mut StdRng) -> Result<RoundSpec> {
        self.face_up = None;
        self.matched.clear();

        let pairs = usize::try_from(level.saturating_add(1)).unwrap_or(usize::MAX);
        if pairs > INSTRUMENTS.len() {
            return Err(ArcadeError::invalid_round(
                GameType::Memory,
                level,
                RoundError::EmptyQueue("instruments for this many pairs"),
            ));
        }
        let mut pool = INSTRUMENTS.to_vec();
        pool.shuffle(rng);
        let mut cards: Vec<Card> = pool
            .into_iter()
            .take(pairs)
            .flat_map(|(name, icon)| {
                let card = Card {
                    name: name.to_string(),
                    icon: icon.to_string(),
                };
                [card.clone(), card]
            })
            .collect();
        cards.shuffle(rng);
        Ok(RoundSpec::new(
            level,
            format!("Encuentra {pairs} pares"),
            RoundContent::Memory(cards),
        ))
    }

    fn evaluate(&mut self, round: &RoundSpec, input: &GameInput) -> Verdict {
        let (RoundContent::Memory(cards), GameInput::Flip(index)) = (&round.content, input) else {
            return Verdict::Ignored;
        };
        let index = *index;
        if index >= cards.len() || self.matched.contains(&index) || self.face_up == Some(index) {
            return Verdict::Ignored;
        }
        let Some(first) = self.face_up.take() else {
            self.face_up = Some(index);
            return Verdict::Pending;
        };
        if cards[first].icon != cards[index].icon {
            return Verdict::Incorrect;
        }
        self.matched.extend([first, index]);
        if self.matched.len() == cards.len() {
            Verdict::Correct
        } else {
            Verdict::ItemCleared
        }
    }
}
