use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::{level_index, GameInput, GameStrategy, GameType, ScoringRule, Verdict, POINTS_PER_ITEM};
use crate::error::Result;
use crate::round::{Bin, RoundContent, RoundSpec, SortItem};

const LEVELS: [&[(&str, &str, Bin)]; 3] = [
    &[
        ("Manzana", "🍏", Bin::Organic),
        ("Plátano", "🍌", Bin::Organic),
    ],
    &[
        ("Lata", "🥫", Bin::Recyclable),
        ("Caja de leche", "🥛", Bin::Recyclable),
        ("Pizza", "🍕", Bin::Organic),
    ],
    &[
        ("Caja", "📦", Bin::Recyclable),
        ("Diario", "📰", Bin::Recyclable),
        ("Hamburguesa", "🍔", Bin::Organic),
        ("Pollo", "🍗", Bin::Organic),
    ],
];

/// Sort a queue of waste items, one at a time.
#[derive(Debug, Default)]
pub struct Recycling {
    next: usize,
}

impl GameStrategy for Recycling {
    fn game_type(&self) -> GameType {
        GameType::Recycling
    }

    fn scoring(&self) -> ScoringRule {
        ScoringRule::PerItem(POINTS_PER_ITEM)
    }

    fn generate_round(&mut self, level: u32, rng: &mut StdRng) -> Result<RoundSpec> {
        self.next = 0;
        let mut items: Vec<SortItem> = LEVELS[level_index(level, LEVELS.len())]
            .iter()
            .map(|(name, icon, bin)| SortItem {
                name: (*name).to_string(),
                icon: (*icon).to_string(),
                bin: *bin,
            })
            .collect();
        items.shuffle(rng);
        Ok(RoundSpec::new(
            level,
            "¿En qué basurero va?",
            RoundContent::Sorting(items),
        ))
    }

    fn evaluate(&mut self, round: &RoundSpec, input: &GameInput) -> Verdict {
        let (RoundContent::Sorting(items), GameInput::Sort(bin)) = (&round.content, input) else {
            return Verdict::Ignored;
        };
        let Some(item) = items.get(self.next) else {
            return Verdict::Ignored;
        };
        if item.bin != *bin {
            return Verdict::Incorrect;
        }
        self.next += 1;
        if self.next == items.len() {
            Verdict::Correct
        } else {
            Verdict::ItemCleared
        }
    }
}
