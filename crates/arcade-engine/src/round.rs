//! Round content and its invariants.
//!
//! A [`RoundSpec`] is generated once per level and never edited; progress
//! through a round (cards turned, items sorted, tiles rotated) lives in the
//! game strategy.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Why a generated round cannot be played.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoundError {
    /// The option set has no options.
    #[error("option set is empty")]
    EmptyOptions,

    /// No candidate distractor differs from the correct answer.
    #[error("no distractor differs from the correct answer")]
    NoDistractors,

    /// Two options share a label.
    #[error("duplicate option '{0}'")]
    DuplicateOption(String),

    /// The answer index points outside the option set.
    #[error("answer index {index} is out of range for {len} options")]
    AnswerOutOfRange {
        /// Recorded answer index.
        index: usize,
        /// Number of options.
        len: usize,
    },

    /// A queue-based round has nothing in it.
    #[error("round has no {0}")]
    EmptyQueue(&'static str),

    /// A memory card has no partner, or more than one.
    #[error("card '{0}' does not appear exactly twice")]
    UnpairedCard(String),

    /// Every tile already points north.
    #[error("map is already solved")]
    AlreadySolved,

    /// A spoken target accepts no words.
    #[error("spoken target '{0}' accepts no words")]
    NoAcceptedWords(String),
}

/// One selectable answer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Choice {
    /// Text shown and compared. Unique within an option set.
    pub label: String,
    /// Emoji shown next to or instead of the label. May be empty.
    pub icon: String,
}

impl Choice {
    /// Creates a choice with an icon.
    #[must_use]
    pub fn new(label: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            icon: icon.into(),
        }
    }

    /// Creates a text-only choice.
    #[must_use]
    pub fn text(label: impl Into<String>) -> Self {
        Self::new(label, "")
    }
}

/// Options for a multiple-choice round: the correct answer exactly once,
/// plus distinct distractors, in random order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSet {
    options: Vec<Choice>,
    answer: usize,
}

impl OptionSet {
    /// Builds a set of at most `size` options from `correct` and a pool of
    /// candidate distractors.
    ///
    /// Candidates equal to the correct answer, and repeats, are discarded.
    /// Fails with [`RoundError::NoDistractors`] if nothing is left.
    pub fn build(
        correct: Choice,
        distractors: impl IntoIterator<Item = Choice>,
        size: usize,
        rng: &mut StdRng,
    ) -> Result<Self, RoundError> {
        let mut pool: Vec<Choice> = Vec::new();
        for candidate in distractors {
            if candidate.label != correct.label && !pool.iter().any(|c| c.label == candidate.label)
            {
                pool.push(candidate);
            }
        }
        if pool.is_empty() {
            return Err(RoundError::NoDistractors);
        }

        pool.shuffle(rng);
        pool.truncate(size.saturating_sub(1).max(1));
        let answer = rng.random_range(0..=pool.len());
        pool.insert(answer, correct);

        let set = Self {
            options: pool,
            answer,
        };
        set.validate()?;
        Ok(set)
    }

    /// Options in display order.
    #[must_use]
    pub fn options(&self) -> &[Choice] {
        &self.options
    }

    /// Index of the correct option.
    #[must_use]
    pub const fn answer_index(&self) -> usize {
        self.answer
    }

    /// The correct option.
    #[must_use]
    pub fn answer(&self) -> Option<&Choice> {
        self.options.get(self.answer)
    }

    /// Returns `true` if `index` is the correct option.
    #[must_use]
    pub const fn is_correct(&self, index: usize) -> bool {
        index == self.answer
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Returns `true` if there are no options.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Checks the set is non-empty, duplicate-free and has a valid answer.
    pub fn validate(&self) -> Result<(), RoundError> {
        if self.options.is_empty() {
            return Err(RoundError::EmptyOptions);
        }
        if self.answer >= self.options.len() {
            return Err(RoundError::AnswerOutOfRange {
                index: self.answer,
                len: self.options.len(),
            });
        }
        for (i, option) in self.options.iter().enumerate() {
            if self.options[..i].iter().any(|c| c.label == option.label) {
                return Err(RoundError::DuplicateOption(option.label.clone()));
            }
        }
        Ok(())
    }
}

/// Bin for the recycling game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bin {
    /// Green bin.
    Organic,
    /// Blue bin.
    Recyclable,
}

/// A piece of waste to sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortItem {
    /// Name of the item.
    pub name: String,
    /// Emoji.
    pub icon: String,
    /// Where it belongs.
    pub bin: Bin,
}

/// A face-down memory card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Instrument name.
    pub name: String,
    /// Emoji; two cards share each icon.
    pub icon: String,
}

/// A rotatable map tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Emoji.
    pub icon: String,
    /// Starting rotation in degrees: 0, 90, 180 or 270.
    pub angle: u16,
}

/// A right the child has to name out loud.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpokenTarget {
    /// Name shown on screen.
    pub label: String,
    /// Emoji.
    pub icon: String,
    /// Lowercase words that count as a correct answer.
    pub accepted: Vec<String>,
}

/// What a creative round produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudioKind {
    /// An edited photo.
    Photo,
    /// An animated clip.
    Video,
}

/// Game-specific round content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RoundContent {
    /// Pick one option.
    Choice(OptionSet),
    /// Sort each item in order.
    Sorting(Vec<SortItem>),
    /// Find every pair.
    Memory(Vec<Card>),
    /// Turn every tile upright.
    Rotation(Vec<Tile>),
    /// Say the target.
    Spoken(SpokenTarget),
    /// Produce media and confirm it.
    Studio(StudioKind),
}

/// Content of one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSpec {
    /// Level the round belongs to.
    pub level: u32,
    /// Text shown to the player.
    pub prompt: String,
    /// What to solve.
    pub content: RoundContent,
}

impl RoundSpec {
    /// Creates a round.
    #[must_use]
    pub fn new(level: u32, prompt: impl Into<String>, content: RoundContent) -> Self {
        Self {
            level,
            prompt: prompt.into(),
            content,
        }
    }

    /// Checks the round can be played.
    pub fn validate(&self) -> Result<(), RoundError> {
        match &self.content {
            RoundContent::Choice(options) => options.validate(),
            RoundContent::Sorting(items) if items.is_empty() => {
                Err(RoundError::EmptyQueue("items to sort"))
            }
            RoundContent::Memory(cards) => validate_cards(cards),
            RoundContent::Rotation(tiles) => {
                if tiles.is_empty() {
                    Err(RoundError::EmptyQueue("tiles"))
                } else if tiles.iter().all(|tile| tile.angle % 360 == 0) {
                    Err(RoundError::AlreadySolved)
                } else {
                    Ok(())
                }
            }
            RoundContent::Spoken(target) if target.accepted.is_empty() => {
                Err(RoundError::NoAcceptedWords(target.label.clone()))
            }
            RoundContent::Sorting(_) | RoundContent::Spoken(_) | RoundContent::Studio(_) => Ok(()),
        }
    }
}

fn validate_cards(cards: &[Card]) -> Result<(), RoundError> {
    if cards.is_empty() {
        return Err(RoundError::EmptyQueue("cards"));
    }
    for card in cards {
        if cards.iter().filter(|other| other.icon == card.icon).count() != 2 {
            return Err(RoundError::UnpairedCard(card.icon.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    fn numbers(values: &[i32]) -> Vec<Choice> {
        values.iter().map(|n| Choice::text(n.to_string())).collect()
    }

    #[test]
    fn test_option_set_contains_answer_once_without_duplicates() {
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let set = OptionSet::build(
                Choice::text("5"),
                numbers(&[5, 4, 4, 6, 6, 7, 3]),
                3,
                &mut rng,
            )
            .unwrap();
            assert_eq!(set.len(), 3);
            assert_eq!(set.answer().unwrap().label, "5");
            assert_eq!(set.options().iter().filter(|c| c.label == "5").count(), 1);
            assert!(set.validate().is_ok());
        }
    }

    #[test]
    fn test_option_set_answer_position_varies() {
        let positions: std::collections::HashSet<usize> = (0..50)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                OptionSet::build(Choice::text("a"), numbers(&[1, 2, 3]), 4, &mut rng)
                    .unwrap()
                    .answer_index()
            })
            .collect();
        assert!(positions.len() > 1);
    }

    #[test]
    fn test_option_set_without_distractors_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = OptionSet::build(Choice::text("3"), numbers(&[3, 3]), 3, &mut rng).unwrap_err();
        assert_eq!(err, RoundError::NoDistractors);
    }

    #[test]
    fn test_small_pool_yields_smaller_set() {
        let mut rng = StdRng::seed_from_u64(9);
        let set = OptionSet::build(Choice::text("1"), numbers(&[2]), 4, &mut rng).unwrap();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_validate_detects_duplicates() {
        let set = OptionSet {
            options: numbers(&[1, 2, 1]),
            answer: 1,
        };
        assert_eq!(
            set.validate(),
            Err(RoundError::DuplicateOption("1".to_string()))
        );
        let set = OptionSet {
            options: numbers(&[1]),
            answer: 3,
        };
        assert!(matches!(
            set.validate(),
            Err(RoundError::AnswerOutOfRange { index: 3, len: 1 })
        ));
    }

    #[test]
    fn test_round_validation() {
        let unpaired = RoundSpec::new(
            1,
            "",
            RoundContent::Memory(vec![
                Card {
                    name: "Guitarra".to_string(),
                    icon: "🎸".to_string(),
                },
                Card {
                    name: "Piano".to_string(),
                    icon: "🎹".to_string(),
                },
            ]),
        );
        assert_eq!(
            unpaired.validate(),
            Err(RoundError::UnpairedCard("🎸".to_string()))
        );

        let solved = RoundSpec::new(
            1,
            "",
            RoundContent::Rotation(vec![Tile {
                icon: "🌲".to_string(),
                angle: 0,
            }]),
        );
        assert_eq!(solved.validate(), Err(RoundError::AlreadySolved));

        let empty = RoundSpec::new(1, "", RoundContent::Sorting(Vec::new()));
        assert!(matches!(empty.validate(), Err(RoundError::EmptyQueue(_))));

        let studio = RoundSpec::new(1, "", RoundContent::Studio(StudioKind::Photo));
        assert!(studio.validate().is_ok());
    }
}
