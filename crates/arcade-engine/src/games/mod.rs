//! Game catalog and the strategy each game plugs into the state machine.
//!
//! Every game is the same state machine driven by a different
//! [`GameStrategy`]: a round generator, a correctness predicate over the
//! current round, and a scoring rule.

mod logic_clue;
mod math;
mod memory;
mod recycling;
mod rights;
mod spatial_map;
mod studio;
mod vowels;

use std::fmt;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::round::{Bin, RoundSpec};

pub use logic_clue::LogicClue;
pub use math::Math;
pub use memory::Memory;
pub use recycling::Recycling;
pub use rights::RightsLogic;
pub use spatial_map::SpatialMap;
pub use studio::Studio;
pub use vowels::Vowels;

/// Points available in every game.
pub const TOTAL_POINTS: u32 = 100;

/// Points for each cleared sub-item in queue-based games.
pub const POINTS_PER_ITEM: u32 = 11;

/// The playable games.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    /// Sort waste into the right bin.
    Recycling,
    /// Match pairs of instrument cards.
    Memory,
    /// Answer sums and subtractions.
    Math,
    /// Pick the word starting with a vowel.
    Vowels,
    /// Find the suspect from a clue.
    LogicClue,
    /// Rotate map tiles upright.
    SpatialMap,
    /// Name a children's right out loud.
    RightsLogic,
    /// Take a photo and turn it into a puppet.
    MagicCamera,
    /// Animate an image into a clip.
    Animation,
}

impl GameType {
    /// Every implemented game, in menu order.
    pub const ALL: [Self; 9] = [
        Self::Recycling,
        Self::Memory,
        Self::Math,
        Self::Vowels,
        Self::MagicCamera,
        Self::Animation,
        Self::LogicClue,
        Self::SpatialMap,
        Self::RightsLogic,
    ];

    /// Title shown in the menu and sent with feedback requests.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Recycling => "Nota Verde: Reciclaje",
            Self::Memory => "Ranking Top Top Top: Memoria",
            Self::Math => "Entrevista Matemática",
            Self::Vowels => "Caza Vocales",
            Self::LogicClue => "Patana: El Culpable",
            Self::SpatialMap => "Huachimingo: El Mapa",
            Self::RightsLogic => "Calcetín: Derechos",
            Self::MagicCamera => "Cámara Mágica",
            Self::Animation => "Cine Mágico",
        }
    }

    /// Instruction spoken when the game starts.
    #[must_use]
    pub const fn instruction(&self) -> &'static str {
        match self {
            Self::Recycling => "Verde: Orgánico. Azul: Reciclable.",
            Self::Memory => "¡Busca los pares!",
            Self::Math => "¡Resuelve la cuenta!",
            Self::Vowels => "Toca lo que empieza con la vocal.",
            Self::LogicClue => "¿Quién es el culpable? Sigue la pista.",
            Self::SpatialMap => "Gira las piezas hasta que el mapa quede derecho.",
            Self::RightsLogic => "Di el nombre del derecho.",
            Self::MagicCamera => "¡Foto de títere!",
            Self::Animation => "¡Anima tus fotos!",
        }
    }

    /// Number of levels.
    #[must_use]
    pub const fn max_levels(&self) -> u32 {
        match self {
            Self::MagicCamera | Self::Animation => 1,
            _ => 3,
        }
    }

    /// Returns `true` if the game needs the camera.
    #[must_use]
    pub const fn uses_camera(&self) -> bool {
        matches!(self, Self::MagicCamera)
    }

    /// Returns `true` if the game listens to the microphone.
    #[must_use]
    pub const fn uses_voice(&self) -> bool {
        matches!(self, Self::RightsLogic)
    }

    /// Creates a fresh strategy for this game.
    #[must_use]
    pub fn strategy(self) -> Box<dyn GameStrategy> {
        match self {
            Self::Recycling => Box::<Recycling>::default(),
            Self::Memory => Box::<Memory>::default(),
            Self::Math => Box::new(Math),
            Self::Vowels => Box::new(Vowels),
            Self::LogicClue => Box::new(LogicClue),
            Self::SpatialMap => Box::<SpatialMap>::default(),
            Self::RightsLogic => Box::new(RightsLogic),
            Self::MagicCamera | Self::Animation => Box::new(Studio::new(self)),
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Recycling => "recycling",
            Self::Memory => "memory",
            Self::Math => "math",
            Self::Vowels => "vowels",
            Self::LogicClue => "logic_clue",
            Self::SpatialMap => "spatial_map",
            Self::RightsLogic => "rights_logic",
            Self::MagicCamera => "magic_camera",
            Self::Animation => "animation",
        };
        f.write_str(name)
    }
}

/// A player action. Which variants a game reacts to depends on the game;
/// the rest are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum GameInput {
    /// Pick option `n` of a choice round.
    Choose(usize),
    /// Put the current item in a bin.
    Sort(Bin),
    /// Turn card `n` face up.
    Flip(usize),
    /// Rotate tile `n` by 90 degrees.
    Rotate(usize),
    /// Words heard or typed.
    Transcript(String),
    /// The round's media result is available.
    MediaReady,
    /// Accept the media result.
    Confirm,
}

/// Judgement of one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// The round is solved.
    Correct,
    /// One sub-item was cleared; the round continues.
    ItemCleared,
    /// Accepted without judgement.
    Pending,
    /// Wrong; the round is unchanged.
    Incorrect,
    /// Not meaningful for this round.
    Ignored,
}

/// How a game hands out its points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// `TOTAL_POINTS` split evenly across levels, remainder on the last.
    PerLevel,
    /// Fixed points for every cleared sub-item. The item that clears the
    /// last round tops the game up to `TOTAL_POINTS`.
    PerItem(u32),
}

impl ScoringRule {
    /// Points for solving a whole round at `level`, given the `score`
    /// already banked.
    #[must_use]
    pub const fn round_award(&self, level: u32, max_levels: u32, score: u32) -> u32 {
        match self {
            Self::PerLevel => {
                let max_levels = if max_levels == 0 { 1 } else { max_levels };
                let base = TOTAL_POINTS / max_levels;
                if level >= max_levels {
                    TOTAL_POINTS - base * (max_levels - 1)
                } else {
                    base
                }
            }
            Self::PerItem(points) => {
                let remainder = TOTAL_POINTS.saturating_sub(score);
                if level >= max_levels && remainder > *points {
                    remainder
                } else {
                    *points
                }
            }
        }
    }

    /// Points for clearing one sub-item.
    #[must_use]
    pub const fn item_award(&self) -> u32 {
        match self {
            Self::PerLevel => 0,
            Self::PerItem(points) => *points,
        }
    }
}

/// Round generation, judgement and scoring for one game.
///
/// Strategies may keep progress within the current round; it is reset by
/// [`generate_round`](Self::generate_round).
pub trait GameStrategy: Send + Sync + fmt::Debug {
    /// Game this strategy plays.
    fn game_type(&self) -> GameType;

    /// How points are awarded.
    fn scoring(&self) -> ScoringRule {
        ScoringRule::PerLevel
    }

    /// Generates the round for `level` and resets round progress.
    fn generate_round(&mut self, level: u32, rng: &mut StdRng) -> Result<RoundSpec>;

    /// Judges `input` against `round`.
    fn evaluate(&mut self, round: &RoundSpec, input: &GameInput) -> Verdict;
}

/// Maps a 1-based level onto a table of per-level data, reusing the last
/// entry for levels past the end.
fn level_index(level: u32, len: usize) -> usize {
    let last = len.saturating_sub(1);
    usize::try_from(level.saturating_sub(1)).map_or(last, |index| index.min(last))
}
