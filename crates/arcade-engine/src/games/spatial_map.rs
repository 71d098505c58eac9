use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use super::{GameInput, GameStrategy, GameType, Verdict};
use crate::error::Result;
use crate::round::{RoundContent, RoundSpec, Tile};

const TILES: [&str; 4] = ["🏔️", "🌊", "🌲", "🏠"];
const START_ANGLES: [u16; 3] = [90, 180, 270];

/// Rotate every tile until it is upright.
#[derive(Debug, Default)]
pub struct SpatialMap {
    angles: Vec<u16>,
}

impl SpatialMap {
    /// Current tile rotations.
    #[must_use]
    pub fn angles(&self) -> &[u16] {
        &self.angles
    }
}

impl GameStrategy for SpatialMap {
    fn game_type(&self) -> GameType {
        GameType::SpatialMap
    }

    fn generate_round(&mut self, level: u32, rng: &mut StdRng) -> Result<RoundSpec> {
        let tiles: Vec<Tile> = TILES
            .iter()
            .map(|icon| Tile {
                icon: (*icon).to_string(),
                angle: START_ANGLES.choose(rng).copied().unwrap_or(90),
            })
            .collect();
        self.angles = tiles.iter().map(|tile| tile.angle).collect();
        Ok(RoundSpec::new(
            level,
            "Arregla el mapa",
            RoundContent::Rotation(tiles),
        ))
    }

    fn evaluate(&mut self, round: &RoundSpec, input: &GameInput) -> Verdict {
        let (RoundContent::Rotation(_), GameInput::Rotate(index)) = (&round.content, input) else {
            return Verdict::Ignored;
        };
        let Some(angle) = self.angles.get_mut(*index) else {
            return Verdict::Ignored;
        };
        *angle = (*angle + 90) % 360;
        if self.angles.iter().all(|angle| *angle == 0) {
            Verdict::Correct
        } else {
            Verdict::Pending
        }
    }
}
