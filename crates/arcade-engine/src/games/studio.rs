use rand::rngs::StdRng;

use super::{GameInput, GameStrategy, GameType, Verdict};
use crate::error::Result;
use crate::round::{RoundContent, RoundSpec, StudioKind};

/// Creative games: produce a photo or a clip, then confirm it.
#[derive(Debug, Clone, Copy)]
pub struct Studio {
    game: GameType,
    ready: bool,
}

impl Studio {
    /// Strategy for a media game.
    #[must_use]
    pub const fn new(game: GameType) -> Self {
        Self { game, ready: false }
    }

    const fn kind(&self) -> StudioKind {
        match self.game {
            GameType::Animation => StudioKind::Video,
            _ => StudioKind::Photo,
        }
    }
}

impl GameStrategy for Studio {
    fn game_type(&self) -> GameType {
        self.game
    }

    fn generate_round(&mut self, level: u32, _rng: &mut StdRng) -> Result<RoundSpec> {
        self.ready = false;
        let prompt = match self.kind() {
            StudioKind::Photo => "Sácate una foto",
            StudioKind::Video => "Sube una imagen para animarla",
        };
        Ok(RoundSpec::new(
            level,
            prompt,
            RoundContent::Studio(self.kind()),
        ))
    }

    fn evaluate(&mut self, round: &RoundSpec, input: &GameInput) -> Verdict {
        if !matches!(round.content, RoundContent::Studio(_)) {
            return Verdict::Ignored;
        }
        match input {
            GameInput::MediaReady => {
                self.ready = true;
                Verdict::Pending
            }
            GameInput::Confirm if self.ready => Verdict::Correct,
            _ => Verdict::Ignored,
        }
    }
}
