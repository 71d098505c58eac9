//! The per-game state machine.
//!
//! ```text
//! AwaitingInput -> Evaluating -> AwaitingInput            (wrong, pending, item cleared)
//!                             -> LevelComplete -> AwaitingInput   (next round generated)
//!                             -> GameComplete                     (terminal)
//! ```
//!
//! One input is judged at a time. Inputs that arrive while a judgement is
//! in flight, or after the game is over, are ignored.

use std::fmt;

use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{ArcadeError, Result};
use crate::games::{GameInput, GameStrategy, GameType, Verdict};
use crate::round::RoundSpec;
use crate::tracker::{Advance, ScoreLevelTracker};

// ============================================================================
// GameState
// ============================================================================

/// Where a session is in its round cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    /// Waiting for the player.
    #[default]
    AwaitingInput,
    /// An input is being judged, possibly across an await.
    Evaluating,
    /// A level was just cleared and the next round is being prepared.
    LevelComplete,
    /// The last level was cleared.
    GameComplete,
}

impl GameState {
    /// Returns `true` once the game is over.
    ///
    /// # Examples
    ///
    /// ```
    /// use arcade_engine::GameState;
    ///
    /// assert!(GameState::GameComplete.is_terminal());
    /// assert!(!GameState::Evaluating.is_terminal());
    /// ```
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::GameComplete)
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AwaitingInput => write!(f, "awaiting_input"),
            Self::Evaluating => write!(f, "evaluating"),
            Self::LevelComplete => write!(f, "level_complete"),
            Self::GameComplete => write!(f, "game_complete"),
        }
    }
}

/// Public snapshot of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    /// Game being played.
    pub game_type: GameType,
    /// Current level, 1-based.
    pub level: u32,
    /// Number of levels.
    pub max_levels: u32,
    /// Points so far.
    pub score: u32,
    /// Round cycle state.
    pub state: GameState,
}

/// What an input did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InputOutcome {
    /// Dropped without judgement.
    Ignored,
    /// Accepted; nothing to score yet.
    Pending,
    /// Wrong; score, level and round are unchanged.
    Wrong,
    /// A sub-item was cleared.
    ItemCleared {
        /// Score after the partial credit.
        score: u32,
    },
    /// The level was cleared; the next round is ready.
    LevelComplete {
        /// New current level.
        level: u32,
        /// Score so far.
        score: u32,
    },
    /// The last level was cleared.
    GameComplete {
        /// Final score.
        final_score: u32,
    },
}

// ============================================================================
// MiniGameStateMachine
// ============================================================================

/// One play-through of one game.
#[derive(Debug)]
pub struct MiniGameStateMachine {
    strategy: Box<dyn GameStrategy>,
    tracker: ScoreLevelTracker,
    round: RoundSpec,
    state: GameState,
    rng: StdRng,
}

impl MiniGameStateMachine {
    /// Starts `game` at level 1.
    pub fn new(game: GameType, rng: StdRng) -> Result<Self> {
        Self::with_strategy(game.strategy(), rng)
    }

    /// Starts a session driven by a custom strategy.
    pub fn with_strategy(mut strategy: Box<dyn GameStrategy>, mut rng: StdRng) -> Result<Self> {
        let game = strategy.game_type();
        let tracker = ScoreLevelTracker::new(game.max_levels());
        let round = generate(strategy.as_mut(), tracker.level(), &mut rng)?;
        info!(%game, max_levels = tracker.max_levels(), "Game started");
        Ok(Self {
            strategy,
            tracker,
            round,
            state: GameState::AwaitingInput,
            rng,
        })
    }

    /// Game being played.
    #[must_use]
    pub fn game_type(&self) -> GameType {
        self.strategy.game_type()
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GameState {
        self.state
    }

    /// Current level.
    #[must_use]
    pub const fn level(&self) -> u32 {
        self.tracker.level()
    }

    /// Number of levels.
    #[must_use]
    pub const fn max_levels(&self) -> u32 {
        self.tracker.max_levels()
    }

    /// Points so far.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.tracker.score()
    }

    /// The round being played.
    #[must_use]
    pub const fn round(&self) -> &RoundSpec {
        &self.round
    }

    /// Snapshot for presentation.
    #[must_use]
    pub fn session(&self) -> GameSession {
        GameSession {
            game_type: self.game_type(),
            level: self.level(),
            max_levels: self.max_levels(),
            score: self.score(),
            state: self.state,
        }
    }

    /// Judges one input synchronously.
    pub fn handle_input(&mut self, input: &GameInput) -> Result<InputOutcome> {
        if !self.begin_evaluation() {
            debug!(state = %self.state, ?input, "Input ignored");
            return Ok(InputOutcome::Ignored);
        }
        self.complete_evaluation(input)
    }

    /// Claims the round for an input whose value is not known yet, e.g. a
    /// transcript still being recognised. Returns `false` if another input
    /// is already being judged or the game is over.
    pub fn begin_evaluation(&mut self) -> bool {
        if self.state == GameState::AwaitingInput {
            self.state = GameState::Evaluating;
            true
        } else {
            false
        }
    }

    /// Gives the round back without judging anything.
    pub fn abort_evaluation(&mut self) {
        if self.state == GameState::Evaluating {
            self.state = GameState::AwaitingInput;
        }
    }

    /// Judges `input` for a round claimed with [`begin_evaluation`](Self::begin_evaluation).
    pub fn complete_evaluation(&mut self, input: &GameInput) -> Result<InputOutcome> {
        if self.state != GameState::Evaluating {
            return Ok(InputOutcome::Ignored);
        }
        let game = self.game_type();
        let scoring = self.strategy.scoring();

        let outcome = match self.strategy.evaluate(&self.round, input) {
            Verdict::Ignored => InputOutcome::Ignored,
            Verdict::Pending => InputOutcome::Pending,
            Verdict::Incorrect => {
                self.tracker.penalize();
                InputOutcome::Wrong
            }
            Verdict::ItemCleared => InputOutcome::ItemCleared {
                score: self.tracker.credit(scoring.item_award()),
            },
            Verdict::Correct => {
                let points = scoring.round_award(self.level(), self.max_levels(), self.score());
                match self.tracker.advance(points) {
                    Advance::LevelComplete { level, score } => {
                        self.state = GameState::LevelComplete;
                        info!(%game, level, score, "Level complete");
                        self.round = generate(self.strategy.as_mut(), level, &mut self.rng)?;
                        InputOutcome::LevelComplete { level, score }
                    }
                    Advance::GameComplete { final_score } => {
                        self.state = GameState::GameComplete;
                        info!(%game, final_score, "Game complete");
                        return Ok(InputOutcome::GameComplete { final_score });
                    }
                }
            }
        };
        self.state = GameState::AwaitingInput;
        debug!(%game, ?outcome, "Input judged");
        Ok(outcome)
    }

    /// Replaces the current round with a freshly generated one at the same
    /// level, dropping any progress within it.
    ///
    /// Also recovers a session whose next round failed to generate.
    pub fn regenerate_round(&mut self) -> Result<&RoundSpec> {
        match self.state {
            GameState::AwaitingInput | GameState::LevelComplete => {
                let level = self.level();
                self.round = generate(self.strategy.as_mut(), level, &mut self.rng)?;
                self.state = GameState::AwaitingInput;
                Ok(&self.round)
            }
            other => Err(ArcadeError::invalid_transition(other, GameState::AwaitingInput)),
        }
    }
}

fn generate(strategy: &mut dyn GameStrategy, level: u32, rng: &mut StdRng) -> Result<RoundSpec> {
    let game = strategy.game_type();
    let round = strategy.generate_round(level, rng)?;
    if let Err(source) = round.validate() {
        error!(%game, level, error = %source, "Generated round is not playable");
        return Err(ArcadeError::invalid_round(game, level, source));
    }
    Ok(round)
}

// ============================================================================
// Tests
// ============================================================================
