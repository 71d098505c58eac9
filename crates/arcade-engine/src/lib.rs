//! Arcade session engine.
//!
//! Runs the mini-games: round generation and judgement, levels and scoring,
//! the camera and video games, and the feedback that closes every win.

pub mod capabilities;
pub mod config;
pub mod error;
pub mod events;
pub mod games;
pub mod logging;
pub mod machine;
pub mod round;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tracker;

pub use capabilities::{Character, SpeechInput, SpeechOutput, Tone, TonePlayer, Utterance, Voice};
pub use config::{Config, FeedbackConfig, GenerationConfig, PromptConfig};
pub use error::{ArcadeError, Result};
pub use events::{EventBroadcaster, GameEvent};
pub use games::{GameInput, GameStrategy, GameType, ScoringRule, Verdict, TOTAL_POINTS};
pub use machine::{GameSession, GameState, InputOutcome, MiniGameStateMachine};
pub use round::{Bin, Choice, OptionSet, RoundContent, RoundError, RoundSpec};
pub use session::{Collaborators, SessionController};
pub use tracker::{Advance, ScoreLevelTracker};
