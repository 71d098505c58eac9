//! Host capabilities the engine talks through.
//!
//! Speech playback, tone playback and speech recognition belong to the host
//! platform. The engine only sees these traits, injected as `Arc<dyn _>`.

use std::fmt;

use arcade_media::MediaError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Short audio cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Neutral acknowledgement.
    Click,
    /// Right answer or cleared item.
    Correct,
    /// Wrong answer.
    Wrong,
    /// Game won or media delivered.
    Win,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Click => write!(f, "click"),
            Self::Correct => write!(f, "correct"),
            Self::Wrong => write!(f, "wrong"),
            Self::Win => write!(f, "win"),
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    /// Pitch multiplier.
    pub pitch: f32,
    /// Rate multiplier.
    pub rate: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            pitch: 1.0,
            rate: 1.0,
        }
    }
}

/// The host character presenting a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Stable identifier.
    pub id: String,
    /// Display name, also used in greetings and feedback prompts.
    pub name: String,
    /// Catchphrase shown on the menu.
    #[serde(default)]
    pub catchphrase: String,
    /// Voice every utterance of the session uses.
    #[serde(default)]
    pub voice: Voice,
}

impl Character {
    /// Creates a character with the default voice.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            catchphrase: String::new(),
            voice: Voice::default(),
        }
    }

    /// Sets the voice.
    #[must_use]
    pub const fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = voice;
        self
    }

    /// Greeting spoken when a game starts.
    #[must_use]
    pub fn greeting(&self) -> String {
        format!("¡Hola soy {}! Preparados para la acción.", self.name)
    }
}

/// One thing to say.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Utterance {
    /// Text to speak.
    pub text: String,
    /// Voice to speak it with.
    pub voice: Voice,
    /// Cut off whatever is being spoken first.
    pub interrupt: bool,
    /// Speech locale.
    pub language: String,
}

/// Speech playback. Fire and forget.
pub trait SpeechOutput: Send + Sync {
    /// Speaks `utterance`.
    fn speak(&self, utterance: &Utterance);

    /// Stops any speech in progress.
    fn stop(&self);
}

/// Audio cue playback. Fire and forget.
pub trait TonePlayer: Send + Sync {
    /// Plays `tone`.
    fn play_tone(&self, tone: Tone);
}

/// Speech recognition.
#[async_trait]
pub trait SpeechInput: Send + Sync {
    /// Listens for one phrase and returns the transcript.
    async fn listen(&self, language: &str) -> Result<String, MediaError>;
}
