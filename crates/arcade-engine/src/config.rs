//! Configuration for the arcade engine.
//!
//! Loaded from `arcade.json` (camelCase). Every field has a default, so a
//! missing file or a partial file is fine.

use std::path::Path;
use std::time::Duration;

use arcade_genai::{AspectRatio, Resolution};
use arcade_media::{PollPolicy, VideoSettings};
use serde::{Deserialize, Serialize};

use crate::error::{ArcadeError, Result};

/// The default config file name.
const CONFIG_FILE_NAME: &str = "arcade.json";

fn default_language() -> String {
    "es-ES".to_string()
}

const fn default_poll_interval() -> u64 {
    10
}

const fn default_max_polls() -> u32 {
    60
}

fn default_fallback_text() -> String {
    "¡Eres un campeón!".to_string()
}

fn default_empty_text() -> String {
    "¡Felicidades, amigo!".to_string()
}

const fn default_feedback_timeout() -> u64 {
    15
}

fn default_photo_edit_prompt() -> String {
    "Ponle una nariz de payaso estilo 31 Minutos".to_string()
}

fn default_animation_prompt() -> String {
    "Hacer que la imagen cobre vida al estilo 31 minutos".to_string()
}

/// Main configuration for the arcade engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Locale handed to speech playback and recognition.
    #[serde(default = "default_language")]
    pub language: String,

    /// Video generation polling and output format.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// End-of-game feedback.
    #[serde(default)]
    pub feedback: FeedbackConfig,

    /// Instructions sent to the generative media services.
    #[serde(default)]
    pub prompts: PromptConfig,

    /// Fixed seed for round generation. Random when absent.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            generation: GenerationConfig::default(),
            feedback: FeedbackConfig::default(),
            prompts: PromptConfig::default(),
            rng_seed: None,
        }
    }
}

impl Config {
    /// Loads `arcade.json` from the current working directory, or defaults
    /// if there is none.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            ArcadeError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads `arcade.json` from `dir`, or defaults if there is none.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file.
    ///
    /// A missing file yields the defaults. Unreadable files and invalid JSON
    /// or enum values yield `ConfigParseError`; out-of-range values yield
    /// `ConfigValidationError`.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(ArcadeError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ArcadeError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            return Err(ArcadeError::config_validation(
                "language must not be empty",
                "Set language to a BCP 47 tag such as \"es-ES\" in your arcade.json",
            ));
        }

        if self.generation.poll_interval_secs == 0 {
            return Err(ArcadeError::config_validation(
                "generation.pollIntervalSecs must be greater than 0",
                "Poll no faster than once per second; the default is 10",
            ));
        }

        if self.generation.max_polls == 0 {
            return Err(ArcadeError::config_validation(
                "generation.maxPolls must be greater than 0",
                "Set generation.maxPolls to at least 1 in your arcade.json",
            ));
        }

        if self.feedback.timeout_secs == 0 {
            return Err(ArcadeError::config_validation(
                "feedback.timeoutSecs must be greater than 0",
                "Set feedback.timeoutSecs to at least 1 in your arcade.json",
            ));
        }

        if self.feedback.fallback_text.trim().is_empty() || self.feedback.empty_text.trim().is_empty()
        {
            return Err(ArcadeError::config_validation(
                "feedback fallback texts must not be empty",
                "Provide feedback.fallbackText and feedback.emptyText phrases in your arcade.json",
            ));
        }

        if self.prompts.photo_edit.trim().is_empty()
            || self.prompts.default_animation.trim().is_empty()
        {
            return Err(ArcadeError::config_validation(
                "prompts must not be empty",
                "Provide prompts.photoEdit and prompts.defaultAnimation in your arcade.json",
            ));
        }

        Ok(())
    }
}

/// Video generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Seconds between polls of a running video operation.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Polls allowed before the job is failed.
    #[serde(default = "default_max_polls")]
    pub max_polls: u32,

    /// Video aspect ratio.
    #[serde(default)]
    pub aspect_ratio: AspectRatio,

    /// Video resolution.
    #[serde(default)]
    pub resolution: Resolution,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            max_polls: default_max_polls(),
            aspect_ratio: AspectRatio::default(),
            resolution: Resolution::default(),
        }
    }
}

impl GenerationConfig {
    /// Poll policy for the media orchestrator.
    #[must_use]
    pub const fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_polls: self.max_polls,
        }
    }

    /// Output format for video jobs.
    #[must_use]
    pub const fn video_settings(&self) -> VideoSettings {
        VideoSettings {
            aspect_ratio: self.aspect_ratio,
            resolution: self.resolution,
        }
    }
}

/// End-of-game feedback settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackConfig {
    /// Spoken when the feedback service fails or times out.
    #[serde(default = "default_fallback_text")]
    pub fallback_text: String,

    /// Spoken when the service answers with nothing usable.
    #[serde(default = "default_empty_text")]
    pub empty_text: String,

    /// Seconds to wait for the service.
    #[serde(default = "default_feedback_timeout")]
    pub timeout_secs: u64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            fallback_text: default_fallback_text(),
            empty_text: default_empty_text(),
            timeout_secs: default_feedback_timeout(),
        }
    }
}

impl FeedbackConfig {
    /// Service timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Media prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptConfig {
    /// Edit applied to camera stills.
    #[serde(default = "default_photo_edit_prompt")]
    pub photo_edit: String,

    /// Animation prompt used when the player gives none.
    #[serde(default = "default_animation_prompt")]
    pub default_animation: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            photo_edit: default_photo_edit_prompt(),
            default_animation: default_animation_prompt(),
        }
    }
}
