//! Error types for the arcade engine.
//!
//! Wrong answers are not errors; they are ordinary state transitions. The
//! variants here cover configuration problems, round generation bugs,
//! calls that do not fit the current session, and media failures.

use std::path::PathBuf;

use arcade_media::MediaError;

use crate::games::GameType;
use crate::round::RoundError;

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, ArcadeError>;

/// Errors that can occur while running arcade sessions.
#[derive(Debug, thiserror::Error)]
pub enum ArcadeError {
    // ========================================================================
    // Configuration
    // ========================================================================
    /// Invalid JSON or unreadable configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your arcade.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration values are out of range.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Rounds
    // ========================================================================
    /// A strategy produced an unplayable round.
    #[error("Invalid round for {game} level {level}: {source}")]
    InvalidRoundSpec {
        /// Game whose round generation failed.
        game: GameType,
        /// Level being generated.
        level: u32,
        /// What was wrong with the round.
        #[source]
        source: RoundError,
    },

    // ========================================================================
    // Session
    // ========================================================================
    /// The requested transition is not valid from the current state.
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current state.
        from: String,
        /// Requested state.
        to: String,
    },

    /// The call needs a game in progress.
    #[error("No game is in progress\n\nSuggestion: Select a game before sending input")]
    NoActiveSession,

    /// The call only applies to another kind of game.
    #[error("'{action}' is not available in {game}")]
    WrongGameKind {
        /// Game in progress.
        game: GameType,
        /// What was attempted.
        action: &'static str,
    },

    /// Video generation was requested before an image was loaded.
    #[error("No image loaded to animate\n\nSuggestion: Load or capture an image first")]
    NothingToAnimate,

    // ========================================================================
    // Wrapped
    // ========================================================================
    /// A capture or generation step failed.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// Event serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArcadeError {
    /// Creates a new `ConfigParseError`.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError`.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Creates a new `InvalidRoundSpec` error.
    #[must_use]
    pub const fn invalid_round(game: GameType, level: u32, source: RoundError) -> Self {
        Self::InvalidRoundSpec {
            game,
            level,
            source,
        }
    }

    /// Creates a new `InvalidStateTransition` error.
    #[must_use]
    pub fn invalid_transition(from: impl std::fmt::Display, to: impl std::fmt::Display) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Returns `true` if the session survives the error and the player can
    /// simply try again.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Media(err) => err.is_retryable(),
            Self::InvalidStateTransition { .. } | Self::NothingToAnimate => true,
            _ => false,
        }
    }

    /// Returns `true` if the error points at a bug or broken configuration.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigParseError { .. }
                | Self::ConfigValidationError { .. }
                | Self::InvalidRoundSpec { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use arcade_media::DeviceKind;

    use super::*;

    #[test]
    fn test_error_display_messages() {
        let err = ArcadeError::config_parse("/tmp/arcade.json", "expected value");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/arcade.json"));
        assert!(msg.contains("Suggestion"));

        let err = ArcadeError::invalid_round(GameType::Math, 2, RoundError::NoDistractors);
        assert!(err.to_string().contains("level 2"));
    }

    #[test]
    fn test_is_recoverable() {
        let timeout = ArcadeError::from(MediaError::GenerationTimedOut { polls: 60 });
        assert!(timeout.is_recoverable());
        assert!(!timeout.is_fatal());

        let denied = ArcadeError::from(MediaError::PermissionDenied(DeviceKind::Camera));
        assert!(denied.is_recoverable());

        assert!(!ArcadeError::from(MediaError::Cancelled).is_recoverable());
    }

    #[test]
    fn test_is_fatal() {
        let err = ArcadeError::invalid_round(GameType::Vowels, 1, RoundError::EmptyOptions);
        assert!(err.is_fatal());
        assert!(!ArcadeError::NoActiveSession.is_fatal());
    }
}
