//! Session events for presentation.
//!
//! Everything a front end needs to render a session is published here as a
//! [`GameEvent`]. Events are serialized as `{"event": ..., "payload": ...}`.

use arcade_media::{GenerationKind, JobId, JobStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::Result;
use crate::games::GameType;
use crate::machine::GameSession;

// ============================================================================
// Events
// ============================================================================

/// Something presentation should react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum GameEvent {
    /// A game was selected.
    SessionStarted {
        /// Fresh session snapshot.
        session: GameSession,
        /// Character hosting the game.
        character: String,
    },
    /// A new round is ready.
    RoundStarted {
        /// Level of the round.
        level: u32,
        /// Prompt shown to the player.
        prompt: String,
    },
    /// An input arrived while another was being judged, or after the end.
    InputIgnored,
    /// A round was solved.
    Correct {
        /// Score so far.
        score: u32,
    },
    /// A sub-item was cleared.
    ItemCleared {
        /// Score so far.
        score: u32,
    },
    /// Wrong input; the round stays.
    Wrong,
    /// A level was cleared.
    LevelComplete {
        /// New level.
        level: u32,
        /// Score so far.
        score: u32,
    },
    /// The game was won. Sent once per session.
    GameComplete {
        /// Final score.
        final_score: u32,
    },
    /// A photo edit or video is ready to show.
    MediaReady {
        /// Which generation produced it.
        kind: GenerationKind,
        /// `false` when the raw capture is shown instead of an edit.
        edited: bool,
    },
    /// Capture or generation failed.
    MediaFailed {
        /// What went wrong.
        message: String,
        /// Whether trying again can help.
        retryable: bool,
    },
    /// A video job moved forward.
    GenerationStatus {
        /// Job being tracked.
        job_id: JobId,
        /// Job status.
        status: JobStatus,
        /// Polls made so far.
        polls: u32,
    },
    /// End-of-game feedback is ready.
    FeedbackReady {
        /// Text to show and speak.
        text: String,
        /// `true` when the fallback phrase was used.
        fallback: bool,
    },
    /// The player left the game.
    SessionEnded {
        /// Game that ended.
        game_type: GameType,
        /// Whether it was finished.
        completed: bool,
    },
}

impl GameEvent {
    /// Returns the event name as a string.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } => "session_started",
            Self::RoundStarted { .. } => "round_started",
            Self::InputIgnored => "input_ignored",
            Self::Correct { .. } => "correct",
            Self::ItemCleared { .. } => "item_cleared",
            Self::Wrong => "wrong",
            Self::LevelComplete { .. } => "level_complete",
            Self::GameComplete { .. } => "game_complete",
            Self::MediaReady { .. } => "media_ready",
            Self::MediaFailed { .. } => "media_failed",
            Self::GenerationStatus { .. } => "generation_status",
            Self::FeedbackReady { .. } => "feedback_ready",
            Self::SessionEnded { .. } => "session_ended",
        }
    }

    /// Serializes the event for a front end.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Fans session events out to every subscriber.
///
/// Events are not kept for subscribers that join later, and a subscriber
/// that falls more than `capacity` events behind gets a `Lagged` error.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<GameEvent>,
}

impl EventBroadcaster {
    /// Creates a broadcaster buffering `capacity` events per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Creates a new subscriber.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.sender.subscribe()
    }

    /// Publishes `event`. Returns how many subscribers will see it.
    pub fn send(&self, event: GameEvent) -> usize {
        // Err only means nobody is listening
        self.sender.send(event).unwrap_or(0)
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::machine::GameState;

    // ------------------------------------------------------------------------
    // Serialization Tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_event_wire_shape() {
        let json = GameEvent::LevelComplete { level: 2, score: 33 }.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"event":"level_complete","payload":{"level":2,"score":33}}"#
        );
        assert_eq!(GameEvent::Wrong.to_json().unwrap(), r#"{"event":"wrong"}"#);
    }

    #[test]
    fn test_feedback_event_snapshot() {
        let event = GameEvent::FeedbackReady {
            text: "¡Bien hecho!".to_string(),
            fallback: false,
        };
        insta::assert_snapshot!(
            event.to_json().unwrap(),
            @r#"{"event":"feedback_ready","payload":{"text":"¡Bien hecho!","fallback":false}}"#
        );
    }

    #[test]
    fn test_session_started_round_trip() {
        let event = GameEvent::SessionStarted {
            session: GameSession {
                game_type: GameType::Math,
                level: 1,
                max_levels: 3,
                score: 0,
                state: GameState::AwaitingInput,
            },
            character: "Tulio".to_string(),
        };
        let parsed: GameEvent = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(parsed, event);
        assert_eq!(parsed.event_name(), "session_started");
    }

    #[test]
    fn test_generation_status_payload() {
        let event = GameEvent::GenerationStatus {
            job_id: JobId(4),
            status: JobStatus::Polling,
            polls: 2,
        };
        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(value["payload"]["status"], "polling");
        assert_eq!(value["payload"]["job_id"], 4);
    }

    // ------------------------------------------------------------------------
    // Broadcaster Tests
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_broadcaster_multiple_subscribers() {
        let broadcaster = EventBroadcaster::new(10);
        let mut first = broadcaster.subscribe();
        let mut second = broadcaster.subscribe();

        assert_eq!(broadcaster.send(GameEvent::Wrong), 2);
        assert_eq!(first.recv().await.unwrap(), GameEvent::Wrong);
        assert_eq!(second.recv().await.unwrap(), GameEvent::Wrong);
    }

    #[test]
    fn test_broadcaster_without_subscribers() {
        let broadcaster = EventBroadcaster::default();
        assert_eq!(broadcaster.receiver_count(), 0);
        assert_eq!(broadcaster.send(GameEvent::InputIgnored), 0);
    }
}
