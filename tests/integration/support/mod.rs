//! Shared wiring for the end-to-end scenarios.

#![allow(dead_code)]

use std::sync::Arc;

use arcade_engine::testing::{RecordingSpeech, RecordingTones, ScriptedListener};
use arcade_engine::{
    Character, Collaborators, Config, GameEvent, GameInput, RoundContent, SessionController,
};
use arcade_genai::testing::{ScriptedFeedback, ScriptedImageEditor, ScriptedVideoService};
use arcade_media::testing::FakeDevices;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

/// JPEG magic bytes, enough for a fake frame.
pub const FRAME: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

/// Doubles to build an arcade from. Defaults answer everything successfully.
pub struct Parts {
    pub config: Config,
    pub feedback: Arc<ScriptedFeedback>,
    pub listener: Arc<ScriptedListener>,
    pub devices: Arc<FakeDevices>,
    pub images: Arc<ScriptedImageEditor>,
    pub videos: Arc<ScriptedVideoService>,
}

impl Default for Parts {
    fn default() -> Self {
        Self {
            config: Config {
                rng_seed: Some(2024),
                ..Config::default()
            },
            feedback: Arc::new(ScriptedFeedback::replying("¡Muy bien, campeón!")),
            listener: Arc::new(ScriptedListener::default()),
            devices: Arc::new(FakeDevices::granting(FRAME.to_vec())),
            images: Arc::new(ScriptedImageEditor::returning(vec![0x89, 0x50, 0x4E, 0x47])),
            videos: Arc::new(ScriptedVideoService::ready_after(3, b"mp4".to_vec())),
        }
    }
}

/// A controller plus handles on every double behind it.
pub struct Arcade {
    pub controller: SessionController,
    pub events: broadcast::Receiver<GameEvent>,
    pub speech: Arc<RecordingSpeech>,
    pub tones: Arc<RecordingTones>,
    pub feedback: Arc<ScriptedFeedback>,
    pub devices: Arc<FakeDevices>,
    pub images: Arc<ScriptedImageEditor>,
    pub videos: Arc<ScriptedVideoService>,
}

impl Arcade {
    pub fn new(parts: Parts) -> Self {
        let speech = Arc::new(RecordingSpeech::new());
        let tones = Arc::new(RecordingTones::new());
        let controller = SessionController::new(
            parts.config,
            Collaborators {
                speech: speech.clone(),
                tones: tones.clone(),
                listener: parts.listener,
                devices: parts.devices.clone(),
                feedback: parts.feedback.clone(),
                images: parts.images.clone(),
                videos: parts.videos.clone(),
            },
        );
        let events = controller.subscribe();
        Self {
            controller,
            events,
            speech,
            tones,
            feedback: parts.feedback,
            devices: parts.devices,
            images: parts.images,
            videos: parts.videos,
        }
    }

    /// Events published since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        let mut seen = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(event) => seen.push(event),
                Err(TryRecvError::Lagged(_)) => {}
                Err(_) => return seen,
            }
        }
    }

    /// The correct choice for the current choice round.
    pub fn right_choice(&self) -> GameInput {
        match &self.controller.round().expect("no active round").content {
            RoundContent::Choice(options) => GameInput::Choose(options.answer_index()),
            other => panic!("not a choice round: {other:?}"),
        }
    }

    /// Some wrong choice for the current choice round.
    pub fn wrong_choice(&self) -> GameInput {
        match &self.controller.round().expect("no active round").content {
            RoundContent::Choice(options) => {
                GameInput::Choose((options.answer_index() + 1) % options.len())
            }
            other => panic!("not a choice round: {other:?}"),
        }
    }
}

pub fn bodoque() -> Character {
    Character::new("bodoque", "Juan Carlos Bodoque")
}

pub fn count<F>(events: &[GameEvent], predicate: F) -> usize
where
    F: Fn(&GameEvent) -> bool,
{
    events.iter().filter(|event| predicate(event)).count()
}
