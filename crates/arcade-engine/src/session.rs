//! The session controller.
//!
//! Owns the one active game, wires its state machine to the host
//! capabilities and the media pipeline, and asks for feedback when the game
//! is won.

use std::fmt;
use std::sync::Arc;

use arcade_genai::{
    clean_feedback, FeedbackRequest, FeedbackService, ImageEditService, VideoGenerationService,
};
use arcade_media::{
    CaptureArtifact, CaptureSession, CaptureState, GenerationJob, GenerationKind,
    ImageEditOutcome, JobId, MediaDevices, MediaError, MediaGenerationOrchestrator, VideoAsset,
    VideoJobHandle,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::capabilities::{Character, SpeechInput, SpeechOutput, Tone, TonePlayer, Utterance, Voice};
use crate::config::Config;
use crate::error::{ArcadeError, Result};
use crate::events::{EventBroadcaster, GameEvent};
use crate::games::{GameInput, GameType};
use crate::machine::{GameSession, InputOutcome, MiniGameStateMachine};
use crate::round::RoundSpec;

const IMAGE_LOADED: &str = "¡Imagen cargada!";

/// Everything the controller talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Speech playback.
    pub speech: Arc<dyn SpeechOutput>,
    /// Audio cues.
    pub tones: Arc<dyn TonePlayer>,
    /// Speech recognition.
    pub listener: Arc<dyn SpeechInput>,
    /// Camera and microphone.
    pub devices: Arc<dyn MediaDevices>,
    /// End-of-game feedback text.
    pub feedback: Arc<dyn FeedbackService>,
    /// Photo restyling.
    pub images: Arc<dyn ImageEditService>,
    /// Image animation.
    pub videos: Arc<dyn VideoGenerationService>,
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Speech, tones and events, shared by every step of a session.
struct Host {
    speech: Arc<dyn SpeechOutput>,
    tones: Arc<dyn TonePlayer>,
    events: EventBroadcaster,
    language: String,
}

impl Host {
    fn say(&self, voice: Voice, text: impl Into<String>, interrupt: bool) {
        self.speech.speak(&Utterance {
            text: text.into(),
            voice,
            interrupt,
            language: self.language.clone(),
        });
    }

    fn tone(&self, tone: Tone) {
        self.tones.play_tone(tone);
    }

    fn emit(&self, event: GameEvent) {
        self.events.send(event);
    }

    fn media_failed(&self, err: &MediaError) {
        self.emit(GameEvent::MediaFailed {
            message: err.to_string(),
            retryable: err.is_retryable(),
        });
    }
}

/// The game in progress.
struct ActiveGame {
    machine: MiniGameStateMachine,
    character: Character,
    capture: Option<CaptureSession>,
    media: Option<CaptureArtifact>,
    video: Option<VideoAsset>,
    pending_job: Option<JobId>,
    feedback: Option<String>,
    finished: bool,
}

impl ActiveGame {
    fn game(&self) -> GameType {
        self.machine.game_type()
    }

    fn require(&self, game: GameType, action: &'static str) -> Result<()> {
        if self.game() == game {
            Ok(())
        } else {
            Err(ArcadeError::WrongGameKind {
                game: self.game(),
                action,
            })
        }
    }
}

// ============================================================================
// SessionController
// ============================================================================

/// Runs one game at a time from selection to feedback.
pub struct SessionController {
    config: Config,
    host: Host,
    listener: Arc<dyn SpeechInput>,
    devices: Arc<dyn MediaDevices>,
    feedback: Arc<dyn FeedbackService>,
    generation: MediaGenerationOrchestrator,
    /// Video job whose status the session still reports.
    job_owner: watch::Sender<Option<JobId>>,
    active: Option<ActiveGame>,
    last_selection: Option<(GameType, Character)>,
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("session", &self.session())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    /// Creates a controller with no game selected.
    #[must_use]
    pub fn new(config: Config, collaborators: Collaborators) -> Self {
        let generation = MediaGenerationOrchestrator::new(
            collaborators.images,
            collaborators.videos,
            config.generation.poll_policy(),
        );
        Self {
            host: Host {
                speech: collaborators.speech,
                tones: collaborators.tones,
                events: EventBroadcaster::default(),
                language: config.language.clone(),
            },
            config,
            listener: collaborators.listener,
            devices: collaborators.devices,
            feedback: collaborators.feedback,
            generation,
            job_owner: watch::channel(None).0,
            active: None,
            last_selection: None,
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Subscribes to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.host.events.subscribe()
    }

    /// Snapshot of the game in progress.
    #[must_use]
    pub fn session(&self) -> Option<GameSession> {
        self.active.as_ref().map(|active| active.machine.session())
    }

    /// Current round.
    #[must_use]
    pub fn round(&self) -> Option<&RoundSpec> {
        self.active.as_ref().map(|active| active.machine.round())
    }

    /// Character hosting the game in progress.
    #[must_use]
    pub fn character(&self) -> Option<&Character> {
        self.active.as_ref().map(|active| &active.character)
    }

    /// Photo result, or the image loaded for animation.
    #[must_use]
    pub fn media(&self) -> Option<&CaptureArtifact> {
        self.active.as_ref().and_then(|active| active.media.as_ref())
    }

    /// Delivered video.
    #[must_use]
    pub fn video(&self) -> Option<&VideoAsset> {
        self.active.as_ref().and_then(|active| active.video.as_ref())
    }

    /// Feedback text once the game is won.
    #[must_use]
    pub fn feedback_text(&self) -> Option<&str> {
        self.active.as_ref().and_then(|active| active.feedback.as_deref())
    }

    /// Camera state for camera games.
    #[must_use]
    pub fn capture_state(&self) -> Option<CaptureState> {
        self.active
            .as_ref()
            .and_then(|active| active.capture.as_ref())
            .map(CaptureSession::state)
    }

    /// The media pipeline.
    #[must_use]
    pub const fn generation(&self) -> &MediaGenerationOrchestrator {
        &self.generation
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    /// Starts `game` hosted by `character`, ending any game in progress.
    ///
    /// For camera games the camera is requested right away; a refusal is
    /// reported as a `media_failed` event and can be retried with
    /// [`acquire_camera`](Self::acquire_camera).
    #[instrument(skip(self, character), fields(character = %character.name))]
    pub async fn select_game(&mut self, game: GameType, character: Character) -> Result<GameSession> {
        self.end_session();

        let rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let machine = MiniGameStateMachine::new(game, rng)?;
        let capture = game
            .uses_camera()
            .then(|| CaptureSession::camera(Arc::clone(&self.devices)));

        self.host.tone(Tone::Click);
        self.host.say(character.voice, character.greeting(), true);

        let session = machine.session();
        self.host.emit(GameEvent::SessionStarted {
            session: session.clone(),
            character: character.name.clone(),
        });
        self.last_selection = Some((game, character.clone()));
        self.active = Some(ActiveGame {
            machine,
            character,
            capture,
            media: None,
            video: None,
            pending_job: None,
            feedback: None,
            finished: false,
        });
        self.announce_round();
        info!(%game, "Session started");

        if game.uses_camera() {
            // reported through events; the player retries from the game screen
            let _ = self.acquire_camera().await;
        }
        Ok(session)
    }

    /// Starts the last selected game again from level 1.
    pub async fn replay(&mut self) -> Result<GameSession> {
        let (game, character) = self
            .last_selection
            .clone()
            .ok_or(ArcadeError::NoActiveSession)?;
        self.select_game(game, character).await
    }

    /// Leaves the game in progress, cancelling any video job and releasing
    /// the camera.
    pub fn return_to_menu(&mut self) {
        self.host.speech.stop();
        self.host.tone(Tone::Click);
        self.end_session();
    }

    fn end_session(&mut self) {
        let Some(mut active) = self.active.take() else {
            return;
        };
        self.job_owner.send_replace(None);
        if self.generation.cancel_active() {
            debug!("Cancelled generation job on exit");
        }
        if let Some(capture) = active.capture.as_mut() {
            capture.release();
        }
        let game = active.game();
        let completed = active.machine.state().is_terminal();
        self.host.emit(GameEvent::SessionEnded {
            game_type: game,
            completed,
        });
        info!(%game, completed, "Session ended");
    }

    fn announce_round(&self) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let level = active.machine.level();
        let text = if level == 1 {
            active.game().instruction().to_string()
        } else {
            format!("Nivel {level}")
        };
        self.host.say(active.character.voice, text, false);
        self.host.emit(GameEvent::RoundStarted {
            level,
            prompt: active.machine.round().prompt.clone(),
        });
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    /// Hands one player input to the game in progress.
    pub async fn submit(&mut self, input: GameInput) -> Result<InputOutcome> {
        let active = self.active.as_mut().ok_or(ArcadeError::NoActiveSession)?;
        let outcome = active.machine.handle_input(&input)?;
        self.settle(outcome).await
    }

    /// Listens for a spoken answer in a voice game.
    ///
    /// A recognition failure gives the round back so the player can try
    /// again.
    #[instrument(skip(self))]
    pub async fn listen(&mut self) -> Result<InputOutcome> {
        let active = self.active.as_mut().ok_or(ArcadeError::NoActiveSession)?;
        if !active.game().uses_voice() {
            return Err(ArcadeError::WrongGameKind {
                game: active.game(),
                action: "listen",
            });
        }
        if !active.machine.begin_evaluation() {
            self.host.emit(GameEvent::InputIgnored);
            return Ok(InputOutcome::Ignored);
        }

        match self.listener.listen(&self.config.language).await {
            Ok(transcript) => {
                debug!(%transcript, "Heard");
                let outcome = active
                    .machine
                    .complete_evaluation(&GameInput::Transcript(transcript))?;
                self.settle(outcome).await
            }
            Err(err) => {
                active.machine.abort_evaluation();
                warn!(error = %err, "Speech recognition failed");
                self.host.media_failed(&err);
                Err(err.into())
            }
        }
    }

    async fn settle(&mut self, outcome: InputOutcome) -> Result<InputOutcome> {
        match outcome {
            InputOutcome::Ignored => self.host.emit(GameEvent::InputIgnored),
            InputOutcome::Pending => self.host.tone(Tone::Click),
            InputOutcome::Wrong => {
                self.host.tone(Tone::Wrong);
                self.host.emit(GameEvent::Wrong);
            }
            InputOutcome::ItemCleared { score } => {
                self.host.tone(Tone::Correct);
                self.host.emit(GameEvent::ItemCleared { score });
            }
            InputOutcome::LevelComplete { level, score } => {
                self.host.tone(Tone::Correct);
                self.host.emit(GameEvent::Correct { score });
                self.host.emit(GameEvent::LevelComplete { level, score });
                self.announce_round();
            }
            InputOutcome::GameComplete { final_score } => {
                self.host.emit(GameEvent::Correct { score: final_score });
                self.host.emit(GameEvent::GameComplete { final_score });
                self.finish().await;
            }
        }
        Ok(outcome)
    }

    /// Wraps up a won game. Runs at most once per session.
    async fn finish(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.finished {
            return;
        }
        active.finished = true;
        if let Some(capture) = active.capture.as_mut() {
            capture.release();
        }
        self.host.tone(Tone::Win);

        let request = FeedbackRequest {
            character: active.character.name.clone(),
            score: active.machine.score(),
            game_type: active.game().title().to_string(),
        };
        let settings = &self.config.feedback;
        let reply = tokio::time::timeout(settings.timeout(), self.feedback.feedback(&request)).await;
        let (text, fallback) = match reply {
            Ok(Ok(response)) => {
                let text = clean_feedback(&response.text);
                if text.is_empty() {
                    (settings.empty_text.clone(), false)
                } else {
                    (text, false)
                }
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Feedback request failed, using fallback");
                (settings.fallback_text.clone(), true)
            }
            Err(_) => {
                warn!(timeout = ?settings.timeout(), "Feedback request timed out, using fallback");
                (settings.fallback_text.clone(), true)
            }
        };

        self.host.say(active.character.voice, text.clone(), true);
        active.feedback = Some(text.clone());
        self.host.emit(GameEvent::FeedbackReady { text, fallback });
    }

    // ------------------------------------------------------------------------
    // Camera
    // ------------------------------------------------------------------------

    /// Requests the camera for the game in progress.
    pub async fn acquire_camera(&mut self) -> Result<()> {
        let active = self.active.as_mut().ok_or(ArcadeError::NoActiveSession)?;
        let game = active.game();
        let capture = active.capture.as_mut().ok_or(ArcadeError::WrongGameKind {
            game,
            action: "acquire_camera",
        })?;
        if let Err(err) = capture.acquire().await {
            self.host.media_failed(&err);
            return Err(err.into());
        }
        Ok(())
    }

    /// Takes a photo and turns it into a puppet.
    ///
    /// When the edit fails or returns nothing, the raw photo is shown
    /// instead. The game completes once the player confirms the result.
    #[instrument(skip(self))]
    pub async fn take_photo(&mut self) -> Result<InputOutcome> {
        let active = self.active.as_mut().ok_or(ArcadeError::NoActiveSession)?;
        active.require(GameType::MagicCamera, "take_photo")?;
        let game = active.game();
        let Some(capture) = active.capture.as_mut() else {
            return Err(ArcadeError::WrongGameKind {
                game,
                action: "take_photo",
            });
        };
        if !active.machine.begin_evaluation() {
            self.host.emit(GameEvent::InputIgnored);
            return Ok(InputOutcome::Ignored);
        }

        let still = match capture.capture_frame() {
            Ok(still) => still,
            Err(err) => {
                active.machine.abort_evaluation();
                self.host.media_failed(&err);
                return Err(err.into());
            }
        };
        self.host.tone(Tone::Click);

        let edit = match self
            .generation
            .submit_image_edit(still.clone(), &self.config.prompts.photo_edit)
            .await
        {
            Ok(edit) => edit,
            Err(err) => {
                warn!(error = %err, "Photo edit failed, keeping the raw photo");
                ImageEditOutcome::Unchanged(still)
            }
        };
        let edited = edit.is_edited();
        active.media = Some(edit.into_artifact());
        self.host.tone(Tone::Win);
        self.host.emit(GameEvent::MediaReady {
            kind: GenerationKind::ImageEdit,
            edited,
        });
        Ok(active.machine.complete_evaluation(&GameInput::MediaReady)?)
    }

    // ------------------------------------------------------------------------
    // Animation
    // ------------------------------------------------------------------------

    /// Sets the image to animate.
    pub fn load_image(&mut self, image: CaptureArtifact) -> Result<()> {
        let active = self.active.as_mut().ok_or(ArcadeError::NoActiveSession)?;
        active.require(GameType::Animation, "load_image")?;
        active.media = Some(image);
        self.host.tone(Tone::Click);
        self.host.say(active.character.voice, IMAGE_LOADED, true);
        Ok(())
    }

    /// Starts animating the loaded image. A blank prompt uses the default
    /// animation prompt.
    ///
    /// The round stays claimed until [`finish_animation`](Self::finish_animation)
    /// is called with the job's result; inputs in between are ignored.
    #[instrument(skip(self))]
    pub fn start_animation(&mut self, prompt: Option<&str>) -> Result<VideoJobHandle> {
        let active = self.active.as_mut().ok_or(ArcadeError::NoActiveSession)?;
        active.require(GameType::Animation, "start_animation")?;
        let image = active.media.clone().ok_or(ArcadeError::NothingToAnimate)?;
        if self.generation.is_busy() {
            return Err(MediaError::JobAlreadyActive.into());
        }
        if !active.machine.begin_evaluation() {
            return Err(ArcadeError::invalid_transition(
                active.machine.state(),
                "evaluating",
            ));
        }

        let prompt = prompt
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
            .unwrap_or(self.config.prompts.default_animation.as_str());
        let handle = match self.generation.submit_video_generation(
            image,
            prompt,
            self.config.generation.video_settings(),
        ) {
            Ok(handle) => handle,
            Err(err) => {
                active.machine.abort_evaluation();
                self.host.media_failed(&err);
                return Err(err.into());
            }
        };
        self.host.tone(Tone::Click);
        active.pending_job = Some(handle.id());
        self.job_owner.send_replace(Some(handle.id()));
        tokio::spawn(forward_job_status(
            handle.subscribe(),
            self.job_owner.subscribe(),
            self.host.events.clone(),
        ));
        Ok(handle)
    }

    /// Applies the result of a video job started by
    /// [`start_animation`](Self::start_animation).
    ///
    /// Results for jobs that no longer belong to the session are ignored.
    pub fn finish_animation(
        &mut self,
        job: JobId,
        result: std::result::Result<VideoAsset, MediaError>,
    ) -> Result<InputOutcome> {
        let Some(active) = self.active.as_mut() else {
            debug!(%job, "Video result arrived after the session ended");
            return Ok(InputOutcome::Ignored);
        };
        if active.pending_job != Some(job) {
            debug!(%job, "Video result for a stale job");
            return Ok(InputOutcome::Ignored);
        }
        active.pending_job = None;

        match result {
            Ok(asset) => {
                active.video = Some(asset);
                self.host.tone(Tone::Win);
                self.host.emit(GameEvent::MediaReady {
                    kind: GenerationKind::VideoGeneration,
                    edited: true,
                });
                Ok(active.machine.complete_evaluation(&GameInput::MediaReady)?)
            }
            Err(err) => {
                active.machine.abort_evaluation();
                self.host.media_failed(&err);
                Err(err.into())
            }
        }
    }

    /// Starts animating and waits for the video.
    pub async fn animate(&mut self, prompt: Option<&str>) -> Result<InputOutcome> {
        let handle = self.start_animation(prompt)?;
        let job = handle.id();
        let result = handle.wait().await;
        self.finish_animation(job, result)
    }
}

/// Relays job progress until the job ends or leaves the session.
async fn forward_job_status(
    mut status: watch::Receiver<GenerationJob>,
    mut owner: watch::Receiver<Option<JobId>>,
    events: EventBroadcaster,
) {
    loop {
        let (event, id, terminal) = {
            let job = status.borrow_and_update();
            (
                GameEvent::GenerationStatus {
                    job_id: job.id,
                    status: job.status,
                    polls: job.polls,
                },
                job.id,
                job.status.is_terminal(),
            )
        };
        let owned = *owner.borrow_and_update() == Some(id);
        if !owned {
            debug!(job = %id, "Job left the session, status no longer reported");
            break;
        }
        events.send(event);
        if terminal {
            break;
        }
        tokio::select! {
            changed = status.changed() => if changed.is_err() { break },
            changed = owner.changed() => if changed.is_err() { break },
        }
    }
}
