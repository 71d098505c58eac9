//! Generative media jobs.
//!
//! Image edits are a single round-trip. Video generation is a long-running
//! remote operation: the orchestrator submits it, then polls on a fixed
//! interval from a background task until the asset is ready, the poll
//! budget runs out, or the job is cancelled. At most one job of either kind
//! runs at a time.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use arcade_genai::{
    AspectRatio, ImageEditRequest, ImageEditService, Resolution, VideoGenerationService,
    VideoRequest,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, instrument, warn};

use crate::{CaptureArtifact, MediaError, Result};

// ============================================================================
// Job model
// ============================================================================

/// Identifier of a generation job, unique per orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// What a job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationKind {
    /// Restyled still image.
    ImageEdit,
    /// Animated clip from a still.
    VideoGeneration,
}

/// Status of a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Submitted, no remote operation yet.
    #[default]
    Pending,
    /// The remote operation exists and is being polled.
    Polling,
    /// Finished with a result.
    Done,
    /// Finished without a result.
    Failed,
}

impl JobStatus {
    /// Returns `true` once the job can no longer change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Polling => write!(f, "polling"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// A downloaded video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAsset {
    /// Where the backend served the video from.
    pub uri: String,
    /// MP4 bytes.
    pub data: Arc<[u8]>,
}

/// Result of a finished job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedAsset {
    /// Output of an image edit.
    Image(CaptureArtifact),
    /// Output of a video generation.
    Video(VideoAsset),
}

/// Snapshot of a generation job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    /// Job identifier.
    pub id: JobId,
    /// What the job produces.
    pub kind: GenerationKind,
    /// Instruction sent with the input.
    pub prompt: String,
    /// Image the job started from.
    pub input: CaptureArtifact,
    /// Current status.
    pub status: JobStatus,
    /// Polls performed so far.
    pub polls: u32,
    /// Output, once `Done`.
    pub result: Option<GeneratedAsset>,
    /// Failure, once `Failed`.
    pub error: Option<MediaError>,
    /// When the job was submitted.
    pub submitted_at: DateTime<Utc>,
    /// When the job last changed.
    pub updated_at: DateTime<Utc>,
}

impl GenerationJob {
    fn new(id: JobId, kind: GenerationKind, prompt: &str, input: CaptureArtifact) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind,
            prompt: prompt.to_string(),
            input,
            status: JobStatus::Pending,
            polls: 0,
            result: None,
            error: None,
            submitted_at: now,
            updated_at: now,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn finish(&mut self, outcome: Result<GeneratedAsset>) {
        match outcome {
            Ok(asset) => {
                self.status = JobStatus::Done;
                self.result = Some(asset);
            }
            Err(err) => {
                self.status = JobStatus::Failed;
                self.error = Some(err);
            }
        }
        self.touch();
    }
}

// ============================================================================
// Policies
// ============================================================================

/// How often and how long to poll a video operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each poll.
    pub interval: Duration,
    /// Polls allowed before the job fails with `GenerationTimedOut`.
    pub max_polls: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_polls: 60,
        }
    }
}

/// Output format of a video job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoSettings {
    /// Aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Resolution.
    pub resolution: Resolution,
}

/// Result of an image edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageEditOutcome {
    /// The backend returned a new image.
    Edited(CaptureArtifact),
    /// The backend answered without an image; the input is returned as is.
    Unchanged(CaptureArtifact),
}

impl ImageEditOutcome {
    /// The image to show, edited or not.
    #[must_use]
    pub fn into_artifact(self) -> CaptureArtifact {
        match self {
            Self::Edited(artifact) | Self::Unchanged(artifact) => artifact,
        }
    }

    /// Returns `true` if the backend produced a new image.
    #[must_use]
    pub const fn is_edited(&self) -> bool {
        matches!(self, Self::Edited(_))
    }
}

// ============================================================================
// Active job slot
// ============================================================================

struct ActiveSlot {
    id: JobId,
    status: watch::Receiver<GenerationJob>,
    cancel: Option<oneshot::Sender<()>>,
}

type Slot = Arc<Mutex<Option<ActiveSlot>>>;

fn lock_slot(slot: &Slot) -> MutexGuard<'_, Option<ActiveSlot>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Frees the slot when the job ends, including when its future is dropped.
struct SlotGuard {
    slot: Slot,
    id: JobId,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let mut active = lock_slot(&self.slot);
        if active.as_ref().is_some_and(|job| job.id == self.id) {
            *active = None;
        }
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Runs generative media jobs one at a time.
pub struct MediaGenerationOrchestrator {
    images: Arc<dyn ImageEditService>,
    videos: Arc<dyn VideoGenerationService>,
    policy: PollPolicy,
    active: Slot,
    next_id: AtomicU64,
}

impl fmt::Debug for MediaGenerationOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaGenerationOrchestrator")
            .field("policy", &self.policy)
            .field("active", &self.active_job().map(|job| job.id))
            .finish_non_exhaustive()
    }
}

impl MediaGenerationOrchestrator {
    /// Creates an orchestrator over the given services.
    #[must_use]
    pub fn new(
        images: Arc<dyn ImageEditService>,
        videos: Arc<dyn VideoGenerationService>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            images,
            videos,
            policy,
            active: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(1),
        }
    }

    /// Polling policy for video jobs.
    #[must_use]
    pub const fn policy(&self) -> PollPolicy {
        self.policy
    }

    /// Snapshot of the running job, if any.
    #[must_use]
    pub fn active_job(&self) -> Option<GenerationJob> {
        lock_slot(&self.active)
            .as_ref()
            .map(|job| job.status.borrow().clone())
    }

    /// Returns `true` while a job owns the slot.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        lock_slot(&self.active).is_some()
    }

    /// Claims the slot for a new job.
    fn reserve(
        &self,
        kind: GenerationKind,
        prompt: &str,
        input: CaptureArtifact,
        cancel: Option<oneshot::Sender<()>>,
    ) -> Result<(SlotGuard, watch::Sender<GenerationJob>)> {
        let mut active = lock_slot(&self.active);
        if let Some(job) = active.as_ref() {
            warn!(active = %job.id, "Rejected job submission while another job is running");
            return Err(MediaError::JobAlreadyActive);
        }
        let id = JobId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = watch::channel(GenerationJob::new(id, kind, prompt, input));
        *active = Some(ActiveSlot {
            id,
            status: rx,
            cancel,
        });
        drop(active);
        Ok((
            SlotGuard {
                slot: Arc::clone(&self.active),
                id,
            },
            tx,
        ))
    }

    /// Restyles `input`.
    ///
    /// A response without an image yields [`ImageEditOutcome::Unchanged`].
    /// Dropping the returned future abandons the request and frees the slot.
    #[instrument(skip(self, input), fields(bytes = input.len()))]
    pub async fn submit_image_edit(
        &self,
        input: CaptureArtifact,
        prompt: &str,
    ) -> Result<ImageEditOutcome> {
        let (guard, status) =
            self.reserve(GenerationKind::ImageEdit, prompt, input.clone(), None)?;
        let request = ImageEditRequest {
            image: input.shared_data(),
            mime_type: input.mime_type(),
            prompt_text: prompt.to_string(),
        };

        let outcome = match self.images.edit_image(&request).await {
            Ok(response) => Ok(match response.image {
                Some(image) => {
                    ImageEditOutcome::Edited(CaptureArtifact::new(image.data, image.mime_type))
                }
                None => ImageEditOutcome::Unchanged(input),
            }),
            Err(err) => Err(MediaError::from(err)),
        };

        drop(guard);
        status.send_modify(|job| {
            job.finish(
                outcome
                    .as_ref()
                    .map(|edit| GeneratedAsset::Image(edit.clone().into_artifact()))
                    .map_err(Clone::clone),
            );
        });
        match &outcome {
            Ok(edit) => info!(edited = edit.is_edited(), "Image edit finished"),
            Err(err) => warn!(error = %err, "Image edit failed"),
        }
        outcome
    }

    /// Starts animating `input` in the background.
    ///
    /// Must be called from within a Tokio runtime. Rejected with
    /// [`MediaError::JobAlreadyActive`] while another job runs; the running
    /// job is not affected.
    #[instrument(skip(self, input), fields(bytes = input.len()))]
    pub fn submit_video_generation(
        &self,
        input: CaptureArtifact,
        prompt: &str,
        settings: VideoSettings,
    ) -> Result<VideoJobHandle> {
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let (guard, status) = self.reserve(
            GenerationKind::VideoGeneration,
            prompt,
            input.clone(),
            Some(cancel_tx),
        )?;
        let id = guard.id;
        let handle = VideoJobHandle {
            id,
            status: status.subscribe(),
        };
        let request = VideoRequest {
            image: input.shared_data(),
            mime_type: input.mime_type(),
            prompt_text: prompt.to_string(),
            aspect_ratio: settings.aspect_ratio,
            resolution: settings.resolution,
        };

        tokio::spawn(run_video_job(
            Arc::clone(&self.videos),
            self.policy,
            request,
            status,
            cancel_rx,
            guard,
        ));
        info!(job = %id, "Video generation started");
        Ok(handle)
    }

    /// Cancels the running video job. Returns `false` if there was none.
    ///
    /// The slot is free as soon as this returns; the job's task reports
    /// `Cancelled` when it next runs. Image edits are cancelled by dropping
    /// their future instead.
    pub fn cancel_active(&self) -> bool {
        let job = {
            let mut active = lock_slot(&self.active);
            if active.as_ref().is_some_and(|job| job.cancel.is_some()) {
                active.take()
            } else {
                None
            }
        };
        match job.and_then(|job| job.cancel.map(|cancel| (job.id, cancel))) {
            Some((id, cancel)) => {
                let _ = cancel.send(());
                info!(job = %id, "Cancelled active generation job");
                true
            }
            None => false,
        }
    }
}

async fn run_video_job(
    service: Arc<dyn VideoGenerationService>,
    policy: PollPolicy,
    request: VideoRequest,
    status: watch::Sender<GenerationJob>,
    mut cancel: oneshot::Receiver<()>,
    guard: SlotGuard,
) {
    let id = guard.id;
    let outcome = tokio::select! {
        biased;
        _ = &mut cancel => Err(MediaError::Cancelled),
        outcome = drive_video_job(service.as_ref(), policy, &request, &status) => outcome,
    };

    match &outcome {
        Ok(asset) => info!(job = %id, bytes = asset.data.len(), "Video generation finished"),
        Err(err) => warn!(job = %id, error = %err, "Video generation failed"),
    }
    // Free the slot before publishing so a waiter can resubmit right away.
    drop(guard);
    status.send_modify(|job| job.finish(outcome.map(GeneratedAsset::Video)));
}

async fn drive_video_job(
    service: &dyn VideoGenerationService,
    policy: PollPolicy,
    request: &VideoRequest,
    status: &watch::Sender<GenerationJob>,
) -> Result<VideoAsset> {
    let operation = service.submit(request).await?;
    status.send_modify(|job| {
        job.status = JobStatus::Polling;
        job.touch();
    });
    debug!(operation = %operation.name, "Polling video operation");

    for poll in 1..=policy.max_polls {
        tokio::time::sleep(policy.interval).await;
        let progress = service.poll(&operation).await?;
        status.send_modify(|job| {
            job.polls = poll;
            job.touch();
        });
        if !progress.done {
            continue;
        }
        if let Some(reason) = progress.error {
            return Err(MediaError::GenerationFailed(reason));
        }
        let uri = progress.asset_uri.ok_or_else(|| {
            MediaError::GenerationFailed("operation finished without a video".to_string())
        })?;
        let data = service.fetch(&uri).await?;
        return Ok(VideoAsset {
            uri,
            data: data.into(),
        });
    }

    Err(MediaError::GenerationTimedOut {
        polls: policy.max_polls,
    })
}

// ============================================================================
// Handle
// ============================================================================

/// Observer for a running video job.
#[derive(Debug, Clone)]
pub struct VideoJobHandle {
    id: JobId,
    status: watch::Receiver<GenerationJob>,
}

impl VideoJobHandle {
    /// Job identifier.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.status.borrow().status
    }

    /// Full snapshot of the job.
    #[must_use]
    pub fn snapshot(&self) -> GenerationJob {
        self.status.borrow().clone()
    }

    /// Receiver that sees every status change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GenerationJob> {
        self.status.clone()
    }

    /// Waits for the job to end and returns its video.
    pub async fn wait(mut self) -> Result<VideoAsset> {
        let job = self
            .status
            .wait_for(|job| job.status.is_terminal())
            .await
            .map_err(|_| MediaError::Cancelled)?
            .clone();
        match (job.result, job.error) {
            (Some(GeneratedAsset::Video(asset)), _) => Ok(asset),
            (_, Some(err)) => Err(err),
            _ => Err(MediaError::GenerationFailed(
                "job ended without a video".to_string(),
            )),
        }
    }
}
