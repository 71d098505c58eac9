//! Arcade media handling.
//!
//! Two concerns live here: owning a capture device for exactly as long as a
//! game needs it ([`CaptureSession`]), and running generative edits and
//! animations as tracked, cancellable jobs ([`MediaGenerationOrchestrator`]).

pub mod capture;
pub mod device;
pub mod generation;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

use std::sync::Arc;

use arcade_genai::{GenAiError, MimeType};
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use capture::{CaptureSession, CaptureState};
pub use device::{DeviceHandle, DeviceKind, MediaDevices};
pub use generation::{
    GeneratedAsset, GenerationJob, GenerationKind, ImageEditOutcome, JobId, JobStatus,
    MediaGenerationOrchestrator, PollPolicy, VideoAsset, VideoJobHandle, VideoSettings,
};

/// A specialized `Result` type for media operations.
pub type Result<T> = std::result::Result<T, MediaError>;

/// Errors raised by capture devices and generation jobs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    /// The user or platform refused access to a device.
    #[error("permission denied for {0}")]
    PermissionDenied(DeviceKind),

    /// The device exists but could not be opened or read.
    #[error("device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A frame was requested before the device was acquired.
    #[error("capture device has not been acquired")]
    NotAcquired,

    /// The generative backend could not be reached or rejected the call.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered but produced nothing usable.
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// The job was still running after the last allowed poll.
    #[error("generation timed out after {polls} polls")]
    GenerationTimedOut {
        /// Polls performed before giving up.
        polls: u32,
    },

    /// Another job already owns the generation slot.
    #[error("a generation job is already running")]
    JobAlreadyActive,

    /// The job was cancelled before it finished.
    #[error("generation was cancelled")]
    Cancelled,
}

impl MediaError {
    /// Returns `true` if the user can reasonably try the same action again.
    ///
    /// A refused device counts: the player may grant access and acquire
    /// again. Only a cancelled job is final.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl From<GenAiError> for MediaError {
    fn from(err: GenAiError) -> Self {
        if err.is_transport() {
            Self::Transport(err.to_string())
        } else {
            Self::GenerationFailed(err.to_string())
        }
    }
}

/// A still image captured from a device or loaded by the user.
///
/// The bytes are shared, so clones are cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureArtifact {
    data: Arc<[u8]>,
    mime_type: MimeType,
    captured_at: DateTime<Utc>,
}

impl CaptureArtifact {
    /// Wraps image bytes, stamping the current time.
    #[must_use]
    pub fn new(data: impl Into<Arc<[u8]>>, mime_type: MimeType) -> Self {
        Self {
            data: data.into(),
            mime_type,
            captured_at: Utc::now(),
        }
    }

    /// Image bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the image bytes.
    #[must_use]
    pub fn shared_data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }

    /// Image format.
    #[must_use]
    pub const fn mime_type(&self) -> MimeType {
        self.mime_type
    }

    /// When the image was captured or loaded.
    #[must_use]
    pub const fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the image has no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
