//! In-memory capture devices.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use arcade_genai::MimeType;
use async_trait::async_trait;

use crate::device::{DeviceHandle, DeviceKind, MediaDevices};
use crate::{CaptureArtifact, MediaError, Result};

/// What the next [`FakeDevices::open`] call does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Open successfully.
    Grant,
    /// Fail with `PermissionDenied` for the first requested kind.
    Deny,
    /// Fail with `DeviceUnavailable`.
    Unavailable,
}

/// Devices that hand out a fixed frame and count opens and stops.
#[derive(Debug)]
pub struct FakeDevices {
    outcome: Mutex<OpenOutcome>,
    frame: Vec<u8>,
    opened: AtomicUsize,
    stopped: Arc<AtomicUsize>,
}

impl FakeDevices {
    /// Devices with the given open behaviour, serving `frame` as JPEG.
    #[must_use]
    pub fn new(outcome: OpenOutcome, frame: Vec<u8>) -> Self {
        Self {
            outcome: Mutex::new(outcome),
            frame,
            opened: AtomicUsize::new(0),
            stopped: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Devices that always open.
    #[must_use]
    pub fn granting(frame: Vec<u8>) -> Self {
        Self::new(OpenOutcome::Grant, frame)
    }

    /// Changes what later opens do.
    pub fn set_outcome(&self, outcome: OpenOutcome) {
        *self.outcome.lock().unwrap_or_else(PoisonError::into_inner) = outcome;
    }

    /// Successful opens so far.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Streams stopped so far.
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Returns `true` if a stream is open right now.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.open_count() > self.stop_count()
    }
}

#[async_trait]
impl MediaDevices for FakeDevices {
    async fn open(&self, kinds: &[DeviceKind]) -> Result<Box<dyn DeviceHandle>> {
        let outcome = *self.outcome.lock().unwrap_or_else(PoisonError::into_inner);
        match outcome {
            OpenOutcome::Grant => {
                self.opened.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(FakeStream {
                    frame: self.frame.clone(),
                    stopped: Arc::clone(&self.stopped),
                    live: true,
                }))
            }
            OpenOutcome::Deny => Err(MediaError::PermissionDenied(
                kinds.first().copied().unwrap_or(DeviceKind::Camera),
            )),
            OpenOutcome::Unavailable => {
                Err(MediaError::DeviceUnavailable("no device found".to_string()))
            }
        }
    }
}

#[derive(Debug)]
struct FakeStream {
    frame: Vec<u8>,
    stopped: Arc<AtomicUsize>,
    live: bool,
}

impl DeviceHandle for FakeStream {
    fn snapshot(&mut self) -> Result<CaptureArtifact> {
        if !self.live {
            return Err(MediaError::NotAcquired);
        }
        Ok(CaptureArtifact::new(self.frame.clone(), MimeType::Jpeg))
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.stopped.fetch_add(1, Ordering::SeqCst);
        }
    }
}
