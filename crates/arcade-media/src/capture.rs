//! Scoped ownership of a capture device.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::device::{DeviceHandle, DeviceKind, MediaDevices};
use crate::{CaptureArtifact, MediaError, Result};

/// Lifecycle of a [`CaptureSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    /// Not yet acquired.
    #[default]
    Idle,
    /// The device is open.
    Live,
    /// The last acquisition attempt failed. Acquiring again is allowed.
    Failed,
    /// The device was released.
    Released,
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Live => write!(f, "live"),
            Self::Failed => write!(f, "failed"),
            Self::Released => write!(f, "released"),
        }
    }
}

/// Owns a device stream from acquisition until release.
///
/// The stream is stopped on [`release`](Self::release) and again, if still
/// open, when the session is dropped, so the device never outlives the game
/// that opened it.
pub struct CaptureSession {
    devices: Arc<dyn MediaDevices>,
    kinds: Vec<DeviceKind>,
    handle: Option<Box<dyn DeviceHandle>>,
    state: CaptureState,
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("kinds", &self.kinds)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl CaptureSession {
    /// Creates an idle session for the given devices.
    #[must_use]
    pub fn new(devices: Arc<dyn MediaDevices>, kinds: Vec<DeviceKind>) -> Self {
        Self {
            devices,
            kinds,
            handle: None,
            state: CaptureState::Idle,
        }
    }

    /// Creates an idle camera-only session.
    #[must_use]
    pub fn camera(devices: Arc<dyn MediaDevices>) -> Self {
        Self::new(devices, vec![DeviceKind::Camera])
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> CaptureState {
        self.state
    }

    /// Returns `true` while the device is open.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self.state, CaptureState::Live)
    }

    /// Opens the device. Does nothing if it is already open.
    ///
    /// On failure the session moves to [`CaptureState::Failed`] and can be
    /// acquired again later.
    #[instrument(skip(self), fields(kinds = ?self.kinds))]
    pub async fn acquire(&mut self) -> Result<()> {
        if self.handle.is_some() {
            debug!("Capture device already acquired");
            return Ok(());
        }
        match self.devices.open(&self.kinds).await {
            Ok(handle) => {
                self.handle = Some(handle);
                self.state = CaptureState::Live;
                info!("Capture device acquired");
                Ok(())
            }
            Err(err) => {
                self.state = CaptureState::Failed;
                warn!(error = %err, "Capture device acquisition failed");
                Err(err)
            }
        }
    }

    /// Captures a still from the open device.
    pub fn capture_frame(&mut self) -> Result<CaptureArtifact> {
        let handle = self.handle.as_mut().ok_or(MediaError::NotAcquired)?;
        let artifact = handle.snapshot()?;
        debug!(bytes = artifact.len(), "Captured frame");
        Ok(artifact)
    }

    /// Stops the device. Safe to call repeatedly and after a failed acquire.
    pub fn release(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.stop();
            info!("Capture device released");
        }
        if self.state != CaptureState::Idle {
            self.state = CaptureState::Released;
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.release();
    }
}
