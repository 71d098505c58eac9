//! Capture device abstraction.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{CaptureArtifact, Result};

/// Kind of input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    /// Video input, used for stills.
    Camera,
    /// Audio input.
    Microphone,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera => write!(f, "camera"),
            Self::Microphone => write!(f, "microphone"),
        }
    }
}

/// Platform entry point for opening devices.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Requests access to the given devices. May prompt the user.
    async fn open(&self, kinds: &[DeviceKind]) -> Result<Box<dyn DeviceHandle>>;
}

/// An open device stream. Dropping the handle without calling
/// [`stop`](DeviceHandle::stop) may leave the hardware indicator on.
pub trait DeviceHandle: Send + Sync {
    /// Captures the current frame as a still image.
    fn snapshot(&mut self) -> Result<CaptureArtifact>;

    /// Stops every track of the stream.
    fn stop(&mut self);
}
