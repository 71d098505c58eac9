//! Request and response contracts shared by every generative backend.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

// ============================================================================
// Media formats
// ============================================================================

/// Image formats accepted by the edit and animation endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MimeType {
    /// `image/jpeg`, produced by camera stills.
    #[default]
    #[serde(rename = "image/jpeg")]
    Jpeg,
    /// `image/png`.
    #[serde(rename = "image/png")]
    Png,
    /// `image/webp`.
    #[serde(rename = "image/webp")]
    Webp,
}

impl MimeType {
    /// Returns the IANA media type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Parses a media type string. Unknown image types fall back to `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aspect ratio of a generated video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AspectRatio {
    /// 16:9 (default).
    #[default]
    Landscape,
    /// 9:16.
    Portrait,
}

impl AspectRatio {
    /// Returns the wire representation, e.g. `"16:9"`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }

    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "16:9" | "landscape" => Some(Self::Landscape),
            "9:16" | "portrait" => Some(Self::Portrait),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for AspectRatio {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_case_insensitive(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid aspect ratio '{s}': expected one of '16:9', '9:16'"
            ))
        })
    }
}

impl Serialize for AspectRatio {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Output resolution of a generated video.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// 720p (default).
    #[default]
    Hd720,
    /// 1080p.
    Hd1080,
}

impl Resolution {
    /// Returns the wire representation, e.g. `"720p"`.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Hd720 => "720p",
            Self::Hd1080 => "1080p",
        }
    }

    fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "720p" | "hd720" => Some(Self::Hd720),
            "1080p" | "hd1080" => Some(Self::Hd1080),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Resolution {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str_case_insensitive(&s).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid resolution '{s}': expected one of '720p', '1080p'"
            ))
        })
    }
}

impl Serialize for Resolution {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// Feedback
// ============================================================================

/// Ask the text model for a short congratulation in a character's voice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    /// Display name of the character speaking.
    pub character: String,
    /// Final score of the finished game.
    pub score: u32,
    /// Display title of the game that was played.
    pub game_type: String,
}

/// Raw text returned by the feedback model, before cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackResponse {
    /// Model output.
    pub text: String,
}

// ============================================================================
// Image edit
// ============================================================================

/// Restyle a still image according to a short instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEditRequest {
    /// Source image bytes.
    pub image: Arc<[u8]>,
    /// Format of `image`.
    pub mime_type: MimeType,
    /// What to change, e.g. "Ponle una nariz de payaso".
    pub prompt_text: String,
}

/// An edited image returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedImage {
    /// Decoded image bytes.
    pub data: Vec<u8>,
    /// Format reported by the backend.
    pub mime_type: MimeType,
}

/// Result of an image edit. `image` is `None` when the model answered
/// without an image part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageEditResponse {
    /// The first image returned, if any.
    pub image: Option<EditedImage>,
}

// ============================================================================
// Video generation
// ============================================================================

/// Start a long-running image-to-video generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRequest {
    /// Still image to animate.
    pub image: Arc<[u8]>,
    /// Format of `image`.
    pub mime_type: MimeType,
    /// Animation instruction.
    pub prompt_text: String,
    /// Requested aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Requested resolution.
    pub resolution: Resolution,
}

/// Opaque name of a remote long-running operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationHandle {
    /// Backend operation name, e.g. `models/veo/operations/abc123`.
    pub name: String,
}

impl OperationHandle {
    /// Creates a handle from a backend operation name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Progress of a long-running operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationStatus {
    /// The operation has finished, successfully or not.
    pub done: bool,
    /// Where to download the produced asset once `done`.
    pub asset_uri: Option<String>,
    /// Backend-reported failure for a finished operation.
    pub error: Option<String>,
}

impl OperationStatus {
    /// Status of an operation that is still running.
    #[must_use]
    pub const fn running() -> Self {
        Self {
            done: false,
            asset_uri: None,
            error: None,
        }
    }

    /// Status of an operation that produced an asset.
    #[must_use]
    pub fn finished(asset_uri: impl Into<String>) -> Self {
        Self {
            done: true,
            asset_uri: Some(asset_uri.into()),
            error: None,
        }
    }
}
