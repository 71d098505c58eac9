//! Generative AI services for the arcade.
//!
//! The arcade only ever talks to these capabilities through the traits in
//! this crate, so the engine can be driven by scripted doubles in tests and
//! by [`GeminiClient`] in production.

pub mod error;
pub mod gemini;
pub mod prompt;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;

use async_trait::async_trait;

pub use error::{GenAiError, Result};
pub use gemini::{GeminiClient, GeminiConfig, DEFAULT_BASE_URL};
pub use prompt::{clean_feedback, edit_prompt, feedback_prompt};
pub use types::{
    AspectRatio, EditedImage, FeedbackRequest, FeedbackResponse, ImageEditRequest,
    ImageEditResponse, MimeType, OperationHandle, OperationStatus, Resolution, VideoRequest,
};

/// Produces a short spoken congratulation when a game ends.
#[async_trait]
pub trait FeedbackService: Send + Sync {
    /// Requests feedback text. The text is returned raw; callers clean it.
    async fn feedback(&self, request: &FeedbackRequest) -> Result<FeedbackResponse>;
}

/// Restyles a still image.
#[async_trait]
pub trait ImageEditService: Send + Sync {
    /// Edits an image. A response without an image is not an error.
    async fn edit_image(&self, request: &ImageEditRequest) -> Result<ImageEditResponse>;
}

/// Turns a still image into a short video through a long-running operation.
#[async_trait]
pub trait VideoGenerationService: Send + Sync {
    /// Starts generation and returns the remote operation.
    async fn submit(&self, request: &VideoRequest) -> Result<OperationHandle>;

    /// Checks whether the operation has finished.
    async fn poll(&self, operation: &OperationHandle) -> Result<OperationStatus>;

    /// Downloads a finished asset.
    async fn fetch(&self, asset_uri: &str) -> Result<Vec<u8>>;
}
