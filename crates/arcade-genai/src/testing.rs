//! Scripted service doubles.
//!
//! Each double records what it was asked and answers from a script, so
//! tests can drive the arcade without a network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::{GenAiError, Result};
use crate::types::{
    EditedImage, FeedbackRequest, FeedbackResponse, ImageEditRequest, ImageEditResponse,
    MimeType, OperationHandle, OperationStatus, VideoRequest,
};
use crate::{FeedbackService, ImageEditService, VideoGenerationService};

/// One scripted answer. `Fail` becomes a transport error carrying the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scripted<T> {
    /// Answer successfully.
    Reply(T),
    /// Fail with the given HTTP status.
    Fail(u16),
}

impl<T> Scripted<T> {
    fn into_result(self) -> Result<T> {
        match self {
            Self::Reply(value) => Ok(value),
            Self::Fail(status) => Err(GenAiError::status(status, "scripted failure")),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Feedback double. Once the script runs out it repeats the last answer.
#[derive(Debug)]
pub struct ScriptedFeedback {
    script: Mutex<VecDeque<Scripted<String>>>,
    fallback: Scripted<String>,
    requests: Mutex<Vec<FeedbackRequest>>,
}

impl ScriptedFeedback {
    /// Always answers with `text`.
    #[must_use]
    pub fn replying(text: impl Into<String>) -> Self {
        Self::from_script(Vec::new(), Scripted::Reply(text.into()))
    }

    /// Always fails with a server error.
    #[must_use]
    pub fn failing() -> Self {
        Self::from_script(Vec::new(), Scripted::Fail(500))
    }

    /// Answers from `script`, then with `fallback` forever.
    #[must_use]
    pub fn from_script(script: Vec<Scripted<String>>, fallback: Scripted<String>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<FeedbackRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl FeedbackService for ScriptedFeedback {
    async fn feedback(&self, request: &FeedbackRequest) -> Result<FeedbackResponse> {
        lock(&self.requests).push(request.clone());
        let next = lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        next.into_result().map(|text| FeedbackResponse { text })
    }
}

/// Image edit double.
#[derive(Debug)]
pub struct ScriptedImageEditor {
    answer: Scripted<Option<Vec<u8>>>,
    requests: Mutex<Vec<ImageEditRequest>>,
}

impl ScriptedImageEditor {
    /// Returns `data` as a PNG for every edit.
    #[must_use]
    pub fn returning(data: Vec<u8>) -> Self {
        Self::new(Scripted::Reply(Some(data)))
    }

    /// Answers without an image.
    #[must_use]
    pub fn without_image() -> Self {
        Self::new(Scripted::Reply(None))
    }

    /// Fails every edit with a server error.
    #[must_use]
    pub fn failing() -> Self {
        Self::new(Scripted::Fail(503))
    }

    /// Answers every edit with `answer`.
    #[must_use]
    pub fn new(answer: Scripted<Option<Vec<u8>>>) -> Self {
        Self {
            answer,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<ImageEditRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl ImageEditService for ScriptedImageEditor {
    async fn edit_image(&self, request: &ImageEditRequest) -> Result<ImageEditResponse> {
        lock(&self.requests).push(request.clone());
        let image = self.answer.clone().into_result()?;
        Ok(ImageEditResponse {
            image: image.map(|data| EditedImage {
                data,
                mime_type: MimeType::Png,
            }),
        })
    }
}

/// Video generation double.
///
/// Reports `done` on the `ready_after`-th poll, or never when `None`.
#[derive(Debug)]
pub struct ScriptedVideoService {
    ready_after: Option<u32>,
    submit_answer: Scripted<()>,
    asset: Vec<u8>,
    submissions: Mutex<Vec<VideoRequest>>,
    polls: AtomicU32,
}

impl ScriptedVideoService {
    /// Finishes on the `polls`-th poll and serves `asset`.
    #[must_use]
    pub fn ready_after(polls: u32, asset: Vec<u8>) -> Self {
        Self {
            ready_after: Some(polls),
            submit_answer: Scripted::Reply(()),
            asset,
            submissions: Mutex::new(Vec::new()),
            polls: AtomicU32::new(0),
        }
    }

    /// Accepts submissions but never finishes.
    #[must_use]
    pub fn never_ready() -> Self {
        Self {
            ready_after: None,
            ..Self::ready_after(0, Vec::new())
        }
    }

    /// Rejects every submission with a server error.
    #[must_use]
    pub fn rejecting() -> Self {
        Self {
            submit_answer: Scripted::Fail(500),
            ..Self::never_ready()
        }
    }

    /// Number of polls answered so far, across all operations.
    #[must_use]
    pub fn poll_count(&self) -> u32 {
        self.polls.load(Ordering::SeqCst)
    }

    /// Every submission received so far.
    #[must_use]
    pub fn submissions(&self) -> Vec<VideoRequest> {
        lock(&self.submissions).clone()
    }
}

#[async_trait]
impl VideoGenerationService for ScriptedVideoService {
    async fn submit(&self, request: &VideoRequest) -> Result<OperationHandle> {
        let count = {
            let mut submissions = lock(&self.submissions);
            submissions.push(request.clone());
            submissions.len()
        };
        self.submit_answer.clone().into_result()?;
        Ok(OperationHandle::new(format!("operations/scripted-{count}")))
    }

    async fn poll(&self, operation: &OperationHandle) -> Result<OperationStatus> {
        let polls = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.ready_after {
            Some(ready) if polls >= ready => Ok(OperationStatus::finished(format!(
                "scripted://{}/video.mp4",
                operation.name
            ))),
            _ => Ok(OperationStatus::running()),
        }
    }

    async fn fetch(&self, _asset_uri: &str) -> Result<Vec<u8>> {
        Ok(self.asset.clone())
    }
}
