//! HTTP client for the Gemini generative language API.
//!
//! One client serves all three capabilities: short text feedback, image
//! edits (`generateContent` with an inline image part) and image-to-video
//! generation (`predictLongRunning`, then polling the returned operation).

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{GenAiError, Result};
use crate::prompt::{edit_prompt, feedback_prompt};
use crate::types::{
    EditedImage, FeedbackRequest, FeedbackResponse, ImageEditRequest, ImageEditResponse,
    MimeType, OperationHandle, OperationStatus, VideoRequest,
};
use crate::{FeedbackService, ImageEditService, VideoGenerationService};

/// Public Gemini endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Environment variables checked, in order, for the API key.
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Connection settings and model names for [`GeminiClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    /// Scheme and host, without a trailing slash.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Model used for feedback text.
    pub text_model: String,
    /// Model used for image edits.
    pub image_model: String,
    /// Model used for video generation.
    pub video_model: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl GeminiConfig {
    /// Creates a configuration with default models for the given key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            text_model: "gemini-3-flash-preview".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            video_model: "veo-3.1-fast-generate-preview".to_string(),
            request_timeout: Duration::from_secs(60),
        }
    }

    /// Reads the API key from `GEMINI_API_KEY`, falling back to `API_KEY`.
    pub fn from_env() -> Result<Self> {
        API_KEY_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|key| !key.trim().is_empty()))
            .map(Self::new)
            .ok_or(GenAiError::MissingCredential)
    }

    /// Points the client at another host, e.g. a local mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Gemini-backed implementation of every generative service contract.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Builds a client from an explicit configuration.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("arcade/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    /// Builds a client using the API key from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(GeminiConfig::from_env()?)
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{model}:{method}", self.config.base_url)
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        for<'de> T: Deserialize<'de>,
    {
        let response = self
            .http
            .post(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn generate_content(
        &self,
        model: &str,
        parts: Vec<RequestPart<'_>>,
    ) -> Result<GenerateContentResponse> {
        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
        };
        self.post_json(&self.model_url(model, "generateContent"), &body)
            .await
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "Generative API request rejected");
    Err(GenAiError::status(status.as_u16(), body))
}

#[async_trait]
impl FeedbackService for GeminiClient {
    #[instrument(skip(self), fields(model = %self.config.text_model))]
    async fn feedback(&self, request: &FeedbackRequest) -> Result<FeedbackResponse> {
        let prompt = feedback_prompt(request);
        let response = self
            .generate_content(&self.config.text_model, vec![RequestPart::text(&prompt)])
            .await?;
        Ok(FeedbackResponse {
            text: response.text(),
        })
    }
}

#[async_trait]
impl ImageEditService for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.config.image_model, bytes = request.image.len()))]
    async fn edit_image(&self, request: &ImageEditRequest) -> Result<ImageEditResponse> {
        let prompt = edit_prompt(&request.prompt_text);
        let parts = vec![
            RequestPart::InlineData {
                inline_data: InlineDataOut {
                    mime_type: request.mime_type.as_str(),
                    data: BASE64.encode(&request.image),
                },
            },
            RequestPart::text(&prompt),
        ];
        let response = self
            .generate_content(&self.config.image_model, parts)
            .await?;
        let image = response.first_image()?;
        debug!(edited = image.is_some(), "Image edit finished");
        Ok(ImageEditResponse { image })
    }
}

#[async_trait]
impl VideoGenerationService for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.config.video_model))]
    async fn submit(&self, request: &VideoRequest) -> Result<OperationHandle> {
        let body = PredictRequest {
            instances: [VideoInstance {
                prompt: &request.prompt_text,
                image: VideoImage {
                    bytes_base64_encoded: BASE64.encode(&request.image),
                    mime_type: request.mime_type.as_str(),
                },
            }],
            parameters: VideoParameters {
                aspect_ratio: request.aspect_ratio.as_str(),
                resolution: request.resolution.as_str(),
                sample_count: 1,
            },
        };
        let operation: OperationResponse = self
            .post_json(
                &self.model_url(&self.config.video_model, "predictLongRunning"),
                &body,
            )
            .await?;
        debug!(operation = %operation.name, "Video generation submitted");
        Ok(OperationHandle::new(operation.name))
    }

    #[instrument(skip(self), fields(operation = %operation.name))]
    async fn poll(&self, operation: &OperationHandle) -> Result<OperationStatus> {
        let url = format!("{}/v1beta/{}", self.config.base_url, operation.name);
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;
        let response: OperationResponse = check_status(response).await?.json().await?;
        Ok(response.into_status())
    }

    #[instrument(skip(self))]
    async fn fetch(&self, asset_uri: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(asset_uri)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;
        let bytes = check_status(response).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataOut,
    },
}

impl<'a> RequestPart<'a> {
    const fn text(text: &'a str) -> Self {
        Self::Text { text }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataOut {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineDataIn>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataIn {
    mime_type: Option<String>,
    data: String,
}

impl GenerateContentResponse {
    /// Parts of the first candidate. Later candidates are alternatives.
    fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .into_iter()
            .flat_map(|content| content.parts.iter())
    }

    /// Concatenated text parts. Empty if there are none.
    fn text(&self) -> String {
        self.parts()
            .filter_map(|part| part.text.as_deref())
            .collect::<String>()
    }

    /// Decodes the first inline image part.
    fn first_image(&self) -> Result<Option<EditedImage>> {
        let Some(inline) = self.parts().find_map(|part| part.inline_data.as_ref()) else {
            return Ok(None);
        };
        let data = BASE64.decode(inline.data.as_bytes())?;
        let mime_type = inline
            .mime_type
            .as_deref()
            .and_then(MimeType::parse)
            .unwrap_or_default();
        Ok(Some(EditedImage { data, mime_type }))
    }
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: [VideoInstance<'a>; 1],
    parameters: VideoParameters,
}

#[derive(Debug, Serialize)]
struct VideoInstance<'a> {
    prompt: &'a str,
    image: VideoImage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoImage {
    bytes_base64_encoded: String,
    mime_type: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: &'static str,
    resolution: &'static str,
    sample_count: u32,
}

#[derive(Debug, Deserialize)]
struct OperationResponse {
    name: String,
    #[serde(default)]
    done: bool,
    response: Option<OperationResult>,
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResult {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    message: String,
}

impl OperationResponse {
    fn into_status(self) -> OperationStatus {
        let asset_uri = self
            .response
            .and_then(|result| result.generate_video_response)
            .and_then(|video| video.generated_samples.into_iter().next())
            .and_then(|sample| sample.video)
            .and_then(|video| video.uri);
        OperationStatus {
            done: self.done,
            asset_uri,
            error: self.error.map(|error| error.message),
        }
    }
}
