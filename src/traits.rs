//! Modality interfaces every family codec may implement, and the transport
//! collaborator the runtime delegates network calls to.

use crate::api::{
    ImageGenerationOutput, ImageRequest, ImageVariationRequest, TextCompletion, TextRequest,
};
use crate::converse::{ConverseInput, ConverseOutput};
use crate::error::{DecodeError, Result, RuntimeError, TransportError};
use crate::parameters::{
    ConverseParameters, ImageGenerationParameters, ImageVariationParameters,
    TextGenerationParameters, TextToImageParameters,
};
use async_trait::async_trait;

/// Single-turn text completion.
///
/// Request builders receive values that already passed
/// [`validation`](crate::validation) and fill the gaps with this model's
/// declared defaults.
pub trait TextModality: Send + Sync {
    fn text_parameters(&self) -> &TextGenerationParameters;

    /// Build the family's wire body.
    fn text_request_body(&self, request: &TextRequest) -> Result<serde_json::Value>;

    /// Decode the family's wire response.
    fn text_response_body(&self, body: &[u8]) -> std::result::Result<TextCompletion, DecodeError>;
}

/// Shared bounds and response decoding of image models.
pub trait ImageModality: Send + Sync {
    fn image_generation_parameters(&self) -> &ImageGenerationParameters;

    fn image_response_body(
        &self,
        body: &[u8],
    ) -> std::result::Result<ImageGenerationOutput, DecodeError>;
}

/// Image generation from a text prompt.
pub trait TextToImageModality: ImageModality {
    fn text_to_image_parameters(&self) -> &TextToImageParameters;

    fn text_to_image_request_body(&self, request: &ImageRequest) -> Result<serde_json::Value>;
}

/// Image generation from reference images.
pub trait ImageVariationModality: ImageModality {
    fn image_variation_parameters(&self) -> &ImageVariationParameters;

    fn image_variation_request_body(
        &self,
        request: &ImageVariationRequest,
    ) -> Result<serde_json::Value>;
}

/// Optional abilities of a converse-capable model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConverseFeature {
    TextGeneration,
    Vision,
    Document,
    ToolUse,
    SystemPrompts,
    Reasoning,
}

impl std::fmt::Display for ConverseFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::TextGeneration => "text generation",
            Self::Vision => "vision",
            Self::Document => "documents",
            Self::ToolUse => "tool use",
            Self::SystemPrompts => "system prompts",
            Self::Reasoning => "reasoning",
        })
    }
}

/// Multi-turn, multi-modal conversation.
pub trait ConverseModality: Send + Sync {
    fn converse_parameters(&self) -> &ConverseParameters;

    fn converse_features(&self) -> &[ConverseFeature];

    fn supports(&self, feature: ConverseFeature) -> bool {
        self.converse_features().contains(&feature)
    }

    /// Model-specific request fields that switch reasoning on with the given
    /// token budget. `None` when the model needs no extra fields.
    fn reasoning_request_fields(&self, _budget: Option<u32>) -> Option<serde_json::Value> {
        None
    }
}

/// Wire-level single-turn request handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokeModelRequest {
    pub model_id: String,
    pub body: Vec<u8>,
    pub content_type: &'static str,
    pub accept: &'static str,
}

impl InvokeModelRequest {
    /// Serialize a JSON body for `model_id`.
    pub fn json(model_id: &str, body: &serde_json::Value) -> Result<Self> {
        let body = serde_json::to_vec(body).map_err(|e| {
            RuntimeError::Encoding(format!("Failed to serialize body for '{}': {}", model_id, e))
        })?;
        Ok(Self {
            model_id: model_id.to_string(),
            body,
            content_type: "application/json",
            accept: "application/json",
        })
    }
}

/// The network collaborator. Implementations own credentials, endpoints,
/// timeouts, cancellation, and must tolerate concurrent use.
///
/// The runtime never retries: a failed call is reported once, unchanged.
#[async_trait]
pub trait BedrockTransport: Send + Sync {
    /// Single-turn invocation returning the raw response body.
    async fn invoke_model(
        &self,
        request: InvokeModelRequest,
    ) -> std::result::Result<Vec<u8>, TransportError>;

    /// Multi-turn conversation call.
    async fn converse(
        &self,
        input: ConverseInput,
    ) -> std::result::Result<ConverseOutput, TransportError>;
}
