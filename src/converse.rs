//! Converse wire protocol: request/response shapes, the content-block union,
//! and the lossless mapping between wire blocks and canonical [`Content`].
//!
//! Wire unions are single-member JSON objects keyed by tag
//! (`{"text": "..."}`, `{"toolUse": {...}}`). Tags this version does not know
//! deserialize into an `Unknown` variant so the mismatch surfaces as
//! [`DecodeError::NotImplemented`] at conversion time instead of being dropped.

use crate::api::{ConverseRequest, TokenUsage};
use crate::content::{
    Content, DocumentBlock, DocumentFormat, ImageBlock, ImageFormat, Message, ReasoningBlock,
    Role, Tool, ToolResultBlock, ToolResultContent, ToolStatus, ToolUseBlock, VideoBlock,
    VideoFormat, VideoSource,
};
use crate::error::DecodeError;
use crate::traits::ConverseModality;
use serde::de::{DeserializeOwned, Error as _};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Request / response envelopes
// ---------------------------------------------------------------------------

/// Wire request handed to [`BedrockTransport::converse`](crate::traits::BedrockTransport::converse).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseInput {
    pub model_id: String,
    pub messages: Vec<WireMessage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system: Vec<SystemContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inference_config: Option<InferenceConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_config: Option<ToolConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_model_request_fields: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemContentBlock {
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stop_sequences: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfiguration {
    pub tools: Vec<WireTool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTool {
    pub tool_spec: ToolSpecification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpecification {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: ToolInputSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInputSchema {
    pub json: Value,
}

/// Wire response returned by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseOutput {
    pub output: ConverseOutputBody,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<WireTokenUsage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConverseOutputBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<WireMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

/// A turn as it travels on the wire. The role stays a raw string until
/// decoded so an unexpected value can be reported verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

// ---------------------------------------------------------------------------
// Content-block unions
// ---------------------------------------------------------------------------

/// The wire content-block union.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text(String),
    Image(WireImage),
    Document(WireDocument),
    Video(WireVideo),
    ToolUse(WireToolUse),
    ToolResult(WireToolResult),
    ReasoningContent(WireReasoning),
    /// A tag this version does not implement, kept verbatim.
    Unknown { tag: String, value: Value },
}

/// Content allowed inside a tool result.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResultContentBlock {
    Text(String),
    Json(Value),
    Image(WireImage),
    Document(WireDocument),
    Video(WireVideo),
    Unknown { tag: String, value: Value },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireImage {
    pub format: String,
    pub source: WireSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireDocument {
    pub format: String,
    pub name: String,
    pub source: WireSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireVideo {
    pub format: String,
    pub source: WireSource,
}

/// Inline bytes (base64) or an object-storage reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WireSource {
    Bytes(String),
    S3Location(S3Location),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct S3Location {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireToolUse {
    pub tool_use_id: String,
    pub name: String,
    pub input: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireToolResult {
    pub tool_use_id: String,
    pub content: Vec<ToolResultContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireReasoning {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_text: Option<WireReasoningText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redacted_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireReasoningText {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Split a single-member union object into `(tag, payload)`.
fn union_member<'de, D: Deserializer<'de>>(deserializer: D) -> Result<(String, Value), D::Error> {
    let map = serde_json::Map::<String, Value>::deserialize(deserializer)?;
    let found = map.len();
    let mut members = map.into_iter();
    match (members.next(), members.next()) {
        (Some(member), None) => Ok(member),
        _ => Err(D::Error::custom(format!(
            "expected exactly one member in union object, found {}",
            found
        ))),
    }
}

fn member<T: DeserializeOwned, E: serde::de::Error>(tag: &str, value: Value) -> Result<T, E> {
    serde_json::from_value(value).map_err(|e| E::custom(format!("invalid '{}' block: {}", tag, e)))
}

impl Serialize for ContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Text(text) => map.serialize_entry("text", text)?,
            Self::Image(image) => map.serialize_entry("image", image)?,
            Self::Document(document) => map.serialize_entry("document", document)?,
            Self::Video(video) => map.serialize_entry("video", video)?,
            Self::ToolUse(tool_use) => map.serialize_entry("toolUse", tool_use)?,
            Self::ToolResult(tool_result) => map.serialize_entry("toolResult", tool_result)?,
            Self::ReasoningContent(reasoning) => {
                map.serialize_entry("reasoningContent", reasoning)?
            }
            Self::Unknown { tag, value } => map.serialize_entry(tag, value)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (tag, value) = union_member(deserializer)?;
        Ok(match tag.as_str() {
            "text" => Self::Text(member(&tag, value)?),
            "image" => Self::Image(member(&tag, value)?),
            "document" => Self::Document(member(&tag, value)?),
            "video" => Self::Video(member(&tag, value)?),
            "toolUse" => Self::ToolUse(member(&tag, value)?),
            "toolResult" => Self::ToolResult(member(&tag, value)?),
            "reasoningContent" => Self::ReasoningContent(member(&tag, value)?),
            _ => Self::Unknown { tag, value },
        })
    }
}

impl Serialize for ToolResultContentBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Text(text) => map.serialize_entry("text", text)?,
            Self::Json(json) => map.serialize_entry("json", json)?,
            Self::Image(image) => map.serialize_entry("image", image)?,
            Self::Document(document) => map.serialize_entry("document", document)?,
            Self::Video(video) => map.serialize_entry("video", video)?,
            Self::Unknown { tag, value } => map.serialize_entry(tag, value)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ToolResultContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (tag, value) = union_member(deserializer)?;
        Ok(match tag.as_str() {
            "text" => Self::Text(member(&tag, value)?),
            "json" => Self::Json(value),
            "image" => Self::Image(member(&tag, value)?),
            "document" => Self::Document(member(&tag, value)?),
            "video" => Self::Video(member(&tag, value)?),
            _ => Self::Unknown { tag, value },
        })
    }
}

// ---------------------------------------------------------------------------
// Wire -> canonical
// ---------------------------------------------------------------------------

fn inline_bytes(kind: &str, source: WireSource) -> Result<String, DecodeError> {
    match source {
        WireSource::Bytes(bytes) => Ok(bytes),
        WireSource::S3Location(_) => Err(DecodeError::NotImplemented {
            tag: format!("{}.source.s3Location", kind),
        }),
    }
}

fn decode_image(image: WireImage) -> Result<ImageBlock, DecodeError> {
    let format = ImageFormat::from_wire(&image.format)?;
    ImageBlock::from_base64(format, inline_bytes("image", image.source)?)
}

fn decode_document(document: WireDocument) -> Result<DocumentBlock, DecodeError> {
    let format = DocumentFormat::from_wire(&document.format)?;
    DocumentBlock::from_base64(
        document.name,
        format,
        inline_bytes("document", document.source)?,
    )
}

fn decode_video(video: WireVideo) -> Result<VideoBlock, DecodeError> {
    let format = VideoFormat::from_wire(&video.format)?;
    match video.source {
        WireSource::Bytes(bytes) => VideoBlock::from_base64(format, bytes),
        WireSource::S3Location(location) => Ok(VideoBlock::from_s3(
            format,
            location.uri,
            location.bucket_owner,
        )),
    }
}

impl TryFrom<ToolResultContentBlock> for ToolResultContent {
    type Error = DecodeError;

    fn try_from(block: ToolResultContentBlock) -> Result<Self, Self::Error> {
        Ok(match block {
            ToolResultContentBlock::Text(text) => Self::Text(text),
            ToolResultContentBlock::Json(json) => Self::Json(json),
            ToolResultContentBlock::Image(image) => Self::Image(decode_image(image)?),
            ToolResultContentBlock::Document(document) => {
                Self::Document(decode_document(document)?)
            }
            ToolResultContentBlock::Video(video) => Self::Video(decode_video(video)?),
            ToolResultContentBlock::Unknown { tag, .. } => {
                return Err(DecodeError::NotImplemented { tag });
            }
        })
    }
}

impl TryFrom<ContentBlock> for Content {
    type Error = DecodeError;

    fn try_from(block: ContentBlock) -> Result<Self, Self::Error> {
        Ok(match block {
            ContentBlock::Text(text) => Self::Text(text),
            ContentBlock::Image(image) => Self::Image(decode_image(image)?),
            ContentBlock::Document(document) => Self::Document(decode_document(document)?),
            ContentBlock::Video(video) => Self::Video(decode_video(video)?),
            ContentBlock::ToolUse(tool_use) => Self::ToolUse(ToolUseBlock {
                id: tool_use.tool_use_id,
                name: tool_use.name,
                input: tool_use.input,
            }),
            ContentBlock::ToolResult(result) => Self::ToolResult(ToolResultBlock {
                id: result.tool_use_id,
                content: result
                    .content
                    .into_iter()
                    .map(ToolResultContent::try_from)
                    .collect::<Result<_, _>>()?,
                status: result
                    .status
                    .as_deref()
                    .map(ToolStatus::from_wire)
                    .transpose()?,
            }),
            ContentBlock::ReasoningContent(reasoning) => match reasoning {
                WireReasoning {
                    reasoning_text: Some(text),
                    redacted_content: None,
                } => Self::Reasoning(ReasoningBlock {
                    text: text.text,
                    signature: text.signature,
                }),
                WireReasoning {
                    redacted_content: Some(_),
                    ..
                } => {
                    return Err(DecodeError::NotImplemented {
                        tag: "reasoningContent.redactedContent".to_string(),
                    });
                }
                WireReasoning { .. } => {
                    return Err(DecodeError::NotImplemented {
                        tag: "reasoningContent".to_string(),
                    });
                }
            },
            ContentBlock::Unknown { tag, .. } => return Err(DecodeError::NotImplemented { tag }),
        })
    }
}

impl TryFrom<WireMessage> for Message {
    type Error = DecodeError;

    fn try_from(message: WireMessage) -> Result<Self, Self::Error> {
        let role = Role::from_wire(&message.role)?;
        let content = message
            .content
            .into_iter()
            .map(Content::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Message { role, content })
    }
}

// ---------------------------------------------------------------------------
// Canonical -> wire
// ---------------------------------------------------------------------------

fn encode_image(image: &ImageBlock) -> WireImage {
    WireImage {
        format: image.format.as_str().to_string(),
        source: WireSource::Bytes(image.base64().to_string()),
    }
}

fn encode_document(document: &DocumentBlock) -> WireDocument {
    WireDocument {
        format: document.format.as_str().to_string(),
        name: document.name.clone(),
        source: WireSource::Bytes(document.base64().to_string()),
    }
}

fn encode_video(video: &VideoBlock) -> WireVideo {
    let source = match video.source() {
        VideoSource::Bytes(bytes) => WireSource::Bytes(bytes.clone()),
        VideoSource::S3 { uri, bucket_owner } => WireSource::S3Location(S3Location {
            uri: uri.clone(),
            bucket_owner: bucket_owner.clone(),
        }),
    };
    WireVideo {
        format: video.format.as_str().to_string(),
        source,
    }
}

impl From<&ToolResultContent> for ToolResultContentBlock {
    fn from(content: &ToolResultContent) -> Self {
        match content {
            ToolResultContent::Text(text) => Self::Text(text.clone()),
            ToolResultContent::Json(json) => Self::Json(json.clone()),
            ToolResultContent::Image(image) => Self::Image(encode_image(image)),
            ToolResultContent::Document(document) => Self::Document(encode_document(document)),
            ToolResultContent::Video(video) => Self::Video(encode_video(video)),
        }
    }
}

impl From<&Content> for ContentBlock {
    fn from(content: &Content) -> Self {
        match content {
            Content::Text(text) => Self::Text(text.clone()),
            Content::Image(image) => Self::Image(encode_image(image)),
            Content::Document(document) => Self::Document(encode_document(document)),
            Content::Video(video) => Self::Video(encode_video(video)),
            Content::ToolUse(tool_use) => Self::ToolUse(WireToolUse {
                tool_use_id: tool_use.id.clone(),
                name: tool_use.name.clone(),
                input: tool_use.input.clone(),
            }),
            Content::ToolResult(result) => Self::ToolResult(WireToolResult {
                tool_use_id: result.id.clone(),
                content: result.content.iter().map(Into::into).collect(),
                status: result.status.map(|s| s.as_str().to_string()),
            }),
            Content::Reasoning(reasoning) => Self::ReasoningContent(WireReasoning {
                reasoning_text: Some(WireReasoningText {
                    text: reasoning.text.clone(),
                    signature: reasoning.signature.clone(),
                }),
                redacted_content: None,
            }),
        }
    }
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_str().to_string(),
            content: message.content.iter().map(Into::into).collect(),
        }
    }
}

impl From<&Tool> for WireTool {
    fn from(tool: &Tool) -> Self {
        Self {
            tool_spec: ToolSpecification {
                name: tool.name.clone(),
                description: tool.description.clone(),
                input_schema: ToolInputSchema {
                    json: tool.input_schema.clone(),
                },
            },
        }
    }
}

impl From<WireTool> for Tool {
    fn from(tool: WireTool) -> Self {
        Self {
            name: tool.tool_spec.name,
            description: tool.tool_spec.description,
            input_schema: tool.tool_spec.input_schema.json,
        }
    }
}

// ---------------------------------------------------------------------------
// Turn assembly
// ---------------------------------------------------------------------------

/// Build the wire request for `history`, whose last entry is the new user
/// turn. Missing inference values take the model's converse defaults.
pub fn build_converse_input(
    model_id: &str,
    converse: &dyn ConverseModality,
    history: &[Message],
    request: &ConverseRequest,
) -> ConverseInput {
    let params = converse.converse_parameters();
    let inference_config = InferenceConfiguration {
        max_tokens: params.max_tokens.resolve(request.max_tokens),
        temperature: params.temperature.resolve(request.temperature),
        top_p: params.top_p.resolve(request.top_p),
        stop_sequences: params
            .stop_sequences
            .resolve(request.stop_sequences.as_deref()),
    };
    let tool_config = (!request.tools.is_empty()).then(|| ToolConfiguration {
        tools: request.tools.iter().map(Into::into).collect(),
    });
    let additional_model_request_fields = if request.enable_reasoning {
        converse.reasoning_request_fields(
            params
                .max_reasoning_tokens
                .resolve(request.max_reasoning_tokens),
        )
    } else {
        None
    };

    ConverseInput {
        model_id: model_id.to_string(),
        messages: history.iter().map(Into::into).collect(),
        system: request
            .system_prompts
            .iter()
            .map(|text| SystemContentBlock { text: text.clone() })
            .collect(),
        inference_config: Some(inference_config),
        tool_config,
        additional_model_request_fields,
    }
}

/// A decoded assistant turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverseTurn {
    pub message: Message,
    pub stop_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// Decode a transport response into a canonical turn.
pub fn decode_converse_output(output: ConverseOutput) -> Result<ConverseTurn, DecodeError> {
    let wire = output.output.message.ok_or(DecodeError::MissingField {
        family: "Converse",
        field: "output.message",
    })?;
    let message = Message::try_from(wire)?;
    let usage = output.usage.map(|u| TokenUsage {
        prompt_tokens: u.input_tokens as usize,
        completion_tokens: u.output_tokens as usize,
        total_tokens: u.total_tokens as usize,
    });
    Ok(ConverseTurn {
        message,
        stop_reason: output.stop_reason,
        usage,
    })
}
