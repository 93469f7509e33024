//! Canonical, vendor-neutral conversation content.
//!
//! A [`Message`] is a role plus an ordered list of [`Content`] items. The wire
//! counterpart and the conversion between the two live in
//! [`crate::converse`].

use crate::error::DecodeError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }

    /// Map a wire role. Anything but `user` / `assistant` is rejected.
    pub fn from_wire(raw: &str) -> Result<Self, DecodeError> {
        match raw {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(DecodeError::UnknownRole(other.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One conversation turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: Vec<Content>,
}

impl Message {
    pub fn new(role: Role, content: Vec<Content>) -> Self {
        Self { role, content }
    }

    pub fn user(content: Vec<Content>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: Vec<Content>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// All text items joined in order.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                Content::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// The tool-use block, if it is the last content item of this turn.
    pub fn last_tool_use(&self) -> Option<&ToolUseBlock> {
        match self.content.last() {
            Some(Content::ToolUse(tool_use)) => Some(tool_use),
            _ => None,
        }
    }
}

/// A typed unit of conversational payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Image(ImageBlock),
    Document(DocumentBlock),
    Video(VideoBlock),
    ToolUse(ToolUseBlock),
    ToolResult(ToolResultBlock),
    Reasoning(ReasoningBlock),
}

/// Declares a closed string-backed format enum with wire mapping.
macro_rules! wire_format {
    ($(#[$meta:meta])* $name:ident, $field:literal, { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }

            pub fn from_wire(raw: &str) -> Result<Self, DecodeError> {
                match raw {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(DecodeError::UnexpectedValue {
                        field: $field,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

wire_format!(
    /// Encoding of an inline image.
    ImageFormat, "image.format", {
        Png => "png",
        Jpeg => "jpeg",
        Gif => "gif",
        Webp => "webp",
    }
);

wire_format!(
    /// Encoding of an inline document.
    DocumentFormat, "document.format", {
        Pdf => "pdf",
        Csv => "csv",
        Doc => "doc",
        Docx => "docx",
        Xls => "xls",
        Xlsx => "xlsx",
        Html => "html",
        Txt => "txt",
        Md => "md",
    }
);

wire_format!(
    /// Container format of a video.
    VideoFormat, "video.format", {
        Mkv => "mkv",
        Mov => "mov",
        Mp4 => "mp4",
        Webm => "webm",
        Flv => "flv",
        Mpeg => "mpeg",
        Mpg => "mpg",
        Wmv => "wmv",
        ThreeGp => "three_gp",
    }
);

fn check_base64(field: &'static str, payload: &str) -> Result<(), DecodeError> {
    STANDARD
        .decode(payload)
        .map(|_| ())
        .map_err(|e| DecodeError::InvalidBase64 {
            field,
            message: e.to_string(),
        })
}

/// Inline image: a format tag plus a base64 payload.
///
/// The payload is only reachable through the constructors, so it is always
/// valid base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlock {
    pub format: ImageFormat,
    source: String,
}

impl ImageBlock {
    pub fn from_bytes(format: ImageFormat, bytes: &[u8]) -> Self {
        Self {
            format,
            source: STANDARD.encode(bytes),
        }
    }

    /// Build from an already base64-encoded payload, rejecting invalid input.
    pub fn from_base64(format: ImageFormat, source: impl Into<String>) -> Result<Self, DecodeError> {
        let source = source.into();
        check_base64("image.source.bytes", &source)?;
        Ok(Self { format, source })
    }

    /// The payload as carried on the wire.
    pub fn base64(&self) -> &str {
        &self.source
    }

    pub fn bytes(&self) -> Result<Vec<u8>, DecodeError> {
        STANDARD
            .decode(&self.source)
            .map_err(|e| DecodeError::InvalidBase64 {
                field: "image.source.bytes",
                message: e.to_string(),
            })
    }
}

/// Inline document: name, format tag, and a base64 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlock {
    pub name: String,
    pub format: DocumentFormat,
    source: String,
}

impl DocumentBlock {
    pub fn from_bytes(name: impl Into<String>, format: DocumentFormat, bytes: &[u8]) -> Self {
        Self {
            name: name.into(),
            format,
            source: STANDARD.encode(bytes),
        }
    }

    pub fn from_base64(
        name: impl Into<String>,
        format: DocumentFormat,
        source: impl Into<String>,
    ) -> Result<Self, DecodeError> {
        let source = source.into();
        check_base64("document.source.bytes", &source)?;
        Ok(Self {
            name: name.into(),
            format,
            source,
        })
    }

    pub fn base64(&self) -> &str {
        &self.source
    }
}

/// Where a video's bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Base64 payload carried inline.
    Bytes(String),
    /// By-reference location in object storage.
    S3 {
        uri: String,
        bucket_owner: Option<String>,
    },
}

/// A video, inline or by reference. Inline payloads are checked on
/// construction like images and documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoBlock {
    pub format: VideoFormat,
    source: VideoSource,
}

impl VideoBlock {
    pub fn from_bytes(format: VideoFormat, bytes: &[u8]) -> Self {
        Self {
            format,
            source: VideoSource::Bytes(STANDARD.encode(bytes)),
        }
    }

    pub fn from_base64(format: VideoFormat, source: impl Into<String>) -> Result<Self, DecodeError> {
        let source = source.into();
        check_base64("video.source.bytes", &source)?;
        Ok(Self {
            format,
            source: VideoSource::Bytes(source),
        })
    }

    pub fn from_s3(
        format: VideoFormat,
        uri: impl Into<String>,
        bucket_owner: Option<String>,
    ) -> Self {
        Self {
            format,
            source: VideoSource::S3 {
                uri: uri.into(),
                bucket_owner,
            },
        }
    }

    pub fn source(&self) -> &VideoSource {
        &self.source
    }
}

/// A tool invocation requested by the assistant.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolUseBlock {
    pub id: String,
    pub name: String,
    /// Structured arguments, passed through untouched.
    pub input: serde_json::Value,
}

/// Outcome flag of a tool result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolStatus {
    Success,
    Error,
}

impl ToolStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }

    pub fn from_wire(raw: &str) -> Result<Self, DecodeError> {
        match raw {
            "success" => Ok(Self::Success),
            "error" => Ok(Self::Error),
            other => Err(DecodeError::UnexpectedValue {
                field: "toolResult.status",
                value: other.to_string(),
            }),
        }
    }
}

/// The result of running a tool, answering the [`ToolUseBlock`] with the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResultBlock {
    pub id: String,
    pub content: Vec<ToolResultContent>,
    pub status: Option<ToolStatus>,
}

impl ToolResultBlock {
    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: vec![ToolResultContent::Text(text.into())],
            status: Some(ToolStatus::Success),
        }
    }

    pub fn json(id: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            id: id.into(),
            content: vec![ToolResultContent::Json(value)],
            status: Some(ToolStatus::Success),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolResultContent {
    Text(String),
    Json(serde_json::Value),
    Image(ImageBlock),
    Document(DocumentBlock),
    Video(VideoBlock),
}

/// Visible chain-of-thought emitted by a reasoning model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningBlock {
    pub text: String,
    pub signature: Option<String>,
}

/// A tool the model may call. The input schema is carried opaquely.
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: serde_json::Value,
}

impl Tool {
    pub fn new(name: impl Into<String>, input_schema: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
