//! Public API types: canonical requests and results for the four operations,
//! plus the alias catalog used to configure a [`BedrockRuntime`](crate::runtime::BedrockRuntime).

use crate::content::{DocumentBlock, ImageBlock, Message, Tool, ToolResultBlock, ToolUseBlock};
use crate::error::{DecodeError, Result, RuntimeError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Token counts reported by a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    /// Number of tokens in the prompt / input.
    pub prompt_tokens: usize,
    /// Number of tokens generated.
    pub completion_tokens: usize,
    /// Sum of prompt and completion tokens.
    pub total_tokens: usize,
}

impl TokenUsage {
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Single-turn text completion request. Absent values take the model's
/// declared defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRequest {
    pub prompt: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
    pub stop_sequences: Option<Vec<String>>,
}

impl TextRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.stop_sequences = Some(stop_sequences);
        self
    }
}

/// The output of a text completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCompletion {
    /// The generated text.
    pub text: String,
    /// Why generation stopped, verbatim from the family's wire response.
    pub stop_reason: Option<String>,
    /// Token usage statistics, if reported by the family.
    pub usage: Option<TokenUsage>,
}

/// Rendering quality for image models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageQuality {
    #[default]
    Standard,
    Premium,
}

/// Output image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageResolution {
    pub width: u32,
    pub height: u32,
}

impl ImageResolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Options shared by text-to-image and image-variation requests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageOptions {
    pub nr_of_images: Option<u32>,
    pub cfg_scale: Option<f64>,
    pub seed: Option<u64>,
    pub quality: Option<ImageQuality>,
    pub resolution: Option<ImageResolution>,
}

/// Text-to-image request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub options: ImageOptions,
}

impl ImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// Image variation request. `images` holds base64-encoded reference images.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageVariationRequest {
    pub images: Vec<String>,
    pub prompt: String,
    pub negative_prompt: Option<String>,
    pub similarity: Option<f64>,
    pub options: ImageOptions,
}

impl ImageVariationRequest {
    pub fn new(images: Vec<String>, prompt: impl Into<String>) -> Self {
        Self {
            images,
            prompt: prompt.into(),
            ..Default::default()
        }
    }
}

/// Images returned by an image model, base64-encoded as on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGenerationOutput {
    pub images: Vec<String>,
}

impl ImageGenerationOutput {
    /// Decode every image to raw bytes.
    pub fn decode(&self) -> std::result::Result<Vec<Vec<u8>>, DecodeError> {
        self.images
            .iter()
            .map(|image| {
                STANDARD
                    .decode(image)
                    .map_err(|e| DecodeError::InvalidBase64 {
                        field: "images",
                        message: e.to_string(),
                    })
            })
            .collect()
    }
}

/// One conversation turn to send with [`converse`](crate::runtime::BedrockRuntime::converse).
///
/// Exactly one of `prompt` and `tool_result` must be set. `history` is
/// borrowed; the extended copy comes back in [`ConverseReply::history`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConverseRequest {
    pub history: Vec<Message>,
    pub prompt: Option<String>,
    pub images: Vec<ImageBlock>,
    pub documents: Vec<DocumentBlock>,
    pub tool_result: Option<ToolResultBlock>,
    pub system_prompts: Vec<String>,
    pub tools: Vec<Tool>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub stop_sequences: Option<Vec<String>>,
    pub enable_reasoning: bool,
    pub max_reasoning_tokens: Option<u32>,
}

impl ConverseRequest {
    /// Start a turn with a user prompt.
    pub fn prompt(history: Vec<Message>, prompt: impl Into<String>) -> Self {
        Self {
            history,
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    /// Continue a tool-use turn with the tool's result.
    pub fn tool_result(history: Vec<Message>, result: ToolResultBlock) -> Self {
        Self {
            history,
            tool_result: Some(result),
            ..Default::default()
        }
    }
}

/// Result of a conversation turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverseReply {
    /// Concatenated text of the assistant turn (empty for pure tool use).
    pub text: String,
    /// The tool the assistant wants invoked, when its turn ends with one.
    pub tool_use: Option<ToolUseBlock>,
    pub stop_reason: Option<String>,
    pub usage: Option<TokenUsage>,
    /// The input history plus the new user turn and the assistant turn.
    pub history: Vec<Message>,
}

/// Maps a human-readable alias to a registered wire model id.
///
/// # Example JSON
///
/// ```json
/// { "alias": "chat/default", "model_id": "anthropic.claude-3-haiku-20240307-v1:0" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAlias {
    /// Must contain a `/` separator.
    pub alias: String,
    /// Wire id of a model in the [registry](crate::registry).
    pub model_id: String,
}

impl ModelAlias {
    pub fn new(alias: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            model_id: model_id.into(),
        }
    }

    /// Validate invariants: alias must be non-empty and contain a `'/'`, and
    /// the model id must be registered.
    pub fn validate(&self) -> Result<()> {
        if self.alias.is_empty() {
            return Err(RuntimeError::Config("Alias cannot be empty".to_string()));
        }
        if !self.alias.contains('/') {
            return Err(RuntimeError::Config(format!(
                "Alias '{}' must be in 'group/name' format",
                self.alias
            )));
        }
        if crate::registry::lookup(&self.model_id).is_none() {
            return Err(RuntimeError::Config(format!(
                "Alias '{}' refers to unregistered model '{}'",
                self.alias, self.model_id
            )));
        }
        Ok(())
    }
}

/// Validate every alias and reject duplicates.
pub fn validate_catalog(aliases: &[ModelAlias]) -> Result<()> {
    let mut seen = HashSet::new();
    for alias in aliases {
        alias.validate()?;
        if !seen.insert(alias.alias.as_str()) {
            return Err(RuntimeError::Config(format!(
                "Alias '{}' already exists",
                alias.alias
            )));
        }
    }
    Ok(())
}

/// Parse an alias catalog (JSON array) from a string.
pub fn catalog_from_str(s: &str) -> Result<Vec<ModelAlias>> {
    let aliases: Vec<ModelAlias> = serde_json::from_str(s)
        .map_err(|e| RuntimeError::Config(format!("Invalid catalog JSON: {}", e)))?;
    validate_catalog(&aliases)?;
    Ok(aliases)
}

/// Read and parse an alias catalog from a JSON file.
pub fn catalog_from_file(path: impl AsRef<Path>) -> Result<Vec<ModelAlias>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        RuntimeError::Config(format!(
            "Failed to read catalog file '{}': {}",
            path.display(),
            e
        ))
    })?;
    catalog_from_str(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_CATALOG_JSON: &str = r#"[
        { "alias": "chat/fast", "model_id": "anthropic.claude-3-haiku-20240307-v1:0" },
        { "alias": "image/default", "model_id": "amazon.nova-canvas-v1:0" }
    ]"#;

    #[test]
    fn catalog_from_str_parses_array() {
        let aliases = catalog_from_str(VALID_CATALOG_JSON).unwrap();
        assert_eq!(aliases.len(), 2);
        assert_eq!(aliases[0].alias, "chat/fast");
        assert_eq!(aliases[1].model_id, "amazon.nova-canvas-v1:0");
    }

    #[test]
    fn catalog_rejects_missing_slash() {
        let json = r#"[{"alias":"noSlash","model_id":"amazon.nova-micro-v1:0"}]"#;
        let err = catalog_from_str(json).unwrap_err();
        assert!(err.to_string().contains("group/name"));
    }

    #[test]
    fn catalog_rejects_unregistered_model() {
        let json = r#"[{"alias":"chat/x","model_id":"vendor.unknown-v9"}]"#;
        let err = catalog_from_str(json).unwrap_err();
        assert!(err.to_string().contains("unregistered model"));
    }

    #[test]
    fn catalog_rejects_duplicate_alias() {
        let json = r#"[
            {"alias":"chat/x","model_id":"amazon.nova-micro-v1:0"},
            {"alias":"chat/x","model_id":"amazon.nova-lite-v1:0"}
        ]"#;
        let err = catalog_from_str(json).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn catalog_rejects_invalid_json() {
        assert!(catalog_from_str("{not valid}").is_err());
    }

    #[test]
    fn catalog_from_file_reads_and_parses() {
        let path = std::env::temp_dir().join("uni_bedrock_test_catalog.json");
        std::fs::write(&path, VALID_CATALOG_JSON).unwrap();
        let aliases = catalog_from_file(&path).unwrap();
        assert_eq!(aliases.len(), 2);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn catalog_from_file_errors_on_missing_file() {
        assert!(catalog_from_file("/nonexistent/path/catalog.json").is_err());
    }

    #[test]
    fn image_output_decodes_base64() {
        let output = ImageGenerationOutput {
            images: vec![STANDARD.encode(b"png-bytes")],
        };
        assert_eq!(output.decode().unwrap(), vec![b"png-bytes".to_vec()]);

        let broken = ImageGenerationOutput {
            images: vec!["***".to_string()],
        };
        assert!(matches!(
            broken.decode(),
            Err(DecodeError::InvalidBase64 { .. })
        ));
    }
}
