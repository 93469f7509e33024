//! Anthropic codecs.
//!
//! [`AnthropicMessages`] speaks the Messages schema pinned to
//! `bedrock-2023-05-31`. [`AnthropicCompletions`] is the older
//! `Human:`/`Assistant:` completion schema still used by Claude Instant and
//! Claude 2. Both stay registered side by side.

use crate::api::{TextCompletion, TextRequest};
use crate::error::{DecodeError, Result};
use crate::family::common::{decode_body, encode_body, missing, usage};
use crate::family::{ConverseProfile, Family, ReasoningEncoding};
use crate::parameters::{
    ConverseParameters, Parameter, ParameterName, PromptParams, StopSequenceParams,
    TextGenerationParameters,
};
use crate::traits::{ConverseFeature, TextModality};
use serde::{Deserialize, Serialize};

pub const CLAUDE_3_HAIKU: &str = "anthropic.claude-3-haiku-20240307-v1:0";
pub const CLAUDE_3_5_HAIKU: &str = "us.anthropic.claude-3-5-haiku-20241022-v1:0";
pub const CLAUDE_3_OPUS: &str = "us.anthropic.claude-3-opus-20240229-v1:0";
pub const CLAUDE_3_5_SONNET: &str = "us.anthropic.claude-3-5-sonnet-20240620-v1:0";
pub const CLAUDE_3_5_SONNET_V2: &str = "us.anthropic.claude-3-5-sonnet-20241022-v2:0";
pub const CLAUDE_3_7_SONNET: &str = "us.anthropic.claude-3-7-sonnet-20250219-v1:0";
pub const CLAUDE_SONNET_4: &str = "us.anthropic.claude-sonnet-4-20250514-v1:0";
pub const CLAUDE_OPUS_4: &str = "us.anthropic.claude-opus-4-20250514-v1:0";

pub const CLAUDE_INSTANT: &str = "anthropic.claude-instant-v1";
pub const CLAUDE_V2: &str = "anthropic.claude-v2";
pub const CLAUDE_V2_1: &str = "anthropic.claude-v2:1";

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";
const HUMAN_TURN: &str = "\n\nHuman:";
const ASSISTANT_TURN: &str = "\n\nAssistant:";

const MESSAGES_FEATURES: &[ConverseFeature] = &[
    ConverseFeature::TextGeneration,
    ConverseFeature::SystemPrompts,
    ConverseFeature::Document,
    ConverseFeature::Vision,
    ConverseFeature::ToolUse,
];

const REASONING_FEATURES: &[ConverseFeature] = &[
    ConverseFeature::TextGeneration,
    ConverseFeature::SystemPrompts,
    ConverseFeature::Document,
    ConverseFeature::Vision,
    ConverseFeature::ToolUse,
    ConverseFeature::Reasoning,
];

const COMPLETIONS_FEATURES: &[ConverseFeature] = &[
    ConverseFeature::TextGeneration,
    ConverseFeature::SystemPrompts,
    ConverseFeature::Document,
];

const fn messages_parameters(max_tokens: u32, default_max_tokens: u32) -> TextGenerationParameters {
    TextGenerationParameters {
        temperature: Parameter::new(ParameterName::Temperature, 0.0, 1.0, 1.0),
        max_tokens: Parameter::new(ParameterName::MaxTokens, 1, max_tokens, default_max_tokens),
        top_p: Parameter::new(ParameterName::TopP, 0.0, 1.0, 0.999),
        top_k: Parameter::bounded(ParameterName::TopK, Some(0), Some(500), None),
        stop_sequences: StopSequenceParams::new(Some(8191), &[]),
        prompt: PromptParams::new(200_000),
    }
}

/// Messages codec for a model without extended thinking.
pub const fn claude_messages(max_tokens: u32, default_max_tokens: u32) -> AnthropicMessages {
    let parameters = messages_parameters(max_tokens, default_max_tokens);
    AnthropicMessages {
        parameters,
        converse: ConverseProfile::new(
            ConverseParameters::from_text(
                parameters,
                Parameter::not_supported(ParameterName::MaxReasoningTokens),
            ),
            MESSAGES_FEATURES,
            ReasoningEncoding::None,
        ),
    }
}

/// Messages codec for a model with extended thinking. The reasoning budget
/// must stay below `max_tokens`.
pub const fn claude_reasoning(max_tokens: u32, max_reasoning_tokens: u32) -> AnthropicMessages {
    let parameters = messages_parameters(max_tokens, 8192);
    AnthropicMessages {
        parameters,
        converse: ConverseProfile::new(
            ConverseParameters::from_text(
                parameters,
                Parameter::new(
                    ParameterName::MaxReasoningTokens,
                    1024,
                    max_reasoning_tokens,
                    4096,
                ),
            ),
            REASONING_FEATURES,
            ReasoningEncoding::AnthropicThinking,
        ),
    }
}

/// Legacy completion codec. `prompt_size` is the context limit in characters.
pub const fn claude_completions(prompt_size: usize) -> AnthropicCompletions {
    let parameters = TextGenerationParameters {
        temperature: Parameter::new(ParameterName::Temperature, 0.0, 1.0, 1.0),
        max_tokens: Parameter::new(ParameterName::MaxTokens, 1, 4096, 500),
        top_p: Parameter::new(ParameterName::TopP, 0.0, 1.0, 1.0),
        top_k: Parameter::new(ParameterName::TopK, 0, 500, 250),
        stop_sequences: StopSequenceParams::new(Some(8191), &[HUMAN_TURN]),
        prompt: PromptParams::new(prompt_size),
    };
    AnthropicCompletions {
        parameters,
        converse: ConverseProfile::new(
            // Converse applies its own turn template, so the raw-prompt
            // stop sequence stays out of inferenceConfig.
            ConverseParameters {
                stop_sequences: StopSequenceParams::new(Some(8191), &[]),
                ..ConverseParameters::from_text(
                    parameters,
                    Parameter::not_supported(ParameterName::MaxReasoningTokens),
                )
            },
            COMPLETIONS_FEATURES,
            ReasoningEncoding::None,
        ),
    }
}

// ---------------------------------------------------------------------------
// Messages schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnthropicMessages {
    pub parameters: TextGenerationParameters,
    pub converse: ConverseProfile,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    anthropic_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
    messages: [MessagesTurn<'a>; 1],
}

#[derive(Debug, Serialize)]
struct MessagesTurn<'a> {
    role: &'static str,
    content: [MessagesText<'a>; 1],
}

#[derive(Debug, Serialize)]
struct MessagesText<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<MessagesContent>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<MessagesUsage>,
}

/// Entries other than `text` (for example `thinking`) carry no visible text.
#[derive(Debug, Deserialize)]
struct MessagesContent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessagesUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl TextModality for AnthropicMessages {
    fn text_parameters(&self) -> &TextGenerationParameters {
        &self.parameters
    }

    fn text_request_body(&self, request: &TextRequest) -> Result<serde_json::Value> {
        let params = &self.parameters;
        let body = MessagesRequest {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: params.max_tokens.resolve(request.max_tokens),
            temperature: params.temperature.resolve(request.temperature),
            top_p: params.top_p.resolve(request.top_p),
            top_k: params.top_k.resolve(request.top_k),
            stop_sequences: params
                .stop_sequences
                .resolve(request.stop_sequences.as_deref()),
            messages: [MessagesTurn {
                role: "user",
                content: [MessagesText {
                    kind: "text",
                    text: &request.prompt,
                }],
            }],
        };
        encode_body(Family::Anthropic, &body)
    }

    fn text_response_body(&self, body: &[u8]) -> std::result::Result<TextCompletion, DecodeError> {
        let response: MessagesResponse = decode_body(Family::Anthropic, body)?;
        let texts: Vec<String> = response
            .content
            .into_iter()
            .filter(|entry| entry.kind == "text")
            .filter_map(|entry| entry.text)
            .collect();
        if texts.is_empty() {
            return Err(missing(Family::Anthropic, "content[].text"));
        }
        Ok(TextCompletion {
            text: texts.concat(),
            stop_reason: response.stop_reason,
            usage: response
                .usage
                .and_then(|u| usage(Some(u.input_tokens), Some(u.output_tokens))),
        })
    }
}

// ---------------------------------------------------------------------------
// Legacy text-completions schema
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnthropicCompletions {
    pub parameters: TextGenerationParameters,
    pub converse: ConverseProfile,
}

#[derive(Debug, Serialize)]
struct CompletionsRequest {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens_to_sample: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionsResponse {
    completion: String,
    #[serde(default)]
    stop_reason: Option<String>,
}

impl TextModality for AnthropicCompletions {
    fn text_parameters(&self) -> &TextGenerationParameters {
        &self.parameters
    }

    fn text_request_body(&self, request: &TextRequest) -> Result<serde_json::Value> {
        let params = &self.parameters;
        let body = CompletionsRequest {
            prompt: format!("{} {}{}", HUMAN_TURN, request.prompt, ASSISTANT_TURN),
            max_tokens_to_sample: params.max_tokens.resolve(request.max_tokens),
            temperature: params.temperature.resolve(request.temperature),
            top_p: params.top_p.resolve(request.top_p),
            top_k: params.top_k.resolve(request.top_k),
            stop_sequences: params
                .stop_sequences
                .resolve(request.stop_sequences.as_deref()),
        };
        encode_body(Family::Anthropic, &body)
    }

    fn text_response_body(&self, body: &[u8]) -> std::result::Result<TextCompletion, DecodeError> {
        let response: CompletionsResponse = decode_body(Family::Anthropic, body)?;
        Ok(TextCompletion {
            text: response.completion,
            stop_reason: response.stop_reason,
            usage: None,
        })
    }
}
