//! Amazon Nova text codec (`messages-v1` schema) and the Converse-only Nova
//! Premier profile.

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

pub const NOVA_MICRO: &str = "amazon.nova-micro-v1:0";
pub const NOVA_LITE: &str = "amazon.nova-lite-v1:0";
pub const NOVA_PRO: &str = "amazon.nova-pro-v1:0";
pub const NOVA_PREMIER: &str = "us.amazon.nova-premier-v1:0";

const SCHEMA_VERSION: &str = "messages-v1";

const MICRO_FEATURES: &[ConverseFeature] = &[
    ConverseFeature::TextGeneration,
    ConverseFeature::SystemPrompts,
    ConverseFeature::ToolUse,
];

const MULTIMODAL_FEATURES: &[ConverseFeature] = &[
    ConverseFeature::TextGeneration,
    ConverseFeature::SystemPrompts,
    ConverseFeature::ToolUse,
    ConverseFeature::Vision,
    ConverseFeature::Document,
];

const fn nova_parameters(
    max_tokens: u32,
    default_max_tokens: u32,
    prompt_size: usize,
) -> TextGenerationParameters {
    TextGenerationParameters {
        temperature: Parameter::new(ParameterName::Temperature, 0.00001, 1.0, 0.7),
        max_tokens: Parameter::new(ParameterName::MaxTokens, 1, max_tokens, default_max_tokens),
        top_p: Parameter::new(ParameterName::TopP, 0.0, 1.0, 0.9),
        top_k: Parameter::new(ParameterName::TopK, 0, 128, 50),
        stop_sequences: StopSequenceParams::new(Some(4), &[]),
        prompt: PromptParams::new(prompt_size),
    }
}

/// Nova text codec. Micro is text-only; Lite and Pro also accept images and
/// documents through Converse.
pub const fn nova_text(multimodal: bool) -> NovaText {
    let parameters = if multimodal {
        nova_parameters(5120, 5120, 300_000)
    } else {
        nova_parameters(5120, 5120, 128_000)
    };
    let features = if multimodal {
        MULTIMODAL_FEATURES
    } else {
        MICRO_FEATURES
    };
    NovaText {
        parameters,
        converse: ConverseProfile::new(
            ConverseParameters::from_text(
                parameters,
                Parameter::not_supported(ParameterName::MaxReasoningTokens),
            ),
            features,
            ReasoningEncoding::None,
        ),
    }
}

/// Nova Premier is only served through Converse.
pub const fn nova_premier() -> ConverseProfile {
    ConverseProfile::new(
        ConverseParameters::from_text(
            nova_parameters(32_000, 5120, 1_000_000),
            Parameter::not_supported(ParameterName::MaxReasoningTokens),
        ),
        MULTIMODAL_FEATURES,
        ReasoningEncoding::None,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NovaText {
    pub parameters: TextGenerationParameters,
    pub converse: ConverseProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NovaRequest<'a> {
    schema_version: &'static str,
    messages: [NovaMessage<'a>; 1],
    inference_config: NovaInferenceConfig,
}

#[derive(Debug, Serialize)]
struct NovaMessage<'a> {
    role: &'static str,
    content: [NovaTextBlock<'a>; 1],
}

#[derive(Debug, Serialize)]
struct NovaTextBlock<'a> {
    text: &'a str,
}

/// Nova mixes snake_case sampling keys with a camelCase `stopSequences`.
#[derive(Debug, Serialize)]
struct NovaInferenceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_new_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(rename = "stopSequences", skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NovaResponse {
    output: NovaOutput,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<NovaUsage>,
}

#[derive(Debug, Deserialize)]
struct NovaOutput {
    message: NovaOutputMessage,
}

#[derive(Debug, Deserialize)]
struct NovaOutputMessage {
    content: Vec<NovaOutputContent>,
}

#[derive(Debug, Deserialize)]
struct NovaOutputContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NovaUsage {
    input_tokens: u32,
    output_tokens: u32,
}

impl TextModality for NovaText {
    fn text_parameters(&self) -> &TextGenerationParameters {
        &self.parameters
    }

    fn text_request_body(&self, request: &TextRequest) -> Result<serde_json::Value> {
        let params = &self.parameters;
        let body = NovaRequest {
            schema_version: SCHEMA_VERSION,
            messages: [NovaMessage {
                role: "user",
                content: [NovaTextBlock {
                    text: &request.prompt,
                }],
            }],
            inference_config: NovaInferenceConfig {
                max_new_tokens: params.max_tokens.resolve(request.max_tokens),
                temperature: params.temperature.resolve(request.temperature),
                top_p: params.top_p.resolve(request.top_p),
                top_k: params.top_k.resolve(request.top_k),
                stop_sequences: params
                    .stop_sequences
                    .resolve(request.stop_sequences.as_deref()),
            },
        };
        encode_body(Family::Nova, &body)
    }

    fn text_response_body(&self, body: &[u8]) -> std::result::Result<TextCompletion, DecodeError> {
        let response: NovaResponse = decode_body(Family::Nova, body)?;
        let texts: Vec<String> = response
            .output
            .message
            .content
            .into_iter()
            .filter_map(|entry| entry.text)
            .collect();
        if texts.is_empty() {
            return Err(missing(Family::Nova, "output.message.content[].text"));
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
