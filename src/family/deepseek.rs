//! DeepSeek R1 codec. The prompt is wrapped in the model's chat template and
//! the assistant turn is opened inside a `<think>` block.

use crate::api::{TextCompletion, TextRequest};
use crate::error::{DecodeError, Result};
use crate::family::common::{decode_body, encode_body, missing};
use crate::family::{ConverseProfile, Family, ReasoningEncoding};
use crate::parameters::{
    ConverseParameters, Parameter, ParameterName, PromptParams, StopSequenceParams,
    TextGenerationParameters,
};
use crate::traits::{ConverseFeature, TextModality};
use serde::{Deserialize, Serialize};

pub const DEEPSEEK_R1: &str = "us.deepseek.r1-v1:0";

const FEATURES: &[ConverseFeature] = &[
    ConverseFeature::TextGeneration,
    ConverseFeature::SystemPrompts,
    ConverseFeature::Document,
    ConverseFeature::Reasoning,
];

const PARAMETERS: TextGenerationParameters = TextGenerationParameters {
    temperature: Parameter::new(ParameterName::Temperature, 0.0, 1.0, 1.0),
    max_tokens: Parameter::new(ParameterName::MaxTokens, 1, 32_768, 8192),
    top_p: Parameter::new(ParameterName::TopP, 0.0, 1.0, 1.0),
    top_k: Parameter::not_supported(ParameterName::TopK),
    stop_sequences: StopSequenceParams::new(Some(10), &[]),
    prompt: PromptParams::new(128_000),
};

/// Reasoning is always on; its budget cannot be tuned.
pub const fn deepseek_r1() -> DeepSeekR1 {
    DeepSeekR1 {
        parameters: PARAMETERS,
        converse: ConverseProfile::new(
            ConverseParameters::from_text(
                PARAMETERS,
                Parameter::not_supported(ParameterName::MaxReasoningTokens),
            ),
            FEATURES,
            ReasoningEncoding::Builtin,
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeepSeekR1 {
    pub parameters: TextGenerationParameters,
    pub converse: ConverseProfile,
}

fn apply_template(prompt: &str) -> String {
    format!(
        "<｜begin▁of▁sentence｜><｜User｜>{}<｜Assistant｜><think>\n",
        prompt
    )
}

#[derive(Debug, Serialize)]
struct DeepSeekRequest {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DeepSeekResponse {
    choices: Vec<DeepSeekChoice>,
}

#[derive(Debug, Deserialize)]
struct DeepSeekChoice {
    text: String,
    #[serde(default)]
    stop_reason: Option<String>,
}

impl TextModality for DeepSeekR1 {
    fn text_parameters(&self) -> &TextGenerationParameters {
        &self.parameters
    }

    fn text_request_body(&self, request: &TextRequest) -> Result<serde_json::Value> {
        let params = &self.parameters;
        let body = DeepSeekRequest {
            prompt: apply_template(&request.prompt),
            temperature: params.temperature.resolve(request.temperature),
            top_p: params.top_p.resolve(request.top_p),
            max_tokens: params.max_tokens.resolve(request.max_tokens),
            stop: params
                .stop_sequences
                .resolve(request.stop_sequences.as_deref()),
        };
        encode_body(Family::DeepSeek, &body)
    }

    fn text_response_body(&self, body: &[u8]) -> std::result::Result<TextCompletion, DecodeError> {
        let response: DeepSeekResponse = decode_body(Family::DeepSeek, body)?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| missing(Family::DeepSeek, "choices[0].text"))?;
        Ok(TextCompletion {
            text: choice.text,
            stop_reason: choice.stop_reason,
            usage: None,
        })
    }
}
