//! Amazon Titan text codec: a flat `inputText` with one config record.

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

pub const TITAN_TEXT_PREMIER: &str = "amazon.titan-text-premier-v1:0";
pub const TITAN_TEXT_EXPRESS: &str = "amazon.titan-text-express-v1";
pub const TITAN_TEXT_LITE: &str = "amazon.titan-text-lite-v1";

const FEATURES: &[ConverseFeature] = &[ConverseFeature::TextGeneration, ConverseFeature::Document];

/// Titan text codec with the given output token ceiling.
pub const fn titan_text(max_tokens: u32) -> TitanText {
    let parameters = TextGenerationParameters {
        temperature: Parameter::new(ParameterName::Temperature, 0.0, 1.0, 0.7),
        max_tokens: Parameter::new(ParameterName::MaxTokens, 1, max_tokens, 512),
        top_p: Parameter::new(ParameterName::TopP, 0.0, 1.0, 0.9),
        top_k: Parameter::not_supported(ParameterName::TopK),
        stop_sequences: StopSequenceParams::new(Some(4), &[]),
        prompt: PromptParams::new(50_000),
    };
    TitanText {
        parameters,
        converse: ConverseProfile::new(
            ConverseParameters::from_text(
                parameters,
                Parameter::not_supported(ParameterName::MaxReasoningTokens),
            ),
            FEATURES,
            ReasoningEncoding::None,
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitanText {
    pub parameters: TextGenerationParameters,
    pub converse: ConverseProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanRequest<'a> {
    input_text: &'a str,
    text_generation_config: TitanConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TitanConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_token_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitanResponse {
    #[serde(default)]
    input_text_token_count: Option<u32>,
    results: Vec<TitanResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TitanResult {
    #[serde(default)]
    token_count: Option<u32>,
    output_text: String,
    #[serde(default)]
    completion_reason: Option<String>,
}

impl TextModality for TitanText {
    fn text_parameters(&self) -> &TextGenerationParameters {
        &self.parameters
    }

    fn text_request_body(&self, request: &TextRequest) -> Result<serde_json::Value> {
        let params = &self.parameters;
        let body = TitanRequest {
            input_text: &request.prompt,
            text_generation_config: TitanConfig {
                max_token_count: params.max_tokens.resolve(request.max_tokens),
                temperature: params.temperature.resolve(request.temperature),
                top_p: params.top_p.resolve(request.top_p),
                stop_sequences: params
                    .stop_sequences
                    .resolve(request.stop_sequences.as_deref()),
            },
        };
        encode_body(Family::Titan, &body)
    }

    fn text_response_body(&self, body: &[u8]) -> std::result::Result<TextCompletion, DecodeError> {
        let response: TitanResponse = decode_body(Family::Titan, body)?;
        let result = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| missing(Family::Titan, "results[0].outputText"))?;
        Ok(TextCompletion {
            text: result.output_text,
            stop_reason: result.completion_reason,
            usage: usage(response.input_text_token_count, result.token_count),
        })
    }
}
