//! Mistral codec (`[INST]` prompt template) and the Converse-only Mistral
//! Large 2407 profile.

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

pub const MISTRAL_7B_INSTRUCT: &str = "mistral.mistral-7b-instruct-v0:2";
pub const MIXTRAL_8X7B_INSTRUCT: &str = "mistral.mixtral-8x7b-instruct-v0:1";
pub const MISTRAL_SMALL: &str = "mistral.mistral-small-2402-v1:0";
pub const MISTRAL_LARGE: &str = "mistral.mistral-large-2402-v1:0";
pub const MISTRAL_LARGE_2407: &str = "mistral.mistral-large-2407-v1:0";

const FEATURES: &[ConverseFeature] = &[
    ConverseFeature::TextGeneration,
    ConverseFeature::SystemPrompts,
    ConverseFeature::Document,
];

const TOOL_FEATURES: &[ConverseFeature] = &[
    ConverseFeature::TextGeneration,
    ConverseFeature::SystemPrompts,
    ConverseFeature::Document,
    ConverseFeature::ToolUse,
];

const fn instruct_parameters(temperature: f64, prompt_size: usize) -> TextGenerationParameters {
    TextGenerationParameters {
        temperature: Parameter::new(ParameterName::Temperature, 0.0, 1.0, temperature),
        max_tokens: Parameter::new(ParameterName::MaxTokens, 1, 8192, 512),
        top_p: Parameter::new(ParameterName::TopP, 0.0, 1.0, 0.9),
        top_k: Parameter::new(ParameterName::TopK, 1, 200, 50),
        stop_sequences: StopSequenceParams::new(Some(10), &[]),
        prompt: PromptParams::new(prompt_size),
    }
}

const fn with_converse(
    parameters: TextGenerationParameters,
    features: &'static [ConverseFeature],
) -> MistralText {
    MistralText {
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

/// Mistral 7B / Mixtral 8x7B.
pub const fn mistral_instruct(prompt_size: usize) -> MistralText {
    with_converse(instruct_parameters(0.5, prompt_size), FEATURES)
}

/// Mistral Small.
pub const fn mistral_small() -> MistralText {
    with_converse(instruct_parameters(0.7, 32_000), FEATURES)
}

/// Mistral Large 2402: no top-k, tool use through Converse.
pub const fn mistral_large() -> MistralText {
    let mut parameters = instruct_parameters(0.7, 32_000);
    parameters.top_p = Parameter::new(ParameterName::TopP, 0.0, 1.0, 1.0);
    parameters.top_k = Parameter::not_supported(ParameterName::TopK);
    with_converse(parameters, TOOL_FEATURES)
}

/// Mistral Large 2407 is only served through Converse.
pub const fn mistral_large_2407() -> ConverseProfile {
    let mut parameters = instruct_parameters(0.7, 128_000);
    parameters.top_p = Parameter::new(ParameterName::TopP, 0.0, 1.0, 1.0);
    ConverseProfile::new(
        ConverseParameters::from_text(
            parameters,
            Parameter::not_supported(ParameterName::MaxReasoningTokens),
        ),
        TOOL_FEATURES,
        ReasoningEncoding::None,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MistralText {
    pub parameters: TextGenerationParameters,
    pub converse: ConverseProfile,
}

#[derive(Debug, Serialize)]
struct MistralRequest {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MistralResponse {
    outputs: Vec<MistralOutput>,
}

#[derive(Debug, Deserialize)]
struct MistralOutput {
    text: String,
    #[serde(default)]
    stop_reason: Option<String>,
}

impl TextModality for MistralText {
    fn text_parameters(&self) -> &TextGenerationParameters {
        &self.parameters
    }

    fn text_request_body(&self, request: &TextRequest) -> Result<serde_json::Value> {
        let params = &self.parameters;
        let body = MistralRequest {
            prompt: format!("<s>[INST] {} [/INST]", request.prompt),
            max_tokens: params.max_tokens.resolve(request.max_tokens),
            temperature: params.temperature.resolve(request.temperature),
            top_p: params.top_p.resolve(request.top_p),
            top_k: params.top_k.resolve(request.top_k),
            stop: params
                .stop_sequences
                .resolve(request.stop_sequences.as_deref()),
        };
        encode_body(Family::Mistral, &body)
    }

    fn text_response_body(&self, body: &[u8]) -> std::result::Result<TextCompletion, DecodeError> {
        let response: MistralResponse = decode_body(Family::Mistral, body)?;
        let output = response
            .outputs
            .into_iter()
            .next()
            .ok_or_else(|| missing(Family::Mistral, "outputs[0].text"))?;
        Ok(TextCompletion {
            text: output.text,
            stop_reason: output.stop_reason,
            usage: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_wraps_prompt_in_inst_tags() {
        let body = mistral_instruct(32_000)
            .text_request_body(&TextRequest::new("Bonjour").with_top_k(10))
            .unwrap();
        assert_eq!(
            body,
            json!({
                "prompt": "<s>[INST] Bonjour [/INST]",
                "max_tokens": 512,
                "temperature": 0.5,
                "top_p": 0.9,
                "top_k": 10
            })
        );
    }

    #[test]
    fn large_omits_top_k() {
        let large = mistral_large();
        assert!(!large.parameters.top_k.is_supported);
        let body = large.text_request_body(&TextRequest::new("Hi")).unwrap();
        assert!(body.get("top_k").is_none());
        assert_eq!(body["top_p"], 1.0);
    }

    #[test]
    fn response_decodes_first_output() {
        let body = br#"{"outputs": [{"text": " Salut!", "stop_reason": "stop"}]}"#;
        let completion = mistral_small().text_response_body(body).unwrap();
        assert_eq!(completion.text, " Salut!");
    }

    #[test]
    fn empty_outputs_are_a_decode_error() {
        assert_eq!(
            mistral_small().text_response_body(br#"{"outputs": []}"#),
            Err(DecodeError::MissingField {
                family: "Mistral",
                field: "outputs[0].text"
            })
        );
    }
}
