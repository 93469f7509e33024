//! Meta Llama 3 codec: a raw prompt in the Llama 3 header-token template.
//! Llama takes neither top-k nor stop sequences.

use crate::api::{TextCompletion, TextRequest};
use crate::error::{DecodeError, Result};
use crate::family::common::{decode_body, encode_body, usage};
use crate::family::{ConverseProfile, Family, ReasoningEncoding};
use crate::parameters::{
    ConverseParameters, Parameter, ParameterName, PromptParams, StopSequenceParams,
    TextGenerationParameters,
};
use crate::traits::{ConverseFeature, TextModality};
use serde::{Deserialize, Serialize};

pub const LLAMA_3_8B: &str = "meta.llama3-8b-instruct-v1:0";
pub const LLAMA_3_70B: &str = "meta.llama3-70b-instruct-v1:0";
pub const LLAMA_3_1_8B: &str = "us.meta.llama3-1-8b-instruct-v1:0";
pub const LLAMA_3_1_70B: &str = "us.meta.llama3-1-70b-instruct-v1:0";
pub const LLAMA_3_2_1B: &str = "us.meta.llama3-2-1b-instruct-v1:0";
pub const LLAMA_3_2_3B: &str = "us.meta.llama3-2-3b-instruct-v1:0";
pub const LLAMA_3_3_70B: &str = "us.meta.llama3-3-70b-instruct-v1:0";

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

/// Llama codec. `prompt_size` is the context limit in characters; 3.1 and
/// later models can call tools through Converse.
pub const fn llama(prompt_size: usize, tool_use: bool) -> Llama {
    let parameters = TextGenerationParameters {
        temperature: Parameter::new(ParameterName::Temperature, 0.0, 1.0, 0.5),
        max_tokens: Parameter::new(ParameterName::MaxTokens, 1, 2048, 512),
        top_p: Parameter::new(ParameterName::TopP, 0.0, 1.0, 0.9),
        top_k: Parameter::not_supported(ParameterName::TopK),
        stop_sequences: StopSequenceParams::not_supported(),
        prompt: PromptParams::new(prompt_size),
    };
    Llama {
        parameters,
        converse: ConverseProfile::new(
            ConverseParameters::from_text(
                parameters,
                Parameter::not_supported(ParameterName::MaxReasoningTokens),
            ),
            if tool_use { TOOL_FEATURES } else { FEATURES },
            ReasoningEncoding::None,
        ),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Llama {
    pub parameters: TextGenerationParameters,
    pub converse: ConverseProfile,
}

fn apply_template(prompt: &str) -> String {
    format!(
        "<|begin_of_text|><|start_header_id|>user<|end_header_id|>\n{}<|eot_id|>\n<|start_header_id|>assistant<|end_header_id|>\n",
        prompt
    )
}

#[derive(Debug, Serialize)]
struct LlamaRequest {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_gen_len: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct LlamaResponse {
    generation: String,
    #[serde(default)]
    prompt_token_count: Option<u32>,
    #[serde(default)]
    generation_token_count: Option<u32>,
    #[serde(default)]
    stop_reason: Option<String>,
}

impl TextModality for Llama {
    fn text_parameters(&self) -> &TextGenerationParameters {
        &self.parameters
    }

    fn text_request_body(&self, request: &TextRequest) -> Result<serde_json::Value> {
        let params = &self.parameters;
        let body = LlamaRequest {
            prompt: apply_template(&request.prompt),
            temperature: params.temperature.resolve(request.temperature),
            top_p: params.top_p.resolve(request.top_p),
            max_gen_len: params.max_tokens.resolve(request.max_tokens),
        };
        encode_body(Family::Llama, &body)
    }

    fn text_response_body(&self, body: &[u8]) -> std::result::Result<TextCompletion, DecodeError> {
        let response: LlamaResponse = decode_body(Family::Llama, body)?;
        Ok(TextCompletion {
            text: response.generation,
            stop_reason: response.stop_reason,
            usage: usage(response.prompt_token_count, response.generation_token_count),
        })
    }
}
