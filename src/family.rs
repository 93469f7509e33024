//! Per-vendor wire codecs.
//!
//! Every registered model holds exactly one [`FamilyCodec`]. Which modality
//! interfaces a model satisfies is decided by the codec variant and nothing
//! else, so capability checks are an exhaustive match returning `Option`.
//!
//! | Module | Family | Wire shape |
//! |--------|--------|------------|
//! | `anthropic` | Anthropic | Messages (`bedrock-2023-05-31`) and legacy text completions |
//! | `titan` | Titan | `inputText` + `textGenerationConfig` |
//! | `nova` | Nova | `messages-v1` with `inferenceConfig` |
//! | `deepseek` | DeepSeek | templated `prompt` + `stop` |
//! | `llama` | Llama | templated `prompt` + `max_gen_len` |
//! | `mistral` | Mistral | `[INST]` `prompt` + `stop` |
//! | `amazon_image` | Amazon image | `taskType` + `imageGenerationConfig` |
//!
//! A schema revision is a new codec next to the old one; existing codecs are
//! never edited to follow a vendor change.

pub(crate) mod common;

pub mod amazon_image;
pub mod anthropic;
pub mod deepseek;
pub mod llama;
pub mod mistral;
pub mod nova;
pub mod titan;

pub use amazon_image::AmazonImage;
pub use anthropic::{AnthropicCompletions, AnthropicMessages};
pub use deepseek::DeepSeekR1;
pub use llama::Llama;
pub use mistral::MistralText;
pub use nova::NovaText;
pub use titan::TitanText;

use crate::parameters::ConverseParameters;
use crate::traits::{
    ConverseFeature, ConverseModality, ImageModality, ImageVariationModality, TextModality,
    TextToImageModality,
};
use serde_json::json;

/// Vendor label of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Anthropic,
    Titan,
    Nova,
    DeepSeek,
    Llama,
    Mistral,
    AmazonImage,
}

impl Family {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "Anthropic",
            Self::Titan => "Titan",
            Self::Nova => "Nova",
            Self::DeepSeek => "DeepSeek",
            Self::Llama => "Llama",
            Self::Mistral => "Mistral",
            Self::AmazonImage => "Amazon Image",
        }
    }
}

impl std::fmt::Display for Family {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a model switches reasoning on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasoningEncoding {
    /// The model does not reason, or needs no request fields.
    None,
    /// `additionalModelRequestFields.thinking` with a token budget.
    AnthropicThinking,
    /// Reasoning is always on and cannot be tuned.
    Builtin,
}

/// Converse bounds and features of one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConverseProfile {
    pub parameters: ConverseParameters,
    pub features: &'static [ConverseFeature],
    pub reasoning: ReasoningEncoding,
}

impl ConverseProfile {
    pub const fn new(
        parameters: ConverseParameters,
        features: &'static [ConverseFeature],
        reasoning: ReasoningEncoding,
    ) -> Self {
        Self {
            parameters,
            features,
            reasoning,
        }
    }
}

impl ConverseModality for ConverseProfile {
    fn converse_parameters(&self) -> &ConverseParameters {
        &self.parameters
    }

    fn converse_features(&self) -> &[ConverseFeature] {
        self.features
    }

    fn reasoning_request_fields(&self, budget: Option<u32>) -> Option<serde_json::Value> {
        match self.reasoning {
            ReasoningEncoding::AnthropicThinking => Some(match budget {
                Some(budget) => json!({"thinking": {"type": "enabled", "budget_tokens": budget}}),
                None => json!({"thinking": {"type": "enabled"}}),
            }),
            ReasoningEncoding::None | ReasoningEncoding::Builtin => None,
        }
    }
}

/// One arm per vendor codec.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FamilyCodec {
    AnthropicMessages(AnthropicMessages),
    AnthropicCompletions(AnthropicCompletions),
    Titan(TitanText),
    Nova(NovaText),
    DeepSeek(DeepSeekR1),
    Llama(Llama),
    Mistral(MistralText),
    AmazonImage(AmazonImage),
    /// Reachable only through the Converse protocol.
    Converse(ConverseProfile),
}

impl FamilyCodec {
    pub fn text(&self) -> Option<&dyn TextModality> {
        match self {
            Self::AnthropicMessages(codec) => Some(codec),
            Self::AnthropicCompletions(codec) => Some(codec),
            Self::Titan(codec) => Some(codec),
            Self::Nova(codec) => Some(codec),
            Self::DeepSeek(codec) => Some(codec),
            Self::Llama(codec) => Some(codec),
            Self::Mistral(codec) => Some(codec),
            Self::AmazonImage(_) | Self::Converse(_) => None,
        }
    }

    pub fn image(&self) -> Option<&dyn ImageModality> {
        match self {
            Self::AmazonImage(codec) => Some(codec),
            _ => None,
        }
    }

    pub fn text_to_image(&self) -> Option<&dyn TextToImageModality> {
        match self {
            Self::AmazonImage(codec) => Some(codec),
            _ => None,
        }
    }

    pub fn image_variation(&self) -> Option<&dyn ImageVariationModality> {
        match self {
            Self::AmazonImage(codec) => Some(codec),
            _ => None,
        }
    }

    pub fn converse(&self) -> Option<&dyn ConverseModality> {
        match self {
            Self::AnthropicMessages(codec) => Some(&codec.converse),
            Self::AnthropicCompletions(codec) => Some(&codec.converse),
            Self::Titan(codec) => Some(&codec.converse),
            Self::Nova(codec) => Some(&codec.converse),
            Self::DeepSeek(codec) => Some(&codec.converse),
            Self::Llama(codec) => Some(&codec.converse),
            Self::Mistral(codec) => Some(&codec.converse),
            Self::Converse(profile) => Some(profile),
            Self::AmazonImage(_) => None,
        }
    }
}
