//! Bounded parameter descriptors and the per-operation parameter sets every
//! registered model declares.
//!
//! All descriptors are `const`-constructible so the model catalog can be a
//! compile-time table. Validation itself lives in [`crate::validation`]; this
//! module only describes bounds and resolves defaults.

use crate::api::ImageResolution;
use crate::error::ValidationError;
use std::cmp::Ordering;
use std::fmt;

/// Name of a tunable field, used in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterName {
    Temperature,
    MaxTokens,
    TopP,
    TopK,
    StopSequences,
    Prompt,
    NegativePrompt,
    NrOfImages,
    CfgScale,
    Seed,
    Similarity,
    Images,
    MaxReasoningTokens,
}

impl ParameterName {
    /// Wire-neutral camelCase name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::MaxTokens => "maxTokens",
            Self::TopP => "topP",
            Self::TopK => "topK",
            Self::StopSequences => "stopSequences",
            Self::Prompt => "prompt",
            Self::NegativePrompt => "negativePrompt",
            Self::NrOfImages => "nrOfImages",
            Self::CfgScale => "cfgScale",
            Self::Seed => "seed",
            Self::Similarity => "similarity",
            Self::Images => "images",
            Self::MaxReasoningTokens => "maxReasoningTokens",
        }
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounded value descriptor for one tunable field of one model.
///
/// Bounds are inclusive. When `is_supported` is `false` no bound is ever
/// consulted and [`validate`](Self::validate) always fails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameter<T> {
    pub name: ParameterName,
    pub min_value: Option<T>,
    pub max_value: Option<T>,
    pub default_value: Option<T>,
    pub is_supported: bool,
}

impl<T> Parameter<T> {
    /// A supported parameter with both bounds and a default.
    pub const fn new(name: ParameterName, min: T, max: T, default: T) -> Self {
        Self {
            name,
            min_value: Some(min),
            max_value: Some(max),
            default_value: Some(default),
            is_supported: true,
        }
    }

    /// A supported parameter with any combination of bounds and default.
    pub const fn bounded(
        name: ParameterName,
        min: Option<T>,
        max: Option<T>,
        default: Option<T>,
    ) -> Self {
        Self {
            name,
            min_value: min,
            max_value: max,
            default_value: default,
            is_supported: true,
        }
    }

    /// A parameter the model does not accept.
    pub const fn not_supported(name: ParameterName) -> Self {
        Self {
            name,
            min_value: None,
            max_value: None,
            default_value: None,
            is_supported: false,
        }
    }
}

impl<T: Copy + PartialOrd + fmt::Display> Parameter<T> {
    /// Check `value` against this descriptor.
    ///
    /// Fails for every input, `None` included, when the parameter is not
    /// supported. Otherwise `None` passes and `Some(v)` must lie within the
    /// inclusive bounds. Values that cannot be ordered (NaN) fail closed.
    pub fn validate(&self, value: Option<T>) -> Result<(), ValidationError> {
        if !self.is_supported {
            return Err(ValidationError::NotSupported {
                name: self.name.to_string(),
            });
        }
        let Some(value) = value else {
            return Ok(());
        };
        if let Some(min) = self.min_value
            && value.partial_cmp(&min).is_none_or(Ordering::is_lt)
        {
            return Err(ValidationError::BelowMinimum {
                name: self.name.to_string(),
                value: value.to_string(),
                min: min.to_string(),
            });
        }
        if let Some(max) = self.max_value
            && value.partial_cmp(&max).is_none_or(Ordering::is_gt)
        {
            return Err(ValidationError::AboveMaximum {
                name: self.name.to_string(),
                value: value.to_string(),
                max: max.to_string(),
            });
        }
        Ok(())
    }

    /// The value to put on the wire: the caller's value, else this model's
    /// default. Always `None` for unsupported parameters.
    pub fn resolve(&self, value: Option<T>) -> Option<T> {
        if !self.is_supported {
            return None;
        }
        value.or(self.default_value)
    }
}

/// Size bound for a free-text prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptParams {
    pub name: ParameterName,
    /// Maximum length in characters; `None` means unbounded.
    pub max_size: Option<usize>,
}

impl PromptParams {
    pub const fn new(max_size: usize) -> Self {
        Self {
            name: ParameterName::Prompt,
            max_size: Some(max_size),
        }
    }

    pub const fn unbounded() -> Self {
        Self {
            name: ParameterName::Prompt,
            max_size: None,
        }
    }

    pub const fn negative(max_size: usize) -> Self {
        Self {
            name: ParameterName::NegativePrompt,
            max_size: Some(max_size),
        }
    }
}

/// Stop-sequence descriptor: how many the model accepts and which ones it
/// needs when the caller supplies none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopSequenceParams {
    pub max_sequences: Option<usize>,
    pub default_value: &'static [&'static str],
    pub is_supported: bool,
}

impl StopSequenceParams {
    pub const fn new(max_sequences: Option<usize>, default_value: &'static [&'static str]) -> Self {
        Self {
            max_sequences,
            default_value,
            is_supported: true,
        }
    }

    pub const fn not_supported() -> Self {
        Self {
            max_sequences: None,
            default_value: &[],
            is_supported: false,
        }
    }

    /// The caller's sequences, else this model's defaults.
    pub fn resolve(&self, value: Option<&[String]>) -> Vec<String> {
        if !self.is_supported {
            return Vec::new();
        }
        match value {
            Some(sequences) if !sequences.is_empty() => sequences.to_vec(),
            _ => self.default_value.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Resolution limits of an image model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolutionConstraints {
    pub min_side: u32,
    pub max_side: u32,
    /// Both sides must be a multiple of this.
    pub step: u32,
    pub max_pixels: u64,
    /// Longest side divided by shortest side.
    pub max_aspect_ratio: f64,
}

/// Parameters for single-turn text completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextGenerationParameters {
    pub temperature: Parameter<f64>,
    pub max_tokens: Parameter<u32>,
    pub top_p: Parameter<f64>,
    pub top_k: Parameter<u32>,
    pub stop_sequences: StopSequenceParams,
    pub prompt: PromptParams,
}

/// Parameters shared by every image operation of a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageGenerationParameters {
    pub nr_of_images: Parameter<u32>,
    pub cfg_scale: Parameter<f64>,
    pub seed: Parameter<u64>,
    pub resolution: ResolutionConstraints,
    pub default_resolution: ImageResolution,
}

/// Prompt bounds for text-to-image generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextToImageParameters {
    pub prompt: PromptParams,
    pub negative_prompt: PromptParams,
}

/// Bounds for image variation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageVariationParameters {
    /// Number of reference images.
    pub images: Parameter<usize>,
    pub similarity: Parameter<f64>,
    pub prompt: PromptParams,
    pub negative_prompt: PromptParams,
}

/// Parameters for multi-turn conversation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConverseParameters {
    pub temperature: Parameter<f64>,
    pub max_tokens: Parameter<u32>,
    pub top_p: Parameter<f64>,
    pub stop_sequences: StopSequenceParams,
    pub prompt: PromptParams,
    pub max_reasoning_tokens: Parameter<u32>,
}

impl ConverseParameters {
    /// Reuse a model's text-generation bounds for conversation.
    pub const fn from_text(
        text: TextGenerationParameters,
        max_reasoning_tokens: Parameter<u32>,
    ) -> Self {
        Self {
            temperature: text.temperature,
            max_tokens: text.max_tokens,
            top_p: text.top_p,
            stop_sequences: text.stop_sequences,
            prompt: text.prompt,
            max_reasoning_tokens,
        }
    }
}
