//! Pre-flight validation of caller-supplied values against a model's declared
//! bounds.
//!
//! Called by the [`runtime`](crate::runtime) before any wire request is built.
//! Every check is a pure predicate: input is never mutated or clamped. Values
//! the caller left out are not checked here; the family codec substitutes the
//! model's default later.

use crate::api::{
    ConverseRequest, ImageOptions, ImageRequest, ImageResolution, ImageVariationRequest,
    TextRequest,
};
use crate::error::ValidationError;
use crate::parameters::{
    ConverseParameters, ImageGenerationParameters, ImageVariationParameters, Parameter,
    ParameterName, PromptParams, ResolutionConstraints, StopSequenceParams,
    TextGenerationParameters, TextToImageParameters,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt::Display;

/// Check an optional value. Absent values pass regardless of support.
pub fn validate_optional<T: Copy + PartialOrd + Display>(
    parameter: &Parameter<T>,
    value: Option<T>,
) -> Result<(), ValidationError> {
    match value {
        Some(_) => parameter.validate(value),
        None => Ok(()),
    }
}

/// A prompt must be non-empty after trimming whitespace, tabs, and newlines,
/// and no longer than `max_size` characters.
pub fn validate_prompt(params: &PromptParams, prompt: &str) -> Result<(), ValidationError> {
    if prompt.trim().is_empty() {
        return Err(ValidationError::EmptyPrompt {
            name: params.name.to_string(),
        });
    }
    if let Some(max) = params.max_size {
        let length = prompt.chars().count();
        if length > max {
            return Err(ValidationError::PromptTooLong {
                name: params.name.to_string(),
                length,
                max,
            });
        }
    }
    Ok(())
}

/// Check an optional caller-supplied stop-sequence list.
pub fn validate_stop_sequences(
    params: &StopSequenceParams,
    sequences: Option<&[String]>,
) -> Result<(), ValidationError> {
    let Some(sequences) = sequences else {
        return Ok(());
    };
    if !params.is_supported {
        return Err(ValidationError::NotSupported {
            name: ParameterName::StopSequences.to_string(),
        });
    }
    if let Some(max) = params.max_sequences
        && sequences.len() > max
    {
        return Err(ValidationError::AboveMaximum {
            name: ParameterName::StopSequences.to_string(),
            value: sequences.len().to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

/// Check a requested image size against a model's resolution constraints.
pub fn validate_resolution(
    constraints: &ResolutionConstraints,
    resolution: &ImageResolution,
) -> Result<(), ValidationError> {
    let ImageResolution { width, height } = *resolution;
    let invalid = |reason: String| ValidationError::InvalidResolution {
        width,
        height,
        reason,
    };

    for side in [width, height] {
        if side < constraints.min_side || side > constraints.max_side {
            return Err(invalid(format!(
                "each side must be between {} and {}",
                constraints.min_side, constraints.max_side
            )));
        }
        if side % constraints.step != 0 {
            return Err(invalid(format!(
                "each side must be a multiple of {}",
                constraints.step
            )));
        }
    }
    if u64::from(width) * u64::from(height) > constraints.max_pixels {
        return Err(invalid(format!(
            "total pixel count must not exceed {}",
            constraints.max_pixels
        )));
    }
    let (long, short) = if width >= height {
        (width, height)
    } else {
        (height, width)
    };
    if f64::from(long) / f64::from(short) > constraints.max_aspect_ratio {
        return Err(invalid(format!(
            "aspect ratio must not exceed {}:1",
            constraints.max_aspect_ratio
        )));
    }
    Ok(())
}

/// Validate a text completion request.
pub fn validate_text_request(
    params: &TextGenerationParameters,
    request: &TextRequest,
) -> Result<(), ValidationError> {
    validate_prompt(&params.prompt, &request.prompt)?;
    validate_optional(&params.max_tokens, request.max_tokens)?;
    validate_optional(&params.temperature, request.temperature)?;
    validate_optional(&params.top_p, request.top_p)?;
    validate_optional(&params.top_k, request.top_k)?;
    validate_stop_sequences(&params.stop_sequences, request.stop_sequences.as_deref())
}

fn validate_image_options(
    params: &ImageGenerationParameters,
    options: &ImageOptions,
) -> Result<(), ValidationError> {
    validate_optional(&params.nr_of_images, options.nr_of_images)?;
    validate_optional(&params.cfg_scale, options.cfg_scale)?;
    validate_optional(&params.seed, options.seed)?;
    if let Some(resolution) = &options.resolution {
        validate_resolution(&params.resolution, resolution)?;
    }
    Ok(())
}

/// Validate a text-to-image request.
pub fn validate_image_request(
    generation: &ImageGenerationParameters,
    text_to_image: &TextToImageParameters,
    request: &ImageRequest,
) -> Result<(), ValidationError> {
    validate_prompt(&text_to_image.prompt, &request.prompt)?;
    if let Some(negative) = &request.negative_prompt {
        validate_prompt(&text_to_image.negative_prompt, negative)?;
    }
    validate_image_options(generation, &request.options)
}

/// Validate an image variation request. The reference image count is always
/// checked since it is never optional, and every image must be base64.
pub fn validate_image_variation_request(
    generation: &ImageGenerationParameters,
    variation: &ImageVariationParameters,
    request: &ImageVariationRequest,
) -> Result<(), ValidationError> {
    variation.images.validate(Some(request.images.len()))?;
    for (index, image) in request.images.iter().enumerate() {
        STANDARD
            .decode(image)
            .map_err(|e| ValidationError::InvalidImage {
                index,
                message: e.to_string(),
            })?;
    }
    validate_prompt(&variation.prompt, &request.prompt)?;
    if let Some(negative) = &request.negative_prompt {
        validate_prompt(&variation.negative_prompt, negative)?;
    }
    validate_optional(&variation.similarity, request.similarity)?;
    validate_image_options(generation, &request.options)
}

/// Validate the scalar fields of a conversation turn.
pub fn validate_converse_request(
    params: &ConverseParameters,
    request: &ConverseRequest,
) -> Result<(), ValidationError> {
    if let Some(prompt) = &request.prompt {
        validate_prompt(&params.prompt, prompt)?;
    }
    validate_optional(&params.max_tokens, request.max_tokens)?;
    validate_optional(&params.temperature, request.temperature)?;
    validate_optional(&params.top_p, request.top_p)?;
    validate_stop_sequences(&params.stop_sequences, request.stop_sequences.as_deref())?;
    if !request.enable_reasoning {
        if request.max_reasoning_tokens.is_some() {
            return Err(ValidationError::InvalidPrompt(
                "maxReasoningTokens is set but reasoning is not enabled".to_string(),
            ));
        }
        return Ok(());
    }
    validate_optional(&params.max_reasoning_tokens, request.max_reasoning_tokens)?;
    // Budget and answer share maxTokens, so compare what goes on the wire.
    let budget = params
        .max_reasoning_tokens
        .resolve(request.max_reasoning_tokens);
    let max_tokens = params.max_tokens.resolve(request.max_tokens);
    if let (Some(budget), Some(max_tokens)) = (budget, max_tokens)
        && budget >= max_tokens
    {
        return Err(ValidationError::ReasoningBudgetTooLarge { budget, max_tokens });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: TextGenerationParameters = TextGenerationParameters {
        temperature: Parameter::new(ParameterName::Temperature, 0.0, 1.0, 0.7),
        max_tokens: Parameter::new(ParameterName::MaxTokens, 1, 5000, 512),
        top_p: Parameter::new(ParameterName::TopP, 0.0, 1.0, 0.9),
        top_k: Parameter::not_supported(ParameterName::TopK),
        stop_sequences: StopSequenceParams::new(Some(2), &[]),
        prompt: PromptParams::new(10),
    };

    const THINKING: ConverseParameters = ConverseParameters {
        temperature: Parameter::new(ParameterName::Temperature, 0.0, 1.0, 1.0),
        max_tokens: Parameter::new(ParameterName::MaxTokens, 1, 64_000, 8192),
        top_p: Parameter::new(ParameterName::TopP, 0.0, 1.0, 0.999),
        stop_sequences: StopSequenceParams::new(Some(8191), &[]),
        prompt: PromptParams::unbounded(),
        max_reasoning_tokens: Parameter::new(ParameterName::MaxReasoningTokens, 1024, 63_999, 4096),
    };

    const NOVA_LIKE: ResolutionConstraints = ResolutionConstraints {
        min_side: 320,
        max_side: 4096,
        step: 16,
        max_pixels: 4_194_304,
        max_aspect_ratio: 4.0,
    };

    #[test]
    fn blank_prompts_fail_regardless_of_size() {
        for prompt in ["", " ", "\n\t "] {
            assert!(matches!(
                validate_prompt(&PromptParams::unbounded(), prompt),
                Err(ValidationError::EmptyPrompt { .. })
            ));
        }
    }

    #[test]
    fn prompt_length_boundary() {
        let params = PromptParams::new(10);
        assert!(validate_prompt(&params, &"a".repeat(10)).is_ok());
        assert!(matches!(
            validate_prompt(&params, &"a".repeat(11)),
            Err(ValidationError::PromptTooLong { length: 11, max: 10, .. })
        ));
        // characters, not bytes
        assert!(validate_prompt(&params, &"é".repeat(10)).is_ok());
    }

    #[test]
    fn absent_unsupported_value_is_not_checked() {
        let request = TextRequest::new("hello");
        assert!(validate_text_request(&TEXT, &request).is_ok());
    }

    #[test]
    fn present_unsupported_value_fails() {
        let request = TextRequest::new("hello").with_top_k(10);
        assert_eq!(
            validate_text_request(&TEXT, &request),
            Err(ValidationError::NotSupported {
                name: "topK".to_string()
            })
        );
    }

    #[test]
    fn max_tokens_boundaries() {
        let below = TextRequest::new("hello").with_max_tokens(0);
        assert!(matches!(
            validate_text_request(&TEXT, &below),
            Err(ValidationError::BelowMinimum { .. })
        ));
        let at_max = TextRequest::new("hello").with_max_tokens(5000);
        assert!(validate_text_request(&TEXT, &at_max).is_ok());
    }

    #[test]
    fn too_many_stop_sequences() {
        let request = TextRequest::new("hello").with_stop_sequences(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]);
        assert!(matches!(
            validate_text_request(&TEXT, &request),
            Err(ValidationError::AboveMaximum { .. })
        ));
    }

    #[test]
    fn validation_never_mutates_input() {
        let request = TextRequest::new("hello").with_temperature(3.0);
        let before = request.clone();
        assert!(validate_text_request(&TEXT, &request).is_err());
        assert_eq!(request, before);
    }

    #[test]
    fn resolution_rules() {
        assert!(validate_resolution(&NOVA_LIKE, &ImageResolution::new(1024, 1024)).is_ok());
        assert!(validate_resolution(&NOVA_LIKE, &ImageResolution::new(1020, 1024)).is_err());
        assert!(validate_resolution(&NOVA_LIKE, &ImageResolution::new(4096, 4096)).is_err());
        assert!(validate_resolution(&NOVA_LIKE, &ImageResolution::new(320, 2560)).is_err());
        assert!(validate_resolution(&NOVA_LIKE, &ImageResolution::new(160, 160)).is_err());
    }

    #[test]
    fn default_budget_must_fit_under_caller_max_tokens() {
        let mut request = ConverseRequest::prompt(Vec::new(), "Think");
        request.enable_reasoning = true;
        request.max_tokens = Some(2000);
        assert_eq!(
            validate_converse_request(&THINKING, &request),
            Err(ValidationError::ReasoningBudgetTooLarge {
                budget: 4096,
                max_tokens: 2000
            })
        );

        request.max_reasoning_tokens = Some(1024);
        assert!(validate_converse_request(&THINKING, &request).is_ok());
    }

    #[test]
    fn caller_budget_must_fit_under_default_max_tokens() {
        let mut request = ConverseRequest::prompt(Vec::new(), "Think");
        request.enable_reasoning = true;
        request.max_reasoning_tokens = Some(8192);
        assert_eq!(
            validate_converse_request(&THINKING, &request),
            Err(ValidationError::ReasoningBudgetTooLarge {
                budget: 8192,
                max_tokens: 8192
            })
        );

        request.max_reasoning_tokens = Some(8191);
        assert!(validate_converse_request(&THINKING, &request).is_ok());
    }

    #[test]
    fn budget_is_ignored_without_reasoning() {
        let mut request = ConverseRequest::prompt(Vec::new(), "Think");
        request.max_tokens = Some(2000);
        assert!(validate_converse_request(&THINKING, &request).is_ok());
    }
}
