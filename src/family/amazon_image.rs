//! Amazon image codec shared by Titan Image Generator and Nova Canvas.
//!
//! Requests are tagged by `taskType` and share one `imageGenerationConfig`
//! record. Responses carry base64 images, or an `error` string when the
//! model refused the task.

use crate::api::{
    ImageGenerationOutput, ImageOptions, ImageQuality, ImageRequest, ImageResolution,
    ImageVariationRequest,
};
use crate::error::{DecodeError, Result};
use crate::family::Family;
use crate::family::common::{decode_body, encode_body, missing};
use crate::parameters::{
    ImageGenerationParameters, ImageVariationParameters, Parameter, ParameterName, PromptParams,
    ResolutionConstraints, TextToImageParameters,
};
use crate::traits::{ImageModality, ImageVariationModality, TextToImageModality};
use serde::{Deserialize, Serialize};

pub const TITAN_IMAGE_V1: &str = "amazon.titan-image-generator-v1";
pub const TITAN_IMAGE_V2: &str = "amazon.titan-image-generator-v2:0";
pub const NOVA_CANVAS: &str = "amazon.nova-canvas-v1:0";

const TITAN_RESOLUTION: ResolutionConstraints = ResolutionConstraints {
    min_side: 320,
    max_side: 1408,
    step: 64,
    max_pixels: 1408 * 1408,
    max_aspect_ratio: 4.0,
};

const NOVA_CANVAS_RESOLUTION: ResolutionConstraints = ResolutionConstraints {
    min_side: 320,
    max_side: 4096,
    step: 16,
    max_pixels: 4_194_304,
    max_aspect_ratio: 4.0,
};

const fn titan_generation(default_resolution: ImageResolution) -> ImageGenerationParameters {
    ImageGenerationParameters {
        nr_of_images: Parameter::new(ParameterName::NrOfImages, 1, 5, 1),
        cfg_scale: Parameter::new(ParameterName::CfgScale, 1.1, 10.0, 8.0),
        seed: Parameter::new(ParameterName::Seed, 0, 2_147_483_646, 42),
        resolution: TITAN_RESOLUTION,
        default_resolution,
    }
}

const TITAN_PROMPTS: TextToImageParameters = TextToImageParameters {
    prompt: PromptParams::new(512),
    negative_prompt: PromptParams::negative(512),
};

/// Titan Image Generator v1: a single reference image, no similarity knob.
pub const fn titan_image_v1() -> AmazonImage {
    AmazonImage {
        generation: titan_generation(ImageResolution::new(512, 512)),
        text_to_image: TITAN_PROMPTS,
        variation: ImageVariationParameters {
            images: Parameter::new(ParameterName::Images, 1, 1, 1),
            similarity: Parameter::not_supported(ParameterName::Similarity),
            prompt: PromptParams::new(512),
            negative_prompt: PromptParams::negative(512),
        },
    }
}

/// Titan Image Generator v2.
pub const fn titan_image_v2() -> AmazonImage {
    AmazonImage {
        generation: titan_generation(ImageResolution::new(1024, 1024)),
        text_to_image: TITAN_PROMPTS,
        variation: ImageVariationParameters {
            images: Parameter::new(ParameterName::Images, 1, 5, 1),
            similarity: Parameter::new(ParameterName::Similarity, 0.2, 1.0, 0.7),
            prompt: PromptParams::new(512),
            negative_prompt: PromptParams::negative(512),
        },
    }
}

/// Nova Canvas.
pub const fn nova_canvas() -> AmazonImage {
    AmazonImage {
        generation: ImageGenerationParameters {
            nr_of_images: Parameter::new(ParameterName::NrOfImages, 1, 5, 1),
            cfg_scale: Parameter::new(ParameterName::CfgScale, 1.1, 10.0, 6.5),
            seed: Parameter::new(ParameterName::Seed, 0, 858_993_459, 12),
            resolution: NOVA_CANVAS_RESOLUTION,
            default_resolution: ImageResolution::new(1024, 1024),
        },
        text_to_image: TextToImageParameters {
            prompt: PromptParams::new(1024),
            negative_prompt: PromptParams::negative(1024),
        },
        variation: ImageVariationParameters {
            images: Parameter::new(ParameterName::Images, 1, 5, 1),
            similarity: Parameter::new(ParameterName::Similarity, 0.2, 1.0, 0.6),
            prompt: PromptParams::new(1024),
            negative_prompt: PromptParams::negative(1024),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmazonImage {
    pub generation: ImageGenerationParameters,
    pub text_to_image: TextToImageParameters,
    pub variation: ImageVariationParameters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    number_of_images: Option<u32>,
    quality: ImageQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    cfg_scale: Option<f64>,
    height: u32,
    width: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextToImageBody<'a> {
    task_type: &'static str,
    text_to_image_params: TextToImageParams<'a>,
    image_generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextToImageParams<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_text: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageVariationBody<'a> {
    task_type: &'static str,
    image_variation_params: ImageVariationParams<'a>,
    image_generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageVariationParams<'a> {
    images: &'a [String],
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    negative_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    similarity_strength: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    images: Vec<String>,
    #[serde(default)]
    error: Option<String>,
}

impl AmazonImage {
    fn generation_config(&self, options: &ImageOptions) -> GenerationConfig {
        let params = &self.generation;
        let resolution = options.resolution.unwrap_or(params.default_resolution);
        GenerationConfig {
            number_of_images: params.nr_of_images.resolve(options.nr_of_images),
            quality: options.quality.unwrap_or_default(),
            cfg_scale: params.cfg_scale.resolve(options.cfg_scale),
            height: resolution.height,
            width: resolution.width,
            seed: params.seed.resolve(options.seed),
        }
    }
}

impl ImageModality for AmazonImage {
    fn image_generation_parameters(&self) -> &ImageGenerationParameters {
        &self.generation
    }

    fn image_response_body(
        &self,
        body: &[u8],
    ) -> std::result::Result<ImageGenerationOutput, DecodeError> {
        let response: ImageResponse = decode_body(Family::AmazonImage, body)?;
        if let Some(message) = response.error.filter(|message| !message.is_empty()) {
            return Err(DecodeError::ModelError {
                family: Family::AmazonImage.as_str(),
                message,
            });
        }
        if response.images.is_empty() {
            return Err(missing(Family::AmazonImage, "images"));
        }
        Ok(ImageGenerationOutput {
            images: response.images,
        })
    }
}

impl TextToImageModality for AmazonImage {
    fn text_to_image_parameters(&self) -> &TextToImageParameters {
        &self.text_to_image
    }

    fn text_to_image_request_body(&self, request: &ImageRequest) -> Result<serde_json::Value> {
        let body = TextToImageBody {
            task_type: "TEXT_IMAGE",
            text_to_image_params: TextToImageParams {
                text: &request.prompt,
                negative_text: request.negative_prompt.as_deref(),
            },
            image_generation_config: self.generation_config(&request.options),
        };
        encode_body(Family::AmazonImage, &body)
    }
}

impl ImageVariationModality for AmazonImage {
    fn image_variation_parameters(&self) -> &ImageVariationParameters {
        &self.variation
    }

    fn image_variation_request_body(
        &self,
        request: &ImageVariationRequest,
    ) -> Result<serde_json::Value> {
        let body = ImageVariationBody {
            task_type: "IMAGE_VARIATION",
            image_variation_params: ImageVariationParams {
                images: &request.images,
                text: &request.prompt,
                negative_text: request.negative_prompt.as_deref(),
                similarity_strength: self.variation.similarity.resolve(request.similarity),
            },
            image_generation_config: self.generation_config(&request.options),
        };
        encode_body(Family::AmazonImage, &body)
    }
}
