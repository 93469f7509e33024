//! Parameter bounds validation, directly and through the runtime.

use uni_bedrock::api::{ImageOptions, ImageRequest, ImageResolution, ImageVariationRequest, TextRequest};
use uni_bedrock::error::{RuntimeError, ValidationError};
use uni_bedrock::family::{amazon_image, anthropic, llama, nova, titan};
use uni_bedrock::parameters::{Parameter, ParameterName, PromptParams};
use uni_bedrock::validation::validate_prompt;
mod common;
use common::mock_support::{MockTransport, runtime};

const MAX_TOKENS: Parameter<u32> = Parameter::new(ParameterName::MaxTokens, 1, 5000, 512);

fn expect_validation(err: RuntimeError) -> ValidationError {
    match err {
        RuntimeError::Validation(e) => e,
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn test_max_tokens_bounds_scenario() {
    assert!(matches!(
        MAX_TOKENS.validate(Some(0)),
        Err(ValidationError::BelowMinimum { .. })
    ));
    assert!(MAX_TOKENS.validate(Some(5000)).is_ok());
}

#[test]
fn test_bounds_edges_for_floats() {
    let temperature = Parameter::new(ParameterName::Temperature, 0.0, 1.0, 0.5);
    assert!(temperature.validate(Some(0.0)).is_ok());
    assert!(temperature.validate(Some(1.0)).is_ok());
    assert!(temperature.validate(Some(-0.0001)).is_err());
    assert!(temperature.validate(Some(1.0001)).is_err());
    assert!(temperature.validate(Some(f64::NAN)).is_err());
}

#[test]
fn test_unsupported_fails_for_every_value() {
    let top_k: Parameter<u32> = Parameter::not_supported(ParameterName::TopK);
    for value in [None, Some(0), Some(1), Some(u32::MAX)] {
        assert_eq!(
            top_k.validate(value),
            Err(ValidationError::NotSupported {
                name: "topK".to_string()
            })
        );
    }
}

#[test]
fn test_prompt_size_boundaries() {
    let params = PromptParams::new(10);
    for blank in ["", " ", "\n\t "] {
        assert!(matches!(
            validate_prompt(&params, blank),
            Err(ValidationError::EmptyPrompt { .. })
        ));
        assert!(validate_prompt(&PromptParams::unbounded(), blank).is_err());
    }
    assert!(validate_prompt(&params, &"a".repeat(10)).is_ok());
    assert_eq!(
        validate_prompt(&params, &"a".repeat(11)),
        Err(ValidationError::PromptTooLong {
            name: "prompt".to_string(),
            length: 11,
            max: 10
        })
    );
}

#[test]
fn test_validation_error_display() {
    let err = MAX_TOKENS.validate(Some(0)).unwrap_err();
    assert_eq!(err.to_string(), "Parameter 'maxTokens' is below minimum: 0 < 1");
    let err = MAX_TOKENS.validate(Some(6000)).unwrap_err();
    assert_eq!(err.to_string(), "Parameter 'maxTokens' is above maximum: 6000 > 5000");
}

#[tokio::test]
async fn test_out_of_range_temperature_is_rejected_pre_call() {
    let transport = MockTransport::new();
    let rt = runtime(&transport);

    let err = rt
        .complete_text(
            anthropic::CLAUDE_3_HAIKU,
            &TextRequest::new("Hi").with_temperature(1.5),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        expect_validation(err),
        ValidationError::AboveMaximum { ref name, .. } if name == "temperature"
    ));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_unsupported_top_k_is_rejected_only_when_supplied() {
    let transport = MockTransport::new().then_json(serde_json::json!({
        "inputTextTokenCount": 3,
        "results": [{"tokenCount": 2, "outputText": "Hello", "completionReason": "FINISH"}]
    }));
    let rt = runtime(&transport);

    let err = rt
        .complete_text(titan::TITAN_TEXT_LITE, &TextRequest::new("Hi").with_top_k(5))
        .await
        .unwrap_err();
    assert!(matches!(
        expect_validation(err),
        ValidationError::NotSupported { .. }
    ));
    assert_eq!(transport.invoke_count(), 0);

    let completion = rt
        .complete_text(titan::TITAN_TEXT_LITE, &TextRequest::new("Hi"))
        .await
        .unwrap();
    assert_eq!(completion.text, "Hello");
    assert_eq!(transport.invoke_count(), 1);
}

#[tokio::test]
async fn test_stop_sequences_rejected_for_llama() {
    let transport = MockTransport::new();
    let rt = runtime(&transport);
    let err = rt
        .complete_text(
            llama::LLAMA_3_8B,
            &TextRequest::new("Hi").with_stop_sequences(vec!["END".to_string()]),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        expect_validation(err),
        ValidationError::NotSupported { ref name } if name == "stopSequences"
    ));
}

#[tokio::test]
async fn test_too_many_stop_sequences_for_nova() {
    let transport = MockTransport::new();
    let rt = runtime(&transport);
    let stops: Vec<String> = (0..5).map(|i| format!("s{i}")).collect();
    let err = rt
        .complete_text(nova::NOVA_MICRO, &TextRequest::new("Hi").with_stop_sequences(stops))
        .await
        .unwrap_err();
    assert!(matches!(
        expect_validation(err),
        ValidationError::AboveMaximum { .. }
    ));
}

#[tokio::test]
async fn test_image_resolution_constraints() {
    let transport = MockTransport::new();
    let rt = runtime(&transport);

    let mut request = ImageRequest::new("A mountain lake");
    request.options = ImageOptions {
        resolution: Some(ImageResolution::new(1000, 1000)),
        ..Default::default()
    };
    let err = rt
        .generate_image(amazon_image::NOVA_CANVAS, &request)
        .await
        .unwrap_err();
    assert!(matches!(
        expect_validation(err),
        ValidationError::InvalidResolution {
            width: 1000,
            height: 1000,
            ..
        }
    ));

    request.options.resolution = Some(ImageResolution::new(2048, 320));
    let err = rt
        .generate_image(amazon_image::NOVA_CANVAS, &request)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("aspect ratio"));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_image_count_bounds() {
    let transport = MockTransport::new();
    let rt = runtime(&transport);

    let mut request = ImageRequest::new("A mountain lake");
    request.options.nr_of_images = Some(6);
    let err = rt
        .generate_image(amazon_image::TITAN_IMAGE_V2, &request)
        .await
        .unwrap_err();
    assert!(matches!(
        expect_validation(err),
        ValidationError::AboveMaximum { ref name, .. } if name == "nrOfImages"
    ));
}

#[tokio::test]
async fn test_variation_reference_image_count() {
    let transport = MockTransport::new();
    let rt = runtime(&transport);

    let two = vec!["aW1n".to_string(), "aW1n".to_string()];
    let err = rt
        .generate_image_variation(
            amazon_image::TITAN_IMAGE_V1,
            &ImageVariationRequest::new(two, "brighter"),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        expect_validation(err),
        ValidationError::AboveMaximum { ref name, .. } if name == "images"
    ));

    let err = rt
        .generate_image_variation(
            amazon_image::TITAN_IMAGE_V2,
            &ImageVariationRequest::new(Vec::new(), "brighter"),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        expect_validation(err),
        ValidationError::BelowMinimum { .. }
    ));

    let mut request = ImageVariationRequest::new(vec!["aW1n".to_string()], "brighter");
    request.similarity = Some(0.5);
    let err = rt
        .generate_image_variation(amazon_image::TITAN_IMAGE_V1, &request)
        .await
        .unwrap_err();
    assert!(matches!(
        expect_validation(err),
        ValidationError::NotSupported { ref name } if name == "similarity"
    ));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_variation_reference_images_must_be_base64() {
    let transport = MockTransport::new();
    let rt = runtime(&transport);

    let images = vec!["aW1n".to_string(), "not base64!".to_string()];
    let err = rt
        .generate_image_variation(
            amazon_image::NOVA_CANVAS,
            &ImageVariationRequest::new(images, "brighter"),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        expect_validation(err),
        ValidationError::InvalidImage { index: 1, .. }
    ));
    assert_eq!(transport.call_count(), 0);
}
