//! The static model catalog.
//!
//! One entry per wire model id, each holding the family codec that carries
//! the model's bounds. The table is compiled in; [`lookup`] is a hash-map
//! read over an index built on first use.

use crate::error::{Result, RuntimeError};
use crate::family::{
    Family, FamilyCodec, amazon_image, anthropic, deepseek, llama, mistral, nova, titan,
};
use crate::traits::{
    ConverseModality, ImageModality, ImageVariationModality, TextModality, TextToImageModality,
};
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Operations a model may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    Text,
    Image,
    TextToImage,
    ImageVariation,
    Converse,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Self::Text,
        Self::Image,
        Self::TextToImage,
        Self::ImageVariation,
        Self::Converse,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::TextToImage => "text-to-image",
            Self::ImageVariation => "image-variation",
            Self::Converse => "converse",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text generation",
            Self::Image => "image generation",
            Self::TextToImage => "text-to-image generation",
            Self::ImageVariation => "image variation",
            Self::Converse => "converse",
        })
    }
}

impl std::str::FromStr for Capability {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|capability| capability.as_str() == s)
            .ok_or_else(|| RuntimeError::Config(format!("Unknown capability '{}'", s)))
    }
}

/// A registered model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Model {
    /// Opaque wire id, unique within the catalog.
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    pub family: Family,
    pub codec: FamilyCodec,
}

impl Model {
    pub const fn new(
        id: &'static str,
        name: &'static str,
        family: Family,
        codec: FamilyCodec,
    ) -> Self {
        Self {
            id,
            name,
            family,
            codec,
        }
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        match capability {
            Capability::Text => self.codec.text().is_some(),
            Capability::Image => self.codec.image().is_some(),
            Capability::TextToImage => self.codec.text_to_image().is_some(),
            Capability::ImageVariation => self.codec.image_variation().is_some(),
            Capability::Converse => self.codec.converse().is_some(),
        }
    }

    /// Every capability this model's codec satisfies.
    pub fn capabilities(&self) -> BTreeSet<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.has_capability(*capability))
            .collect()
    }

    fn mismatch(&self, capability: Capability) -> RuntimeError {
        RuntimeError::CapabilityMismatch(format!(
            "Model '{}' does not support {}",
            self.id, capability
        ))
    }

    pub fn text(&self) -> Option<&dyn TextModality> {
        self.codec.text()
    }

    pub fn image(&self) -> Option<&dyn ImageModality> {
        self.codec.image()
    }

    pub fn text_to_image(&self) -> Option<&dyn TextToImageModality> {
        self.codec.text_to_image()
    }

    pub fn image_variation(&self) -> Option<&dyn ImageVariationModality> {
        self.codec.image_variation()
    }

    pub fn converse(&self) -> Option<&dyn ConverseModality> {
        self.codec.converse()
    }

    pub fn require_text(&self) -> Result<&dyn TextModality> {
        self.text().ok_or_else(|| self.mismatch(Capability::Text))
    }

    pub fn require_text_to_image(&self) -> Result<&dyn TextToImageModality> {
        self.text_to_image()
            .ok_or_else(|| self.mismatch(Capability::TextToImage))
    }

    pub fn require_image_variation(&self) -> Result<&dyn ImageVariationModality> {
        self.image_variation()
            .ok_or_else(|| self.mismatch(Capability::ImageVariation))
    }

    pub fn require_converse(&self) -> Result<&dyn ConverseModality> {
        self.converse()
            .ok_or_else(|| self.mismatch(Capability::Converse))
    }
}

static CATALOG: &[Model] = &[
    // Anthropic Messages
    Model::new(
        anthropic::CLAUDE_3_HAIKU,
        "Claude 3 Haiku",
        Family::Anthropic,
        FamilyCodec::AnthropicMessages(anthropic::claude_messages(4096, 4096)),
    ),
    Model::new(
        anthropic::CLAUDE_3_5_HAIKU,
        "Claude 3.5 Haiku",
        Family::Anthropic,
        FamilyCodec::AnthropicMessages(anthropic::claude_messages(8192, 4096)),
    ),
    Model::new(
        anthropic::CLAUDE_3_OPUS,
        "Claude 3 Opus",
        Family::Anthropic,
        FamilyCodec::AnthropicMessages(anthropic::claude_messages(4096, 4096)),
    ),
    Model::new(
        anthropic::CLAUDE_3_5_SONNET,
        "Claude 3.5 Sonnet",
        Family::Anthropic,
        FamilyCodec::AnthropicMessages(anthropic::claude_messages(8192, 4096)),
    ),
    Model::new(
        anthropic::CLAUDE_3_5_SONNET_V2,
        "Claude 3.5 Sonnet v2",
        Family::Anthropic,
        FamilyCodec::AnthropicMessages(anthropic::claude_messages(8192, 4096)),
    ),
    Model::new(
        anthropic::CLAUDE_3_7_SONNET,
        "Claude 3.7 Sonnet",
        Family::Anthropic,
        FamilyCodec::AnthropicMessages(anthropic::claude_reasoning(64_000, 63_999)),
    ),
    Model::new(
        anthropic::CLAUDE_SONNET_4,
        "Claude Sonnet 4",
        Family::Anthropic,
        FamilyCodec::AnthropicMessages(anthropic::claude_reasoning(64_000, 63_999)),
    ),
    Model::new(
        anthropic::CLAUDE_OPUS_4,
        "Claude Opus 4",
        Family::Anthropic,
        FamilyCodec::AnthropicMessages(anthropic::claude_reasoning(32_000, 31_999)),
    ),
    // Anthropic legacy completions
    Model::new(
        anthropic::CLAUDE_INSTANT,
        "Claude Instant",
        Family::Anthropic,
        FamilyCodec::AnthropicCompletions(anthropic::claude_completions(100_000)),
    ),
    Model::new(
        anthropic::CLAUDE_V2,
        "Claude 2",
        Family::Anthropic,
        FamilyCodec::AnthropicCompletions(anthropic::claude_completions(100_000)),
    ),
    Model::new(
        anthropic::CLAUDE_V2_1,
        "Claude 2.1",
        Family::Anthropic,
        FamilyCodec::AnthropicCompletions(anthropic::claude_completions(200_000)),
    ),
    // Titan
    Model::new(
        titan::TITAN_TEXT_PREMIER,
        "Titan Text Premier",
        Family::Titan,
        FamilyCodec::Titan(titan::titan_text(3072)),
    ),
    Model::new(
        titan::TITAN_TEXT_EXPRESS,
        "Titan Text Express",
        Family::Titan,
        FamilyCodec::Titan(titan::titan_text(8192)),
    ),
    Model::new(
        titan::TITAN_TEXT_LITE,
        "Titan Text Lite",
        Family::Titan,
        FamilyCodec::Titan(titan::titan_text(4096)),
    ),
    // Nova
    Model::new(
        nova::NOVA_MICRO,
        "Nova Micro",
        Family::Nova,
        FamilyCodec::Nova(nova::nova_text(false)),
    ),
    Model::new(
        nova::NOVA_LITE,
        "Nova Lite",
        Family::Nova,
        FamilyCodec::Nova(nova::nova_text(true)),
    ),
    Model::new(
        nova::NOVA_PRO,
        "Nova Pro",
        Family::Nova,
        FamilyCodec::Nova(nova::nova_text(true)),
    ),
    Model::new(
        nova::NOVA_PREMIER,
        "Nova Premier",
        Family::Nova,
        FamilyCodec::Converse(nova::nova_premier()),
    ),
    // DeepSeek
    Model::new(
        deepseek::DEEPSEEK_R1,
        "DeepSeek R1",
        Family::DeepSeek,
        FamilyCodec::DeepSeek(deepseek::deepseek_r1()),
    ),
    // Llama
    Model::new(
        llama::LLAMA_3_8B,
        "Llama 3 8B Instruct",
        Family::Llama,
        FamilyCodec::Llama(llama::llama(32_000, false)),
    ),
    Model::new(
        llama::LLAMA_3_70B,
        "Llama 3 70B Instruct",
        Family::Llama,
        FamilyCodec::Llama(llama::llama(32_000, false)),
    ),
    Model::new(
        llama::LLAMA_3_1_8B,
        "Llama 3.1 8B Instruct",
        Family::Llama,
        FamilyCodec::Llama(llama::llama(128_000, true)),
    ),
    Model::new(
        llama::LLAMA_3_1_70B,
        "Llama 3.1 70B Instruct",
        Family::Llama,
        FamilyCodec::Llama(llama::llama(128_000, true)),
    ),
    Model::new(
        llama::LLAMA_3_2_1B,
        "Llama 3.2 1B Instruct",
        Family::Llama,
        FamilyCodec::Llama(llama::llama(128_000, true)),
    ),
    Model::new(
        llama::LLAMA_3_2_3B,
        "Llama 3.2 3B Instruct",
        Family::Llama,
        FamilyCodec::Llama(llama::llama(128_000, true)),
    ),
    Model::new(
        llama::LLAMA_3_3_70B,
        "Llama 3.3 70B Instruct",
        Family::Llama,
        FamilyCodec::Llama(llama::llama(128_000, true)),
    ),
    // Mistral
    Model::new(
        mistral::MISTRAL_7B_INSTRUCT,
        "Mistral 7B Instruct",
        Family::Mistral,
        FamilyCodec::Mistral(mistral::mistral_instruct(32_000)),
    ),
    Model::new(
        mistral::MIXTRAL_8X7B_INSTRUCT,
        "Mixtral 8x7B Instruct",
        Family::Mistral,
        FamilyCodec::Mistral(mistral::mistral_instruct(32_000)),
    ),
    Model::new(
        mistral::MISTRAL_SMALL,
        "Mistral Small",
        Family::Mistral,
        FamilyCodec::Mistral(mistral::mistral_small()),
    ),
    Model::new(
        mistral::MISTRAL_LARGE,
        "Mistral Large",
        Family::Mistral,
        FamilyCodec::Mistral(mistral::mistral_large()),
    ),
    Model::new(
        mistral::MISTRAL_LARGE_2407,
        "Mistral Large 2",
        Family::Mistral,
        FamilyCodec::Converse(mistral::mistral_large_2407()),
    ),
    // Amazon image
    Model::new(
        amazon_image::TITAN_IMAGE_V1,
        "Titan Image Generator",
        Family::AmazonImage,
        FamilyCodec::AmazonImage(amazon_image::titan_image_v1()),
    ),
    Model::new(
        amazon_image::TITAN_IMAGE_V2,
        "Titan Image Generator v2",
        Family::AmazonImage,
        FamilyCodec::AmazonImage(amazon_image::titan_image_v2()),
    ),
    Model::new(
        amazon_image::NOVA_CANVAS,
        "Nova Canvas",
        Family::AmazonImage,
        FamilyCodec::AmazonImage(amazon_image::nova_canvas()),
    ),
];

static INDEX: Lazy<HashMap<&'static str, &'static Model>> =
    Lazy::new(|| CATALOG.iter().map(|model| (model.id, model)).collect());

/// Find a model by wire id. Unknown ids are not an error here.
pub fn lookup(id: &str) -> Option<&'static Model> {
    INDEX.get(id).copied()
}

/// Every registered model, in catalog order.
pub fn models() -> &'static [Model] {
    CATALOG
}

/// Models supporting `capability`, in catalog order.
pub fn models_with(capability: Capability) -> impl Iterator<Item = &'static Model> {
    CATALOG
        .iter()
        .filter(move |model| model.has_capability(capability))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = models().iter().map(|m| m.id).collect();
        assert_eq!(ids.len(), models().len());
        assert_eq!(INDEX.len(), models().len());
    }

    #[test]
    fn lookup_finds_registered_and_ignores_unknown() {
        let haiku = lookup(anthropic::CLAUDE_3_HAIKU).unwrap();
        assert_eq!(haiku.name, "Claude 3 Haiku");
        assert_eq!(haiku.family, Family::Anthropic);
        assert!(lookup("vendor.unknown-v1").is_none());
    }

    #[test]
    fn capabilities_follow_codec_variant() {
        let text = lookup(nova::NOVA_MICRO).unwrap();
        assert_eq!(
            text.capabilities(),
            BTreeSet::from([Capability::Text, Capability::Converse])
        );

        let image = lookup(amazon_image::NOVA_CANVAS).unwrap();
        assert_eq!(
            image.capabilities(),
            BTreeSet::from([
                Capability::Image,
                Capability::TextToImage,
                Capability::ImageVariation
            ])
        );

        let converse_only = lookup(mistral::MISTRAL_LARGE_2407).unwrap();
        assert_eq!(
            converse_only.capabilities(),
            BTreeSet::from([Capability::Converse])
        );
    }

    #[test]
    fn capability_set_matches_getters_for_every_model() {
        for model in models() {
            let caps = model.capabilities();
            assert_eq!(caps.contains(&Capability::Text), model.text().is_some());
            assert_eq!(caps.contains(&Capability::Image), model.image().is_some());
            assert_eq!(
                caps.contains(&Capability::TextToImage),
                model.text_to_image().is_some()
            );
            assert_eq!(
                caps.contains(&Capability::ImageVariation),
                model.image_variation().is_some()
            );
            assert_eq!(
                caps.contains(&Capability::Converse),
                model.converse().is_some()
            );
        }
    }

    #[test]
    fn require_reports_mismatch() {
        let canvas = lookup(amazon_image::NOVA_CANVAS).unwrap();
        let err = canvas.require_text().err().unwrap();
        assert!(matches!(err, RuntimeError::CapabilityMismatch(_)));
        assert_eq!(
            err.to_string(),
            "Capability mismatch: Model 'amazon.nova-canvas-v1:0' does not support text generation"
        );
    }

    #[test]
    fn capability_parses_from_cli_name() {
        assert_eq!(
            "image-variation".parse::<Capability>().unwrap(),
            Capability::ImageVariation
        );
        assert!("embedding".parse::<Capability>().is_err());
    }

    #[test]
    fn every_default_lies_within_bounds() {
        for model in models() {
            if let Some(text) = model.text() {
                let p = text.text_parameters();
                assert!(p.temperature.validate(p.temperature.default_value).is_ok(), "{}", model.id);
                assert!(p.max_tokens.validate(p.max_tokens.default_value).is_ok(), "{}", model.id);
                assert!(p.top_p.validate(p.top_p.default_value).is_ok(), "{}", model.id);
            }
            if let Some(converse) = model.converse() {
                let p = converse.converse_parameters();
                assert!(p.max_tokens.validate(p.max_tokens.default_value).is_ok(), "{}", model.id);
                if p.max_reasoning_tokens.is_supported {
                    assert!(
                        p.max_reasoning_tokens
                            .validate(p.max_reasoning_tokens.default_value)
                            .is_ok(),
                        "{}",
                        model.id
                    );
                    assert!(
                        p.max_reasoning_tokens.default_value < p.max_tokens.default_value,
                        "{}",
                        model.id
                    );
                }
            }
            if let Some(image) = model.image() {
                let p = image.image_generation_parameters();
                assert!(p.cfg_scale.validate(p.cfg_scale.default_value).is_ok(), "{}", model.id);
                assert!(p.seed.validate(p.seed.default_value).is_ok(), "{}", model.id);
                assert!(
                    crate::validation::validate_resolution(&p.resolution, &p.default_resolution)
                        .is_ok(),
                    "{}",
                    model.id
                );
            }
        }
    }
}
