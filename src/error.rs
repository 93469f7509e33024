//! Error types for the Uni-Bedrock runtime.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RuntimeError>;

/// Opaque error surfaced by the transport collaborator.
///
/// The runtime never inspects it; it is wrapped unchanged in
/// [`RuntimeError::Transport`].
pub type TransportError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type covering configuration, validation, capability, codec,
/// and transport failures.
///
/// Variants are intentionally coarse-grained so that callers can match on error
/// *category* (caller input, model choice, wire mismatch, transport) rather
/// than on family-specific details.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Invalid or missing configuration (bad alias format, unknown model in a
    /// catalog, duplicate alias, etc.).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Neither an alias nor a registered wire model id matched.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// The chosen model does not support the requested operation or feature.
    #[error("Capability mismatch: {0}")]
    CapabilityMismatch(String),

    /// A caller-supplied value is unsupported or out of bounds.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The wire response did not match the schema the family codec expects.
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// A fully validated request could not be serialized. Always a defect.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Failure reported by the transport collaborator, passed through as-is.
    #[error("Transport error: {0}")]
    Transport(#[source] TransportError),
}

impl RuntimeError {
    /// Returns `true` for errors raised before any transport call:
    /// [`Validation`](Self::Validation) and
    /// [`CapabilityMismatch`](Self::CapabilityMismatch).
    pub fn is_pre_call(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::CapabilityMismatch(_))
    }
}

/// Rejection of a caller-supplied value by the parameter validator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The model does not accept this parameter at all.
    #[error("Parameter '{name}' is not supported by this model")]
    NotSupported { name: String },

    /// The value is below the inclusive lower bound.
    #[error("Parameter '{name}' is below minimum: {value} < {min}")]
    BelowMinimum {
        name: String,
        value: String,
        min: String,
    },

    /// The value is above the inclusive upper bound.
    #[error("Parameter '{name}' is above maximum: {value} > {max}")]
    AboveMaximum {
        name: String,
        value: String,
        max: String,
    },

    /// The prompt is empty once whitespace, tabs, and newlines are trimmed.
    #[error("Prompt '{name}' must not be empty")]
    EmptyPrompt { name: String },

    /// The prompt has more characters than the model accepts.
    #[error("Prompt '{name}' is too long: {length} characters > {max}")]
    PromptTooLong {
        name: String,
        length: usize,
        max: usize,
    },

    /// The requested image resolution violates the model's constraints.
    #[error("Invalid resolution {width}x{height}: {reason}")]
    InvalidResolution {
        width: u32,
        height: u32,
        reason: String,
    },

    /// The conversation turn is structurally invalid.
    #[error("Invalid prompt: {0}")]
    InvalidPrompt(String),

    /// A reference image is not valid base64.
    #[error("Reference image {index} is not valid base64: {message}")]
    InvalidImage { index: usize, message: String },

    /// The effective reasoning budget leaves no room for the answer.
    #[error("Reasoning budget {budget} must be below maxTokens {max_tokens}")]
    ReasoningBudgetTooLarge { budget: u32, max_tokens: u32 },
}

/// A wire payload that could not be mapped back to a canonical value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// The bytes are not a response of the expected family schema.
    #[error("Malformed {family} response: {message}")]
    Malformed {
        family: &'static str,
        message: String,
    },

    /// The response parsed but the semantically required field is absent.
    #[error("{family} response is missing required field '{field}'")]
    MissingField {
        family: &'static str,
        field: &'static str,
    },

    /// A wire tag this version does not understand.
    #[error("Not implemented: unsupported content tag '{tag}'")]
    NotImplemented { tag: String },

    /// A wire role outside `{user, assistant}`.
    #[error("Unknown role '{0}'")]
    UnknownRole(String),

    /// A wire enum field held a value this version does not recognize.
    #[error("Unexpected value '{value}' for field '{field}'")]
    UnexpectedValue { field: &'static str, value: String },

    /// A payload that must be base64 could not be decoded.
    #[error("Invalid base64 payload in '{field}': {message}")]
    InvalidBase64 {
        field: &'static str,
        message: String,
    },

    /// The model answered with a well-formed error body.
    #[error("{family} reported an error: {message}")]
    ModelError {
        family: &'static str,
        message: String,
    },
}
