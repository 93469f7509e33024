//! Shared plumbing for the family codecs: body encoding and decoding with
//! family-attributed errors, and token usage assembly.

use crate::api::TokenUsage;
use crate::error::{DecodeError, Result, RuntimeError};
use crate::family::Family;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Serialize a request body. Failure here means a codec produced an
/// unserializable payload from validated input, which is a defect.
pub(crate) fn encode_body<T: Serialize>(family: Family, body: &T) -> Result<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| {
        RuntimeError::Encoding(format!("Failed to encode {} request body: {}", family, e))
    })
}

/// Parse a response body into the family's schema.
pub(crate) fn decode_body<T: DeserializeOwned>(
    family: Family,
    body: &[u8],
) -> std::result::Result<T, DecodeError> {
    serde_json::from_slice(body).map_err(|e| DecodeError::Malformed {
        family: family.as_str(),
        message: e.to_string(),
    })
}

pub(crate) fn missing(family: Family, field: &'static str) -> DecodeError {
    DecodeError::MissingField {
        family: family.as_str(),
        field,
    }
}

/// Usage is only reported when both counts are present.
pub(crate) fn usage(prompt: Option<u32>, completion: Option<u32>) -> Option<TokenUsage> {
    match (prompt, completion) {
        (Some(prompt), Some(completion)) => {
            Some(TokenUsage::new(prompt as usize, completion as usize))
        }
        _ => None,
    }
}
