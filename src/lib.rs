//! Unified Rust runtime for invoking foundation models served through Amazon Bedrock.
//!
//! Uni-Bedrock puts one vendor-neutral API in front of the heterogeneous wire
//! protocols of the Anthropic, Titan, Nova, DeepSeek, Llama, Mistral and
//! Amazon image model families. Caller values are checked against each
//! model's declared parameter bounds before any request leaves the process,
//! and responses are decoded strictly: a body that does not match the
//! family's schema is an error, never an empty result.
//!
//! # Key concepts
//!
//! - **[`BedrockRuntime`](runtime::BedrockRuntime)**: the stateless orchestrator
//!   running `complete_text`, `generate_image`, `generate_image_variation` and
//!   `converse`.
//! - **[`registry`]**: the compiled-in model catalog. Each
//!   [`Model`](registry::Model) holds one [`FamilyCodec`](family::FamilyCodec)
//!   whose variant decides which modalities the model supports.
//! - **[`BedrockTransport`](traits::BedrockTransport)**: the network
//!   collaborator. The crate ships no transport; the host supplies one.
//! - **[`ModelAlias`](api::ModelAlias)**: optional human-readable names
//!   (e.g. `"chat/default"`) mapped to registered wire ids.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use uni_bedrock::api::{ConverseRequest, ModelAlias, TextRequest};
//! use uni_bedrock::runtime::BedrockRuntime;
//! # use uni_bedrock::traits::BedrockTransport;
//!
//! # async fn example(transport: impl BedrockTransport + 'static)
//! #     -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = BedrockRuntime::builder()
//!     .transport(transport)
//!     .catalog(vec![ModelAlias::new(
//!         "chat/default",
//!         "anthropic.claude-3-haiku-20240307-v1:0",
//!     )])
//!     .build()?;
//!
//! let completion = runtime
//!     .complete_text("chat/default", &TextRequest::new("Hello!").with_max_tokens(200))
//!     .await?;
//! println!("{}", completion.text);
//!
//! let reply = runtime
//!     .converse("chat/default", &ConverseRequest::prompt(Vec::new(), "And in French?"))
//!     .await?;
//! assert_eq!(reply.history.len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod content;
pub mod converse;
pub mod error;
pub mod family;
pub mod parameters;
pub mod registry;
pub mod runtime;
pub mod traits;
pub mod validation;

#[cfg(test)]
mod mock;

pub use error::{Result, RuntimeError};
pub use runtime::BedrockRuntime;
