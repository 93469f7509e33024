//! The stateless orchestrator for the four canonical operations.
//!
//! Every call runs the same pipeline: resolve the model, check its
//! capability, validate caller values, build the family's wire request, make
//! exactly one transport call, and decode the response. Nothing is kept
//! between calls and nothing is retried.

use crate::api::{
    ConverseReply, ConverseRequest, ImageGenerationOutput, ImageRequest, ImageVariationRequest,
    ModelAlias, TextCompletion, TextRequest, validate_catalog,
};
use crate::content::{Content, Message, Role};
use crate::converse::{build_converse_input, decode_converse_output};
use crate::error::{DecodeError, Result, RuntimeError, ValidationError};
use crate::registry::{self, Model};
use crate::traits::{BedrockTransport, ConverseFeature, ConverseModality, InvokeModelRequest};
use crate::validation::{
    validate_converse_request, validate_image_request, validate_image_variation_request,
    validate_text_request,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Entry point for invoking registered models through a transport.
///
/// Obtain an instance via [`BedrockRuntime::builder()`]. Every operation
/// accepts either a catalog alias or a registered wire model id. The runtime
/// is immutable once built and can be shared freely across tasks.
pub struct BedrockRuntime {
    transport: Arc<dyn BedrockTransport>,
    aliases: HashMap<String, &'static Model>,
}

impl BedrockRuntime {
    /// Create a new [`BedrockRuntimeBuilder`].
    pub fn builder() -> BedrockRuntimeBuilder {
        BedrockRuntimeBuilder::default()
    }

    /// Check if an alias exists in the catalog.
    pub fn contains_alias(&self, alias: &str) -> bool {
        self.aliases.contains_key(alias)
    }

    /// Resolve an alias, falling back to a wire model id.
    pub fn resolve(&self, name: &str) -> Result<&'static Model> {
        self.aliases
            .get(name)
            .copied()
            .or_else(|| registry::lookup(name))
            .ok_or_else(|| {
                RuntimeError::ModelNotFound(format!(
                    "'{}' is neither an alias nor a registered model id",
                    name
                ))
            })
    }

    /// Single-turn text completion.
    #[tracing::instrument(skip(self, request), fields(operation = "complete_text"))]
    pub async fn complete_text(&self, model: &str, request: &TextRequest) -> Result<TextCompletion> {
        let model = self.resolve(model)?;
        let start = Instant::now();
        let result = self.complete_text_inner(model, request).await;
        record_call(model, "complete_text", start, &result);
        result
    }

    async fn complete_text_inner(
        &self,
        model: &'static Model,
        request: &TextRequest,
    ) -> Result<TextCompletion> {
        let codec = model.require_text()?;
        validate_text_request(codec.text_parameters(), request)?;
        let body = codec.text_request_body(request)?;
        let response = self.invoke(model, &body).await?;
        Ok(codec.text_response_body(&response)?)
    }

    /// Generate images from a text prompt.
    #[tracing::instrument(skip(self, request), fields(operation = "generate_image"))]
    pub async fn generate_image(
        &self,
        model: &str,
        request: &ImageRequest,
    ) -> Result<ImageGenerationOutput> {
        let model = self.resolve(model)?;
        let start = Instant::now();
        let result = self.generate_image_inner(model, request).await;
        record_call(model, "generate_image", start, &result);
        result
    }

    async fn generate_image_inner(
        &self,
        model: &'static Model,
        request: &ImageRequest,
    ) -> Result<ImageGenerationOutput> {
        let codec = model.require_text_to_image()?;
        validate_image_request(
            codec.image_generation_parameters(),
            codec.text_to_image_parameters(),
            request,
        )?;
        let body = codec.text_to_image_request_body(request)?;
        let response = self.invoke(model, &body).await?;
        Ok(codec.image_response_body(&response)?)
    }

    /// Generate variations of one or more reference images.
    #[tracing::instrument(skip(self, request), fields(operation = "generate_image_variation"))]
    pub async fn generate_image_variation(
        &self,
        model: &str,
        request: &ImageVariationRequest,
    ) -> Result<ImageGenerationOutput> {
        let model = self.resolve(model)?;
        let start = Instant::now();
        let result = self.generate_image_variation_inner(model, request).await;
        record_call(model, "generate_image_variation", start, &result);
        result
    }

    async fn generate_image_variation_inner(
        &self,
        model: &'static Model,
        request: &ImageVariationRequest,
    ) -> Result<ImageGenerationOutput> {
        let codec = model.require_image_variation()?;
        validate_image_variation_request(
            codec.image_generation_parameters(),
            codec.image_variation_parameters(),
            request,
        )?;
        let body = codec.image_variation_request_body(request)?;
        let response = self.invoke(model, &body).await?;
        Ok(codec.image_response_body(&response)?)
    }

    /// One conversation turn.
    ///
    /// A copy of the request's history is extended with the new user turn and
    /// the assistant's reply and handed back in [`ConverseReply::history`]. The
    /// caller feeds that history into the next call. The request itself is
    /// left untouched, so a failed turn can be retried as is.
    #[tracing::instrument(skip(self, request), fields(operation = "converse"))]
    pub async fn converse(&self, model: &str, request: &ConverseRequest) -> Result<ConverseReply> {
        let model = self.resolve(model)?;
        let start = Instant::now();
        let result = self.converse_inner(model, request).await;
        record_call(model, "converse", start, &result);
        result
    }

    async fn converse_inner(
        &self,
        model: &'static Model,
        request: &ConverseRequest,
    ) -> Result<ConverseReply> {
        let converse = model.require_converse()?;
        check_converse_features(model, converse, request)?;
        validate_converse_request(converse.converse_parameters(), request)?;
        let user = user_turn(request)?;

        let mut history = Vec::with_capacity(request.history.len() + 2);
        history.extend_from_slice(&request.history);
        history.push(user);
        let input = build_converse_input(model.id, converse, &history, request);

        let output = self
            .transport
            .converse(input)
            .await
            .map_err(RuntimeError::Transport)?;
        let turn = decode_converse_output(output)?;
        if turn.message.role != Role::Assistant {
            return Err(DecodeError::UnexpectedValue {
                field: "output.message.role",
                value: turn.message.role.to_string(),
            }
            .into());
        }

        let text = turn.message.text();
        let tool_use = turn.message.last_tool_use().cloned();
        history.push(turn.message);
        Ok(ConverseReply {
            text,
            tool_use,
            stop_reason: turn.stop_reason,
            usage: turn.usage,
            history,
        })
    }

    async fn invoke(&self, model: &Model, body: &serde_json::Value) -> Result<Vec<u8>> {
        let request = InvokeModelRequest::json(model.id, body)?;
        self.transport
            .invoke_model(request)
            .await
            .map_err(RuntimeError::Transport)
    }
}

/// Every feature a converse request relies on must be declared by the model.
fn check_converse_features(
    model: &Model,
    converse: &dyn ConverseModality,
    request: &ConverseRequest,
) -> Result<()> {
    let needed = [
        (request.prompt.is_some(), ConverseFeature::TextGeneration),
        (!request.images.is_empty(), ConverseFeature::Vision),
        (!request.documents.is_empty(), ConverseFeature::Document),
        (
            !request.tools.is_empty() || request.tool_result.is_some(),
            ConverseFeature::ToolUse,
        ),
        (
            !request.system_prompts.is_empty(),
            ConverseFeature::SystemPrompts,
        ),
        (request.enable_reasoning, ConverseFeature::Reasoning),
    ];
    for (used, feature) in needed {
        if used && !converse.supports(feature) {
            return Err(RuntimeError::CapabilityMismatch(format!(
                "Model '{}' does not support {} in converse",
                model.id, feature
            )));
        }
    }
    Ok(())
}

/// Build the user turn for this call.
///
/// A tool result may only follow an assistant turn whose last item is a
/// tool use.
fn user_turn(request: &ConverseRequest) -> std::result::Result<Message, ValidationError> {
    match (&request.prompt, &request.tool_result) {
        (Some(prompt), None) => {
            let mut content: Vec<Content> = request
                .images
                .iter()
                .cloned()
                .map(Content::Image)
                .chain(request.documents.iter().cloned().map(Content::Document))
                .collect();
            content.push(Content::Text(prompt.clone()));
            Ok(Message::user(content))
        }
        (None, Some(result)) => {
            let awaiting = request
                .history
                .last()
                .and_then(Message::last_tool_use)
                .is_some();
            if !awaiting {
                return Err(ValidationError::InvalidPrompt(
                    "a tool result must follow a turn that ended with a tool use".to_string(),
                ));
            }
            if !request.images.is_empty() || !request.documents.is_empty() {
                return Err(ValidationError::InvalidPrompt(
                    "images and documents can only accompany a prompt".to_string(),
                ));
            }
            Ok(Message::user(vec![Content::ToolResult(result.clone())]))
        }
        (Some(_), Some(_)) => Err(ValidationError::InvalidPrompt(
            "a turn carries either a prompt or a tool result, not both".to_string(),
        )),
        (None, None) => Err(ValidationError::InvalidPrompt(
            "a turn needs a prompt or a tool result".to_string(),
        )),
    }
}

/// Emit the per-call metrics and the outcome log line.
fn record_call<T>(model: &Model, operation: &'static str, start: Instant, result: &Result<T>) {
    let status = match result {
        Ok(_) => "success",
        Err(e) if e.is_pre_call() => "rejected",
        Err(_) => "failure",
    };

    metrics::histogram!(
        "model_invocation.duration_seconds",
        "model" => model.id,
        "operation" => operation
    )
    .record(start.elapsed().as_secs_f64());

    metrics::counter!(
        "model_invocation.total",
        "model" => model.id,
        "operation" => operation,
        "status" => status
    )
    .increment(1);

    match result {
        Ok(_) => tracing::debug!(model = model.id, operation, "Model invocation succeeded"),
        Err(e) if e.is_pre_call() => {
            tracing::debug!(model = model.id, operation, error = %e, "Request rejected before invocation")
        }
        Err(e @ RuntimeError::Decode(_)) => {
            tracing::warn!(model = model.id, operation, error = %e, "Failed to decode model response")
        }
        Err(e) => tracing::error!(model = model.id, operation, error = %e, "Model invocation failed"),
    }
}

/// Builder for a [`BedrockRuntime`].
///
/// ```rust,no_run
/// # use uni_bedrock::runtime::BedrockRuntime;
/// # fn example(transport: impl uni_bedrock::traits::BedrockTransport + 'static)
/// #     -> uni_bedrock::error::Result<()> {
/// let runtime = BedrockRuntime::builder()
///     .transport(transport)
///     .catalog_from_str(r#"[{"alias": "chat/default", "model_id": "amazon.nova-micro-v1:0"}]"#)?
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct BedrockRuntimeBuilder {
    transport: Option<Arc<dyn BedrockTransport>>,
    catalog: Vec<ModelAlias>,
}

impl BedrockRuntimeBuilder {
    /// Set the transport that performs the network calls.
    pub fn transport<T: BedrockTransport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Set a transport that is shared with other owners.
    pub fn shared_transport(mut self, transport: Arc<dyn BedrockTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the alias catalog from a pre-built vector.
    pub fn catalog(mut self, catalog: Vec<ModelAlias>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Load the alias catalog from a JSON string.
    pub fn catalog_from_str(mut self, s: &str) -> Result<Self> {
        self.catalog = crate::api::catalog_from_str(s)?;
        Ok(self)
    }

    /// Load the alias catalog from a JSON file.
    pub fn catalog_from_file(mut self, path: impl AsRef<std::path::Path>) -> Result<Self> {
        self.catalog = crate::api::catalog_from_file(path)?;
        Ok(self)
    }

    /// Validate the catalog and construct the runtime.
    pub fn build(self) -> Result<BedrockRuntime> {
        let transport = self
            .transport
            .ok_or_else(|| RuntimeError::Config("A transport is required".to_string()))?;
        validate_catalog(&self.catalog)?;

        let mut aliases = HashMap::with_capacity(self.catalog.len());
        for alias in self.catalog {
            let model = registry::lookup(&alias.model_id).ok_or_else(|| {
                RuntimeError::Config(format!(
                    "Alias '{}' refers to unregistered model '{}'",
                    alias.alias, alias.model_id
                ))
            })?;
            tracing::debug!(alias = %alias.alias, model = model.id, "Registered model alias");
            aliases.insert(alias.alias, model);
        }

        Ok(BedrockRuntime { transport, aliases })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ToolResultBlock, ToolUseBlock};
    use crate::family::{amazon_image, anthropic, mistral, nova};
    use crate::mock::MockTransport;
    use serde_json::json;

    fn runtime(transport: MockTransport) -> BedrockRuntime {
        BedrockRuntime::builder()
            .transport(transport)
            .catalog(vec![ModelAlias::new("chat/fast", nova::NOVA_MICRO)])
            .build()
            .unwrap()
    }

    #[test]
    fn build_requires_transport() {
        let err = BedrockRuntime::builder().build().err().unwrap();
        assert!(matches!(err, RuntimeError::Config(_)));
    }

    #[test]
    fn resolve_prefers_alias_then_id() {
        let rt = runtime(MockTransport::new());
        assert_eq!(rt.resolve("chat/fast").unwrap().id, nova::NOVA_MICRO);
        assert_eq!(
            rt.resolve(anthropic::CLAUDE_3_HAIKU).unwrap().id,
            anthropic::CLAUDE_3_HAIKU
        );
        assert!(matches!(
            rt.resolve("chat/missing"),
            Err(RuntimeError::ModelNotFound(_))
        ));
        assert!(rt.contains_alias("chat/fast"));
    }

    #[tokio::test]
    async fn text_on_image_model_is_rejected_before_transport() {
        let transport = MockTransport::new();
        let rt = runtime(transport.clone());
        let err = rt
            .complete_text(amazon_image::NOVA_CANVAS, &TextRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::CapabilityMismatch(_)));
        assert!(err.is_pre_call());
        assert_eq!(transport.invoke_count(), 0);
    }

    #[tokio::test]
    async fn complete_text_round_trip() {
        let transport = MockTransport::new().with_invoke_response(json!({
            "output": {"message": {"role": "assistant", "content": [{"text": "Hello!"}]}},
            "stopReason": "end_turn"
        }));
        let rt = runtime(transport.clone());
        let completion = rt
            .complete_text("chat/fast", &TextRequest::new("Hi"))
            .await
            .unwrap();
        assert_eq!(completion.text, "Hello!");

        let sent = transport.invoke_requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].model_id, nova::NOVA_MICRO);
        let body: serde_json::Value = serde_json::from_slice(&sent[0].body).unwrap();
        assert_eq!(body["inferenceConfig"]["max_new_tokens"], 5120);
    }

    #[tokio::test]
    async fn tool_result_requires_pending_tool_use() {
        let transport = MockTransport::new();
        let rt = runtime(transport.clone());
        let request =
            ConverseRequest::tool_result(Vec::new(), ToolResultBlock::text("t-1", "sunny"));
        let err = rt.converse("chat/fast", &request).await.unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Validation(ValidationError::InvalidPrompt(_))
        ));
        assert_eq!(transport.converse_count(), 0);
    }

    #[tokio::test]
    async fn tool_result_follows_tool_use() {
        let transport = MockTransport::new();
        let rt = runtime(transport.clone());
        let history = vec![
            Message::user(vec![Content::Text("Weather in Lyon?".to_string())]),
            Message::assistant(vec![Content::ToolUse(ToolUseBlock {
                id: "t-1".to_string(),
                name: "weather".to_string(),
                input: json!({"city": "Lyon"}),
            })]),
        ];
        let request = ConverseRequest::tool_result(history, ToolResultBlock::text("t-1", "sunny"));
        let reply = rt.converse("chat/fast", &request).await.unwrap();
        assert_eq!(reply.history.len(), 4);
        assert!(matches!(
            reply.history[2].content.as_slice(),
            [Content::ToolResult(_)]
        ));
    }

    #[tokio::test]
    async fn prompt_and_tool_result_together_are_rejected() {
        let rt = runtime(MockTransport::new());
        let mut request = ConverseRequest::prompt(Vec::new(), "hi");
        request.tool_result = Some(ToolResultBlock::text("t-1", "x"));
        assert!(matches!(
            rt.converse("chat/fast", &request).await,
            Err(RuntimeError::Validation(ValidationError::InvalidPrompt(_)))
        ));
    }

    #[tokio::test]
    async fn unsupported_converse_feature_is_a_capability_error() {
        let transport = MockTransport::new();
        let rt = runtime(transport.clone());
        let mut request = ConverseRequest::prompt(Vec::new(), "Describe this");
        request.images.push(crate::content::ImageBlock::from_bytes(
            crate::content::ImageFormat::Png,
            b"png",
        ));
        let err = rt.converse(nova::NOVA_MICRO, &request).await.unwrap_err();
        assert!(matches!(err, RuntimeError::CapabilityMismatch(_)));
        assert!(err.to_string().contains("vision"));
        assert_eq!(transport.converse_count(), 0);
    }

    #[tokio::test]
    async fn converse_only_model_rejects_text() {
        let rt = runtime(MockTransport::new());
        let err = rt
            .complete_text(mistral::MISTRAL_LARGE_2407, &TextRequest::new("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::CapabilityMismatch(_)));
    }

    #[tokio::test]
    async fn user_role_in_reply_is_a_decode_error() {
        let transport = MockTransport::new().with_converse_reply(Message::user(vec![
            Content::Text("echo".to_string()),
        ]));
        let rt = runtime(transport);
        let err = rt
            .converse("chat/fast", &ConverseRequest::prompt(Vec::new(), "hi"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Decode(DecodeError::UnexpectedValue {
                field: "output.message.role",
                ..
            })
        ));
    }
}
