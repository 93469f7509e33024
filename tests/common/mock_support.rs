//! Recording mock transport shared by the integration tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uni_bedrock::api::ModelAlias;
use uni_bedrock::content::{Content, Message};
use uni_bedrock::converse::{ConverseInput, ConverseOutput, ConverseOutputBody, WireTokenUsage};
use uni_bedrock::error::TransportError;
use uni_bedrock::runtime::BedrockRuntime;
use uni_bedrock::traits::{BedrockTransport, InvokeModelRequest};

/// What the mock answers with on the next call.
#[derive(Clone)]
pub enum Scripted {
    Body(Vec<u8>),
    Reply(Message),
    Output(ConverseOutput),
    Fail(String),
}

#[derive(Default)]
struct State {
    script: VecDeque<Scripted>,
    invokes: Vec<InvokeModelRequest>,
    converses: Vec<ConverseInput>,
}

/// Answers calls from a script, in order. With an empty script, `invoke_model`
/// returns `{}` and `converse` replies with a single assistant text turn.
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, next: Scripted) -> Self {
        self.state.lock().unwrap().script.push_back(next);
        self
    }

    pub fn then_json(self, body: Value) -> Self {
        self.then(Scripted::Body(body.to_string().into_bytes()))
    }

    pub fn then_reply(self, reply: Message) -> Self {
        self.then(Scripted::Reply(reply))
    }

    pub fn then_fail(self, message: &str) -> Self {
        self.then(Scripted::Fail(message.to_string()))
    }

    pub fn invoke_count(&self) -> usize {
        self.state.lock().unwrap().invokes.len()
    }

    pub fn converse_count(&self) -> usize {
        self.state.lock().unwrap().converses.len()
    }

    pub fn call_count(&self) -> usize {
        self.invoke_count() + self.converse_count()
    }

    /// Body of the `index`-th `invoke_model` call, parsed as JSON.
    pub fn invoke_body(&self, index: usize) -> Value {
        let state = self.state.lock().unwrap();
        serde_json::from_slice(&state.invokes[index].body).unwrap()
    }

    pub fn invoke_request(&self, index: usize) -> InvokeModelRequest {
        self.state.lock().unwrap().invokes[index].clone()
    }

    pub fn converse_input(&self, index: usize) -> ConverseInput {
        self.state.lock().unwrap().converses[index].clone()
    }

    fn next(&self) -> Option<Scripted> {
        self.state.lock().unwrap().script.pop_front()
    }
}

pub fn assistant_text(text: &str) -> Message {
    Message::assistant(vec![Content::Text(text.to_string())])
}

pub fn output_for(reply: &Message) -> ConverseOutput {
    ConverseOutput {
        output: ConverseOutputBody {
            message: Some(reply.into()),
        },
        stop_reason: Some("end_turn".to_string()),
        usage: Some(WireTokenUsage {
            input_tokens: 10,
            output_tokens: 4,
            total_tokens: 14,
        }),
    }
}

#[async_trait]
impl BedrockTransport for MockTransport {
    async fn invoke_model(&self, request: InvokeModelRequest) -> Result<Vec<u8>, TransportError> {
        self.state.lock().unwrap().invokes.push(request);
        match self.next() {
            Some(Scripted::Body(body)) => Ok(body),
            Some(Scripted::Fail(message)) => Err(message.into()),
            Some(_) => Err("scripted a converse answer for invoke_model".into()),
            None => Ok(b"{}".to_vec()),
        }
    }

    async fn converse(&self, input: ConverseInput) -> Result<ConverseOutput, TransportError> {
        self.state.lock().unwrap().converses.push(input);
        match self.next() {
            Some(Scripted::Reply(reply)) => Ok(output_for(&reply)),
            Some(Scripted::Output(output)) => Ok(output),
            Some(Scripted::Fail(message)) => Err(message.into()),
            Some(Scripted::Body(_)) => Err("scripted an invoke body for converse".into()),
            None => Ok(output_for(&assistant_text("ok"))),
        }
    }
}

/// Runtime over `transport` with no aliases.
pub fn runtime(transport: &MockTransport) -> BedrockRuntime {
    BedrockRuntime::builder()
        .transport(transport.clone())
        .build()
        .unwrap()
}

/// Runtime over `transport` with the given `(alias, model_id)` pairs.
pub fn runtime_with_aliases(transport: &MockTransport, aliases: &[(&str, &str)]) -> BedrockRuntime {
    BedrockRuntime::builder()
        .transport(transport.clone())
        .catalog(
            aliases
                .iter()
                .map(|(alias, model)| ModelAlias::new(*alias, *model))
                .collect(),
        )
        .build()
        .unwrap()
}
