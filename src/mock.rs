#![allow(dead_code)]

//! Mock transport for unit tests.
//!
//! Records every request, answers `invoke_model` with a canned body and
//! `converse` with a canned assistant turn. Failures can be scripted per
//! operation.

use crate::content::{Content, Message};
use crate::converse::{ConverseInput, ConverseOutput, ConverseOutputBody, WireTokenUsage};
use crate::error::TransportError;
use crate::traits::{BedrockTransport, InvokeModelRequest};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Recorded {
    invokes: Vec<InvokeModelRequest>,
    converses: Vec<ConverseInput>,
}

/// Cloneable mock; clones share the recorded calls.
#[derive(Clone)]
pub struct MockTransport {
    invoke_response: Vec<u8>,
    converse_reply: Message,
    fail_with: Option<String>,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            invoke_response: b"{}".to_vec(),
            converse_reply: Message::assistant(vec![Content::Text("ok".to_string())]),
            fail_with: None,
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    pub fn with_invoke_response(mut self, body: serde_json::Value) -> Self {
        self.invoke_response = body.to_string().into_bytes();
        self
    }

    pub fn with_raw_response(mut self, body: &[u8]) -> Self {
        self.invoke_response = body.to_vec();
        self
    }

    pub fn with_converse_reply(mut self, reply: Message) -> Self {
        self.converse_reply = reply;
        self
    }

    /// Fail every call with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub fn invoke_count(&self) -> usize {
        self.recorded.lock().unwrap().invokes.len()
    }

    pub fn converse_count(&self) -> usize {
        self.recorded.lock().unwrap().converses.len()
    }

    pub fn invoke_requests(&self) -> Vec<InvokeModelRequest> {
        self.recorded.lock().unwrap().invokes.clone()
    }

    pub fn converse_inputs(&self) -> Vec<ConverseInput> {
        self.recorded.lock().unwrap().converses.clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BedrockTransport for MockTransport {
    async fn invoke_model(&self, request: InvokeModelRequest) -> Result<Vec<u8>, TransportError> {
        self.recorded.lock().unwrap().invokes.push(request);
        match &self.fail_with {
            Some(message) => Err(message.clone().into()),
            None => Ok(self.invoke_response.clone()),
        }
    }

    async fn converse(&self, input: ConverseInput) -> Result<ConverseOutput, TransportError> {
        self.recorded.lock().unwrap().converses.push(input);
        if let Some(message) = &self.fail_with {
            return Err(message.clone().into());
        }
        Ok(ConverseOutput {
            output: ConverseOutputBody {
                message: Some((&self.converse_reply).into()),
            },
            stop_reason: Some("end_turn".to_string()),
            usage: Some(WireTokenUsage {
                input_tokens: 10,
                output_tokens: 2,
                total_tokens: 12,
            }),
        })
    }
}
