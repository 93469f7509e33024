use async_trait::async_trait;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use tokio::runtime::Runtime;
use uni_bedrock::api::{ModelAlias, TextRequest};
use uni_bedrock::converse::{ConverseInput, ConverseOutput, ConverseOutputBody};
use uni_bedrock::error::TransportError;
use uni_bedrock::family::{anthropic, llama};
use uni_bedrock::registry;
use uni_bedrock::runtime::BedrockRuntime;
use uni_bedrock::traits::{BedrockTransport, InvokeModelRequest};
use uni_bedrock::validation::validate_text_request;

const CLAUDE_RESPONSE: &[u8] = br#"{
    "id": "msg_bench",
    "type": "message",
    "role": "assistant",
    "content": [{"type": "text", "text": "Benchmark reply"}],
    "stop_reason": "end_turn",
    "usage": {"input_tokens": 12, "output_tokens": 3}
}"#;

// --- Bench Components ---

/// Answers instantly so only the orchestration overhead is measured.
struct BenchTransport;

#[async_trait]
impl BedrockTransport for BenchTransport {
    async fn invoke_model(&self, _request: InvokeModelRequest) -> Result<Vec<u8>, TransportError> {
        Ok(CLAUDE_RESPONSE.to_vec())
    }

    async fn converse(&self, _input: ConverseInput) -> Result<ConverseOutput, TransportError> {
        Ok(ConverseOutput {
            output: ConverseOutputBody::default(),
            stop_reason: None,
            usage: None,
        })
    }
}

fn request() -> TextRequest {
    TextRequest::new("Summarise the plot of Hamlet in one sentence.")
        .with_max_tokens(256)
        .with_temperature(0.3)
}

// --- Benchmarks ---

fn bench_codecs(c: &mut Criterion) {
    let claude = registry::lookup(anthropic::CLAUDE_3_HAIKU)
        .and_then(|m| m.text())
        .unwrap();
    let llama = registry::lookup(llama::LLAMA_3_8B)
        .and_then(|m| m.text())
        .unwrap();
    let request = request();

    c.bench_function("validate_text_request", |b| {
        b.iter(|| validate_text_request(claude.text_parameters(), black_box(&request)).unwrap())
    });

    c.bench_function("build_request_anthropic", |b| {
        b.iter(|| claude.text_request_body(black_box(&request)).unwrap())
    });

    c.bench_function("build_request_llama_template", |b| {
        b.iter(|| llama.text_request_body(black_box(&request)).unwrap())
    });

    c.bench_function("decode_response_anthropic", |b| {
        b.iter(|| claude.text_response_body(black_box(CLAUDE_RESPONSE)).unwrap())
    });
}

fn bench_complete_text(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let runtime = BedrockRuntime::builder()
        .transport(BenchTransport)
        .catalog(vec![ModelAlias::new("chat/bench", anthropic::CLAUDE_3_HAIKU)])
        .build()
        .unwrap();
    let request = request();

    c.bench_function("complete_text_overhead", |b| {
        b.to_async(&rt).iter(|| async {
            let _ = runtime.complete_text("chat/bench", &request).await.unwrap();
        })
    });
}

criterion_group!(benches, bench_codecs, bench_complete_text);
criterion_main!(benches);
