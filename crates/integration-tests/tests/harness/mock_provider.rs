//! Mock provider backend for integration tests
//!
//! Serves both the OpenAI-style and Anthropic-style wire formats from one
//! port-0 server with canned responses, scripted tool rounds, and atomic
//! request counters.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Mock provider that returns predictable responses
pub struct MockProvider {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    completion_count: AtomicU32,
    /// Number of requests to fail with 500 before succeeding
    fail_count: AtomicU32,
    /// Number of tool-use turns to emit before the final answer
    tool_rounds: AtomicU32,
    /// Tool calls requested per tool-use turn
    calls_per_round: u32,
    /// Monotonic counter feeding tool-call ids
    call_seq: AtomicU32,
    /// Final answer content
    response_content: String,
    /// Captured request bodies, in arrival order
    bodies: Mutex<Vec<Value>>,
}

/// Options for starting a mock provider
pub struct MockOptions {
    pub fail_count: u32,
    pub tool_rounds: u32,
    pub calls_per_round: u32,
    pub response_content: String,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            fail_count: 0,
            tool_rounds: 0,
            calls_per_round: 1,
            response_content: "Hello from the mock provider".to_owned(),
        }
    }
}

impl MockProvider {
    /// Start a mock that answers every request successfully
    pub async fn start() -> anyhow::Result<Self> {
        Self::start_with(MockOptions::default()).await
    }

    /// Start a mock that fails the first `n` requests with 500
    pub async fn start_failing(n: u32) -> anyhow::Result<Self> {
        Self::start_with(MockOptions {
            fail_count: n,
            ..MockOptions::default()
        })
        .await
    }

    /// Start a mock with a custom final answer
    pub async fn start_with_response(content: &str) -> anyhow::Result<Self> {
        Self::start_with(MockOptions {
            response_content: content.to_owned(),
            ..MockOptions::default()
        })
        .await
    }

    /// Start a mock that requests tools for `rounds` turns before
    /// producing its final answer
    pub async fn start_with_tool_rounds(rounds: u32) -> anyhow::Result<Self> {
        Self::start_with(MockOptions {
            tool_rounds: rounds,
            ..MockOptions::default()
        })
        .await
    }

    /// Start a mock with full control over the script
    pub async fn start_with(options: MockOptions) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            completion_count: AtomicU32::new(0),
            fail_count: AtomicU32::new(options.fail_count),
            tool_rounds: AtomicU32::new(options.tool_rounds),
            calls_per_round: options.calls_per_round,
            call_seq: AtomicU32::new(0),
            response_content: options.response_content,
            bodies: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/v1/chat/completions", routing::post(handle_chat_completions))
            .route("/v1/messages", routing::post(handle_messages))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as a provider
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Number of completion requests received across both formats
    pub fn completion_count(&self) -> u32 {
        self.state.completion_count.load(Ordering::Relaxed)
    }

    /// Captured request bodies, in arrival order
    pub fn request_bodies(&self) -> Vec<Value> {
        self.state.bodies.lock().unwrap().clone()
    }
}

impl Drop for MockProvider {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Record the request and decide whether to fail or emit a tool turn
fn record(state: &MockState, body: &Value) -> Decision {
    state.completion_count.fetch_add(1, Ordering::Relaxed);
    state.bodies.lock().unwrap().push(body.clone());

    if state.fail_count.load(Ordering::Relaxed) > 0 {
        state.fail_count.fetch_sub(1, Ordering::Relaxed);
        return Decision::Fail;
    }

    let has_tools = body
        .get("tools")
        .and_then(Value::as_array)
        .is_some_and(|tools| !tools.is_empty());
    if has_tools && state.tool_rounds.load(Ordering::Relaxed) > 0 {
        state.tool_rounds.fetch_sub(1, Ordering::Relaxed);
        return Decision::ToolTurn;
    }

    Decision::Answer
}

enum Decision {
    Fail,
    ToolTurn,
    Answer,
}

fn next_call_id(state: &MockState) -> u32 {
    state.call_seq.fetch_add(1, Ordering::Relaxed) + 1
}

// -- OpenAI-style handler --

async fn handle_chat_completions(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    match record(&state, &body) {
        Decision::Fail => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": { "message": "mock provider intentional failure", "type": "server_error" }
            })),
        )
            .into_response(),
        Decision::ToolTurn => {
            let tool_calls: Vec<Value> = (0..state.calls_per_round)
                .map(|_| {
                    let id = next_call_id(&state);
                    json!({
                        "id": format!("call_{id}"),
                        "type": "function",
                        "function": {
                            "name": "site_lookup",
                            "arguments": "{\"site\":\"fairview\"}"
                        }
                    })
                })
                .collect();

            Json(json!({
                "id": "chatcmpl-mock-1",
                "object": "chat.completion",
                "created": 1_700_000_000,
                "model": body["model"],
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": null, "tool_calls": tool_calls },
                    "finish_reason": "tool_calls"
                }],
                "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
            }))
            .into_response()
        }
        Decision::Answer => Json(json!({
            "id": "chatcmpl-mock-2",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": body["model"],
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": state.response_content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        }))
        .into_response(),
    }
}

// -- Anthropic-style handler --

async fn handle_messages(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> impl IntoResponse {
    match record(&state, &body) {
        Decision::Fail => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "type": "error",
                "error": { "type": "api_error", "message": "mock provider intentional failure" }
            })),
        )
            .into_response(),
        Decision::ToolTurn => {
            let blocks: Vec<Value> = (0..state.calls_per_round)
                .map(|_| {
                    let id = next_call_id(&state);
                    json!({
                        "type": "tool_use",
                        "id": format!("toolu_{id}"),
                        "name": "site_lookup",
                        "input": { "site": "fairview" }
                    })
                })
                .collect();

            Json(json!({
                "id": "msg_mock_1",
                "type": "message",
                "role": "assistant",
                "model": body["model"],
                "content": blocks,
                "stop_reason": "tool_use",
                "usage": { "input_tokens": 10, "output_tokens": 5 }
            }))
            .into_response()
        }
        Decision::Answer => Json(json!({
            "id": "msg_mock_2",
            "type": "message",
            "role": "assistant",
            "model": body["model"],
            "content": [{ "type": "text", "text": state.response_content }],
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 10, "output_tokens": 5 }
        }))
        .into_response(),
    }
}
