use std::time::Duration;

use anyhow::bail;
use axum::body::Body;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::api::types::CoreMessage;
use crate::models::{LLMModelConfig, Mode, ModelClient};

mod sse;

use sse::{delta_text, SseLineDecoder};

/// Upper bound on one upstream generation request, streamed body included.
pub const MAX_DURATION: Duration = Duration::from_secs(60);

pub struct StreamObjectParams {
    pub client: ModelClient,
    pub schema: Value,
    pub schema_name: &'static str,
    pub system: String,
    pub messages: Vec<CoreMessage>,
    pub mode: Mode,
    pub config: LLMModelConfig,
}

/// Runs one streaming schema-constrained completion against the provider and
/// hands back the raw text chunks as they arrive.
pub async fn stream_object(params: StreamObjectParams) -> anyhow::Result<ObjectStream> {
    let body = build_request_body(&params);
    let url = format!(
        "{}/chat/completions",
        params.client.base_url.trim_end_matches('/')
    );

    let mut request = params.client.http.post(url).json(&body);
    if let Some(key) = &params.client.api_key {
        request = request.bearer_auth(key);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        bail!("model request failed with status {status}: {text}");
    }

    debug!(model = params.client.model.as_str(), "upstream stream opened");

    let mut upstream = response.bytes_stream();
    let (tx, rx) = mpsc::channel::<anyhow::Result<String>>(32);

    // Relay task: decode SSE lines off the provider stream and forward the
    // text deltas until [DONE] or the client hangs up.
    tokio::spawn(async move {
        let mut decoder = SseLineDecoder::new();
        while let Some(chunk) = upstream.next().await {
            match chunk {
                Ok(bytes) => {
                    for payload in decoder.push(&bytes) {
                        if payload == "[DONE]" {
                            return;
                        }
                        if let Some(text) = delta_text(&payload) {
                            if tx.send(Ok(text)).await.is_err() {
                                return;
                            }
                        }
                    }
                }
                Err(err) => {
                    let _ = tx.send(Err(err.into())).await;
                    return;
                }
            }
        }
    });

    Ok(ObjectStream { rx })
}

pub struct ObjectStream {
    rx: mpsc::Receiver<anyhow::Result<String>>,
}

impl ObjectStream {
    /// Wraps the delta stream into a plain-text streaming HTTP response.
    pub fn into_text_response(self) -> Response {
        let stream = ReceiverStream::new(self.rx).map(|item| item.map_err(axum::Error::new));

        let mut response = Response::new(Body::from_stream(stream));
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}

fn build_request_body(params: &StreamObjectParams) -> Value {
    let mut system = params.system.clone();
    if params.mode == Mode::Json {
        // json mode has no schema channel of its own; spell it out in-prompt.
        system.push_str("\n\nRespond only with JSON matching this schema:\n");
        system.push_str(&params.schema.to_string());
    }

    let mut messages = Vec::with_capacity(params.messages.len() + 1);
    messages.push(json!({"role": "system", "content": system}));
    for msg in &params.messages {
        messages.push(json!({"role": msg.role, "content": msg.content}));
    }

    let mut body = json!({
        "model": params.client.model,
        "messages": messages,
        "stream": true,
    });

    match params.mode {
        Mode::Json => {
            body["response_format"] = json!({"type": "json_object"});
        }
        Mode::Auto => {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {
                    "name": params.schema_name,
                    "schema": params.schema,
                },
            });
        }
    }

    let config = &params.config;
    if let Some(v) = config.temperature {
        body["temperature"] = json!(v);
    }
    if let Some(v) = config.top_p {
        body["top_p"] = json!(v);
    }
    if let Some(v) = config.top_k {
        body["top_k"] = json!(v);
    }
    if let Some(v) = config.frequency_penalty {
        body["frequency_penalty"] = json!(v);
    }
    if let Some(v) = config.presence_penalty {
        body["presence_penalty"] = json!(v);
    }
    if let Some(v) = config.max_tokens {
        body["max_tokens"] = json!(v);
    }

    body
}
