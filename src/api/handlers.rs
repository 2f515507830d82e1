use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, StatusCode},
    response::Response,
    Json,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    api::types::ChatRequest,
    api::AppState,
    generation::{self, StreamObjectParams},
    models,
    ratelimit::RateLimitResult,
    schema, templates, tokens,
};

const RATE_LIMIT_BODY: &str = "You have reached your request limit for the day.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaVariant {
    Fragment,
    General,
}

impl SchemaVariant {
    fn schema(self) -> serde_json::Value {
        match self {
            SchemaVariant::Fragment => schema::fragment_schema(),
            SchemaVariant::General => schema::general_schema(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            SchemaVariant::Fragment => "fragment",
            SchemaVariant::General => "general_reply",
        }
    }
}

pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, (StatusCode, String)> {
    info!("received POST /api/chat");
    run_chat(state, SchemaVariant::Fragment, req).await
}

pub async fn general_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Response, (StatusCode, String)> {
    info!("received POST /api/general_chat");
    run_chat(state, SchemaVariant::General, req).await
}

async fn run_chat(
    state: AppState,
    variant: SchemaVariant,
    req: ChatRequest,
) -> Result<Response, (StatusCode, String)> {
    let request_id = Uuid::new_v4().to_string();

    info!(
        request_id = request_id.as_str(),
        user_id = req.user_id.as_str(),
        template = req.template.as_str(),
        model = req.model.id.as_str(),
        provider = req.model.provider_id.as_str(),
        messages = req.messages.len(),
        schema = variant.name(),
        "incoming chat request"
    );

    // Callers bringing their own API key are not rate limited.
    if req.config.api_key().is_none() {
        let result = state
            .limiter
            .check(&req.user_id, state.settings.max_requests, state.settings.window)
            .await;

        if !result.allowed {
            info!(
                request_id = request_id.as_str(),
                user_id = req.user_id.as_str(),
                limit = result.limit,
                reset = result.reset,
                "rate limit reached"
            );
            return Ok(rate_limited(&result));
        }
    }

    let system_prompt = templates::to_prompt(req.template);
    let mode = models::default_mode(&req.model);
    let schema = variant.schema();

    log_token_estimate(&request_id, &system_prompt, &req, &schema, mode);

    let client = models::model_client(&req.model, &req.config, state.http.clone())
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let stream = generation::stream_object(StreamObjectParams {
        client,
        schema,
        schema_name: variant.name(),
        system: system_prompt,
        messages: req.messages,
        mode,
        config: req.config,
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(stream.into_text_response())
}

fn rate_limited(result: &RateLimitResult) -> Response {
    let mut response = Response::new(Body::from(RATE_LIMIT_BODY));
    *response.status_mut() = StatusCode::TOO_MANY_REQUESTS;

    let headers = response.headers_mut();
    headers.insert("x-ratelimit-limit", HeaderValue::from(result.limit));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(result.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(result.reset));
    response
}

// Rough size estimate of everything riding along with the request. Logged for
// operators; never feeds into the request sent downstream.
fn log_token_estimate(
    request_id: &str,
    system_prompt: &str,
    req: &ChatRequest,
    schema: &serde_json::Value,
    mode: models::Mode,
) {
    let system_tokens = tokens::count_tokens(system_prompt);
    let message_tokens: usize = req
        .messages
        .iter()
        .map(|msg| tokens::count_tokens(&msg.content.to_string()))
        .sum();
    let template_tokens = tokens::count_tokens(req.template.as_str());
    let schema_tokens = tokens::count_tokens(&schema.to_string());
    let model_tokens =
        tokens::count_tokens(&serde_json::to_string(&req.model).unwrap_or_default());
    let config_tokens =
        tokens::count_tokens(&serde_json::to_string(&req.config).unwrap_or_default());
    let mode_tokens = tokens::count_tokens(mode.as_str());

    let total_tokens = system_tokens
        + message_tokens
        + template_tokens
        + schema_tokens
        + model_tokens
        + config_tokens
        + mode_tokens;

    debug!(
        request_id,
        system_tokens,
        message_tokens,
        template_tokens,
        schema_tokens,
        model_tokens,
        config_tokens,
        mode_tokens,
        total_tokens,
        "token estimate"
    );
}
