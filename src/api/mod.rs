use std::sync::Arc;

use axum::{routing::post, Router};

use crate::ratelimit::{RateLimitSettings, RateLimiter};

pub mod handlers;
pub mod types;

use handlers::{chat, general_chat};

#[derive(Clone)]
pub struct AppState {
    pub limiter: Arc<RateLimiter>,
    pub settings: RateLimitSettings,
    pub http: reqwest::Client,
}

/// Chat generation routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // POST /api/chat — fragment generation
        .route("/api/chat", post(chat))
        // POST /api/general_chat — plain commentary replies
        .route("/api/general_chat", post(general_chat))
}
