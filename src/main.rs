use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod duration;
mod generation;
mod models;
mod ratelimit;
mod schema;
mod templates;
mod tokens;

use api::AppState;
use ratelimit::{RateLimitSettings, RateLimiter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // -----------------------------
    // Logging
    // -----------------------------
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("🚀 Starting fragment generation server...");

    // -----------------------------
    // Shared state / Dependencies
    // -----------------------------
    let settings = RateLimitSettings::from_env();
    let limiter = Arc::new(RateLimiter::new());
    let http = reqwest::Client::builder()
        .timeout(generation::MAX_DURATION)
        .build()?;

    let state = AppState {
        limiter,
        settings,
        http,
    };

    // -----------------------------
    // Routers
    // -----------------------------
    let app = Router::new()
        .merge(api::router())
        // CORS for frontend
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state);

    let addr = "0.0.0.0:3000";

    println!("🌐 HTTP listening on http://{addr}");
    println!("💬 Chat routes at http://{addr}/api/chat and /api/general_chat");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
