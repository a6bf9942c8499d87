//! msss HTTP Server
//!
//! Axum server for selling the book: hosted checkout, purchase verification
//! with a 30-day access cookie, and payment-gated downloads.

mod config;
mod handlers;
mod pages;
mod state;

use axum::{routing::{get, post}, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::handlers::{
    create_checkout, download_book, download_templates, health_check, subscribe,
    verify_purchase,
};
use crate::state::AppState;

/// Build the router with all routes and layers
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/checkout", post(create_checkout))
        .route("/verify-purchase", post(verify_purchase))
        .route("/subscribe", post(subscribe))
        .route("/download", get(download_book))
        .route("/download-templates", get(download_templates))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let state = AppState::from_config(&config);

    if state.gateway.is_some() {
        tracing::info!("✓ Stripe configured");
    } else {
        tracing::warn!("⚠ Stripe not configured - checkout, verification and downloads disabled");
        tracing::warn!("  Set STRIPE_SECRET_KEY in .env");
    }
    if state.contacts.is_some() {
        tracing::info!("✓ Omnisend configured");
    } else {
        tracing::warn!("⚠ OMNISEND_API_KEY not set - buyer contact sync skipped");
    }
    for (name, locator) in [
        ("BOOK_PDF_URL", &config.assets.book),
        ("TEMPLATE_PACK_URL", &config.assets.templates),
    ] {
        if locator.is_none() {
            tracing::warn!("⚠ {} not set - that download will fail", name);
        }
    }
    if !state.downloads_signed {
        tracing::info!("DOWNLOAD_SIGNING_SECRET not set - redirecting to configured URLs as-is");
    }

    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("🚀 msss server running on http://{}", config.bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health             - Health check");
    tracing::info!("  POST /checkout           - Create Stripe checkout");
    tracing::info!("  POST /verify-purchase    - Verify payment, set access cookie");
    tracing::info!("  GET  /download           - Book download (cookie)");
    tracing::info!("  GET  /download-templates - Templates pack download (cookie)");
    tracing::info!("  POST /subscribe          - Quiz newsletter sign-up");

    axum::serve(listener, app).await?;

    Ok(())
}
