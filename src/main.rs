//! DVNC Agent - Leonardo's Intelligence System
//!
//! A themed conversational back end: keyword classification, canned or
//! backend-synthesized replies, and a staged "thinking" reveal, driven by a
//! pure session state machine.

mod api;
mod citations;
mod classifier;
mod config;
mod disclosure;
mod gateway;
mod markup;
mod orchestrator;
mod responses;
mod session;
mod state_machine;
mod view;

use api::{create_router, AppState};
use citations::CitationPool;
use classifier::Classifier;
use config::AppConfig;
use orchestrator::{OrchestratorHandle, ReplyComposer, RuntimeSettings};
use responses::ResponseRepository;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use view::BroadcastView;

/// Buffered view updates per SSE subscriber
const VIEW_BROADCAST_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dvnc_agent=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env();
    let keywords = config.keyword_table()?;
    tracing::info!(
        topics = keywords.entries.len(),
        custom = config.keywords_path.is_some(),
        "Keyword table loaded"
    );

    // Synthesis backend
    let synthesis = gateway::build(&config.gateway);
    {
        let synthesis = Arc::clone(&synthesis);
        tokio::spawn(async move { gateway::probe_health(&*synthesis).await });
    }

    // Session runtime
    let unbound = config.unbound_elements()?;
    if !unbound.is_empty() {
        tracing::info!(elements = ?unbound, "View elements left unbound");
    }
    let view = BroadcastView::new(VIEW_BROADCAST_CAPACITY).without(unbound);
    let composer = ReplyComposer::new(
        Classifier::new(keywords),
        ResponseRepository::default(),
        CitationPool::canonical(),
    );
    let orchestrator = OrchestratorHandle::start(
        synthesis,
        view.clone(),
        composer,
        RuntimeSettings {
            pacing: config.pacing,
            show_reasoning: config.show_reasoning,
            ..RuntimeSettings::default()
        },
    );

    let state = AppState::new(orchestrator.clone(), view);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("DVNC agent listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Err(e) = orchestrator.shutdown().await {
        tracing::warn!(error = %e, "Session runtime already stopped");
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
