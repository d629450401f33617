// Main Entry Point untuk Chat Service
use chat_service::{config, routes};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_service=debug,tower_http=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("💬 Starting Chat Service");

    let config = config::AppConfig::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    let state = config::AppState::new(config).await?;
    tracing::info!("✅ Application state initialized ({} store)", state.config.store_backend);

    // Store harus bisa dihubungi sebelum menerima traffic
    if let Err(err) = state.chat.ping().await {
        tracing::error!("❌ Chat store health check failed: {}", err);
        state.chat.close().await;
        return Err(err.into());
    }
    tracing::info!("✅ Chat store connection healthy");

    let app = routes::create_router(state.clone());
    let addr = state.config.bind_address();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🎯 Chat Service listening on {}", addr);
    tracing::info!("📚 Swagger UI: http://{}/docs, ReDoc: http://{}/redoc", addr, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.chat.close().await;
    tracing::info!("👋 Chat Service shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("🛑 Received shutdown signal"),
        Err(err) => tracing::error!("Failed to listen for shutdown signal: {}", err),
    }
}
