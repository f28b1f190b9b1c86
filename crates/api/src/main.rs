use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cursus_api::config::ServerConfig;
use cursus_api::gateway::{GatewayConfig, RazorpayGateway};
use cursus_api::router::build_app_router;
use cursus_api::state::AppState;
use cursus_api::summarize::{
    AzureOpenAiConfig, AzureOpenAiSummarizer, HttpTextExtractor, Summarizer, TextExtractor,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cursus_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = cursus_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    cursus_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    cursus_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Response cache (optional) ---
    let cache = match &config.redis_url {
        Some(url) => cursus_cache::CacheClient::connect(url).await,
        None => {
            tracing::info!("REDIS_URL not set; running without response cache");
            cursus_cache::CacheClient::disconnected()
        }
    };

    // --- Payment gateway (optional; absent means test mode) ---
    let gateway = match GatewayConfig::from_env() {
        Some(gateway_config) => {
            tracing::info!("Payment gateway configured");
            Some(Arc::new(RazorpayGateway::new(gateway_config)))
        }
        None => {
            tracing::warn!("Payment gateway not configured; running in test mode");
            None
        }
    };

    // --- AI collaborators (optional) ---
    let extractor: Option<Arc<dyn TextExtractor>> = match HttpTextExtractor::from_env() {
        Some(client) => Some(Arc::new(client)),
        None => {
            tracing::warn!("Text extraction service not configured");
            None
        }
    };
    let summarizer: Option<Arc<dyn Summarizer>> = match AzureOpenAiConfig::from_env() {
        Some(ai_config) => Some(Arc::new(AzureOpenAiSummarizer::new(ai_config))),
        None => {
            tracing::warn!("Summarization service not configured");
            None
        }
    };

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cache: Arc::new(cache),
        gateway,
        extractor,
        summarizer,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
