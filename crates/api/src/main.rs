use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meshforge_api::config::ServerConfig;
use meshforge_api::engine::TaskEngine;
use meshforge_api::router::build_app_router;
use meshforge_api::{background, state};
use meshforge_vlm::{OpenAIEnhancer, PromptEnhancer};

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meshforge_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Output directory ---
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .expect("Failed to create output directory");
    tracing::info!(output_dir = %config.output_dir.display(), "Output directory ready");

    // --- Generation backend + prompt enhancer ---
    let generator = meshforge_backends::generator_from_env(config.generator_backend);
    let enhancer: Arc<dyn PromptEnhancer> = Arc::new(OpenAIEnhancer::from_env());
    tracing::info!(
        backend = generator.name(),
        generator_available = generator.is_available().await,
        vlm_available = enhancer.is_available().await,
        "Backends initialised"
    );

    // --- Task engine ---
    let engine = Arc::new(TaskEngine::new(
        Arc::clone(&generator),
        Arc::clone(&enhancer),
        config.output_dir.clone(),
    ));

    // --- Task retention job ---
    let retention_cancel = tokio_util::sync::CancellationToken::new();
    let retention_handle = tokio::spawn(background::task_retention::run(
        Arc::clone(&engine),
        retention_cancel.clone(),
    ));

    // --- App state + router ---
    let app_state = AppState {
        config: Arc::new(config.clone()),
        engine,
        generator,
        enhancer,
    };
    let app = build_app_router(app_state, &config);

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

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    retention_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(5), retention_handle).await;
    tracing::info!("Task retention job stopped");

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
