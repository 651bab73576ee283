use edugo_web::{
    AppState,
    config::{AppConfig, Env},
    create_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Development server entry point: configuration, logging, then the HTTP
/// server that proxies the API and serves the application shell.
#[tokio::main]
async fn main() -> std::io::Result<()> {
    // 1. Configuration (.env first, then the process environment)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "edugo_web=debug,tower_http=info".into());

    // 3. Log format by environment: pretty locally, JSON in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Dev server starting in {:?} mode", config.env);

    let proxy = config.proxy_target();
    tracing::info!(
        origin = %proxy.origin,
        api_path = %proxy.api_path,
        "proxying /api/v1 to the backend"
    );

    // 4. Router and Server Startup
    let addr = config.dev_server_addr.clone();
    let state = AppState::new(config).map_err(std::io::Error::other)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await
}
