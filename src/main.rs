mod config;
mod error;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };
    if config.ingest_token.is_none() {
        tracing::warn!("INGEST_TOKEN not set; coordinate ingest will reject every request");
    }

    let port = config.port;
    let content_dir = config.content_dir.display().to_string();
    let app = routes::app(state::AppState::new(config));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, %content_dir, "globe-relay listening");
    axum::serve(listener, app).await.expect("server failed");
}
