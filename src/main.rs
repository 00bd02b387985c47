use std::sync::Arc;

use lensgate::api::{self, AppState};
use lensgate::config::Config;
use lensgate::upstream::UpstreamClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (handles both tracing and log crate).
    // Everything, access lines included, goes to stderr.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_args();

    let upstream = UpstreamClient::new(&config.service_id, &config.access_key_id)?;
    let state = Arc::new(AppState {
        upstream,
        url_prefix: config.url_prefix.clone(),
    });
    let app = api::create_router(state);

    let listener = match tokio::net::TcpListener::bind(&config.listen).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("failed to bind {}: {e}", config.listen);
            std::process::exit(1);
        }
    };
    tracing::info!("listening on {}", config.listen);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server terminated: {e}");
    }
    // The serve loop returning at all, cleanly or not, ends the process.
    std::process::exit(1);
}
