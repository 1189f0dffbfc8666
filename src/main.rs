use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use recall::core::{logging, AppConfig};
use recall::server::router::router;
use recall::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    logging::init(&config.log_dir);

    let bind_addr = format!("127.0.0.1:{}", config.port);
    let state = AppState::initialize(config).await?;

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", bind_addr))?;
    tracing::info!("listening on {}", listener.local_addr()?);

    let app: Router = router(state);
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
