use std::net::SocketAddr;

use anyhow::Context;

use classroll_api::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    classroll_observability::init();

    let config = Config::from_env().context("invalid configuration")?;
    let app = classroll_api::app::build_app(&config)
        .await
        .context("failed to initialize record store")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
