use anyhow::{Context, Result};
use timeline_server::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::load().context("Failed to load configuration")?;

    timeline_server::run(config).await.context("Server error")?;

    Ok(())
}
