//! Data API - Main Entry Point

use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::load()?;
    init_logging(&settings.logging)?;

    info!("=== Data API v{} ===", env!("CARGO_PKG_VERSION"));

    run_server(settings).await?;

    Ok(())
}
