use anyhow::Result;
use stylist_api::setup::{initialize_app, server::start_server};
use stylist_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let (_state, app) = initialize_app(config.clone()).await?;

    start_server(&config, app).await?;

    Ok(())
}
