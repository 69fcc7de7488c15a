use anyhow::Result;
use tubely_api::setup;
use tubely_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let (_state, app) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, app).await
}
