use mediasweep_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (tracing, database, services, routes)
    let (_state, router) = mediasweep_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    mediasweep_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
