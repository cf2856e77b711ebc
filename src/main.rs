#[cfg(feature = "web-interface")]
mod shutdown;
mod startup;

use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting despacho");

    // Load configuration
    let config = startup::load_config()?;

    #[cfg(feature = "web-interface")]
    {
        startup::start_server(config).await
    }

    #[cfg(not(feature = "web-interface"))]
    {
        let store = startup::build_store(&config).await?;
        let events = despacho::services::EventBook::load(store, config.tz()?).await;
        info!(
            "Web interface feature not enabled; {} events in store",
            events.events().len()
        );
        Ok(())
    }
}
