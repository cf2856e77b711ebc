use despacho::config::{Config, StoreBackend};
use despacho::error::{DespachoResult, Error};
use despacho::store::{InMemoryStore, RedisStore, Store};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => {
            info!(
                "Using {:?} store, time zone {}, locale {}",
                config.store_backend, config.timezone, config.locale
            );
            Ok(config)
        }
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Open the configured record store. An unreachable Redis falls back to the
/// in-memory store.
pub async fn build_store(config: &Config) -> DespachoResult<Arc<dyn Store>> {
    match config.store_backend {
        StoreBackend::Memory => {
            info!("Using in-memory store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Redis => {
            let redis = RedisStore::new(&config.redis_url)?;
            match redis.ping().await {
                Ok(()) => {
                    info!("Connected to Redis successfully");
                    Ok(Arc::new(redis))
                }
                Err(e) => {
                    error!("Failed to connect to Redis: {}", e);
                    warn!("Using in-memory store as fallback, data will not persist");
                    Ok(Arc::new(InMemoryStore::new()))
                }
            }
        }
    }
}

/// Document storage under the configured directory
#[cfg(feature = "web-interface")]
pub fn build_storage(
    config: &Config,
) -> DespachoResult<Arc<dyn despacho::store::ObjectStorage>> {
    let storage = despacho::store::LocalObjectStorage::new(&config.storage_dir, &config.public_url)?;
    Ok(Arc::new(storage))
}

/// Serve the web interface until a shutdown signal arrives
#[cfg(feature = "web-interface")]
pub async fn start_server(config: Config) -> miette::Result<()> {
    use despacho::calendar::SystemClock;
    use despacho::web::{router, AppState};
    use std::net::SocketAddr;

    let tz = config.tz()?;
    let store = build_store(&config).await?;
    let storage = build_storage(&config)?;
    let clock = Arc::new(SystemClock::new(tz));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let state = AppState::new(config, store, storage, clock);
    info!("Requests run as {} ({:?})", state.user.name, state.user.role);

    let app = router(state);

    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(Error::from)?;
    axum::serve(listener, app)
        .with_graceful_shutdown(crate::shutdown::shutdown_signal())
        .await
        .map_err(Error::from)?;

    info!("Web server stopped");
    Ok(())
}
