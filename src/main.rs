use dns_tools_api::{
    infra::{HickoryResolver, HistoryStore, MemoryHistoryStore, PgHistoryStore},
    router, AppState, Config,
};
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dns_tools_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let version = config.load_version();
    tracing::info!(
        port = config.port,
        version = %version,
        kubernetes = config.kubernetes,
        "Starting DNS tools API"
    );

    let store: Arc<dyn HistoryStore> = match config.database_url.as_deref() {
        Some(url) => {
            let store = PgHistoryStore::connect(url, config.pool_size).await?;
            store.ensure_schema().await?;
            tracing::info!(pool_size = config.pool_size, "Connected to history database");
            Arc::new(store)
        }
        None => {
            tracing::warn!("DATABASE_URL is not set, history is kept in memory only");
            Arc::new(MemoryHistoryStore::new())
        }
    };
    let resolver = Arc::new(HickoryResolver::from_system_conf(config.dns_timeout));

    let state = AppState::new(resolver, store, version, config.kubernetes);
    let app = router(state);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on http://{}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
