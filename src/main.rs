//! Service entrypoint: config, tracing, database pool, registry, HTTP.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use aerodesk::adapters::http::{router, AppState};
use aerodesk::adapters::postgres::{
    connect_pool, PgBookingStore, PgFlightStore, PgHealthProbe, PgInsuranceStore,
    PgPassengerStore, PgPolicyStore, PgReferenceDataStore, PgRefundStore, PgServiceLogStore,
    PgTripStore,
};
use aerodesk::adapters::secrets::FileSecretStore;
use aerodesk::application::{OperationRegistry, Services};
use aerodesk::config::AppConfig;
use aerodesk::ports::SecretStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.server.log_level.clone())),
        )
        .init();

    let secrets = FileSecretStore::new(config.secrets.clone());
    let credentials = secrets.db_credentials().await?;
    let url = config
        .database
        .connection_url(&credentials.user, &credentials.password);

    let pool = connect_pool(&config.database, &url).await?;
    tracing::info!(
        host = %config.database.host,
        database = %config.database.name,
        "connected to database"
    );

    sqlx::migrate!("./migrations").run(&pool).await?;

    let services = Services {
        reference_data: Arc::new(PgReferenceDataStore::new(pool.clone())),
        flights: Arc::new(PgFlightStore::new(pool.clone())),
        bookings: Arc::new(PgBookingStore::new(pool.clone())),
        passengers: Arc::new(PgPassengerStore::new(pool.clone())),
        refunds: Arc::new(PgRefundStore::new(pool.clone())),
        insurance: Arc::new(PgInsuranceStore::new(pool.clone())),
        trips: Arc::new(PgTripStore::new(pool.clone())),
        policies: Arc::new(PgPolicyStore::new(pool.clone())),
        service_log: Arc::new(PgServiceLogStore::new(pool.clone())),
    };

    let registry = Arc::new(OperationRegistry::standard());
    let state = AppState::new(
        services,
        registry.clone(),
        Arc::new(PgHealthProbe::new(pool.clone())),
        Duration::from_secs(config.server.request_timeout_secs),
    );
    let app = router(state, &config.server);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, operations = registry.len(), "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(_) => std::future::pending().await,
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
