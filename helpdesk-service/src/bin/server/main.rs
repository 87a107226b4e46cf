use std::sync::Arc;

use auth::Clock;
use auth::SystemClock;
use auth::TokenCodec;
use helpdesk_service::config::Config;
use helpdesk_service::domain::session::service::SessionService;
use helpdesk_service::domain::work_order::service::WorkOrderService;
use helpdesk_service::inbound::http::router::create_router;
use helpdesk_service::outbound::repositories::PostgresSessionStore;
use helpdesk_service::outbound::repositories::PostgresUserRepository;
use helpdesk_service::outbound::repositories::PostgresWorkOrderRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helpdesk_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "helpdesk-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_ttl_minutes = config.jwt.access_ttl_minutes,
        refresh_ttl_days = config.jwt.refresh_ttl_days,
        rotation_threshold_minutes = config.jwt.rotation_threshold_minutes,
        "Configuration loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Refuse to start with a weak signing secret.
    let codec = Arc::new(
        TokenCodec::new(&config.jwt.token_config()?, Arc::clone(&clock))
            .map_err(|e| anyhow::anyhow!("Invalid JWT configuration: {}", e))?,
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let session_store = Arc::new(PostgresSessionStore::new(
        pg_pool.clone(),
        Arc::clone(&clock),
    ));
    let work_order_repository = Arc::new(PostgresWorkOrderRepository::new(pg_pool));

    let session_service = Arc::new(SessionService::new(
        Arc::clone(&user_repository),
        session_store,
        codec,
        clock,
        config.jwt.rotation_threshold()?,
    ));
    let work_order_service = Arc::new(WorkOrderService::new(
        work_order_repository,
        Arc::clone(&user_repository),
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(session_service, work_order_service, user_repository);

    if let Err(e) = axum::serve(http_listener, http_application).await {
        tracing::error!(error = %e, "Server error");
        return Err(e.into());
    }

    tracing::info!("Server exited successfully");

    Ok(())
}
