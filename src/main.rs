use city_cms::{
    api::create_router,
    auth::{jwt::JwtManager, session},
    authz::roles,
    config::Config,
    db::{create_pool, run_migrations},
    observability::init_tracing,
};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;
    config.validate()?;

    // Initialize tracing/logging
    init_tracing(&config.observability);

    tracing::info!("Starting City CMS API");
    tracing::info!("Configuration loaded: {:?}", config.server);

    // Signing secret checked at boot, before anything binds
    let jwt = Arc::new(JwtManager::new(&config)?);

    // Create database connection pool
    let db_pool = create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run database migrations
    run_migrations(&db_pool).await?;

    // Seed the role table (idempotent upsert by name)
    roles::initialize_default_roles(&db_pool).await?;

    // Background reclamation of expired sessions
    session::spawn_expiry_sweeper(
        db_pool.clone(),
        config.auth.session_sweep_interval_seconds,
    );

    // Create router
    let app = create_router(db_pool, jwt, config.auth.clone());

    // Bind server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid server address: {}", e))?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("City CMS API is ready to accept requests");

    // Connect info feeds the session device metadata (caller IP)
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
