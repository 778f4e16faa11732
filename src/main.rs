use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use hotel_accounts::api::routes::create_routes;
use hotel_accounts::auth::BcryptHasher;
use hotel_accounts::config::{run_migrations, AppConfig, DatabaseConfig};
use hotel_accounts::services::UserService;
use hotel_accounts::store::postgres::PgUserStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let app_config = AppConfig::from_env()?;
    let db_config = DatabaseConfig::from_env()?;

    let pool = db_config.create_pool().await?;
    run_migrations(&pool).await?;

    let service = UserService::new(
        Arc::new(PgUserStore::new(pool)),
        Arc::new(BcryptHasher::default()),
    );

    let app = create_routes(service, app_config.cors_origin.parse()?);

    let listener = TcpListener::bind(app_config.server_address()).await?;
    info!(
        "Hotel Accounts server starting on http://{}",
        app_config.server_address()
    );
    info!("Environment: {}", app_config.environment);

    axum::serve(listener, app).await?;

    Ok(())
}
