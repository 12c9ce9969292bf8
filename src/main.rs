use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use westside_server::config::Config;
use westside_server::db;
use westside_server::routes::{create_routes, with_static_site};
use westside_server::services::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env();

    let pool = db::connect(&config.database_url, config.max_connections)
        .await
        .expect("Failed to connect to database");

    tracing::info!(url = %config.database_url, "Successfully connected to database");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    tracing::info!("Migrations run successfully");

    db::seed_main_admin(&pool, &config.main_admin_code, &config.main_admin_name)
        .await
        .expect("Failed to seed main admin code");

    let app = with_static_site(create_routes(AppState::new(pool)), &config.static_dir);

    let addr = config.addr();
    tracing::info!("Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
