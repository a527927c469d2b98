use dotenvy::dotenv;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use mlsc_server::config::Config;
use mlsc_server::db::PgStore;
use mlsc_server::routes::create_routes;
use mlsc_server::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mlsc_server=debug")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    let store = PgStore::connect(&config.database_url, config.max_connections)
        .await
        .expect("Failed to connect to database");

    store.migrate().await.expect("Failed to run migrations");

    tracing::info!(
        event = %config.launchpad.event,
        intro = %config.launchpad.intro_hashtag,
        "Launchpad leaderboard scope"
    );

    let state = AppState::new(Arc::new(store), config.launchpad.clone());
    let app = create_routes(state, &config.cors_allowed_origins, config.include_hsts);

    tracing::info!("🚀 Server running at http://{}", config.addr);

    let listener = TcpListener::bind(config.addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app).await.expect("Server failed");
}
