use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ripple_server::{
    api, config,
    state::AppState,
    storage::{seed::seed_demo_data, MemStorage, SqliteStorage, Storage},
};

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ripple_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load settings
    let settings = config::Settings::new().expect("Failed to load settings");

    // Pick the storage backend
    let storage: Arc<dyn Storage> = match settings.database.backend.as_str() {
        "memory" => {
            tracing::info!("Using in-memory storage");
            Arc::new(MemStorage::new())
        }
        _ => {
            tracing::info!("Using SQLite storage at {}", settings.database.path);
            Arc::new(
                SqliteStorage::new(&settings.database.path)
                    .expect("Failed to create database"),
            )
        }
    };

    seed_demo_data(storage.as_ref()).expect("Failed to seed demo data");
    tracing::info!("Storage initialized");

    let state = AppState::new(storage, settings.current_user_id);
    let app = api::router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .expect("Failed to parse server address");
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app).await.expect("Server error");
}
