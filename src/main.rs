use axum::serve;
use coord_db_rust::api::routes::create_router;
use coord_db_rust::config::AppConfig;
use coord_db_rust::seed;
use coord_db_rust::store::MemoryStore;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if it exists
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("coord-db: coordinate study REST server");

    // Load configuration
    let config = AppConfig::load()?;
    log::info!(
        "configuration loaded: server={}:{}",
        config.server.host,
        config.server.port
    );

    let store = Arc::new(MemoryStore::new());

    // Load seed data for demonstration (optional)
    if std::env::var("LOAD_SEED_DATA").unwrap_or_default() == "true" {
        seed::load_seed_data(store.as_ref()).await?;
        log::info!("seed data loaded");
    }

    run(create_router().with_state(store), &config).await?;

    Ok(())
}

async fn run(app: axum::Router, config: &AppConfig) -> anyhow::Result<()> {
    let bind_address = config.server_address();
    let listener = TcpListener::bind(&bind_address).await?;
    println!("coord-db server running on http://{}", bind_address);

    serve(listener, app).await?;

    Ok(())
}
