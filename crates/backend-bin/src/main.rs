use anyhow::Result;
use backend_lib::{config::Settings, router, store::Db, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize configuration, falling back to the bundled default file
    let settings = Settings::load().or_else(|_| Settings::load_from("config/default.toml"))?;

    // Initialize tracing from the configured log level, RUST_LOG wins
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone())),
        )
        .init();

    // Open the credential store and run migrations
    let db = Db::open(&settings.database_url).await?;

    let bind_addr = settings.bind_addr;
    let state = Arc::new(AppState::new(db, settings));
    let app = router::create_router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    info!(%bind_addr, "listening");

    // ConnectInfo feeds the login rate limiter with client addresses
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
