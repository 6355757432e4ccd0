use clap::Args;
use tracing::info;

use crate::app::{app, AppState};
use crate::config::AppConfig;
use crate::database::DatabaseManager;

#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    #[arg(long, help = "Listen port (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Keep documents in process memory instead of PostgreSQL")]
    pub in_memory: bool,
}

pub async fn handle(args: ServeArgs, mut config: AppConfig) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let db = if args.in_memory {
        info!("Using in-memory document store");
        DatabaseManager::in_memory()
    } else {
        DatabaseManager::connect(&config.database).await
    };

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(db, config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    info!("Biology Learning API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
