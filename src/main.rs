use std::sync::Arc;

use anyhow::Context;

use reelrate_api::api::{create_router, AppState};
use reelrate_api::config::Config;
use reelrate_api::store::{create_pool, MemoryStore, PgStore, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await.context("connecting to postgres")?;
            let store = PgStore::new(pool);
            store.init_schema().await.context("initializing schema")?;
            tracing::info!("using postgres rating store");
            Arc::new(store)
        }
        None => {
            tracing::info!("DATABASE_URL not set, using in-memory rating store");
            Arc::new(MemoryStore::default())
        }
    };

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(store, config);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
