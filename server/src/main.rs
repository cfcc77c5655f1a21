use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use todo_server::{
    app, AppState, Config, InMemoryTodoStore, Readiness, SqliteTodoStore, StoreConfig, TodoStore,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let readiness = Arc::new(Readiness::new());
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,todo_server=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let store: Arc<dyn TodoStore> = match &config.store {
        StoreConfig::Memory => Arc::new(InMemoryTodoStore::new()),
        StoreConfig::Sqlite { path } => Arc::new(
            SqliteTodoStore::open(path)
                .with_context(|| format!("opening sqlite store at {path}"))?,
        ),
    };
    tracing::info!(store = ?config.store, "store configured");

    tokio::spawn({
        let readiness = Arc::clone(&readiness);
        let store = Arc::clone(&store);
        async move {
            readiness.probe(store.as_ref()).await;
        }
    });

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app(AppState::new(store, readiness)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
