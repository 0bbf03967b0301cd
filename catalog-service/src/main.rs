mod config;

use anyhow::{Context, Result};
use catalog_application::collections::{ITEMS, USERS, provision_all};
use catalog_application::context::AppContext;
use catalog_application::item_service::{ItemService, ListItems};
use catalog_application::model::{Item, User};
use catalog_application::query_handler::QueryHandler;
use catalog_application::replica::UserReplicaSync;
use catalog_domain::eventing::{Consumer, InMemoryBroker};
use catalog_domain::persist::{DocumentRepository, InMemoryDocumentStore};
use config::AppConfig;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("failed to load application configuration")?;
    info!(
        service = %config.service_name,
        queue = %config.queue,
        store_timeout_ms = config.store_timeout.as_millis() as u64,
        "starting catalog service"
    );

    let store = InMemoryDocumentStore::new();
    provision_all(&store, config.store_timeout)
        .await
        .context("failed to provision collections")?;

    let items = Arc::new(
        DocumentRepository::<_, Item>::new(store.clone(), ITEMS)
            .with_timeout(config.store_timeout),
    );
    let users = Arc::new(
        DocumentRepository::<_, User>::new(store.clone(), USERS)
            .with_timeout(config.store_timeout),
    );

    let item_service = ItemService::new(items);
    let catalog = QueryHandler::handle(&item_service, &AppContext::default(), ListItems::default())
        .await
        .context("failed to read item catalog")?;
    info!(items = catalog.metadata.total_records, "item catalog ready");

    let broker = InMemoryBroker::new();
    let consumer = Arc::new(
        Consumer::builder()
            .source(Arc::new(broker.clone()))
            .handler(Arc::new(UserReplicaSync::new(users)))
            .binding(config.binding())
            .build(),
    );
    let handle = consumer
        .start()
        .await
        .context("failed to start user replica consumer")?;

    tokio::select! {
        _ = shutdown_signal() => {
            info!("shutdown requested");
            handle.shutdown();
        }
        _ = handle.wait_stopped() => {
            warn!("user replica consumer stopped unexpectedly");
        }
    }

    handle
        .join()
        .await
        .context("user replica consumer failed")?;

    info!("catalog service stopped");
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("catalog=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
