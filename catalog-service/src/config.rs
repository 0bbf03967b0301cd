use anyhow::{Context, Result};
use catalog_domain::eventing::QueueBinding;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub service_name: String,
    pub store_timeout: Duration,
    pub exchange: String,
    pub routing_key: String,
    pub queue: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let service_name = lookup("CATALOG_SERVICE_NAME").unwrap_or_else(|| "catalog".to_string());

        let store_timeout_ms = lookup("CATALOG_STORE_TIMEOUT_MS")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u64>()
            .context("CATALOG_STORE_TIMEOUT_MS must be a valid u64")?;
        anyhow::ensure!(
            store_timeout_ms > 0,
            "CATALOG_STORE_TIMEOUT_MS must be greater than zero"
        );

        let exchange = lookup("CATALOG_EVENTS_EXCHANGE").unwrap_or_else(|| "identity".to_string());

        let routing_key = lookup("CATALOG_USER_UPDATED_ROUTING_KEY")
            .unwrap_or_else(|| "UserUpdated".to_string());

        let queue = lookup("CATALOG_USER_UPDATED_QUEUE")
            .unwrap_or_else(|| format!("{service_name}.user-updated"));

        Ok(Self {
            service_name,
            store_timeout: Duration::from_millis(store_timeout_ms),
            exchange,
            routing_key,
            queue,
        })
    }

    pub fn binding(&self) -> QueueBinding {
        QueueBinding::builder()
            .queue(self.queue.as_str())
            .exchange(self.exchange.as_str())
            .routing_key(self.routing_key.as_str())
            .build()
    }
}
