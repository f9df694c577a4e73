use crate::connection_config::ConnectionConfig;
use crate::consumer::ConsumerWrapper;
use anyhow::Context;
use rdkafka::consumer::Consumer;
use std::time::Duration;
use tracing::{debug, error};

const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    pub status: HealthStatus,
    pub message: String,
}

impl HealthCheckResult {
    fn connected() -> Self {
        Self {
            status: HealthStatus::Ok,
            message: "Connected to Kafka".to_owned(),
        }
    }

    fn failed() -> Self {
        Self {
            status: HealthStatus::Error,
            message: "Failed to establish connection to Kafka".to_owned(),
        }
    }
}

/// Checks that the cluster answers a metadata request with these settings.
pub async fn check_health(config: &ConnectionConfig) -> HealthCheckResult {
    let config = config.clone();
    let handle = tokio::task::spawn_blocking(move || {
        let client = ConsumerWrapper::create_for_non_consuming(&config)
            .context("While creating client")?;

        let metadata = client
            .fetch_metadata(None, HEALTH_CHECK_TIMEOUT)
            .context("While fetching metadata")?;

        Result::<_, anyhow::Error>::Ok(metadata.brokers().len())
    });

    let result = handle
        .await
        .context("While joining blocking handle")
        .and_then(|result| result);

    match result {
        Ok(brokers) => {
            debug!("Health check reached {} brokers", brokers);
            HealthCheckResult::connected()
        }
        Err(e) => {
            error!("Health check failed: {:?}", e);
            HealthCheckResult::failed()
        }
    }
}
