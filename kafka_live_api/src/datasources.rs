use anyhow::{bail, Context};
use kafka_live::connection_config::{ConnectionConfig, DataSourceInstanceSettings};
use kafka_live::kafka_channel::KafkaLiveChannel;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// A configured data source: its connection settings and the live channel
/// every panel querying it subscribes through.
pub struct DataSourceInstance {
    pub uid: String,
    pub config: ConnectionConfig,
    pub channel: Arc<KafkaLiveChannel>,
}

#[derive(Default)]
pub struct DataSourceRegistry {
    instances: HashMap<String, Arc<DataSourceInstance>>,
}

impl DataSourceRegistry {
    pub fn from_settings(settings: &[DataSourceInstanceSettings]) -> Result<Self, anyhow::Error> {
        let mut instances = HashMap::with_capacity(settings.len());

        for instance_settings in settings {
            let uid = instance_settings.uid.trim();
            if uid.is_empty() {
                bail!("Data source uid can't be empty")
            }

            let config = ConnectionConfig::from_instance_settings(instance_settings)
                .with_context(|| format!("While reading settings of data source {uid}"))?;
            config
                .validate()
                .with_context(|| format!("While validating settings of data source {uid}"))?;

            info!(
                "Data source {} connects to {} as {}",
                uid,
                config.bootstrap_servers(),
                config.client_id()
            );

            let instance = DataSourceInstance {
                uid: uid.to_owned(),
                channel: Arc::new(KafkaLiveChannel::new(config.clone())),
                config,
            };

            if instances.insert(uid.to_owned(), Arc::new(instance)).is_some() {
                bail!("Data source {uid} is configured twice")
            }
        }

        Ok(Self { instances })
    }

    pub fn get(&self, uid: &str) -> Option<Arc<DataSourceInstance>> {
        self.instances.get(uid).cloned()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
