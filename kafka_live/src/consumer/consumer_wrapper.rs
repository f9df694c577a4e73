use crate::connection_config::ConnectionConfig;
use crate::consumer::SecurityProtocol;
use anyhow::{bail, Context};
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::KafkaError;
use rdkafka::ClientConfig;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

pub struct ConsumerWrapper {
    consumer: StreamConsumer,
}

impl ConsumerWrapper {
    pub fn create_for_consuming(config: &ConnectionConfig) -> Result<Self, anyhow::Error> {
        // https://raw.githubusercontent.com/confluentinc/librdkafka/master/CONFIGURATION.md
        let consumer: StreamConsumer = Self::create_common_config(config, true)?
            .set("auto.offset.reset", "latest")
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", "10000")
            .set("enable.auto.commit", "false")
            .set("enable.auto.offset.store", "false")
            .set("heartbeat.interval.ms", "1000")
            .create()
            .context("While creating kafka StreamConsumer")?;

        Ok(Self { consumer })
    }

    pub fn create_for_non_consuming(config: &ConnectionConfig) -> Result<Self, anyhow::Error> {
        let consumer: StreamConsumer = Self::create_common_config(config, false)?
            .create()
            .context("While creating kafka StreamConsumer")?;

        Ok(Self { consumer })
    }

    fn create_common_config(
        config: &ConnectionConfig,
        with_group: bool,
    ) -> Result<ClientConfig, anyhow::Error> {
        let brokers = config.brokers();
        if brokers.is_empty() {
            bail!("No brokers specified")
        }

        let security_protocol = SecurityProtocol::from(config);
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", brokers.join(","))
            .set("client.id", config.client_id())
            .set("security.protocol", security_protocol.to_string());

        if with_group {
            client_config.set("group.id", config.group_id());
        }

        if let Some(credentials) = security_protocol.credentials() {
            client_config
                .set("sasl.mechanism", credentials.mechanism.to_string())
                .set("sasl.username", &credentials.username)
                .set("sasl.password", &credentials.password);
        }

        if security_protocol.uses_tls() {
            client_config
                .set("enable.ssl.certificate.verification", "false")
                .set("ssl.endpoint.identification.algorithm", "none");
        }

        if let Ok(value) = std::env::var("RD_KAFKA_DEBUG") {
            client_config.set("debug", value);
        }

        Ok(client_config)
    }

    /// Partition ids of `topic`, empty when the broker doesn't know the topic.
    pub fn topic_partitions(
        &self,
        topic: &str,
        timeout: Duration,
    ) -> Result<Vec<i32>, KafkaError> {
        let metadata = self.consumer.fetch_metadata(Some(topic), timeout)?;

        let partitions = metadata
            .topics()
            .iter()
            .find(|t| t.name() == topic && t.error().is_none())
            .map(|t| t.partitions().iter().map(|p| p.id()).collect())
            .unwrap_or_default();

        Ok(partitions)
    }
}

impl DerefMut for ConsumerWrapper {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.consumer
    }
}

impl Deref for ConsumerWrapper {
    type Target = StreamConsumer;

    fn deref(&self) -> &Self::Target {
        &self.consumer
    }
}
