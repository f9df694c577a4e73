use crate::connection_config::ConnectionConfig;
use crate::kafka_channel::consume::consume_topic;
use crate::live_channel::{LiveChannel, LiveChannelAddress, LiveSubscription, SubscriptionHandle};
use anyhow::{bail, Context};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, Instrument};

const FRAME_CHANNEL_CAPACITY: usize = 128;

/// Live channel backed by one rdkafka consumer per open subscription.
pub struct KafkaLiveChannel {
    config: Arc<ConnectionConfig>,
    next_id: AtomicU64,
    running: Mutex<HashMap<u64, CancellationToken>>,
}

impl KafkaLiveChannel {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config: Arc::new(config),
            next_id: AtomicU64::new(1),
            running: Mutex::new(HashMap::new()),
        }
    }

    pub fn running_subscriptions(&self) -> usize {
        self.running.lock().len()
    }
}

impl LiveChannel for KafkaLiveChannel {
    fn open(&self, address: &LiveChannelAddress) -> Result<LiveSubscription, anyhow::Error> {
        let topic = address.path().clone();
        if topic.trim().is_empty() {
            bail!("Topic name can't be empty")
        }

        let runtime = tokio::runtime::Handle::try_current()
            .context("While looking for a tokio runtime to consume on")?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let cancellation_token = CancellationToken::new();
        let (tx, rx) = tokio::sync::mpsc::channel(FRAME_CHANNEL_CAPACITY);

        debug!("Starting consumer {} for {}", id, address);

        let future = consume_topic(
            self.config.clone(),
            topic.clone(),
            tx,
            cancellation_token.clone(),
        )
        .instrument(info_span!("Consuming topic", topic = %topic, subscription = id));
        runtime.spawn(future);

        self.running.lock().insert(id, cancellation_token);

        Ok(LiveSubscription {
            handle: SubscriptionHandle::new(id),
            frames: Box::pin(ReceiverStream::new(rx)),
        })
    }

    fn close(&self, handle: SubscriptionHandle) -> Result<(), anyhow::Error> {
        let Some(cancellation_token) = self.running.lock().remove(&handle.id()) else {
            bail!("Subscription {} isn't running", handle.id())
        };

        cancellation_token.cancel();
        Ok(())
    }
}

impl Drop for KafkaLiveChannel {
    fn drop(&mut self) {
        for (_, cancellation_token) in self.running.lock().drain() {
            cancellation_token.cancel();
        }
    }
}
