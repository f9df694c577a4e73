use crate::connection_config::ConnectionConfig;
use crate::consumer::ConsumerWrapper;
use crate::error::SubscriptionError;
use crate::kafka_channel::json_frame::{record_to_frame, RecordMetadata};
use crate::live_channel::Frame;
use anyhow::{bail, Context};
use chrono::{DateTime, TimeDelta, Utc};
use rdkafka::consumer::Consumer;
use rdkafka::message::BorrowedMessage;
use rdkafka::{Message, Offset, TopicPartitionList};
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

type ChannelItem = Result<Frame, SubscriptionError>;

const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// How far back a new subscription starts, so panels open with some history.
const HISTORY_WINDOW_HOURS: i64 = 1;

pub(crate) async fn consume_topic(
    config: Arc<ConnectionConfig>,
    topic: String,
    tx: Sender<ChannelItem>,
    cancellation_token: CancellationToken,
) {
    let consumer = select! {
        consumer = start_consumer(config, &topic) => consumer,
        _ = cancellation_token.cancelled() => {
            info!("Consuming was cancelled before start");
            return;
        }
    };

    let consumer = match consumer {
        Ok(consumer) => consumer,
        Err(e) => {
            error!("Error while starting consumer for topic {}: {:?}", topic, e);
            let _ = tx.send(Err(e.into())).await;
            return;
        }
    };

    loop {
        let message_result = select! {
            msg = consumer.recv() => {
                msg.map(|message| convert_message(&message))
            }
            _ = cancellation_token.cancelled() => {
                info!("Consuming was cancelled");
                break
            }
        };

        let converted = match message_result {
            Ok(converted) => converted,
            Err(e) => {
                error!("Error while reading message from kafka consumer: {:?}", e);
                let error = SubscriptionError::new(format!(
                    "Error while reading from topic '{topic}': {e}"
                ));
                let _ = tx.send(Err(error)).await;
                return;
            }
        };

        let frame = match converted {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Skipping record of topic {}: {:#}", topic, e);
                continue;
            }
        };

        if let Err(e) = tx.send(Ok(frame)).await {
            debug!(
                "Frame receiver for topic {} is gone, stopping consumer. {}",
                topic, e
            );
            break;
        }
    }
}

fn convert_message(message: &BorrowedMessage<'_>) -> Result<Frame, anyhow::Error> {
    trace!(
        "New message. Topic: '{}', partition: {}, offset: {}",
        message.topic(),
        message.partition(),
        message.offset(),
    );

    let milliseconds = message.timestamp().to_millis().unwrap_or(0);
    let timestamp = DateTime::from_timestamp_millis(milliseconds).unwrap_or(DateTime::UNIX_EPOCH);
    let metadata = RecordMetadata {
        timestamp,
        partition: message.partition(),
        offset: message.offset(),
    };

    let Some(payload) = message.payload() else {
        bail!("Record at offset {} has no value", message.offset())
    };

    record_to_frame(metadata, payload)
}

async fn start_consumer(
    config: Arc<ConnectionConfig>,
    topic: &str,
) -> Result<Arc<ConsumerWrapper>, anyhow::Error> {
    let consumer_wrapper =
        Arc::new(ConsumerWrapper::create_for_consuming(&config).context("While creating consumer")?);

    let consumer = consumer_wrapper.clone();
    let topic_name = topic.to_owned();
    let since = Utc::now() - TimeDelta::hours(HISTORY_WINDOW_HOURS);
    let assignment = tokio::task::spawn_blocking(move || {
        starting_assignment(&consumer, &topic_name, since)
    })
    .await
    .context("While joining blocking handle")?;

    match assignment {
        Ok(assignment) => {
            consumer_wrapper
                .assign(&assignment)
                .context("While assigning topic partitions")?;
        }
        Err(StartError::TopicNotFound) => bail!("Topic {} wasn't found", topic),
        Err(StartError::Metadata(e)) => {
            warn!(
                "Couldn't fetch partitions of topic {}, consuming from latest: {:#}",
                topic, e
            );
            consumer_wrapper
                .subscribe(&[topic])
                .context("While subscribing to topic")?;
        }
    }

    Ok(consumer_wrapper)
}

enum StartError {
    TopicNotFound,
    Metadata(anyhow::Error),
}

/// Partition assignment starting at the first record newer than `since`.
/// Partitions without such a record start at the end.
fn starting_assignment(
    consumer: &ConsumerWrapper,
    topic: &str,
    since: DateTime<Utc>,
) -> Result<TopicPartitionList, StartError> {
    let partitions = consumer
        .topic_partitions(topic, METADATA_TIMEOUT)
        .context("While fetching partitions")
        .map_err(StartError::Metadata)?;

    if partitions.is_empty() {
        return Err(StartError::TopicNotFound);
    }

    debug!("Topic {} has {} partitions", topic, partitions.len());

    let mut timestamps = TopicPartitionList::new();
    for partition in &partitions {
        timestamps
            .add_partition_offset(topic, *partition, Offset::Offset(since.timestamp_millis()))
            .context("While building timestamp list")
            .map_err(StartError::Metadata)?;
    }

    let offsets = match consumer.offsets_for_times(timestamps, METADATA_TIMEOUT) {
        Ok(offsets) => offsets,
        Err(e) => {
            warn!(
                "Couldn't fetch starting offsets of topic {}, starting from latest: {}",
                topic, e
            );
            TopicPartitionList::new()
        }
    };

    let mut assignment = TopicPartitionList::new();
    for partition in partitions {
        let offset = offsets
            .find_partition(topic, partition)
            .map(|element| element.offset())
            .and_then(|offset| match offset {
                Offset::Offset(value) if value >= 0 => Some(offset),
                _ => None,
            })
            .unwrap_or(Offset::End);

        debug!(
            "Topic {}, partition {} starts at {:?}",
            topic, partition, offset
        );

        assignment
            .add_partition_offset(topic, partition, offset)
            .context("While building partition assignment")
            .map_err(StartError::Metadata)?;
    }

    Ok(assignment)
}
