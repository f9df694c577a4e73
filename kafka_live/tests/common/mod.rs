#![allow(dead_code)]

use anyhow::bail;
use kafka_live::error::SubscriptionError;
use kafka_live::live_channel::{
    FieldValue, Frame, LiveChannel, LiveChannelAddress, LiveSubscription, SubscriptionHandle,
};
use kafka_live::multiplexer::{StreamMultiplexer, TaggedFrame};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

type FrameSender = UnboundedSender<Result<Frame, SubscriptionError>>;

/// Live channel that records every open and close and lets the test push
/// frames into open subscriptions by topic.
#[derive(Default)]
pub struct RecordingLiveChannel {
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    opened: Vec<(u64, LiveChannelAddress)>,
    senders: HashMap<String, FrameSender>,
    closes: HashMap<u64, usize>,
    failing_opens: HashSet<String>,
    failing_closes: bool,
}

impl RecordingLiveChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn open_count(&self) -> usize {
        self.state.lock().opened.len()
    }

    pub fn opened_addresses(&self) -> Vec<LiveChannelAddress> {
        self.state
            .lock()
            .opened
            .iter()
            .map(|(_, address)| address.clone())
            .collect()
    }

    pub fn subscription_ids(&self, path: &str) -> Vec<u64> {
        self.state
            .lock()
            .opened
            .iter()
            .filter(|(_, address)| address.path() == path)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Close count of the latest subscription opened for `path`.
    pub fn close_count(&self, path: &str) -> usize {
        let Some(id) = self.subscription_ids(path).last().copied() else {
            return 0;
        };
        self.state.lock().closes.get(&id).copied().unwrap_or(0)
    }

    pub fn total_closes(&self) -> usize {
        self.state.lock().closes.values().sum()
    }

    pub fn all_close_counts(&self) -> Vec<usize> {
        let state = self.state.lock();
        state
            .opened
            .iter()
            .map(|(id, _)| state.closes.get(id).copied().unwrap_or(0))
            .collect()
    }

    pub fn fail_opens_for(&self, path: &str) {
        self.state.lock().failing_opens.insert(path.to_owned());
    }

    pub fn allow_opens_for(&self, path: &str) {
        self.state.lock().failing_opens.remove(path);
    }

    pub fn fail_closes(&self) {
        self.state.lock().failing_closes = true;
    }

    pub fn send(&self, path: &str, frame: Frame) {
        let state = self.state.lock();
        let sender = state.senders.get(path).expect("no subscription for path");
        sender.send(Ok(frame)).expect("subscription receiver dropped");
    }

    pub fn fail(&self, path: &str, message: &str) {
        let state = self.state.lock();
        let sender = state.senders.get(path).expect("no subscription for path");
        sender
            .send(Err(SubscriptionError::new(message)))
            .expect("subscription receiver dropped");
    }

    /// Ends the subscription as if the transport finished it.
    pub fn end(&self, path: &str) {
        self.state.lock().senders.remove(path);
    }
}

impl LiveChannel for RecordingLiveChannel {
    fn open(&self, address: &LiveChannelAddress) -> Result<LiveSubscription, anyhow::Error> {
        let mut state = self.state.lock();
        if state.failing_opens.contains(address.path()) {
            bail!("Topic {} wasn't found", address.path())
        }

        state.next_id += 1;
        let id = state.next_id;
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        state.opened.push((id, address.clone()));
        state.senders.insert(address.path().clone(), tx);

        Ok(LiveSubscription {
            handle: SubscriptionHandle::new(id),
            frames: Box::pin(UnboundedReceiverStream::new(rx)),
        })
    }

    fn close(&self, handle: SubscriptionHandle) -> Result<(), anyhow::Error> {
        let mut state = self.state.lock();
        *state.closes.entry(handle.id()).or_default() += 1;

        if state.failing_closes {
            bail!("Broker went away while closing {}", handle.id())
        }
        Ok(())
    }
}

pub fn frame(value: f64) -> Frame {
    let mut frame = Frame::new("response");
    frame.push("value", FieldValue::Float64(value));
    frame
}

pub fn value_of(frame: &TaggedFrame) -> Option<f64> {
    match &frame.payload {
        kafka_live::multiplexer::FramePayload::Data(data) => match data.field("value") {
            Some(FieldValue::Float64(value)) => Some(*value),
            _ => None,
        },
        kafka_live::multiplexer::FramePayload::Error(_) => None,
    }
}

pub async fn next_frame(
    multiplexer: &mut StreamMultiplexer<Arc<RecordingLiveChannel>>,
) -> TaggedFrame {
    tokio::time::timeout(Duration::from_secs(1), multiplexer.next())
        .await
        .expect("no frame in time")
        .expect("multiplexer stream ended")
}

pub async fn assert_no_frame(multiplexer: &mut StreamMultiplexer<Arc<RecordingLiveChannel>>) {
    let result = tokio::time::timeout(Duration::from_millis(50), multiplexer.next()).await;
    assert!(result.is_err(), "unexpected frame: {:?}", result);
}
