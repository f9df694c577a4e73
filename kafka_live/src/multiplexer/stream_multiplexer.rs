use crate::error::{ReconciliationError, SubscriptionError};
use crate::live_channel::{
    Frame, LiveChannel, LiveChannelAddress, LiveSubscription, SubscriptionHandle, SubscriptionKey,
};
use crate::multiplexer::reconcile::{desired_subscriptions, DesiredSubscription, ReconcilePlan};
use crate::multiplexer::{ReconcileOutcome, TaggedFrame};
use crate::queries::TopicQuery;
use std::collections::{HashMap, VecDeque};
use std::pin::Pin;
use std::task::{Context, Poll, Waker};
use tokio_stream::{Stream, StreamExt, StreamMap};
use tracing::{debug, error, info, warn};

enum SubscriptionEvent {
    Frame(Frame),
    Failed(SubscriptionError),
    Ended,
}

type SubscriptionEvents = Pin<Box<dyn Stream<Item = SubscriptionEvent> + Send>>;

struct ActiveSubscription {
    handle: SubscriptionHandle,
    address: LiveChannelAddress,
    query_ids: Vec<String>,
}

/// Turns the active queries of one panel into live subscriptions and merges
/// their frames into a single stream of [`TaggedFrame`].
///
/// Call [`StreamMultiplexer::run`] with the full query list every time it
/// changes. Subscriptions whose address is still wanted are left alone, the
/// rest are closed, new addresses are opened. Dropping the multiplexer closes
/// every subscription that is still open.
///
/// The stream never ends by itself: with no active queries it just stays
/// pending until the next `run`.
pub struct StreamMultiplexer<C: LiveChannel> {
    channel: C,
    namespace: String,
    subscriptions: HashMap<SubscriptionKey, ActiveSubscription>,
    streams: StreamMap<SubscriptionKey, SubscriptionEvents>,
    pending: VecDeque<TaggedFrame>,
    waker: Option<Waker>,
}

impl<C: LiveChannel> StreamMultiplexer<C> {
    pub fn new(channel: C, namespace: impl Into<String>) -> Self {
        Self {
            channel,
            namespace: namespace.into(),
            subscriptions: HashMap::new(),
            streams: StreamMap::new(),
            pending: VecDeque::new(),
            waker: None,
        }
    }

    /// Creates the multiplexer and runs the first query set right away.
    pub fn start(channel: C, namespace: impl Into<String>, queries: &[TopicQuery]) -> Self {
        let mut multiplexer = Self::new(channel, namespace);
        multiplexer.run(queries);
        multiplexer
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn open_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    /// Topics with an open subscription, sorted.
    pub fn subscribed_paths(&self) -> Vec<&str> {
        let mut paths = self
            .subscriptions
            .keys()
            .map(|key| key.path.as_str())
            .collect::<Vec<_>>();
        paths.sort_unstable();
        paths
    }

    /// Reconciles open subscriptions with `queries`.
    #[tracing::instrument(skip_all, fields(namespace = %self.namespace))]
    pub fn run(&mut self, queries: &[TopicQuery]) -> ReconcileOutcome {
        let desired = desired_subscriptions(&self.namespace, queries);
        let plan = ReconcilePlan::new(self.subscriptions.keys(), desired);

        debug!(
            "Reconciling {} queries: {} to close, {} to open, {} kept",
            queries.len(),
            plan.to_close.len(),
            plan.to_open.len(),
            plan.to_retag.len()
        );

        let mut outcome = ReconcileOutcome::default();

        for key in plan.to_close {
            if let Some(result) = self.close_subscription(&key) {
                outcome.closed += 1;
                if let Err(e) = result {
                    outcome.failures.push(e);
                }
            }
        }

        for (key, query_ids) in plan.to_retag {
            if let Some(subscription) = self.subscriptions.get_mut(&key) {
                subscription.query_ids = query_ids;
            }
        }

        for (key, desired) in plan.to_open {
            if self.open_subscription(key, desired) {
                outcome.opened += 1;
            }
        }

        if let Some(waker) = self.waker.take() {
            waker.wake();
        }

        outcome
    }

    fn open_subscription(&mut self, key: SubscriptionKey, desired: DesiredSubscription) -> bool {
        let DesiredSubscription { address, query_ids } = desired;

        match self.channel.open(&address) {
            Ok(LiveSubscription { handle, frames }) => {
                info!("Opened subscription {} for queries {:?}", address, query_ids);

                let events = frames
                    .map(|result| match result {
                        Ok(frame) => SubscriptionEvent::Frame(frame),
                        Err(error) => SubscriptionEvent::Failed(error),
                    })
                    .chain(tokio_stream::once(SubscriptionEvent::Ended));

                self.streams.insert(key.clone(), Box::pin(events));
                self.subscriptions.insert(
                    key,
                    ActiveSubscription {
                        handle,
                        address,
                        query_ids,
                    },
                );
                true
            }
            Err(e) => {
                let error = SubscriptionError::from(e);
                error!("Error while opening subscription {}: {}", address, error);

                for query_id in query_ids {
                    self.pending
                        .push_back(TaggedFrame::error(query_id, error.clone()));
                }
                false
            }
        }
    }

    /// Removes the subscription and closes its handle. `None` if nothing was
    /// open under `key`.
    fn close_subscription(
        &mut self,
        key: &SubscriptionKey,
    ) -> Option<Result<(), ReconciliationError>> {
        let subscription = self.subscriptions.remove(key)?;
        self.streams.remove(key);

        info!("Closing subscription {}", subscription.address);

        let address = subscription.address;
        let result = self
            .channel
            .close(subscription.handle)
            .map_err(|error| ReconciliationError::Close { address, error });

        if let Err(e) = &result {
            error!("{e}");
        }

        Some(result)
    }

    fn handle_event(&mut self, key: SubscriptionKey, event: SubscriptionEvent) {
        match event {
            SubscriptionEvent::Frame(frame) => {
                let Some(subscription) = self.subscriptions.get(&key) else {
                    return;
                };

                for query_id in &subscription.query_ids {
                    self.pending
                        .push_back(TaggedFrame::data(query_id.clone(), frame.clone()));
                }
            }
            SubscriptionEvent::Failed(error) => {
                if let Some(subscription) = self.subscriptions.get(&key) {
                    warn!("Subscription {} failed: {}", subscription.address, error);

                    for query_id in &subscription.query_ids {
                        self.pending
                            .push_back(TaggedFrame::error(query_id.clone(), error.clone()));
                    }
                }
                self.close_subscription(&key);
            }
            SubscriptionEvent::Ended => {
                debug!("Subscription for topic '{}' ended", key.path);
                self.close_subscription(&key);
            }
        }
    }
}

impl<C: LiveChannel + Unpin> Stream for StreamMultiplexer<C> {
    type Item = TaggedFrame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(frame) = this.pending.pop_front() {
                return Poll::Ready(Some(frame));
            }

            if this.streams.is_empty() {
                this.waker = Some(cx.waker().clone());
                return Poll::Pending;
            }

            match Pin::new(&mut this.streams).poll_next(cx) {
                Poll::Ready(Some((key, event))) => this.handle_event(key, event),
                Poll::Ready(None) | Poll::Pending => {
                    this.waker = Some(cx.waker().clone());
                    return Poll::Pending;
                }
            }
        }
    }
}

impl<C: LiveChannel> Drop for StreamMultiplexer<C> {
    fn drop(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }

        debug!(
            "Output stream for namespace '{}' closed, closing {} subscriptions",
            self.namespace,
            self.subscriptions.len()
        );

        let keys = self.subscriptions.keys().cloned().collect::<Vec<_>>();
        for key in keys {
            self.close_subscription(&key);
        }
    }
}
