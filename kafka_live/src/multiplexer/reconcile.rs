use crate::error::ReconciliationError;
use crate::live_channel::{LiveChannelAddress, SubscriptionKey};
use crate::queries::{should_stream, TopicQuery};
use std::collections::{HashMap, HashSet};

/// Result of one `run` of the multiplexer.
#[derive(Debug, Default)]
pub struct ReconcileOutcome {
    pub opened: usize,
    pub closed: usize,
    pub failures: Vec<ReconciliationError>,
}

impl ReconcileOutcome {
    pub fn is_noop(&self) -> bool {
        self.opened == 0 && self.closed == 0
    }
}

#[derive(Debug)]
pub(crate) struct DesiredSubscription {
    pub address: LiveChannelAddress,
    pub query_ids: Vec<String>,
}

/// Changes needed to go from the open subscriptions to the desired ones.
/// Computed in full before anything is opened or closed.
#[derive(Debug, Default)]
pub(crate) struct ReconcilePlan {
    pub to_close: Vec<SubscriptionKey>,
    pub to_open: Vec<(SubscriptionKey, DesiredSubscription)>,
    pub to_retag: Vec<(SubscriptionKey, Vec<String>)>,
}

impl ReconcilePlan {
    pub fn new<'a>(
        open: impl IntoIterator<Item = &'a SubscriptionKey>,
        desired: Vec<(SubscriptionKey, DesiredSubscription)>,
    ) -> Self {
        let open = open.into_iter().collect::<HashSet<_>>();
        let desired_keys = desired.iter().map(|(key, _)| key).collect::<HashSet<_>>();

        let mut to_close = open
            .iter()
            .filter(|key| !desired_keys.contains(*key))
            .map(|key| (*key).clone())
            .collect::<Vec<_>>();
        to_close.sort_by(|a, b| a.path.cmp(&b.path));

        let mut plan = ReconcilePlan {
            to_close,
            ..Default::default()
        };

        for (key, subscription) in desired {
            if open.contains(&key) {
                plan.to_retag.push((key, subscription.query_ids));
            } else {
                plan.to_open.push((key, subscription));
            }
        }

        plan
    }
}

/// Groups streaming queries by address, keeping first-seen order. Queries
/// sharing a topic share one subscription.
pub(crate) fn desired_subscriptions(
    namespace: &str,
    queries: &[TopicQuery],
) -> Vec<(SubscriptionKey, DesiredSubscription)> {
    let mut desired: Vec<(SubscriptionKey, DesiredSubscription)> = vec![];
    let mut positions: HashMap<SubscriptionKey, usize> = HashMap::new();

    for query in queries.iter().filter(|query| should_stream(query)) {
        let address = LiveChannelAddress::for_query(namespace, query);
        let key = address.key();

        match positions.get(&key) {
            Some(&position) => {
                let query_ids: &mut Vec<String> = &mut desired[position].1.query_ids;
                if !query_ids.iter().any(|id| id == query.id()) {
                    query_ids.push(query.id().clone());
                }
            }
            None => {
                positions.insert(key.clone(), desired.len());
                desired.push((
                    key,
                    DesiredSubscription {
                        address,
                        query_ids: vec![query.id().clone()],
                    },
                ));
            }
        }
    }

    desired
}
