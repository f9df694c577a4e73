use crate::queries::TopicQuery;
use getset::{CopyGetters, Getters};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LiveChannelScope {
    DataSource,
}

impl Display for LiveChannelScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LiveChannelScope::DataSource => write!(f, "datasource"),
        }
    }
}

/// Where a subscription points: a topic of one configured data source, plus
/// the query that asked for it.
#[derive(Debug, Clone, PartialEq, Getters, CopyGetters)]
pub struct LiveChannelAddress {
    #[getset(get_copy = "pub")]
    scope: LiveChannelScope,
    #[getset(get = "pub")]
    namespace: String,
    #[getset(get = "pub")]
    path: String,
    #[getset(get = "pub")]
    data: serde_json::Value,
}

/// Part of an address that identifies a subscription. `data` is excluded,
/// edits to other query fields don't resubscribe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    pub scope: LiveChannelScope,
    pub namespace: String,
    pub path: String,
}

impl LiveChannelAddress {
    pub fn for_query(namespace: &str, query: &TopicQuery) -> Self {
        Self {
            scope: LiveChannelScope::DataSource,
            namespace: namespace.to_owned(),
            path: query.topic_name().to_owned(),
            data: query.to_json(),
        }
    }

    pub fn key(&self) -> SubscriptionKey {
        SubscriptionKey {
            scope: self.scope,
            namespace: self.namespace.clone(),
            path: self.path.clone(),
        }
    }
}

impl Display for LiveChannelAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.scope, self.namespace, self.path)
    }
}
