use crate::live_channel::LiveChannelAddress;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Rejected data source settings. Surfaced to the editing surface at save time.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Required setting '{field}' is missing or empty")]
    MissingField { field: &'static str },

    #[error("Data source settings are not valid json: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Failure of a single live subscription. Cloneable so one failure can be
/// tagged onto every query sharing the subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionError {
    pub message: String,
}

impl SubscriptionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Display for SubscriptionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<anyhow::Error> for SubscriptionError {
    fn from(value: anyhow::Error) -> Self {
        Self {
            message: format!("{value:#}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ReconciliationError {
    #[error("Failed to close subscription for '{}' in namespace '{}': {error:#}", address.path(), address.namespace())]
    Close {
        address: LiveChannelAddress,
        error: anyhow::Error,
    },
}
