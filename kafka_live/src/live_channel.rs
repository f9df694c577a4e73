mod address;
mod frame;

pub use address::*;
pub use frame::*;

use crate::error::SubscriptionError;
use std::pin::Pin;
use std::sync::Arc;
use tokio_stream::Stream;

/// Lazy, unbounded sequence of frames of one subscription.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame, SubscriptionError>> + Send>>;

/// Identity of an open subscription, issued by the live channel.
/// Not `Clone`: closing consumes it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

pub struct LiveSubscription {
    pub handle: SubscriptionHandle,
    pub frames: FrameStream,
}

/// Push-based transport that serves live addresses. The multiplexer only
/// talks to brokers through this.
pub trait LiveChannel: Send + Sync {
    fn open(&self, address: &LiveChannelAddress) -> Result<LiveSubscription, anyhow::Error>;

    fn close(&self, handle: SubscriptionHandle) -> Result<(), anyhow::Error>;
}

impl<T: LiveChannel + ?Sized> LiveChannel for Arc<T> {
    fn open(&self, address: &LiveChannelAddress) -> Result<LiveSubscription, anyhow::Error> {
        (**self).open(address)
    }

    fn close(&self, handle: SubscriptionHandle) -> Result<(), anyhow::Error> {
        (**self).close(handle)
    }
}
