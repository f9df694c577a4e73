use crate::error::SubscriptionError;
use crate::live_channel::Frame;

/// Frame on the multiplexed output, tagged with the query it was produced for.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedFrame {
    pub query_id: String,
    pub payload: FramePayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FramePayload {
    Data(Frame),
    Error(SubscriptionError),
}

impl TaggedFrame {
    pub fn data(query_id: impl Into<String>, frame: Frame) -> Self {
        Self {
            query_id: query_id.into(),
            payload: FramePayload::Data(frame),
        }
    }

    pub fn error(query_id: impl Into<String>, error: SubscriptionError) -> Self {
        Self {
            query_id: query_id.into(),
            payload: FramePayload::Error(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.payload, FramePayload::Error(_))
    }
}
