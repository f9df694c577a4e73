mod consumer_wrapper;
mod security_protocol;

pub use consumer_wrapper::*;
pub use security_protocol::*;
