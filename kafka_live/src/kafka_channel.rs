mod channel;
mod consume;
mod json_frame;

pub use channel::*;
pub use json_frame::*;
