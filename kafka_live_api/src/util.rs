mod stream_with_data;

pub use stream_with_data::*;
