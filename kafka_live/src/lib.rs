#![allow(clippy::too_many_arguments)]

pub mod connection_config;
pub mod consumer;
pub mod error;
pub mod health;
pub mod kafka_channel;
pub mod live_channel;
pub mod multiplexer;
pub mod queries;
