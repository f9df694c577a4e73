pub mod app_config;
pub mod datasources;
pub mod error;
pub mod live_api;
pub mod startup;
pub mod time_util;
pub mod util;
