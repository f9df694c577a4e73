mod api;
mod converter;
mod session;

pub use api::*;
pub use converter::*;
pub use session::*;

pub mod proto {
    pub use kafka_live_service_server::*;
    tonic::include_proto!("kafka_live_api");

    pub(crate) const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("live_service_descriptor");
}
