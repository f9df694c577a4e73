use crate::app_config::AppConfig;
use crate::datasources::DataSourceRegistry;
use crate::live_api;
use crate::live_api::LiveService;
use anyhow::Context;
use std::net::SocketAddr;
use tonic::transport::Server;
use tracing::info;

pub async fn run_until_stopped(config: AppConfig) -> Result<(), anyhow::Error> {
    let address: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("While parsing socket address")?;

    let datasources =
        DataSourceRegistry::from_settings(&config.datasources).context("While loading data sources")?;

    info!("Listening {address}, {} data sources configured", datasources.len());
    let reflection_service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(live_api::proto::FILE_DESCRIPTOR_SET)
        .build_v1alpha()
        .context("While building reflection service")?;

    Server::builder()
        .add_service(reflection_service)
        .add_service(live_api::proto::KafkaLiveServiceServer::new(
            LiveService::new(datasources),
        ))
        .serve(address)
        .await
        .context("While serving port")?;

    Ok(())
}
