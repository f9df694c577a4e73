use crate::datasources::{DataSourceInstance, DataSourceRegistry};
use crate::error::ApplicationError;
use crate::live_api::proto::{
    CheckHealthRequest, CheckHealthResponse, StreamTopicsRequest, TaggedFrameDto,
    ValidateSettingsRequest, ValidateSettingsResponse,
};
use crate::live_api::{
    connection_config_to_proto_response, health_check_to_proto_response, proto,
    proto_queries_to_internal, proto_validate_settings_to_internal, run_multiplexer_to_channel,
    tagged_frame_to_proto_response,
};
use crate::util::StreamDataExtension;
use anyhow::anyhow;
use kafka_live::connection_config::ConnectionConfig;
use kafka_live::health::check_health;
use kafka_live::multiplexer::StreamMultiplexer;
use std::sync::Arc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status, Streaming};
use tracing::debug;

pub struct LiveService {
    datasources: DataSourceRegistry,
}

impl LiveService {
    pub fn new(datasources: DataSourceRegistry) -> Self {
        Self { datasources }
    }

    fn datasource(&self, uid: &str) -> Result<Arc<DataSourceInstance>, ApplicationError> {
        self.datasources
            .get(uid)
            .ok_or_else(|| ApplicationError::NotFound(anyhow!("Data source {uid} wasn't found")))
    }
}

#[tonic::async_trait]
impl proto::KafkaLiveService for LiveService {
    type StreamTopicsStream =
        Box<dyn Stream<Item = Result<TaggedFrameDto, Status>> + Send + Unpin>;

    #[tracing::instrument(skip_all)]
    async fn stream_topics(
        &self,
        request: Request<Streaming<StreamTopicsRequest>>,
    ) -> Result<Response<Self::StreamTopicsStream>, Status> {
        let mut requests = request.into_inner();

        let first_request = requests.message().await?.ok_or_else(|| {
            ApplicationError::InvalidArgument(anyhow!(
                "Query stream was closed before the first query set"
            ))
        })?;
        debug!("New request: {:?}", first_request);

        let datasource = self.datasource(&first_request.datasource_uid)?;
        let queries = proto_queries_to_internal(first_request.queries)
            .map_err(ApplicationError::InvalidArgument)?;

        debug!("Mapped queries: {:?}", queries);

        let multiplexer =
            StreamMultiplexer::start(datasource.channel.clone(), datasource.uid.clone(), &queries);

        let cancellation_token = CancellationToken::new();
        let guard = cancellation_token.clone().drop_guard();

        let rx = run_multiplexer_to_channel(multiplexer, requests, cancellation_token);

        let stream = ReceiverStream::new(rx)
            .map(tagged_frame_to_proto_response)
            .map(Ok)
            .with_data(guard);

        Ok(Response::new(Box::new(stream)))
    }

    #[tracing::instrument(skip_all)]
    async fn check_health(
        &self,
        request: Request<CheckHealthRequest>,
    ) -> Result<Response<CheckHealthResponse>, Status> {
        let proto_request = request.into_inner();
        let datasource = self.datasource(&proto_request.datasource_uid)?;

        let result = check_health(&datasource.config).await;

        Ok(Response::new(health_check_to_proto_response(result)))
    }

    #[tracing::instrument(skip_all)]
    async fn validate_settings(
        &self,
        request: Request<ValidateSettingsRequest>,
    ) -> Result<Response<ValidateSettingsResponse>, Status> {
        let settings = proto_validate_settings_to_internal(request.into_inner())
            .map_err(ApplicationError::InvalidArgument)?;

        let config = ConnectionConfig::from_instance_settings(&settings)
            .map_err(|e| ApplicationError::InvalidArgument(e.into()))?;
        config
            .validate()
            .map_err(|e| ApplicationError::InvalidArgument(e.into()))?;

        let response =
            connection_config_to_proto_response(&config).map_err(ApplicationError::Internal)?;

        Ok(Response::new(response))
    }
}
