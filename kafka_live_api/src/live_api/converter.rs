use crate::live_api::proto;
use crate::live_api::proto::{
    field_dto, tagged_frame_dto, FieldDto, FrameDto, SubscriptionErrorDto, TaggedFrameDto,
    TopicQueryDto,
};
use crate::time_util::ProtoTimestampConvert;
use anyhow::{bail, Context};
use kafka_live::connection_config::{ConnectionConfig, DataSourceInstanceSettings};
use kafka_live::health::{HealthCheckResult, HealthStatus};
use kafka_live::live_channel::{Field, FieldValue, Frame};
use kafka_live::multiplexer::{FramePayload, TaggedFrame};
use kafka_live::queries::TopicQuery;
use std::collections::HashMap;

pub fn proto_queries_to_internal(
    queries: Vec<TopicQueryDto>,
) -> Result<Vec<TopicQuery>, anyhow::Error> {
    queries
        .into_iter()
        .map(proto_query_to_internal)
        .collect::<Result<Vec<_>, _>>()
}

fn proto_query_to_internal(model: TopicQueryDto) -> Result<TopicQuery, anyhow::Error> {
    if model.id.is_empty() {
        bail!("Query id can't be empty")
    }

    let mut query = TopicQuery::new(model.id, model.topic_name).hidden(model.hide);

    if !model.metadata_json.trim().is_empty() {
        let metadata: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(&model.metadata_json)
                .with_context(|| format!("While parsing metadata of query {}", query.id()))?;

        for (key, value) in metadata {
            query = query.with_metadata(key, value);
        }
    }

    Ok(query)
}

pub fn tagged_frame_to_proto_response(frame: TaggedFrame) -> TaggedFrameDto {
    let payload = match frame.payload {
        FramePayload::Data(data) => tagged_frame_dto::Payload::Frame(frame_to_proto(data)),
        FramePayload::Error(error) => tagged_frame_dto::Payload::Error(SubscriptionErrorDto {
            message: error.message,
        }),
    };

    TaggedFrameDto {
        query_id: frame.query_id,
        payload: Some(payload),
    }
}

fn frame_to_proto(frame: Frame) -> FrameDto {
    FrameDto {
        name: frame.name,
        fields: frame.fields.into_iter().map(field_to_proto).collect(),
    }
}

fn field_to_proto(field: Field) -> FieldDto {
    let value = match field.value {
        FieldValue::Time(time) => field_dto::Value::TimeValue(time.to_proto_timestamp()),
        FieldValue::Int32(value) => field_dto::Value::Int32Value(value),
        FieldValue::Int64(value) => field_dto::Value::Int64Value(value),
        FieldValue::Float64(value) => field_dto::Value::Float64Value(value),
        FieldValue::Bool(value) => field_dto::Value::BoolValue(value),
        FieldValue::String(value) => field_dto::Value::StringValue(value),
    };

    FieldDto {
        name: field.name,
        value: Some(value),
    }
}

pub fn proto_validate_settings_to_internal(
    model: proto::ValidateSettingsRequest,
) -> Result<DataSourceInstanceSettings, anyhow::Error> {
    let json_data = if model.json_data.trim().is_empty() {
        serde_json::Value::Object(Default::default())
    } else {
        serde_json::from_str(&model.json_data).context("While parsing json_data")?
    };

    Ok(DataSourceInstanceSettings {
        uid: String::new(),
        json_data,
        secure_json_data: model.secure_json_data,
    })
}

/// Settings echoed back to the editing surface. Secrets only appear as flags.
pub fn connection_config_to_proto_response(
    config: &ConnectionConfig,
) -> Result<proto::ValidateSettingsResponse, anyhow::Error> {
    let json_data =
        serde_json::to_string(&config.json_data()).context("While serializing json_data")?;
    let secure_json_fields: HashMap<String, bool> = config.secure_json_fields();

    Ok(proto::ValidateSettingsResponse {
        json_data,
        secure_json_fields,
    })
}

pub fn health_check_to_proto_response(result: HealthCheckResult) -> proto::CheckHealthResponse {
    let status = match result.status {
        HealthStatus::Ok => proto::HealthStatus::Ok,
        HealthStatus::Error => proto::HealthStatus::Error,
    };

    proto::CheckHealthResponse {
        status: status.into(),
        message: result.message,
    }
}
