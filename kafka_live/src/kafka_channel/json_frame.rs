use crate::live_channel::{FieldValue, Frame};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::warn;

pub const FRAME_NAME: &str = "response";
pub const EVENT_TIME_FIELD: &str = "_eventtime";
pub const PARTITION_FIELD: &str = "_partition";
pub const OFFSET_FIELD: &str = "_offset";

#[derive(Debug, Copy, Clone)]
pub struct RecordMetadata {
    pub timestamp: DateTime<Utc>,
    pub partition: i32,
    pub offset: i64,
}

/// Builds a frame from a record whose value is a json object. Nested objects
/// are flattened into dotted field names, keys sorted at every level.
pub fn record_to_frame(metadata: RecordMetadata, payload: &[u8]) -> Result<Frame, anyhow::Error> {
    let object: Map<String, Value> =
        serde_json::from_slice(payload).context("While parsing record value as json object")?;

    let mut frame = Frame::new(FRAME_NAME);
    frame.push(EVENT_TIME_FIELD, FieldValue::Time(metadata.timestamp));
    frame.push(PARTITION_FIELD, FieldValue::Int32(metadata.partition));
    frame.push(OFFSET_FIELD, FieldValue::Int64(metadata.offset));

    flatten_json("", &object, &mut frame);

    Ok(frame)
}

fn flatten_json(prefix: &str, object: &Map<String, Value>, frame: &mut Frame) {
    let mut keys = object.keys().collect::<Vec<_>>();
    keys.sort();

    for key in keys {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match &object[key] {
            Value::Number(number) => match number.as_f64() {
                Some(value) => frame.push(full_key, FieldValue::Float64(value)),
                None => warn!("Ignoring number out of range. Key: {}", full_key),
            },
            Value::String(value) => frame.push(full_key, FieldValue::String(value.clone())),
            Value::Bool(value) => frame.push(full_key, FieldValue::Bool(*value)),
            Value::Array(_) => {
                let text = object[key].to_string();
                frame.push(full_key, FieldValue::String(text))
            }
            Value::Object(nested) => flatten_json(&full_key, nested, frame),
            Value::Null => warn!("Ignoring unsupported data type. Key: {}", full_key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> RecordMetadata {
        RecordMetadata {
            timestamp: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
            partition: 3,
            offset: 42,
        }
    }

    fn names(frame: &Frame) -> Vec<&str> {
        frame.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn record_fields_come_first() {
        let frame = record_to_frame(metadata(), br#"{"value": 1}"#).unwrap();

        assert_eq!(frame.name, FRAME_NAME);
        assert_eq!(names(&frame), vec!["_eventtime", "_partition", "_offset", "value"]);
        assert_eq!(frame.field(PARTITION_FIELD), Some(&FieldValue::Int32(3)));
        assert_eq!(frame.field(OFFSET_FIELD), Some(&FieldValue::Int64(42)));
        assert_eq!(
            frame.field(EVENT_TIME_FIELD),
            Some(&FieldValue::Time(metadata().timestamp))
        );
    }

    #[test]
    fn nested_objects_are_flattened_with_sorted_keys() {
        let payload = br#"{
            "temperature": 21.5,
            "device": {"name": "sensor-1", "online": true, "location": {"floor": 2}},
            "tags": ["a", "b"],
            "note": null
        }"#;

        let frame = record_to_frame(metadata(), payload).unwrap();

        assert_eq!(
            names(&frame)[3..],
            [
                "device.location.floor",
                "device.name",
                "device.online",
                "tags",
                "temperature"
            ]
        );
        assert_eq!(
            frame.field("device.location.floor"),
            Some(&FieldValue::Float64(2.0))
        );
        assert_eq!(
            frame.field("device.name"),
            Some(&FieldValue::String("sensor-1".to_owned()))
        );
        assert_eq!(frame.field("device.online"), Some(&FieldValue::Bool(true)));
        assert_eq!(
            frame.field("tags"),
            Some(&FieldValue::String(r#"["a","b"]"#.to_owned()))
        );
        assert_eq!(frame.field("note"), None);
    }

    #[test]
    fn non_json_values_are_rejected() {
        assert!(record_to_frame(metadata(), b"plain text").is_err());
        assert!(record_to_frame(metadata(), b"[1, 2, 3]").is_err());
    }
}
