use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

/// Topic name a new panel query starts with, before the operator types one.
pub const PLACEHOLDER_TOPIC_NAME: &str = "TOPIC_NAME";

/// One query row of a dashboard panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, CopyGetters)]
#[serde(rename_all = "camelCase")]
pub struct TopicQuery {
    #[serde(alias = "refId")]
    #[getset(get = "pub")]
    id: String,
    #[serde(default = "placeholder_topic_name")]
    #[getset(get = "pub")]
    topic_name: String,
    #[serde(default)]
    #[getset(get_copy = "pub")]
    hide: bool,
    /// Remaining query metadata, passed through to the live channel untouched.
    #[serde(flatten)]
    #[getset(get = "pub")]
    metadata: serde_json::Map<String, serde_json::Value>,
}

impl TopicQuery {
    pub fn new(id: impl Into<String>, topic_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            topic_name: topic_name.into(),
            hide: false,
            metadata: Default::default(),
        }
    }

    /// Query row as created by the panel, before any edit.
    pub fn with_default_topic(id: impl Into<String>) -> Self {
        Self::new(id, PLACEHOLDER_TOPIC_NAME)
    }

    pub fn hidden(mut self, hide: bool) -> Self {
        self.hide = hide;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Full query object as sent along with a subscription address.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn placeholder_topic_name() -> String {
    PLACEHOLDER_TOPIC_NAME.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_dashboard_query() {
        let query: TopicQuery = serde_json::from_value(json!({
            "refId": "A",
            "topicName": "orders",
            "hide": true,
            "datasource": {"uid": "ds-1"}
        }))
        .unwrap();

        assert_eq!(query.id(), "A");
        assert_eq!(query.topic_name(), "orders");
        assert!(query.hide());
        assert_eq!(query.metadata().get("datasource"), Some(&json!({"uid": "ds-1"})));
    }

    #[test]
    fn untouched_query_has_placeholder_topic() {
        let query: TopicQuery = serde_json::from_value(json!({"id": "A"})).unwrap();

        assert_eq!(query.topic_name(), PLACEHOLDER_TOPIC_NAME);
        assert!(!query.hide());
    }

    #[test]
    fn json_keeps_metadata() {
        let query = TopicQuery::new("A", "orders").with_metadata("intervalMs", json!(1000));

        assert_eq!(
            query.to_json(),
            json!({"id": "A", "topicName": "orders", "hide": false, "intervalMs": 1000})
        );
    }
}
