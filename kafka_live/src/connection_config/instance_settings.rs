use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

/// Settings of one configured data source instance as stored by the host
/// dashboard. `uid` is the namespace of every address opened for it.
#[derive(Clone, Deserialize)]
pub struct DataSourceInstanceSettings {
    pub uid: String,
    #[serde(default = "empty_json_object")]
    pub json_data: serde_json::Value,
    #[serde(default)]
    pub secure_json_data: HashMap<String, String>,
}

fn empty_json_object() -> serde_json::Value {
    serde_json::Value::Object(Default::default())
}

impl Debug for DataSourceInstanceSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut secure_keys = self.secure_json_data.keys().collect::<Vec<_>>();
        secure_keys.sort();

        f.debug_struct("DataSourceInstanceSettings")
            .field("uid", &self.uid)
            .field("json_data", &self.json_data)
            .field("secure_json_data", &secure_keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_secure_values() {
        let settings = DataSourceInstanceSettings {
            uid: "ds-1".to_owned(),
            json_data: empty_json_object(),
            secure_json_data: HashMap::from([("password".to_owned(), "hunter2".to_owned())]),
        };

        let debug = format!("{settings:?}");

        assert!(debug.contains("password"));
        assert!(!debug.contains("hunter2"));
    }
}
