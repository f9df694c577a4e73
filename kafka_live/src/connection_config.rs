mod auth_type;
mod instance_settings;
mod secret;

pub use auth_type::*;
pub use instance_settings::*;
pub use secret::*;

use crate::error::ConfigurationError;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const PASSWORD_SECURE_KEY: &str = "password";

/// How to reach a broker cluster. Built once per data source instance and
/// handed opaquely to the live channel.
#[derive(Debug, Clone, Getters, CopyGetters)]
pub struct ConnectionConfig {
    #[getset(get = "pub")]
    bootstrap_servers: String,
    #[getset(get = "pub")]
    client_id: String,
    #[getset(get = "pub")]
    group_id: String,
    #[getset(get_copy = "pub")]
    auth_type: AuthType,
    #[getset(get = "pub")]
    username: String,
    password: Secret,
    #[getset(get_copy = "pub")]
    use_tls: bool,
}

/// Non-secret part of the settings, as persisted by the dashboard.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionJsonData {
    #[serde(default)]
    pub bootstrapservers: String,
    #[serde(default)]
    pub clientid: String,
    #[serde(default)]
    pub groupid: String,
    #[serde(default)]
    pub authtype: AuthType,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub usetls: bool,
}

impl ConnectionConfig {
    pub fn new(json_data: ConnectionJsonData, password: Secret) -> Self {
        Self {
            bootstrap_servers: json_data.bootstrapservers,
            client_id: json_data.clientid,
            group_id: json_data.groupid,
            auth_type: json_data.authtype,
            username: json_data.username,
            password,
            use_tls: json_data.usetls,
        }
    }

    pub fn from_instance_settings(
        settings: &DataSourceInstanceSettings,
    ) -> Result<Self, ConfigurationError> {
        let json_data: ConnectionJsonData = serde_json::from_value(settings.json_data.clone())?;
        let password = Secret::from_secure_json_data(&settings.secure_json_data, PASSWORD_SECURE_KEY);

        Ok(Self::new(json_data, password))
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let required = [
            ("bootstrapservers", &self.bootstrap_servers),
            ("clientid", &self.client_id),
            ("groupid", &self.group_id),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigurationError::MissingField { field });
            }
        }

        Ok(())
    }

    pub fn brokers(&self) -> Vec<String> {
        self.bootstrap_servers
            .split(',')
            .map(str::trim)
            .filter(|broker| !broker.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Credentials for SASL, `None` when the auth type disables them.
    pub(crate) fn scram_credentials(&self) -> Option<(&str, &str)> {
        if self.auth_type == AuthType::None {
            return None;
        }

        Some((
            self.username.as_str(),
            self.password.expose().unwrap_or_default(),
        ))
    }

    pub fn json_data(&self) -> ConnectionJsonData {
        ConnectionJsonData {
            bootstrapservers: self.bootstrap_servers.clone(),
            clientid: self.client_id.clone(),
            groupid: self.group_id.clone(),
            authtype: self.auth_type,
            username: self.username.clone(),
            usetls: self.use_tls,
        }
    }

    /// Which secrets are stored, without their values.
    pub fn secure_json_fields(&self) -> HashMap<String, bool> {
        HashMap::from([(
            PASSWORD_SECURE_KEY.to_owned(),
            self.password.is_configured(),
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(json_data: serde_json::Value, password: Option<&str>) -> DataSourceInstanceSettings {
        let secure_json_data = password
            .map(|p| HashMap::from([(PASSWORD_SECURE_KEY.to_owned(), p.to_owned())]))
            .unwrap_or_default();

        DataSourceInstanceSettings {
            uid: "ds-1".to_owned(),
            json_data,
            secure_json_data,
        }
    }

    #[test]
    fn parses_persisted_settings() {
        let settings = settings(
            json!({
                "bootstrapservers": "broker-1:9092, broker-2:9092",
                "clientid": "dashboards",
                "groupid": "dashboards-group",
                "authtype": "SCRAM-SHA-512",
                "username": "operator",
                "usetls": true
            }),
            Some("hunter2"),
        );

        let config = ConnectionConfig::from_instance_settings(&settings).unwrap();

        assert_eq!(config.brokers(), vec!["broker-1:9092", "broker-2:9092"]);
        assert_eq!(config.client_id(), "dashboards");
        assert_eq!(config.group_id(), "dashboards-group");
        assert_eq!(config.auth_type(), AuthType::ScramSha512);
        assert!(config.use_tls());
        assert_eq!(config.scram_credentials(), Some(("operator", "hunter2")));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_optional_fields_take_defaults() {
        let settings = settings(
            json!({"bootstrapservers": "localhost:9092", "clientid": "c", "groupid": "g"}),
            None,
        );

        let config = ConnectionConfig::from_instance_settings(&settings).unwrap();

        assert_eq!(config.auth_type(), AuthType::None);
        assert!(!config.use_tls());
        assert_eq!(config.username(), "");
    }

    #[test]
    fn credentials_are_ignored_without_auth() {
        let settings = settings(
            json!({
                "bootstrapservers": "localhost:9092",
                "clientid": "c",
                "groupid": "g",
                "authtype": "none",
                "username": "left-over"
            }),
            Some("left-over-password"),
        );

        let config = ConnectionConfig::from_instance_settings(&settings).unwrap();

        assert_eq!(config.scram_credentials(), None);
    }

    #[test]
    fn rejects_empty_required_fields() {
        for (field, json_data) in [
            (
                "bootstrapservers",
                json!({"bootstrapservers": "  ", "clientid": "c", "groupid": "g"}),
            ),
            (
                "clientid",
                json!({"bootstrapservers": "localhost:9092", "groupid": "g"}),
            ),
            (
                "groupid",
                json!({"bootstrapservers": "localhost:9092", "clientid": "c", "groupid": ""}),
            ),
        ] {
            let config = ConnectionConfig::from_instance_settings(&settings(json_data, None)).unwrap();

            match config.validate() {
                Err(ConfigurationError::MissingField { field: missing }) => assert_eq!(missing, field),
                other => panic!("expected missing {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_malformed_settings() {
        let settings = settings(json!({"usetls": "yes please"}), None);

        let result = ConnectionConfig::from_instance_settings(&settings);

        assert!(matches!(result, Err(ConfigurationError::InvalidJson(_))));
    }

    #[test]
    fn password_is_reported_but_never_shown() {
        let settings = settings(
            json!({"bootstrapservers": "localhost:9092", "clientid": "c", "groupid": "g"}),
            Some("hunter2"),
        );

        let config = ConnectionConfig::from_instance_settings(&settings).unwrap();

        assert_eq!(config.secure_json_fields().get(PASSWORD_SECURE_KEY), Some(&true));
        assert!(!format!("{config:?}").contains("hunter2"));
        assert!(!serde_json::to_string(&config.json_data()).unwrap().contains("hunter2"));
    }
}
