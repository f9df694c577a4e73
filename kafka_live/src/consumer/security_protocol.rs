use crate::connection_config::{AuthType, ConnectionConfig};
use std::fmt::{Debug, Display, Formatter};

#[derive(Debug, Clone)]
pub enum SecurityProtocol {
    Plaintext,
    Ssl,
    SaslPlaintext(ScramCredentials),
    SaslSsl(ScramCredentials),
}

#[derive(Clone)]
pub struct ScramCredentials {
    pub mechanism: AuthType,
    pub username: String,
    pub(crate) password: String,
}

impl Debug for ScramCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScramCredentials")
            .field("mechanism", &self.mechanism)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl SecurityProtocol {
    pub fn credentials(&self) -> Option<&ScramCredentials> {
        match self {
            SecurityProtocol::Plaintext | SecurityProtocol::Ssl => None,
            SecurityProtocol::SaslPlaintext(credentials)
            | SecurityProtocol::SaslSsl(credentials) => Some(credentials),
        }
    }

    pub fn uses_tls(&self) -> bool {
        matches!(self, SecurityProtocol::Ssl | SecurityProtocol::SaslSsl(_))
    }
}

impl From<&ConnectionConfig> for SecurityProtocol {
    fn from(value: &ConnectionConfig) -> Self {
        let credentials = value
            .scram_credentials()
            .map(|(username, password)| ScramCredentials {
                mechanism: value.auth_type(),
                username: username.to_owned(),
                password: password.to_owned(),
            });

        match (credentials, value.use_tls()) {
            (None, false) => SecurityProtocol::Plaintext,
            (None, true) => SecurityProtocol::Ssl,
            (Some(credentials), false) => SecurityProtocol::SaslPlaintext(credentials),
            (Some(credentials), true) => SecurityProtocol::SaslSsl(credentials),
        }
    }
}

impl Display for SecurityProtocol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SecurityProtocol::Plaintext => write!(f, "plaintext"),
            SecurityProtocol::Ssl => write!(f, "ssl"),
            SecurityProtocol::SaslPlaintext(_) => write!(f, "sasl_plaintext"),
            SecurityProtocol::SaslSsl(_) => write!(f, "sasl_ssl"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection_config::{ConnectionJsonData, Secret};

    fn config(authtype: AuthType, usetls: bool) -> ConnectionConfig {
        ConnectionConfig::new(
            ConnectionJsonData {
                bootstrapservers: "localhost:9092".to_owned(),
                clientid: "c".to_owned(),
                groupid: "g".to_owned(),
                authtype,
                username: "operator".to_owned(),
                usetls,
            },
            Secret::new("hunter2"),
        )
    }

    #[test]
    fn picks_protocol_from_auth_and_tls() {
        assert_eq!(
            SecurityProtocol::from(&config(AuthType::None, false)).to_string(),
            "plaintext"
        );
        assert_eq!(
            SecurityProtocol::from(&config(AuthType::None, true)).to_string(),
            "ssl"
        );
        assert_eq!(
            SecurityProtocol::from(&config(AuthType::ScramSha256, false)).to_string(),
            "sasl_plaintext"
        );
        assert_eq!(
            SecurityProtocol::from(&config(AuthType::ScramSha512, true)).to_string(),
            "sasl_ssl"
        );
    }

    #[test]
    fn credentials_carry_mechanism_and_hide_password() {
        let protocol = SecurityProtocol::from(&config(AuthType::ScramSha512, true));

        let credentials = protocol.credentials().unwrap();
        assert_eq!(credentials.mechanism, AuthType::ScramSha512);
        assert_eq!(credentials.password, "hunter2");
        assert!(!format!("{protocol:?}").contains("hunter2"));
    }
}
