use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthType {
    #[default]
    #[serde(rename = "none", alias = "")]
    None,
    #[serde(rename = "SCRAM-SHA-256")]
    ScramSha256,
    #[serde(rename = "SCRAM-SHA-512")]
    ScramSha512,
}

impl Display for AuthType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthType::None => write!(f, "none"),
            AuthType::ScramSha256 => write!(f, "SCRAM-SHA-256"),
            AuthType::ScramSha512 => write!(f, "SCRAM-SHA-512"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_auth_type_means_none() {
        let auth_type: AuthType = serde_json::from_str("\"\"").unwrap();

        assert_eq!(auth_type, AuthType::None);
    }

    #[test]
    fn display_matches_sasl_mechanism_names() {
        assert_eq!(AuthType::ScramSha256.to_string(), "SCRAM-SHA-256");
        assert_eq!(AuthType::ScramSha512.to_string(), "SCRAM-SHA-512");
    }
}
