use std::collections::HashMap;
use std::fmt::{Debug, Formatter};

/// Write-only secret value. It can be set and checked for presence, only
/// this crate's broker client reads it back.
#[derive(Clone, Default)]
pub struct Secret(Option<String>);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    pub fn from_secure_json_data(secure_json_data: &HashMap<String, String>, key: &str) -> Self {
        Self(secure_json_data.get(key).cloned())
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.0 = Some(value.into());
    }

    pub fn is_configured(&self) -> bool {
        self.0.as_ref().is_some_and(|v| !v.is_empty())
    }

    pub(crate) fn expose(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl Debug for Secret {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_configured() {
            write!(f, "Secret(****)")
        } else {
            write!(f, "Secret(<empty>)")
        }
    }
}
