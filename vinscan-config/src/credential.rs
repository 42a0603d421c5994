use std::fmt;

use serde::{Deserialize, Deserializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Shared record-store credential, wiped from memory on drop.
///
/// `Debug` never prints the value. Use [`ApiKey::expose`] only at the point
/// the key is handed to the HTTP client or compared by the server.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ApiKey {
    data: String,
}

impl ApiKey {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    pub fn expose(&self) -> &str {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data.is_empty() {
            f.write_str("ApiKey(<unset>)")
        } else {
            f.write_str("ApiKey(<redacted>)")
        }
    }
}

impl From<String> for ApiKey {
    fn from(data: String) -> Self {
        Self { data }
    }
}

impl From<&str> for ApiKey {
    fn from(data: &str) -> Self {
        Self::new(data)
    }
}

impl<'de> Deserialize<'de> for ApiKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}
