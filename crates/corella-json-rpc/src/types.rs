use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Correlation id of a JSON-RPC request.
///
/// A string or a number. A JSON `null` id is treated the same as an absent
/// id: the envelope is a notification and no response is produced for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

impl RequestId {
    /// Reads an `id` member from a decoded request object.
    ///
    /// Returns `Ok(None)` for an absent or `null` id (notification), and
    /// `Err(())` for an id of any non-scalar JSON type.
    pub fn from_value(value: Option<&Value>) -> Result<Option<RequestId>, ()> {
        match value {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(RequestId::String(s.clone()))),
            Some(Value::Number(n)) => n.as_i64().map(RequestId::Number).map(Some).ok_or(()),
            Some(_) => Err(()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RequestId::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RequestId::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{}", s),
            RequestId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

/// The protocol version tag. Only `"2.0"` exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    #[default]
    V2,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        crate::JSONRPC_VERSION
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s == crate::JSONRPC_VERSION {
            Ok(Version::V2)
        } else {
            Err(serde::de::Error::custom(format!(
                "invalid JSON-RPC version: {}",
                s
            )))
        }
    }
}
