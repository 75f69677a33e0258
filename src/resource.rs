use serde::{Deserialize, Serialize};

/// A remote object as observed through a `read` call.
///
/// Only `id`, `status` and `errors` are interpreted by the poller; everything
/// else the endpoint returns is kept verbatim in `properties` for the service
/// adapters to map back into state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RemoteResource {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub errors: Vec<ResourceError>,
    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// A sub-error record attached to a remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResourceError {
    #[serde(rename = "error_code", default)]
    pub code: String,
    #[serde(rename = "error_message", default)]
    pub message: String,
}

impl std::fmt::Display for ResourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl RemoteResource {
    pub fn new(id: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: status.into(),
            errors: Vec::new(),
            properties: serde_json::Map::new(),
        }
    }

    pub fn with_error(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors.push(ResourceError {
            code: code.into(),
            message: message.into(),
        });
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// One message per attached sub-error.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(|v| v.as_str())
    }
}
