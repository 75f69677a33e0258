use thiserror::Error;

use super::attributes::AttrKind;

#[derive(Debug, Error)]
pub enum LayerError {
    #[error("unknown layer type: {0}")]
    UnknownLayerType(String),

    #[error("unsupported attribute '{key}' for {layer}")]
    UnknownAttribute { layer: String, key: String },

    #[error("attribute '{key}' expects a {expected} value, got {found}")]
    AttributeType {
        key: String,
        expected: AttrKind,
        found: AttrKind,
    },

    #[error("attribute '{key}' is not a valid {expected}: '{value}'")]
    InvalidValue {
        key: String,
        expected: AttrKind,
        value: String,
    },

    #[error("missing required attribute '{key}'")]
    MissingAttribute { key: String },

    #[error("custom_json contains invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}
