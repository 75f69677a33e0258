//! The OpsWorks API packs type-specific layer settings into a flat
//! `map<string, string>`. Each layer type declares a table of
//! [`LayerAttribute`]s describing how its first-class settings map onto that
//! bag; [`AttributeTable`] does the encoding in both directions.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::LayerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    String,
    Int,
    Bool,
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Int => write!(f, "int"),
            Self::Bool => write!(f, "bool"),
        }
    }
}

/// A typed attribute value as held in configuration and state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl AttrValue {
    pub fn kind(&self) -> AttrKind {
        match self {
            Self::Bool(_) => AttrKind::Bool,
            Self::Int(_) => AttrKind::Int,
            Self::String(_) => AttrKind::String,
        }
    }

    fn zero(kind: AttrKind) -> Self {
        match kind {
            AttrKind::String => Self::String(String::new()),
            AttrKind::Int => Self::Int(0),
            AttrKind::Bool => Self::Bool(false),
        }
    }

    /// The wire form used in the API attribute map.
    pub fn encode(&self) -> String {
        match self {
            Self::Bool(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::String(v) => v.clone(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Attribute values keyed by their configuration name.
pub type Attributes = BTreeMap<String, AttrValue>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttrDefault {
    Str(&'static str),
    Int(i64),
    Bool(bool),
}

impl AttrDefault {
    pub fn to_value(self) -> AttrValue {
        match self {
            Self::Str(v) => AttrValue::String(v.to_string()),
            Self::Int(v) => AttrValue::Int(v),
            Self::Bool(v) => AttrValue::Bool(v),
        }
    }
}

/// One row of a layer type's attribute table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerAttribute {
    pub key: &'static str,
    pub api_name: &'static str,
    pub kind: AttrKind,
    pub default: Option<AttrDefault>,
    pub required: bool,
    pub force_new: bool,
    /// The API returns placeholder values for these, so they are never read
    /// back into state.
    pub write_only: bool,
}

impl LayerAttribute {
    const fn new(key: &'static str, api_name: &'static str, kind: AttrKind) -> Self {
        Self {
            key,
            api_name,
            kind,
            default: None,
            required: false,
            force_new: false,
            write_only: false,
        }
    }

    pub const fn string(key: &'static str, api_name: &'static str) -> Self {
        Self::new(key, api_name, AttrKind::String)
    }

    pub const fn int(key: &'static str, api_name: &'static str) -> Self {
        Self::new(key, api_name, AttrKind::Int)
    }

    pub const fn bool(key: &'static str, api_name: &'static str) -> Self {
        Self::new(key, api_name, AttrKind::Bool)
    }

    pub const fn default_str(mut self, value: &'static str) -> Self {
        self.default = Some(AttrDefault::Str(value));
        self
    }

    pub const fn default_int(mut self, value: i64) -> Self {
        self.default = Some(AttrDefault::Int(value));
        self
    }

    pub const fn default_bool(mut self, value: bool) -> Self {
        self.default = Some(AttrDefault::Bool(value));
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub const fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    /// Parse a raw command-line value according to this attribute's kind.
    pub fn parse(&self, raw: &str) -> Result<AttrValue, LayerError> {
        let invalid = || LayerError::InvalidValue {
            key: self.key.to_string(),
            expected: self.kind,
            value: raw.to_string(),
        };
        match self.kind {
            AttrKind::String => Ok(AttrValue::String(raw.to_string())),
            AttrKind::Int => raw.parse().map(AttrValue::Int).map_err(|_| invalid()),
            AttrKind::Bool => raw.parse().map(AttrValue::Bool).map_err(|_| invalid()),
        }
    }

    /// Decode the API's string form. `None` means the value is unset in state.
    fn decode(&self, raw: &str) -> Option<AttrValue> {
        match self.kind {
            AttrKind::String => Some(AttrValue::String(raw.to_string())),
            AttrKind::Int => raw.parse().ok().map(AttrValue::Int),
            AttrKind::Bool => Some(AttrValue::Bool(raw != "false")),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AttributeTable {
    layer: &'static str,
    rows: &'static [LayerAttribute],
}

impl AttributeTable {
    pub const fn new(layer: &'static str, rows: &'static [LayerAttribute]) -> Self {
        Self { layer, rows }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static LayerAttribute> {
        self.rows.iter()
    }

    pub fn get(&self, key: &str) -> Option<&'static LayerAttribute> {
        self.rows.iter().find(|row| row.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Parse a raw `key=value` style setting against the row for `key`.
    pub fn parse(&self, key: &str, raw: &str) -> Result<AttrValue, LayerError> {
        let row = self.get(key).ok_or_else(|| LayerError::UnknownAttribute {
            layer: self.layer.to_string(),
            key: key.to_string(),
        })?;
        row.parse(raw)
    }

    /// Build the API attribute map. Every row is emitted: the configured
    /// value, else the row default, else the zero value of its kind.
    pub fn encode(&self, values: &Attributes) -> Result<BTreeMap<String, String>, LayerError> {
        if let Some(key) = values.keys().find(|key| self.get(key).is_none()) {
            return Err(LayerError::UnknownAttribute {
                layer: self.layer.to_string(),
                key: key.clone(),
            });
        }

        let mut encoded = BTreeMap::new();
        for row in self.rows {
            let value = match values.get(row.key) {
                Some(value) if value.kind() != row.kind => {
                    return Err(LayerError::AttributeType {
                        key: row.key.to_string(),
                        expected: row.kind,
                        found: value.kind(),
                    });
                }
                Some(value) => value.clone(),
                None if row.required => {
                    return Err(LayerError::MissingAttribute {
                        key: row.key.to_string(),
                    });
                }
                None => row
                    .default
                    .map(AttrDefault::to_value)
                    .unwrap_or_else(|| AttrValue::zero(row.kind)),
            };
            encoded.insert(row.api_name.to_string(), value.encode());
        }

        Ok(encoded)
    }

    /// Map the API attribute bag back into typed values. Write-only rows keep
    /// whatever `prior` held for them.
    pub fn decode(&self, api: &BTreeMap<String, String>, prior: &Attributes) -> Attributes {
        let mut decoded = Attributes::new();
        for row in self.rows {
            let value = if row.write_only {
                prior.get(row.key).cloned()
            } else {
                api.get(row.api_name).and_then(|raw| row.decode(raw))
            };
            if let Some(value) = value {
                decoded.insert(row.key.to_string(), value);
            }
        }
        decoded
    }

    /// Keys whose values differ between two attribute sets, defaults applied.
    pub fn changed_keys(&self, before: &Attributes, after: &Attributes) -> Vec<&'static str> {
        self.rows
            .iter()
            .filter(|row| {
                let resolve = |values: &Attributes| {
                    values
                        .get(row.key)
                        .cloned()
                        .or_else(|| row.default.map(AttrDefault::to_value))
                };
                resolve(before) != resolve(after)
            })
            .map(|row| row.key)
            .collect()
    }
}
