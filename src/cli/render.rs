use serde::Serialize;
use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use tfwait::services::opsworks::{LayerType, SchemaAttribute};

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "FIELD")]
    field: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

#[derive(Tabled)]
struct LayerTypeRow {
    #[tabled(rename = "RESOURCE")]
    resource: String,
    #[tabled(rename = "API TYPE")]
    api_type: &'static str,
    #[tabled(rename = "DEFAULT NAME")]
    default_name: &'static str,
    #[tabled(rename = "ATTRIBUTES")]
    attributes: usize,
}

#[derive(Tabled)]
struct SchemaRow {
    #[tabled(rename = "NAME")]
    name: &'static str,
    #[tabled(rename = "TYPE")]
    kind: String,
    #[tabled(rename = "REQUIRED")]
    required: bool,
    #[tabled(rename = "DEFAULT")]
    default: String,
    #[tabled(rename = "FORCE NEW")]
    force_new: bool,
    #[tabled(rename = "COMPUTED")]
    computed: bool,
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Two-column view of any serializable state, one row per top-level field.
pub fn state_table<T: Serialize>(state: &T) -> serde_json::Result<String> {
    let rows: Vec<FieldRow> = match serde_json::to_value(state)? {
        Value::Object(fields) => fields
            .iter()
            .map(|(field, value)| FieldRow {
                field: field.clone(),
                value: cell(value),
            })
            .collect(),
        other => vec![FieldRow {
            field: "value".to_string(),
            value: cell(&other),
        }],
    };
    Ok(Table::new(rows).with(Style::sharp()).to_string())
}

pub fn layer_types_table(types: &[LayerType]) -> String {
    let rows = types.iter().map(|lt| LayerTypeRow {
        resource: lt.resource_name(),
        api_type: lt.type_name,
        default_name: lt.default_layer_name.unwrap_or("-"),
        attributes: lt.attributes.len(),
    });
    Table::new(rows).with(Style::sharp()).to_string()
}

pub fn schema_table(schema: &[SchemaAttribute]) -> String {
    let rows = schema.iter().map(|attr| SchemaRow {
        name: attr.name,
        kind: attr.kind.to_string(),
        required: attr.required,
        default: attr
            .default
            .map(|d| d.to_value().to_string())
            .unwrap_or_default(),
        force_new: attr.force_new,
        computed: attr.computed,
    });
    Table::new(rows).with(Style::sharp()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfwait::services::opsworks::{LAYER_TYPES, lookup};

    #[test]
    fn test_state_table_flattens_fields() {
        let state = serde_json::json!({
            "id": "int-1",
            "status": "active",
            "description": null,
            "tags": { "env": "prod" }
        });
        let table = state_table(&state).unwrap();
        assert!(table.contains("FIELD"));
        assert!(table.contains("int-1"));
        assert!(table.contains(r#"{"env":"prod"}"#));
    }

    #[test]
    fn test_layer_types_table_lists_every_type() {
        let table = layer_types_table(LAYER_TYPES);
        for lt in LAYER_TYPES {
            assert!(table.contains(&lt.resource_name()));
        }
    }

    #[test]
    fn test_schema_table_shows_defaults() {
        let schema = lookup("memcached").unwrap().schema();
        let table = schema_table(&schema);
        assert!(table.contains("allocated_memory"));
        assert!(table.contains("512"));
        assert!(table.contains("Memcached"));
    }
}
