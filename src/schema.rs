//! Structural checks on shaped rows before they are written out.
//!
//! Rows are serialized to JSON objects and compared against a per-table list of
//! field rules. The first failing field (by name) of the first failing row is reported.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::table::ShapedElement;
use crate::errors::Result;

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Integer,
    Float,
    String,
}

impl FieldType {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::String => value.is_string(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::String => "string",
        }
    }
}

fn required_by_default() -> bool {
    true
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default = "required_by_default")]
    pub required: bool,
}

impl FieldRule {
    fn new(name: &str, field_type: FieldType) -> Self {
        FieldRule {
            name: name.to_string(),
            field_type,
            required: true,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct TableSchema {
    pub fields: Vec<FieldRule>,
}

impl TableSchema {
    fn of(fields: &[(&str, FieldType)]) -> Self {
        TableSchema {
            fields: fields.iter().map(|(name, field_type)| FieldRule::new(name, *field_type)).collect(),
        }
    }

    /// Errors keyed by field name. Empty when the row conforms.
    fn check(&self, row: &Value) -> BTreeMap<String, Vec<String>> {
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
        let Some(object) = row.as_object() else {
            errors.entry(String::new()).or_default().push("must be of dict type".to_string());
            return errors;
        };

        for rule in &self.fields {
            match object.get(&rule.name) {
                None if rule.required => {
                    errors.entry(rule.name.clone()).or_default().push("required field".to_string());
                }
                None => (),
                Some(value) if !rule.field_type.accepts(value) => {
                    errors.entry(rule.name.clone())
                        .or_default()
                        .push(format!("must be of {} type, got {}", rule.field_type.name(), value));
                }
                Some(_) => (),
            }
        }
        for name in object.keys() {
            if !self.fields.iter().any(|rule| &rule.name == name) {
                errors.entry(name.clone()).or_default().push("unknown field".to_string());
            }
        }
        errors
    }
}

/// A row that does not fit its table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub table: String,
    pub field: String,
    pub errors: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Element of type '{}' has the following errors in field '{}': {}",
            self.table,
            self.field,
            self.errors.join("; ")
        )
    }
}

impl std::error::Error for ValidationError {}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub node: TableSchema,
    pub node_tags: TableSchema,
    pub way: TableSchema,
    pub way_nodes: TableSchema,
    pub way_tags: TableSchema,
}

impl Default for Schema {
    fn default() -> Self {
        use FieldType::{Float, Integer, String};

        let tags = TableSchema::of(&[("id", Integer), ("key", String), ("value", String), ("type", String)]);
        Schema {
            node: TableSchema::of(&[
                ("id", Integer),
                ("lat", Float),
                ("lon", Float),
                ("user", String),
                ("uid", Integer),
                ("version", String),
                ("changeset", Integer),
                ("timestamp", String),
            ]),
            node_tags: tags.clone(),
            way: TableSchema::of(&[
                ("id", Integer),
                ("user", String),
                ("uid", Integer),
                ("version", String),
                ("changeset", Integer),
                ("timestamp", String),
            ]),
            way_nodes: TableSchema::of(&[("id", Integer), ("node_id", Integer), ("position", Integer)]),
            way_tags: tags,
        }
    }
}

impl Schema {
    pub fn load(path: &Path) -> Result<Schema> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    fn check_rows<T: Serialize>(table: &str, schema: &TableSchema, rows: &[T]) -> Result<()> {
        for row in rows {
            let value = serde_json::to_value(row)?;
            if let Some((field, errors)) = schema.check(&value).into_iter().next() {
                return Err(ValidationError {
                    table: table.to_string(),
                    field,
                    errors,
                }.into());
            }
        }
        Ok(())
    }

    /// Checks every row an element contributes.
    pub fn validate(&self, element: &ShapedElement) -> Result<()> {
        match element {
            ShapedElement::Point { point, tags } => {
                Self::check_rows("node", &self.node, std::slice::from_ref(point))?;
                Self::check_rows("node_tags", &self.node_tags, tags)
            }
            ShapedElement::Way { way, members, tags } => {
                Self::check_rows("way", &self.way, std::slice::from_ref(way))?;
                Self::check_rows("way_nodes", &self.way_nodes, members)?;
                Self::check_rows("way_tags", &self.way_tags, tags)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::tests::{raw_point, raw_way};
    use crate::shape::{shape_element, Shaped};

    fn shaped(element: &crate::data::osm::RawElement) -> ShapedElement {
        match shape_element(element).unwrap() {
            Shaped::Element(shaped) => shaped,
            Shaped::Skipped(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn shaped_elements_pass_default_schema() {
        let schema = Schema::default();
        let point = shaped(&raw_point(&[("addr:street", "Main St"), ("name", "Ünïcode")]));
        let way = shaped(&raw_way(&[("highway", "primary")], &["1", "2", "3"]));

        schema.validate(&point).unwrap();
        schema.validate(&way).unwrap();
    }

    #[test]
    fn non_finite_coordinate_fails() {
        let mut element = shaped(&raw_point(&[]));
        if let ShapedElement::Point { point, .. } = &mut element {
            point.lat = f64::NAN;
        }

        let err = Schema::default().validate(&element).unwrap_err();
        assert!(err.message.contains("'node'"), "{}", err.message);
        assert!(err.message.contains("'lat'"), "{}", err.message);
        assert!(err.message.contains("float"), "{}", err.message);
    }

    #[test]
    fn reports_missing_and_mistyped_fields() {
        let table = TableSchema::of(&[("id", FieldType::Integer), ("key", FieldType::String)]);
        let errors = table.check(&serde_json::json!({ "id": "7", "extra": 1 }));

        assert_eq!(errors["id"], vec!["must be of integer type, got \"7\""]);
        assert_eq!(errors["key"], vec!["required field"]);
        assert_eq!(errors["extra"], vec!["unknown field"]);
    }

    #[test]
    fn optional_fields_may_be_absent() {
        let schema: TableSchema = serde_json::from_str(
            r#"[{ "name": "id", "type": "integer" }, { "name": "note", "type": "string", "required": false }]"#,
        ).unwrap();

        assert!(schema.check(&serde_json::json!({ "id": 1 })).is_empty());
    }

    #[test]
    fn rejects_rows_against_stricter_schema() {
        let mut schema = Schema::default();
        schema.way_nodes.fields.push(FieldRule::new("role", FieldType::String));
        let way = shaped(&raw_way(&[], &["5"]));

        let err = schema.validate(&way).unwrap_err();
        assert!(err.message.contains("'way_nodes'"), "{}", err.message);
        assert!(err.message.contains("'role'"), "{}", err.message);
    }

    #[test]
    fn schema_round_trips_through_json() {
        let json = serde_json::to_string(&Schema::default()).unwrap();
        let schema: Schema = serde_json::from_str(&json).unwrap();
        assert_eq!(schema, Schema::default());
    }
}
