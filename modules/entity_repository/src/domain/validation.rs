//! Rule-table validation for write payloads
//!
//! Each entity registers static rule tables (see [`RepositoryEntity::rules`]).
//! A table is compiled into a JSON Schema and checked with `jsonschema`;
//! failures are grouped into a field -> messages map.
//!
//! [`RepositoryEntity::rules`]: crate::domain::entity::RepositoryEntity::rules

use crate::contract::{RepositoryError, Result, ValidationErrors};
use jsonschema::error::ValidationErrorKind;
use jsonschema::Validator;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Field name used for errors that do not belong to a single attribute
pub const PAYLOAD_FIELD: &str = "_payload";

const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Which rule table to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleSet {
    Create,
    Update,
}

/// A single validation rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    Required,
    Nullable,
    String,
    Integer,
    Numeric,
    Boolean,
    Email,
    MinLength(u64),
    MaxLength(u64),
    Min(i64),
    Max(i64),
    In(&'static [&'static str]),
}

impl Rule {
    /// Short descriptor shown in form schemas, e.g. `max_length:255`
    pub fn descriptor(&self) -> String {
        match self {
            Rule::Required => "required".to_string(),
            Rule::Nullable => "nullable".to_string(),
            Rule::String => "string".to_string(),
            Rule::Integer => "integer".to_string(),
            Rule::Numeric => "numeric".to_string(),
            Rule::Boolean => "boolean".to_string(),
            Rule::Email => "email".to_string(),
            Rule::MinLength(n) => format!("min_length:{}", n),
            Rule::MaxLength(n) => format!("max_length:{}", n),
            Rule::Min(n) => format!("min:{}", n),
            Rule::Max(n) => format!("max:{}", n),
            Rule::In(values) => format!("in:{}", values.join(",")),
        }
    }
}

/// Rules attached to one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRules {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

impl FieldRules {
    pub const fn new(field: &'static str, rules: &'static [Rule]) -> Self {
        Self { field, rules }
    }
}

/// Field -> descriptors view of a rule table
pub fn describe_rules(table: &[FieldRules]) -> BTreeMap<String, Vec<String>> {
    table
        .iter()
        .map(|field| {
            (
                field.field.to_string(),
                field.rules.iter().map(Rule::descriptor).collect(),
            )
        })
        .collect()
}

/// Compile a rule table into an object JSON Schema
pub fn compile_schema(table: &[FieldRules]) -> Value {
    let mut properties = Map::new();
    let mut required: Vec<&str> = Vec::new();

    for field in table {
        let mut property = Map::new();
        let mut types: Vec<&str> = Vec::new();
        let mut nullable = false;
        let mut allowed: Option<Vec<Value>> = None;

        for rule in field.rules {
            match *rule {
                Rule::Required => required.push(field.field),
                Rule::Nullable => nullable = true,
                Rule::String => types.push("string"),
                Rule::Integer => types.push("integer"),
                Rule::Numeric => types.push("number"),
                Rule::Boolean => types.push("boolean"),
                Rule::Email => {
                    types.push("string");
                    property.insert("pattern".into(), json!(EMAIL_PATTERN));
                }
                Rule::MinLength(n) => {
                    property.insert("minLength".into(), json!(n));
                }
                Rule::MaxLength(n) => {
                    property.insert("maxLength".into(), json!(n));
                }
                Rule::Min(n) => {
                    property.insert("minimum".into(), json!(n));
                }
                Rule::Max(n) => {
                    property.insert("maximum".into(), json!(n));
                }
                Rule::In(values) => {
                    allowed = Some(values.iter().map(|v| json!(v)).collect());
                }
            }
        }

        types.dedup();
        if nullable && !types.is_empty() {
            types.push("null");
        }
        match types.as_slice() {
            [] => {}
            [single] => {
                property.insert("type".into(), json!(single));
            }
            many => {
                property.insert("type".into(), json!(many));
            }
        }

        if let Some(mut values) = allowed {
            if nullable {
                values.push(Value::Null);
            }
            property.insert("enum".into(), Value::Array(values));
        }

        properties.insert(field.field.to_string(), Value::Object(property));
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Validate a payload against a JSON Schema, collecting every failure
pub fn validate_against_schema(data: &Value, schema: &Value) -> Result<()> {
    // Compile the schema
    let validator = Validator::new(schema).map_err(|e| RepositoryError::Construction {
        entity: "rule table".to_string(),
        reason: format!("Invalid JSON Schema: {}", e),
    })?;

    let mut errors = ValidationErrors::new();
    for error in validator.iter_errors(data) {
        let field = match &error.kind {
            ValidationErrorKind::Required { property } => property
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| PAYLOAD_FIELD.to_string()),
            _ => field_of_path(&error.instance_path.to_string()),
        };
        errors.add(field, error.to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(RepositoryError::Validation(errors))
    }
}

/// Validate a payload against a rule table
pub fn validate(data: &Value, table: &[FieldRules]) -> Result<()> {
    if table.is_empty() {
        return Ok(());
    }
    validate_against_schema(data, &compile_schema(table))
}

fn field_of_path(pointer: &str) -> String {
    pointer
        .trim_start_matches('/')
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(PAYLOAD_FIELD)
        .to_string()
}
