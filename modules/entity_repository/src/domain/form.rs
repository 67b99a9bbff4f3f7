//! Form descriptions for UI form builders

use crate::contract::{FormField, FormSchema, RepositoryError, Result};
use crate::domain::entity::{column_by_name, RepositoryEntity};
use crate::domain::validation::{describe_rules, RuleSet};
use sea_orm::IdenStatic;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Blank form over the writable columns
pub fn create_form<E: RepositoryEntity>(kind: RuleSet) -> FormSchema {
    let fields = E::writable_columns()
        .iter()
        .map(|column| {
            let name = column.as_str().to_string();
            let field = FormField {
                value: None,
                model: Some(name.clone()),
                values: enum_values::<E>(*column),
            };
            (name, field)
        })
        .collect();

    FormSchema {
        rules: describe_rules(E::rules(kind)),
        model: None,
        fields,
    }
}

/// Form pre-filled from an existing record; every attribute becomes a field
pub fn edit_form<E: RepositoryEntity>(kind: RuleSet, model: &E::Model) -> Result<FormSchema>
where
    E::Model: Serialize,
{
    let attributes = match serde_json::to_value(model).map_err(RepositoryError::payload)? {
        JsonValue::Object(map) => map,
        _ => {
            return Err(RepositoryError::payload(
                "model does not serialize to an attribute map",
            ))
        }
    };

    let fields = attributes
        .iter()
        .map(|(name, value)| {
            let field = FormField {
                value: Some(value.clone()),
                model: None,
                values: column_by_name::<E>(name).and_then(enum_values::<E>),
            };
            (name.clone(), field)
        })
        .collect();

    Ok(FormSchema {
        rules: describe_rules(E::rules(kind)),
        model: Some(JsonValue::Object(attributes)),
        fields,
    })
}

/// Form for a key that matched no record
pub fn missing_record<E: RepositoryEntity>(kind: RuleSet) -> FormSchema {
    FormSchema {
        rules: describe_rules(E::rules(kind)),
        model: None,
        fields: Default::default(),
    }
}

fn enum_values<E: RepositoryEntity>(column: E::Column) -> Option<Vec<String>> {
    E::enum_values(column).map(|values| values.iter().map(|v| v.to_string()).collect())
}
