//! Entity metadata consumed by the repository

use crate::contract::{RepositoryError, Result};
use crate::domain::validation::{FieldRules, RuleSet};
use sea_orm::sea_query::IntoValueTuple;
use sea_orm::{
    ColumnTrait, Condition, EntityName, EntityTrait, IdenStatic, Iterable, PrimaryKeyToColumn,
    PrimaryKeyTrait,
};
use std::collections::BTreeSet;

/// Primary key value type of an entity
pub type PrimaryKeyOf<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Repository-level metadata attached to a SeaORM entity.
///
/// Implemented next to each entity definition:
///
/// ```ignore
/// impl RepositoryEntity for user::Entity {
///     fn writable_columns() -> &'static [user::Column] {
///         &[user::Column::Name, user::Column::Email]
///     }
///
///     fn rules(kind: RuleSet) -> &'static [FieldRules] {
///         match kind {
///             RuleSet::Create => CREATE_RULES,
///             RuleSet::Update => UPDATE_RULES,
///         }
///     }
/// }
/// ```
pub trait RepositoryEntity: EntityTrait {
    /// Columns a payload may write. Everything else is dropped on create/update.
    fn writable_columns() -> &'static [Self::Column];

    /// Rule table for a write kind
    fn rules(_kind: RuleSet) -> &'static [FieldRules] {
        &[]
    }

    /// Allowed values for enum-backed columns, surfaced in form schemas
    fn enum_values(_column: Self::Column) -> Option<&'static [&'static str]> {
        None
    }
}

/// Table name used in logs and error messages
pub fn entity_name<E: EntityTrait>() -> String {
    E::default().table_name().to_string()
}

/// Names of the writable columns, in declaration order
pub fn writable_names<E: RepositoryEntity>() -> Vec<String> {
    E::writable_columns()
        .iter()
        .map(|column| column.as_str().to_string())
        .collect()
}

/// Names of the primary key columns
pub fn primary_key_names<E: EntityTrait>() -> Vec<String> {
    E::PrimaryKey::iter()
        .map(|key| key.into_column().as_str().to_string())
        .collect()
}

/// Look up a column by its name
pub fn column_by_name<E: EntityTrait>(name: &str) -> Option<E::Column> {
    E::Column::iter().find(|column| column.as_str() == name)
}

/// `pk1 = v1 AND pk2 = v2 ...` for a (possibly composite) key value
pub fn primary_key_condition<E: EntityTrait>(id: PrimaryKeyOf<E>) -> Condition {
    E::PrimaryKey::iter()
        .zip(id.into_value_tuple())
        .fold(Condition::all(), |condition, (key, value)| {
            condition.add(key.into_column().eq(value))
        })
}

/// Check that the entity metadata describes a usable persistent entity
pub fn validate_metadata<E: RepositoryEntity>() -> Result<()> {
    let construction = |reason: String| RepositoryError::Construction {
        entity: entity_name::<E>(),
        reason,
    };

    let keys = primary_key_names::<E>();
    if keys.is_empty() {
        return Err(construction("entity declares no primary key".to_string()));
    }

    let mut seen = BTreeSet::new();
    for name in writable_names::<E>() {
        if E::PrimaryKey::auto_increment() && keys.contains(&name) {
            return Err(construction(format!(
                "auto-increment key '{}' cannot be writable",
                name
            )));
        }
        if !seen.insert(name.clone()) {
            return Err(construction(format!(
                "writable column '{}' is listed twice",
                name
            )));
        }
    }

    Ok(())
}
