//! Contract error types for entity repositories
//!
//! These errors are transport-agnostic. The REST layer maps them onto
//! problem documents in `api::rest::error`.

use sea_orm::DbErr;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Field -> messages map produced by rule validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> BTreeMap<String, Vec<String>> {
        self.fields
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.fields {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", field, messages.join(", "))?;
        }
        Ok(())
    }
}

/// Repository errors
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Entity metadata does not describe a usable persistent entity
    #[error("Cannot build repository for '{entity}': {reason}")]
    Construction { entity: String, reason: String },

    /// A criteria unit refused to transform the query
    #[error("Criteria '{criteria}' failed: {message}")]
    Criteria { criteria: String, message: String },

    /// A projection named a column the entity does not have
    #[error("Unknown column '{column}' for entity '{entity}'")]
    UnknownColumn { entity: String, column: String },

    /// Payload failed the entity's rule table
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Payload is not an attribute map the entity can accept
    #[error("Invalid payload: {0}")]
    Payload(String),

    /// Query-layer error, propagated unchanged
    #[error(transparent)]
    Db(#[from] DbErr),
}

impl RepositoryError {
    pub fn criteria(criteria: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Criteria {
            criteria: criteria.into(),
            message: message.into(),
        }
    }

    pub fn payload(message: impl fmt::Display) -> Self {
        Self::Payload(message.to_string())
    }
}

/// Result type alias for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;
