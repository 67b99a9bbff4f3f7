//! REST DTOs with serde derives for HTTP API

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use utoipa::ToSchema;

// ===== Listing =====

/// One page of records
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PageDto {
    /// Records as attribute maps
    pub data: Vec<JsonValue>,

    /// 1-based page number
    #[schema(example = 1)]
    pub current_page: u64,

    #[schema(example = 50)]
    pub per_page: u64,

    /// Number of records matching the active criteria
    pub total: u64,

    /// Last page number (at least 1)
    pub last_page: u64,
}

// ===== Forms =====

/// Form description returned by `/create` and `/{id}/edit`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormSchemaDto {
    /// Field -> rule descriptors
    pub rules: BTreeMap<String, Vec<String>>,

    /// Current record (edit forms only)
    pub model: Option<JsonValue>,

    pub schema: FormFieldsDto,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormFieldsDto {
    pub fields: BTreeMap<String, FormFieldDto>,
}

/// One form field
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FormFieldDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Allowed values for enum-backed fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}
