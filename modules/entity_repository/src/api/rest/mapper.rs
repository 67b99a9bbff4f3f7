//! Conversions from contract models to REST DTOs

use super::dto::*;
use crate::contract::{FormField, FormSchema, Page};
use serde_json::Value as JsonValue;

impl From<Page<JsonValue>> for PageDto {
    fn from(page: Page<JsonValue>) -> Self {
        Self {
            data: page.data,
            current_page: page.current_page,
            per_page: page.per_page,
            total: page.total,
            last_page: page.last_page,
        }
    }
}

impl From<FormField> for FormFieldDto {
    fn from(field: FormField) -> Self {
        Self {
            value: field.value,
            model: field.model,
            values: field.values,
        }
    }
}

impl From<FormSchema> for FormSchemaDto {
    fn from(form: FormSchema) -> Self {
        Self {
            rules: form.rules,
            model: form.model,
            schema: FormFieldsDto {
                fields: form
                    .fields
                    .into_iter()
                    .map(|(name, field)| (name, field.into()))
                    .collect(),
            },
        }
    }
}
