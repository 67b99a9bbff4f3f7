//! HTTP error mapping to RFC-9457 Problem Details

use crate::contract::RepositoryError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Serialize, ToSchema)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// Field -> messages, for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl Problem {
    /// Create a new Problem Details response
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            errors: None,
        }
    }

    /// Add detail message
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_errors(mut self, errors: BTreeMap<String, Vec<String>>) -> Self {
        self.errors = Some(errors);
        self
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, "application/problem+json")],
            Json(self),
        )
            .into_response()
    }
}

/// 404 for a key that matched no record
pub fn not_found(table: &str, id: impl std::fmt::Display) -> Problem {
    Problem::new(StatusCode::NOT_FOUND, "Not Found")
        .with_detail(format!("{} with id '{}' was not found", table, id))
}

/// Map repository errors to HTTP Problem Details
pub fn map_domain_error(error: RepositoryError) -> Problem {
    match error {
        RepositoryError::Validation(errors) => Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation Failed",
        )
        .with_detail(format!("{} field(s) failed validation", errors.len()))
        .with_errors(errors.into_inner()),

        RepositoryError::UnknownColumn { entity, column } => Problem::new(
            StatusCode::BAD_REQUEST,
            "Unknown Column",
        )
        .with_detail(format!("'{}' has no column '{}'", entity, column)),

        RepositoryError::Payload(reason) => {
            Problem::new(StatusCode::BAD_REQUEST, "Invalid Payload").with_detail(reason)
        }

        error @ (RepositoryError::Construction { .. }
        | RepositoryError::Criteria { .. }
        | RepositoryError::Db(_)) => {
            tracing::error!("Internal error: {}", error);
            Problem::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                .with_detail("An unexpected error occurred")
        }
    }
}
