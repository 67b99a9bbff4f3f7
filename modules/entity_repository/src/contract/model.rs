//! Transport-agnostic models shared by the repository and its adapters.
//!
//! NO serde derives here; the REST layer has its own DTOs.

use super::error::{RepositoryError, Result};
use sea_orm::{EntityTrait, IdenStatic, Iterable};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

// ===== Column projection =====

/// Column projection for read operations
#[derive(Debug, Clone)]
pub enum Columns<E: EntityTrait> {
    /// Every column (`*`)
    All,
    /// Only the listed columns, in this order
    Only(Vec<E::Column>),
}

impl<E: EntityTrait> Default for Columns<E> {
    fn default() -> Self {
        Self::All
    }
}

impl<E: EntityTrait> Columns<E> {
    pub fn only(columns: impl IntoIterator<Item = E::Column>) -> Self {
        Self::Only(columns.into_iter().collect())
    }

    /// Resolve column names against the entity.
    ///
    /// An empty list or a single `*` selects every column.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        if names.is_empty() || names.iter().any(|n| n.as_ref() == "*") {
            return Ok(Self::All);
        }

        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                E::Column::iter()
                    .find(|column| column.as_str() == name)
                    .ok_or_else(|| RepositoryError::UnknownColumn {
                        entity: E::default().as_str().to_string(),
                        column: name.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::Only)
    }
}

// ===== Pagination =====

/// Caller-supplied paging parameters, merged with repository defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageParams {
    /// 1-based page number (defaults to 1)
    pub page: Option<u64>,
    /// Overrides the page size passed to `paginate`
    pub per_page: Option<u64>,
    /// Column names to project; empty means `*`
    pub columns: Vec<String>,
}

impl PageParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    pub fn per_page(mut self, per_page: u64) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Build params from raw request parameters.
    ///
    /// Recognizes `page`, `per_page` and a comma-separated `columns` list;
    /// other keys are ignored here.
    pub fn from_query(params: &BTreeMap<String, String>) -> Result<Self> {
        let number = |key: &str| -> Result<Option<u64>> {
            params
                .get(key)
                .map(|raw| {
                    raw.trim().parse::<u64>().map_err(|_| {
                        RepositoryError::payload(format!(
                            "'{}' must be a positive integer, got '{}'",
                            key, raw
                        ))
                    })
                })
                .transpose()
        };

        let columns = params
            .get("columns")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            page: number("page")?,
            per_page: number("per_page")?,
            columns,
        })
    }

    /// Resolve the effective (page, per_page) pair.
    ///
    /// Page numbers start at 1; page size is clamped to `1..=max_page_size`.
    pub fn resolve(&self, default_per_page: u64, max_page_size: u64) -> (u64, u64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(default_per_page)
            .clamp(1, max_page_size.max(1));
        (page, per_page)
    }
}

/// One page of results plus pagination metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Page<M> {
    pub data: Vec<M>,
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
}

impl<M> Page<M> {
    pub fn map<N>(self, f: impl FnMut(M) -> N) -> Page<N> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
        }
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }
}

// ===== Form schema =====

/// Description of an entity form: rules, current record, fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSchema {
    /// Field -> rule descriptors (e.g. `required`, `max_length:255`)
    pub rules: BTreeMap<String, Vec<String>>,
    /// Current record as an attribute map, for edit forms
    pub model: Option<JsonValue>,
    pub fields: BTreeMap<String, FormField>,
}

/// A single form field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormField {
    /// Current value (edit forms)
    pub value: Option<JsonValue>,
    /// Bound attribute name (create forms)
    pub model: Option<String>,
    /// Allowed values for enum-backed fields
    pub values: Option<Vec<String>>,
}
