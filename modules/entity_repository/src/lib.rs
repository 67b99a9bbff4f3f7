//! Entity Repository
//!
//! Criteria-driven CRUD repositories over SeaORM entities. Business-specific
//! query rules are written once as [`Criteria`] units, pushed onto a
//! [`Repository`] and folded over the base query in push order before every
//! read. Writes bypass the chain.
//!
//! ```ignore
//! let mut users = Repository::<user::Entity>::new(db)?;
//! users
//!     .push_criteria(ColumnEquals::new(user::Column::Status, "active"))
//!     .push_criteria(OrderBy::asc(user::Column::Name));
//! let page = users.paginate(None, &PageParams::new().page(2)).await?;
//! ```

// Public exports
pub mod contract;
pub use contract::{
    Columns, FormField, FormSchema, Page, PageParams, RepositoryError, Result, ValidationErrors,
};

pub mod config;
pub use config::{Config, ScopePolicy};

pub mod domain;
pub use domain::{
    criteria_fn, ColumnEquals, Criteria, CriteriaCollection, FieldRules, OrderBy, PrimaryKeyOf,
    Repository, RepositoryEntity, Rule, RuleSet,
};

pub mod api;
pub use api::rest::{register_routes, resource_router, ResourceController};

pub mod infra;

#[cfg(test)]
pub(crate) mod test_support;
