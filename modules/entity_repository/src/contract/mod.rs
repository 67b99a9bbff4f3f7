//! Contract layer - public, transport-agnostic types
//!
//! Errors and models shared by the repository core, the REST adapter and
//! any in-process caller.

pub mod error;
pub mod model;

pub use error::{RepositoryError, Result, ValidationErrors};
pub use model::{Columns, FormField, FormSchema, Page, PageParams};
