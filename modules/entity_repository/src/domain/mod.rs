//! Domain layer: repository, criteria and entity metadata

pub mod criteria;
pub mod entity;
pub mod form;
pub mod model;
pub mod repository;
pub mod validation;

pub use criteria::{criteria_fn, ColumnEquals, Criteria, CriteriaCollection, FnCriteria, OrderBy};
pub use entity::{PrimaryKeyOf, RepositoryEntity};
pub use model::ModelHandle;
pub use repository::Repository;
pub use validation::{FieldRules, Rule, RuleSet};
