//! Criteria units and the ordered collection a repository applies
//!
//! A criteria unit only transforms a `Select<E>`; it never executes it. The
//! collection folds its units in push order, each one receiving the output of
//! the previous unit.

use crate::contract::Result;
use crate::domain::entity::RepositoryEntity;
use crate::domain::repository::Repository;
use sea_orm::{ColumnTrait, Order, QueryFilter, QueryOrder, Select, Value};
use std::fmt;
use tracing::debug;

/// Reusable query-filtering rule
pub trait Criteria<E: RepositoryEntity>: Send + Sync {
    /// Transform the query. Returning an error aborts the read.
    fn apply(&self, query: Select<E>, repository: &Repository<E>) -> Result<Select<E>>;

    /// Name shown in logs
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Criteria built from a closure, see [`criteria_fn`]
pub struct FnCriteria<F> {
    name: String,
    f: F,
}

/// Wrap a closure as a named criteria unit
pub fn criteria_fn<F>(name: impl Into<String>, f: F) -> FnCriteria<F> {
    FnCriteria {
        name: name.into(),
        f,
    }
}

impl<E, F> Criteria<E> for FnCriteria<F>
where
    E: RepositoryEntity,
    F: Fn(Select<E>) -> Select<E> + Send + Sync,
{
    fn apply(&self, query: Select<E>, _repository: &Repository<E>) -> Result<Select<E>> {
        Ok((self.f)(query))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// `column = value`
pub struct ColumnEquals<E: RepositoryEntity> {
    column: E::Column,
    value: Value,
}

impl<E: RepositoryEntity> ColumnEquals<E> {
    pub fn new(column: E::Column, value: impl Into<Value>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

impl<E: RepositoryEntity> Criteria<E> for ColumnEquals<E> {
    fn apply(&self, query: Select<E>, _repository: &Repository<E>) -> Result<Select<E>> {
        Ok(query.filter(self.column.eq(self.value.clone())))
    }

    fn name(&self) -> &str {
        "column_equals"
    }
}

/// `ORDER BY column asc|desc`
pub struct OrderBy<E: RepositoryEntity> {
    column: E::Column,
    order: Order,
}

impl<E: RepositoryEntity> OrderBy<E> {
    pub fn asc(column: E::Column) -> Self {
        Self {
            column,
            order: Order::Asc,
        }
    }

    pub fn desc(column: E::Column) -> Self {
        Self {
            column,
            order: Order::Desc,
        }
    }
}

impl<E: RepositoryEntity> Criteria<E> for OrderBy<E> {
    fn apply(&self, query: Select<E>, _repository: &Repository<E>) -> Result<Select<E>> {
        Ok(query.order_by(self.column, self.order.clone()))
    }

    fn name(&self) -> &str {
        "order_by"
    }
}

/// Ordered set of criteria owned by one repository
pub struct CriteriaCollection<E: RepositoryEntity> {
    units: Vec<Box<dyn Criteria<E>>>,
}

impl<E: RepositoryEntity> Default for CriteriaCollection<E> {
    fn default() -> Self {
        Self { units: Vec::new() }
    }
}

impl<E: RepositoryEntity> fmt::Debug for CriteriaCollection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl<E: RepositoryEntity> CriteriaCollection<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, unit: Box<dyn Criteria<E>>) {
        self.units.push(unit);
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Criteria<E>> {
        self.units.iter().map(Box::as_ref)
    }

    /// Unit names in application order
    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|unit| unit.name()).collect()
    }

    /// Fold every unit over `query` in push order
    pub fn apply(&self, query: Select<E>, repository: &Repository<E>) -> Result<Select<E>> {
        self.units
            .iter()
            .enumerate()
            .try_fold(query, |query, (position, unit)| {
                debug!(
                    table = repository.table(),
                    criteria = unit.name(),
                    position,
                    "Applying criteria"
                );
                unit.apply(query, repository)
            })
    }
}
