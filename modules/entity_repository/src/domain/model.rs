//! Base query handle owned by a repository

use crate::contract::Result;
use crate::domain::entity::{validate_metadata, RepositoryEntity};
use sea_orm::Select;

/// Holds the pristine base query every read starts from
#[derive(Debug, Clone)]
pub struct ModelHandle<E: RepositoryEntity> {
    entity: E,
    base: Select<E>,
}

impl<E: RepositoryEntity> ModelHandle<E> {
    /// Validate the entity metadata and derive a fresh handle
    pub fn make() -> Result<Self> {
        validate_metadata::<E>()?;
        Ok(Self {
            entity: E::default(),
            base: E::find(),
        })
    }

    pub fn entity(&self) -> &E {
        &self.entity
    }

    /// Current base handle
    pub fn model(&self) -> &Select<E> {
        &self.base
    }

    /// Replace the base handle
    pub fn set_model(&mut self, model: Select<E>) {
        self.base = model;
    }

    /// Re-derive the base handle from the entity, dropping any narrowing
    pub fn make_model(&mut self) -> Result<Select<E>> {
        validate_metadata::<E>()?;
        self.base = E::find();
        Ok(self.base.clone())
    }

    /// Copy of the base handle to build a query on
    pub fn snapshot(&self) -> Select<E> {
        self.base.clone()
    }
}
