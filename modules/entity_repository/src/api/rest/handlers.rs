//! HTTP request handlers - thin layer that delegates to a per-request repository

use super::{
    dto::*,
    error::{map_domain_error, not_found, Problem},
};
use crate::config::Config;
use crate::contract::PageParams;
use crate::domain::{PrimaryKeyOf, Repository, RepositoryEntity, RuleSet};
use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, DatabaseConnection, IntoActiveModel, TryIntoModel,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Hook run on every fresh repository, e.g. to push tenant criteria
pub type Scope<E> = Box<dyn Fn(&mut Repository<E>) + Send + Sync>;

/// Resource controller for entity `E`.
///
/// Builds one repository per request and maps the seven resource routes onto
/// it (see [`super::routes::resource_router`]).
pub struct ResourceController<E: RepositoryEntity> {
    db: Arc<DatabaseConnection>,
    config: Config,
    scopes: Vec<Scope<E>>,
}

impl<E: RepositoryEntity> ResourceController<E> {
    pub fn new(db: Arc<DatabaseConnection>, config: Config) -> Self {
        Self {
            db,
            config,
            scopes: Vec::new(),
        }
    }

    /// Register a hook applied to every repository this controller builds
    pub fn with_scope(
        mut self,
        scope: impl Fn(&mut Repository<E>) + Send + Sync + 'static,
    ) -> Self {
        self.scopes.push(Box::new(scope));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fresh repository for one request
    pub fn repository(&self) -> crate::contract::Result<Repository<E>> {
        let mut repository = Repository::with_config(self.db.clone(), &self.config)?;
        for scope in &self.scopes {
            scope(&mut repository);
        }
        Ok(repository)
    }
}

impl<E> ResourceController<E>
where
    E: RepositoryEntity,
    E::Model: IntoActiveModel<E::ActiveModel> + Serialize + DeserializeOwned + Send + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E>
        + ActiveModelBehavior
        + TryIntoModel<E::Model>
        + Send
        + Sync,
    PrimaryKeyOf<E>: DeserializeOwned + Send,
{
    /// GET / - one page of records; query parameters are also exposed to
    /// criteria through the repository context
    pub async fn index(
        Extension(controller): Extension<Arc<Self>>,
        Query(query): Query<BTreeMap<String, String>>,
    ) -> Result<Json<PageDto>, Problem> {
        let params = PageParams::from_query(&query).map_err(map_domain_error)?;
        let mut repository = controller.repository().map_err(map_domain_error)?;
        for (key, value) in query {
            repository.with_context_value(key, JsonValue::String(value));
        }

        let page = repository
            .paginate_as::<JsonValue>(Some(controller.config.controller_page_size), &params)
            .await
            .map_err(map_domain_error)?;

        Ok(Json(page.into()))
    }

    /// GET /create - blank form
    pub async fn create_form(
        Extension(controller): Extension<Arc<Self>>,
    ) -> Result<Json<FormSchemaDto>, Problem> {
        let mut repository = controller.repository().map_err(map_domain_error)?;
        let form = repository
            .form(RuleSet::Create, None)
            .await
            .map_err(map_domain_error)?;

        Ok(Json(form.into()))
    }

    /// POST / - validate then insert
    pub async fn store(
        Extension(controller): Extension<Arc<Self>>,
        Json(data): Json<JsonValue>,
    ) -> Result<(StatusCode, Json<E::Model>), Problem> {
        let repository = controller.repository().map_err(map_domain_error)?;
        repository
            .validate(&data, RuleSet::Create)
            .map_err(map_domain_error)?;
        let model = repository.create(data).await.map_err(map_domain_error)?;

        Ok((StatusCode::CREATED, Json(model)))
    }

    /// GET /{id}
    pub async fn show(
        Extension(controller): Extension<Arc<Self>>,
        Path(id): Path<PrimaryKeyOf<E>>,
    ) -> Result<Json<E::Model>, Problem> {
        let mut repository = controller.repository().map_err(map_domain_error)?;
        let label = format!("{:?}", id);

        match repository.find(id).await.map_err(map_domain_error)? {
            Some(model) => Ok(Json(model)),
            None => Err(not_found(repository.table(), label)),
        }
    }

    /// GET /{id}/edit - form pre-filled with the record
    pub async fn edit_form(
        Extension(controller): Extension<Arc<Self>>,
        Path(id): Path<PrimaryKeyOf<E>>,
    ) -> Result<Json<FormSchemaDto>, Problem> {
        let mut repository = controller.repository().map_err(map_domain_error)?;
        let label = format!("{:?}", id);

        let form = repository
            .form(RuleSet::Update, Some(id))
            .await
            .map_err(map_domain_error)?;
        if form.model.is_none() {
            return Err(not_found(repository.table(), label));
        }

        Ok(Json(form.into()))
    }

    /// PUT /{id} - validate then update
    pub async fn update(
        Extension(controller): Extension<Arc<Self>>,
        Path(id): Path<PrimaryKeyOf<E>>,
        Json(data): Json<JsonValue>,
    ) -> Result<Json<E::Model>, Problem> {
        let repository = controller.repository().map_err(map_domain_error)?;
        let label = format!("{:?}", id);
        repository
            .validate(&data, RuleSet::Update)
            .map_err(map_domain_error)?;

        match repository.update(data, id).await.map_err(map_domain_error)? {
            Some(model) => Ok(Json(model)),
            None => Err(not_found(repository.table(), label)),
        }
    }

    /// DELETE /{id}
    pub async fn destroy(
        Extension(controller): Extension<Arc<Self>>,
        Path(id): Path<PrimaryKeyOf<E>>,
    ) -> Result<StatusCode, Problem> {
        let repository = controller.repository().map_err(map_domain_error)?;
        let label = format!("{:?}", id);

        match repository.delete(id).await.map_err(map_domain_error)? {
            Some(_) => Ok(StatusCode::NO_CONTENT),
            None => Err(not_found(repository.table(), label)),
        }
    }
}
