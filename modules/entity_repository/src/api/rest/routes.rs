//! Route registration for generic resource controllers

use super::{dto::*, error::Problem, handlers::ResourceController};
use crate::domain::{PrimaryKeyOf, RepositoryEntity};
use axum::{
    routing::get,
    Extension, Router,
};
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, IntoActiveModel, TryIntoModel};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use utoipa::OpenApi;

/// Schemas shared by every resource router
#[derive(OpenApi)]
#[openapi(components(schemas(PageDto, FormSchemaDto, FormFieldsDto, FormFieldDto, Problem)))]
pub struct ResourceApiDoc;

/// Router exposing the resource routes of one entity:
///
/// | Method | Path | Handler |
/// |---|---|---|
/// | GET | `/` | index |
/// | GET | `/create` | create form |
/// | POST | `/` | store |
/// | GET | `/{id}` | show |
/// | GET | `/{id}/edit` | edit form |
/// | PUT | `/{id}` | update |
/// | DELETE | `/{id}` | destroy |
pub fn resource_router<E>(controller: Arc<ResourceController<E>>) -> Router
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
    Router::new()
        .route(
            "/",
            get(ResourceController::<E>::index).post(ResourceController::<E>::store),
        )
        .route("/create", get(ResourceController::<E>::create_form))
        .route(
            "/{id}",
            get(ResourceController::<E>::show)
                .put(ResourceController::<E>::update)
                .delete(ResourceController::<E>::destroy),
        )
        .route("/{id}/edit", get(ResourceController::<E>::edit_form))
        .layer(Extension(controller))
}

/// Mount the resource routes of one entity under `prefix`
pub fn register_routes<E>(
    router: Router,
    prefix: &str,
    controller: Arc<ResourceController<E>>,
) -> anyhow::Result<Router>
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
    if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
        anyhow::bail!("resource prefix must look like '/name', got '{}'", prefix);
    }

    tracing::debug!(prefix, "Registering resource routes");
    Ok(router.nest(prefix, resource_router(controller)))
}
