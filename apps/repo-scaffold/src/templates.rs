//! Embedded source templates

use anyhow::{Context, Result};
use minijinja::Environment;
use serde::Serialize;

pub const REPOSITORY: &str = "repository.rs";
pub const API_CONTROLLER: &str = "api_controller.rs";
pub const CRITERIA: &str = "criteria.rs";

const REPOSITORY_TEMPLATE: &str = r#"//! {{ class }} - repository for `{{ entity }}`

use entity_repository::{Config, Repository, Result};
use sea_orm::DatabaseConnection;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

pub type Entity = {{ entity }};

pub struct {{ class }} {
    inner: Repository<Entity>,
}

impl {{ class }} {
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> Result<Self> {
        let mut inner = Repository::with_config(db, config)?;
        Self::scope(&mut inner);
        Ok(Self { inner })
    }

    /// Criteria every `{{ class }}` starts with, e.g.
    /// `repository.push_criteria(OrderBy::asc(Column::Id));`
    pub fn scope(_repository: &mut Repository<Entity>) {}
}

impl Deref for {{ class }} {
    type Target = Repository<Entity>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for {{ class }} {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}
"#;

const API_CONTROLLER_TEMPLATE: &str = r#"//! {{ class }} - REST routes for `/{{ resource }}`

use axum::Router;
use entity_repository::{register_routes, Config, ResourceController};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use {{ repository_module }}::{Entity, {{ repository_class }}};

/// Mount the `/{{ resource }}` resource routes on `router`
pub fn {{ snake }}_routes(
    router: Router,
    db: Arc<DatabaseConnection>,
    config: Config,
) -> anyhow::Result<Router> {
    let controller = ResourceController::<Entity>::new(db, config).with_scope({{ repository_class }}::scope);
    register_routes(router, "/{{ resource }}", Arc::new(controller))
}
"#;

const CRITERIA_TEMPLATE: &str = r#"//! {{ class }} criteria for `{{ entity }}`

use entity_repository::{Criteria, Repository, Result};
use sea_orm::Select;

type Entity = {{ entity }};

pub struct {{ class }};

impl Criteria<Entity> for {{ class }} {
    fn apply(&self, query: Select<Entity>, _repository: &Repository<Entity>) -> Result<Select<Entity>> {
        // Narrow `query` here, e.g. query.filter(Column::Status.eq("active"))
        Ok(query)
    }

    fn name(&self) -> &str {
        "{{ snake }}"
    }
}
"#;

/// Render an embedded template with the given context
pub fn render<S: Serialize>(template_name: &str, context: &S) -> Result<String> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_template(REPOSITORY, REPOSITORY_TEMPLATE)?;
    env.add_template(API_CONTROLLER, API_CONTROLLER_TEMPLATE)?;
    env.add_template(CRITERIA, CRITERIA_TEMPLATE)?;

    let template = env
        .get_template(template_name)
        .context(format!("Unknown template: {}", template_name))?;
    template
        .render(context)
        .context(format!("Failed to render template: {}", template_name))
}
