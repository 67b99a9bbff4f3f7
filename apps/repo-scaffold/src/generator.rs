//! Generator planning and file output

use crate::naming;
use crate::templates;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Repository,
    ApiController,
    Criteria,
}

impl Kind {
    fn suffix(self) -> &'static str {
        match self {
            Kind::Repository => "Repository",
            Kind::ApiController => "Controller",
            Kind::Criteria => "Criteria",
        }
    }

    fn template(self) -> &'static str {
        match self {
            Kind::Repository => templates::REPOSITORY,
            Kind::ApiController => templates::API_CONTROLLER,
            Kind::Criteria => templates::CRITERIA,
        }
    }
}

/// Values substituted into a template
#[derive(Debug, Default, Serialize)]
struct TemplateContext {
    class: String,
    snake: String,
    entity: Option<String>,
    repository_module: Option<String>,
    repository_class: Option<String>,
    resource: Option<String>,
}

/// One file to generate
#[derive(Debug)]
pub struct Generator {
    kind: Kind,
    context: TemplateContext,
}

impl Generator {
    /// Plan a file for `name`. `path` is the entity path (repository and
    /// criteria) or the repository path (api controller); a default is
    /// derived from `name` when absent.
    pub fn new(kind: Kind, name: &str, path: Option<String>) -> Result<Self> {
        naming::validate_type_name(name)?;
        let base = naming::base_name(name, kind.suffix());

        let mut context = TemplateContext {
            class: name.to_string(),
            snake: naming::snake(name),
            ..TemplateContext::default()
        };

        match kind {
            Kind::Repository => {
                let entity = path.unwrap_or_else(|| naming::default_entity(base));
                naming::validate_path(&entity)?;
                context.entity = Some(entity);
            }
            Kind::Criteria => {
                let entity = path.unwrap_or_else(|| naming::default_entity_from_last_word(base));
                naming::validate_path(&entity)?;
                context.entity = Some(entity);
            }
            Kind::ApiController => {
                let repository = path.unwrap_or_else(|| naming::default_repository(base));
                let (module, class) = naming::split_path(&repository)?;
                context.repository_module = Some(module);
                context.repository_class = Some(class);
                context.resource = Some(naming::resource_segment(base));
            }
        }

        tracing::debug!(?kind, name, "Planned generator");
        Ok(Self { kind, context })
    }

    pub fn file_name(&self) -> String {
        format!("{}.rs", self.context.snake)
    }

    pub fn render(&self) -> Result<String> {
        templates::render(self.kind.template(), &self.context)
    }

    /// Render into `<out_dir>/<snake_name>.rs`
    pub fn write(&self, out_dir: &Path, force: bool) -> Result<PathBuf> {
        let path = out_dir.join(self.file_name());
        if path.exists() && !force {
            bail!(
                "{} already exists; pass --force to overwrite it",
                path.display()
            );
        }

        let source = self.render()?;
        fs::create_dir_all(out_dir)
            .context(format!("Failed to create directory: {}", out_dir.display()))?;
        fs::write(&path, source).context(format!("Failed to write {}", path.display()))?;

        tracing::info!(kind = ?self.kind, class = %self.context.class, "Wrote {}", path.display());
        Ok(path)
    }
}
