//! Configuration for entity repositories

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Prefix for environment overrides, e.g. `ENTITY_REPOSITORY_MAX_PAGE_SIZE=500`
pub const ENV_PREFIX: &str = "ENTITY_REPOSITORY_";

/// How long a skip-criteria request lasts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopePolicy {
    /// The skip-flag stays set until `reset_scope` is called
    #[default]
    Persistent,
    /// The skip-flag is cleared after every terminal read
    ResetAfterRead,
}

/// Entity repository configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Page size used by `paginate` when the caller passes none
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    /// Page size used by the REST index route
    #[serde(default = "default_controller_page_size")]
    pub controller_page_size: u64,

    /// Upper bound for any requested page size
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    #[serde(default)]
    pub scope_policy: ScopePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            controller_page_size: default_controller_page_size(),
            max_page_size: default_max_page_size(),
            scope_policy: ScopePolicy::default(),
        }
    }
}

impl Config {
    /// Load defaults, then the optional YAML file, then environment overrides
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        let config: Config = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.max_page_size == 0 {
            anyhow::bail!("max_page_size must be greater than zero");
        }
        if self.default_page_size > self.max_page_size {
            anyhow::bail!(
                "default_page_size ({}) exceeds max_page_size ({})",
                self.default_page_size,
                self.max_page_size
            );
        }
        Ok(())
    }
}

fn default_page_size() -> u64 {
    100
}

fn default_controller_page_size() -> u64 {
    50
}

fn default_max_page_size() -> u64 {
    1000
}
