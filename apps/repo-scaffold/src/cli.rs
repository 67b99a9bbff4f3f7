//! Command line definition

use crate::generator::{Generator, Kind};
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Generate entity repositories, API controllers and criteria
#[derive(Debug, Parser)]
#[command(name = "repo-scaffold")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a repository wrapping `Repository<Entity>`
    #[command(name = "make:repository")]
    Repository {
        /// Type name, e.g. `UserRepository`
        name: String,

        /// Entity path (defaults to `crate::entities::<name>::Entity`)
        #[arg(long)]
        entity: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Create REST resource routes backed by a repository
    #[command(name = "make:api-controller")]
    ApiController {
        /// Type name, e.g. `UserController`
        name: String,

        /// Repository path (defaults to `crate::repositories::<name>_repository::<Name>Repository`)
        #[arg(long)]
        repository: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Create a criteria unit
    #[command(name = "make:criteria")]
    Criteria {
        /// Type name, e.g. `ActiveUsersCriteria`
        name: String,

        /// Entity path (defaults to the entity named by the last word of the name)
        #[arg(long)]
        entity: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Args)]
struct OutputArgs {
    /// Directory the file is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

impl Cli {
    /// Render and write the requested file, returning its path
    pub fn run(self) -> Result<PathBuf> {
        let (generator, output) = match self.command {
            Command::Repository {
                name,
                entity,
                output,
            } => (Generator::new(Kind::Repository, &name, entity)?, output),
            Command::ApiController {
                name,
                repository,
                output,
            } => (Generator::new(Kind::ApiController, &name, repository)?, output),
            Command::Criteria {
                name,
                entity,
                output,
            } => (Generator::new(Kind::Criteria, &name, entity)?, output),
        };

        generator.write(&output.out_dir, output.force)
    }
}
