//! magiskfrida - release automation for the MagiskFrida module
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
//!
//! Tracks upstream frida releases, decides whether a new module revision is
//! due, and builds the flashable zip bundling `frida-server` for every
//! Android architecture.
//!
//! # Working Directory Layout
//!
//! ```text
//! <root>/
//! ├── base/         # module template
//! ├── downloads/    # cached upstream archives
//! ├── build/        # zip and updater.json
//! └── NEW_TAG.txt   # present only when a release is due
//! ```

pub mod cmd;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use magiskfrida_core::BuildConfig;
use magiskfrida_core::config::{DEFAULT_API_BASE, DEFAULT_DOWNLOAD_BASE, DEFAULT_PROJECT, DEFAULT_UPSTREAM};
use magiskfrida_core::repo::GitHubRepo;

#[derive(Debug, Parser)]
#[command(name = "magiskfrida")]
#[command(author, version, about = "Build and release the MagiskFrida module")]
pub struct Cli {
    /// Working directory holding the template, caches and build output
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Upstream repository whose releases are bundled
    #[arg(long, global = true, env = "MAGISKFRIDA_UPSTREAM", default_value = DEFAULT_UPSTREAM)]
    pub upstream: GitHubRepo,

    /// Repository the module is published from
    #[arg(long, global = true, env = "MAGISKFRIDA_PROJECT", default_value = DEFAULT_PROJECT)]
    pub project: GitHubRepo,

    /// GitHub REST API base URL
    #[arg(long, global = true, env = "MAGISKFRIDA_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Host serving release assets
    #[arg(long, global = true, env = "MAGISKFRIDA_DOWNLOAD_BASE", default_value = DEFAULT_DOWNLOAD_BASE)]
    pub download_base: String,

    /// Token for GitHub API requests
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `release`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decide on a release, write NEW_TAG.txt if one is due, then build
    Release {
        /// Release even if upstream has not moved (also FORCE_RELEASE=true|1)
        #[arg(long)]
        force: bool,
    },
    /// Build the module for explicit tags without any release decision
    Build {
        /// Upstream tag whose servers are bundled
        #[arg(long)]
        upstream_tag: String,
        /// Module version tag
        #[arg(long, default_value = magiskfrida_schema::PLACEHOLDER_TAG)]
        tag: String,
    },
    /// Print the release decision without writing or building anything
    Plan {
        /// Evaluate as if a release were forced
        #[arg(long)]
        force: bool,
    },
    /// Print the numeric version code for a tag
    #[command(name = "version-code")]
    VersionCode {
        /// Version tag, e.g. 16.1.4-1
        tag: String,
    },
}

impl Cli {
    /// Configuration for a build run from the parsed arguments.
    pub fn build_config(&self) -> Result<BuildConfig> {
        let mut config = BuildConfig::new(self.root.clone())
            .map_err(anyhow::Error::msg)
            .context("default configuration is invalid")?;
        config.upstream = self.upstream.clone();
        config.project = self.project.clone();
        config.api_base.clone_from(&self.api_base);
        config.download_base.clone_from(&self.download_base);
        config.github_token = self.github_token.clone().filter(|t| !t.is_empty());
        Ok(config)
    }
}
