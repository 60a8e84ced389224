//! Command implementations

pub mod build;
pub mod plan;
pub mod release;
pub mod version_code;

use std::sync::Arc;

use anyhow::Result;
use magiskfrida_core::tags::{GitTags, TagSource};
use magiskfrida_core::{BuildConfig, BuildContext, TracingReporter};

/// Context for commands that touch the network.
pub(crate) fn build_context(config: BuildConfig) -> Result<BuildContext> {
    Ok(BuildContext::new(config, Arc::new(TracingReporter))?)
}

/// Project tags come from git in the working directory.
pub(crate) fn git_tags(config: &BuildConfig) -> Arc<dyn TagSource> {
    Arc::new(GitTags::new(config.layout.root(), config.timeouts.git))
}
