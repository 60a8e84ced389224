//! Release decision: compare upstream with the project's last tag, pick the
//! next revision, signal the deploy step and run the build.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use magiskfrida_schema::PLACEHOLDER_TAG;
use magiskfrida_schema::version::strip_revision;

use crate::config::Layout;
use crate::context::BuildContext;
use crate::error::{BuildError, IoContext, Result};
use crate::pipeline::{BuildOutput, do_build};
use crate::tags::{self, TagSource};

/// Outcome of the release decision, before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    pub upstream_tag: String,
    pub last_project_tag: Option<String>,
    pub needs_update: bool,
    pub force_release: bool,
    /// Set only when a release is warranted.
    pub new_tag: Option<String>,
}

impl ReleasePlan {
    /// Tag the build runs with: the new tag, or the placeholder `"0"`.
    pub fn build_tag(&self) -> &str {
        self.new_tag.as_deref().unwrap_or(PLACEHOLDER_TAG)
    }

    pub fn should_release(&self) -> bool {
        self.new_tag.is_some()
    }
}

/// Decide whether to release given the resolved tags.
///
/// Without a previous project tag every upstream tag counts as new.
pub fn plan_release(
    upstream_tag: String,
    last_project_tag: Option<String>,
    force_release: bool,
    source: &dyn TagSource,
) -> Result<ReleasePlan> {
    let last_base = last_project_tag.as_deref().map_or("", strip_revision);
    let needs_update = upstream_tag != last_base;

    let new_tag = if needs_update || force_release {
        Some(tags::next_project_tag(source, &upstream_tag)?)
    } else {
        None
    };

    Ok(ReleasePlan {
        upstream_tag,
        last_project_tag,
        needs_update,
        force_release,
        new_tag,
    })
}

/// Fetch both tags and compute the plan. Nothing is written.
pub async fn resolve_plan(
    ctx: &BuildContext,
    source: Arc<dyn TagSource>,
    force_release: bool,
) -> Result<ReleasePlan> {
    let config = &ctx.config;
    let upstream_tag = tags::latest_upstream_tag(
        &ctx.client,
        &config.api_base,
        &config.upstream,
        config.github_token.as_deref(),
        config.timeouts.api,
    )
    .await?;

    // Tag listing shells out to git.
    let plan = tokio::task::spawn_blocking(move || {
        let last = tags::latest_local_tag(source.as_ref(), &[])?;
        plan_release(upstream_tag, last, force_release, source.as_ref())
    })
    .await??;

    ctx.reporter.info(&format!(
        "Upstream {}, last project tag {}, needs update: {}, forced: {}",
        plan.upstream_tag,
        plan.last_project_tag.as_deref().unwrap_or("<none>"),
        plan.needs_update,
        plan.force_release
    ));
    Ok(plan)
}

/// Write the release signal file containing exactly `tag`.
pub fn write_release_signal(layout: &Layout, tag: &str) -> Result<PathBuf> {
    let path = layout.release_signal();
    fs::write(&path, tag).at(&path)?;
    Ok(path)
}

/// Remove a signal file left behind by an earlier run.
///
/// The deploy step treats the file's presence as "publish", so a
/// placeholder build must never leave one in place. Returns whether a file
/// was removed.
pub fn clear_release_signal(layout: &Layout) -> Result<bool> {
    let path = layout.release_signal();
    match fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(BuildError::io(path, e)),
    }
}

/// A finished release run.
#[derive(Debug, Clone)]
pub struct ReleaseOutcome {
    pub plan: ReleasePlan,
    pub build: BuildOutput,
}

/// Full workflow: decide, signal if warranted, then build.
///
/// The build runs either way; with no release due it uses the placeholder
/// tag and produces an artifact that is never published.
pub async fn run_release(
    ctx: &BuildContext,
    source: Arc<dyn TagSource>,
    force_release: bool,
) -> Result<ReleaseOutcome> {
    let reporter = &ctx.reporter;
    reporter.phase("Resolving tags");
    let plan = resolve_plan(ctx, source, force_release).await?;

    match &plan.new_tag {
        Some(tag) => {
            let path = write_release_signal(&ctx.config.layout, tag)?;
            reporter.success(&format!("Releasing {tag} (signal at {})", path.display()));
        }
        None => {
            reporter.info(&format!(
                "{} is already released, building with placeholder tag",
                plan.upstream_tag
            ));
            if clear_release_signal(&ctx.config.layout)? {
                reporter.warning("Removed release signal left by an earlier run");
            }
        }
    }

    let build = do_build(ctx, &plan.upstream_tag, plan.build_tag()).await?;
    Ok(ReleaseOutcome { plan, build })
}
