//! Release command

use anyhow::{Context, Result};
use magiskfrida_core::BuildConfig;
use magiskfrida_core::config::force_release_from_env;
use magiskfrida_core::release::run_release;

/// Run the full release workflow.
pub async fn release(config: BuildConfig, force: bool) -> Result<()> {
    let force = force || force_release_from_env();
    let tags = super::git_tags(&config);
    let ctx = super::build_context(config)?;

    let outcome = run_release(&ctx, tags, force)
        .await
        .context("release failed")?;

    match &outcome.plan.new_tag {
        Some(tag) => tracing::info!(%tag, archive = %outcome.build.archive.path.display(), "release ready"),
        None => tracing::info!(
            archive = %outcome.build.archive.path.display(),
            "no release due, pipeline validated"
        ),
    }
    Ok(())
}
