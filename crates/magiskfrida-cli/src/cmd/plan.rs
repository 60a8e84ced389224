//! Plan command (dry run of the release decision)

use anyhow::{Context, Result};
use magiskfrida_core::BuildConfig;
use magiskfrida_core::config::force_release_from_env;
use magiskfrida_core::release::resolve_plan;

pub async fn plan(config: BuildConfig, force: bool) -> Result<()> {
    let force = force || force_release_from_env();
    let tags = super::git_tags(&config);
    let ctx = super::build_context(config)?;

    let plan = resolve_plan(&ctx, tags, force)
        .await
        .context("could not resolve release plan")?;

    println!("upstream:     {}", plan.upstream_tag);
    println!(
        "last project: {}",
        plan.last_project_tag.as_deref().unwrap_or("(none)")
    );
    println!("needs update: {}", plan.needs_update);
    println!("forced:       {}", plan.force_release);
    println!("build tag:    {}", plan.build_tag());
    println!(
        "release:      {}",
        if plan.should_release() { "yes" } else { "no" }
    );
    Ok(())
}
