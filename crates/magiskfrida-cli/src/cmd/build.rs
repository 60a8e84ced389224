//! Build command

use anyhow::{Context, Result};
use magiskfrida_core::BuildConfig;
use magiskfrida_core::pipeline::do_build;

/// Build the module for explicit tags.
pub async fn build(config: BuildConfig, upstream_tag: &str, tag: &str) -> Result<()> {
    let ctx = super::build_context(config)?;
    let output = do_build(&ctx, upstream_tag, tag)
        .await
        .with_context(|| format!("build of {tag} failed"))?;
    println!("{}", output.archive.path.display());
    Ok(())
}
