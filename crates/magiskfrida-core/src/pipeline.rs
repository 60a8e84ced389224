//! Build orchestration.
//!
//! Phases run strictly in order: prepare, assemble, fill, package, finalize.
//! Only the fill phase is parallel, one task per architecture. Any failure
//! aborts the remaining phases; a module missing an architecture is never
//! packaged.

use std::path::PathBuf;

use magiskfrida_schema::Arch;
use tokio::task::JoinSet;

use crate::assembler::{self, PackagedModule};
use crate::context::BuildContext;
use crate::error::{BuildError, IoContext, Result};
use crate::fill::fill_architecture;

/// Everything a successful build produced.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub archive: PackagedModule,
    pub updater_json: PathBuf,
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await?
}

/// Build the module for `project_tag` bundling servers from `upstream_tag`.
pub async fn do_build(ctx: &BuildContext, upstream_tag: &str, project_tag: &str) -> Result<BuildOutput> {
    let reporter = &ctx.reporter;
    let layout = ctx.config.layout.clone();

    reporter.info(&format!(
        "Building {} with {} {upstream_tag} into {}",
        assembler::archive_name(project_tag),
        ctx.config.upstream,
        layout.build_dir().display()
    ));

    reporter.phase("Preparing directories");
    for dir in [layout.downloads_dir(), layout.build_dir()] {
        tokio::fs::create_dir_all(&dir).await.at(&dir)?;
    }

    reporter.phase("Creating module");
    {
        let layout = layout.clone();
        let project = ctx.config.project.clone();
        let tag = project_tag.to_string();
        blocking(move || assembler::create_module(&layout, &project, &tag)).await?;
    }
    // Workers only ever write their own file under here.
    let files_dir = layout.files_dir();
    tokio::fs::create_dir_all(&files_dir).await.at(&files_dir)?;

    reporter.phase("Filling architectures");
    fill_all(ctx, upstream_tag).await?;

    reporter.phase("Packaging module");
    let archive = {
        let layout = layout.clone();
        let tag = project_tag.to_string();
        blocking(move || assembler::package_module(&layout, &tag)).await?
    };
    reporter.success(&format!(
        "Packaged {} ({} files, {:.2} MB)",
        archive.path.display(),
        archive.files,
        archive.bytes as f64 / (1024.0 * 1024.0)
    ));

    reporter.phase("Writing updater.json");
    let updater_json = {
        let project = ctx.config.project.clone();
        let tag = project_tag.to_string();
        blocking(move || assembler::write_updater_json(&layout, &project, &tag)).await?
    };

    reporter.success("Build completed");
    Ok(BuildOutput {
        archive,
        updater_json,
    })
}

/// Run one fill task per architecture and wait for all of them.
///
/// Siblings of a failed task are not cancelled; every outcome is reported
/// and the first failure observed is returned.
async fn fill_all(ctx: &BuildContext, upstream_tag: &str) -> Result<()> {
    let total = Arch::ALL.len();
    let mut set: JoinSet<(Arch, Result<PathBuf>)> = JoinSet::new();

    for arch in Arch::ALL {
        let ctx = ctx.clone();
        let tag = upstream_tag.to_string();
        set.spawn(async move {
            let result = fill_architecture(&ctx, arch, &tag).await;
            (arch, result)
        });
    }

    let mut completed = 0;
    let mut first_error: Option<BuildError> = None;

    while let Some(joined) = set.join_next().await {
        let failure = match joined {
            Ok((arch, Ok(_))) => {
                completed += 1;
                ctx.reporter.arch_done(arch, completed, total);
                continue;
            }
            Ok((arch, Err(e))) => {
                ctx.reporter.arch_failed(arch, &e.to_string());
                BuildError::Architecture {
                    arch,
                    source: Box::new(e),
                }
            }
            Err(e) => {
                ctx.reporter.error(&format!("Fill task aborted: {e}"));
                BuildError::Join(e)
            }
        };
        first_error.get_or_insert(failure);
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
