//! Module assembly: template instantiation, generated metadata and packaging.
//!
//! All functions here are blocking; the pipeline runs them on
//! `spawn_blocking`.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use fs_extra::dir::CopyOptions;
use magiskfrida_schema::version::version_code;
use magiskfrida_schema::{ModuleProp, UpdaterManifest};
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::config::Layout;
use crate::error::{BuildError, IoContext, Result};
use crate::repo::GitHubRepo;

pub const MODULE_ID: &str = "magisk-frida";
pub const MODULE_NAME: &str = "MagiskFrida";
pub const MODULE_AUTHOR: &str = "ViRb3 & enovella";
pub const MODULE_DESCRIPTION: &str = "Runs frida-server on boot";

/// Files present in the template only to keep directories in version control.
const SKIPPED_FILES: &[&str] = &["placeholder", ".gitkeep"];

/// `MagiskFrida-<tag>.zip`
pub fn archive_name(tag: &str) -> String {
    format!("{MODULE_NAME}-{tag}.zip")
}

pub fn module_prop(project: &GitHubRepo, tag: &str) -> Result<ModuleProp> {
    Ok(ModuleProp {
        id: MODULE_ID.to_string(),
        name: MODULE_NAME.to_string(),
        version: tag.to_string(),
        version_code: version_code(tag)?,
        author: MODULE_AUTHOR.to_string(),
        update_json: project.latest_asset_url("https://github.com", "updater.json"),
        description: MODULE_DESCRIPTION.to_string(),
    })
}

pub fn updater_manifest(project: &GitHubRepo, tag: &str) -> Result<UpdaterManifest> {
    Ok(UpdaterManifest::new(
        tag,
        project.release_asset_url("https://github.com", tag, &archive_name(tag)),
        project.raw_file_url("CHANGELOG.md"),
    )?)
}

/// Instantiate a fresh module tree from the template and write `module.prop`.
///
/// Any tree left over from an earlier failed build is removed first.
pub fn create_module(layout: &Layout, project: &GitHubRepo, tag: &str) -> Result<PathBuf> {
    let template = layout.template_dir();
    let module_dir = layout.module_dir();

    // Render first so a bad tag fails before anything on disk changes.
    let prop = module_prop(project, tag)?;

    if module_dir.exists() {
        tracing::debug!(dir = %module_dir.display(), "removing previous module tree");
        fs::remove_dir_all(&module_dir).at(&module_dir)?;
    }

    if !template.is_dir() {
        return Err(BuildError::io(
            &template,
            io::Error::new(io::ErrorKind::NotFound, "module template directory missing"),
        ));
    }

    fs::create_dir_all(&module_dir).at(&module_dir)?;
    let options = CopyOptions::new().content_only(true);
    fs_extra::dir::copy(&template, &module_dir, &options)?;

    let prop_path = module_dir.join("module.prop");
    fs::write(&prop_path, prop.render()).at(&prop_path)?;
    tracing::debug!(version_code = prop.version_code, "wrote module.prop");

    Ok(module_dir)
}

/// Write `updater.json` into the build output directory.
pub fn write_updater_json(layout: &Layout, project: &GitHubRepo, tag: &str) -> Result<PathBuf> {
    let manifest = updater_manifest(project, tag)?;
    let json = manifest
        .to_json()
        .map_err(|source| BuildError::Serialize {
            what: "updater.json",
            source,
        })?;

    let path = layout.updater_json();
    fs::write(&path, json).at(&path)?;
    tracing::debug!(zip_url = %manifest.zip_url, "wrote updater.json");
    Ok(path)
}

/// Result of [`package_module`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedModule {
    pub path: PathBuf,
    pub files: usize,
    pub bytes: u64,
}

/// Zip the module tree into `build/MagiskFrida-<tag>.zip` and delete the tree.
///
/// Placeholder files are left out. If archiving fails the tree is kept for
/// inspection and the partial archive is removed.
pub fn package_module(layout: &Layout, tag: &str) -> Result<PackagedModule> {
    let module_dir = layout.module_dir();
    let archive_path = layout.build_dir().join(archive_name(tag));

    let files = match write_archive(&module_dir, &archive_path) {
        Ok(files) => files,
        Err(e) => {
            let _ = fs::remove_file(&archive_path);
            return Err(e);
        }
    };

    let bytes = fs::metadata(&archive_path).at(&archive_path)?.len();
    fs::remove_dir_all(&module_dir).at(&module_dir)?;

    Ok(PackagedModule {
        path: archive_path,
        files,
        bytes,
    })
}

fn write_archive(root: &Path, archive_path: &Path) -> Result<usize> {
    let file = File::create(archive_path).at(archive_path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let mut count = 0;

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            BuildError::io(path, io::Error::other(e))
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_name = entry.file_name().to_string_lossy();
        if SKIPPED_FILES.contains(&&*file_name) {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let options = with_permissions(deflated(), entry.path())?;
        zip.start_file(name, options)?;
        let mut source = File::open(entry.path()).at(entry.path())?;
        io::copy(&mut source, &mut zip).at(entry.path())?;
        count += 1;
    }

    zip.finish()?.flush().at(archive_path)?;
    Ok(count)
}

fn deflated() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated)
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, path: &Path) -> Result<SimpleFileOptions> {
    use std::os::unix::fs::PermissionsExt;
    let mode = fs::metadata(path).at(path)?.permissions().mode();
    Ok(options.unix_permissions(mode & 0o777))
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _path: &Path) -> Result<SimpleFileOptions> {
    Ok(options)
}
