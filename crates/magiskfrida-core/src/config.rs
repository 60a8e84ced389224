//! Build configuration and on-disk layout.
//!
//! ```text
//! <root>/
//! ├── base/           # static module template
//! ├── downloads/      # cached upstream .xz archives
//! ├── build/
//! │   ├── tmp/        # module tree, deleted after packaging
//! │   ├── MagiskFrida-<tag>.zip
//! │   └── updater.json
//! └── NEW_TAG.txt     # written only when a release is due
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::repo::GitHubRepo;

/// Environment variable that forces a release even when versions match.
pub const FORCE_RELEASE_ENV: &str = "FORCE_RELEASE";

/// Default upstream project whose releases drive versioning.
pub const DEFAULT_UPSTREAM: &str = "frida/frida";

/// Default repository the module itself is published from.
pub const DEFAULT_PROJECT: &str = "ViRb3/magisk-frida";

/// Default GitHub REST API base.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default host serving release assets.
pub const DEFAULT_DOWNLOAD_BASE: &str = "https://github.com";

/// Fixed paths used by a build, all relative to one root directory.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Static module template: `<root>/base`
    pub fn template_dir(&self) -> PathBuf {
        self.root.join("base")
    }

    /// Build output: `<root>/build`
    pub fn build_dir(&self) -> PathBuf {
        self.root.join("build")
    }

    /// Module tree being assembled: `<root>/build/tmp`
    pub fn module_dir(&self) -> PathBuf {
        self.build_dir().join("tmp")
    }

    /// Per-architecture server binaries: `<root>/build/tmp/files`
    pub fn files_dir(&self) -> PathBuf {
        self.module_dir().join("files")
    }

    /// Upstream archive cache: `<root>/downloads`
    pub fn downloads_dir(&self) -> PathBuf {
        self.root.join("downloads")
    }

    /// Release signal consumed by the deploy step: `<root>/NEW_TAG.txt`
    pub fn release_signal(&self) -> PathBuf {
        self.root.join("NEW_TAG.txt")
    }

    /// Updater descriptor: `<root>/build/updater.json`
    pub fn updater_json(&self) -> PathBuf {
        self.build_dir().join("updater.json")
    }
}

/// Network timeouts. Requests are never retried.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub api: Duration,
    pub download: Duration,
    pub git: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            api: Duration::from_secs(10),
            download: Duration::from_secs(30),
            git: Duration::from_secs(30),
        }
    }
}

/// Everything a build run needs to know.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub layout: Layout,
    pub upstream: GitHubRepo,
    pub project: GitHubRepo,
    pub api_base: String,
    pub download_base: String,
    pub github_token: Option<String>,
    pub timeouts: Timeouts,
}

impl BuildConfig {
    /// Defaults for a build rooted at `root`.
    ///
    /// # Errors
    ///
    /// Fails only if the built-in repository names are malformed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, String> {
        Ok(Self {
            layout: Layout::new(root),
            upstream: GitHubRepo::new(DEFAULT_UPSTREAM)?,
            project: GitHubRepo::new(DEFAULT_PROJECT)?,
            api_base: DEFAULT_API_BASE.to_string(),
            download_base: DEFAULT_DOWNLOAD_BASE.to_string(),
            github_token: None,
            timeouts: Timeouts::default(),
        })
    }
}

/// Interpret a boolean-like environment value: `true` (any case) or `1`.
pub fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Read the force-release flag from the process environment.
pub fn force_release_from_env() -> bool {
    parse_flag(std::env::var(FORCE_RELEASE_ENV).ok().as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some("TRUE")));
        assert!(parse_flag(Some("1")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(Some("yes")));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn test_layout_paths() {
        let layout = Layout::new("/work");
        assert_eq!(layout.module_dir(), Path::new("/work/build/tmp"));
        assert_eq!(layout.files_dir(), Path::new("/work/build/tmp/files"));
        assert_eq!(layout.release_signal(), Path::new("/work/NEW_TAG.txt"));
        assert_eq!(layout.updater_json(), Path::new("/work/build/updater.json"));
    }
}
