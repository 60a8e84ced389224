//! Generated module metadata: `module.prop` and `updater.json`.

use serde::{Deserialize, Serialize};

use crate::version::{VersionError, version_code};

/// Contents of a Magisk `module.prop` descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleProp {
    /// Module id (stable across releases).
    pub id: String,
    /// Human-readable module name.
    pub name: String,
    /// Human-readable version (the project tag).
    pub version: String,
    /// Numeric version code derived from `version`.
    pub version_code: u64,
    /// Author line.
    pub author: String,
    /// URL of the updater descriptor Magisk polls for updates.
    pub update_json: String,
    /// One-line description.
    pub description: String,
}

impl ModuleProp {
    /// Render as `key=value` lines separated by `\n`, without a trailing newline.
    ///
    /// ```
    /// use magiskfrida_schema::ModuleProp;
    ///
    /// let prop = ModuleProp {
    ///     id: "magisk-frida".into(),
    ///     name: "MagiskFrida".into(),
    ///     version: "16.1.4-1".into(),
    ///     version_code: 16_010_401,
    ///     author: "someone".into(),
    ///     update_json: "https://example.com/updater.json".into(),
    ///     description: "Runs frida-server on boot".into(),
    /// };
    /// assert!(prop.render().starts_with("id=magisk-frida\nname=MagiskFrida\n"));
    /// assert!(!prop.render().ends_with('\n'));
    /// ```
    pub fn render(&self) -> String {
        let version_code = self.version_code.to_string();
        [
            ("id", self.id.as_str()),
            ("name", self.name.as_str()),
            ("version", self.version.as_str()),
            ("versionCode", version_code.as_str()),
            ("author", self.author.as_str()),
            ("updateJson", self.update_json.as_str()),
            ("description", self.description.as_str()),
        ]
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("\n")
    }
}

/// Contents of the `updater.json` file Magisk fetches to discover new releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdaterManifest {
    /// Latest version tag.
    pub version: String,
    /// Numeric version code of `version`.
    pub version_code: u64,
    /// Download URL of the packaged module.
    pub zip_url: String,
    /// URL of the changelog.
    pub changelog: String,
}

impl UpdaterManifest {
    /// Build a manifest for `tag`, deriving the version code.
    ///
    /// # Errors
    ///
    /// Returns a [`VersionError`] if `tag` has no valid version code.
    pub fn new(
        tag: &str,
        zip_url: impl Into<String>,
        changelog: impl Into<String>,
    ) -> Result<Self, VersionError> {
        Ok(Self {
            version: tag.to_string(),
            version_code: version_code(tag)?,
            zip_url: zip_url.into(),
            changelog: changelog.into(),
        })
    }

    /// Serialize as JSON indented with four spaces.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever writes valid UTF-8.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
