/// A validated GitHub repository reference in `owner/repo` format.
///
/// # Example
///
/// ```
/// use magiskfrida_core::repo::GitHubRepo;
///
/// let repo = GitHubRepo::new("frida/frida").unwrap();
/// assert_eq!(repo.owner(), "frida");
/// assert_eq!(repo.name(), "frida");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct GitHubRepo(String);

impl GitHubRepo {
    /// Create a new `GitHubRepo`, validating the `owner/repo` format.
    ///
    /// # Errors
    ///
    /// Returns an error string if `s` is not in `owner/repo` format or if
    /// either component is empty.
    pub fn new(s: &str) -> Result<Self, String> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self(s.to_string()))
            }
            _ => Err(format!(
                "Invalid GitHub repo format: expected 'owner/repo', got '{s}'"
            )),
        }
    }

    /// Get the owner part.
    pub fn owner(&self) -> &str {
        self.0.split('/').next().unwrap_or("")
    }

    /// Get the repo name part.
    pub fn name(&self) -> &str {
        self.0.split('/').nth(1).unwrap_or("")
    }

    /// Return the raw `owner/repo` string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `GET` endpoint describing the most recent release.
    pub fn latest_release_api_url(&self, api_base: &str) -> String {
        format!(
            "{}/repos/{}/releases/latest",
            api_base.trim_end_matches('/'),
            self.0
        )
    }

    /// Download URL of a release asset.
    pub fn release_asset_url(&self, host: &str, tag: &str, asset: &str) -> String {
        format!(
            "{}/{}/releases/download/{tag}/{asset}",
            host.trim_end_matches('/'),
            self.0
        )
    }

    /// Download URL of an asset attached to whichever release is latest.
    pub fn latest_asset_url(&self, host: &str, asset: &str) -> String {
        format!(
            "{}/{}/releases/latest/download/{asset}",
            host.trim_end_matches('/'),
            self.0
        )
    }

    /// Raw file URL on the `master` branch.
    pub fn raw_file_url(&self, path: &str) -> String {
        format!("https://raw.githubusercontent.com/{}/master/{path}", self.0)
    }
}

impl std::fmt::Display for GitHubRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GitHubRepo {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
