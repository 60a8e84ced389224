//! Tag resolution: upstream releases over the GitHub API, project tags from git.

use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use magiskfrida_schema::version;
use reqwest::Client;
use serde::Deserialize;
use wait_timeout::ChildExt;

use crate::error::{BuildError, Result};
use crate::repo::GitHubRepo;

#[derive(Deserialize)]
struct LatestRelease {
    tag_name: Option<String>,
}

/// Tag name of the most recent release of `repo`.
///
/// Timeouts, non-2xx responses, malformed JSON and a missing `tag_name`
/// each surface as their own [`BuildError`] variant.
pub async fn latest_upstream_tag(
    client: &Client,
    api_base: &str,
    repo: &GitHubRepo,
    token: Option<&str>,
    timeout: Duration,
) -> Result<String> {
    let url = repo.latest_release_api_url(api_base);
    tracing::debug!(%url, "querying latest release");

    let mut request = client
        .get(&url)
        .timeout(timeout)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .header(reqwest::header::ACCEPT, "application/vnd.github+json");
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }

    let body = request
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| BuildError::transport(&url, timeout, e))?
        .text()
        .await
        .map_err(|e| BuildError::transport(&url, timeout, e))?;

    let release: LatestRelease = serde_json::from_str(&body).map_err(|source| {
        BuildError::Decode {
            url: url.clone(),
            source,
        }
    })?;

    let tag = release.tag_name.ok_or(BuildError::MissingField {
        url,
        field: "tag_name",
    })?;
    tracing::debug!(repo = %repo, %tag, "latest upstream release");
    Ok(tag)
}

/// Anything that can list the project's tags, optionally filtered by glob
/// patterns. Implemented by [`GitTags`]; tests substitute an in-memory list.
pub trait TagSource: Send + Sync {
    fn list_tags(&self, patterns: &[&str]) -> Result<Vec<String>>;
}

/// Numerically greatest tag matching `patterns`, or `None` when nothing matches.
///
/// A listing failure is an error; an empty listing is not.
pub fn latest_local_tag(source: &dyn TagSource, patterns: &[&str]) -> Result<Option<String>> {
    let tags = source.list_tags(patterns)?;
    tracing::debug!(count = tags.len(), ?patterns, "listed tags");
    Ok(version::latest_tag(&tags)?)
}

/// Whether `tag` exists exactly, answered by filtering the listing on it.
pub fn tag_exists(source: &dyn TagSource, tag: &str) -> Result<bool> {
    Ok(latest_local_tag(source, &[tag])?.as_deref() == Some(tag))
}

/// Next free `<base>-<n>` revision according to `source`.
///
/// One listing per candidate; fine for the handful of revisions a release
/// line accumulates.
pub fn next_project_tag(source: &dyn TagSource, base: &str) -> Result<String> {
    let tag = version::next_revision(base, |candidate| {
        tracing::debug!(candidate, "checking whether tag exists");
        tag_exists(source, candidate)
    })?;
    tracing::debug!(%tag, "next free revision");
    Ok(tag)
}

/// Lists tags by running `git tag -l [patterns...]`.
#[derive(Debug, Clone)]
pub struct GitTags {
    program: String,
    repo_dir: PathBuf,
    timeout: Duration,
}

impl GitTags {
    pub fn new(repo_dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: "git".to_string(),
            repo_dir: repo_dir.into(),
            timeout,
        }
    }

    /// Use a different executable in place of `git`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let display_args = args.join(" ");
        tracing::debug!(program = %self.program, args = %display_args, "running command");

        let mut child = Command::new(&self.program)
            .args(args)
            .current_dir(&self.repo_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| BuildError::io(&self.repo_dir, e))?;

        // Drain both pipes on their own threads so a chatty child can't block.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(BuildError::CommandTimeout {
                    program: self.program.clone(),
                    args: display_args,
                    timeout: self.timeout,
                });
            }
            Err(e) => return Err(BuildError::io(&self.repo_dir, e)),
        };

        let stdout = join_drain(stdout);
        let stderr = join_drain(stderr);

        if !status.success() {
            return Err(BuildError::Command {
                program: self.program.clone(),
                args: display_args,
                status: status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> std::thread::JoinHandle<String> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_drain(handle: Option<std::thread::JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

impl TagSource for GitTags {
    fn list_tags(&self, patterns: &[&str]) -> Result<Vec<String>> {
        let mut args = vec!["tag", "-l"];
        args.extend_from_slice(patterns);
        let output = self.run(&args)?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }
}
