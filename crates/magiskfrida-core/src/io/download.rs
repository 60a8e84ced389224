//! Cached downloads of upstream release assets.
//!
//! A file that already exists at the destination is never fetched again.
//! Fresh downloads stream into a `.part` sibling that is renamed into place
//! only once the body has been fully written.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use futures::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::Reporter;
use crate::error::{BuildError, IoContext, Result};

/// What [`download_cached`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The destination already existed; no request was made.
    Cached,
    /// The file was fetched; carries the byte count.
    Fetched(u64),
}

/// Request for a download operation
pub struct DownloadRequest<'a, R: Reporter + ?Sized> {
    pub client: &'a Client,
    pub url: &'a str,
    pub dest: &'a Path,
    pub timeout: Duration,
    pub reporter: &'a R,
}

impl<R: Reporter + ?Sized> std::fmt::Debug for DownloadRequest<'_, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadRequest")
            .field("url", &self.url)
            .field("dest", &self.dest)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Download `url` to `dest` unless `dest` is already present.
///
/// HTTP errors, timeouts and write failures are all fatal; nothing is retried.
pub async fn download_cached<R: Reporter + ?Sized>(
    req: DownloadRequest<'_, R>,
) -> Result<DownloadOutcome> {
    let file_name = crate::filename_from_url(req.url);

    if tokio::fs::try_exists(req.dest).await.at(req.dest)? {
        req.reporter.download_skipped(file_name);
        return Ok(DownloadOutcome::Cached);
    }

    tracing::debug!(url = req.url, dest = %req.dest.display(), "downloading");
    let start = Instant::now();

    let response = req
        .client
        .get(req.url)
        .timeout(req.timeout)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await
        .and_then(reqwest::Response::error_for_status)
        .map_err(|e| BuildError::transport(req.url, req.timeout, e))?;

    let part = part_path(req.dest);
    let written = match write_body(response, &part, req.url, req.timeout).await {
        Ok(n) => n,
        Err(e) => {
            let _ = tokio::fs::remove_file(&part).await;
            return Err(e);
        }
    };

    tokio::fs::rename(&part, req.dest).await.at(req.dest)?;
    req.reporter
        .downloaded(file_name, written, start.elapsed().as_secs_f64());

    Ok(DownloadOutcome::Fetched(written))
}

async fn write_body(
    response: reqwest::Response,
    part: &Path,
    url: &str,
    timeout: Duration,
) -> Result<u64> {
    let mut file = File::create(part).await.at(part)?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| BuildError::transport(url, timeout, e))?;
        file.write_all(&chunk).await.at(part)?;
        written += chunk.len() as u64;
    }

    file.flush().await.at(part)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullReporter;
    use crate::reporter::testing::RecordingReporter;
    use mockito::Server;
    use std::io::Write;

    #[tokio::test]
    async fn test_fetches_and_renames() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/asset.xz")
            .with_status(200)
            .with_body("payload")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("asset.xz");
        let url = format!("{}/asset.xz", server.url());
        let client = Client::new();

        let outcome = download_cached(DownloadRequest {
            client: &client,
            url: &url,
            dest: &dest,
            timeout: Duration::from_secs(5),
            reporter: &NullReporter,
        })
        .await
        .unwrap();

        assert_eq!(outcome, DownloadOutcome::Fetched(7));
        assert_eq!(std::fs::read(&dest).unwrap(), b"payload");
        assert!(!part_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_existing_file_makes_no_request() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", "/asset.xz")
            .expect(0)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("asset.xz");
        std::fs::write(&dest, b"cached").unwrap();
        let url = format!("{}/asset.xz", server.url());
        let client = Client::new();
        let reporter = RecordingReporter::default();

        let outcome = download_cached(DownloadRequest {
            client: &client,
            url: &url,
            dest: &dest,
            timeout: Duration::from_secs(5),
            reporter: &reporter,
        })
        .await
        .unwrap();

        assert_eq!(outcome, DownloadOutcome::Cached);
        assert_eq!(reporter.count("skipped:asset.xz"), 1);
        assert_eq!(std::fs::read(&dest).unwrap(), b"cached");
        m.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found_leaves_nothing_behind() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing.xz")
            .with_status(404)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing.xz");
        let url = format!("{}/missing.xz", server.url());
        let client = Client::new();

        let err = download_cached(DownloadRequest {
            client: &client,
            url: &url,
            dest: &dest,
            timeout: Duration::from_secs(5),
            reporter: &NullReporter,
        })
        .await
        .unwrap_err();

        assert!(matches!(err, BuildError::HttpStatus { status, .. } if status.as_u16() == 404));
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_stalled_body_times_out_and_cleans_up() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/slow.xz")
            .with_status(200)
            .with_chunked_body(|w| {
                w.write_all(b"first chunk")?;
                w.flush()?;
                std::thread::sleep(Duration::from_secs(2));
                w.write_all(b"never read")
            })
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("slow.xz");
        let url = format!("{}/slow.xz", server.url());
        let client = Client::new();

        let err = download_cached(DownloadRequest {
            client: &client,
            url: &url,
            dest: &dest,
            timeout: Duration::from_millis(300),
            reporter: &NullReporter,
        })
        .await
        .unwrap_err();

        assert!(
            matches!(err, BuildError::Timeout { ref url, .. } if url.ends_with("/slow.xz")),
            "unexpected error: {err}"
        );
        assert!(!dest.exists());
        assert!(!part_path(&dest).exists());
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            part_path(Path::new("/d/frida-server-16.1.4-android-arm.xz")),
            Path::new("/d/frida-server-16.1.4-android-arm.xz.part")
        );
    }
}
