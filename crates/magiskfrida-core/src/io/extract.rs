//! Single-file `.xz` decompression.

use std::path::Path;
use std::time::Instant;

use async_compression::tokio::bufread::XzDecoder;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufReader};

use crate::Reporter;
use crate::error::{IoContext, Result};

/// Decompress `archive` into `dest`, creating parent directories as needed.
///
/// On Unix the output is marked executable. Returns the decompressed size.
pub async fn extract_xz<R: Reporter + ?Sized>(
    archive: &Path,
    dest: &Path,
    reporter: &R,
) -> Result<u64> {
    let start = Instant::now();

    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent).await.at(parent)?;
    }

    let input = File::open(archive).await.at(archive)?;
    let mut decoder = XzDecoder::new(BufReader::new(input));
    let mut output = File::create(dest).await.at(dest)?;

    // Corrupt input shows up as an io::Error from the decoder.
    let written = tokio::io::copy(&mut decoder, &mut output)
        .await
        .at(archive)?;
    output.flush().await.at(dest)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(dest, std::fs::Permissions::from_mode(0o755))
            .await
            .at(dest)?;
    }

    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    reporter.extracted(&name, written, start.elapsed().as_secs_f64());

    Ok(written)
}
