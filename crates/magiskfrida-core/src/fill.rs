//! Per-architecture fill: fetch one frida-server archive and unpack it into
//! the module tree.

use std::path::PathBuf;

use magiskfrida_schema::Arch;

use crate::config::BuildConfig;
use crate::context::BuildContext;
use crate::error::Result;
use crate::io::download::{DownloadRequest, download_cached};
use crate::io::extract::extract_xz;

/// Upstream asset name, e.g. `frida-server-16.1.4-android-arm64.xz`.
pub fn server_asset_name(config: &BuildConfig, tag: &str, arch: Arch) -> String {
    format!("{}-server-{tag}-android-{arch}.xz", config.upstream.name())
}

/// Where the upstream asset for `arch` is published.
pub fn server_download_url(config: &BuildConfig, tag: &str, arch: Arch) -> String {
    config.upstream.release_asset_url(
        &config.download_base,
        tag,
        &server_asset_name(config, tag, arch),
    )
}

/// Download (or reuse) the server archive for `arch` and unpack it to
/// `files/frida-server-<arch>` inside the module tree.
///
/// The caller must have created the module's `files/` directory already.
pub async fn fill_architecture(ctx: &BuildContext, arch: Arch, upstream_tag: &str) -> Result<PathBuf> {
    let config = &ctx.config;
    let layout = &config.layout;
    let url = server_download_url(config, upstream_tag, arch);
    let archive = layout
        .downloads_dir()
        .join(server_asset_name(config, upstream_tag, arch));

    tracing::debug!(%arch, tag = upstream_tag, "filling module");
    download_cached(DownloadRequest {
        client: &ctx.client,
        url: &url,
        dest: &archive,
        timeout: config.timeouts.download,
        reporter: ctx.reporter.as_ref(),
    })
    .await?;

    let dest = layout.files_dir().join(arch.server_file_name());
    extract_xz(&archive, &dest, ctx.reporter.as_ref()).await?;

    Ok(dest)
}
