//! Shared fixtures for pipeline tests: a temp workspace with a module
//! template, and mocked upstream endpoints.

use std::fs;
use std::sync::Arc;

use magiskfrida_schema::Arch;
use mockito::{Mock, ServerGuard};
use tempfile::TempDir;

use crate::config::{BuildConfig, Layout};
use crate::context::BuildContext;
use crate::io::extract::testing::xz;
use crate::reporter::Reporter;
use crate::reporter::testing::RecordingReporter;

pub(crate) struct Fixture {
    pub(crate) _dir: TempDir,
    pub(crate) ctx: BuildContext,
    pub(crate) reporter: Arc<RecordingReporter>,
}

impl Fixture {
    /// Workspace whose API and download hosts both point at `server_url`.
    pub(crate) fn new(server_url: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = BuildConfig::new(dir.path()).unwrap();
        config.api_base = server_url.to_string();
        config.download_base = server_url.to_string();

        let template = config.layout.template_dir();
        fs::create_dir_all(template.join("files")).unwrap();
        fs::create_dir_all(template.join("system")).unwrap();
        fs::write(template.join("service.sh"), "#!/system/bin/sh\n").unwrap();
        fs::write(template.join("customize.sh"), "SKIPUNZIP=0\n").unwrap();
        fs::write(template.join("files/placeholder"), "").unwrap();
        fs::write(template.join("system/.gitkeep"), "").unwrap();
        fs::create_dir_all(config.layout.downloads_dir()).unwrap();

        let reporter = Arc::new(RecordingReporter::default());
        let shared: Arc<dyn Reporter> = reporter.clone();
        let ctx = BuildContext::with_client(config, reqwest::Client::new(), shared);

        Self {
            _dir: dir,
            ctx,
            reporter,
        }
    }

    pub(crate) fn layout(&self) -> &Layout {
        &self.ctx.config.layout
    }

    /// Decompressed contents served for `arch`.
    pub(crate) fn server_bytes(arch: Arch) -> Vec<u8> {
        format!("frida-server binary for {arch}").into_bytes()
    }

    pub(crate) async fn server_archive(arch: Arch) -> Vec<u8> {
        xz(&Self::server_bytes(arch)).await
    }

    /// One mock per architecture, in [`Arch::ALL`] order. Architectures in
    /// `failing` answer 404.
    pub(crate) async fn mock_servers(
        &self,
        server: &mut ServerGuard,
        tag: &str,
        failing: &[Arch],
    ) -> Vec<Mock> {
        let mut mocks = Vec::new();
        for arch in Arch::ALL {
            let path =
                format!("/frida/frida/releases/download/{tag}/frida-server-{tag}-android-{arch}.xz");
            let mock = if failing.contains(&arch) {
                server.mock("GET", path.as_str()).with_status(404)
            } else {
                server
                    .mock("GET", path.as_str())
                    .with_status(200)
                    .with_body(Self::server_archive(arch).await)
            };
            mocks.push(mock.create_async().await);
        }
        mocks
    }

    pub(crate) async fn mock_latest_release(&self, server: &mut ServerGuard, tag: &str) -> Mock {
        server
            .mock("GET", "/repos/frida/frida/releases/latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"{{"tag_name": "{tag}"}}"#))
            .create_async()
            .await
    }
}
