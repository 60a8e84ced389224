//! End-to-end tests driving the `magiskfrida` binary.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tokio::io::AsyncWriteExt;

const ARCHES: [&str; 4] = ["arm", "arm64", "x86", "x86_64"];

/// Temporary working directory with a minimal module template.
struct TestContext {
    temp_dir: TempDir,
}

impl TestContext {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().join("base");
        std::fs::create_dir_all(base.join("files")).expect("failed to create template");
        std::fs::write(base.join("service.sh"), "#!/system/bin/sh\n").unwrap();
        std::fs::write(base.join("files/placeholder"), "").unwrap();
        Self { temp_dir }
    }

    fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    fn build_dir(&self) -> PathBuf {
        self.root().join("build")
    }

    fn cmd(&self) -> Command {
        let bin_path = env!("CARGO_BIN_EXE_magiskfrida");
        let mut cmd = Command::new(bin_path);
        cmd.arg("--root").arg(self.root());
        cmd.env_remove("MAGISKFRIDA_UPSTREAM");
        cmd.env_remove("MAGISKFRIDA_PROJECT");
        cmd.env_remove("MAGISKFRIDA_API_BASE");
        cmd.env_remove("MAGISKFRIDA_DOWNLOAD_BASE");
        cmd.env_remove("GITHUB_TOKEN");
        cmd.env_remove("FORCE_RELEASE");
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

fn xz(data: &[u8]) -> Vec<u8> {
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let mut encoder = async_compression::tokio::write::XzEncoder::new(Vec::new());
        encoder.write_all(data).await.unwrap();
        encoder.shutdown().await.unwrap();
        encoder.into_inner()
    })
}

fn mock_servers(server: &mut mockito::ServerGuard, tag: &str, missing: Option<&str>) -> Vec<mockito::Mock> {
    ARCHES
        .iter()
        .map(|arch| {
            let path =
                format!("/frida/frida/releases/download/{tag}/frida-server-{tag}-android-{arch}.xz");
            let mock = server.mock("GET", path.as_str());
            if missing == Some(*arch) {
                mock.with_status(404).create()
            } else {
                mock.with_status(200)
                    .with_body(xz(format!("server for {arch}").as_bytes()))
                    .create()
            }
        })
        .collect()
}

#[test]
fn test_help_command() {
    let ctx = TestContext::new();
    let output = ctx
        .cmd()
        .arg("--help")
        .output()
        .expect("failed to run magiskfrida");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("version-code"));
}

#[test]
fn test_version_command() {
    let ctx = TestContext::new();
    let output = ctx
        .cmd()
        .arg("--version")
        .output()
        .expect("failed to run magiskfrida");
    assert!(output.status.success());
}

#[test]
fn test_version_code_command() {
    let ctx = TestContext::new();
    let output = ctx
        .cmd()
        .args(["version-code", "12.7.5"])
        .output()
        .expect("failed to run magiskfrida");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "120705");
}

#[test]
fn test_version_code_rejects_wide_segment() {
    let ctx = TestContext::new();
    let output = ctx
        .cmd()
        .args(["version-code", "1.2.100"])
        .output()
        .expect("failed to run magiskfrida");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_build_command_packages_module() {
    let ctx = TestContext::new();
    let mut server = mockito::Server::new();
    let mocks = mock_servers(&mut server, "16.1.4", None);

    let output = ctx
        .cmd()
        .args(["--download-base", server.url().as_str()])
        .args(["build", "--upstream-tag", "16.1.4", "--tag", "16.1.4-1"])
        .output()
        .expect("failed to run magiskfrida");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let archive_path = ctx.build_dir().join("MagiskFrida-16.1.4-1.zip");
    let archive = zip::ZipArchive::new(std::fs::File::open(&archive_path).unwrap()).unwrap();
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort_unstable();
    assert_eq!(
        names,
        [
            "files/frida-server-arm",
            "files/frida-server-arm64",
            "files/frida-server-x86",
            "files/frida-server-x86_64",
            "module.prop",
            "service.sh",
        ]
    );
    assert!(ctx.build_dir().join("updater.json").exists());
    assert!(!ctx.root().join("NEW_TAG.txt").exists());
    for mock in mocks {
        mock.assert();
    }
}

#[test]
fn test_build_command_fails_when_an_architecture_is_missing() {
    let ctx = TestContext::new();
    let mut server = mockito::Server::new();
    let _mocks = mock_servers(&mut server, "16.1.4", Some("arm64"));

    let output = ctx
        .cmd()
        .args(["--download-base", server.url().as_str()])
        .args(["build", "--upstream-tag", "16.1.4"])
        .output()
        .expect("failed to run magiskfrida");

    assert!(!output.status.success());
    assert!(!ctx.build_dir().join("MagiskFrida-0.zip").exists());
}

#[test]
fn test_download_base_from_environment() {
    let ctx = TestContext::new();
    let mut server = mockito::Server::new();
    let mocks = mock_servers(&mut server, "16.1.4", None);

    let output = ctx
        .cmd()
        .env("MAGISKFRIDA_DOWNLOAD_BASE", server.url())
        .args(["build", "--upstream-tag", "16.1.4"])
        .output()
        .expect("failed to run magiskfrida");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert!(ctx.build_dir().join("MagiskFrida-0.zip").exists());
    for mock in mocks {
        mock.assert();
    }
}

#[test]
fn test_api_base_from_environment() {
    let ctx = TestContext::new();
    let mut server = mockito::Server::new();
    let api = server
        .mock("GET", "/repos/frida/frida/releases/latest")
        .with_status(500)
        .create();

    // `plan` stops at the failed upstream lookup, before git is consulted.
    let output = ctx
        .cmd()
        .env("MAGISKFRIDA_API_BASE", server.url())
        .arg("plan")
        .output()
        .expect("failed to run magiskfrida");

    assert!(!output.status.success());
    api.assert();
}
