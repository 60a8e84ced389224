//! Reporter trait for dependency injection
//!
//! Pipeline stages report progress through this trait instead of a global
//! logger, so tests can run silently and the CLI decides how output looks.

use magiskfrida_schema::Arch;

pub trait Reporter: Send + Sync {
    /// A new pipeline phase has started (e.g. "Packaging module").
    fn phase(&self, title: &str);

    /// A cached file was found and the network fetch was skipped.
    fn download_skipped(&self, file: &str);

    /// A file finished downloading.
    fn downloaded(&self, file: &str, bytes: u64, elapsed_secs: f64);

    /// An archive finished decompressing.
    fn extracted(&self, file: &str, bytes: u64, elapsed_secs: f64);

    /// One architecture completed; `completed` of `total` are now done.
    fn arch_done(&self, arch: Arch, completed: usize, total: usize);

    /// One architecture failed.
    fn arch_failed(&self, arch: Arch, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn phase(&self, title: &str) {
        (**self).phase(title);
    }
    fn download_skipped(&self, file: &str) {
        (**self).download_skipped(file);
    }
    fn downloaded(&self, file: &str, bytes: u64, elapsed_secs: f64) {
        (**self).downloaded(file, bytes, elapsed_secs);
    }
    fn extracted(&self, file: &str, bytes: u64, elapsed_secs: f64) {
        (**self).extracted(file, bytes, elapsed_secs);
    }
    fn arch_done(&self, arch: Arch, completed: usize, total: usize) {
        (**self).arch_done(arch, completed, total);
    }
    fn arch_failed(&self, arch: Arch, reason: &str) {
        (**self).arch_failed(arch, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn success(&self, msg: &str) {
        (**self).success(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn error(&self, msg: &str) {
        (**self).error(msg);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn phase(&self, _: &str) {}
    fn download_skipped(&self, _: &str) {}
    fn downloaded(&self, _: &str, _: u64, _: f64) {}
    fn extracted(&self, _: &str, _: u64, _: f64) {}
    fn arch_done(&self, _: Arch, _: usize, _: usize) {}
    fn arch_failed(&self, _: Arch, _: &str) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}

/// Forwards every report to `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

impl Reporter for TracingReporter {
    fn phase(&self, title: &str) {
        tracing::info!("==> {title}");
    }

    fn download_skipped(&self, file: &str) {
        tracing::info!(file, "already downloaded, skipping");
    }

    fn downloaded(&self, file: &str, bytes: u64, elapsed_secs: f64) {
        tracing::info!(
            file,
            bytes,
            "downloaded {:.2} MB in {elapsed_secs:.1}s",
            megabytes(bytes)
        );
    }

    fn extracted(&self, file: &str, bytes: u64, elapsed_secs: f64) {
        tracing::info!(
            file,
            bytes,
            "extracted {:.2} MB in {elapsed_secs:.1}s",
            megabytes(bytes)
        );
    }

    fn arch_done(&self, arch: Arch, completed: usize, total: usize) {
        tracing::info!(arch = %arch, "architecture ready ({completed}/{total})");
    }

    fn arch_failed(&self, arch: Arch, reason: &str) {
        tracing::error!(arch = %arch, "architecture failed: {reason}");
    }

    fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    fn success(&self, msg: &str) {
        tracing::info!("✓ {msg}");
    }

    fn warning(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }
}
