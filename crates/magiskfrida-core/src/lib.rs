pub mod assembler;
pub mod config;
pub mod context;
pub mod error;
pub mod fill;
pub mod io;
pub mod pipeline;
pub mod release;
pub mod repo;
pub mod tags;

pub mod reporter;

#[cfg(test)]
mod testing;

pub use config::{BuildConfig, Layout};
pub use context::BuildContext;
pub use error::{BuildError, Result};
pub use reporter::{NullReporter, Reporter, TracingReporter};

/// User Agent string for core operations
pub const USER_AGENT: &str = concat!("magiskfrida/", env!("CARGO_PKG_VERSION"));

/// Extract the filename from a URL.
pub fn filename_from_url(url: &str) -> &str {
    url.split('/').next_back().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://github.com/frida/frida/releases/download/16.1.4/frida-server-16.1.4-android-arm.xz"),
            "frida-server-16.1.4-android-arm.xz"
        );
        assert_eq!(filename_from_url("no-slashes"), "no-slashes");
    }
}
