//! Shared types for the MagiskFrida build tooling.
//!
//! Everything here is pure: no network, no filesystem. The core crate
//! builds on these types to fetch, assemble and package the module.

pub mod arch;
pub mod module;
pub mod version;

// Re-exports
pub use arch::*;
pub use module::{ModuleProp, UpdaterManifest};
pub use version::VersionError;

/// Placeholder tag used for build-only runs that must not be released.
pub const PLACEHOLDER_TAG: &str = "0";
