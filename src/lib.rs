//! # dpdk-build
//!
//! Build-time toolkit for linking Rust projects against DPDK.
//!
//! ## Features
//!
//! - Drives DPDK's make-based build through configure, compile, and install
//! - Reads back the compile/link flag files the external build generates
//! - Emits Cargo build-script directives and configures `cc::Build` shims
//! - Probes prebuilt installs via pkg-config or `RTE_SDK`
//!
//! ## Quick Start
//!
//! From a consumer crate's `build.rs`:
//!
//! ```no_run
//! use dpdk_build::{LinkPlan, SourceBuild};
//!
//! let out_dir = std::env::var("OUT_DIR").map_err(|e| dpdk_build::Error::Config(e.to_string()))?;
//! let artifacts = SourceBuild::new("submodules/dpdk", out_dir).run()?;
//! LinkPlan::from_artifacts(&artifacts)?.emit_cargo_metadata();
//! # Ok::<(), dpdk_build::Error>(())
//! ```

pub mod discovery;
pub mod flags;
pub mod source_build;
pub mod target;
pub mod wiring;

// Re-exports
pub use discovery::SystemProbe;
pub use flags::Artifacts;
pub use source_build::{InstallReceipt, SourceBuild};
pub use target::BuildTarget;
pub use wiring::{Directive, LinkPlan};

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External build phase `{phase}` failed: {reason}")]
    Phase {
        phase: &'static str,
        reason: String,
    },

    #[error("Flag discovery error: {0}")]
    Discovery(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
