//! Prebuilt DPDK discovery
//!
//! Source builds are not always wanted: CI images and development hosts
//! often carry a system DPDK already. These probes locate such installs
//! and produce the same inputs the wiring layer consumes, either through
//! pkg-config (`libdpdk`) or through the `RTE_SDK`/`RTE_TARGET` layout
//! the make-based ecosystem uses.

use crate::source_build::{ENV_SDK, ENV_TARGET};
use crate::target::BuildTarget;
use crate::wiring::LinkPlan;
use std::path::{Path, PathBuf};

/// A located prebuilt DPDK install
#[derive(Debug, Clone, Default)]
pub struct SystemProbe {
    /// Header search directories
    pub include_dirs: Vec<PathBuf>,

    /// Compile-flag tokens
    pub cflags: Vec<String>,

    /// Link-flag tokens
    pub ldflags: Vec<String>,

    /// Environment variables the probe result depends on
    pub watched_env: Vec<String>,
}

impl SystemProbe {
    /// Probe a system install through pkg-config
    pub fn pkg_config() -> crate::Result<Self> {
        let library = pkg_config::Config::new()
            .cargo_metadata(false)
            .probe("libdpdk")
            .map_err(|e| {
                crate::Error::Discovery(format!("pkg-config probe for libdpdk failed: {e}"))
            })?;

        let mut probe = Self {
            include_dirs: library.include_paths,
            ..Self::default()
        };

        for (key, value) in &library.defines {
            match value {
                Some(value) => probe.cflags.push(format!("-D{key}={value}")),
                None => probe.cflags.push(format!("-D{key}")),
            }
        }

        for dir in &library.link_paths {
            probe.ldflags.push(format!("-L{}", dir.display()));
        }
        for name in &library.libs {
            probe.ldflags.push(format!("-l{name}"));
        }

        Ok(probe)
    }

    /// Probe the install tree `RTE_SDK`/`RTE_TARGET` point at
    pub fn from_env() -> crate::Result<Self> {
        let sdk = std::env::var(ENV_SDK).map_err(|_| {
            crate::Error::Discovery(format!(
                "{ENV_SDK} is not set; it must name a DPDK install tree"
            ))
        })?;

        let target: BuildTarget = match std::env::var(ENV_TARGET) {
            Ok(target) => target.parse()?,
            Err(_) => BuildTarget::host(),
        };

        let mut probe = Self::at_sdk(Path::new(&sdk), &target)?;
        probe.watched_env = vec![ENV_SDK.to_string(), ENV_TARGET.to_string()];
        Ok(probe)
    }

    /// Probe a make-system install tree rooted at `<sdk>/<target>`
    pub fn at_sdk(sdk: &Path, target: &BuildTarget) -> crate::Result<Self> {
        let root: PathBuf = sdk.join(target.to_string());
        let include_dir: PathBuf = root.join("include");
        let lib_dir: PathBuf = root.join("lib");

        if !include_dir.is_dir() || !lib_dir.is_dir() {
            return Err(crate::Error::Discovery(format!(
                "{} does not look like a DPDK install for {target} (missing include/ or lib/)",
                root.display()
            )));
        }

        Ok(Self {
            include_dirs: vec![include_dir],
            cflags: Vec::new(),
            ldflags: vec![format!("-L{}", lib_dir.display())],
            watched_env: Vec::new(),
        })
    }

    /// Wiring for this install
    pub fn link_plan(&self) -> LinkPlan {
        LinkPlan::from_probe(self)
    }
}
