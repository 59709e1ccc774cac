//! Flag discovery over a finished install tree
//!
//! The external build writes two flag files under the install prefix:
//! `cflags.txt` with the compile flags and `ldflags.txt` with the link
//! flags required to consume the artifacts. The correct contents vary by
//! target and enabled drivers and are decided by DPDK's own build system,
//! so they are read back verbatim rather than hard-coded here. Tokens are
//! split on whitespace and otherwise passed through opaquely.

use crate::source_build::InstallReceipt;
use std::fs;
use std::path::{Path, PathBuf};

/// Compile-flag file name under the install prefix
pub const CFLAGS_FILE: &str = "cflags.txt";

/// Link-flag file name under the install prefix
pub const LDFLAGS_FILE: &str = "ldflags.txt";

/// A validated DPDK install tree
///
/// Only constructible from a prefix whose build completed: the install
/// receipt and both flag files must exist before any consumer can be
/// wired against it.
#[derive(Debug, Clone)]
pub struct Artifacts {
    install_dir: PathBuf,
    include_dir: PathBuf,
    lib_dir: PathBuf,
    cflags_file: PathBuf,
    ldflags_file: PathBuf,
    receipt: InstallReceipt,
}

impl Artifacts {
    /// Validate an install prefix and take ownership of its layout
    pub fn from_install(install_dir: impl Into<PathBuf>) -> crate::Result<Self> {
        let install_dir: PathBuf = install_dir.into();
        let receipt: InstallReceipt = InstallReceipt::read(&install_dir)?;

        let include_dir: PathBuf = install_dir.join("include");
        if !include_dir.is_dir() {
            return Err(crate::Error::Discovery(format!(
                "install tree {} has no include directory",
                install_dir.display()
            )));
        }

        let artifacts = Self {
            cflags_file: install_dir.join(CFLAGS_FILE),
            ldflags_file: install_dir.join(LDFLAGS_FILE),
            lib_dir: install_dir.join("lib"),
            include_dir,
            install_dir,
            receipt,
        };

        // A successful build emits non-empty flag files; verify up front so
        // wiring never observes a half-written install.
        artifacts.cflags()?;
        artifacts.ldflags()?;

        Ok(artifacts)
    }

    /// Compile flags, one opaque token per element
    pub fn cflags(&self) -> crate::Result<Vec<String>> {
        read_flag_file(&self.cflags_file)
    }

    /// Link flags, one opaque token per element
    pub fn ldflags(&self) -> crate::Result<Vec<String>> {
        read_flag_file(&self.ldflags_file)
    }

    /// Install prefix root
    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Header directory under the prefix
    pub fn include_dir(&self) -> &Path {
        &self.include_dir
    }

    /// Library directory under the prefix
    pub fn lib_dir(&self) -> &Path {
        &self.lib_dir
    }

    /// Compile-flag file path
    pub fn cflags_file(&self) -> &Path {
        &self.cflags_file
    }

    /// Link-flag file path
    pub fn ldflags_file(&self) -> &Path {
        &self.ldflags_file
    }

    /// Receipt recorded by the build that produced this tree
    pub fn receipt(&self) -> &InstallReceipt {
        &self.receipt
    }
}

/// Read a flag file into whitespace-separated tokens
fn read_flag_file(path: &Path) -> crate::Result<Vec<String>> {
    let text: String = fs::read_to_string(path).map_err(|_| {
        crate::Error::Discovery(format!("flag file {} is missing", path.display()))
    })?;

    let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    if tokens.is_empty() {
        return Err(crate::Error::Discovery(format!(
            "flag file {} is empty",
            path.display()
        )));
    }

    Ok(tokens)
}
