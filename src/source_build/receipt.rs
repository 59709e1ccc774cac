//! Install receipts
//!
//! A receipt is written into the install prefix after all three build
//! phases succeed. Its presence is the completion marker: flag discovery
//! refuses any prefix that lacks one, so a crashed or interrupted build
//! can never be wired into a consumer.

use crate::source_build::SourceBuild;
use crate::target::BuildTarget;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Receipt file name under the install prefix
pub const RECEIPT_FILE: &str = "receipt.json";

/// Record of a completed source build
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallReceipt {
    /// Build variant the artifacts were produced for
    pub target: BuildTarget,

    /// Whether the mlx5 poll-mode driver was enabled
    pub mlx5: bool,

    /// Source tree the build ran from
    pub source_dir: PathBuf,

    /// When the install phase finished
    pub completed_at: DateTime<Utc>,
}

impl InstallReceipt {
    /// Receipt for a build plan that just finished installing
    pub fn new(build: &SourceBuild) -> Self {
        Self {
            target: build.target.clone(),
            mlx5: build.enable_mlx5,
            source_dir: build.source_dir.clone(),
            completed_at: Utc::now(),
        }
    }

    /// Write the receipt into an install prefix
    pub fn write(&self, install_dir: &Path) -> crate::Result<()> {
        let json: String = serde_json::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(format!("cannot encode install receipt: {e}")))?;

        fs::write(install_dir.join(RECEIPT_FILE), json)?;
        Ok(())
    }

    /// Read the receipt from an install prefix
    ///
    /// A missing receipt means the build never completed there.
    pub fn read(install_dir: &Path) -> crate::Result<Self> {
        let path: PathBuf = install_dir.join(RECEIPT_FILE);
        let json: String = fs::read_to_string(&path).map_err(|_| {
            crate::Error::Discovery(format!(
                "no install receipt at {}; the external build has not completed",
                path.display()
            ))
        })?;

        serde_json::from_str(&json).map_err(|e| {
            crate::Error::Discovery(format!("corrupt install receipt {}: {e}", path.display()))
        })
    }
}
