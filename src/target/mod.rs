//! DPDK build-target identifiers
//!
//! DPDK's make-based build system selects a build variant with a
//! four-part identifier of the form `<arch>-<machine>-<execenv>-<toolchain>`,
//! e.g. `x86_64-native-linuxapp-gcc`. The variant decides which generated
//! configuration, and therefore which compile/link flags, the build emits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Architectures the DPDK make system ships configuration templates for
const KNOWN_ARCHS: &[&str] = &["x86_64", "i686", "x86_x32", "arm", "arm64", "ppc_64"];

/// Execution environments (pre- and post-18.11 spellings)
const KNOWN_EXECENVS: &[&str] = &["linuxapp", "bsdapp", "linux", "freebsd"];

/// Supported toolchains
const KNOWN_TOOLCHAINS: &[&str] = &["gcc", "clang", "icc"];

/// A DPDK build-target identifier
///
/// Passed to the configure phase as `T=<target>`; the external build uses
/// it to pick its config template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildTarget {
    /// CPU architecture (e.g. `x86_64`)
    pub arch: String,

    /// Machine tuning (`native`, `default`, or a core name)
    pub machine: String,

    /// Execution environment (e.g. `linuxapp`)
    pub execenv: String,

    /// Compiler toolchain (e.g. `gcc`)
    pub toolchain: String,
}

impl BuildTarget {
    /// Create a target from its four parts, validating each
    pub fn new(arch: &str, machine: &str, execenv: &str, toolchain: &str) -> crate::Result<Self> {
        let target = Self {
            arch: arch.to_string(),
            machine: machine.to_string(),
            execenv: execenv.to_string(),
            toolchain: toolchain.to_string(),
        };
        target.validate()?;
        Ok(target)
    }

    /// Target matching the host toolchain
    ///
    /// Mirrors the `<arch>-native-<os>app-gcc` convention DPDK consumers
    /// default to when no target is given.
    pub fn host() -> Self {
        let arch = match std::env::consts::ARCH {
            "aarch64" => "arm64",
            "powerpc64" => "ppc_64",
            other => other,
        };
        let execenv = match std::env::consts::OS {
            "freebsd" => "bsdapp",
            _ => "linuxapp",
        };
        Self {
            arch: arch.to_string(),
            machine: "native".to_string(),
            execenv: execenv.to_string(),
            toolchain: "gcc".to_string(),
        }
    }

    /// Validate all four parts
    pub fn validate(&self) -> crate::Result<()> {
        if !KNOWN_ARCHS.contains(&self.arch.as_str()) {
            return Err(crate::Error::Config(format!(
                "unknown target architecture `{}`",
                self.arch
            )));
        }

        if self.machine.is_empty() {
            return Err(crate::Error::Config(
                "target machine part must not be empty".to_string(),
            ));
        }

        if !KNOWN_EXECENVS.contains(&self.execenv.as_str()) {
            return Err(crate::Error::Config(format!(
                "unknown execution environment `{}`",
                self.execenv
            )));
        }

        if !KNOWN_TOOLCHAINS.contains(&self.toolchain.as_str()) {
            return Err(crate::Error::Config(format!(
                "unknown toolchain `{}`",
                self.toolchain
            )));
        }

        Ok(())
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.arch, self.machine, self.execenv, self.toolchain
        )
    }
}

impl FromStr for BuildTarget {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 4 {
            return Err(crate::Error::Config(format!(
                "target `{s}` is not of the form <arch>-<machine>-<execenv>-<toolchain>"
            )));
        }

        Self::new(parts[0], parts[1], parts[2], parts[3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_valid_target() {
        let target: BuildTarget = "x86_64-native-linuxapp-gcc".parse().unwrap();

        assert_eq!(target.arch, "x86_64");
        assert_eq!(target.machine, "native");
        assert_eq!(target.execenv, "linuxapp");
        assert_eq!(target.toolchain, "gcc");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("x86_64-native-linuxapp".parse::<BuildTarget>().is_err());
        assert!("mips-native-linuxapp-gcc".parse::<BuildTarget>().is_err());
        assert!("x86_64-native-hurd-gcc".parse::<BuildTarget>().is_err());
        assert!("x86_64-native-linuxapp-msvc".parse::<BuildTarget>().is_err());
        assert!("".parse::<BuildTarget>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let target: BuildTarget = "arm64-armv8a-linuxapp-clang".parse().unwrap();
        let rendered: String = target.to_string();

        assert_eq!(rendered, "arm64-armv8a-linuxapp-clang");
        assert_eq!(rendered.parse::<BuildTarget>().unwrap(), target);
    }

    #[test]
    fn test_host_target_is_valid() {
        assert!(BuildTarget::host().validate().is_ok());
    }

    proptest! {
        #[test]
        fn prop_valid_targets_round_trip(
            arch in proptest::sample::select(KNOWN_ARCHS),
            machine in "[a-z0-9]{1,12}",
            execenv in proptest::sample::select(KNOWN_EXECENVS),
            toolchain in proptest::sample::select(KNOWN_TOOLCHAINS),
        ) {
            let target = BuildTarget::new(arch, &machine, execenv, toolchain).unwrap();
            let reparsed: BuildTarget = target.to_string().parse().unwrap();
            prop_assert_eq!(reparsed, target);
        }
    }
}
