//! Consumer wiring
//!
//! Turns discovered include directories and flag tokens into an ordered,
//! deduplicated directive set and applies it to a consumer: Cargo
//! build-script metadata, or a `cc::Build` compiling an FFI shim.
//!
//! Classification is by prefix only (`-I`, `-L`, `-l`); every other token
//! is passed through verbatim, since the external build — not this crate —
//! decides which flags are correct for a given target and driver set.

use crate::discovery::SystemProbe;
use crate::flags::Artifacts;
use std::path::PathBuf;

/// One build-system instruction for a consumer target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Add a header search directory
    Include(PathBuf),

    /// Pass a compile flag through to C shim builds
    CompileFlag(String),

    /// Add a native library search path
    LinkSearch(PathBuf),

    /// Link a native library by name
    LinkLib(String),

    /// Pass a raw argument through to the linker
    LinkArg(String),

    /// Re-run the consumer's build script when a file changes
    RerunIfChanged(PathBuf),

    /// Re-run the consumer's build script when a variable changes
    RerunIfEnvChanged(String),
}

/// Ordered, deduplicated wiring for one consumer target
///
/// Directives keep first-seen order and are never duplicated, so applying
/// a plan twice yields the same effective flags as applying it once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPlan {
    directives: Vec<Directive>,
}

impl LinkPlan {
    /// Wire a consumer against a completed source-build install
    pub fn from_artifacts(artifacts: &Artifacts) -> crate::Result<Self> {
        let mut plan = Self::default();

        plan.push(Directive::Include(artifacts.include_dir().to_path_buf()));
        for token in artifacts.cflags()? {
            plan.push(classify_cflag(token));
        }

        plan.push(Directive::LinkSearch(artifacts.lib_dir().to_path_buf()));
        for token in artifacts.ldflags()? {
            plan.push(classify_ldflag(token));
        }

        plan.push(Directive::RerunIfChanged(artifacts.cflags_file().to_path_buf()));
        plan.push(Directive::RerunIfChanged(artifacts.ldflags_file().to_path_buf()));

        Ok(plan)
    }

    /// Wire a consumer against a prebuilt system install
    pub fn from_probe(probe: &SystemProbe) -> Self {
        let mut plan = Self::default();

        for dir in &probe.include_dirs {
            plan.push(Directive::Include(dir.clone()));
        }
        for token in &probe.cflags {
            plan.push(classify_cflag(token.clone()));
        }
        for token in &probe.ldflags {
            plan.push(classify_ldflag(token.clone()));
        }
        for var in &probe.watched_env {
            plan.push(Directive::RerunIfEnvChanged(var.clone()));
        }

        plan
    }

    /// Append a directive unless an identical one is already present
    pub fn push(&mut self, directive: Directive) {
        if !self.directives.contains(&directive) {
            self.directives.push(directive);
        }
    }

    /// Directives in application order
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Render the `cargo:` lines a build script must print
    ///
    /// Compile flags have no Cargo channel and are omitted here; they reach
    /// C shim builds through [`LinkPlan::apply_to_cc`]. Include directories
    /// are exported as `cargo:include` metadata for dependent crates.
    pub fn cargo_lines(&self) -> Vec<String> {
        self.directives
            .iter()
            .filter_map(|directive| match directive {
                Directive::Include(dir) => Some(format!("cargo:include={}", dir.display())),
                Directive::CompileFlag(_) => None,
                Directive::LinkSearch(dir) => {
                    Some(format!("cargo:rustc-link-search=native={}", dir.display()))
                }
                Directive::LinkLib(name) => Some(format!("cargo:rustc-link-lib={name}")),
                Directive::LinkArg(arg) => Some(format!("cargo:rustc-link-arg={arg}")),
                Directive::RerunIfChanged(path) => {
                    Some(format!("cargo:rerun-if-changed={}", path.display()))
                }
                Directive::RerunIfEnvChanged(var) => {
                    Some(format!("cargo:rerun-if-env-changed={var}"))
                }
            })
            .collect()
    }

    /// Print the `cargo:` lines on stdout for the running build script
    pub fn emit_cargo_metadata(&self) {
        for line in self.cargo_lines() {
            println!("{line}");
        }
    }

    /// Apply include directories and compile flags to a C shim build
    pub fn apply_to_cc(&self, build: &mut cc::Build) {
        for directive in &self.directives {
            match directive {
                Directive::Include(dir) => {
                    build.include(dir);
                }
                Directive::CompileFlag(flag) => {
                    build.flag_if_supported(flag);
                }
                _ => {}
            }
        }
    }
}

/// Classify one compile-flag token
fn classify_cflag(token: String) -> Directive {
    match token.strip_prefix("-I") {
        Some(dir) if !dir.is_empty() => Directive::Include(PathBuf::from(dir)),
        _ => Directive::CompileFlag(token),
    }
}

/// Classify one link-flag token
fn classify_ldflag(token: String) -> Directive {
    if let Some(dir) = token.strip_prefix("-L")
        && !dir.is_empty()
    {
        return Directive::LinkSearch(PathBuf::from(dir));
    }

    if let Some(name) = token.strip_prefix("-l")
        && !name.is_empty()
    {
        return Directive::LinkLib(name.to_string());
    }

    Directive::LinkArg(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cflag_classification() {
        assert_eq!(
            classify_cflag("-I/opt/dpdk/include".to_string()),
            Directive::Include(PathBuf::from("/opt/dpdk/include"))
        );
        assert_eq!(
            classify_cflag("-march=native".to_string()),
            Directive::CompileFlag("-march=native".to_string())
        );
        // A bare -I carries no path; pass it through untouched
        assert_eq!(
            classify_cflag("-I".to_string()),
            Directive::CompileFlag("-I".to_string())
        );
    }

    #[test]
    fn test_ldflag_classification() {
        assert_eq!(
            classify_ldflag("-L/opt/dpdk/lib".to_string()),
            Directive::LinkSearch(PathBuf::from("/opt/dpdk/lib"))
        );
        assert_eq!(
            classify_ldflag("-lrte_eal".to_string()),
            Directive::LinkLib("rte_eal".to_string())
        );
        assert_eq!(
            classify_ldflag("-Wl,--no-as-needed".to_string()),
            Directive::LinkArg("-Wl,--no-as-needed".to_string())
        );
    }

    #[test]
    fn test_push_deduplicates_preserving_order() {
        let mut plan = LinkPlan::default();
        plan.push(Directive::LinkLib("rte_eal".to_string()));
        plan.push(Directive::LinkLib("rte_mbuf".to_string()));
        plan.push(Directive::LinkLib("rte_eal".to_string()));

        assert_eq!(
            plan.directives(),
            &[
                Directive::LinkLib("rte_eal".to_string()),
                Directive::LinkLib("rte_mbuf".to_string()),
            ]
        );
    }

    #[test]
    fn test_cargo_lines_shape() {
        let mut plan = LinkPlan::default();
        plan.push(Directive::Include(PathBuf::from("/p/include")));
        plan.push(Directive::CompileFlag("-march=native".to_string()));
        plan.push(Directive::LinkSearch(PathBuf::from("/p/lib")));
        plan.push(Directive::LinkLib("rte_eal".to_string()));
        plan.push(Directive::LinkArg("-Wl,--as-needed".to_string()));
        plan.push(Directive::RerunIfEnvChanged("RTE_SDK".to_string()));

        let lines: Vec<String> = plan.cargo_lines();
        assert_eq!(
            lines,
            vec![
                "cargo:include=/p/include",
                "cargo:rustc-link-search=native=/p/lib",
                "cargo:rustc-link-lib=rte_eal",
                "cargo:rustc-link-arg=-Wl,--as-needed",
                "cargo:rerun-if-env-changed=RTE_SDK",
            ]
        );
    }

    #[test]
    fn test_apply_to_cc_only_touches_compile_side() {
        let mut plan = LinkPlan::default();
        plan.push(Directive::Include(PathBuf::from("/p/include")));
        plan.push(Directive::CompileFlag("-msse4.2".to_string()));
        plan.push(Directive::LinkLib("rte_eal".to_string()));

        // Smoke check: link directives must not panic the compile-side path.
        let mut build = cc::Build::new();
        plan.apply_to_cc(&mut build);
    }
}
