//! External DPDK source build driver
//!
//! Drives DPDK's own make-based build system through its three phases:
//!
//! 1. configure — `make config T=<target> O=<build dir>`
//! 2. compile   — `make -C <build dir> -j<N>`
//! 3. install   — `make -C <build dir> install DESTDIR=<prefix>`
//!
//! Each phase runs synchronously and any failure is fatal: no retry, and
//! nothing is wired against a prefix the install phase did not finish.
//! A JSON receipt written after the last phase is what marks the prefix
//! as complete; [`crate::Artifacts`] refuses prefixes without one.

mod receipt;

pub use receipt::InstallReceipt;

use crate::flags::Artifacts;
use crate::target::BuildTarget;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// Environment variable naming the DPDK source tree
pub const ENV_SDK: &str = "RTE_SDK";

/// Environment variable naming the DPDK build target
pub const ENV_TARGET: &str = "RTE_TARGET";

/// Config key controlling the Mellanox ConnectX poll-mode driver
const MLX5_CONFIG_KEY: &str = "CONFIG_RTE_LIBRTE_MLX5_PMD";

/// How many trailing lines of external build output to keep in errors
const ERROR_TAIL_LINES: usize = 20;

/// Source-build configuration
///
/// Builder-style: construct with [`SourceBuild::new`], adjust with the
/// chainable setters, then call [`SourceBuild::run`].
#[derive(Debug, Clone)]
pub struct SourceBuild {
    /// DPDK source tree
    pub source_dir: PathBuf,

    /// Directory the build and install trees are created under
    pub build_root: PathBuf,

    /// Build variant handed to the configure phase
    pub target: BuildTarget,

    /// Enable the Mellanox ConnectX (mlx5) poll-mode driver
    pub enable_mlx5: bool,

    /// Compile-phase parallelism (0 = all available cores)
    pub jobs: usize,

    /// `make` program to invoke (honours `$MAKE`)
    pub make: PathBuf,
}

impl SourceBuild {
    /// Create a build plan for the given source tree and scratch root
    pub fn new(source_dir: impl Into<PathBuf>, build_root: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            build_root: build_root.into(),
            target: BuildTarget::host(),
            enable_mlx5: false,
            jobs: 0,
            make: std::env::var_os("MAKE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("make")),
        }
    }

    /// Create a build plan from `RTE_SDK` / `RTE_TARGET`
    pub fn from_env(build_root: impl Into<PathBuf>) -> crate::Result<Self> {
        let sdk = std::env::var(ENV_SDK).map_err(|_| {
            crate::Error::Config(format!("{ENV_SDK} is not set; it must name the DPDK source tree"))
        })?;

        let mut build = Self::new(sdk, build_root);
        if let Ok(target) = std::env::var(ENV_TARGET) {
            build.target = target.parse()?;
        }
        Ok(build)
    }

    /// Set the build target
    pub fn target(mut self, target: BuildTarget) -> Self {
        self.target = target;
        self
    }

    /// Toggle the mlx5 poll-mode driver
    pub fn enable_mlx5(mut self, enable: bool) -> Self {
        self.enable_mlx5 = enable;
        self
    }

    /// Set compile-phase parallelism
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Override the `make` program
    pub fn make_program(mut self, make: impl Into<PathBuf>) -> Self {
        self.make = make.into();
        self
    }

    /// Directory the external build writes object files into
    pub fn build_dir(&self) -> PathBuf {
        self.build_root.join("build")
    }

    /// Install prefix the finished artifacts land in
    pub fn install_dir(&self) -> PathBuf {
        self.build_root.join("install")
    }

    /// Validate the plan before running it
    pub fn validate(&self) -> crate::Result<()> {
        if !self.source_dir.is_dir() {
            return Err(crate::Error::Config(format!(
                "DPDK source tree not found at {}",
                self.source_dir.display()
            )));
        }

        self.target.validate()
    }

    /// Run configure, compile, and install, returning the validated artifacts
    ///
    /// The install prefix is cleared first so a failed run can never leave
    /// stale artifacts behind for a later wiring step to pick up.
    pub fn run(&self) -> crate::Result<Artifacts> {
        self.validate()?;
        fs::create_dir_all(&self.build_root)?;

        let install_dir: PathBuf = self.install_dir();
        if install_dir.exists() {
            fs::remove_dir_all(&install_dir)?;
        }

        log::info!(
            "building dpdk from {} for target {}",
            self.source_dir.display(),
            self.target
        );

        self.configure()?;
        if self.enable_mlx5 {
            self.enable_mlx5_pmd()?;
        }
        self.compile()?;
        self.install()?;

        InstallReceipt::new(self).write(&install_dir)?;
        log::info!("dpdk installed into {}", install_dir.display());

        Artifacts::from_install(install_dir)
    }

    /// Phase 1: generate the build tree for the selected target
    fn configure(&self) -> crate::Result<()> {
        let mut cmd = Command::new(&self.make);
        cmd.arg("-C")
            .arg(&self.source_dir)
            .arg("config")
            .arg(format!("T={}", self.target))
            .arg(format!("O={}", self.build_dir().display()));

        self.run_phase("configure", cmd)
    }

    /// Phase 2: compile the configured tree
    fn compile(&self) -> crate::Result<()> {
        let jobs: usize = if self.jobs > 0 {
            self.jobs
        } else {
            std::thread::available_parallelism().map_or(1, |n| n.get())
        };

        let mut cmd = Command::new(&self.make);
        cmd.arg("-C")
            .arg(self.build_dir())
            .arg(format!("-j{jobs}"))
            // Objects end up in both static archives and shared libraries
            .arg("EXTRA_CFLAGS=-fPIC");

        self.run_phase("compile", cmd)
    }

    /// Phase 3: install into the isolated prefix
    fn install(&self) -> crate::Result<()> {
        let mut cmd = Command::new(&self.make);
        cmd.arg("-C")
            .arg(self.build_dir())
            .arg("install")
            .arg(format!("DESTDIR={}", self.install_dir().display()))
            // Empty prefix collapses the /usr/local layout so headers land
            // directly at <prefix>/include and libraries at <prefix>/lib
            .arg("prefix=");

        self.run_phase("install", cmd)
    }

    /// Flip the mlx5 key in the generated `.config`
    ///
    /// Must run after configure: the config file does not exist earlier.
    fn enable_mlx5_pmd(&self) -> crate::Result<()> {
        let config_path: PathBuf = self.build_dir().join(".config");
        let config: String = fs::read_to_string(&config_path).map_err(|e| {
            crate::Error::Config(format!(
                "cannot read generated config {}: {e}",
                config_path.display()
            ))
        })?;

        let disabled = format!("{MLX5_CONFIG_KEY}=n");
        let enabled = format!("{MLX5_CONFIG_KEY}=y");

        if config.contains(&enabled) {
            return Ok(());
        }
        if !config.contains(&disabled) {
            return Err(crate::Error::Config(format!(
                "generated config {} does not expose {MLX5_CONFIG_KEY}",
                config_path.display()
            )));
        }

        fs::write(&config_path, config.replace(&disabled, &enabled))?;
        log::info!("enabled {MLX5_CONFIG_KEY} in {}", config_path.display());
        Ok(())
    }

    /// Run one external build phase, failing on spawn error or non-zero exit
    fn run_phase(&self, phase: &'static str, mut cmd: Command) -> crate::Result<()> {
        log::debug!("{phase}: {cmd:?}");

        let output = cmd.output().map_err(|e| crate::Error::Phase {
            phase,
            reason: format!("failed to spawn {}: {e}", self.make.display()),
        })?;

        if !output.status.success() {
            return Err(crate::Error::Phase {
                phase,
                reason: format!(
                    "{} exited with {}\n{}",
                    self.make.display(),
                    output.status,
                    output_tail(&output.stderr, &output.stdout)
                ),
            });
        }

        log::debug!("{phase}: done");
        Ok(())
    }
}

/// Trailing lines of the external build's output, preferring stderr
fn output_tail(stderr: &[u8], stdout: &[u8]) -> String {
    let text: &[u8] = if stderr.is_empty() { stdout } else { stderr };
    let text = String::from_utf8_lossy(text);

    let lines: Vec<&str> = text.lines().collect();
    let start: usize = lines.len().saturating_sub(ERROR_TAIL_LINES);
    lines[start..].join("\n")
}
