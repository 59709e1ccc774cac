//! dpdk-build binary
//!
//! Runs the three-phase DPDK source build from the command line and prints
//! the discovered consumer flags, either as plain text or as the `cargo:`
//! lines a build script would emit.

use dpdk_build::*;
use std::process::ExitCode;

const USAGE: &str = "\
Usage: dpdk-build <dpdk-source-dir> [options]
       dpdk-build --probe

Options:
  --target <quad>     Build target, e.g. x86_64-native-linuxapp-gcc
  --build-root <dir>  Scratch directory for build/ and install/ (default: ./dpdk-build)
  --mlx5              Enable the Mellanox ConnectX poll-mode driver
  --jobs <n>          Compile-phase parallelism (default: all cores)
  --emit <cargo|text> Output format for the discovered flags (default: text)
  --probe             Skip building; probe a system install via pkg-config
  -h, --help          Show this help";

struct Options {
    source_dir: Option<String>,
    target: Option<BuildTarget>,
    build_root: String,
    mlx5: bool,
    jobs: usize,
    emit_cargo: bool,
    probe: bool,
}

fn main() -> ExitCode {
    // Initialize logger
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let options: Options = match parse_args(std::env::args().skip(1)) {
        Ok(Some(options)) => options,
        Ok(None) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{message}\n\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dpdk-build: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(options: &Options) -> Result<()> {
    let plan: LinkPlan = if options.probe {
        let probe: SystemProbe = SystemProbe::pkg_config()?;
        println!("✓ Found system DPDK via pkg-config");
        probe.link_plan()
    } else {
        let source_dir: &str = options.source_dir.as_deref().ok_or_else(|| {
            Error::Config("a DPDK source directory is required unless --probe is given".to_string())
        })?;

        let mut build: SourceBuild = SourceBuild::new(source_dir, &options.build_root)
            .enable_mlx5(options.mlx5)
            .jobs(options.jobs);
        if let Some(target) = &options.target {
            build = build.target(target.clone());
        }

        let artifacts: Artifacts = build.run()?;
        println!("✓ DPDK built for {}", artifacts.receipt().target);
        println!("  Install prefix: {}", artifacts.install_dir().display());
        LinkPlan::from_artifacts(&artifacts)?
    };

    if options.emit_cargo {
        plan.emit_cargo_metadata();
    } else {
        println!("\nConsumer directives:");
        for directive in plan.directives() {
            println!("  {directive:?}");
        }
    }

    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> std::result::Result<Option<Options>, String> {
    let mut options = Options {
        source_dir: None,
        target: None,
        build_root: "dpdk-build".to_string(),
        mlx5: false,
        jobs: 0,
        emit_cargo: false,
        probe: false,
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--mlx5" => options.mlx5 = true,
            "--probe" => options.probe = true,
            "--target" => {
                let value: String = expect_value(&mut args, "--target")?;
                options.target = Some(value.parse().map_err(|e| format!("{e}"))?);
            }
            "--build-root" => options.build_root = expect_value(&mut args, "--build-root")?,
            "--jobs" => {
                let value: String = expect_value(&mut args, "--jobs")?;
                options.jobs = value
                    .parse()
                    .map_err(|_| format!("--jobs expects a number, got `{value}`"))?;
            }
            "--emit" => {
                let value: String = expect_value(&mut args, "--emit")?;
                options.emit_cargo = match value.as_str() {
                    "cargo" => true,
                    "text" => false,
                    other => return Err(format!("--emit expects cargo or text, got `{other}`")),
                };
            }
            other if other.starts_with('-') => return Err(format!("unknown option `{other}`")),
            _ => {
                if options.source_dir.is_some() {
                    return Err("only one source directory may be given".to_string());
                }
                options.source_dir = Some(arg.clone());
            }
        }
    }

    Ok(Some(options))
}

fn expect_value(
    args: &mut impl Iterator<Item = String>,
    option: &str,
) -> std::result::Result<String, String> {
    args.next().ok_or_else(|| format!("{option} expects a value"))
}
