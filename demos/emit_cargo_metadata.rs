//! Consumer build-script walkthrough
//!
//! Runs the full pipeline the way a `-sys` crate's `build.rs` would:
//! build DPDK from the source tree `RTE_SDK` points at, then print the
//! `cargo:` directives the consumer needs.
//!
//! ```bash
//! RTE_SDK=/path/to/dpdk cargo run --example emit_cargo_metadata
//! ```

use dpdk_build::{Artifacts, LinkPlan, SourceBuild};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let build: SourceBuild = SourceBuild::from_env("target/dpdk-demo")?;
    println!("Building DPDK for {} ...", build.target);

    let artifacts: Artifacts = build.run()?;
    println!("✓ Installed into {}\n", artifacts.install_dir().display());

    LinkPlan::from_artifacts(&artifacts)?.emit_cargo_metadata();

    Ok(())
}
