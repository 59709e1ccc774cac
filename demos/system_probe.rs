//! Probe a system DPDK install
//!
//! Uses pkg-config to locate an already-installed DPDK and prints the
//! wiring a consumer target would receive from it.

use dpdk_build::{LinkPlan, SystemProbe};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let probe: SystemProbe = SystemProbe::pkg_config()?;
    println!("✓ Found system DPDK");
    println!("  Include dirs: {:?}", probe.include_dirs);

    let plan: LinkPlan = probe.link_plan();
    println!("\nConsumer directives:");
    for directive in plan.directives() {
        println!("  {directive:?}");
    }

    Ok(())
}
