//! Single-value analog loopback example.
//!
//! Writes a few voltages to AO channel 0 of the simulated board and reads
//! them back on AI channel 0.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=daq_driver_meids=debug cargo run -p daq-driver-meids --example single_read
//! ```

use daq_driver_meids::{
    ChannelConfig, MeidsSystem, MockBackend, PredefinedRange, Reference, SubdeviceSubtype,
    SubdeviceType,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let system = MeidsSystem::open(MockBackend::new())?;

    let info = system.device_info(0)?;
    println!("Device Information:");
    println!("  Name:   {}", info.name);
    println!("  Driver: {}", info.driver_name);
    println!("  Serial: {}", info.serial_no);
    println!("  Subdevices: {}", info.subdevices.len());

    let ao = system
        .find_subdevice(0, 0, SubdeviceType::AnalogOutput, SubdeviceSubtype::Any)?
        .ok_or_else(|| anyhow::anyhow!("no analog output"))?;
    let ai = system
        .find_subdevice(0, 0, SubdeviceType::AnalogInput, SubdeviceSubtype::Any)?
        .ok_or_else(|| anyhow::anyhow!("no analog input"))?;

    let ao_range = system.predefined_range(ao, PredefinedRange::Bipolar10V)?;
    let ai_range = system.predefined_range(ai, PredefinedRange::Bipolar10V)?;
    println!("\nAO range: {}", ao_range);
    println!("AI range: {}", ai_range);

    let ao_config = ChannelConfig::range(ao_range.index, Reference::AoGround);
    let ai_config = ChannelConfig::range(ai_range.index, Reference::AiGround);
    system.single_config(ao.channel(0), &ao_config)?;
    system.single_config(ai.channel(0), &ai_config)?;

    println!("\nLoopback:");
    for target in [-5.0, 0.0, 2.5, 7.5] {
        let code = system.value_write(ao.channel(0), &ao_range, target)?;
        let volts = system.value_read(ai.channel(0), &ai_range)?;
        println!("  {:+.3} V -> code {:5} -> {:+.6} V", target, code, volts);
    }

    system.close()?;
    Ok(())
}
