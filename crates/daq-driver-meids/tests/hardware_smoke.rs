//! ME-iDS Hardware Smoke Test Suite
//!
//! Verifies that the installed ME-iDS library and at least one board are
//! reachable through the native backend.
//!
//! # Environment Variables
//!
//! Required:
//! - `MEIDS_SMOKE_TEST=1` - Enable the test suite
//!
//! Optional:
//! - `MEIDS_TEST_DEVICE` - Device index (default: 0)
//! - `MEIDS_LOOPBACK=1` - Also run the AO to AI loopback check (AO0 wired to AI0)
//!
//! # Running
//!
//! ```bash
//! export MEIDS_SMOKE_TEST=1
//! cargo nextest run --profile hardware --features hardware -p daq-driver-meids -- hardware_smoke
//! ```
//!
//! # Test Coverage
//!
//! | Test | Description |
//! |------|-------------|
//! | `device_discovery_test` | Open driver, count devices, read names |
//! | `subdevice_enumeration_test` | Snapshot every subdevice of the test device |
//! | `version_test` | Library and driver versions |
//! | `analog_loopback_test` | Write AO0, read AI0 (opt-in) |

#![cfg(feature = "hardware")]

use daq_driver_meids::{
    ChannelConfig, MeidsSystem, Reference, SubdeviceSubtype, SubdeviceType, Unit,
};
use std::env;
use std::thread;
use std::time::Duration;

// =============================================================================
// Test Configuration
// =============================================================================

/// Loopback tolerance in volts
const VOLTAGE_TOLERANCE: f64 = 0.010;

fn smoke_test_enabled() -> bool {
    env::var("MEIDS_SMOKE_TEST")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

fn loopback_enabled() -> bool {
    env::var("MEIDS_LOOPBACK")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

fn test_device() -> i32 {
    env::var("MEIDS_TEST_DEVICE")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

macro_rules! skip_if_disabled {
    () => {
        if !smoke_test_enabled() {
            println!("ME-iDS smoke test skipped (set MEIDS_SMOKE_TEST=1 to enable)");
            return;
        }
    };
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn device_discovery_test() {
    skip_if_disabled!();

    let system = MeidsSystem::open_native().expect("Failed to open ME-iDS driver");
    let count = system.number_devices().expect("meQueryNumberDevices");
    println!("Devices: {}", count);
    assert!(count > test_device(), "No device at index {}", test_device());

    let device = test_device();
    let name = system.device_name(device).unwrap();
    let driver = system.device_driver_name(device).unwrap();
    let (device_id, serial) = system.serial_number(device).unwrap();
    println!("  {} ({}) id={:#06x} serial={}", name, driver, device_id, serial);
    assert!(!name.is_empty());

    system.close().unwrap();
}

#[test]
fn subdevice_enumeration_test() {
    skip_if_disabled!();

    let system = MeidsSystem::open_native().expect("Failed to open ME-iDS driver");
    let info = system.device_info(test_device()).unwrap();
    assert!(!info.subdevices.is_empty());

    for sub in &info.subdevices {
        println!(
            "  [{}] {:?}/{:?} channels={} ranges={}",
            sub.addr.subdevice,
            sub.kind,
            sub.subtype,
            sub.channels,
            sub.ranges.len()
        );
        assert!(sub.channels > 0);
    }
}

#[test]
fn version_test() {
    skip_if_disabled!();

    let system = MeidsSystem::open_native().expect("Failed to open ME-iDS driver");
    println!("Library: {}", system.library_version().unwrap());
    println!("Main driver: {}", system.main_driver_version().unwrap());
    println!(
        "Device driver: {}",
        system.device_driver_version(test_device()).unwrap()
    );
}

#[test]
fn analog_loopback_test() {
    skip_if_disabled!();
    if !loopback_enabled() {
        println!("Loopback check skipped (set MEIDS_LOOPBACK=1, AO0 wired to AI0)");
        return;
    }

    let system = MeidsSystem::open_native().expect("Failed to open ME-iDS driver");
    let device = test_device();
    let ao = system
        .find_subdevice(device, 0, SubdeviceType::AnalogOutput, SubdeviceSubtype::Any)
        .unwrap()
        .expect("No analog output");
    let ai = system
        .find_subdevice(device, 0, SubdeviceType::AnalogInput, SubdeviceSubtype::Any)
        .unwrap()
        .expect("No analog input");

    let _ao_lock = system.acquire_subdevice_lock(ao).unwrap();
    let _ai_lock = system.acquire_subdevice_lock(ai).unwrap();

    let ao_range = system.range_by_min_max(ao, Unit::Volt, -10.0, 10.0).unwrap();
    let ai_range = system.range_by_min_max(ai, Unit::Volt, -10.0, 10.0).unwrap();
    system
        .single_config(ao.channel(0), &ChannelConfig::range(ao_range.index, Reference::AoGround))
        .unwrap();
    system
        .single_config(ai.channel(0), &ChannelConfig::range(ai_range.index, Reference::AiGround))
        .unwrap();

    for target in [0.0, 2.5, -2.5, 5.0] {
        system.value_write(ao.channel(0), &ao_range, target).unwrap();
        thread::sleep(Duration::from_millis(50));
        let measured = system.value_read(ai.channel(0), &ai_range).unwrap();
        println!("  {:+.3} V -> {:+.4} V", target, measured);
        assert!(
            (measured - target).abs() < VOLTAGE_TOLERANCE,
            "{} V read back as {} V",
            target,
            measured
        );
    }

    system.value_write(ao.channel(0), &ao_range, 0.0).unwrap();
}
