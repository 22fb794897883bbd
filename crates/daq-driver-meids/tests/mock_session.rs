//! End-to-end sessions against the simulated board.
//!
//! These run without hardware and walk the same paths an application
//! does: open, discover, configure, move data, close.
//!
//! # Test Coverage
//!
//! | Test | Description |
//! |------|-------------|
//! | `test_single_loopback_session` | Open, count, write AO, read AI, close |
//! | `test_discovery_snapshot` | Device and subdevice enumeration |
//! | `test_stream_acquisition_session` | Configure, start, read, demultiplex |
//! | `test_config_file_session` | Open with a TOML configuration file |
//! | `test_multi_device_search` | Subdevice search across two boards |

use daq_driver_meids::{
    ChannelConfig, LockOnOpen, LockMode, MeidsConfig, MeidsSystem, MockBackend, MockDevice,
    PredefinedRange, ReadMode, Reference, StartMode, StopMode, StreamChannel, StreamConfigFlags,
    StreamReadFlags, StreamTrigger, SubdeviceAddr, SubdeviceSubtype, SubdeviceType, TicksFlags,
    Timer, Unit,
};
use std::io::Write;

const AO: SubdeviceAddr = SubdeviceAddr::new(0, 0);
const AI: SubdeviceAddr = SubdeviceAddr::new(0, 1);

// =============================================================================
// Single values
// =============================================================================

#[test]
fn test_single_loopback_session() {
    let mock = MockBackend::new();
    let system = MeidsSystem::open(mock.clone()).expect("open");

    assert_eq!(system.number_devices().unwrap(), 1);
    assert_eq!(system.number_subdevices(0).unwrap(), 7);

    system
        .single_config(AO.channel(0), &ChannelConfig::range(0, Reference::AoGround))
        .unwrap();
    system
        .single_config(AI.channel(0), &ChannelConfig::range(0, Reference::AiGround))
        .unwrap();
    system.single_write(AO.channel(0), 42).unwrap();
    assert_eq!(system.single_read(AI.channel(0)).unwrap(), 42);

    let range = system.predefined_range(AO, PredefinedRange::Bipolar10V).unwrap();
    system.value_write(AO.channel(0), &range, 5.0).unwrap();
    let volts = system.value_read(AI.channel(0), &range).unwrap();
    assert!((volts - 5.0).abs() < 1e-3, "read back {volts}");

    system.close().unwrap();
    assert!(!mock.is_open());
}

// =============================================================================
// Discovery
// =============================================================================

#[test]
fn test_discovery_snapshot() {
    let system = MeidsSystem::open(MockBackend::new()).unwrap();
    let devices = system.devices().unwrap();
    assert_eq!(devices.len(), 1);

    let board = &devices[0];
    assert_eq!(board.serial_no, 1001);
    assert_eq!(board.subdevices.len(), 7);

    let analog_in = board.subdevices_of(SubdeviceType::AnalogInput).next().unwrap();
    assert_eq!(analog_in.addr, AI);
    assert_eq!(analog_in.subtype, SubdeviceSubtype::Streaming);
    assert_eq!(analog_in.channels, 8);
    assert!(analog_in.ranges.iter().all(|r| r.unit == Unit::Volt));

    let counter = system
        .find_subdevice(0, 0, SubdeviceType::Counter, SubdeviceSubtype::Any)
        .unwrap();
    assert_eq!(counter, Some(SubdeviceAddr::new(0, 5)));
}

#[test]
fn test_multi_device_search() {
    let mock = MockBackend::with_devices(vec![
        MockDevice::multifunction(1001),
        MockDevice::multifunction(1002),
    ]);
    let system = MeidsSystem::open(mock).unwrap();
    assert_eq!(system.number_devices().unwrap(), 2);

    let ai_second = system
        .find_subdevice(1, 0, SubdeviceType::AnalogInput, SubdeviceSubtype::Any)
        .unwrap();
    assert_eq!(ai_second, Some(SubdeviceAddr::new(1, 1)));
    assert_eq!(system.serial_number(1).unwrap().1, 1002);
}

// =============================================================================
// Streaming
// =============================================================================

#[test]
fn test_stream_acquisition_session() {
    let mock = MockBackend::new();
    let system = MeidsSystem::open(mock.clone()).unwrap();
    mock.set_input(0, 1, 2, 1200);
    mock.set_input(0, 1, 5, 3400);

    let _lock = system.acquire_subdevice_lock(AI).unwrap();
    let (ticks, rate) = system
        .stream_frequency_to_ticks(AI, Timer::ConvStart, 50_000.0, TicksFlags::empty())
        .unwrap();
    assert_eq!(ticks, 660);
    assert!((rate - 50_000.0).abs() < 1e-6);

    let channels = [
        StreamChannel::new(2, 0, Reference::AiGround),
        StreamChannel::new(5, 0, Reference::AiGround),
    ];
    let trigger = StreamTrigger::software(ticks)
        .with_scan_stop_count(2)
        .with_acq_stop_count(10);
    system
        .stream_config(AI, &channels, &trigger, 0, StreamConfigFlags::empty())
        .unwrap();
    system.start_stream(AI, StartMode::Blocking).unwrap();

    assert_eq!(system.stream_new_values(AI, Some(100)).unwrap(), 20);
    let mut buffer = vec![0; 15];
    let read = system
        .stream_read(AI, ReadMode::Blocking, &mut buffer, StreamReadFlags::FRAMES)
        .unwrap();
    assert_eq!(read, 14);
    buffer.truncate(read);

    let first = system.extract_values(2, &buffer, &channels).unwrap();
    assert_eq!(first, vec![1200; 7]);
    let second = system.extract_values(5, &buffer, &channels).unwrap();
    assert_eq!(second, vec![3400; 7]);

    system.stop_stream(AI, StopMode::Immediate).unwrap();
    assert!(system.stream_drain(AI).unwrap().is_empty());
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_file_session() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
lock_on_open = "driver"

[timeouts]
single_ms = 250
irq_wait_ms = 50
"#
    )
    .unwrap();

    let config = MeidsConfig::load(file.path()).unwrap();
    assert_eq!(config.lock_on_open, LockOnOpen::Driver);
    assert_eq!(config.timeouts.single_ms, 250);
    assert_eq!(config.timeouts.new_values_ms, 1000);

    let system = MeidsSystem::open_with(MockBackend::new(), config).unwrap();
    system.lock_driver(LockMode::Check).unwrap();
    assert_eq!(system.config().timeouts.irq_wait_ms, 50);
}
