//! Command implementations, generic over the driver backend.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use daq_driver_meids::{
    ChannelConfig, ChannelAddr, DeviceInfo, IrqEdge, IrqSource, IrqStartFlags, IrqWaitFlags,
    MeidsBackend, MeidsError, MeidsSystem, PwmCounters, PwmStartFlags, Reference, StartMode,
    StopMode, StreamChannel, StreamConfigFlags, StreamPhase, StreamTrigger, SubdeviceAddr,
    SubdeviceType, TicksFlags, Timer, Unit,
};
use tracing::{info, warn};

use crate::Command;

/// Longest time to wait for a stream to report its end.
const STREAM_END_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) async fn run<B: MeidsBackend + 'static>(
    system: MeidsSystem<B>,
    command: Command,
) -> Result<()> {
    match command {
        Command::List => list(&system),
        Command::Info { device } => device_info(&system, device),
        Command::Ranges { device, subdevice } => {
            ranges(&system, SubdeviceAddr::new(device, subdevice))
        }
        Command::Read {
            device,
            subdevice,
            channel,
            range,
            raw,
        } => read(&system, SubdeviceAddr::new(device, subdevice).channel(channel), range, raw),
        Command::Write {
            device,
            subdevice,
            channel,
            value,
            range,
            raw,
        } => write(
            &system,
            SubdeviceAddr::new(device, subdevice).channel(channel),
            value,
            range,
            raw,
        ),
        Command::Stream {
            device,
            subdevice,
            channels,
            rate,
            scans,
            range,
        } => {
            let addr = SubdeviceAddr::new(device, subdevice);
            stream(&system, addr, &channels, rate, scans, range).await
        }
        Command::WaitIrq {
            device,
            subdevice,
            channel,
            edge,
            timeout_ms,
        } => {
            let channel = SubdeviceAddr::new(device, subdevice).channel(channel);
            wait_irq(&system, channel, edge.into(), timeout_ms).await
        }
        Command::Pwm {
            device,
            counters,
            duty_cycle,
            prescaler,
        } => pwm(&system, device, &counters, duty_cycle, prescaler),
        Command::LoadConfig { path } => {
            system.config_load(&path)?;
            println!("Loaded {}", path.display());
            Ok(())
        }
        Command::Version => version(&system),
        Command::Config => {
            print!("{}", system.config().to_toml_string()?);
            Ok(())
        }
    }?;
    system.close()?;
    Ok(())
}

fn print_device(info: &DeviceInfo) {
    println!(
        "Device {}: {} ({}) serial {} on {:?} {}:{}.{}",
        info.index,
        info.name,
        info.driver_name,
        info.serial_no,
        info.bus_type,
        info.bus_no,
        info.dev_no,
        info.func_no
    );
    for sub in &info.subdevices {
        println!(
            "  [{}] {:<8} {:<10?} {:>3} ch  {} range(s)",
            sub.addr.subdevice,
            sub.kind.short_name(),
            sub.subtype,
            sub.channels,
            sub.ranges.len()
        );
    }
}

fn list<B: MeidsBackend>(system: &MeidsSystem<B>) -> Result<()> {
    let devices = system.devices()?;
    if devices.is_empty() {
        println!("No ME-iDS devices found");
    }
    for info in &devices {
        print_device(info);
    }
    Ok(())
}

fn device_info<B: MeidsBackend>(system: &MeidsSystem<B>, device: i32) -> Result<()> {
    let info = system.device_info(device)?;
    print_device(&info);
    println!("  Description: {}", info.description);
    println!("  Vendor/device id: {:#06x}/{:#06x}", info.vendor_id, info.device_id);
    println!("  Plugged: {:?}", info.plugged);
    println!("  Driver version: {}", system.device_driver_version(device)?);
    for sub in &info.subdevices {
        if !sub.caps.is_empty() {
            println!("  [{}] caps {:?}", sub.addr.subdevice, sub.caps);
        }
    }
    Ok(())
}

fn ranges<B: MeidsBackend>(system: &MeidsSystem<B>, addr: SubdeviceAddr) -> Result<()> {
    let ranges = system.ranges(addr, Unit::Any)?;
    if ranges.is_empty() {
        println!("{} has no ranges", addr);
    }
    for range in ranges {
        println!("{}", range);
    }
    Ok(())
}

/// Reference a channel of this subdevice is configured with for single I/O.
fn analog_reference<B: MeidsBackend>(
    system: &MeidsSystem<B>,
    addr: SubdeviceAddr,
) -> Result<Reference> {
    let (kind, _) = system.subdevice_type(addr)?;
    match kind {
        SubdeviceType::AnalogInput => Ok(Reference::AiGround),
        SubdeviceType::AnalogOutput => Ok(Reference::AoGround),
        other => bail!("{} is a {} subdevice; use --raw", addr, other.short_name()),
    }
}

fn read<B: MeidsBackend>(
    system: &MeidsSystem<B>,
    channel: ChannelAddr,
    range: i32,
    raw: bool,
) -> Result<()> {
    if raw {
        println!("{}", system.single_read(channel)?);
        return Ok(());
    }
    let reference = analog_reference(system, channel.subdevice_addr())?;
    let range = system.range_info(channel.subdevice_addr(), range)?;
    system.single_config(channel, &ChannelConfig::range(range.index, reference))?;
    let value = system.value_read(channel, &range)?;
    println!("{:.6} {}", value, range.unit.symbol());
    Ok(())
}

fn write<B: MeidsBackend>(
    system: &MeidsSystem<B>,
    channel: ChannelAddr,
    value: f64,
    range: i32,
    raw: bool,
) -> Result<()> {
    if raw {
        if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
            bail!("raw value {} is not an integer code", value);
        }
        system.single_write(channel, value as i32)?;
        return Ok(());
    }
    let reference = analog_reference(system, channel.subdevice_addr())?;
    let range = system.range_info(channel.subdevice_addr(), range)?;
    system.single_config(channel, &ChannelConfig::range(range.index, reference))?;
    let code = system.value_write(channel, &range, value)?;
    info!(%channel, value, code, "Wrote value");
    Ok(())
}

async fn stream<B: MeidsBackend + 'static>(
    system: &MeidsSystem<B>,
    addr: SubdeviceAddr,
    channels: &[i32],
    rate: f64,
    scans: i32,
    range_index: i32,
) -> Result<()> {
    if channels.is_empty() {
        bail!("at least one channel is required");
    }
    let reference = analog_reference(system, addr)?;
    let range = system.range_info(addr, range_index)?;
    let (ticks, actual_rate) = system
        .stream_frequency_to_ticks(addr, Timer::ConvStart, rate, TicksFlags::empty())
        .with_context(|| format!("{rate} Hz is not a valid conversion rate"))?;
    println!("Conversion rate {:.1} Hz ({} ticks)", actual_rate, ticks);

    let list: Vec<StreamChannel> = channels
        .iter()
        .map(|&channel| StreamChannel::new(channel, range.index, reference))
        .collect();
    let scan_length = i32::try_from(list.len())?;
    let trigger = StreamTrigger::software(ticks)
        .with_scan_stop_count(scan_length)
        .with_acq_stop_count(scans);
    system.stream_config(addr, &list, &trigger, 0, StreamConfigFlags::empty())?;

    let mut events = system.stream_events(addr)?;
    system.start_stream(addr, StartMode::NonBlocking)?;

    let wait_for_end = async {
        while let Some(event) = events.recv().await {
            if let Some(error) = event.error {
                warn!(?error, phase = ?event.phase, "Stream reported an error");
            }
            if event.phase == StreamPhase::End {
                break;
            }
        }
    };
    if tokio::time::timeout(STREAM_END_TIMEOUT, wait_for_end).await.is_err() {
        warn!("Stream did not report its end; reading what is buffered");
    }

    let buffer = system.stream_drain(addr)?;
    system.stop_stream(addr, StopMode::Immediate)?;
    system.clear_stream_callbacks(addr)?;
    println!("Acquired {} values", buffer.len());

    for stream_channel in &list {
        let samples = system.extract_values(stream_channel.channel, &buffer, &list)?;
        if samples.is_empty() {
            println!("  ch{:<3} no samples", stream_channel.channel);
            continue;
        }
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &sample in &samples {
            let value = range.to_physical(sample)?.value;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        println!(
            "  ch{:<3} n={:<6} mean {:+.5} min {:+.5} max {:+.5} {}",
            stream_channel.channel,
            samples.len(),
            sum / samples.len() as f64,
            min,
            max,
            range.unit.symbol()
        );
    }
    Ok(())
}

async fn wait_irq<B: MeidsBackend + 'static>(
    system: &MeidsSystem<B>,
    channel: ChannelAddr,
    edge: IrqEdge,
    timeout_ms: Option<u32>,
) -> Result<()> {
    system.irq_start(channel, IrqSource::DioDefault, edge, 0, IrqStartFlags::empty())?;
    println!("Waiting for interrupt on {} (Ctrl-C to stop)", channel);

    let result = tokio::select! {
        result = system.irq_wait_async(channel, timeout_ms, IrqWaitFlags::empty()) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };
    system.irq_stop(channel)?;

    match result {
        Some(Ok(event)) => {
            println!("Interrupt #{} value {:#x}", event.irq_count, event.value);
            Ok(())
        }
        Some(Err(e)) if e.is_timeout() => bail!("no interrupt before the timeout"),
        Some(Err(e)) => Err(e.into()),
        None => {
            println!("Interrupted");
            Ok(())
        }
    }
}

fn pwm<B: MeidsBackend>(
    system: &MeidsSystem<B>,
    device: i32,
    counters: &[i32],
    duty_cycle: i32,
    prescaler: i32,
) -> Result<()> {
    let &[first, high, low] = counters else {
        return Err(anyhow!("expected three counter subdevices"));
    };
    let counters = PwmCounters::new(device, first, high, low);
    system.pwm_start(
        counters,
        Reference::CtrInternal1Mhz,
        prescaler,
        duty_cycle,
        PwmStartFlags::CONNECT_INTERNAL,
    )?;
    println!("PWM running on device {} counters {:?}", device, [first, high, low]);
    Ok(())
}

fn version<B: MeidsBackend>(system: &MeidsSystem<B>) -> Result<()> {
    println!("Library:     {}", system.library_version()?);
    println!("Main driver: {}", system.main_driver_version()?);
    let devices = match system.number_devices() {
        Ok(count) => count,
        Err(MeidsError::Driver { .. }) => 0,
        Err(e) => return Err(e.into()),
    };
    for device in 0..devices {
        println!("Device {}:    {}", device, system.device_driver_version(device)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use daq_driver_meids::MockBackend;

    fn system() -> MeidsSystem<MockBackend> {
        MeidsSystem::open(MockBackend::new()).unwrap()
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let mock = MockBackend::new();
        let system = MeidsSystem::open(mock.clone()).unwrap();
        write(&system, SubdeviceAddr::new(0, 0).channel(1), 1.25, 0, false).unwrap();
        read(&system, SubdeviceAddr::new(0, 1).channel(1), 0, false).unwrap();
        run(system, Command::List).await.unwrap();
        assert!(!mock.is_open());
    }

    #[test]
    fn test_physical_io_needs_analog_subdevice() {
        let system = system();
        let err = read(&system, SubdeviceAddr::new(0, 3).channel(0), 0, false).unwrap_err();
        assert!(err.to_string().contains("--raw"));
        read(&system, SubdeviceAddr::new(0, 3).channel(0), 0, true).unwrap();
    }

    #[test]
    fn test_raw_write_rejects_fractions() {
        let system = system();
        assert!(write(&system, SubdeviceAddr::new(0, 2).channel(0), 1.5, 0, true).is_err());
        write(&system, SubdeviceAddr::new(0, 2).channel(0), 1.0, 0, true).unwrap();
    }

    #[tokio::test]
    async fn test_stream_command() {
        let system = system();
        stream(&system, SubdeviceAddr::new(0, 1), &[0, 1], 10_000.0, 20, 0)
            .await
            .unwrap();
        assert!(!system.has_stream_callbacks(SubdeviceAddr::new(0, 1)));
    }

    #[tokio::test]
    async fn test_wait_irq_times_out() {
        let system = system();
        let err = wait_irq(&system, SubdeviceAddr::new(0, 6).channel(0), IrqEdge::Rising, Some(10))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_pwm_and_version() {
        let system = system();
        pwm(&system, 0, &[5, 5, 5], 50, 2).unwrap();
        assert!(pwm(&system, 0, &[5, 5], 50, 2).is_err());
        version(&system).unwrap();
    }
}
