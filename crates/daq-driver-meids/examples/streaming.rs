//! Counted stream acquisition with async event delivery.
//!
//! Configures a two-channel acquisition on the simulated board, follows
//! its progress through `stream_events`, then demultiplexes the buffer.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p daq-driver-meids --example streaming
//! ```

use daq_driver_meids::{
    MeidsSystem, MockBackend, ReadMode, Reference, StartMode, StopMode, StreamChannel,
    StreamConfigFlags, StreamPhase, StreamReadFlags, StreamTrigger, SubdeviceAddr, TicksFlags,
    Timer,
};
use tracing_subscriber::EnvFilter;

const SCANS: i32 = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mock = MockBackend::new();
    mock.set_input(0, 1, 0, 0x4000);
    mock.set_input(0, 1, 1, 0xC000);
    let system = MeidsSystem::open(mock)?;
    let ai = SubdeviceAddr::new(0, 1);

    let (ticks, rate) =
        system.stream_frequency_to_ticks(ai, Timer::ConvStart, 100_000.0, TicksFlags::empty())?;
    println!("Conversion clock: {} ticks ({:.1} Hz)", ticks, rate);

    let channels = [
        StreamChannel::new(0, 0, Reference::AiGround),
        StreamChannel::new(1, 0, Reference::AiGround),
    ];
    let trigger = StreamTrigger::software(ticks)
        .with_scan_stop_count(channels.len() as i32)
        .with_acq_stop_count(SCANS);
    system.stream_config(ai, &channels, &trigger, 0, StreamConfigFlags::empty())?;

    let mut events = system.stream_events(ai)?;
    system.start_stream(ai, StartMode::NonBlocking)?;

    while let Some(event) = events.recv().await {
        println!("  {:?} (count {})", event.phase, event.count);
        if event.phase == StreamPhase::End {
            break;
        }
    }

    let mut buffer = vec![0; SCANS as usize * channels.len()];
    let read = system.stream_read(ai, ReadMode::NonBlocking, &mut buffer, StreamReadFlags::FRAMES)?;
    buffer.truncate(read);
    system.stop_stream(ai, StopMode::Immediate)?;

    let range = system.range_info(ai, 0)?;
    for entry in &channels {
        let samples = system.extract_values(entry.channel, &buffer, &channels)?;
        let Some(first) = samples.first() else {
            println!("Channel {}: no samples", entry.channel);
            continue;
        };
        let volts = range.to_physical(*first)?.value;
        println!("Channel {}: {} samples, first {:+.4} V", entry.channel, samples.len(), volts);
    }

    system.close()?;
    Ok(())
}
