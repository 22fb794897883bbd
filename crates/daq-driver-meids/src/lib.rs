//! Safe Rust driver for Meilhaus ME-iDS DAQ boards.
//!
//! This crate wraps the ME-iDS driver library (through `meids-sys`) with
//! typed constants, `Result`-based error handling, RAII sessions and locks,
//! and closure callbacks. All library calls go through the
//! [`MeidsBackend`] trait, so the same API runs against the installed
//! library ([`NativeBackend`], `hardware` feature) or an in-process
//! simulation ([`MockBackend`]).
//!
//! # Architecture
//!
//! ## Session
//! - [`MeidsSystem`] - Open driver session; closes on last drop
//! - [`MeidsConfig`] - Session options (TOML file, `MEIDS_*` environment)
//! - [`LockGuard`] - Driver, device or subdevice lock released on drop
//!
//! ## Discovery
//! - [`DeviceInfo`] / [`SubdeviceInfo`] - Device and subdevice snapshots
//! - [`Range`] - Measurement range with raw/physical conversion
//! - [`Version`] - Library and driver versions
//!
//! ## I/O
//! - Single values: [`MeidsSystem::single_read`], [`MeidsSystem::value_write`],
//!   batches of [`SingleIo`] records
//! - Streams: [`StreamChannel`] lists, [`StreamTrigger`] timing,
//!   [`StreamCallbacks`] or [`MeidsSystem::stream_events`]
//! - Interrupts: [`MeidsSystem::irq_wait`] or [`MeidsSystem::set_irq_callback`]
//! - Utilities: PWM, configuration files, [`conversion`]
//!
//! # Examples
//!
//! ## Single-Value Loopback
//!
//! ```no_run
//! use daq_driver_meids::{ChannelConfig, MeidsSystem, MockBackend, Reference, SubdeviceAddr};
//!
//! # fn example() -> anyhow::Result<()> {
//! let system = MeidsSystem::open(MockBackend::new())?;
//! println!("{} device(s)", system.number_devices()?);
//!
//! let ao = SubdeviceAddr::new(0, 0);
//! let ai = SubdeviceAddr::new(0, 1);
//! system.single_config(ao.channel(0), &ChannelConfig::range(0, Reference::AoGround))?;
//! system.single_write(ao.channel(0), 42)?;
//! assert_eq!(system.single_read(ai.channel(0))?, 42);
//!
//! system.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Counted Stream Acquisition
//!
//! ```no_run
//! use daq_driver_meids::{
//!     MeidsSystem, MockBackend, Reference, StartMode, StreamChannel, StreamConfigFlags,
//!     StreamTrigger, SubdeviceAddr, Timer, TicksFlags,
//! };
//!
//! # fn example() -> anyhow::Result<()> {
//! let system = MeidsSystem::open(MockBackend::new())?;
//! let ai = SubdeviceAddr::new(0, 1);
//!
//! let (ticks, _) =
//!     system.stream_frequency_to_ticks(ai, Timer::ConvStart, 10_000.0, TicksFlags::empty())?;
//! let channels = [StreamChannel::new(0, 0, Reference::AiGround)];
//! let trigger = StreamTrigger::software(ticks).with_acq_stop_count(100);
//! system.stream_config(ai, &channels, &trigger, 0, StreamConfigFlags::empty())?;
//!
//! system.start_stream(ai, StartMode::Blocking)?;
//! let values = system.stream_drain(ai)?;
//! println!("Acquired {} samples", values.len());
//! # Ok(())
//! # }
//! ```

pub mod address;
pub mod backend;
pub mod callback;
pub mod codes;
pub mod config;
pub mod conversion;
pub mod error;
pub mod flags;
pub mod irq;
pub mod mock;
#[cfg(feature = "hardware")]
pub mod native;
pub mod query;
pub mod range;
pub mod records;
pub mod single;
pub mod stream;
pub mod system;
pub mod utility;

pub use address::{ChannelAddr, SubdeviceAddr};
pub use backend::{MeidsBackend, RawDeviceInfo};
pub use callback::{
    CallbackAction, ErrorEvent, ErrorHandler, IrqEvent, IrqHandler, StreamCallbacks, StreamEvent,
    StreamPhase,
};
pub use codes::{
    AccessType, BusType, Capability, Direction, ErrorSwitch, ExtensionType, IrqEdge, IrqSource,
    LockMode, ModuleType, PluggedState, PredefinedRange, ReadMode, Reference, SingleConfig,
    SingleConfigMode, StartMode, StopMode, StreamStatus, SubdeviceSubtype, SubdeviceType, Timer,
    TriggerChannel, TriggerEdge, TriggerType, Unit, WaitMode, WriteMode,
};
pub use config::{LockOnOpen, MeidsConfig, TimeoutSettings, MAX_TIMEOUT_MS};
pub use conversion::Clamped;
pub use error::{ErrorClass, ErrorCode, MeidsError, Result};
pub use flags::{
    CloseFlags, ErrorQueryFlags, IrqStartFlags, IrqWaitFlags, PwmStartFlags, ResetDeviceFlags,
    SingleConfigFlags, SingleFlags, SingleTypeFlags, StreamConfigFlags, StreamReadFlags,
    StreamStartFlags, StreamStartTypeFlags, StreamStopFlags, StreamStopTypeFlags, SubdeviceCaps,
    SubdeviceTypes, TicksFlags,
};
pub use irq::IrqWaitResult;
pub use mock::{MockBackend, MockDevice, MockLockOwner, MockRange, MockSubdevice};
#[cfg(feature = "hardware")]
pub use native::NativeBackend;
pub use query::{DeviceInfo, SubdeviceInfo, Version};
pub use range::Range;
pub use records::{
    AcqStart, SingleIo, StopCondition, StreamChannel, StreamStartRequest, StreamStopRequest,
    StreamTrigger, TimedStart, TriggerArgs,
};
pub use single::ChannelConfig;
pub use system::{LockGuard, LockScope, MeidsSystem};
pub use utility::{PwmCounters, ScanStart};
