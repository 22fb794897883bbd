//! In-process stand-in for the ME-iDS driver library.
//!
//! [`MockBackend`] implements [`MeidsBackend`] against a simulated device
//! table so the safe API can be exercised without hardware. The default
//! table holds one multifunction board:
//!
//! | Subdevice | Type      | Channels | Notes                          |
//! |-----------|-----------|----------|--------------------------------|
//! | 0         | AO stream | 4        | loops back into subdevice 1    |
//! | 1         | AI stream | 8        | four voltage ranges, 16 bit    |
//! | 2         | DO        | 8        | loops back into subdevice 3    |
//! | 3         | DI        | 8        | interrupt capable              |
//! | 4         | DIO       | 8        |                                |
//! | 5         | CTR 8254  | 3        | PWM capable                    |
//! | 6         | EXT_IRQ   | 1        |                                |
//!
//! Callbacks registered through the backend run on threads owned by the
//! mock, the same way the library runs them on its own threads. Tests can
//! inject interrupts with [`MockBackend::trigger_irq`], simulate another
//! process holding a lock with [`MockBackend::set_foreign_subdevice_lock`],
//! and wait for callback threads with [`MockBackend::join_callbacks`].

use std::collections::VecDeque;
use std::ffi::{CStr, CString};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use libc::{c_char, c_void};
use meids_sys as sys;
use meids_sys::{
    meErrorCB_t, meIOIrqCB_t, meIOSingle_t, meIOStreamCB_t, meIOStreamConfig_t,
    meIOStreamStart_t, meIOStreamStop_t, meIOStreamTrigger_t,
};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use crate::backend::{MeidsBackend, RawDeviceInfo};
use crate::codes::{
    BusType, Capability, IrqEdge, LockMode, PluggedState, ReadMode, StartMode, StopMode,
    SubdeviceSubtype, SubdeviceType, TriggerType, Unit, WriteMode,
};
use crate::error::ErrorCode;
use crate::flags::{SingleTypeFlags, StreamReadFlags, StreamStopTypeFlags, SubdeviceCaps};

/// Timer base of the simulated board, in Hz.
pub const MOCK_BASE_FREQUENCY: f64 = 33_000_000.0;

/// Shortest conversion period the simulated board accepts, in ticks.
pub const MOCK_MIN_CONV_TICKS: u64 = 66;

/// Scans generated per refill when no acquisition stop count is set.
pub const MOCK_FREE_RUN_SCANS: usize = 64;

/// Version reported for the library, main driver and device drivers.
pub const MOCK_VERSION: i32 = 0x0002_0001;

const SUCCESS: i32 = sys::ME_ERRNO_SUCCESS;

type Status = std::result::Result<(), i32>;

// =============================================================================
// Device description
// =============================================================================

/// One range of a simulated subdevice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockRange {
    /// Physical unit
    pub unit: Unit,
    /// Physical value of code 0
    pub min: f64,
    /// Physical value of code `max_data`
    pub max: f64,
    /// Largest raw code
    pub max_data: i32,
}

impl MockRange {
    /// A voltage range.
    pub const fn volts(min: f64, max: f64, max_data: i32) -> Self {
        Self {
            unit: Unit::Volt,
            min,
            max,
            max_data,
        }
    }
}

/// Static description of a simulated subdevice.
#[derive(Debug, Clone)]
pub struct MockSubdevice {
    /// Reported by `meQuerySubdeviceType`
    pub kind: SubdeviceType,
    /// Streaming subtypes accept stream calls
    pub subtype: SubdeviceSubtype,
    /// Number of channels
    pub channels: i32,
    /// Ranges in index order
    pub ranges: Vec<MockRange>,
    /// Reported by `meQuerySubdeviceCaps`
    pub caps: SubdeviceCaps,
    /// Reported by `meQuerySubdeviceCapsArgs`
    pub caps_args: Vec<(Capability, Vec<i32>)>,
    /// Subdevice on the same device that receives every value written here.
    pub loopback: Option<i32>,
}

impl MockSubdevice {
    /// A subdevice with no ranges, caps or loopback.
    pub fn new(kind: SubdeviceType, subtype: SubdeviceSubtype, channels: i32) -> Self {
        Self {
            kind,
            subtype,
            channels,
            ranges: Vec::new(),
            caps: SubdeviceCaps::empty(),
            caps_args: Vec::new(),
            loopback: None,
        }
    }

    /// Append a range.
    pub fn with_range(mut self, range: MockRange) -> Self {
        self.ranges.push(range);
        self
    }

    /// Replace the capability bits.
    pub fn with_caps(mut self, caps: SubdeviceCaps) -> Self {
        self.caps = caps;
        self
    }

    /// Arguments reported for `cap`.
    pub fn with_caps_args(mut self, cap: Capability, args: Vec<i32>) -> Self {
        self.caps_args.push((cap, args));
        self
    }

    /// Copy every value written here to subdevice `target` of the same device.
    pub fn with_loopback(mut self, target: i32) -> Self {
        self.loopback = Some(target);
        self
    }

    fn is_output(&self) -> bool {
        matches!(
            self.kind,
            SubdeviceType::AnalogOutput | SubdeviceType::DigitalOutput
        )
    }

    fn is_input_only(&self) -> bool {
        matches!(
            self.kind,
            SubdeviceType::AnalogInput | SubdeviceType::DigitalInput | SubdeviceType::ExtIrq
        )
    }

    fn is_digital(&self) -> bool {
        matches!(
            self.kind,
            SubdeviceType::DigitalIo | SubdeviceType::DigitalInput | SubdeviceType::DigitalOutput
        )
    }

    fn supports_irq(&self) -> bool {
        matches!(
            self.kind,
            SubdeviceType::ExtIrq | SubdeviceType::DigitalInput | SubdeviceType::DigitalIo
        )
    }
}

/// Static description of a simulated device.
#[derive(Debug, Clone)]
pub struct MockDevice {
    /// Reported by `meQueryNameDevice`
    pub name: String,
    /// Reported by `meQueryNameDeviceDriver`
    pub driver_name: String,
    /// Reported by `meQueryDescriptionDevice`
    pub description: String,
    /// Reported by `meQueryInfoDevice`
    pub vendor_id: i32,
    /// Reported by `meQueryInfoDevice`
    pub device_id: i32,
    /// Reported by `meQueryInfoDevice`
    pub serial_no: i32,
    /// Reported by `meQueryInfoDevice`
    pub bus_type: BusType,
    /// Unplugged devices stay enumerable but fail every I/O call
    pub plugged: PluggedState,
    /// Subdevices in index order
    pub subdevices: Vec<MockSubdevice>,
}

impl MockDevice {
    /// A plugged-in PCI device with no subdevices.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            driver_name: "mock".to_string(),
            description: String::new(),
            vendor_id: 0x1402,
            device_id: 0,
            serial_no: 0,
            bus_type: BusType::Pci,
            plugged: PluggedState::In,
            subdevices: Vec::new(),
        }
    }

    /// Append a subdevice.
    pub fn with_subdevice(mut self, subdevice: MockSubdevice) -> Self {
        self.subdevices.push(subdevice);
        self
    }

    /// The multifunction board described in the module docs.
    pub fn multifunction(serial_no: i32) -> Self {
        let bipolar_10v = MockRange::volts(-10.0, 10.0 - 20.0 / 65536.0, 65535);
        Self {
            driver_name: "me4600".to_string(),
            description: "ME-4680is multifunction board (simulated)".to_string(),
            device_id: 0x4680,
            serial_no,
            ..Self::new("ME-4680is")
        }
        .with_subdevice(
            MockSubdevice::new(SubdeviceType::AnalogOutput, SubdeviceSubtype::Streaming, 4)
                .with_range(bipolar_10v)
                .with_caps(SubdeviceCaps::AO_FIFO | SubdeviceCaps::AO_TRIG_SYNCHRONOUS)
                .with_caps_args(Capability::AoFifoSize, vec![4096])
                .with_loopback(1),
        )
        .with_subdevice(
            MockSubdevice::new(SubdeviceType::AnalogInput, SubdeviceSubtype::Streaming, 8)
                .with_range(bipolar_10v)
                .with_range(MockRange::volts(0.0, 10.0 - 10.0 / 65536.0, 65535))
                .with_range(MockRange::volts(-2.5, 2.5 - 5.0 / 65536.0, 65535))
                .with_range(MockRange::volts(0.0, 2.5 - 2.5 / 65536.0, 65535))
                .with_caps(
                    SubdeviceCaps::AI_FIFO
                        | SubdeviceCaps::AI_SAMPLE_HOLD
                        | SubdeviceCaps::AI_DIFFERENTIAL
                        | SubdeviceCaps::AI_TRIG_SYNCHRONOUS,
                )
                .with_caps_args(Capability::AiFifoSize, vec![2048])
                .with_caps_args(Capability::AiChannelListSize, vec![1024]),
        )
        .with_subdevice(
            MockSubdevice::new(SubdeviceType::DigitalOutput, SubdeviceSubtype::Single, 8)
                .with_caps(SubdeviceCaps::DIO_DIR_BYTE)
                .with_loopback(3),
        )
        .with_subdevice(
            MockSubdevice::new(SubdeviceType::DigitalInput, SubdeviceSubtype::Single, 8)
                .with_caps(SubdeviceCaps::DIO_DIR_BYTE | SubdeviceCaps::DIO_BIT_PATTERN_IRQ),
        )
        .with_subdevice(
            MockSubdevice::new(SubdeviceType::DigitalIo, SubdeviceSubtype::Single, 8)
                .with_caps(SubdeviceCaps::DIO_DIR_BYTE),
        )
        .with_subdevice(
            MockSubdevice::new(SubdeviceType::Counter, SubdeviceSubtype::Ctr8254, 3)
                .with_caps(SubdeviceCaps::CTR_CLK_INTERNAL_1MHZ | SubdeviceCaps::CTR_CLK_EXTERNAL)
                .with_caps_args(Capability::CtrWidth, vec![16]),
        )
        .with_subdevice(
            MockSubdevice::new(SubdeviceType::ExtIrq, SubdeviceSubtype::Single, 1).with_caps(
                SubdeviceCaps::EXT_IRQ_EDGE_RISING
                    | SubdeviceCaps::EXT_IRQ_EDGE_FALLING
                    | SubdeviceCaps::EXT_IRQ_EDGE_ANY,
            ),
        )
    }
}

// =============================================================================
// Runtime state
// =============================================================================

/// Holder of a simulated driver, device or subdevice lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MockLockOwner {
    #[default]
    /// Not held
    Free,
    /// Held by a session in this process
    Local,
    /// Held by another process
    Foreign,
}

impl MockLockOwner {
    fn apply(&mut self, lock: i32) -> Status {
        let mode = LockMode::from_raw(lock).ok_or(sys::ME_ERRNO_INVALID_LOCK)?;
        if *self == MockLockOwner::Foreign {
            return Err(sys::ME_ERRNO_LOCKED);
        }
        match mode {
            LockMode::Set => *self = MockLockOwner::Local,
            LockMode::Release => *self = MockLockOwner::Free,
            LockMode::Check => {}
        }
        Ok(())
    }
}

/// Pointer handed back to a callback unchanged.
#[derive(Debug, Clone, Copy)]
struct Context(*mut c_void);

// SAFETY: the mock never dereferences the pointer; it only passes it back to
// the callback it was registered with, whose registration contract requires
// it to be usable from any thread.
unsafe impl Send for Context {}

impl Context {
    fn get(self) -> *mut c_void {
        self.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct IrqLine {
    armed: bool,
    count: i32,
    pending: u32,
    value: i32,
}

#[derive(Debug, Clone, Copy)]
struct StreamCallbackSet {
    start: (meIOStreamCB_t, Context),
    new_values: (meIOStreamCB_t, Context),
    end: (meIOStreamCB_t, Context),
}

#[derive(Debug, Default)]
struct StreamState {
    config: Vec<meIOStreamConfig_t>,
    trigger: Option<meIOStreamTrigger_t>,
    running: bool,
    /// Scans left to acquire; `None` runs until stopped.
    remaining_scans: Option<usize>,
    buffer: VecDeque<i32>,
}

#[derive(Debug)]
struct SubdeviceSlot {
    model: MockSubdevice,
    lock: MockLockOwner,
    values: Vec<i32>,
    config: Vec<i32>,
    offsets: Vec<f64>,
    irq: Vec<IrqLine>,
    irq_callback: Option<(meIOIrqCB_t, Context)>,
    stream: StreamState,
    stream_callbacks: Option<StreamCallbackSet>,
    pwm: Option<(i32, i32)>,
}

impl SubdeviceSlot {
    fn new(model: MockSubdevice) -> Self {
        let channels = usize::try_from(model.channels).unwrap_or(0);
        Self {
            model,
            lock: MockLockOwner::Free,
            values: vec![0; channels],
            config: vec![0; channels],
            offsets: vec![0.0; channels],
            irq: vec![IrqLine::default(); channels],
            irq_callback: None,
            stream: StreamState::default(),
            stream_callbacks: None,
            pwm: None,
        }
    }

    fn reset(&mut self) {
        self.values.iter_mut().for_each(|v| *v = 0);
        self.config.iter_mut().for_each(|c| *c = 0);
        self.offsets.iter_mut().for_each(|o| *o = 0.0);
        self.irq.iter_mut().for_each(|line| *line = IrqLine::default());
        self.stream = StreamState::default();
        self.pwm = None;
    }

    fn channel_index(&self, channel: i32) -> std::result::Result<usize, i32> {
        usize::try_from(channel)
            .ok()
            .filter(|c| *c < self.values.len())
            .ok_or(sys::ME_ERRNO_INVALID_CHANNEL)
    }

    fn max_data(&self, channel: usize) -> i32 {
        if self.model.is_digital() {
            return 0xFF;
        }
        match self.model.kind {
            SubdeviceType::Counter => 0xFFFF,
            _ => usize::try_from(self.config[channel])
                .ok()
                .and_then(|r| self.model.ranges.get(r))
                .map_or(0xFFFF, |r| r.max_data),
        }
    }

    /// Whole-port value of a digital subdevice.
    fn port(&self) -> i32 {
        self.values
            .iter()
            .enumerate()
            .fold(0, |acc, (bit, v)| acc | ((*v & 1) << bit))
    }

    fn set_port(&mut self, port: i32) {
        for (bit, v) in self.values.iter_mut().enumerate() {
            *v = (port >> bit) & 1;
        }
    }

    fn acquire_scans(&mut self, scans: usize) {
        for _ in 0..scans {
            for entry in &self.stream.config {
                let value = usize::try_from(entry.iChannel)
                    .ok()
                    .and_then(|c| self.values.get(c))
                    .copied()
                    .unwrap_or(0);
                self.stream.buffer.push_back(value);
            }
        }
    }

    /// Make newly acquired values available.
    fn refill(&mut self) {
        if !self.stream.running || self.model.is_output() {
            return;
        }
        match self.stream.remaining_scans {
            Some(0) => {}
            Some(scans) => {
                self.acquire_scans(scans);
                self.stream.remaining_scans = Some(0);
            }
            None if self.stream.buffer.is_empty() => self.acquire_scans(MOCK_FREE_RUN_SCANS),
            None => {}
        }
    }

    fn stream_finished(&self) -> bool {
        self.stream.remaining_scans == Some(0)
    }
}

#[derive(Debug)]
struct DeviceSlot {
    model: MockDevice,
    lock: MockLockOwner,
    subdevices: Vec<SubdeviceSlot>,
}

#[derive(Debug)]
struct MockState {
    open_count: i32,
    driver_lock: MockLockOwner,
    devices: Vec<DeviceSlot>,
    last_error: i32,
    default_proc: bool,
    error_proc: meErrorCB_t,
    loaded_configs: Vec<String>,
}

impl MockState {
    fn require_open(&self) -> Status {
        if self.open_count > 0 {
            Ok(())
        } else {
            Err(sys::ME_ERRNO_NOT_OPEN)
        }
    }

    fn device(&self, device: i32) -> std::result::Result<&DeviceSlot, i32> {
        usize::try_from(device)
            .ok()
            .and_then(|d| self.devices.get(d))
            .ok_or(sys::ME_ERRNO_INVALID_DEVICE)
    }

    fn device_mut(&mut self, device: i32) -> std::result::Result<&mut DeviceSlot, i32> {
        usize::try_from(device)
            .ok()
            .and_then(|d| self.devices.get_mut(d))
            .ok_or(sys::ME_ERRNO_INVALID_DEVICE)
    }

    fn slot(&self, device: i32, subdevice: i32) -> std::result::Result<&SubdeviceSlot, i32> {
        let device = self.device(device)?;
        usize::try_from(subdevice)
            .ok()
            .and_then(|s| device.subdevices.get(s))
            .ok_or(sys::ME_ERRNO_INVALID_SUBDEVICE)
    }

    fn slot_mut(
        &mut self,
        device: i32,
        subdevice: i32,
    ) -> std::result::Result<&mut SubdeviceSlot, i32> {
        let device = self.device_mut(device)?;
        usize::try_from(subdevice)
            .ok()
            .and_then(|s| device.subdevices.get_mut(s))
            .ok_or(sys::ME_ERRNO_INVALID_SUBDEVICE)
    }

    /// The driver drops every lock this process holds once it is fully closed.
    fn release_local_locks(&mut self) {
        let free = |owner: &mut MockLockOwner| {
            if *owner == MockLockOwner::Local {
                *owner = MockLockOwner::Free;
            }
        };
        free(&mut self.driver_lock);
        for device in &mut self.devices {
            free(&mut device.lock);
            for slot in &mut device.subdevices {
                free(&mut slot.lock);
            }
        }
    }

    /// Fails with `LOCKED` if another process holds any lock covering the subdevice.
    fn check_access(&self, device: i32, subdevice: i32) -> Status {
        let slot = self.slot(device, subdevice)?;
        let dev = self.device(device)?;
        if [self.driver_lock, dev.lock, slot.lock].contains(&MockLockOwner::Foreign) {
            return Err(sys::ME_ERRNO_LOCKED);
        }
        Ok(())
    }

    fn single_one(&mut self, io: &mut meIOSingle_t) -> Status {
        self.check_access(io.iDevice, io.iSubdevice)?;
        let slot = self.slot_mut(io.iDevice, io.iSubdevice)?;
        let channel = slot.channel_index(io.iChannel)?;
        if slot.stream.running {
            return Err(sys::ME_ERRNO_SUBDEVICE_BUSY);
        }

        let flags = SingleTypeFlags::from_bits_retain(io.iFlags);
        let whole_port = slot.model.is_digital()
            && flags.intersects(
                SingleTypeFlags::DIO_BYTE | SingleTypeFlags::DIO_WORD | SingleTypeFlags::DIO_DWORD,
            );

        match io.iDir {
            sys::ME_DIR_INPUT => {
                io.iValue = if whole_port {
                    slot.port()
                } else {
                    slot.values[channel]
                };
                Ok(())
            }
            sys::ME_DIR_OUTPUT => {
                if slot.model.is_input_only() {
                    return Err(sys::ME_ERRNO_INVALID_DIR);
                }
                let max_data = if whole_port {
                    0xFF
                } else if slot.model.is_digital() {
                    1
                } else {
                    slot.max_data(channel)
                };
                if io.iValue < 0 || io.iValue > max_data {
                    return Err(sys::ME_ERRNO_VALUE_OUT_OF_RANGE);
                }
                if whole_port {
                    slot.set_port(io.iValue);
                } else {
                    slot.values[channel] = io.iValue;
                }
                let port = slot.port();
                let target = slot.model.loopback;
                let digital = slot.model.is_digital();
                if let Some(target) = target {
                    if let Ok(peer) = self.slot_mut(io.iDevice, target) {
                        if digital {
                            peer.set_port(port);
                        } else if let Some(v) = peer.values.get_mut(channel) {
                            *v = io.iValue;
                        }
                    }
                }
                Ok(())
            }
            sys::ME_DIR_SET_OFFSET => Err(sys::ME_ERRNO_NOT_SUPPORTED),
            _ => Err(sys::ME_ERRNO_INVALID_DIR),
        }
    }

    fn stream_config(
        &mut self,
        device: i32,
        subdevice: i32,
        config: &[meIOStreamConfig_t],
        trigger: &meIOStreamTrigger_t,
    ) -> Status {
        self.check_access(device, subdevice)?;
        let slot = self.slot_mut(device, subdevice)?;
        if slot.model.subtype != SubdeviceSubtype::Streaming {
            return Err(sys::ME_ERRNO_NOT_SUPPORTED);
        }
        if slot.stream.running {
            return Err(sys::ME_ERRNO_SUBDEVICE_BUSY);
        }
        if config.is_empty() {
            return Err(sys::ME_ERRNO_INVALID_CONFIG_LIST_COUNT);
        }
        for entry in config {
            slot.channel_index(entry.iChannel)?;
            let range_ok = usize::try_from(entry.iStreamConfig)
                .ok()
                .is_some_and(|r| r < slot.model.ranges.len());
            if !range_ok {
                return Err(sys::ME_ERRNO_INVALID_STREAM_CONFIG);
            }
        }

        TriggerType::from_raw(trigger.iAcqStartTrigType)
            .ok_or(sys::ME_ERRNO_INVALID_ACQ_START_TRIG_TYPE)?;
        TriggerType::from_raw(trigger.iScanStartTrigType)
            .ok_or(sys::ME_ERRNO_INVALID_SCAN_START_TRIG_TYPE)?;
        let conv = TriggerType::from_raw(trigger.iConvStartTrigType)
            .ok_or(sys::ME_ERRNO_INVALID_CONV_START_TRIG_TYPE)?;
        TriggerType::from_raw(trigger.iScanStopTrigType)
            .ok_or(sys::ME_ERRNO_INVALID_SCAN_STOP_TRIG_TYPE)?;
        let acq_stop = TriggerType::from_raw(trigger.iAcqStopTrigType)
            .ok_or(sys::ME_ERRNO_INVALID_ACQ_STOP_TRIG_TYPE)?;

        let conv_ticks = (u64::from(trigger.iConvStartTicksHigh as u32) << 32)
            | u64::from(trigger.iConvStartTicksLow as u32);
        if conv == TriggerType::Timer && conv_ticks < MOCK_MIN_CONV_TICKS {
            return Err(sys::ME_ERRNO_INVALID_CONV_START_ARG);
        }
        if acq_stop == TriggerType::Count && trigger.iAcqStopCount <= 0 {
            return Err(sys::ME_ERRNO_INVALID_ACQ_STOP_ARG);
        }

        slot.stream = StreamState {
            config: config.to_vec(),
            trigger: Some(*trigger),
            ..StreamState::default()
        };
        Ok(())
    }

    fn stream_start_one(&mut self, entry: &meIOStreamStart_t) -> Status {
        self.check_access(entry.iDevice, entry.iSubdevice)?;
        StartMode::from_raw(entry.iStartMode).ok_or(sys::ME_ERRNO_INVALID_START_MODE)?;
        let slot = self.slot_mut(entry.iDevice, entry.iSubdevice)?;
        let Some(trigger) = slot.stream.trigger else {
            return Err(sys::ME_ERRNO_PREVIOUS_CONFIG);
        };
        if slot.stream.running {
            return Err(sys::ME_ERRNO_SUBDEVICE_BUSY);
        }

        slot.stream.running = true;
        if slot.model.is_output() {
            // Play out everything preloaded; the last value per channel sticks.
            let config = slot.stream.config.clone();
            let played: Vec<i32> = slot.stream.buffer.drain(..).collect();
            let mut last = Vec::new();
            for (index, value) in played.iter().enumerate() {
                let channel = config[index % config.len()].iChannel;
                if let Ok(c) = slot.channel_index(channel) {
                    slot.values[c] = *value;
                    last.push((c, *value));
                }
            }
            slot.stream.remaining_scans = Some(0);
            if let Some(target) = slot.model.loopback {
                if let Ok(peer) = self.slot_mut(entry.iDevice, target) {
                    for (c, v) in last {
                        if let Some(slot_value) = peer.values.get_mut(c) {
                            *slot_value = v;
                        }
                    }
                }
            }
        } else {
            slot.stream.remaining_scans = (TriggerType::from_raw(trigger.iAcqStopTrigType)
                == Some(TriggerType::Count))
            .then(|| usize::try_from(trigger.iAcqStopCount).unwrap_or(0));
            slot.refill();
        }
        Ok(())
    }

    fn stream_stop_one(&mut self, entry: &meIOStreamStop_t) -> Status {
        self.check_access(entry.iDevice, entry.iSubdevice)?;
        StopMode::from_raw(entry.iStopMode).ok_or(sys::ME_ERRNO_INVALID_STOP_MODE)?;
        let slot = self.slot_mut(entry.iDevice, entry.iSubdevice)?;
        slot.stream.running = false;
        let flags = StreamStopTypeFlags::from_bits_retain(entry.iFlags);
        if !flags.contains(StreamStopTypeFlags::PRESERVE_BUFFERS) {
            slot.stream.buffer.clear();
        }
        Ok(())
    }
}

fn write_c_string(text: &str, buffer: &mut [u8]) -> Status {
    let bytes = text.as_bytes();
    if buffer.len() < bytes.len() + 1 {
        return Err(sys::ME_ERRNO_USER_BUFFER_SIZE);
    }
    buffer[..bytes.len()].copy_from_slice(bytes);
    buffer[bytes.len()] = 0;
    Ok(())
}

fn time_to_ticks(time: &mut f64, ticks_low: &mut i32, ticks_high: &mut i32) -> Status {
    if !time.is_finite() || *time < 0.0 {
        return Err(sys::ME_ERRNO_VALUE_OUT_OF_RANGE);
    }
    let ticks = (*time * MOCK_BASE_FREQUENCY).round() as u64;
    *ticks_low = (ticks & 0xFFFF_FFFF) as u32 as i32;
    *ticks_high = (ticks >> 32) as u32 as i32;
    *time = ticks as f64 / MOCK_BASE_FREQUENCY;
    Ok(())
}

// =============================================================================
// Backend
// =============================================================================

struct Shared {
    state: Mutex<MockState>,
    irq_event: Condvar,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

/// Simulated ME-iDS driver.
///
/// Cloning yields another handle to the same simulated driver.
#[derive(Clone)]
pub struct MockBackend {
    shared: Arc<Shared>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("MockBackend")
            .field("open_count", &state.open_count)
            .field("devices", &state.devices.len())
            .finish()
    }
}

impl MockBackend {
    /// One simulated multifunction board.
    pub fn new() -> Self {
        Self::with_devices(vec![MockDevice::multifunction(1001)])
    }

    /// A simulated driver exposing `devices`.
    pub fn with_devices(devices: Vec<MockDevice>) -> Self {
        let devices = devices
            .into_iter()
            .map(|model| DeviceSlot {
                subdevices: model.subdevices.iter().cloned().map(SubdeviceSlot::new).collect(),
                model,
                lock: MockLockOwner::Free,
            })
            .collect();
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(MockState {
                    open_count: 0,
                    driver_lock: MockLockOwner::Free,
                    devices,
                    last_error: SUCCESS,
                    default_proc: false,
                    error_proc: None,
                    loaded_configs: Vec::new(),
                }),
                irq_event: Condvar::new(),
                threads: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Whether the simulated driver is open.
    pub fn is_open(&self) -> bool {
        self.shared.state.lock().open_count > 0
    }

    /// Current holder of the driver lock.
    pub fn driver_lock_owner(&self) -> MockLockOwner {
        self.shared.state.lock().driver_lock
    }

    /// `None` for an unknown device.
    pub fn device_lock_owner(&self, device: i32) -> Option<MockLockOwner> {
        self.shared.state.lock().device(device).ok().map(|dev| dev.lock)
    }

    /// `None` for an unknown subdevice.
    pub fn subdevice_lock_owner(&self, device: i32, subdevice: i32) -> Option<MockLockOwner> {
        self.shared
            .state
            .lock()
            .slot(device, subdevice)
            .ok()
            .map(|slot| slot.lock)
    }

    /// Simulate another process holding (or releasing) a subdevice lock.
    pub fn set_foreign_subdevice_lock(&self, device: i32, subdevice: i32, locked: bool) {
        if let Ok(slot) = self.shared.state.lock().slot_mut(device, subdevice) {
            slot.lock = if locked { MockLockOwner::Foreign } else { MockLockOwner::Free };
        }
    }

    /// Simulate another process holding (or releasing) a device lock.
    pub fn set_foreign_device_lock(&self, device: i32, locked: bool) {
        if let Ok(dev) = self.shared.state.lock().device_mut(device) {
            dev.lock = if locked { MockLockOwner::Foreign } else { MockLockOwner::Free };
        }
    }

    /// Set the value an input channel reads.
    pub fn set_input(&self, device: i32, subdevice: i32, channel: i32, value: i32) {
        if let Ok(slot) = self.shared.state.lock().slot_mut(device, subdevice) {
            if let Ok(c) = slot.channel_index(channel) {
                slot.values[c] = value;
            }
        }
    }

    /// Configuration files accepted by `config_load`, in load order.
    pub fn loaded_configs(&self) -> Vec<String> {
        self.shared.state.lock().loaded_configs.clone()
    }

    /// Prescaler and duty cycle of a running PWM.
    pub fn pwm_state(&self, device: i32, subdevice: i32) -> Option<(i32, i32)> {
        self.shared
            .state
            .lock()
            .slot(device, subdevice)
            .ok()
            .and_then(|slot| slot.pwm)
    }

    /// Signal an interrupt on an armed channel.
    ///
    /// Wakes any `irq_wait` on the channel and, if a callback is
    /// registered, runs it on a new thread. Returns `false` if the channel
    /// is not armed.
    pub fn trigger_irq(&self, device: i32, subdevice: i32, channel: i32, value: i32) -> bool {
        let (callback, count) = {
            let mut state = self.shared.state.lock();
            let Ok(slot) = state.slot_mut(device, subdevice) else {
                return false;
            };
            let Ok(c) = slot.channel_index(channel) else {
                return false;
            };
            let line = &mut slot.irq[c];
            if !line.armed {
                return false;
            }
            line.count += 1;
            line.pending += 1;
            line.value = value;
            (slot.irq_callback, line.count)
        };
        self.shared.irq_event.notify_all();

        if let Some((Some(callback), context)) = callback {
            let shared = Arc::clone(&self.shared);
            self.spawn(move || {
                // SAFETY: callback and context were registered together via
                // irq_set_callback, whose contract keeps both valid.
                let ret = unsafe {
                    callback(device, subdevice, channel, count, value, context.get(), SUCCESS)
                };
                if ret != 0 {
                    if let Ok(slot) = shared.state.lock().slot_mut(device, subdevice) {
                        if let Some(line) = slot.irq.get_mut(channel as usize) {
                            line.armed = false;
                        }
                    }
                }
            });
        }
        true
    }

    /// Wait for every callback thread started so far.
    pub fn join_callbacks(&self) {
        loop {
            let handles: Vec<_> = std::mem::take(&mut *self.shared.threads.lock());
            if handles.is_empty() {
                break;
            }
            let current = thread::current().id();
            for handle in handles {
                if handle.thread().id() != current {
                    let _ = handle.join();
                }
            }
        }
    }

    fn spawn(&self, f: impl FnOnce() + Send + 'static) {
        let handle = thread::spawn(f);
        self.shared.threads.lock().push(handle);
    }

    /// Run `f` on the state, record failures and notify the error callback.
    fn call(&self, function: &'static str, f: impl FnOnce(&mut MockState) -> Status) -> i32 {
        let status = {
            let mut state = self.shared.state.lock();
            f(&mut state).err().unwrap_or(SUCCESS)
        };
        self.report(function, status)
    }

    /// Like [`call`](Self::call) but fails with `NOT_OPEN` before `meOpen`.
    fn call_open(&self, function: &'static str, f: impl FnOnce(&mut MockState) -> Status) -> i32 {
        self.call(function, |state| {
            state.require_open()?;
            f(state)
        })
    }

    fn report(&self, function: &'static str, status: i32) -> i32 {
        if status == SUCCESS {
            trace!(function, "mock call succeeded");
            return status;
        }

        let (error_proc, default_proc) = {
            let mut state = self.shared.state.lock();
            state.last_error = status;
            (state.error_proc, state.default_proc)
        };
        if default_proc {
            warn!(function, status, "ME-iDS call failed");
        } else {
            debug!(function, status, "ME-iDS call failed");
        }
        if let Some(callback) = error_proc {
            if let Ok(name) = CString::new(format!("{}()", function)) {
                // SAFETY: registered via error_set_user_proc, whose contract
                // keeps the callback valid until replaced.
                unsafe {
                    callback(name.as_ptr() as *mut c_char, status);
                }
            }
        }
        status
    }

    fn fire_stream_callbacks(&self, device: i32, subdevice: i32) {
        let callbacks = {
            let state = self.shared.state.lock();
            state
                .slot(device, subdevice)
                .ok()
                .and_then(|slot| slot.stream_callbacks)
        };
        let Some(callbacks) = callbacks else {
            return;
        };

        let shared = Arc::clone(&self.shared);
        self.spawn(move || {
            let callbacks = callbacks;
            let stop = |shared: &Shared| {
                if let Ok(slot) = shared.state.lock().slot_mut(device, subdevice) {
                    slot.stream.running = false;
                }
            };

            // SAFETY (all calls below): callbacks and contexts were
            // registered together via stream_set_callbacks, whose contract
            // keeps them valid.
            if let (Some(start), context) = callbacks.start {
                if unsafe { start(device, subdevice, 0, context.get(), SUCCESS) } != 0 {
                    stop(&shared);
                }
            }

            let (available, finished) = {
                let mut state = shared.state.lock();
                match state.slot_mut(device, subdevice) {
                    Ok(slot) if slot.stream.running => {
                        slot.refill();
                        (Some(slot.stream.buffer.len()), slot.stream_finished())
                    }
                    _ => (None, true),
                }
            };

            if let (Some(count), (Some(new_values), context)) = (available, callbacks.new_values) {
                let count = i32::try_from(count).unwrap_or(i32::MAX);
                if unsafe { new_values(device, subdevice, count, context.get(), SUCCESS) } == 0 {
                    stop(&shared);
                }
            }

            let still_running = shared
                .state
                .lock()
                .slot(device, subdevice)
                .is_ok_and(|slot| slot.stream.running);
            if finished || !still_running {
                if let (Some(end), context) = callbacks.end {
                    unsafe { end(device, subdevice, 0, context.get(), SUCCESS) };
                }
            }
        });
    }
}

impl MeidsBackend for MockBackend {
    fn open(&self, flags: i32) -> i32 {
        self.call("meOpen", |state| {
            if flags != sys::ME_OPEN_NO_FLAGS {
                return Err(sys::ME_ERRNO_INVALID_FLAGS);
            }
            state.open_count += 1;
            Ok(())
        })
    }

    fn close(&self, flags: i32) -> i32 {
        let status = self.call_open("meClose", |state| {
            if flags & !sys::ME_CLOSE_FORCE != 0 {
                return Err(sys::ME_ERRNO_INVALID_FLAGS);
            }
            state.open_count = if flags & sys::ME_CLOSE_FORCE != 0 {
                0
            } else {
                state.open_count - 1
            };
            if state.open_count == 0 {
                state.release_local_locks();
                for device in &mut state.devices {
                    for slot in &mut device.subdevices {
                        slot.irq_callback = None;
                        slot.stream_callbacks = None;
                        slot.stream.running = false;
                        slot.irq.iter_mut().for_each(|line| line.armed = false);
                    }
                }
            }
            Ok(())
        });
        if status == SUCCESS {
            self.shared.irq_event.notify_all();
            self.join_callbacks();
        }
        status
    }

    fn lock_driver(&self, lock: i32, _flags: i32) -> i32 {
        self.call_open("meLockDriver", |state| state.driver_lock.apply(lock))
    }

    fn lock_device(&self, device: i32, lock: i32, _flags: i32) -> i32 {
        self.call_open("meLockDevice", |state| {
            if state.driver_lock == MockLockOwner::Foreign {
                return Err(sys::ME_ERRNO_LOCKED);
            }
            state.device_mut(device)?.lock.apply(lock)
        })
    }

    fn lock_subdevice(&self, device: i32, subdevice: i32, lock: i32, _flags: i32) -> i32 {
        self.call_open("meLockSubdevice", |state| {
            if state.driver_lock == MockLockOwner::Foreign
                || state.device(device)?.lock == MockLockOwner::Foreign
            {
                return Err(sys::ME_ERRNO_LOCKED);
            }
            state.slot_mut(device, subdevice)?.lock.apply(lock)
        })
    }

    fn error_get_last(&self, error_code: &mut i32, flags: i32) -> i32 {
        if flags & !sys::ME_ERRNO_CLEAR_FLAGS != 0 {
            return self.report("meErrorGetLast", sys::ME_ERRNO_INVALID_FLAGS);
        }
        let mut state = self.shared.state.lock();
        *error_code = state.last_error;
        if flags & sys::ME_ERRNO_CLEAR_FLAGS != 0 {
            state.last_error = SUCCESS;
        }
        SUCCESS
    }

    fn error_get_last_message(&self, message: &mut [u8]) -> i32 {
        let last = self.shared.state.lock().last_error;
        self.error_get_message(last, message)
    }

    fn error_get_message(&self, error_code: i32, message: &mut [u8]) -> i32 {
        if message.is_empty() {
            return self.report("meErrorGetMessage", sys::ME_ERRNO_INVALID_ERROR_MSG_COUNT);
        }
        let (text, status) = match ErrorCode::from_raw(error_code) {
            Some(code) => (code.message(), SUCCESS),
            None => (
                ErrorCode::InvalidErrorNumber.message(),
                sys::ME_ERRNO_INVALID_ERROR_NUMBER,
            ),
        };
        // Truncate like strncpy, always terminated.
        let len = text.len().min(message.len() - 1);
        message[..len].copy_from_slice(&text.as_bytes()[..len]);
        message[len] = 0;
        if status == SUCCESS && len < text.len() {
            return sys::ME_ERRNO_INVALID_ERROR_MSG_COUNT;
        }
        status
    }

    fn error_set_default_proc(&self, switch: i32) -> i32 {
        self.call("meErrorSetDefaultProc", |state| {
            state.default_proc = match switch {
                sys::ME_SWITCH_ENABLE => true,
                sys::ME_SWITCH_DISABLE => false,
                _ => return Err(sys::ME_ERRNO_INVALID_SWITCH),
            };
            Ok(())
        })
    }

    unsafe fn error_set_user_proc(&self, callback: meErrorCB_t) -> i32 {
        self.shared.state.lock().error_proc = callback;
        SUCCESS
    }

    unsafe fn irq_set_callback(
        &self,
        device: i32,
        subdevice: i32,
        callback: meIOIrqCB_t,
        context: *mut c_void,
        _flags: i32,
    ) -> i32 {
        let context = Context(context);
        self.call_open("meIOIrqSetCallback", |state| {
            state.check_access(device, subdevice)?;
            let slot = state.slot_mut(device, subdevice)?;
            if !slot.model.supports_irq() {
                return Err(sys::ME_ERRNO_NOT_SUPPORTED);
            }
            slot.irq_callback = callback.map(|_| (callback, context));
            Ok(())
        })
    }

    fn irq_start(
        &self,
        device: i32,
        subdevice: i32,
        channel: i32,
        _irq_source: i32,
        irq_edge: i32,
        _irq_arg: i32,
        _flags: i32,
    ) -> i32 {
        self.call_open("meIOIrqStart", |state| {
            state.check_access(device, subdevice)?;
            let slot = state.slot_mut(device, subdevice)?;
            if !slot.model.supports_irq() {
                return Err(sys::ME_ERRNO_NOT_SUPPORTED);
            }
            let c = slot.channel_index(channel)?;
            IrqEdge::from_raw(irq_edge).ok_or(sys::ME_ERRNO_INVALID_IRQ_EDGE)?;
            slot.irq[c] = IrqLine {
                armed: true,
                ..IrqLine::default()
            };
            Ok(())
        })
    }

    fn irq_stop(&self, device: i32, subdevice: i32, channel: i32, _flags: i32) -> i32 {
        let status = self.call_open("meIOIrqStop", |state| {
            state.check_access(device, subdevice)?;
            let slot = state.slot_mut(device, subdevice)?;
            let c = slot.channel_index(channel)?;
            slot.irq[c].armed = false;
            Ok(())
        });
        self.shared.irq_event.notify_all();
        status
    }

    fn irq_wait(
        &self,
        device: i32,
        subdevice: i32,
        channel: i32,
        irq_count: &mut i32,
        value: &mut i32,
        timeout: i32,
        _flags: i32,
    ) -> i32 {
        if timeout < 0 {
            return self.report("meIOIrqWait", sys::ME_ERRNO_INVALID_TIMEOUT);
        }
        let deadline = (timeout > 0)
            .then(|| Instant::now() + Duration::from_millis(u64::from(timeout.unsigned_abs())));

        let status = {
            let mut state = self.shared.state.lock();
            loop {
                let line = match state.require_open().and_then(|()| {
                    let slot = state.slot(device, subdevice)?;
                    let c = slot.channel_index(channel)?;
                    Ok(slot.irq[c])
                }) {
                    Ok(line) => line,
                    Err(status) => break status,
                };
                if line.pending > 0 {
                    if let Ok(slot) = state.slot_mut(device, subdevice) {
                        slot.irq[channel as usize].pending -= 1;
                    }
                    *irq_count = line.count;
                    *value = line.value;
                    break SUCCESS;
                }
                if !line.armed {
                    break sys::ME_ERRNO_SUBDEVICE_NOT_RUNNING;
                }
                match deadline {
                    Some(deadline) => {
                        if self.shared.irq_event.wait_until(&mut state, deadline).timed_out() {
                            break sys::ME_ERRNO_TIMEOUT;
                        }
                    }
                    None => self.shared.irq_event.wait(&mut state),
                }
            }
        };
        self.report("meIOIrqWait", status)
    }

    fn reset_device(&self, device: i32, flags: i32) -> i32 {
        self.call_open("meIOResetDevice", |state| {
            let unprotected = flags & sys::ME_IO_RESET_DEVICE_UNPROTECTED != 0;
            let dev = state.device_mut(device)?;
            if !unprotected
                && (dev.lock == MockLockOwner::Foreign
                    || dev.subdevices.iter().any(|s| s.lock == MockLockOwner::Foreign))
            {
                return Err(sys::ME_ERRNO_LOCKED);
            }
            dev.subdevices.iter_mut().for_each(SubdeviceSlot::reset);
            Ok(())
        })
    }

    fn reset_subdevice(&self, device: i32, subdevice: i32, _flags: i32) -> i32 {
        self.call_open("meIOResetSubdevice", |state| {
            state.check_access(device, subdevice)?;
            state.slot_mut(device, subdevice)?.reset();
            Ok(())
        })
    }

    fn single_config(
        &self,
        device: i32,
        subdevice: i32,
        channel: i32,
        single_config: i32,
        _reference: i32,
        _trig_chan: i32,
        trig_type: i32,
        _trig_edge: i32,
        _flags: i32,
    ) -> i32 {
        self.call_open("meIOSingleConfig", |state| {
            state.check_access(device, subdevice)?;
            let slot = state.slot_mut(device, subdevice)?;
            let c = slot.channel_index(channel)?;
            if slot.stream.running {
                return Err(sys::ME_ERRNO_SUBDEVICE_BUSY);
            }
            TriggerType::from_raw(trig_type).ok_or(sys::ME_ERRNO_INVALID_TRIG_TYPE)?;
            if !slot.model.ranges.is_empty() {
                let valid = usize::try_from(single_config)
                    .ok()
                    .is_some_and(|r| r < slot.model.ranges.len());
                if !valid {
                    return Err(sys::ME_ERRNO_INVALID_SINGLE_CONFIG);
                }
            }
            slot.config[c] = single_config;
            Ok(())
        })
    }

    fn single(&self, list: &mut [meIOSingle_t], flags: i32) -> i32 {
        self.call_open("meIOSingle", |state| {
            if list.is_empty() {
                return Err(sys::ME_ERRNO_INVALID_SINGLE_LIST);
            }
            if flags & !sys::ME_IO_SINGLE_NONBLOCKING != 0 {
                return Err(sys::ME_ERRNO_INVALID_FLAGS);
            }
            let mut first_error = SUCCESS;
            for io in list.iter_mut() {
                io.iErrno = state.single_one(io).err().unwrap_or(SUCCESS);
                if first_error == SUCCESS {
                    first_error = io.iErrno;
                }
            }
            match first_error {
                SUCCESS => Ok(()),
                error => Err(error),
            }
        })
    }

    fn stream_config(
        &self,
        device: i32,
        subdevice: i32,
        config: &mut [meIOStreamConfig_t],
        trigger: &mut meIOStreamTrigger_t,
        _fifo_irq_threshold: i32,
        _flags: i32,
    ) -> i32 {
        self.call_open("meIOStreamConfig", |state| {
            state.stream_config(device, subdevice, config, trigger)
        })
    }

    fn stream_new_values(
        &self,
        device: i32,
        subdevice: i32,
        _timeout: i32,
        count: &mut i32,
        _flags: i32,
    ) -> i32 {
        self.call_open("meIOStreamNewValues", |state| {
            let slot = state.slot_mut(device, subdevice)?;
            slot.refill();
            *count = i32::try_from(slot.stream.buffer.len()).unwrap_or(i32::MAX);
            if *count == 0 && !slot.stream.running {
                return Err(sys::ME_ERRNO_SUBDEVICE_NOT_RUNNING);
            }
            Ok(())
        })
    }

    fn stream_read(
        &self,
        device: i32,
        subdevice: i32,
        read_mode: i32,
        values: &mut [i32],
        count: &mut i32,
        flags: i32,
    ) -> i32 {
        self.call_open("meIOStreamRead", |state| {
            ReadMode::from_raw(read_mode).ok_or(sys::ME_ERRNO_INVALID_READ_MODE)?;
            state.check_access(device, subdevice)?;
            let slot = state.slot_mut(device, subdevice)?;
            if slot.model.is_output() {
                return Err(sys::ME_ERRNO_NOT_SUPPORTED);
            }
            slot.refill();

            let mut take = values.len().min(slot.stream.buffer.len());
            if StreamReadFlags::from_bits_retain(flags).contains(StreamReadFlags::FRAMES) {
                let scan = slot.stream.config.len().max(1);
                take -= take % scan;
            }
            for (dst, src) in values.iter_mut().zip(slot.stream.buffer.drain(..take)) {
                *dst = src;
            }
            *count = i32::try_from(take).unwrap_or(i32::MAX);
            Ok(())
        })
    }

    fn stream_write(
        &self,
        device: i32,
        subdevice: i32,
        write_mode: i32,
        values: &[i32],
        count: &mut i32,
        _flags: i32,
    ) -> i32 {
        self.call_open("meIOStreamWrite", |state| {
            WriteMode::from_raw(write_mode).ok_or(sys::ME_ERRNO_INVALID_WRITE_MODE)?;
            state.check_access(device, subdevice)?;
            let slot = state.slot_mut(device, subdevice)?;
            if !slot.model.is_output() || slot.model.subtype != SubdeviceSubtype::Streaming {
                return Err(sys::ME_ERRNO_NOT_SUPPORTED);
            }
            if slot.stream.trigger.is_none() {
                return Err(sys::ME_ERRNO_PREVIOUS_CONFIG);
            }
            let capacity = slot
                .model
                .caps_args
                .iter()
                .find(|(cap, _)| *cap == Capability::AoFifoSize)
                .and_then(|(_, args)| args.first())
                .and_then(|size| usize::try_from(*size).ok())
                .unwrap_or(usize::MAX);
            let room = capacity.saturating_sub(slot.stream.buffer.len());
            let accepted = values.len().min(room);
            slot.stream.buffer.extend(&values[..accepted]);
            *count = i32::try_from(accepted).unwrap_or(i32::MAX);
            Ok(())
        })
    }

    fn stream_start(&self, list: &mut [meIOStreamStart_t], _flags: i32) -> i32 {
        let status = self.call_open("meIOStreamStart", |state| {
            if list.is_empty() {
                return Err(sys::ME_ERRNO_INVALID_CONFIG_LIST_COUNT);
            }
            let mut first_error = SUCCESS;
            for entry in list.iter_mut() {
                entry.iErrno = state.stream_start_one(entry).err().unwrap_or(SUCCESS);
                if first_error == SUCCESS {
                    first_error = entry.iErrno;
                }
            }
            match first_error {
                SUCCESS => Ok(()),
                error => Err(error),
            }
        });
        for entry in list.iter() {
            if entry.iErrno == SUCCESS {
                self.fire_stream_callbacks(entry.iDevice, entry.iSubdevice);
            }
        }
        status
    }

    fn stream_stop(&self, list: &mut [meIOStreamStop_t], _flags: i32) -> i32 {
        self.call_open("meIOStreamStop", |state| {
            if list.is_empty() {
                return Err(sys::ME_ERRNO_INVALID_CONFIG_LIST_COUNT);
            }
            let mut first_error = SUCCESS;
            for entry in list.iter_mut() {
                entry.iErrno = state.stream_stop_one(entry).err().unwrap_or(SUCCESS);
                if first_error == SUCCESS {
                    first_error = entry.iErrno;
                }
            }
            match first_error {
                SUCCESS => Ok(()),
                error => Err(error),
            }
        })
    }

    fn stream_status(
        &self,
        device: i32,
        subdevice: i32,
        _wait: i32,
        status: &mut i32,
        count: &mut i32,
        _flags: i32,
    ) -> i32 {
        self.call_open("meIOStreamStatus", |state| {
            let slot = state.slot_mut(device, subdevice)?;
            slot.refill();
            *status = if slot.stream.running && !slot.stream_finished() {
                sys::ME_STATUS_BUSY
            } else {
                sys::ME_STATUS_IDLE
            };
            *count = i32::try_from(slot.stream.buffer.len()).unwrap_or(i32::MAX);
            Ok(())
        })
    }

    unsafe fn stream_set_callbacks(
        &self,
        device: i32,
        subdevice: i32,
        start: meIOStreamCB_t,
        start_context: *mut c_void,
        new_values: meIOStreamCB_t,
        new_values_context: *mut c_void,
        end: meIOStreamCB_t,
        end_context: *mut c_void,
        _flags: i32,
    ) -> i32 {
        let set = StreamCallbackSet {
            start: (start, Context(start_context)),
            new_values: (new_values, Context(new_values_context)),
            end: (end, Context(end_context)),
        };
        self.call_open("meIOStreamSetCallbacks", |state| {
            state.check_access(device, subdevice)?;
            let slot = state.slot_mut(device, subdevice)?;
            if slot.model.subtype != SubdeviceSubtype::Streaming {
                return Err(sys::ME_ERRNO_NOT_SUPPORTED);
            }
            let any = start.is_some() || new_values.is_some() || end.is_some();
            slot.stream_callbacks = any.then_some(set);
            Ok(())
        })
    }

    fn stream_time_to_ticks(
        &self,
        device: i32,
        subdevice: i32,
        _timer: i32,
        time: &mut f64,
        ticks_low: &mut i32,
        ticks_high: &mut i32,
        _flags: i32,
    ) -> i32 {
        self.call_open("meIOStreamTimeToTicks", |state| {
            state.slot(device, subdevice)?;
            time_to_ticks(time, ticks_low, ticks_high)
        })
    }

    fn stream_frequency_to_ticks(
        &self,
        device: i32,
        subdevice: i32,
        _timer: i32,
        frequency: &mut f64,
        ticks_low: &mut i32,
        ticks_high: &mut i32,
        _flags: i32,
    ) -> i32 {
        self.call_open("meIOStreamFrequencyToTicks", |state| {
            state.slot(device, subdevice)?;
            if !(*frequency > 0.0) {
                return Err(sys::ME_ERRNO_VALUE_OUT_OF_RANGE);
            }
            let mut time = 1.0 / *frequency;
            time_to_ticks(&mut time, ticks_low, ticks_high)?;
            *frequency = if time > 0.0 { 1.0 / time } else { 0.0 };
            Ok(())
        })
    }

    fn set_channel_offset(
        &self,
        device: i32,
        subdevice: i32,
        channel: i32,
        range: i32,
        offset: &mut f64,
        _flags: i32,
    ) -> i32 {
        self.call_open("meIOSetChannelOffset", |state| {
            state.check_access(device, subdevice)?;
            let slot = state.slot_mut(device, subdevice)?;
            let c = slot.channel_index(channel)?;
            let r = usize::try_from(range)
                .ok()
                .and_then(|r| slot.model.ranges.get(r))
                .ok_or(sys::ME_ERRNO_INVALID_RANGE)?;
            let limit = (r.max - r.min) / 2.0;
            if offset.abs() > limit {
                return Err(sys::ME_ERRNO_VALUE_OUT_OF_RANGE);
            }
            slot.offsets[c] = *offset;
            Ok(())
        })
    }

    fn single_time_to_ticks(
        &self,
        device: i32,
        subdevice: i32,
        _timer: i32,
        time: &mut f64,
        ticks_low: &mut i32,
        ticks_high: &mut i32,
        _flags: i32,
    ) -> i32 {
        self.call_open("meIOSingleTimeToTicks", |state| {
            state.slot(device, subdevice)?;
            time_to_ticks(time, ticks_low, ticks_high)
        })
    }

    fn single_ticks_to_time(
        &self,
        device: i32,
        subdevice: i32,
        _timer: i32,
        ticks_low: i32,
        ticks_high: i32,
        time: &mut f64,
        _flags: i32,
    ) -> i32 {
        self.call_open("meIOSingleTicksToTime", |state| {
            state.slot(device, subdevice)?;
            let ticks = (u64::from(ticks_high as u32) << 32) | u64::from(ticks_low as u32);
            *time = ticks as f64 / MOCK_BASE_FREQUENCY;
            Ok(())
        })
    }

    fn query_description_device(&self, device: i32, description: &mut [u8]) -> i32 {
        self.call_open("meQueryDescriptionDevice", |state| {
            write_c_string(&state.device(device)?.model.description, description)
        })
    }

    fn query_info_device(&self, device: i32, info: &mut RawDeviceInfo) -> i32 {
        self.call_open("meQueryInfoDevice", |state| {
            let model = &state.device(device)?.model;
            *info = RawDeviceInfo {
                vendor_id: model.vendor_id,
                device_id: model.device_id,
                serial_no: model.serial_no,
                bus_type: model.bus_type.to_raw(),
                bus_no: 0,
                dev_no: device,
                func_no: 0,
                plugged: model.plugged.to_raw(),
            };
            Ok(())
        })
    }

    fn query_name_device(&self, device: i32, name: &mut [u8]) -> i32 {
        self.call_open("meQueryNameDevice", |state| {
            write_c_string(&state.device(device)?.model.name, name)
        })
    }

    fn query_name_device_driver(&self, device: i32, name: &mut [u8]) -> i32 {
        self.call_open("meQueryNameDeviceDriver", |state| {
            write_c_string(&state.device(device)?.model.driver_name, name)
        })
    }

    fn query_number_devices(&self, number: &mut i32) -> i32 {
        self.call_open("meQueryNumberDevices", |state| {
            *number = i32::try_from(state.devices.len()).unwrap_or(i32::MAX);
            Ok(())
        })
    }

    fn query_number_subdevices(&self, device: i32, number: &mut i32) -> i32 {
        self.call_open("meQueryNumberSubdevices", |state| {
            *number = i32::try_from(state.device(device)?.subdevices.len()).unwrap_or(i32::MAX);
            Ok(())
        })
    }

    fn query_number_channels(&self, device: i32, subdevice: i32, number: &mut i32) -> i32 {
        self.call_open("meQueryNumberChannels", |state| {
            *number = state.slot(device, subdevice)?.model.channels;
            Ok(())
        })
    }

    fn query_number_ranges(&self, device: i32, subdevice: i32, unit: i32, number: &mut i32) -> i32 {
        self.call_open("meQueryNumberRanges", |state| {
            let unit = Unit::from_raw(unit).ok_or(sys::ME_ERRNO_INVALID_UNIT)?;
            let slot = state.slot(device, subdevice)?;
            let matching = slot
                .model
                .ranges
                .iter()
                .filter(|r| unit == Unit::Any || r.unit == unit)
                .count();
            *number = i32::try_from(matching).unwrap_or(i32::MAX);
            Ok(())
        })
    }

    fn query_range_by_min_max(
        &self,
        device: i32,
        subdevice: i32,
        unit: i32,
        min: &mut f64,
        max: &mut f64,
        max_data: &mut i32,
        range: &mut i32,
    ) -> i32 {
        self.call_open("meQueryRangeByMinMax", |state| {
            let unit = Unit::from_raw(unit).ok_or(sys::ME_ERRNO_INVALID_UNIT)?;
            if *min > *max {
                return Err(sys::ME_ERRNO_INVALID_MIN_MAX);
            }
            let slot = state.slot(device, subdevice)?;
            // Narrowest range that covers the request.
            let (index, best) = slot
                .model
                .ranges
                .iter()
                .enumerate()
                .filter(|(_, r)| unit == Unit::Any || r.unit == unit)
                .filter(|(_, r)| r.min <= *min && r.max >= *max)
                .min_by(|(_, a), (_, b)| (a.max - a.min).total_cmp(&(b.max - b.min)))
                .ok_or(sys::ME_ERRNO_NO_RANGE)?;
            *min = best.min;
            *max = best.max;
            *max_data = best.max_data;
            *range = i32::try_from(index).unwrap_or(i32::MAX);
            Ok(())
        })
    }

    fn query_range_info(
        &self,
        device: i32,
        subdevice: i32,
        range: i32,
        unit: &mut i32,
        min: &mut f64,
        max: &mut f64,
        max_data: &mut i32,
    ) -> i32 {
        self.call_open("meQueryRangeInfo", |state| {
            let slot = state.slot(device, subdevice)?;
            let r = usize::try_from(range)
                .ok()
                .and_then(|r| slot.model.ranges.get(r))
                .ok_or(sys::ME_ERRNO_INVALID_RANGE)?;
            *unit = r.unit.to_raw();
            *min = r.min;
            *max = r.max;
            *max_data = r.max_data;
            Ok(())
        })
    }

    fn query_subdevice_by_type(
        &self,
        device: i32,
        start_subdevice: i32,
        kind: i32,
        subtype: i32,
        subdevice: &mut i32,
    ) -> i32 {
        self.call_open("meQuerySubdeviceByType", |state| {
            let dev = state.device(device)?;
            let start = usize::try_from(start_subdevice)
                .ok()
                .filter(|s| *s < dev.subdevices.len())
                .ok_or(sys::ME_ERRNO_INVALID_SUBDEVICE)?;
            let found = dev.subdevices[start..]
                .iter()
                .position(|slot| {
                    slot.model.kind.to_raw() == kind
                        && (subtype == sys::ME_SUBTYPE_ANY
                            || slot.model.subtype.to_raw() == subtype)
                })
                .ok_or(sys::ME_ERRNO_NOMORE_SUBDEVICE_TYPE)?;
            *subdevice = i32::try_from(start + found).unwrap_or(i32::MAX);
            Ok(())
        })
    }

    fn query_subdevice_type(
        &self,
        device: i32,
        subdevice: i32,
        kind: &mut i32,
        subtype: &mut i32,
    ) -> i32 {
        self.call_open("meQuerySubdeviceType", |state| {
            let model = &state.slot(device, subdevice)?.model;
            *kind = model.kind.to_raw();
            *subtype = model.subtype.to_raw();
            Ok(())
        })
    }

    fn query_subdevice_caps(&self, device: i32, subdevice: i32, caps: &mut i32) -> i32 {
        self.call_open("meQuerySubdeviceCaps", |state| {
            *caps = state.slot(device, subdevice)?.model.caps.bits();
            Ok(())
        })
    }

    fn query_subdevice_caps_args(
        &self,
        device: i32,
        subdevice: i32,
        cap: i32,
        args: &mut [i32],
    ) -> i32 {
        self.call_open("meQuerySubdeviceCapsArgs", |state| {
            let slot = state.slot(device, subdevice)?;
            let values = slot
                .model
                .caps_args
                .iter()
                .find(|(c, _)| c.to_raw() == cap)
                .map(|(_, values)| values)
                .ok_or(sys::ME_ERRNO_INVALID_CAP)?;
            if args.len() < values.len() {
                return Err(sys::ME_ERRNO_INVALID_CAP_ARG_COUNT);
            }
            args[..values.len()].copy_from_slice(values);
            Ok(())
        })
    }

    fn query_version_library(&self, version: &mut i32) -> i32 {
        *version = MOCK_VERSION;
        SUCCESS
    }

    fn query_version_main_driver(&self, version: &mut i32) -> i32 {
        self.call_open("meQueryVersionMainDriver", |_| {
            *version = MOCK_VERSION;
            Ok(())
        })
    }

    fn query_version_device_driver(&self, device: i32, version: &mut i32) -> i32 {
        self.call_open("meQueryVersionDeviceDriver", |state| {
            state.device(device)?;
            *version = MOCK_VERSION;
            Ok(())
        })
    }

    fn utility_pwm_start(
        &self,
        device: i32,
        subdevice1: i32,
        subdevice2: i32,
        subdevice3: i32,
        _reference: i32,
        prescaler: i32,
        duty_cycle: i32,
        _flags: i32,
    ) -> i32 {
        self.call_open("meUtilityPWMStart", |state| {
            for sub in [subdevice1, subdevice2, subdevice3] {
                state.check_access(device, sub)?;
                if state.slot(device, sub)?.model.kind != SubdeviceType::Counter {
                    return Err(sys::ME_ERRNO_NOT_SUPPORTED);
                }
            }
            if !(1..=99).contains(&duty_cycle) {
                return Err(sys::ME_ERRNO_INVALID_DUTY_CYCLE);
            }
            if prescaler <= 1 {
                return Err(sys::ME_ERRNO_VALUE_OUT_OF_RANGE);
            }
            state.slot_mut(device, subdevice1)?.pwm = Some((prescaler, duty_cycle));
            Ok(())
        })
    }

    fn utility_pwm_stop(&self, device: i32, subdevice1: i32) -> i32 {
        self.call_open("meUtilityPWMStop", |state| {
            state.check_access(device, subdevice1)?;
            let slot = state.slot_mut(device, subdevice1)?;
            slot.pwm.take().map(|_| ()).ok_or(sys::ME_ERRNO_SUBDEVICE_NOT_RUNNING)
        })
    }

    fn utility_pwm_restart(
        &self,
        device: i32,
        subdevice1: i32,
        _reference: i32,
        prescaler: i32,
    ) -> i32 {
        self.call_open("meUtilityPWMRestart", |state| {
            state.check_access(device, subdevice1)?;
            if prescaler <= 1 {
                return Err(sys::ME_ERRNO_VALUE_OUT_OF_RANGE);
            }
            let slot = state.slot_mut(device, subdevice1)?;
            let (_, duty_cycle) = slot.pwm.ok_or(sys::ME_ERRNO_SUBDEVICE_NOT_RUNNING)?;
            slot.pwm = Some((prescaler, duty_cycle));
            Ok(())
        })
    }

    fn config_load(&self, config_file: &CStr) -> i32 {
        self.call("meConfigLoad", |state| {
            let path = config_file.to_str().map_err(|_| sys::ME_ERRNO_CONFIG_LOAD_FAILED)?;
            if !std::path::Path::new(path).is_file() {
                return Err(sys::ME_ERRNO_CONFIG_LOAD_FAILED);
            }
            state.loaded_configs.push(path.to_string());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened() -> MockBackend {
        let mock = MockBackend::new();
        assert_eq!(mock.open(0), SUCCESS);
        mock
    }

    #[test]
    fn test_calls_before_open_fail() {
        let mock = MockBackend::new();
        let mut n = 0;
        assert_eq!(mock.query_number_devices(&mut n), sys::ME_ERRNO_NOT_OPEN);
        assert_eq!(mock.close(0), sys::ME_ERRNO_NOT_OPEN);
    }

    #[test]
    fn test_open_close_refcount() {
        let mock = opened();
        assert_eq!(mock.open(0), SUCCESS);
        assert_eq!(mock.close(0), SUCCESS);
        assert!(mock.is_open());
        assert_eq!(mock.close(sys::ME_CLOSE_FORCE), SUCCESS);
        assert!(!mock.is_open());
    }

    #[test]
    fn test_analog_loopback() {
        let mock = opened();
        let mut list = [meIOSingle_t {
            iDevice: 0,
            iSubdevice: 0,
            iChannel: 1,
            iDir: sys::ME_DIR_OUTPUT,
            iValue: 42,
            ..Default::default()
        }];
        assert_eq!(mock.single(&mut list, 0), SUCCESS);

        let mut list = [meIOSingle_t {
            iDevice: 0,
            iSubdevice: 1,
            iChannel: 1,
            iDir: sys::ME_DIR_INPUT,
            ..Default::default()
        }];
        assert_eq!(mock.single(&mut list, 0), SUCCESS);
        assert_eq!(list[0].iValue, 42);
    }

    #[test]
    fn test_digital_port_loopback() {
        let mock = opened();
        let mut list = [meIOSingle_t {
            iSubdevice: 2,
            iDir: sys::ME_DIR_OUTPUT,
            iValue: 0xA5,
            iFlags: sys::ME_IO_SINGLE_TYPE_DIO_BYTE,
            ..Default::default()
        }];
        assert_eq!(mock.single(&mut list, 0), SUCCESS);

        let mut bit = [meIOSingle_t {
            iSubdevice: 3,
            iChannel: 2,
            iDir: sys::ME_DIR_INPUT,
            ..Default::default()
        }];
        assert_eq!(mock.single(&mut bit, 0), SUCCESS);
        assert_eq!(bit[0].iValue, 1);
    }

    #[test]
    fn test_single_list_reports_per_record() {
        let mock = opened();
        let mut list = [
            meIOSingle_t {
                iSubdevice: 1,
                iDir: sys::ME_DIR_INPUT,
                ..Default::default()
            },
            meIOSingle_t {
                iSubdevice: 1,
                iChannel: 99,
                iDir: sys::ME_DIR_INPUT,
                ..Default::default()
            },
            meIOSingle_t {
                iSubdevice: 1,
                iDir: sys::ME_DIR_OUTPUT,
                ..Default::default()
            },
        ];
        assert_eq!(mock.single(&mut list, 0), sys::ME_ERRNO_INVALID_CHANNEL);
        assert_eq!(list[0].iErrno, SUCCESS);
        assert_eq!(list[1].iErrno, sys::ME_ERRNO_INVALID_CHANNEL);
        assert_eq!(list[2].iErrno, sys::ME_ERRNO_INVALID_DIR);
        assert_eq!(mock.single(&mut [], 0), sys::ME_ERRNO_INVALID_SINGLE_LIST);
    }

    #[test]
    fn test_foreign_locks() {
        let mock = opened();
        mock.set_foreign_subdevice_lock(0, 1, true);
        assert_eq!(
            mock.lock_subdevice(0, 1, sys::ME_LOCK_SET, 0),
            sys::ME_ERRNO_LOCKED
        );
        assert_eq!(
            mock.lock_subdevice(0, 1, sys::ME_LOCK_CHECK, 0),
            sys::ME_ERRNO_LOCKED
        );
        assert_eq!(mock.lock_subdevice(0, 0, sys::ME_LOCK_SET, 0), SUCCESS);
        assert_eq!(mock.lock_subdevice(0, 0, 0x1234, 0), sys::ME_ERRNO_INVALID_LOCK);
        mock.set_foreign_subdevice_lock(0, 1, false);
        assert_eq!(mock.lock_subdevice(0, 1, sys::ME_LOCK_CHECK, 0), SUCCESS);
    }

    #[test]
    fn test_final_close_releases_local_locks() {
        let mock = opened();
        assert_eq!(mock.open(sys::ME_OPEN_NO_FLAGS), SUCCESS);
        assert_eq!(mock.lock_driver(sys::ME_LOCK_SET, 0), SUCCESS);
        assert_eq!(mock.lock_device(0, sys::ME_LOCK_SET, 0), SUCCESS);
        mock.set_foreign_subdevice_lock(0, 1, true);
        assert_eq!(mock.driver_lock_owner(), MockLockOwner::Local);

        // Another open is still active.
        assert_eq!(mock.close(sys::ME_CLOSE_NO_FLAGS), SUCCESS);
        assert_eq!(mock.driver_lock_owner(), MockLockOwner::Local);

        assert_eq!(mock.close(sys::ME_CLOSE_NO_FLAGS), SUCCESS);
        assert_eq!(mock.driver_lock_owner(), MockLockOwner::Free);
        assert_eq!(mock.device_lock_owner(0), Some(MockLockOwner::Free));
        assert_eq!(mock.subdevice_lock_owner(0, 1), Some(MockLockOwner::Foreign));
        assert_eq!(mock.subdevice_lock_owner(0, 42), None);
    }

    #[test]
    fn test_last_error_tracking() {
        let mock = opened();
        let mut n = 0;
        assert_eq!(mock.query_number_subdevices(5, &mut n), sys::ME_ERRNO_INVALID_DEVICE);
        let mut code = 0;
        assert_eq!(mock.error_get_last(&mut code, sys::ME_ERRNO_CLEAR_FLAGS), SUCCESS);
        assert_eq!(code, sys::ME_ERRNO_INVALID_DEVICE);
        assert_eq!(mock.error_get_last(&mut code, 0), SUCCESS);
        assert_eq!(code, SUCCESS);
    }

    #[test]
    fn test_error_message_truncation() {
        let mock = MockBackend::new();
        let mut buffer = [0u8; 8];
        let status = mock.error_get_message(sys::ME_ERRNO_TIMEOUT, &mut buffer);
        assert_eq!(status, sys::ME_ERRNO_INVALID_ERROR_MSG_COUNT);
        assert_eq!(buffer[7], 0);

        let mut buffer = [0u8; 256];
        assert_eq!(mock.error_get_message(500, &mut buffer), sys::ME_ERRNO_INVALID_ERROR_NUMBER);
    }

    #[test]
    fn test_stream_counted_acquisition() {
        let mock = opened();
        mock.set_input(0, 1, 0, 7);
        let mut config = [
            meIOStreamConfig_t {
                iChannel: 0,
                ..Default::default()
            },
            meIOStreamConfig_t {
                iChannel: 1,
                ..Default::default()
            },
        ];
        let mut trigger = meIOStreamTrigger_t {
            iAcqStartTrigType: sys::ME_TRIG_TYPE_SW,
            iScanStartTrigType: sys::ME_TRIG_TYPE_FOLLOW,
            iConvStartTrigType: sys::ME_TRIG_TYPE_TIMER,
            iConvStartTicksLow: 330,
            iScanStopTrigType: sys::ME_TRIG_TYPE_NONE,
            iAcqStopTrigType: sys::ME_TRIG_TYPE_COUNT,
            iAcqStopCount: 3,
            ..Default::default()
        };
        assert_eq!(mock.stream_config(0, 1, &mut config, &mut trigger, 0, 0), SUCCESS);

        let mut start = [meIOStreamStart_t {
            iSubdevice: 1,
            iStartMode: sys::ME_START_MODE_BLOCKING,
            ..Default::default()
        }];
        assert_eq!(mock.stream_start(&mut start, 0), SUCCESS);

        let (mut status, mut count) = (0, 0);
        assert_eq!(
            mock.stream_status(0, 1, sys::ME_WAIT_NONE, &mut status, &mut count, 0),
            SUCCESS
        );
        assert_eq!(status, sys::ME_STATUS_IDLE);
        assert_eq!(count, 6);

        let mut values = [0; 5];
        let mut read = 0;
        assert_eq!(
            mock.stream_read(
                0,
                1,
                sys::ME_READ_MODE_NONBLOCKING,
                &mut values,
                &mut read,
                sys::ME_IO_STREAM_READ_FRAMES,
            ),
            SUCCESS
        );
        assert_eq!(read, 4);
        assert_eq!(&values[..4], &[7, 0, 7, 0]);
    }

    #[test]
    fn test_stream_rejects_short_conversion_period() {
        let mock = opened();
        let mut config = [meIOStreamConfig_t::default()];
        let mut trigger = meIOStreamTrigger_t {
            iAcqStartTrigType: sys::ME_TRIG_TYPE_SW,
            iScanStartTrigType: sys::ME_TRIG_TYPE_FOLLOW,
            iConvStartTrigType: sys::ME_TRIG_TYPE_TIMER,
            iConvStartTicksLow: 10,
            iScanStopTrigType: sys::ME_TRIG_TYPE_NONE,
            iAcqStopTrigType: sys::ME_TRIG_TYPE_NONE,
            ..Default::default()
        };
        assert_eq!(
            mock.stream_config(0, 1, &mut config, &mut trigger, 0, 0),
            sys::ME_ERRNO_INVALID_CONV_START_ARG
        );
    }

    #[test]
    fn test_irq_wait_times_out_and_receives() {
        let mock = opened();
        let (source, edge) = (sys::ME_IRQ_SOURCE_DIO_LINE, sys::ME_IRQ_EDGE_RISING);
        assert_eq!(mock.irq_start(0, 6, 0, source, edge, 0, 0), SUCCESS);

        let (mut count, mut value) = (0, 0);
        assert_eq!(mock.irq_wait(0, 6, 0, &mut count, &mut value, 10, 0), sys::ME_ERRNO_TIMEOUT);

        assert!(mock.trigger_irq(0, 6, 0, 5));
        assert_eq!(mock.irq_wait(0, 6, 0, &mut count, &mut value, 10, 0), SUCCESS);
        assert_eq!((count, value), (1, 5));

        assert_eq!(mock.irq_stop(0, 6, 0, 0), SUCCESS);
        assert!(!mock.trigger_irq(0, 6, 0, 5));
    }

    #[test]
    fn test_range_queries() {
        let mock = opened();
        let mut n = 0;
        assert_eq!(mock.query_number_ranges(0, 1, sys::ME_UNIT_VOLT, &mut n), SUCCESS);
        assert_eq!(n, 4);
        assert_eq!(mock.query_number_ranges(0, 1, sys::ME_UNIT_AMPERE, &mut n), SUCCESS);
        assert_eq!(n, 0);

        let (mut min, mut max, mut max_data, mut range) = (0.0, 2.0, 0, -1);
        assert_eq!(
            mock.query_range_by_min_max(
                0,
                1,
                sys::ME_UNIT_VOLT,
                &mut min,
                &mut max,
                &mut max_data,
                &mut range,
            ),
            SUCCESS
        );
        assert_eq!(range, 3);
        assert_eq!(max_data, 65535);

        let (mut min, mut max) = (-20.0, 20.0);
        assert_eq!(
            mock.query_range_by_min_max(
                0,
                1,
                sys::ME_UNIT_VOLT,
                &mut min,
                &mut max,
                &mut max_data,
                &mut range,
            ),
            sys::ME_ERRNO_NO_RANGE
        );
    }

    #[test]
    fn test_subdevice_search() {
        let mock = opened();
        let mut sub = -1;
        assert_eq!(
            mock.query_subdevice_by_type(0, 0, sys::ME_TYPE_DI, sys::ME_SUBTYPE_ANY, &mut sub),
            SUCCESS
        );
        assert_eq!(sub, 3);
        assert_eq!(
            mock.query_subdevice_by_type(0, 4, sys::ME_TYPE_DI, sys::ME_SUBTYPE_ANY, &mut sub),
            sys::ME_ERRNO_NOMORE_SUBDEVICE_TYPE
        );
    }
}
