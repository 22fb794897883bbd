//! Typed builders for the driver's list records.
//!
//! These mirror the `#[repr(C)]` records in `meids-sys` field for field but
//! carry enums and flag types instead of bare integers. Conversion to the
//! raw layout is a plain copy into fixed-size storage.

use meids_sys::{
    meIOSingle_t, meIOStreamConfig_t, meIOStreamStart_t, meIOStreamStop_t, meIOStreamTrigger_t,
    ME_TRIGGER_ARG_COUNT,
};

use crate::address::{ChannelAddr, SubdeviceAddr};
use crate::codes::{
    Direction, Reference, StartMode, StopMode, TriggerChannel, TriggerEdge, TriggerType,
};
use crate::error::{ErrorCode, MeidsError, Result};
use crate::flags::{SingleTypeFlags, StreamConfigFlags, StreamStartTypeFlags, StreamStopTypeFlags};

/// Decode a per-record `iErrno`: `None` on success.
fn record_error(errno: i32) -> Option<ErrorCode> {
    match ErrorCode::from_raw(errno) {
        Some(ErrorCode::Success) => None,
        Some(code) => Some(code),
        None => Some(ErrorCode::InvalidErrorNumber),
    }
}

// =============================================================================
// Single I/O
// =============================================================================

/// One entry of a batched `meIOSingle` call.
///
/// After the call, `value` holds the sample for input records and `errno`
/// the per-record status. The call itself can succeed while individual
/// records fail; check [`SingleIo::result`] for each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleIo {
    /// Channel to read or write
    pub channel: ChannelAddr,
    /// Read or write
    pub direction: Direction,
    /// Value to write, or the value read after the call
    pub value: i32,
    /// Timeout in milliseconds; 0 waits forever for blocking operations.
    pub timeout_ms: i32,
    /// Per-record options
    pub flags: SingleTypeFlags,
    /// Per-record status written by the driver.
    pub errno: i32,
}

impl SingleIo {
    /// An input record for `channel`.
    pub fn read(channel: ChannelAddr) -> Self {
        Self {
            channel,
            direction: Direction::Input,
            value: 0,
            timeout_ms: 0,
            flags: SingleTypeFlags::empty(),
            errno: 0,
        }
    }

    /// An output record writing `value` to `channel`.
    pub fn write(channel: ChannelAddr, value: i32) -> Self {
        Self {
            direction: Direction::Output,
            value,
            ..Self::read(channel)
        }
    }

    /// Set the timeout for blocking operations.
    pub fn with_timeout(mut self, timeout_ms: i32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the per-record options.
    pub fn with_flags(mut self, flags: SingleTypeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The raw record passed to the driver.
    pub fn to_raw(&self) -> meIOSingle_t {
        meIOSingle_t {
            iDevice: self.channel.device,
            iSubdevice: self.channel.subdevice,
            iChannel: self.channel.channel,
            iDir: self.direction.to_raw(),
            iValue: self.value,
            iTimeOut: self.timeout_ms,
            iFlags: self.flags.bits(),
            iErrno: self.errno,
        }
    }

    /// Copy the fields the driver writes back.
    pub(crate) fn update_from_raw(&mut self, raw: &meIOSingle_t) {
        self.value = raw.iValue;
        self.errno = raw.iErrno;
    }

    /// The per-record error, if the driver reported one.
    pub fn error(&self) -> Option<ErrorCode> {
        record_error(self.errno)
    }

    /// The record's value, or its per-record error.
    pub fn result(&self) -> Result<i32> {
        MeidsError::check("meIOSingle", self.errno).map(|()| self.value)
    }
}

// =============================================================================
// Stream configuration
// =============================================================================

/// One entry of a stream channel list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamChannel {
    /// Channel index on the subdevice
    pub channel: i32,
    /// Range index, as returned by the range queries.
    pub range: i32,
    /// Ground or differential input
    pub reference: Reference,
    /// Per-entry options
    pub flags: StreamConfigFlags,
}

impl StreamChannel {
    /// Channel `channel` on range `range`.
    pub fn new(channel: i32, range: i32, reference: Reference) -> Self {
        Self {
            channel,
            range,
            reference,
            flags: StreamConfigFlags::empty(),
        }
    }

    /// Set the per-entry options.
    pub fn with_flags(mut self, flags: StreamConfigFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The raw record passed to the driver.
    pub fn to_raw(&self) -> meIOStreamConfig_t {
        meIOStreamConfig_t {
            iChannel: self.channel,
            iStreamConfig: self.range,
            iRef: self.reference.to_raw(),
            iFlags: self.flags.bits(),
        }
    }
}

// =============================================================================
// Trigger
// =============================================================================

/// Up to [`TriggerArgs::MAX`] extra arguments for one trigger stage.
///
/// The meaning of each slot depends on the trigger type (threshold levels,
/// pattern masks and so on). Unused slots are sent as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerArgs {
    values: [i32; ME_TRIGGER_ARG_COUNT],
    len: usize,
}

impl TriggerArgs {
    /// Capacity of a trigger stage.
    pub const MAX: usize = ME_TRIGGER_ARG_COUNT;

    /// No arguments.
    pub const fn new() -> Self {
        Self {
            values: [0; ME_TRIGGER_ARG_COUNT],
            len: 0,
        }
    }

    /// Copy `args`; fails if there are more than [`TriggerArgs::MAX`].
    pub fn from_slice(args: &[i32]) -> Result<Self> {
        if args.len() > Self::MAX {
            return Err(MeidsError::TooManyTriggerArgs {
                count: args.len(),
                max: Self::MAX,
            });
        }
        let mut values = [0; ME_TRIGGER_ARG_COUNT];
        values[..args.len()].copy_from_slice(args);
        Ok(Self {
            values,
            len: args.len(),
        })
    }

    /// Append one argument.
    pub fn push(&mut self, value: i32) -> Result<()> {
        if self.len == Self::MAX {
            return Err(MeidsError::TooManyTriggerArgs {
                count: self.len + 1,
                max: Self::MAX,
            });
        }
        self.values[self.len] = value;
        self.len += 1;
        Ok(())
    }

    /// The arguments pushed so far.
    pub fn as_slice(&self) -> &[i32] {
        &self.values[..self.len]
    }

    /// Number of arguments pushed.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no arguments were pushed.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The fixed-size slot array, zero padded.
    pub fn to_raw(&self) -> [i32; ME_TRIGGER_ARG_COUNT] {
        self.values
    }

    /// Rebuild from a raw slot array; trailing zero slots count as unused.
    pub fn from_raw(raw: [i32; ME_TRIGGER_ARG_COUNT]) -> Self {
        let len = raw.iter().rposition(|v| *v != 0).map_or(0, |i| i + 1);
        Self { values: raw, len }
    }
}

impl TryFrom<&[i32]> for TriggerArgs {
    type Error = MeidsError;

    fn try_from(args: &[i32]) -> Result<Self> {
        Self::from_slice(args)
    }
}

/// Split a 64-bit tick count into the driver's low/high `int` pair.
pub(crate) fn split_ticks(ticks: u64) -> (i32, i32) {
    ((ticks & 0xFFFF_FFFF) as u32 as i32, (ticks >> 32) as u32 as i32)
}

pub(crate) fn join_ticks(low: i32, high: i32) -> u64 {
    (u64::from(high as u32) << 32) | u64::from(low as u32)
}

/// Acquisition start stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcqStart {
    /// Software or external trigger
    pub trig_type: TriggerType,
    /// Edge for external triggers
    pub edge: TriggerEdge,
    /// Input that carries the external trigger
    pub channel: TriggerChannel,
    /// Delay after the trigger, in timer ticks.
    pub ticks: u64,
    /// Extra arguments for the trigger type
    pub args: TriggerArgs,
}

impl Default for AcqStart {
    fn default() -> Self {
        Self {
            trig_type: TriggerType::Software,
            edge: TriggerEdge::None,
            channel: TriggerChannel::Default,
            ticks: 0,
            args: TriggerArgs::new(),
        }
    }
}

/// Scan or conversion start stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedStart {
    /// Timer, follow or external trigger
    pub trig_type: TriggerType,
    /// Timer period in ticks when `trig_type` is [`TriggerType::Timer`].
    pub ticks: u64,
    /// Extra arguments for the trigger type
    pub args: TriggerArgs,
}

impl TimedStart {
    /// Start on the internal timer every `ticks`.
    pub fn timer(ticks: u64) -> Self {
        Self {
            trig_type: TriggerType::Timer,
            ticks,
            args: TriggerArgs::new(),
        }
    }

    /// Start immediately after the previous stage.
    pub fn follow() -> Self {
        Self {
            trig_type: TriggerType::Follow,
            ticks: 0,
            args: TriggerArgs::new(),
        }
    }
}

/// Scan or acquisition stop stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopCondition {
    /// Count, none or external trigger
    pub trig_type: TriggerType,
    /// Number of conversions (scan stop) or scans (acquisition stop).
    pub count: i32,
    /// Extra arguments for the trigger type
    pub args: TriggerArgs,
}

impl StopCondition {
    /// Never stop on its own.
    pub fn none() -> Self {
        Self {
            trig_type: TriggerType::None,
            count: 0,
            args: TriggerArgs::new(),
        }
    }

    /// Stop after `count` events.
    pub fn count(count: i32) -> Self {
        Self {
            trig_type: TriggerType::Count,
            count,
            args: TriggerArgs::new(),
        }
    }
}

/// Full trigger description for `meIOStreamConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamTrigger {
    /// What starts the acquisition
    pub acq_start: AcqStart,
    /// What starts each scan
    pub scan_start: TimedStart,
    /// What starts each conversion within a scan
    pub conv_start: TimedStart,
    /// When a scan ends
    pub scan_stop: StopCondition,
    /// When the acquisition ends
    pub acq_stop: StopCondition,
    /// Raw trigger flags
    pub flags: i32,
}

impl Default for StreamTrigger {
    /// Software start, back-to-back scans, conversions on the timer, no stop.
    fn default() -> Self {
        Self {
            acq_start: AcqStart::default(),
            scan_start: TimedStart::follow(),
            conv_start: TimedStart::timer(0),
            scan_stop: StopCondition::none(),
            acq_stop: StopCondition::none(),
            flags: 0,
        }
    }
}

impl StreamTrigger {
    /// Software-started acquisition with a conversion every `conv_ticks`.
    pub fn software(conv_ticks: u64) -> Self {
        Self {
            conv_start: TimedStart::timer(conv_ticks),
            ..Self::default()
        }
    }

    /// Replace the acquisition start stage.
    pub fn with_acq_start(mut self, stage: AcqStart) -> Self {
        self.acq_start = stage;
        self
    }

    /// Replace the scan start stage.
    pub fn with_scan_start(mut self, stage: TimedStart) -> Self {
        self.scan_start = stage;
        self
    }

    /// Replace the conversion start stage.
    pub fn with_conv_start(mut self, stage: TimedStart) -> Self {
        self.conv_start = stage;
        self
    }

    /// End each scan after `conversions` conversions.
    pub fn with_scan_stop_count(mut self, conversions: i32) -> Self {
        self.scan_stop = StopCondition::count(conversions);
        self
    }

    /// End the acquisition after `scans` scans.
    pub fn with_acq_stop_count(mut self, scans: i32) -> Self {
        self.acq_stop = StopCondition::count(scans);
        self
    }

    /// The raw record passed to the driver.
    pub fn to_raw(&self) -> meIOStreamTrigger_t {
        let (acq_low, acq_high) = split_ticks(self.acq_start.ticks);
        let (scan_low, scan_high) = split_ticks(self.scan_start.ticks);
        let (conv_low, conv_high) = split_ticks(self.conv_start.ticks);

        meIOStreamTrigger_t {
            iAcqStartTrigType: self.acq_start.trig_type.to_raw(),
            iAcqStartTrigEdge: self.acq_start.edge.to_raw(),
            iAcqStartTrigChan: self.acq_start.channel.to_raw(),
            iAcqStartTicksLow: acq_low,
            iAcqStartTicksHigh: acq_high,
            iAcqStartArgs: self.acq_start.args.to_raw(),
            iScanStartTrigType: self.scan_start.trig_type.to_raw(),
            iScanStartTicksLow: scan_low,
            iScanStartTicksHigh: scan_high,
            iScanStartArgs: self.scan_start.args.to_raw(),
            iConvStartTrigType: self.conv_start.trig_type.to_raw(),
            iConvStartTicksLow: conv_low,
            iConvStartTicksHigh: conv_high,
            iConvStartArgs: self.conv_start.args.to_raw(),
            iScanStopTrigType: self.scan_stop.trig_type.to_raw(),
            iScanStopCount: self.scan_stop.count,
            iScanStopArgs: self.scan_stop.args.to_raw(),
            iAcqStopTrigType: self.acq_stop.trig_type.to_raw(),
            iAcqStopCount: self.acq_stop.count,
            iAcqStopArgs: self.acq_stop.args.to_raw(),
            iFlags: self.flags,
        }
    }

    /// Decode a raw trigger record.
    pub fn from_raw(raw: &meIOStreamTrigger_t) -> Result<Self> {
        Ok(Self {
            acq_start: AcqStart {
                trig_type: TriggerType::try_from(raw.iAcqStartTrigType)?,
                edge: TriggerEdge::try_from(raw.iAcqStartTrigEdge)?,
                channel: TriggerChannel::try_from(raw.iAcqStartTrigChan)?,
                ticks: join_ticks(raw.iAcqStartTicksLow, raw.iAcqStartTicksHigh),
                args: TriggerArgs::from_raw(raw.iAcqStartArgs),
            },
            scan_start: TimedStart {
                trig_type: TriggerType::try_from(raw.iScanStartTrigType)?,
                ticks: join_ticks(raw.iScanStartTicksLow, raw.iScanStartTicksHigh),
                args: TriggerArgs::from_raw(raw.iScanStartArgs),
            },
            conv_start: TimedStart {
                trig_type: TriggerType::try_from(raw.iConvStartTrigType)?,
                ticks: join_ticks(raw.iConvStartTicksLow, raw.iConvStartTicksHigh),
                args: TriggerArgs::from_raw(raw.iConvStartArgs),
            },
            scan_stop: StopCondition {
                trig_type: TriggerType::try_from(raw.iScanStopTrigType)?,
                count: raw.iScanStopCount,
                args: TriggerArgs::from_raw(raw.iScanStopArgs),
            },
            acq_stop: StopCondition {
                trig_type: TriggerType::try_from(raw.iAcqStopTrigType)?,
                count: raw.iAcqStopCount,
                args: TriggerArgs::from_raw(raw.iAcqStopArgs),
            },
            flags: raw.iFlags,
        })
    }
}

// =============================================================================
// Stream start / stop
// =============================================================================

/// One entry of a `meIOStreamStart` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStartRequest {
    /// Stream to start
    pub addr: SubdeviceAddr,
    /// Blocking or non-blocking
    pub mode: StartMode,
    /// Timeout for a blocking start, in milliseconds.
    pub timeout_ms: i32,
    /// Per-request options
    pub flags: StreamStartTypeFlags,
    /// Per-request status written by the driver
    pub errno: i32,
}

impl StreamStartRequest {
    /// Request to start `addr`, waiting forever when blocking.
    pub fn new(addr: SubdeviceAddr, mode: StartMode) -> Self {
        Self {
            addr,
            mode,
            timeout_ms: 0,
            flags: StreamStartTypeFlags::empty(),
            errno: 0,
        }
    }

    /// Set the blocking start timeout.
    pub fn with_timeout(mut self, timeout_ms: i32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the per-request options.
    pub fn with_flags(mut self, flags: StreamStartTypeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The raw record passed to the driver.
    pub fn to_raw(&self) -> meIOStreamStart_t {
        meIOStreamStart_t {
            iDevice: self.addr.device,
            iSubdevice: self.addr.subdevice,
            iStartMode: self.mode.to_raw(),
            iTimeOut: self.timeout_ms,
            iFlags: self.flags.bits(),
            iErrno: self.errno,
        }
    }

    /// The per-request status, decoded; `None` on success.
    pub fn error(&self) -> Option<ErrorCode> {
        record_error(self.errno)
    }
}

/// One entry of a `meIOStreamStop` list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStopRequest {
    /// Stream to stop
    pub addr: SubdeviceAddr,
    /// Immediately or at the end of the current scan
    pub mode: StopMode,
    /// Per-request options
    pub flags: StreamStopTypeFlags,
    /// Per-request status written by the driver
    pub errno: i32,
}

impl StreamStopRequest {
    /// Request to stop `addr`.
    pub fn new(addr: SubdeviceAddr, mode: StopMode) -> Self {
        Self {
            addr,
            mode,
            flags: StreamStopTypeFlags::empty(),
            errno: 0,
        }
    }

    /// Set the per-request options.
    pub fn with_flags(mut self, flags: StreamStopTypeFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The raw record passed to the driver.
    pub fn to_raw(&self) -> meIOStreamStop_t {
        meIOStreamStop_t {
            iDevice: self.addr.device,
            iSubdevice: self.addr.subdevice,
            iStopMode: self.mode.to_raw(),
            iFlags: self.flags.bits(),
            iErrno: self.errno,
        }
    }

    /// The per-request status, decoded; `None` on success.
    pub fn error(&self) -> Option<ErrorCode> {
        record_error(self.errno)
    }
}
