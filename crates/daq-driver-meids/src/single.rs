//! Single-value I/O.
//!
//! `meIOSingle` takes a list of records and reports a status per record;
//! [`MeidsSystem::single`] exposes that directly. The `single_*` and
//! `value_*` helpers wrap one-record lists for the common case.

use tracing::{debug, warn};

use crate::address::{ChannelAddr, SubdeviceAddr};
use crate::backend::MeidsBackend;
use crate::codes::{Reference, SingleConfig, Timer, TriggerChannel, TriggerEdge, TriggerType};
use crate::config::timeout_arg;
use crate::error::{list_len, Result};
use crate::flags::{SingleConfigFlags, SingleFlags, TicksFlags};
use crate::range::Range;
use crate::records::{join_ticks, split_ticks, SingleIo};
use crate::system::MeidsSystem;

/// Arguments of `meIOSingleConfig` for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Range index for analog subdevices, mode for everything else
    pub config: SingleConfig,
    /// Ground, differential or counter clock source
    pub reference: Reference,
    /// Which trigger input to use
    pub trigger_channel: TriggerChannel,
    /// Software or external trigger
    pub trigger_type: TriggerType,
    /// Edge for external triggers
    pub trigger_edge: TriggerEdge,
    /// Per-channel options
    pub flags: SingleConfigFlags,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            config: SingleConfig::Range(0),
            reference: Reference::None,
            trigger_channel: TriggerChannel::Default,
            trigger_type: TriggerType::Software,
            trigger_edge: TriggerEdge::None,
            flags: SingleConfigFlags::empty(),
        }
    }
}

impl ChannelConfig {
    /// Analog channel on range `index`, software triggered.
    pub fn range(index: i32, reference: Reference) -> Self {
        Self {
            config: SingleConfig::Range(index),
            reference,
            ..Self::default()
        }
    }

    /// Digital, counter or frequency channel in `mode`.
    pub fn mode(mode: impl Into<SingleConfig>) -> Self {
        Self {
            config: mode.into(),
            ..Self::default()
        }
    }

    /// Trigger each conversion from `channel` instead of software.
    pub fn with_trigger(
        mut self,
        channel: TriggerChannel,
        kind: TriggerType,
        edge: TriggerEdge,
    ) -> Self {
        self.trigger_channel = channel;
        self.trigger_type = kind;
        self.trigger_edge = edge;
        self
    }

    /// Set the per-channel options.
    pub fn with_flags(mut self, flags: SingleConfigFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl<B: MeidsBackend> MeidsSystem<B> {
    /// Configure one channel for single I/O.
    pub fn single_config(&self, channel: ChannelAddr, config: &ChannelConfig) -> Result<()> {
        debug!(%channel, ?config, "Configuring channel");
        let status = self.backend().single_config(
            channel.device,
            channel.subdevice,
            channel.channel,
            config.config.to_raw(),
            config.reference.to_raw(),
            config.trigger_channel.to_raw(),
            config.trigger_type.to_raw(),
            config.trigger_edge.to_raw(),
            config.flags.bits(),
        );
        self.check("meIOSingleConfig", status)
    }

    /// Run a batch of single I/O records.
    ///
    /// Every record is updated with its value and per-record status, also
    /// when the call as a whole fails; inspect [`SingleIo::error`] to see
    /// which records went wrong.
    pub fn single(&self, records: &mut [SingleIo], flags: SingleFlags) -> Result<()> {
        list_len(records.len())?;
        let mut raw: Vec<_> = records.iter().map(SingleIo::to_raw).collect();
        let status = self.backend().single(&mut raw, flags.bits());
        for (record, raw) in records.iter_mut().zip(&raw) {
            record.update_from_raw(raw);
        }
        self.check("meIOSingle", status)
    }

    fn single_one(&self, record: SingleIo) -> Result<i32> {
        let mut records = [record];
        self.single(&mut records, SingleFlags::empty())?;
        records[0].result()
    }

    /// Read one raw value with the configured default timeout.
    pub fn single_read(&self, channel: ChannelAddr) -> Result<i32> {
        let timeout = timeout_arg(self.config().timeouts.single_ms);
        self.single_one(SingleIo::read(channel).with_timeout(timeout))
    }

    /// Write one raw value with the configured default timeout.
    pub fn single_write(&self, channel: ChannelAddr, value: i32) -> Result<()> {
        let timeout = timeout_arg(self.config().timeouts.single_ms);
        self.single_one(SingleIo::write(channel, value).with_timeout(timeout))
            .map(|_| ())
    }

    /// Read one value in the physical unit of `range`.
    ///
    /// `range` must be the range the channel is configured for.
    pub fn value_read(&self, channel: ChannelAddr, range: &Range) -> Result<f64> {
        let raw = self.single_read(channel)?;
        let physical = range.to_physical(raw)?;
        if physical.out_of_range {
            debug!(%channel, raw, max_data = range.max_data, "Raw value outside range");
        }
        Ok(physical.value)
    }

    /// Write one value in the physical unit of `range` and return the raw
    /// code written. Values outside the range are clamped to its limits.
    pub fn value_write(&self, channel: ChannelAddr, range: &Range, value: f64) -> Result<i32> {
        let digital = range.to_digital(value)?;
        if digital.out_of_range {
            warn!(%channel, value, min = range.min, max = range.max, "Clamping value to range");
        }
        self.single_write(channel, digital.value)?;
        Ok(digital.value)
    }

    /// Apply an offset (in the range's unit) to an analog channel. Returns
    /// the offset the driver actually set.
    pub fn set_channel_offset(&self, channel: ChannelAddr, range: i32, offset: f64) -> Result<f64> {
        let mut offset = offset;
        let status = self.backend().set_channel_offset(
            channel.device,
            channel.subdevice,
            channel.channel,
            range,
            &mut offset,
            meids_sys::ME_IO_SET_CHANNEL_OFFSET_NO_FLAGS,
        );
        self.check("meIOSetChannelOffset", status)?;
        Ok(offset)
    }

    /// Convert a single-I/O timer period to ticks.
    ///
    /// Returns the ticks and the period they actually represent.
    pub fn single_time_to_ticks(
        &self,
        addr: SubdeviceAddr,
        timer: Timer,
        time: f64,
        flags: TicksFlags,
    ) -> Result<(u64, f64)> {
        let mut time = time;
        let mut low = 0;
        let mut high = 0;
        let status = self.backend().single_time_to_ticks(
            addr.device,
            addr.subdevice,
            timer.to_raw(),
            &mut time,
            &mut low,
            &mut high,
            flags.bits(),
        );
        self.check("meIOSingleTimeToTicks", status)?;
        Ok((join_ticks(low, high), time))
    }

    /// Ticks of `timer` to a duration in seconds.
    pub fn single_ticks_to_time(
        &self,
        addr: SubdeviceAddr,
        timer: Timer,
        ticks: u64,
    ) -> Result<f64> {
        let (low, high) = split_ticks(ticks);
        let mut time = 0.0;
        let status = self.backend().single_ticks_to_time(
            addr.device,
            addr.subdevice,
            timer.to_raw(),
            low,
            high,
            &mut time,
            meids_sys::ME_IO_SINGLE_TICKS_TO_TIME_NO_FLAGS,
        );
        self.check("meIOSingleTicksToTime", status)?;
        Ok(time)
    }
}
