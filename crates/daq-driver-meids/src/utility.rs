//! Library utilities: PWM output, device configuration files, one-shot
//! scans and value conversion through the driver library.
//!
//! The conversions here call the library so that module types needing its
//! lookup tables (RTD, thermocouples) work; [`crate::conversion`] holds the
//! pure-Rust equivalents for everything else.

use std::ffi::CString;
use std::path::Path;

use tracing::{debug, info};

use crate::address::SubdeviceAddr;
use crate::backend::MeidsBackend;
use crate::codes::{ModuleType, ReadMode, Reference, StartMode, StopMode, TriggerEdge, TriggerType};
use crate::conversion::Clamped;
use crate::error::{list_len, ErrorCode, MeidsError, Result};
use crate::flags::{PwmStartFlags, StreamConfigFlags, StreamReadFlags};
use crate::range::Range;
use crate::records::{AcqStart, StreamChannel, StreamTrigger};
use crate::system::MeidsSystem;

/// Counter subdevices driving a PWM output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmCounters {
    /// Device the three counters belong to
    pub device: i32,
    /// Prescaler counter; the PWM is addressed by this one afterwards
    pub prescaler: i32,
    /// Counter for the high phase
    pub high: i32,
    /// Counter for the low phase
    pub low: i32,
}

impl PwmCounters {
    /// Counters `prescaler`, `high` and `low` on `device`.
    pub fn new(device: i32, prescaler: i32, high: i32, low: i32) -> Self {
        Self {
            device,
            prescaler,
            high,
            low,
        }
    }
}

/// Conversion period for one-shot scans: the fastest the 33 MHz
/// acquisition clock allows.
const SCAN_CONV_TICKS: u64 = 66;

/// What starts a [`single_scan_read`](MeidsSystem::single_scan_read).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanStart {
    #[default]
    /// Start right away
    Software,
    /// Start on an edge of the external digital trigger
    ExtDigital(TriggerEdge),
    /// Start on the external analog trigger
    ExtAnalog(TriggerEdge),
}

impl ScanStart {
    fn acq_start(self) -> AcqStart {
        let (trig_type, edge) = match self {
            ScanStart::Software => (TriggerType::Software, TriggerEdge::None),
            ScanStart::ExtDigital(edge) => (TriggerType::ExtDigital, edge),
            ScanStart::ExtAnalog(edge) => (TriggerType::ExtAnalog, edge),
        };
        AcqStart {
            trig_type,
            edge,
            ..AcqStart::default()
        }
    }
}

impl<B: MeidsBackend> MeidsSystem<B> {
    /// Map a conversion status: out-of-range inputs still produce a value.
    fn clamped<T>(&self, function: &'static str, status: i32, value: T) -> Result<Clamped<T>> {
        if status == ErrorCode::ValueOutOfRange.to_raw() {
            return Ok(Clamped {
                value,
                out_of_range: true,
            });
        }
        self.check(function, status)?;
        Ok(Clamped {
            value,
            out_of_range: false,
        })
    }

    // =========================================================================
    // PWM
    // =========================================================================

    /// Start a PWM signal with `duty_cycle` percent (1 to 99).
    pub fn pwm_start(
        &self,
        counters: PwmCounters,
        reference: Reference,
        prescaler: i32,
        duty_cycle: i32,
        flags: PwmStartFlags,
    ) -> Result<()> {
        let status = self.backend().utility_pwm_start(
            counters.device,
            counters.prescaler,
            counters.high,
            counters.low,
            reference.to_raw(),
            prescaler,
            duty_cycle,
            flags.bits(),
        );
        self.check("meUtilityPWMStart", status)?;
        info!(?counters, prescaler, duty_cycle, "PWM started");
        Ok(())
    }

    /// Stop the PWM whose prescaler counter is `addr`.
    pub fn pwm_stop(&self, addr: SubdeviceAddr) -> Result<()> {
        let status = self.backend().utility_pwm_stop(addr.device, addr.subdevice);
        self.check("meUtilityPWMStop", status)?;
        info!(%addr, "PWM stopped");
        Ok(())
    }

    /// Change the prescaler of a running PWM, keeping its duty cycle.
    pub fn pwm_restart(
        &self,
        addr: SubdeviceAddr,
        reference: Reference,
        prescaler: i32,
    ) -> Result<()> {
        let status = self.backend().utility_pwm_restart(
            addr.device,
            addr.subdevice,
            reference.to_raw(),
            prescaler,
        );
        self.check("meUtilityPWMRestart", status)
    }

    // =========================================================================
    // Device configuration
    // =========================================================================

    /// Load a device configuration file (as written by the ME-iDS
    /// configuration tool) into the driver.
    pub fn config_load(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let c_path = CString::new(path.to_string_lossy().into_owned())
            .map_err(|_| MeidsError::InvalidString { what: "configuration path" })?;
        let status = self.backend().config_load(&c_path);
        self.check("meConfigLoad", status)?;
        info!(path = %path.display(), "Loaded device configuration");
        Ok(())
    }

    // =========================================================================
    // One-shot scan
    // =========================================================================

    /// Read channels `0..channels` of a streaming analog input once, all in
    /// range `range`, and return the values in that range's unit.
    ///
    /// `channels` is capped to the subdevice's channel count, or half of it
    /// for [`Reference::AiDifferential`]. The stream is stopped afterwards
    /// so the subdevice can be configured again.
    pub fn single_scan_read(
        &self,
        addr: SubdeviceAddr,
        channels: usize,
        range: i32,
        reference: Reference,
        start: ScanStart,
    ) -> Result<Vec<f64>> {
        if channels == 0 {
            return Ok(Vec::new());
        }
        let mut available = usize::try_from(self.number_channels(addr)?).unwrap_or(0);
        if reference == Reference::AiDifferential {
            available /= 2;
        }
        let channels = channels.min(available);
        if channels == 0 {
            return Err(MeidsError::NotSupported(format!("{addr} has no channels to scan")));
        }

        let count = list_len(channels)?;
        let list: Vec<_> = (0..count)
            .map(|channel| StreamChannel::new(channel, range, reference))
            .collect();
        let trigger = StreamTrigger::software(SCAN_CONV_TICKS)
            .with_acq_start(start.acq_start())
            .with_scan_stop_count(count)
            .with_acq_stop_count(1);
        self.stream_config(addr, &list, &trigger, 0, StreamConfigFlags::empty())?;
        self.start_stream(addr, StartMode::Blocking)?;

        let mut raw = vec![0; channels];
        let read = self.stream_read(addr, ReadMode::Blocking, &mut raw, StreamReadFlags::empty());
        let stopped = self.stop_stream(addr, StopMode::Immediate);
        let read = read?;
        stopped?;
        raw.truncate(read);

        let info = self.range_info(addr, range)?;
        let values = self.digital_to_physical_all(&info, &raw, ModuleType::None, 0.0)?;
        debug!(%addr, channels = values.len(), ?start, "Single scan read");
        Ok(values)
    }

    // =========================================================================
    // Value conversion
    // =========================================================================

    /// Raw code to physical value in `range`, scaled for a MultiSig
    /// `module`. `ref_value` is the cold-junction reference for
    /// thermocouple modules.
    pub fn digital_to_physical(
        &self,
        range: &Range,
        data: i32,
        module: ModuleType,
        ref_value: f64,
    ) -> Result<Clamped<f64>> {
        let mut physical = 0.0;
        let status = self.backend().utility_digital_to_physical(
            range.min,
            range.max,
            range.max_data,
            data,
            module.to_raw(),
            ref_value,
            &mut physical,
        );
        self.clamped("meUtilityDigitalToPhysical", status, physical)
    }

    /// [`digital_to_physical`](Self::digital_to_physical) over a buffer.
    /// Clamped elements are not reported.
    pub fn digital_to_physical_all(
        &self,
        range: &Range,
        data: &[i32],
        module: ModuleType,
        ref_value: f64,
    ) -> Result<Vec<f64>> {
        list_len(data.len())?;
        let mut physical = vec![0.0; data.len()];
        let status = self.backend().utility_digital_to_physical_v(
            range.min,
            range.max,
            range.max_data,
            data,
            module.to_raw(),
            ref_value,
            &mut physical,
        );
        self.check("meUtilityDigitalToPhysicalV", status)?;
        Ok(physical)
    }

    /// Physical value in `range` to raw code.
    pub fn physical_to_digital(&self, range: &Range, value: f64) -> Result<Clamped<i32>> {
        let mut data = 0;
        let status = self.backend().utility_physical_to_digital(
            range.min,
            range.max,
            range.max_data,
            value,
            &mut data,
        );
        self.clamped("meUtilityPhysicalToDigital", status, data)
    }

    /// [`physical_to_digital`](Self::physical_to_digital) over a buffer.
    /// Clamped elements are not reported.
    pub fn physical_to_digital_all(&self, range: &Range, values: &[f64]) -> Result<Vec<i32>> {
        list_len(values.len())?;
        let mut data = vec![0; values.len()];
        let status = self.backend().utility_physical_to_digital_v(
            range.min,
            range.max,
            range.max_data,
            values,
            &mut data,
        );
        self.check("meUtilityPhysicalToDigitalV", status)?;
        Ok(data)
    }

    /// Samples of `channel` in an interleaved stream buffer read with the
    /// channel list `config`.
    pub fn extract_values(
        &self,
        channel: i32,
        buffer: &[i32],
        config: &[StreamChannel],
    ) -> Result<Vec<i32>> {
        let mut count = list_len(buffer.len())?;
        list_len(config.len())?;
        let raw_config: Vec<_> = config.iter().map(StreamChannel::to_raw).collect();
        let mut values = vec![0; buffer.len()];
        let status = self.backend().utility_extract_values(
            channel,
            buffer,
            &raw_config,
            &mut values,
            &mut count,
        );
        self.check("meUtilityExtractValues", status)?;
        values.truncate(usize::try_from(count).unwrap_or(0));
        debug!(channel, samples = values.len(), "Extracted channel samples");
        Ok(values)
    }

    // =========================================================================
    // Frequency I/O
    // =========================================================================

    /// Ticks of a `base_freq` Hz clock in `period` seconds.
    pub fn period_to_ticks(&self, base_freq: i32, period: f64) -> Result<u32> {
        let mut ticks = 0;
        let status = self.backend().utility_period_to_ticks(base_freq, period, &mut ticks);
        self.check("meUtilityPeriodToTicks", status)?;
        Ok(ticks)
    }

    /// Ticks of a `base_freq` Hz clock to seconds.
    pub fn ticks_to_period(&self, base_freq: i32, ticks: u32) -> Result<f64> {
        let mut period = 0.0;
        let status = self.backend().utility_ticks_to_period(base_freq, ticks, &mut period);
        self.check("meUtilityTicksToPeriod", status)?;
        Ok(period)
    }

    /// Ticks of a `base_freq` Hz clock per period of `frequency`.
    pub fn frequency_to_ticks(&self, base_freq: i32, frequency: f64) -> Result<u32> {
        let mut ticks = 0;
        let status = self.backend().utility_frequency_to_ticks(base_freq, frequency, &mut ticks);
        self.check("meUtilityFrequencyToTicks", status)?;
        Ok(ticks)
    }

    /// Ticks of a `base_freq` Hz clock to a frequency in Hz.
    pub fn ticks_to_frequency(&self, base_freq: i32, ticks: u32) -> Result<f64> {
        let mut frequency = 0.0;
        let status = self.backend().utility_ticks_to_frequency(base_freq, ticks, &mut frequency);
        self.check("meUtilityTicksToFrequency", status)?;
        Ok(frequency)
    }

    /// Encode a divider in `[0, 1]` for frequency output.
    pub fn code_divider(&self, divider: f64) -> Result<u32> {
        let mut code = 0;
        let status = self.backend().utility_code_divider(divider, &mut code);
        self.check("meUtilityCodeDivider", status)?;
        Ok(code)
    }

    /// Decode a divider written by [`code_divider`](Self::code_divider).
    pub fn decode_divider(&self, code: u32) -> Result<f64> {
        let mut divider = 0.0;
        let status = self.backend().utility_decode_divider(code, &mut divider);
        self.check("meUtilityDecodeDivider", status)?;
        Ok(divider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::mock::MockBackend;

    const AI: SubdeviceAddr = SubdeviceAddr::new(0, 1);
    const CTR: SubdeviceAddr = SubdeviceAddr::new(0, 5);

    fn system() -> MeidsSystem<MockBackend> {
        MeidsSystem::open(MockBackend::new()).unwrap()
    }

    #[test]
    fn test_pwm_lifecycle() {
        let system = system();
        let counters = PwmCounters::new(0, 5, 5, 5);
        system
            .pwm_start(counters, Reference::CtrInternal1Mhz, 10, 25, PwmStartFlags::empty())
            .unwrap();
        assert_eq!(system.backend().pwm_state(0, 5), Some((10, 25)));

        system.pwm_restart(CTR, Reference::CtrInternal1Mhz, 20).unwrap();
        assert_eq!(system.backend().pwm_state(0, 5), Some((20, 25)));

        system.pwm_stop(CTR).unwrap();
        assert_eq!(system.backend().pwm_state(0, 5), None);
        let err = system.pwm_stop(CTR).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::SubdeviceNotRunning));
    }

    #[test]
    fn test_pwm_rejects_bad_arguments() {
        let system = system();
        let counters = PwmCounters::new(0, 5, 5, 5);
        let err = system
            .pwm_start(counters, Reference::CtrInternal1Mhz, 10, 100, PwmStartFlags::empty())
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidDutyCycle));

        let not_counters = PwmCounters::new(0, 5, 2, 5);
        let err = system
            .pwm_start(not_counters, Reference::CtrInternal1Mhz, 10, 50, PwmStartFlags::empty())
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotSupported));
    }

    #[test]
    fn test_config_load() {
        let system = system();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "<meconfig/>").unwrap();

        system.config_load(file.path()).unwrap();
        let loaded = system.backend().loaded_configs();
        assert_eq!(loaded, vec![file.path().to_string_lossy().into_owned()]);

        let err = system.config_load("/nonexistent/me-config.xml").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::ConfigLoadFailed));

        let err = system.config_load("bad\0path").unwrap_err();
        assert!(matches!(err, MeidsError::InvalidString { .. }));
    }

    #[test]
    fn test_library_conversion() {
        let system = system();
        let range = system.range_info(AI, 0).unwrap();

        let mid = system
            .digital_to_physical(&range, 32768, ModuleType::None, 0.0)
            .unwrap();
        assert!(!mid.out_of_range);
        assert!(mid.value.abs() < 1e-3);

        let scaled = system
            .digital_to_physical(&range, range.max_data, ModuleType::Diff16_20V, 0.0)
            .unwrap();
        assert!((scaled.value - 2.0 * range.max).abs() < 1e-9);

        let over = system
            .digital_to_physical(&range, range.max_data + 10, ModuleType::None, 0.0)
            .unwrap();
        assert!(over.out_of_range);
        assert_eq!(over.value, range.max);

        let under = system.physical_to_digital(&range, -11.0).unwrap();
        assert!(under.out_of_range);
        assert_eq!(under.value, 0);

        let codes = system.physical_to_digital_all(&range, &[-10.0, 0.0]).unwrap();
        assert_eq!(codes, vec![0, 32768]);
        let volts = system
            .digital_to_physical_all(&range, &codes, ModuleType::None, 0.0)
            .unwrap();
        assert_eq!(volts[0], -10.0);
    }

    #[test]
    fn test_single_scan_read() {
        let system = system();
        system.backend().set_input(0, 1, 0, 32768);
        system.backend().set_input(0, 1, 1, 65535);
        system.backend().set_input(0, 1, 2, 0);

        let values = system
            .single_scan_read(AI, 3, 0, Reference::AiGround, ScanStart::Software)
            .unwrap();
        assert_eq!(values.len(), 3);
        assert!(values[0].abs() < 1e-3);
        assert!((values[1] - 10.0).abs() < 1e-3);
        assert_eq!(values[2], -10.0);

        // The subdevice is idle again.
        let start = ScanStart::ExtDigital(TriggerEdge::Rising);
        let again = system
            .single_scan_read(AI, 1, 0, Reference::AiGround, start)
            .unwrap();
        assert_eq!(again.len(), 1);
    }

    #[test]
    fn test_single_scan_read_caps_channels() {
        let system = system();
        let single_ended = system
            .single_scan_read(AI, 20, 0, Reference::AiGround, ScanStart::Software)
            .unwrap();
        assert_eq!(single_ended.len(), 8);

        let differential = system
            .single_scan_read(AI, 20, 0, Reference::AiDifferential, ScanStart::Software)
            .unwrap();
        assert_eq!(differential.len(), 4);

        let none = system
            .single_scan_read(AI, 0, 0, Reference::AiGround, ScanStart::Software)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_single_scan_read_needs_streaming_input() {
        let system = system();
        let di = SubdeviceAddr::new(0, 3);
        let err = system
            .single_scan_read(di, 2, 0, Reference::AiGround, ScanStart::Software)
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotSupported));

        let err = system
            .single_scan_read(AI, 2, 9, Reference::AiGround, ScanStart::Software)
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidStreamConfig));
    }

    #[test]
    fn test_table_modules_need_library() {
        let system = system();
        let range = system.range_info(AI, 0).unwrap();
        let err = system
            .digital_to_physical(&range, 100, ModuleType::Rtd8Pt100, 0.0)
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NotSupported));
    }

    #[test]
    fn test_extract_values() {
        let system = system();
        let config = [
            StreamChannel::new(3, 0, Reference::AiGround),
            StreamChannel::new(5, 0, Reference::AiGround),
        ];
        let buffer = [30, 50, 31, 51, 32];
        assert_eq!(system.extract_values(3, &buffer, &config).unwrap(), vec![30, 31, 32]);
        assert_eq!(system.extract_values(5, &buffer, &config).unwrap(), vec![50, 51]);
        assert!(system.extract_values(4, &buffer, &config).unwrap().is_empty());
    }

    #[test]
    fn test_frequency_io_ticks() {
        let system = system();
        assert_eq!(system.period_to_ticks(1_000_000, 1e-3).unwrap(), 1000);
        assert_eq!(system.ticks_to_period(1_000_000, 500).unwrap(), 5e-4);
        assert_eq!(system.frequency_to_ticks(1_000_000, 100.0).unwrap(), 10_000);
        assert_eq!(system.ticks_to_frequency(1_000_000, 10_000).unwrap(), 100.0);
        assert!(system.frequency_to_ticks(1_000_000, 0.0).is_err());

        let code = system.code_divider(0.5).unwrap();
        assert_eq!(code, 0x8000_0000);
        assert_eq!(system.decode_divider(code).unwrap(), 0.5);
        assert_eq!(system.decode_divider(0).unwrap(), 1.0);
    }
}
