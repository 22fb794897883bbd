//! The capability seam between the safe API and the driver library.
//!
//! [`MeidsBackend`] has one method per driver entry point with the same
//! argument order as the C prototype. Arguments stay raw `i32`s so the
//! trait can be implemented by a test double that sees exactly what the
//! library would see. Two adjustments make it callable from safe code:
//!
//! - out-parameters are `&mut` references
//! - pointer + count pairs are slices, the count being the slice length
//!
//! Every method returns the raw `ME_ERRNO_*` status.
//!
//! Conversion utilities that need no device have default implementations
//! in pure Rust (see [`crate::conversion`]); the native backend overrides
//! them to call the library.

use std::ffi::CStr;

use libc::c_void;
use meids_sys::{
    meErrorCB_t, meIOIrqCB_t, meIOSingle_t, meIOStreamCB_t, meIOStreamConfig_t,
    meIOStreamStart_t, meIOStreamStop_t, meIOStreamTrigger_t,
};

use crate::codes::ModuleType;
use crate::conversion;
use crate::error::{MeidsError, Result};

/// Out-parameters of `meQueryInfoDevice`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawDeviceInfo {
    /// PCI vendor ID
    pub vendor_id: i32,
    /// Board model, e.g. `0x4680`
    pub device_id: i32,
    /// Serial number
    pub serial_no: i32,
    /// Raw [`BusType`](crate::BusType)
    pub bus_type: i32,
    /// PCI bus
    pub bus_no: i32,
    /// PCI device
    pub dev_no: i32,
    /// PCI function
    pub func_no: i32,
    /// Raw [`PluggedState`](crate::PluggedState)
    pub plugged: i32,
}

/// Map a conversion result back to a raw status.
fn status_of<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => meids_sys::ME_ERRNO_SUCCESS,
        Err(MeidsError::Driver { code, .. }) => code.to_raw(),
        Err(MeidsError::NotSupported(_)) => meids_sys::ME_ERRNO_NOT_SUPPORTED,
        Err(_) => meids_sys::ME_ERRNO_INTERNAL,
    }
}

fn clamped_status<T>(clamped: &conversion::Clamped<T>) -> i32 {
    if clamped.out_of_range {
        meids_sys::ME_ERRNO_VALUE_OUT_OF_RANGE
    } else {
        meids_sys::ME_ERRNO_SUCCESS
    }
}

/// One method per ME-iDS entry point.
///
/// Implementations must be callable from any thread, including the
/// library's own callback threads.
#[allow(clippy::too_many_arguments)]
pub trait MeidsBackend: Send + Sync {
    // --- Driver system access ---

    /// `meOpen`.
    fn open(&self, flags: i32) -> i32;
    /// `meClose`.
    fn close(&self, flags: i32) -> i32;
    /// `meLockDriver`.
    fn lock_driver(&self, lock: i32, flags: i32) -> i32;
    /// `meLockDevice`.
    fn lock_device(&self, device: i32, lock: i32, flags: i32) -> i32;
    /// `meLockSubdevice`.
    fn lock_subdevice(&self, device: i32, subdevice: i32, lock: i32, flags: i32) -> i32;

    // --- Error handling ---

    /// `meErrorGetLast`.
    fn error_get_last(&self, error_code: &mut i32, flags: i32) -> i32;
    /// `meErrorGetLastMessage`.
    fn error_get_last_message(&self, message: &mut [u8]) -> i32;
    /// `meErrorGetMessage`.
    fn error_get_message(&self, error_code: i32, message: &mut [u8]) -> i32;
    /// `meErrorSetDefaultProc`.
    fn error_set_default_proc(&self, switch: i32) -> i32;

    /// Install the process-wide error callback.
    ///
    /// # Safety
    ///
    /// `callback` may be invoked from any thread until it is replaced, and
    /// must stay valid for that long.
    unsafe fn error_set_user_proc(&self, callback: meErrorCB_t) -> i32;

    // --- Interrupts ---

    /// Register an interrupt callback for a subdevice.
    ///
    /// # Safety
    ///
    /// `context` is passed back to `callback` unchanged; both must stay
    /// valid until the registration is replaced or the driver is closed.
    unsafe fn irq_set_callback(
        &self,
        device: i32,
        subdevice: i32,
        callback: meIOIrqCB_t,
        context: *mut c_void,
        flags: i32,
    ) -> i32;
    /// `meIOIrqStart`.
    fn irq_start(
        &self,
        device: i32,
        subdevice: i32,
        channel: i32,
        irq_source: i32,
        irq_edge: i32,
        irq_arg: i32,
        flags: i32,
    ) -> i32;
    /// `meIOIrqStop`.
    fn irq_stop(&self, device: i32, subdevice: i32, channel: i32, flags: i32) -> i32;
    /// `meIOIrqWait`.
    fn irq_wait(
        &self,
        device: i32,
        subdevice: i32,
        channel: i32,
        irq_count: &mut i32,
        value: &mut i32,
        timeout: i32,
        flags: i32,
    ) -> i32;

    // --- Reset ---

    /// `meIOResetDevice`.
    fn reset_device(&self, device: i32, flags: i32) -> i32;
    /// `meIOResetSubdevice`.
    fn reset_subdevice(&self, device: i32, subdevice: i32, flags: i32) -> i32;

    // --- Single I/O ---

    /// `meIOSingleConfig`.
    fn single_config(
        &self,
        device: i32,
        subdevice: i32,
        channel: i32,
        single_config: i32,
        reference: i32,
        trig_chan: i32,
        trig_type: i32,
        trig_edge: i32,
        flags: i32,
    ) -> i32;
    /// `meIOSingle`.
    fn single(&self, list: &mut [meIOSingle_t], flags: i32) -> i32;

    // --- Streaming ---

    /// `meIOStreamConfig`.
    fn stream_config(
        &self,
        device: i32,
        subdevice: i32,
        config: &mut [meIOStreamConfig_t],
        trigger: &mut meIOStreamTrigger_t,
        fifo_irq_threshold: i32,
        flags: i32,
    ) -> i32;
    /// `meIOStreamNewValues`.
    fn stream_new_values(
        &self,
        device: i32,
        subdevice: i32,
        timeout: i32,
        count: &mut i32,
        flags: i32,
    ) -> i32;
    /// `count` holds the number of values read on return; at most
    /// `values.len()` are written.
    fn stream_read(
        &self,
        device: i32,
        subdevice: i32,
        read_mode: i32,
        values: &mut [i32],
        count: &mut i32,
        flags: i32,
    ) -> i32;
    /// `count` holds the number of values accepted on return.
    fn stream_write(
        &self,
        device: i32,
        subdevice: i32,
        write_mode: i32,
        values: &[i32],
        count: &mut i32,
        flags: i32,
    ) -> i32;
    /// `meIOStreamStart`.
    fn stream_start(&self, list: &mut [meIOStreamStart_t], flags: i32) -> i32;
    /// `meIOStreamStop`.
    fn stream_stop(&self, list: &mut [meIOStreamStop_t], flags: i32) -> i32;
    /// `meIOStreamStatus`.
    fn stream_status(
        &self,
        device: i32,
        subdevice: i32,
        wait: i32,
        status: &mut i32,
        count: &mut i32,
        flags: i32,
    ) -> i32;

    /// Register the start, new-values and end callbacks of a stream.
    ///
    /// # Safety
    ///
    /// Each context is passed back to its callback unchanged; all must stay
    /// valid until the registration is replaced or the driver is closed.
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
        flags: i32,
    ) -> i32;
    /// `meIOStreamTimeToTicks`.
    fn stream_time_to_ticks(
        &self,
        device: i32,
        subdevice: i32,
        timer: i32,
        time: &mut f64,
        ticks_low: &mut i32,
        ticks_high: &mut i32,
        flags: i32,
    ) -> i32;
    /// `meIOStreamFrequencyToTicks`.
    fn stream_frequency_to_ticks(
        &self,
        device: i32,
        subdevice: i32,
        timer: i32,
        frequency: &mut f64,
        ticks_low: &mut i32,
        ticks_high: &mut i32,
        flags: i32,
    ) -> i32;

    // --- Offsets and single timing ---

    /// `meIOSetChannelOffset`.
    fn set_channel_offset(
        &self,
        device: i32,
        subdevice: i32,
        channel: i32,
        range: i32,
        offset: &mut f64,
        flags: i32,
    ) -> i32;
    /// `meIOSingleTimeToTicks`.
    fn single_time_to_ticks(
        &self,
        device: i32,
        subdevice: i32,
        timer: i32,
        time: &mut f64,
        ticks_low: &mut i32,
        ticks_high: &mut i32,
        flags: i32,
    ) -> i32;
    /// `meIOSingleTicksToTime`.
    fn single_ticks_to_time(
        &self,
        device: i32,
        subdevice: i32,
        timer: i32,
        ticks_low: i32,
        ticks_high: i32,
        time: &mut f64,
        flags: i32,
    ) -> i32;

    // --- Queries ---

    /// `meQueryDescriptionDevice`.
    fn query_description_device(&self, device: i32, description: &mut [u8]) -> i32;
    /// `meQueryInfoDevice`.
    fn query_info_device(&self, device: i32, info: &mut RawDeviceInfo) -> i32;
    /// `meQueryNameDevice`.
    fn query_name_device(&self, device: i32, name: &mut [u8]) -> i32;
    /// `meQueryNameDeviceDriver`.
    fn query_name_device_driver(&self, device: i32, name: &mut [u8]) -> i32;
    /// `meQueryNumberDevices`.
    fn query_number_devices(&self, number: &mut i32) -> i32;
    /// `meQueryNumberSubdevices`.
    fn query_number_subdevices(&self, device: i32, number: &mut i32) -> i32;
    /// `meQueryNumberChannels`.
    fn query_number_channels(&self, device: i32, subdevice: i32, number: &mut i32) -> i32;
    /// `meQueryNumberRanges`.
    fn query_number_ranges(&self, device: i32, subdevice: i32, unit: i32, number: &mut i32) -> i32;
    /// `meQueryRangeByMinMax`.
    fn query_range_by_min_max(
        &self,
        device: i32,
        subdevice: i32,
        unit: i32,
        min: &mut f64,
        max: &mut f64,
        max_data: &mut i32,
        range: &mut i32,
    ) -> i32;
    /// `meQueryRangeInfo`.
    fn query_range_info(
        &self,
        device: i32,
        subdevice: i32,
        range: i32,
        unit: &mut i32,
        min: &mut f64,
        max: &mut f64,
        max_data: &mut i32,
    ) -> i32;
    /// `meQuerySubdeviceByType`.
    fn query_subdevice_by_type(
        &self,
        device: i32,
        start_subdevice: i32,
        kind: i32,
        subtype: i32,
        subdevice: &mut i32,
    ) -> i32;
    /// `meQuerySubdeviceType`.
    fn query_subdevice_type(
        &self,
        device: i32,
        subdevice: i32,
        kind: &mut i32,
        subtype: &mut i32,
    ) -> i32;
    /// `meQuerySubdeviceCaps`.
    fn query_subdevice_caps(&self, device: i32, subdevice: i32, caps: &mut i32) -> i32;
    /// `meQuerySubdeviceCapsArgs`.
    fn query_subdevice_caps_args(
        &self,
        device: i32,
        subdevice: i32,
        cap: i32,
        args: &mut [i32],
    ) -> i32;
    /// `meQueryVersionLibrary`.
    fn query_version_library(&self, version: &mut i32) -> i32;
    /// `meQueryVersionMainDriver`.
    fn query_version_main_driver(&self, version: &mut i32) -> i32;
    /// `meQueryVersionDeviceDriver`.
    fn query_version_device_driver(&self, device: i32, version: &mut i32) -> i32;

    // --- Utilities ---

    /// Demultiplex one channel from an interleaved buffer. On entry
    /// `count` is the capacity to fill, on return the number written.
    fn utility_extract_values(
        &self,
        channel: i32,
        buffer: &[i32],
        config: &[meIOStreamConfig_t],
        channel_buffer: &mut [i32],
        count: &mut i32,
    ) -> i32 {
        let capacity = usize::try_from(*count).unwrap_or(0).min(channel_buffer.len());
        let channels: Vec<i32> = config.iter().map(|entry| entry.iChannel).collect();
        let mut written = 0;
        for (slot, value) in channel_buffer[..capacity]
            .iter_mut()
            .zip(conversion::extract_by(channel, buffer, &channels))
        {
            *slot = value;
            written += 1;
        }
        *count = written;
        meids_sys::ME_ERRNO_SUCCESS
    }

    /// `meUtilityDigitalToPhysical`.
    fn utility_digital_to_physical(
        &self,
        min: f64,
        max: f64,
        max_data: i32,
        data: i32,
        module_type: i32,
        _ref_value: f64,
        physical: &mut f64,
    ) -> i32 {
        let Some(module) = ModuleType::from_raw(module_type) else {
            return meids_sys::ME_ERRNO_INVALID_MODULE_TYPE;
        };
        let result = conversion::digital_to_physical(min, max, max_data, data, module);
        match &result {
            Ok(clamped) => {
                *physical = clamped.value;
                clamped_status(clamped)
            }
            Err(_) => status_of(&result),
        }
    }

    /// Invalid module types fall back to no scaling and report
    /// `INVALID_MODULE_TYPE`; per-element range errors are not reported.
    fn utility_digital_to_physical_v(
        &self,
        min: f64,
        max: f64,
        max_data: i32,
        data: &[i32],
        module_type: i32,
        ref_value: f64,
        physical: &mut [f64],
    ) -> i32 {
        let (module_type, status) = match ModuleType::from_raw(module_type) {
            Some(_) => (module_type, meids_sys::ME_ERRNO_SUCCESS),
            None => (
                meids_sys::ME_MODULE_TYPE_MULTISIG_NONE,
                meids_sys::ME_ERRNO_INVALID_MODULE_TYPE,
            ),
        };
        for (d, p) in data.iter().zip(physical.iter_mut()) {
            self.utility_digital_to_physical(min, max, max_data, *d, module_type, ref_value, p);
        }
        status
    }

    /// `meUtilityPhysicalToDigital`.
    fn utility_physical_to_digital(
        &self,
        min: f64,
        max: f64,
        max_data: i32,
        physical: f64,
        data: &mut i32,
    ) -> i32 {
        let result = conversion::physical_to_digital(min, max, max_data, physical);
        match &result {
            Ok(clamped) => {
                *data = clamped.value;
                clamped_status(clamped)
            }
            Err(_) => status_of(&result),
        }
    }

    /// Per-element range errors are not reported.
    fn utility_physical_to_digital_v(
        &self,
        min: f64,
        max: f64,
        max_data: i32,
        physical: &[f64],
        data: &mut [i32],
    ) -> i32 {
        for (p, d) in physical.iter().zip(data.iter_mut()) {
            self.utility_physical_to_digital(min, max, max_data, *p, d);
        }
        meids_sys::ME_ERRNO_SUCCESS
    }

    /// `meUtilityPWMStart`.
    fn utility_pwm_start(
        &self,
        device: i32,
        subdevice1: i32,
        subdevice2: i32,
        subdevice3: i32,
        reference: i32,
        prescaler: i32,
        duty_cycle: i32,
        flags: i32,
    ) -> i32;
    /// `meUtilityPWMStop`.
    fn utility_pwm_stop(&self, device: i32, subdevice1: i32) -> i32;
    /// `meUtilityPWMRestart`.
    fn utility_pwm_restart(&self, device: i32, subdevice1: i32, reference: i32, prescaler: i32)
        -> i32;

    // --- Frequency I/O utilities ---

    /// `meUtilityPeriodToTicks`.
    fn utility_period_to_ticks(&self, base_freq: i32, period: f64, ticks: &mut u32) -> i32 {
        let result = conversion::period_to_ticks(base_freq, period);
        *ticks = *result.as_ref().unwrap_or(&0);
        status_of(&result)
    }

    /// `meUtilityTicksToPeriod`.
    fn utility_ticks_to_period(&self, base_freq: i32, ticks: u32, period: &mut f64) -> i32 {
        let result = conversion::ticks_to_period(base_freq, ticks);
        *period = *result.as_ref().unwrap_or(&0.0);
        status_of(&result)
    }

    /// `meUtilityFrequencyToTicks`.
    fn utility_frequency_to_ticks(&self, base_freq: i32, frequency: f64, ticks: &mut u32) -> i32 {
        let result = conversion::frequency_to_ticks(base_freq, frequency);
        *ticks = *result.as_ref().unwrap_or(&0);
        status_of(&result)
    }

    /// `meUtilityTicksToFrequency`.
    fn utility_ticks_to_frequency(&self, base_freq: i32, ticks: u32, frequency: &mut f64) -> i32 {
        let result = conversion::ticks_to_frequency(base_freq, ticks);
        *frequency = *result.as_ref().unwrap_or(&0.0);
        status_of(&result)
    }

    /// `meUtilityCodeDivider`.
    fn utility_code_divider(&self, divider: f64, code: &mut u32) -> i32 {
        *code = conversion::code_divider(divider);
        meids_sys::ME_ERRNO_SUCCESS
    }

    /// `meUtilityDecodeDivider`.
    fn utility_decode_divider(&self, code: u32, divider: &mut f64) -> i32 {
        *divider = conversion::decode_divider(code);
        meids_sys::ME_ERRNO_SUCCESS
    }

    // --- Configuration ---

    /// `meConfigLoad`.
    fn config_load(&self, config_file: &CStr) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    #[test]
    fn test_default_utilities_report_raw_status() {
        let backend = MockBackend::new();

        let mut data = 0;
        let status = backend.utility_physical_to_digital(0.0, 10.0, 1000, 12.0, &mut data);
        assert_eq!(status, meids_sys::ME_ERRNO_VALUE_OUT_OF_RANGE);
        assert_eq!(data, 1000);

        let mut physical = 0.0;
        let status = backend.utility_digital_to_physical(
            0.0,
            10.0,
            1000,
            500,
            meids_sys::ME_MODULE_TYPE_MULTISIG_RTD8_PT100,
            0.0,
            &mut physical,
        );
        assert_eq!(status, meids_sys::ME_ERRNO_NOT_SUPPORTED);

        let status =
            backend.utility_digital_to_physical(0.0, 10.0, 1000, 500, 0x1234, 0.0, &mut physical);
        assert_eq!(status, meids_sys::ME_ERRNO_INVALID_MODULE_TYPE);

        let mut ticks = 7;
        let status = backend.utility_period_to_ticks(0, 1.0, &mut ticks);
        assert_eq!(status, meids_sys::ME_ERRNO_VALUE_OUT_OF_RANGE);
        assert_eq!(ticks, 0);
    }

    #[test]
    fn test_default_vector_forms() {
        let backend = MockBackend::new();

        let mut out = [0.0; 3];
        let status = backend.utility_digital_to_physical_v(
            0.0,
            10.0,
            100,
            &[0, 50, 200],
            0x1234,
            0.0,
            &mut out,
        );
        assert_eq!(status, meids_sys::ME_ERRNO_INVALID_MODULE_TYPE);
        assert_eq!(out, [0.0, 5.0, 10.0]);

        let mut codes = [0; 2];
        let status =
            backend.utility_physical_to_digital_v(0.0, 10.0, 100, &[5.0, -3.0], &mut codes);
        assert_eq!(status, meids_sys::ME_ERRNO_SUCCESS);
        assert_eq!(codes, [50, 0]);
    }

    #[test]
    fn test_default_extract_values_respects_capacity() {
        let backend = MockBackend::new();
        let config = [
            meIOStreamConfig_t {
                iChannel: 1,
                ..Default::default()
            },
            meIOStreamConfig_t {
                iChannel: 2,
                ..Default::default()
            },
        ];
        let mut out = [0; 8];
        let mut count = 2;
        let buffer = [10, 20, 11, 21, 12, 22];
        let status = backend.utility_extract_values(1, &buffer, &config, &mut out, &mut count);
        assert_eq!(status, meids_sys::ME_ERRNO_SUCCESS);
        assert_eq!(count, 2);
        assert_eq!(&out[..2], &[10, 11]);
    }
}
