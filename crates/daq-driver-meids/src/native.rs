//! [`MeidsBackend`] over the installed ME-iDS library.
//!
//! Every method is a direct call into `meids-sys`; slices are passed as
//! pointer + length and references as out-pointers. Only built with the
//! `hardware` feature.

use std::ffi::CStr;

use libc::{c_char, c_int, c_void};
use meids_sys as sys;
use meids_sys::{
    meErrorCB_t, meIOIrqCB_t, meIOSingle_t, meIOStreamCB_t, meIOStreamConfig_t,
    meIOStreamStart_t, meIOStreamStop_t, meIOStreamTrigger_t,
};

use crate::backend::{MeidsBackend, RawDeviceInfo};

/// Length of a buffer as the driver's `int` count. Longer buffers are
/// under-reported, which the driver treats as a smaller buffer.
fn count_of<T>(buffer: &[T]) -> c_int {
    c_int::try_from(buffer.len()).unwrap_or(c_int::MAX)
}

/// Backend that calls the ME-iDS driver library.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBackend;

impl NativeBackend {
    /// The installed library; there is no per-instance state.
    pub fn new() -> Self {
        Self
    }
}

// The library retains no pointer past the call except callback contexts,
// which the trait leaves to the caller.
impl MeidsBackend for NativeBackend {
    fn open(&self, flags: i32) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe { sys::meOpen(flags) }
    }

    fn close(&self, flags: i32) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe { sys::meClose(flags) }
    }

    fn lock_driver(&self, lock: i32, flags: i32) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe { sys::meLockDriver(lock, flags) }
    }

    fn lock_device(&self, device: i32, lock: i32, flags: i32) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe { sys::meLockDevice(device, lock, flags) }
    }

    fn lock_subdevice(&self, device: i32, subdevice: i32, lock: i32, flags: i32) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe { sys::meLockSubdevice(device, subdevice, lock, flags) }
    }

    fn error_get_last(&self, error_code: &mut i32, flags: i32) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meErrorGetLast(error_code, flags) }
    }

    fn error_get_last_message(&self, message: &mut [u8]) -> i32 {
        // SAFETY: each pointer is paired with its slice's length.
        unsafe {
            sys::meErrorGetLastMessage(message.as_mut_ptr() as *mut c_char, count_of(message))
        }
    }

    fn error_get_message(&self, error_code: i32, message: &mut [u8]) -> i32 {
        // SAFETY: each pointer is paired with its slice's length.
        unsafe {
            sys::meErrorGetMessage(
                error_code,
                message.as_mut_ptr() as *mut c_char,
                count_of(message),
            )
        }
    }

    fn error_set_default_proc(&self, switch: i32) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe { sys::meErrorSetDefaultProc(switch) }
    }

    unsafe fn error_set_user_proc(&self, callback: meErrorCB_t) -> i32 {
        // SAFETY: forwarded as is; the caller upholds the registration contract.
        sys::meErrorSetUserProc(callback)
    }

    unsafe fn irq_set_callback(
        &self,
        device: i32,
        subdevice: i32,
        callback: meIOIrqCB_t,
        context: *mut c_void,
        flags: i32,
    ) -> i32 {
        // SAFETY: forwarded as is; the caller upholds the registration contract.
        sys::meIOIrqSetCallback(device, subdevice, callback, context, flags)
    }

    fn irq_start(
        &self,
        device: i32,
        subdevice: i32,
        channel: i32,
        irq_source: i32,
        irq_edge: i32,
        irq_arg: i32,
        flags: i32,
    ) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe {
            sys::meIOIrqStart(device, subdevice, channel, irq_source, irq_edge, irq_arg, flags)
        }
    }

    fn irq_stop(&self, device: i32, subdevice: i32, channel: i32, flags: i32) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe { sys::meIOIrqStop(device, subdevice, channel, flags) }
    }

    fn irq_wait(
        &self,
        device: i32,
        subdevice: i32,
        channel: i32,
        irq_count: &mut i32,
        value: &mut i32,
        timeout: i32,
        flags: i32,
    ) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meIOIrqWait(device, subdevice, channel, irq_count, value, timeout, flags) }
    }

    fn reset_device(&self, device: i32, flags: i32) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe { sys::meIOResetDevice(device, flags) }
    }

    fn reset_subdevice(&self, device: i32, subdevice: i32, flags: i32) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe { sys::meIOResetSubdevice(device, subdevice, flags) }
    }

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
    ) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe {
            sys::meIOSingleConfig(
                device,
                subdevice,
                channel,
                single_config,
                reference,
                trig_chan,
                trig_type,
                trig_edge,
                flags,
            )
        }
    }

    fn single(&self, list: &mut [meIOSingle_t], flags: i32) -> i32 {
        // SAFETY: each pointer is paired with its slice's length.
        unsafe { sys::meIOSingle(list.as_mut_ptr(), count_of(list), flags) }
    }

    fn stream_config(
        &self,
        device: i32,
        subdevice: i32,
        config: &mut [meIOStreamConfig_t],
        trigger: &mut meIOStreamTrigger_t,
        fifo_irq_threshold: i32,
        flags: i32,
    ) -> i32 {
        // SAFETY: each pointer is paired with its slice's length.
        unsafe {
            sys::meIOStreamConfig(
                device,
                subdevice,
                config.as_mut_ptr(),
                count_of(config),
                trigger,
                fifo_irq_threshold,
                flags,
            )
        }
    }

    fn stream_new_values(
        &self,
        device: i32,
        subdevice: i32,
        timeout: i32,
        count: &mut i32,
        flags: i32,
    ) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meIOStreamNewValues(device, subdevice, timeout, count, flags) }
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
        *count = count_of(values);
        // SAFETY: each pointer is paired with its slice's length.
        unsafe {
            sys::meIOStreamRead(device, subdevice, read_mode, values.as_mut_ptr(), count, flags)
        }
    }

    fn stream_write(
        &self,
        device: i32,
        subdevice: i32,
        write_mode: i32,
        values: &[i32],
        count: &mut i32,
        flags: i32,
    ) -> i32 {
        *count = count_of(values);
        // SAFETY: each pointer is paired with its slice's length. `&` buffers are
        // only read; the prototype is not const.
        unsafe {
            sys::meIOStreamWrite(
                device,
                subdevice,
                write_mode,
                values.as_ptr() as *mut c_int,
                count,
                flags,
            )
        }
    }

    fn stream_start(&self, list: &mut [meIOStreamStart_t], flags: i32) -> i32 {
        // SAFETY: each pointer is paired with its slice's length.
        unsafe { sys::meIOStreamStart(list.as_mut_ptr(), count_of(list), flags) }
    }

    fn stream_stop(&self, list: &mut [meIOStreamStop_t], flags: i32) -> i32 {
        // SAFETY: each pointer is paired with its slice's length.
        unsafe { sys::meIOStreamStop(list.as_mut_ptr(), count_of(list), flags) }
    }

    fn stream_status(
        &self,
        device: i32,
        subdevice: i32,
        wait: i32,
        status: &mut i32,
        count: &mut i32,
        flags: i32,
    ) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meIOStreamStatus(device, subdevice, wait, status, count, flags) }
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
        flags: i32,
    ) -> i32 {
        // SAFETY: forwarded as is; the caller upholds the registration contract.
        sys::meIOStreamSetCallbacks(
            device,
            subdevice,
            start,
            start_context,
            new_values,
            new_values_context,
            end,
            end_context,
            flags,
        )
    }

    fn stream_time_to_ticks(
        &self,
        device: i32,
        subdevice: i32,
        timer: i32,
        time: &mut f64,
        ticks_low: &mut i32,
        ticks_high: &mut i32,
        flags: i32,
    ) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe {
            sys::meIOStreamTimeToTicks(device, subdevice, timer, time, ticks_low, ticks_high, flags)
        }
    }

    fn stream_frequency_to_ticks(
        &self,
        device: i32,
        subdevice: i32,
        timer: i32,
        frequency: &mut f64,
        ticks_low: &mut i32,
        ticks_high: &mut i32,
        flags: i32,
    ) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe {
            sys::meIOStreamFrequencyToTicks(
                device, subdevice, timer, frequency, ticks_low, ticks_high, flags,
            )
        }
    }

    fn set_channel_offset(
        &self,
        device: i32,
        subdevice: i32,
        channel: i32,
        range: i32,
        offset: &mut f64,
        flags: i32,
    ) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meIOSetChannelOffset(device, subdevice, channel, range, offset, flags) }
    }

    fn single_time_to_ticks(
        &self,
        device: i32,
        subdevice: i32,
        timer: i32,
        time: &mut f64,
        ticks_low: &mut i32,
        ticks_high: &mut i32,
        flags: i32,
    ) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe {
            sys::meIOSingleTimeToTicks(device, subdevice, timer, time, ticks_low, ticks_high, flags)
        }
    }

    fn single_ticks_to_time(
        &self,
        device: i32,
        subdevice: i32,
        timer: i32,
        ticks_low: i32,
        ticks_high: i32,
        time: &mut f64,
        flags: i32,
    ) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe {
            sys::meIOSingleTicksToTime(device, subdevice, timer, ticks_low, ticks_high, time, flags)
        }
    }

    fn query_description_device(&self, device: i32, description: &mut [u8]) -> i32 {
        // SAFETY: each pointer is paired with its slice's length.
        unsafe {
            sys::meQueryDescriptionDevice(
                device,
                description.as_mut_ptr() as *mut c_char,
                count_of(description),
            )
        }
    }

    fn query_info_device(&self, device: i32, info: &mut RawDeviceInfo) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe {
            sys::meQueryInfoDevice(
                device,
                &mut info.vendor_id,
                &mut info.device_id,
                &mut info.serial_no,
                &mut info.bus_type,
                &mut info.bus_no,
                &mut info.dev_no,
                &mut info.func_no,
                &mut info.plugged,
            )
        }
    }

    fn query_name_device(&self, device: i32, name: &mut [u8]) -> i32 {
        // SAFETY: each pointer is paired with its slice's length.
        unsafe { sys::meQueryNameDevice(device, name.as_mut_ptr() as *mut c_char, count_of(name)) }
    }

    fn query_name_device_driver(&self, device: i32, name: &mut [u8]) -> i32 {
        // SAFETY: each pointer is paired with its slice's length.
        unsafe {
            sys::meQueryNameDeviceDriver(device, name.as_mut_ptr() as *mut c_char, count_of(name))
        }
    }

    fn query_number_devices(&self, number: &mut i32) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meQueryNumberDevices(number) }
    }

    fn query_number_subdevices(&self, device: i32, number: &mut i32) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meQueryNumberSubdevices(device, number) }
    }

    fn query_number_channels(&self, device: i32, subdevice: i32, number: &mut i32) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meQueryNumberChannels(device, subdevice, number) }
    }

    fn query_number_ranges(&self, device: i32, subdevice: i32, unit: i32, number: &mut i32) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meQueryNumberRanges(device, subdevice, unit, number) }
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
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meQueryRangeByMinMax(device, subdevice, unit, min, max, max_data, range) }
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
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meQueryRangeInfo(device, subdevice, range, unit, min, max, max_data) }
    }

    fn query_subdevice_by_type(
        &self,
        device: i32,
        start_subdevice: i32,
        kind: i32,
        subtype: i32,
        subdevice: &mut i32,
    ) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meQuerySubdeviceByType(device, start_subdevice, kind, subtype, subdevice) }
    }

    fn query_subdevice_type(
        &self,
        device: i32,
        subdevice: i32,
        kind: &mut i32,
        subtype: &mut i32,
    ) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meQuerySubdeviceType(device, subdevice, kind, subtype) }
    }

    fn query_subdevice_caps(&self, device: i32, subdevice: i32, caps: &mut i32) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meQuerySubdeviceCaps(device, subdevice, caps) }
    }

    fn query_subdevice_caps_args(
        &self,
        device: i32,
        subdevice: i32,
        cap: i32,
        args: &mut [i32],
    ) -> i32 {
        // SAFETY: each pointer is paired with its slice's length.
        unsafe {
            sys::meQuerySubdeviceCapsArgs(device, subdevice, cap, args.as_mut_ptr(), count_of(args))
        }
    }

    fn query_version_library(&self, version: &mut i32) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meQueryVersionLibrary(version) }
    }

    fn query_version_main_driver(&self, version: &mut i32) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meQueryVersionMainDriver(version) }
    }

    fn query_version_device_driver(&self, device: i32, version: &mut i32) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meQueryVersionDeviceDriver(device, version) }
    }

    fn utility_extract_values(
        &self,
        channel: i32,
        buffer: &[i32],
        config: &[meIOStreamConfig_t],
        channel_buffer: &mut [i32],
        count: &mut i32,
    ) -> i32 {
        *count = (*count).clamp(0, count_of(channel_buffer));
        // SAFETY: each pointer is paired with its slice's length. `&` buffers are
        // only read; the prototype is not const.
        unsafe {
            sys::meUtilityExtractValues(
                channel,
                buffer.as_ptr() as *mut c_int,
                count_of(buffer),
                config.as_ptr() as *mut meIOStreamConfig_t,
                count_of(config),
                channel_buffer.as_mut_ptr(),
                count,
            )
        }
    }

    fn utility_digital_to_physical(
        &self,
        min: f64,
        max: f64,
        max_data: i32,
        data: i32,
        module_type: i32,
        ref_value: f64,
        physical: &mut f64,
    ) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe {
            sys::meUtilityDigitalToPhysical(
                min,
                max,
                max_data,
                data,
                module_type,
                ref_value,
                physical,
            )
        }
    }

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
        let count = count_of(data).min(count_of(physical));
        // SAFETY: each pointer is paired with its slice's length. `&` buffers are
        // only read; the prototype is not const.
        unsafe {
            sys::meUtilityDigitalToPhysicalV(
                min,
                max,
                max_data,
                data.as_ptr() as *mut c_int,
                count,
                module_type,
                ref_value,
                physical.as_mut_ptr(),
            )
        }
    }

    fn utility_physical_to_digital(
        &self,
        min: f64,
        max: f64,
        max_data: i32,
        physical: f64,
        data: &mut i32,
    ) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meUtilityPhysicalToDigital(min, max, max_data, physical, data) }
    }

    fn utility_physical_to_digital_v(
        &self,
        min: f64,
        max: f64,
        max_data: i32,
        physical: &[f64],
        data: &mut [i32],
    ) -> i32 {
        let count = count_of(physical).min(count_of(data));
        // SAFETY: each pointer is paired with its slice's length. `&` buffers are
        // only read; the prototype is not const.
        unsafe {
            sys::meUtilityPhysicalToDigitalV(
                min,
                max,
                max_data,
                physical.as_ptr() as *mut f64,
                count,
                data.as_mut_ptr(),
            )
        }
    }

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
    ) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe {
            sys::meUtilityPWMStart(
                device, subdevice1, subdevice2, subdevice3, reference, prescaler, duty_cycle,
                flags,
            )
        }
    }

    fn utility_pwm_stop(&self, device: i32, subdevice1: i32) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe { sys::meUtilityPWMStop(device, subdevice1) }
    }

    fn utility_pwm_restart(
        &self,
        device: i32,
        subdevice1: i32,
        reference: i32,
        prescaler: i32,
    ) -> i32 {
        // SAFETY: scalar arguments only.
        unsafe { sys::meUtilityPWMRestart(device, subdevice1, reference, prescaler) }
    }

    fn utility_period_to_ticks(&self, base_freq: i32, period: f64, ticks: &mut u32) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meUtilityPeriodToTicks(base_freq, period, ticks) }
    }

    fn utility_ticks_to_period(&self, base_freq: i32, ticks: u32, period: &mut f64) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meUtilityTicksToPeriod(base_freq, ticks, period) }
    }

    fn utility_frequency_to_ticks(&self, base_freq: i32, frequency: f64, ticks: &mut u32) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meUtilityFrequencyToTicks(base_freq, frequency, ticks) }
    }

    fn utility_ticks_to_frequency(&self, base_freq: i32, ticks: u32, frequency: &mut f64) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meUtilityTicksToFrequency(base_freq, ticks, frequency) }
    }

    fn utility_code_divider(&self, divider: f64, code: &mut u32) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meUtilityCodeDivider(divider, code) }
    }

    fn utility_decode_divider(&self, code: u32, divider: &mut f64) -> i32 {
        // SAFETY: out-pointers are exclusive borrows that outlive the call.
        unsafe { sys::meUtilityDecodeDivider(code, divider) }
    }

    fn config_load(&self, config_file: &CStr) -> i32 {
        // SAFETY: `config_file` is NUL-terminated and only read; the prototype is not const.
        unsafe { sys::meConfigLoad(config_file.as_ptr() as *mut c_char) }
    }
}
