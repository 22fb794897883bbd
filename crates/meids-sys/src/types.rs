//! Fixed-layout records and callback signatures shared with the driver library.
//!
//! Every record consists solely of `c_int` fields, so the natural C layout
//! is also the packed(4) layout the vendor headers request.

use libc::{c_char, c_int, c_void};

/// Number of argument slots in each trigger stage of [`meIOStreamTrigger_t`].
pub const ME_TRIGGER_ARG_COUNT: usize = 10;

/// One entry of a single-value I/O batch passed to `meIOSingle`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct meIOSingle_t {
    pub iDevice: c_int,
    pub iSubdevice: c_int,
    pub iChannel: c_int,
    pub iDir: c_int,
    pub iValue: c_int,
    pub iTimeOut: c_int,
    pub iFlags: c_int,
    pub iErrno: c_int,
}

/// One entry of the channel list passed to `meIOStreamConfig`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct meIOStreamConfig_t {
    pub iChannel: c_int,
    pub iStreamConfig: c_int,
    pub iRef: c_int,
    pub iFlags: c_int,
}

/// Trigger and timing description for a streaming acquisition.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct meIOStreamTrigger_t {
    pub iAcqStartTrigType: c_int,
    pub iAcqStartTrigEdge: c_int,
    pub iAcqStartTrigChan: c_int,
    pub iAcqStartTicksLow: c_int,
    pub iAcqStartTicksHigh: c_int,
    pub iAcqStartArgs: [c_int; ME_TRIGGER_ARG_COUNT],
    pub iScanStartTrigType: c_int,
    pub iScanStartTicksLow: c_int,
    pub iScanStartTicksHigh: c_int,
    pub iScanStartArgs: [c_int; ME_TRIGGER_ARG_COUNT],
    pub iConvStartTrigType: c_int,
    pub iConvStartTicksLow: c_int,
    pub iConvStartTicksHigh: c_int,
    pub iConvStartArgs: [c_int; ME_TRIGGER_ARG_COUNT],
    pub iScanStopTrigType: c_int,
    pub iScanStopCount: c_int,
    pub iScanStopArgs: [c_int; ME_TRIGGER_ARG_COUNT],
    pub iAcqStopTrigType: c_int,
    pub iAcqStopCount: c_int,
    pub iAcqStopArgs: [c_int; ME_TRIGGER_ARG_COUNT],
    pub iFlags: c_int,
}

/// One entry of the list passed to `meIOStreamStart`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct meIOStreamStart_t {
    pub iDevice: c_int,
    pub iSubdevice: c_int,
    pub iStartMode: c_int,
    pub iTimeOut: c_int,
    pub iFlags: c_int,
    pub iErrno: c_int,
}

/// One entry of the list passed to `meIOStreamStop`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct meIOStreamStop_t {
    pub iDevice: c_int,
    pub iSubdevice: c_int,
    pub iStopMode: c_int,
    pub iFlags: c_int,
    pub iErrno: c_int,
}

/// Extra parameters for firmware and configuration loading.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct me_extra_param_set_t {
    pub device: c_int,
    pub size: c_int,
    pub arg: *mut c_void,
    pub flags: c_int,
    pub err_no: c_int,
}

impl Default for me_extra_param_set_t {
    fn default() -> Self {
        Self {
            device: 0,
            size: 0,
            arg: std::ptr::null_mut(),
            flags: 0,
            err_no: 0,
        }
    }
}

/// Global error notification: `(function name, error code)`.
pub type meErrorCB_t = Option<unsafe extern "C" fn(function: *mut c_char, error: c_int) -> c_int>;

/// Stream lifecycle notification:
/// `(device, subdevice, count, context, error)`.
pub type meIOStreamCB_t = Option<
    unsafe extern "C" fn(
        device: c_int,
        subdevice: c_int,
        count: c_int,
        context: *mut c_void,
        error: c_int,
    ) -> c_int,
>;

/// Interrupt notification:
/// `(device, subdevice, channel, irq count, value, context, error)`.
pub type meIOIrqCB_t = Option<
    unsafe extern "C" fn(
        device: c_int,
        subdevice: c_int,
        channel: c_int,
        irq_count: c_int,
        value: c_int,
        context: *mut c_void,
        error: c_int,
    ) -> c_int,
>;
