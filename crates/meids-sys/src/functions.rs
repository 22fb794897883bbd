//! Entry points exported by the ME-iDS driver library.
//!
//! Every function returns an `ME_ERRNO_*` status code; `ME_ERRNO_SUCCESS`
//! (zero) means the call completed.

use crate::types::*;
use libc::{c_char, c_double, c_int, c_uint, c_void};

extern "C" {
    // Driver system access

    pub fn meOpen(iFlags: c_int) -> c_int;
    pub fn meClose(iFlags: c_int) -> c_int;
    pub fn meLockDriver(iLock: c_int, iFlags: c_int) -> c_int;
    pub fn meLockDevice(iDevice: c_int, iLock: c_int, iFlags: c_int) -> c_int;
    pub fn meLockSubdevice(iDevice: c_int, iSubdevice: c_int, iLock: c_int, iFlags: c_int)
        -> c_int;

    // Error handling

    pub fn meErrorGetLast(piErrorCode: *mut c_int, iFlags: c_int) -> c_int;
    pub fn meErrorGetLastMessage(pcErrorMsg: *mut c_char, iCount: c_int) -> c_int;
    pub fn meErrorGetMessage(iErrorCode: c_int, pcErrorMsg: *mut c_char, iCount: c_int) -> c_int;
    pub fn meErrorSetDefaultProc(iSwitch: c_int) -> c_int;
    pub fn meErrorSetUserProc(pErrorProc: meErrorCB_t) -> c_int;

    // Interrupts

    pub fn meIOIrqSetCallback(
        iDevice: c_int,
        iSubdevice: c_int,
        pCallback: meIOIrqCB_t,
        pCallbackContext: *mut c_void,
        iFlags: c_int,
    ) -> c_int;
    pub fn meIOIrqStart(
        iDevice: c_int,
        iSubdevice: c_int,
        iChannel: c_int,
        iIrqSource: c_int,
        iIrqEdge: c_int,
        iIrqArg: c_int,
        iFlags: c_int,
    ) -> c_int;
    pub fn meIOIrqStop(iDevice: c_int, iSubdevice: c_int, iChannel: c_int, iFlags: c_int) -> c_int;
    pub fn meIOIrqWait(
        iDevice: c_int,
        iSubdevice: c_int,
        iChannel: c_int,
        piIrqCount: *mut c_int,
        piValue: *mut c_int,
        iTimeOut: c_int,
        iFlags: c_int,
    ) -> c_int;

    // Reset

    pub fn meIOResetDevice(iDevice: c_int, iFlags: c_int) -> c_int;
    pub fn meIOResetSubdevice(iDevice: c_int, iSubdevice: c_int, iFlags: c_int) -> c_int;

    // Single I/O

    pub fn meIOSingleConfig(
        iDevice: c_int,
        iSubdevice: c_int,
        iChannel: c_int,
        iSingleConfig: c_int,
        iRef: c_int,
        iTrigChan: c_int,
        iTrigType: c_int,
        iTrigEdge: c_int,
        iFlags: c_int,
    ) -> c_int;
    pub fn meIOSingle(pSingleList: *mut meIOSingle_t, iCount: c_int, iFlags: c_int) -> c_int;

    // Streaming

    pub fn meIOStreamConfig(
        iDevice: c_int,
        iSubdevice: c_int,
        pConfigList: *mut meIOStreamConfig_t,
        iCount: c_int,
        pTrigger: *mut meIOStreamTrigger_t,
        iFifoIrqThreshold: c_int,
        iFlags: c_int,
    ) -> c_int;
    pub fn meIOStreamNewValues(
        iDevice: c_int,
        iSubdevice: c_int,
        iTimeOut: c_int,
        piCount: *mut c_int,
        iFlags: c_int,
    ) -> c_int;
    pub fn meIOStreamRead(
        iDevice: c_int,
        iSubdevice: c_int,
        iReadMode: c_int,
        piValues: *mut c_int,
        piCount: *mut c_int,
        iFlags: c_int,
    ) -> c_int;
    pub fn meIOStreamWrite(
        iDevice: c_int,
        iSubdevice: c_int,
        iWriteMode: c_int,
        piValues: *mut c_int,
        piCount: *mut c_int,
        iFlags: c_int,
    ) -> c_int;
    pub fn meIOStreamStart(pStartList: *mut meIOStreamStart_t, iCount: c_int, iFlags: c_int)
        -> c_int;
    pub fn meIOStreamStop(pStopList: *mut meIOStreamStop_t, iCount: c_int, iFlags: c_int) -> c_int;
    pub fn meIOStreamStatus(
        iDevice: c_int,
        iSubdevice: c_int,
        iWait: c_int,
        piStatus: *mut c_int,
        piCount: *mut c_int,
        iFlags: c_int,
    ) -> c_int;
    pub fn meIOStreamSetCallbacks(
        iDevice: c_int,
        iSubdevice: c_int,
        pStartCB: meIOStreamCB_t,
        pStartCBContext: *mut c_void,
        pNewValuesCB: meIOStreamCB_t,
        pNewValuesCBContext: *mut c_void,
        pEndCB: meIOStreamCB_t,
        pEndCBContext: *mut c_void,
        iFlags: c_int,
    ) -> c_int;
    pub fn meIOStreamTimeToTicks(
        iDevice: c_int,
        iSubdevice: c_int,
        iTimer: c_int,
        pdTime: *mut c_double,
        piTicksLow: *mut c_int,
        piTicksHigh: *mut c_int,
        iFlags: c_int,
    ) -> c_int;
    pub fn meIOStreamFrequencyToTicks(
        iDevice: c_int,
        iSubdevice: c_int,
        iTimer: c_int,
        pdFrequency: *mut c_double,
        piTicksLow: *mut c_int,
        piTicksHigh: *mut c_int,
        iFlags: c_int,
    ) -> c_int;

    // Offsets and single timing

    pub fn meIOSetChannelOffset(
        iDevice: c_int,
        iSubdevice: c_int,
        iChannel: c_int,
        iRange: c_int,
        pdOffset: *mut c_double,
        iFlags: c_int,
    ) -> c_int;
    pub fn meIOSingleTimeToTicks(
        iDevice: c_int,
        iSubdevice: c_int,
        iTimer: c_int,
        pdTime: *mut c_double,
        piTicksLow: *mut c_int,
        piTicksHigh: *mut c_int,
        iFlags: c_int,
    ) -> c_int;
    pub fn meIOSingleTicksToTime(
        iDevice: c_int,
        iSubdevice: c_int,
        iTimer: c_int,
        iTicksLow: c_int,
        iTicksHigh: c_int,
        pdTime: *mut c_double,
        iFlags: c_int,
    ) -> c_int;

    // Queries

    pub fn meQueryDescriptionDevice(
        iDevice: c_int,
        pcDescription: *mut c_char,
        iCount: c_int,
    ) -> c_int;
    pub fn meQueryInfoDevice(
        iDevice: c_int,
        piVendorId: *mut c_int,
        piDeviceId: *mut c_int,
        piSerialNo: *mut c_int,
        piBusType: *mut c_int,
        piBusNo: *mut c_int,
        piDevNo: *mut c_int,
        piFuncNo: *mut c_int,
        piPlugged: *mut c_int,
    ) -> c_int;
    pub fn meQueryNameDevice(iDevice: c_int, pcName: *mut c_char, iCount: c_int) -> c_int;
    pub fn meQueryNameDeviceDriver(iDevice: c_int, pcName: *mut c_char, iCount: c_int) -> c_int;
    pub fn meQueryNumberDevices(piNumber: *mut c_int) -> c_int;
    pub fn meQueryNumberSubdevices(iDevice: c_int, piNumber: *mut c_int) -> c_int;
    pub fn meQueryNumberChannels(iDevice: c_int, iSubdevice: c_int, piNumber: *mut c_int)
        -> c_int;
    pub fn meQueryNumberRanges(
        iDevice: c_int,
        iSubdevice: c_int,
        iUnit: c_int,
        piNumber: *mut c_int,
    ) -> c_int;
    pub fn meQueryRangeByMinMax(
        iDevice: c_int,
        iSubdevice: c_int,
        iUnit: c_int,
        pdMin: *mut c_double,
        pdMax: *mut c_double,
        piMaxData: *mut c_int,
        piRange: *mut c_int,
    ) -> c_int;
    pub fn meQueryRangeInfo(
        iDevice: c_int,
        iSubdevice: c_int,
        iRange: c_int,
        piUnit: *mut c_int,
        pdMin: *mut c_double,
        pdMax: *mut c_double,
        piMaxData: *mut c_int,
    ) -> c_int;
    pub fn meQuerySubdeviceByType(
        iDevice: c_int,
        iStartSubdevice: c_int,
        iType: c_int,
        iSubtype: c_int,
        piSubdevice: *mut c_int,
    ) -> c_int;
    pub fn meQuerySubdeviceType(
        iDevice: c_int,
        iSubdevice: c_int,
        piType: *mut c_int,
        piSubtype: *mut c_int,
    ) -> c_int;
    pub fn meQuerySubdeviceCaps(iDevice: c_int, iSubdevice: c_int, piCaps: *mut c_int) -> c_int;
    pub fn meQuerySubdeviceCapsArgs(
        iDevice: c_int,
        iSubdevice: c_int,
        iCap: c_int,
        piArgs: *mut c_int,
        iCount: c_int,
    ) -> c_int;
    pub fn meQueryVersionLibrary(piVersion: *mut c_int) -> c_int;
    pub fn meQueryVersionMainDriver(piVersion: *mut c_int) -> c_int;
    pub fn meQueryVersionDeviceDriver(iDevice: c_int, piVersion: *mut c_int) -> c_int;

    // Common utilities

    pub fn meUtilityExtractValues(
        iChannel: c_int,
        piAIBuffer: *mut c_int,
        iAIBufferCount: c_int,
        pConfigList: *mut meIOStreamConfig_t,
        iConfigListCount: c_int,
        piChanBuffer: *mut c_int,
        piChanBufferCount: *mut c_int,
    ) -> c_int;
    pub fn meUtilityDigitalToPhysical(
        dMin: c_double,
        dMax: c_double,
        iMaxData: c_int,
        iData: c_int,
        iModuleType: c_int,
        dRefValue: c_double,
        pdPhysical: *mut c_double,
    ) -> c_int;
    pub fn meUtilityDigitalToPhysicalV(
        dMin: c_double,
        dMax: c_double,
        iMaxData: c_int,
        piDataBuffer: *mut c_int,
        iCount: c_int,
        iModuleType: c_int,
        dRefValue: c_double,
        pdPhysicalBuffer: *mut c_double,
    ) -> c_int;
    pub fn meUtilityPhysicalToDigital(
        dMin: c_double,
        dMax: c_double,
        iMaxData: c_int,
        dPhysical: c_double,
        piData: *mut c_int,
    ) -> c_int;
    pub fn meUtilityPhysicalToDigitalV(
        dMin: c_double,
        dMax: c_double,
        iMaxData: c_int,
        pdPhysicalBuffer: *mut c_double,
        iCount: c_int,
        piDataBuffer: *mut c_int,
    ) -> c_int;
    pub fn meUtilityPWMStart(
        iDevice: c_int,
        iSubdevice1: c_int,
        iSubdevice2: c_int,
        iSubdevice3: c_int,
        iRef: c_int,
        iPrescaler: c_int,
        iDutyCycle: c_int,
        iFlag: c_int,
    ) -> c_int;
    pub fn meUtilityPWMStop(iDevice: c_int, iSubdevice1: c_int) -> c_int;
    pub fn meUtilityPWMRestart(
        iDevice: c_int,
        iSubdevice1: c_int,
        iRef: c_int,
        iPrescaler: c_int,
    ) -> c_int;

    // Frequency I/O utilities

    pub fn meUtilityPeriodToTicks(iBaseFreq: c_int, dPeriod: c_double, piTicks: *mut c_uint)
        -> c_int;
    pub fn meUtilityTicksToPeriod(iBaseFreq: c_int, iTicks: c_uint, pdPeriod: *mut c_double)
        -> c_int;
    pub fn meUtilityFrequencyToTicks(
        iBaseFreq: c_int,
        dFrequency: c_double,
        piTicks: *mut c_uint,
    ) -> c_int;
    pub fn meUtilityTicksToFrequency(
        iBaseFreq: c_int,
        iTicks: c_uint,
        pdFrequency: *mut c_double,
    ) -> c_int;
    pub fn meUtilityCodeDivider(dDivider: c_double, piDivider: *mut c_uint) -> c_int;
    pub fn meUtilityDecodeDivider(iDivider: c_uint, pdDivider: *mut c_double) -> c_int;

    // Configuration

    pub fn meConfigLoad(pcConfigFile: *mut c_char) -> c_int;
}
