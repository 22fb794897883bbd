//! Error types for ME-iDS operations.
//!
//! Every driver entry point returns an `ME_ERRNO_*` status. [`ErrorCode`]
//! is the closed set of those statuses, [`MeidsError`] wraps them together
//! with the failures the binding itself can detect before a call is made.

use std::fmt;
use thiserror::Error;

/// Result type alias for ME-iDS operations.
pub type Result<T> = std::result::Result<T, MeidsError>;

/// Status codes returned by the driver library.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,
    InvalidDevice = 1,
    InvalidSubdevice = 2,
    InvalidChannel = 3,
    InvalidSingleConfig = 4,
    InvalidRef = 5,
    InvalidTrigChan = 6,
    InvalidTrigType = 7,
    InvalidTrigEdge = 8,
    InvalidTimeout = 9,
    InvalidFlags = 10,
    Open = 11,
    Close = 12,
    NotOpen = 13,
    InvalidDir = 14,
    PreviousConfig = 15,
    NotSupported = 16,
    SubdeviceType = 17,
    UserBufferSize = 18,
    Locked = 19,
    NoMoreSubdeviceType = 20,
    Timeout = 21,
    Signal = 22,
    InvalidIrqSource = 23,
    ThreadRunning = 24,
    StartThread = 25,
    CancelThread = 26,
    NoCallback = 27,
    Used = 28,
    InvalidUnit = 29,
    InvalidMinMax = 30,
    NoRange = 31,
    InvalidRange = 32,
    SubdeviceBusy = 33,
    InvalidLock = 34,
    InvalidSwitch = 35,
    InvalidErrorMsgCount = 36,
    InvalidStreamConfig = 37,
    InvalidConfigListCount = 38,
    InvalidAcqStartTrigType = 39,
    InvalidAcqStartTrigEdge = 40,
    InvalidAcqStartTrigChan = 41,
    InvalidAcqStartTimeout = 42,
    InvalidAcqStartArg = 43,
    InvalidScanStartTrigType = 44,
    InvalidScanStartArg = 45,
    InvalidConvStartTrigType = 46,
    InvalidConvStartArg = 47,
    InvalidScanStopTrigType = 48,
    InvalidScanStopArg = 49,
    InvalidAcqStopTrigType = 50,
    InvalidAcqStopArg = 51,
    SubdeviceNotRunning = 52,
    InvalidReadMode = 53,
    InvalidValueCount = 54,
    InvalidWriteMode = 55,
    InvalidTimer = 56,
    DeviceUnplugged = 57,
    UsedInternal = 58,
    InvalidDutyCycle = 59,
    InvalidWait = 60,
    ConnectRemote = 61,
    Communication = 62,
    InvalidSingleList = 63,
    InvalidModuleType = 64,
    InvalidStartMode = 65,
    InvalidStopMode = 66,
    InvalidFifoIrqThreshold = 67,
    InvalidPointer = 68,
    CreateEvent = 69,
    LackOfResources = 70,
    Cancelled = 71,
    SoftwareBufferOverflow = 72,
    SoftwareBufferUnderflow = 73,
    InvalidIrqEdge = 74,
    InvalidIrqArg = 75,
    InvalidCap = 76,
    InvalidCapArgCount = 77,
    Internal = 78,
    ValueOutOfRange = 79,
    HardwareBufferOverflow = 80,
    HardwareBufferUnderflow = 81,
    ConfigLoadFailed = 82,
    InvalidErrorNumber = 83,
}

/// Codes in raw order, paired with the library's message text.
const ERROR_TABLE: [(ErrorCode, &str); 84] = [
    (ErrorCode::Success, "Success."),
    (ErrorCode::InvalidDevice, "Invalid device number specified."),
    (ErrorCode::InvalidSubdevice, "Invalid subdevice number specified."),
    (ErrorCode::InvalidChannel, "Invalid channel number specified."),
    (ErrorCode::InvalidSingleConfig, "Invalid single configuration specified."),
    (ErrorCode::InvalidRef, "Invalid reference specified."),
    (ErrorCode::InvalidTrigChan, "Invalid trigger channel specified."),
    (ErrorCode::InvalidTrigType, "Invalid trigger type specified."),
    (ErrorCode::InvalidTrigEdge, "Invalid trigger edge specified."),
    (ErrorCode::InvalidTimeout, "Invalid timeout specified."),
    (ErrorCode::InvalidFlags, "Invalid flags specified."),
    (ErrorCode::Open, "Can't open driver system."),
    (ErrorCode::Close, "Can't close driver system."),
    (ErrorCode::NotOpen, "Driver system was not opened by user process."),
    (ErrorCode::InvalidDir, "Invalid single direction specified."),
    (ErrorCode::PreviousConfig, "Device was not configured for this function."),
    (ErrorCode::NotSupported, "Function not supported by device."),
    (ErrorCode::SubdeviceType, "No such subdevice type available on this device."),
    (ErrorCode::UserBufferSize, "User buffer size is to small to hold name."),
    (ErrorCode::Locked, "The Resource or parts of it is locked by another process."),
    (ErrorCode::NoMoreSubdeviceType, "No more subdevice of this type available."),
    (ErrorCode::Timeout, "Operation timed out."),
    (ErrorCode::Signal, "Operation aborted by signal."),
    (ErrorCode::InvalidIrqSource, "Invalid irq source specified."),
    (ErrorCode::ThreadRunning, "There is a background thread running on this subdevice."),
    (ErrorCode::StartThread, "Cannot start background thread."),
    (ErrorCode::CancelThread, "Cannot cancel background thread."),
    (
        ErrorCode::NoCallback,
        "No callback function for notification on irq or new values specified.",
    ),
    (ErrorCode::Used, "The Resource or parts of it is currently used by another process."),
    (ErrorCode::InvalidUnit, "Invalid physical unit specified."),
    (ErrorCode::InvalidMinMax, "Invalid minimum and maximum values specified specified."),
    (ErrorCode::NoRange, "No matching range found."),
    (ErrorCode::InvalidRange, "Invalid range specified."),
    (ErrorCode::SubdeviceBusy, "Subdevice is busy."),
    (ErrorCode::InvalidLock, "Invalid lock specified."),
    (ErrorCode::InvalidSwitch, "Invalid switch specified."),
    (ErrorCode::InvalidErrorMsgCount, "Error message string is to small."),
    (ErrorCode::InvalidStreamConfig, "Invalid stream configuration specified."),
    (ErrorCode::InvalidConfigListCount, "Invalid stream configuration list count specified."),
    (ErrorCode::InvalidAcqStartTrigType, "Invalid acquisition start trigger type specified."),
    (ErrorCode::InvalidAcqStartTrigEdge, "Invalid acquisition start trigger edge specified."),
    (ErrorCode::InvalidAcqStartTrigChan, "Invalid acquisition start trigger channel specified."),
    (ErrorCode::InvalidAcqStartTimeout, "Invalid acquisition start time out specified."),
    (ErrorCode::InvalidAcqStartArg, "Invalid acquisition start argument specified."),
    (ErrorCode::InvalidScanStartTrigType, "Invalid scan start trigger type specified."),
    (ErrorCode::InvalidScanStartArg, "Invalid scan start argument specified."),
    (ErrorCode::InvalidConvStartTrigType, "Invalid conversion start trigger type specified."),
    (ErrorCode::InvalidConvStartArg, "Invalid conversion start argument specified."),
    (ErrorCode::InvalidScanStopTrigType, "Invalid scan stop trigger type specified."),
    (ErrorCode::InvalidScanStopArg, "Invalid scan stop argument specified."),
    (ErrorCode::InvalidAcqStopTrigType, "Invalid acquisition stop trigger type specified."),
    (ErrorCode::InvalidAcqStopArg, "Invalid acquisition stop argument specified."),
    (ErrorCode::SubdeviceNotRunning, "Subdevice is not running."),
    (ErrorCode::InvalidReadMode, "Invalid read mode specified."),
    (ErrorCode::InvalidValueCount, "Invalid value count specified."),
    (ErrorCode::InvalidWriteMode, "Invalid write mode specified."),
    (ErrorCode::InvalidTimer, "Invalid timer specified."),
    (ErrorCode::DeviceUnplugged, "Device was unplugged."),
    (ErrorCode::UsedInternal, "Subdevice is reserved for internal usage."),
    (ErrorCode::InvalidDutyCycle, "Invalid duty cycle specified."),
    (ErrorCode::InvalidWait, "Invalid wait argument specified."),
    (ErrorCode::ConnectRemote, "Cannot connect to remote host."),
    (ErrorCode::Communication, "Communication error."),
    (ErrorCode::InvalidSingleList, "Invalid single list specified."),
    (ErrorCode::InvalidModuleType, "Invalid module type specified."),
    (ErrorCode::InvalidStartMode, "Invalid start mode specified."),
    (ErrorCode::InvalidStopMode, "Invalid stop mode specified."),
    (ErrorCode::InvalidFifoIrqThreshold, "Invalid fifo irq threshold specified."),
    (ErrorCode::InvalidPointer, "Invalid pointer passed."),
    (ErrorCode::CreateEvent, "Unable to create event."),
    (ErrorCode::LackOfResources, "Insufficient resources."),
    (ErrorCode::Cancelled, "Operation cancelled."),
    (ErrorCode::SoftwareBufferOverflow, "Software buffer overflow."),
    (ErrorCode::SoftwareBufferUnderflow, "Software buffer underflow."),
    (ErrorCode::InvalidIrqEdge, "Invalid irq edge specified."),
    (ErrorCode::InvalidIrqArg, "Invalid irq arg specified."),
    (ErrorCode::InvalidCap, "Invalid capability specified."),
    (ErrorCode::InvalidCapArgCount, "Invalid capability argument count specified."),
    (ErrorCode::Internal, "Internal error occured."),
    (ErrorCode::ValueOutOfRange, "Value out of range."),
    (ErrorCode::HardwareBufferOverflow, "Hardware buffer overflow."),
    (ErrorCode::HardwareBufferUnderflow, "Hardware buffer underflow."),
    (ErrorCode::ConfigLoadFailed, "Loading config to device failed."),
    (ErrorCode::InvalidErrorNumber, "Invalid error number specified."),
];

/// Coarse grouping of [`ErrorCode`]s by what the caller can do about them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The call completed.
    Success,
    /// An argument was rejected; retrying with the same input will fail again.
    InvalidArgument,
    /// The driver, device or subdevice is in the wrong state for the call.
    ResourceState,
    /// A wait ended early (timeout, signal, cancellation).
    Interrupted,
    /// A buffer or value did not fit.
    Capacity,
    /// The device or remote host could not be reached.
    Transport,
    /// The driver failed internally.
    Internal,
}

impl ErrorCode {
    /// All codes in raw order.
    pub fn all() -> impl Iterator<Item = ErrorCode> {
        ERROR_TABLE.iter().map(|(code, _)| *code)
    }

    /// Decode a raw status. Returns `None` for values outside `0..=83`.
    pub fn from_raw(raw: i32) -> Option<Self> {
        usize::try_from(raw)
            .ok()
            .and_then(|index| ERROR_TABLE.get(index))
            .map(|(code, _)| *code)
    }

    /// The raw status value.
    pub const fn to_raw(self) -> i32 {
        self as i32
    }

    /// Whether this is [`ErrorCode::Success`].
    pub const fn is_success(self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Message text as shipped with the driver library.
    pub fn message(self) -> &'static str {
        ERROR_TABLE[self as usize].1
    }

    /// Which [`ErrorClass`] this code belongs to.
    pub fn class(self) -> ErrorClass {
        use ErrorCode::*;
        match self {
            Success => ErrorClass::Success,
            Open | Close | NotOpen | PreviousConfig | NotSupported | SubdeviceType | Locked
            | NoMoreSubdeviceType | ThreadRunning | NoCallback | Used | NoRange
            | SubdeviceBusy | SubdeviceNotRunning | UsedInternal => ErrorClass::ResourceState,
            Timeout | Signal | Cancelled => ErrorClass::Interrupted,
            UserBufferSize | LackOfResources | SoftwareBufferOverflow
            | SoftwareBufferUnderflow | HardwareBufferOverflow | HardwareBufferUnderflow
            | ValueOutOfRange => ErrorClass::Capacity,
            DeviceUnplugged | ConnectRemote | Communication => ErrorClass::Transport,
            StartThread | CancelThread | CreateEvent | Internal | ConfigLoadFailed => {
                ErrorClass::Internal
            }
            _ => ErrorClass::InvalidArgument,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.to_raw())
    }
}

impl TryFrom<i32> for ErrorCode {
    type Error = MeidsError;

    fn try_from(raw: i32) -> Result<Self> {
        Self::from_raw(raw).ok_or(MeidsError::UnknownValue {
            kind: "error code",
            raw,
        })
    }
}

/// Errors that can occur when working with the ME-iDS driver.
#[derive(Error, Debug)]
pub enum MeidsError {
    /// A driver call returned a non-zero status
    #[error("{function} failed: {code}: {}", .code.message())]
    Driver {
        /// Entry point that failed
        function: &'static str,
        /// Status it returned
        code: ErrorCode,
    },

    /// A driver call returned a status outside the known set
    #[error("{function} returned unknown status {raw}")]
    UnknownErrorCode {
        /// Entry point that failed
        function: &'static str,
        /// Status it returned
        raw: i32,
    },

    /// A raw value did not match any member of its constant group
    #[error("Unknown {kind} value {raw:#x}")]
    UnknownValue {
        /// Name of the constant group
        kind: &'static str,
        /// Value that matched no member
        raw: i32,
    },

    /// More trigger arguments than a trigger stage can hold
    #[error("Too many trigger arguments: {count} given, at most {max} allowed")]
    TooManyTriggerArgs {
        /// Arguments given
        count: usize,
        /// Capacity of a stage
        max: usize,
    },

    /// A list is longer than the driver's `int` count can express
    #[error("List of {count} entries is too long for the driver")]
    ListTooLong {
        /// Entries in the list
        count: usize,
    },

    /// A string argument contained an interior NUL byte
    #[error("Invalid string for {what}: contains a NUL byte")]
    InvalidString {
        /// Which argument
        what: &'static str,
    },

    /// Configuration could not be loaded or failed validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// The selected backend cannot perform this operation
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// A blocking driver call run off the async runtime panicked or was
    /// cancelled
    #[error("Blocking driver task failed: {0}")]
    Task(String),
}

impl MeidsError {
    /// Turn a raw status into `Ok(())` or the matching error.
    pub fn check(function: &'static str, status: i32) -> Result<()> {
        match ErrorCode::from_raw(status) {
            Some(ErrorCode::Success) => Ok(()),
            Some(code) => Err(MeidsError::Driver { function, code }),
            None => Err(MeidsError::UnknownErrorCode {
                function,
                raw: status,
            }),
        }
    }

    /// The driver status carried by this error, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            MeidsError::Driver { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Check if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        self.code() == Some(ErrorCode::Timeout)
    }

    /// Check if this error reports a lock held by another process.
    pub fn is_locked(&self) -> bool {
        matches!(self.code(), Some(ErrorCode::Locked | ErrorCode::Used))
    }

    /// Check if the device is gone (unplugged or unreachable).
    pub fn is_device_gone(&self) -> bool {
        self.code().map(ErrorCode::class) == Some(ErrorClass::Transport)
    }

    /// Check if this error reports an exhausted subdevice search.
    pub(crate) fn is_no_more_subdevices(&self) -> bool {
        matches!(
            self.code(),
            Some(ErrorCode::NoMoreSubdeviceType | ErrorCode::SubdeviceType)
        )
    }
}

/// Convert a slice length into the driver's `int` count.
pub(crate) fn list_len(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| MeidsError::ListTooLong { count: len })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_in_raw_order() {
        for (index, (code, _)) in ERROR_TABLE.iter().enumerate() {
            assert_eq!(code.to_raw(), index as i32);
        }
    }

    #[test]
    fn test_table_matches_sys_constants() {
        assert_eq!(ErrorCode::Locked.to_raw(), meids_sys::ME_ERRNO_LOCKED);
        assert_eq!(ErrorCode::Timeout.to_raw(), meids_sys::ME_ERRNO_TIMEOUT);
        assert_eq!(
            ErrorCode::SoftwareBufferUnderflow.to_raw(),
            meids_sys::ME_ERRNO_SOFTWARE_BUFFER_UNDERFLOW
        );
        assert_eq!(
            ErrorCode::InvalidErrorNumber.to_raw(),
            meids_sys::ME_ERRNO_MAX
        );
    }

    #[test]
    fn test_from_raw_bounds() {
        assert_eq!(ErrorCode::from_raw(0), Some(ErrorCode::Success));
        assert_eq!(ErrorCode::from_raw(83), Some(ErrorCode::InvalidErrorNumber));
        assert_eq!(ErrorCode::from_raw(84), None);
        assert_eq!(ErrorCode::from_raw(-1), None);
        assert_eq!(ErrorCode::all().count(), 84);
    }

    #[test]
    fn test_check() {
        assert!(MeidsError::check("meOpen", 0).is_ok());

        let err = MeidsError::check("meIOSingle", meids_sys::ME_ERRNO_TIMEOUT).unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("meIOSingle"));
        assert!(err.to_string().contains("Operation timed out."));

        let err = MeidsError::check("meClose", 999).unwrap_err();
        assert!(matches!(err, MeidsError::UnknownErrorCode { raw: 999, .. }));
    }

    #[test]
    fn test_classes() {
        assert_eq!(ErrorCode::Success.class(), ErrorClass::Success);
        assert_eq!(ErrorCode::InvalidChannel.class(), ErrorClass::InvalidArgument);
        assert_eq!(ErrorCode::Locked.class(), ErrorClass::ResourceState);
        assert_eq!(ErrorCode::Timeout.class(), ErrorClass::Interrupted);
        assert_eq!(ErrorCode::HardwareBufferOverflow.class(), ErrorClass::Capacity);
        assert_eq!(ErrorCode::DeviceUnplugged.class(), ErrorClass::Transport);
        assert_eq!(ErrorCode::Internal.class(), ErrorClass::Internal);
    }

    #[test]
    fn test_predicates() {
        let locked = MeidsError::Driver {
            function: "meLockDevice",
            code: ErrorCode::Locked,
        };
        assert!(locked.is_locked());
        assert!(!locked.is_timeout());

        let gone = MeidsError::Driver {
            function: "meIOSingle",
            code: ErrorCode::Communication,
        };
        assert!(gone.is_device_gone());
    }
}
