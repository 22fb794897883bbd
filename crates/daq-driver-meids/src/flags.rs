//! Flag words for each driver entry point.
//!
//! The library validates flags per function, so each function gets its own
//! type. Bits that are only meaningful on certain hardware are still listed;
//! the driver rejects them with `InvalidFlags` where they do not apply.

// Flag bits are named after the `ME_*` constant they hold.
#![allow(missing_docs)]

use bitflags::bitflags;
use meids_sys as sys;

use crate::codes::SubdeviceType;

bitflags! {
    /// Flags for `meClose`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CloseFlags: i32 {
        /// Close even if other threads still use the driver.
        const FORCE = sys::ME_CLOSE_FORCE;
    }
}

bitflags! {
    /// Flags for `meErrorGetLast`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ErrorQueryFlags: i32 {
        /// Reset the stored error after reading it.
        const CLEAR = sys::ME_ERRNO_CLEAR_FLAGS;
    }
}

bitflags! {
    /// Flags for `meIOResetDevice`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ResetDeviceFlags: i32 {
        /// Reset even subdevices locked by other processes.
        const UNPROTECTED = sys::ME_IO_RESET_DEVICE_UNPROTECTED;
    }
}

bitflags! {
    /// Flags for `meIOIrqStart`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct IrqStartFlags: i32 {
        const DIO_BIT = sys::ME_IO_IRQ_START_DIO_BIT;
        const DIO_BYTE = sys::ME_IO_IRQ_START_DIO_BYTE;
        const DIO_WORD = sys::ME_IO_IRQ_START_DIO_WORD;
        const DIO_DWORD = sys::ME_IO_IRQ_START_DIO_DWORD;
        const PATTERN_FILTERING = sys::ME_IO_IRQ_START_PATTERN_FILTERING;
        const EXTENDED_STATUS = sys::ME_IO_IRQ_START_EXTENDED_STATUS;
    }
}

bitflags! {
    /// Flags for `meIOIrqWait`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct IrqWaitFlags: i32 {
        const NORMAL_STATUS = sys::ME_IO_IRQ_WAIT_NORMAL_STATUS;
        const EXTENDED_STATUS = sys::ME_IO_IRQ_WAIT_EXTENDED_STATUS;
    }
}

bitflags! {
    /// Flags for `meIOSingleConfig`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SingleConfigFlags: i32 {
        const DIO_BIT = sys::ME_IO_SINGLE_CONFIG_DIO_BIT;
        const DIO_BYTE = sys::ME_IO_SINGLE_CONFIG_DIO_BYTE;
        const DIO_WORD = sys::ME_IO_SINGLE_CONFIG_DIO_WORD;
        const DIO_DWORD = sys::ME_IO_SINGLE_CONFIG_DIO_DWORD;
        const MULTISIG_LED_ON = sys::ME_IO_SINGLE_CONFIG_MULTISIG_LED_ON;
        const MULTISIG_LED_OFF = sys::ME_IO_SINGLE_CONFIG_MULTISIG_LED_OFF;
        const AI_RMS = sys::ME_IO_SINGLE_CONFIG_AI_RMS;
        const CONTINUE = sys::ME_IO_SINGLE_CONFIG_CONTINUE;
        const MULTIPIN = sys::ME_IO_SINGLE_CONFIG_MULTIPIN;
        const EXTRA_SHUNT = sys::ME_IO_SINGLE_CONFIG_EXTRA_SHUNT;
        const FREQ_SINGLE_MODE = sys::ME_IO_SINGLE_CONFIG_FREQ_SINGLE_MODE;
        const DONT_SET_BACKGROUND = sys::ME_IO_SINGLE_CONFIG_DONT_SET_BACKGROUND;
        const POLLING_MODE = sys::ME_IO_SINGLE_CONFIG_POLLING_MODE;
    }
}

bitflags! {
    /// Call-level flags for `meIOSingle`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SingleFlags: i32 {
        const NONBLOCKING = sys::ME_IO_SINGLE_NONBLOCKING;
    }
}

bitflags! {
    /// Per-record flags in a single I/O list entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SingleTypeFlags: i32 {
        const DIO_BIT = sys::ME_IO_SINGLE_TYPE_DIO_BIT;
        const DIO_BYTE = sys::ME_IO_SINGLE_TYPE_DIO_BYTE;
        const DIO_WORD = sys::ME_IO_SINGLE_TYPE_DIO_WORD;
        const DIO_DWORD = sys::ME_IO_SINGLE_TYPE_DIO_DWORD;
        const TRIG_SYNCHRONOUS = sys::ME_IO_SINGLE_TYPE_TRIG_SYNCHRONOUS;
        const NONBLOCKING = sys::ME_IO_SINGLE_TYPE_NONBLOCKING;
        const FREQ_DIVIDER = sys::ME_IO_SINGLE_TYPE_FREQ_DIVIDER;
        const FREQ_START_LOW = sys::ME_IO_SINGLE_TYPE_FREQ_START_LOW;
        const FREQ_START_SOFT = sys::ME_IO_SINGLE_TYPE_FREQ_START_SOFT;
        /// Frequency input: return the last measured value.
        const FREQ_LAST_VALUE = sys::ME_IO_SINGLE_TYPE_FREQ_LAST_VALUE;
        /// Frequency output: same bit as `FREQ_LAST_VALUE`.
        const FREQ_UPDATE_ONLY = sys::ME_IO_SINGLE_TYPE_FREQ_UPDATE_ONLY;
        const FIO_TICKS_TOTAL = sys::ME_IO_SINGLE_TYPE_FIO_TICKS_TOTAL;
        const FIO_TICKS_FIRST_PHASE = sys::ME_IO_SINGLE_TYPE_FIO_TICKS_FIRST_PHASE;
    }
}

bitflags! {
    /// Per-entry flags in a stream configuration list.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StreamConfigFlags: i32 {
        const BIT_PATTERN = sys::ME_IO_STREAM_CONFIG_BIT_PATTERN;
        const WRAPAROUND = sys::ME_IO_STREAM_CONFIG_WRAPAROUND;
        const SAMPLE_AND_HOLD = sys::ME_IO_STREAM_CONFIG_SAMPLE_AND_HOLD;
        const HARDWARE_ONLY = sys::ME_IO_STREAM_CONFIG_HARDWARE_ONLY;
    }
}

bitflags! {
    /// Flags for `meIOStreamRead`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StreamReadFlags: i32 {
        /// Only return complete scans.
        const FRAMES = sys::ME_IO_STREAM_READ_FRAMES;
    }
}

bitflags! {
    /// Call-level flags for `meIOStreamStart`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StreamStartFlags: i32 {
        const NONBLOCKING = sys::ME_IO_STREAM_START_NONBLOCKING;
    }
}

bitflags! {
    /// Per-entry flags in a stream start list.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StreamStartTypeFlags: i32 {
        const TRIG_SYNCHRONOUS = sys::ME_IO_STREAM_START_TYPE_TRIG_SYNCHRONOUS;
    }
}

bitflags! {
    /// Call-level flags for `meIOStreamStop`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StreamStopFlags: i32 {
        const NONBLOCKING = sys::ME_IO_STREAM_STOP_NONBLOCKING;
    }
}

bitflags! {
    /// Per-entry flags in a stream stop list.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StreamStopTypeFlags: i32 {
        /// Keep already acquired values readable after the stop.
        const PRESERVE_BUFFERS = sys::ME_IO_STREAM_STOP_TYPE_PRESERVE_BUFFERS;
    }
}

bitflags! {
    /// Flags for the time/frequency to ticks conversions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TicksFlags: i32 {
        const MEPHISTO_SCOPE_OSCILLOSCOPE = sys::ME_IO_TIME_TO_TICKS_MEPHISTO_SCOPE_OSCILLOSCOPE;
    }
}

bitflags! {
    /// Flags for `meUtilityPWMStart`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PwmStartFlags: i32 {
        /// Feed the prescaler from the internal clock of the first counter.
        const CONNECT_INTERNAL = sys::ME_PWM_START_CONNECT_INTERNAL;
    }
}

bitflags! {
    /// Capability bits from `meQuerySubdeviceCaps`.
    ///
    /// Bit meanings depend on the subdevice type, so several names share a
    /// value; check the names that match the subdevice you queried.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SubdeviceCaps: i32 {
        const TRIG_DIGITAL = sys::ME_CAPS_TRIG_DIGITAL;
        const TRIG_ANALOG = sys::ME_CAPS_TRIG_ANALOG;
        const TRIG_EDGE_RISING = sys::ME_CAPS_TRIG_EDGE_RISING;
        const TRIG_EDGE_FALLING = sys::ME_CAPS_TRIG_EDGE_FALLING;
        const TRIG_EDGE_ANY = sys::ME_CAPS_TRIG_EDGE_ANY;

        const DIO_DIR_BIT = sys::ME_CAPS_DIO_DIR_BIT;
        const DIO_DIR_BYTE = sys::ME_CAPS_DIO_DIR_BYTE;
        const DIO_DIR_WORD = sys::ME_CAPS_DIO_DIR_WORD;
        const DIO_DIR_DWORD = sys::ME_CAPS_DIO_DIR_DWORD;
        const DIO_SINK_SOURCE = sys::ME_CAPS_DIO_SINK_SOURCE;
        const DIO_BIT_PATTERN_IRQ = sys::ME_CAPS_DIO_BIT_PATTERN_IRQ;
        const DIO_BIT_MASK_IRQ_EDGE_RISING = sys::ME_CAPS_DIO_BIT_MASK_IRQ_EDGE_RISING;
        const DIO_BIT_MASK_IRQ_EDGE_FALLING = sys::ME_CAPS_DIO_BIT_MASK_IRQ_EDGE_FALLING;
        const DIO_BIT_MASK_IRQ_EDGE_ANY = sys::ME_CAPS_DIO_BIT_MASK_IRQ_EDGE_ANY;
        const DIO_OVER_TEMP_IRQ = sys::ME_CAPS_DIO_OVER_TEMP_IRQ;
        const DIO_TRIG_SYNCHRONOUS = sys::ME_CAPS_DIO_TRIG_SYNCHRONOUS;

        const CTR_CLK_PREVIOUS = sys::ME_CAPS_CTR_CLK_PREVIOUS;
        const CTR_CLK_INTERNAL_1MHZ = sys::ME_CAPS_CTR_CLK_INTERNAL_1MHZ;
        const CTR_CLK_INTERNAL_10MHZ = sys::ME_CAPS_CTR_CLK_INTERNAL_10MHZ;
        const CTR_CLK_EXTERNAL = sys::ME_CAPS_CTR_CLK_EXTERNAL;

        const AI_TRIG_SYNCHRONOUS = sys::ME_CAPS_AI_TRIG_SYNCHRONOUS;
        const AI_FIFO = sys::ME_CAPS_AI_FIFO;
        const AI_FIFO_THRESHOLD = sys::ME_CAPS_AI_FIFO_THRESHOLD;
        const AI_SAMPLE_HOLD = sys::ME_CAPS_AI_SAMPLE_HOLD;
        const AI_DIFFERENTIAL = sys::ME_CAPS_AI_DIFFERENTIAL;

        const AO_TRIG_SYNCHRONOUS = sys::ME_CAPS_AO_TRIG_SYNCHRONOUS;
        const AO_FIFO = sys::ME_CAPS_AO_FIFO;
        const AO_FIFO_THRESHOLD = sys::ME_CAPS_AO_FIFO_THRESHOLD;
        const AO_DIFFERENTIAL = sys::ME_CAPS_AO_DIFFERENTIAL;

        const EXT_IRQ_EDGE_RISING = sys::ME_CAPS_EXT_IRQ_EDGE_RISING;
        const EXT_IRQ_EDGE_FALLING = sys::ME_CAPS_EXT_IRQ_EDGE_FALLING;
        const EXT_IRQ_EDGE_ANY = sys::ME_CAPS_EXT_IRQ_EDGE_ANY;

        const FPGA_BUSS_BIT = sys::ME_CAPS_FPGA_BUSS_BIT;
        const FPGA_BUSS_BYTE = sys::ME_CAPS_FPGA_BUSS_BYTE;
        const FPGA_BUSS_WORD = sys::ME_CAPS_FPGA_BUSS_WORD;
        const FPGA_BUSS_DWORD = sys::ME_CAPS_FPGA_BUSS_DWORD;
        const FPGA_IN_FIFO = sys::ME_CAPS_FPGA_IN_FIFO;
        const FPGA_OUT_FIFO = sys::ME_CAPS_FPGA_OUT_FIFO;
    }
}

bitflags! {
    /// A set of subdevice types for the filtered count and check queries.
    ///
    /// Frequency I/O and FPGA subdevices have no bit and never match.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SubdeviceTypes: u8 {
        const DI = 1 << 0;
        const DO = 1 << 1;
        const DIO = 1 << 2;
        const AI = 1 << 3;
        const AO = 1 << 4;
        const CTR = 1 << 5;
        const EXT_IRQ = 1 << 6;
    }
}

impl SubdeviceTypes {
    /// Whether `kind` is one of the types in the set.
    pub fn matches(self, kind: SubdeviceType) -> bool {
        let bit = match kind {
            SubdeviceType::DigitalInput => Self::DI,
            SubdeviceType::DigitalOutput => Self::DO,
            SubdeviceType::DigitalIo => Self::DIO,
            SubdeviceType::AnalogInput => Self::AI,
            SubdeviceType::AnalogOutput => Self::AO,
            SubdeviceType::Counter => Self::CTR,
            SubdeviceType::ExtIrq => Self::EXT_IRQ,
            _ => return false,
        };
        self.contains(bit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_flags_are_no_flags() {
        assert_eq!(CloseFlags::empty().bits(), sys::ME_CLOSE_NO_FLAGS);
        assert_eq!(SingleTypeFlags::default().bits(), sys::ME_IO_SINGLE_TYPE_NO_FLAGS);
        assert_eq!(StreamConfigFlags::empty().bits(), sys::ME_IO_STREAM_CONFIG_NO_FLAGS);
    }

    #[test]
    fn test_shared_bits() {
        assert_eq!(
            SingleTypeFlags::FREQ_LAST_VALUE.bits(),
            SingleTypeFlags::FREQ_UPDATE_ONLY.bits()
        );
        assert_eq!(SubdeviceCaps::AI_FIFO.bits(), SubdeviceCaps::DIO_DIR_BYTE.bits());
    }

    #[test]
    fn test_subdevice_type_sets() {
        let analog = SubdeviceTypes::AI | SubdeviceTypes::AO;
        assert!(analog.matches(SubdeviceType::AnalogInput));
        assert!(analog.matches(SubdeviceType::AnalogOutput));
        assert!(!analog.matches(SubdeviceType::DigitalIo));
        assert!(!SubdeviceTypes::all().matches(SubdeviceType::Fpga));
        assert!(!SubdeviceTypes::all().matches(SubdeviceType::FrequencyInput));
        assert!(!SubdeviceTypes::empty().matches(SubdeviceType::Counter));
    }

    #[test]
    fn test_unknown_bits_survive() {
        let caps = SubdeviceCaps::from_bits_retain(0x4000_0000);
        assert_eq!(caps.bits(), 0x4000_0000);
    }
}
