//! Typed views of the driver's integer constant groups.
//!
//! Each enum converts losslessly to the raw `int` the library expects and
//! back; unknown raw values are reported as
//! [`MeidsError::UnknownValue`](crate::MeidsError::UnknownValue) instead of
//! being guessed.

use crate::error::{MeidsError, Result};
use meids_sys as sys;

macro_rules! raw_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident = $raw:path ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        // Variants are named after the `ME_*` constant they hold.
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every member of the group.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Decode a raw driver value.
            pub fn from_raw(raw: i32) -> Option<Self> {
                match raw {
                    $( $raw => Some($name::$variant), )+
                    _ => None,
                }
            }

            /// The raw driver value.
            pub const fn to_raw(self) -> i32 {
                match self {
                    $( $name::$variant => $raw, )+
                }
            }
        }

        impl TryFrom<i32> for $name {
            type Error = MeidsError;

            fn try_from(raw: i32) -> Result<Self> {
                Self::from_raw(raw).ok_or(MeidsError::UnknownValue { kind: $kind, raw })
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> i32 {
                value.to_raw()
            }
        }
    };
}

raw_enum! {
    /// Lock operation for driver, device and subdevice locks.
    pub enum LockMode("lock mode") {
        Release = sys::ME_LOCK_RELEASE,
        Set = sys::ME_LOCK_SET,
        Check = sys::ME_LOCK_CHECK,
    }
}

raw_enum! {
    /// On/off switch for the library's default error procedure.
    pub enum ErrorSwitch("switch") {
        Disable = sys::ME_SWITCH_DISABLE,
        Enable = sys::ME_SWITCH_ENABLE,
    }
}

raw_enum! {
    /// Signal reference or clock source.
    pub enum Reference("reference") {
        None = sys::ME_REF_NONE,
        DioFifoLow = sys::ME_REF_DIO_FIFO_LOW,
        DioFifoHigh = sys::ME_REF_DIO_FIFO_HIGH,
        CtrPrevious = sys::ME_REF_CTR_PREVIOUS,
        CtrInternal1Mhz = sys::ME_REF_CTR_INTERNAL_1MHZ,
        CtrInternal10Mhz = sys::ME_REF_CTR_INTERNAL_10MHZ,
        CtrExternal = sys::ME_REF_CTR_EXTERNAL,
        AiGround = sys::ME_REF_AI_GROUND,
        AiDifferential = sys::ME_REF_AI_DIFFERENTIAL,
        AoGround = sys::ME_REF_AO_GROUND,
        AoDifferential = sys::ME_REF_AO_DIFFERENTIAL,
    }
}

raw_enum! {
    /// Which trigger line a single I/O waits on.
    pub enum TriggerChannel("trigger channel") {
        None = sys::ME_TRIG_CHAN_NONE,
        Default = sys::ME_TRIG_CHAN_DEFAULT,
        Synchronous = sys::ME_TRIG_CHAN_SYNCHRONOUS,
    }
}

raw_enum! {
    /// Trigger source for single I/O and every stream trigger stage.
    pub enum TriggerType("trigger type") {
        None = sys::ME_TRIG_TYPE_NONE,
        Software = sys::ME_TRIG_TYPE_SW,
        Threshold = sys::ME_TRIG_TYPE_THRESHOLD,
        Window = sys::ME_TRIG_TYPE_WINDOW,
        Edge = sys::ME_TRIG_TYPE_EDGE,
        Slope = sys::ME_TRIG_TYPE_SLOPE,
        ExtDigital = sys::ME_TRIG_TYPE_EXT_DIGITAL,
        ExtAnalog = sys::ME_TRIG_TYPE_EXT_ANALOG,
        Pattern = sys::ME_TRIG_TYPE_PATTERN,
        Timer = sys::ME_TRIG_TYPE_TIMER,
        Count = sys::ME_TRIG_TYPE_COUNT,
        Follow = sys::ME_TRIG_TYPE_FOLLOW,
    }
}

raw_enum! {
    /// Trigger edge or level condition.
    pub enum TriggerEdge("trigger edge") {
        None = sys::ME_TRIG_EDGE_NONE,
        Above = sys::ME_TRIG_EDGE_ABOVE,
        Below = sys::ME_TRIG_EDGE_BELOW,
        Entry = sys::ME_TRIG_EDGE_ENTRY,
        Exit = sys::ME_TRIG_EDGE_EXIT,
        Rising = sys::ME_TRIG_EDGE_RISING,
        Falling = sys::ME_TRIG_EDGE_FALLING,
        Any = sys::ME_TRIG_EDGE_ANY,
    }
}

raw_enum! {
    /// Hardware timer selector for time/frequency to tick conversion.
    pub enum Timer("timer") {
        AcqStart = sys::ME_TIMER_ACQ_START,
        ScanStart = sys::ME_TIMER_SCAN_START,
        ConvStart = sys::ME_TIMER_CONV_START,
        FioTotal = sys::ME_TIMER_FIO_TOTAL,
        FioFirstPhase = sys::ME_TIMER_FIO_FIRST_PHASE,
    }
}

raw_enum! {
    /// Interrupt source.
    pub enum IrqSource("irq source") {
        DioDefault = sys::ME_IRQ_SOURCE_DIO_DEFAULT,
        DioPattern = sys::ME_IRQ_SOURCE_DIO_PATTERN,
        DioMask = sys::ME_IRQ_SOURCE_DIO_MASK,
        DioLine = sys::ME_IRQ_SOURCE_DIO_LINE,
        DioOverTemp = sys::ME_IRQ_SOURCE_DIO_OVER_TEMP,
        HighCurrent = sys::ME_IRQ_SOURCE_HIGH_CURRENT,
    }
}

raw_enum! {
    /// Interrupt edge.
    pub enum IrqEdge("irq edge") {
        NotUsed = sys::ME_IRQ_EDGE_NOT_USED,
        Rising = sys::ME_IRQ_EDGE_RISING,
        Falling = sys::ME_IRQ_EDGE_FALLING,
        Any = sys::ME_IRQ_EDGE_ANY,
    }
}

raw_enum! {
    /// Named single-I/O configurations for digital, frequency and counter subdevices.
    pub enum SingleConfigMode("single config") {
        DioInput = sys::ME_SINGLE_CONFIG_DIO_INPUT,
        DioOutput = sys::ME_SINGLE_CONFIG_DIO_OUTPUT,
        DioHighImpedance = sys::ME_SINGLE_CONFIG_DIO_HIGH_IMPEDANCE,
        DioSink = sys::ME_SINGLE_CONFIG_DIO_SINK,
        DioSource = sys::ME_SINGLE_CONFIG_DIO_SOURCE,
        DioMux32M = sys::ME_SINGLE_CONFIG_DIO_MUX32M,
        DioDemux32 = sys::ME_SINGLE_CONFIG_DIO_DEMUX32,
        DioBitPattern = sys::ME_SINGLE_CONFIG_DIO_BIT_PATTERN,
        MultipinIrq = sys::ME_SINGLE_CONFIG_MULTIPIN_IRQ,
        MultipinClk = sys::ME_SINGLE_CONFIG_MULTIPIN_CLK,
        FioInputLinux = sys::ME_SINGLE_CONFIG_FIO_INPUT_LINUX,
        FioOutputLinux = sys::ME_SINGLE_CONFIG_FIO_OUTPUT_LINUX,
        FioInput = sys::ME_SINGLE_CONFIG_FIO_INPUT,
        FioOutput = sys::ME_SINGLE_CONFIG_FIO_OUTPUT,
        Ctr8254Disable = sys::ME_SINGLE_CONFIG_CTR_8254_MODE_DISABLE,
        /// Interrupt on terminal count.
        Ctr8254Mode0 = sys::ME_SINGLE_CONFIG_CTR_8254_MODE_0,
        /// Hardware retriggerable one-shot.
        Ctr8254Mode1 = sys::ME_SINGLE_CONFIG_CTR_8254_MODE_1,
        /// Rate generator.
        Ctr8254Mode2 = sys::ME_SINGLE_CONFIG_CTR_8254_MODE_2,
        /// Square wave.
        Ctr8254Mode3 = sys::ME_SINGLE_CONFIG_CTR_8254_MODE_3,
        /// Software triggered strobe.
        Ctr8254Mode4 = sys::ME_SINGLE_CONFIG_CTR_8254_MODE_4,
        /// Hardware triggered strobe.
        Ctr8254Mode5 = sys::ME_SINGLE_CONFIG_CTR_8254_MODE_5,
    }
}

/// The `iSingleConfig` argument of `meIOSingleConfig`.
///
/// Analog subdevices take a range index here; everything else takes one of
/// the named [`SingleConfigMode`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SingleConfig {
    /// Range index for analog input/output.
    Range(i32),
    /// Named mode for digital, frequency and counter subdevices.
    Mode(SingleConfigMode),
}

impl SingleConfig {
    /// Decode a raw value; anything that is not a named mode is a range index.
    pub fn from_raw(raw: i32) -> Self {
        SingleConfigMode::from_raw(raw)
            .map(SingleConfig::Mode)
            .unwrap_or(SingleConfig::Range(raw))
    }

    /// The raw driver value.
    pub const fn to_raw(self) -> i32 {
        match self {
            SingleConfig::Range(index) => index,
            SingleConfig::Mode(mode) => mode.to_raw(),
        }
    }
}

impl From<SingleConfigMode> for SingleConfig {
    fn from(mode: SingleConfigMode) -> Self {
        SingleConfig::Mode(mode)
    }
}

raw_enum! {
    /// Direction of a single I/O record.
    pub enum Direction("direction") {
        Input = sys::ME_DIR_INPUT,
        Output = sys::ME_DIR_OUTPUT,
        SetOffset = sys::ME_DIR_SET_OFFSET,
    }
}

raw_enum! {
    /// Blocking behaviour of `meIOStreamRead`.
    pub enum ReadMode("read mode") {
        Blocking = sys::ME_READ_MODE_BLOCKING,
        NonBlocking = sys::ME_READ_MODE_NONBLOCKING,
    }
}

raw_enum! {
    /// Blocking behaviour of `meIOStreamWrite`.
    pub enum WriteMode("write mode") {
        Blocking = sys::ME_WRITE_MODE_BLOCKING,
        NonBlocking = sys::ME_WRITE_MODE_NONBLOCKING,
        /// Fill the output buffer before the stream is started.
        Preload = sys::ME_WRITE_MODE_PRELOAD,
    }
}

raw_enum! {
    /// Whether `meIOStreamStart` waits for the start trigger.
    pub enum StartMode("start mode") {
        Blocking = sys::ME_START_MODE_BLOCKING,
        NonBlocking = sys::ME_START_MODE_NONBLOCKING,
    }
}

raw_enum! {
    /// How a running stream is stopped.
    pub enum StopMode("stop mode") {
        Immediate = sys::ME_STOP_MODE_IMMEDIATE,
        LastValue = sys::ME_STOP_MODE_LAST_VALUE,
    }
}

raw_enum! {
    /// What `meIOStreamStatus` waits for before returning.
    pub enum WaitMode("wait mode") {
        None = sys::ME_WAIT_NONE,
        Idle = sys::ME_WAIT_IDLE,
        Busy = sys::ME_WAIT_BUSY,
    }
}

raw_enum! {
    /// Stream state as reported by `meIOStreamStatus`.
    pub enum StreamStatus("stream status") {
        Invalid = sys::ME_STATUS_INVALID,
        Idle = sys::ME_STATUS_IDLE,
        Busy = sys::ME_STATUS_BUSY,
        Error = sys::ME_STATUS_ERROR,
    }
}

raw_enum! {
    /// Signal conditioning module attached to a MultiSig channel.
    pub enum ModuleType("module type") {
        None = sys::ME_MODULE_TYPE_MULTISIG_NONE,
        Diff16_10V = sys::ME_MODULE_TYPE_MULTISIG_DIFF16_10V,
        Diff16_20V = sys::ME_MODULE_TYPE_MULTISIG_DIFF16_20V,
        Diff16_50V = sys::ME_MODULE_TYPE_MULTISIG_DIFF16_50V,
        Current16_0_20mA = sys::ME_MODULE_TYPE_MULTISIG_CURRENT16_0_20MA,
        Rtd8Pt100 = sys::ME_MODULE_TYPE_MULTISIG_RTD8_PT100,
        Rtd8Pt500 = sys::ME_MODULE_TYPE_MULTISIG_RTD8_PT500,
        Rtd8Pt1000 = sys::ME_MODULE_TYPE_MULTISIG_RTD8_PT1000,
        Te8TypeB = sys::ME_MODULE_TYPE_MULTISIG_TE8_TYPE_B,
        Te8TypeE = sys::ME_MODULE_TYPE_MULTISIG_TE8_TYPE_E,
        Te8TypeJ = sys::ME_MODULE_TYPE_MULTISIG_TE8_TYPE_J,
        Te8TypeK = sys::ME_MODULE_TYPE_MULTISIG_TE8_TYPE_K,
        Te8TypeN = sys::ME_MODULE_TYPE_MULTISIG_TE8_TYPE_N,
        Te8TypeR = sys::ME_MODULE_TYPE_MULTISIG_TE8_TYPE_R,
        Te8TypeS = sys::ME_MODULE_TYPE_MULTISIG_TE8_TYPE_S,
        Te8TypeT = sys::ME_MODULE_TYPE_MULTISIG_TE8_TYPE_T,
        Te8TempSensor = sys::ME_MODULE_TYPE_MULTISIG_TE8_TEMP_SENSOR,
    }
}

impl ModuleType {
    /// Whether conversion needs the library's RTD or thermocouple tables.
    pub fn needs_lookup_table(self) -> bool {
        !matches!(
            self,
            ModuleType::None
                | ModuleType::Diff16_10V
                | ModuleType::Diff16_20V
                | ModuleType::Diff16_50V
                | ModuleType::Current16_0_20mA
                | ModuleType::Te8TempSensor
        )
    }
}

raw_enum! {
    /// Selector for `meQuerySubdeviceCapsArgs`.
    pub enum Capability("capability") {
        AiFifoSize = sys::ME_CAP_AI_FIFO_SIZE,
        AiBufferSize = sys::ME_CAP_AI_BUFFER_SIZE,
        AiChannelListSize = sys::ME_CAP_AI_CHANNEL_LIST_SIZE,
        AiMaxThresholdSize = sys::ME_CAP_AI_MAX_THRESHOLD_SIZE,
        AoFifoSize = sys::ME_CAP_AO_FIFO_SIZE,
        AoBufferSize = sys::ME_CAP_AO_BUFFER_SIZE,
        AoChannelListSize = sys::ME_CAP_AO_CHANNEL_LIST_SIZE,
        AoMaxThresholdSize = sys::ME_CAP_AO_MAX_THRESHOLD_SIZE,
        CtrWidth = sys::ME_CAP_CTR_WIDTH,
        FpgaInFifoSize = sys::ME_CAP_FPGA_IN_FIFO_SIZE,
        FpgaInBufferSize = sys::ME_CAP_FPGA_IN_BUFFER_SIZE,
        FpgaOutFifoSize = sys::ME_CAP_FPGA_OUT_FIFO_SIZE,
        FpgaOutBufferSize = sys::ME_CAP_FPGA_OUT_BUFFER_SIZE,
    }
}

raw_enum! {
    /// Physical unit of a range.
    pub enum Unit("unit") {
        Invalid = sys::ME_UNIT_INVALID,
        Volt = sys::ME_UNIT_VOLT,
        Ampere = sys::ME_UNIT_AMPERE,
        Any = sys::ME_UNIT_ANY,
        Hertz = sys::ME_UNIT_Hz,
    }
}

impl Unit {
    /// Short symbol for display.
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Volt => "V",
            Unit::Ampere => "A",
            Unit::Hertz => "Hz",
            Unit::Any | Unit::Invalid => "",
        }
    }
}

raw_enum! {
    /// Subdevice function.
    pub enum SubdeviceType("subdevice type") {
        Invalid = sys::ME_TYPE_INVALID,
        AnalogOutput = sys::ME_TYPE_AO,
        AnalogInput = sys::ME_TYPE_AI,
        DigitalIo = sys::ME_TYPE_DIO,
        DigitalOutput = sys::ME_TYPE_DO,
        DigitalInput = sys::ME_TYPE_DI,
        Counter = sys::ME_TYPE_CTR,
        ExtIrq = sys::ME_TYPE_EXT_IRQ,
        FrequencyIo = sys::ME_TYPE_FREQ_IO,
        FrequencyOutput = sys::ME_TYPE_FREQ_O,
        FrequencyInput = sys::ME_TYPE_FREQ_I,
        Fpga = sys::ME_TYPE_FPGA,
    }
}

impl SubdeviceType {
    /// Short name for listings.
    pub fn short_name(self) -> &'static str {
        match self {
            SubdeviceType::Invalid => "invalid",
            SubdeviceType::AnalogOutput => "AO",
            SubdeviceType::AnalogInput => "AI",
            SubdeviceType::DigitalIo => "DIO",
            SubdeviceType::DigitalOutput => "DO",
            SubdeviceType::DigitalInput => "DI",
            SubdeviceType::Counter => "CTR",
            SubdeviceType::ExtIrq => "EXT_IRQ",
            SubdeviceType::FrequencyIo => "FIO",
            SubdeviceType::FrequencyOutput => "FO",
            SubdeviceType::FrequencyInput => "FI",
            SubdeviceType::Fpga => "FPGA",
        }
    }
}

raw_enum! {
    /// Subdevice variant within its type.
    pub enum SubdeviceSubtype("subdevice subtype") {
        Invalid = sys::ME_SUBTYPE_INVALID,
        Single = sys::ME_SUBTYPE_SINGLE,
        Streaming = sys::ME_SUBTYPE_STREAMING,
        Ctr8254 = sys::ME_SUBTYPE_CTR_8254,
        Any = sys::ME_SUBTYPE_ANY,
        Counter = sys::ME_SUBTYPE_CTR,
    }
}

raw_enum! {
    /// Bus a device is attached through.
    pub enum BusType("bus type") {
        Invalid = sys::ME_BUS_TYPE_INVALID,
        Any = sys::ME_BUS_TYPE_ANY,
        Pci = sys::ME_BUS_TYPE_PCI,
        Usb = sys::ME_BUS_TYPE_USB,
        LanPci = sys::ME_BUS_TYPE_LAN_PCI,
        LanUsb = sys::ME_BUS_TYPE_LAN_USB,
    }
}

raw_enum! {
    /// Whether a known device is currently present.
    pub enum PluggedState("plugged state") {
        Invalid = sys::ME_PLUGGED_INVALID,
        Any = sys::ME_PLUGGED_ANY,
        In = sys::ME_PLUGGED_IN,
        Out = sys::ME_PLUGGED_OUT,
    }
}

raw_enum! {
    /// Multiplexer extension attached to a digital port.
    pub enum ExtensionType("extension type") {
        Invalid = sys::ME_EXTENSION_TYPE_INVALID,
        None = sys::ME_EXTENSION_TYPE_NONE,
        Mux32M = sys::ME_EXTENSION_TYPE_MUX32M,
        Demux32 = sys::ME_EXTENSION_TYPE_DEMUX32,
        Mux32S = sys::ME_EXTENSION_TYPE_MUX32S,
    }
}

raw_enum! {
    /// Local or remote device access.
    pub enum AccessType("access type") {
        Invalid = sys::ME_ACCESS_TYPE_INVALID,
        Any = sys::ME_ACCESS_TYPE_ANY,
        Local = sys::ME_ACCESS_TYPE_LOCAL,
        Remote = sys::ME_ACCESS_TYPE_REMOTE,
    }
}

raw_enum! {
    /// Well-known ranges resolved to a device range index by
    /// [`MeidsSystem::predefined_range`](crate::MeidsSystem::predefined_range).
    pub enum PredefinedRange("predefined range") {
        Unipolar10V = sys::ME_RANGE_UNIPOLAR_10V,
        Bipolar10V = sys::ME_RANGE_BIPOLAR_10V,
        Unipolar2_5V = sys::ME_RANGE_UNIPOLAR_2_5V,
        Bipolar2_5V = sys::ME_RANGE_BIPOLAR_2_5V,
        Current0_20mA = sys::ME_RANGE_0_20mA,
        Current4_20mA = sys::ME_RANGE_4_20mA,
        Unipolar50V = sys::ME_RANGE_UNIPOLAR_50V,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_member_round_trips() {
        for kind in SubdeviceType::ALL {
            assert_eq!(SubdeviceType::from_raw(kind.to_raw()), Some(*kind));
        }
        for module in ModuleType::ALL {
            assert_eq!(ModuleType::try_from(module.to_raw()).ok(), Some(*module));
        }
    }

    #[test]
    fn test_unknown_value_is_error() {
        let err = TriggerType::try_from(0x1234).unwrap_err();
        assert!(matches!(
            err,
            MeidsError::UnknownValue {
                kind: "trigger type",
                raw: 0x1234
            }
        ));
        assert_eq!(Direction::from_raw(0), None);
    }

    #[test]
    fn test_frequency_types_use_long_names() {
        assert_eq!(SubdeviceType::FrequencyInput.to_raw(), sys::ME_TYPE_FREQ_I);
        assert_eq!(SubdeviceType::FrequencyOutput.to_raw(), sys::ME_TYPE_FREQ_O);
        assert_eq!(SubdeviceType::FrequencyIo.short_name(), "FIO");
    }

    #[test]
    fn test_single_config_range_vs_mode() {
        assert_eq!(SingleConfig::from_raw(0), SingleConfig::Range(0));
        assert_eq!(SingleConfig::from_raw(3), SingleConfig::Range(3));
        assert_eq!(
            SingleConfig::from_raw(sys::ME_SINGLE_CONFIG_DIO_OUTPUT),
            SingleConfig::Mode(SingleConfigMode::DioOutput)
        );
        let config: SingleConfig = SingleConfigMode::Ctr8254Mode3.into();
        assert_eq!(config.to_raw(), sys::ME_SINGLE_CONFIG_CTR_8254_MODE_SQUARE_WAVE);
    }

    #[test]
    fn test_predefined_ranges_keep_high_bits() {
        assert_eq!(PredefinedRange::Bipolar10V.to_raw() as u32, 0xEA540002);
        assert_eq!(
            PredefinedRange::from_raw(sys::ME_RANGE_4_20mA),
            Some(PredefinedRange::Current4_20mA)
        );
    }

    #[test]
    fn test_module_lookup_table_split() {
        assert!(!ModuleType::Diff16_20V.needs_lookup_table());
        assert!(!ModuleType::Te8TempSensor.needs_lookup_table());
        assert!(ModuleType::Rtd8Pt100.needs_lookup_table());
        assert!(ModuleType::Te8TypeK.needs_lookup_table());
    }
}
