//! Numeric constants from the ME-iDS headers, grouped by function area.

use libc::c_int;

// Generic values

pub const ME_VALUE_NOT_USED: c_int = 0x0;
pub const ME_VALUE_DEFAULT: c_int = 0x0;
pub const ME_NO_FLAGS: c_int = 0x0;
pub const ME_VALUE_INVALID: c_int = !0x0;

// Locking

pub const ME_LOCK_RELEASE: c_int = 0x00010001;
pub const ME_LOCK_SET: c_int = 0x00010002;
pub const ME_LOCK_CHECK: c_int = 0x00010003;

pub const ME_OPEN_NO_FLAGS: c_int = 0x00000000;
pub const ME_CLOSE_NO_FLAGS: c_int = 0x00000000;
pub const ME_CLOSE_FORCE: c_int = 0x10000000;

pub const ME_LOCK_DRIVER_NO_FLAGS: c_int = 0x0;
pub const ME_LOCK_DEVICE_NO_FLAGS: c_int = 0x0;
pub const ME_LOCK_SUBDEVICE_NO_FLAGS: c_int = 0x0;

// Error handling

pub const ME_ERROR_MSG_MAX_COUNT: c_int = 256;

pub const ME_SWITCH_DISABLE: c_int = 0x00020001;
pub const ME_SWITCH_ENABLE: c_int = 0x00020002;

pub const ME_ERRNO_CLEAR_FLAGS: c_int = 0x01;

// References

pub const ME_REF_NONE: c_int = 0x00000000;
pub const ME_REF_DIO_FIFO_LOW: c_int = 0x00030001;
pub const ME_REF_DIO_FIFO_HIGH: c_int = 0x00030002;

pub const ME_REF_CTR_PREVIOUS: c_int = 0x00040001;
pub const ME_REF_CTR_INTERNAL_1MHZ: c_int = 0x00040002;
pub const ME_REF_CTR_INTERNAL_10MHZ: c_int = 0x00040003;
pub const ME_REF_CTR_EXTERNAL: c_int = 0x00040004;

pub const ME_REF_AI_GROUND: c_int = 0x00050001;
pub const ME_REF_AI_DIFFERENTIAL: c_int = 0x00050002;

pub const ME_REF_AO_GROUND: c_int = 0x00060001;
pub const ME_REF_AO_DIFFERENTIAL: c_int = 0x00060002;

// Triggering

pub const ME_TRIG_CHAN_NONE: c_int = 0x00000000;
pub const ME_TRIG_CHAN_DEFAULT: c_int = 0x00070001;
pub const ME_TRIG_CHAN_SYNCHRONOUS: c_int = 0x00070002;

pub const ME_TRIG_TYPE_NONE: c_int = 0x00000000;
pub const ME_TRIG_TYPE_SW: c_int = 0x00080001;
pub const ME_TRIG_TYPE_THRESHOLD: c_int = 0x00080002;
pub const ME_TRIG_TYPE_WINDOW: c_int = 0x00080003;
pub const ME_TRIG_TYPE_EDGE: c_int = 0x00080004;
pub const ME_TRIG_TYPE_SLOPE: c_int = 0x00080005;
pub const ME_TRIG_TYPE_EXT_DIGITAL: c_int = 0x00080006;
pub const ME_TRIG_TYPE_EXT_ANALOG: c_int = 0x00080007;
pub const ME_TRIG_TYPE_PATTERN: c_int = 0x00080008;
pub const ME_TRIG_TYPE_TIMER: c_int = 0x00080009;
pub const ME_TRIG_TYPE_COUNT: c_int = 0x0008000A;
pub const ME_TRIG_TYPE_FOLLOW: c_int = 0x0008000B;

pub const ME_TRIG_EDGE_NONE: c_int = 0x00000000;
pub const ME_TRIG_EDGE_ABOVE: c_int = 0x00090001;
pub const ME_TRIG_EDGE_BELOW: c_int = 0x00090002;
pub const ME_TRIG_EDGE_ENTRY: c_int = 0x00090003;
pub const ME_TRIG_EDGE_EXIT: c_int = 0x00090004;
pub const ME_TRIG_EDGE_RISING: c_int = 0x00090005;
pub const ME_TRIG_EDGE_FALLING: c_int = 0x00090006;
pub const ME_TRIG_EDGE_ANY: c_int = 0x00090007;

// Timers

pub const ME_TIMER_ACQ_START: c_int = 0x000A0001;
pub const ME_TIMER_SCAN_START: c_int = 0x000A0002;
pub const ME_TIMER_CONV_START: c_int = 0x000A0003;
pub const ME_TIMER_FIO_TOTAL: c_int = 0x000A0004;
pub const ME_TIMER_FIO_FIRST_PHASE: c_int = 0x000A0005;

// Interrupts

pub const ME_IRQ_SOURCE_DIO_DEFAULT: c_int = 0x00000000;
pub const ME_IRQ_SOURCE_DIO_PATTERN: c_int = 0x000B0001;
pub const ME_IRQ_SOURCE_DIO_MASK: c_int = 0x000B0002;
pub const ME_IRQ_SOURCE_DIO_LINE: c_int = 0x000B0003;
pub const ME_IRQ_SOURCE_DIO_OVER_TEMP: c_int = 0x000B0004;
pub const ME_IRQ_SOURCE_HIGH_CURRENT: c_int = 0x000B0005;

pub const ME_IRQ_EDGE_NOT_USED: c_int = 0x00000000;
pub const ME_IRQ_EDGE_RISING: c_int = 0x000C0001;
pub const ME_IRQ_EDGE_FALLING: c_int = 0x000C0002;
pub const ME_IRQ_EDGE_ANY: c_int = 0x000C0003;

pub const ME_IO_IRQ_START_NO_FLAGS: c_int = 0x000000;
pub const ME_IO_IRQ_START_DIO_BIT: c_int = 0x000001;
pub const ME_IO_IRQ_START_DIO_BYTE: c_int = 0x000002;
pub const ME_IO_IRQ_START_DIO_WORD: c_int = 0x000004;
pub const ME_IO_IRQ_START_DIO_DWORD: c_int = 0x000008;
pub const ME_IO_IRQ_START_PATTERN_FILTERING: c_int = 0x000010;
pub const ME_IO_IRQ_START_EXTENDED_STATUS: c_int = 0x000020;

pub const ME_IO_IRQ_WAIT_NO_FLAGS: c_int = 0x000000;
pub const ME_IO_IRQ_WAIT_NORMAL_STATUS: c_int = 0x000001;
pub const ME_IO_IRQ_WAIT_EXTENDED_STATUS: c_int = 0x000002;

pub const ME_IO_IRQ_STOP_NO_FLAGS: c_int = 0x000000;

pub const ME_IO_IRQ_SET_CALLBACK_NO_FLAGS: c_int = 0x0;

// Reset

pub const ME_IO_RESET_DEVICE_NO_FLAGS: c_int = 0x00000000;
pub const ME_IO_RESET_DEVICE_UNPROTECTED: c_int = 0x00010000;

pub const ME_IO_RESET_SUBDEVICE_NO_FLAGS: c_int = 0x0;

// Single configuration

pub const ME_SINGLE_CONFIG_DIO_INPUT: c_int = 0x000D0001;
pub const ME_SINGLE_CONFIG_DIO_OUTPUT: c_int = 0x000D0002;
pub const ME_SINGLE_CONFIG_DIO_HIGH_IMPEDANCE: c_int = 0x000D0003;
pub const ME_SINGLE_CONFIG_DIO_SINK: c_int = 0x000D0004;
pub const ME_SINGLE_CONFIG_DIO_SOURCE: c_int = 0x000D0005;
pub const ME_SINGLE_CONFIG_DIO_MUX32M: c_int = 0x000D0006;
pub const ME_SINGLE_CONFIG_DIO_DEMUX32: c_int = 0x000D0007;
pub const ME_SINGLE_CONFIG_DIO_BIT_PATTERN: c_int = 0x000D0008;

pub const ME_SINGLE_CONFIG_MULTIPIN_IRQ: c_int = 0x000D0009;
pub const ME_SINGLE_CONFIG_MULTIPIN_CLK: c_int = 0x000D000a;

pub const ME_SINGLE_CONFIG_FIO_INPUT_LINUX: c_int = 0x000D0011;
pub const ME_SINGLE_CONFIG_FIO_OUTPUT_LINUX: c_int = 0x000D0012;
pub const ME_SINGLE_CONFIG_FIO_INPUT: c_int = 0x001E0001;
pub const ME_SINGLE_CONFIG_FIO_OUTPUT: c_int = 0x001E0002;

pub const ME_SINGLE_CONFIG_CTR_8254_MODE_DISABLE: c_int = 0x000E0000;
pub const ME_SINGLE_CONFIG_CTR_8254_MODE_0: c_int = 0x000E0001;
pub const ME_SINGLE_CONFIG_CTR_8254_MODE_INTERRUPT_ON_TERMINAL_COUNT: c_int =
    ME_SINGLE_CONFIG_CTR_8254_MODE_0;
pub const ME_SINGLE_CONFIG_CTR_8254_MODE_1: c_int = 0x000E0002;
pub const ME_SINGLE_CONFIG_CTR_8254_MODE_ONE_SHOT: c_int = ME_SINGLE_CONFIG_CTR_8254_MODE_1;
pub const ME_SINGLE_CONFIG_CTR_8254_MODE_2: c_int = 0x000E0003;
pub const ME_SINGLE_CONFIG_CTR_8254_MODE_RATE_GENERATOR: c_int = ME_SINGLE_CONFIG_CTR_8254_MODE_2;
pub const ME_SINGLE_CONFIG_CTR_8254_MODE_3: c_int = 0x000E0004;
pub const ME_SINGLE_CONFIG_CTR_8254_MODE_SQUARE_WAVE: c_int = ME_SINGLE_CONFIG_CTR_8254_MODE_3;
pub const ME_SINGLE_CONFIG_CTR_8254_MODE_4: c_int = 0x000E0005;
pub const ME_SINGLE_CONFIG_CTR_8254_MODE_SOFTWARE_TRIGGER: c_int =
    ME_SINGLE_CONFIG_CTR_8254_MODE_4;
pub const ME_SINGLE_CONFIG_CTR_8254_MODE_5: c_int = 0x000E0006;
pub const ME_SINGLE_CONFIG_CTR_8254_MODE_HARDWARE_TRIGGER: c_int =
    ME_SINGLE_CONFIG_CTR_8254_MODE_5;

pub const ME_IO_SINGLE_CONFIG_NO_FLAGS: c_int = 0x00;
pub const ME_IO_SINGLE_CONFIG_DIO_BIT: c_int = 0x01;
pub const ME_IO_SINGLE_CONFIG_DIO_BYTE: c_int = 0x02;
pub const ME_IO_SINGLE_CONFIG_DIO_WORD: c_int = 0x04;
pub const ME_IO_SINGLE_CONFIG_DIO_DWORD: c_int = 0x08;
pub const ME_IO_SINGLE_CONFIG_MULTISIG_LED_ON: c_int = 0x10;
pub const ME_IO_SINGLE_CONFIG_MULTISIG_LED_OFF: c_int = 0x20;
pub const ME_IO_SINGLE_CONFIG_AI_RMS: c_int = 0x40;
pub const ME_IO_SINGLE_CONFIG_CONTINUE: c_int = 0x80;
pub const ME_IO_SINGLE_CONFIG_MULTIPIN: c_int = 0x100;
pub const ME_IO_SINGLE_CONFIG_EXTRA_SHUNT: c_int = 0x200;
pub const ME_IO_SINGLE_CONFIG_FREQ_SINGLE_MODE: c_int = 0x400;
pub const ME_IO_SINGLE_CONFIG_DONT_SET_BACKGROUND: c_int = 0x800;
pub const ME_IO_SINGLE_CONFIG_POLLING_MODE: c_int = 0x1000;

// Single I/O

pub const ME_IO_SINGLE_NO_FLAGS: c_int = 0x0;
pub const ME_IO_SINGLE_NONBLOCKING: c_int = 0x20;

pub const ME_DIR_INPUT: c_int = 0x000F0001;
pub const ME_DIR_OUTPUT: c_int = 0x000F0002;
pub const ME_DIR_SET_OFFSET: c_int = 0x000F0003;

pub const ME_IO_SINGLE_TYPE_NO_FLAGS: c_int = 0x00;
pub const ME_IO_SINGLE_TYPE_DIO_BIT: c_int = 0x01;
pub const ME_IO_SINGLE_TYPE_DIO_BYTE: c_int = 0x02;
pub const ME_IO_SINGLE_TYPE_DIO_WORD: c_int = 0x04;
pub const ME_IO_SINGLE_TYPE_DIO_DWORD: c_int = 0x08;
pub const ME_IO_SINGLE_TYPE_TRIG_SYNCHRONOUS: c_int = 0x10;
pub const ME_IO_SINGLE_TYPE_NONBLOCKING: c_int = 0x20;
pub const ME_IO_SINGLE_TYPE_WRITE_NONBLOCKING: c_int = ME_IO_SINGLE_TYPE_NONBLOCKING;
pub const ME_IO_SINGLE_TYPE_READ_NONBLOCKING: c_int = ME_IO_SINGLE_TYPE_NONBLOCKING;
pub const ME_IO_SINGLE_TYPE_FREQ_DIVIDER: c_int = 0x40;
pub const ME_IO_SINGLE_TYPE_FREQ_START_LOW: c_int = 0x80;
pub const ME_IO_SINGLE_TYPE_FO_START_LOW: c_int = ME_IO_SINGLE_TYPE_FREQ_START_LOW;
pub const ME_IO_SINGLE_TYPE_FREQ_START_SOFT: c_int = 0x100;
pub const ME_IO_SINGLE_TYPE_FO_START_SOFT: c_int = ME_IO_SINGLE_TYPE_FREQ_START_SOFT;
pub const ME_IO_SINGLE_TYPE_FREQ_LAST_VALUE: c_int = 0x200;
pub const ME_IO_SINGLE_TYPE_FI_LAST_VALUE: c_int = ME_IO_SINGLE_TYPE_FREQ_LAST_VALUE;
pub const ME_IO_SINGLE_TYPE_FREQ_UPDATE_ONLY: c_int = 0x200;
pub const ME_IO_SINGLE_TYPE_FO_UPDATE_ONLY: c_int = ME_IO_SINGLE_TYPE_FREQ_UPDATE_ONLY;
pub const ME_IO_SINGLE_TYPE_FIO_TICKS_TOTAL: c_int = 0x400;
pub const ME_IO_SINGLE_TYPE_FIO_TICKS_FIRST_PHASE: c_int = 0x800;

pub const ME_IO_SINGLE_TIME_TO_TICKS_NO_FLAGS: c_int = 0x0;
pub const ME_IO_SINGLE_TICKS_TO_TIME_NO_FLAGS: c_int = 0x0;

// Stream configuration

pub const ME_IO_STREAM_CONFIG_NO_FLAGS: c_int = 0x0;
pub const ME_IO_STREAM_CONFIG_BIT_PATTERN: c_int = 0x1;
pub const ME_IO_STREAM_CONFIG_WRAPAROUND: c_int = 0x2;
pub const ME_IO_STREAM_CONFIG_SAMPLE_AND_HOLD: c_int = 0x4;
pub const ME_IO_STREAM_CONFIG_HARDWARE_ONLY: c_int = 0x8;

pub const ME_IO_STREAM_CONFIG_TYPE_NO_FLAGS: c_int = 0x0;

pub const ME_IO_STREAM_TRIGGER_TYPE_NO_FLAGS: c_int = 0x0;

// Stream read / write

pub const ME_READ_MODE_BLOCKING: c_int = 0x00100001;
pub const ME_READ_MODE_NONBLOCKING: c_int = 0x00100002;

pub const ME_IO_STREAM_READ_NO_FLAGS: c_int = 0x0;
pub const ME_IO_STREAM_READ_FRAMES: c_int = 0x1;

pub const ME_WRITE_MODE_BLOCKING: c_int = 0x00110001;
pub const ME_WRITE_MODE_NONBLOCKING: c_int = 0x00110002;
pub const ME_WRITE_MODE_PRELOAD: c_int = 0x00110003;

pub const ME_IO_STREAM_WRITE_NO_FLAGS: c_int = 0x00000000;

// Stream start / stop

pub const ME_IO_STREAM_START_NO_FLAGS: c_int = 0x00000000;
pub const ME_IO_STREAM_START_NONBLOCKING: c_int = 0x20;

pub const ME_START_MODE_BLOCKING: c_int = 0x00120001;
pub const ME_START_MODE_NONBLOCKING: c_int = 0x00120002;

pub const ME_IO_STREAM_START_TYPE_NO_FLAGS: c_int = 0x00000000;
pub const ME_IO_STREAM_START_TYPE_TRIG_SYNCHRONOUS: c_int = 0x00000010;

pub const ME_IO_STREAM_STOP_NO_FLAGS: c_int = 0x00000000;
pub const ME_IO_STREAM_STOP_NONBLOCKING: c_int = 0x20;

pub const ME_STOP_MODE_IMMEDIATE: c_int = 0x00130001;
pub const ME_STOP_MODE_LAST_VALUE: c_int = 0x00130002;

pub const ME_IO_STREAM_STOP_TYPE_NO_FLAGS: c_int = 0x00000000;
pub const ME_IO_STREAM_STOP_TYPE_PRESERVE_BUFFERS: c_int = 0x00000001;

// Stream status

pub const ME_WAIT_NONE: c_int = 0x00140001;
pub const ME_WAIT_IDLE: c_int = 0x00140002;
pub const ME_WAIT_BUSY: c_int = 0x00140003;

pub const ME_STATUS_INVALID: c_int = 0x00000000;
pub const ME_STATUS_IDLE: c_int = 0x00150001;
pub const ME_STATUS_BUSY: c_int = 0x00150002;
pub const ME_STATUS_ERROR: c_int = 0x00150003;

pub const ME_IO_STREAM_STATUS_NO_FLAGS: c_int = 0x00000000;
pub const ME_IO_STREAM_SET_CALLBACKS_NO_FLAGS: c_int = 0x00000000;
pub const ME_IO_STREAM_NEW_VALUES_NO_FLAGS: c_int = 0x00000000;

// Time / frequency to ticks

pub const ME_IO_TIME_TO_TICKS_NO_FLAGS: c_int = 0x00000000;
pub const ME_IO_STREAM_TIME_TO_TICKS_NO_FLAGS: c_int = ME_IO_TIME_TO_TICKS_NO_FLAGS;
pub const ME_IO_TIME_TO_TICKS_MEPHISTO_SCOPE_OSCILLOSCOPE: c_int = 0x1;

pub const ME_IO_FREQUENCY_TO_TICKS_NO_FLAGS: c_int = 0x00000000;
pub const ME_IO_STREAM_FREQUENCY_TO_TICKS_NO_FLAGS: c_int = ME_IO_FREQUENCY_TO_TICKS_NO_FLAGS;
pub const ME_IO_FREQUENCY_TO_TICKS_MEPHISTO_SCOPE_OSCILLOSCOPE: c_int = 0x1;

pub const ME_IO_SET_CHANNEL_OFFSET_NO_FLAGS: c_int = 0x0000000;

// Module types

pub const ME_MODULE_TYPE_MULTISIG_NONE: c_int = 0x00000000;
pub const ME_MODULE_TYPE_MULTISIG_DIFF16_10V: c_int = 0x00160001;
pub const ME_MODULE_TYPE_MULTISIG_DIFF16_20V: c_int = 0x00160002;
pub const ME_MODULE_TYPE_MULTISIG_DIFF16_50V: c_int = 0x00160003;
pub const ME_MODULE_TYPE_MULTISIG_CURRENT16_0_20MA: c_int = 0x00160004;
pub const ME_MODULE_TYPE_MULTISIG_RTD8_PT100: c_int = 0x00160005;
pub const ME_MODULE_TYPE_MULTISIG_RTD8_PT500: c_int = 0x00160006;
pub const ME_MODULE_TYPE_MULTISIG_RTD8_PT1000: c_int = 0x00160007;
pub const ME_MODULE_TYPE_MULTISIG_TE8_TYPE_B: c_int = 0x00160008;
pub const ME_MODULE_TYPE_MULTISIG_TE8_TYPE_E: c_int = 0x00160009;
pub const ME_MODULE_TYPE_MULTISIG_TE8_TYPE_J: c_int = 0x0016000A;
pub const ME_MODULE_TYPE_MULTISIG_TE8_TYPE_K: c_int = 0x0016000B;
pub const ME_MODULE_TYPE_MULTISIG_TE8_TYPE_N: c_int = 0x0016000C;
pub const ME_MODULE_TYPE_MULTISIG_TE8_TYPE_R: c_int = 0x0016000D;
pub const ME_MODULE_TYPE_MULTISIG_TE8_TYPE_S: c_int = 0x0016000E;
pub const ME_MODULE_TYPE_MULTISIG_TE8_TYPE_T: c_int = 0x0016000F;
pub const ME_MODULE_TYPE_MULTISIG_TE8_TEMP_SENSOR: c_int = 0x00160010;

// Capability bits

pub const ME_CAPS_NONE: c_int = 0x00000000;
pub const ME_CAPS_TRIG_DIGITAL: c_int = 0x00008000;
pub const ME_CAPS_TRIG_ANALOG: c_int = 0x00010000;
pub const ME_CAPS_TRIG_EDGE_RISING: c_int = 0x00020000;
pub const ME_CAPS_TRIG_EDGE_FALLING: c_int = 0x00040000;
pub const ME_CAPS_TRIG_EDGE_ANY: c_int = 0x00080000;

pub const ME_CAPS_DIO_DIR_BIT: c_int = 0x00000001;
pub const ME_CAPS_DIO_DIR_BYTE: c_int = 0x00000002;
pub const ME_CAPS_DIO_DIR_WORD: c_int = 0x00000004;
pub const ME_CAPS_DIO_DIR_DWORD: c_int = 0x00000008;
pub const ME_CAPS_DIO_SINK_SOURCE: c_int = 0x00000010;
pub const ME_CAPS_DIO_BIT_PATTERN_IRQ: c_int = 0x00000020;
pub const ME_CAPS_DIO_BIT_MASK_IRQ_EDGE_RISING: c_int = 0x00000040;
pub const ME_CAPS_DIO_BIT_MASK_IRQ_EDGE_FALLING: c_int = 0x00000080;
pub const ME_CAPS_DIO_BIT_MASK_IRQ_EDGE_ANY: c_int = 0x00000100;
pub const ME_CAPS_DIO_OVER_TEMP_IRQ: c_int = 0x00000200;
pub const ME_CAPS_DIO_TRIG_SYNCHRONOUS: c_int = 0x00004000;
pub const ME_CAPS_DIO_TRIG_DIGITAL: c_int = ME_CAPS_TRIG_DIGITAL;
pub const ME_CAPS_DIO_TRIG_ANALOG: c_int = ME_CAPS_TRIG_ANALOG;
pub const ME_CAPS_DIO_TRIG_EDGE_RISING: c_int = ME_CAPS_TRIG_EDGE_RISING;
pub const ME_CAPS_DIO_TRIG_EDGE_FALLING: c_int = ME_CAPS_TRIG_EDGE_FALLING;
pub const ME_CAPS_DIO_TRIG_EDGE_ANY: c_int = ME_CAPS_TRIG_EDGE_ANY;

pub const ME_CAPS_CTR_CLK_PREVIOUS: c_int = 0x00000001;
pub const ME_CAPS_CTR_CLK_INTERNAL_1MHZ: c_int = 0x00000002;
pub const ME_CAPS_CTR_CLK_INTERNAL_10MHZ: c_int = 0x00000004;
pub const ME_CAPS_CTR_CLK_EXTERNAL: c_int = 0x00000008;

pub const ME_CAPS_AI_TRIG_SYNCHRONOUS: c_int = 0x00000001;
pub const ME_CAPS_AI_TRIG_SIMULTANEOUS: c_int = ME_CAPS_AI_TRIG_SYNCHRONOUS;
pub const ME_CAPS_AI_FIFO: c_int = 0x00000002;
pub const ME_CAPS_AI_FIFO_THRESHOLD: c_int = 0x00000004;
pub const ME_CAPS_AI_SAMPLE_HOLD: c_int = 0x00000008;
pub const ME_CAPS_AI_TRIG_DIGITAL: c_int = ME_CAPS_TRIG_DIGITAL;
pub const ME_CAPS_AI_TRIG_ANALOG: c_int = ME_CAPS_TRIG_ANALOG;
pub const ME_CAPS_AI_TRIG_EDGE_RISING: c_int = ME_CAPS_TRIG_EDGE_RISING;
pub const ME_CAPS_AI_TRIG_EDGE_FALLING: c_int = ME_CAPS_TRIG_EDGE_FALLING;
pub const ME_CAPS_AI_TRIG_EDGE_ANY: c_int = ME_CAPS_TRIG_EDGE_ANY;
pub const ME_CAPS_AI_DIFFERENTIAL: c_int = 0x00000010;

pub const ME_CAPS_AO_TRIG_SYNCHRONOUS: c_int = 0x00000001;
pub const ME_CAPS_AO_TRIG_SIMULTANEOUS: c_int = ME_CAPS_AO_TRIG_SYNCHRONOUS;
pub const ME_CAPS_AO_FIFO: c_int = 0x00000002;
pub const ME_CAPS_AO_FIFO_THRESHOLD: c_int = 0x00000004;
pub const ME_CAPS_AO_TRIG_DIGITAL: c_int = ME_CAPS_TRIG_DIGITAL;
pub const ME_CAPS_AO_TRIG_ANALOG: c_int = ME_CAPS_TRIG_ANALOG;
pub const ME_CAPS_AO_TRIG_EDGE_RISING: c_int = ME_CAPS_TRIG_EDGE_RISING;
pub const ME_CAPS_AO_TRIG_EDGE_FALLING: c_int = ME_CAPS_TRIG_EDGE_FALLING;
pub const ME_CAPS_AO_TRIG_EDGE_ANY: c_int = ME_CAPS_TRIG_EDGE_ANY;
pub const ME_CAPS_AO_DIFFERENTIAL: c_int = 0x00000010;

pub const ME_CAPS_EXT_IRQ_EDGE_RISING: c_int = 0x00000001;
pub const ME_CAPS_EXT_IRQ_EDGE_FALLING: c_int = 0x00000002;
pub const ME_CAPS_EXT_IRQ_EDGE_ANY: c_int = 0x00000004;

pub const ME_CAPS_FPGA_BUSS_BIT: c_int = 0x00000001;
pub const ME_CAPS_FPGA_BUSS_BYTE: c_int = 0x00000002;
pub const ME_CAPS_FPGA_BUSS_WORD: c_int = 0x00000004;
pub const ME_CAPS_FPGA_BUSS_DWORD: c_int = 0x00000008;
pub const ME_CAPS_FPGA_IN_FIFO: c_int = 0x00000002;
pub const ME_CAPS_FPGA_OUT_FIFO: c_int = 0x00000002;

// Capability argument selectors

pub const ME_CAP_AI_FIFO_SIZE: c_int = 0x001D0000;
pub const ME_CAP_AI_BUFFER_SIZE: c_int = 0x001D0001;
pub const ME_CAP_AI_CHANNEL_LIST_SIZE: c_int = 0x001D0002;
pub const ME_CAP_AI_MAX_THRESHOLD_SIZE: c_int = 0x001D0003;

pub const ME_CAP_AO_FIFO_SIZE: c_int = 0x001F0000;
pub const ME_CAP_AO_BUFFER_SIZE: c_int = 0x001F0001;
pub const ME_CAP_AO_CHANNEL_LIST_SIZE: c_int = 0x001F0002;
pub const ME_CAP_AO_MAX_THRESHOLD_SIZE: c_int = 0x001F0003;

pub const ME_CAP_CTR_WIDTH: c_int = 0x00200000;

pub const ME_CAP_FPGA_IN_FIFO_SIZE: c_int = 0x00300000;
pub const ME_CAP_FPGA_IN_BUFFER_SIZE: c_int = 0x00300001;
pub const ME_CAP_FPGA_OUT_FIFO_SIZE: c_int = 0x00300002;
pub const ME_CAP_FPGA_OUT_BUFFER_SIZE: c_int = 0x00300003;

// Units

pub const ME_UNIT_INVALID: c_int = 0x00000000;
pub const ME_UNIT_VOLT: c_int = 0x00170001;
pub const ME_UNIT_AMPERE: c_int = 0x00170002;
pub const ME_UNIT_ANY: c_int = 0x00170003;
pub const ME_UNIT_Hz: c_int = 0x00170004;

// Subdevice types

pub const ME_TYPE_INVALID: c_int = 0x00000000;
pub const ME_TYPE_AO: c_int = 0x00180001;
pub const ME_TYPE_AI: c_int = 0x00180002;
pub const ME_TYPE_DIO: c_int = 0x00180003;
pub const ME_TYPE_DO: c_int = 0x00180004;
pub const ME_TYPE_DI: c_int = 0x00180005;
pub const ME_TYPE_CTR: c_int = 0x00180006;
pub const ME_TYPE_EXT_IRQ: c_int = 0x00180007;
pub const ME_TYPE_FREQ_IO: c_int = 0x00180008;
pub const ME_TYPE_FIO: c_int = ME_TYPE_FREQ_IO;
pub const ME_TYPE_FREQ_O: c_int = 0x00180009;
// The short aliases are crossed over in the vendor header; kept as shipped.
pub const ME_TYPE_FO: c_int = ME_TYPE_FREQ_I;
pub const ME_TYPE_FREQ_I: c_int = 0x0018000A;
pub const ME_TYPE_FI: c_int = ME_TYPE_FREQ_O;
pub const ME_TYPE_FPGA: c_int = 0x0018000B;

pub const ME_SUBTYPE_INVALID: c_int = 0x00000000;
pub const ME_SUBTYPE_SINGLE: c_int = 0x00190001;
pub const ME_SUBTYPE_STREAMING: c_int = 0x00190002;
pub const ME_SUBTYPE_CTR_8254: c_int = 0x00190003;
pub const ME_SUBTYPE_ANY: c_int = 0x00190004;
pub const ME_SUBTYPE_CTR: c_int = 0x00190006;

// Device description

pub const ME_DEVICE_DRIVER_NAME_MAX_COUNT: c_int = 64;
pub const ME_DEVICE_NAME_MAX_COUNT: c_int = 64;
pub const ME_DEVICE_DESCRIPTION_MAX_COUNT: c_int = 256;

pub const ME_BUS_TYPE_INVALID: c_int = 0x00000000;
pub const ME_BUS_TYPE_ANY: c_int = 0x001A0000;
pub const ME_BUS_TYPE_PCI: c_int = 0x001A0001;
pub const ME_BUS_TYPE_USB: c_int = 0x001A0002;
pub const ME_BUS_TYPE_LAN_PCI: c_int = 0x001A0101;
pub const ME_BUS_TYPE_LAN_USB: c_int = 0x001A0102;

pub const ME_PLUGGED_INVALID: c_int = 0x00000000;
pub const ME_PLUGGED_ANY: c_int = 0x001B0000;
pub const ME_PLUGGED_IN: c_int = 0x001B0001;
pub const ME_PLUGGED_OUT: c_int = 0x001B0002;

pub const ME_EXTENSION_TYPE_INVALID: c_int = 0x00000000;
pub const ME_EXTENSION_TYPE_NONE: c_int = 0x001C0001;
pub const ME_EXTENSION_TYPE_MUX32M: c_int = 0x001C0002;
pub const ME_EXTENSION_TYPE_DEMUX32: c_int = 0x001C0003;
pub const ME_EXTENSION_TYPE_MUX32S: c_int = 0x001C0004;

pub const ME_ACCESS_TYPE_INVALID: c_int = 0x00000000;
pub const ME_ACCESS_TYPE_ANY: c_int = 0x001D0000;
pub const ME_ACCESS_TYPE_LOCAL: c_int = 0x001D0001;
pub const ME_ACCESS_TYPE_REMOTE: c_int = 0x001D0002;

// Configuration load

pub const ME_CONF_LOAD_CUSTOM_DRIVER: c_int = 0x00001000;

pub const ME_FPGA_FIRMWARE: c_int = 0xFF000001_u32 as c_int;
pub const ME_FPGA_SUBDEVICE: c_int = 0xFF000002_u32 as c_int;

// PWM

pub const ME_PWM_START_NO_FLAGS: c_int = 0x00000000;
pub const ME_PWM_START_CONNECT_INTERNAL: c_int = 0x00000001;

pub const ME_QUERY_NO_FLAGS: c_int = 0x00000000;

// Predefined ranges (utility helpers)

pub const ME_RANGE_UNIPOLAR_10V: c_int = 0xEA540001_u32 as c_int;
pub const ME_RANGE_BIPOLAR_10V: c_int = 0xEA540002_u32 as c_int;
pub const ME_RANGE_UNIPOLAR_2_5V: c_int = 0xEA540003_u32 as c_int;
pub const ME_RANGE_BIPOLAR_2_5V: c_int = 0xEA540004_u32 as c_int;
pub const ME_RANGE_0_20mA: c_int = 0xEA540005_u32 as c_int;
pub const ME_RANGE_4_20mA: c_int = 0xEA540006_u32 as c_int;
pub const ME_RANGE_UNIPOLAR_50V: c_int = 0xEA540007_u32 as c_int;

// Error codes

pub const ME_ERRNO_SUCCESS: c_int = 0;
pub const ME_ERRNO_INVALID_DEVICE: c_int = 1;
pub const ME_ERRNO_INVALID_SUBDEVICE: c_int = 2;
pub const ME_ERRNO_INVALID_CHANNEL: c_int = 3;
pub const ME_ERRNO_INVALID_SINGLE_CONFIG: c_int = 4;
pub const ME_ERRNO_INVALID_REF: c_int = 5;
pub const ME_ERRNO_INVALID_TRIG_CHAN: c_int = 6;
pub const ME_ERRNO_INVALID_TRIG_TYPE: c_int = 7;
pub const ME_ERRNO_INVALID_TRIG_EDGE: c_int = 8;
pub const ME_ERRNO_INVALID_TIMEOUT: c_int = 9;
pub const ME_ERRNO_INVALID_FLAGS: c_int = 10;
pub const ME_ERRNO_OPEN: c_int = 11;
pub const ME_ERRNO_CLOSE: c_int = 12;
pub const ME_ERRNO_NOT_OPEN: c_int = 13;
pub const ME_ERRNO_INVALID_DIR: c_int = 14;
pub const ME_ERRNO_PREVIOUS_CONFIG: c_int = 15;
pub const ME_ERRNO_NOT_SUPPORTED: c_int = 16;
pub const ME_ERRNO_SUBDEVICE_TYPE: c_int = 17;
pub const ME_ERRNO_USER_BUFFER_SIZE: c_int = 18;
pub const ME_ERRNO_LOCKED: c_int = 19;
pub const ME_ERRNO_NOMORE_SUBDEVICE_TYPE: c_int = 20;
pub const ME_ERRNO_TIMEOUT: c_int = 21;
pub const ME_ERRNO_SIGNAL: c_int = 22;
pub const ME_ERRNO_INVALID_IRQ_SOURCE: c_int = 23;
pub const ME_ERRNO_THREAD_RUNNING: c_int = 24;
pub const ME_ERRNO_START_THREAD: c_int = 25;
pub const ME_ERRNO_CANCEL_THREAD: c_int = 26;
pub const ME_ERRNO_NO_CALLBACK: c_int = 27;
pub const ME_ERRNO_USED: c_int = 28;
pub const ME_ERRNO_INVALID_UNIT: c_int = 29;
pub const ME_ERRNO_INVALID_MIN_MAX: c_int = 30;
pub const ME_ERRNO_NO_RANGE: c_int = 31;
pub const ME_ERRNO_INVALID_RANGE: c_int = 32;
pub const ME_ERRNO_SUBDEVICE_BUSY: c_int = 33;
pub const ME_ERRNO_INVALID_LOCK: c_int = 34;
pub const ME_ERRNO_INVALID_SWITCH: c_int = 35;
pub const ME_ERRNO_INVALID_ERROR_MSG_COUNT: c_int = 36;
pub const ME_ERRNO_INVALID_STREAM_CONFIG: c_int = 37;
pub const ME_ERRNO_INVALID_CONFIG_LIST_COUNT: c_int = 38;
pub const ME_ERRNO_INVALID_ACQ_START_TRIG_TYPE: c_int = 39;
pub const ME_ERRNO_INVALID_ACQ_START_TRIG_EDGE: c_int = 40;
pub const ME_ERRNO_INVALID_ACQ_START_TRIG_CHAN: c_int = 41;
pub const ME_ERRNO_INVALID_ACQ_START_TIMEOUT: c_int = 42;
pub const ME_ERRNO_INVALID_ACQ_START_ARG: c_int = 43;
pub const ME_ERRNO_INVALID_SCAN_START_TRIG_TYPE: c_int = 44;
pub const ME_ERRNO_INVALID_SCAN_START_ARG: c_int = 45;
pub const ME_ERRNO_INVALID_CONV_START_TRIG_TYPE: c_int = 46;
pub const ME_ERRNO_INVALID_CONV_START_ARG: c_int = 47;
pub const ME_ERRNO_INVALID_SCAN_STOP_TRIG_TYPE: c_int = 48;
pub const ME_ERRNO_INVALID_SCAN_STOP_ARG: c_int = 49;
pub const ME_ERRNO_INVALID_ACQ_STOP_TRIG_TYPE: c_int = 50;
pub const ME_ERRNO_INVALID_ACQ_STOP_ARG: c_int = 51;
pub const ME_ERRNO_SUBDEVICE_NOT_RUNNING: c_int = 52;
pub const ME_ERRNO_INVALID_READ_MODE: c_int = 53;
pub const ME_ERRNO_INVALID_VALUE_COUNT: c_int = 54;
pub const ME_ERRNO_INVALID_WRITE_MODE: c_int = 55;
pub const ME_ERRNO_INVALID_TIMER: c_int = 56;
pub const ME_ERRNO_DEVICE_UNPLUGGED: c_int = 57;
pub const ME_ERRNO_USED_INTERNAL: c_int = 58;
pub const ME_ERRNO_INVALID_DUTY_CYCLE: c_int = 59;
pub const ME_ERRNO_INVALID_WAIT: c_int = 60;
pub const ME_ERRNO_CONNECT_REMOTE: c_int = 61;
pub const ME_ERRNO_COMMUNICATION: c_int = 62;
pub const ME_ERRNO_INVALID_SINGLE_LIST: c_int = 63;
pub const ME_ERRNO_INVALID_MODULE_TYPE: c_int = 64;
pub const ME_ERRNO_INVALID_START_MODE: c_int = 65;
pub const ME_ERRNO_INVALID_STOP_MODE: c_int = 66;
pub const ME_ERRNO_INVALID_FIFO_IRQ_THRESHOLD: c_int = 67;
pub const ME_ERRNO_INVALID_POINTER: c_int = 68;
pub const ME_ERRNO_CREATE_EVENT: c_int = 69;
pub const ME_ERRNO_LACK_OF_RESOURCES: c_int = 70;
pub const ME_ERRNO_CANCELLED: c_int = 71;
pub const ME_ERRNO_RING_BUFFER_OVERFLOW: c_int = 72;
pub const ME_ERRNO_SOFTWARE_BUFFER_OVERFLOW: c_int = ME_ERRNO_RING_BUFFER_OVERFLOW;
pub const ME_ERRNO_RING_BUFFER_UNDEFFLOW: c_int = 73;
pub const ME_ERRNO_SOFTWARE_BUFFER_UNDERFLOW: c_int = ME_ERRNO_RING_BUFFER_UNDEFFLOW;
pub const ME_ERRNO_INVALID_IRQ_EDGE: c_int = 74;
pub const ME_ERRNO_INVALID_IRQ_ARG: c_int = 75;
pub const ME_ERRNO_INVALID_CAP: c_int = 76;
pub const ME_ERRNO_INVALID_CAP_ARG_COUNT: c_int = 77;
pub const ME_ERRNO_INTERNAL: c_int = 78;
pub const ME_ERRNO_VALUE_OUT_OF_RANGE: c_int = 79;
pub const ME_ERRNO_HARDWARE_BUFFER_OVERFLOW: c_int = 80;
pub const ME_ERRNO_HARDWARE_BUFFER_UNDERFLOW: c_int = 81;
pub const ME_ERRNO_CONFIG_LOAD_FAILED: c_int = 82;
pub const ME_ERRNO_INVALID_ERROR_NUMBER: c_int = 83;

/// Highest error code known to this binding.
pub const ME_ERRNO_MAX: c_int = ME_ERRNO_INVALID_ERROR_NUMBER;
