//! Regression table for constant values shared with the driver library.
//!
//! The driver interprets these numbers directly, so any drift here breaks
//! every call that carries them.

use meids_sys::*;

fn check(table: &[(&str, i32, u32)]) {
    for (name, actual, expected) in table {
        assert_eq!(*actual as u32, *expected, "{} has wrong value", name);
    }
}

#[test]
fn test_lock_and_switch_values() {
    check(&[
        ("ME_LOCK_RELEASE", ME_LOCK_RELEASE, 0x00010001),
        ("ME_LOCK_SET", ME_LOCK_SET, 0x00010002),
        ("ME_LOCK_CHECK", ME_LOCK_CHECK, 0x00010003),
        ("ME_SWITCH_DISABLE", ME_SWITCH_DISABLE, 0x00020001),
        ("ME_SWITCH_ENABLE", ME_SWITCH_ENABLE, 0x00020002),
        ("ME_ERRNO_CLEAR_FLAGS", ME_ERRNO_CLEAR_FLAGS, 0x01),
    ]);
}

#[test]
fn test_reference_and_trigger_values() {
    check(&[
        ("ME_REF_DIO_FIFO_HIGH", ME_REF_DIO_FIFO_HIGH, 0x00030002),
        ("ME_REF_CTR_EXTERNAL", ME_REF_CTR_EXTERNAL, 0x00040004),
        ("ME_REF_AI_DIFFERENTIAL", ME_REF_AI_DIFFERENTIAL, 0x00050002),
        ("ME_REF_AO_GROUND", ME_REF_AO_GROUND, 0x00060001),
        ("ME_TRIG_CHAN_SYNCHRONOUS", ME_TRIG_CHAN_SYNCHRONOUS, 0x00070002),
        ("ME_TRIG_TYPE_SW", ME_TRIG_TYPE_SW, 0x00080001),
        ("ME_TRIG_TYPE_FOLLOW", ME_TRIG_TYPE_FOLLOW, 0x0008000B),
        ("ME_TRIG_EDGE_ANY", ME_TRIG_EDGE_ANY, 0x00090007),
        ("ME_TIMER_FIO_FIRST_PHASE", ME_TIMER_FIO_FIRST_PHASE, 0x000A0005),
        ("ME_IRQ_SOURCE_HIGH_CURRENT", ME_IRQ_SOURCE_HIGH_CURRENT, 0x000B0005),
        ("ME_IRQ_EDGE_ANY", ME_IRQ_EDGE_ANY, 0x000C0003),
    ]);
}

#[test]
fn test_io_mode_values() {
    check(&[
        ("ME_SINGLE_CONFIG_DIO_OUTPUT", ME_SINGLE_CONFIG_DIO_OUTPUT, 0x000D0002),
        ("ME_SINGLE_CONFIG_FIO_INPUT", ME_SINGLE_CONFIG_FIO_INPUT, 0x001E0001),
        (
            "ME_SINGLE_CONFIG_CTR_8254_MODE_5",
            ME_SINGLE_CONFIG_CTR_8254_MODE_5,
            0x000E0006,
        ),
        ("ME_DIR_INPUT", ME_DIR_INPUT, 0x000F0001),
        ("ME_DIR_OUTPUT", ME_DIR_OUTPUT, 0x000F0002),
        ("ME_DIR_SET_OFFSET", ME_DIR_SET_OFFSET, 0x000F0003),
        ("ME_READ_MODE_NONBLOCKING", ME_READ_MODE_NONBLOCKING, 0x00100002),
        ("ME_WRITE_MODE_PRELOAD", ME_WRITE_MODE_PRELOAD, 0x00110003),
        ("ME_START_MODE_BLOCKING", ME_START_MODE_BLOCKING, 0x00120001),
        ("ME_STOP_MODE_LAST_VALUE", ME_STOP_MODE_LAST_VALUE, 0x00130002),
        ("ME_WAIT_BUSY", ME_WAIT_BUSY, 0x00140003),
        ("ME_STATUS_ERROR", ME_STATUS_ERROR, 0x00150003),
        (
            "ME_MODULE_TYPE_MULTISIG_TE8_TEMP_SENSOR",
            ME_MODULE_TYPE_MULTISIG_TE8_TEMP_SENSOR,
            0x00160010,
        ),
    ]);
}

#[test]
fn test_description_values() {
    check(&[
        ("ME_UNIT_Hz", ME_UNIT_Hz, 0x00170004),
        ("ME_TYPE_AO", ME_TYPE_AO, 0x00180001),
        ("ME_TYPE_FPGA", ME_TYPE_FPGA, 0x0018000B),
        ("ME_SUBTYPE_CTR", ME_SUBTYPE_CTR, 0x00190006),
        ("ME_BUS_TYPE_LAN_USB", ME_BUS_TYPE_LAN_USB, 0x001A0102),
        ("ME_PLUGGED_OUT", ME_PLUGGED_OUT, 0x001B0002),
        ("ME_EXTENSION_TYPE_MUX32S", ME_EXTENSION_TYPE_MUX32S, 0x001C0004),
        ("ME_ACCESS_TYPE_REMOTE", ME_ACCESS_TYPE_REMOTE, 0x001D0002),
        ("ME_CAP_AI_FIFO_SIZE", ME_CAP_AI_FIFO_SIZE, 0x001D0000),
        ("ME_CAP_AO_MAX_THRESHOLD_SIZE", ME_CAP_AO_MAX_THRESHOLD_SIZE, 0x001F0003),
        ("ME_CAP_CTR_WIDTH", ME_CAP_CTR_WIDTH, 0x00200000),
        ("ME_CAP_FPGA_OUT_BUFFER_SIZE", ME_CAP_FPGA_OUT_BUFFER_SIZE, 0x00300003),
        ("ME_RANGE_UNIPOLAR_50V", ME_RANGE_UNIPOLAR_50V, 0xEA540007),
    ]);
}

#[test]
fn test_flag_bits() {
    check(&[
        ("ME_IO_SINGLE_TYPE_NONBLOCKING", ME_IO_SINGLE_TYPE_NONBLOCKING, 0x20),
        ("ME_IO_SINGLE_TYPE_FIO_TICKS_FIRST_PHASE", ME_IO_SINGLE_TYPE_FIO_TICKS_FIRST_PHASE, 0x800),
        ("ME_IO_SINGLE_CONFIG_POLLING_MODE", ME_IO_SINGLE_CONFIG_POLLING_MODE, 0x1000),
        ("ME_IO_STREAM_CONFIG_HARDWARE_ONLY", ME_IO_STREAM_CONFIG_HARDWARE_ONLY, 0x8),
        ("ME_IO_STREAM_STOP_TYPE_PRESERVE_BUFFERS", ME_IO_STREAM_STOP_TYPE_PRESERVE_BUFFERS, 0x1),
        ("ME_IO_IRQ_START_EXTENDED_STATUS", ME_IO_IRQ_START_EXTENDED_STATUS, 0x20),
        ("ME_IO_RESET_DEVICE_UNPROTECTED", ME_IO_RESET_DEVICE_UNPROTECTED, 0x00010000),
        ("ME_CAPS_TRIG_EDGE_ANY", ME_CAPS_TRIG_EDGE_ANY, 0x00080000),
        ("ME_CAPS_DIO_OVER_TEMP_IRQ", ME_CAPS_DIO_OVER_TEMP_IRQ, 0x00000200),
        ("ME_CONF_LOAD_CUSTOM_DRIVER", ME_CONF_LOAD_CUSTOM_DRIVER, 0x00001000),
        ("ME_PWM_START_CONNECT_INTERNAL", ME_PWM_START_CONNECT_INTERNAL, 0x1),
    ]);
}

#[test]
fn test_error_codes_are_contiguous() {
    let codes = [
        ME_ERRNO_SUCCESS,
        ME_ERRNO_INVALID_DEVICE,
        ME_ERRNO_INVALID_SUBDEVICE,
        ME_ERRNO_INVALID_CHANNEL,
        ME_ERRNO_INVALID_SINGLE_CONFIG,
        ME_ERRNO_INVALID_REF,
        ME_ERRNO_INVALID_TRIG_CHAN,
        ME_ERRNO_INVALID_TRIG_TYPE,
        ME_ERRNO_INVALID_TRIG_EDGE,
        ME_ERRNO_INVALID_TIMEOUT,
        ME_ERRNO_INVALID_FLAGS,
        ME_ERRNO_OPEN,
        ME_ERRNO_CLOSE,
        ME_ERRNO_NOT_OPEN,
    ];
    for (i, code) in codes.iter().enumerate() {
        assert_eq!(*code, i as i32);
    }
    assert_eq!(ME_ERRNO_LOCKED, 19);
    assert_eq!(ME_ERRNO_TIMEOUT, 21);
    assert_eq!(ME_ERRNO_DEVICE_UNPLUGGED, 57);
    assert_eq!(ME_ERRNO_COMMUNICATION, 62);
    assert_eq!(ME_ERRNO_VALUE_OUT_OF_RANGE, 79);
    assert_eq!(ME_ERRNO_INVALID_ERROR_NUMBER, 83);
}
