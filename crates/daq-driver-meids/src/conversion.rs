//! Device-independent value conversions.
//!
//! These follow the driver library's own arithmetic, including its
//! truncation and clamping rules, so results match values converted by the
//! library bit for bit. Only the RTD and thermocouple modules need the
//! library's lookup tables; those go through
//! [`MeidsBackend::utility_digital_to_physical`](crate::MeidsBackend::utility_digital_to_physical).

use crate::codes::ModuleType;
use crate::error::{ErrorCode, MeidsError, Result};
use crate::records::StreamChannel;

/// A converted value, and whether the input had to be clamped to produce it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clamped<T> {
    /// The converted value, clamped to the range when `out_of_range`
    pub value: T,
    /// Whether the input lay outside the range
    pub out_of_range: bool,
}

impl<T> Clamped<T> {
    fn exact(value: T) -> Self {
        Self {
            value,
            out_of_range: false,
        }
    }

    fn clamped(value: T) -> Self {
        Self {
            value,
            out_of_range: true,
        }
    }

    /// The value, or `ValueOutOfRange` if it was clamped.
    pub fn strict(self, function: &'static str) -> Result<T> {
        if self.out_of_range {
            Err(MeidsError::Driver {
                function,
                code: ErrorCode::ValueOutOfRange,
            })
        } else {
            Ok(self.value)
        }
    }
}

fn driver_error(function: &'static str, code: ErrorCode) -> MeidsError {
    MeidsError::Driver { function, code }
}

/// Convert a physical value to a raw code for a range `[min, max]` with
/// `max_data` as the largest code.
///
/// Rounds half up. Values below the range clamp to 0 and are flagged;
/// values above clamp to `max_data` and are flagged only if they exceed
/// `max`, so rounding at the top edge is tolerated.
pub fn physical_to_digital(
    min: f64,
    max: f64,
    max_data: i32,
    physical: f64,
) -> Result<Clamped<i32>> {
    if max_data < 0 {
        return Err(driver_error("meUtilityPhysicalToDigital", ErrorCode::InvalidMinMax));
    }
    if max_data == 0 {
        return Ok(Clamped::exact(0));
    }

    let data = ((physical - min) / (max - min) * f64::from(max_data) + 0.5) as i32;

    Ok(if data < 0 {
        Clamped::clamped(0)
    } else if data > max_data {
        Clamped {
            value: max_data,
            out_of_range: physical > max,
        }
    } else {
        Clamped::exact(data)
    })
}

/// Convert a raw code to a physical value, applying the module's scaling.
///
/// Out-of-range codes clamp to `min` or `max` without module scaling, as
/// the library does.
pub fn digital_to_physical(
    min: f64,
    max: f64,
    max_data: i32,
    data: i32,
    module: ModuleType,
) -> Result<Clamped<f64>> {
    const FUNCTION: &str = "meUtilityDigitalToPhysical";

    if data < 0 {
        return Ok(Clamped::clamped(min));
    }
    if data > max_data {
        return Ok(Clamped::clamped(max));
    }
    if max_data <= 0 {
        return Err(driver_error(FUNCTION, ErrorCode::InvalidMinMax));
    }

    let voltage = (max - min) * f64::from(data) / f64::from(max_data) + min;

    let physical = match module {
        ModuleType::None | ModuleType::Diff16_10V => voltage,
        ModuleType::Diff16_20V => voltage * 2.0,
        ModuleType::Diff16_50V => voltage * 5.0,
        ModuleType::Current16_0_20mA => 20e-3 / 10.0 * voltage,
        ModuleType::Te8TempSensor => (voltage / 4.0 - 500e-3) / 10e-3,
        other => {
            return Err(MeidsError::NotSupported(format!(
                "{:?} needs the driver library's lookup tables",
                other
            )))
        }
    };
    Ok(Clamped::exact(physical))
}

/// [`physical_to_digital`] over a buffer. Clamped elements are kept
/// without failing the whole conversion.
pub fn physical_to_digital_all(
    min: f64,
    max: f64,
    max_data: i32,
    physical: &[f64],
) -> Result<Vec<i32>> {
    physical
        .iter()
        .map(|p| physical_to_digital(min, max, max_data, *p).map(|c| c.value))
        .collect()
}

/// [`digital_to_physical`] over a buffer.
pub fn digital_to_physical_all(
    min: f64,
    max: f64,
    max_data: i32,
    data: &[i32],
    module: ModuleType,
) -> Result<Vec<f64>> {
    data.iter()
        .map(|d| digital_to_physical(min, max, max_data, *d, module).map(|c| c.value))
        .collect()
}

/// Pull the samples of `channel` out of an interleaved stream buffer.
///
/// `config` is the channel list the stream was configured with; each scan
/// in `buffer` holds one sample per entry in that order. At most
/// `capacity` samples are returned and a trailing partial scan is used up
/// to where it ends.
pub fn extract_values(
    channel: i32,
    buffer: &[i32],
    config: &[StreamChannel],
    capacity: usize,
) -> Vec<i32> {
    let channels: Vec<i32> = config.iter().map(|entry| entry.channel).collect();
    extract_by(channel, buffer, &channels).take(capacity).collect()
}

/// Samples of `channel` in `buffer`, where `channels` lists the channel of
/// each position in a scan.
pub(crate) fn extract_by<'a>(
    channel: i32,
    buffer: &'a [i32],
    channels: &'a [i32],
) -> impl Iterator<Item = i32> + 'a {
    buffer
        .iter()
        .enumerate()
        .filter(move |(index, _)| {
            !channels.is_empty() && channels[index % channels.len()] == channel
        })
        .map(|(_, value)| *value)
}

fn out_of_range(function: &'static str) -> MeidsError {
    driver_error(function, ErrorCode::ValueOutOfRange)
}

/// Ticks of a `base_freq` Hz clock in `period` seconds, truncated.
pub fn period_to_ticks(base_freq: i32, period: f64) -> Result<u32> {
    if base_freq <= 0 || period < 0.0 {
        return Err(out_of_range("meUtilityPeriodToTicks"));
    }
    Ok((period * f64::from(base_freq)) as u32)
}

/// Seconds covered by `ticks` of a `base_freq` Hz clock.
pub fn ticks_to_period(base_freq: i32, ticks: u32) -> Result<f64> {
    if base_freq <= 0 {
        return Err(out_of_range("meUtilityTicksToPeriod"));
    }
    Ok(f64::from(ticks) / f64::from(base_freq))
}

/// Ticks of a `base_freq` Hz clock per period of `frequency`, truncated.
pub fn frequency_to_ticks(base_freq: i32, frequency: f64) -> Result<u32> {
    if frequency <= 0.0 || base_freq <= 0 {
        return Err(out_of_range("meUtilityFrequencyToTicks"));
    }
    Ok((f64::from(base_freq) / frequency) as u32)
}

/// Frequency whose period is `ticks` of a `base_freq` Hz clock.
///
/// Zero ticks yields infinity.
pub fn ticks_to_frequency(base_freq: i32, ticks: u32) -> Result<f64> {
    if base_freq <= 0 {
        return Err(out_of_range("meUtilityTicksToFrequency"));
    }
    Ok(f64::from(base_freq) / f64::from(ticks))
}

/// Encode a duty-cycle style divider in `[0, 1]` as a 32-bit fraction.
///
/// Inputs outside `[0, 1]` are clamped; `1.0` saturates to `u32::MAX`.
pub fn code_divider(divider: f64) -> u32 {
    let fraction = divider.clamp(0.0, 1.0);
    (fraction * 65536.0 * 65536.0) as u32
}

/// Decode a 32-bit divider fraction. Zero decodes to `1.0`.
pub fn decode_divider(divider: u32) -> f64 {
    if divider == 0 {
        1.0
    } else {
        f64::from(divider) / 65536.0 / 65536.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::Reference;

    #[test]
    fn test_physical_to_digital_rounds_half_up() {
        let c = physical_to_digital(-10.0, 10.0, 65535, 0.0).unwrap();
        assert_eq!(c.value, 32768);
        assert!(!c.out_of_range);

        let c = physical_to_digital(0.0, 10.0, 1000, 4.9994).unwrap();
        assert_eq!(c.value, 500);
    }

    #[test]
    fn test_physical_to_digital_clamps() {
        let below = physical_to_digital(0.0, 10.0, 1000, -1.0).unwrap();
        assert_eq!(below, Clamped { value: 0, out_of_range: true });

        let above = physical_to_digital(0.0, 10.0, 1000, 11.0).unwrap();
        assert_eq!(above, Clamped { value: 1000, out_of_range: true });

        // Top of the range maps to max_data exactly.
        let edge = physical_to_digital(0.0, 10.0, 1000, 10.0).unwrap();
        assert_eq!(edge.value, 1000);
        assert!(!edge.out_of_range);
    }

    #[test]
    fn test_physical_to_digital_max_data_edge_cases() {
        assert_eq!(physical_to_digital(0.0, 10.0, 0, 5.0).unwrap().value, 0);
        let err = physical_to_digital(0.0, 10.0, -1, 5.0).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidMinMax));
    }

    #[test]
    fn test_digital_to_physical_modules() {
        let v = |module| digital_to_physical(0.0, 10.0, 1000, 500, module).unwrap().value;
        assert_eq!(v(ModuleType::None), 5.0);
        assert_eq!(v(ModuleType::Diff16_10V), 5.0);
        assert_eq!(v(ModuleType::Diff16_20V), 10.0);
        assert_eq!(v(ModuleType::Diff16_50V), 25.0);
        assert!((v(ModuleType::Current16_0_20mA) - 0.01).abs() < 1e-12);
        assert!((v(ModuleType::Te8TempSensor) - 75.0).abs() < 1e-9);

        let err = digital_to_physical(0.0, 10.0, 1000, 500, ModuleType::Rtd8Pt100).unwrap_err();
        assert!(matches!(err, MeidsError::NotSupported(_)));
    }

    #[test]
    fn test_digital_to_physical_out_of_range() {
        let low = digital_to_physical(-5.0, 5.0, 255, -3, ModuleType::Diff16_20V).unwrap();
        assert_eq!(low, Clamped { value: -5.0, out_of_range: true });
        let high = digital_to_physical(-5.0, 5.0, 255, 256, ModuleType::None).unwrap();
        assert_eq!(high.value, 5.0);
        assert!(high.strict("test").is_err());

        let err = digital_to_physical(0.0, 1.0, 0, 0, ModuleType::None).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidMinMax));
    }

    #[test]
    fn test_buffer_conversions() {
        let codes = physical_to_digital_all(0.0, 10.0, 100, &[0.0, 5.0, 20.0]).unwrap();
        assert_eq!(codes, vec![0, 50, 100]);

        let volts =
            digital_to_physical_all(0.0, 10.0, 100, &[0, 50, 100], ModuleType::None).unwrap();
        assert_eq!(volts, vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn test_extract_values() {
        let config = [
            StreamChannel::new(0, 0, Reference::AiGround),
            StreamChannel::new(3, 0, Reference::AiGround),
            StreamChannel::new(0, 0, Reference::AiGround),
        ];
        let buffer = [10, 11, 12, 20, 21, 22, 30];
        assert_eq!(extract_values(0, &buffer, &config, 100), vec![10, 12, 20, 22, 30]);
        assert_eq!(extract_values(3, &buffer, &config, 100), vec![11, 21]);
        assert_eq!(extract_values(0, &buffer, &config, 3), vec![10, 12, 20]);
        assert!(extract_values(7, &buffer, &config, 100).is_empty());
        assert!(extract_values(0, &buffer, &[], 100).is_empty());
    }

    #[test]
    fn test_ticks_conversions() {
        assert_eq!(period_to_ticks(1000, 0.25).unwrap(), 250);
        assert_eq!(period_to_ticks(1000, 0.0019).unwrap(), 1);
        assert_eq!(frequency_to_ticks(33_000_000, 1000.0).unwrap(), 33_000);
        assert_eq!(ticks_to_period(1000, 500).unwrap(), 0.5);
        assert_eq!(ticks_to_frequency(1000, 4).unwrap(), 250.0);
        assert!(ticks_to_frequency(1000, 0).unwrap().is_infinite());

        assert!(period_to_ticks(0, 1.0).is_err());
        assert!(period_to_ticks(1000, -1.0).is_err());
        assert!(frequency_to_ticks(1000, 0.0).is_err());
        assert!(ticks_to_period(-1, 1).is_err());
    }

    #[test]
    fn test_divider() {
        assert_eq!(code_divider(0.5), 0x8000_0000);
        assert_eq!(code_divider(-2.0), 0);
        assert_eq!(code_divider(1.0), u32::MAX);
        assert_eq!(decode_divider(0x8000_0000), 0.5);
        assert_eq!(decode_divider(0), 1.0);
    }
}
