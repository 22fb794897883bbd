//! Measurement ranges and their lookup.
//!
//! A subdevice numbers its ranges from 0 across all units. The range index
//! is what `meIOSingleConfig` and stream channel lists take; [`Range`]
//! carries the limits needed to convert raw codes to physical values.

use tracing::debug;

use crate::address::SubdeviceAddr;
use crate::backend::MeidsBackend;
use crate::codes::{ModuleType, PredefinedRange, Unit};
use crate::conversion::{self, Clamped};
use crate::error::{ErrorCode, MeidsError, Result};
use crate::system::MeidsSystem;

/// One range of a subdevice.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Range index (for `single_config` and stream channel lists)
    pub index: i32,
    /// Physical unit of `min` and `max`
    pub unit: Unit,
    /// Physical value of code 0
    pub min: f64,
    /// Physical value of code `max_data`
    pub max: f64,
    /// Largest raw code
    pub max_data: i32,
}

impl Range {
    /// Width of the range in physical units.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Get the resolution in bits.
    pub fn resolution_bits(&self) -> u32 {
        if self.max_data <= 0 {
            0
        } else {
            (f64::from(self.max_data) + 1.0).log2() as u32
        }
    }

    /// Whether the range includes negative values.
    pub fn is_bipolar(&self) -> bool {
        self.min < 0.0
    }

    /// Whether `value` lies inside the range.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Raw code to physical value. Codes outside `0..=max_data` clamp to
    /// the range limits.
    pub fn to_physical(&self, data: i32) -> Result<Clamped<f64>> {
        conversion::digital_to_physical(self.min, self.max, self.max_data, data, ModuleType::None)
    }

    /// Physical value to raw code. Values outside the range clamp to
    /// `0` or `max_data`.
    pub fn to_digital(&self, value: f64) -> Result<Clamped<i32>> {
        conversion::physical_to_digital(self.min, self.max, self.max_data, value)
    }
}

impl std::fmt::Display for Range {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} [{}, {}] {} ({} bits)",
            self.index,
            self.min,
            self.max,
            self.unit.symbol(),
            self.resolution_bits()
        )
    }
}

impl PredefinedRange {
    /// Unit and nominal limits the range stands for.
    pub fn bounds(self) -> (Unit, f64, f64) {
        match self {
            PredefinedRange::Unipolar10V => (Unit::Volt, 0.0, 10.0),
            PredefinedRange::Bipolar10V => (Unit::Volt, -10.0, 10.0),
            PredefinedRange::Unipolar2_5V => (Unit::Volt, 0.0, 2.5),
            PredefinedRange::Bipolar2_5V => (Unit::Volt, -2.5, 2.5),
            PredefinedRange::Current0_20mA => (Unit::Ampere, 0.0, 20.0),
            PredefinedRange::Current4_20mA => (Unit::Ampere, 4.0, 20.0),
            PredefinedRange::Unipolar50V => (Unit::Volt, 0.0, 50.0),
        }
    }
}

/// Whether a device range is the nominal range `[min, max]`.
///
/// The minimum must match exactly; the device maximum may fall short of
/// the nominal one by up to one percent (one LSB on most boards).
fn strict_match(range: &Range, min: f64, max: f64) -> bool {
    range.min == min && range.max >= 0.99 * max && range.max <= max
}

impl<B: MeidsBackend> MeidsSystem<B> {
    /// Number of ranges of `addr` in `unit` ([`Unit::Any`] counts all).
    pub fn number_ranges(&self, addr: SubdeviceAddr, unit: Unit) -> Result<i32> {
        let mut number = 0;
        let status = self.backend().query_number_ranges(
            addr.device,
            addr.subdevice,
            unit.to_raw(),
            &mut number,
        );
        self.check("meQueryNumberRanges", status)?;
        Ok(number)
    }

    /// Limits of range `index`.
    pub fn range_info(&self, addr: SubdeviceAddr, index: i32) -> Result<Range> {
        let mut unit = 0;
        let mut min = 0.0;
        let mut max = 0.0;
        let mut max_data = 0;
        let status = self.backend().query_range_info(
            addr.device,
            addr.subdevice,
            index,
            &mut unit,
            &mut min,
            &mut max,
            &mut max_data,
        );
        self.check("meQueryRangeInfo", status)?;
        Ok(Range {
            index,
            unit: Unit::try_from(unit)?,
            min,
            max,
            max_data,
        })
    }

    /// Every range of `addr` in `unit`, in index order.
    pub fn ranges(&self, addr: SubdeviceAddr, unit: Unit) -> Result<Vec<Range>> {
        let total = self.number_ranges(addr, Unit::Any)?;
        let mut ranges = Vec::with_capacity(usize::try_from(total).unwrap_or(0));
        for index in 0..total {
            let range = self.range_info(addr, index)?;
            if unit == Unit::Any || range.unit == unit {
                ranges.push(range);
            }
        }
        Ok(ranges)
    }

    /// The narrowest range in `unit` that covers `[min, max]`, as chosen
    /// by the driver.
    pub fn range_by_min_max(
        &self,
        addr: SubdeviceAddr,
        unit: Unit,
        min: f64,
        max: f64,
    ) -> Result<Range> {
        let mut min = min;
        let mut max = max;
        let mut max_data = 0;
        let mut index = 0;
        let status = self.backend().query_range_by_min_max(
            addr.device,
            addr.subdevice,
            unit.to_raw(),
            &mut min,
            &mut max,
            &mut max_data,
            &mut index,
        );
        self.check("meQueryRangeByMinMax", status)?;

        let unit = match unit {
            Unit::Any => self.range_info(addr, index)?.unit,
            unit => unit,
        };
        Ok(Range {
            index,
            unit,
            min,
            max,
            max_data,
        })
    }

    /// The range that is nominally exactly `[min, max]` in `unit`.
    ///
    /// Unlike [`range_by_min_max`](Self::range_by_min_max) this never
    /// picks a wider range; it fails with [`ErrorCode::NoRange`] instead.
    pub fn strict_range(
        &self,
        addr: SubdeviceAddr,
        unit: Unit,
        min: f64,
        max: f64,
    ) -> Result<Range> {
        let found = self
            .ranges(addr, unit)?
            .into_iter()
            .find(|range| strict_match(range, min, max));
        match found {
            Some(range) => {
                debug!(%addr, index = range.index, min, max, "Resolved strict range");
                Ok(range)
            }
            None => Err(MeidsError::Driver {
                function: "meUtilityGetStrictRange",
                code: ErrorCode::NoRange,
            }),
        }
    }

    /// Resolve a well-known range to this subdevice's range index.
    pub fn predefined_range(&self, addr: SubdeviceAddr, range: PredefinedRange) -> Result<Range> {
        let (unit, min, max) = range.bounds();
        self.strict_range(addr, unit, min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    const AI: SubdeviceAddr = SubdeviceAddr::new(0, 1);

    fn system() -> MeidsSystem<MockBackend> {
        MeidsSystem::open(MockBackend::new()).unwrap()
    }

    #[test]
    fn test_ranges_listed_in_order() {
        let system = system();
        let ranges = system.ranges(AI, Unit::Volt).unwrap();
        assert_eq!(ranges.len(), 4);
        assert_eq!(ranges[0].index, 0);
        assert!(ranges[0].is_bipolar());
        assert_eq!(ranges[0].resolution_bits(), 16);
        assert!(system.ranges(AI, Unit::Ampere).unwrap().is_empty());
        assert_eq!(system.number_ranges(AI, Unit::Any).unwrap(), 4);
    }

    #[test]
    fn test_range_info_invalid_index() {
        let system = system();
        let err = system.range_info(AI, 9).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidRange));
    }

    #[test]
    fn test_range_by_min_max_picks_narrowest() {
        let system = system();
        let range = system.range_by_min_max(AI, Unit::Volt, 0.0, 2.0).unwrap();
        assert_eq!(range.index, 3);
        assert_eq!(range.min, 0.0);

        let any = system.range_by_min_max(AI, Unit::Any, -1.0, 1.0).unwrap();
        assert_eq!(any.index, 2);
        assert_eq!(any.unit, Unit::Volt);
    }

    #[test]
    fn test_predefined_ranges() {
        let system = system();
        let expected = [
            (PredefinedRange::Bipolar10V, 0),
            (PredefinedRange::Unipolar10V, 1),
            (PredefinedRange::Bipolar2_5V, 2),
            (PredefinedRange::Unipolar2_5V, 3),
        ];
        for (predefined, index) in expected {
            assert_eq!(system.predefined_range(AI, predefined).unwrap().index, index);
        }

        let err = system
            .predefined_range(AI, PredefinedRange::Current4_20mA)
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NoRange));
    }

    #[test]
    fn test_strict_range_rejects_wider() {
        let system = system();
        // Only a 10 V range covers 0..5 V, and it is not nominally 0..5 V.
        assert!(system.strict_range(AI, Unit::Volt, 0.0, 5.0).is_err());
    }

    #[test]
    fn test_strict_match_tolerance() {
        let range = Range {
            index: 0,
            unit: Unit::Volt,
            min: -10.0,
            max: 9.95,
            max_data: 0xFFFF,
        };
        assert!(strict_match(&range, -10.0, 10.0));
        assert!(!strict_match(&range, -10.0, 9.0));
        assert!(!strict_match(&range, -9.99, 10.0));
    }

    #[test]
    fn test_range_conversion() {
        let range = Range {
            index: 0,
            unit: Unit::Volt,
            min: 0.0,
            max: 10.0,
            max_data: 1000,
        };
        assert_eq!(range.to_digital(5.0).unwrap().value, 500);
        assert_eq!(range.to_physical(250).unwrap().value, 2.5);
        assert!(range.to_digital(11.0).unwrap().out_of_range);
        assert!(range.contains(10.0));
    }
}
