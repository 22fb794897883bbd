//! Device and subdevice discovery.

use tracing::debug;

use crate::address::SubdeviceAddr;
use crate::backend::{MeidsBackend, RawDeviceInfo};
use crate::codes::{BusType, Capability, PluggedState, SubdeviceSubtype, SubdeviceType, Unit};
use crate::error::{ErrorCode, Result};
use crate::flags::{SubdeviceCaps, SubdeviceTypes};
use crate::range::Range;
use crate::system::{c_buffer_to_string, MeidsSystem};

/// Snapshot of one subdevice.
#[derive(Debug, Clone, PartialEq)]
pub struct SubdeviceInfo {
    /// Where the subdevice lives
    pub addr: SubdeviceAddr,
    /// Subdevice type
    pub kind: SubdeviceType,
    /// Subdevice subtype
    pub subtype: SubdeviceSubtype,
    /// Number of channels
    pub channels: i32,
    /// Capability bits
    pub caps: SubdeviceCaps,
    /// Ranges in index order; empty for subdevices without ranges
    pub ranges: Vec<Range>,
}

/// Snapshot of one device and its subdevices.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceInfo {
    /// Device index
    pub index: i32,
    /// Board name, e.g. `ME-4680is`
    pub name: String,
    /// Kernel driver serving the board
    pub driver_name: String,
    /// Free-text description
    pub description: String,
    /// PCI vendor ID
    pub vendor_id: i32,
    /// Board model
    pub device_id: i32,
    /// Serial number
    pub serial_no: i32,
    /// Bus the board sits on
    pub bus_type: BusType,
    /// PCI bus
    pub bus_no: i32,
    /// PCI device
    pub dev_no: i32,
    /// PCI function
    pub func_no: i32,
    /// Whether the board is present
    pub plugged: PluggedState,
    /// Subdevices in index order
    pub subdevices: Vec<SubdeviceInfo>,
}

impl DeviceInfo {
    /// Subdevices of the given type.
    pub fn subdevices_of(&self, kind: SubdeviceType) -> impl Iterator<Item = &SubdeviceInfo> {
        self.subdevices.iter().filter(move |s| s.kind == kind)
    }
}

/// Version word as reported by the driver, e.g. `0x00020001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Version(pub i32);

impl Version {
    /// High 16 bits.
    pub fn major(self) -> u16 {
        ((self.0 as u32) >> 16) as u16
    }

    /// Low 16 bits.
    pub fn minor(self) -> u16 {
        (self.0 as u32 & 0xFFFF) as u16
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{} ({:#010x})", self.major(), self.minor(), self.0)
    }
}

impl<B: MeidsBackend> MeidsSystem<B> {
    // =========================================================================
    // Counts
    // =========================================================================

    /// Number of devices the driver knows, plugged in or not.
    pub fn number_devices(&self) -> Result<i32> {
        let mut number = 0;
        let status = self.backend().query_number_devices(&mut number);
        self.check("meQueryNumberDevices", status)?;
        Ok(number)
    }

    /// Number of subdevices on `device`.
    pub fn number_subdevices(&self, device: i32) -> Result<i32> {
        let mut number = 0;
        let status = self.backend().query_number_subdevices(device, &mut number);
        self.check("meQueryNumberSubdevices", status)?;
        Ok(number)
    }

    /// Number of channels of one subdevice.
    pub fn number_channels(&self, addr: SubdeviceAddr) -> Result<i32> {
        let mut number = 0;
        let status = self
            .backend()
            .query_number_channels(addr.device, addr.subdevice, &mut number);
        self.check("meQueryNumberChannels", status)?;
        Ok(number)
    }

    // =========================================================================
    // Device strings and info
    // =========================================================================

    /// Board name of `device`.
    pub fn device_name(&self, device: i32) -> Result<String> {
        let mut buffer = [0u8; meids_sys::ME_DEVICE_NAME_MAX_COUNT as usize];
        let status = self.backend().query_name_device(device, &mut buffer);
        self.check("meQueryNameDevice", status)?;
        Ok(c_buffer_to_string(&buffer))
    }

    /// Name of the kernel driver serving `device`.
    pub fn device_driver_name(&self, device: i32) -> Result<String> {
        let mut buffer = [0u8; meids_sys::ME_DEVICE_DRIVER_NAME_MAX_COUNT as usize];
        let status = self.backend().query_name_device_driver(device, &mut buffer);
        self.check("meQueryNameDeviceDriver", status)?;
        Ok(c_buffer_to_string(&buffer))
    }

    /// Free-text description of `device`.
    pub fn device_description(&self, device: i32) -> Result<String> {
        let mut buffer = [0u8; meids_sys::ME_DEVICE_DESCRIPTION_MAX_COUNT as usize];
        let status = self.backend().query_description_device(device, &mut buffer);
        self.check("meQueryDescriptionDevice", status)?;
        Ok(c_buffer_to_string(&buffer))
    }

    /// Raw `meQueryInfoDevice` fields.
    pub fn device_info_raw(&self, device: i32) -> Result<RawDeviceInfo> {
        let mut info = RawDeviceInfo::default();
        let status = self.backend().query_info_device(device, &mut info);
        self.check("meQueryInfoDevice", status)?;
        Ok(info)
    }

    /// Device id and serial number.
    pub fn serial_number(&self, device: i32) -> Result<(i32, i32)> {
        let info = self.device_info_raw(device)?;
        Ok((info.device_id, info.serial_no))
    }

    /// Everything the driver reports about `device`, subdevices included.
    pub fn device_info(&self, device: i32) -> Result<DeviceInfo> {
        let raw = self.device_info_raw(device)?;
        let count = self.number_subdevices(device)?;
        let subdevices = (0..count)
            .map(|subdevice| self.subdevice_info(SubdeviceAddr::new(device, subdevice)))
            .collect::<Result<Vec<_>>>()?;

        Ok(DeviceInfo {
            index: device,
            name: self.device_name(device)?,
            driver_name: self.device_driver_name(device)?,
            description: self.device_description(device)?,
            vendor_id: raw.vendor_id,
            device_id: raw.device_id,
            serial_no: raw.serial_no,
            bus_type: BusType::try_from(raw.bus_type)?,
            bus_no: raw.bus_no,
            dev_no: raw.dev_no,
            func_no: raw.func_no,
            plugged: PluggedState::try_from(raw.plugged)?,
            subdevices,
        })
    }

    /// [`device_info`](Self::device_info) for every device.
    pub fn devices(&self) -> Result<Vec<DeviceInfo>> {
        let count = self.number_devices()?;
        debug!(count, "Enumerating ME-iDS devices");
        (0..count).map(|device| self.device_info(device)).collect()
    }

    // =========================================================================
    // Subdevices
    // =========================================================================

    /// Type and subtype of one subdevice.
    pub fn subdevice_type(&self, addr: SubdeviceAddr) -> Result<(SubdeviceType, SubdeviceSubtype)> {
        let mut kind = 0;
        let mut subtype = 0;
        let status =
            self.backend()
                .query_subdevice_type(addr.device, addr.subdevice, &mut kind, &mut subtype);
        self.check("meQuerySubdeviceType", status)?;
        Ok((SubdeviceType::try_from(kind)?, SubdeviceSubtype::try_from(subtype)?))
    }

    /// Capability bits of one subdevice.
    pub fn subdevice_caps(&self, addr: SubdeviceAddr) -> Result<SubdeviceCaps> {
        let mut caps = 0;
        let status = self
            .backend()
            .query_subdevice_caps(addr.device, addr.subdevice, &mut caps);
        self.check("meQuerySubdeviceCaps", status)?;
        Ok(SubdeviceCaps::from_bits_retain(caps))
    }

    /// Up to `count` arguments of capability `cap` (FIFO size, counter
    /// width and so on).
    pub fn subdevice_caps_args(
        &self,
        addr: SubdeviceAddr,
        cap: Capability,
        count: usize,
    ) -> Result<Vec<i32>> {
        let mut args = vec![0; count];
        let status = self.backend().query_subdevice_caps_args(
            addr.device,
            addr.subdevice,
            cap.to_raw(),
            &mut args,
        );
        self.check("meQuerySubdeviceCapsArgs", status)?;
        Ok(args)
    }

    /// Type, channel count, caps and ranges of one subdevice.
    pub fn subdevice_info(&self, addr: SubdeviceAddr) -> Result<SubdeviceInfo> {
        let (kind, subtype) = self.subdevice_type(addr)?;
        let ranges = match self.ranges(addr, Unit::Any) {
            Ok(ranges) => ranges,
            Err(e) if e.code() == Some(ErrorCode::NotSupported) => Vec::new(),
            Err(e) => return Err(e),
        };
        Ok(SubdeviceInfo {
            addr,
            kind,
            subtype,
            channels: self.number_channels(addr)?,
            caps: self.subdevice_caps(addr)?,
            ranges,
        })
    }

    /// First subdevice at or after `start` of the given type.
    ///
    /// Returns `Ok(None)` when no further subdevice matches.
    pub fn find_subdevice(
        &self,
        device: i32,
        start: i32,
        kind: SubdeviceType,
        subtype: SubdeviceSubtype,
    ) -> Result<Option<SubdeviceAddr>> {
        let mut subdevice = 0;
        let status = self.backend().query_subdevice_by_type(
            device,
            start,
            kind.to_raw(),
            subtype.to_raw(),
            &mut subdevice,
        );
        match self.check("meQuerySubdeviceByType", status) {
            Ok(()) => Ok(Some(SubdeviceAddr::new(device, subdevice))),
            Err(e) if e.is_no_more_subdevices() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Every subdevice of `device` with the given type, in index order.
    pub fn subdevices_by_type(
        &self,
        device: i32,
        kind: SubdeviceType,
        subtype: SubdeviceSubtype,
    ) -> Result<Vec<SubdeviceAddr>> {
        let count = self.number_subdevices(device)?;
        let mut found = Vec::new();
        let mut start = 0;
        while start < count {
            match self.find_subdevice(device, start, kind, subtype)? {
                Some(addr) => {
                    found.push(addr);
                    start = addr.subdevice + 1;
                }
                None => break,
            }
        }
        Ok(found)
    }

    /// Number of subdevices of `device` with the given type.
    pub fn number_subdevices_by_type(
        &self,
        device: i32,
        kind: SubdeviceType,
        subtype: SubdeviceSubtype,
    ) -> Result<usize> {
        Ok(self.subdevices_by_type(device, kind, subtype)?.len())
    }

    /// Whether the subdevice's type is in `types`.
    pub fn subdevice_matches(&self, addr: SubdeviceAddr, types: SubdeviceTypes) -> Result<bool> {
        let (kind, _) = self.subdevice_type(addr)?;
        Ok(types.matches(kind))
    }

    /// Whether the subdevice reports every capability in `caps`.
    pub fn subdevice_has_caps(&self, addr: SubdeviceAddr, caps: SubdeviceCaps) -> Result<bool> {
        Ok(self.subdevice_caps(addr)?.contains(caps))
    }

    /// Whether the subdevice has a type in `types` and every capability in `caps`.
    pub fn subdevice_matches_with_caps(
        &self,
        addr: SubdeviceAddr,
        types: SubdeviceTypes,
        caps: SubdeviceCaps,
    ) -> Result<bool> {
        Ok(self.subdevice_matches(addr, types)? && self.subdevice_has_caps(addr, caps)?)
    }

    /// Subdevices of `device` whose type is in `types`.
    pub fn number_subdevices_by_types(&self, device: i32, types: SubdeviceTypes) -> Result<usize> {
        self.number_subdevices_by_types_and_caps(device, types, SubdeviceCaps::empty())
    }

    /// Subdevices of `device` whose type is in `types` and which have all
    /// of `caps`.
    pub fn number_subdevices_by_types_and_caps(
        &self,
        device: i32,
        types: SubdeviceTypes,
        caps: SubdeviceCaps,
    ) -> Result<usize> {
        let mut found = 0;
        for subdevice in 0..self.number_subdevices(device)? {
            let addr = SubdeviceAddr::new(device, subdevice);
            if self.subdevice_matches_with_caps(addr, types, caps)? {
                found += 1;
            }
        }
        Ok(found)
    }

    /// Indices of the devices currently plugged in.
    fn plugged_devices(&self) -> Result<Vec<(i32, RawDeviceInfo)>> {
        let mut plugged = Vec::new();
        for device in 0..self.number_devices()? {
            let info = self.device_info_raw(device)?;
            if info.plugged == PluggedState::In.to_raw() {
                plugged.push((device, info));
            }
        }
        Ok(plugged)
    }

    /// Plugged-in devices whose device ID equals `id` in the bits of
    /// `mask`.
    pub fn number_devices_by_id(&self, id: i32, mask: i32) -> Result<usize> {
        let count = self
            .plugged_devices()?
            .into_iter()
            .filter(|(_, info)| info.device_id & mask == id & mask)
            .count();
        debug!(id, mask, count, "Counted devices by ID");
        Ok(count)
    }

    /// Plugged-in devices with at least one subdevice of a type in `types`.
    pub fn number_devices_by_types(&self, types: SubdeviceTypes) -> Result<usize> {
        self.number_devices_by_types_and_caps(types, SubdeviceCaps::empty())
    }

    /// [`number_devices_by_types`](Self::number_devices_by_types), counting only
    /// subdevices that also have every capability in `caps`.
    pub fn number_devices_by_types_and_caps(
        &self,
        types: SubdeviceTypes,
        caps: SubdeviceCaps,
    ) -> Result<usize> {
        let mut found = 0;
        for (device, _) in self.plugged_devices()? {
            if self.number_subdevices_by_types_and_caps(device, types, caps)? > 0 {
                found += 1;
            }
        }
        Ok(found)
    }

    // =========================================================================
    // Versions
    // =========================================================================

    /// Version of the user-space library.
    pub fn library_version(&self) -> Result<Version> {
        let mut version = 0;
        let status = self.backend().query_version_library(&mut version);
        self.check("meQueryVersionLibrary", status)?;
        Ok(Version(version))
    }

    /// Version of the main kernel driver.
    pub fn main_driver_version(&self) -> Result<Version> {
        let mut version = 0;
        let status = self.backend().query_version_main_driver(&mut version);
        self.check("meQueryVersionMainDriver", status)?;
        Ok(Version(version))
    }

    /// Version of the driver serving `device`.
    pub fn device_driver_version(&self, device: i32) -> Result<Version> {
        let mut version = 0;
        let status = self.backend().query_version_device_driver(device, &mut version);
        self.check("meQueryVersionDeviceDriver", status)?;
        Ok(Version(version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBackend, MockDevice, MOCK_VERSION};

    fn system() -> MeidsSystem<MockBackend> {
        MeidsSystem::open(MockBackend::new()).unwrap()
    }

    #[test]
    fn test_counts() {
        let system = system();
        assert_eq!(system.number_devices().unwrap(), 1);
        assert_eq!(system.number_subdevices(0).unwrap(), 7);
        assert_eq!(system.number_channels(SubdeviceAddr::new(0, 1)).unwrap(), 8);

        let err = system.number_subdevices(3).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidDevice));
    }

    #[test]
    fn test_device_info_snapshot() {
        let system = system();
        let info = system.device_info(0).unwrap();
        assert_eq!(info.name, "ME-4680is");
        assert_eq!(info.driver_name, "me4600");
        assert_eq!(info.serial_no, 1001);
        assert_eq!(info.plugged, PluggedState::In);
        assert_eq!(info.subdevices.len(), 7);

        let ai = &info.subdevices[1];
        assert_eq!(ai.kind, SubdeviceType::AnalogInput);
        assert_eq!(ai.subtype, SubdeviceSubtype::Streaming);
        assert!(ai.caps.contains(SubdeviceCaps::AI_FIFO));
        assert_eq!(ai.ranges.len(), 4);
        assert!(info.subdevices[2].ranges.is_empty());
        assert_eq!(info.subdevices_of(SubdeviceType::Counter).count(), 1);

        assert_eq!(system.serial_number(0).unwrap(), (0x4680, 1001));
    }

    #[test]
    fn test_devices_lists_all() {
        let backend = MockBackend::with_devices(vec![
            MockDevice::multifunction(1),
            MockDevice::new("empty"),
        ]);
        let system = MeidsSystem::open(backend).unwrap();
        let devices = system.devices().unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].name, "empty");
        assert!(devices[1].subdevices.is_empty());
    }

    #[test]
    fn test_find_subdevice() {
        let system = system();
        let ai = system
            .find_subdevice(0, 0, SubdeviceType::AnalogInput, SubdeviceSubtype::Any)
            .unwrap();
        assert_eq!(ai, Some(SubdeviceAddr::new(0, 1)));

        let none = system
            .find_subdevice(0, 2, SubdeviceType::AnalogInput, SubdeviceSubtype::Any)
            .unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_subdevices_by_type() {
        let backend = MockBackend::with_devices(vec![MockDevice::multifunction(1)
            .with_subdevice(crate::mock::MockSubdevice::new(
                SubdeviceType::DigitalIo,
                SubdeviceSubtype::Single,
                8,
            ))]);
        let system = MeidsSystem::open(backend).unwrap();
        let dio = system
            .subdevices_by_type(0, SubdeviceType::DigitalIo, SubdeviceSubtype::Any)
            .unwrap();
        assert_eq!(dio, vec![SubdeviceAddr::new(0, 4), SubdeviceAddr::new(0, 7)]);
        assert_eq!(
            system
                .number_subdevices_by_type(0, SubdeviceType::Fpga, SubdeviceSubtype::Any)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_subdevice_checks() {
        let system = system();
        let ai = SubdeviceAddr::new(0, 1);
        let analog = SubdeviceTypes::AI | SubdeviceTypes::AO;
        assert!(system.subdevice_matches(ai, analog).unwrap());
        assert!(!system.subdevice_matches(ai, SubdeviceTypes::DIO).unwrap());

        let fifo = SubdeviceCaps::AI_FIFO | SubdeviceCaps::AI_DIFFERENTIAL;
        assert!(system.subdevice_has_caps(ai, fifo).unwrap());
        assert!(!system.subdevice_has_caps(ai, SubdeviceCaps::AI_FIFO_THRESHOLD).unwrap());
        assert!(system.subdevice_has_caps(ai, SubdeviceCaps::empty()).unwrap());

        assert!(system.subdevice_matches_with_caps(ai, analog, fifo).unwrap());
        assert!(!system
            .subdevice_matches_with_caps(SubdeviceAddr::new(0, 0), analog, fifo)
            .unwrap());

        let err = system
            .subdevice_matches(SubdeviceAddr::new(0, 20), analog)
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidSubdevice));
    }

    #[test]
    fn test_subdevice_counts_by_types() {
        let system = system();
        let digital = SubdeviceTypes::DI | SubdeviceTypes::DO | SubdeviceTypes::DIO;
        assert_eq!(system.number_subdevices_by_types(0, digital).unwrap(), 3);
        assert_eq!(system.number_subdevices_by_types(0, SubdeviceTypes::all()).unwrap(), 7);
        assert_eq!(system.number_subdevices_by_types(0, SubdeviceTypes::empty()).unwrap(), 0);
        assert_eq!(
            system
                .number_subdevices_by_types_and_caps(0, digital, SubdeviceCaps::DIO_BIT_PATTERN_IRQ)
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_device_counts_skip_unplugged() {
        let unplugged = MockDevice {
            plugged: PluggedState::Out,
            ..MockDevice::multifunction(2)
        };
        let counter_only = MockDevice {
            device_id: 0x1400,
            ..MockDevice::new("ME-1400")
        }
        .with_subdevice(crate::mock::MockSubdevice::new(
            SubdeviceType::Counter,
            SubdeviceSubtype::Ctr8254,
            3,
        ));
        let backend =
            MockBackend::with_devices(vec![MockDevice::multifunction(1), unplugged, counter_only]);
        let system = MeidsSystem::open(backend).unwrap();

        assert_eq!(system.number_devices_by_id(0x4680, -1).unwrap(), 1);
        assert_eq!(system.number_devices_by_id(0x4600, 0xff00).unwrap(), 1);
        assert_eq!(system.number_devices_by_id(0, 0).unwrap(), 2);

        assert_eq!(system.number_devices_by_types(SubdeviceTypes::CTR).unwrap(), 2);
        assert_eq!(system.number_devices_by_types(SubdeviceTypes::AI).unwrap(), 1);
        assert_eq!(
            system
                .number_devices_by_types_and_caps(
                    SubdeviceTypes::CTR,
                    SubdeviceCaps::CTR_CLK_EXTERNAL,
                )
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_caps_args() {
        let system = system();
        let fifo = system
            .subdevice_caps_args(SubdeviceAddr::new(0, 0), Capability::AoFifoSize, 1)
            .unwrap();
        assert_eq!(fifo, vec![4096]);

        let err = system
            .subdevice_caps_args(SubdeviceAddr::new(0, 0), Capability::CtrWidth, 1)
            .unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidCap));
    }

    #[test]
    fn test_versions() {
        let system = system();
        let version = system.library_version().unwrap();
        assert_eq!(version, Version(MOCK_VERSION));
        assert_eq!(version.major(), 2);
        assert_eq!(version.minor(), 1);
        assert_eq!(system.main_driver_version().unwrap(), version);
        assert!(system.device_driver_version(5).is_err());
    }
}
