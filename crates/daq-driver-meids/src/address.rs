//! Device, subdevice and channel addressing.

use std::fmt;

/// A subdevice on a device, both as driver indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubdeviceAddr {
    /// Device index (0-based, as enumerated by the driver)
    pub device: i32,
    /// Subdevice index within the device
    pub subdevice: i32,
}

impl SubdeviceAddr {
    /// Address subdevice `subdevice` of device `device`.
    pub const fn new(device: i32, subdevice: i32) -> Self {
        Self { device, subdevice }
    }

    /// Address one channel of this subdevice.
    pub const fn channel(self, channel: i32) -> ChannelAddr {
        ChannelAddr {
            device: self.device,
            subdevice: self.subdevice,
            channel,
        }
    }
}

impl fmt::Display for SubdeviceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device, self.subdevice)
    }
}

/// A single channel of a subdevice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelAddr {
    /// Device index
    pub device: i32,
    /// Subdevice index on the device
    pub subdevice: i32,
    /// Channel index on the subdevice
    pub channel: i32,
}

impl ChannelAddr {
    /// Address channel `channel` of subdevice `subdevice` on device `device`.
    pub const fn new(device: i32, subdevice: i32, channel: i32) -> Self {
        Self {
            device,
            subdevice,
            channel,
        }
    }

    /// The subdevice this channel belongs to.
    pub const fn subdevice_addr(self) -> SubdeviceAddr {
        SubdeviceAddr::new(self.device, self.subdevice)
    }
}

impl fmt::Display for ChannelAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.device, self.subdevice, self.channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_of_subdevice() {
        let ao = SubdeviceAddr::new(0, 2);
        let ch = ao.channel(3);
        assert_eq!(ch, ChannelAddr::new(0, 2, 3));
        assert_eq!(ch.subdevice_addr(), ao);
        assert_eq!(ch.to_string(), "0/2/3");
    }
}
