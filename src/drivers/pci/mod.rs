//! PCI device identity and lookup
//!
//! The southbridge code never walks the bus itself. It asks a
//! [`DeviceLocator`] for a device by (vendor, device, instance) and gets back
//! an opaque [`DeviceHandle`], or nothing if the function is not present on
//! this board.

pub mod access;

use heapless::Vec;

use self::access::ConfigSpace;
use crate::drivers::Result;

/// Maximum number of PCI devices we can track
const MAX_PCI_DEVICES: usize = 32;

/// Invalid vendor ID (no device present)
const INVALID_VENDOR_ID: u16 = 0xFFFF;

/// Multi-function bit in the header type register
const HEADER_TYPE_MULTI_FUNCTION: u8 = 0x80;

/// PCI device location (Bus:Device.Function)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PciAddress {
    pub bus: u8,
    pub device: u8,
    pub function: u8,
}

impl PciAddress {
    pub const fn new(bus: u8, device: u8, function: u8) -> Self {
        Self {
            bus,
            device,
            function,
        }
    }

    /// Calculate legacy CAM address for a register
    pub const fn cam_address(&self, offset: u8) -> u32 {
        let mut addr = 1u32 << 31; // Enable bit
        addr |= (self.bus as u32) << 16;
        addr |= (self.device as u32) << 11;
        addr |= (self.function as u32) << 8;
        addr |= (offset as u32) & 0xFC; // Must be 4-byte aligned
        addr
    }
}

impl core::fmt::Display for PciAddress {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02x}:{:02x}.{}", self.bus, self.device, self.function)
    }
}

/// Vendor/device identity used for lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceId {
    pub vendor: u16,
    pub device: u16,
}

impl DeviceId {
    pub const fn new(vendor: u16, device: u16) -> Self {
        Self { vendor, device }
    }
}

impl core::fmt::Display for DeviceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor, self.device)
    }
}

/// Handle to a located device
///
/// Valid for one initialization pass only; it is a location, not a
/// reference into the device tree, so holding it longer would hide a later
/// re-enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DeviceHandle {
    address: PciAddress,
}

impl DeviceHandle {
    pub const fn new(address: PciAddress) -> Self {
        Self { address }
    }

    pub const fn address(&self) -> PciAddress {
        self.address
    }
}

impl core::fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.address.fmt(f)
    }
}

/// Lookup-by-identity service
pub trait DeviceLocator {
    /// Find the `instance`-th device (in enumeration order) matching `id`
    ///
    /// Absence is a normal outcome; callers skip whatever depended on it.
    fn find_device(&self, id: DeviceId, instance: usize) -> Option<DeviceHandle>;
}

/// An enumerated PCI function
#[derive(Debug, Clone, Copy)]
pub struct PciDevice {
    pub address: PciAddress,
    pub id: DeviceId,
    pub header_type: u8,
}

/// Devices found on the bus, in scan order
#[derive(Debug, Default)]
pub struct DeviceTable {
    devices: Vec<PciDevice, MAX_PCI_DEVICES>,
}

impl DeviceTable {
    pub const fn new() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// Record a device; returns `false` when the table is full
    pub fn push(&mut self, device: PciDevice) -> bool {
        self.devices.push(device).is_ok()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PciDevice> {
        self.devices.iter()
    }

    /// Enumerate one bus
    ///
    /// Geode LX systems have a single PCI segment with every CS5536 function
    /// on bus 0, so nothing behind bridges is walked.
    pub fn scan_bus<C: ConfigSpace + ?Sized>(config: &mut C, bus: u8) -> Result<Self> {
        let mut table = Self::new();

        for device in 0..32u8 {
            let Some(dev) = read_function(config, PciAddress::new(bus, device, 0))? else {
                continue;
            };
            let functions = if dev.header_type & HEADER_TYPE_MULTI_FUNCTION != 0 {
                8
            } else {
                1
            };
            if !table.push(dev) {
                log::warn!("PCI device list full!");
                return Ok(table);
            }

            for function in 1..functions {
                if let Some(dev) = read_function(config, PciAddress::new(bus, device, function))? {
                    if !table.push(dev) {
                        log::warn!("PCI device list full!");
                        return Ok(table);
                    }
                }
            }
        }

        log::info!("PCI bus {} scan complete: {} devices found", bus, table.len());
        Ok(table)
    }
}

impl DeviceLocator for DeviceTable {
    fn find_device(&self, id: DeviceId, instance: usize) -> Option<DeviceHandle> {
        self.devices
            .iter()
            .filter(|dev| dev.id == id)
            .nth(instance)
            .map(|dev| DeviceHandle::new(dev.address))
    }
}

/// Read the identity of one function, if present
fn read_function<C: ConfigSpace + ?Sized>(config: &mut C, address: PciAddress) -> Result<Option<PciDevice>> {
    let handle = DeviceHandle::new(address);
    let ids = config.config_read32(handle, 0x00)?;
    let vendor = (ids & 0xFFFF) as u16;
    if vendor == INVALID_VENDOR_ID {
        return Ok(None);
    }

    let header_type = config.config_read8(handle, 0x0E)?;
    let dev = PciDevice {
        address,
        id: DeviceId::new(vendor, (ids >> 16) as u16),
        header_type,
    };
    log::debug!("PCI {}: {}", dev.address, dev.id);
    Ok(Some(dev))
}
