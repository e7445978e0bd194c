use serde::{Deserialize, Serialize};
use std::mem::{offset_of, size_of};

/// Log identifier of the SMART/Health Information log page
pub const LOG_ID_SMART: u8 = 0x02;

/// Size in bytes of [`SmartInfo`], also the Get Log Page transfer length
pub const SMART_INFO_SIZE: usize = size_of::<SmartInfo>();

/// SMART/Health Information (Log Identifier 02h) as exchanged with callers.
///
/// The C layout of this struct is a binary contract: field order, widths and
/// natural-alignment padding must not change. Multi-byte fields are
/// little-endian, as NVMe reports them.
///
/// The transferred bytes are decoded at this struct's offsets, which differ
/// from the controller's log page past byte 0 (the page packs the temperature
/// into bytes 1-2 with no padding).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmartInfo {
    /// Bitmask of critical warnings
    pub critical_warning: u8,
    /// Composite temperature (Kelvin)
    pub composite_temperature: u16,
    /// Available spare percentage
    pub available_spare: u8,
    /// Spare threshold percentage
    pub available_spare_threshold: u8,
    /// Percentage of rated endurance used
    pub percentage_used: u8,
    /// Data units read, each 1000 * 512 bytes
    pub data_units_read: u64,
    /// Data units written, each 1000 * 512 bytes
    pub data_units_written: u64,
    pub power_on_hours: u64,
    pub unsafe_shutdowns: u32,
    /// Media and data integrity errors
    pub media_errors: u32,
}

// Layout guard
const _: () = assert!(SMART_INFO_SIZE == 40);

const OFF_CRITICAL_WARNING: usize = offset_of!(SmartInfo, critical_warning);
const OFF_TEMPERATURE: usize = offset_of!(SmartInfo, composite_temperature);
const OFF_AVAILABLE_SPARE: usize = offset_of!(SmartInfo, available_spare);
const OFF_SPARE_THRESHOLD: usize = offset_of!(SmartInfo, available_spare_threshold);
const OFF_PERCENTAGE_USED: usize = offset_of!(SmartInfo, percentage_used);
const OFF_DATA_UNITS_READ: usize = offset_of!(SmartInfo, data_units_read);
const OFF_DATA_UNITS_WRITTEN: usize = offset_of!(SmartInfo, data_units_written);
const OFF_POWER_ON_HOURS: usize = offset_of!(SmartInfo, power_on_hours);
const OFF_UNSAFE_SHUTDOWNS: usize = offset_of!(SmartInfo, unsafe_shutdowns);
const OFF_MEDIA_ERRORS: usize = offset_of!(SmartInfo, media_errors);

/// Bytes in one NVMe data unit
pub const DATA_UNIT_BYTES: u64 = 1000 * 512;

impl SmartInfo {
    /// Decode the record from the bytes the admin command transferred.
    /// Padding bytes are ignored.
    pub fn from_bytes(bytes: &[u8; SMART_INFO_SIZE]) -> Self {
        Self {
            critical_warning: bytes[OFF_CRITICAL_WARNING],
            composite_temperature: u16::from_le_bytes(field(bytes, OFF_TEMPERATURE)),
            available_spare: bytes[OFF_AVAILABLE_SPARE],
            available_spare_threshold: bytes[OFF_SPARE_THRESHOLD],
            percentage_used: bytes[OFF_PERCENTAGE_USED],
            data_units_read: u64::from_le_bytes(field(bytes, OFF_DATA_UNITS_READ)),
            data_units_written: u64::from_le_bytes(field(bytes, OFF_DATA_UNITS_WRITTEN)),
            power_on_hours: u64::from_le_bytes(field(bytes, OFF_POWER_ON_HOURS)),
            unsafe_shutdowns: u32::from_le_bytes(field(bytes, OFF_UNSAFE_SHUTDOWNS)),
            media_errors: u32::from_le_bytes(field(bytes, OFF_MEDIA_ERRORS)),
        }
    }

    /// Encode into the wire layout, zero-filling padding.
    pub fn to_bytes(&self) -> [u8; SMART_INFO_SIZE] {
        let mut bytes = [0u8; SMART_INFO_SIZE];
        bytes[OFF_CRITICAL_WARNING] = self.critical_warning;
        put(&mut bytes, OFF_TEMPERATURE, &self.composite_temperature.to_le_bytes());
        bytes[OFF_AVAILABLE_SPARE] = self.available_spare;
        bytes[OFF_SPARE_THRESHOLD] = self.available_spare_threshold;
        bytes[OFF_PERCENTAGE_USED] = self.percentage_used;
        put(&mut bytes, OFF_DATA_UNITS_READ, &self.data_units_read.to_le_bytes());
        put(&mut bytes, OFF_DATA_UNITS_WRITTEN, &self.data_units_written.to_le_bytes());
        put(&mut bytes, OFF_POWER_ON_HOURS, &self.power_on_hours.to_le_bytes());
        put(&mut bytes, OFF_UNSAFE_SHUTDOWNS, &self.unsafe_shutdowns.to_le_bytes());
        put(&mut bytes, OFF_MEDIA_ERRORS, &self.media_errors.to_le_bytes());
        bytes
    }

    /// Composite temperature in Celsius, for display only.
    pub fn temperature_celsius(&self) -> i32 {
        i32::from(self.composite_temperature) - 273
    }

    /// Bytes read, saturating on counters beyond u64 range
    pub fn bytes_read(&self) -> u64 {
        self.data_units_read.saturating_mul(DATA_UNIT_BYTES)
    }

    pub fn bytes_written(&self) -> u64 {
        self.data_units_written.saturating_mul(DATA_UNIT_BYTES)
    }
}

fn field<const N: usize>(bytes: &[u8; SMART_INFO_SIZE], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[offset..offset + N]);
    out
}

fn put(bytes: &mut [u8; SMART_INFO_SIZE], offset: usize, value: &[u8]) {
    bytes[offset..offset + value.len()].copy_from_slice(value);
}
