#![allow(dead_code)]
/// Common test helper functions
use nvme_access::{SmartInfo, SMART_INFO_SIZE};

/// Block contents that differ per LBA and per byte
pub fn pattern_block(lba: u64, block_size: usize) -> Vec<u8> {
    (0..block_size)
        .map(|i| (lba as usize).wrapping_mul(31).wrapping_add(i) as u8)
        .collect()
}

/// A log page as a healthy, moderately used drive reports it
pub fn healthy_smart_page() -> [u8; SMART_INFO_SIZE] {
    SmartInfo {
        critical_warning: 0,
        composite_temperature: 311,
        available_spare: 100,
        available_spare_threshold: 10,
        percentage_used: 4,
        data_units_read: 25_165_824,
        data_units_written: 18_874_368,
        power_on_hours: 8_760,
        unsafe_shutdowns: 17,
        media_errors: 0,
    }
    .to_bytes()
}

/// A log page hand-assembled byte by byte, independent of `SmartInfo`
pub fn raw_smart_page() -> [u8; SMART_INFO_SIZE] {
    let mut page = [0u8; SMART_INFO_SIZE];
    page[0] = 0x01; // spare below threshold
    page[2] = 0x5A; // 0x015A = 346 K
    page[3] = 0x01;
    page[4] = 5;
    page[5] = 10;
    page[6] = 0xFF; // vendor may exceed 100
    page[8..16].copy_from_slice(&[0x10, 0x32, 0x54, 0x76, 0x98, 0xBA, 0xDC, 0x0E]);
    page[16..24].copy_from_slice(&[0xEF, 0xCD, 0xAB, 0x89, 0x67, 0x45, 0x23, 0x01]);
    page[24..32].copy_from_slice(&[0x39, 0x30, 0, 0, 0, 0, 0, 0]); // 12345
    page[32..36].copy_from_slice(&[0x02, 0x01, 0, 0]); // 258
    page[36..40].copy_from_slice(&[0xFF, 0xFF, 0xFF, 0x7F]);
    page
}
