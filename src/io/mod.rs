pub mod platform_specific;


// Re-exports
pub use platform_specific::{DeviceBackend, DeviceHandle, SystemBackend};

use crate::{DeviceError, DeviceResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroUsize;

/// How a device handle is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
}

/// Logical block address, the device-relative index of a fixed-size block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Lba(pub u64);

impl Lba {
    /// Byte offset of this block: `lba * block_size`.
    ///
    /// Offsets that overflow or do not fit in a signed file offset (`off_t`)
    /// are rejected instead of wrapping.
    pub fn byte_offset(self, block_size: BlockSize) -> DeviceResult<u64> {
        self.0
            .checked_mul(block_size.get() as u64)
            .filter(|offset| *offset <= i64::MAX as u64)
            .ok_or_else(|| {
                DeviceError::InvalidArgument(format!(
                    "offset of LBA {} with block size {} overflows",
                    self.0,
                    block_size.get()
                ))
            })
    }
}

impl From<u64> for Lba {
    fn from(value: u64) -> Self {
        Lba(value)
    }
}

impl fmt::Display for Lba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Size in bytes of one logical block, always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockSize(NonZeroUsize);

impl BlockSize {
    /// The usual NVMe LBA format
    pub const DEFAULT: BlockSize = match NonZeroUsize::new(4096) {
        Some(size) => BlockSize(size),
        None => unreachable!(),
    };

    pub fn new(bytes: usize) -> DeviceResult<Self> {
        NonZeroUsize::new(bytes)
            .map(BlockSize)
            .ok_or_else(|| DeviceError::InvalidArgument("block size must be non-zero".to_string()))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }

    /// Borrow exactly one block from the front of `buffer`.
    pub fn block_of<'a>(&self, buffer: &'a [u8]) -> DeviceResult<&'a [u8]> {
        self.check_len(buffer.len())?;
        Ok(&buffer[..self.get()])
    }

    /// Mutable form of [`BlockSize::block_of`].
    pub fn block_of_mut<'a>(&self, buffer: &'a mut [u8]) -> DeviceResult<&'a mut [u8]> {
        self.check_len(buffer.len())?;
        Ok(&mut buffer[..self.get()])
    }

    fn check_len(&self, len: usize) -> DeviceResult<()> {
        if len < self.get() {
            return Err(DeviceError::InvalidArgument(format!(
                "buffer of {} bytes is smaller than block size {}",
                len,
                self.get()
            )));
        }
        Ok(())
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        BlockSize::DEFAULT
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}
