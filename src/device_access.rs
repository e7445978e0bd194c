//! The three device operations.
//!
//! Every call opens its own handle, performs exactly one transfer and closes
//! the handle before returning, on success and on every error path. Argument
//! validation happens before the device is touched.

use crate::io::{AccessMode, BlockSize, DeviceBackend, DeviceHandle, Lba, SystemBackend};
use crate::nvme::{AdminCommand, SmartInfo, LOG_ID_SMART, NSID_ALL, SMART_INFO_SIZE};
use crate::{DeviceError, DeviceResult, Operation};

/// Stateless entry point over a [`DeviceBackend`].
///
/// The backend only opens handles; no handle or buffer is kept between calls,
/// so one `DeviceAccess` can be shared freely across threads.
#[derive(Debug, Default, Clone)]
pub struct DeviceAccess<B: DeviceBackend = SystemBackend> {
    backend: B,
}

impl DeviceAccess<SystemBackend> {
    pub fn new() -> Self {
        Self {
            backend: SystemBackend::new(),
        }
    }
}

impl<B: DeviceBackend> DeviceAccess<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Fetch the SMART/Health log page (Log ID 0x02, all namespaces).
    pub fn read_smart_log(&self, device_path: &str) -> DeviceResult<SmartInfo> {
        let operation = Operation::ReadSmartLog;
        validate_path(device_path)?;
        let command = AdminCommand::get_log_page(LOG_ID_SMART, NSID_ALL, SMART_INFO_SIZE)?;

        tracing::debug!(
            device = %device_path,
            cdw10 = format_args!("{:#010x}", command.cdw10),
            "Reading SMART log page"
        );

        let mut handle = self.open(device_path, AccessMode::ReadOnly, operation)?;
        let mut page = [0u8; SMART_INFO_SIZE];
        let status = handle
            .admin_command(&command, &mut page)
            .map_err(|e| DeviceError::from_io(e, operation, device_path))?;

        if status != 0 {
            tracing::warn!(
                device = %device_path,
                status = format_args!("{:#06x}", status),
                "Get Log Page completed with error status"
            );
            return Err(DeviceError::IoFailure {
                operation,
                errno: libc::EIO,
                message: format!(
                    "{}: Get Log Page completed with NVMe status {:#06x}",
                    device_path, status
                ),
            });
        }

        Ok(SmartInfo::from_bytes(&page))
    }

    /// Read exactly one block at `lba` into the front of `buffer`.
    ///
    /// `buffer` may be larger than `block_size`; only the first `block_size`
    /// bytes are transferred. A short read is an error.
    pub fn read_block(
        &self,
        device_path: &str,
        lba: impl Into<Lba>,
        buffer: &mut [u8],
        block_size: usize,
    ) -> DeviceResult<()> {
        let operation = Operation::ReadBlock;
        let lba = lba.into();
        validate_path(device_path)?;
        let block_size = BlockSize::new(block_size)?;
        let block = block_size.block_of_mut(buffer)?;
        let offset = lba.byte_offset(block_size)?;

        tracing::debug!(device = %device_path, %lba, %block_size, offset, "Reading block");

        let mut handle = self.open(device_path, AccessMode::ReadOnly, operation)?;
        let read = handle
            .read_at(block, offset)
            .map_err(|e| DeviceError::from_io(e, operation, device_path))?;

        check_transfer(operation, device_path, read, block_size)
    }

    /// Write exactly one block at `lba` from the front of `buffer`.
    pub fn write_block(
        &self,
        device_path: &str,
        lba: impl Into<Lba>,
        buffer: &[u8],
        block_size: usize,
    ) -> DeviceResult<()> {
        let operation = Operation::WriteBlock;
        let lba = lba.into();
        validate_path(device_path)?;
        let block_size = BlockSize::new(block_size)?;
        let block = block_size.block_of(buffer)?;
        let offset = lba.byte_offset(block_size)?;

        tracing::debug!(device = %device_path, %lba, %block_size, offset, "Writing block");

        let mut handle = self.open(device_path, AccessMode::WriteOnly, operation)?;
        let written = handle
            .write_at(block, offset)
            .map_err(|e| DeviceError::from_io(e, operation, device_path))?;

        check_transfer(operation, device_path, written, block_size)
    }

    fn open(
        &self,
        device_path: &str,
        mode: AccessMode,
        operation: Operation,
    ) -> DeviceResult<Box<dyn DeviceHandle>> {
        self.backend.open(device_path, mode).map_err(|e| {
            tracing::debug!(device = %device_path, ?mode, error = %e, "Open failed");
            DeviceError::from_io(e, operation, device_path)
        })
    }
}

fn validate_path(device_path: &str) -> DeviceResult<()> {
    if device_path.is_empty() {
        return Err(DeviceError::InvalidArgument(
            "device path must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn check_transfer(
    operation: Operation,
    device_path: &str,
    transferred: usize,
    block_size: BlockSize,
) -> DeviceResult<()> {
    if transferred != block_size.get() {
        tracing::warn!(
            device = %device_path,
            transferred,
            expected = block_size.get(),
            "Short transfer during {}",
            operation
        );
        return Err(DeviceError::short_transfer(
            operation,
            device_path,
            transferred,
            block_size.get(),
        ));
    }
    Ok(())
}

/// [`DeviceAccess::read_smart_log`] on the system backend
pub fn read_smart_log(device_path: &str) -> DeviceResult<SmartInfo> {
    DeviceAccess::<SystemBackend>::new().read_smart_log(device_path)
}

/// [`DeviceAccess::read_block`] on the system backend
pub fn read_block(
    device_path: &str,
    lba: impl Into<Lba>,
    buffer: &mut [u8],
    block_size: usize,
) -> DeviceResult<()> {
    DeviceAccess::<SystemBackend>::new().read_block(device_path, lba, buffer, block_size)
}

/// [`DeviceAccess::write_block`] on the system backend
pub fn write_block(
    device_path: &str,
    lba: impl Into<Lba>,
    buffer: &[u8],
    block_size: usize,
) -> DeviceResult<()> {
    DeviceAccess::<SystemBackend>::new().write_block(device_path, lba, buffer, block_size)
}
