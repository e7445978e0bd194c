//! C ABI for callers outside Rust.
//!
//! Every function returns `0` on success or a negative errno on failure:
//!
//! | status    | cause                                            |
//! |-----------|--------------------------------------------------|
//! | `-EINVAL` | null pointer, zero block size, non-UTF-8 path    |
//! | `-ENOENT` | device does not exist (`-ENODEV`, `-ENXIO` kept) |
//! | `-EACCES` | insufficient permissions (`-EPERM` kept)         |
//! | `-EROFS`  | write to a read-only device                      |
//! | `-EIO`    | transfer failed, short transfer, NVMe status     |
//!
//! Other driver errors are passed through as their negative errno. Buffers are
//! owned by the caller and never retained after a call returns.

use crate::device_access::DeviceAccess;
use crate::io::SystemBackend;
use crate::nvme::SmartInfo;
use crate::{DeviceError, DeviceResult};
use libc::{c_char, c_int, c_void};
use std::ffi::CStr;

/// Read the SMART/Health log of `device_path` (e.g. `/dev/nvme0`) into `info`.
///
/// `info` is written only on success.
///
/// # Safety
///
/// `device_path` must be null or a valid NUL-terminated string. `info` must be
/// null or valid for writes of one `SmartInfo`.
#[no_mangle]
pub unsafe extern "C" fn nvme_access_read_smart(
    device_path: *const c_char,
    info: *mut SmartInfo,
) -> c_int {
    if info.is_null() {
        return -libc::EINVAL;
    }
    status(path_arg(device_path).and_then(|path| {
        let smart = DeviceAccess::<SystemBackend>::new().read_smart_log(path)?;
        // SAFETY: non-null and valid for writes per the contract above
        unsafe { info.write(smart) };
        Ok(())
    }))
}

/// Read block `lba` of `device_path` (e.g. `/dev/nvme0n1`) into `buffer`.
///
/// # Safety
///
/// `device_path` must be null or a valid NUL-terminated string. `buffer` must
/// be null or valid for writes of `block_size` bytes.
#[no_mangle]
pub unsafe extern "C" fn nvme_access_read_block(
    device_path: *const c_char,
    lba: u64,
    buffer: *mut c_void,
    block_size: usize,
) -> c_int {
    if buffer.is_null() || block_size == 0 {
        return -libc::EINVAL;
    }
    status(path_arg(device_path).and_then(|path| {
        // SAFETY: non-null and valid for `block_size` bytes per the contract
        let block = unsafe { std::slice::from_raw_parts_mut(buffer.cast::<u8>(), block_size) };
        DeviceAccess::<SystemBackend>::new().read_block(path, lba, block, block_size)
    }))
}

/// Write `buffer` to block `lba` of `device_path`.
///
/// # Safety
///
/// `device_path` must be null or a valid NUL-terminated string. `buffer` must
/// be null or valid for reads of `block_size` bytes.
#[no_mangle]
pub unsafe extern "C" fn nvme_access_write_block(
    device_path: *const c_char,
    lba: u64,
    buffer: *const c_void,
    block_size: usize,
) -> c_int {
    if buffer.is_null() || block_size == 0 {
        return -libc::EINVAL;
    }
    status(path_arg(device_path).and_then(|path| {
        // SAFETY: non-null and valid for `block_size` bytes per the contract
        let block = unsafe { std::slice::from_raw_parts(buffer.cast::<u8>(), block_size) };
        DeviceAccess::<SystemBackend>::new().write_block(path, lba, block, block_size)
    }))
}

/// Borrow a C path argument.
///
/// # Safety
///
/// `device_path` must be null or point to a NUL-terminated string that
/// outlives the returned reference.
unsafe fn path_arg<'a>(device_path: *const c_char) -> DeviceResult<&'a str> {
    if device_path.is_null() {
        return Err(DeviceError::InvalidArgument(
            "device path is null".to_string(),
        ));
    }
    // SAFETY: non-null and NUL-terminated per the contract above
    unsafe { CStr::from_ptr(device_path) }
        .to_str()
        .map_err(|_| DeviceError::InvalidArgument("device path is not UTF-8".to_string()))
}

fn status(result: DeviceResult<()>) -> c_int {
    match result {
        Ok(()) => 0,
        Err(err) => {
            tracing::debug!(status = err.errno(), error = %err, "Returning error status");
            err.errno()
        }
    }
}
