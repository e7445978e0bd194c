// Allow uppercase acronyms for industry-standard terms like NVMe, SMART, LBA
#![allow(clippy::upper_case_acronyms)]

//! Minimal NVMe device access layer.
//!
//! Three operations, each fully self-contained (open, one system call, close):
//! - [`read_smart_log`]: fetch the SMART/Health log page (Log ID 0x02) through
//!   the NVMe admin "Get Log Page" command
//! - [`read_block`]: positioned read of exactly one logical block
//! - [`write_block`]: positioned write of exactly one logical block
//!
//! Nothing is cached between calls. Callers own every buffer.

pub mod config;
pub mod device_access;
pub mod ffi;
pub mod io;
pub mod nvme;

pub use device_access::{read_block, read_smart_log, write_block, DeviceAccess};
pub use io::platform_specific::{DeviceBackend, DeviceHandle, SystemBackend};
pub use io::{AccessMode, BlockSize, Lba};
pub use nvme::{AdminCommand, SmartInfo, SMART_INFO_SIZE};

use std::fmt;
use thiserror::Error;

/// Operation in progress when an error surfaced, used for error context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ReadSmartLog,
    ReadBlock,
    WriteBlock,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::ReadSmartLog => "read SMART log",
            Operation::ReadBlock => "read block",
            Operation::WriteBlock => "write block",
        };
        f.write_str(name)
    }
}

/// Every failure this layer can report. Causes are never merged or hidden.
#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// `errno` is the OS code that was reported (`ENOENT`, `ENODEV`, `ENXIO`).
    #[error("Device not found: {message}")]
    NotFound { errno: i32, message: String },

    /// `errno` is the OS code that was reported (`EACCES`, `EPERM`).
    #[error("Insufficient permissions: {message}")]
    PermissionDenied { errno: i32, message: String },

    #[error("Device is read-only: {0}")]
    ReadOnlyTarget(String),

    /// `errno` is the positive OS error code; `EIO` for short transfers and
    /// failed NVMe completions.
    #[error("I/O failure during {operation}: {message}")]
    IoFailure {
        operation: Operation,
        errno: i32,
        message: String,
    },
}

impl DeviceError {
    /// Translate an OS-level error into a cause. This is the only place where
    /// platform error codes are interpreted.
    pub fn from_io(err: std::io::Error, operation: Operation, device: &str) -> Self {
        let detail = format!("{}: {} failed: {}", device, operation, err);

        match err.raw_os_error() {
            Some(code @ (libc::ENOENT | libc::ENODEV | libc::ENXIO)) => DeviceError::NotFound {
                errno: code,
                message: detail,
            },
            Some(code @ (libc::EACCES | libc::EPERM)) => DeviceError::PermissionDenied {
                errno: code,
                message: detail,
            },
            Some(libc::EROFS) => DeviceError::ReadOnlyTarget(detail),
            Some(libc::EINVAL) => DeviceError::InvalidArgument(detail),
            Some(code) => DeviceError::IoFailure {
                operation,
                errno: code,
                message: detail,
            },
            // Errors synthesized without an OS code (e.g. by a test backend)
            // still carry a kind worth honouring.
            None => match err.kind() {
                std::io::ErrorKind::NotFound => DeviceError::NotFound {
                    errno: libc::ENOENT,
                    message: detail,
                },
                std::io::ErrorKind::PermissionDenied => DeviceError::PermissionDenied {
                    errno: libc::EACCES,
                    message: detail,
                },
                std::io::ErrorKind::InvalidInput => DeviceError::InvalidArgument(detail),
                _ => DeviceError::IoFailure {
                    operation,
                    errno: libc::EIO,
                    message: detail,
                },
            },
        }
    }

    /// Transfer completed with fewer bytes than requested.
    pub fn short_transfer(
        operation: Operation,
        device: &str,
        transferred: usize,
        expected: usize,
    ) -> Self {
        DeviceError::IoFailure {
            operation,
            errno: libc::EIO,
            message: format!(
                "{}: short transfer, {} of {} bytes",
                device, transferred, expected
            ),
        }
    }

    /// Negative errno status used at the C boundary. Translated OS codes are
    /// returned unchanged.
    pub fn errno(&self) -> i32 {
        match self {
            DeviceError::InvalidArgument(_) => -libc::EINVAL,
            DeviceError::ReadOnlyTarget(_) => -libc::EROFS,
            DeviceError::NotFound { errno: 0, .. } => -libc::ENOENT,
            DeviceError::PermissionDenied { errno: 0, .. } => -libc::EACCES,
            DeviceError::IoFailure { errno: 0, .. } => -libc::EIO,
            DeviceError::NotFound { errno, .. }
            | DeviceError::PermissionDenied { errno, .. }
            | DeviceError::IoFailure { errno, .. } => -errno.abs(),
        }
    }
}

pub type DeviceResult<T> = Result<T, DeviceError>;
