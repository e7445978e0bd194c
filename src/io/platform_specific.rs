// Platform-specific device access

use super::AccessMode;
use crate::nvme::AdminCommand;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::fs::FileExt;

/// An open device, closed when dropped.
#[cfg_attr(test, mockall::automock)]
pub trait DeviceHandle {
    /// Positioned read (pread) into `buffer`; returns bytes read
    fn read_at(&mut self, buffer: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Positioned write (pwrite) from `data`; returns bytes written
    fn write_at(&mut self, data: &[u8], offset: u64) -> io::Result<usize>;

    /// Submit an admin command transferring into `data`.
    ///
    /// `Err` means the driver rejected the submission. `Ok` carries the NVMe
    /// completion status, where 0 is success.
    fn admin_command(&mut self, command: &AdminCommand, data: &mut [u8]) -> io::Result<u32>;
}

/// Opens device handles
#[cfg_attr(test, mockall::automock)]
pub trait DeviceBackend: Send + Sync {
    fn open(&self, path: &str, mode: AccessMode) -> io::Result<Box<dyn DeviceHandle>>;

    /// Get platform name
    fn platform_name(&self) -> &'static str;
}

/// Backend over the real filesystem and kernel NVMe driver
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemBackend;

impl SystemBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceBackend for SystemBackend {
    fn open(&self, path: &str, mode: AccessMode) -> io::Result<Box<dyn DeviceHandle>> {
        let mut opts = OpenOptions::new();
        match mode {
            AccessMode::ReadOnly => opts.read(true),
            AccessMode::WriteOnly => opts.write(true),
        };

        let file = opts.open(path)?;
        Ok(Box::new(FileHandle { file }))
    }

    fn platform_name(&self) -> &'static str {
        if cfg!(target_os = "linux") {
            "Linux (NVMe ioctl)"
        } else {
            "Unix (block I/O only)"
        }
    }
}

/// Device handle over a file descriptor
pub struct FileHandle {
    file: File,
}

impl DeviceHandle for FileHandle {
    fn read_at(&mut self, buffer: &mut [u8], offset: u64) -> io::Result<usize> {
        // Use pread for positioned reads without seeking
        self.file.read_at(buffer, offset)
    }

    fn write_at(&mut self, data: &[u8], offset: u64) -> io::Result<usize> {
        // Use pwrite for positioned writes without seeking
        self.file.write_at(data, offset)
    }

    #[cfg(target_os = "linux")]
    fn admin_command(&mut self, command: &AdminCommand, data: &mut [u8]) -> io::Result<u32> {
        use crate::nvme::admin::nvme_ioctl_admin_cmd;
        use std::os::unix::io::AsRawFd;

        if data.len() < command.data_len as usize {
            return Err(io::Error::from_raw_os_error(libc::EINVAL));
        }

        let mut raw = command.to_raw(data);

        // SAFETY: `raw.addr` points at `data`, which holds at least
        // `raw.data_len` bytes and stays borrowed for the whole call.
        let status = unsafe { nvme_ioctl_admin_cmd(self.file.as_raw_fd(), &mut raw) }
            .map_err(io::Error::from)?;

        Ok(status as u32)
    }

    #[cfg(not(target_os = "linux"))]
    fn admin_command(&mut self, _command: &AdminCommand, _data: &mut [u8]) -> io::Result<u32> {
        Err(io::Error::from_raw_os_error(libc::ENOTTY))
    }
}
