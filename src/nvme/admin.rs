use crate::{DeviceError, DeviceResult};

/// Admin opcode for Get Log Page
pub const OPCODE_GET_LOG_PAGE: u8 = 0x02;

/// Namespace identifier addressing every namespace of the controller
pub const NSID_ALL: u32 = 0xFFFF_FFFF;

/// An NVMe admin command, independent of the buffer it transfers into.
///
/// The data pointer is only attached when the command is lowered to
/// [`RawAdminCommand`] right before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminCommand {
    pub opcode: u8,
    pub nsid: u32,
    pub cdw10: u32,
    pub data_len: u32,
}

impl AdminCommand {
    /// Build a Get Log Page command.
    ///
    /// Command Dword 10 layout (NVMe base specification, Get Log Page):
    ///
    /// ```text
    ///  31            16 15   8 7      0
    /// +----------------+------+--------+
    /// |     NUMDL      | LSP  |  LID   |
    /// +----------------+------+--------+
    /// ```
    ///
    /// NUMDL is the number of dwords to transfer, zero-based, so a transfer of
    /// `len` bytes encodes `len / 4 - 1`. LSP and RAE are left clear.
    ///
    /// `len` must be a non-zero multiple of 4 and at most 0x10000 dwords
    /// (NUMDU is not used).
    pub fn get_log_page(log_id: u8, nsid: u32, len: usize) -> DeviceResult<Self> {
        if len == 0 || len % 4 != 0 {
            return Err(DeviceError::InvalidArgument(format!(
                "log page length {} is not a positive multiple of 4",
                len
            )));
        }
        let numdl = len / 4 - 1;
        if numdl > 0xFFFF {
            return Err(DeviceError::InvalidArgument(format!(
                "log page length {} exceeds the NUMDL range",
                len
            )));
        }

        Ok(Self {
            opcode: OPCODE_GET_LOG_PAGE,
            nsid,
            cdw10: u32::from(log_id) | ((numdl as u32) << 16),
            data_len: len as u32,
        })
    }

    /// Log identifier carried in CDW10 bits 7:0
    pub fn log_id(&self) -> u8 {
        (self.cdw10 & 0xFF) as u8
    }

    /// Zero-based dword count carried in CDW10 bits 31:16
    pub fn numdl(&self) -> u16 {
        (self.cdw10 >> 16) as u16
    }

    /// Lower into the kernel passthrough structure, pointing at `data`.
    ///
    /// `data` must stay alive and unmoved until the ioctl returns.
    pub fn to_raw(&self, data: &mut [u8]) -> RawAdminCommand {
        RawAdminCommand {
            opcode: self.opcode,
            nsid: self.nsid,
            addr: data.as_mut_ptr() as u64,
            data_len: self.data_len,
            cdw10: self.cdw10,
            ..RawAdminCommand::default()
        }
    }
}

/// `struct nvme_admin_cmd` / `struct nvme_passthru_cmd` from
/// `<linux/nvme_ioctl.h>`. 72 bytes.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct RawAdminCommand {
    pub opcode: u8,
    pub flags: u8,
    pub rsvd1: u16,
    pub nsid: u32,
    pub cdw2: u32,
    pub cdw3: u32,
    pub metadata: u64,
    pub addr: u64,
    pub metadata_len: u32,
    pub data_len: u32,
    pub cdw10: u32,
    pub cdw11: u32,
    pub cdw12: u32,
    pub cdw13: u32,
    pub cdw14: u32,
    pub cdw15: u32,
    pub timeout_ms: u32,
    pub result: u32,
}

// NVME_IOCTL_ADMIN_CMD = _IOWR('N', 0x41, struct nvme_admin_cmd)
#[cfg(target_os = "linux")]
nix::ioctl_readwrite!(nvme_ioctl_admin_cmd, b'N', 0x41, RawAdminCommand);
