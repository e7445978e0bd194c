#![allow(dead_code)]
/// In-memory NVMe device for integration tests
///
/// Implements `DeviceBackend` over a byte vector so tests can inject
/// read-only media, short transfers, SMART log pages and NVMe completion
/// status, and can observe opens, live handles and transfer offsets.
use nvme_access::{AccessMode, AdminCommand, DeviceBackend, DeviceHandle, SMART_INFO_SIZE};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Device state shared by the backend and every handle it opens
struct MediaState {
    data: Vec<u8>,
    read_only: bool,
    deny_open: bool,
    short_transfer: Option<usize>,
    smart_page: Option<[u8; SMART_INFO_SIZE]>,
    nvme_status: u32,
}

/// Counters observed by assertions
#[derive(Default)]
pub struct MockDeviceStats {
    pub opens: AtomicUsize,
    pub live_handles: AtomicUsize,
    pub reads: AtomicUsize,
    pub writes: AtomicUsize,
    pub admin_commands: AtomicUsize,
    pub last_offset: Mutex<Option<u64>>,
    pub last_command: Mutex<Option<AdminCommand>>,
}

#[derive(Clone)]
pub struct MockDevice {
    path: String,
    state: Arc<Mutex<MediaState>>,
    stats: Arc<MockDeviceStats>,
}

impl MockDevice {
    /// A zero-filled device of `blocks * block_size` bytes reachable at `path`
    pub fn new(path: &str, blocks: usize, block_size: usize) -> Self {
        Self {
            path: path.to_string(),
            state: Arc::new(Mutex::new(MediaState {
                data: vec![0u8; blocks * block_size],
                read_only: false,
                deny_open: false,
                short_transfer: None,
                smart_page: None,
                nvme_status: 0,
            })),
            stats: Arc::new(MockDeviceStats::default()),
        }
    }

    /// Opening for write fails with EROFS
    pub fn read_only(self) -> Self {
        self.state.lock().unwrap().read_only = true;
        self
    }

    /// Every open fails with EACCES
    pub fn deny_open(self) -> Self {
        self.state.lock().unwrap().deny_open = true;
        self
    }

    /// Cap every transfer at `bytes`
    pub fn with_short_transfer(self, bytes: usize) -> Self {
        self.state.lock().unwrap().short_transfer = Some(bytes);
        self
    }

    /// Log page returned by Get Log Page
    pub fn with_smart_page(self, page: [u8; SMART_INFO_SIZE]) -> Self {
        self.state.lock().unwrap().smart_page = Some(page);
        self
    }

    /// NVMe completion status reported by admin commands
    pub fn with_nvme_status(self, status: u32) -> Self {
        self.state.lock().unwrap().nvme_status = status;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn stats(&self) -> &MockDeviceStats {
        &self.stats
    }

    pub fn opens(&self) -> usize {
        self.stats.opens.load(Ordering::SeqCst)
    }

    pub fn live_handles(&self) -> usize {
        self.stats.live_handles.load(Ordering::SeqCst)
    }

    pub fn last_offset(&self) -> Option<u64> {
        *self.stats.last_offset.lock().unwrap()
    }

    pub fn last_command(&self) -> Option<AdminCommand> {
        *self.stats.last_command.lock().unwrap()
    }

    /// Copy of the stored bytes for `block`
    pub fn block(&self, block: usize, block_size: usize) -> Vec<u8> {
        let state = self.state.lock().unwrap();
        state.data[block * block_size..(block + 1) * block_size].to_vec()
    }

    /// Overwrite stored bytes directly, bypassing the handle path
    pub fn fill_block(&self, block: usize, block_size: usize, byte: u8) {
        let mut state = self.state.lock().unwrap();
        state.data[block * block_size..(block + 1) * block_size].fill(byte);
    }
}

impl DeviceBackend for MockDevice {
    fn open(&self, path: &str, mode: AccessMode) -> io::Result<Box<dyn DeviceHandle>> {
        self.stats.opens.fetch_add(1, Ordering::SeqCst);

        if path != self.path {
            return Err(io::Error::from_raw_os_error(libc::ENOENT));
        }
        {
            let state = self.state.lock().unwrap();
            if state.deny_open {
                return Err(io::Error::from_raw_os_error(libc::EACCES));
            }
            if state.read_only && mode == AccessMode::WriteOnly {
                return Err(io::Error::from_raw_os_error(libc::EROFS));
            }
        }

        self.stats.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockHandle {
            mode,
            state: Arc::clone(&self.state),
            stats: Arc::clone(&self.stats),
        }))
    }

    fn platform_name(&self) -> &'static str {
        "mock"
    }
}

struct MockHandle {
    mode: AccessMode,
    state: Arc<Mutex<MediaState>>,
    stats: Arc<MockDeviceStats>,
}

impl MockHandle {
    fn transfer_len(state: &MediaState, requested: usize, offset: u64) -> usize {
        let available = (state.data.len() as u64).saturating_sub(offset) as usize;
        let len = requested.min(available);
        match state.short_transfer {
            Some(cap) => len.min(cap),
            None => len,
        }
    }
}

impl DeviceHandle for MockHandle {
    fn read_at(&mut self, buffer: &mut [u8], offset: u64) -> io::Result<usize> {
        if self.mode != AccessMode::ReadOnly {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }
        self.stats.reads.fetch_add(1, Ordering::SeqCst);
        *self.stats.last_offset.lock().unwrap() = Some(offset);

        let state = self.state.lock().unwrap();
        let len = Self::transfer_len(&state, buffer.len(), offset);
        if len == 0 {
            return Ok(0);
        }
        let start = offset as usize;
        buffer[..len].copy_from_slice(&state.data[start..start + len]);
        Ok(len)
    }

    fn write_at(&mut self, data: &[u8], offset: u64) -> io::Result<usize> {
        if self.mode != AccessMode::WriteOnly {
            return Err(io::Error::from_raw_os_error(libc::EBADF));
        }
        self.stats.writes.fetch_add(1, Ordering::SeqCst);
        *self.stats.last_offset.lock().unwrap() = Some(offset);

        let mut state = self.state.lock().unwrap();
        let len = Self::transfer_len(&state, data.len(), offset);
        if len == 0 {
            return Ok(0);
        }
        let start = offset as usize;
        state.data[start..start + len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    fn admin_command(&mut self, command: &AdminCommand, data: &mut [u8]) -> io::Result<u32> {
        self.stats.admin_commands.fetch_add(1, Ordering::SeqCst);
        *self.stats.last_command.lock().unwrap() = Some(*command);

        let state = self.state.lock().unwrap();
        let page = state
            .smart_page
            .ok_or_else(|| io::Error::from_raw_os_error(libc::ENOTTY))?;
        let len = (command.data_len as usize).min(data.len()).min(page.len());
        data[..len].copy_from_slice(&page[..len]);
        Ok(state.nvme_status)
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.stats.live_handles.fetch_sub(1, Ordering::SeqCst);
    }
}
