use crate::ioctl::{request_code, Direction};
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;

pub const NVME_ADMIN_IDENTIFY: u8 = 0x06;

/// Size of every Identify data structure.
pub const IDENTIFY_DATA_LEN: usize = 4096;

/// Driver-side timeout used when the caller does not ask for one.
pub const DEFAULT_ADMIN_TIMEOUT_MS: u32 = 5_000;

/// `NVME_IOCTL_ADMIN_CMD`, i.e. `_IOWR('N', 0x41, struct nvme_admin_cmd)`.
pub const NVME_IOCTL_ADMIN_CMD: u32 =
    request_code(Direction::ReadWrite, b'N', 0x41, size_of::<AdminCommand<'static>>());

/// Mirror of `struct nvme_passthru_cmd` from `<linux/nvme_ioctl.h>` (72 bytes).
///
/// The data buffer is borrowed mutably for `'buf`, so the driver is the only
/// other party that can touch it while the command exists. The address the
/// kernel needs is derived from that borrow and never exposed.
#[repr(C)]
#[derive(Debug, Default)]
pub struct AdminCommand<'buf> {
    opcode: u8,
    flags: u8,
    rsvd1: u16,
    nsid: u32,
    cdw2: u32,
    cdw3: u32,
    metadata: u64,
    addr: u64,
    metadata_len: u32,
    data_len: u32,
    cdw10: u32,
    cdw11: u32,
    cdw12: u32,
    cdw13: u32,
    cdw14: u32,
    cdw15: u32,
    timeout_ms: u32,
    result: u32,
    _data: PhantomData<&'buf mut [u8]>,
}

/// CNS values for the Identify command (CDW10 bits 7:0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IdentifyCns {
    Namespace = 0x00,
    Controller = 0x01,
}

impl<'buf> AdminCommand<'buf> {
    /// Builds an Identify command whose data lands in `buf`.
    ///
    /// A `timeout_ms` of zero is replaced by [`DEFAULT_ADMIN_TIMEOUT_MS`] so the
    /// driver never waits forever.
    pub fn identify(buf: &'buf mut IdentifyBuffer, cns: IdentifyCns, nsid: u32, timeout_ms: u32) -> Self {
        let data = buf.as_mut_bytes();
        let timeout_ms = if timeout_ms == 0 { DEFAULT_ADMIN_TIMEOUT_MS } else { timeout_ms };
        Self {
            opcode: NVME_ADMIN_IDENTIFY,
            nsid,
            addr: data.as_mut_ptr() as usize as u64,
            data_len: data.len() as u32,
            cdw10: cns as u32,
            timeout_ms,
            ..Default::default()
        }
    }

    /// Identify Controller: namespace 0, CNS 1.
    pub fn identify_controller(buf: &'buf mut IdentifyBuffer, timeout_ms: u32) -> Self {
        Self::identify(buf, IdentifyCns::Controller, 0, timeout_ms)
    }

    pub fn opcode(&self) -> u8 { self.opcode }
    pub fn flags(&self) -> u8 { self.flags }
    pub fn nsid(&self) -> u32 { self.nsid }
    pub fn cdw2(&self) -> u32 { self.cdw2 }
    pub fn cdw3(&self) -> u32 { self.cdw3 }
    pub fn metadata_len(&self) -> u32 { self.metadata_len }
    pub fn data_len(&self) -> u32 { self.data_len }
    pub fn timeout_ms(&self) -> u32 { self.timeout_ms }

    /// Command dwords 10 through 15.
    pub fn cdws(&self) -> [u32; 6] {
        [self.cdw10, self.cdw11, self.cdw12, self.cdw13, self.cdw14, self.cdw15]
    }

    pub fn cdw10(&self) -> u32 { self.cdw10 }

    /// Completion dword 0 as written back by the driver.
    pub fn result(&self) -> u32 { self.result }

    /// Records completion dword 0. Passthrough implementations that do not go
    /// through the kernel call this in place of the driver.
    pub fn complete(&mut self, result: u32) {
        self.result = result;
    }

    /// The data buffer this command transfers into.
    pub fn data_mut(&mut self) -> &mut [u8] {
        if self.addr == 0 || self.data_len == 0 {
            return &mut [];
        }
        // SAFETY: `addr` and `data_len` are only set by `identify`, from a
        // `&'buf mut` borrow that this command keeps alive through `_data`.
        unsafe { std::slice::from_raw_parts_mut(self.addr as usize as *mut u8, self.data_len as usize) }
    }
}

/// Page-aligned scratch buffer for one Identify transfer.
#[repr(C, align(4096))]
pub struct IdentifyBuffer([u8; IDENTIFY_DATA_LEN]);

impl IdentifyBuffer {
    pub fn boxed() -> Box<Self> {
        Box::default()
    }

    pub fn as_bytes(&self) -> &[u8; IDENTIFY_DATA_LEN] {
        &self.0
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8; IDENTIFY_DATA_LEN] {
        &mut self.0
    }
}

impl Default for IdentifyBuffer {
    fn default() -> Self {
        Self([0; IDENTIFY_DATA_LEN])
    }
}

impl fmt::Debug for IdentifyBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentifyBuffer").field("len", &self.0.len()).finish()
    }
}

/// NVMe completion status as the Linux driver reports it: the CQE status
/// field without the phase tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CompletionStatus(pub u16);

impl CompletionStatus {
    pub const SUCCESS: Self = Self(0);

    pub fn is_success(&self) -> bool {
        self.0 == 0
    }

    pub fn status_code(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    pub fn status_code_type(&self) -> u8 {
        ((self.0 >> 8) & 0x7) as u8
    }

    pub fn do_not_retry(&self) -> bool {
        self.0 & (1 << 14) != 0
    }
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sct={:#x} sc={:#04x}", self.status_code_type(), self.status_code())?;
        if self.do_not_retry() {
            write!(f, " dnr")?;
        }
        Ok(())
    }
}
