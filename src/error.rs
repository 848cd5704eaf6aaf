use crate::nvme::CompletionStatus;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdentifyError>;

#[derive(Debug, Error)]
pub enum IdentifyError {
    /// The device node could not be opened (missing, or not enough privileges).
    #[error("failed to open NVMe device {}: {source}", .path.display())]
    DeviceOpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The passthrough ioctl itself failed.
    #[error("admin passthrough failed: {0}")]
    PrivilegedCallFailed(#[source] io::Error),

    /// The ioctl went through but the controller completed the command with an error.
    #[error("admin command {opcode:#04x} completed with status {status}")]
    CommandFailed { opcode: u8, status: CompletionStatus },

    #[error("identify data must be exactly {expected} bytes, got {actual}")]
    InvalidBufferSize { expected: usize, actual: usize },
}

impl IdentifyError {
    /// The OS error number behind an open or ioctl failure, if there is one.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            IdentifyError::DeviceOpenFailed { source, .. } => source.raw_os_error(),
            IdentifyError::PrivilegedCallFailed(e) => e.raw_os_error(),
            _ => None,
        }
    }
}

impl From<io::Error> for IdentifyError {
    fn from(err: io::Error) -> Self {
        IdentifyError::PrivilegedCallFailed(err)
    }
}
