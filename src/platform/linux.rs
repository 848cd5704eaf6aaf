use crate::error::{IdentifyError, Result};
use crate::nvme::{AdminCommand, CompletionStatus, NVME_IOCTL_ADMIN_CMD};
use crate::AdminPassthru;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use tracing::debug;

nix::ioctl_readwrite_bad!(nvme_admin_cmd, NVME_IOCTL_ADMIN_CMD, AdminCommand<'static>);

/// An open NVMe controller character device such as `/dev/nvme0`.
///
/// The descriptor is closed when the value is dropped.
#[derive(Debug)]
pub struct NvmeDevice {
    file: File,
    path: PathBuf,
}

impl NvmeDevice {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|source| IdentifyError::DeviceOpenFailed { path: path.to_path_buf(), source })?;
        debug!(path = %path.display(), "opened NVMe device");
        Ok(Self { file, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AdminPassthru for NvmeDevice {
    fn admin_passthru(&self, cmd: &mut AdminCommand<'_>) -> io::Result<CompletionStatus> {
        let fd = self.file.as_raw_fd();
        let ptr = (cmd as *mut AdminCommand<'_>).cast::<AdminCommand<'static>>();
        // SAFETY: `cmd` is a live, exclusively borrowed nvme_passthru_cmd and
        // its data buffer stays borrowed for at least as long as `cmd`. The
        // driver only touches either for the duration of the call.
        let ret = unsafe { nvme_admin_cmd(fd, ptr) }.map_err(io::Error::from)?;
        // A positive return is the NVMe status of a command the device rejected.
        Ok(CompletionStatus(u16::try_from(ret).unwrap_or(u16::MAX)))
    }
}
