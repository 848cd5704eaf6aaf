//! # nvme-ident
//! Reads an NVMe controller's Identify data through the operating system's
//! admin passthrough interface, without relying on external tools like `nvme-cli`.
//!
//! ## Current Scope
//! *   **Linux**: `NVME_IOCTL_ADMIN_CMD` on the controller character device (`/dev/nvmeN`).
//! *   **Windows**: Identify via `IOCTL_STORAGE_QUERY_PROPERTY` on `\\.\PhysicalDriveN`.
//!
//! Any other backend can be plugged in by implementing [`AdminPassthru`].

pub mod error;
pub mod ioctl;
mod config;
mod identify;
mod nvme;
mod platform;

pub use config::PassthruConfig;
pub use error::{IdentifyError, Result};
pub use identify::{ByteOrder, FixedText, IdentifyController, PowerStateDescriptor, POWER_STATE_DESCRIPTORS};
pub use nvme::{
    AdminCommand, CompletionStatus, IdentifyBuffer, IdentifyCns, DEFAULT_ADMIN_TIMEOUT_MS, IDENTIFY_DATA_LEN,
    NVME_ADMIN_IDENTIFY, NVME_IOCTL_ADMIN_CMD,
};
#[cfg(any(target_os = "linux", windows))]
pub use platform::NvmeDevice;

use std::io;
use tracing::{debug, warn};

/// Something that can carry an NVMe admin command to a controller.
pub trait AdminPassthru {
    /// Submits `cmd` and blocks until the controller completes it.
    ///
    /// On success the command's data buffer holds whatever the controller
    /// transferred and [`AdminCommand::result`] holds completion dword 0. A
    /// non-success [`CompletionStatus`] means the device rejected the command
    /// and the buffer must not be interpreted.
    fn admin_passthru(&self, cmd: &mut AdminCommand<'_>) -> io::Result<CompletionStatus>;
}

impl<T: AdminPassthru + ?Sized> AdminPassthru for &T {
    fn admin_passthru(&self, cmd: &mut AdminCommand<'_>) -> io::Result<CompletionStatus> {
        (**self).admin_passthru(cmd)
    }
}

impl<T: AdminPassthru + ?Sized> AdminPassthru for Box<T> {
    fn admin_passthru(&self, cmd: &mut AdminCommand<'_>) -> io::Result<CompletionStatus> {
        (**self).admin_passthru(cmd)
    }
}

/// Runs Identify Controller against `dev` with the default [`PassthruConfig`].
pub fn identify_controller<D: AdminPassthru + ?Sized>(dev: &D) -> Result<IdentifyController> {
    identify_controller_with(dev, &PassthruConfig::default())
}

/// Runs Identify Controller against `dev`.
///
/// Each call uses its own scratch buffer, so concurrent calls never share
/// the memory the driver writes into.
pub fn identify_controller_with<D: AdminPassthru + ?Sized>(
    dev: &D,
    config: &PassthruConfig,
) -> Result<IdentifyController> {
    let mut buf = IdentifyBuffer::boxed();
    let mut cmd = AdminCommand::identify_controller(&mut buf, config.effective_timeout_ms());
    submit(dev, &mut cmd)?;
    Ok(IdentifyController::from_buffer(&buf))
}

/// Opens the controller at `path`, identifies it and closes it again.
///
/// # Permissions
/// This requires administrator/root privileges.
#[cfg(any(target_os = "linux", windows))]
pub fn identify_controller_at(path: impl AsRef<std::path::Path>, config: &PassthruConfig) -> Result<IdentifyController> {
    let dev = NvmeDevice::open(path)?;
    identify_controller_with(&dev, config)
}

fn submit<D: AdminPassthru + ?Sized>(dev: &D, cmd: &mut AdminCommand<'_>) -> Result<()> {
    debug!(
        opcode = cmd.opcode(),
        nsid = cmd.nsid(),
        cdw10 = cmd.cdw10(),
        data_len = cmd.data_len(),
        timeout_ms = cmd.timeout_ms(),
        "submitting admin command"
    );
    let status = dev.admin_passthru(cmd).map_err(IdentifyError::PrivilegedCallFailed)?;
    if !status.is_success() {
        warn!(opcode = cmd.opcode(), %status, "admin command failed on the device");
        return Err(IdentifyError::CommandFailed { opcode: cmd.opcode(), status });
    }
    debug!(opcode = cmd.opcode(), result = cmd.result(), "admin command completed");
    Ok(())
}
