#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
pub use linux::NvmeDevice;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use self::windows::NvmeDevice;
