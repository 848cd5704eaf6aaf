use crate::error::{IdentifyError, Result};
use crate::nvme::{AdminCommand, CompletionStatus, IdentifyCns, IDENTIFY_DATA_LEN, NVME_ADMIN_IDENTIFY};
use crate::AdminPassthru;
use std::ffi::c_void;
use std::io;
use std::mem::{offset_of, size_of, zeroed};
use std::os::windows::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr::{self, null_mut};
use tracing::debug;
use windows_sys::Win32::{
    Foundation::{CloseHandle, GENERIC_READ, GENERIC_WRITE, HANDLE, INVALID_HANDLE_VALUE},
    Storage::FileSystem::{CreateFileW, FILE_SHARE_READ, FILE_SHARE_WRITE, OPEN_EXISTING},
    System::IO::DeviceIoControl,
    System::Ioctl::{
        NVMeDataTypeIdentify, PropertyStandardQuery, ProtocolTypeNvme, StorageAdapterProtocolSpecificProperty,
        StorageDeviceProtocolSpecificProperty, IOCTL_STORAGE_QUERY_PROPERTY, STORAGE_PROPERTY_QUERY,
        STORAGE_PROTOCOL_DATA_DESCRIPTOR, STORAGE_PROTOCOL_SPECIFIC_DATA,
    },
};

/// An open physical drive such as `\\.\PhysicalDrive0`.
///
/// Windows has no raw admin passthrough for NVMe; Identify is served by the
/// storage stack's protocol-specific property query instead. The handle is
/// closed when the value is dropped.
#[derive(Debug)]
pub struct NvmeDevice {
    handle: HANDLE,
    path: PathBuf,
}

impl Drop for NvmeDevice {
    fn drop(&mut self) {
        if self.handle != INVALID_HANDLE_VALUE {
            unsafe { CloseHandle(self.handle) };
        }
    }
}

impl NvmeDevice {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let wide_path: Vec<u16> = path.as_os_str().encode_wide().chain(std::iter::once(0)).collect();
        let handle = unsafe {
            CreateFileW(
                wide_path.as_ptr(),
                GENERIC_READ | GENERIC_WRITE,
                FILE_SHARE_READ | FILE_SHARE_WRITE,
                null_mut(),
                OPEN_EXISTING,
                0,
                null_mut(),
            )
        };
        if handle == INVALID_HANDLE_VALUE {
            return Err(IdentifyError::DeviceOpenFailed {
                path: path.to_path_buf(),
                source: io::Error::last_os_error(),
            });
        }
        debug!(path = %path.display(), "opened NVMe device");
        Ok(Self { handle, path: path.to_path_buf() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn query_identify(&self, cns: u32, nsid: u32, out: &mut [u8]) -> io::Result<u32> {
        let header_len = offset_of!(STORAGE_PROPERTY_QUERY, AdditionalParameters);
        let request_len = header_len + size_of::<STORAGE_PROTOCOL_SPECIFIC_DATA>() + IDENTIFY_DATA_LEN;
        let mut buffer: Vec<u8> = vec![0; request_len];

        let property_id = if cns == IdentifyCns::Controller as u32 {
            StorageAdapterProtocolSpecificProperty
        } else {
            StorageDeviceProtocolSpecificProperty
        };
        let mut protocol_data: STORAGE_PROTOCOL_SPECIFIC_DATA = unsafe { zeroed() };
        protocol_data.ProtocolType = ProtocolTypeNvme;
        protocol_data.DataType = NVMeDataTypeIdentify as u32;
        protocol_data.ProtocolDataRequestValue = cns;
        protocol_data.ProtocolDataRequestSubValue = nsid;
        protocol_data.ProtocolDataOffset = size_of::<STORAGE_PROTOCOL_SPECIFIC_DATA>() as u32;
        protocol_data.ProtocolDataLength = IDENTIFY_DATA_LEN as u32;

        // The protocol block starts where AdditionalParameters would.
        unsafe {
            let query = buffer.as_mut_ptr() as *mut STORAGE_PROPERTY_QUERY;
            ptr::addr_of_mut!((*query).PropertyId).write_unaligned(property_id);
            ptr::addr_of_mut!((*query).QueryType).write_unaligned(PropertyStandardQuery);
            ptr::write_unaligned(
                buffer.as_mut_ptr().add(header_len) as *mut STORAGE_PROTOCOL_SPECIFIC_DATA,
                protocol_data,
            );
        }

        let mut bytes_returned: u32 = 0;
        let ok = unsafe {
            DeviceIoControl(
                self.handle,
                IOCTL_STORAGE_QUERY_PROPERTY,
                buffer.as_ptr() as *const c_void,
                buffer.len() as u32,
                buffer.as_mut_ptr() as *mut c_void,
                buffer.len() as u32,
                &mut bytes_returned,
                null_mut(),
            )
        };
        if ok == 0 {
            return Err(io::Error::last_os_error());
        }
        if (bytes_returned as usize) < size_of::<STORAGE_PROTOCOL_DATA_DESCRIPTOR>() {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "short protocol data descriptor"));
        }

        let descriptor = unsafe { ptr::read_unaligned(buffer.as_ptr() as *const STORAGE_PROTOCOL_DATA_DESCRIPTOR) };
        let returned = descriptor.ProtocolSpecificData;
        let start = offset_of!(STORAGE_PROTOCOL_DATA_DESCRIPTOR, ProtocolSpecificData) + returned.ProtocolDataOffset as usize;
        let len = (returned.ProtocolDataLength as usize).min(out.len());
        if (returned.ProtocolDataOffset as usize) < size_of::<STORAGE_PROTOCOL_SPECIFIC_DATA>()
            || start + len > buffer.len()
        {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "identify data out of bounds"));
        }
        out[..len].copy_from_slice(&buffer[start..start + len]);
        Ok(returned.FixedProtocolReturnData)
    }
}

impl AdminPassthru for NvmeDevice {
    fn admin_passthru(&self, cmd: &mut AdminCommand<'_>) -> io::Result<CompletionStatus> {
        if cmd.opcode() != NVME_ADMIN_IDENTIFY {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("admin opcode {:#04x} has no Windows passthrough", cmd.opcode()),
            ));
        }
        let (cns, nsid) = (cmd.cdw10() & 0xFF, cmd.nsid());
        let result = self.query_identify(cns, nsid, cmd.data_mut())?;
        cmd.complete(result);
        Ok(CompletionStatus::SUCCESS)
    }
}
