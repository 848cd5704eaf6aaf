//! Linux `_IOC` request-number encoding.
//!
//! A request number packs four things into one word: the transfer direction,
//! the payload size, a subsystem type tag and a command number. The bit widths
//! differ between architecture families, so the layout is selected at compile
//! time the same way `<asm/ioctl.h>` does it.

#[cfg(any(
    target_arch = "mips",
    target_arch = "mips64",
    target_arch = "powerpc",
    target_arch = "powerpc64",
    target_arch = "sparc",
    target_arch = "sparc64"
))]
mod layout {
    pub const SIZEBITS: u32 = 13;
    pub const NONE: u32 = 1;
    pub const READ: u32 = 2;
    pub const WRITE: u32 = 4;
}

#[cfg(not(any(
    target_arch = "mips",
    target_arch = "mips64",
    target_arch = "powerpc",
    target_arch = "powerpc64",
    target_arch = "sparc",
    target_arch = "sparc64"
)))]
mod layout {
    pub const SIZEBITS: u32 = 14;
    pub const NONE: u32 = 0;
    pub const WRITE: u32 = 1;
    pub const READ: u32 = 2;
}

const NRBITS: u32 = 8;
const TYPEBITS: u32 = 8;

const NRSHIFT: u32 = 0;
const TYPESHIFT: u32 = NRSHIFT + NRBITS;
const SIZESHIFT: u32 = TYPESHIFT + TYPEBITS;
const DIRSHIFT: u32 = SIZESHIFT + layout::SIZEBITS;

/// Largest payload, in bytes, the size field can describe.
pub const MAX_PAYLOAD_SIZE: usize = (1 << layout::SIZEBITS) - 1;

/// Data transfer direction, seen from user space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    None,
    /// User space writes, the driver reads.
    Write,
    /// The driver writes, user space reads.
    Read,
    ReadWrite,
}

impl Direction {
    const fn bits(self) -> u32 {
        match self {
            Direction::None => layout::NONE,
            Direction::Write => layout::WRITE,
            Direction::Read => layout::READ,
            Direction::ReadWrite => layout::READ | layout::WRITE,
        }
    }
}

/// Computes the request number for an ioctl, equivalent to the kernel's
/// `_IOC(dir, type, nr, size)`.
///
/// # Panics
/// If `size` does not fit in the size field. Used in a `const` item this is
/// a compile error rather than a silently truncated request number.
pub const fn request_code(dir: Direction, ty: u8, nr: u8, size: usize) -> u32 {
    assert!(
        size <= MAX_PAYLOAD_SIZE,
        "ioctl payload size does not fit in the request size field"
    );
    (dir.bits() << DIRSHIFT)
        | ((size as u32) << SIZESHIFT)
        | ((ty as u32) << TYPESHIFT)
        | ((nr as u32) << NRSHIFT)
}
