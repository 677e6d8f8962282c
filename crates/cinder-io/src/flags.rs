//! Open flags and permission bits.
//!
//! Flags compose with `|` the way `O_*` constants do:
//!
//! ```
//! use cinder_io::{OpenFlags, Permissions};
//!
//! let flags = OpenFlags::CREATE | OpenFlags::EXCLUSIVE | OpenFlags::WRITE_ONLY;
//! assert!(flags.contains(OpenFlags::EXCLUSIVE));
//! assert_eq!(Permissions::OWNER_READ_WRITE.mode(), 0o600);
//! ```

use std::fs::OpenOptions;
use std::ops::BitOr;

use crate::IoError;

bitflags::bitflags! {
    /// Access and creation flags for [`FileHandle::open_with_mode`](crate::FileHandle::open_with_mode).
    ///
    /// With no access bit set the file is opened read-only.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        /// Open for reading.
        const READ_ONLY = 1 << 0;
        /// Open for writing.
        const WRITE_ONLY = 1 << 1;
        /// Open for reading and writing.
        const READ_WRITE = 1 << 2;
        /// Create the file if it doesn't exist.
        const CREATE = 1 << 3;
        /// Fail if the file exists. Implies `CREATE`.
        const EXCLUSIVE = 1 << 4;
        /// Every write lands at end-of-file. Implies write access.
        const APPEND = 1 << 5;
        /// Truncate an existing file to zero length.
        const TRUNCATE = 1 << 6;
        /// Use Direct I/O (O_DIRECT on Linux with `direct_io`, ignored elsewhere).
        const DIRECT = 1 << 7;
    }
}

impl OpenFlags {
    /// Flags for reading an existing file.
    pub fn read_only() -> Self {
        Self::READ_ONLY
    }

    /// Flags for creating a fresh segment that must not already exist.
    pub fn create_exclusive() -> Self {
        Self::CREATE | Self::EXCLUSIVE | Self::WRITE_ONLY
    }

    /// Flags for creating or appending to a file.
    pub fn append_create() -> Self {
        Self::READ_WRITE | Self::CREATE | Self::APPEND
    }

    pub(crate) fn readable(self) -> bool {
        self.contains(Self::READ_WRITE)
            || self.contains(Self::READ_ONLY)
            || !self.intersects(Self::WRITE_ONLY | Self::APPEND)
    }

    pub(crate) fn writable(self) -> bool {
        self.intersects(Self::WRITE_ONLY | Self::READ_WRITE | Self::APPEND)
    }

    /// Translates the flags into `OpenOptions`, rejecting combinations the OS
    /// open call cannot express.
    pub(crate) fn to_open_options(self) -> Result<OpenOptions, IoError> {
        let creates = self.intersects(Self::CREATE | Self::EXCLUSIVE);
        if (creates || self.contains(Self::TRUNCATE)) && !self.writable() {
            return Err(IoError::InvalidFlags {
                flags: self,
                reason: "create or truncate requires write access",
            });
        }
        if self.contains(Self::APPEND) && self.contains(Self::TRUNCATE) {
            return Err(IoError::InvalidFlags {
                flags: self,
                reason: "append and truncate are mutually exclusive",
            });
        }

        let mut opts = OpenOptions::new();
        opts.read(self.readable());
        if self.contains(Self::APPEND) {
            opts.append(true);
        } else if self.writable() {
            opts.write(true);
        }
        if self.contains(Self::EXCLUSIVE) {
            opts.create_new(true);
        } else if self.contains(Self::CREATE) {
            opts.create(true);
        }
        if self.contains(Self::TRUNCATE) {
            opts.truncate(true);
        }

        // Direct I/O on Linux
        #[cfg(all(target_os = "linux", feature = "direct_io"))]
        if self.contains(Self::DIRECT) {
            use std::os::unix::fs::OpenOptionsExt;
            opts.custom_flags(libc::O_DIRECT);
        }

        Ok(opts)
    }
}

/// Unix permission bits applied when a file is created.
///
/// Passed to the OS verbatim (the process umask still applies). Ignored on
/// platforms without Unix modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Permissions(u32);

impl Permissions {
    pub const OWNER_READ: Self = Self(0o400);
    pub const OWNER_WRITE: Self = Self(0o200);
    pub const OWNER_READ_WRITE: Self = Self(0o600);
    pub const GROUP_READ: Self = Self(0o040);
    pub const OTHER_READ: Self = Self(0o004);

    /// Wraps raw mode bits. Bits outside `0o7777` are dropped.
    pub const fn from_mode(mode: u32) -> Self {
        Self(mode & 0o7777)
    }

    pub const fn mode(self) -> u32 {
        self.0
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::OWNER_READ_WRITE
    }
}

impl BitOr for Permissions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_mode_defaults_to_read() {
        let flags = OpenFlags::empty();
        assert!(flags.readable());
        assert!(!flags.writable());
    }

    #[test]
    fn write_only_is_not_readable() {
        assert!(!OpenFlags::WRITE_ONLY.readable());
        assert!(OpenFlags::WRITE_ONLY.writable());
        assert!(!OpenFlags::APPEND.readable());
        assert!(OpenFlags::append_create().readable());
    }

    #[test]
    fn create_without_write_is_rejected() {
        let err = (OpenFlags::CREATE | OpenFlags::READ_ONLY)
            .to_open_options()
            .unwrap_err();
        assert!(matches!(err, IoError::InvalidFlags { .. }));
        assert!(err.is_state_error());
    }

    #[test]
    fn append_with_truncate_is_rejected() {
        let err = (OpenFlags::APPEND | OpenFlags::TRUNCATE | OpenFlags::CREATE)
            .to_open_options()
            .unwrap_err();
        assert!(matches!(err, IoError::InvalidFlags { .. }));
    }

    #[test]
    fn permissions_compose() {
        let perms = Permissions::OWNER_READ | Permissions::OWNER_WRITE | Permissions::GROUP_READ;
        assert_eq!(perms.mode(), 0o640);
        assert_eq!(Permissions::from_mode(0o100644).mode(), 0o644);
        assert_eq!(Permissions::default(), Permissions::OWNER_READ_WRITE);
    }
}
