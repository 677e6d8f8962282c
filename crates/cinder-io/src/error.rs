//! I/O error types.

use std::io::{self, ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};

use crate::OpenFlags;

/// Errors from a [`FileHandle`](crate::FileHandle).
///
/// State errors (`AlreadyOpen`, `NotOpen`, `InvalidPath`, `InvalidFlags`) are
/// detected before any syscall is made. Resource errors (`AlreadyExists`,
/// `PermissionDenied`, `NotFound`, `StorageFull`) are classified from the OS
/// error. Everything else is surfaced as `Io` with the original error attached.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// The handle already owns a descriptor.
    #[error("file handle already open: {path}")]
    AlreadyOpen { path: PathBuf },

    /// The handle owns no descriptor.
    #[error("file handle not open")]
    NotOpen,

    /// Exclusive create collided with an existing file.
    #[error("file already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// The OS refused access to the file.
    #[error("permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// File not found.
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    /// No space left on the device.
    #[error("storage full while writing {path}")]
    StorageFull { path: PathBuf },

    #[error("invalid path: {reason}")]
    InvalidPath { reason: &'static str },

    /// The flag combination cannot be expressed as an open call.
    #[error("invalid open flags {flags:?}: {reason}")]
    InvalidFlags {
        flags: OpenFlags,
        reason: &'static str,
    },

    /// The seek would place the cursor before the start of the file.
    #[error("invalid seek to {target:?}")]
    InvalidSeek { target: SeekFrom },

    /// The OS accepted fewer bytes than requested. Not retried.
    #[error("short write: wrote {written} of {expected} bytes")]
    ShortWrite { expected: usize, written: usize },

    #[error("unexpected end of file: read {read} of {expected} bytes")]
    UnexpectedEof { expected: usize, read: usize },

    /// Underlying OS I/O error.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IoError {
    /// Classifies an OS error raised while operating on `path`.
    pub(crate) fn classify(source: io::Error, path: &Path) -> Self {
        let path = path.to_path_buf();
        match source.kind() {
            ErrorKind::AlreadyExists => Self::AlreadyExists { path },
            ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            ErrorKind::NotFound => Self::NotFound { path },
            ErrorKind::StorageFull => Self::StorageFull { path },
            _ => Self::Io { path, source },
        }
    }

    /// Returns true for misuse of the handle's open/closed state or arguments.
    ///
    /// These never reach the OS.
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyOpen { .. }
                | Self::NotOpen
                | Self::InvalidPath { .. }
                | Self::InvalidFlags { .. }
        )
    }

    /// Returns true for errors describing the file itself rather than the
    /// transfer (exists, missing, denied, full).
    pub fn is_resource_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyExists { .. }
                | Self::PermissionDenied { .. }
                | Self::NotFound { .. }
                | Self::StorageFull { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(ErrorKind::AlreadyExists, "already exists" ; "exists")]
    #[test_case(ErrorKind::PermissionDenied, "permission denied" ; "denied")]
    #[test_case(ErrorKind::NotFound, "not found" ; "missing")]
    #[test_case(ErrorKind::StorageFull, "storage full" ; "full")]
    fn classifies_resource_errors(kind: ErrorKind, message: &str) {
        let err = IoError::classify(io::Error::from(kind), Path::new("/data/seg_0001.dat"));
        assert!(err.is_resource_error());
        assert!(!err.is_state_error());
        assert!(err.to_string().contains(message), "{err}");
        assert!(err.to_string().contains("seg_0001.dat"));
    }

    #[test]
    fn keeps_source_for_generic_errors() {
        let err = IoError::classify(
            io::Error::other("device hiccup"),
            Path::new("idx"),
        );
        match &err {
            IoError::Io { path, source } => {
                assert_eq!(path, Path::new("idx"));
                assert_eq!(source.to_string(), "device hiccup");
            }
            other => panic!("expected Io, got {other:?}"),
        }
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_resource_error());
    }

    #[test]
    fn state_errors_are_flagged() {
        assert!(IoError::NotOpen.is_state_error());
        assert!(
            IoError::AlreadyOpen {
                path: PathBuf::from("a")
            }
            .is_state_error()
        );
        assert!(!IoError::ShortWrite {
            expected: 4,
            written: 2
        }
        .is_state_error());
    }
}
