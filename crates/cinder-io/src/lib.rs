//! # cinder-io: positioned file handle for Cinder storage
//!
//! Segment and index files are read and written through a [`FileHandle`]: a
//! stateful owner of exactly one OS descriptor with explicit open flags,
//! permission bits, seek/tell, length, and unbuffered read/write.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │   segment / index code   │
//! └────────────┬─────────────┘
//!              │
//! ┌────────────┴─────────────┐
//! │        cinder-io         │
//! │  FileHandle ─ OpenFlags  │
//! │      │        Permissions│
//! │      └── HandleOptions   │
//! └────────────┬─────────────┘
//!              │ std::fs::File
//!          OS descriptor
//! ```
//!
//! # Example
//!
//! ```
//! use std::io::SeekFrom;
//! use cinder_io::{FileHandle, OpenFlags, Permissions};
//!
//! # let dir = tempfile::tempdir().unwrap();
//! # let path = dir.path().join("segment_000000.dat");
//! let mut handle = FileHandle::new();
//! handle.open_with_mode(&path, OpenFlags::create_exclusive(), Permissions::OWNER_READ_WRITE)?;
//! assert_eq!(handle.seek(SeekFrom::Start(10))?, 10);
//! handle.write(&[0u8; 12])?;
//! assert_eq!(handle.tell()?, 22);
//! assert_eq!(handle.length()?, 22);
//! handle.close()?;
//! # Ok::<(), cinder_io::IoError>(())
//! ```
//!
//! # Features
//!
//! - `direct_io`: Enable `O_DIRECT` support on Linux (requires `libc`)

mod error;
mod flags;
mod handle;
mod options;

pub use error::IoError;
pub use flags::{OpenFlags, Permissions};
pub use handle::FileHandle;
pub use options::{DEFAULT_ZERO_FILL_CHUNK, HandleOptions, SparseExtend};
