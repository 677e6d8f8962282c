//! The [`FileHandle`] type.
//!
//! A `FileHandle` owns at most one open descriptor. Every operation is a
//! direct, blocking call into `std::fs::File`; there is no buffering and no
//! shadow offset. The OS cursor is the only record of the position.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::{HandleOptions, IoError, OpenFlags, Permissions, SparseExtend};

/// Positioned, mode-controlled access to a single data file.
///
/// Created unopened. [`open_with_mode`](Self::open_with_mode) acquires a
/// descriptor and [`close`](Self::close) (or drop) releases it. While
/// unopened every I/O method fails with [`IoError::NotOpen`] without touching
/// the filesystem.
///
/// Not synchronised: the cursor is shared OS state, so concurrent use needs
/// external locking.
#[derive(Debug, Default)]
pub struct FileHandle {
    file: Option<File>,
    /// Path of the most recent successful open. Kept after close.
    path: PathBuf,
    flags: Option<OpenFlags>,
    options: HandleOptions,
}

impl FileHandle {
    /// Creates an unopened handle with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unopened handle with the given options.
    pub fn with_options(options: HandleOptions) -> Self {
        Self {
            file: None,
            path: PathBuf::new(),
            flags: None,
            options,
        }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    /// Path of the last successful open, or an empty path if never opened.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn options(&self) -> &HandleOptions {
        &self.options
    }

    /// Opens `path` with `flags`, creating it with `permissions` if the flags
    /// ask for creation.
    ///
    /// Fails with [`IoError::AlreadyOpen`] if the handle already owns a
    /// descriptor; the existing descriptor is left untouched.
    #[tracing::instrument(level = "debug", skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn open_with_mode(
        &mut self,
        path: impl AsRef<Path>,
        flags: OpenFlags,
        permissions: Permissions,
    ) -> Result<(), IoError> {
        let path = path.as_ref();
        if self.file.is_some() {
            return Err(IoError::AlreadyOpen {
                path: self.path.clone(),
            });
        }
        if path.as_os_str().is_empty() {
            return Err(IoError::InvalidPath {
                reason: "path is empty",
            });
        }

        let mut opts = flags.to_open_options()?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(permissions.mode());
        }
        #[cfg(not(unix))]
        let _ = permissions;

        let mut file = opts.open(path).map_err(|e| IoError::classify(e, path))?;
        // O_APPEND only moves the cursor on the first write
        if flags.contains(OpenFlags::APPEND) {
            file.seek(SeekFrom::End(0))
                .map_err(|e| IoError::classify(e, path))?;
        }
        self.file = Some(file);
        self.path = path.to_path_buf();
        self.flags = Some(flags);
        tracing::debug!("file handle opened");
        Ok(())
    }

    /// Opens `path` using the handle's default permission bits.
    pub fn open(&mut self, path: impl AsRef<Path>, flags: OpenFlags) -> Result<(), IoError> {
        let permissions = self.options.default_permissions();
        self.open_with_mode(path, flags, permissions)
    }

    /// Reopens the last path read/write without creating it.
    pub fn reopen(&mut self) -> Result<(), IoError> {
        if self.path.as_os_str().is_empty() {
            return Err(IoError::InvalidPath {
                reason: "handle has never been opened",
            });
        }
        let path = self.path.clone();
        self.open(path, OpenFlags::READ_WRITE)
    }

    /// Moves the cursor and returns its new absolute position.
    ///
    /// Seeking past end-of-file is allowed and does not change
    /// [`length`](Self::length); the gap appears only once something is
    /// written there.
    pub fn seek(&mut self, target: SeekFrom) -> Result<u64, IoError> {
        let (file, path) = self.parts()?;
        file.seek(target).map_err(|e| match e.kind() {
            ErrorKind::InvalidInput => IoError::InvalidSeek { target },
            _ => IoError::classify(e, path),
        })
    }

    /// Current cursor position as reported by the OS.
    pub fn tell(&mut self) -> Result<u64, IoError> {
        let (file, path) = self.parts()?;
        file.stream_position()
            .map_err(|e| IoError::classify(e, path))
    }

    /// Current size of the file on disk, independent of the cursor.
    pub fn length(&self) -> Result<u64, IoError> {
        let file = self.file.as_ref().ok_or(IoError::NotOpen)?;
        let metadata = file
            .metadata()
            .map_err(|e| IoError::classify(e, &self.path))?;
        Ok(metadata.len())
    }

    /// Writes all of `buf` at the cursor with a single OS write and advances
    /// the cursor.
    ///
    /// A write positioned past end-of-file extends the file; the gap reads
    /// back as zeros. A short write is returned as [`IoError::ShortWrite`]
    /// with the cursor advanced by the bytes that did land; retrying is up to
    /// the caller.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        if self.options.sparse_extend == SparseExtend::ZeroFill {
            self.zero_fill_gap()?;
        }
        let (file, path) = self.parts()?;
        let written = file.write(buf).map_err(|e| IoError::classify(e, path))?;
        if written < buf.len() {
            return Err(IoError::ShortWrite {
                expected: buf.len(),
                written,
            });
        }
        Ok(written)
    }

    /// Reads up to `buf.len()` bytes at the cursor. Returns 0 at end-of-file.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        let (file, path) = self.parts()?;
        file.read(buf).map_err(|e| IoError::classify(e, path))
    }

    /// Fills `buf` from the cursor or fails with [`IoError::UnexpectedEof`].
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), IoError> {
        let (file, path) = self.parts()?;
        let mut filled = 0;
        while filled < buf.len() {
            match file.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(IoError::UnexpectedEof {
                        expected: buf.len(),
                        read: filled,
                    });
                }
                Ok(n) => filled += n,
                Err(e) => return Err(IoError::classify(e, path)),
            }
        }
        Ok(())
    }

    /// Reads at `offset` without moving the cursor.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize, IoError> {
        let file = self.file.as_ref().ok_or(IoError::NotOpen)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileExt;
            file.read_at(buf, offset)
                .map_err(|e| IoError::classify(e, &self.path))
        }

        #[cfg(not(unix))]
        {
            use std::os::windows::fs::FileExt;
            let mut file = file;
            let cursor = file.stream_position();
            let n = file.seek_read(buf, offset);
            let restored = cursor.and_then(|pos| file.seek(SeekFrom::Start(pos)));
            let n = n.map_err(|e| IoError::classify(e, &self.path))?;
            restored.map_err(|e| IoError::classify(e, &self.path))?;
            Ok(n)
        }
    }

    /// Writes all of `buf` at `offset` without moving the cursor.
    pub fn write_at(&self, buf: &[u8], offset: u64) -> Result<usize, IoError> {
        let file = self.file.as_ref().ok_or(IoError::NotOpen)?;

        #[cfg(unix)]
        let written = {
            use std::os::unix::fs::FileExt;
            file.write_at(buf, offset)
                .map_err(|e| IoError::classify(e, &self.path))?
        };

        #[cfg(not(unix))]
        let written = {
            use std::os::windows::fs::FileExt;
            let mut file = file;
            let cursor = file.stream_position();
            let n = file.seek_write(buf, offset);
            let restored = cursor.and_then(|pos| file.seek(SeekFrom::Start(pos)));
            let n = n.map_err(|e| IoError::classify(e, &self.path))?;
            restored.map_err(|e| IoError::classify(e, &self.path))?;
            n
        };

        if written < buf.len() {
            return Err(IoError::ShortWrite {
                expected: buf.len(),
                written,
            });
        }
        Ok(written)
    }

    /// Truncates or zero-extends the file to `len` bytes. The cursor is not
    /// moved.
    pub fn set_len(&mut self, len: u64) -> Result<(), IoError> {
        let (file, path) = self.parts()?;
        file.set_len(len).map_err(|e| IoError::classify(e, path))
    }

    /// Syncs file data and metadata to disk.
    pub fn sync(&self) -> Result<(), IoError> {
        let file = self.file.as_ref().ok_or(IoError::NotOpen)?;
        file.sync_all()
            .map_err(|e| IoError::classify(e, &self.path))
    }

    /// Releases the descriptor.
    ///
    /// Closing an unopened handle is a no-op success. The handle is unopened
    /// afterwards even when the sync requested by
    /// [`HandleOptions::sync_on_close`] fails; that failure is still returned.
    #[tracing::instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn close(&mut self) -> Result<(), IoError> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        self.flags = None;

        let synced = if self.options.sync_on_close {
            file.sync_all()
                .map_err(|e| IoError::classify(e, &self.path))
        } else {
            Ok(())
        };
        // Drop the file to close it
        drop(file);
        tracing::debug!("file handle closed");
        synced
    }

    fn parts(&mut self) -> Result<(&mut File, &Path), IoError> {
        match self.file.as_mut() {
            Some(file) => Ok((file, &self.path)),
            None => Err(IoError::NotOpen),
        }
    }

    /// Writes zeros from end-of-file up to the cursor with positioned writes,
    /// so the cursor stays put even when a zero write fails. Append-mode
    /// writes always land at end-of-file, so they never leave a gap.
    fn zero_fill_gap(&mut self) -> Result<(), IoError> {
        if self.flags.is_some_and(|f| f.contains(OpenFlags::APPEND)) {
            return Ok(());
        }
        let len = self.length()?;
        let cursor = self.tell()?;
        if cursor <= len {
            return Ok(());
        }

        tracing::trace!(from = len, to = cursor, "zero-filling gap");
        let chunk = self.options.zero_fill_chunk();
        let zeros = vec![0u8; zero_chunk_len(cursor - len, chunk)];
        let mut offset = len;
        while offset < cursor {
            let n = (cursor - offset).min(zeros.len() as u64) as usize;
            self.write_at(&zeros[..n], offset)?;
            offset += n as u64;
        }
        Ok(())
    }
}

/// Buffer length for zero-filling a gap of `gap` bytes. Never zero for a
/// non-empty gap, even where `gap` does not fit in `usize`.
fn zero_chunk_len(gap: u64, chunk: usize) -> usize {
    usize::try_from(gap).map_or(chunk, |gap| chunk.min(gap))
}

impl Drop for FileHandle {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            tracing::warn!(
                path = %self.path.display(),
                %error,
                "failed to close file handle on drop"
            );
        }
    }
}
