//! Per-handle behaviour knobs.

use serde::{Deserialize, Serialize};

use crate::Permissions;

/// Default chunk used when zero-filling a gap explicitly (64 KiB).
pub const DEFAULT_ZERO_FILL_CHUNK: usize = 64 * 1024;

/// How a write positioned past end-of-file materialises the gap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SparseExtend {
    /// Rely on the OS to read the gap back as zeros.
    #[default]
    Native,
    /// Write the zeros explicitly before the payload. For filesystems that do
    /// not guarantee zero-fill on extend.
    ZeroFill,
}

/// Options applied to every file a [`FileHandle`](crate::FileHandle) opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleOptions {
    /// Fsync before releasing the descriptor.
    pub sync_on_close: bool,
    pub sparse_extend: SparseExtend,
    /// Size of each zero write under [`SparseExtend::ZeroFill`].
    pub zero_fill_chunk: usize,
    /// Mode used by [`FileHandle::open`](crate::FileHandle::open).
    pub default_mode: u32,
}

impl HandleOptions {
    pub fn default_permissions(&self) -> Permissions {
        Permissions::from_mode(self.default_mode)
    }

    pub(crate) fn zero_fill_chunk(&self) -> usize {
        self.zero_fill_chunk.max(1)
    }
}

impl Default for HandleOptions {
    fn default() -> Self {
        Self {
            sync_on_close: false,
            sparse_extend: SparseExtend::Native,
            zero_fill_chunk: DEFAULT_ZERO_FILL_CHUNK,
            default_mode: Permissions::OWNER_READ_WRITE.mode(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_partial_toml() {
        let options: HandleOptions = toml::from_str(
            r#"
sync_on_close = true
sparse_extend = "zero-fill"
default_mode = 0o640
"#,
        )
        .unwrap();

        assert!(options.sync_on_close);
        assert_eq!(options.sparse_extend, SparseExtend::ZeroFill);
        assert_eq!(options.zero_fill_chunk, DEFAULT_ZERO_FILL_CHUNK);
        assert_eq!(options.default_permissions().mode(), 0o640);
    }

    #[test]
    fn zero_chunk_is_clamped() {
        let options = HandleOptions {
            zero_fill_chunk: 0,
            ..HandleOptions::default()
        };
        assert_eq!(options.zero_fill_chunk(), 1);
    }
}
