//! Probe command - sparse write on a freshly created file.

use std::io::SeekFrom;
use std::path::Path;

use anyhow::{Context, Result};
use cinder_io::{FileHandle, HandleOptions, OpenFlags, Permissions};

const PROBE_OFFSET: u64 = 10;
const PROBE_BYTES: usize = 12;

/// Positions observed while probing.
#[derive(Debug, PartialEq, Eq)]
pub struct ProbeReport {
    pub initial_length: u64,
    pub seek_position: u64,
    pub length_after_seek: u64,
    pub tell_after_write: u64,
    pub length_after_write: u64,
}

pub fn run(path: &Path, options: &HandleOptions) -> Result<()> {
    let report = probe(path, options)?;

    println!("Probe: {}", path.display());
    println!("----------------------");
    println!("Initial length:     {}", report.initial_length);
    println!("Seek to:            {}", report.seek_position);
    println!("Length after seek:  {}", report.length_after_seek);
    println!("Tell after write:   {}", report.tell_after_write);
    println!("Length after write: {}", report.length_after_write);

    Ok(())
}

pub fn probe(path: &Path, options: &HandleOptions) -> Result<ProbeReport> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut handle = FileHandle::with_options(options.clone());
    handle
        .open_with_mode(path, OpenFlags::create_exclusive(), Permissions::OWNER_READ_WRITE)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let initial_length = handle.length()?;
    let seek_position = handle.seek(SeekFrom::Start(PROBE_OFFSET))?;
    let length_after_seek = handle.length()?;
    handle.write(&[0u8; PROBE_BYTES])?;
    let report = ProbeReport {
        initial_length,
        seek_position,
        length_after_seek,
        tell_after_write: handle.tell()?,
        length_after_write: handle.length()?,
    };
    handle.close()?;

    tracing::info!(path = %path.display(), ?report, "probe complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_reports_sparse_extend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("segment_000000.dat");

        let report = probe(&path, &HandleOptions::default()).unwrap();

        assert_eq!(
            report,
            ProbeReport {
                initial_length: 0,
                seek_position: 10,
                length_after_seek: 0,
                tell_after_write: 22,
                length_after_write: 22,
            }
        );
    }

    #[test]
    fn probe_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("taken.dat");
        std::fs::write(&path, b"x").unwrap();

        let err = probe(&path, &HandleOptions::default()).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<cinder_io::IoError>(),
            Some(cinder_io::IoError::AlreadyExists { .. })
        ));
    }
}
