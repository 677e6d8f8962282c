//! Stat command - report the length of a file.

use std::path::Path;

use anyhow::{Context, Result};
use cinder_io::{FileHandle, HandleOptions, OpenFlags};

pub fn run(path: &Path, options: &HandleOptions) -> Result<()> {
    let length = length_of(path, options)?;
    println!("{}: {length} bytes", path.display());
    Ok(())
}

pub fn length_of(path: &Path, options: &HandleOptions) -> Result<u64> {
    let mut handle = FileHandle::with_options(options.clone());
    handle
        .open(path, OpenFlags::read_only())
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let length = handle.length()?;
    handle.close()?;
    Ok(length)
}
