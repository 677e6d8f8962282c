//! Fill command - looped fixed-size writes with latency reporting.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, ensure};
use cinder_io::{FileHandle, HandleOptions, OpenFlags};

/// Mean write latency for one batch of writes.
#[derive(Debug)]
pub struct BatchLatency {
    /// File length when the batch finished.
    pub length: u64,
    pub mean: Duration,
}

pub fn run(
    path: &Path,
    options: &HandleOptions,
    chunk: usize,
    count: u64,
    report_every: u64,
) -> Result<()> {
    let batches = fill(path, options, chunk, count, report_every)?;

    println!("{:>14}  {:>12}", "length", "mean write");
    for batch in &batches {
        println!("{:>14}  {:>12?}", batch.length, batch.mean);
    }

    Ok(())
}

pub fn fill(
    path: &Path,
    options: &HandleOptions,
    chunk: usize,
    count: u64,
    report_every: u64,
) -> Result<Vec<BatchLatency>> {
    ensure!(chunk > 0, "chunk size must be greater than zero");
    ensure!(report_every > 0, "report interval must be greater than zero");

    let mut handle = FileHandle::with_options(options.clone());
    handle
        .open(
            path,
            OpenFlags::CREATE | OpenFlags::TRUNCATE | OpenFlags::WRITE_ONLY,
        )
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let buf = vec![0u8; chunk];
    let mut batches = Vec::new();
    let mut batch_start = Instant::now();
    let mut in_batch = 0u64;

    for i in 1..=count {
        handle
            .write(&buf)
            .with_context(|| format!("Write {i} of {count} failed"))?;
        in_batch += 1;

        if i % report_every == 0 || i == count {
            let batch = BatchLatency {
                length: handle.length()?,
                mean: batch_start.elapsed().div_f64(in_batch as f64),
            };
            tracing::debug!(length = batch.length, mean = ?batch.mean, "batch written");
            batches.push(batch);
            batch_start = Instant::now();
            in_batch = 0;
        }
    }

    handle.close()?;
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_reports_each_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fill.dat");

        let batches = fill(&path, &HandleOptions::default(), 4096, 10, 4).unwrap();

        let lengths: Vec<u64> = batches.iter().map(|b| b.length).collect();
        assert_eq!(lengths, vec![4 * 4096, 8 * 4096, 10 * 4096]);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 10 * 4096);
    }

    #[test]
    fn fill_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("refill.dat");
        std::fs::write(&path, vec![1u8; 100_000]).unwrap();

        fill(&path, &HandleOptions::default(), 100, 3, 10).unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 300);
    }

    #[test]
    fn fill_rejects_zero_chunk() {
        let dir = tempfile::tempdir().unwrap();
        assert!(fill(&dir.path().join("z.dat"), &HandleOptions::default(), 0, 1, 1).is_err());
    }
}
