//! Streaming read → uppercase → write pipeline.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::transform::UppercaseTransform;
use crate::error::{CopyError, StreamError};

/// Read size for each chunk.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Totals for a finished copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Bytes read from the source.
    pub bytes_read: u64,
    /// Bytes written to the destination.
    pub bytes_written: u64,
    /// Number of non-empty reads.
    pub chunks: u64,
}

/// Copies `source` to `dest`, uppercasing the content.
///
/// The source is opened before the destination is created, so a missing
/// source leaves no destination behind. If the pipeline fails after the
/// destination exists, the partial output is removed.
///
/// # Errors
///
/// Returns [`CopyError::SourceMissing`] if `source` does not exist, or
/// [`CopyError::Read`] / [`CopyError::Write`] on I/O failure.
pub async fn copy_uppercase(source: &Path, dest: &Path) -> Result<CopyReport, CopyError> {
    let reader = File::open(source).await.map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            CopyError::SourceMissing(source.to_path_buf())
        } else {
            CopyError::Read {
                path: source.to_path_buf(),
                source: err,
            }
        }
    })?;

    let writer = File::create(dest).await.map_err(|err| CopyError::Write {
        path: dest.to_path_buf(),
        source: err,
    })?;

    match transform_stream(reader, writer, CHUNK_SIZE).await {
        Ok(report) => Ok(report),
        Err(err) => {
            remove_partial(dest).await;
            Err(CopyError::from_stream(err, source, dest))
        }
    }
}

/// Pumps `reader` through an [`UppercaseTransform`] into `writer`.
///
/// Returns only after `writer` has been flushed.
///
/// # Errors
///
/// Returns [`StreamError::Read`] or [`StreamError::Write`] on the first
/// I/O failure; nothing after it is written.
pub async fn transform_stream<R, W>(
    mut reader: R,
    mut writer: W,
    chunk_size: usize,
) -> Result<CopyReport, StreamError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut transform = UppercaseTransform::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    let mut report = CopyReport::default();

    loop {
        let n = reader.read(&mut buf).await.map_err(StreamError::Read)?;
        if n == 0 {
            break;
        }
        let chunk = buf.get(..n).unwrap_or_default();
        report.bytes_read = report.bytes_read.saturating_add(n as u64);
        report.chunks = report.chunks.saturating_add(1);

        let out = transform.transform(chunk);
        writer.write_all(&out).await.map_err(StreamError::Write)?;
        report.bytes_written = report.bytes_written.saturating_add(out.len() as u64);
    }

    let tail = transform.finish();
    writer.write_all(&tail).await.map_err(StreamError::Write)?;
    report.bytes_written = report.bytes_written.saturating_add(tail.len() as u64);

    writer.flush().await.map_err(StreamError::Write)?;
    Ok(report)
}

async fn remove_partial(dest: &Path) {
    match tokio::fs::remove_file(dest).await {
        Ok(()) => tracing::warn!(path = %dest.display(), "removed partial output"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => {
            tracing::error!(path = %dest.display(), error = %err, "failed to remove partial output");
        }
    }
}
