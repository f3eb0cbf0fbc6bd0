//! uppercase-copy entry point.
//!
//! Copies `input.txt` to `output.txt` in the working directory,
//! uppercasing the content. Exits with status 1 if the input is missing
//! or the copy fails.

use std::path::Path;

use anyhow::Context;

use chat_relay::copier::{self, DEST_FILE, SOURCE_FILE};
use chat_relay::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_tracing(telemetry::log_format_from_env());

    let source = Path::new(SOURCE_FILE);
    let dest = Path::new(DEST_FILE);

    tracing::info!("Starting copy and transformation...");
    let report = copier::copy_uppercase(source, dest)
        .await
        .inspect_err(|err| tracing::error!(error = %err, "copy failed"))
        .with_context(|| format!("failed to copy {SOURCE_FILE} to {DEST_FILE}"))?;

    tracing::info!(
        bytes_read = report.bytes_read,
        bytes_written = report.bytes_written,
        chunks = report.chunks,
        "Copy and transformation completed successfully!"
    );
    Ok(())
}
