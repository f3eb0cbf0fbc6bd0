//! Uppercase copier: streams a file through an uppercase transform into a
//! new file, chunk by chunk.

pub mod pipeline;
pub mod transform;

pub use pipeline::{CHUNK_SIZE, CopyReport, copy_uppercase, transform_stream};
pub use transform::UppercaseTransform;

/// Input file read by the `uppercase-copy` binary.
pub const SOURCE_FILE: &str = "input.txt";

/// Output file written by the `uppercase-copy` binary.
pub const DEST_FILE: &str = "output.txt";
