//! Writing extraction records
//!
//! Output is rendered fully in memory, written to a temporary file next to the
//! destination and then renamed over it, so a failed run never leaves a
//! half-written file behind.

use crate::record::ExtractionRecord;
use argus_error::conversions::output_io_error;
use argus_error::{ArgusError, OutputErrorKind, Result};
use log::debug;
use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Indented JSON array of records
    #[default]
    Json,
    /// One `NAME @ (x,y,z)` line per record
    Flat,
}

impl FromStr for OutputFormat {
    type Err = ArgusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "flat" | "txt" | "text" => Ok(OutputFormat::Flat),
            other => Err(ArgusError::config(
                format!("Unknown output format '{other}' (expected json or flat)"),
                "format",
                argus_error::ConfigErrorKind::InvalidValue,
            )),
        }
    }
}

pub fn render(records: &[ExtractionRecord], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(records).map_err(|e| {
                ArgusError::output(
                    format!("Failed to serialize records: {e}"),
                    OutputErrorKind::SerializationFailed,
                )
            })?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Flat => {
            let mut out = String::new();
            for record in records {
                let [x, y, z] = record.world_position;
                // Writing to a String cannot fail
                let _ = writeln!(out, "{} @ ({x},{y},{z})", record.name);
            }
            Ok(out)
        }
    }
}

/// Directory the output will be written into
fn destination_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Create the destination's directories; a failure aborts the run before any
/// traversal
pub fn prepare_destination(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(ArgusError::destination_unavailable(
            "Output path is empty",
            path,
        ));
    }
    if path.is_dir() {
        return Err(ArgusError::destination_unavailable(
            "Output path is a directory",
            path,
        ));
    }
    let dir = destination_dir(path);
    fs::create_dir_all(&dir)
        .map_err(|e| output_io_error(&e, &dir, OutputErrorKind::DestinationUnavailable))
}

/// Render and atomically write records to `path`
pub fn write_records(records: &[ExtractionRecord], path: &Path, format: OutputFormat) -> Result<()> {
    let contents = render(records, format).map_err(|e| e.with_file_path(path))?;
    prepare_destination(path)?;
    write_atomically(path, &contents)?;

    debug!(
        "Wrote {} record(s) to {} ({} bytes)",
        records.len(),
        path.display(),
        contents.len()
    );
    Ok(())
}

/// Write through a temporary file in the destination directory, then rename.
/// On failure the temporary file is removed and `path` is left untouched.
fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let dir = destination_dir(path);
    let write_failed = |e: std::io::Error| output_io_error(&e, path, OutputErrorKind::WriteFailed);
    let mut tmp = NamedTempFile::new_in(&dir).map_err(write_failed)?;
    tmp.write_all(contents.as_bytes()).map_err(write_failed)?;
    tmp.as_file().sync_all().map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}
