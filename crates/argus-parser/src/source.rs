//! Drawing sources: the seam through which drawings are opened
//!
//! The extractor never touches the file system for drawings directly; it asks
//! a [`DrawingSource`] to open a path. [`DxfSource`] reads ASCII DXF from disk,
//! [`MemorySource`] hands out drawings that were built in code.

use crate::dxf::DxfReader;
use crate::model::Drawing;
use argus_error::conversions::drawing_io_error;
use argus_error::{ArgusError, DrawingErrorKind, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const BINARY_DXF_SENTINEL: &[u8] = b"AutoCAD Binary DXF";

/// Opens drawings by path
pub trait DrawingSource {
    fn open(&self, path: &Path) -> Result<Drawing>;
}

/// Options controlling how drawing files are read
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Files at least this large are memory-mapped instead of read into memory
    /// (default: 64MB, only with the `mmap` feature)
    pub mmap_threshold_bytes: u64,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            mmap_threshold_bytes: 64 * 1024 * 1024,
        }
    }
}

/// Detected on-disk format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingFormat {
    AsciiDxf,
    BinaryDxf,
    Dwg,
}

/// Detect the drawing format from the leading bytes
pub fn detect_format(bytes: &[u8]) -> DrawingFormat {
    if bytes.starts_with(BINARY_DXF_SENTINEL) {
        DrawingFormat::BinaryDxf
    } else if bytes.len() >= 6
        && bytes.starts_with(b"AC10")
        && bytes[4..6].iter().all(u8::is_ascii_digit)
    {
        DrawingFormat::Dwg
    } else {
        DrawingFormat::AsciiDxf
    }
}

/// Backing storage for a drawing file's bytes
enum SourceData {
    Memory(Vec<u8>),
    #[cfg(feature = "mmap")]
    Mapped(memmap2::Mmap),
}

impl SourceData {
    fn bytes(&self) -> &[u8] {
        match self {
            SourceData::Memory(data) => data.as_slice(),
            #[cfg(feature = "mmap")]
            SourceData::Mapped(mmap) => &mmap[..],
        }
    }
}

/// Reads ASCII DXF drawings from the file system
#[derive(Debug, Clone, Default)]
pub struct DxfSource {
    options: ReadOptions,
}

impl DxfSource {
    pub fn new(options: ReadOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    fn load(&self, path: &Path) -> Result<SourceData> {
        let mut file = File::open(path).map_err(|e| drawing_io_error(&e, path))?;
        let len = file
            .metadata()
            .map_err(|e| drawing_io_error(&e, path))?
            .len();

        #[cfg(feature = "mmap")]
        if len >= self.options.mmap_threshold_bytes {
            // The mapping is dropped before open() returns
            match unsafe { memmap2::Mmap::map(&file) } {
                Ok(mmap) => {
                    log::debug!("Memory-mapped {} ({len} bytes)", path.display());
                    return Ok(SourceData::Mapped(mmap));
                }
                Err(e) => {
                    log::warn!("Failed to mmap {}, reading instead: {e}", path.display());
                }
            }
        }

        let mut buffer = Vec::with_capacity(len as usize);
        file.read_to_end(&mut buffer)
            .map_err(|e| drawing_io_error(&e, path))?;
        Ok(SourceData::Memory(buffer))
    }
}

impl DrawingSource for DxfSource {
    fn open(&self, path: &Path) -> Result<Drawing> {
        let data = self.load(path)?;
        let bytes = data.bytes();
        match detect_format(bytes) {
            DrawingFormat::AsciiDxf => {}
            DrawingFormat::BinaryDxf => {
                return Err(ArgusError::drawing(
                    "Binary DXF is not supported; save the drawing as ASCII DXF",
                    DrawingErrorKind::UnsupportedFormat,
                )
                .with_file_path(path))
            }
            DrawingFormat::Dwg => {
                return Err(ArgusError::drawing(
                    "DWG files must be converted to ASCII DXF first",
                    DrawingErrorKind::UnsupportedFormat,
                )
                .with_file_path(path))
            }
        }
        // Pre-2007 DXF files are code-page encoded, not UTF-8
        let text = String::from_utf8_lossy(bytes);
        DxfReader::parse(&text, path).map_err(|e| e.with_file_path(path))
    }
}

/// Serves drawings held in memory, keyed by the path they were built with
#[derive(Debug, Default)]
pub struct MemorySource {
    drawings: HashMap<PathBuf, Drawing>,
    unreadable: HashMap<PathBuf, String>,
    opens: RefCell<HashMap<PathBuf, usize>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_drawing(mut self, drawing: Drawing) -> Self {
        self.insert(drawing);
        self
    }

    pub fn insert(&mut self, drawing: Drawing) {
        self.drawings.insert(drawing.path().to_path_buf(), drawing);
    }

    /// Make opening `path` fail as if the file were corrupt
    pub fn with_unreadable<P: Into<PathBuf>, M: Into<String>>(mut self, path: P, reason: M) -> Self {
        self.unreadable.insert(path.into(), reason.into());
        self
    }

    /// How many times `path` has been opened through this source
    pub fn open_count(&self, path: &Path) -> usize {
        self.opens.borrow().get(path).copied().unwrap_or(0)
    }
}

impl DrawingSource for MemorySource {
    fn open(&self, path: &Path) -> Result<Drawing> {
        *self
            .opens
            .borrow_mut()
            .entry(path.to_path_buf())
            .or_insert(0) += 1;
        if let Some(reason) = self.unreadable.get(path) {
            return Err(
                ArgusError::drawing(reason.clone(), DrawingErrorKind::InvalidFormat)
                    .with_file_path(path),
            );
        }
        self.drawings.get(path).cloned().ok_or_else(|| {
            ArgusError::drawing("No such drawing", DrawingErrorKind::NotFound).with_file_path(path)
        })
    }
}
