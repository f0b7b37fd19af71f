// argus-parser/src/lib.rs

//! # argus-parser
//!
//! Drawing document model and reader for the argus block extractor.
//!
//! A [`Drawing`] is a read-only arena of block [`Definition`]s, one of which is
//! the model space. Definitions hold ordered [`Instance`]s (block references)
//! that point at other definitions by name, so the definition graph can be
//! walked without the reader being involved again.
//!
//! ## Architecture
//!
//! 1. **Source**: [`DrawingSource`] is the seam the extractor opens documents
//!    through. [`DxfSource`] reads ASCII DXF files from disk; [`MemorySource`]
//!    serves pre-built drawings.
//! 2. **Groups**: [`groups::GroupReader`] splits DXF text into code/value pairs.
//! 3. **Sections**: [`dxf::DxfReader`] turns the HEADER, BLOCKS and ENTITIES
//!    sections into a [`Drawing`] through a [`DrawingBuilder`].

pub mod dxf;
pub mod groups;
pub mod header;
pub mod model;
pub mod placement;
pub mod source;

pub use argus_error::{ArgusError, DrawingErrorKind, Result};
pub use header::DrawingHeader;
pub use model::{
    AttributeEntry, Definition, DefinitionFlags, DefinitionId, DefinitionKind, Drawing,
    DrawingBuilder, Instance, INTERNAL_NAME_MARKER, MODEL_SPACE_NAME, PAPER_SPACE_NAME,
};
pub use placement::Placement;
pub use source::{detect_format, DrawingFormat, DrawingSource, DxfSource, MemorySource, ReadOptions};
