//! # argus-tracer
//!
//! Block instance extraction engine for engineering drawings.
//!
//! Starting at the root drawing's model space, the extractor walks every
//! block reference depth-first, composing transforms on the way down, and
//! records each instance whose block name passes the filter. Xrefs are
//! opened on demand through a [`DrawingSource`](argus_parser::DrawingSource)
//! and walked at most once per run.
//!
//! ## Key Features
//!
//! - **World positions**: insertion points resolved through nested blocks,
//!   rotations, scales and extrusion directions
//! - **Xref traversal**: relative and absolute xref paths, shared xrefs
//!   walked once, unreachable xrefs skipped without failing the run
//! - **Cycle safety**: blocks that contain themselves are not re-entered
//! - **Wildcard filters**: `VALVE*`, `PUMP-?`, case-insensitive
//!
//! ## Example
//!
//! ```no_run
//! use argus_parser::DxfSource;
//! use argus_tracer::{BlockExtractor, ExtractOptions, NameFilter};
//!
//! let options = ExtractOptions::default().with_filters(NameFilter::parse_list("VALVE*"));
//! let report = BlockExtractor::new(&DxfSource::default(), options)
//!     .extract("plant.dxf".as_ref())?;
//! println!("{}", report.summary());
//! # Ok::<(), argus_error::ArgusError>(())
//! ```

pub mod attributes;
pub mod core;
pub mod filter;
pub mod record;
pub mod resolver;
pub mod serializer;
pub mod transform;
pub mod xref_path;

pub use argus_error::Result;
pub use attributes::{collect_attributes, AttributeMap};
pub use crate::core::{BlockExtractor, ExtractOptions};
pub use filter::{NameFilter, NamePattern};
pub use record::{ExtractionRecord, ExtractionReport};
pub use resolver::{ReferenceResolver, Resolution, SkippedReference, XrefTarget};
pub use serializer::{prepare_destination, render, write_records, OutputFormat};
pub use xref_path::XrefPath;

use argus_parser::DrawingSource;
use std::path::Path;

/// Extract from `input` and write the records to `output`.
///
/// The destination is prepared before the drawing is opened, and nothing is
/// written unless the whole run succeeds.
pub fn export<S: DrawingSource + ?Sized>(
    source: &S,
    input: &Path,
    output: &Path,
    options: ExtractOptions,
    format: OutputFormat,
) -> Result<ExtractionReport> {
    prepare_destination(output)?;
    let report = BlockExtractor::new(source, options).extract(input)?;
    write_records(&report.records, output, format)?;
    Ok(report)
}
