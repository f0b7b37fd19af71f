use crate::attributes::AttributeMap;
use crate::resolver::SkippedReference;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One extracted block instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Block definition name
    pub name: String,
    /// Root drawing of the run, whichever xref the instance was found in
    #[serde(rename = "source_drawing")]
    pub source_document_path: String,
    #[serde(rename = "from_xref")]
    pub from_external_reference: bool,
    /// Outermost xref boundary crossed to reach the instance
    #[serde(
        rename = "xref_path",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub external_reference_path: Option<String>,
    pub layer: String,
    #[serde(rename = "position_wcs")]
    pub world_position: [f64; 3],
    pub attributes: AttributeMap,
}

/// Everything one extraction run produced
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub source_drawing: PathBuf,
    pub records: Vec<ExtractionRecord>,
    /// Xref documents that were opened and walked
    pub references_loaded: Vec<PathBuf>,
    pub references_skipped: Vec<SkippedReference>,
    /// Definitions not descended into because they were already on the current path
    pub cycles_broken: usize,
}

impl ExtractionReport {
    pub fn summary(&self) -> String {
        format!(
            "{} record(s) from {}, {} xref(s) loaded, {} skipped",
            self.records.len(),
            self.source_drawing.display(),
            self.references_loaded.len(),
            self.references_skipped.len()
        )
    }
}
