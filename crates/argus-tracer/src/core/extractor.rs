use crate::attributes::collect_attributes;
use crate::core::options::ExtractOptions;
use crate::record::{ExtractionRecord, ExtractionReport};
use crate::resolver::{ReferenceResolver, Resolution, XrefTarget};
use crate::transform::{compose, enter_definition, world_position};
use argus_error::Result;
use argus_parser::{DefinitionId, Drawing, DrawingSource, Instance};
use glam::DAffine3;
use log::{debug, info, trace, warn};
use std::collections::HashSet;
use std::path::Path;

/// Definitions on the path from the current document's top-level space down
/// to the frame being walked
#[derive(Debug, Default)]
struct ActivePath {
    stack: Vec<DefinitionId>,
    members: HashSet<DefinitionId>,
}

impl ActivePath {
    fn enter(&mut self, id: DefinitionId) -> bool {
        if !self.members.insert(id) {
            return false;
        }
        self.stack.push(id);
        true
    }

    fn exit(&mut self, id: DefinitionId) {
        let popped = self.stack.pop();
        debug_assert_eq!(popped, Some(id));
        self.members.remove(&id);
    }
}

#[derive(Debug, Clone)]
struct Frame {
    /// Definition space to world
    transform: DAffine3,
    /// Outermost xref crossed on the way here
    xref_path: Option<String>,
    depth: usize,
}

impl Frame {
    fn root() -> Self {
        Self {
            transform: DAffine3::IDENTITY,
            xref_path: None,
            depth: 0,
        }
    }
}

/// Walks a drawing's definition graph and records every matching block instance.
///
/// One extractor serves one run: [`BlockExtractor::extract`] consumes it, so no
/// visited-xref state leaks from one run into the next.
pub struct BlockExtractor<'s, S: DrawingSource + ?Sized> {
    resolver: ReferenceResolver<'s, S>,
    options: ExtractOptions,
    source_drawing: String,
    records: Vec<ExtractionRecord>,
    cycles_broken: usize,
}

impl<'s, S: DrawingSource + ?Sized> BlockExtractor<'s, S> {
    pub fn new(source: &'s S, options: ExtractOptions) -> Self {
        Self {
            resolver: ReferenceResolver::new(source),
            options,
            source_drawing: String::new(),
            records: Vec::new(),
            cycles_broken: 0,
        }
    }

    /// Extract from the root drawing at `root`.
    ///
    /// Only failing to open the root drawing is an error; unreachable xrefs
    /// are reported in [`ExtractionReport::references_skipped`].
    pub fn extract(mut self, root: &Path) -> Result<ExtractionReport> {
        let drawing = self.resolver.open_root(root)?;
        let root_path = drawing.path().to_path_buf();
        self.source_drawing = root_path.to_string_lossy().into_owned();
        info!("Extracting block instances from {}", root_path.display());

        self.walk(
            &drawing,
            drawing.model_space(),
            &Frame::root(),
            &mut ActivePath::default(),
        );
        if self.options.include_paper_space {
            for layout in drawing.layouts() {
                self.walk(&drawing, layout, &Frame::root(), &mut ActivePath::default());
            }
        }
        drop(drawing);

        let (references_loaded, references_skipped) = self.resolver.into_outcome();
        let report = ExtractionReport {
            source_drawing: root_path,
            records: self.records,
            references_loaded,
            references_skipped,
            cycles_broken: self.cycles_broken,
        };
        info!("{}", report.summary());
        Ok(report)
    }

    fn walk(
        &mut self,
        drawing: &Drawing,
        id: DefinitionId,
        frame: &Frame,
        active: &mut ActivePath,
    ) {
        if !active.enter(id) {
            debug!(
                "Block '{}' already on the current path in {}, not descending",
                drawing.definition(id).name,
                drawing.path().display()
            );
            self.cycles_broken += 1;
            return;
        }
        trace!(
            "Entering '{}' at depth {}",
            drawing.definition(id).name,
            frame.depth
        );
        for instance in drawing.children(id) {
            self.visit(drawing, instance, frame, active);
        }
        active.exit(id);
    }

    fn visit(
        &mut self,
        drawing: &Drawing,
        instance: &Instance,
        frame: &Frame,
        active: &mut ActivePath,
    ) {
        let Some(child_id) = drawing.resolve_definition(instance) else {
            warn!(
                "Instance of undefined block '{}' in {}",
                instance.definition_name,
                drawing.path().display()
            );
            return;
        };
        let child = drawing.definition(child_id);
        if child.is_top_level_space() || child.is_anonymous_or_synthetic() {
            trace!("Skipping internal block '{}'", child.name);
            return;
        }

        let combined = compose(frame.transform, instance.local_transform());
        let target = child
            .is_external_reference()
            .then(|| self.resolver.locate(child, drawing.path()));
        let xref_path = frame
            .xref_path
            .clone()
            .or_else(|| target.as_ref().map(XrefTarget::label));

        if self.options.filters.matches(&child.name) {
            trace!("Recording '{}' on layer {}", child.name, instance.layer);
            self.records.push(ExtractionRecord {
                name: child.name.clone(),
                source_document_path: self.source_drawing.clone(),
                from_external_reference: xref_path.is_some(),
                external_reference_path: xref_path.clone(),
                layer: instance.layer.clone(),
                world_position: world_position(combined),
                attributes: collect_attributes(instance),
            });
        }

        if self
            .options
            .max_depth
            .is_some_and(|max| frame.depth >= max)
        {
            debug!("Depth limit reached at '{}'", child.name);
            return;
        }

        let next = Frame {
            transform: enter_definition(combined, child.base_point),
            xref_path,
            depth: frame.depth + 1,
        };
        match target {
            Some(target) => match self.resolver.resolve(&target) {
                Resolution::Loaded(xref) => {
                    // A new document starts a new cycle-detection scope
                    self.walk(&xref, xref.model_space(), &next, &mut ActivePath::default());
                }
                Resolution::AlreadyVisited | Resolution::Unreachable(_) => {}
            },
            None => self.walk(drawing, child_id, &next, active),
        }
    }
}
