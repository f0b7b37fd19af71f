//! External reference resolution
//!
//! Each distinct xref document is opened at most once per run. The visited set
//! only ever grows, so a document claimed by one branch stays claimed for every
//! other branch, and xref cycles (A -> B -> A) stop at the second visit.

use crate::xref_path::{normalize_path, XrefPath};
use argus_error::ArgusError;
use argus_parser::{Definition, Drawing, DrawingSource};
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Where an xref definition points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XrefTarget {
    /// Normalised absolute path of the referenced drawing
    Path(PathBuf),
    /// The definition carries no usable path
    Unlocatable { definition: String },
}

impl XrefTarget {
    /// Text recorded as the xref path of records crossing this boundary
    pub fn label(&self) -> String {
        match self {
            XrefTarget::Path(path) => path.to_string_lossy().into_owned(),
            XrefTarget::Unlocatable { definition } => definition.clone(),
        }
    }
}

#[derive(Debug)]
pub enum Resolution {
    Loaded(Drawing),
    AlreadyVisited,
    Unreachable(ArgusError),
}

/// An xref that could not be descended into
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedReference {
    pub path: String,
    pub reason: String,
}

pub struct ReferenceResolver<'s, S: DrawingSource + ?Sized> {
    source: &'s S,
    visited: HashSet<PathBuf>,
    loaded: Vec<PathBuf>,
    skipped: Vec<SkippedReference>,
}

impl<'s, S: DrawingSource + ?Sized> ReferenceResolver<'s, S> {
    pub fn new(source: &'s S) -> Self {
        Self {
            source,
            visited: HashSet::new(),
            loaded: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Open the root drawing and claim its path so xrefs pointing back at it
    /// are not walked a second time
    pub fn open_root(&mut self, path: &Path) -> Result<Drawing, ArgusError> {
        let normalized = normalize_path(path);
        let drawing = self.source.open(&normalized).map_err(|e| {
            ArgusError::fatal_input(
                format!("Cannot open root drawing ({})", e.summary()),
                normalized.clone(),
            )
        })?;
        self.visited.insert(normalized);
        Ok(drawing)
    }

    /// Work out which file an xref definition inside `referencing` names
    pub fn locate(&self, definition: &Definition, referencing: &Path) -> XrefTarget {
        let raw = match definition.source_path.as_deref() {
            Some(raw) => XrefPath::new(raw),
            None => XrefPath::new(""),
        };
        if raw.is_empty() {
            return XrefTarget::Unlocatable {
                definition: definition.name.clone(),
            };
        }
        let dir = referencing.parent().unwrap_or_else(|| Path::new(""));
        XrefTarget::Path(raw.resolve(dir))
    }

    pub fn resolve(&mut self, target: &XrefTarget) -> Resolution {
        let path = match target {
            XrefTarget::Path(path) => path,
            XrefTarget::Unlocatable { definition } => {
                let reason = format!("Xref '{definition}' has no source path");
                let err = ArgusError::reference_unreachable(reason.clone(), definition.as_str());
                return self.skip(target.label(), reason, err);
            }
        };

        if !self.visited.insert(path.clone()) {
            debug!("Xref {} already visited", path.display());
            return Resolution::AlreadyVisited;
        }

        match self.source.open(path) {
            Ok(drawing) => {
                debug!("Loaded xref {}", path.display());
                self.loaded.push(path.clone());
                Resolution::Loaded(drawing)
            }
            Err(e) => {
                let err = ArgusError::reference_unreachable(e.summary(), path.clone());
                self.skip(target.label(), e.user_message(), err)
            }
        }
    }

    fn skip(&mut self, path: String, reason: String, err: ArgusError) -> Resolution {
        warn!("Skipping xref {path}: {reason}");
        self.skipped.push(SkippedReference { path, reason });
        Resolution::Unreachable(err)
    }

    pub fn is_visited(&self, path: &Path) -> bool {
        self.visited.contains(path)
    }

    /// Xref documents opened successfully, in load order
    pub fn loaded(&self) -> &[PathBuf] {
        &self.loaded
    }

    pub fn skipped(&self) -> &[SkippedReference] {
        &self.skipped
    }

    pub fn into_outcome(self) -> (Vec<PathBuf>, Vec<SkippedReference>) {
        (self.loaded, self.skipped)
    }
}
