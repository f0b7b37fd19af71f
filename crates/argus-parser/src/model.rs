use crate::header::DrawingHeader;
use crate::placement::Placement;
use glam::{DAffine3, DVec3};
use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name prefix the document engine reserves for its own definitions
/// (`*Model_Space`, `*Paper_Space0`, anonymous `*U12` blocks, dimensions `*D3`)
pub const INTERNAL_NAME_MARKER: char = '*';
pub const MODEL_SPACE_NAME: &str = "*Model_Space";
pub const PAPER_SPACE_NAME: &str = "*Paper_Space";

/// Index of a definition inside its drawing's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefinitionId(usize);

impl DefinitionId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    ModelSpace,
    /// A layout's paper space
    PaperSpace,
    Block,
}

impl DefinitionKind {
    fn from_name(name: &str) -> Self {
        let upper = name.to_ascii_uppercase();
        if upper == MODEL_SPACE_NAME.to_ascii_uppercase() {
            DefinitionKind::ModelSpace
        } else if upper.starts_with(&PAPER_SPACE_NAME.to_ascii_uppercase()) {
            DefinitionKind::PaperSpace
        } else {
            DefinitionKind::Block
        }
    }
}

/// Block-type flags as stored in BLOCK group code 70
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct DefinitionFlags(u16);

impl DefinitionFlags {
    pub const ANONYMOUS: Self = Self(1);
    pub const NON_CONSTANT_ATTRIBUTES: Self = Self(2);
    pub const XREF: Self = Self(4);
    pub const XREF_OVERLAY: Self = Self(8);
    pub const EXTERNALLY_DEPENDENT: Self = Self(16);
    pub const RESOLVED_XREF: Self = Self(32);
    pub const REFERENCED: Self = Self(64);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl std::ops::BitOr for DefinitionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// One tag/value pair attached to an instance, exactly as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeEntry {
    pub tag: String,
    pub value: String,
}

/// A named template of child instances
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: String,
    pub kind: DefinitionKind,
    pub flags: DefinitionFlags,
    pub base_point: DVec3,
    /// Path of the referenced drawing, present only for external references
    pub source_path: Option<String>,
    pub instances: Vec<Instance>,
}

impl Definition {
    pub fn new<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        Self {
            kind: DefinitionKind::from_name(&name),
            name,
            flags: DefinitionFlags::empty(),
            base_point: DVec3::ZERO,
            source_path: None,
            instances: Vec::new(),
        }
    }

    /// An external reference definition backed by the drawing at `path`
    pub fn xref<S: Into<String>, P: Into<String>>(name: S, path: P) -> Self {
        Self::new(name)
            .with_flags(DefinitionFlags::XREF | DefinitionFlags::RESOLVED_XREF)
            .with_source_path(path)
    }

    pub fn with_flags(mut self, flags: DefinitionFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_base_point(mut self, base_point: DVec3) -> Self {
        self.base_point = base_point;
        self
    }

    pub fn with_source_path<P: Into<String>>(mut self, path: P) -> Self {
        self.source_path = Some(path.into());
        self
    }

    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.instances.push(instance);
        self
    }

    /// Model space or a layout's paper space
    pub fn is_top_level_space(&self) -> bool {
        matches!(
            self.kind,
            DefinitionKind::ModelSpace | DefinitionKind::PaperSpace
        )
    }

    /// Anonymous blocks and engine-internal definitions, never user content
    pub fn is_anonymous_or_synthetic(&self) -> bool {
        self.flags.contains(DefinitionFlags::ANONYMOUS)
            || self.name.starts_with(INTERNAL_NAME_MARKER)
    }

    pub fn is_external_reference(&self) -> bool {
        self.flags
            .intersects(DefinitionFlags::XREF | DefinitionFlags::XREF_OVERLAY)
    }
}

/// A placement of a definition inside a parent definition
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Name of the placed definition; resolved through [`Drawing::resolve_definition`]
    pub definition_name: String,
    pub placement: Placement,
    pub layer: String,
    pub attributes: Vec<AttributeEntry>,
}

impl Instance {
    pub fn new<S: Into<String>>(definition_name: S) -> Self {
        Self {
            definition_name: definition_name.into(),
            placement: Placement::default(),
            layer: "0".to_string(),
            attributes: Vec::new(),
        }
    }

    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.placement.insertion = DVec3::new(x, y, z);
        self
    }

    pub fn scaled(mut self, x: f64, y: f64, z: f64) -> Self {
        self.placement.scale = DVec3::new(x, y, z);
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.placement.rotation = degrees;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn on_layer<S: Into<String>>(mut self, layer: S) -> Self {
        self.layer = layer.into();
        self
    }

    pub fn with_attribute<T: Into<String>, V: Into<String>>(mut self, tag: T, value: V) -> Self {
        self.attributes.push(AttributeEntry {
            tag: tag.into(),
            value: value.into(),
        });
        self
    }

    pub fn local_transform(&self) -> DAffine3 {
        self.placement.local_transform()
    }
}

/// One drawing's definitions, opened read-only
#[derive(Debug, Clone)]
pub struct Drawing {
    path: PathBuf,
    header: DrawingHeader,
    definitions: Vec<Definition>,
    /// Uppercased definition name -> id; block names are case-insensitive
    names: HashMap<String, DefinitionId>,
    model_space: DefinitionId,
}

impl Drawing {
    /// Path the drawing was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &DrawingHeader {
        &self.header
    }

    pub fn model_space(&self) -> DefinitionId {
        self.model_space
    }

    pub fn top_level_space(&self) -> &Definition {
        self.definition(self.model_space)
    }

    pub fn definition(&self, id: DefinitionId) -> &Definition {
        &self.definitions[id.0]
    }

    pub fn definitions(&self) -> impl Iterator<Item = (DefinitionId, &Definition)> {
        self.definitions
            .iter()
            .enumerate()
            .map(|(i, def)| (DefinitionId(i), def))
    }

    pub fn definitions_len(&self) -> usize {
        self.definitions.len()
    }

    /// Paper space layouts in definition order
    pub fn layouts(&self) -> Vec<DefinitionId> {
        self.definitions()
            .filter(|(_, def)| def.kind == DefinitionKind::PaperSpace)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn find_definition(&self, name: &str) -> Option<DefinitionId> {
        self.names.get(&name.to_ascii_uppercase()).copied()
    }

    /// Child instances of a definition in stored order
    pub fn children(&self, id: DefinitionId) -> &[Instance] {
        &self.definition(id).instances
    }

    pub fn resolve_definition(&self, instance: &Instance) -> Option<DefinitionId> {
        self.find_definition(&instance.definition_name)
    }

    /// Number of instances of each definition across the whole drawing
    pub fn instance_counts(&self) -> HashMap<DefinitionId, usize> {
        let mut counts = HashMap::new();
        for def in &self.definitions {
            for instance in &def.instances {
                if let Some(id) = self.resolve_definition(instance) {
                    *counts.entry(id).or_insert(0) += 1;
                }
            }
        }
        counts
    }
}

/// Incrementally assembles a [`Drawing`]
///
/// The model space always exists, so instances can be added to it before the
/// reader reaches its BLOCK record (or when the file has none, as in R12).
#[derive(Debug)]
pub struct DrawingBuilder {
    path: PathBuf,
    header: DrawingHeader,
    definitions: Vec<Definition>,
    names: HashMap<String, DefinitionId>,
}

impl DrawingBuilder {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let mut builder = Self {
            path: path.into(),
            header: DrawingHeader::default(),
            definitions: Vec::new(),
            names: HashMap::new(),
        };
        builder.add_definition(Definition::new(MODEL_SPACE_NAME));
        builder
    }

    pub fn header(mut self, header: DrawingHeader) -> Self {
        self.header = header;
        self
    }

    pub fn set_header(&mut self, header: DrawingHeader) {
        self.header = header;
    }

    pub fn model_space(&self) -> DefinitionId {
        // Created first in `new`
        DefinitionId(0)
    }

    /// Add a definition, or merge it into an existing one of the same name.
    ///
    /// On merge the incoming name, flags, base point and source path replace
    /// the stored ones and its instances are appended after the existing ones.
    pub fn add_definition(&mut self, definition: Definition) -> DefinitionId {
        let key = definition.name.to_ascii_uppercase();
        if let Some(&id) = self.names.get(&key) {
            debug!("Merging repeated definition '{}'", definition.name);
            let existing = &mut self.definitions[id.0];
            existing.name = definition.name;
            existing.kind = definition.kind;
            existing.flags = definition.flags;
            existing.base_point = definition.base_point;
            if definition.source_path.is_some() {
                existing.source_path = definition.source_path;
            }
            existing.instances.extend(definition.instances);
            return id;
        }
        let id = DefinitionId(self.definitions.len());
        self.names.insert(key, id);
        self.definitions.push(definition);
        id
    }

    /// Id of the named definition, creating an empty block if it does not exist yet
    pub fn definition_id(&mut self, name: &str) -> DefinitionId {
        match self.names.get(&name.to_ascii_uppercase()) {
            Some(&id) => id,
            None => self.add_definition(Definition::new(name)),
        }
    }

    pub fn push_instance(&mut self, parent: DefinitionId, instance: Instance) {
        self.definitions[parent.0].instances.push(instance);
    }

    /// Convenience for building drawings in code: add an instance to model space
    pub fn insert(&mut self, instance: Instance) -> &mut Self {
        let ms = self.model_space();
        self.push_instance(ms, instance);
        self
    }

    pub fn build(self) -> Drawing {
        Drawing {
            path: self.path,
            header: self.header,
            definitions: self.definitions,
            names: self.names,
            model_space: DefinitionId(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_name() {
        assert_eq!(
            Definition::new("*MODEL_SPACE").kind,
            DefinitionKind::ModelSpace
        );
        assert_eq!(
            Definition::new("*Paper_Space0").kind,
            DefinitionKind::PaperSpace
        );
        assert_eq!(Definition::new("VALVE").kind, DefinitionKind::Block);
    }

    #[test]
    fn test_synthetic_and_top_level() {
        assert!(Definition::new("*U12").is_anonymous_or_synthetic());
        assert!(Definition::new("X")
            .with_flags(DefinitionFlags::ANONYMOUS)
            .is_anonymous_or_synthetic());
        assert!(!Definition::new("VALVE").is_anonymous_or_synthetic());
        assert!(Definition::new(MODEL_SPACE_NAME).is_top_level_space());
        assert!(!Definition::new("VALVE").is_top_level_space());
    }

    #[test]
    fn test_xref_flag_detection() {
        assert!(Definition::xref("PUMPS", "pumps.dxf").is_external_reference());
        assert!(Definition::new("OVERLAY")
            .with_flags(DefinitionFlags::XREF_OVERLAY)
            .is_external_reference());
        assert!(!Definition::new("VALVE")
            .with_flags(DefinitionFlags::EXTERNALLY_DEPENDENT)
            .is_external_reference());
    }

    #[test]
    fn test_builder_merges_by_case_insensitive_name() {
        let mut builder = DrawingBuilder::new("/plant/root.dxf");
        let a = builder.add_definition(Definition::new("valve").with_instance(Instance::new("BOLT")));
        let b = builder.add_definition(
            Definition::new("VALVE")
                .with_base_point(DVec3::new(1.0, 0.0, 0.0))
                .with_instance(Instance::new("NUT")),
        );
        assert_eq!(a, b);
        let drawing = builder.build();
        let def = drawing.definition(a);
        assert_eq!(def.instances.len(), 2);
        assert_eq!(def.base_point, DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(drawing.find_definition("Valve"), Some(a));
    }

    #[test]
    fn test_model_space_always_present() {
        let drawing = DrawingBuilder::new("/plant/empty.dxf").build();
        assert!(drawing.top_level_space().is_top_level_space());
        assert!(drawing.children(drawing.model_space()).is_empty());
        assert_eq!(drawing.definitions_len(), 1);
    }

    #[test]
    fn test_instance_counts_skip_unresolved() {
        let mut builder = DrawingBuilder::new("/plant/root.dxf");
        let valve = builder.add_definition(Definition::new("VALVE"));
        builder
            .insert(Instance::new("VALVE"))
            .insert(Instance::new("VALVE"))
            .insert(Instance::new("MISSING"));
        let drawing = builder.build();
        let counts = drawing.instance_counts();
        assert_eq!(counts.get(&valve), Some(&2));
        assert_eq!(counts.len(), 1);
    }
}
