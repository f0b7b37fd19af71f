//! ASCII DXF section reader
//!
//! Only the parts of a DXF file that describe block structure are read:
//! the HEADER variable `$ACADVER`, BLOCK definitions and the
//! INSERT entities (with their trailing ATTRIBs) found inside blocks and in
//! the ENTITIES section. Every other entity and section is skipped.

use crate::groups::{Group, GroupReader};
use crate::header::DrawingHeader;
use crate::model::{
    AttributeEntry, Definition, DefinitionFlags, DefinitionId, Drawing, DrawingBuilder, Instance,
    PAPER_SPACE_NAME,
};
use crate::placement::Placement;
use argus_error::{ArgusError, Result};
use glam::DVec3;
use log::{debug, trace};
use std::path::Path;

/// An INSERT read from an entity list, with the space it belongs to
struct ParsedInsert {
    instance: Instance,
    in_paper_space: bool,
}

pub struct DxfReader<'a> {
    groups: GroupReader<'a>,
    builder: DrawingBuilder,
}

impl<'a> DxfReader<'a> {
    /// Parse DXF text into a drawing that remembers `path` as its origin
    pub fn parse(text: &'a str, path: &Path) -> Result<Drawing> {
        let mut reader = DxfReader {
            groups: GroupReader::new(text),
            builder: DrawingBuilder::new(path),
        };
        reader.read_sections()?;
        let drawing = reader.builder.build();
        debug!(
            "Read {} definitions from {}",
            drawing.definitions_len(),
            path.display()
        );
        Ok(drawing)
    }

    fn read_sections(&mut self) -> Result<()> {
        while let Some(group) = self.groups.next_group()? {
            if group.is_marker("EOF") {
                break;
            }
            if !group.is_marker("SECTION") {
                trace!("Skipping stray group {} at line {}", group.code, group.line);
                continue;
            }
            let name = match self.groups.next_group()? {
                Some(g) if g.code == 2 => g.value.to_ascii_uppercase(),
                Some(g) => {
                    return Err(ArgusError::drawing_at_line(
                        "SECTION without a name",
                        g.line,
                    ))
                }
                None => {
                    return Err(ArgusError::drawing_at_line(
                        "Truncated file inside SECTION",
                        self.groups.line(),
                    ))
                }
            };
            match name.as_str() {
                "HEADER" => self.read_header()?,
                "BLOCKS" => self.read_blocks()?,
                "ENTITIES" => self.read_entities()?,
                _ => self.skip_section()?,
            }
        }
        Ok(())
    }

    fn skip_section(&mut self) -> Result<()> {
        while let Some(group) = self.groups.next_group()? {
            if group.is_marker("ENDSEC") {
                return Ok(());
            }
        }
        Err(self.truncated("section"))
    }

    fn read_header(&mut self) -> Result<()> {
        let mut header = DrawingHeader::default();
        let mut variable = String::new();
        while let Some(group) = self.groups.next_group()? {
            match group.code {
                0 if group.is_marker("ENDSEC") => {
                    self.builder.set_header(header);
                    return Ok(());
                }
                9 => variable = group.value.to_ascii_uppercase(),
                1 if variable == "$ACADVER" => header.version = Some(group.value.to_string()),
                _ => {}
            }
        }
        Err(self.truncated("HEADER section"))
    }

    fn read_blocks(&mut self) -> Result<()> {
        while let Some(group) = self.groups.next_group()? {
            if group.is_marker("ENDSEC") {
                return Ok(());
            }
            if group.is_marker("BLOCK") {
                self.read_block(group.line)?;
            } else {
                self.groups.read_body()?;
            }
        }
        Err(self.truncated("BLOCKS section"))
    }

    fn read_block(&mut self, line: usize) -> Result<()> {
        let body = self.groups.read_body()?;
        let mut name: Option<&str> = None;
        let mut flags = DefinitionFlags::empty();
        let mut base_point = DVec3::ZERO;
        let mut source_path: Option<String> = None;
        for group in &body {
            match group.code {
                2 => name = Some(group.value),
                3 if name.is_none() => name = Some(group.value),
                1 if !group.value.is_empty() => source_path = Some(group.value.to_string()),
                70 => flags = DefinitionFlags::from_bits(group.as_i64()? as u16),
                10 => base_point.x = group.as_f64()?,
                20 => base_point.y = group.as_f64()?,
                30 => base_point.z = group.as_f64()?,
                _ => {}
            }
        }
        let name = name.ok_or_else(|| ArgusError::drawing_at_line("BLOCK without a name", line))?;
        let mut definition = Definition::new(name)
            .with_flags(flags)
            .with_base_point(base_point);
        if definition.is_external_reference() {
            definition.source_path = source_path;
        }
        trace!("BLOCK '{}' flags={}", definition.name, flags.bits());
        let id = self.builder.add_definition(definition);

        loop {
            let Some(group) = self.groups.next_group()? else {
                return Err(self.truncated("BLOCK"));
            };
            if group.is_marker("ENDBLK") {
                self.groups.read_body()?;
                return Ok(());
            }
            if group.is_marker("ENDSEC") {
                return Err(ArgusError::drawing_at_line(
                    format!("BLOCK '{name}' is missing ENDBLK"),
                    group.line,
                ));
            }
            if let Some(parsed) = self.read_entity(group)? {
                self.builder.push_instance(id, parsed.instance);
            }
        }
    }

    fn read_entities(&mut self) -> Result<()> {
        let model_space = self.builder.model_space();
        let mut paper_space: Option<DefinitionId> = None;
        while let Some(group) = self.groups.next_group()? {
            if group.is_marker("ENDSEC") {
                return Ok(());
            }
            if let Some(parsed) = self.read_entity(group)? {
                let parent = if parsed.in_paper_space {
                    *paper_space.get_or_insert_with(|| self.builder.definition_id(PAPER_SPACE_NAME))
                } else {
                    model_space
                };
                self.builder.push_instance(parent, parsed.instance);
            }
        }
        Err(self.truncated("ENTITIES section"))
    }

    /// Read one entity whose code 0 marker has just been consumed
    fn read_entity(&mut self, marker: Group<'a>) -> Result<Option<ParsedInsert>> {
        if marker.code != 0 {
            return Err(ArgusError::drawing_at_line(
                format!("Expected entity start, found group {}", marker.code),
                marker.line,
            ));
        }
        let body = self.groups.read_body()?;
        if !marker.is_marker("INSERT") {
            return Ok(None);
        }
        let parsed = Self::parse_insert(&body, marker.line)?;
        let mut instance = parsed.instance;
        // Attributes follow the INSERT as separate entities up to SEQEND
        while let Some(next) = self.groups.peek()? {
            if next.is_marker("ATTRIB") {
                self.groups.next_group()?;
                let attrib = self.groups.read_body()?;
                if let Some(entry) = Self::parse_attrib(&attrib) {
                    instance.attributes.push(entry);
                }
            } else if next.is_marker("SEQEND") {
                self.groups.next_group()?;
                self.groups.read_body()?;
                break;
            } else {
                break;
            }
        }
        Ok(Some(ParsedInsert {
            instance,
            in_paper_space: parsed.in_paper_space,
        }))
    }

    fn parse_insert(body: &[Group<'a>], line: usize) -> Result<ParsedInsert> {
        let mut name: Option<&str> = None;
        let mut layer = "0";
        let mut placement = Placement::default();
        let mut in_paper_space = false;
        for group in body {
            match group.code {
                2 => name = Some(group.value),
                8 => layer = group.value,
                10 => placement.insertion.x = group.as_f64()?,
                20 => placement.insertion.y = group.as_f64()?,
                30 => placement.insertion.z = group.as_f64()?,
                41 => placement.scale.x = group.as_f64()?,
                42 => placement.scale.y = group.as_f64()?,
                43 => placement.scale.z = group.as_f64()?,
                50 => placement.rotation = group.as_f64()?,
                67 => in_paper_space = group.as_i64()? == 1,
                210 => placement.extrusion.x = group.as_f64()?,
                220 => placement.extrusion.y = group.as_f64()?,
                230 => placement.extrusion.z = group.as_f64()?,
                _ => {}
            }
        }
        let name =
            name.ok_or_else(|| ArgusError::drawing_at_line("INSERT without a block name", line))?;
        Ok(ParsedInsert {
            instance: Instance::new(name)
                .with_placement(placement)
                .on_layer(layer),
            in_paper_space,
        })
    }

    fn parse_attrib(body: &[Group<'a>]) -> Option<AttributeEntry> {
        let mut tag: Option<&str> = None;
        let mut value = "";
        for group in body {
            match group.code {
                2 => tag = Some(group.value),
                1 => value = group.value,
                _ => {}
            }
        }
        tag.filter(|t| !t.is_empty()).map(|tag| AttributeEntry {
            tag: tag.to_string(),
            value: value.to_string(),
        })
    }

    fn truncated(&self, context: &str) -> ArgusError {
        ArgusError::drawing_at_line(
            format!("Unexpected end of file inside {context}"),
            self.groups.line(),
        )
    }
}
