use crate::execution_failed_error;
use crate::util::{colorize_count, colorize_name, colorize_xref, format_position, CommandContext};
use argus_error::ArgusError;
use argus_parser::{DefinitionId, Drawing};
use argus_tracer::transform::{compose, enter_definition, world_position};
use glam::DAffine3;
use std::collections::HashSet;
use std::path::PathBuf;
use text_trees::{FormatCharacters, StringTreeNode, TreeFormatting};

pub fn cmd_blocks(
    file_path: PathBuf,
    tree: bool,
    ascii: bool,
    ctx: &CommandContext,
) -> Result<(), ArgusError> {
    let drawing = ctx.load_drawing(&file_path)?;
    let release = drawing.header().release_name().unwrap_or("unknown release");

    if tree {
        ctx.output.print_info_fmt(format_args!(
            "Model space of {} ({release}):",
            file_path.display()
        ));
        let root = build_block_tree(&drawing);
        let format_chars = if ascii {
            FormatCharacters::ascii()
        } else {
            FormatCharacters::box_chars()
        };
        let formatting = TreeFormatting::dir_tree(format_chars);
        let output = root
            .to_string_with_format(&formatting)
            .map_err(|e| execution_failed_error(format!("Error formatting tree: {e}")))?;
        ctx.output.print_result(output.trim_end());
        return Ok(());
    }

    ctx.output.print_info_fmt(format_args!(
        "Blocks in {} ({release}):",
        file_path.display()
    ));
    let counts = drawing.instance_counts();
    for (id, def) in drawing.definitions() {
        if def.is_top_level_space() {
            continue;
        }
        let count = counts.get(&id).copied().unwrap_or(0);
        let mut line = format!(
            "  {} (instances: {})",
            colorize_name(&def.name),
            colorize_count(count)
        );
        if def.is_external_reference() {
            let path = def.source_path.as_deref().unwrap_or("no path");
            line.push_str(&format!(" [xref: {}]", colorize_xref(path)));
        }
        if def.is_anonymous_or_synthetic() {
            line.push_str(" [anonymous]");
        }
        ctx.output.print_result(&line);
    }
    Ok(())
}

/// Nesting tree of model space with world insertion points.
///
/// Xrefs are shown as leaves since only this drawing is opened.
pub fn build_block_tree(drawing: &Drawing) -> StringTreeNode {
    let mut active = HashSet::new();
    let children = tree_children(drawing, drawing.model_space(), DAffine3::IDENTITY, &mut active);
    StringTreeNode::with_child_nodes(drawing.top_level_space().name.clone(), children.into_iter())
}

fn tree_children(
    drawing: &Drawing,
    id: DefinitionId,
    frame: DAffine3,
    active: &mut HashSet<DefinitionId>,
) -> Vec<StringTreeNode> {
    active.insert(id);
    let mut nodes = Vec::new();
    for instance in drawing.children(id) {
        let Some(child_id) = drawing.resolve_definition(instance) else {
            nodes.push(StringTreeNode::new(format!(
                "{} [undefined]",
                instance.definition_name
            )));
            continue;
        };
        let child = drawing.definition(child_id);
        if child.is_top_level_space() || child.is_anonymous_or_synthetic() {
            continue;
        }
        let combined = compose(frame, instance.local_transform());
        let label = format!(
            "{} @ {} [{}]",
            colorize_name(&child.name),
            format_position(world_position(combined)),
            instance.layer
        );
        if child.is_external_reference() {
            let path = child.source_path.as_deref().unwrap_or("no path");
            nodes.push(StringTreeNode::new(format!(
                "{label} xref: {}",
                colorize_xref(path)
            )));
        } else if active.contains(&child_id) {
            nodes.push(StringTreeNode::new(format!("{label} (cycle)")));
        } else {
            let grandchildren = tree_children(
                drawing,
                child_id,
                enter_definition(combined, child.base_point),
                active,
            );
            nodes.push(StringTreeNode::with_child_nodes(
                label,
                grandchildren.into_iter(),
            ));
        }
    }
    active.remove(&id);
    nodes
}
