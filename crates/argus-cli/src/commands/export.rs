use crate::util::{colorize_count, colorize_xref, CommandContext};
use argus_error::ArgusError;
use argus_tracer::{export, ExtractOptions, ExtractionReport, NameFilter, OutputFormat};
use log::info;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ExportArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub filters: Vec<String>,
    pub format: OutputFormat,
    pub include_paper_space: bool,
    pub max_depth: Option<usize>,
}

impl ExportArgs {
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            filters: NameFilter::compile(&self.filters),
            include_paper_space: self.include_paper_space,
            max_depth: self.max_depth,
        }
    }
}

pub fn cmd_export(args: ExportArgs, ctx: &CommandContext) -> Result<ExtractionReport, ArgusError> {
    info!(
        "Exporting {} to {} ({:?})",
        args.input.display(),
        args.output.display(),
        args.format
    );
    let report = export(
        &ctx.source,
        &args.input,
        &args.output,
        args.extract_options(),
        args.format,
    )?;

    ctx.output.print_info_fmt(format_args!(
        "Exported {} block instance(s) to {}",
        colorize_count(report.records.len()),
        args.output.display()
    ));
    for path in &report.references_loaded {
        ctx.output
            .print_info_fmt(format_args!("  xref: {}", colorize_xref(&path.to_string_lossy())));
    }
    for skipped in &report.references_skipped {
        ctx.output.print_info_fmt(format_args!(
            "  skipped xref: {} ({})",
            colorize_xref(&skipped.path),
            skipped.reason
        ));
    }
    Ok(report)
}
