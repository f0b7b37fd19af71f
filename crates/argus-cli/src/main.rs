mod commands;
mod util;

use argus_error::{ArgusError, CliErrorKind};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "argus", version, about = "Export block instances from DXF drawings")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Memory-map drawings at least this large (in MB)
    #[arg(long, global = true, default_value = "64")]
    mmap_threshold: u64,

    /// Enable verbose logging (can be used multiple times: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode: suppress explanatory output, show only raw results
    #[arg(short = 'q', long = "quiet", global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Indented JSON array of records
    Json,
    /// One `NAME @ (x,y,z)` line per record
    Flat,
}

impl From<OutputFormat> for argus_tracer::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => argus_tracer::OutputFormat::Json,
            OutputFormat::Flat => argus_tracer::OutputFormat::Flat,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract block instances, through nested blocks and xrefs, into a file
    Export {
        /// Root drawing to extract from
        #[arg(short, long, env = "ARGUS_IN_DWG")]
        input: Option<PathBuf>,
        /// Destination file, created along with missing directories
        #[arg(short, long, env = "ARGUS_OUT_JSON")]
        output: Option<PathBuf>,
        /// Block name wildcards, comma-separated or repeated (e.g. "VALVE*,PUMP-?")
        #[arg(short, long, env = "ARGUS_FILTER", value_delimiter = ',', action = clap::ArgAction::Append)]
        filter: Vec<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
        /// Also extract from paper space layouts
        #[arg(long)]
        paper_space: bool,
        /// Do not descend more than this many levels below model space
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// List the block definitions of one drawing
    Blocks {
        #[arg(index = 1)]
        file: PathBuf,
        /// Show the model space nesting tree instead of a flat list
        #[arg(long)]
        tree: bool,
        #[arg(
            long,
            help = "Use ASCII characters instead of Unicode box characters for tree output"
        )]
        ascii: bool,
    },
}

fn main() {
    if let Err(e) = run_main() {
        log::error!("{}", e.user_message());
        log::debug!("{}", e.debug_message());
        std::process::exit(1);
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => log::LevelFilter::Warn,  // Default: only warnings and errors
        1 => log::LevelFilter::Info,  // -v: info level
        2 => log::LevelFilter::Debug, // -vv: debug level
        _ => log::LevelFilter::Trace, // -vvv+: everything
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log_level)
        .parse_default_env()
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);
    if util::should_use_colors_stderr() {
        builder.format(|buf, record| {
            use std::io::Write;
            let level_style = match record.level() {
                log::Level::Error => "\x1b[31mERROR\x1b[0m", // Red
                log::Level::Warn => "\x1b[33mWARN\x1b[0m",   // Yellow
                log::Level::Info => "\x1b[32mINFO\x1b[0m",   // Green
                log::Level::Debug => "\x1b[36mDEBUG\x1b[0m", // Cyan
                log::Level::Trace => "\x1b[35mTRACE\x1b[0m", // Magenta
            };
            writeln!(buf, "[{}] {}", level_style, record.args())
        });
    }
    builder.init();
}

fn run_main() -> std::result::Result<(), ArgusError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let handler = util::OutputHandler::new(cli.quiet);
    let ctx = util::CommandContext::new(util::create_read_options(cli.mmap_threshold), &handler);

    match cli.command {
        Commands::Export {
            input,
            output,
            filter,
            format,
            paper_space,
            max_depth,
        } => {
            let input = input.ok_or_else(|| {
                missing_argument_error("No input drawing: pass --input or set ARGUS_IN_DWG")
            })?;
            let destination = output.ok_or_else(|| {
                missing_argument_error("No output file: pass --output or set ARGUS_OUT_JSON")
            })?;
            let args = commands::ExportArgs {
                input,
                output: destination,
                filters: filter,
                format: format.into(),
                include_paper_space: paper_space,
                max_depth,
            };
            commands::cmd_export(args, &ctx).map(|_| ())
        }
        Commands::Blocks { file, tree, ascii } => commands::cmd_blocks(file, tree, ascii, &ctx),
    }
}

/// Create a missing argument error
pub fn missing_argument_error<M: Into<String>>(message: M) -> ArgusError {
    ArgusError::cli(message.into(), CliErrorKind::MissingArgument)
}

/// Create an execution failed error
pub fn execution_failed_error<M: Into<String>>(message: M) -> ArgusError {
    ArgusError::cli(message.into(), CliErrorKind::ExecutionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_arguments() {
        let cli = Cli::try_parse_from([
            "argus",
            "export",
            "--input",
            "plant.dxf",
            "--output",
            "out/blocks.json",
            "--filter",
            "VALVE*,PUMP-?",
            "--filter",
            "TANK",
            "--format",
            "flat",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Export {
                input,
                output,
                filter,
                format,
                paper_space,
                ..
            } => {
                assert_eq!(input, Some(PathBuf::from("plant.dxf")));
                assert_eq!(output, Some(PathBuf::from("out/blocks.json")));
                assert_eq!(filter, ["VALVE*", "PUMP-?", "TANK"]);
                assert_eq!(format, OutputFormat::Flat);
                assert!(!paper_space);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_blocks_arguments() {
        let cli = Cli::try_parse_from(["argus", "blocks", "plant.dxf", "--tree"]).unwrap();
        assert_eq!(cli.mmap_threshold, 64);
        assert!(matches!(cli.command, Commands::Blocks { tree: true, .. }));
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["argus", "export", "--format", "xml"]).is_err());
    }
}
