// Utility functions for CLI

use argus_error::ArgusError;
use argus_parser::{Drawing, DrawingSource, DxfSource, ReadOptions};
use owo_colors::OwoColorize;
use std::path::Path;

/// Command execution context containing common parameters
pub struct CommandContext<'a> {
    pub source: DxfSource,
    pub output: &'a OutputHandler,
}

impl<'a> CommandContext<'a> {
    pub fn new(options: ReadOptions, output: &'a OutputHandler) -> Self {
        Self {
            source: DxfSource::new(options),
            output,
        }
    }

    pub fn load_drawing(&self, path: &Path) -> Result<Drawing, ArgusError> {
        self.source.open(path)
    }
}

pub fn create_read_options(mmap_threshold_mb: u64) -> ReadOptions {
    ReadOptions {
        mmap_threshold_bytes: mmap_threshold_mb.saturating_mul(1024 * 1024),
    }
}

/// Output handler that respects quiet mode
pub struct OutputHandler {
    quiet: bool,
}

impl OutputHandler {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Print explanatory text (suppressed in quiet mode)
    pub fn print_info_fmt(&self, args: std::fmt::Arguments) {
        if !self.quiet {
            println!("{args}");
        }
    }

    /// Print raw results (always shown)
    pub fn print_result(&self, text: &str) {
        println!("{text}");
    }
}

// Colorization helpers
pub fn should_use_colors() -> bool {
    isatty::stdout_isatty()
}

pub fn should_use_colors_stderr() -> bool {
    isatty::stderr_isatty()
}

pub fn colorize_name(name: &str) -> String {
    if should_use_colors() {
        name.yellow().to_string()
    } else {
        name.to_string()
    }
}

pub fn colorize_xref(path: &str) -> String {
    if should_use_colors() {
        path.cyan().to_string()
    } else {
        path.to_string()
    }
}

pub fn colorize_count(count: usize) -> String {
    if should_use_colors() {
        count.to_string().green().to_string()
    } else {
        count.to_string()
    }
}

/// `(x, y, z)`
pub fn format_position(position: [f64; 3]) -> String {
    let [x, y, z] = position;
    format!("({x}, {y}, {z})")
}
