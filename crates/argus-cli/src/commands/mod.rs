pub mod blocks;
pub mod export;

// Re-export command functions for main.rs
pub use blocks::cmd_blocks;
pub use export::{cmd_export, ExportArgs};
