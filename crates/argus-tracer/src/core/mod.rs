/// Core extraction functionality
pub mod extractor;
pub mod options;

pub use extractor::BlockExtractor;
pub use options::ExtractOptions;
