//! # argus-error - Unified Error Handling
//!
//! One error type for every argus crate. Each variant carries the path of the
//! drawing or file it concerns so the CLI can report a useful message, and a
//! `kind` that places the failure in the extraction error taxonomy:
//!
//! - **FatalInput**: the root drawing cannot be opened or the output
//!   destination cannot be created. Aborts the run before traversal.
//! - **ReferenceUnreachable**: one external reference cannot be opened.
//!   Contained by the reference resolver; never reaches the caller.
//! - **MalformedFilter**: an unusable wildcard pattern. Dropped at compile time.
//! - **SerializationFailure**: writing the final output failed. Fatal.

use std::path::PathBuf;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod conversions;

/// The main unified error type for the argus toolkit
#[derive(Error, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArgusError {
    /// File system and I/O related errors
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        file_path: Option<PathBuf>,
        // Source error stored as text so the error stays cloneable
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        source_message: Option<String>,
    },

    /// Drawing document reading errors
    #[error("Drawing error: {message}")]
    Drawing {
        message: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        file_path: Option<PathBuf>,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        line: Option<usize>,
        kind: DrawingErrorKind,
    },

    /// Instance extraction errors
    #[error("Extraction error: {message}")]
    Extraction {
        message: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        file_path: Option<PathBuf>,
        kind: ExtractionErrorKind,
    },

    /// Result output errors
    #[error("Output error: {message}")]
    Output {
        message: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        file_path: Option<PathBuf>,
        kind: OutputErrorKind,
    },

    /// CLI and user interface errors
    #[error("CLI error: {message}")]
    Cli {
        message: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        command: Option<String>,
        kind: CliErrorKind,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        key: Option<String>,
        kind: ConfigErrorKind,
    },
}

/// Specific kinds of drawing errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DrawingErrorKind {
    #[error("Drawing not found")]
    NotFound,
    #[error("Drawing could not be read")]
    Unreadable,
    #[error("Invalid drawing data")]
    InvalidFormat,
    #[error("Drawing format not supported")]
    UnsupportedFormat,
}

/// Specific kinds of extraction errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExtractionErrorKind {
    #[error("Root drawing unavailable")]
    FatalInput,
    #[error("External reference unreachable")]
    ReferenceUnreachable,
    #[error("Malformed name filter")]
    MalformedFilter,
}

/// Specific kinds of output errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum OutputErrorKind {
    #[error("Output destination unavailable")]
    DestinationUnavailable,
    #[error("Serialization failed")]
    SerializationFailed,
    #[error("Write failed")]
    WriteFailed,
}

/// Specific kinds of CLI errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CliErrorKind {
    #[error("Invalid command arguments")]
    InvalidArguments,
    #[error("Missing required argument")]
    MissingArgument,
    #[error("Command execution failed")]
    ExecutionFailed,
}

/// Specific kinds of configuration errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConfigErrorKind {
    #[error("Missing required configuration")]
    MissingRequired,
    #[error("Invalid configuration value")]
    InvalidValue,
}

/// Convenient result type for argus operations
pub type Result<T> = std::result::Result<T, ArgusError>;

impl ArgusError {
    /// Create a new drawing error
    pub fn drawing<M: Into<String>>(message: M, kind: DrawingErrorKind) -> Self {
        Self::Drawing {
            message: message.into(),
            file_path: None,
            line: None,
            kind,
        }
    }

    /// Create a drawing format error pointing at a line of the source file
    pub fn drawing_at_line<M: Into<String>>(message: M, line: usize) -> Self {
        Self::Drawing {
            message: message.into(),
            file_path: None,
            line: Some(line),
            kind: DrawingErrorKind::InvalidFormat,
        }
    }

    /// Create a new extraction error
    pub fn extraction<M: Into<String>>(message: M, kind: ExtractionErrorKind) -> Self {
        Self::Extraction {
            message: message.into(),
            file_path: None,
            kind,
        }
    }

    /// Create a new output error
    pub fn output<M: Into<String>>(message: M, kind: OutputErrorKind) -> Self {
        Self::Output {
            message: message.into(),
            file_path: None,
            kind,
        }
    }

    /// Create a new CLI error
    pub fn cli<M: Into<String>>(message: M, kind: CliErrorKind) -> Self {
        Self::Cli {
            message: message.into(),
            command: None,
            kind,
        }
    }

    /// Create a new configuration error
    pub fn config<M: Into<String>, K: Into<String>>(
        message: M,
        key: K,
        kind: ConfigErrorKind,
    ) -> Self {
        Self::Config {
            message: message.into(),
            key: Some(key.into()),
            kind,
        }
    }

    // === Taxonomy helpers ===

    /// The root drawing could not be opened
    pub fn fatal_input<M: Into<String>, P: Into<PathBuf>>(message: M, path: P) -> Self {
        Self::extraction(message, ExtractionErrorKind::FatalInput).with_file_path(path)
    }

    /// An external reference could not be opened
    pub fn reference_unreachable<M: Into<String>, P: Into<PathBuf>>(message: M, path: P) -> Self {
        Self::extraction(message, ExtractionErrorKind::ReferenceUnreachable).with_file_path(path)
    }

    /// A filter pattern could not be used
    pub fn malformed_filter<M: Into<String>>(message: M) -> Self {
        Self::extraction(message, ExtractionErrorKind::MalformedFilter)
    }

    /// The output destination directory could not be created
    pub fn destination_unavailable<M: Into<String>, P: Into<PathBuf>>(message: M, path: P) -> Self {
        Self::output(message, OutputErrorKind::DestinationUnavailable).with_file_path(path)
    }

    /// Writing the final output failed
    pub fn serialization_failed<M: Into<String>, P: Into<PathBuf>>(message: M, path: P) -> Self {
        Self::output(message, OutputErrorKind::SerializationFailed).with_file_path(path)
    }

    /// Add file path context to an existing error
    pub fn with_file_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        let path = path.into();
        match &mut self {
            Self::Io { file_path, .. } => *file_path = Some(path),
            Self::Drawing { file_path, .. } => *file_path = Some(path),
            Self::Extraction { file_path, .. } => *file_path = Some(path),
            Self::Output { file_path, .. } => *file_path = Some(path),
            _ => {} // Other variants don't have file paths
        }
        self
    }

    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Get the drawing error kind, if this is a drawing error
    pub fn drawing_kind(&self) -> Option<DrawingErrorKind> {
        match self {
            Self::Drawing { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Get the extraction error kind, if this is an extraction error
    pub fn extraction_kind(&self) -> Option<ExtractionErrorKind> {
        match self {
            Self::Extraction { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Get the output error kind, if this is an output error
    pub fn output_kind(&self) -> Option<OutputErrorKind> {
        match self {
            Self::Output { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether this error aborts an extraction run when it reaches the top level.
    ///
    /// Unreachable references and malformed filters are contained below the
    /// engine; everything else is fatal once it propagates.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::Extraction {
                kind: ExtractionErrorKind::ReferenceUnreachable
                    | ExtractionErrorKind::MalformedFilter,
                ..
            }
        )
    }

    /// Get the file path associated with this error, if any
    pub fn file_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { file_path, .. } => file_path.as_ref(),
            Self::Drawing { file_path, .. } => file_path.as_ref(),
            Self::Extraction { file_path, .. } => file_path.as_ref(),
            Self::Output { file_path, .. } => file_path.as_ref(),
            _ => None,
        }
    }

    /// Get the source line associated with this error, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Drawing { line, .. } => *line,
            _ => None,
        }
    }

    /// Get a user-friendly error message suitable for CLI display
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                message, file_path, ..
            } => {
                if let Some(path) = file_path {
                    format!("File error in '{}': {}", path.display(), message)
                } else {
                    message.clone()
                }
            }
            Self::Drawing {
                message,
                file_path,
                line,
                ..
            } => {
                let mut msg = format!("Drawing error: {message}");
                if let Some(path) = file_path {
                    msg.push_str(&format!(" (file: {})", path.display()));
                }
                if let Some(line) = line {
                    msg.push_str(&format!(" (line: {line})"));
                }
                msg
            }
            Self::Extraction {
                message, file_path, ..
            } => {
                let mut msg = format!("Extraction failed: {message}");
                if let Some(path) = file_path {
                    msg.push_str(&format!(" (file: {})", path.display()));
                }
                msg
            }
            Self::Output {
                message, file_path, ..
            } => {
                if let Some(path) = file_path {
                    format!("Could not write '{}': {}", path.display(), message)
                } else {
                    format!("Output error: {message}")
                }
            }
            Self::Cli {
                message, command, ..
            } => {
                if let Some(cmd) = command {
                    format!("Command '{cmd}' failed: {message}")
                } else {
                    format!("CLI error: {message}")
                }
            }
            Self::Config { message, key, .. } => {
                if let Some(key) = key {
                    format!("Configuration error for '{key}': {message}")
                } else {
                    format!("Configuration error: {message}")
                }
            }
        }
    }

    /// Get a detailed error message with full context for debugging
    pub fn debug_message(&self) -> String {
        let mut msg = self.user_message();
        match self {
            Self::Io {
                source_message: Some(source),
                ..
            } => msg.push_str(&format!(" [Source: {source}]")),
            Self::Drawing { kind, .. } => msg.push_str(&format!(" [Kind: {kind}]")),
            Self::Extraction { kind, .. } => msg.push_str(&format!(" [Kind: {kind}]")),
            Self::Output { kind, .. } => msg.push_str(&format!(" [Kind: {kind}]")),
            Self::Cli { kind, .. } => msg.push_str(&format!(" [Kind: {kind}]")),
            Self::Config { kind, .. } => msg.push_str(&format!(" [Kind: {kind}]")),
            _ => {}
        }
        msg
    }

    /// Get a short error summary without context details
    pub fn summary(&self) -> String {
        match self {
            Self::Io { message, .. } => format!("I/O: {message}"),
            Self::Drawing { kind, .. } => format!("Drawing: {kind}"),
            Self::Extraction { kind, .. } => format!("Extract: {kind}"),
            Self::Output { kind, .. } => format!("Output: {kind}"),
            Self::Cli { kind, .. } => format!("CLI: {kind}"),
            Self::Config { kind, .. } => format!("Config: {kind}"),
        }
    }
}

impl From<std::io::Error> for ArgusError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            file_path: None,
            source_message: Some(format!("{:?}", err.kind())),
        }
    }
}
