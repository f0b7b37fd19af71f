//! Conversion helpers for errors raised at crate boundaries
//!
//! File system failures mean different things depending on what was being
//! opened: a missing drawing is a drawing error, a missing output directory
//! is an output error. These helpers attach the path and pick the kind.

use crate::{ArgusError, DrawingErrorKind, OutputErrorKind};
use std::io::ErrorKind;
use std::path::Path;

/// Convert an I/O error raised while opening or reading a drawing
pub fn drawing_io_error(err: &std::io::Error, path: &Path) -> ArgusError {
    let kind = match err.kind() {
        ErrorKind::NotFound => DrawingErrorKind::NotFound,
        ErrorKind::InvalidData | ErrorKind::UnexpectedEof => DrawingErrorKind::InvalidFormat,
        _ => DrawingErrorKind::Unreadable,
    };
    ArgusError::drawing(err.to_string(), kind).with_file_path(path)
}

/// Convert an I/O error raised while preparing or writing the output
pub fn output_io_error(err: &std::io::Error, path: &Path, kind: OutputErrorKind) -> ArgusError {
    ArgusError::output(err.to_string(), kind).with_file_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_drawing_maps_to_not_found() {
        let io = std::io::Error::new(ErrorKind::NotFound, "gone");
        let err = drawing_io_error(&io, Path::new("/plant/root.dxf"));
        assert_eq!(err.drawing_kind(), Some(DrawingErrorKind::NotFound));
        assert_eq!(
            err.file_path().map(|p| p.as_path()),
            Some(Path::new("/plant/root.dxf"))
        );
    }

    #[test]
    fn test_permission_denied_maps_to_unreadable() {
        let io = std::io::Error::new(ErrorKind::PermissionDenied, "denied");
        let err = drawing_io_error(&io, Path::new("/plant/locked.dxf"));
        assert_eq!(err.drawing_kind(), Some(DrawingErrorKind::Unreadable));
    }

    #[test]
    fn test_output_io_error() {
        let io = std::io::Error::new(ErrorKind::PermissionDenied, "read-only");
        let err = output_io_error(
            &io,
            Path::new("/out"),
            OutputErrorKind::DestinationUnavailable,
        );
        assert_eq!(
            err.output_kind(),
            Some(OutputErrorKind::DestinationUnavailable)
        );
    }
}
