//! Xref path support
//!
//! Xref paths are stored as written by whatever machine saved the drawing:
//! Windows separators, drive letters, or paths relative to the referencing
//! drawing's folder. They are all normalised to forward slashes first.

use std::fmt;
use std::path::{Component, Path, PathBuf};

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct XrefPath(String);

impl XrefPath {
    pub fn new<S: AsRef<str>>(path: S) -> Self {
        // Normalize: always use forward slashes
        let trimmed = path.as_ref().trim().trim_matches('"');
        XrefPath(trimmed.replace('\\', "/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has_drive_prefix(&self) -> bool {
        has_drive_prefix(&self.0)
    }

    pub fn is_absolute(&self) -> bool {
        self.0.starts_with('/') || self.has_drive_prefix()
    }

    /// Resolve against the directory of the drawing that holds the reference
    pub fn absolute(&self, referencing_dir: &Path) -> PathBuf {
        if self.is_absolute() {
            PathBuf::from(&self.0)
        } else {
            referencing_dir.join(&self.0)
        }
    }

    /// The identity used to decide whether two references name the same file
    pub fn resolve(&self, referencing_dir: &Path) -> PathBuf {
        normalize_path(&self.absolute(referencing_dir))
    }
}

impl fmt::Display for XrefPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for XrefPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "XrefPath({:?})", self.0)
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
}

pub fn make_absolute(path: &Path) -> PathBuf {
    if path.is_absolute() || path.to_str().is_some_and(has_drive_prefix) {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Canonical path of an existing file, or a lexically normalised absolute path
pub fn normalize_path(path: &Path) -> PathBuf {
    match std::fs::canonicalize(path) {
        Ok(canonical) => canonical,
        Err(_) => normalize_lexically(&make_absolute(path)),
    }
}

/// Remove `.` and resolve `..` components without touching the file system
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators_are_normalized() {
        let path = XrefPath::new(r"..\xrefs\pumps.dxf");
        assert_eq!(path.as_str(), "../xrefs/pumps.dxf");
        assert!(!path.is_absolute());
    }

    #[test]
    fn test_absolute_forms() {
        assert!(XrefPath::new("/plant/pumps.dxf").is_absolute());
        assert!(XrefPath::new(r"C:\plant\pumps.dxf").is_absolute());
        assert!(XrefPath::new(r"\\server\share\pumps.dxf").is_absolute());
        assert!(!XrefPath::new("pumps.dxf").is_absolute());
    }

    #[test]
    fn test_quotes_and_padding_are_stripped() {
        assert_eq!(XrefPath::new(" \"pumps.dxf\" ").as_str(), "pumps.dxf");
        assert!(XrefPath::new("   ").is_empty());
    }

    #[test]
    fn test_lexical_normalization() {
        assert_eq!(
            normalize_lexically(Path::new("/plant/area1/../xrefs/./pumps.dxf")),
            PathBuf::from("/plant/xrefs/pumps.dxf")
        );
        assert_eq!(
            normalize_lexically(Path::new("/../pumps.dxf")),
            PathBuf::from("/pumps.dxf")
        );
        assert_eq!(
            normalize_lexically(Path::new("../pumps.dxf")),
            PathBuf::from("../pumps.dxf")
        );
    }

    #[test]
    fn test_resolve_relative_to_referencing_drawing() {
        let path = XrefPath::new(r"..\xrefs\pumps.dxf");
        assert_eq!(
            path.resolve(Path::new("/nonexistent-plant/area1")),
            PathBuf::from("/nonexistent-plant/xrefs/pumps.dxf")
        );
    }

    #[test]
    fn test_drive_paths_are_not_joined() {
        let path = XrefPath::new(r"C:\plant\pumps.dxf");
        assert_eq!(
            path.absolute(Path::new("/elsewhere")),
            PathBuf::from("C:/plant/pumps.dxf")
        );
        assert_eq!(make_absolute(Path::new("C:/plant")), PathBuf::from("C:/plant"));
    }
}
