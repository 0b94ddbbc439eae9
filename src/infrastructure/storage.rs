use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::error::DiagnosticError;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Filesystem operations the diagnostic steps run against
pub trait Workspace {
    fn working_dir(&self) -> Result<PathBuf, DiagnosticError>;
    fn list_dir(&self, dir: &Path) -> Result<Vec<String>, DiagnosticError>;
    fn exists(&self, path: &Path) -> bool;
    fn size_mb(&self, path: &Path) -> Result<f64, DiagnosticError>;
}

/// The local filesystem. A rooted workspace reports `root` as its working
/// directory instead of the process one.
#[derive(Debug, Clone, Default)]
pub struct LocalWorkspace {
    root: Option<PathBuf>,
}

impl LocalWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rooted(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl Workspace for LocalWorkspace {
    fn working_dir(&self) -> Result<PathBuf, DiagnosticError> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => resolve_working_dir(),
        }
    }

    fn list_dir(&self, dir: &Path) -> Result<Vec<String>, DiagnosticError> {
        list_dir(dir)
    }

    fn exists(&self, path: &Path) -> bool {
        path_exists(path)
    }

    fn size_mb(&self, path: &Path) -> Result<f64, DiagnosticError> {
        file_size_mb(path)
    }
}

pub fn resolve_working_dir() -> Result<PathBuf, DiagnosticError> {
    std::env::current_dir()
        .map_err(|e| DiagnosticError::Environment(format!("Error getting directory: {}", e)))
}

/// Entry names of `dir`, in the order the OS returns them
pub fn list_dir(dir: &Path) -> Result<Vec<String>, DiagnosticError> {
    let listing_error = |e: std::io::Error| {
        DiagnosticError::Environment(format!("Error listing files: {}", e))
    };
    let entries = fs::read_dir(dir).map_err(listing_error)?;

    entries
        .map(|entry| {
            entry
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .map_err(listing_error)
        })
        .collect()
}

pub fn path_exists(path: &Path) -> bool {
    path.exists()
}

/// File size in megabytes, rounded to two decimals
pub fn file_size_mb(path: &Path) -> Result<f64, DiagnosticError> {
    let meta = fs::metadata(path).map_err(|e| DiagnosticError::SizeProbe(e.to_string()))?;
    Ok(bytes_to_mb(meta.len()))
}

pub fn bytes_to_mb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_MB * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_mb() {
        assert_eq!(bytes_to_mb(0), 0.0);
        assert_eq!(bytes_to_mb(1_048_576), 1.0);
        assert_eq!(bytes_to_mb(1_572_864), 1.5);
        // 12_345_678 / 1_048_576 = 11.7737...
        assert_eq!(bytes_to_mb(12_345_678), 11.77);
    }

    #[test]
    fn test_list_and_size() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.zip"), vec![0u8; 2048]).unwrap();
        fs::write(dir.path().join("b.txt"), b"x").unwrap();

        let mut names = list_dir(dir.path()).unwrap();
        names.sort();
        assert_eq!(names, vec!["a.zip", "b.txt"]);

        assert_eq!(file_size_mb(&dir.path().join("a.zip")).unwrap(), 0.0);
        assert!(path_exists(&dir.path().join("b.txt")));
        assert!(!path_exists(&dir.path().join("missing.zip")));
    }

    #[test]
    fn test_size_of_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = file_size_mb(&dir.path().join("nope.zip")).unwrap_err();
        assert!(matches!(err, DiagnosticError::SizeProbe(_)));
    }

    #[test]
    fn test_list_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_dir(&dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, DiagnosticError::Environment(_)));
        assert!(err.to_string().contains("Error listing files"));
    }

    #[test]
    fn test_rooted_workspace() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = LocalWorkspace::rooted(dir.path());
        assert_eq!(workspace.working_dir().unwrap(), dir.path());
        assert!(workspace.list_dir(dir.path()).unwrap().is_empty());
    }
}
