//! Project layout
//!
//! The installer and runner agree on three paths relative to the project
//! root: the dependency manifest, the virtual environment and the entry
//! point.

use std::path::{Path, PathBuf};

/// Default dependency manifest
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// Default virtual environment directory
pub const DEFAULT_VENV_DIR: &str = "venv";

/// Default application entry point
pub const DEFAULT_ENTRY_POINT: &str = "main.py";

/// Paths the lifecycle works with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    root: PathBuf,
    manifest: PathBuf,
    venv_dir: PathBuf,
    entry_point: PathBuf,
}

impl ProjectLayout {
    /// Layout rooted at `root` with the default relative paths
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            venv_dir: PathBuf::from(DEFAULT_VENV_DIR),
            entry_point: PathBuf::from(DEFAULT_ENTRY_POINT),
        }
    }

    /// Override the manifest path (relative to the root unless absolute)
    #[must_use]
    pub fn with_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest = path.into();
        self
    }

    /// Override the virtual environment directory
    #[must_use]
    pub fn with_venv_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.venv_dir = path.into();
        self
    }

    /// Override the entry point
    #[must_use]
    pub fn with_entry_point(mut self, path: impl Into<PathBuf>) -> Self {
        self.entry_point = path.into();
        self
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Manifest path, whether or not it exists
    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest)
    }

    /// Virtual environment directory
    pub fn venv_path(&self) -> PathBuf {
        self.root.join(&self.venv_dir)
    }

    /// Entry point path
    pub fn entry_point_path(&self) -> PathBuf {
        self.root.join(&self.entry_point)
    }

    /// The manifest, if present
    pub fn find_manifest(&self) -> Option<PathBuf> {
        let path = self.manifest_path();
        path.is_file().then_some(path)
    }

    /// Whether the entry point exists
    pub fn has_entry_point(&self) -> bool {
        self.entry_point_path().is_file()
    }
}
