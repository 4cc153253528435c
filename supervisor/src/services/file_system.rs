//! Real file system service implementation
//!
//! Answers framework-detection questions relative to the project root.

use std::path::{Path, PathBuf};

use crate::traits::FileSystem;

/// Real file system implementation
pub struct RealFileSystem {
    /// Project root all detection paths are relative to
    base_dir: PathBuf,
}

impl RealFileSystem {
    /// Create file system service rooted at the current directory
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
        }
    }

    /// Create with custom project root
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, relative_path: &str) -> bool {
        self.base_dir.join(relative_path).exists()
    }
}
