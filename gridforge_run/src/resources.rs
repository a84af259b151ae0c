//! Resource directory layout.
//!
//! ```text
//! <root>/
//!   palette.toml        default symbol colors
//!   models.toml         batch index ([[models]] entries)
//!   models/<name>.toml  model descriptors
//! ```

use std::path::{Path, PathBuf};

/// Environment variable overriding the resource root.
pub const RESOURCES_ENV: &str = "GRIDFORGE_RESOURCES";

/// Resource root used when the variable is unset.
pub const DEFAULT_RESOURCES_DIR: &str = "resources";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resources {
    root: PathBuf,
}

impl Resources {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reads the root from `GRIDFORGE_RESOURCES`, falling back to `resources`.
    pub fn from_env() -> Self {
        let root = std::env::var_os(RESOURCES_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESOURCES_DIR));
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn palette_path(&self) -> PathBuf {
        self.root.join("palette.toml")
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join("models.toml")
    }

    pub fn model_path(&self, name: &str) -> PathBuf {
        self.root.join("models").join(format!("{}.toml", name))
    }
}
