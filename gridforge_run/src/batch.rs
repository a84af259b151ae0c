//! Batch mode: run every model listed in the resource index.
//!
//! A model that fails to load or run is logged and recorded; the batch
//! always moves on to the next entry.

use crate::config::RunConfig;
use crate::driver::RunSummary;
use crate::error::{ConfigError, RunError};
use crate::pipeline::run_model;
use crate::resources::Resources;
use gridforge_core::{Interpreter, ModelAttributes, ModelDescriptor, Palette};
use gridforge_env::{ArtifactStore, EntropySource};
use serde::Deserialize;
use std::path::Path;
use tracing::{error, info, warn};

/// One `[[models]]` entry: a model name plus attributes that override the
/// model file's own.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    #[serde(flatten)]
    pub attributes: ModelAttributes,
}

/// The batch index file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelIndex {
    #[serde(default)]
    pub models: Vec<IndexEntry>,
}

impl ModelIndex {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::IndexRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }

    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::IndexParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A model that did not complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub model: String,
    pub reason: String,
}

/// Outcome of a whole batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub completed: Vec<RunSummary>,
    pub failed: Vec<BatchFailure>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs every indexed model into `output_dir`.
///
/// The output directory is cleared of files first. Only an unreadable
/// index or a failure to clear the directory aborts the batch.
pub fn run_batch<I, E, S>(
    resources: &Resources,
    output_dir: &Path,
    palette: &Palette,
    interpreter: &I,
    entropy: &mut E,
    store: &mut S,
) -> Result<BatchReport, RunError>
where
    I: Interpreter + ?Sized,
    E: EntropySource + ?Sized,
    S: ArtifactStore,
{
    let index = ModelIndex::load(&resources.index_path())?;
    let cleared = store.clear_dir(output_dir)?;
    info!(
        "Batch: {} models from {}, cleared {} files in {}",
        index.models.len(),
        resources.root().display(),
        cleared,
        output_dir.display()
    );

    let mut report = BatchReport::default();
    for entry in &index.models {
        match run_entry(entry, resources, output_dir, palette, interpreter, entropy, store) {
            Ok(summary) => report.completed.push(summary),
            Err(e) => {
                error!("✗ {} FAILED: {}", entry.name, e);
                report.failed.push(BatchFailure {
                    model: entry.name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if report.is_success() {
        info!("✓ Batch complete: {} models", report.completed.len());
    } else {
        warn!(
            "Batch complete: {} succeeded, {} failed",
            report.completed.len(),
            report.failed.len()
        );
    }
    Ok(report)
}

fn run_entry<I, E, S>(
    entry: &IndexEntry,
    resources: &Resources,
    output_dir: &Path,
    palette: &Palette,
    interpreter: &I,
    entropy: &mut E,
    store: &mut S,
) -> Result<RunSummary, RunError>
where
    I: Interpreter + ?Sized,
    E: EntropySource + ?Sized,
    S: ArtifactStore,
{
    let path = resources.model_path(&entry.name);
    let model = ModelDescriptor::load_with_overlay(&path, Some(&entry.attributes))?;
    let config = RunConfig::resolve(&model.name, &model.hints, None).with_output_dir(output_dir);
    run_model(&model, &config, palette, interpreter, entropy, store, std::io::sink())
}
