//! Gridforge Environment Abstraction Layer
//!
//! This crate isolates the two places a run touches the outside world so
//! the pipeline can run against the real machine or a deterministic test
//! double:
//! - Randomness (`draw_seed()`)
//! - Artifact storage (`ensure_dir()`, `clear_dir()`, `write()`)
//!
//! With [`SeededEntropy`] and [`MemoryStore`] a whole batch becomes
//! reproducible from one 64-bit seed and inspectable without touching disk.
//!
//! # Example
//!
//! ```ignore
//! use gridforge_env::{EntropySource, OsEntropy, ArtifactStore, FsStore};
//!
//! let mut entropy = OsEntropy::new();
//! let mut store = FsStore::new();
//! store.ensure_dir(Path::new("output"))?;
//! let seed = entropy.draw_seed();
//! ```

mod context;
mod entropy;
mod error;
mod store;

pub use context::EntropySource;
pub use entropy::{OsEntropy, SeededEntropy};
pub use error::EnvError;
pub use store::{ArtifactStore, FsStore, MemoryStore};
