//! Gridforge Run Driver
//!
//! Turns command-line flags or a batch index into model runs and routes
//! every produced frame to an artifact.
//!
//! # Architecture
//!
//! ```text
//!  argv ──► Invocation ──► RunConfig ─┐
//!                                     ▼
//!  models/<name>.toml ──► ModelDescriptor ──► RunDriver ──► OutputRouter
//!                                │               │              │
//!                         Interpreter      EntropySource   ArtifactStore
//!                          (frames)          (seeds)      (.png / .vox)
//!                                                          or stdout
//! ```
//!
//! Single-model and batch mode share one path, [`pipeline::run_model`].
//! Batch mode wraps it in a loop that records failures and keeps going.
//!
//! # Usage
//!
//! ```ignore
//! use gridforge_run::{run_single, Invocation};
//!
//! if let Invocation::Single(cli) = Invocation::parse(std::env::args().skip(1))? {
//!     let summary = run_single(&cli, &palette, &interpreter, &mut entropy, &mut store, stdout)?;
//! }
//! ```

pub mod batch;
pub mod config;
pub mod driver;
pub mod error;
pub mod pipeline;
pub mod resources;
pub mod router;

pub use batch::{run_batch, BatchFailure, BatchReport, IndexEntry, ModelIndex};
pub use config::{CliArgs, Invocation, RunConfig};
pub use driver::{select_seed, FrameSink, RunDriver, RunSummary, SeedChoice, SeedOrigin};
pub use error::{ConfigError, RunError};
pub use pipeline::{run_model, run_single};
pub use resources::Resources;
pub use router::{select_encoding, ArtifactName, Encoding, OutputRouter};
