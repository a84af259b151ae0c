//! Gridforge Core - model descriptors, palettes, rewriting and encoders
//!
//! This library holds everything a run needs that does not touch the
//! process environment:
//! 1. **Models**: TOML descriptors with legend, extents, rule tree, color
//!    overrides and run hints
//! 2. **Palettes**: symbol → color tables layered as default + overrides
//! 3. **Interpreter**: a lazy, seeded frame producer behind [`Interpreter`]
//! 4. **Encoders**: flat/isometric PNG, MagicaVoxel volumes and the text dump

pub mod descriptor;
pub mod error;
pub mod frame;
pub mod interpreter;
pub mod palette;
pub mod raster;
pub mod rules;
pub mod symbol;
pub mod textdump;
pub mod voxel;

// Re-export key types for convenience
pub use descriptor::{ModelAttributes, ModelDescriptor, RunHints};
pub use error::GridError;
pub use frame::{Extents, Frame};
pub use interpreter::{Frames, Interpreter, RewriteInterpreter};
pub use palette::{ColorOverrides, Palette, Rgba};
pub use symbol::{Legend, Symbol};
