//! Error types for model loading, palette resolution and artifact encoding.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the gridforge core.
#[derive(Debug, Error)]
pub enum GridError {
    /// Model file could not be read from disk
    #[error("Cannot read model {path}: {source}")]
    ModelRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Model file is not valid TOML or does not match the schema
    #[error("Malformed model {path}: {source}")]
    ModelParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Palette resource could not be read
    #[error("Cannot read palette {path}: {source}")]
    PaletteRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Palette resource is malformed
    #[error("Malformed palette: {0}")]
    PaletteParse(#[from] toml::de::Error),

    /// Color literal is not six hexadecimal digits
    #[error("Invalid color literal '{0}' (expected RRGGBB)")]
    InvalidColor(String),

    /// Character cannot be used as a display symbol
    #[error("Invalid symbol {0:?}")]
    InvalidSymbol(char),

    /// Symbol key in a table is not exactly one character
    #[error("Symbol key '{0}' must be a single character")]
    SymbolKey(String),

    /// Legend lists the same symbol twice
    #[error("Duplicate symbol '{0}' in legend")]
    DuplicateSymbol(char),

    /// Legend is empty or exceeds the byte index range
    #[error("Legend must hold between 1 and 256 symbols, got {0}")]
    LegendSize(usize),

    /// A legend symbol has no color in the resolved palette
    #[error("Symbol '{0}' has no color in the palette")]
    UnknownSymbol(char),

    /// Grid axis has neither an explicit extent nor a linear size
    #[error("Model '{model}' has no extent for axis {axis} (set `size` or the axis attribute)")]
    MissingExtent { model: String, axis: char },

    /// Grid axis extent is zero
    #[error("Model '{model}' has an empty extent on axis {axis}")]
    EmptyExtent { model: String, axis: char },

    /// Cell count overflows or exceeds the grid size limit
    #[error("Model '{model}' grid {x}x{y}x{z} exceeds the limit of {max} cells", max = crate::frame::MAX_CELLS)]
    GridTooLarge {
        model: String,
        x: usize,
        y: usize,
        z: usize,
    },

    /// Dimensionality is not 2 or 3
    #[error("Model '{model}' declares d={d}, expected 2 or 3")]
    InvalidDimensions { model: String, d: u8 },

    /// Rule pattern is malformed or uses symbols outside the legend
    #[error("Invalid rule '{input}={output}': {reason}")]
    InvalidRule {
        input: String,
        output: String,
        reason: String,
    },

    /// Node kind is not recognized
    #[error("Unknown node kind '{0}' (expected \"one\" or \"all\")")]
    UnknownNodeKind(String),

    /// Frame buffer length does not match its extents
    #[error("Frame buffer holds {actual} cells, extents require {expected}")]
    FrameSize { expected: usize, actual: usize },

    /// Cell value points past the end of the legend
    #[error("Cell index {index} is outside a legend of {len} symbols")]
    IndexOutOfRange { index: u8, len: usize },

    /// Extent does not fit the voxel format's 8-bit coordinates
    #[error("Extent {axis}={value} exceeds the voxel range 0-255")]
    VoxelExtentOutOfRange { axis: char, value: usize },

    /// Rendered image would exceed the pixel limit
    #[error("Image of {width}x{height} pixels exceeds the limit of {max} pixels", max = crate::raster::MAX_IMAGE_PIXELS)]
    ImageTooLarge { width: u64, height: u64 },

    /// Image serialization failed
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
}

impl GridError {
    /// Creates a rule error.
    pub fn rule(input: &str, output: &str, reason: impl Into<String>) -> Self {
        Self::InvalidRule {
            input: input.to_string(),
            output: output.to_string(),
            reason: reason.into(),
        }
    }
}
