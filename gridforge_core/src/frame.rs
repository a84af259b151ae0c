//! Grid extents and result frames.

use crate::error::GridError;
use crate::symbol::Legend;
use std::fmt;

/// Largest grid a model may declare, in cells.
pub const MAX_CELLS: usize = 1 << 26;

/// Grid size along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extents {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl Extents {
    pub fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// Total number of cells, saturating at `usize::MAX`.
    pub fn volume(&self) -> usize {
        self.checked_volume().unwrap_or(usize::MAX)
    }

    /// Total number of cells, or `None` on overflow.
    pub fn checked_volume(&self) -> Option<usize> {
        self.x.checked_mul(self.y)?.checked_mul(self.z)
    }

    /// True when the grid is a single layer.
    pub fn is_flat(&self) -> bool {
        self.z == 1
    }

    /// Linear index of a cell (`x + y*X + z*X*Y`).
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        x + y * self.x + z * self.x * self.y
    }
}

impl fmt::Display for Extents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.x, self.y, self.z)
    }
}

/// One emitted grid state.
///
/// Frames are handed to a single consumer, encoded, and dropped before the
/// next one is pulled from the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    state: Vec<u8>,
    legend: Legend,
    extents: Extents,
}

impl Frame {
    /// Creates a frame, checking the buffer length against the extents.
    pub fn new(state: Vec<u8>, legend: Legend, extents: Extents) -> Result<Self, GridError> {
        if state.len() != extents.volume() {
            return Err(GridError::FrameSize {
                expected: extents.volume(),
                actual: state.len(),
            });
        }
        Ok(Self {
            state,
            legend,
            extents,
        })
    }

    /// Builds a frame from a buffer already sized to `extents`.
    pub(crate) fn from_grid(state: Vec<u8>, legend: Legend, extents: Extents) -> Self {
        debug_assert_eq!(state.len(), extents.volume());
        Self {
            state,
            legend,
            extents,
        }
    }

    pub fn state(&self) -> &[u8] {
        &self.state
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn extents(&self) -> Extents {
        self.extents
    }

    /// Cell value at a coordinate.
    pub fn cell(&self, x: usize, y: usize, z: usize) -> u8 {
        self.state[self.extents.index(x, y, z)]
    }
}
