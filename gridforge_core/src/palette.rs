//! Symbol → color tables.
//!
//! The default palette is loaded once per process; each model gets a clone
//! with its own overrides applied on top. Overrides replace, never blend.

use crate::error::GridError;
use crate::symbol::{Legend, Symbol};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

/// An opaque 32-bit color stored as `0xAARRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba(pub u32);

impl Rgba {
    /// Parses a `RRGGBB` or `#RRGGBB` literal; alpha is fixed to opaque.
    pub fn from_hex(literal: &str) -> Result<Self, GridError> {
        let hex = literal.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(GridError::InvalidColor(literal.to_string()));
        }
        let rgb = u32::from_str_radix(hex, 16)
            .map_err(|_| GridError::InvalidColor(literal.to_string()))?;
        Ok(Self(0xFF00_0000 | rgb))
    }

    pub fn r(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(&self) -> u8 {
        self.0 as u8
    }

    pub fn a(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Returns `[r, g, b, a]`.
    pub fn channels(&self) -> [u8; 4] {
        [self.r(), self.g(), self.b(), self.a()]
    }

    /// Scales RGB by `factor` (0.0 - 1.0), keeping alpha.
    pub fn shade(&self, factor: f32) -> Self {
        let scale = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u32;
        Self(
            (self.0 & 0xFF00_0000)
                | (scale(self.r()) << 16)
                | (scale(self.g()) << 8)
                | scale(self.b()),
        )
    }
}

/// Per-model color overrides, keyed by validated symbol.
pub type ColorOverrides = BTreeMap<Symbol, Rgba>;

/// Parses a `symbol -> "RRGGBB"` table as found in palette and model files.
pub fn parse_color_table(raw: &BTreeMap<String, String>) -> Result<ColorOverrides, GridError> {
    raw.iter()
        .map(|(key, value)| Ok((key.parse::<Symbol>()?, Rgba::from_hex(value)?)))
        .collect()
}

#[derive(Debug, Deserialize)]
struct PaletteFile {
    #[serde(default)]
    colors: BTreeMap<String, String>,
}

/// A resolved symbol → color mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    colors: HashMap<Symbol, Rgba>,
}

impl Palette {
    /// Creates an empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a palette from TOML text with a `[colors]` table.
    pub fn from_toml_str(text: &str) -> Result<Self, GridError> {
        let file: PaletteFile = toml::from_str(text)?;
        let colors = parse_color_table(&file.colors)?;
        Ok(Self {
            colors: colors.into_iter().collect(),
        })
    }

    /// Loads the shared default palette.
    pub fn load(path: &Path) -> Result<Self, GridError> {
        let text = std::fs::read_to_string(path).map_err(|source| GridError::PaletteRead {
            path: path.to_path_buf(),
            source,
        })?;
        let palette = Self::from_toml_str(&text)?;
        debug!("Loaded {} palette colors from {}", palette.len(), path.display());
        Ok(palette)
    }

    /// Sets a color, returning the one it replaced.
    pub fn insert(&mut self, symbol: Symbol, color: Rgba) -> Option<Rgba> {
        self.colors.insert(symbol, color)
    }

    pub fn get(&self, symbol: Symbol) -> Option<Rgba> {
        self.colors.get(&symbol).copied()
    }

    /// Looks up a symbol, failing with [`GridError::UnknownSymbol`].
    pub fn resolve(&self, symbol: Symbol) -> Result<Rgba, GridError> {
        self.get(symbol)
            .ok_or(GridError::UnknownSymbol(symbol.as_char()))
    }

    /// Returns a copy with `overrides` applied symbol-by-symbol.
    pub fn with_overrides(&self, overrides: &ColorOverrides) -> Self {
        let mut palette = self.clone();
        for (symbol, color) in overrides {
            palette.insert(*symbol, *color);
        }
        palette
    }

    /// Resolves every legend symbol in order into an index → color table.
    pub fn color_table(&self, legend: &Legend) -> Result<Vec<Rgba>, GridError> {
        legend.symbols().iter().map(|s| self.resolve(*s)).collect()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
