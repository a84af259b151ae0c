//! Model descriptor loading.
//!
//! A model file is TOML. It declares the legend (`values`), the rule tree
//! (`[[nodes]]`) and optional attributes: dimensions, color overrides and
//! run hints. A batch index entry carries the same attributes and is
//! overlaid on top of the file's own.
//!
//! # Extents
//!
//! Each axis uses its explicit attribute (`length` = X, `width` = Y,
//! `height` = Z) when present, otherwise the linear `size`. With `d = 2`
//! the Z extent defaults to 1.

use crate::error::GridError;
use crate::frame::{Extents, MAX_CELLS};
use crate::palette::{parse_color_table, ColorOverrides};
use crate::rules::{RawNode, RuleTree};
use crate::symbol::Legend;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Declarative per-model attributes shared by model files and index entries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ModelAttributes {
    /// Linear size applied to every axis without an explicit extent
    pub size: Option<usize>,
    pub length: Option<usize>,
    pub width: Option<usize>,
    pub height: Option<usize>,
    /// Dimensionality (2 or 3)
    pub d: Option<u8>,

    pub amount: Option<usize>,
    pub steps: Option<usize>,
    pub pixelsize: Option<u32>,
    pub gif: Option<bool>,
    pub iso: Option<bool>,
    pub seeds: Option<Vec<u64>>,

    /// Symbol → `RRGGBB` overrides
    #[serde(default)]
    pub colors: BTreeMap<String, String>,
}

impl ModelAttributes {
    /// Returns `self` with every attribute set in `top` taking priority.
    /// Colors merge per symbol.
    pub fn overlay(mut self, top: &ModelAttributes) -> Self {
        fn pick<T: Clone>(base: &mut Option<T>, top: &Option<T>) {
            if top.is_some() {
                *base = top.clone();
            }
        }
        pick(&mut self.size, &top.size);
        pick(&mut self.length, &top.length);
        pick(&mut self.width, &top.width);
        pick(&mut self.height, &top.height);
        pick(&mut self.d, &top.d);
        pick(&mut self.amount, &top.amount);
        pick(&mut self.steps, &top.steps);
        pick(&mut self.pixelsize, &top.pixelsize);
        pick(&mut self.gif, &top.gif);
        pick(&mut self.iso, &top.iso);
        pick(&mut self.seeds, &top.seeds);
        for (symbol, color) in &top.colors {
            self.colors.insert(symbol.clone(), color.clone());
        }
        self
    }
}

#[derive(Debug, Deserialize)]
struct ModelFile {
    name: Option<String>,
    values: String,
    #[serde(default)]
    origin: bool,
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(flatten)]
    attributes: ModelAttributes,
}

/// Run hints a model declares for itself; CLI flags override them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunHints {
    pub amount: Option<usize>,
    pub steps: Option<usize>,
    pub pixel_size: Option<u32>,
    pub animate: Option<bool>,
    pub isometric: Option<bool>,
    /// Per-iteration seeds, indexed by iteration number
    pub seeds: Option<Vec<u64>>,
}

/// Parsed, read-only representation of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    pub name: String,
    /// 2 or 3
    pub dimensions: u8,
    pub extents: Extents,
    pub legend: Legend,
    /// Seed the center cell with legend index 1
    pub origin: bool,
    pub rules: RuleTree,
    pub colors: ColorOverrides,
    pub hints: RunHints,
}

impl ModelDescriptor {
    /// Loads a model file.
    pub fn load(path: &Path) -> Result<Self, GridError> {
        Self::load_with_overlay(path, None)
    }

    /// Loads a model file and overlays index-entry attributes on it.
    pub fn load_with_overlay(
        path: &Path,
        overlay: Option<&ModelAttributes>,
    ) -> Result<Self, GridError> {
        let text = std::fs::read_to_string(path).map_err(|source| GridError::ModelRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path, overlay)
    }

    /// Parses model text; `path` names the source in errors and supplies the
    /// default model name.
    pub fn from_toml_str(
        text: &str,
        path: &Path,
        overlay: Option<&ModelAttributes>,
    ) -> Result<Self, GridError> {
        let file: ModelFile = toml::from_str(text).map_err(|source| GridError::ModelParse {
            path: path.to_path_buf(),
            source,
        })?;

        let name = file.name.unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "model".to_string())
        });

        let attributes = match overlay {
            Some(top) => file.attributes.overlay(top),
            None => file.attributes,
        };

        let dimensions = attributes.d.unwrap_or(2);
        if dimensions != 2 && dimensions != 3 {
            return Err(GridError::InvalidDimensions {
                model: name,
                d: dimensions,
            });
        }

        let extents = resolve_extents(&name, dimensions, &attributes)?;
        let legend = Legend::parse(&file.values)?;
        let rules = RuleTree::build(&file.nodes, &legend)?;
        let colors = parse_color_table(&attributes.colors)?;

        let hints = RunHints {
            amount: attributes.amount,
            steps: attributes.steps,
            pixel_size: attributes.pixelsize,
            animate: attributes.gif,
            isometric: attributes.iso,
            seeds: attributes.seeds,
        };

        debug!(
            "Loaded model '{}' ({}D, {}, legend {}, {} nodes)",
            name,
            dimensions,
            extents,
            legend,
            rules.nodes.len()
        );

        Ok(Self {
            name,
            dimensions,
            extents,
            legend,
            origin: file.origin,
            rules,
            colors,
            hints,
        })
    }
}

fn resolve_extents(
    name: &str,
    dimensions: u8,
    attributes: &ModelAttributes,
) -> Result<Extents, GridError> {
    let axis = |explicit: Option<usize>,
                fallback: Option<usize>,
                label: char|
     -> Result<usize, GridError> {
        let value = explicit.or(fallback).ok_or_else(|| GridError::MissingExtent {
            model: name.to_string(),
            axis: label,
        })?;
        if value == 0 {
            return Err(GridError::EmptyExtent {
                model: name.to_string(),
                axis: label,
            });
        }
        Ok(value)
    };

    let x = axis(attributes.length, attributes.size, 'X')?;
    let y = axis(attributes.width, attributes.size, 'Y')?;
    let z_fallback = if dimensions == 2 { Some(1) } else { attributes.size };
    let z = axis(attributes.height, z_fallback, 'Z')?;

    let extents = Extents::new(x, y, z);
    match extents.checked_volume() {
        Some(cells) if cells <= MAX_CELLS => Ok(extents),
        _ => Err(GridError::GridTooLarge {
            model: name.to_string(),
            x,
            y,
            z,
        }),
    }
}
