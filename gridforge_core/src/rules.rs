//! Rewrite rules and the rule tree.
//!
//! Pattern syntax: rows are separated by `/`, layers by a space, and `*`
//! is a wildcard (matches anything on input, leaves the cell on output).
//!
//! ```text
//! "WB"          1x1x1 row of two cells
//! "WB/BB"       2x2x1 block
//! "W/B B/B"     1x2x2 column over two layers
//! ```

use crate::error::GridError;
use crate::frame::Extents;
use crate::symbol::{Legend, WILDCARD};
use serde::Deserialize;

/// How a node applies its rules on each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Rewrite one uniformly random match
    One,
    /// Rewrite every non-overlapping match
    All,
}

impl std::str::FromStr for NodeKind {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "one" => Ok(NodeKind::One),
            "all" => Ok(NodeKind::All),
            _ => Err(GridError::UnknownNodeKind(s.to_string())),
        }
    }
}

/// A rectangular block of optional cell values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub size: Extents,
    /// `None` is a wildcard
    pub cells: Vec<Option<u8>>,
}

impl Pattern {
    fn parse(text: &str, legend: &Legend) -> Result<Self, String> {
        let layers: Vec<Vec<Vec<char>>> = text
            .split(' ')
            .map(|layer| layer.split('/').map(|row| row.chars().collect()).collect())
            .collect();

        let mz = layers.len();
        let my = layers[0].len();
        let mx = layers[0][0].len();
        if mx == 0 {
            return Err("empty pattern".to_string());
        }

        let mut cells = Vec::with_capacity(mx * my * mz);
        for layer in &layers {
            if layer.len() != my {
                return Err("layers have different row counts".to_string());
            }
            for row in layer {
                if row.len() != mx {
                    return Err("rows have different lengths".to_string());
                }
                for &c in row {
                    if c == WILDCARD {
                        cells.push(None);
                    } else {
                        let index = legend
                            .index_of(c)
                            .ok_or_else(|| format!("symbol '{}' is not in the legend", c))?;
                        cells.push(Some(index));
                    }
                }
            }
        }

        Ok(Self {
            size: Extents::new(mx, my, mz),
            cells,
        })
    }

    /// Quarter turn in the XY plane.
    fn rotated(&self) -> Self {
        let Extents { x: mx, y: my, z: mz } = self.size;
        let size = Extents::new(my, mx, mz);
        let mut cells = vec![None; self.cells.len()];
        for z in 0..mz {
            for y in 0..my {
                for x in 0..mx {
                    let nx = my - 1 - y;
                    let ny = x;
                    cells[size.index(nx, ny, z)] = self.cells[self.size.index(x, y, z)];
                }
            }
        }
        Self { size, cells }
    }
}

/// A single `input → output` rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub input: Pattern,
    pub output: Pattern,
}

impl Rule {
    /// Parses a rule against the model's legend.
    pub fn parse(input: &str, output: &str, legend: &Legend) -> Result<Self, GridError> {
        let lhs = Pattern::parse(input, legend).map_err(|r| GridError::rule(input, output, r))?;
        let rhs = Pattern::parse(output, legend).map_err(|r| GridError::rule(input, output, r))?;
        if lhs.size != rhs.size {
            return Err(GridError::rule(
                input,
                output,
                format!("input is {} but output is {}", lhs.size, rhs.size),
            ));
        }
        Ok(Self {
            input: lhs,
            output: rhs,
        })
    }

    fn rotated(&self) -> Self {
        Self {
            input: self.input.rotated(),
            output: self.output.rotated(),
        }
    }

    /// True when the input pattern matches with its origin at `(x, y, z)`.
    pub fn matches(&self, grid: &[u8], extents: Extents, x: usize, y: usize, z: usize) -> bool {
        let size = self.input.size;
        if x + size.x > extents.x || y + size.y > extents.y || z + size.z > extents.z {
            return false;
        }
        for dz in 0..size.z {
            for dy in 0..size.y {
                for dx in 0..size.x {
                    if let Some(want) = self.input.cells[size.index(dx, dy, dz)] {
                        if grid[extents.index(x + dx, y + dy, z + dz)] != want {
                            return false;
                        }
                    }
                }
            }
        }
        true
    }

    /// True when applying at `(x, y, z)` would change at least one cell.
    pub fn would_change(&self, grid: &[u8], extents: Extents, x: usize, y: usize, z: usize) -> bool {
        let size = self.output.size;
        for dz in 0..size.z {
            for dy in 0..size.y {
                for dx in 0..size.x {
                    if let Some(value) = self.output.cells[size.index(dx, dy, dz)] {
                        if grid[extents.index(x + dx, y + dy, z + dz)] != value {
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    /// Writes the output pattern with its origin at `(x, y, z)`.
    pub fn apply(&self, grid: &mut [u8], extents: Extents, x: usize, y: usize, z: usize) {
        let size = self.output.size;
        for dz in 0..size.z {
            for dy in 0..size.y {
                for dx in 0..size.x {
                    if let Some(value) = self.output.cells[size.index(dx, dy, dz)] {
                        grid[extents.index(x + dx, y + dy, z + dz)] = value;
                    }
                }
            }
        }
    }

    /// Cells covered by a match at `(x, y, z)`.
    pub fn footprint(&self, extents: Extents, x: usize, y: usize, z: usize) -> Vec<usize> {
        let size = self.input.size;
        let mut cells = Vec::with_capacity(size.volume());
        for dz in 0..size.z {
            for dy in 0..size.y {
                for dx in 0..size.x {
                    cells.push(extents.index(x + dx, y + dy, z + dz));
                }
            }
        }
        cells
    }
}

/// A rule node as written in a model file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    pub kind: String,
    #[serde(default)]
    pub steps: Option<usize>,
    #[serde(default)]
    pub rotate: bool,
    #[serde(default)]
    pub rules: Vec<RawRule>,
}

/// A rule as written in a model file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRule {
    pub input: String,
    pub output: String,
}

/// A node of the rule tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleNode {
    pub kind: NodeKind,
    pub rules: Vec<Rule>,
    /// Per-node step cap
    pub max_steps: Option<usize>,
}

/// Ordered sequence of nodes; each runs until exhausted, then the next takes over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTree {
    pub nodes: Vec<RuleNode>,
}

impl RuleTree {
    /// Compiles raw nodes against a legend, expanding rotations.
    pub fn build(raw: &[RawNode], legend: &Legend) -> Result<Self, GridError> {
        let mut nodes = Vec::with_capacity(raw.len());
        for node in raw {
            let kind: NodeKind = node.kind.parse()?;
            let mut rules: Vec<Rule> = Vec::new();
            for raw_rule in &node.rules {
                let rule = Rule::parse(&raw_rule.input, &raw_rule.output, legend)?;
                let variants = if node.rotate {
                    let r1 = rule.rotated();
                    let r2 = r1.rotated();
                    let r3 = r2.rotated();
                    vec![rule, r1, r2, r3]
                } else {
                    vec![rule]
                };
                for variant in variants {
                    if !rules.contains(&variant) {
                        rules.push(variant);
                    }
                }
            }
            nodes.push(RuleNode {
                kind,
                rules,
                max_steps: node.steps,
            });
        }
        Ok(Self { nodes })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
