//! Grid-rewriting interpreter.
//!
//! The [`Interpreter`] trait is the seam the run driver pulls frames through.
//! [`RewriteInterpreter`] is the reference implementation: a grid filled with
//! legend index 0, rewritten node by node until the rule tree is exhausted
//! or the step budget runs out.
//!
//! # Frame emission
//!
//! - Normal run: exactly one terminal frame.
//! - Animated run: the initial state, then one frame per step.
//!
//! The returned sequence is lazy and forward-only; the grid is only advanced
//! when the consumer pulls the next frame.

use crate::descriptor::ModelDescriptor;
use crate::error::GridError;
use crate::frame::Frame;
use crate::rules::{NodeKind, RuleNode};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// Lazy, finite, non-restartable frame sequence.
pub type Frames<'a> = Box<dyn Iterator<Item = Frame> + 'a>;

/// Produces frames from a model, a seed and a step budget.
pub trait Interpreter {
    /// Starts a run.
    ///
    /// # Arguments
    /// * `model` - Parsed model descriptor
    /// * `seed` - Run seed; the same seed must reproduce the same frames
    /// * `steps` - Step budget (0 = until the rule tree is exhausted)
    /// * `animate` - Emit every step instead of only the terminal state
    fn run<'a>(
        &'a self,
        model: &'a ModelDescriptor,
        seed: u64,
        steps: usize,
        animate: bool,
    ) -> Result<Frames<'a>, GridError>;
}

/// Reference rewriting interpreter.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteInterpreter;

impl RewriteInterpreter {
    pub fn new() -> Self {
        Self
    }
}

impl Interpreter for RewriteInterpreter {
    fn run<'a>(
        &'a self,
        model: &'a ModelDescriptor,
        seed: u64,
        steps: usize,
        animate: bool,
    ) -> Result<Frames<'a>, GridError> {
        Ok(Box::new(RewriteRun::new(model, seed, steps, animate)))
    }
}

/// A match: rule index and origin cell.
type Match = (usize, usize, usize, usize);

struct RewriteRun<'a> {
    model: &'a ModelDescriptor,
    grid: Vec<u8>,
    rng: ChaCha8Rng,

    /// Index of the active node
    node: usize,
    /// Steps taken by the active node
    node_steps: usize,

    steps_taken: usize,
    budget: usize,
    animate: bool,
    started: bool,
    finished: bool,
}

impl<'a> RewriteRun<'a> {
    fn new(model: &'a ModelDescriptor, seed: u64, budget: usize, animate: bool) -> Self {
        let extents = model.extents;
        let mut grid = vec![0u8; extents.volume()];
        if model.origin && model.legend.len() > 1 {
            grid[extents.index(extents.x / 2, extents.y / 2, extents.z / 2)] = 1;
        }

        Self {
            model,
            grid,
            rng: ChaCha8Rng::seed_from_u64(seed),
            node: 0,
            node_steps: 0,
            steps_taken: 0,
            budget,
            animate,
            started: false,
            finished: false,
        }
    }

    fn snapshot(&self) -> Frame {
        Frame::from_grid(self.grid.clone(), self.model.legend.clone(), self.model.extents)
    }

    fn budget_spent(&self) -> bool {
        self.budget > 0 && self.steps_taken >= self.budget
    }

    /// Advances by one step. Returns false once every node is exhausted.
    fn step(&mut self) -> bool {
        let model = self.model;
        while let Some(node) = model.rules.nodes.get(self.node) {
            let capped = node.max_steps.map_or(false, |cap| self.node_steps >= cap);
            let progressed = !capped
                && match node.kind {
                    NodeKind::One => self.apply_one(node),
                    NodeKind::All => self.apply_all(node),
                };

            if progressed {
                self.node_steps += 1;
                self.steps_taken += 1;
                return true;
            }

            self.node += 1;
            self.node_steps = 0;
        }
        false
    }

    fn find_matches(&self, node: &RuleNode) -> Vec<Match> {
        let extents = self.model.extents;
        let mut matches = Vec::new();
        for (r, rule) in node.rules.iter().enumerate() {
            for z in 0..extents.z {
                for y in 0..extents.y {
                    for x in 0..extents.x {
                        if rule.matches(&self.grid, extents, x, y, z)
                            && rule.would_change(&self.grid, extents, x, y, z)
                        {
                            matches.push((r, x, y, z));
                        }
                    }
                }
            }
        }
        matches
    }

    fn apply_one(&mut self, node: &RuleNode) -> bool {
        let matches = self.find_matches(node);
        if matches.is_empty() {
            return false;
        }
        let (r, x, y, z) = matches[self.rng.gen_range(0..matches.len())];
        node.rules[r].apply(&mut self.grid, self.model.extents, x, y, z);
        true
    }

    fn apply_all(&mut self, node: &RuleNode) -> bool {
        let mut matches = self.find_matches(node);
        if matches.is_empty() {
            return false;
        }
        matches.shuffle(&mut self.rng);

        let extents = self.model.extents;
        let mut touched = vec![false; self.grid.len()];
        let mut applied = 0usize;
        for (r, x, y, z) in matches {
            let rule = &node.rules[r];
            let footprint = rule.footprint(extents, x, y, z);
            if footprint.iter().any(|&i| touched[i]) {
                continue;
            }
            if !rule.matches(&self.grid, extents, x, y, z) {
                continue;
            }
            rule.apply(&mut self.grid, extents, x, y, z);
            for i in footprint {
                touched[i] = true;
            }
            applied += 1;
        }
        applied > 0
    }
}

impl Iterator for RewriteRun<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        if self.finished {
            return None;
        }

        if self.animate {
            if !self.started {
                self.started = true;
                return Some(self.snapshot());
            }
            if self.budget_spent() || !self.step() {
                self.finished = true;
                debug!("'{}' finished after {} steps", self.model.name, self.steps_taken);
                return None;
            }
            return Some(self.snapshot());
        }

        while !self.budget_spent() && self.step() {}
        self.finished = true;
        debug!("'{}' finished after {} steps", self.model.name, self.steps_taken);
        Some(self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn model(text: &str) -> ModelDescriptor {
        ModelDescriptor::from_toml_str(text, Path::new("Test.toml"), None).unwrap()
    }

    const LINE: &str = r#"
values = "BW"
origin = true
length = 4
width = 1

[[nodes]]
kind = "one"
rotate = true
rules = [{ input = "WB", output = "WW" }]
"#;

    const SCATTER: &str = r#"
values = "BW"
size = 8

[[nodes]]
kind = "one"
rules = [{ input = "B", output = "W" }]
"#;

    #[test]
    fn test_origin_seeds_center_cell() {
        let model = model(LINE);
        let interpreter = RewriteInterpreter::new();
        let first = interpreter.run(&model, 1, 0, true).unwrap().next().unwrap();
        assert_eq!(first.state(), &[0, 0, 1, 0]);
    }

    #[test]
    fn test_normal_run_yields_single_terminal_frame() {
        let model = model(LINE);
        let interpreter = RewriteInterpreter::new();
        let frames: Vec<Frame> = interpreter.run(&model, 7, 0, false).unwrap().collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].state(), &[1, 1, 1, 1]);
    }

    #[test]
    fn test_animated_run_yields_every_step() {
        let model = model(LINE);
        let interpreter = RewriteInterpreter::new();
        let frames: Vec<Frame> = interpreter.run(&model, 7, 0, true).unwrap().collect();
        // Initial state + 3 growth steps
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[3].state(), &[1, 1, 1, 1]);
    }

    #[test]
    fn test_step_budget_caps_run() {
        let model = model(LINE);
        let interpreter = RewriteInterpreter::new();
        let frames: Vec<Frame> = interpreter.run(&model, 7, 2, true).unwrap().collect();
        assert_eq!(frames.len(), 3);

        let terminal = interpreter.run(&model, 7, 2, false).unwrap().next().unwrap();
        assert_eq!(terminal.state().iter().filter(|&&c| c == 1).count(), 3);
    }

    #[test]
    fn test_same_seed_same_frames() {
        let model = model(SCATTER);
        let interpreter = RewriteInterpreter::new();
        let a = interpreter.run(&model, 42, 5, false).unwrap().next().unwrap();
        let b = interpreter.run(&model, 42, 5, false).unwrap().next().unwrap();
        let c = interpreter.run(&model, 43, 5, false).unwrap().next().unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_all_node_rewrites_every_match() {
        let model = model(
            "values = \"BW\"\nlength = 4\nwidth = 1\n[[nodes]]\nkind = \"all\"\nrules = [{ input = \"B\", output = \"W\" }]\n",
        );
        let interpreter = RewriteInterpreter::new();
        let frames: Vec<Frame> = interpreter.run(&model, 3, 0, true).unwrap().collect();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].state(), &[1, 1, 1, 1]);
    }

    #[test]
    fn test_node_step_cap_hands_over() {
        let model = model(
            r#"
values = "BWR"
length = 4
width = 1

[[nodes]]
kind = "one"
steps = 2
rules = [{ input = "B", output = "W" }]

[[nodes]]
kind = "all"
rules = [{ input = "B", output = "R" }]
"#,
        );
        let interpreter = RewriteInterpreter::new();
        let frame = interpreter.run(&model, 9, 0, false).unwrap().next().unwrap();
        assert_eq!(frame.state().iter().filter(|&&c| c == 1).count(), 2);
        assert_eq!(frame.state().iter().filter(|&&c| c == 2).count(), 2);
    }

    #[test]
    fn test_empty_rule_tree_yields_initial_state() {
        let model = model("values = \"BW\"\nsize = 2\n");
        let interpreter = RewriteInterpreter::new();
        let frames: Vec<Frame> = interpreter.run(&model, 0, 0, false).unwrap().collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].state(), &[0, 0, 0, 0]);
    }
}
