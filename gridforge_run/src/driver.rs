//! Run driver: iterations, seed selection and frame naming.
//!
//! The driver owns the animation frame counter, so two model runs in one
//! process never share numbering state.

use crate::config::RunConfig;
use crate::error::RunError;
use crate::router::ArtifactName;
use gridforge_core::{Frame, Interpreter, ModelDescriptor};
use gridforge_env::EntropySource;
use std::path::PathBuf;
use tracing::{debug, info};

/// Consumer of the frames a run produces.
pub trait FrameSink {
    /// Handles one frame. Returns the written artifact path, if any.
    fn accept(&mut self, frame: Frame, name: &ArtifactName) -> Result<Option<PathBuf>, RunError>;

    /// Called once every frame of iteration `iteration` has been accepted.
    fn iteration_complete(&mut self, _iteration: usize, _seed: u64) {}
}

/// Where an iteration's seed came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOrigin {
    /// Configured on the command line
    Explicit,
    /// Taken from the model's seed list
    Listed,
    /// Drawn from the entropy source
    Drawn,
}

/// Seed for one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedChoice {
    pub seed: u64,
    pub origin: SeedOrigin,
}

/// Picks the seed for iteration `iteration`.
///
/// Priority: explicit seed, then `listed[iteration]` when in range, then a
/// fresh draw. The entropy source is only consulted in the last case.
pub fn select_seed<E: EntropySource + ?Sized>(
    explicit: Option<u64>,
    listed: Option<&[u64]>,
    iteration: usize,
    entropy: &mut E,
) -> SeedChoice {
    if let Some(seed) = explicit {
        return SeedChoice {
            seed,
            origin: SeedOrigin::Explicit,
        };
    }
    if let Some(&seed) = listed.and_then(|seeds| seeds.get(iteration)) {
        return SeedChoice {
            seed,
            origin: SeedOrigin::Listed,
        };
    }
    SeedChoice {
        seed: entropy.draw_seed(),
        origin: SeedOrigin::Drawn,
    }
}

/// What one model run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub model: String,
    pub iterations: usize,
    pub frames: usize,
    pub artifacts: Vec<PathBuf>,
    /// Seed used by each iteration, in order
    pub seeds: Vec<u64>,
    /// Master seed of the entropy source, when drawn seeds are reproducible
    pub master_seed: Option<u64>,
}

/// Drives an [`Interpreter`] through the configured iterations.
pub struct RunDriver<'a, I: Interpreter + ?Sized, E: EntropySource + ?Sized> {
    interpreter: &'a I,
    entropy: &'a mut E,
    /// Next animation frame number; starts at 0 for every driver
    frame_counter: u64,
}

impl<'a, I: Interpreter + ?Sized, E: EntropySource + ?Sized> RunDriver<'a, I, E> {
    pub fn new(interpreter: &'a I, entropy: &'a mut E) -> Self {
        Self {
            interpreter,
            entropy,
            frame_counter: 0,
        }
    }

    /// Runs every iteration of `model` and feeds the frames to `sink`.
    ///
    /// Each iteration's frame sequence is drained before the next seed is
    /// chosen. The first error aborts the run.
    pub fn run<S: FrameSink + ?Sized>(
        &mut self,
        model: &ModelDescriptor,
        config: &RunConfig,
        sink: &mut S,
    ) -> Result<RunSummary, RunError> {
        let interpreter = self.interpreter;
        let iterations = if config.animate { 1 } else { config.amount };
        let mut summary = RunSummary {
            model: model.name.clone(),
            master_seed: self.entropy.master_seed(),
            ..RunSummary::default()
        };
        if let Some(master) = summary.master_seed {
            debug!("{}: entropy master seed {}", model.name, master);
        }

        for k in 0..iterations {
            let choice = select_seed(config.seed, model.hints.seeds.as_deref(), k, self.entropy);
            debug!(
                "{} iteration {}: seed {} ({:?})",
                model.name, k, choice.seed, choice.origin
            );

            let frames = interpreter.run(model, choice.seed, config.steps, config.animate)?;

            for frame in frames {
                let name = if config.animate {
                    let name = ArtifactName::Sequence(self.frame_counter);
                    self.frame_counter += 1;
                    name
                } else {
                    ArtifactName::Seeded {
                        model: model.name.clone(),
                        seed: choice.seed,
                    }
                };

                if let Some(path) = sink.accept(frame, &name)? {
                    summary.artifacts.push(path);
                }
                summary.frames += 1;
            }

            sink.iteration_complete(k, choice.seed);
            summary.iterations += 1;
            summary.seeds.push(choice.seed);
        }

        info!(
            "{}: {} iterations, {} frames, {} artifacts",
            summary.model,
            summary.iterations,
            summary.frames,
            summary.artifacts.len()
        );
        Ok(summary)
    }
}
