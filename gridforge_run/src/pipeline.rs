//! The single orchestration path shared by single-model and batch mode.

use crate::config::{CliArgs, RunConfig};
use crate::driver::{RunDriver, RunSummary};
use crate::error::RunError;
use crate::router::OutputRouter;
use gridforge_core::{Interpreter, ModelDescriptor, Palette};
use gridforge_env::{ArtifactStore, EntropySource};
use std::io::Write;
use tracing::info;

/// Runs one loaded model to completion.
///
/// Layers the model's color overrides over `palette`, then drives every
/// iteration through an [`OutputRouter`]. Unless the run is a text dump,
/// every legend symbol must resolve to a color before the first iteration
/// starts.
pub fn run_model<I, E, S, W>(
    model: &ModelDescriptor,
    config: &RunConfig,
    palette: &Palette,
    interpreter: &I,
    entropy: &mut E,
    store: &mut S,
    out: W,
) -> Result<RunSummary, RunError>
where
    I: Interpreter + ?Sized,
    E: EntropySource + ?Sized,
    S: ArtifactStore,
    W: Write,
{
    let palette = palette.with_overrides(&model.colors);
    if !config.text_dump {
        palette.color_table(&model.legend)?;
    }

    info!(
        "▶ {} ({}D, {}, amount={}, steps={}{})",
        model.name,
        model.dimensions,
        model.extents,
        config.amount,
        config.steps,
        if config.animate { ", animated" } else { "" }
    );

    let mut router = OutputRouter::new(store, out, config, palette);
    RunDriver::new(interpreter, entropy).run(model, config, &mut router)
}

/// Single-model mode: loads the file named on the command line and runs it
/// with the CLI flags layered over its hints.
pub fn run_single<I, E, S, W>(
    cli: &CliArgs,
    palette: &Palette,
    interpreter: &I,
    entropy: &mut E,
    store: &mut S,
    out: W,
) -> Result<RunSummary, RunError>
where
    I: Interpreter + ?Sized,
    E: EntropySource + ?Sized,
    S: ArtifactStore,
    W: Write,
{
    let model = ModelDescriptor::load(&cli.model)?;
    let config = RunConfig::resolve(&model.name, &model.hints, Some(cli));
    run_model(&model, &config, palette, interpreter, entropy, store, out)
}
