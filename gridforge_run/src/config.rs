//! Run configuration: CLI parsing and resolution against model hints.
//!
//! Precedence for every setting is CLI flag > model run hint > default.
//! Switches (`--gif`, `--iso`, `--stdout`) can only turn a setting on.

use crate::error::ConfigError;
use clap::error::ErrorKind;
use clap::{Arg, Command, CommandFactory, Parser};
use gridforge_core::RunHints;
use std::path::PathBuf;
use tracing::warn;

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default step budget for a normal run
pub const DEFAULT_STEPS: usize = 50_000;

/// Default step budget for an animated run
pub const DEFAULT_ANIMATION_STEPS: usize = 1_000;

/// Default iteration count
pub const DEFAULT_AMOUNT: usize = 1;

/// Default raster scale (pixels per cell)
pub const DEFAULT_PIXEL_SIZE: u32 = 4;

/// Gridforge batch driver CLI
#[derive(Parser, Debug)]
#[command(name = "gridforge")]
#[command(about = "Run grid-rewriting models and save their artifacts", long_about = None)]
#[command(after_help = "Run without arguments to execute every model in the resource index.")]
struct Args {
    /// Model file to run
    model: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fixed seed for every iteration
    #[arg(short, long)]
    seed: Option<u64>,

    /// Step budget (0 = until the rules are exhausted)
    #[arg(long)]
    steps: Option<usize>,

    /// Number of iterations
    #[arg(long)]
    amount: Option<usize>,

    /// Pixels per cell in raster output
    #[arg(long = "pixelsize")]
    pixel_size: Option<u32>,

    /// Save every step as a numbered frame
    #[arg(long)]
    gif: bool,

    /// Render 3D grids as isometric images instead of voxel files
    #[arg(long)]
    iso: bool,

    /// Write grids to standard output as text instead of files
    #[arg(long)]
    stdout: bool,
}

/// Flags given on the command line for a single model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub model: PathBuf,
    pub output: Option<PathBuf>,
    pub seed: Option<u64>,
    pub steps: Option<usize>,
    pub amount: Option<usize>,
    pub pixel_size: Option<u32>,
    pub animate: bool,
    pub isometric: bool,
    pub text_dump: bool,
}

/// What the process was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Print usage and exit
    Help(String),
    /// Run every model in the resource index
    Batch,
    /// Run one model file
    Single(CliArgs),
}

impl Invocation {
    /// Parses raw tokens (program name excluded).
    ///
    /// Unknown flags, and flags missing their value, are dropped before
    /// parsing. If nothing is left, batch mode is selected.
    pub fn parse<I, S>(tokens: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        if tokens.is_empty() {
            return Ok(Invocation::Batch);
        }

        let kept = sanitize(&tokens);
        if kept.is_empty() {
            // Nothing recognizable: same as no arguments
            return Ok(Invocation::Batch);
        }
        let argv = std::iter::once("gridforge".to_string()).chain(kept);
        let args = match Args::try_parse_from(argv) {
            Ok(args) => args,
            Err(e) if e.kind() == ErrorKind::DisplayHelp => {
                return Ok(Invocation::Help(e.to_string()));
            }
            Err(e) => return Err(ConfigError::Cli(e.to_string())),
        };

        let model = args.model.ok_or(ConfigError::MissingModel)?;
        Ok(Invocation::Single(CliArgs {
            model,
            output: args.output,
            seed: args.seed,
            steps: args.steps,
            amount: args.amount,
            pixel_size: args.pixel_size,
            animate: args.gif,
            isometric: args.iso,
            text_dump: args.stdout,
        }))
    }
}

/// Finds the argument a flag token names, and whether the token already
/// carries its value (`--seed=7`, `-s7`, `-s=7`).
fn lookup<'c>(cmd: &'c Command, token: &str) -> Option<(&'c Arg, bool)> {
    if let Some(long) = token.strip_prefix("--") {
        let (name, attached) = match long.split_once('=') {
            Some((name, _)) => (name, true),
            None => (long, false),
        };
        return cmd
            .get_arguments()
            .find(|a| a.get_long() == Some(name))
            .map(|a| (a, attached));
    }
    let mut chars = token[1..].chars();
    let short = chars.next()?;
    let attached = chars.next().is_some();
    cmd.get_arguments()
        .find(|a| a.get_short() == Some(short))
        .map(|a| (a, attached))
}

/// Drops unknown flags and value-taking flags without a following value.
fn sanitize(tokens: &[String]) -> Vec<String> {
    let mut cmd = Args::command();
    cmd.build();

    let mut kept = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if !token.starts_with('-') || token == "-" {
            kept.push(token.clone());
            i += 1;
            continue;
        }

        let Some((arg, attached)) = lookup(&cmd, token) else {
            warn!("Ignoring unknown flag {}", token);
            i += 1;
            continue;
        };

        let takes_value = arg.get_action().takes_values();
        if attached && !takes_value {
            warn!("Ignoring {}: the flag takes no value", token);
            i += 1;
            continue;
        }
        if attached || !takes_value {
            kept.push(token.clone());
            i += 1;
            continue;
        }

        match tokens.get(i + 1) {
            Some(value) if !value.starts_with('-') => {
                kept.push(token.clone());
                kept.push(value.clone());
                i += 2;
            }
            _ => {
                warn!("Ignoring {} without a value", token);
                i += 1;
            }
        }
    }
    kept
}

/// Normalized, immutable configuration for one model run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub model_name: String,
    pub output_dir: PathBuf,
    /// Explicit seed applied to every iteration
    pub seed: Option<u64>,
    pub steps: usize,
    /// Iteration count; always 1 when animating
    pub amount: usize,
    pub pixel_size: u32,
    pub animate: bool,
    pub isometric: bool,
    pub text_dump: bool,
}

impl RunConfig {
    /// Merges CLI flags (if any) over the model's run hints.
    ///
    /// Batch mode passes `cli = None`; the text dump is only reachable from
    /// the command line.
    pub fn resolve(model_name: &str, hints: &RunHints, cli: Option<&CliArgs>) -> Self {
        let animate = cli.map_or(false, |c| c.animate) || hints.animate.unwrap_or(false);
        let isometric = cli.map_or(false, |c| c.isometric) || hints.isometric.unwrap_or(false);
        let text_dump = cli.map_or(false, |c| c.text_dump);

        let default_steps = if animate {
            DEFAULT_ANIMATION_STEPS
        } else {
            DEFAULT_STEPS
        };
        let steps = cli
            .and_then(|c| c.steps)
            .or(hints.steps)
            .unwrap_or(default_steps);

        let amount = if animate {
            1
        } else {
            cli.and_then(|c| c.amount)
                .or(hints.amount)
                .unwrap_or(DEFAULT_AMOUNT)
        };

        let pixel_size = cli
            .and_then(|c| c.pixel_size)
            .or(hints.pixel_size)
            .unwrap_or(DEFAULT_PIXEL_SIZE);

        let output_dir = cli
            .and_then(|c| c.output.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        Self {
            model_name: model_name.to_string(),
            output_dir,
            seed: cli.and_then(|c| c.seed),
            steps,
            amount,
            pixel_size,
            animate,
            isometric,
            text_dump,
        }
    }

    /// Sets the output directory. Batch mode writes every model to one place.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}
