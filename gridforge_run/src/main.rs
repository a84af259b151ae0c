//! Gridforge CLI
//!
//! With a model file: run it once (or `--amount` times). Without arguments:
//! run every model in the resource index.

use anyhow::Context;
use gridforge_core::{Palette, RewriteInterpreter};
use gridforge_env::{FsStore, OsEntropy};
use gridforge_run::config::DEFAULT_OUTPUT_DIR;
use gridforge_run::{run_batch, run_single, Invocation, Resources};
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout is reserved for the text dump
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let invocation = Invocation::parse(std::env::args().skip(1))?;
    if let Invocation::Help(text) = &invocation {
        print!("{}", text);
        return Ok(());
    }

    let resources = Resources::from_env();
    let palette_path = resources.palette_path();
    let palette = Palette::load(&palette_path)
        .with_context(|| format!("Cannot load default palette {}", palette_path.display()))?;
    info!("Loaded {} palette colors from {}", palette.len(), palette_path.display());

    let interpreter = RewriteInterpreter::new();
    let mut entropy = OsEntropy::new();
    let mut store = FsStore::new();

    match invocation {
        Invocation::Help(_) => Ok(()),
        Invocation::Single(cli) => {
            let stdout = std::io::stdout();
            let summary = run_single(
                &cli,
                &palette,
                &interpreter,
                &mut entropy,
                &mut store,
                stdout.lock(),
            )
            .with_context(|| format!("Model {} failed", cli.model.display()))?;
            info!(
                "✓ {} PASSED ({} artifacts)",
                summary.model,
                summary.artifacts.len()
            );
            Ok(())
        }
        Invocation::Batch => {
            let report = run_batch(
                &resources,
                Path::new(DEFAULT_OUTPUT_DIR),
                &palette,
                &interpreter,
                &mut entropy,
                &mut store,
            )?;

            if !report.is_success() {
                for failure in &report.failed {
                    error!("  - {}: {}", failure.model, failure.reason);
                }
                // Exit with proper code for CI
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
