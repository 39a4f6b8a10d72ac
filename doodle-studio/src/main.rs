//! # Doodle
//!
//! Command-line front end for Doodle surfaces and saved creations.

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use doodle_codec::{decode_bytes, write_png};
use doodle_core::{FillRequest, FillStatus, HistoryStore, Surface};
use doodle_studio::{creation_preview, CliArgs, Command, HistoryAction, Seed, StudioConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doodle=info,doodle_core=debug,doodle_studio=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let command = args.command.clone();
    let config = StudioConfig::from(args);

    tracing::debug!(
        "Surface config: {}x{}, brush {} {}px, tolerance {}",
        config.surface.width,
        config.surface.height,
        config.surface.brush.color,
        config.surface.brush.width,
        config.surface.tolerance
    );

    match command {
        Command::Fit { input, output } => fit(&config, &input, &output),
        Command::Fill {
            input,
            output,
            seeds,
        } => fill(&config, &input, &output, &seeds),
        Command::History { action } => history(&config, &action),
    }
}

fn load_source(path: &Path) -> anyhow::Result<doodle_core::SourceBitmap> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    decode_bytes(&bytes).with_context(|| format!("decoding {}", path.display()))
}

/// Letterbox `input` into a fresh surface and export it.
fn fit(config: &StudioConfig, input: &Path, output: &Path) -> anyhow::Result<()> {
    let source = load_source(input)?;
    let mut surface = Surface::new(config.surface)?;
    let placed = surface.load_image(source);
    let encoded = write_png(surface.buffer(), output)?;

    tracing::info!(
        "Fitted {} into {}x{} at {:?}, wrote {} bytes to {}",
        input.display(),
        encoded.width,
        encoded.height,
        placed,
        encoded.as_bytes().len(),
        output.display()
    );
    Ok(())
}

/// Load `input` as an editable page, fill at every seed and export.
fn fill(config: &StudioConfig, input: &Path, output: &Path, seeds: &[Seed]) -> anyhow::Result<()> {
    let source = load_source(input)?;
    let mut surface = Surface::new(config.surface)?;
    surface.load_page(source);

    let (tolerance, metric) = surface.tolerance();
    let color = surface.brush().color;
    for seed in seeds {
        let request = FillRequest::new(seed.x, seed.y, color, tolerance).with_metric(metric);
        let report = surface.fill(&request)?;
        match report.status {
            FillStatus::Filled => tracing::info!(
                "Filled {} pixels from ({}, {}) within {:?}",
                report.filled,
                seed.x,
                seed.y,
                report.bounds
            ),
            status => tracing::warn!("Fill at ({}, {}) skipped: {status:?}", seed.x, seed.y),
        }
    }

    write_png(surface.buffer(), output)?;
    tracing::info!("Wrote {}", output.display());
    Ok(())
}

fn history(config: &StudioConfig, action: &HistoryAction) -> anyhow::Result<()> {
    let dir = config
        .history_dir
        .as_ref()
        .context("no history directory: pass --history-dir or set DOODLE_HISTORY_DIR")?;
    let mut store = HistoryStore::open_dir(dir, config.history_capacity)?;

    match action {
        HistoryAction::List => {
            if store.is_empty() {
                println!("No saved creations");
            }
            for entry in store.entries() {
                let creation = &entry.creation;
                println!(
                    "{}\t{}\t{}\t{}",
                    entry.id,
                    creation.recognized_object,
                    if creation.story_theme.is_empty() {
                        "-"
                    } else {
                        creation.story_theme.as_str()
                    },
                    if creation.colored_image.is_some() {
                        "colored"
                    } else {
                        "page only"
                    }
                );
            }
        }
        HistoryAction::Show { id } => {
            let entry = store
                .get(*id)
                .with_context(|| format!("no creation with id {id}"))?;
            println!("{}", serde_json::to_string_pretty(entry)?);
        }
        HistoryAction::Preview { id, output, size } => {
            let entry = store
                .get(*id)
                .with_context(|| format!("no creation with id {id}"))?;
            let preview = creation_preview(&entry.creation, *size)?;
            std::fs::write(output, preview.as_bytes())
                .with_context(|| format!("writing {}", output.display()))?;
            tracing::info!(
                "Wrote {}x{} preview of creation {id} to {}",
                preview.width,
                preview.height,
                output.display()
            );
        }
        HistoryAction::Delete { id } => {
            let removed = store.delete(*id)?;
            tracing::info!(
                "Deleted creation {} ({})",
                removed.id,
                removed.creation.recognized_object
            );
        }
    }
    Ok(())
}
