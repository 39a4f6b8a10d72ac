//! # Doodle Studio
//!
//! Wires a sketch surface and a coloring surface into the creative
//! pipeline: recognize the sketch, turn it into a coloring page, write and
//! narrate a story about it, and keep the last few creations.
//!
//! ## Usage
//!
//! ```bash
//! # Letterbox a photo into a 300x250 surface
//! doodle fit photo.jpg -o fitted.png
//!
//! # Color a page: load it editable, fill at two points, export
//! doodle --brush-color '#ffcc00' fill page.png --at 120,80 --at 40,200 -o colored.png
//!
//! # Browse saved creations
//! DOODLE_HISTORY_DIR=~/.doodle doodle history list
//! DOODLE_HISTORY_DIR=~/.doodle doodle history preview 1700000000000 -o thumb.png
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `StudioConfig` - Surface size, brush, fill tolerance and history settings
//! - `Studio` - Owns both surfaces and drives the pipeline
//! - `collab` - Traits for the generative services the pipeline calls

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod collab;
mod studio;

pub use collab::{
    CollabError, Illustrator, Narrator, PageGenerator, Recognizer, Service, StoryWriter,
};
pub use studio::{creation_preview, Story, Studio, StudioError, PREVIEW_SIZE};

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use doodle_core::history::DEFAULT_CAPACITY;
use doodle_core::{Brush, Rgba, SurfaceConfig, ToleranceMetric};

/// Command-line arguments for the `doodle` binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "doodle")]
#[command(about = "Sketch, color and story tools for Doodle surfaces")]
#[command(version)]
pub struct CliArgs {
    /// Surface width in pixels
    #[arg(long, env = "DOODLE_WIDTH", default_value = "300")]
    pub width: u32,

    /// Surface height in pixels
    #[arg(long, env = "DOODLE_HEIGHT", default_value = "250")]
    pub height: u32,

    /// Brush and fill color as #rrggbb
    #[arg(long, default_value = "#000000")]
    pub brush_color: Rgba,

    /// Brush width in pixels
    #[arg(long, default_value = "5")]
    pub brush_width: f32,

    /// Flood fill tolerance
    #[arg(long, default_value = "32")]
    pub tolerance: u16,

    /// How flood fill measures color distance
    #[arg(long, value_enum, default_value_t = MetricArg::Euclidean)]
    pub metric: MetricArg,

    /// Directory holding the creation history
    #[arg(long, env = "DOODLE_HISTORY_DIR")]
    pub history_dir: Option<PathBuf>,

    /// Number of creations to keep
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    pub history_capacity: usize,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands of the `doodle` binary.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Aspect-fit an image into a surface and export it as PNG
    Fit {
        /// Input image (PNG, JPEG or WebP)
        input: PathBuf,
        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Load an image as an editable coloring page, flood fill it and export
    Fill {
        /// Input image (PNG, JPEG or WebP)
        input: PathBuf,
        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
        /// Seed point as `x,y` in surface pixels; repeatable
        #[arg(long = "at", required = true)]
        seeds: Vec<Seed>,
    },
    /// Inspect saved creations
    History {
        /// History action
        #[command(subcommand)]
        action: HistoryAction,
    },
}

/// History subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum HistoryAction {
    /// List saved creations, newest first
    List,
    /// Print one creation as JSON
    Show {
        /// Creation id
        id: u64,
    },
    /// Write a small PNG preview of one creation
    Preview {
        /// Creation id
        id: u64,
        /// Output PNG path
        #[arg(short, long)]
        output: PathBuf,
        /// Longest side of the preview in pixels
        #[arg(long, default_value_t = PREVIEW_SIZE)]
        size: u32,
    },
    /// Delete one creation
    Delete {
        /// Creation id
        id: u64,
    },
}

/// Fill tolerance metric as a CLI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricArg {
    /// Squared RGBA distance against tolerance squared
    Euclidean,
    /// Largest RGB channel difference against tolerance
    PerChannel,
}

impl From<MetricArg> for ToleranceMetric {
    fn from(metric: MetricArg) -> Self {
        match metric {
            MetricArg::Euclidean => Self::EuclideanRgba,
            MetricArg::PerChannel => Self::PerChannelRgb,
        }
    }
}

/// A fill seed given on the command line as `x,y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed {
    /// Seed X coordinate.
    pub x: u32,
    /// Seed Y coordinate.
    pub y: u32,
}

impl FromStr for Seed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected x,y but got '{s}'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|e| format!("invalid coordinate '{v}': {e}"))
        };
        Ok(Self {
            x: parse(x)?,
            y: parse(y)?,
        })
    }
}

/// Studio configuration.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Settings shared by the sketch and coloring surfaces.
    pub surface: SurfaceConfig,
    /// Number of creations kept in history.
    pub history_capacity: usize,
    /// Where history is persisted. In-memory when unset.
    pub history_dir: Option<PathBuf>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl StudioConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            surface: SurfaceConfig::default(),
            history_capacity: DEFAULT_CAPACITY,
            history_dir: None,
        }
    }
}

impl From<CliArgs> for StudioConfig {
    fn from(args: CliArgs) -> Self {
        Self {
            surface: SurfaceConfig {
                width: args.width,
                height: args.height,
                brush: Brush::new(args.brush_color, args.brush_width),
                tolerance: args.tolerance,
                metric: args.metric.into(),
                ..SurfaceConfig::default()
            },
            history_capacity: args.history_capacity,
            history_dir: args.history_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StudioConfig::default();
        assert_eq!((config.surface.width, config.surface.height), (300, 250));
        assert_eq!(config.surface.brush, Brush::default());
        assert_eq!(config.surface.tolerance, 32);
        assert_eq!(config.history_capacity, 5);
        assert!(config.history_dir.is_none());
    }

    #[test]
    fn test_cli_to_config() {
        let args = CliArgs::try_parse_from([
            "doodle",
            "--width",
            "640",
            "--brush-color",
            "#ff8800",
            "--metric",
            "per-channel",
            "fill",
            "page.png",
            "-o",
            "out.png",
            "--at",
            "10,20",
            "--at",
            "3, 4",
        ])
        .unwrap();

        let Command::Fill { ref seeds, .. } = args.command else {
            panic!("expected fill command");
        };
        assert_eq!(seeds, &vec![Seed { x: 10, y: 20 }, Seed { x: 3, y: 4 }]);

        let config = StudioConfig::from(args);
        assert_eq!(config.surface.width, 640);
        assert_eq!(config.surface.brush.color, Rgba::rgb(255, 136, 0));
        assert_eq!(config.surface.metric, ToleranceMetric::PerChannelRgb);
    }

    #[test]
    fn test_seed_parse_errors() {
        assert!("10".parse::<Seed>().is_err());
        assert!("a,b".parse::<Seed>().is_err());
        assert!("-1,2".parse::<Seed>().is_err());
    }

    #[test]
    fn test_history_preview_defaults() {
        let args = CliArgs::try_parse_from(["doodle", "history", "preview", "7", "-o", "t.png"])
            .unwrap();
        let Command::History {
            action: HistoryAction::Preview { id, size, .. },
        } = args.command
        else {
            panic!("expected history preview");
        };
        assert_eq!((id, size), (7, PREVIEW_SIZE));
    }

    #[test]
    fn test_history_subcommand() {
        let args =
            CliArgs::try_parse_from(["doodle", "history", "delete", "1700000000000"]).unwrap();
        assert!(matches!(
            args.command,
            Command::History {
                action: HistoryAction::Delete { id: 1_700_000_000_000 }
            }
        ));
    }
}
