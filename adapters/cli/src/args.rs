//! Command-line arguments and their merge with the configuration file.

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser, Subcommand};
use conga_map_core::{CanvasExtent, Orientation};

use crate::config::ViewerConfig;

/// Renders Conga robot vacuum maps to SVG.
#[derive(Debug, Parser)]
#[command(name = "conga-map", version, about, long_about = None)]
pub(crate) struct CliArgs {
    /// Configuration file; `conga-map.toml` is used when present.
    #[arg(long, global = true, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) mode: Mode,
}

/// Operating modes.
#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Decodes one status document and writes a single frame.
    Render(Overrides),
    /// Polls the status document and redraws whenever the picture changes.
    ///
    /// Reads `cw`, `ccw`, `resize W H` and `quit` from standard input.
    Watch {
        #[command(flatten)]
        overrides: Overrides,

        /// Delay between two reads of the status document.
        #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
    },
}

/// Flags that take precedence over the configuration file.
#[derive(Clone, Debug, Default, Args)]
pub(crate) struct Overrides {
    /// Status document to read.
    #[arg(long, value_name = "FILE")]
    pub(crate) status: Option<PathBuf>,

    /// SVG file to write.
    #[arg(long, value_name = "FILE")]
    pub(crate) out: Option<PathBuf>,

    /// Initial rotation in degrees (0, 90, 180 or 270).
    #[arg(long, value_name = "DEGREES", value_parser = parse_orientation)]
    pub(crate) rotate: Option<Orientation>,

    /// Canvas width in screen units.
    #[arg(long)]
    pub(crate) width: Option<u32>,

    /// Canvas height in screen units.
    #[arg(long)]
    pub(crate) height: Option<u32>,

    /// Writes the decoded map as JSON to this file.
    #[arg(long, value_name = "FILE")]
    pub(crate) dump_json: Option<PathBuf>,
}

/// Effective settings after applying overrides to the configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Settings {
    pub(crate) status_path: PathBuf,
    pub(crate) svg_path: PathBuf,
    pub(crate) json_path: Option<PathBuf>,
    pub(crate) orientation: Orientation,
    pub(crate) canvas: CanvasExtent,
    pub(crate) poll_interval: Duration,
}

impl Settings {
    /// Merges configuration values with command-line overrides.
    pub(crate) fn resolve(
        config: ViewerConfig,
        overrides: Overrides,
        interval_ms: Option<u64>,
    ) -> Self {
        let configured = config.canvas_extent();
        let canvas = CanvasExtent::new(
            overrides.width.unwrap_or(configured.width()),
            overrides.height.unwrap_or(configured.height()),
        );
        let poll_interval =
            interval_ms.map_or_else(|| config.poll_interval(), Duration::from_millis);

        Self {
            status_path: overrides.status.unwrap_or(config.poll.status_path),
            svg_path: overrides.out.unwrap_or(config.output.svg_path),
            json_path: overrides.dump_json.or(config.output.json_path),
            orientation: overrides.rotate.unwrap_or(config.orientation),
            canvas,
            poll_interval,
        }
    }
}

fn parse_orientation(value: &str) -> Result<Orientation, String> {
    let degrees: u16 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{value}` is not a whole number of degrees"))?;
    Orientation::try_from(degrees).map_err(|error| error.to_string())
}
