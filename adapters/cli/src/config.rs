//! TOML configuration for the command-line viewer.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use conga_map_core::{CanvasExtent, Orientation};
use serde::Deserialize;

/// Configuration file consulted when `--config` is not given.
pub(crate) const DEFAULT_CONFIG_PATH: &str = "conga-map.toml";

/// Complete viewer configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ViewerConfig {
    /// Initial orientation in degrees.
    #[serde(default)]
    pub(crate) orientation: Orientation,
    #[serde(default)]
    pub(crate) canvas: CanvasConfig,
    #[serde(default)]
    pub(crate) poll: PollConfig,
    #[serde(default)]
    pub(crate) output: OutputConfig,
}

/// Drawing surface size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CanvasConfig {
    #[serde(default = "default_canvas_side")]
    pub(crate) width: u32,
    #[serde(default = "default_canvas_side")]
    pub(crate) height: u32,
}

/// Status polling settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PollConfig {
    /// Status document written by the device bridge.
    #[serde(default = "default_status_path")]
    pub(crate) status_path: PathBuf,
    /// Delay between two reads of the status document.
    #[serde(default = "default_interval_ms")]
    pub(crate) interval_ms: u64,
}

/// Output locations.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct OutputConfig {
    #[serde(default = "default_svg_path")]
    pub(crate) svg_path: PathBuf,
    /// Decoded map snapshot, written only when set.
    #[serde(default)]
    pub(crate) json_path: Option<PathBuf>,
}

impl ViewerConfig {
    /// Loads the configuration at `path`.
    pub(crate) fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Loads `path` when given, otherwise the default file if present, otherwise defaults.
    pub(crate) fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_PATH);
                if fallback.exists() {
                    Self::from_path(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parses configuration from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse configuration toml contents")?;
        if config.poll.interval_ms == 0 {
            bail!("poll.interval_ms must be at least 1");
        }
        Ok(config)
    }

    /// Canvas extent described by the `[canvas]` section.
    pub(crate) const fn canvas_extent(&self) -> CanvasExtent {
        CanvasExtent::new(self.canvas.width, self.canvas.height)
    }

    /// Poll interval described by the `[poll]` section.
    pub(crate) const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: default_canvas_side(),
            height: default_canvas_side(),
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            status_path: default_status_path(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            svg_path: default_svg_path(),
            json_path: None,
        }
    }
}

fn default_canvas_side() -> u32 {
    800
}
fn default_status_path() -> PathBuf {
    PathBuf::from("status.json")
}
fn default_interval_ms() -> u64 {
    1000
}
fn default_svg_path() -> PathBuf {
    PathBuf::from("output/map.svg")
}
