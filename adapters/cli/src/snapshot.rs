//! JSON export of the decoded map.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use conga_map_core::{DecodedMap, Orientation};
use serde::Serialize;

/// Serialized form of a decoded map together with the orientation it was viewed at.
#[derive(Debug, Serialize)]
pub(crate) struct MapSnapshot<'a> {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) orientation: Orientation,
    #[serde(flatten)]
    pub(crate) map: &'a DecodedMap,
}

impl<'a> MapSnapshot<'a> {
    /// Captures `map` as viewed at `orientation`.
    pub(crate) fn new(map: &'a DecodedMap, orientation: Orientation) -> Self {
        Self {
            width: map.grid.width(),
            height: map.grid.height(),
            orientation,
            map,
        }
    }

    /// Writes the snapshot as pretty-printed JSON, creating parent directories.
    pub(crate) fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create snapshot directory {}", parent.display())
                })?;
            }
        }

        let file = File::create(path)
            .with_context(|| format!("failed to create snapshot at {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("failed to serialize snapshot to {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("failed to flush snapshot to {}", path.display()))
    }
}
