#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! SVG-file rendering adapter for Conga map scenes.
//!
//! Each call to [`RenderingBackend::present`] rewrites the target file with a
//! complete document, layered background, cells, track and markers.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use conga_map_rendering::{Color, Palette, Presentation, RenderingBackend, Scene};
use glam::Vec2;
use svg::{
    node::element::{Circle, Group, Polyline, Rectangle},
    Document,
};
use tracing::debug;

/// Rendering backend that writes every presentation to an SVG file.
#[derive(Debug)]
pub struct SvgBackend {
    output_path: PathBuf,
    frames_written: u64,
}

impl SvgBackend {
    /// Creates a backend that writes to `output_path`.
    #[must_use]
    pub fn new<P>(output_path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            output_path: output_path.into(),
            frames_written: 0,
        }
    }

    /// Path the backend writes to.
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Number of frames written so far.
    #[must_use]
    pub const fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl RenderingBackend for SvgBackend {
    fn present(&mut self, presentation: &Presentation) -> Result<()> {
        let document = render_document(presentation);

        if let Some(parent) = self.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory {}", parent.display())
                })?;
            }
        }

        svg::save(&self.output_path, &document)
            .with_context(|| format!("failed to write SVG to {}", self.output_path.display()))?;
        self.frames_written += 1;
        debug!(
            path = %self.output_path.display(),
            cells = presentation.scene.cells.len(),
            track_points = presentation.scene.track.len(),
            "wrote SVG frame"
        );
        Ok(())
    }
}

/// Builds the SVG document for a presentation.
#[must_use]
pub fn render_document(presentation: &Presentation) -> Document {
    let width = presentation.canvas.width();
    let height = presentation.canvas.height();
    let palette = &presentation.palette;
    let scene = &presentation.scene;

    Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0, 0, width, height))
        .set("aria-label", presentation.title.as_str())
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height)
                .set("fill", palette.background.to_hex()),
        )
        .add(render_cells(scene, palette))
        .add(render_track(scene, palette))
        .add(render_markers(scene, palette))
}

fn render_cells(scene: &Scene, palette: &Palette) -> Group {
    let mut group = Group::new().set("id", "cells");
    for cell in &scene.cells {
        let Some(color) = palette.cell(cell.code) else {
            continue;
        };
        let rect = cell.rect.normalized();
        group = group.add(fill(
            Rectangle::new()
                .set("x", rect.origin.x)
                .set("y", rect.origin.y)
                .set("width", rect.extent.x)
                .set("height", rect.extent.y),
            color,
        ));
    }
    group
}

fn render_track(scene: &Scene, palette: &Palette) -> Group {
    let group = Group::new().set("id", "track");
    if scene.track.len() < 2 {
        return group;
    }

    group.add(
        Polyline::new()
            .set("points", polyline_points(&scene.track))
            .set("fill", "none")
            .set("stroke", palette.track.to_hex())
            .set("stroke-opacity", palette.track.alpha)
            .set("stroke-width", scene.track_width)
            .set("stroke-linecap", "round")
            .set("stroke-linejoin", "round"),
    )
}

fn render_markers(scene: &Scene, palette: &Palette) -> Group {
    let mut group = Group::new().set("id", "markers");
    if let Some(charger) = scene.charger {
        group = group.add(marker(charger, scene.marker_radius, palette.charger));
    }
    if let Some(robot) = scene.robot {
        group = group.add(marker(robot, scene.marker_radius, palette.robot));
    }
    group
}

fn marker(centre: Vec2, radius: f32, color: Color) -> Circle {
    Circle::new()
        .set("cx", centre.x)
        .set("cy", centre.y)
        .set("r", radius)
        .set("fill", color.to_hex())
        .set("fill-opacity", color.alpha)
}

fn fill(rect: Rectangle, color: Color) -> Rectangle {
    rect.set("fill", color.to_hex())
        .set("fill-opacity", color.alpha)
}

fn polyline_points(points: &[Vec2]) -> String {
    points
        .iter()
        .map(|point| format!("{},{}", point.x, point.y))
        .collect::<Vec<_>>()
        .join(" ")
}
