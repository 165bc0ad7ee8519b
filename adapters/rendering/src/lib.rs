#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Conga map adapters.
//!
//! Decoded maps are turned into a [`Scene`] by [`compose`]; backends implement
//! [`RenderingBackend`] to put scenes on a surface. Colours are a presentation
//! concern and live in [`Palette`], keyed by cell code.

pub mod compose;
pub mod transform;

pub use compose::{compose, compose_decoded, TRACK_WIDTH_IN_CELLS};
pub use transform::{point_to_screen, to_screen, ScreenRect};

use anyhow::Result as AnyResult;
use conga_map_core::{CanvasExtent, CellCode};
use glam::Vec2;
use std::{error::Error, fmt};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with the provided alpha.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Formats the RGB channels as a `#rrggbb` string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            channel_to_u8(self.red),
            channel_to_u8(self.green),
            channel_to_u8(self.blue)
        )
    }
}

fn channel_to_u8(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Colors used for each kind of scene element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Palette {
    /// Surface fill behind the map.
    pub background: Color,
    /// Wall cells.
    pub wall: Color,
    /// Floor cells.
    pub floor: Color,
    /// Cleaning track stroke.
    pub track: Color,
    /// Robot marker.
    pub robot: Color,
    /// Charger marker.
    pub charger: Color,
}

impl Palette {
    /// Color used to fill a cell with the provided code, `None` for unknown cells.
    #[must_use]
    pub const fn cell(&self, code: CellCode) -> Option<Color> {
        match code {
            CellCode::Wall => Some(self.wall),
            CellCode::Floor => Some(self.floor),
            CellCode::Unknown => None,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::from_rgb_u8(255, 255, 255),
            wall: Color::from_rgb_u8(86, 94, 107),
            floor: Color::from_rgb_u8(203, 226, 244),
            track: Color::from_rgb_u8(86, 180, 233).with_alpha(0.6),
            robot: Color::from_rgb_u8(230, 159, 0),
            charger: Color::from_rgb_u8(0, 158, 115),
        }
    }
}

/// Single mapped cell placed on the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneCell {
    /// Cell code used for color selection.
    pub code: CellCode,
    /// Screen rectangle with signed extents.
    pub rect: ScreenRect,
}

/// Renderer-ready description of one frame.
///
/// Scenes are derived data: they are recomputed whenever the map, the
/// orientation or the canvas changes and are never persisted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    /// Side length of one grid cell in screen units.
    pub cell_size: f32,
    /// Radius of the robot and charger markers.
    pub marker_radius: f32,
    /// Stroke width of the track polyline.
    pub track_width: f32,
    /// Mapped cells within the bounding box.
    pub cells: Vec<SceneCell>,
    /// Track polyline in screen coordinates, in travel order.
    pub track: Vec<Vec2>,
    /// Robot marker at the last track point.
    pub robot: Option<Vec2>,
    /// Charger marker when the dock position is known.
    pub charger: Option<Vec2>,
}

impl Scene {
    /// Reports whether the scene has nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty() && self.track.is_empty() && self.charger.is_none()
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title attached to the rendered surface.
    pub title: String,
    /// Size of the drawing surface.
    pub canvas: CanvasExtent,
    /// Colors applied to scene elements.
    pub palette: Palette,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(title: T, canvas: CanvasExtent, palette: Palette, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            title: title.into(),
            canvas,
            palette,
            scene,
        }
    }
}

/// Rendering surface capable of presenting map scenes.
pub trait RenderingBackend {
    /// Draws the presentation, replacing whatever the surface showed before.
    fn present(&mut self, presentation: &Presentation) -> AnyResult<()>;
}

/// Validates that a canvas has a drawable area.
pub fn validate_canvas(canvas: CanvasExtent) -> Result<CanvasExtent, RenderingError> {
    if canvas.width() == 0 || canvas.height() == 0 {
        return Err(RenderingError::EmptyCanvas {
            width: canvas.width(),
            height: canvas.height(),
        });
    }
    Ok(canvas)
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// Both canvas dimensions must be positive to place any cell.
    EmptyCanvas {
        /// Provided canvas width.
        width: u32,
        /// Provided canvas height.
        height: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyCanvas { width, height } => {
                write!(
                    f,
                    "canvas must have a positive width and height (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canvas_validation_accepts_positive_extent() {
        let canvas = validate_canvas(CanvasExtent::new(640, 480)).expect("valid canvas");
        assert_eq!(canvas.width(), 640);
    }

    #[test]
    fn canvas_validation_rejects_zero_dimension_without_panicking() {
        let error = validate_canvas(CanvasExtent::new(640, 0)).expect_err("zero height");
        assert_eq!(
            error,
            RenderingError::EmptyCanvas {
                width: 640,
                height: 0
            }
        );
    }

    #[test]
    fn color_formats_as_hex() {
        assert_eq!(Color::from_rgb_u8(230, 159, 0).to_hex(), "#e69f00");
        assert_eq!(Color::new(2.0, -1.0, 0.5, 1.0).to_hex(), "#ff0080");
    }

    #[test]
    fn palette_skips_unknown_cells() {
        let palette = Palette::default();
        assert_eq!(palette.cell(CellCode::Wall), Some(palette.wall));
        assert_eq!(palette.cell(CellCode::Floor), Some(palette.floor));
        assert_eq!(palette.cell(CellCode::Unknown), None);
    }

    #[test]
    fn default_scene_is_empty() {
        assert!(Scene::default().is_empty());
    }
}
