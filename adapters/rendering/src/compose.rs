//! Scene composition from a decoded map.

use conga_map_core::{
    BoundingBox, CanvasExtent, ChargerPosition, DecodedMap, GridPoint, MapGrid, Orientation,
    TrackPath,
};
use glam::Vec2;

use crate::{
    transform::{point_to_screen, to_screen},
    Scene, SceneCell,
};

/// Track stroke width relative to one grid cell, approximating the robot footprint.
pub const TRACK_WIDTH_IN_CELLS: f32 = 1.6;

/// Composes a renderer-ready scene.
///
/// The cell size is the largest square that fits the bounding box on the
/// canvas for the given orientation. An empty bounding box produces an empty
/// scene. Grid cells are visited directly, so the box never has to address
/// the grid.
#[must_use]
pub fn compose(
    grid: &MapGrid,
    bounds: BoundingBox,
    track: &TrackPath,
    charger: ChargerPosition,
    orientation: Orientation,
    canvas: CanvasExtent,
) -> Scene {
    if bounds.is_empty() {
        return Scene::default();
    }

    let canvas = Vec2::new(canvas.width() as f32, canvas.height() as f32);
    let cell_size = cell_size(bounds, orientation, canvas);
    let origin = Vec2::new(bounds.min_x() as f32, bounds.min_y() as f32);
    let centre = Vec2::splat(cell_size / 2.0);
    let local = |point: GridPoint| -> Vec2 {
        (Vec2::new(point.x() as f32, point.y() as f32) - origin) * cell_size
    };

    let cells = grid
        .mapped_cells()
        .filter(|(point, _)| bounds.contains(*point))
        .map(|(point, code)| SceneCell {
            code,
            rect: to_screen(local(point), cell_size, orientation, canvas),
        })
        .collect();

    let track_points: Vec<Vec2> = track
        .points()
        .iter()
        .map(|&point| point_to_screen(local(point) + centre, orientation, canvas))
        .collect();
    let robot = track_points.last().copied();
    let charger = charger
        .point()
        .map(|point| point_to_screen(local(point) + centre, orientation, canvas));

    Scene {
        cell_size,
        marker_radius: cell_size / 2.0,
        track_width: cell_size * TRACK_WIDTH_IN_CELLS,
        cells,
        track: track_points,
        robot,
        charger,
    }
}

/// Composes the scene for a decoded map.
#[must_use]
pub fn compose_decoded(map: &DecodedMap, orientation: Orientation, canvas: CanvasExtent) -> Scene {
    compose(
        &map.grid,
        map.bounds,
        &map.track,
        map.charger,
        orientation,
        canvas,
    )
}

fn cell_size(bounds: BoundingBox, orientation: Orientation, canvas: Vec2) -> f32 {
    let (across, down) = if orientation.is_transposed() {
        (bounds.rows(), bounds.columns())
    } else {
        (bounds.columns(), bounds.rows())
    };
    let scale_x = canvas.x / across as f32;
    let scale_y = canvas.y / down as f32;
    scale_x.min(scale_y)
}
