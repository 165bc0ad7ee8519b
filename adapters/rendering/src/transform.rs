//! Orientation-aware mapping from local map space to screen space.

use conga_map_core::Orientation;
use glam::Vec2;

/// Axis-aligned screen rectangle anchored at `origin`.
///
/// Extents are signed: a negative component grows the rectangle left or up
/// from the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenRect {
    /// Anchor corner in screen units.
    pub origin: Vec2,
    /// Signed width and height.
    pub extent: Vec2,
}

impl ScreenRect {
    /// Creates a rectangle from an anchor and signed extents.
    #[must_use]
    pub const fn new(origin: Vec2, extent: Vec2) -> Self {
        Self { origin, extent }
    }

    /// Returns the same area anchored at its top-left corner with non-negative extents.
    #[must_use]
    pub fn normalized(self) -> Self {
        let far = self.origin + self.extent;
        Self {
            origin: self.origin.min(far),
            extent: self.extent.abs(),
        }
    }

    /// Unsigned area covered by the rectangle.
    #[must_use]
    pub fn area(&self) -> f32 {
        (self.extent.x * self.extent.y).abs()
    }
}

/// Maps a local offset and square extent onto the screen for `orientation`.
///
/// `local` is measured from the top-left of the unrotated map, `extent` is the
/// already-scaled side length (zero for points) and `canvas` is the size of the
/// drawing surface. Every rendered element goes through this one mapping so
/// the whole scene rotates together.
#[must_use]
pub fn to_screen(local: Vec2, extent: f32, orientation: Orientation, canvas: Vec2) -> ScreenRect {
    match orientation {
        Orientation::Deg0 => ScreenRect::new(local, Vec2::new(extent, extent)),
        Orientation::Deg90 => ScreenRect::new(
            Vec2::new(canvas.x - local.y, local.x),
            Vec2::new(-extent, extent),
        ),
        Orientation::Deg180 => ScreenRect::new(
            Vec2::new(canvas.x - local.x, canvas.y - local.y),
            Vec2::new(-extent, -extent),
        ),
        Orientation::Deg270 => ScreenRect::new(
            Vec2::new(local.y, canvas.y - local.x),
            Vec2::new(extent, -extent),
        ),
    }
}

/// Maps a point (a zero-extent rectangle) onto the screen.
#[must_use]
pub fn point_to_screen(local: Vec2, orientation: Orientation, canvas: Vec2) -> Vec2 {
    to_screen(local, 0.0, orientation, canvas).origin
}
