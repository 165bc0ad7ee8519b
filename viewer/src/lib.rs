#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative viewer state for the Conga map display.
//!
//! All mutable display state lives in one [`Viewer`]: the orientation, the
//! canvas extent, the last-payload cache and the decoded map. The viewer is
//! single-writer; producers send [`Command`] values through whatever queue the
//! host uses and a single loop feeds them to [`apply`].

use conga_map_core::{CanvasExtent, Command, DecodedMap, Event, Orientation, StatusPayload};
use conga_map_system_ingest::{decode_payload, PayloadCache};
use tracing::{debug, info, warn};

const DEFAULT_CANVAS: CanvasExtent = CanvasExtent::new(800, 800);

/// Represents the complete viewer state.
#[derive(Debug)]
pub struct Viewer {
    orientation: Orientation,
    canvas: CanvasExtent,
    cache: PayloadCache,
    map: Option<DecodedMap>,
}

impl Viewer {
    /// Creates a viewer with no map, upright orientation and the default canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(Orientation::Deg0, DEFAULT_CANVAS)
    }

    /// Creates a viewer with an explicit initial orientation and canvas.
    #[must_use]
    pub fn with_settings(orientation: Orientation, canvas: CanvasExtent) -> Self {
        Self {
            orientation,
            canvas,
            cache: PayloadCache::new(),
            map: None,
        }
    }

    fn ingest(&mut self, payload: StatusPayload, out_events: &mut Vec<Event>) {
        if self.cache.is_unchanged(&payload) {
            debug!("status payload unchanged; skipping decode");
            out_events.push(Event::PayloadUnchanged);
            return;
        }
        if self.cache.is_known_rejected(&payload) {
            debug!("status payload was already rejected; skipping decode");
            out_events.push(Event::PayloadUnchanged);
            return;
        }

        match decode_payload(&payload) {
            Ok(Some(map)) => {
                let event = Event::MapReplaced {
                    width: map.grid.width(),
                    height: map.grid.height(),
                    bounds: map.bounds,
                    track_points: map.track.points().len(),
                };
                info!(
                    width = map.grid.width(),
                    height = map.grid.height(),
                    track_points = map.track.points().len(),
                    empty = map.bounds.is_empty(),
                    "map replaced"
                );
                self.map = Some(map);
                self.cache.store(payload);
                out_events.push(event);
            }
            Ok(None) => {
                debug!("status payload carries no map yet");
                self.cache.store(payload);
                out_events.push(Event::MapUnavailable);
            }
            Err(reason) => {
                warn!(%reason, "rejected status payload");
                self.cache.store_rejected(payload);
                out_events.push(Event::PayloadRejected { reason });
            }
        }
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the viewer, emitting resulting events.
pub fn apply(viewer: &mut Viewer, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Ingest { payload } => viewer.ingest(payload, out_events),
        Command::Rotate { direction } => {
            viewer.orientation = viewer.orientation.rotated(direction);
            info!(orientation = %viewer.orientation, "orientation changed");
            out_events.push(Event::OrientationChanged {
                orientation: viewer.orientation,
            });
        }
        Command::Resize { canvas } => {
            viewer.canvas = canvas;
            viewer.cache.invalidate();
            debug!(
                width = canvas.width(),
                height = canvas.height(),
                "canvas resized"
            );
            out_events.push(Event::CanvasResized { canvas });
        }
    }
}

/// Query functions that provide read-only access to the viewer state.
pub mod query {
    use super::Viewer;
    use conga_map_core::{CanvasExtent, DecodedMap, Orientation};
    use conga_map_rendering::{compose_decoded, Scene};

    /// Orientation currently applied to the scene.
    #[must_use]
    pub fn orientation(viewer: &Viewer) -> Orientation {
        viewer.orientation
    }

    /// Extent of the drawing surface.
    #[must_use]
    pub fn canvas(viewer: &Viewer) -> CanvasExtent {
        viewer.canvas
    }

    /// Most recently decoded map, if any payload carried one.
    #[must_use]
    pub fn decoded_map(viewer: &Viewer) -> Option<&DecodedMap> {
        viewer.map.as_ref()
    }

    /// Composes the scene for the current map, orientation and canvas.
    ///
    /// Without a decoded map the scene is empty.
    #[must_use]
    pub fn scene(viewer: &Viewer) -> Scene {
        let orientation = viewer.orientation;
        viewer
            .map
            .as_ref()
            .map(|map| compose_decoded(map, orientation, viewer.canvas))
            .unwrap_or_default()
    }
}
