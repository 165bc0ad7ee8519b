use base64::{engine::general_purpose::STANDARD, Engine as _};
use conga_map_core::{
    BoundingBox, CanvasExtent, Command, CorruptPayload, Event, Orientation, RotationDirection,
    StatusPayload,
};
use conga_map_viewer::{self as viewer, query, Viewer};

const SAMPLE_MAP: &str = "AAAAAAAAZABk0vwAaoDXAGpA1wBqgNcAqNL8AA==";
const SAMPLE_TRACK: &str = "AQAEADIxMzExMTEy";

fn sample_payload() -> StatusPayload {
    StatusPayload::new(SAMPLE_MAP, SAMPLE_TRACK, "-1,-1")
}

fn ingest(viewer: &mut Viewer, payload: StatusPayload) -> Vec<Event> {
    let mut events = Vec::new();
    viewer::apply(viewer, Command::Ingest { payload }, &mut events);
    events
}

fn rotate(viewer: &mut Viewer, direction: RotationDirection) -> Vec<Event> {
    let mut events = Vec::new();
    viewer::apply(viewer, Command::Rotate { direction }, &mut events);
    events
}

#[test]
fn first_payload_replaces_the_map() {
    let mut viewer = Viewer::new();
    let events = ingest(&mut viewer, sample_payload());

    assert_eq!(
        events,
        vec![Event::MapReplaced {
            width: 100,
            height: 100,
            bounds: BoundingBox::new(48, 48, 52, 51),
            track_points: 4,
        }]
    );
    assert!(query::decoded_map(&viewer).is_some());
    assert!(events.iter().all(Event::requires_redraw));
}

#[test]
fn identical_payload_is_skipped() {
    let mut viewer = Viewer::new();
    let _ = ingest(&mut viewer, sample_payload());
    let events = ingest(&mut viewer, sample_payload());

    assert_eq!(events, vec![Event::PayloadUnchanged]);
    assert!(!events[0].requires_redraw());
}

#[test]
fn resize_forces_the_next_payload_to_decode() {
    let mut viewer = Viewer::new();
    let _ = ingest(&mut viewer, sample_payload());

    let mut events = Vec::new();
    let canvas = CanvasExtent::new(320, 240);
    viewer::apply(&mut viewer, Command::Resize { canvas }, &mut events);
    assert_eq!(events, vec![Event::CanvasResized { canvas }]);
    assert_eq!(query::canvas(&viewer), canvas);

    let events = ingest(&mut viewer, sample_payload());
    assert!(matches!(events.as_slice(), [Event::MapReplaced { .. }]));
}

#[test]
fn orientation_survives_map_replacement_and_resize() {
    let mut viewer = Viewer::new();
    let events = rotate(&mut viewer, RotationDirection::Clockwise);
    assert_eq!(
        events,
        vec![Event::OrientationChanged {
            orientation: Orientation::Deg90
        }]
    );

    let _ = ingest(&mut viewer, sample_payload());
    let mut events = Vec::new();
    viewer::apply(
        &mut viewer,
        Command::Resize {
            canvas: CanvasExtent::new(100, 100),
        },
        &mut events,
    );
    let _ = ingest(&mut viewer, StatusPayload::new(SAMPLE_MAP, "", "50,50"));

    assert_eq!(query::orientation(&viewer), Orientation::Deg90);
}

#[test]
fn four_clockwise_rotations_return_upright() {
    let mut viewer = Viewer::new();
    for _ in 0..4 {
        let _ = rotate(&mut viewer, RotationDirection::Clockwise);
    }
    assert_eq!(query::orientation(&viewer), Orientation::Deg0);

    let _ = rotate(&mut viewer, RotationDirection::CounterClockwise);
    assert_eq!(query::orientation(&viewer), Orientation::Deg270);
}

#[test]
fn corrupt_payload_keeps_the_previous_map() {
    let mut viewer = Viewer::new();
    let _ = ingest(&mut viewer, sample_payload());

    let zero_width = STANDARD.encode([0, 0, 0, 0, 0, 0, 0, 0, 1, 0x55]);
    let events = ingest(&mut viewer, StatusPayload::new(zero_width, "", ""));

    assert_eq!(
        events,
        vec![Event::PayloadRejected {
            reason: CorruptPayload::ZeroWidth
        }]
    );
    let map = query::decoded_map(&viewer).expect("previous map kept");
    assert_eq!(map.grid.width(), 100);

    let events = ingest(&mut viewer, sample_payload());
    assert_eq!(events, vec![Event::PayloadUnchanged]);
}

#[test]
fn repeated_corrupt_payload_is_skipped_quietly() {
    let mut viewer = Viewer::new();
    let _ = ingest(&mut viewer, sample_payload());
    let corrupt = StatusPayload::new("not base64!", "", "");

    let first = ingest(&mut viewer, corrupt.clone());
    assert!(matches!(
        first.as_slice(),
        [Event::PayloadRejected {
            reason: CorruptPayload::InvalidEncoding { .. }
        }]
    ));

    let second = ingest(&mut viewer, corrupt.clone());
    assert_eq!(second, vec![Event::PayloadUnchanged]);
    assert_eq!(
        query::decoded_map(&viewer).map(|map| map.grid.width()),
        Some(100)
    );

    let mut events = Vec::new();
    viewer::apply(
        &mut viewer,
        Command::Resize {
            canvas: CanvasExtent::new(640, 480),
        },
        &mut events,
    );
    let after_resize = ingest(&mut viewer, corrupt);
    assert!(matches!(
        after_resize.as_slice(),
        [Event::PayloadRejected { .. }]
    ));
}

#[test]
fn empty_map_field_is_reported_as_unavailable() {
    let mut viewer = Viewer::new();
    let events = ingest(&mut viewer, StatusPayload::new("", "", ""));

    assert_eq!(events, vec![Event::MapUnavailable]);
    assert!(query::decoded_map(&viewer).is_none());
    assert!(query::scene(&viewer).is_empty());
}

#[test]
fn scene_reflects_current_orientation() {
    let mut viewer = Viewer::with_settings(Orientation::Deg0, CanvasExtent::new(500, 400));
    let _ = ingest(&mut viewer, sample_payload());
    let upright = query::scene(&viewer);

    // Box spans five columns and four rows: 500/5 and 400/4 both give 100.
    assert!((upright.cell_size - 100.0).abs() < f32::EPSILON);
    assert_eq!(upright.cells.len(), 18);
    assert_eq!(upright.track.len(), 4);
    assert!(upright.charger.is_none());

    let _ = rotate(&mut viewer, RotationDirection::Clockwise);
    let rotated = query::scene(&viewer);
    assert!((rotated.cell_size - 80.0).abs() < f32::EPSILON);
    assert_eq!(rotated.cells.len(), upright.cells.len());
    assert_ne!(rotated.robot, upright.robot);
}

#[test]
fn unmapped_payload_composes_an_empty_scene() {
    let mut viewer = Viewer::new();
    let blank = STANDARD.encode([0, 0, 0, 0, 0, 0, 4, 0, 1, 0x00]);
    let events = ingest(&mut viewer, StatusPayload::new(blank, SAMPLE_TRACK, "-1,-1"));

    assert!(matches!(
        events.as_slice(),
        [Event::MapReplaced { bounds, .. }] if bounds.is_empty()
    ));
    assert!(query::scene(&viewer).is_empty());
}
