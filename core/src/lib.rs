#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Conga map viewer.
//!
//! This crate defines the data that flows between the decoders, the viewer
//! state and the rendering adapters. Producers submit [`Command`] values to
//! the viewer, the viewer applies them through its `apply` entry point and
//! reports what happened as [`Event`] values. Decoded maps are described by
//! [`MapGrid`], [`BoundingBox`], [`TrackPath`] and [`ChargerPosition`], all of
//! which are immutable once built.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of opaque header bytes preceding the coordinate pairs of a track payload.
pub const TRACK_HEADER_LEN: usize = 4;

/// Byte offset at which the run-length encoded cell stream of a map payload starts.
pub const MAP_DATA_OFFSET: usize = 9;

/// State of a single map cell as reported by the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellCode {
    /// The device has not observed the cell.
    Unknown,
    /// The cell is blocked by an obstacle.
    Wall,
    /// The cell was observed as traversable floor.
    Floor,
}

impl CellCode {
    /// Interprets the low two bits of `bits` as a cell code.
    ///
    /// Devices never emit the value 3; it is folded into [`CellCode::Unknown`].
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            1 => Self::Wall,
            2 => Self::Floor,
            _ => Self::Unknown,
        }
    }

    /// Reports whether the cell carries map information.
    #[must_use]
    pub const fn is_mapped(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

/// Integer coordinate within the device grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    x: i32,
    y: i32,
}

impl GridPoint {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }
}

/// Location of the charging dock reported alongside the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargerPosition {
    /// The dock sits at the provided grid coordinate.
    Known(GridPoint),
    /// The device does not know where the dock is.
    Unknown,
}

impl ChargerPosition {
    /// Returns the dock coordinate when it is known.
    #[must_use]
    pub const fn point(&self) -> Option<GridPoint> {
        match self {
            Self::Known(point) => Some(*point),
            Self::Unknown => None,
        }
    }
}

impl FromStr for ChargerPosition {
    type Err = CorruptPayload;

    /// Parses the `"x,y"` wire form. `"-1,-1"` and the empty string are unknown.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Ok(Self::Unknown);
        }

        let invalid = || CorruptPayload::InvalidChargerPosition {
            raw: value.to_owned(),
        };
        let (x, y) = trimmed.split_once(',').ok_or_else(invalid)?;
        let x = x.trim().parse::<i32>().map_err(|_| invalid())?;
        let y = y.trim().parse::<i32>().map_err(|_| invalid())?;

        match (x, y) {
            (-1, -1) => Ok(Self::Unknown),
            (x, y) if x < 0 || y < 0 => Err(invalid()),
            (x, y) => Ok(Self::Known(GridPoint::new(x, y))),
        }
    }
}

/// Inclusive bounding box of every mapped cell.
///
/// A box whose `min_x` exceeds its `max_x` is empty and must not be rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl BoundingBox {
    /// Box that contains nothing.
    pub const EMPTY: Self = Self {
        min_x: i32::MAX,
        min_y: i32::MAX,
        max_x: i32::MIN,
        max_y: i32::MIN,
    };

    /// Creates a box from explicit inclusive limits.
    #[must_use]
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates a box that covers exactly one grid point.
    #[must_use]
    pub const fn around(point: GridPoint) -> Self {
        Self::new(point.x, point.y, point.x, point.y)
    }

    /// Returns a copy widened so that it contains `point`.
    #[must_use]
    pub fn including(self, point: GridPoint) -> Self {
        Self {
            min_x: self.min_x.min(point.x),
            min_y: self.min_y.min(point.y),
            max_x: self.max_x.max(point.x),
            max_y: self.max_y.max(point.y),
        }
    }

    /// Reports whether the box is in the empty state.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.min_x > self.max_x
    }

    /// Smallest column contained in the box.
    #[must_use]
    pub const fn min_x(&self) -> i32 {
        self.min_x
    }

    /// Smallest row contained in the box.
    #[must_use]
    pub const fn min_y(&self) -> i32 {
        self.min_y
    }

    /// Largest column contained in the box.
    #[must_use]
    pub const fn max_x(&self) -> i32 {
        self.max_x
    }

    /// Largest row contained in the box.
    #[must_use]
    pub const fn max_y(&self) -> i32 {
        self.max_y
    }

    /// Number of columns spanned by the box, zero when empty.
    #[must_use]
    pub fn columns(&self) -> u32 {
        span(self.min_x, self.max_x)
    }

    /// Number of rows spanned by the box, zero when empty.
    #[must_use]
    pub fn rows(&self) -> u32 {
        span(self.min_y, self.max_y)
    }

    /// Reports whether `point` lies inside the box.
    #[must_use]
    pub const fn contains(&self, point: GridPoint) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

fn span(min: i32, max: i32) -> u32 {
    if min > max {
        0
    } else {
        max.abs_diff(min) + 1
    }
}

/// Dense row-major grid of decoded cells.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapGrid {
    width: u32,
    cells: Vec<CellCode>,
}

impl MapGrid {
    /// Wraps decoded cells laid out row-major with the provided width.
    ///
    /// `width` must be positive; the ingestion boundary rejects zero widths.
    #[must_use]
    pub fn new(width: u32, cells: Vec<CellCode>) -> Self {
        Self { width, cells }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid, counting a trailing partial row.
    #[must_use]
    pub fn height(&self) -> u32 {
        if self.width == 0 {
            return 0;
        }
        let rows = self.cells.len().div_ceil(self.width as usize);
        u32::try_from(rows).unwrap_or(u32::MAX)
    }

    /// Decoded cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[CellCode] {
        &self.cells
    }

    /// Returns the cell at `point`, or `None` outside the decoded area.
    #[must_use]
    pub fn cell(&self, point: GridPoint) -> Option<CellCode> {
        let x = u32::try_from(point.x).ok()?;
        let y = u32::try_from(point.y).ok()?;
        if x >= self.width {
            return None;
        }
        let index = (y as usize)
            .checked_mul(self.width as usize)?
            .checked_add(x as usize)?;
        self.cells.get(index).copied()
    }

    /// Iterates every mapped cell together with its grid coordinate.
    pub fn mapped_cells(&self) -> impl Iterator<Item = (GridPoint, CellCode)> + '_ {
        let width = self.width.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, code)| code.is_mapped())
            .map(move |(index, code)| (point_for_index(index, width), *code))
    }
}

/// Converts a row-major index into a grid coordinate for the provided width.
#[must_use]
pub fn point_for_index(index: usize, width: usize) -> GridPoint {
    let x = i32::try_from(index % width).unwrap_or(i32::MAX);
    let y = i32::try_from(index / width).unwrap_or(i32::MAX);
    GridPoint::new(x, y)
}

/// Ordered path the robot travelled, as transmitted by the device.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackPath {
    points: Vec<GridPoint>,
}

impl TrackPath {
    /// Wraps the provided points without reordering them.
    #[must_use]
    pub fn new(points: Vec<GridPoint>) -> Self {
        Self { points }
    }

    /// Points in order of arrival.
    #[must_use]
    pub fn points(&self) -> &[GridPoint] {
        &self.points
    }

    /// Most recent position of the robot, if any point was transmitted.
    #[must_use]
    pub fn last(&self) -> Option<GridPoint> {
        self.points.last().copied()
    }

    /// Reports whether the path has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Fully decoded map payload ready for composition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedMap {
    /// Cells of the map.
    pub grid: MapGrid,
    /// Bounding box derived from the same grid and charger.
    pub bounds: BoundingBox,
    /// Path travelled by the robot.
    pub track: TrackPath,
    /// Location of the charging dock.
    pub charger: ChargerPosition,
}

/// Quarter-turn screen rotation applied to every rendered element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum Orientation {
    /// Grid axes match screen axes.
    #[default]
    Deg0,
    /// One clockwise quarter turn.
    Deg90,
    /// Half turn.
    Deg180,
    /// Three clockwise quarter turns.
    Deg270,
}

impl Orientation {
    /// Creates an orientation from a quarter-turn count, wrapping modulo four.
    #[must_use]
    pub const fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Self::Deg0,
            1 => Self::Deg90,
            2 => Self::Deg180,
            _ => Self::Deg270,
        }
    }

    /// Number of clockwise quarter turns in `0..4`.
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 1,
            Self::Deg180 => 2,
            Self::Deg270 => 3,
        }
    }

    /// Rotation expressed in degrees.
    #[must_use]
    pub const fn degrees(self) -> u16 {
        self.quarter_turns() as u16 * 90
    }

    /// Returns the orientation one step away in the provided direction.
    #[must_use]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        match direction {
            RotationDirection::Clockwise => Self::from_quarter_turns(self.quarter_turns() + 1),
            RotationDirection::CounterClockwise => {
                Self::from_quarter_turns(self.quarter_turns() + 3)
            }
        }
    }

    /// Reports whether the grid axes are swapped on screen.
    #[must_use]
    pub const fn is_transposed(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

impl TryFrom<u16> for Orientation {
    type Error = InvalidOrientation;

    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            other => Err(InvalidOrientation { degrees: other }),
        }
    }
}

impl From<Orientation> for u16 {
    fn from(orientation: Orientation) -> Self {
        orientation.degrees()
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Rejected attempt to build an [`Orientation`] from a non-quarter-turn angle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("orientation must be 0, 90, 180 or 270 degrees (received {degrees})")]
pub struct InvalidOrientation {
    /// Angle that failed validation.
    pub degrees: u16,
}

/// Direction of a single rotate step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    /// One quarter turn clockwise.
    Clockwise,
    /// One quarter turn counter-clockwise.
    CounterClockwise,
}

/// Size of the drawing surface in screen units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanvasExtent {
    width: u32,
    height: u32,
}

impl CanvasExtent {
    /// Creates a new canvas extent.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the canvas.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the canvas.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Raw map, track and charger strings carried by one status update.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct StatusPayload {
    /// Base64 encoded map bytes; empty when the device has no map yet.
    pub map: String,
    /// Base64 encoded track bytes.
    pub track: String,
    /// Charger position in `"x,y"` form.
    pub charger: String,
}

impl StatusPayload {
    /// Creates a payload from its three wire strings.
    #[must_use]
    pub fn new<M, T, C>(map: M, track: T, charger: C) -> Self
    where
        M: Into<String>,
        T: Into<String>,
        C: Into<String>,
    {
        Self {
            map: map.into(),
            track: track.into(),
            charger: charger.into(),
        }
    }
}

/// Commands accepted by the viewer state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Offers a freshly polled status payload.
    Ingest {
        /// Payload received from the device.
        payload: StatusPayload,
    },
    /// Rotates the view by one quarter turn.
    Rotate {
        /// Direction of the quarter turn.
        direction: RotationDirection,
    },
    /// Changes the size of the drawing surface.
    Resize {
        /// New canvas extent.
        canvas: CanvasExtent,
    },
}

/// Events reported by the viewer after applying commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// A new payload was decoded and replaced the previous map.
    MapReplaced {
        /// Width of the decoded grid.
        width: u32,
        /// Height of the decoded grid.
        height: u32,
        /// Bounding box of the mapped cells.
        bounds: BoundingBox,
        /// Number of points in the decoded track.
        track_points: usize,
    },
    /// The payload matched the last accepted or last rejected one byte-for-byte
    /// and was skipped.
    PayloadUnchanged,
    /// The payload carried no map yet; the previous map is kept.
    MapUnavailable,
    /// The payload failed validation; the previous map is kept.
    PayloadRejected {
        /// Reason the payload was rejected.
        reason: CorruptPayload,
    },
    /// The view orientation changed.
    OrientationChanged {
        /// Orientation now in effect.
        orientation: Orientation,
    },
    /// The drawing surface changed size and the payload cache was dropped.
    CanvasResized {
        /// New canvas extent.
        canvas: CanvasExtent,
    },
}

impl Event {
    /// Reports whether the event changes what a renderer would draw.
    #[must_use]
    pub const fn requires_redraw(&self) -> bool {
        matches!(
            self,
            Self::MapReplaced { .. } | Self::OrientationChanged { .. } | Self::CanvasResized { .. }
        )
    }
}

/// Payload field that failed to decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PayloadField {
    /// The `map` field.
    Map,
    /// The `track` field.
    Track,
}

impl fmt::Display for PayloadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map => write!(f, "map"),
            Self::Track => write!(f, "track"),
        }
    }
}

/// Reasons a status payload is rejected at the ingestion boundary.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CorruptPayload {
    /// The status document was not valid JSON of the expected shape.
    #[error("status document is malformed: {message}")]
    MalformedStatus {
        /// Parser diagnostic.
        message: String,
    },
    /// A field was not valid base64.
    #[error("{field} payload is not valid base64: {message}")]
    InvalidEncoding {
        /// Field that failed to decode.
        field: PayloadField,
        /// Decoder diagnostic.
        message: String,
    },
    /// The map bytes end before the cell stream starts.
    #[error("map payload has {length} bytes, shorter than its 9-byte header")]
    TruncatedHeader {
        /// Number of decoded map bytes.
        length: usize,
    },
    /// The map header declares a zero width.
    #[error("map header declares a zero width")]
    ZeroWidth,
    /// The cell stream holds more cells than the header declares.
    #[error("map payload decodes to more than {width}x{height} cells")]
    CellOverflow {
        /// Declared grid width.
        width: u32,
        /// Declared grid height.
        height: u32,
    },
    /// The charger string is not `"x,y"` with non-negative coordinates or `"-1,-1"`.
    #[error("charger position '{raw}' is malformed")]
    InvalidChargerPosition {
        /// Raw charger string.
        raw: String,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        BoundingBox, CellCode, ChargerPosition, CorruptPayload, DecodedMap, GridPoint, MapGrid,
        Orientation, RotationDirection, TrackPath,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_codes_follow_two_bit_values() {
        assert_eq!(CellCode::from_bits(0), CellCode::Unknown);
        assert_eq!(CellCode::from_bits(1), CellCode::Wall);
        assert_eq!(CellCode::from_bits(2), CellCode::Floor);
        assert_eq!(CellCode::from_bits(3), CellCode::Unknown);
        assert_eq!(CellCode::from_bits(0b0110), CellCode::Floor);
    }

    #[test]
    fn charger_position_parses_known_coordinates() {
        let parsed: ChargerPosition = " 12, 7 ".parse().expect("valid charger");
        assert_eq!(parsed, ChargerPosition::Known(GridPoint::new(12, 7)));
    }

    #[test]
    fn charger_position_sentinel_is_unknown() {
        assert_eq!("-1,-1".parse(), Ok(ChargerPosition::Unknown));
        assert_eq!("".parse(), Ok(ChargerPosition::Unknown));
    }

    #[test]
    fn charger_position_rejects_garbage() {
        for raw in ["12", "a,b", "-3,4", "1,2,3"] {
            let error = raw.parse::<ChargerPosition>().expect_err("must reject");
            assert!(
                matches!(error, CorruptPayload::InvalidChargerPosition { .. }),
                "unexpected error for {raw}: {error:?}"
            );
        }
    }

    #[test]
    fn empty_bounding_box_reports_empty() {
        let empty = BoundingBox::EMPTY;
        assert!(empty.is_empty());
        assert!(empty.min_x() > empty.max_x());
        assert_eq!(empty.columns(), 0);
        assert_eq!(empty.rows(), 0);
    }

    #[test]
    fn bounding_box_widens_to_include_points() {
        let bounds = BoundingBox::around(GridPoint::new(3, 1)).including(GridPoint::new(7, 9));
        assert_eq!(bounds, BoundingBox::new(3, 1, 7, 9));
        assert_eq!(bounds.columns(), 5);
        assert_eq!(bounds.rows(), 9);
        assert!(bounds.contains(GridPoint::new(5, 5)));
        assert!(!bounds.contains(GridPoint::new(8, 5)));
    }

    #[test]
    fn map_grid_addresses_cells_row_major() {
        let grid = MapGrid::new(
            3,
            vec![
                CellCode::Unknown,
                CellCode::Wall,
                CellCode::Unknown,
                CellCode::Floor,
            ],
        );
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.cell(GridPoint::new(1, 0)), Some(CellCode::Wall));
        assert_eq!(grid.cell(GridPoint::new(0, 1)), Some(CellCode::Floor));
        assert_eq!(grid.cell(GridPoint::new(1, 1)), None);
        assert_eq!(grid.cell(GridPoint::new(3, 0)), None);

        let mapped: Vec<_> = grid.mapped_cells().collect();
        assert_eq!(
            mapped,
            vec![
                (GridPoint::new(1, 0), CellCode::Wall),
                (GridPoint::new(0, 1), CellCode::Floor),
            ]
        );
    }

    #[test]
    fn orientation_cycles_through_quarter_turns() {
        let mut orientation = Orientation::Deg0;
        for expected in [
            Orientation::Deg90,
            Orientation::Deg180,
            Orientation::Deg270,
            Orientation::Deg0,
        ] {
            orientation = orientation.rotated(RotationDirection::Clockwise);
            assert_eq!(orientation, expected);
        }
        assert_eq!(
            Orientation::Deg0.rotated(RotationDirection::CounterClockwise),
            Orientation::Deg270
        );
    }

    #[test]
    fn orientation_rejects_non_quarter_angles() {
        assert_eq!(Orientation::try_from(180), Ok(Orientation::Deg180));
        assert!(Orientation::try_from(45).is_err());
    }

    #[test]
    fn decoded_map_round_trips_through_bincode() {
        let decoded = DecodedMap {
            grid: MapGrid::new(2, vec![CellCode::Floor, CellCode::Wall]),
            bounds: BoundingBox::new(0, 0, 1, 0),
            track: TrackPath::new(vec![GridPoint::new(0, 0), GridPoint::new(1, 0)]),
            charger: ChargerPosition::Known(GridPoint::new(1, 0)),
        };
        assert_round_trip(&decoded);
    }

    #[test]
    fn orientation_round_trips_through_bincode() {
        assert_round_trip(&Orientation::Deg270);
    }
}
