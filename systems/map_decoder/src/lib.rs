#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure decoder that turns device map bytes into a [`MapGrid`] and its [`BoundingBox`].
//!
//! The cell stream packs four 2-bit cell codes per byte. Bytes whose two high
//! bits are set carry base-64 digits of a repetition count for the next
//! payload byte, most significant digit first.

use conga_map_core::{
    point_for_index, BoundingBox, CellCode, ChargerPosition, MapGrid, MAP_DATA_OFFSET,
};

const RUN_LENGTH_MARKER: u8 = 0b1100_0000;
const RUN_LENGTH_DIGIT_MASK: u8 = 0b0011_1111;
const RUN_LENGTH_BASE: u64 = 64;
const CELLS_PER_BYTE: usize = 4;

/// Fixed-size header preceding the cell stream of a map payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapHeader {
    width: u16,
    height: u16,
}

impl MapHeader {
    /// Reads the header from the start of `bytes`.
    ///
    /// Returns `None` when `bytes` is shorter than the header.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < MAP_DATA_OFFSET {
            return None;
        }
        Some(Self {
            width: u16::from_be_bytes([bytes[5], bytes[6]]),
            height: u16::from_be_bytes([bytes[7], bytes[8]]),
        })
    }

    /// Declared number of grid columns.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Declared number of grid rows. Decoding derives the height from the cell count instead.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Largest number of cells the grid may hold.
    ///
    /// Devices that leave the height field at zero are bounded by the largest
    /// height the header can express.
    #[must_use]
    pub fn cell_capacity(&self) -> usize {
        usize::from(self.width) * usize::from(self.capacity_rows())
    }

    /// Number of rows used when bounding the cell stream.
    #[must_use]
    pub const fn capacity_rows(&self) -> u16 {
        if self.height == 0 {
            u16::MAX
        } else {
            self.height
        }
    }
}

/// Run-length decoder for the packed cell stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unpacker {
    cell_limit: Option<usize>,
}

impl Unpacker {
    /// Creates an unpacker that emits every encoded cell.
    #[must_use]
    pub const fn new() -> Self {
        Self { cell_limit: None }
    }

    /// Stops emitting once more than `limit` cells have been produced.
    ///
    /// The returned sequence is then exactly `limit + 1` cells long, which lets
    /// callers detect streams that overflow a declared grid without
    /// materialising arbitrarily long runs.
    #[must_use]
    pub const fn with_cell_limit(mut self, limit: usize) -> Self {
        self.cell_limit = Some(limit);
        self
    }

    /// Counts the cells [`Unpacker::unpack`] would emit, ignoring the cell limit.
    ///
    /// Nothing is allocated, so callers can reject oversized streams before
    /// decoding them. The count saturates at `u64::MAX`.
    #[must_use]
    pub fn count_cells(&self, bytes: &[u8], offset: usize) -> u64 {
        runs(bytes, offset).fold(0_u64, |total, (_, repeat)| {
            total.saturating_add(repeat.saturating_mul(CELLS_PER_BYTE as u64))
        })
    }

    /// Decodes the cell stream that starts at `offset`.
    #[must_use]
    pub fn unpack(&self, bytes: &[u8], offset: usize) -> Vec<CellCode> {
        let ceiling = self.cell_limit.map(|limit| limit.saturating_add(1));
        let mut cells = match ceiling {
            Some(ceiling) => {
                let expected =
                    usize::try_from(self.count_cells(bytes, offset)).unwrap_or(usize::MAX);
                Vec::with_capacity(expected.min(ceiling))
            }
            None => Vec::new(),
        };

        for (byte, repeat) in runs(bytes, offset) {
            let group = [
                CellCode::from_bits(byte >> 6),
                CellCode::from_bits(byte >> 4),
                CellCode::from_bits(byte >> 2),
                CellCode::from_bits(byte),
            ];

            for _ in 0..repeat {
                if let Some(ceiling) = ceiling {
                    if cells.len() >= ceiling {
                        return cells;
                    }
                    let room = ceiling - cells.len();
                    if room < CELLS_PER_BYTE {
                        cells.extend_from_slice(&group[..room]);
                        return cells;
                    }
                }
                cells.extend_from_slice(&group);
            }
        }

        cells
    }
}

/// Yields every payload byte with its repetition count.
///
/// Run-length digits accumulate into the count of the next payload byte and
/// reset after it. A missing or zero count means one repetition. Digits left
/// dangling at the end of the stream produce nothing.
fn runs(bytes: &[u8], offset: usize) -> impl Iterator<Item = (u8, u64)> + '_ {
    let mut repeat: u64 = 0;
    bytes.iter().skip(offset).filter_map(move |&byte| {
        if byte & RUN_LENGTH_MARKER == RUN_LENGTH_MARKER {
            repeat = repeat
                .saturating_mul(RUN_LENGTH_BASE)
                .saturating_add(u64::from(byte & RUN_LENGTH_DIGIT_MASK));
            return None;
        }
        let count = repeat.max(1);
        repeat = 0;
        Some((byte, count))
    })
}

/// Decodes the cell stream of `bytes` starting at `offset`.
///
/// Malformed input never fails: dangling run-length digits at the end of the
/// stream are discarded and a short stream simply yields fewer cells.
#[must_use]
pub fn unpack(bytes: &[u8], offset: usize) -> Vec<CellCode> {
    Unpacker::new().unpack(bytes, offset)
}

/// Counts the cells [`unpack`] would emit for `bytes` starting at `offset`.
#[must_use]
pub fn count_cells(bytes: &[u8], offset: usize) -> u64 {
    Unpacker::new().count_cells(bytes, offset)
}

/// Lays `cells` out row-major with the provided width and derives the bounding box.
///
/// A known charger seeds the box so that the dock is always visible. With an
/// unknown charger the box seeds at the first mapped cell in row-major order.
/// `width` must be positive.
#[must_use]
pub fn build(cells: Vec<CellCode>, width: u32, charger: ChargerPosition) -> (MapGrid, BoundingBox) {
    let mut bounds = match charger {
        ChargerPosition::Known(point) => Some(BoundingBox::around(point)),
        ChargerPosition::Unknown => None,
    };

    let stride = width as usize;
    for (index, code) in cells.iter().enumerate() {
        if !code.is_mapped() {
            continue;
        }
        let point = point_for_index(index, stride);
        bounds = Some(match bounds {
            Some(bounds) => bounds.including(point),
            None => BoundingBox::around(point),
        });
    }

    (MapGrid::new(width, cells), bounds.unwrap_or(BoundingBox::EMPTY))
}
