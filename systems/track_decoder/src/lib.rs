#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure decoder for the visited-path payload reported by the device.

use conga_map_core::{GridPoint, TrackPath};

/// Decodes `(x, y)` byte pairs that follow the first `header_skip` bytes.
///
/// Points keep their transmission order. A trailing odd byte is dropped and a
/// stream shorter than the header yields an empty path.
#[must_use]
pub fn decode(bytes: &[u8], header_skip: usize) -> TrackPath {
    let body = bytes.get(header_skip..).unwrap_or_default();
    let points = body
        .chunks_exact(2)
        .map(|pair| GridPoint::new(i32::from(pair[0]), i32::from(pair[1])))
        .collect();
    TrackPath::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use conga_map_core::TRACK_HEADER_LEN;

    #[test]
    fn header_bytes_are_skipped() {
        let track = decode(&[9, 9, 9, 9, 1, 2, 3, 4], TRACK_HEADER_LEN);
        assert_eq!(
            track.points(),
            &[GridPoint::new(1, 2), GridPoint::new(3, 4)]
        );
    }

    #[test]
    fn odd_trailing_byte_is_dropped() {
        let bytes = [0, 0, 0, 0, 10, 20, 30, 40, 50];
        let track = decode(&bytes, TRACK_HEADER_LEN);
        assert_eq!(track.points().len(), (bytes.len() - TRACK_HEADER_LEN) / 2);
        assert_eq!(track.last(), Some(GridPoint::new(30, 40)));
    }

    #[test]
    fn short_stream_yields_empty_path() {
        assert!(decode(&[1, 2], TRACK_HEADER_LEN).is_empty());
        assert!(decode(&[], TRACK_HEADER_LEN).is_empty());
    }

    #[test]
    fn repeated_points_are_preserved() {
        let track = decode(&[0, 0, 0, 0, 255, 255, 255, 255, 0, 1], TRACK_HEADER_LEN);
        assert_eq!(
            track.points(),
            &[
                GridPoint::new(255, 255),
                GridPoint::new(255, 255),
                GridPoint::new(0, 1)
            ]
        );
    }
}
