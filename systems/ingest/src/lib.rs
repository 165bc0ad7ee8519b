#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Ingestion boundary that validates status payloads before they reach the decoders.
//!
//! Everything the decoders treat as a caller precondition is checked here and
//! surfaced as a single [`CorruptPayload`] error kind: undecodable base64, a
//! map shorter than its header, a zero width, and cell streams that overflow
//! the grid the header declares. Malformed content that the decoders degrade
//! gracefully (dangling run-length digits, odd track lengths) passes through.

mod cache;
mod status;

pub use cache::PayloadCache;
pub use status::parse_status;

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig},
        DecodePaddingMode,
    },
    Engine as _,
};
use conga_map_core::{
    ChargerPosition, CorruptPayload, DecodedMap, PayloadField, StatusPayload, MAP_DATA_OFFSET,
    TRACK_HEADER_LEN,
};
use conga_map_system_map_decoder::{build, MapHeader, Unpacker};

/// Standard alphabet that accepts payloads with or without trailing padding.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Validates and decodes a status payload.
///
/// Returns `Ok(None)` when the payload carries no map yet, which devices
/// report with an empty `map` field.
pub fn decode_payload(payload: &StatusPayload) -> Result<Option<DecodedMap>, CorruptPayload> {
    let charger: ChargerPosition = payload.charger.parse()?;

    let map_text = payload.map.trim();
    if map_text.is_empty() {
        return Ok(None);
    }

    let map_bytes = decode_field(map_text, PayloadField::Map)?;
    let header = MapHeader::parse(&map_bytes).ok_or(CorruptPayload::TruncatedHeader {
        length: map_bytes.len(),
    })?;
    if header.width() == 0 {
        return Err(CorruptPayload::ZeroWidth);
    }

    let capacity = header.cell_capacity();
    let unpacker = Unpacker::new().with_cell_limit(capacity);
    let encoded_cells = unpacker.count_cells(&map_bytes, MAP_DATA_OFFSET);
    if encoded_cells > u64::try_from(capacity).unwrap_or(u64::MAX) {
        return Err(CorruptPayload::CellOverflow {
            width: u32::from(header.width()),
            height: u32::from(header.capacity_rows()),
        });
    }
    let cells = unpacker.unpack(&map_bytes, MAP_DATA_OFFSET);

    let track_text = payload.track.trim();
    let track_bytes = if track_text.is_empty() {
        Vec::new()
    } else {
        decode_field(track_text, PayloadField::Track)?
    };
    let track = conga_map_system_track_decoder::decode(&track_bytes, TRACK_HEADER_LEN);

    let (grid, bounds) = build(cells, u32::from(header.width()), charger);

    Ok(Some(DecodedMap {
        grid,
        bounds,
        track,
        charger,
    }))
}

fn decode_field(text: &str, field: PayloadField) -> Result<Vec<u8>, CorruptPayload> {
    PAYLOAD_ENGINE
        .decode(text)
        .map_err(|error| CorruptPayload::InvalidEncoding {
            field,
            message: error.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;

    fn encode(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    fn map_bytes(width: u16, height: u16, stream: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0, 0, 0, 0, 0];
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(stream);
        bytes
    }

    #[test]
    fn empty_map_means_no_map_yet() {
        let payload = StatusPayload::new("", "", "-1,-1");
        assert_eq!(decode_payload(&payload), Ok(None));
    }

    #[test]
    fn unpadded_base64_is_accepted() {
        let encoded = encode(&map_bytes(4, 1, &[0x55]));
        let payload = StatusPayload::new(encoded.trim_end_matches('='), "", "");
        let decoded = decode_payload(&payload)
            .expect("valid payload")
            .expect("map present");
        assert_eq!(decoded.grid.width(), 4);
    }

    #[test]
    fn invalid_base64_reports_the_field() {
        let payload = StatusPayload::new(encode(&map_bytes(4, 1, &[0x55])), "!!!", "");
        let error = decode_payload(&payload).expect_err("track is not base64");
        assert!(matches!(
            error,
            CorruptPayload::InvalidEncoding {
                field: PayloadField::Track,
                ..
            }
        ));
    }

    #[test]
    fn short_header_is_rejected() {
        let payload = StatusPayload::new(encode(&[0, 0, 0, 0, 0, 0, 4]), "", "");
        assert_eq!(
            decode_payload(&payload),
            Err(CorruptPayload::TruncatedHeader { length: 7 })
        );
    }

    #[test]
    fn zero_width_is_rejected() {
        let payload = StatusPayload::new(encode(&map_bytes(0, 4, &[0x55])), "", "");
        assert_eq!(decode_payload(&payload), Err(CorruptPayload::ZeroWidth));
    }

    #[test]
    fn overflowing_stream_is_rejected() {
        let payload = StatusPayload::new(encode(&map_bytes(4, 1, &[0x55, 0x55])), "", "");
        assert_eq!(
            decode_payload(&payload),
            Err(CorruptPayload::CellOverflow {
                width: 4,
                height: 1
            })
        );
    }

    #[test]
    fn oversized_run_is_rejected_before_decoding() {
        // Eight maximal digits ask for about 2^50 cells; decoding them would exhaust memory.
        let mut stream = vec![0xFF; 8];
        stream.push(0xAA);
        let payload = StatusPayload::new(encode(&map_bytes(u16::MAX, 0, &stream)), "", "");
        assert_eq!(
            decode_payload(&payload),
            Err(CorruptPayload::CellOverflow {
                width: u32::from(u16::MAX),
                height: u32::from(u16::MAX)
            })
        );
    }

    #[test]
    fn stream_filling_the_declared_grid_exactly_is_accepted() {
        // 0xC1 0xC0 repeats the next byte 64 times: 256 cells for a 16x16 grid.
        let payload = StatusPayload::new(encode(&map_bytes(16, 16, &[0xC1, 0xC0, 0x55])), "", "");
        let decoded = decode_payload(&payload)
            .expect("exact fit is valid")
            .expect("map present");
        assert_eq!(decoded.grid.cells().len(), 256);
        assert_eq!(decoded.grid.height(), 16);
    }

    #[test]
    fn short_stream_degrades_to_partial_grid() {
        let payload = StatusPayload::new(encode(&map_bytes(4, 3, &[0x55, 0xC3])), "", "");
        let decoded = decode_payload(&payload)
            .expect("truncation is tolerated")
            .expect("map present");
        assert_eq!(decoded.grid.cells().len(), 4);
        assert_eq!(decoded.grid.height(), 1);
    }

    #[test]
    fn malformed_charger_is_rejected() {
        let payload = StatusPayload::new(encode(&map_bytes(4, 1, &[0x55])), "", "north");
        assert!(matches!(
            decode_payload(&payload),
            Err(CorruptPayload::InvalidChargerPosition { .. })
        ));
    }
}
