use conga_map_core::{CorruptPayload, StatusPayload};
use serde::Deserialize;
use serde_json::Value;

/// Key wrapping the status fields in device notifications.
const ENVELOPE_KEY: &str = "value";

#[derive(Debug, Default, Deserialize)]
struct StatusFields {
    #[serde(default)]
    map: String,
    #[serde(default)]
    track: String,
    #[serde(default, rename = "chargerPos")]
    charger_pos: String,
}

/// Extracts the map, track and charger strings from a status document.
///
/// Accepts both the device notification envelope (`{"value": {...}}`) and the
/// flat status object served to clients. Unrelated keys are ignored and
/// missing fields default to empty strings.
pub fn parse_status(document: &str) -> Result<StatusPayload, CorruptPayload> {
    let root: Value = serde_json::from_str(document).map_err(malformed)?;
    let body = match root {
        Value::Object(mut object) => match object.remove(ENVELOPE_KEY) {
            Some(inner @ Value::Object(_)) => inner,
            Some(_) | None => Value::Object(object),
        },
        other => {
            return Err(CorruptPayload::MalformedStatus {
                message: format!("expected a JSON object, found {other}"),
            })
        }
    };

    let fields: StatusFields = serde_json::from_value(body).map_err(malformed)?;
    Ok(StatusPayload::new(fields.map, fields.track, fields.charger_pos))
}

fn malformed(error: serde_json::Error) -> CorruptPayload {
    CorruptPayload::MalformedStatus {
        message: error.to_string(),
    }
}
