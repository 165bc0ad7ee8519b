use conga_map_core::StatusPayload;

/// Remembers the last accepted and the last rejected payload so identical
/// polls skip decoding.
///
/// The comparison is byte-for-byte over the map, track and charger strings.
/// A payload either replaces the cached one completely or leaves it alone.
#[derive(Clone, Debug, Default)]
pub struct PayloadCache {
    last: Option<StatusPayload>,
    rejected: Option<StatusPayload>,
}

impl PayloadCache {
    /// Creates an empty cache.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: None,
            rejected: None,
        }
    }

    /// Reports whether `payload` matches the cached payload exactly.
    #[must_use]
    pub fn is_unchanged(&self, payload: &StatusPayload) -> bool {
        self.last.as_ref() == Some(payload)
    }

    /// Reports whether `payload` matches the most recently rejected payload.
    #[must_use]
    pub fn is_known_rejected(&self, payload: &StatusPayload) -> bool {
        self.rejected.as_ref() == Some(payload)
    }

    /// Replaces the cached payload and forgets any rejected one.
    pub fn store(&mut self, payload: StatusPayload) {
        self.last = Some(payload);
        self.rejected = None;
    }

    /// Remembers a payload that failed validation. The accepted payload is kept.
    pub fn store_rejected(&mut self, payload: StatusPayload) {
        self.rejected = Some(payload);
    }

    /// Forgets both payloads so the next one is decoded again.
    pub fn invalidate(&mut self) {
        self.last = None;
        self.rejected = None;
    }
}
