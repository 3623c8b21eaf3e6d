//! Items used by `#[derive(Host)]` expansions. Not public API.

use crate::Payload;

/// The field types accepted behind `#[parcel(payload)]`.
pub trait PayloadSlot {
    fn slot_get(&self) -> Option<&Payload>;
    fn slot_set(&mut self, payload: Payload);
}

impl PayloadSlot for Option<Payload> {
    #[inline]
    fn slot_get(&self) -> Option<&Payload> {
        self.as_ref()
    }

    #[inline]
    fn slot_set(&mut self, payload: Payload) {
        *self = Some(payload);
    }
}

impl PayloadSlot for Payload {
    #[inline]
    fn slot_get(&self) -> Option<&Payload> {
        Some(self)
    }

    #[inline]
    fn slot_set(&mut self, payload: Payload) {
        *self = payload;
    }
}
