use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Payload;

/// A type that payloads can be addressed at.
///
/// Usually implemented with `#[derive(Host)]`, which stores the attached
/// payload in the field marked `#[parcel(payload)]`.
///
/// Generated creators address their payload at [`Host::target`]; generated
/// binders read the values back from [`Host::payload`].
pub trait Host: 'static {
    /// The stable name payloads use to address this host.
    ///
    /// Defaults to the fully qualified type path when derived.
    fn target() -> &'static str;

    /// The payload currently attached to this instance, if any.
    fn payload(&self) -> Option<&Payload>;

    /// Attach `payload` to this instance, replacing the previous one.
    fn attach(&mut self, payload: Payload);
}

/// Values transported as opaque serialized objects.
///
/// Implemented for every type that is both [`Serialize`] and
/// [`DeserializeOwned`]; there is nothing to implement by hand.
pub trait Serializable: Serialize + DeserializeOwned {}

impl<T: Serialize + DeserializeOwned> Serializable for T {}
