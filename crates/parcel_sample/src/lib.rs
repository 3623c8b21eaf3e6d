//! A small app whose hosts exchange payloads through generated creators and
//! binders.
//!
//! `build.rs` runs the generator over this crate. Every module declaring
//! hosts includes what was generated for it.

pub mod model;
pub mod screens;

use parcel_payload::derive::Host;
use parcel_payload::{Host, Payload};

/// The landing host, declared at the crate root.
#[derive(Host, Debug, Default)]
pub struct Home {
    #[parcel(payload)]
    payload: Option<Payload>,
    #[extra(key = "user_name")]
    pub user: Option<String>,
}

/// Start `H` with `payload` attached, the way a platform would before the
/// host binds its extras.
pub fn deliver<H: Host + Default>(payload: Payload) -> H {
    let mut host = H::default();
    host.attach(payload);
    host
}

include!(concat!(env!("OUT_DIR"), "/parcel/parcel.rs"));
