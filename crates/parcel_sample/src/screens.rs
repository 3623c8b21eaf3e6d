//! Hosts of the screens module, and their generated creators and binder.

use parcel_payload::Payload;
use parcel_payload::derive::Host;

use crate::model::Book;

#[derive(Host, Debug, Default)]
pub struct Ticket {
    #[parcel(payload)]
    payload: Option<Payload>,
    #[extra(required)]
    pub id: i64,
    #[extra]
    pub label: Option<String>,
}

#[derive(Host, Debug, Default)]
pub struct Detail {
    #[parcel(payload)]
    payload: Option<Payload>,
    #[extra(required)]
    pub book: Book,
    #[extra]
    pub chapter: Option<i32>,
    #[extra]
    pub count: i32,
    #[extra(key = "detail_note")]
    pub note: String,
    #[extra]
    pub sequel: Option<Book>,
    /// Not transported.
    pub scroll: u32,
}

/// A host without extras. It still gets a creator, but no bind method.
#[derive(Host, Debug, Default)]
#[parcel(target = "screens.Splash")]
pub struct Splash {
    #[parcel(payload)]
    payload: Option<Payload>,
}

include!(concat!(env!("OUT_DIR"), "/parcel/screens/parcel.rs"));
