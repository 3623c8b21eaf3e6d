//! Runtime side of parcel: the keyed [`Payload`] moved between two hosts,
//! the [`Context`] it is sent from, and the [`Host`] capability.
//!
//! Generated creators write into a [`Payload`]; generated binders read it back
//! from [`Host::payload`].
//!
//! ```
//! use parcel_payload::{Context, Host, LaunchFlags, Payload, derive::Host};
//!
//! #[derive(Host, Default)]
//! struct Ticket {
//!     #[parcel(payload)]
//!     payload: Option<Payload>,
//!     #[extra(required)]
//!     id: i64,
//! }
//!
//! let context = Context::new("tests");
//! let mut payload = Payload::new(&context, Ticket::target());
//! payload.put_long("id", 42);
//! payload.add_flag(LaunchFlags::NEW_TASK);
//!
//! let mut ticket = Ticket::default();
//! ticket.attach(payload);
//! assert_eq!(ticket.payload().unwrap().get_long("id", -1), 42);
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// `#[derive(Host)]` resolves this crate as `::parcel_payload`, which must also
// work from inside the crate (doc tests, unit tests).
extern crate self as parcel_payload;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod context;
mod error;
mod flags;
mod host;
mod payload;

#[doc(hidden)]
pub mod __macro_exports;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use context::Context;
pub use error::PayloadError;
pub use flags::LaunchFlags;
pub use host::{Host, Serializable};
pub use payload::{Extra, Payload};

pub use parcel_derive as derive;
