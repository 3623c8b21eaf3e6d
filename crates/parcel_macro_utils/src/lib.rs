//! Provide some tools shared by the parcel derive macro and the build-time
//! generator.
//!
//! - [`Manifest`]: the caller's `Cargo.toml`, crate path resolution and
//!   `[package.metadata.parcel]` access.
//! - [`attrs`]: the parser for `#[extra(...)]` and `#[parcel(...)]`.
#![allow(clippy::std_instead_of_core, reason = "build-time lib")]
#![allow(clippy::std_instead_of_alloc, reason = "build-time lib")]

// -----------------------------------------------------------------------------
// Modules

mod manifest;

pub mod attrs;

// -----------------------------------------------------------------------------
// Exports

pub use manifest::{Manifest, ManifestError};
