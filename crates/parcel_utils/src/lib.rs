//! Small shared utilities for the parcel crates.
//!
//! - [`hash`]: hash containers with a fixed, reproducible hash state.
//! - [`naming`]: identifier case conversion and collision-free name allocation
//!   used by the code generator.
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod hash;
pub mod naming;
