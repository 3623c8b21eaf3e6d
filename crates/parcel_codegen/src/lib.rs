//! Build-time generator for parcel hosts.
//!
//! For every struct deriving `Host`, the generator writes a `<Host>Creator`
//! that fills a [`Payload`](https://docs.rs/parcel_payload) from typed
//! arguments, and for every module with such hosts a `PayloadBinder` whose
//! `bind_<host>` methods read the payload back into the host's fields.
//!
//! The pipeline is a [`Driver`] fed with a [`Program`](program::Program),
//! usually a [`SourceProgram`] parsed from the crate's sources, and an
//! [`Emitter`](emit::Emitter) receiving the synthesized types.
//!
//! ```no_run
//! // build.rs
//! use parcel_codegen::diagnostics::CargoDiagnostics;
//! use parcel_codegen::{Driver, FileEmitter, GeneratorConfig, RenderPaths, SourceProgram};
//! use parcel_macro_utils::Manifest;
//! use std::path::{Path, PathBuf};
//!
//! let manifest = Manifest::from_env().unwrap();
//! let config = GeneratorConfig::from_manifest(&manifest).unwrap();
//! let mut program = SourceProgram::new().with_serializable(config.serializable.clone());
//! for file in program.load_crate(Path::new("src/lib.rs")).unwrap() {
//!     println!("cargo:rerun-if-changed={}", file.display());
//! }
//!
//! let out = PathBuf::from(std::env::var("OUT_DIR").unwrap()).join("parcel");
//! let mut emitter = FileEmitter::new(out, RenderPaths::from_manifest(&manifest));
//! let mut diagnostics = CargoDiagnostics::new();
//!
//! let mut driver = Driver::new(config);
//! driver.scan(&program, &mut diagnostics).unwrap();
//! driver.finish(&mut emitter, &mut diagnostics).unwrap();
//! emitter.write_indexes().unwrap();
//! ```
//!
//! Each module then includes its generated types:
//!
//! ```ignore
//! include!(concat!(env!("OUT_DIR"), "/parcel/screens/parcel.rs"));
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "build-time lib")]
#![allow(clippy::std_instead_of_alloc, reason = "build-time lib")]

// -----------------------------------------------------------------------------
// Modules

mod package;

pub mod classify;
pub mod config;
pub mod desc;
pub mod diagnostics;
pub mod driver;
pub mod emit;
pub mod error;
pub mod program;
pub mod render;
pub mod schema;
pub mod synth;

// -----------------------------------------------------------------------------
// Top-level exports

pub use config::GeneratorConfig;
pub use driver::{Driver, FinishReport, ScanReport};
pub use emit::{FileEmitter, MemoryEmitter};
pub use error::{ConfigError, DriverError, SchemaError, SourceError};
pub use package::Package;
pub use program::SourceProgram;
pub use render::RenderPaths;
