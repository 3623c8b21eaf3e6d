use std::path::PathBuf;

use parcel_macro_utils::ManifestError;
use thiserror::Error;

use crate::Package;
use crate::program::DeclRef;

// -----------------------------------------------------------------------------
// SchemaError

/// Why a host could not be turned into a schema.
///
/// Every variant is fatal for the host it was found on, and only for it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    /// `name` describes the declaration, e.g. ``struct `screens::Plain` ``.
    #[error("{name} is not an eligible host, `#[extra]` belongs on named fields of structs implementing `Host`")]
    NotAHost { decl: DeclRef, name: String },

    #[error("field `{field}` of `{host}` has type `{ty}`, which cannot be transported")]
    UnsupportedCategory {
        decl: DeclRef,
        host: String,
        field: String,
        ty: String,
    },

    #[error("fields `{first}` and `{second}` of `{host}` share the key \"{key}\"")]
    DuplicateKey {
        decl: DeclRef,
        host: String,
        key: String,
        first: String,
        second: String,
    },

    #[error("optional field `{field}` of `{host}` collides with the generated creator method `{field}`")]
    ReservedName {
        decl: DeclRef,
        host: String,
        field: String,
    },

    /// A type generated for `host` would share its name with `existing` in
    /// the same module.
    #[error("`{generated}`, generated for `{host}`, collides with {existing}")]
    NameCollision {
        decl: DeclRef,
        host: String,
        generated: String,
        existing: String,
    },

    #[error("invalid `#[extra]` on field `{field}` of `{host}`: {message}")]
    InvalidMarker {
        decl: DeclRef,
        host: String,
        field: String,
        message: String,
    },
}

impl SchemaError {
    /// The declaration the error is reported against.
    pub fn declaration(&self) -> DeclRef {
        match self {
            SchemaError::NotAHost { decl, .. }
            | SchemaError::UnsupportedCategory { decl, .. }
            | SchemaError::DuplicateKey { decl, .. }
            | SchemaError::ReservedName { decl, .. }
            | SchemaError::NameCollision { decl, .. }
            | SchemaError::InvalidMarker { decl, .. } => *decl,
        }
    }
}

// -----------------------------------------------------------------------------
// DriverError

/// Pass-level failures returned by the [`Driver`](crate::Driver).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DriverError {
    #[error("the generator run has already finished, call `reset` to start a new one")]
    Finished,

    #[error("{failed} of {total} generated types could not be emitted")]
    Emission { failed: usize, total: usize },
}

// -----------------------------------------------------------------------------
// ConfigError

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("unknown key `{key}` in `[package.metadata.parcel]`")]
    UnknownKey { key: String },

    #[error("invalid value for `{key}` in `[package.metadata.parcel]`: expected {expected}")]
    InvalidValue { key: String, expected: &'static str },
}

// -----------------------------------------------------------------------------
// SourceError

/// Failure to load scanned sources into a [`SourceProgram`](crate::SourceProgram).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("unable to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },

    #[error("module `{package}` was already added")]
    DuplicateModule { package: Package },

    #[error("file for module `{package}` not found, looked for {}", searched.display())]
    MissingModule { package: Package, searched: PathBuf },
}
