use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use std::time::SystemTime;

use thiserror::Error;
use toml_edit::{Document, Item, Table, TableLike};

/// Failure to locate or parse the caller's `Cargo.toml`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ManifestError {
    #[error("`CARGO_MANIFEST_DIR` is not set, the caller is not running under cargo")]
    NoManifestDir,

    #[error("unable to read cargo manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse cargo manifest {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },
}

/// The caller's `Cargo.toml`.
///
/// Generated code must name the runtime crates the way the *calling* crate
/// sees them, so both the derive macro and the build-time generator look the
/// paths up here.
///
/// # Example
///
/// ```no_run
/// # use parcel_macro_utils::Manifest;
/// let manifest = Manifest::from_env().unwrap();
/// let payload: syn::Path = manifest.get_crate_path("parcel_payload");
/// ```
///
/// # Resolution rules
///
/// 1. If the requested crate is listed in `dependencies`, return `::crate_name`.
/// 2. If the requested crate name begins with `parcel_` and the caller depends
///    on the facade crate `parcel`, return `::parcel::short_name`
///    (e.g. `parcel_payload` -> `::parcel::payload`).
/// 3. Repeat step 1-2 in `build-dependencies`, then `dev-dependencies`.
/// 4. Otherwise, fall back to the absolute path `::crate_name`.
#[derive(Debug)]
pub struct Manifest {
    pub manifest: Document<Box<str>>,
    pub modified_time: SystemTime,
}

const FACADE_NAME: &str = "parcel";
const CRATE_PREFIX: &str = "parcel_";
const DEPENDENCY_TABLES: [&str; 3] = ["dependencies", "build-dependencies", "dev-dependencies"];

impl Manifest {
    fn manifest_path() -> Result<PathBuf, ManifestError> {
        let dir = env::var_os("CARGO_MANIFEST_DIR").ok_or(ManifestError::NoManifestDir)?;
        let mut path = PathBuf::from(dir);
        path.push("Cargo.toml");
        Ok(path)
    }

    fn modified_time(path: &Path) -> Result<SystemTime, ManifestError> {
        std::fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .map_err(|source| ManifestError::Read {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Read and parse the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let modified_time = Self::modified_time(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(text.into_boxed_str(), path, modified_time)
    }

    /// Parse manifest text that did not come from disk.
    pub fn from_text(text: &str) -> Result<Self, ManifestError> {
        Self::parse(Box::from(text), Path::new("Cargo.toml"), SystemTime::UNIX_EPOCH)
    }

    fn parse(text: Box<str>, path: &Path, modified_time: SystemTime) -> Result<Self, ManifestError> {
        let manifest = Document::parse(text).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            manifest,
            modified_time,
        })
    }

    /// Read the manifest of the crate cargo is currently building.
    ///
    /// Works from build scripts as well as from proc-macros.
    pub fn from_env() -> Result<Self, ManifestError> {
        Self::load(&Self::manifest_path()?)
    }

    #[inline]
    fn parse_str<T: syn::parse::Parse>(path: &str) -> Option<T> {
        syn::parse_str(path).ok()
    }

    fn find_in_deps(deps: &Table, name: &str) -> Option<syn::Path> {
        if deps.contains_key(name) {
            return Self::parse_str(&format!("::{name}"));
        }
        let module = name.strip_prefix(CRATE_PREFIX)?;
        if deps.contains_key(FACADE_NAME) {
            let mut path = Self::parse_str::<syn::Path>(&format!("::{FACADE_NAME}"))?;
            path.segments.push(Self::parse_str(module)?);
            return Some(path);
        }
        None
    }

    /// Return a [`syn::Path`] for the package named `name` as resolved from this
    /// crate's Cargo.toml. See the type-level documentation for the order.
    pub fn get_crate_path(&self, name: &str) -> syn::Path {
        for table in DEPENDENCY_TABLES {
            if let Some(Item::Table(deps)) = self.manifest.get(table)
                && let Some(path) = Self::find_in_deps(deps, name)
            {
                return path;
            }
        }

        let ident = syn::Ident::new(name, proc_macro2::Span::call_site());
        syn::Path {
            leading_colon: Some(Default::default()),
            segments: core::iter::once(syn::PathSegment::from(ident)).collect(),
        }
    }

    /// The `[package.metadata.<tool>]` table, if present.
    ///
    /// Both the `[package.metadata.tool]` header form and the inline
    /// `tool = { ... }` form are accepted.
    pub fn package_metadata(&self, tool: &str) -> Option<&dyn TableLike> {
        self.manifest
            .get("package")?
            .get("metadata")?
            .get(tool)?
            .as_table_like()
    }

    /// Obtain the [`Manifest`] of the caller's Cargo.toml, cached per path.
    ///
    /// Intended for proc-macros: parsing the manifest on every expansion is
    /// expensive, so the parsed manifest is kept until the file changes.
    ///
    /// # Panics
    ///
    /// Panics if the manifest cannot be read; a proc-macro has no other way
    /// to report it.
    pub fn shared<R>(func: impl FnOnce(&Self) -> R) -> R {
        static MANIFESTS: RwLock<BTreeMap<PathBuf, Manifest>> = RwLock::new(BTreeMap::new());

        let manifest_path =
            Self::manifest_path().expect("CARGO_MANIFEST_DIR should be auto-defined by cargo.");
        let modified_time = Self::modified_time(&manifest_path)
            .expect("The Cargo.toml should have a modified time.");

        let manifests = MANIFESTS.read().unwrap_or_else(PoisonError::into_inner);

        if let Some(manifest) = manifests.get(&manifest_path)
            && manifest.modified_time == modified_time
        {
            return func(manifest);
        }

        drop(manifests);

        let manifest = Self::load(&manifest_path).unwrap_or_else(|err| panic!("{err}"));
        let result = func(&manifest);

        MANIFESTS
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(manifest_path, manifest);

        result
    }
}
