use core::fmt;
use std::path::PathBuf;

/// A module of the scanned crate, named by its path from the crate root.
///
/// The crate root itself is the empty package. Generated types are emitted
/// into the package of the host they were synthesized for.
///
/// Packages order lexicographically by their path, which is the order
/// package binders are emitted in.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Package {
    path: String,
}

impl Package {
    /// The crate root.
    #[inline]
    pub const fn root() -> Self {
        Self {
            path: String::new(),
        }
    }

    /// Parse a module path such as `screens::detail`.
    ///
    /// A leading `crate::` is accepted and ignored; `crate` alone is the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use parcel_codegen::Package;
    ///
    /// assert_eq!(Package::new("crate::screens").as_str(), "screens");
    /// assert!(Package::new("").is_root());
    /// assert!(Package::new("crate").is_root());
    /// ```
    pub fn new(path: &str) -> Self {
        let segments = path
            .split("::")
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .skip_while(|segment| *segment == "crate");
        Self::from_segments(segments)
    }

    pub fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut path = String::new();
        for segment in segments {
            if !path.is_empty() {
                path.push_str("::");
            }
            path.push_str(segment);
        }
        Self { path }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split("::").filter(|segment| !segment.is_empty())
    }

    /// The package of the module `name` declared inside this one.
    pub fn child(&self, name: &str) -> Self {
        Self::from_segments(self.segments().chain(core::iter::once(name)))
    }

    /// The enclosing package, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        let mut segments: Vec<&str> = self.segments().collect();
        segments.pop();
        Some(Self::from_segments(segments))
    }

    /// The relative directory generated files of this package are written to.
    pub fn dir(&self) -> PathBuf {
        self.segments().collect()
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            f.write_str("crate")
        } else {
            write!(f, "crate::{}", self.path)
        }
    }
}
