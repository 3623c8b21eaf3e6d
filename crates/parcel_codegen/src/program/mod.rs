//! Read-only queries over the declarations of the scanned crate.
//!
//! The generator never walks syntax trees itself. It asks a [`Program`] for
//! marked declarations, their enclosing types and their fields, and refers
//! to everything through the small handles defined here. [`SourceProgram`]
//! answers these queries from parsed source files.

mod source;

pub use source::SourceProgram;

use proc_macro2::Ident;

use crate::Package;

// -----------------------------------------------------------------------------
// Handles

/// Identity of a declared type.
///
/// Two handles are equal only if they denote the same declaration; types
/// that merely share a name in different modules are distinct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeRef(pub u32);

/// A field of a declared type, by declaration index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldRef {
    pub owner: TypeRef,
    pub index: u32,
}

/// Any declaration the generator may report on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeclRef {
    Type(TypeRef),
    Field(FieldRef),
    /// Functions, constants, enum variants and other declarations that can
    /// carry attributes but are neither types nor fields.
    Other(u32),
}

/// The attributes the generator looks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `#[derive(Host)]` on a type.
    Host,
    /// `#[extra]` on any declaration.
    Extra,
}

/// Capabilities a type can be checked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Implements `parcel_payload::Host`.
    Host,
}

// -----------------------------------------------------------------------------
// Program

/// The reflection interface the generator consumes.
///
/// Handles are only meaningful for the program that returned them. Queries
/// about a handle the program does not know answer with the neutral value
/// (`false`, `None`, empty).
pub trait Program {
    /// Every declaration carrying `marker`, in declaration order.
    fn marked_declarations(&self, marker: Marker) -> Vec<DeclRef>;

    /// The type `decl` belongs to. A type is its own enclosing type.
    fn enclosing_type(&self, decl: DeclRef) -> Option<TypeRef>;

    /// Whether `ty` is a struct with named fields.
    fn is_struct_like(&self, ty: TypeRef) -> bool;

    fn is_assignable(&self, ty: TypeRef, capability: Capability) -> bool;

    /// Whether `ty`, written inside the declaration of `within`, names a type
    /// that can be transported as a serialized object.
    fn is_serializable(&self, ty: &syn::Type, within: TypeRef) -> bool;

    #[inline]
    fn same_type(&self, a: TypeRef, b: TypeRef) -> bool {
        a == b
    }

    /// The fields declared directly on `ty`, in declaration order.
    fn fields_of(&self, ty: TypeRef) -> Vec<FieldRef>;

    fn field(&self, field: FieldRef) -> Option<&syn::Field>;

    fn simple_name(&self, ty: TypeRef) -> Option<Ident>;

    /// The path of `ty` from the crate root, e.g. `crate::screens::Ticket`.
    fn qualified_name(&self, ty: TypeRef) -> String;

    fn package_of(&self, ty: TypeRef) -> Package;

    /// The type declared as `name` directly in `package`, if any.
    fn type_named(&self, package: &Package, name: &str) -> Option<TypeRef>;

    /// A human readable description of `decl` for diagnostics.
    fn describe(&self, decl: DeclRef) -> String;
}
