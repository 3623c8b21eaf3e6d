//! The generated types, as data.
//!
//! Synthesizers build a [`TypeDescription`] and never produce source text
//! themselves. [`render`](crate::render) turns a description into tokens once
//! the paths of the runtime crate are known.

use proc_macro2::Ident;

use crate::classify::TransportCategory;

// -----------------------------------------------------------------------------
// Types

/// A generated type with its inherent methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDescription {
    pub name: Ident,
    pub doc: String,
    pub shape: Shape,
    pub fields: Vec<FieldSpec>,
    pub methods: Vec<MethodSpec>,
}

impl TypeDescription {
    pub fn method(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    /// `struct Name;`
    Unit,
    /// `struct Name { .. }` with private fields.
    Struct,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: Ident,
    pub ty: TypeSpec,
}

/// Types appearing in generated signatures.
///
/// Runtime types are symbolic so the renderer can pick the path the
/// scanned crate uses for the runtime crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeSpec {
    /// `Self`
    SelfType,
    /// `bool`
    Bool,
    /// `&Context`
    ContextRef,
    /// `Payload`
    Payload,
    /// `Result<Payload, PayloadError>`
    PayloadResult,
    /// `&[LaunchFlags]`
    FlagSlice,
    /// `&mut Host`, a host declared next to the generated type.
    HostMut(Ident),
    /// A type written in the host's declaration.
    Value(syn::Type),
    /// `Option<T>` of a type written in the host's declaration.
    Optional(syn::Type),
    /// `impl Into<T>` of a type written in the host's declaration.
    Into(syn::Type),
}

// -----------------------------------------------------------------------------
// Methods

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSpec {
    pub name: Ident,
    pub doc: String,
    pub receiver: Receiver,
    pub params: Vec<Param>,
    pub returns: Option<TypeSpec>,
    pub body: Vec<Statement>,
}

impl MethodSpec {
    pub fn param_names(&self) -> Vec<String> {
        self.params.iter().map(|param| param.name.to_string()).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Receiver {
    /// An associated function.
    None,
    /// `self`
    Value,
    /// `mut self`
    MutValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: Ident,
    pub ty: TypeSpec,
}

/// The value assigned to a field in [`Statement::Construct`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Init {
    /// `Payload::new(<context>, <Host as Host>::target())`
    NewPayload { context: Ident, host: Ident },
    /// The parameter of the same name.
    Param(Ident),
    /// `None`
    Absent,
}

/// One statement of a generated method body.
///
/// The set is closed: the renderer handles every variant, and only these
/// can appear in generated code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statement {
    /// `Self { field: init, .. }` as the tail expression.
    Construct { fields: Vec<(Ident, Init)> },
    /// `self.<field> = Some(<param>);`
    SetOptional { field: Ident, param: Ident },
    /// `for flag in <flags> { self.<payload>.add_flag(*flag); }`
    ForwardFlags { payload: Ident, flags: Ident },
    /// `let mut <local> = self.<field>;`
    TakePayload { local: Ident, field: Ident },
    /// `<payload>.put_<category>(<key>, self.<field>);`
    ///
    /// With `only_if_present` the field is an `Option` and the put only
    /// happens for `Some`.
    Put {
        payload: Ident,
        key: String,
        category: TransportCategory,
        field: Ident,
        only_if_present: bool,
    },
    /// `let Some(<local>) = <Host as Host>::payload(<host>) else { return false; };`
    LoadPayload { local: Ident, host: Ident, host_ty: Ident },
    /// `let <local> = <payload>.get_<category>(<key>, ..);`
    Extract {
        local: Ident,
        payload: Ident,
        key: String,
        extraction: Extraction,
    },
    /// `<host>.<field> = <local>;`, or only for `Some` with `only_if_present`.
    Assign {
        host: Ident,
        field: Ident,
        local: Ident,
        only_if_present: bool,
    },
    /// `self` as the tail expression.
    ReturnSelf,
    /// `Ok(<local>)` as the tail expression.
    ReturnOk { local: Ident },
    /// `Ok(self.<field>)` as the tail expression.
    ReturnOkField { field: Ident },
    /// `true` or `false` as the tail expression.
    ReturnBool(bool),
}

/// How one value is read back from a payload, with the shape of the
/// resulting local.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Extraction {
    /// `get_int(key, -1)`, wrapped in `Some` if `nullable`.
    Int { nullable: bool },
    /// `get_long(key, -1)`, wrapped in `Some` if `nullable`.
    Long { nullable: bool },
    /// `get_string(key)`, or `get_string(key).unwrap_or_default()` if not
    /// `nullable`.
    String { nullable: bool },
    /// `get_serializable::<T>(key)`, always an `Option<T>`.
    Serializable { ty: syn::Type },
}

/// The absence sentinel of `Int` and `Long` reads.
pub const ABSENT_NUMBER: i32 = -1;
