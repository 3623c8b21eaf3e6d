use core::fmt;

// -----------------------------------------------------------------------------
// TransportCategory

/// How a field's value travels inside a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransportCategory {
    Int,
    Long,
    String,
    SerializableObject,
    Unsupported,
}

impl fmt::Display for TransportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransportCategory::Int => "Int",
            TransportCategory::Long => "Long",
            TransportCategory::String => "String",
            TransportCategory::SerializableObject => "SerializableObject",
            TransportCategory::Unsupported => "Unsupported",
        })
    }
}

/// The classification of one declared field type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub category: TransportCategory,
    /// The declared type was `Option<T>`.
    pub nullable: bool,
    /// The declared type with `Option` peeled off.
    pub value_ty: syn::Type,
}

// -----------------------------------------------------------------------------
// classify

/// Classify a declared field type.
///
/// Rules, first match wins:
///
/// 1. `i32` or `Option<i32>`: [`Int`](TransportCategory::Int)
/// 2. `i64` or `Option<i64>`: [`Long`](TransportCategory::Long)
/// 3. `String` or `Option<String>`: [`String`](TransportCategory::String)
/// 4. `is_serializable(value type)`: [`SerializableObject`](TransportCategory::SerializableObject)
/// 5. otherwise [`Unsupported`](TransportCategory::Unsupported)
///
/// `Option<i64>` is decided by rule 2 and never reaches rule 4.
///
/// # Examples
///
/// ```
/// use parcel_codegen::classify::{TransportCategory, classify};
///
/// let ty: syn::Type = syn::parse_quote!(Option<i64>);
/// let class = classify(&ty, |_| true);
/// assert_eq!(class.category, TransportCategory::Long);
/// assert!(class.nullable);
/// ```
pub fn classify(ty: &syn::Type, is_serializable: impl FnOnce(&syn::Type) -> bool) -> Classification {
    let (value_ty, nullable) = match option_inner(ty) {
        Some(inner) => (inner, true),
        None => (ty, false),
    };

    let category = if is_primitive(value_ty, "i32") {
        TransportCategory::Int
    } else if is_primitive(value_ty, "i64") {
        TransportCategory::Long
    } else if is_string(value_ty) {
        TransportCategory::String
    } else if is_serializable(value_ty) {
        TransportCategory::SerializableObject
    } else {
        TransportCategory::Unsupported
    };

    Classification {
        category,
        nullable,
        value_ty: value_ty.clone(),
    }
}

fn peel(ty: &syn::Type) -> &syn::Type {
    match ty {
        syn::Type::Paren(inner) => peel(&inner.elem),
        syn::Type::Group(inner) => peel(&inner.elem),
        _ => ty,
    }
}

/// The segment names of a plain path type, generics excluded.
fn path_of(ty: &syn::Type) -> Option<(&syn::Path, Vec<String>)> {
    match peel(ty) {
        syn::Type::Path(path) if path.qself.is_none() => Some((
            &path.path,
            path.path
                .segments
                .iter()
                .map(|segment| segment.ident.to_string())
                .collect(),
        )),
        _ => None,
    }
}

fn is_one_of(segments: &[String], accepted: &[&[&str]]) -> bool {
    accepted
        .iter()
        .any(|candidate| candidate.iter().copied().eq(segments.iter().map(String::as_str)))
}

/// `T` of `Option<T>`, `core::option::Option<T>` or `std::option::Option<T>`.
fn option_inner(ty: &syn::Type) -> Option<&syn::Type> {
    let (path, segments) = path_of(ty)?;
    if !is_one_of(
        &segments,
        &[
            &["Option"],
            &["core", "option", "Option"],
            &["std", "option", "Option"],
        ],
    ) {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &path.segments.last()?.arguments else {
        return None;
    };
    let mut types = args.args.iter().filter_map(|arg| match arg {
        syn::GenericArgument::Type(ty) => Some(ty),
        _ => None,
    });
    match (types.next(), types.next()) {
        (Some(inner), None) => Some(inner),
        _ => None,
    }
}

fn is_plain(ty: &syn::Type) -> bool {
    matches!(peel(ty), syn::Type::Path(path)
        if path.path.segments.iter().all(|segment| segment.arguments.is_none()))
}

fn is_primitive(ty: &syn::Type, name: &str) -> bool {
    if !is_plain(ty) {
        return false;
    }
    path_of(ty).is_some_and(|(_, segments)| {
        is_one_of(
            &segments,
            &[&[name], &["core", "primitive", name], &["std", "primitive", name]],
        )
    })
}

fn is_string(ty: &syn::Type) -> bool {
    if !is_plain(ty) {
        return false;
    }
    path_of(ty).is_some_and(|(_, segments)| {
        is_one_of(
            &segments,
            &[
                &["String"],
                &["std", "string", "String"],
                &["alloc", "string", "String"],
            ],
        )
    })
}
