//! Parse a `#[derive(Host)]` input into the data the implementation needs.

use parcel_macro_utils::attrs::{ExtraAttr, ParcelAttrs};
use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Data, DeriveInput, Fields, Ident, spanned::Spanned};

/// How the host names itself in `Host::target`.
pub(crate) enum TargetExpr {
    /// `#[parcel(target = "...")]`
    Custom(syn::LitStr),
    /// `concat!(module_path!(), "::", "Ident")`
    ModulePath(String),
}

impl ToTokens for TargetExpr {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        match self {
            TargetExpr::Custom(lit) => lit.to_tokens(tokens),
            TargetExpr::ModulePath(ident) => tokens.extend(quote! {
                ::core::concat!(::core::module_path!(), "::", #ident)
            }),
        }
    }
}

pub(crate) struct HostDerive<'a> {
    pub ident: &'a Ident,
    pub target: TargetExpr,
    /// The field marked `#[parcel(payload)]`.
    pub payload_field: &'a Ident,
    pub parcel_payload_path: syn::Path,
}

impl<'a> HostDerive<'a> {
    pub fn from_input(ast: &'a DeriveInput) -> syn::Result<Self> {
        if !ast.generics.params.is_empty() {
            return Err(syn::Error::new(
                ast.generics.span(),
                "`Host` cannot be derived for generic types, a payload addresses one concrete type",
            ));
        }

        let fields = match &ast.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => &named.named,
                _ => {
                    return Err(syn::Error::new(
                        ast.ident.span(),
                        "`Host` can only be derived for structs with named fields",
                    ));
                }
            },
            _ => {
                return Err(syn::Error::new(
                    ast.ident.span(),
                    "`Host` can only be derived for structs with named fields",
                ));
            }
        };

        let type_attrs = ParcelAttrs::from_attrs(&ast.attrs)?;
        if let Some(span) = type_attrs.payload {
            return Err(syn::Error::new(
                span,
                "`payload` belongs on a field, not on the host type",
            ));
        }

        let mut payload_field: Option<&'a Ident> = None;
        for field in fields {
            // Named fields always carry an ident.
            let Some(ident) = field.ident.as_ref() else {
                continue;
            };

            let field_attrs = ParcelAttrs::from_attrs(&field.attrs)?;
            if let Some(target) = &field_attrs.target {
                return Err(syn::Error::new(
                    target.span(),
                    "`target` belongs on the host type, not on a field",
                ));
            }

            // Surface malformed markers at compile time as well.
            let extra = ExtraAttr::from_attrs(&field.attrs)?;

            if let Some(span) = field_attrs.payload {
                if extra.is_some() {
                    return Err(syn::Error::new(
                        span,
                        "the payload slot cannot be transported as an `#[extra]`",
                    ));
                }
                if payload_field.is_some() {
                    return Err(syn::Error::new(
                        span,
                        "only one field can be marked `#[parcel(payload)]`",
                    ));
                }
                payload_field = Some(ident);
            }
        }

        let Some(payload_field) = payload_field else {
            return Err(syn::Error::new(
                ast.ident.span(),
                "`#[derive(Host)]` requires one field marked `#[parcel(payload)]`",
            ));
        };

        let target = match type_attrs.target {
            Some(lit) => TargetExpr::Custom(lit),
            None => TargetExpr::ModulePath(ast.ident.to_string()),
        };

        Ok(Self {
            ident: &ast.ident,
            target,
            payload_field,
            parcel_payload_path: crate::path::parcel_payload(),
        })
    }
}
