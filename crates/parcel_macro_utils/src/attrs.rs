//! Parser for the attributes understood by `#[derive(Host)]` and the
//! build-time generator.
//!
//! Field level:
//!
//! ```ignore
//! #[extra]                               // key defaults to the field name
//! #[extra(key = "ticket_id")]
//! #[extra(key = "ticket_id", required)]
//! #[extra(required = false)]
//! #[parcel(payload)]                     // the host's payload slot
//! ```
//!
//! Type level:
//!
//! ```ignore
//! #[parcel(target = "screens.Ticket")]
//! ```
//!
//! Both consumers must agree on this grammar, which is why it lives here.

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::{Attribute, LitBool, LitStr, Meta, Token};

/// Name of the marker attribute placed on transported fields.
pub const EXTRA_ATTRIBUTE: &str = "extra";

/// Name of the attribute carrying host options.
pub const PARCEL_ATTRIBUTE: &str = "parcel";

// -----------------------------------------------------------------------------
// ExtraAttr

/// A parsed `#[extra(...)]` marker.
#[derive(Debug, Clone)]
pub struct ExtraAttr {
    /// The explicit key, `None` when the attribute does not name one.
    pub key: Option<LitStr>,
    /// Default is `false`.
    pub required: bool,
    pub span: Span,
}

impl ExtraAttr {
    /// Whether `attr` is an `#[extra]` marker, regardless of its arguments.
    #[inline]
    pub fn is_marker(attr: &Attribute) -> bool {
        attr.path().is_ident(EXTRA_ATTRIBUTE)
    }

    /// Parse one `#[extra]` attribute.
    ///
    /// This function does **not** check the attribute name,
    /// it is guaranteed by the caller.
    pub fn parse_attr(attr: &Attribute) -> syn::Result<Self> {
        let mut parsed = ExtraAttr {
            key: None,
            required: false,
            span: attr.span(),
        };

        if let Meta::Path(_) = &attr.meta {
            return Ok(parsed);
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("key") {
                if parsed.key.is_some() {
                    return Err(meta.error("duplicate `key` in `#[extra(...)]`"));
                }
                parsed.key = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("required") {
                parsed.required = if meta.input.peek(Token![=]) {
                    meta.value()?.parse::<LitBool>()?.value
                } else {
                    true
                };
                Ok(())
            } else {
                Err(meta.error("expected `key = \"...\"` or `required`"))
            }
        })?;

        Ok(parsed)
    }

    /// Find and parse the `#[extra]` marker among `attrs`.
    ///
    /// Returns `Ok(None)` if the field is not marked, and an error if it is
    /// marked more than once.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Option<Self>> {
        let mut found: Option<Self> = None;
        for attr in attrs.iter().filter(|attr| Self::is_marker(attr)) {
            if found.is_some() {
                return Err(syn::Error::new(
                    attr.span(),
                    "a field can carry only one `#[extra]` attribute",
                ));
            }
            found = Some(Self::parse_attr(attr)?);
        }
        Ok(found)
    }

    /// The explicit key as a string.
    #[inline]
    pub fn key(&self) -> Option<String> {
        self.key.as_ref().map(LitStr::value)
    }
}

// -----------------------------------------------------------------------------
// ParcelAttrs

/// Parsed `#[parcel(...)]` options of a type or a field.
#[derive(Debug, Default, Clone)]
pub struct ParcelAttrs {
    /// Set by `#[parcel(payload)]` on the field holding the attached payload.
    pub payload: Option<Span>,
    /// Set by `#[parcel(target = "...")]` on the host type.
    pub target: Option<LitStr>,
}

impl ParcelAttrs {
    /// Collect every `#[parcel(...)]` among `attrs`.
    pub fn from_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs
            .iter()
            .filter(|attr| attr.path().is_ident(PARCEL_ATTRIBUTE))
        {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("payload") {
                    if parsed.payload.is_some() {
                        return Err(meta.error("duplicate `payload` flag"));
                    }
                    parsed.payload = Some(meta.path.span());
                    Ok(())
                } else if meta.path.is_ident("target") {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(syn::Error::new(lit.span(), "`target` must not be empty"));
                    }
                    parsed.target = Some(lit);
                    Ok(())
                } else {
                    Err(meta.error("expected `payload` or `target = \"...\"`"))
                }
            })?;
        }
        Ok(parsed)
    }
}
