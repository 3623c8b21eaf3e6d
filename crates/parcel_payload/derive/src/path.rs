//! This independent module is used to provide the required paths,
//! so as to minimize changes when the `parcel_payload` structure is modified.

use proc_macro2::TokenStream;
use quote::quote;

// -----------------------------------------------------------------------------
// Crate Path

/// Get the correct access path to the `parcel_payload` crate.
///
/// 1. For crates that depend on `parcel_payload`, `::parcel_payload` is returned.
/// 2. For crates that depend on `parcel`, `::parcel::payload` is returned.
/// 3. For other situations, `::parcel_payload` is returned, but this may be incorrect.
///
/// The cost is relatively high (reading the caller's `Cargo.toml`), so the
/// result is passed around instead of recomputed.
pub(crate) fn parcel_payload() -> syn::Path {
    parcel_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("parcel_payload"))
}

// -----------------------------------------------------------------------------
// Items

#[inline(always)]
pub(crate) fn host_(parcel_payload_path: &syn::Path) -> TokenStream {
    quote! {
        #parcel_payload_path::Host
    }
}

#[inline(always)]
pub(crate) fn payload_(parcel_payload_path: &syn::Path) -> TokenStream {
    quote! {
        #parcel_payload_path::Payload
    }
}

#[inline(always)]
pub(crate) fn payload_slot_(parcel_payload_path: &syn::Path) -> TokenStream {
    quote! {
        #parcel_payload_path::__macro_exports::PayloadSlot
    }
}

// -----------------------------------------------------------------------------
// Full paths of prelude items

#[inline(always)]
pub(crate) fn option_() -> TokenStream {
    quote! { ::core::option::Option }
}
