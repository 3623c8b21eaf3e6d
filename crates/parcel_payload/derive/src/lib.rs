//! See following macros:
//!
//! - [`Host`]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Host Derivation
///
/// `#[derive(Host)]` implements `parcel_payload::Host` for a struct with named
/// fields and marks it as a host for the build-time generator.
///
/// ## Payload Slot
///
/// Exactly one field must be marked `#[parcel(payload)]`. It stores the payload
/// attached through `Host::attach` and read by `Host::payload`. Both
/// `Option<Payload>` and `Payload` are accepted.
///
/// ```rust, ignore
/// #[derive(Host)]
/// struct Ticket {
///     #[parcel(payload)]
///     payload: Option<Payload>,
/// }
/// ```
///
/// ## Transported Fields
///
/// Fields carrying `#[extra]` are picked up by the generator, which emits
/// `TicketCreator` and a `bind_ticket` method on the module's binder.
/// The derive only validates the attribute syntax.
///
/// ```rust, ignore
/// #[derive(Host)]
/// struct Ticket {
///     #[parcel(payload)]
///     payload: Option<Payload>,
///     #[extra(key = "ticket_id", required)]
///     id: i64,
///     #[extra]
///     label: Option<String>,
/// }
/// ```
///
/// - `key = "..."`: the payload key, defaults to the field name.
/// - `required`: the value becomes a constructor argument of the creator.
///
/// ## Custom Target
///
/// The default target is `module_path!()` followed by the type name. It can be
/// overridden at the type level:
///
/// ```rust, ignore
/// #[derive(Host)]
/// #[parcel(target = "screens.Ticket")]
/// struct Ticket { /* ... */ }
/// ```
///
/// Generic hosts are rejected: a payload must address one concrete type.
#[proc_macro_derive(Host, attributes(extra, parcel))]
pub fn derive_host(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    let host = match derive_data::HostDerive::from_input(&ast) {
        Ok(val) => val,
        Err(err) => return err.into_compile_error().into(),
    };

    let host_impl = impls::impl_host(&host);

    TokenStream::from(quote! {
        const _: () = {
            #host_impl
        };
    })
}
