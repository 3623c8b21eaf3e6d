use proc_macro2::TokenStream;
use quote::quote;

use crate::derive_data::HostDerive;

/// Generate implementation codes for `Host`.
pub(crate) fn impl_host(host: &HostDerive) -> TokenStream {
    let parcel_payload_path = &host.parcel_payload_path;
    let host_ = crate::path::host_(parcel_payload_path);
    let payload_ = crate::path::payload_(parcel_payload_path);
    let payload_slot_ = crate::path::payload_slot_(parcel_payload_path);
    let option_ = crate::path::option_();

    let ident = host.ident;
    let target = &host.target;
    let field = host.payload_field;

    quote! {
        impl #host_ for #ident {
            #[inline]
            fn target() -> &'static str {
                #target
            }

            #[inline]
            fn payload(&self) -> #option_<&#payload_> {
                <_ as #payload_slot_>::slot_get(&self.#field)
            }

            #[inline]
            fn attach(&mut self, payload: #payload_) {
                <_ as #payload_slot_>::slot_set(&mut self.#field, payload)
            }
        }
    }
}
