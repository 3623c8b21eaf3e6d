//! Rendering [`TypeDescription`]s as Rust tokens.

use parcel_macro_utils::Manifest;
use proc_macro2::{Literal, TokenStream};
use quote::{ToTokens, quote};

use crate::classify::TransportCategory;
use crate::desc::{
    ABSENT_NUMBER, Extraction, Init, MethodSpec, Receiver, Shape, Statement, TypeDescription,
    TypeSpec,
};

// -----------------------------------------------------------------------------
// Paths

/// How generated code names the runtime crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderPaths {
    /// `::parcel_payload`, or `::parcel::payload` behind the facade.
    pub payload: syn::Path,
}

impl Default for RenderPaths {
    fn default() -> Self {
        Self {
            payload: syn::parse_quote!(::parcel_payload),
        }
    }
}

impl RenderPaths {
    /// Resolve the runtime crate the way `manifest`'s crate depends on it.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self {
            payload: manifest.get_crate_path("parcel_payload"),
        }
    }
}

// -----------------------------------------------------------------------------
// Render

/// Render the definition and the inherent impl of `description`.
///
/// The output only depends on its inputs, rendering the same description
/// twice yields the same tokens.
pub fn render_type(description: &TypeDescription, paths: &RenderPaths) -> TokenStream {
    let name = &description.name;
    let doc = &description.doc;

    let definition = match description.shape {
        Shape::Unit => quote! {
            #[doc = #doc]
            pub struct #name;
        },
        Shape::Struct => {
            let fields = description.fields.iter().map(|field| {
                let field_name = &field.name;
                let ty = render_ty(&field.ty, paths);
                quote! { #field_name: #ty }
            });
            quote! {
                #[doc = #doc]
                pub struct #name {
                    #(#fields,)*
                }
            }
        }
    };

    let methods = description
        .methods
        .iter()
        .map(|method| render_method(method, paths));

    quote! {
        #definition

        #[allow(clippy::too_many_arguments)]
        impl #name {
            #(#methods)*
        }
    }
}

fn render_ty(ty: &TypeSpec, paths: &RenderPaths) -> TokenStream {
    let payload = &paths.payload;
    match ty {
        TypeSpec::SelfType => quote! { Self },
        TypeSpec::Bool => quote! { bool },
        TypeSpec::ContextRef => quote! { &#payload::Context },
        TypeSpec::Payload => quote! { #payload::Payload },
        TypeSpec::PayloadResult => {
            quote! { ::core::result::Result<#payload::Payload, #payload::PayloadError> }
        }
        TypeSpec::FlagSlice => quote! { &[#payload::LaunchFlags] },
        TypeSpec::HostMut(host) => quote! { &mut #host },
        TypeSpec::Value(ty) => ty.to_token_stream(),
        TypeSpec::Optional(ty) => quote! { ::core::option::Option<#ty> },
        TypeSpec::Into(ty) => quote! { impl ::core::convert::Into<#ty> },
    }
}

fn render_method(method: &MethodSpec, paths: &RenderPaths) -> TokenStream {
    let name = &method.name;
    let doc = &method.doc;
    let receiver = match method.receiver {
        Receiver::None => TokenStream::new(),
        Receiver::Value => quote! { self, },
        Receiver::MutValue => quote! { mut self, },
    };
    let params = method.params.iter().map(|param| {
        let param_name = &param.name;
        let ty = render_ty(&param.ty, paths);
        quote! { #param_name: #ty }
    });
    let returns = method.returns.as_ref().map(|ty| {
        let ty = render_ty(ty, paths);
        quote! { -> #ty }
    });
    let body = method
        .body
        .iter()
        .map(|statement| render_statement(statement, paths));

    quote! {
        #[doc = #doc]
        pub fn #name(#receiver #(#params),*) #returns {
            #(#body)*
        }
    }
}

fn render_statement(statement: &Statement, paths: &RenderPaths) -> TokenStream {
    let payload_crate = &paths.payload;
    match statement {
        Statement::Construct { fields } => {
            let fields = fields.iter().map(|(field, init)| {
                let value = match init {
                    Init::NewPayload { context, host } => quote! {
                        #payload_crate::Payload::new(
                            #context,
                            <#host as #payload_crate::Host>::target(),
                        )
                    },
                    Init::Param(param) => param.to_token_stream(),
                    Init::Absent => quote! { ::core::option::Option::None },
                };
                quote! { #field: #value }
            });
            quote! { Self { #(#fields),* } }
        }
        Statement::SetOptional { field, param } => quote! {
            self.#field = ::core::option::Option::Some(::core::convert::Into::into(#param));
        },
        Statement::ForwardFlags { payload, flags } => quote! {
            for flag in #flags {
                self.#payload.add_flag(*flag);
            }
        },
        Statement::TakePayload { local, field } => quote! {
            let mut #local = self.#field;
        },
        Statement::Put {
            payload,
            key,
            category,
            field,
            only_if_present,
        } => {
            let by_ref = is_object(*category);
            let put = put_method(*category);
            let try_ = by_ref.then(|| quote! { ? });
            if *only_if_present {
                let value = if by_ref { quote! { &value } } else { quote! { value } };
                quote! {
                    if let ::core::option::Option::Some(value) = self.#field {
                        #payload.#put(#key, #value) #try_;
                    }
                }
            } else {
                let value = if by_ref {
                    quote! { &self.#field }
                } else {
                    quote! { self.#field }
                };
                quote! { #payload.#put(#key, #value) #try_; }
            }
        }
        Statement::LoadPayload {
            local,
            host,
            host_ty,
        } => quote! {
            let ::core::option::Option::Some(#local) =
                <#host_ty as #payload_crate::Host>::payload(#host)
            else {
                return false;
            };
        },
        Statement::Extract {
            local,
            payload,
            key,
            extraction,
        } => {
            let absent = number(ABSENT_NUMBER);
            let read = match extraction {
                Extraction::Int { nullable } => {
                    some_if(*nullable, quote! { #payload.get_int(#key, #absent) })
                }
                Extraction::Long { nullable } => {
                    some_if(*nullable, quote! { #payload.get_long(#key, #absent) })
                }
                Extraction::String { nullable: true } => quote! { #payload.get_string(#key) },
                Extraction::String { nullable: false } => {
                    quote! { #payload.get_string(#key).unwrap_or_default() }
                }
                Extraction::Serializable { ty } => {
                    quote! { #payload.get_serializable::<#ty>(#key) }
                }
            };
            quote! { let #local = #read; }
        }
        Statement::Assign {
            host,
            field,
            local,
            only_if_present: true,
        } => quote! {
            if let ::core::option::Option::Some(value) = #local {
                #host.#field = value;
            }
        },
        Statement::Assign {
            host,
            field,
            local,
            only_if_present: false,
        } => quote! { #host.#field = #local; },
        Statement::ReturnSelf => quote! { self },
        Statement::ReturnOk { local } => quote! { ::core::result::Result::Ok(#local) },
        Statement::ReturnOkField { field } => {
            quote! { ::core::result::Result::Ok(self.#field) }
        }
        Statement::ReturnBool(value) => value.to_token_stream(),
    }
}

#[inline]
fn is_object(category: TransportCategory) -> bool {
    matches!(
        category,
        TransportCategory::SerializableObject | TransportCategory::Unsupported
    )
}

fn put_method(category: TransportCategory) -> syn::Ident {
    let name = match category {
        TransportCategory::Int => "put_int",
        TransportCategory::Long => "put_long",
        TransportCategory::String => "put_string",
        TransportCategory::SerializableObject | TransportCategory::Unsupported => "put_serializable",
    };
    syn::Ident::new(name, proc_macro2::Span::call_site())
}

/// An unsuffixed integer, so the same tokens read as `i32` and `i64`.
fn number(value: i32) -> TokenStream {
    let magnitude = Literal::u32_unsuffixed(value.unsigned_abs());
    if value < 0 {
        quote! { -#magnitude }
    } else {
        magnitude.to_token_stream()
    }
}

fn some_if(wrap: bool, read: TokenStream) -> TokenStream {
    if wrap {
        quote! { ::core::option::Option::Some(#read) }
    } else {
        read
    }
}

#[cfg(test)]
mod tests {
    use super::{RenderPaths, render_type};
    use crate::config::GeneratorConfig;
    use crate::synth::tests::{TICKET, schemas};
    use crate::synth::{PackageBinderGroup, synthesize_bind_method, synthesize_binder, synthesize_builder};
    use crate::Package;
    use parcel_macro_utils::Manifest;
    use quote::ToTokens;

    fn impl_fns(file: &syn::File) -> Vec<&syn::ImplItemFn> {
        file.items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Impl(imp) => Some(imp),
                _ => None,
            })
            .flat_map(|imp| imp.items.iter())
            .filter_map(|item| match item {
                syn::ImplItem::Fn(function) => Some(function),
                _ => None,
            })
            .collect()
    }

    fn inputs(function: &syn::ImplItemFn) -> Vec<String> {
        function
            .sig
            .inputs
            .iter()
            .map(|input| input.to_token_stream().to_string())
            .collect()
    }

    #[test]
    fn creator_renders_as_valid_rust() {
        let schema = &schemas("screens", TICKET)[0];
        let creator = synthesize_builder(schema, &GeneratorConfig::default()).description;
        let tokens = render_type(&creator, &RenderPaths::default());
        let file: syn::File = syn::parse2(tokens).unwrap();

        assert!(matches!(&file.items[0], syn::Item::Struct(item) if item.ident == "TicketCreator"));
        let fns = impl_fns(&file);
        let names: Vec<String> = fns.iter().map(|f| f.sig.ident.to_string()).collect();
        assert_eq!(names, ["new", "label", "add_flags", "create"]);
        assert_eq!(
            inputs(fns[0]),
            ["context : & :: parcel_payload :: Context", "id : i64"]
        );
        assert_eq!(
            inputs(fns[1]),
            ["mut self", "value : impl :: core :: convert :: Into < String >"]
        );
    }

    #[test]
    fn binder_renders_as_valid_rust() {
        let schemas = schemas(
            "screens",
            &format!(
                r#"
                {TICKET}
                #[derive(Serialize, Deserialize)] pub struct Book;
                #[derive(Host)] pub struct Shelf {{ #[extra] book: Book, #[extra] n: Option<i32> }}
                "#
            ),
        );
        let mut group = PackageBinderGroup::new(Package::new("screens"));
        for schema in &schemas {
            group.push(synthesize_bind_method(schema));
        }
        let binder = synthesize_binder(&group, &GeneratorConfig::default()).description;
        let tokens = render_type(&binder, &RenderPaths::default());
        let text = tokens.to_string();
        let file: syn::File = syn::parse2(tokens).unwrap();

        assert!(matches!(&file.items[0], syn::Item::Struct(item)
            if item.ident == "PayloadBinder" && matches!(item.fields, syn::Fields::Unit)));
        let fns = impl_fns(&file);
        assert_eq!(fns.len(), 2);
        assert_eq!(inputs(fns[0]), ["host : & mut Ticket"]);
        assert!(text.contains("get_long (\"id\" , - 1)"));
        assert!(text.contains("get_serializable :: < Book > (\"book\")"));
        assert!(text.contains(":: core :: option :: Option :: Some (payload . get_int (\"n\" , - 1))"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let schema = &schemas("screens", TICKET)[0];
        let creator = synthesize_builder(schema, &GeneratorConfig::default()).description;
        let paths = RenderPaths::default();
        assert_eq!(
            render_type(&creator, &paths).to_string(),
            render_type(&creator, &paths).to_string()
        );
    }

    #[test]
    fn facade_paths() {
        let manifest = Manifest::from_text(
            "[package]\nname = \"app\"\n[dependencies]\nparcel = \"0.0.1\"\n",
        )
        .unwrap();
        let paths = RenderPaths::from_manifest(&manifest);
        let schema = &schemas("", TICKET)[0];
        let creator = synthesize_builder(schema, &GeneratorConfig::default()).description;
        let text = render_type(&creator, &paths).to_string();
        assert!(text.contains(":: parcel :: payload :: Payload"));
        assert!(!text.contains("parcel_payload"));
    }
}
