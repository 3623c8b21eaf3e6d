use parcel_utils::naming::unique_name;
use proc_macro2::Ident;
use quote::format_ident;
use syn::ext::IdentExt;

use super::GeneratedArtifact;
use crate::config::GeneratorConfig;
use crate::desc::{
    FieldSpec, Init, MethodSpec, Param, Receiver, Shape, Statement, TypeDescription, TypeSpec,
};
use crate::schema::HostSchema;

/// Synthesize the creator of `schema`'s host.
///
/// ```ignore
/// pub struct TicketCreator { payload: Payload, id: i64, label: Option<String> }
///
/// impl TicketCreator {
///     pub fn new(context: &Context, id: i64) -> Self;
///     pub fn label(mut self, value: impl Into<String>) -> Self;
///     pub fn add_flags(mut self, flags: &[LaunchFlags]) -> Self;
///     pub fn create(self) -> Result<Payload, PayloadError>;
/// }
/// ```
///
/// Constructor parameters and setters follow the schema order. The names the
/// creator introduces itself (`payload`, `context`) get a `_` suffix when a
/// transported field already uses them.
pub fn synthesize_builder(schema: &HostSchema, config: &GeneratorConfig) -> GeneratedArtifact {
    let host = &schema.name;
    let name = config.creator_ident(host);

    let taken = |candidate: &str| schema.fields.iter().any(|field| field.name.unraw() == candidate);
    let payload_field = format_ident!("{}", unique_name("payload", taken));
    let context = format_ident!("{}", unique_name("context", taken));

    let mut fields = vec![FieldSpec {
        name: payload_field.clone(),
        ty: TypeSpec::Payload,
    }];
    fields.extend(schema.fields.iter().map(|field| FieldSpec {
        name: field.name.clone(),
        ty: if field.required {
            TypeSpec::Value(field.value_ty.clone())
        } else {
            TypeSpec::Optional(field.value_ty.clone())
        },
    }));

    let mut methods = vec![constructor(schema, &payload_field, &context)];
    methods.extend(schema.optional().map(|field| {
        let value = format_ident!("value");
        MethodSpec {
            name: field.name.clone(),
            doc: format!("Set the optional `{}` extra.", field.key),
            receiver: Receiver::MutValue,
            params: vec![Param {
                name: value.clone(),
                ty: TypeSpec::Into(field.value_ty.clone()),
            }],
            returns: Some(TypeSpec::SelfType),
            body: vec![
                Statement::SetOptional {
                    field: field.name.clone(),
                    param: value,
                },
                Statement::ReturnSelf,
            ],
        }
    }));
    methods.push(add_flags(&payload_field));
    methods.push(create(schema, &payload_field));

    GeneratedArtifact {
        package: schema.package.clone(),
        description: TypeDescription {
            doc: format!(
                "Creates payloads addressed at [`{host}`].\n\n\
                 Required extras are arguments of [`{name}::new`], optional extras are \
                 only written once their setter was called."
            ),
            name,
            shape: Shape::Struct,
            fields,
            methods,
        },
    }
}

fn constructor(schema: &HostSchema, payload_field: &Ident, context: &Ident) -> MethodSpec {
    let mut params = vec![Param {
        name: context.clone(),
        ty: TypeSpec::ContextRef,
    }];
    params.extend(schema.required().map(|field| Param {
        name: field.name.clone(),
        ty: TypeSpec::Value(field.value_ty.clone()),
    }));

    let mut inits = vec![(
        payload_field.clone(),
        Init::NewPayload {
            context: context.clone(),
            host: schema.name.clone(),
        },
    )];
    inits.extend(schema.fields.iter().map(|field| {
        let init = if field.required {
            Init::Param(field.name.clone())
        } else {
            Init::Absent
        };
        (field.name.clone(), init)
    }));

    MethodSpec {
        name: format_ident!("new"),
        doc: String::from("Start a payload sent from `context` with every required extra."),
        receiver: Receiver::None,
        params,
        returns: Some(TypeSpec::SelfType),
        body: vec![Statement::Construct { fields: inits }],
    }
}

fn add_flags(payload_field: &Ident) -> MethodSpec {
    let flags = format_ident!("flags");
    MethodSpec {
        name: format_ident!("add_flags"),
        doc: String::from("Add launch flags to the payload."),
        receiver: Receiver::MutValue,
        params: vec![Param {
            name: flags.clone(),
            ty: TypeSpec::FlagSlice,
        }],
        returns: Some(TypeSpec::SelfType),
        body: vec![
            Statement::ForwardFlags {
                payload: payload_field.clone(),
                flags,
            },
            Statement::ReturnSelf,
        ],
    }
}

fn create(schema: &HostSchema, payload_field: &Ident) -> MethodSpec {
    let body = if schema.is_empty() {
        vec![Statement::ReturnOkField {
            field: payload_field.clone(),
        }]
    } else {
        let local = format_ident!("payload");
        let mut body = vec![Statement::TakePayload {
            local: local.clone(),
            field: payload_field.clone(),
        }];
        body.extend(schema.fields.iter().map(|field| Statement::Put {
            payload: local.clone(),
            key: field.key.clone(),
            category: field.category,
            field: field.name.clone(),
            only_if_present: !field.required,
        }));
        body.push(Statement::ReturnOk { local });
        body
    };

    MethodSpec {
        name: format_ident!("create"),
        doc: String::from(
            "Write every required extra and each optional extra that was set.\n\n\
             Fails if a serializable extra cannot be encoded.",
        ),
        receiver: Receiver::Value,
        params: Vec::new(),
        returns: Some(TypeSpec::PayloadResult),
        body,
    }
}
