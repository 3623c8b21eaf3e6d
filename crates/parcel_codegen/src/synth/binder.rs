use parcel_utils::naming::{to_snake_case, unique_name};
use quote::format_ident;
use syn::ext::IdentExt;

use super::{GeneratedArtifact, PackageBinderGroup};
use crate::classify::TransportCategory;
use crate::config::GeneratorConfig;
use crate::desc::{Extraction, MethodSpec, Param, Receiver, Shape, Statement, TypeDescription, TypeSpec};
use crate::schema::{HostSchema, MarkedField};

/// Synthesize `bind_<host>` for `schema`'s host.
///
/// ```ignore
/// pub fn bind_ticket(host: &mut Ticket) -> bool {
///     let Some(payload) = <Ticket as Host>::payload(host) else { return false; };
///     let id = payload.get_long("id", -1);
///     let label = payload.get_string("label");
///     host.id = id;
///     host.label = label;
///     true
/// }
/// ```
///
/// Every value is read before the first field is assigned, the payload is
/// borrowed from the host until then.
pub fn synthesize_bind_method(schema: &HostSchema) -> MethodSpec {
    let taken = |candidate: &str| schema.fields.iter().any(|field| field.name.unraw() == candidate);
    let host = format_ident!("{}", unique_name("host", taken));
    let payload = format_ident!(
        "{}",
        unique_name("payload", |candidate| taken(candidate) || host == candidate)
    );

    let mut body = vec![Statement::LoadPayload {
        local: payload.clone(),
        host: host.clone(),
        host_ty: schema.name.clone(),
    }];
    body.extend(schema.fields.iter().map(|field| Statement::Extract {
        local: field.name.clone(),
        payload: payload.clone(),
        key: field.key.clone(),
        extraction: extraction(field),
    }));
    body.extend(schema.fields.iter().map(|field| Statement::Assign {
        host: host.clone(),
        field: field.name.clone(),
        local: field.name.clone(),
        // A plain object field keeps its value when nothing was sent.
        only_if_present: is_object(field) && !field.nullable,
    }));
    body.push(Statement::ReturnBool(true));

    let host_name = &schema.name;
    MethodSpec {
        name: format_ident!("bind_{}", to_snake_case(&host_name.unraw().to_string())),
        doc: format!(
            "Restore the extras of [`{host_name}`] from its attached payload.\n\n\
             Returns `false`, leaving `{host}` untouched, if no payload is attached."
        ),
        receiver: Receiver::None,
        params: vec![Param {
            name: host,
            ty: TypeSpec::HostMut(host_name.clone()),
        }],
        returns: Some(TypeSpec::Bool),
        body,
    }
}

/// Synthesize the binder type of one package.
pub fn synthesize_binder(group: &PackageBinderGroup, config: &GeneratorConfig) -> GeneratedArtifact {
    GeneratedArtifact {
        package: group.package.clone(),
        description: TypeDescription {
            name: config.binder_ident(),
            doc: format!("Binds attached payloads back into the hosts of `{}`.", group.package),
            shape: Shape::Unit,
            fields: Vec::new(),
            methods: group.bind_methods.clone(),
        },
    }
}

#[inline]
fn is_object(field: &MarkedField) -> bool {
    matches!(
        field.category,
        TransportCategory::SerializableObject | TransportCategory::Unsupported
    )
}

fn extraction(field: &MarkedField) -> Extraction {
    match field.category {
        TransportCategory::Int => Extraction::Int {
            nullable: field.nullable,
        },
        TransportCategory::Long => Extraction::Long {
            nullable: field.nullable,
        },
        TransportCategory::String => Extraction::String {
            nullable: field.nullable,
        },
        // Schemas never hold unsupported fields; a hand-built one fails to
        // compile on the missing serde impls instead.
        TransportCategory::SerializableObject | TransportCategory::Unsupported => {
            Extraction::Serializable {
                ty: field.value_ty.clone(),
            }
        }
    }
}
