//! Turning a host's marked fields into an ordered schema.

use parcel_macro_utils::attrs::ExtraAttr;
use parcel_utils::hash::{Entry, HashMap};
use proc_macro2::Ident;
use syn::ext::IdentExt;

use crate::Package;
use crate::classify::{TransportCategory, classify};
use crate::config::{GeneratorConfig, MissingKeyPolicy, UnsupportedPolicy};
use crate::diagnostics::Diagnostics;
use crate::error::SchemaError;
use crate::program::{Capability, DeclRef, FieldRef, Program, TypeRef};

/// Method names of the generated creator. An optional field's setter is
/// named after the field, so these names are not available to them.
pub const RESERVED_SETTER_NAMES: [&str; 3] = ["new", "create", "add_flags"];

// -----------------------------------------------------------------------------
// Data

/// One transported field of a host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarkedField {
    /// The payload key, never empty.
    pub key: String,
    pub required: bool,
    pub field: FieldRef,
    pub name: Ident,
    /// The declared type with `Option` peeled off.
    pub value_ty: syn::Type,
    /// Whether the declared type was `Option<T>`.
    pub nullable: bool,
    pub category: TransportCategory,
}

/// The ordered, validated fields of one host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostSchema {
    pub host: TypeRef,
    pub name: Ident,
    pub package: Package,
    pub qualified_name: String,
    /// In declaration order.
    pub fields: Vec<MarkedField>,
}

impl HostSchema {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn required(&self) -> impl Iterator<Item = &MarkedField> {
        self.fields.iter().filter(|field| field.required)
    }

    pub fn optional(&self) -> impl Iterator<Item = &MarkedField> {
        self.fields.iter().filter(|field| !field.required)
    }
}

// -----------------------------------------------------------------------------
// extract

/// Extract the schema of `host`.
///
/// Fields are visited in declaration order; only fields declared directly on
/// `host` and carrying `#[extra]` are considered. Dropped fields are reported
/// as warnings on `diagnostics`, a returned error rejects the whole host.
pub fn extract(
    program: &dyn Program,
    host: TypeRef,
    config: &GeneratorConfig,
    diagnostics: &mut dyn Diagnostics,
) -> Result<HostSchema, SchemaError> {
    let qualified_name = program.qualified_name(host);

    let name = match program.simple_name(host) {
        Some(name) if program.is_struct_like(host) && program.is_assignable(host, Capability::Host) => name,
        _ => {
            return Err(SchemaError::NotAHost {
                decl: DeclRef::Type(host),
                name: program.describe(DeclRef::Type(host)),
            });
        }
    };

    let mut fields: Vec<MarkedField> = Vec::new();
    let mut keys: HashMap<String, String> = HashMap::default();

    for field_ref in program.fields_of(host) {
        let decl = DeclRef::Field(field_ref);
        let Some(field) = program.field(field_ref) else {
            continue;
        };
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = ident.unraw().to_string();

        let marker = match ExtraAttr::from_attrs(&field.attrs) {
            Ok(Some(marker)) => marker,
            Ok(None) => continue,
            Err(err) => {
                return Err(SchemaError::InvalidMarker {
                    decl,
                    host: qualified_name,
                    field: field_name,
                    message: err.to_string(),
                });
            }
        };

        let key = match marker.key() {
            Some(key) if key.is_empty() => {
                diagnostics.warning(
                    format!("`#[extra]` on `{field_name}` has an empty key, the field is not transported"),
                    Some(program.describe(decl)),
                );
                continue;
            }
            Some(key) => key,
            None => match config.missing_key {
                MissingKeyPolicy::FieldName => field_name.clone(),
                MissingKeyPolicy::Drop => {
                    diagnostics.warning(
                        format!("`#[extra]` on `{field_name}` has no key, the field is not transported"),
                        Some(program.describe(decl)),
                    );
                    continue;
                }
            },
        };

        let class = classify(&field.ty, |value_ty| program.is_serializable(value_ty, host));
        if class.category == TransportCategory::Unsupported {
            match config.unsupported {
                UnsupportedPolicy::Fatal => {
                    return Err(SchemaError::UnsupportedCategory {
                        decl,
                        host: qualified_name,
                        field: field_name,
                        ty: type_to_string(&field.ty),
                    });
                }
                UnsupportedPolicy::Skip => {
                    diagnostics.warning(
                        format!(
                            "type `{}` of `{field_name}` cannot be transported, the field is skipped",
                            type_to_string(&field.ty)
                        ),
                        Some(program.describe(decl)),
                    );
                    continue;
                }
            }
        }

        if !marker.required && RESERVED_SETTER_NAMES.contains(&field_name.as_str()) {
            return Err(SchemaError::ReservedName {
                decl,
                host: qualified_name,
                field: field_name,
            });
        }

        match keys.entry(key.clone()) {
            Entry::Occupied(first) => {
                return Err(SchemaError::DuplicateKey {
                    decl,
                    host: qualified_name,
                    key,
                    first: first.get().clone(),
                    second: field_name,
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(field_name);
            }
        }

        log::trace!("{qualified_name}: `{}` -> \"{key}\" ({})", ident, class.category);

        fields.push(MarkedField {
            key,
            required: marker.required,
            field: field_ref,
            name: ident.clone(),
            value_ty: class.value_ty,
            nullable: class.nullable,
            category: class.category,
        });
    }

    Ok(HostSchema {
        host,
        name,
        package: program.package_of(host),
        qualified_name,
        fields,
    })
}

fn type_to_string(ty: &syn::Type) -> String {
    quote::ToTokens::to_token_stream(ty)
        .to_string()
        .replace(" < ", "<")
        .replace(" >", ">")
        .replace(" :: ", "::")
}

#[cfg(test)]
mod tests {
    use super::{HostSchema, extract};
    use crate::classify::TransportCategory;
    use crate::config::{GeneratorConfig, MissingKeyPolicy, UnsupportedPolicy};
    use crate::diagnostics::CollectDiagnostics;
    use crate::error::SchemaError;
    use crate::program::{Marker, Program, TypeRef};
    use crate::{Package, SourceProgram};

    fn first_host(program: &SourceProgram) -> TypeRef {
        let decl = program.marked_declarations(Marker::Host)[0];
        program.enclosing_type(decl).unwrap()
    }

    fn run(
        source: &str,
        config: &GeneratorConfig,
    ) -> (Result<HostSchema, SchemaError>, CollectDiagnostics) {
        let mut program = SourceProgram::new();
        program.parse_str(Package::new("screens"), source).unwrap();
        let mut diagnostics = CollectDiagnostics::new();
        let host = first_host(&program);
        let schema = extract(&program, host, config, &mut diagnostics);
        (schema, diagnostics)
    }

    const BOOK: &str = r#"
        #[derive(Serialize, Deserialize)]
        pub struct Book { id: i32 }
    "#;

    #[test]
    fn declaration_order_and_keys() {
        let source = format!(
            r#"
            {BOOK}
            #[derive(Host)]
            pub struct Detail {{
                #[extra(key = "b")] second: Option<String>,
                #[parcel(payload)] payload: Option<Payload>,
                untouched: u8,
                #[extra(required)] r#type: i32,
                #[extra(key = "book", required)] book: Book,
                #[extra] count: Option<i64>,
            }}
            "#
        );
        let (schema, diagnostics) = run(&source, &GeneratorConfig::default());
        let schema = schema.unwrap();
        assert!(diagnostics.diagnostics.is_empty());

        assert_eq!(schema.name, "Detail");
        assert_eq!(schema.qualified_name, "crate::screens::Detail");
        assert_eq!(schema.package, Package::new("screens"));

        let keys: Vec<_> = schema.fields.iter().map(|field| field.key.as_str()).collect();
        assert_eq!(keys, ["b", "type", "book", "count"]);

        let categories: Vec<_> = schema.fields.iter().map(|field| field.category).collect();
        assert_eq!(
            categories,
            [
                TransportCategory::String,
                TransportCategory::Int,
                TransportCategory::SerializableObject,
                TransportCategory::Long,
            ]
        );
        assert_eq!(
            schema.required().map(|field| field.key.as_str()).collect::<Vec<_>>(),
            ["type", "book"]
        );
        assert!(schema.fields[0].nullable);
        assert!(!schema.fields[1].nullable);
    }

    #[test]
    fn not_a_host() {
        let (schema, _) = run(
            "#[derive(Host)] pub struct Tuple(#[extra] i32);",
            &GeneratorConfig::default(),
        );
        assert!(matches!(schema, Err(SchemaError::NotAHost { .. })));

        // Named fields but no `Host` capability.
        let mut program = SourceProgram::new();
        program
            .parse_str(Package::root(), "pub struct Plain { #[extra] a: i32 }")
            .unwrap();
        let mut diagnostics = CollectDiagnostics::new();
        let result = extract(&program, TypeRef(0), &GeneratorConfig::default(), &mut diagnostics);
        assert!(matches!(result, Err(SchemaError::NotAHost { .. })));
    }

    #[test]
    fn empty_key_is_dropped_with_a_warning() {
        let (schema, diagnostics) = run(
            r#"
            #[derive(Host)]
            pub struct Main { #[extra(key = "")] a: i32, #[extra] b: i32 }
            "#,
            &GeneratorConfig::default(),
        );
        let schema = schema.unwrap();
        assert_eq!(schema.fields.len(), 1);
        assert_eq!(schema.fields[0].key, "b");
        assert_eq!(diagnostics.warnings().count(), 1);
        assert_eq!(
            diagnostics.diagnostics[0].location.as_deref(),
            Some("field `a` of `crate::screens::Main`")
        );
    }

    #[test]
    fn missing_key_drop_policy() {
        let config = GeneratorConfig {
            missing_key: MissingKeyPolicy::Drop,
            ..GeneratorConfig::default()
        };
        let (schema, diagnostics) = run(
            r#"
            #[derive(Host)]
            pub struct Main { #[extra] a: i32, #[extra(key = "b")] b: i32 }
            "#,
            &config,
        );
        let keys: Vec<_> = schema.unwrap().fields.into_iter().map(|field| field.key).collect();
        assert_eq!(keys, ["b"]);
        assert_eq!(diagnostics.warnings().count(), 1);
    }

    #[test]
    fn unsupported_policies() {
        let source = r#"
            #[derive(Host)]
            pub struct Main { #[extra] a: i32, #[extra] raw: Vec<std::fs::File> }
        "#;

        let (schema, _) = run(source, &GeneratorConfig::default());
        match schema {
            Err(SchemaError::UnsupportedCategory { field, ty, .. }) => {
                assert_eq!(field, "raw");
                assert_eq!(ty, "Vec<std::fs::File>");
            }
            other => panic!("expected an unsupported category, got {other:?}"),
        }

        let lenient = GeneratorConfig {
            unsupported: UnsupportedPolicy::Skip,
            ..GeneratorConfig::default()
        };
        let (schema, diagnostics) = run(source, &lenient);
        assert_eq!(schema.unwrap().fields.len(), 1);
        assert_eq!(diagnostics.warnings().count(), 1);
    }

    #[test]
    fn std_containers_are_objects() {
        let source = format!(
            r#"
            {BOOK}
            #[derive(Host)]
            pub struct Shelf {{
                #[extra] bytes: Vec<u8>,
                #[extra] index: Option<std::collections::HashMap<String, Book>>,
                #[extra] corner: (f64, f64),
            }}
            "#
        );
        let (schema, diagnostics) = run(&source, &GeneratorConfig::default());
        let schema = schema.unwrap();
        assert!(diagnostics.diagnostics.is_empty());
        assert!(
            schema
                .fields
                .iter()
                .all(|field| field.category == TransportCategory::SerializableObject)
        );
        assert!(schema.fields[1].nullable);
    }

    #[test]
    fn host_level_errors() {
        let (schema, _) = run(
            r#"
            #[derive(Host)]
            pub struct Main { #[extra(key = "k")] a: i32, #[extra(key = "k")] b: i64 }
            "#,
            &GeneratorConfig::default(),
        );
        assert!(matches!(
            schema,
            Err(SchemaError::DuplicateKey { ref first, ref second, .. }) if first == "a" && second == "b"
        ));

        let (schema, _) = run(
            "#[derive(Host)] pub struct Main { #[extra] create: i32 }",
            &GeneratorConfig::default(),
        );
        assert!(matches!(schema, Err(SchemaError::ReservedName { .. })));

        // A required field is a constructor argument, not a setter.
        let (schema, _) = run(
            "#[derive(Host)] pub struct Main { #[extra(required)] create: i32 }",
            &GeneratorConfig::default(),
        );
        assert!(schema.is_ok());

        let (schema, _) = run(
            "#[derive(Host)] pub struct Main { #[extra(name = \"x\")] a: i32 }",
            &GeneratorConfig::default(),
        );
        assert!(matches!(schema, Err(SchemaError::InvalidMarker { .. })));
    }

    #[test]
    fn empty_schema_is_valid() {
        let (schema, diagnostics) = run(
            "#[derive(Host)] pub struct Splash { #[parcel(payload)] payload: Option<Payload> }",
            &GeneratorConfig::default(),
        );
        assert!(schema.unwrap().is_empty());
        assert!(diagnostics.diagnostics.is_empty());
    }
}
