//! Synthesis of the generated types.
//!
//! - [`synthesize_builder`]: one `<Host>Creator` per host.
//! - [`synthesize_bind_method`] and [`synthesize_binder`]: one bind method per
//!   host, grouped into one binder type per package.

mod binder;
mod builder;

pub use binder::{synthesize_bind_method, synthesize_binder};
pub use builder::synthesize_builder;

use parcel_utils::naming::unique_name;
use quote::format_ident;

use crate::Package;
use crate::desc::{MethodSpec, TypeDescription};

/// A synthesized type and the package it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub package: Package,
    pub description: TypeDescription,
}

/// The bind methods of every host in one package, in accumulation order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageBinderGroup {
    pub package: Package,
    pub bind_methods: Vec<MethodSpec>,
}

impl PackageBinderGroup {
    pub fn new(package: Package) -> Self {
        Self {
            package,
            bind_methods: Vec::new(),
        }
    }

    /// Append `method`, renaming it if another host of the package already
    /// produced the same name (`HttpServer` and `HTTPServer`).
    pub fn push(&mut self, mut method: MethodSpec) {
        let name = method.name.to_string();
        let unique = unique_name(&name, |candidate| {
            self.bind_methods.iter().any(|bind| bind.name == candidate)
        });
        if unique != name {
            log::debug!("bind method `{name}` in `{}` renamed to `{unique}`", self.package);
            method.name = format_ident!("{}", unique);
        }
        self.bind_methods.push(method);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bind_methods.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::config::GeneratorConfig;
    use crate::diagnostics::CollectDiagnostics;
    use crate::program::{Marker, Program};
    use crate::schema::{HostSchema, extract};
    use crate::{Package, SourceProgram};

    /// Schemas of every host declared in `source`, as module `package`.
    pub(crate) fn schemas(package: &str, source: &str) -> Vec<HostSchema> {
        let mut program = SourceProgram::new();
        program.parse_str(Package::new(package), source).unwrap();
        let config = GeneratorConfig::default();
        let mut diagnostics = CollectDiagnostics::new();
        program
            .marked_declarations(Marker::Host)
            .into_iter()
            .filter_map(|decl| program.enclosing_type(decl))
            .map(|host| extract(&program, host, &config, &mut diagnostics).unwrap())
            .collect()
    }

    pub(crate) const TICKET: &str = r#"
        #[derive(Host)]
        pub struct Ticket {
            #[parcel(payload)]
            payload: Option<Payload>,
            #[extra(required)]
            id: i64,
            #[extra]
            label: Option<String>,
        }
    "#;

    #[test]
    fn group_keeps_names_unique() {
        let schemas = schemas(
            "net",
            r#"
            #[derive(Host)] pub struct HttpServer { #[extra] a: i32 }
            #[derive(Host)] pub struct HTTPServer { #[extra] a: i32 }
            "#,
        );
        let mut group = super::PackageBinderGroup::new(Package::new("net"));
        for schema in &schemas {
            group.push(super::synthesize_bind_method(schema));
        }
        let names: Vec<String> = group
            .bind_methods
            .iter()
            .map(|method| method.name.to_string())
            .collect();
        assert_eq!(names, ["bind_http_server", "bind_http_server_"]);
    }
}
