//! The multi-pass generator state machine.
//!
//! A [`Driver`] is fed one or more [`Program`] snapshots through
//! [`scan`](Driver::scan). Every pass discovers the hosts marked so far,
//! extracts the schema of each host it has not seen yet and accumulates it.
//! [`finish`](Driver::finish) then synthesizes and emits every creator and
//! every package binder exactly once.

use std::collections::BTreeMap;

use parcel_utils::hash::{HashMap, HashSet};
use syn::ext::IdentExt;

use crate::Package;
use crate::config::GeneratorConfig;
use crate::diagnostics::Diagnostics;
use crate::emit::Emitter;
use crate::error::{DriverError, SchemaError};
use crate::program::{DeclRef, Marker, Program, TypeRef};
use crate::schema::{HostSchema, extract};
use crate::synth::{
    GeneratedArtifact, PackageBinderGroup, synthesize_bind_method, synthesize_binder,
    synthesize_builder,
};

// -----------------------------------------------------------------------------
// Reports

/// What one [`Driver::scan`] pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Hosts seen for the first time.
    pub discovered: usize,
    pub accumulated: usize,
    /// Hosts and misplaced markers reported as errors.
    pub rejected: usize,
}

/// What [`Driver::finish`] emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FinishReport {
    pub creators: usize,
    pub binders: usize,
}

// -----------------------------------------------------------------------------
// Driver

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Scanning,
    Done,
}

/// Owns every piece of state of one generator run.
///
/// # Examples
///
/// ```
/// use parcel_codegen::{Driver, MemoryEmitter, Package, SourceProgram};
/// use parcel_codegen::diagnostics::CollectDiagnostics;
///
/// let mut program = SourceProgram::new();
/// program.parse_str(Package::new("screens"), r#"
///     #[derive(Host)]
///     pub struct Ticket {
///         #[parcel(payload)] payload: Option<Payload>,
///         #[extra(required)] id: i64,
///     }
/// "#).unwrap();
///
/// let mut driver = Driver::default();
/// let mut diagnostics = CollectDiagnostics::new();
/// let scan = driver.scan(&program, &mut diagnostics).unwrap();
/// assert_eq!(scan.accumulated, 1);
///
/// let mut emitter = MemoryEmitter::new();
/// driver.finish(&mut emitter, &mut diagnostics).unwrap();
/// assert_eq!(emitter.names(), ["screens::TicketCreator", "screens::PayloadBinder"]);
/// ```
#[derive(Debug)]
pub struct Driver {
    config: GeneratorConfig,
    state: DriverState,
    schemas: Vec<HostSchema>,
    index: HashMap<TypeRef, usize>,
    rejected: HashSet<TypeRef>,
    misplaced: HashSet<DeclRef>,
    groups: BTreeMap<Package, PackageBinderGroup>,
    passes: usize,
}

impl Default for Driver {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl Driver {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            state: DriverState::Scanning,
            schemas: Vec::new(),
            index: HashMap::default(),
            rejected: HashSet::default(),
            misplaced: HashSet::default(),
            groups: BTreeMap::new(),
            passes: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Accumulated schemas, in accumulation order.
    #[inline]
    pub fn schemas(&self) -> &[HostSchema] {
        &self.schemas
    }

    pub fn schema(&self, host: TypeRef) -> Option<&HostSchema> {
        self.index.get(&host).map(|&index| &self.schemas[index])
    }

    #[inline]
    pub fn is_rejected(&self, host: TypeRef) -> bool {
        self.rejected.contains(&host)
    }

    /// Binder groups by package, in package order.
    pub fn groups(&self) -> impl Iterator<Item = &PackageBinderGroup> {
        self.groups.values()
    }

    /// Number of completed [`scan`](Self::scan) calls.
    #[inline]
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Accumulate `schema`, keyed by its host's identity.
    ///
    /// Returns `false` and keeps the first schema if the host was already
    /// accumulated.
    pub fn accumulate(&mut self, schema: HostSchema) -> bool {
        if self.index.contains_key(&schema.host) {
            return false;
        }
        if !schema.is_empty() {
            self.groups
                .entry(schema.package.clone())
                .or_insert_with(|| PackageBinderGroup::new(schema.package.clone()))
                .push(synthesize_bind_method(&schema));
        }
        log::trace!("accumulated `{}`", schema.qualified_name);
        self.index.insert(schema.host, self.schemas.len());
        self.schemas.push(schema);
        true
    }

    /// Forget everything and start a new run with the same configuration.
    pub fn reset(&mut self) {
        self.state = DriverState::Scanning;
        self.schemas.clear();
        self.index.clear();
        self.rejected.clear();
        self.misplaced.clear();
        self.groups.clear();
        self.passes = 0;
    }

    // -------------------------------------------------------------------------
    // Passes

    /// Run one discovery pass over `program`.
    ///
    /// Schema errors are reported on `diagnostics` and reject their host for
    /// the rest of the run. They never fail the pass.
    pub fn scan(
        &mut self,
        program: &dyn Program,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<ScanReport, DriverError> {
        if self.state == DriverState::Done {
            return Err(DriverError::Finished);
        }

        let mut report = ScanReport::default();
        let mut candidates: Vec<TypeRef> = Vec::new();

        for decl in program.marked_declarations(Marker::Host) {
            if let Some(host) = program.enclosing_type(decl) {
                candidates.push(host);
            }
        }
        for decl in program.marked_declarations(Marker::Extra) {
            match decl {
                DeclRef::Field(_) => {
                    if let Some(host) = program.enclosing_type(decl) {
                        candidates.push(host);
                    }
                }
                DeclRef::Type(_) | DeclRef::Other(_) => {
                    if !self.misplaced.insert(decl) {
                        continue;
                    }
                    let err = SchemaError::NotAHost {
                        decl,
                        name: program.describe(decl),
                    };
                    diagnostics.error(err.to_string(), Some(program.describe(decl)));
                    report.rejected += 1;
                }
            }
        }

        let mut seen: HashSet<TypeRef> = HashSet::default();
        for host in candidates {
            if !seen.insert(host) || self.index.contains_key(&host) || self.rejected.contains(&host) {
                continue;
            }
            report.discovered += 1;

            let extracted = extract(program, host, &self.config, diagnostics)
                .and_then(|schema| self.check_names(program, schema));
            match extracted {
                Ok(schema) => {
                    self.accumulate(schema);
                    report.accumulated += 1;
                }
                Err(err) => {
                    log::debug!("rejected `{}`", program.qualified_name(host));
                    diagnostics.error(err.to_string(), Some(program.describe(err.declaration())));
                    self.rejected.insert(host);
                    report.rejected += 1;
                }
            }
        }

        self.passes += 1;
        log::debug!(
            "pass {}: {} discovered, {} accumulated, {} rejected",
            self.passes,
            report.discovered,
            report.accumulated,
            report.rejected
        );
        Ok(report)
    }

    /// Reject `schema` if one of the types generated for it would share a
    /// name with a type of its package, declared or generated.
    fn check_names(
        &self,
        program: &dyn Program,
        schema: HostSchema,
    ) -> Result<HostSchema, SchemaError> {
        let creator = self.config.creator_ident(&schema.name).to_string();
        let binder = self.config.binder_ident().to_string();
        let host = schema.name.unraw().to_string();
        let collision = |generated: &str, existing: String| SchemaError::NameCollision {
            decl: DeclRef::Type(schema.host),
            host: schema.qualified_name.clone(),
            generated: String::from(generated),
            existing,
        };

        if creator == binder {
            return Err(collision(&creator, String::from("the module's binder")));
        }
        if let Some(declared) = program.type_named(&schema.package, &creator) {
            return Err(collision(&creator, program.describe(DeclRef::Type(declared))));
        }
        if !schema.is_empty()
            && let Some(declared) = program.type_named(&schema.package, &binder)
        {
            return Err(collision(&binder, program.describe(DeclRef::Type(declared))));
        }

        // Types generated in earlier passes are not declared in the program.
        if let Some(earlier) = self.schemas.iter().find(|earlier| {
            earlier.package == schema.package && self.config.creator_ident(&earlier.name) == host
        }) {
            return Err(collision(
                &host,
                format!("the creator generated for `{}`", earlier.qualified_name),
            ));
        }
        if host == binder && self.groups.get(&schema.package).is_some_and(|group| !group.is_empty()) {
            return Err(collision(&host, String::from("the module's binder")));
        }
        Ok(schema)
    }

    /// Emit every creator, in accumulation order, then every package binder,
    /// in package order.
    ///
    /// Every artifact is attempted; failures are reported on `diagnostics`
    /// and summed up in [`DriverError::Emission`]. The run is over
    /// afterwards either way.
    pub fn finish(
        &mut self,
        emitter: &mut dyn Emitter,
        diagnostics: &mut dyn Diagnostics,
    ) -> Result<FinishReport, DriverError> {
        if self.state == DriverState::Done {
            return Err(DriverError::Finished);
        }
        self.state = DriverState::Done;

        let creators = self
            .schemas
            .iter()
            .map(|schema| synthesize_builder(schema, &self.config));
        let binders = self
            .groups
            .values()
            .filter(|group| !group.is_empty())
            .map(|group| synthesize_binder(group, &self.config));

        let mut report = FinishReport::default();
        let mut failed = 0;
        for (artifact, is_creator) in creators
            .map(|artifact| (artifact, true))
            .chain(binders.map(|artifact| (artifact, false)))
        {
            if emit(emitter, &artifact, diagnostics) {
                if is_creator {
                    report.creators += 1;
                } else {
                    report.binders += 1;
                }
            } else {
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(DriverError::Emission {
                failed,
                total: failed + report.creators + report.binders,
            });
        }
        Ok(report)
    }
}

fn emit(
    emitter: &mut dyn Emitter,
    artifact: &GeneratedArtifact,
    diagnostics: &mut dyn Diagnostics,
) -> bool {
    match emitter.emit(&artifact.package, &artifact.description) {
        Ok(()) => true,
        Err(err) => {
            diagnostics.error(
                format!("failed to emit `{}`: {err}", artifact.description.name),
                Some(artifact.package.to_string()),
            );
            false
        }
    }
}
