use std::path::{Path, PathBuf};

use parcel_macro_utils::attrs::ExtraAttr;
use parcel_utils::hash::HashMap;
use proc_macro2::Ident;
use syn::ext::IdentExt;
use syn::punctuated::Punctuated;
use syn::{Attribute, Fields, Item, Token, UseTree};

use super::{Capability, DeclRef, FieldRef, Marker, Program, TypeRef};
use crate::Package;
use crate::error::SourceError;

/// Leaf types serde handles natively, by their path from a crate root.
const NATIVE: [&str; 18] = [
    "bool", "char", "f32", "f64", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16",
    "u32", "u64", "u128", "usize", "String", "string::String",
];

/// Bound on import chains (`use a as b; use b as c; ...`) followed per lookup.
const MAX_RESOLVE_DEPTH: usize = 8;

// -----------------------------------------------------------------------------
// Declarations

#[derive(Debug, Clone)]
struct UsePath {
    leading_colon: bool,
    segments: Vec<String>,
}

#[derive(Debug)]
struct Import {
    alias: String,
    target: UsePath,
}

#[derive(Debug)]
struct Module {
    package: Package,
    imports: Vec<Import>,
    globs: Vec<UsePath>,
    children: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    NamedStruct,
    TupleStruct,
    UnitStruct,
    Enum,
    Union,
}

impl TypeKind {
    fn keyword(self) -> &'static str {
        match self {
            TypeKind::NamedStruct | TypeKind::TupleStruct | TypeKind::UnitStruct => "struct",
            TypeKind::Enum => "enum",
            TypeKind::Union => "union",
        }
    }
}

#[derive(Debug)]
struct TypeDecl {
    module: usize,
    ident: Ident,
    kind: TypeKind,
    fields: Vec<syn::Field>,
    derives: Vec<String>,
}

#[derive(Debug)]
struct OtherDecl {
    enclosing: Option<TypeRef>,
    description: String,
}

#[derive(Debug)]
struct TraitImpl {
    module: usize,
    trait_name: String,
    self_ty: syn::Type,
}

// -----------------------------------------------------------------------------
// SourceProgram

/// A [`Program`] built from parsed Rust source files.
///
/// Files are added one module at a time, possibly between two scans of the
/// same run; handles returned before stay valid. Type paths are resolved the
/// way rustc would for the common cases: `use` items (renames, groups and
/// globs), `crate::`, `self::` and `super::` prefixes, and items of the
/// same module. Macro-generated items are invisible.
///
/// # Example
///
/// ```
/// use parcel_codegen::{Package, SourceProgram};
/// use parcel_codegen::program::{Marker, Program};
///
/// let mut program = SourceProgram::new();
/// program
///     .parse_str(
///         Package::new("screens"),
///         r#"
///         #[derive(Host)]
///         pub struct Ticket {
///             #[parcel(payload)]
///             payload: Option<Payload>,
///             #[extra(required)]
///             id: i64,
///         }
///         "#,
///     )
///     .unwrap();
///
/// let hosts = program.marked_declarations(Marker::Host);
/// assert_eq!(hosts.len(), 1);
/// assert_eq!(program.describe(hosts[0]), "struct `crate::screens::Ticket`");
/// ```
#[derive(Debug, Default)]
pub struct SourceProgram {
    modules: Vec<Module>,
    module_index: HashMap<Package, usize>,
    types: Vec<TypeDecl>,
    type_index: HashMap<String, TypeRef>,
    others: Vec<OtherDecl>,
    impls: Vec<TraitImpl>,
    markers: Vec<(Marker, DeclRef)>,
    serializable: Vec<String>,
}

impl SourceProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat the types at `paths` as serializable even though no derive or
    /// impl is visible, e.g. foreign types such as `chrono::NaiveDate`.
    ///
    /// Paths are compared after resolution, so local types are written from
    /// the crate root (`crate::model::Money`).
    pub fn with_serializable<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.serializable.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Number of declared types seen so far.
    #[inline]
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Add the items of module `package`, including its inline submodules.
    pub fn add_file(&mut self, package: Package, file: &syn::File) -> Result<(), SourceError> {
        self.add_module(package, &file.items)
    }

    /// Parse `source` as the content of module `package`.
    pub fn parse_str(&mut self, package: Package, source: &str) -> Result<(), SourceError> {
        let file = syn::parse_file(source).map_err(|source| SourceError::Parse {
            path: PathBuf::from(format!("<{package}>")),
            source,
        })?;
        self.add_file(package, &file)
    }

    /// Read and add one file as module `package`. Out-of-line submodules are
    /// not followed, see [`load_crate`](Self::load_crate) for that.
    pub fn load(&mut self, package: Package, path: &Path) -> Result<(), SourceError> {
        let file = read_file(path)?;
        self.add_file(package, &file)
    }

    /// Load a crate from its root file (`src/lib.rs`), following every
    /// `mod name;` declaration to `name.rs` or `name/mod.rs`.
    ///
    /// Modules gated by `#[cfg(test)]` are skipped. Returns the loaded files,
    /// for `cargo:rerun-if-changed`.
    pub fn load_crate(&mut self, root: &Path) -> Result<Vec<PathBuf>, SourceError> {
        let dir = root.parent().map(Path::to_path_buf).unwrap_or_default();
        let mut loaded = Vec::new();
        self.load_tree(Package::root(), root, &dir, &mut loaded)?;
        Ok(loaded)
    }

    fn load_tree(
        &mut self,
        package: Package,
        path: &Path,
        dir: &Path,
        loaded: &mut Vec<PathBuf>,
    ) -> Result<(), SourceError> {
        let file = read_file(path)?;
        self.add_file(package.clone(), &file)?;
        loaded.push(path.to_path_buf());
        self.load_children(&package, &file.items, dir, loaded)
    }

    fn load_children(
        &mut self,
        package: &Package,
        items: &[Item],
        dir: &Path,
        loaded: &mut Vec<PathBuf>,
    ) -> Result<(), SourceError> {
        for item in items {
            let Item::Mod(module) = item else {
                continue;
            };
            if is_test_only(&module.attrs) {
                continue;
            }
            let name = module.ident.unraw().to_string();
            let child = package.child(&name);
            let child_dir = dir.join(&name);

            match &module.content {
                Some((_, items)) => self.load_children(&child, items, &child_dir, loaded)?,
                None => {
                    let flat = dir.join(format!("{name}.rs"));
                    let nested = child_dir.join("mod.rs");
                    let path = if flat.is_file() {
                        flat
                    } else if nested.is_file() {
                        nested
                    } else {
                        return Err(SourceError::MissingModule {
                            package: child,
                            searched: flat,
                        });
                    };
                    self.load_tree(child, &path, &child_dir, loaded)?;
                }
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Collecting

    fn add_module(&mut self, package: Package, items: &[Item]) -> Result<(), SourceError> {
        if self.module_index.contains_key(&package) {
            return Err(SourceError::DuplicateModule { package });
        }
        let module = self.modules.len();
        self.module_index.insert(package.clone(), module);
        self.modules.push(Module {
            package,
            imports: Vec::new(),
            globs: Vec::new(),
            children: Vec::new(),
        });

        for item in items {
            self.add_item(module, item)?;
        }
        Ok(())
    }

    fn add_item(&mut self, module: usize, item: &Item) -> Result<(), SourceError> {
        match item {
            Item::Struct(item) => {
                let kind = match &item.fields {
                    Fields::Named(_) => TypeKind::NamedStruct,
                    Fields::Unnamed(_) => TypeKind::TupleStruct,
                    Fields::Unit => TypeKind::UnitStruct,
                };
                let fields = item.fields.iter().cloned().collect();
                self.add_type(module, &item.ident, kind, fields, &item.attrs);
            }
            Item::Union(item) => {
                let fields = item.fields.named.iter().cloned().collect();
                self.add_type(module, &item.ident, TypeKind::Union, fields, &item.attrs);
            }
            Item::Enum(item) => {
                let ty = self.add_type(module, &item.ident, TypeKind::Enum, Vec::new(), &item.attrs);
                let owner = self.qualified_name(ty);
                for variant in &item.variants {
                    if has_marker(&variant.attrs) {
                        self.others.push(OtherDecl {
                            enclosing: Some(ty),
                            description: format!("variant `{}` of enum `{owner}`", variant.ident),
                        });
                        let other = self.others.len() - 1;
                        self.markers.push((Marker::Extra, DeclRef::Other(other as u32)));
                    }
                    for (index, field) in variant.fields.iter().enumerate() {
                        if has_marker(&field.attrs) {
                            self.others.push(OtherDecl {
                                enclosing: Some(ty),
                                description: format!(
                                    "field `{}` of variant `{}` of enum `{owner}`",
                                    field_label(field, index),
                                    variant.ident
                                ),
                            });
                            let other = self.others.len() - 1;
                            self.markers.push((Marker::Extra, DeclRef::Other(other as u32)));
                        }
                    }
                }
            }
            Item::Use(item) => {
                let mut prefix = Vec::new();
                let leading_colon = item.leading_colon.is_some();
                collect_use(&item.tree, &mut prefix, leading_colon, &mut self.modules[module]);
            }
            Item::Impl(item) => {
                // Negative impls (`impl !Trait for T`) grant nothing.
                if let Some((None, path, _)) = &item.trait_
                    && let Some(segment) = path.segments.last()
                {
                    self.impls.push(TraitImpl {
                        module,
                        trait_name: segment.ident.to_string(),
                        self_ty: (*item.self_ty).clone(),
                    });
                }
            }
            Item::Mod(item) => {
                let name = item.ident.unraw().to_string();
                self.add_other_if_marked(module, &item.attrs, "module", &item.ident);
                self.modules[module].children.push(name.clone());
                if let Some((_, items)) = &item.content {
                    let child = self.modules[module].package.child(&name);
                    self.add_module(child, items)?;
                }
            }
            Item::Fn(item) => self.add_other_if_marked(module, &item.attrs, "function", &item.sig.ident),
            Item::Const(item) => self.add_other_if_marked(module, &item.attrs, "constant", &item.ident),
            Item::Static(item) => self.add_other_if_marked(module, &item.attrs, "static", &item.ident),
            Item::Type(item) => self.add_other_if_marked(module, &item.attrs, "type alias", &item.ident),
            Item::Trait(item) => self.add_other_if_marked(module, &item.attrs, "trait", &item.ident),
            _ => {}
        }
        Ok(())
    }

    fn add_type(
        &mut self,
        module: usize,
        ident: &Ident,
        kind: TypeKind,
        fields: Vec<syn::Field>,
        attrs: &[Attribute],
    ) -> TypeRef {
        let ty = TypeRef(self.types.len() as u32);
        let mut path = self.module_path(module);
        path.push(ident.unraw().to_string());
        self.type_index.insert(path.join("::"), ty);

        let derives = derives(attrs);
        if derives.iter().any(|name| name == "Host") {
            self.markers.push((Marker::Host, DeclRef::Type(ty)));
        }
        if has_marker(attrs) {
            self.markers.push((Marker::Extra, DeclRef::Type(ty)));
        }
        for (index, field) in fields.iter().enumerate() {
            if has_marker(&field.attrs) {
                let field = FieldRef {
                    owner: ty,
                    index: index as u32,
                };
                self.markers.push((Marker::Extra, DeclRef::Field(field)));
            }
        }

        self.types.push(TypeDecl {
            module,
            ident: ident.clone(),
            kind,
            fields,
            derives,
        });
        ty
    }

    fn add_other_if_marked(&mut self, module: usize, attrs: &[Attribute], kind: &str, ident: &Ident) {
        if !has_marker(attrs) {
            return;
        }
        let mut path = self.module_path(module);
        path.push(ident.unraw().to_string());
        self.others.push(OtherDecl {
            enclosing: None,
            description: format!("{kind} `{}`", path.join("::")),
        });
        let other = self.others.len() - 1;
        self.markers.push((Marker::Extra, DeclRef::Other(other as u32)));
    }

    // -------------------------------------------------------------------------
    // Resolution

    fn module_path(&self, module: usize) -> Vec<String> {
        let mut path = vec![String::from("crate")];
        if let Some(scope) = self.modules.get(module) {
            path.extend(scope.package.segments().map(String::from));
        }
        path
    }

    /// Resolve `segments` as written in `module` to a path from the crate
    /// root (`crate::...`), or to the foreign path if it is not local.
    fn resolve_path(&self, module: usize, path: &UsePath, depth: usize) -> Vec<String> {
        let segments = path.segments.as_slice();
        if path.leading_colon || depth > MAX_RESOLVE_DEPTH {
            return segments.to_vec();
        }
        let Some((first, rest)) = segments.split_first() else {
            return Vec::new();
        };

        match first.as_str() {
            "crate" => segments.to_vec(),
            "self" => {
                let mut resolved = self.module_path(module);
                resolved.extend_from_slice(rest);
                resolved
            }
            "super" => {
                let mut package = self.modules[module].package.clone();
                let mut rest = segments;
                while let Some((first, tail)) = rest.split_first()
                    && first == "super"
                {
                    package = package.parent().unwrap_or_default();
                    rest = tail;
                }
                let mut resolved = vec![String::from("crate")];
                resolved.extend(package.segments().map(String::from));
                resolved.extend_from_slice(rest);
                resolved
            }
            _ => {
                let scope = &self.modules[module];
                if let Some(import) = scope.imports.iter().find(|import| import.alias == *first) {
                    let mut resolved = self.resolve_path(module, &import.target, depth + 1);
                    resolved.extend_from_slice(rest);
                    return resolved;
                }

                let mut local = self.module_path(module);
                local.extend_from_slice(segments);
                if scope.children.contains(first) || self.type_index.contains_key(&local.join("::")) {
                    return local;
                }

                if rest.is_empty() {
                    for glob in &scope.globs {
                        let mut candidate = self.resolve_path(module, glob, depth + 1);
                        candidate.push(first.clone());
                        if self.type_index.contains_key(&candidate.join("::")) {
                            return candidate;
                        }
                    }
                }

                segments.to_vec()
            }
        }
    }

    fn resolve_type(&self, module: usize, ty: &syn::Type) -> Option<String> {
        let path = type_path(ty)?;
        Some(self.resolve_path(module, &path, 0).join("::"))
    }

    fn lookup(&self, module: usize, ty: &syn::Type) -> Option<TypeRef> {
        let resolved = self.resolve_type(module, ty)?;
        self.type_index.get(&resolved).copied()
    }

    fn implements(&self, ty: TypeRef, trait_name: &str) -> bool {
        let Some(decl) = self.types.get(ty.0 as usize) else {
            return false;
        };
        decl.derives.iter().any(|name| name == trait_name)
            || self
                .impls
                .iter()
                .filter(|imp| imp.trait_name == trait_name)
                .any(|imp| self.lookup(imp.module, &imp.self_ty) == Some(ty))
    }

    /// Whether `ty`, written in `module`, round-trips through serde.
    ///
    /// Tuples and arrays need serializable elements. Paths are accepted when
    /// configured, when a local type derives or implements both serde
    /// traits, when a std container holds serializable types, or when they
    /// name a native leaf. Generic arguments are checked in every case.
    fn serializable_in(&self, module: usize, ty: &syn::Type) -> bool {
        match ty {
            syn::Type::Paren(inner) => self.serializable_in(module, &inner.elem),
            syn::Type::Group(inner) => self.serializable_in(module, &inner.elem),
            syn::Type::Array(array) => self.serializable_in(module, &array.elem),
            syn::Type::Tuple(tuple) => {
                !tuple.elems.is_empty()
                    && tuple.elems.iter().all(|elem| self.serializable_in(module, elem))
            }
            syn::Type::Path(path) if path.qself.is_none() => {
                let Some(resolved) = self.resolve_type(module, ty) else {
                    return false;
                };
                let args = type_arguments(&path.path);
                let args_serializable =
                    |args: &[&syn::Type]| args.iter().all(|arg| self.serializable_in(module, arg));

                if self.serializable.iter().any(|path| *path == resolved) {
                    return args_serializable(&args);
                }
                if let Some(&target) = self.type_index.get(&resolved) {
                    return self.implements(target, "Serialize")
                        && self.implements(target, "Deserialize")
                        && args_serializable(&args);
                }
                if let Some(arity) = std_container(&resolved) {
                    return args.len() >= arity && args_serializable(&args[..arity]);
                }
                args.is_empty() && is_native(&resolved)
            }
            _ => false,
        }
    }

    fn type_decl(&self, ty: TypeRef) -> Option<&TypeDecl> {
        self.types.get(ty.0 as usize)
    }
}

// -----------------------------------------------------------------------------
// Program

impl Program for SourceProgram {
    fn marked_declarations(&self, marker: Marker) -> Vec<DeclRef> {
        self.markers
            .iter()
            .filter(|(kind, _)| *kind == marker)
            .map(|(_, decl)| *decl)
            .collect()
    }

    fn enclosing_type(&self, decl: DeclRef) -> Option<TypeRef> {
        match decl {
            DeclRef::Type(ty) => self.type_decl(ty).map(|_| ty),
            DeclRef::Field(field) => self.field(field).map(|_| field.owner),
            DeclRef::Other(other) => self.others.get(other as usize)?.enclosing,
        }
    }

    fn is_struct_like(&self, ty: TypeRef) -> bool {
        self.type_decl(ty)
            .is_some_and(|decl| decl.kind == TypeKind::NamedStruct)
    }

    fn is_assignable(&self, ty: TypeRef, capability: Capability) -> bool {
        match capability {
            Capability::Host => self.implements(ty, "Host"),
        }
    }

    fn is_serializable(&self, ty: &syn::Type, within: TypeRef) -> bool {
        self.type_decl(within)
            .is_some_and(|decl| self.serializable_in(decl.module, ty))
    }

    fn fields_of(&self, ty: TypeRef) -> Vec<FieldRef> {
        let Some(decl) = self.type_decl(ty) else {
            return Vec::new();
        };
        (0..decl.fields.len() as u32)
            .map(|index| FieldRef { owner: ty, index })
            .collect()
    }

    fn field(&self, field: FieldRef) -> Option<&syn::Field> {
        self.type_decl(field.owner)?.fields.get(field.index as usize)
    }

    fn simple_name(&self, ty: TypeRef) -> Option<Ident> {
        self.type_decl(ty).map(|decl| decl.ident.clone())
    }

    fn qualified_name(&self, ty: TypeRef) -> String {
        match self.type_decl(ty) {
            Some(decl) => {
                let mut path = self.module_path(decl.module);
                path.push(decl.ident.unraw().to_string());
                path.join("::")
            }
            None => format!("<unknown type {}>", ty.0),
        }
    }

    fn package_of(&self, ty: TypeRef) -> Package {
        self.type_decl(ty)
            .and_then(|decl| self.modules.get(decl.module))
            .map(|module| module.package.clone())
            .unwrap_or_default()
    }

    fn type_named(&self, package: &Package, name: &str) -> Option<TypeRef> {
        let mut path = vec!["crate"];
        path.extend(package.segments());
        path.push(name);
        self.type_index.get(&path.join("::")).copied()
    }

    fn describe(&self, decl: DeclRef) -> String {
        match decl {
            DeclRef::Type(ty) => match self.type_decl(ty) {
                Some(decl) => format!("{} `{}`", decl.kind.keyword(), self.qualified_name(ty)),
                None => self.qualified_name(ty),
            },
            DeclRef::Field(field) => match self.field(field) {
                Some(syn_field) => format!(
                    "field `{}` of `{}`",
                    field_label(syn_field, field.index as usize),
                    self.qualified_name(field.owner)
                ),
                None => format!("<unknown field {} of type {}>", field.index, field.owner.0),
            },
            DeclRef::Other(other) => match self.others.get(other as usize) {
                Some(decl) => decl.description.clone(),
                None => format!("<unknown declaration {other}>"),
            },
        }
    }
}

// -----------------------------------------------------------------------------
// Helpers

fn read_file(path: &Path) -> Result<syn::File, SourceError> {
    let text = std::fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    syn::parse_file(&text).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[inline]
fn has_marker(attrs: &[Attribute]) -> bool {
    attrs.iter().any(ExtraAttr::is_marker)
}

fn is_test_only(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .meta
                .require_list()
                .is_ok_and(|list| list.tokens.to_string() == "test")
    })
}

/// The last path segment of every derive, `serde::Serialize` -> `Serialize`.
fn derives(attrs: &[Attribute]) -> Vec<String> {
    let mut names = Vec::new();
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("derive")) {
        if let Ok(paths) = attr.parse_args_with(Punctuated::<syn::Path, Token![,]>::parse_terminated) {
            names.extend(
                paths
                    .iter()
                    .filter_map(|path| path.segments.last())
                    .map(|segment| segment.ident.to_string()),
            );
        }
    }
    names
}

fn field_label(field: &syn::Field, index: usize) -> String {
    match &field.ident {
        Some(ident) => ident.unraw().to_string(),
        None => index.to_string(),
    }
}

/// The type arguments of the last segment, `HashMap<K, V>` -> `[K, V]`.
fn type_arguments(path: &syn::Path) -> Vec<&syn::Type> {
    let last = path.segments.last().map(|segment| &segment.arguments);
    let Some(syn::PathArguments::AngleBracketed(args)) = last else {
        return Vec::new();
    };
    args.args
        .iter()
        .filter_map(|arg| match arg {
            syn::GenericArgument::Type(ty) => Some(ty),
            _ => None,
        })
        .collect()
}

/// How many leading type arguments of a std container serde needs to
/// handle, or `None` if `resolved` is not one.
///
/// Bare names only count for the prelude types, everything else must be
/// reached through `std`, `alloc` or `core`.
fn std_container(resolved: &str) -> Option<usize> {
    let (module, name) = match resolved.rsplit_once("::") {
        Some((module, name)) => (Some(module), name),
        None => (None, resolved),
    };
    let arity = match name {
        "Vec" | "VecDeque" | "LinkedList" | "BinaryHeap" | "BTreeSet" | "HashSet" | "Box" | "Option" => 1,
        "BTreeMap" | "HashMap" | "Result" => 2,
        _ => return None,
    };
    let reachable = match module {
        None => matches!(name, "Vec" | "Box" | "Option" | "Result"),
        Some(module) => {
            let root = module.split("::").next().unwrap_or_default();
            matches!(root, "std" | "alloc" | "core")
        }
    };
    reachable.then_some(arity)
}

fn is_native(resolved: &str) -> bool {
    let leaf = ["core::primitive::", "std::primitive::", "std::", "alloc::"]
        .iter()
        .find_map(|prefix| resolved.strip_prefix(prefix))
        .unwrap_or(resolved);
    NATIVE.contains(&leaf)
}

fn type_path(ty: &syn::Type) -> Option<UsePath> {
    match ty {
        syn::Type::Paren(inner) => type_path(&inner.elem),
        syn::Type::Group(inner) => type_path(&inner.elem),
        syn::Type::Path(path) if path.qself.is_none() => Some(UsePath {
            leading_colon: path.path.leading_colon.is_some(),
            segments: path
                .path
                .segments
                .iter()
                .map(|segment| segment.ident.unraw().to_string())
                .collect(),
        }),
        _ => None,
    }
}

fn collect_use(tree: &UseTree, prefix: &mut Vec<String>, leading_colon: bool, scope: &mut Module) {
    match tree {
        UseTree::Path(path) => {
            prefix.push(path.ident.unraw().to_string());
            collect_use(&path.tree, prefix, leading_colon, scope);
            prefix.pop();
        }
        UseTree::Name(name) => {
            let name = name.ident.unraw().to_string();
            let mut segments = prefix.clone();
            // `use a::b::{self}` imports `b`.
            let alias = if name == "self" {
                match prefix.last() {
                    Some(last) => last.clone(),
                    None => return,
                }
            } else {
                segments.push(name.clone());
                name
            };
            scope.imports.push(Import {
                alias,
                target: UsePath {
                    leading_colon,
                    segments,
                },
            });
        }
        UseTree::Rename(rename) => {
            let alias = rename.rename.unraw().to_string();
            if alias == "_" {
                return;
            }
            let mut segments = prefix.clone();
            if rename.ident != "self" {
                segments.push(rename.ident.unraw().to_string());
            }
            scope.imports.push(Import {
                alias,
                target: UsePath {
                    leading_colon,
                    segments,
                },
            });
        }
        UseTree::Glob(_) => scope.globs.push(UsePath {
            leading_colon,
            segments: prefix.clone(),
        }),
        UseTree::Group(group) => {
            for tree in &group.items {
                collect_use(tree, prefix, leading_colon, scope);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SourceProgram;
    use crate::Package;
    use crate::program::{Capability, DeclRef, Marker, Program, TypeRef};
    use syn::parse_quote;

    fn program(modules: &[(&str, &str)]) -> SourceProgram {
        let mut program = SourceProgram::new();
        for (package, source) in modules {
            program.parse_str(Package::new(package), source).unwrap();
        }
        program
    }

    fn host_named(program: &SourceProgram, qualified: &str) -> TypeRef {
        program
            .marked_declarations(Marker::Host)
            .into_iter()
            .filter_map(|decl| program.enclosing_type(decl))
            .find(|ty| program.qualified_name(*ty) == qualified)
            .unwrap()
    }

    const MODEL: &str = r#"
        use serde::{Deserialize, Serialize};

        #[derive(Debug, Serialize, Deserialize)]
        pub struct Book { pub id: i32 }

        #[derive(Serialize)]
        pub struct Draft;

        pub struct Money(pub i64);
        impl serde::Serialize for Money { }
        impl<'de> serde::Deserialize<'de> for Money { }

        pub mod nested {
            #[derive(serde::Serialize, serde::Deserialize)]
            pub struct Page;
        }
    "#;

    #[test]
    fn markers_in_declaration_order() {
        let program = program(&[(
            "screens",
            r#"
            #[derive(Host)]
            pub struct Main {
                #[parcel(payload)]
                payload: Option<Payload>,
                #[extra] a: i32,
                plain: i32,
                #[extra] b: i64,
            }

            #[derive(Host)]
            pub enum NotAStruct { A }

            #[extra]
            fn misplaced() {}

            pub enum Mode {
                #[extra] Fast,
                Slow(#[extra] i32),
            }
            "#,
        )]);

        let hosts = program.marked_declarations(Marker::Host);
        assert_eq!(hosts.len(), 2);
        assert_eq!(program.describe(hosts[1]), "enum `crate::screens::NotAStruct`");

        let extras: Vec<String> = program
            .marked_declarations(Marker::Extra)
            .into_iter()
            .map(|decl| program.describe(decl))
            .collect();
        assert_eq!(
            extras,
            [
                "field `a` of `crate::screens::Main`",
                "field `b` of `crate::screens::Main`",
                "function `crate::screens::misplaced`",
                "variant `Fast` of enum `crate::screens::Mode`",
                "field `0` of variant `Slow` of enum `crate::screens::Mode`",
            ]
        );

        let main = host_named(&program, "crate::screens::Main");
        assert!(program.is_struct_like(main));
        assert!(program.is_assignable(main, Capability::Host));
        assert_eq!(program.fields_of(main).len(), 4);
        assert_eq!(program.package_of(main), Package::new("screens"));
        assert_eq!(program.simple_name(main).unwrap(), "Main");
    }

    #[test]
    fn same_name_in_two_modules() {
        let program = program(&[
            ("a", "#[derive(Host)] pub struct Ticket { #[parcel(payload)] p: Option<Payload> }"),
            ("b", "#[derive(Host)] pub struct Ticket { #[parcel(payload)] p: Option<Payload> }"),
        ]);
        let a = host_named(&program, "crate::a::Ticket");
        let b = host_named(&program, "crate::b::Ticket");
        assert!(!program.same_type(a, b));
        assert!(program.same_type(a, a));
        assert_eq!(program.simple_name(a), program.simple_name(b));
        assert_eq!(program.type_named(&Package::new("b"), "Ticket"), Some(b));
        assert_eq!(program.type_named(&Package::root(), "Ticket"), None);
    }

    #[test]
    fn host_through_manual_impl() {
        let program = program(&[(
            "",
            r#"
            pub struct Manual { payload: Option<Payload> }
            impl parcel_payload::Host for Manual {}
            pub struct Other;
            impl !Host for Other {}
            "#,
        )]);
        assert!(program.is_assignable(TypeRef(0), Capability::Host));
        assert!(!program.is_assignable(TypeRef(1), Capability::Host));
        assert!(program.marked_declarations(Marker::Host).is_empty());
    }

    #[test]
    fn serializable_resolution() {
        let program = program(&[
            ("model", MODEL),
            (
                "screens",
                r#"
                use crate::model::{self, Book as Novel};
                use super::model::nested::*;

                #[derive(Host)]
                pub struct Detail { #[parcel(payload)] p: Option<Payload> }

                pub struct Book;
                "#,
            ),
        ]);
        let detail = host_named(&program, "crate::screens::Detail");
        let check = |ty: syn::Type| program.is_serializable(&ty, detail);

        assert!(check(parse_quote!(Novel)));
        assert!(check(parse_quote!(model::Book)));
        assert!(check(parse_quote!(crate::model::Book)));
        assert!(check(parse_quote!(super::model::Money)));
        assert!(check(parse_quote!(Page)));
        assert!(check(parse_quote!(bool)));
        assert!(check(parse_quote!(core::primitive::f64)));

        // The local `Book` shadows nothing imported and derives nothing.
        assert!(!check(parse_quote!(Book)));
        assert!(!check(parse_quote!(self::Book)));
        // Serialize alone is not enough.
        assert!(!check(parse_quote!(model::Draft)));
        assert!(!check(parse_quote!(chrono::NaiveDate)));
        assert!(!check(parse_quote!(&'static str)));
    }

    #[test]
    fn std_containers_and_generic_arguments() {
        let program = program(&[
            ("model", MODEL),
            (
                "screens",
                r#"
                use std::collections::{BTreeMap, HashMap as Map};
                use crate::model::Book;

                #[derive(Host)]
                pub struct Detail { #[parcel(payload)] p: Option<Payload> }

                #[derive(Serialize, Deserialize)]
                pub struct Wrapper<T>(T);
                pub struct NotSerde;
                pub struct Vec<T>(T);
                "#,
            ),
        ]);
        let detail = host_named(&program, "crate::screens::Detail");
        let check = |ty: syn::Type| program.is_serializable(&ty, detail);

        assert!(check(parse_quote!(std::vec::Vec<Book>)));
        assert!(check(parse_quote!(Map<String, Option<i64>>)));
        assert!(check(parse_quote!(BTreeMap<u32, (i32, String)>)));
        assert!(check(parse_quote!(std::collections::VecDeque<std::string::String>)));
        assert!(check(parse_quote!(Box<Option<Book>>)));
        assert!(check(parse_quote!([f64; 3])));
        assert!(check(parse_quote!((i64, bool))));
        assert!(check(parse_quote!(Wrapper<Book>)));

        // Element types are checked too.
        assert!(!check(parse_quote!(Wrapper<NotSerde>)));
        assert!(!check(parse_quote!(Map<String, NotSerde>)));
        assert!(!check(parse_quote!(::std::vec::Vec<std::fs::File>)));
        assert!(!check(parse_quote!([NotSerde; 2])));
        assert!(!check(parse_quote!(std::vec::Vec)));
        // `VecDeque` is not in the prelude, and the local `Vec` is not serde.
        assert!(!check(parse_quote!(VecDeque<i32>)));
        assert!(!check(parse_quote!(Vec<i32>)));
        assert!(!check(parse_quote!(&'static [u8])));
        assert!(!check(parse_quote!(())));
    }

    #[test]
    fn configured_serializable_paths() {
        let mut program = SourceProgram::new()
            .with_serializable(["chrono::NaiveDate", "crate::model::Plain"]);
        program
            .parse_str(
                Package::new("model"),
                r#"
                use chrono::NaiveDate as Date;
                #[derive(Host)] pub struct Host { #[parcel(payload)] p: Option<Payload> }
                pub struct Plain;
                "#,
            )
            .unwrap();
        let host = host_named(&program, "crate::model::Host");

        assert!(program.is_serializable(&parse_quote!(Date), host));
        assert!(program.is_serializable(&parse_quote!(::chrono::NaiveDate), host));
        assert!(program.is_serializable(&parse_quote!(Plain), host));
    }

    #[test]
    fn modules_are_added_once() {
        let mut program = program(&[("screens", "pub mod detail { pub struct Inner; }")]);
        assert_eq!(program.type_count(), 1);
        assert!(program.parse_str(Package::new("screens"), "").is_err());
        assert!(program.parse_str(Package::new("screens::detail"), "").is_err());
        assert!(program.parse_str(Package::new("other"), "").is_ok());
    }

    #[test]
    fn unknown_handles_are_neutral() {
        let program = SourceProgram::new();
        let ty = TypeRef(7);
        assert!(!program.is_struct_like(ty));
        assert!(program.fields_of(ty).is_empty());
        assert_eq!(program.enclosing_type(DeclRef::Type(ty)), None);
        assert_eq!(program.enclosing_type(DeclRef::Other(0)), None);
        assert!(program.simple_name(ty).is_none());
    }

    #[test]
    fn load_crate_follows_module_files() {
        let root = std::env::temp_dir().join(format!("parcel_codegen_load_{}", std::process::id()));
        let src = root.join("src");
        std::fs::create_dir_all(src.join("screens")).unwrap();
        std::fs::write(
            src.join("lib.rs"),
            "pub mod model;\npub mod screens;\n#[cfg(test)]\nmod tests;\n",
        )
        .unwrap();
        std::fs::write(src.join("model.rs"), MODEL).unwrap();
        std::fs::write(src.join("screens").join("mod.rs"), "pub mod detail;").unwrap();
        std::fs::write(
            src.join("screens").join("detail.rs"),
            "#[derive(Host)] pub struct Detail { #[parcel(payload)] p: Option<Payload> }",
        )
        .unwrap();

        let mut program = SourceProgram::new();
        let loaded = program.load_crate(&src.join("lib.rs")).unwrap();
        assert_eq!(loaded.len(), 4);

        let detail = host_named(&program, "crate::screens::detail::Detail");
        assert_eq!(program.package_of(detail), Package::new("screens::detail"));
        assert!(program.is_serializable(&parse_quote!(crate::model::nested::Page), detail));

        std::fs::write(src.join("lib.rs"), "mod missing;").unwrap();
        assert!(SourceProgram::new().load_crate(&src.join("lib.rs")).is_err());

        std::fs::remove_dir_all(&root).unwrap();
    }
}
