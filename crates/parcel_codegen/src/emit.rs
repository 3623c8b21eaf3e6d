//! Sinks for synthesized types.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parcel_utils::naming::{to_snake_case, unique_name};

use crate::Package;
use crate::desc::TypeDescription;
use crate::render::{RenderPaths, render_type};

/// First line of every generated file.
pub const GENERATED_HEADER: &str = "// @generated by parcel_codegen. Do not edit.";

/// Name of the per-package file including every generated file of the package.
pub const INDEX_FILE: &str = "parcel.rs";

// -----------------------------------------------------------------------------
// Emitter

/// Receives every synthesized type of a run.
pub trait Emitter {
    fn emit(&mut self, package: &Package, description: &TypeDescription) -> io::Result<()>;
}

// -----------------------------------------------------------------------------
// FileEmitter

/// Writes one file per generated type under a root directory, usually
/// `OUT_DIR` of a build script.
///
/// The type `TicketCreator` of package `screens` lands in
/// `<root>/screens/ticket_creator.rs`. After the run,
/// [`write_indexes`](Self::write_indexes) writes `<root>/screens/parcel.rs`,
/// which the module `screens` includes:
///
/// ```ignore
/// include!(concat!(env!("OUT_DIR"), "/parcel/screens/parcel.rs"));
/// ```
///
/// Files whose content did not change are not rewritten. Two types whose
/// names share a snake-case form, such as `HttpServerCreator` and
/// `HTTPServerCreator`, get distinct files: the later one is suffixed with
/// `_` until its stem is free.
#[derive(Debug)]
pub struct FileEmitter {
    root: PathBuf,
    paths: RenderPaths,
    files: BTreeMap<Package, Vec<(String, PathBuf)>>,
}

impl FileEmitter {
    pub fn new(root: impl Into<PathBuf>, paths: RenderPaths) -> Self {
        Self {
            root: root.into(),
            paths,
            files: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package_dir(&self, package: &Package) -> PathBuf {
        self.root.join(package.dir())
    }

    pub fn index_path(&self, package: &Package) -> PathBuf {
        self.package_dir(package).join(INDEX_FILE)
    }

    /// Files written so far, by package, in emission order.
    pub fn written(&self) -> impl Iterator<Item = (&Package, Vec<&Path>)> {
        self.files.iter().map(|(package, files)| {
            (package, files.iter().map(|(_, path)| path.as_path()).collect())
        })
    }

    /// The file of `name`, reusing the one it already got in `package`.
    fn file_for(&self, package: &Package, name: &str) -> PathBuf {
        let files = self.files.get(package).map(Vec::as_slice).unwrap_or_default();
        if let Some((_, path)) = files.iter().find(|(emitted, _)| emitted == name) {
            return path.clone();
        }

        let index_stem = INDEX_FILE.trim_end_matches(".rs");
        let base = to_snake_case(name);
        let stem = unique_name(&base, |stem| {
            stem == index_stem
                || files
                    .iter()
                    .any(|(_, path)| path.file_stem().is_some_and(|taken| taken == stem))
        });
        if stem != base {
            log::debug!("`{name}` shares the file name `{base}.rs`, using `{stem}.rs`");
        }
        self.package_dir(package).join(format!("{stem}.rs"))
    }

    /// Write the index file of every package that received a type.
    ///
    /// Returns the number of index files.
    pub fn write_indexes(&self) -> io::Result<usize> {
        for (package, files) in &self.files {
            let mut text = format!("{GENERATED_HEADER}\n\n");
            for (_, file) in files {
                // `include!` resolves relative paths against the including
                // file, so only absolute paths survive the double include.
                text.push_str(&format!("include!({:?});\n", file.display().to_string()));
            }
            write_if_changed(&self.index_path(package), &text)?;
        }
        Ok(self.files.len())
    }
}

impl Emitter for FileEmitter {
    fn emit(&mut self, package: &Package, description: &TypeDescription) -> io::Result<()> {
        let dir = self.package_dir(package);
        fs::create_dir_all(&dir)?;

        let name = description.name.to_string();
        let path = self.file_for(package, &name);
        let text = format!(
            "{GENERATED_HEADER}\n\n{}\n",
            render_type(description, &self.paths)
        );
        write_if_changed(&path, &text)?;
        log::debug!("emitted `{}` into {}", description.name, path.display());

        let files = self.files.entry(package.clone()).or_default();
        if !files.iter().any(|(emitted, _)| *emitted == name) {
            files.push((name, path));
        }
        Ok(())
    }
}

fn write_if_changed(path: &Path, text: &str) -> io::Result<()> {
    if fs::read_to_string(path).is_ok_and(|current| current == text) {
        return Ok(());
    }
    fs::write(path, text)
}

// -----------------------------------------------------------------------------
// MemoryEmitter

/// Keeps every emitted type in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    pub paths: RenderPaths,
    artifacts: Vec<(Package, TypeDescription)>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn artifacts(&self) -> &[(Package, TypeDescription)] {
        &self.artifacts
    }

    pub fn find(&self, package: &Package, name: &str) -> Option<&TypeDescription> {
        self.artifacts
            .iter()
            .find(|(emitted, description)| emitted == package && description.name == name)
            .map(|(_, description)| description)
    }

    /// The source text of an emitted type.
    pub fn render(&self, package: &Package, name: &str) -> Option<String> {
        self.find(package, name)
            .map(|description| render_type(description, &self.paths).to_string())
    }

    /// `package::Name` of every emitted type, in emission order.
    pub fn names(&self) -> Vec<String> {
        self.artifacts
            .iter()
            .map(|(package, description)| {
                if package.is_root() {
                    description.name.to_string()
                } else {
                    format!("{}::{}", package.as_str(), description.name)
                }
            })
            .collect()
    }
}

impl Emitter for MemoryEmitter {
    fn emit(&mut self, package: &Package, description: &TypeDescription) -> io::Result<()> {
        self.artifacts.push((package.clone(), description.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Emitter, FileEmitter, GENERATED_HEADER, INDEX_FILE, MemoryEmitter};
    use crate::config::GeneratorConfig;
    use crate::render::RenderPaths;
    use crate::synth::synthesize_builder;
    use crate::synth::tests::{TICKET, schemas};
    use crate::Package;

    #[test]
    fn files_and_index() {
        let root = std::env::temp_dir().join(format!("parcel_codegen_emit_{}", std::process::id()));
        let schema = &schemas("screens::detail", TICKET)[0];
        let artifact = synthesize_builder(schema, &GeneratorConfig::default());

        let mut emitter = FileEmitter::new(&root, RenderPaths::default());
        emitter.emit(&artifact.package, &artifact.description).unwrap();
        // Emitting twice keeps a single index entry.
        emitter.emit(&artifact.package, &artifact.description).unwrap();
        assert_eq!(emitter.write_indexes().unwrap(), 1);

        let dir = root.join("screens").join("detail");
        let file = dir.join("ticket_creator.rs");
        let text = std::fs::read_to_string(&file).unwrap();
        assert!(text.starts_with(GENERATED_HEADER));
        assert!(syn::parse_file(&text).is_ok());

        let index = std::fs::read_to_string(dir.join(INDEX_FILE)).unwrap();
        assert_eq!(index.matches("include!").count(), 1);
        assert!(index.contains("ticket_creator.rs"));
        assert_eq!(emitter.index_path(&artifact.package), dir.join(INDEX_FILE));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn colliding_file_names() {
        let root = std::env::temp_dir().join(format!("parcel_codegen_collide_{}", std::process::id()));
        let source = r#"
            #[derive(Host)]
            pub struct HttpServer { #[parcel(payload)] p: Option<Payload>, #[extra] port: i32 }
            #[derive(Host)]
            pub struct HTTPServer { #[parcel(payload)] p: Option<Payload>, #[extra] port: i32 }
        "#;
        let mut emitter = FileEmitter::new(&root, RenderPaths::default());
        for schema in &schemas("net", source) {
            let artifact = synthesize_builder(schema, &GeneratorConfig::default());
            emitter.emit(&artifact.package, &artifact.description).unwrap();
            emitter.emit(&artifact.package, &artifact.description).unwrap();
        }
        emitter.write_indexes().unwrap();

        let dir = root.join("net");
        let written: Vec<_> = emitter.written().flat_map(|(_, files)| files).collect();
        assert_eq!(written, [dir.join("http_server_creator.rs"), dir.join("http_server_creator_.rs")]);

        let first = std::fs::read_to_string(dir.join("http_server_creator.rs")).unwrap();
        let second = std::fs::read_to_string(dir.join("http_server_creator_.rs")).unwrap();
        assert!(first.contains("pub struct HttpServerCreator"));
        assert!(second.contains("pub struct HTTPServerCreator"));

        let index = std::fs::read_to_string(dir.join(INDEX_FILE)).unwrap();
        assert_eq!(index.matches("include!").count(), 2);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn memory_keeps_order() {
        let mut emitter = MemoryEmitter::new();
        for (package, source) in [("b", TICKET), ("", TICKET), ("a", TICKET)] {
            let schema = &schemas(package, source)[0];
            let artifact = synthesize_builder(schema, &GeneratorConfig::default());
            emitter.emit(&artifact.package, &artifact.description).unwrap();
        }
        assert_eq!(emitter.names(), ["b::TicketCreator", "TicketCreator", "a::TicketCreator"]);
        assert!(emitter.find(&Package::new("a"), "TicketCreator").is_some());
        assert!(emitter.find(&Package::new("c"), "TicketCreator").is_none());
        assert!(emitter.render(&Package::root(), "TicketCreator").is_some());
    }
}
