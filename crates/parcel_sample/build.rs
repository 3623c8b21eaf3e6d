#![allow(clippy::std_instead_of_core, reason = "build script")]

use std::env;
use std::error::Error;
use std::path::{Path, PathBuf};

use parcel_codegen::diagnostics::CargoDiagnostics;
use parcel_codegen::{Driver, FileEmitter, GeneratorConfig, RenderPaths, SourceProgram};
use parcel_macro_utils::Manifest;

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=Cargo.toml");

    let manifest = Manifest::from_env()?;
    let config = GeneratorConfig::from_manifest(&manifest)?;

    let mut program = SourceProgram::new().with_serializable(config.serializable.clone());
    for file in program.load_crate(Path::new("src/lib.rs"))? {
        println!("cargo:rerun-if-changed={}", file.display());
    }

    let out = PathBuf::from(env::var("OUT_DIR")?).join("parcel");
    let mut emitter = FileEmitter::new(out, RenderPaths::from_manifest(&manifest));
    let mut diagnostics = CargoDiagnostics::new();

    let mut driver = Driver::new(config);
    driver.scan(&program, &mut diagnostics)?;
    driver.finish(&mut emitter, &mut diagnostics)?;
    emitter.write_indexes()?;

    if diagnostics.has_errors() {
        return Err(format!("parcel: {} host(s) could not be generated", diagnostics.errors()).into());
    }
    Ok(())
}
