// src/commands/compile.rs
//! The build driver: three barrier-synchronized phases, each fanned out
//! across files with rayon. Parse tasks populate the global registry;
//! analyze tasks only read it and write their own unit; generate tasks
//! each own their output file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::codegen;
use crate::errors::sema::MainEntryError;
use crate::errors::{render_to_stderr, report::with_source};
use crate::frontend::ast::{Class, SubroutineKind};
use crate::frontend::Parser;
use crate::sema::{Analyzer, ExpressionData, GlobalRegistry, SymbolTable, TypePool};

/// Lifecycle state of a single `.jack` file across the three phases.
struct CompilationUnit {
    path: PathBuf,
    source: String,
    class: Class,
    table: SymbolTable,
    data: Option<ExpressionData>,
}

pub struct BuildSummary {
    pub outputs: Vec<PathBuf>,
}

/// CLI entry: build, then surface the unbundled visualizer flags.
pub fn compile_files(files: &[PathBuf], viz_ast: bool, viz_checker: bool) -> ExitCode {
    match run_build(files) {
        Ok(_) => {
            if viz_ast {
                warn!("--viz-ast: the AST visualizer is not bundled; skipping");
            }
            if viz_checker {
                warn!("--viz-checker: the checker visualizer is not bundled; skipping");
            }
            ExitCode::SUCCESS
        }
        Err(()) => ExitCode::FAILURE,
    }
}

/// Compile all files together. Diagnostics are rendered to stderr
/// before returning; `Err(())` means the build failed.
pub fn run_build(files: &[PathBuf]) -> Result<BuildSummary, ()> {
    validate_inputs(files)?;

    let types = TypePool::new();
    let registry = GlobalRegistry::with_standard_library(&types);
    let total = Instant::now();

    // Phase 1: parse and register, one task per file.
    let parse_start = Instant::now();
    let parsed: Vec<Result<CompilationUnit, ()>> = files
        .par_iter()
        .map(|path| parse_job(path, &registry, &types))
        .collect();
    let parse_time = parse_start.elapsed();

    let mut units = Vec::with_capacity(parsed.len());
    let mut failed = false;
    for result in parsed {
        match result {
            Ok(unit) => units.push(unit),
            Err(()) => failed = true,
        }
    }
    if failed {
        return Err(());
    }

    validate_main_entry(&registry, &types).map_err(|e| {
        eprintln!("error: {e}");
    })?;

    // Phase 2: semantic analysis. Tasks read the registry and write
    // only their own symbol table and expression data.
    let analyze_start = Instant::now();
    let analyzed = units
        .par_iter_mut()
        .map(|unit| analyze_job(unit, &registry, &types))
        .collect::<Vec<_>>();
    let analyze_time = analyze_start.elapsed();
    if analyzed.iter().any(Result::is_err) {
        return Err(());
    }

    // Phase 3: code generation, one output file per task.
    let generate_start = Instant::now();
    let generated = units
        .par_iter_mut()
        .map(generate_job)
        .collect::<Vec<Result<PathBuf, ()>>>();
    let generate_time = generate_start.elapsed();

    let mut outputs = Vec::with_capacity(generated.len());
    for result in generated {
        match result {
            Ok(path) => outputs.push(path),
            Err(()) => return Err(()),
        }
    }

    info!(
        files = units.len(),
        parse_ms = parse_time.as_millis() as u64,
        analyze_ms = analyze_time.as_millis() as u64,
        generate_ms = generate_time.as_millis() as u64,
        total_ms = total.elapsed().as_millis() as u64,
        "build successful"
    );

    Ok(BuildSummary { outputs })
}

/// Every input must exist, carry the `.jack` extension, and the set
/// must include `Main.jack` (case-sensitive).
fn validate_inputs(files: &[PathBuf]) -> Result<(), ()> {
    if files.is_empty() {
        eprintln!("error: no input files");
        return Err(());
    }

    for path in files {
        if !path.exists() {
            eprintln!("error: path does not exist: {}", path.display());
            return Err(());
        }
        if path.extension().and_then(|e| e.to_str()) != Some("jack") {
            eprintln!(
                "error: invalid file type (only .jack files are allowed): {}",
                path.display()
            );
            return Err(());
        }
    }

    let has_main = files
        .iter()
        .any(|path| path.file_name().and_then(|n| n.to_str()) == Some("Main.jack"));
    if !has_main {
        eprintln!("error: Missing 'Main.jack'");
        eprintln!("the list of files to compile must include the Main class");
        return Err(());
    }

    Ok(())
}

fn validate_main_entry(registry: &GlobalRegistry, types: &TypePool) -> Result<(), MainEntryError> {
    let Some(sig) = registry.signature("Main", "main") else {
        return Err(MainEntryError::Missing);
    };
    if sig.kind != SubroutineKind::Function {
        return Err(MainEntryError::NotAFunction);
    }
    if sig.return_type != types.well_known().void {
        return Err(MainEntryError::NotVoid);
    }
    Ok(())
}

fn parse_job(
    path: &Path,
    registry: &GlobalRegistry,
    types: &TypePool,
) -> Result<CompilationUnit, ()> {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: could not read '{}': {e}", path.display());
            return Err(());
        }
    };
    let file = path.display().to_string();

    let mut parser = Parser::new(&source);
    let class = match parser.parse() {
        Ok(class) => class,
        Err(parse_errors) => {
            let lexer_errors = parser.take_lexer_errors();
            if lexer_errors.is_empty() {
                for error in parse_errors {
                    render_to_stderr(&with_source(error, &file, &source));
                }
            } else {
                // Parse errors downstream of bad tokens are noise; show
                // the lexical failures only.
                for error in lexer_errors {
                    render_to_stderr(&with_source(error, &file, &source));
                }
            }
            return Err(());
        }
    };

    if let Err(error) = registry.register_class_decl(&class, types) {
        render_to_stderr(&with_source(error, &file, &source));
        return Err(());
    }

    info!(file = %file, class = %class.name, "parsed");
    Ok(CompilationUnit {
        path: path.to_path_buf(),
        source,
        class,
        table: SymbolTable::new(),
        data: None,
    })
}

fn analyze_job(
    unit: &mut CompilationUnit,
    registry: &GlobalRegistry,
    types: &TypePool,
) -> Result<(), ()> {
    let analyzer = Analyzer::new(registry, types);
    match analyzer.analyse_class(&unit.class, &mut unit.table) {
        Ok(data) => {
            unit.data = Some(data);
            info!(file = %unit.path.display(), "analyzed");
            Ok(())
        }
        Err(error) => {
            let file = unit.path.display().to_string();
            render_to_stderr(&with_source(error, &file, &unit.source));
            Err(())
        }
    }
}

fn generate_job(unit: &mut CompilationUnit) -> Result<PathBuf, ()> {
    let Some(data) = &unit.data else {
        unreachable!("generate phase runs after analysis");
    };

    let out_path = unit.path.with_extension("vm");
    let file = match fs::File::create(&out_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("error: could not open output '{}': {e}", out_path.display());
            return Err(());
        }
    };

    let mut out = std::io::BufWriter::new(file);
    let result = codegen::compile_class(&unit.class, &mut unit.table, data, &mut out)
        .and_then(|_| out.flush());
    if let Err(e) = result {
        eprintln!("error: could not write '{}': {e}", out_path.display());
        return Err(());
    }

    info!(file = %out_path.display(), "generated");
    Ok(out_path)
}
