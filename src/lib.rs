//! jsxlate - member-level translation for a JavaScript backend.
//!
//! Takes a typed declaration tree, decides for every member how it is
//! represented in the output and what its body is, and hands the result to
//! a backend through a resolved [`CompilationContext`].
//!
//! ```text
//! Assembly ──▶ translate ──▶ resolve ──▶ CompilationContext ──▶ backend
//!                 ▲                             │
//!                 └──── AssemblyMetadata ◀──────┘  (next assembly)
//! ```
//!
//! ## Crates
//!
//! - `jsxlate-core`: declaration tree, expressions, records, diagnostics
//! - `jsxlate-registry`: dependency graph and prior-assembly metadata
//! - `jsxlate-compiler`: the passes, the context and the reference evaluator

use thiserror::Error;
use tracing::{debug, info};

pub use jsxlate_compiler::{
    Annotation, CompilationContext, CompilerOptions, EvalError, Evaluator, MemberKind,
    TranslationOutput, TranslationPass, Value, annotation, eval, passes, template,
};
pub use jsxlate_core::*;
pub use jsxlate_registry::{AssemblyMetadata, DependencyGraph, DependencyNode, TypeMetadata};

/// Why an assembly could not be translated.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// Translation recorded at least one error diagnostic.
    #[error("translation of '{assembly}' failed with {count} error(s)")]
    Failed {
        assembly: String,
        count: usize,
        diagnostics: Diagnostics,
    },
    /// Metadata of the translated assemblies could not be combined.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Translate and resolve one assembly.
///
/// The context is returned even when errors were recorded; check
/// [`CompilationContext::has_errors`].
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn translate_assembly<'meta>(
    assembly: &Assembly,
    prior: &'meta AssemblyMetadata,
    options: CompilerOptions,
) -> CompilationContext<'meta> {
    let mut ctx = jsxlate_compiler::translate(assembly, prior, options);
    ctx.resolve();
    debug!(
        assembly = %assembly.name,
        classes = ctx.class_count(),
        errors = ctx.diagnostics().error_count(),
        warnings = ctx.diagnostics().warning_count(),
        "assembly translated"
    );
    ctx
}

/// Translate and resolve one assembly, failing if any error was recorded.
pub fn compile<'meta>(
    assembly: &Assembly,
    prior: &'meta AssemblyMetadata,
    options: CompilerOptions,
) -> Result<CompilationContext<'meta>, TranslateError> {
    let ctx = translate_assembly(assembly, prior, options);
    if ctx.has_errors() {
        return Err(TranslateError::Failed {
            assembly: assembly.name.clone(),
            count: ctx.diagnostics().error_count(),
            diagnostics: ctx.diagnostics().clone(),
        });
    }
    Ok(ctx)
}

/// Compile assemblies in dependency order.
///
/// Each assembly sees the merged metadata of the ones before it. Returns the
/// metadata of all of them.
pub fn compile_all(
    assemblies: &[Assembly],
    options: &CompilerOptions,
) -> Result<AssemblyMetadata, TranslateError> {
    let mut merged = AssemblyMetadata::empty();
    for assembly in assemblies {
        let snapshot = {
            let options = options.clone().with_assembly_name(&assembly.name);
            compile(assembly, &merged, options)?.to_metadata()
        };
        merged = AssemblyMetadata::merge([&merged, &snapshot])?;
    }
    info!(assemblies = assemblies.len(), "compiled");
    Ok(merged)
}
