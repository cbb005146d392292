//! jsxlate Compiler
//!
//! Member-level translation of a typed declaration tree into per-type
//! translation records, ready for a JavaScript backend.
//!
//! ## Architecture
//!
//! - **Translation**: one depth-first walk classifies attributes and
//!   translates every member, synthesizes algebraic and startup members and
//!   records resource dependencies
//! - **Resolution**: output names are assigned once the whole assembly has
//!   been walked
//!
//! ## Modules
//!
//! - [`annotation`]: attribute classification and scope composition
//! - [`context`]: the compilation context owning all translation output
//! - [`eval`]: reference evaluator for translated bodies
//! - [`options`]: compiler configuration
//! - [`passes`]: translation pass, member translator, augmenter, resolver
//! - [`template`]: parser for inline and direct code templates

pub mod annotation;
pub mod context;
pub mod eval;
pub mod options;
pub mod passes;
pub mod template;

pub use annotation::{Annotation, MemberKind, classify, compose};
pub use context::CompilationContext;
pub use eval::{EvalError, Evaluator, Value};
pub use options::CompilerOptions;
pub use passes::{TranslationOutput, TranslationPass};

// Re-export the error types from core for convenience
pub use jsxlate_core::{CompileError, CompileWarning};

use jsxlate_core::Assembly;
use jsxlate_registry::AssemblyMetadata;

/// Translate one assembly into a fresh context. Names are not resolved yet.
pub fn translate<'meta>(
    assembly: &Assembly,
    prior: &'meta AssemblyMetadata,
    options: CompilerOptions,
) -> CompilationContext<'meta> {
    let mut ctx = CompilationContext::new(prior, options);
    TranslationPass::new(&mut ctx).run(assembly);
    ctx
}
