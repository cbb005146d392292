//! Compilation passes.
//!
//! ```text
//! Assembly ──▶ TranslationPass ──▶ CompilationContext ──▶ Resolver ──▶ backend
//!                 │                      ▲
//!                 ├─ MemberTranslator ───┤
//!                 ├─ algebraic ──────────┤
//!                 ├─ StartupBuilder ─────┤
//!                 └─ DependencyBuilder ──┘
//! ```
//!
//! - [`translation`]: single walk over the declaration tree
//! - [`members`]: one member to one member record
//! - [`algebraic`]: synthesized members of unions and records
//! - [`startup`]: per-file startup type for top-level values
//! - [`dependencies`]: resource and entry-point graph edges
//! - [`resolve`]: output names for everything registered

pub mod algebraic;
pub mod dependencies;
pub mod members;
pub mod resolve;
pub mod startup;
pub mod translation;

pub use dependencies::DependencyBuilder;
pub use members::MemberTranslator;
pub use resolve::Resolver;
pub use startup::{StartupBuilder, startup_type_name};
pub use translation::{TranslationOutput, TranslationPass};

use std::cell::Cell;

use jsxlate_core::{CompileError, Expr, Span};

/// Reject a front-end body the translator cannot emit.
///
/// Template holes only appear in bodies the translator produces itself, and
/// error nodes mark bodies the front-end already failed on.
pub fn validate_body(member: &str, body: &Expr, span: Span) -> Result<(), CompileError> {
    let failure = |message: String| CompileError::TranslationFailure {
        member: member.to_string(),
        message,
        span,
    };
    if body.any(&|e| matches!(e, Expr::Hole(_))) {
        return Err(failure("body contains a template hole".to_string()));
    }
    let error = Cell::new(None);
    body.any(&|e| match e {
        Expr::Error(message) => {
            error.set(Some(message.clone()));
            true
        }
        _ => false,
    });
    match error.into_inner() {
        Some(message) => Err(failure(format!("body failed to translate: {message}"))),
        None => Ok(()),
    }
}
