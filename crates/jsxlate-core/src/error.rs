//! Error and warning types for translation.
//!
//! ```text
//! CompileError   - member- and type-level failures (fail the compile)
//! CompileWarning - non-fatal findings
//! RegistryError  - metadata snapshot operations
//! ```
//!
//! Errors and warnings are not propagated with `?` across members: the
//! translation pass turns them into [`Diagnostic`](crate::Diagnostic)s and
//! keeps walking.

use std::fmt;

use thiserror::Error;

use crate::Span;

/// Category of a diagnostic, independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    // Errors
    /// Two mutually exclusive member kinds were requested.
    AttributeConflict,
    /// A kind was requested on a member that cannot carry it.
    IllegalKindForSlot,
    /// The same type identity was declared twice in one assembly.
    DuplicateTypeDefinition,
    /// `OptionalField` on something other than a property accessor.
    InvalidOptionalFieldUsage,
    /// A malformed inline or direct code template.
    ParseFailure,
    /// Any other failure while building a member body.
    TranslationFailure,
    /// The same member signature was produced twice for one type.
    DuplicateMember,
    /// Two explicit output names collide in one scope.
    NameCollision,

    // Warnings
    /// A proxy type is publicly visible.
    PublicProxy,
    /// A type was compiled from its reflected definition.
    ReflectedDefinition,
}

impl DiagnosticKind {
    /// Human-readable name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::AttributeConflict => "attribute conflict",
            DiagnosticKind::IllegalKindForSlot => "illegal kind for slot",
            DiagnosticKind::DuplicateTypeDefinition => "duplicate type definition",
            DiagnosticKind::InvalidOptionalFieldUsage => "invalid optional field usage",
            DiagnosticKind::ParseFailure => "parse failure",
            DiagnosticKind::TranslationFailure => "translation failure",
            DiagnosticKind::DuplicateMember => "duplicate member",
            DiagnosticKind::NameCollision => "name collision",
            DiagnosticKind::PublicProxy => "public proxy",
            DiagnosticKind::ReflectedDefinition => "reflected definition",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Errors found while translating an assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Conflicting member kinds on one declaration.
    #[error("at {span}: conflicting attributes on '{member}': {message}")]
    AttributeConflict {
        member: String,
        message: String,
        span: Span,
    },

    /// A kind that no single body can satisfy for this dispatch slot.
    #[error("at {span}: '{kind}' is not allowed on '{member}': {reason}")]
    IllegalKindForSlot {
        kind: String,
        member: String,
        reason: String,
        span: Span,
    },

    /// The same type identity declared twice.
    #[error("at {span}: duplicate definition of type '{name}'")]
    DuplicateTypeDefinition { name: String, span: Span },

    /// `OptionalField` requested on a non-property member.
    #[error("at {span}: 'OptionalField' can only be used on property getters and setters, not '{member}'")]
    InvalidOptionalFieldUsage { member: String, span: Span },

    /// Malformed inline or direct code.
    #[error("at {span}: cannot parse code template '{template}': {message}")]
    ParseFailure {
        template: String,
        message: String,
        span: Span,
    },

    /// Failure while building a member body.
    #[error("at {span}: cannot translate '{member}': {message}")]
    TranslationFailure {
        member: String,
        message: String,
        span: Span,
    },

    /// The same signature produced twice in one class.
    #[error("at {span}: member '{member}' is already defined on '{owner}'")]
    DuplicateMember {
        owner: String,
        member: String,
        span: Span,
    },

    /// Two explicit names collide.
    #[error("at {span}: explicit name '{name}' is already used in {scope}")]
    NameCollision {
        name: String,
        scope: String,
        span: Span,
    },
}

impl CompileError {
    /// The category of this error.
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            CompileError::AttributeConflict { .. } => DiagnosticKind::AttributeConflict,
            CompileError::IllegalKindForSlot { .. } => DiagnosticKind::IllegalKindForSlot,
            CompileError::DuplicateTypeDefinition { .. } => DiagnosticKind::DuplicateTypeDefinition,
            CompileError::InvalidOptionalFieldUsage { .. } => {
                DiagnosticKind::InvalidOptionalFieldUsage
            }
            CompileError::ParseFailure { .. } => DiagnosticKind::ParseFailure,
            CompileError::TranslationFailure { .. } => DiagnosticKind::TranslationFailure,
            CompileError::DuplicateMember { .. } => DiagnosticKind::DuplicateMember,
            CompileError::NameCollision { .. } => DiagnosticKind::NameCollision,
        }
    }

    /// Where the error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompileError::AttributeConflict { span, .. }
            | CompileError::IllegalKindForSlot { span, .. }
            | CompileError::DuplicateTypeDefinition { span, .. }
            | CompileError::InvalidOptionalFieldUsage { span, .. }
            | CompileError::ParseFailure { span, .. }
            | CompileError::TranslationFailure { span, .. }
            | CompileError::DuplicateMember { span, .. }
            | CompileError::NameCollision { span, .. } => *span,
        }
    }
}

/// Non-fatal findings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileWarning {
    #[error("at {span}: proxy type '{name}' should not be public")]
    PublicProxy { name: String, span: Span },

    #[error("at {span}: compiling '{name}' from its reflected definition")]
    ReflectedDefinition { name: String, span: Span },
}

impl CompileWarning {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            CompileWarning::PublicProxy { .. } => DiagnosticKind::PublicProxy,
            CompileWarning::ReflectedDefinition { .. } => DiagnosticKind::ReflectedDefinition,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CompileWarning::PublicProxy { span, .. }
            | CompileWarning::ReflectedDefinition { span, .. } => *span,
        }
    }
}

/// Errors from metadata snapshot operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two snapshots both define the same type.
    #[error("type '{name}' is defined by both '{first}' and '{second}'")]
    ConflictingType {
        name: String,
        first: String,
        second: String,
    },
}
