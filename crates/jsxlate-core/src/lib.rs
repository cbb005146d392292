//! Core types for jsxlate.
//!
//! This crate holds everything the translation passes and the registry
//! share: identities, the front-end declaration tree, the expression
//! grammar, per-type translation records and diagnostics.
//!
//! ## Modules
//!
//! - [`span`]: source positions
//! - [`type_hash`]: deterministic identities for types and members
//! - [`type_ref`]: resolved type references and well-known type names
//! - [`signature`]: member signatures
//! - [`decl`]: the declaration tree handed over by the front-end
//! - [`expr`]: expressions and statements
//! - [`not_resolved`]: per-type translation records
//! - [`error`], [`diagnostics`]: error taxonomy and the diagnostics sink

pub mod decl;
pub mod diagnostics;
pub mod error;
pub mod expr;
pub mod not_resolved;
pub mod signature;
pub mod span;
pub mod type_hash;
pub mod type_ref;

pub use decl::{
    Assembly, Attribute, BindingDecl, CaseField, DefinitionSource, MemberDecl, MemberDeclKind,
    MemberModifiers, Param, RecordField, SourceFile, TypeDecl, TypeDeclKind, UnionCase,
    Visibility,
};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CompileError, CompileWarning, DiagnosticKind, RegistryError};
pub use expr::{BinaryOp, Expr, Literal, MethodRef, Statement, UnaryOp};
pub use not_resolved::{
    AlgebraicShape, CaseFieldInfo, CaseRepresentation, ClassKind, InterfaceMethod,
    MacroAnnotation, MemberKey, MethodKind, NotResolvedClass, NotResolvedInterface,
    NotResolvedMember, NotResolvedMethod, RecordFieldInfo, RemoteHandle, RemoteKind,
    UnionCaseInfo,
};
pub use signature::MemberSignature;
pub use span::Span;
pub use type_hash::TypeHash;
pub use type_ref::{TypeRef, well_known};
