//! Shared builders for the translation integration tests.
//!
//! Declaration trees are built in code: one assembly, one source file, the
//! types under test. Contexts borrow a process-wide empty prior snapshot so
//! they can be returned from helpers.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::OnceLock;

use jsxlate::*;

pub const ASSEMBLY: &str = "Web";
pub const FILE: &str = "src/Main.fs";

/// Empty metadata for assemblies without references.
pub fn no_references() -> &'static AssemblyMetadata {
    static PRIOR: OnceLock<AssemblyMetadata> = OnceLock::new();
    PRIOR.get_or_init(AssemblyMetadata::empty)
}

pub fn options() -> CompilerOptions {
    CompilerOptions::new().with_assembly_name(ASSEMBLY)
}

/// Wrap types into a one-file assembly.
pub fn assembly(types: Vec<TypeDecl>) -> Assembly {
    let mut file = SourceFile::new(FILE);
    file.types = types;
    Assembly::new(ASSEMBLY).with_file(file)
}

/// Translate and resolve types against no references.
pub fn translate(types: Vec<TypeDecl>) -> CompilationContext<'static> {
    translate_with(types, options())
}

pub fn translate_with(types: Vec<TypeDecl>, options: CompilerOptions) -> CompilationContext<'static> {
    translate_assembly(&assembly(types), no_references(), options)
}

pub fn int() -> TypeRef {
    TypeRef::named(well_known::INT32)
}

pub fn string() -> TypeRef {
    TypeRef::named(well_known::STRING)
}

/// A class marked for translation.
pub fn js_class(name: &str) -> TypeDecl {
    TypeDecl::class(name).with_attribute(Attribute::JavaScript(true))
}

pub fn static_method(name: &str, params: Vec<Param>, return_type: TypeRef) -> MemberDecl {
    MemberDecl::method(name, params, return_type).with_modifiers(MemberModifiers::STATIC)
}

/// Reference to a member of a type declared under `owner`.
pub fn method_ref(owner: &str, signature: MemberSignature) -> MethodRef {
    MethodRef::new(TypeHash::from_name(owner), signature)
}

/// Arguments received by a host function, one entry per call.
pub type Calls = Rc<RefCell<Vec<Vec<Value>>>>;

/// A host function that records its arguments and returns `result`.
pub fn recording_host(
    calls: &Calls,
    result: Value,
) -> impl FnMut(&[Value]) -> Result<Value, EvalError> + 'static {
    let calls = Rc::clone(calls);
    move |args| {
        calls.borrow_mut().push(args.to_vec());
        Ok(result.clone())
    }
}

/// Count diagnostics of one kind.
pub fn count(ctx: &CompilationContext<'_>, kind: DiagnosticKind) -> usize {
    ctx.diagnostics().of_kind(kind).count()
}
