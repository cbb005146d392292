//! Per-type translation records handed to the resolver and backend.
//!
//! These types hold what the translation pass decided for each member:
//! how it is represented and what its body is. Output names are not part of
//! these records; the resolver assigns them afterwards.
//!
//! # Ownership
//!
//! Every [`NotResolvedMember`] belongs to exactly one [`NotResolvedClass`].
//! [`NotResolvedClass::add_member`] enforces that a member key is unique
//! within its class; overloads are distinct keys because their signatures
//! differ in parameter types.

use std::fmt;

use crate::{CompileError, Expr, Literal, MemberSignature, Span, Statement, TypeHash, TypeRef};

/// A macro attached to a member, run by the backend at call sites.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacroAnnotation {
    pub macro_type: TypeRef,
    pub parameter: Option<Literal>,
}

/// How a remote method is dispatched, derived from its return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RemoteKind {
    /// Fire-and-forget send, for void methods.
    Send,
    /// Async dispatch, for async-result methods.
    Async,
    /// Task dispatch, for task-like methods.
    Task,
    /// Synchronous round-trip for everything else.
    Sync,
}

impl RemoteKind {
    /// Dispatch style for a method returning `return_type`.
    pub fn from_return_type(return_type: &TypeRef) -> Self {
        if return_type.is_void() {
            RemoteKind::Send
        } else if return_type.is_async() {
            RemoteKind::Async
        } else if return_type.is_task() {
            RemoteKind::Task
        } else {
            RemoteKind::Sync
        }
    }

    /// Name of the dispatch primitive within the remoting namespace.
    pub fn primitive(self) -> &'static str {
        match self {
            RemoteKind::Send => "Send",
            RemoteKind::Async => "Async",
            RemoteKind::Task => "Task",
            RemoteKind::Sync => "Call",
        }
    }
}

/// Unique handle identifying a remote method across assemblies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RemoteHandle {
    /// Assembly declaring the method.
    pub assembly: String,
    /// Hash of the declaring type and member signature within that assembly.
    pub id: TypeHash,
}

impl fmt::Display for RemoteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:016x}", self.assembly, self.id.as_u64())
    }
}

/// How a method or constructor is represented in the output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Ordinary callable compiled from its translated body.
    Callable,
    /// Substituted at each call site; never materialized.
    Inline,
    /// Body given as a code template, materialized as a callable.
    Direct,
    /// Dispatch slot filled by an override elsewhere; body is undefined.
    Abstract,
    /// Marker that must not be invoked at runtime.
    NoFallback,
    /// Forwards to an externally named function or constructor.
    Stub,
    /// Serializes its arguments and dispatches through a remote handle.
    Remote { kind: RemoteKind, handle: RemoteHandle },
    /// Body produced by a generator in a later pass.
    Generated {
        generator: TypeRef,
        parameter: Option<Literal>,
    },
}

impl MethodKind {
    /// Whether call sites substitute the body.
    pub fn is_inline(&self) -> bool {
        matches!(self, MethodKind::Inline)
    }
}

/// A translated method or constructor body with its metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotResolvedMethod {
    pub kind: MethodKind,
    pub body: Expr,
    /// Parameter names bound by a callable body, in order.
    pub params: Vec<String>,
    pub is_static: bool,
    pub is_pure: bool,
    /// Explicit output name, honored verbatim by the resolver.
    pub name: Option<String>,
    pub macros: Vec<MacroAnnotation>,
    pub span: Span,
}

impl NotResolvedMethod {
    pub fn new(kind: MethodKind, body: Expr) -> Self {
        Self {
            kind,
            body,
            params: Vec::new(),
            is_static: false,
            is_pure: false,
            name: None,
            macros: Vec::new(),
            span: Span::default(),
        }
    }

    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_pure(mut self, is_pure: bool) -> Self {
        self.is_pure = is_pure;
        self
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_macros(mut self, macros: Vec<MacroAnnotation>) -> Self {
        self.macros = macros;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}

/// Key of a member within its class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MemberKey {
    Method(MemberSignature),
    Constructor(MemberSignature),
    Field(String),
    StaticInitializer,
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKey::Method(sig) | MemberKey::Constructor(sig) => write!(f, "{sig}"),
            MemberKey::Field(name) => write!(f, "field {name}"),
            MemberKey::StaticInitializer => write!(f, "static initializer"),
        }
    }
}

/// A member record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotResolvedMember {
    Method {
        signature: MemberSignature,
        method: NotResolvedMethod,
    },
    Constructor {
        signature: MemberSignature,
        method: NotResolvedMethod,
    },
    Field {
        name: String,
        is_static: bool,
        is_optional: bool,
        ty: TypeRef,
    },
    StaticInitializer(Vec<Statement>),
}

impl NotResolvedMember {
    pub fn key(&self) -> MemberKey {
        match self {
            NotResolvedMember::Method { signature, .. } => MemberKey::Method(signature.clone()),
            NotResolvedMember::Constructor { signature, .. } => {
                MemberKey::Constructor(signature.clone())
            }
            NotResolvedMember::Field { name, .. } => MemberKey::Field(name.clone()),
            NotResolvedMember::StaticInitializer(_) => MemberKey::StaticInitializer,
        }
    }

    /// The method record of a method or constructor.
    pub fn method(&self) -> Option<&NotResolvedMethod> {
        match self {
            NotResolvedMember::Method { method, .. }
            | NotResolvedMember::Constructor { method, .. } => Some(method),
            _ => None,
        }
    }
}

/// How a type as a whole is translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// Static module: no instances, only static members.
    StaticModule,
    /// Union or record with synthesized members.
    Algebraic,
    /// Ordinary class.
    Ordinary,
}

/// One field of a tagged union case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseFieldInfo {
    pub name: String,
    pub ty: TypeRef,
    /// Date-time formatting hint for JSON encoding.
    pub date_format: Option<String>,
}

/// Runtime representation of a union case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseRepresentation {
    /// Represented by an explicit literal.
    Constant(Literal),
    /// Represented by `null`.
    Null,
    /// Object carrying a tag and the listed fields.
    Tagged(Vec<CaseFieldInfo>),
}

/// A union case as translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionCaseInfo {
    pub name: String,
    /// Zero-based position in declaration order.
    pub tag: usize,
    pub representation: CaseRepresentation,
}

/// A record field as translated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFieldInfo {
    pub name: String,
    pub ty: TypeRef,
    /// Stored in an optional slot that is omitted when absent.
    pub is_optional: bool,
    pub is_mutable: bool,
    pub date_format: Option<String>,
}

/// Shape information of algebraic types, consumed by JSON encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgebraicShape {
    Union(Vec<UnionCaseInfo>),
    Record(Vec<RecordFieldInfo>),
}

/// Translation record of one declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotResolvedClass {
    /// Qualified source name.
    pub name: String,
    pub type_hash: TypeHash,
    pub span: Span,
    pub kind: ClassKind,
    pub base: Option<TypeHash>,
    /// Explicit output name, honored verbatim.
    pub strong_name: Option<String>,
    pub is_proxy: bool,
    /// Resources this type requires.
    pub requires: Vec<TypeHash>,
    /// Members in the order they were produced.
    pub members: Vec<NotResolvedMember>,
    pub shape: Option<AlgebraicShape>,
}

impl NotResolvedClass {
    pub fn new(name: impl Into<String>, type_hash: TypeHash, kind: ClassKind) -> Self {
        Self {
            name: name.into(),
            type_hash,
            span: Span::default(),
            kind,
            base: None,
            strong_name: None,
            is_proxy: false,
            requires: Vec::new(),
            members: Vec::new(),
            shape: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_base(mut self, base: Option<TypeHash>) -> Self {
        self.base = base;
        self
    }

    pub fn with_strong_name(mut self, name: Option<String>) -> Self {
        self.strong_name = name;
        self
    }

    pub fn as_proxy(mut self) -> Self {
        self.is_proxy = true;
        self
    }

    pub fn with_requires(mut self, requires: Vec<TypeHash>) -> Self {
        self.requires = requires;
        self
    }

    /// Add a member, rejecting a second member with the same key.
    pub fn add_member(&mut self, member: NotResolvedMember, span: Span) -> Result<(), CompileError> {
        let key = member.key();
        if self.members.iter().any(|m| m.key() == key) {
            return Err(CompileError::DuplicateMember {
                owner: self.name.clone(),
                member: key.to_string(),
                span,
            });
        }
        self.members.push(member);
        Ok(())
    }

    /// Whether a member with this key exists.
    pub fn contains(&self, key: &MemberKey) -> bool {
        self.members.iter().any(|m| &m.key() == key)
    }

    /// The method with the given signature.
    pub fn method(&self, signature: &MemberSignature) -> Option<&NotResolvedMethod> {
        self.members.iter().find_map(|m| match m {
            NotResolvedMember::Method { signature: s, method } if s == signature => Some(method),
            _ => None,
        })
    }

    /// The method with the given source name, if exactly one exists.
    pub fn method_named(&self, name: &str) -> Option<&NotResolvedMethod> {
        let mut found = self.members.iter().filter_map(|m| match m {
            NotResolvedMember::Method { signature, method } if signature.name == name => {
                Some(method)
            }
            _ => None,
        });
        let first = found.next()?;
        found.next().is_none().then_some(first)
    }

    /// The constructor with the given signature.
    pub fn constructor(&self, signature: &MemberSignature) -> Option<&NotResolvedMethod> {
        self.members.iter().find_map(|m| match m {
            NotResolvedMember::Constructor { signature: s, method } if s == signature => {
                Some(method)
            }
            _ => None,
        })
    }

    /// The static initializer statements, if any.
    pub fn static_initializer(&self) -> Option<&[Statement]> {
        self.members.iter().find_map(|m| match m {
            NotResolvedMember::StaticInitializer(stmts) => Some(stmts.as_slice()),
            _ => None,
        })
    }

    /// Iterate over fields as `(name, is_static, is_optional, type)`.
    pub fn fields(&self) -> impl Iterator<Item = (&str, bool, bool, &TypeRef)> {
        self.members.iter().filter_map(|m| match m {
            NotResolvedMember::Field {
                name,
                is_static,
                is_optional,
                ty,
            } => Some((name.as_str(), *is_static, *is_optional, ty)),
            _ => None,
        })
    }
}

/// One entry of an interface's method-name table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceMethod {
    pub signature: MemberSignature,
    /// Explicit output name, honored verbatim.
    pub name: Option<String>,
}

/// Translation record of an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotResolvedInterface {
    pub name: String,
    pub type_hash: TypeHash,
    pub span: Span,
    pub strong_name: Option<String>,
    pub extends: Vec<TypeHash>,
    pub methods: Vec<InterfaceMethod>,
}
