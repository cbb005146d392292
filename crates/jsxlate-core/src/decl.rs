//! Typed declaration tree supplied by the front-end.
//!
//! Types, members and top-level bindings arrive fully resolved: every type
//! reference is qualified, attributes are already recognized, and member
//! bodies are type-checked expressions. The builders here are what the
//! front-end adapter (and the tests) use to assemble the tree.

use bitflags::bitflags;

use crate::{Expr, Literal, MemberSignature, Span, TypeRef};

/// One assembly worth of source files.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    /// Assembly name.
    pub name: String,
    /// Source files in compilation order.
    pub files: Vec<SourceFile>,
}

impl Assembly {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: SourceFile) -> Self {
        self.files.push(file);
        self
    }
}

/// A source translation unit.
#[derive(Debug, Clone, Default)]
pub struct SourceFile {
    /// Path of the file, as the front-end reports it.
    pub path: String,
    /// Top-level type declarations in source order.
    pub types: Vec<TypeDecl>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            types: Vec::new(),
        }
    }

    pub fn with_type(mut self, ty: TypeDecl) -> Self {
        self.types.push(ty);
        self
    }
}

/// An attribute recognized by the front-end.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// `JavaScript` / `JavaScript(false)`.
    JavaScript(bool),
    /// `Inline` with optional code template.
    Inline(Option<String>),
    /// `Direct(code)`.
    Direct(String),
    /// `Constant(value)`.
    Constant(Literal),
    /// `Stub`.
    Stub,
    /// `NoFallback`.
    NoFallback,
    /// `OptionalField`.
    OptionalField,
    /// `Remote` with optional provider policy.
    Remote(Option<String>),
    /// `Generated(generator, parameter)`.
    Generated {
        generator: TypeRef,
        parameter: Option<Literal>,
    },
    /// `Name(name)`.
    Name(String),
    /// `Require(resource)`.
    Require(TypeRef),
    /// `Macro(type, parameter)`.
    Macro {
        macro_type: TypeRef,
        parameter: Option<Literal>,
    },
    /// `Pure`.
    Pure,
    /// `EntryPoint`.
    EntryPoint,
    /// `Proxy(target)`.
    Proxy(TypeRef),
    /// `DateTimeFormat(field, format)`.
    DateTimeFormat { field: String, format: String },
    /// Any attribute the translator does not interpret.
    Other(String),
}

/// Visibility of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Private,
}

/// Where the front-end got a type definition from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefinitionSource {
    /// Parsed from source in this compilation.
    #[default]
    Parsed,
    /// Recovered from reflection metadata because no source definition was available.
    Reflected,
}

/// The shape of a declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDeclKind {
    Class,
    Interface,
    /// A static module holding functions and top-level bindings.
    Module,
    /// A discriminated union with its cases in source order.
    Union(Vec<UnionCase>),
    /// A record with its fields in declaration order.
    Record(Vec<RecordField>),
}

/// A declared type.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    /// Fully qualified source name.
    pub name: String,
    pub span: Span,
    pub kind: TypeDeclKind,
    pub attributes: Vec<Attribute>,
    pub base: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
    pub members: Vec<MemberDecl>,
    /// Top-level bindings without arguments (modules only).
    pub bindings: Vec<BindingDecl>,
    pub nested: Vec<TypeDecl>,
    pub visibility: Visibility,
    /// The type implements the resource capability.
    pub is_resource: bool,
    pub source: DefinitionSource,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, kind: TypeDeclKind) -> Self {
        Self {
            name: name.into(),
            span: Span::default(),
            kind,
            attributes: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            bindings: Vec::new(),
            nested: Vec::new(),
            visibility: Visibility::Public,
            is_resource: false,
            source: DefinitionSource::Parsed,
        }
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeDeclKind::Class)
    }

    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeDeclKind::Interface)
    }

    pub fn module(name: impl Into<String>) -> Self {
        Self::new(name, TypeDeclKind::Module)
    }

    pub fn union(name: impl Into<String>, cases: Vec<UnionCase>) -> Self {
        Self::new(name, TypeDeclKind::Union(cases))
    }

    pub fn record(name: impl Into<String>, fields: Vec<RecordField>) -> Self {
        Self::new(name, TypeDeclKind::Record(fields))
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn with_base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_interface(mut self, iface: TypeRef) -> Self {
        self.interfaces.push(iface);
        self
    }

    pub fn with_member(mut self, member: MemberDecl) -> Self {
        self.members.push(member);
        self
    }

    pub fn with_binding(mut self, binding: BindingDecl) -> Self {
        self.bindings.push(binding);
        self
    }

    pub fn with_nested(mut self, nested: TypeDecl) -> Self {
        self.nested.push(nested);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as implementing the resource capability.
    pub fn as_resource(mut self) -> Self {
        self.is_resource = true;
        self
    }

    /// Mark as recovered from reflection metadata.
    pub fn reflected(mut self) -> Self {
        self.source = DefinitionSource::Reflected;
        self
    }

    /// A reference to this type.
    pub fn type_ref(&self) -> TypeRef {
        TypeRef::named(self.name.clone())
    }
}

bitflags! {
    /// Dispatch-related modifiers of a member.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MemberModifiers: u8 {
        /// Static member (no receiver).
        const STATIC = 1 << 0;
        /// Abstract dispatch slot without a body.
        const ABSTRACT = 1 << 1;
        /// Overrides a virtual member of a base type.
        const OVERRIDE = 1 << 2;
        /// Implements an interface method.
        const INTERFACE_IMPL = 1 << 3;
    }
}

/// What kind of member a declaration is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberDeclKind {
    Method,
    Constructor,
    /// Getter of the named property.
    Getter { property: String },
    /// Setter of the named property.
    Setter { property: String },
}

/// A formal parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A declared method, constructor or property accessor.
#[derive(Debug, Clone)]
pub struct MemberDecl {
    /// Source name (`get_X`/`set_X` for accessors, `.ctor` for constructors).
    pub name: String,
    pub span: Span,
    pub kind: MemberDeclKind,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub generic_arity: u32,
    pub modifiers: MemberModifiers,
    pub attributes: Vec<Attribute>,
    /// Type-checked body; `None` for abstract members and external declarations.
    pub body: Option<Expr>,
    /// For overrides: the type declaring the overridden slot.
    pub overrides: Option<TypeRef>,
}

impl MemberDecl {
    fn new(name: String, kind: MemberDeclKind, params: Vec<Param>, return_type: TypeRef) -> Self {
        Self {
            name,
            span: Span::default(),
            kind,
            params,
            return_type,
            generic_arity: 0,
            modifiers: MemberModifiers::empty(),
            attributes: Vec::new(),
            body: None,
            overrides: None,
        }
    }

    pub fn method(name: impl Into<String>, params: Vec<Param>, return_type: TypeRef) -> Self {
        Self::new(name.into(), MemberDeclKind::Method, params, return_type)
    }

    pub fn constructor(params: Vec<Param>) -> Self {
        Self::new(
            crate::signature::CONSTRUCTOR_NAME.to_string(),
            MemberDeclKind::Constructor,
            params,
            TypeRef::void(),
        )
    }

    pub fn getter(property: impl Into<String>, ty: TypeRef) -> Self {
        let property = property.into();
        Self::new(
            format!("get_{property}"),
            MemberDeclKind::Getter { property },
            Vec::new(),
            ty,
        )
    }

    pub fn setter(property: impl Into<String>, ty: TypeRef) -> Self {
        let property = property.into();
        Self::new(
            format!("set_{property}"),
            MemberDeclKind::Setter { property },
            vec![Param::new("value", ty)],
            TypeRef::void(),
        )
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn with_body(mut self, body: Expr) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_modifiers(mut self, modifiers: MemberModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn with_generic_arity(mut self, arity: u32) -> Self {
        self.generic_arity = arity;
        self
    }

    /// Mark as overriding a slot declared on `base`.
    pub fn overriding(mut self, base: TypeRef) -> Self {
        self.modifiers |= MemberModifiers::OVERRIDE;
        self.overrides = Some(base);
        self
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.contains(MemberModifiers::STATIC)
    }

    /// Property accessors (getter or setter).
    pub fn is_accessor(&self) -> bool {
        matches!(
            self.kind,
            MemberDeclKind::Getter { .. } | MemberDeclKind::Setter { .. }
        )
    }

    /// Structural identity of this member.
    pub fn signature(&self) -> MemberSignature {
        MemberSignature {
            name: self.name.clone(),
            params: self.params.iter().map(|p| p.ty.clone()).collect(),
            return_type: self.return_type.clone(),
            generic_arity: self.generic_arity,
        }
    }
}

/// One field of a union case.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseField {
    pub name: String,
    pub ty: TypeRef,
}

impl CaseField {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A union case.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionCase {
    pub name: String,
    pub span: Span,
    pub fields: Vec<CaseField>,
    pub attributes: Vec<Attribute>,
}

impl UnionCase {
    pub fn new(name: impl Into<String>, fields: Vec<CaseField>) -> Self {
        Self {
            name: name.into(),
            span: Span::default(),
            fields,
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.attributes.push(attr);
        self
    }
}

/// A record field.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub span: Span,
    pub ty: TypeRef,
    pub mutable: bool,
    pub attributes: Vec<Attribute>,
}

impl RecordField {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            span: Span::default(),
            ty,
            mutable: false,
            attributes: Vec::new(),
        }
    }

    pub fn mutable(mut self) -> Self {
        self.mutable = true;
        self
    }

    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.attributes.push(attr);
        self
    }
}

/// A top-level binding without arguments.
#[derive(Debug, Clone)]
pub struct BindingDecl {
    pub name: String,
    pub span: Span,
    pub ty: TypeRef,
    pub mutable: bool,
    /// Type-checked initializer.
    pub value: Expr,
    pub attributes: Vec<Attribute>,
}

impl BindingDecl {
    pub fn new(name: impl Into<String>, ty: TypeRef, value: Expr) -> Self {
        Self {
            name: name.into(),
            span: Span::default(),
            ty,
            mutable: false,
            value,
            attributes: Vec::new(),
        }
    }

    pub fn mutable(mut self) -> Self {
        self.mutable = true;
        self
    }

    pub fn with_attribute(mut self, attr: Attribute) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }
}
