//! Member signatures: the structural identity of every member record.

use std::fmt;

use crate::{TypeHash, TypeRef};

/// Name used for constructor signatures.
pub const CONSTRUCTOR_NAME: &str = ".ctor";

/// Structural identity of a method or constructor.
///
/// Two signatures are equal when name, parameter types, return type and
/// generic arity are all equal; overloads differ in their parameter types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberSignature {
    /// Source name (`get_X`/`set_X` for property accessors, `.ctor` for constructors).
    pub name: String,
    /// Ordered parameter types.
    pub params: Vec<TypeRef>,
    /// Return type.
    pub return_type: TypeRef,
    /// Number of generic method parameters.
    pub generic_arity: u32,
}

impl MemberSignature {
    /// Create a non-generic signature.
    pub fn new(name: impl Into<String>, params: Vec<TypeRef>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            generic_arity: 0,
        }
    }

    /// Constructor signature with the given parameter types.
    pub fn constructor(params: Vec<TypeRef>) -> Self {
        Self::new(CONSTRUCTOR_NAME, params, TypeRef::void())
    }

    /// Property getter signature.
    pub fn getter(property: &str, ty: TypeRef) -> Self {
        Self::new(format!("get_{property}"), Vec::new(), ty)
    }

    /// Property setter signature.
    pub fn setter(property: &str, ty: TypeRef) -> Self {
        Self::new(format!("set_{property}"), vec![ty], TypeRef::void())
    }

    /// Set the generic arity.
    pub fn with_generic_arity(mut self, arity: u32) -> Self {
        self.generic_arity = arity;
        self
    }

    /// Whether this is a constructor signature.
    pub fn is_constructor(&self) -> bool {
        self.name == CONSTRUCTOR_NAME
    }

    /// Hash of this signature as a member of `owner`.
    pub fn member_hash(&self, owner: TypeHash) -> TypeHash {
        let params: Vec<TypeHash> = self.params.iter().map(TypeRef::type_hash).collect();
        TypeHash::from_member(owner, &self.name, &params, self.generic_arity)
    }
}

impl fmt::Display for MemberSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if self.generic_arity > 0 {
            write!(f, "`{}", self.generic_arity)?;
        }
        write!(f, "(")?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{p}")?;
        }
        write!(f, "): {}", self.return_type)
    }
}
