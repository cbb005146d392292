//! Resolved type references as handed over by the front-end.

use std::fmt;

use crate::TypeHash;

/// Fully qualified names the translator gives special meaning to.
pub mod well_known {
    /// The void return type.
    pub const VOID: &str = "System.Void";
    /// The unit type, treated like void.
    pub const UNIT: &str = "Microsoft.FSharp.Core.Unit";
    /// Async computations.
    pub const ASYNC: &str = "Microsoft.FSharp.Control.FSharpAsync";
    /// Task without result.
    pub const TASK: &str = "System.Threading.Tasks.Task";
    /// Task with result.
    pub const TASK_OF: &str = "System.Threading.Tasks.Task`1";
    /// Optional values.
    pub const OPTION: &str = "Microsoft.FSharp.Core.FSharpOption`1";
    /// Value-type optional values.
    pub const VALUE_OPTION: &str = "Microsoft.FSharp.Core.FSharpValueOption`1";
    /// The universal base type.
    pub const OBJECT: &str = "System.Object";
    /// Strings.
    pub const STRING: &str = "System.String";
    /// 32-bit integers.
    pub const INT32: &str = "System.Int32";
}

/// A reference to a resolved type, possibly generic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeRef {
    /// Fully qualified definition name (generic definitions carry a `` `N `` suffix).
    pub name: String,
    /// Generic arguments, empty for non-generic types.
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    /// A non-generic type.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A generic instantiation.
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The void type.
    pub fn void() -> Self {
        Self::named(well_known::VOID)
    }

    /// `T option` for the given element type.
    pub fn option(inner: TypeRef) -> Self {
        Self::generic(well_known::OPTION, vec![inner])
    }

    /// Identity of this type reference, including generic arguments.
    pub fn type_hash(&self) -> TypeHash {
        let definition = TypeHash::from_name(&self.name);
        let args: Vec<TypeHash> = self.args.iter().map(TypeRef::type_hash).collect();
        TypeHash::from_generic(definition, &args)
    }

    /// Void or unit: methods returning it produce no value.
    pub fn is_void(&self) -> bool {
        self.name == well_known::VOID || self.name == well_known::UNIT
    }

    /// An async computation.
    pub fn is_async(&self) -> bool {
        self.name == well_known::ASYNC || self.name == "Microsoft.FSharp.Control.FSharpAsync`1"
    }

    /// A task, with or without result.
    pub fn is_task(&self) -> bool {
        self.name == well_known::TASK || self.name == well_known::TASK_OF
    }

    /// An optional value, whose absence can be represented by omitting a slot.
    pub fn is_option(&self) -> bool {
        self.name == well_known::OPTION || self.name == well_known::VALUE_OPTION
    }

    /// Simple name without namespace and generic arity suffix.
    pub fn simple_name(&self) -> &str {
        let last = self.name.rsplit(['.', '+']).next().unwrap_or(&self.name);
        last.split('`').next().unwrap_or(last)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{arg}")?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}
