//! Expression grammar shared by front-end bodies and emitted member bodies.
//!
//! The front-end hands over type-checked bodies in this grammar (literals,
//! calls, field access, conditionals, lambdas, let-bindings). The translator
//! emits bodies in the same grammar, extended with the nodes only it
//! produces: template holes, static-field access, the startup guard and the
//! error placeholder.

use std::fmt;

use ordered_float::OrderedFloat;

use crate::{MemberSignature, TypeHash};

/// A literal value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    /// `null`
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(OrderedFloat<f64>),
    /// A string.
    String(String),
}

impl Literal {
    /// Float literal helper.
    pub fn float(value: f64) -> Self {
        Literal::Float(OrderedFloat(value))
    }

    /// String literal helper.
    pub fn string(value: impl Into<String>) -> Self {
        Literal::String(value.into())
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => write!(f, "null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{}", x.0),
            Literal::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Binary operators available in code templates and bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
}

impl BinaryOp {
    /// Source spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Less => "<",
            BinaryOp::LessEq => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
}

/// Reference to a member of a translated type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodRef {
    /// Declaring type.
    pub owner: TypeHash,
    /// Member signature within the declaring type.
    pub signature: MemberSignature,
}

impl MethodRef {
    pub fn new(owner: TypeHash, signature: MemberSignature) -> Self {
        Self { owner, signature }
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// The `undefined` value.
    Undefined,
    /// The receiver of an instance member body.
    This,
    /// A literal.
    Literal(Literal),
    /// A local variable or parameter.
    Var(String),
    /// A template hole, substituted by the call site's argument at this index.
    Hole(usize),
    /// An externally named global (dotted path), taken verbatim.
    Global(String),
    /// `let name = value in body`
    Let {
        name: String,
        value: Box<Expr>,
        body: Box<Expr>,
    },
    /// A function value.
    Lambda { params: Vec<String>, body: Box<Expr> },
    /// Application of a function value.
    Apply { func: Box<Expr>, args: Vec<Expr> },
    /// Call of a translated member.
    Call {
        receiver: Option<Box<Expr>>,
        method: MethodRef,
        args: Vec<Expr>,
    },
    /// Constructor invocation.
    New { ctor: Box<Expr>, args: Vec<Expr> },
    /// `obj.field`
    FieldGet { obj: Box<Expr>, field: String },
    /// `obj.field = value`
    FieldSet {
        obj: Box<Expr>,
        field: String,
        value: Box<Expr>,
    },
    /// `obj[key]`
    ItemGet { obj: Box<Expr>, key: Box<Expr> },
    /// Read of a static field of a translated type.
    StaticFieldGet { owner: TypeHash, field: String },
    /// Write of a static field of a translated type.
    StaticFieldSet {
        owner: TypeHash,
        field: String,
        value: Box<Expr>,
    },
    /// Run the static initializer of a type if it has not run yet.
    StaticInit(TypeHash),
    /// `cond ? then : otherwise`
    Conditional {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// Evaluate in order, value of the last.
    Sequence(Vec<Expr>),
    /// Object literal; keys keep their order.
    Object(Vec<(String, Expr)>),
    /// Array literal.
    Array(Vec<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Inert placeholder left where a member failed to translate.
    Error(String),
}

impl Expr {
    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Literal::String(s.into()))
    }

    pub fn int(i: i64) -> Self {
        Expr::Literal(Literal::Int(i))
    }

    pub fn null() -> Self {
        Expr::Literal(Literal::Null)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn global(name: impl Into<String>) -> Self {
        Expr::Global(name.into())
    }

    pub fn field(obj: Expr, field: impl Into<String>) -> Self {
        Expr::FieldGet {
            obj: Box::new(obj),
            field: field.into(),
        }
    }

    pub fn apply(func: Expr, args: Vec<Expr>) -> Self {
        Expr::Apply {
            func: Box::new(func),
            args,
        }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn conditional(cond: Expr, then: Expr, otherwise: Expr) -> Self {
        Expr::Conditional {
            cond: Box::new(cond),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    pub fn let_in(name: impl Into<String>, value: Expr, body: Expr) -> Self {
        Expr::Let {
            name: name.into(),
            value: Box::new(value),
            body: Box::new(body),
        }
    }

    /// Whether this is the error placeholder.
    pub fn is_error(&self) -> bool {
        matches!(self, Expr::Error(_))
    }

    /// Visit this expression and all sub-expressions in pre-order.
    ///
    /// Stops early and returns `true` as soon as `pred` matches.
    pub fn any(&self, pred: &impl Fn(&Expr) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match self {
            Expr::Undefined
            | Expr::This
            | Expr::Literal(_)
            | Expr::Var(_)
            | Expr::Hole(_)
            | Expr::Global(_)
            | Expr::StaticFieldGet { .. }
            | Expr::StaticInit(_)
            | Expr::Error(_) => false,
            Expr::Let { value, body, .. } => value.any(pred) || body.any(pred),
            Expr::Lambda { body, .. } => body.any(pred),
            Expr::Apply { func, args } => func.any(pred) || args.iter().any(|a| a.any(pred)),
            Expr::Call { receiver, args, .. } => {
                receiver.as_deref().is_some_and(|r| r.any(pred)) || args.iter().any(|a| a.any(pred))
            }
            Expr::New { ctor, args } => ctor.any(pred) || args.iter().any(|a| a.any(pred)),
            Expr::FieldGet { obj, .. } => obj.any(pred),
            Expr::FieldSet { obj, value, .. } => obj.any(pred) || value.any(pred),
            Expr::ItemGet { obj, key } => obj.any(pred) || key.any(pred),
            Expr::StaticFieldSet { value, .. } => value.any(pred),
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => cond.any(pred) || then.any(pred) || otherwise.any(pred),
            Expr::Sequence(items) | Expr::Array(items) => items.iter().any(|e| e.any(pred)),
            Expr::Object(fields) => fields.iter().any(|(_, e)| e.any(pred)),
            Expr::Binary { left, right, .. } => left.any(pred) || right.any(pred),
            Expr::Unary { operand, .. } => operand.any(pred),
        }
    }
}

/// A statement in a static initializer or the entry point.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    /// Evaluate an expression for its effect.
    Expr(Expr),
    /// Initialize a static field of the owning type.
    FieldInit { field: String, value: Expr },
}
