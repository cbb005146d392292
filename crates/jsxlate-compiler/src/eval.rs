//! Reference evaluator for translated bodies.
//!
//! Interprets the expression grammar directly against a
//! [`CompilationContext`], so the behaviour of emitted members can be
//! checked by running them rather than by inspecting trees:
//!
//! - `Callable` bodies bind parameters by name and the receiver as `this`.
//! - Every other executable kind (inline, direct, stub, remote) is a
//!   template: the receiver, if any, is hole 0 followed by the arguments.
//! - `StaticInit(T)` runs the static initializer of `T` at most once.
//! - Globals resolve to host functions registered on the evaluator. The
//!   optional-slot primitives of the configured runtime namespace are
//!   always available.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use jsxlate_core::{
    BinaryOp, Expr, Literal, MethodKind, MethodRef, NotResolvedMethod, Statement, TypeHash,
    UnaryOp,
};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::trace;

use crate::context::CompilationContext;

/// Nested calls allowed before evaluation gives up.
const MAX_DEPTH: usize = 256;

/// Errors raised while evaluating.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unbound variable '{0}'")]
    UnboundVariable(String),
    #[error("unknown global '{0}'")]
    UnknownGlobal(String),
    #[error("hole ${0} has no argument")]
    MissingHole(usize),
    #[error("'this' used without a receiver")]
    NoReceiver,
    #[error("no member {0}")]
    UnknownMethod(String),
    #[error("{0} cannot be invoked")]
    NotCallable(String),
    #[error("type error: {0}")]
    TypeError(String),
    #[error("evaluated an error placeholder: {0}")]
    Placeholder(String),
    #[error("call depth exceeded")]
    StackOverflow,
    #[error("host function '{name}' failed: {message}")]
    Host { name: String, message: String },
}

/// A function value created by a lambda.
#[derive(Debug)]
pub struct Closure {
    params: Vec<String>,
    body: Expr,
    frame: Frame,
}

/// A runtime value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Object with ordered keys.
    Object(Rc<RefCell<Vec<(String, Value)>>>),
    Array(Rc<RefCell<Vec<Value>>>),
    Closure(Rc<Closure>),
    /// A registered host function.
    Host(String),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// A fresh object with the given fields.
    pub fn object(fields: Vec<(String, Value)>) -> Self {
        Value::Object(Rc::new(RefCell::new(fields)))
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(x) => *x != 0.0 && !x.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) | Value::Array(_) | Value::Closure(_) | Value::Host(_) => true,
        }
    }

    /// Field of an object value.
    pub fn get(&self, field: &str) -> Option<Value> {
        match self {
            Value::Object(fields) => fields
                .borrow()
                .iter()
                .find(|(k, _)| k == field)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    /// Whether an object value has the field at all.
    pub fn has(&self, field: &str) -> bool {
        match self {
            Value::Object(fields) => fields.borrow().iter().any(|(k, _)| k == field),
            _ => false,
        }
    }

    /// Keys of an object value, in insertion order.
    pub fn keys(&self) -> Vec<String> {
        match self {
            Value::Object(fields) => fields.borrow().iter().map(|(k, _)| k.clone()).collect(),
            _ => Vec::new(),
        }
    }

    fn set(&self, field: &str, value: Value) -> Result<(), EvalError> {
        let Value::Object(fields) = self else {
            return Err(EvalError::TypeError(format!("cannot set '{field}' on {self}")));
        };
        let mut fields = fields.borrow_mut();
        match fields.iter_mut().find(|(k, _)| k == field) {
            Some((_, slot)) => *slot = value,
            None => fields.push((field.to_string(), value)),
        }
        Ok(())
    }

    /// Drop a slot; absent slots are left alone.
    fn remove(&self, field: &str) -> Result<(), EvalError> {
        let Value::Object(fields) = self else {
            return Err(EvalError::TypeError(format!("cannot remove '{field}' from {self}")));
        };
        fields.borrow_mut().retain(|(k, _)| k != field);
        Ok(())
    }

    fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Host(a), Value::Host(b)) => a == b,
            _ => false,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(other)
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Int(*i),
            Literal::Float(x) => Value::Float(x.into_inner()),
            Literal::String(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Array(items) => {
                let items = items.borrow();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Value::Closure(_) => write!(f, "function"),
            Value::Host(name) => write!(f, "function {name}"),
        }
    }
}

/// Host function signature.
pub type HostFn = Box<dyn FnMut(&[Value]) -> Result<Value, EvalError>>;

/// Bindings visible to one body.
#[derive(Debug, Clone, Default)]
struct Frame {
    this: Option<Value>,
    holes: Vec<Value>,
    vars: Vec<(String, Value)>,
}

impl Frame {
    fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        self.vars
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| EvalError::UnboundVariable(name.to_string()))
    }
}

/// Evaluates translated bodies of one compilation context.
pub struct Evaluator<'c, 'meta> {
    ctx: &'c CompilationContext<'meta>,
    hosts: FxHashMap<String, HostFn>,
    statics: FxHashMap<(TypeHash, String), Value>,
    initialized: FxHashSet<TypeHash>,
    depth: usize,
}

impl<'c, 'meta> Evaluator<'c, 'meta> {
    pub fn new(ctx: &'c CompilationContext<'meta>) -> Self {
        let mut eval = Self {
            ctx,
            hosts: FxHashMap::default(),
            statics: FxHashMap::default(),
            initialized: FxHashSet::default(),
            depth: 0,
        };

        let get_optional = ctx.options().get_optional();
        let set_optional = ctx.options().set_optional();
        eval.register_host(get_optional.clone(), move |args| match args {
            [obj, Value::String(field), ..] => Ok(obj.get(field).unwrap_or(Value::Undefined)),
            _ => Err(EvalError::Host {
                name: get_optional.clone(),
                message: "expected an object and a field name".to_string(),
            }),
        });
        eval.register_host(set_optional.clone(), move |args| match args {
            [obj, Value::String(field), value, ..] => {
                if value.is_nullish() {
                    obj.remove(field)?;
                } else {
                    obj.set(field, value.clone())?;
                }
                Ok(Value::Undefined)
            }
            _ => Err(EvalError::Host {
                name: set_optional.clone(),
                message: "expected an object, a field name and a value".to_string(),
            }),
        });
        eval
    }

    /// Make a global name callable.
    pub fn register_host(
        &mut self,
        name: impl Into<String>,
        f: impl FnMut(&[Value]) -> Result<Value, EvalError> + 'static,
    ) {
        self.hosts.insert(name.into(), Box::new(f));
    }

    pub fn with_host(
        mut self,
        name: impl Into<String>,
        f: impl FnMut(&[Value]) -> Result<Value, EvalError> + 'static,
    ) -> Self {
        self.register_host(name, f);
        self
    }

    /// Current value of a static field.
    pub fn static_field(&self, owner: TypeHash, field: &str) -> Option<&Value> {
        self.statics.get(&(owner, field.to_string()))
    }

    /// Evaluate a closed expression.
    pub fn eval(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        self.eval_in(expr, &mut Frame::default())
    }

    /// Invoke a translated member.
    pub fn call(
        &mut self,
        method: &MethodRef,
        receiver: Option<Value>,
        args: Vec<Value>,
    ) -> Result<Value, EvalError> {
        let record = self.lookup(method)?;
        trace!(method = %method.signature, kind = ?record.kind, "call");

        let mut frame = match record.kind {
            MethodKind::Callable => Frame {
                this: receiver,
                holes: Vec::new(),
                vars: record.params.iter().cloned().zip(args).collect(),
            },
            MethodKind::Inline
            | MethodKind::Direct
            | MethodKind::Stub
            | MethodKind::Remote { .. } => Frame {
                this: None,
                holes: receiver.into_iter().chain(args).collect(),
                vars: Vec::new(),
            },
            MethodKind::Abstract | MethodKind::NoFallback | MethodKind::Generated { .. } => {
                return Err(EvalError::NotCallable(method.signature.to_string()));
            }
        };

        self.enter()?;
        let result = self.eval_in(&record.body, &mut frame);
        self.depth -= 1;
        result
    }

    /// Run the entry statement, if the context has one.
    pub fn run_entry_point(&mut self) -> Result<Option<Value>, EvalError> {
        let Some(statement) = self.ctx.entry_point() else {
            return Ok(None);
        };
        match statement {
            Statement::Expr(expr) => self.eval(expr).map(Some),
            Statement::FieldInit { field, .. } => Err(EvalError::TypeError(format!(
                "entry point cannot initialize field '{field}'"
            ))),
        }
    }

    fn lookup(&self, method: &MethodRef) -> Result<&'c NotResolvedMethod, EvalError> {
        let ctx: &'c CompilationContext<'meta> = self.ctx;
        let class = ctx
            .class(method.owner)
            .ok_or_else(|| EvalError::UnknownMethod(method.signature.to_string()))?;
        let found = if method.signature.is_constructor() {
            class.constructor(&method.signature)
        } else {
            class.method(&method.signature)
        };
        found.ok_or_else(|| EvalError::UnknownMethod(format!("{}::{}", class.name, method.signature)))
    }

    fn enter(&mut self) -> Result<(), EvalError> {
        if self.depth >= MAX_DEPTH {
            return Err(EvalError::StackOverflow);
        }
        self.depth += 1;
        Ok(())
    }

    /// Run the static initializer of `owner` unless it already ran.
    fn static_init(&mut self, owner: TypeHash) -> Result<(), EvalError> {
        if !self.initialized.insert(owner) {
            return Ok(());
        }
        let ctx: &'c CompilationContext<'meta> = self.ctx;
        let Some(statements) = ctx.class(owner).and_then(|c| c.static_initializer()) else {
            return Ok(());
        };
        trace!(owner = ?owner, statements = statements.len(), "static initializer");
        for statement in statements {
            match statement {
                Statement::Expr(expr) => {
                    self.eval(expr)?;
                }
                Statement::FieldInit { field, value } => {
                    let value = self.eval(value)?;
                    self.statics.insert((owner, field.clone()), value);
                }
            }
        }
        Ok(())
    }

    fn apply(&mut self, func: Value, args: Vec<Value>) -> Result<Value, EvalError> {
        match func {
            Value::Host(name) => {
                let host = self
                    .hosts
                    .get_mut(&name)
                    .ok_or_else(|| EvalError::UnknownGlobal(name.clone()))?;
                host(&args)
            }
            Value::Closure(closure) => {
                let mut frame = closure.frame.clone();
                frame
                    .vars
                    .extend(closure.params.iter().cloned().zip(args));
                self.enter()?;
                let result = self.eval_in(&closure.body, &mut frame);
                self.depth -= 1;
                result
            }
            other => Err(EvalError::NotCallable(other.to_string())),
        }
    }

    fn eval_all(&mut self, exprs: &[Expr], frame: &mut Frame) -> Result<Vec<Value>, EvalError> {
        exprs.iter().map(|e| self.eval_in(e, frame)).collect()
    }

    fn eval_in(&mut self, expr: &Expr, frame: &mut Frame) -> Result<Value, EvalError> {
        match expr {
            Expr::Undefined => Ok(Value::Undefined),
            Expr::This => frame.this.clone().ok_or(EvalError::NoReceiver),
            Expr::Literal(lit) => Ok(Value::from(lit)),
            Expr::Var(name) => frame.lookup(name),
            Expr::Hole(i) => frame.holes.get(*i).cloned().ok_or(EvalError::MissingHole(*i)),
            Expr::Global(name) => {
                if self.hosts.contains_key(name) {
                    Ok(Value::Host(name.clone()))
                } else {
                    Err(EvalError::UnknownGlobal(name.clone()))
                }
            }
            Expr::Let { name, value, body } => {
                let value = self.eval_in(value, frame)?;
                frame.vars.push((name.clone(), value));
                let result = self.eval_in(body, frame);
                frame.vars.pop();
                result
            }
            Expr::Lambda { params, body } => Ok(Value::Closure(Rc::new(Closure {
                params: params.clone(),
                body: (**body).clone(),
                frame: frame.clone(),
            }))),
            Expr::Apply { func, args } => {
                let func = self.eval_in(func, frame)?;
                let args = self.eval_all(args, frame)?;
                self.apply(func, args)
            }
            Expr::Call {
                receiver,
                method,
                args,
            } => {
                let receiver = match receiver {
                    Some(r) => Some(self.eval_in(r, frame)?),
                    None => None,
                };
                let args = self.eval_all(args, frame)?;
                self.call(method, receiver, args)
            }
            Expr::New { ctor, args } => {
                let ctor = self.eval_in(ctor, frame)?;
                let args = self.eval_all(args, frame)?;
                self.apply(ctor, args)
            }
            Expr::FieldGet { obj, field } => {
                let obj = self.eval_in(obj, frame)?;
                match &obj {
                    Value::Object(_) => Ok(obj.get(field).unwrap_or(Value::Undefined)),
                    Value::Array(items) if field == "length" => Ok(Value::Int(items.borrow().len() as i64)),
                    Value::String(s) if field == "length" => Ok(Value::Int(s.chars().count() as i64)),
                    other => Err(EvalError::TypeError(format!("cannot read '{field}' of {other}"))),
                }
            }
            Expr::FieldSet { obj, field, value } => {
                let obj = self.eval_in(obj, frame)?;
                let value = self.eval_in(value, frame)?;
                obj.set(field, value)?;
                Ok(Value::Undefined)
            }
            Expr::ItemGet { obj, key } => {
                let obj = self.eval_in(obj, frame)?;
                let key = self.eval_in(key, frame)?;
                match (&obj, &key) {
                    (Value::Array(items), Value::Int(i)) => Ok(usize::try_from(*i)
                        .ok()
                        .and_then(|i| items.borrow().get(i).cloned())
                        .unwrap_or(Value::Undefined)),
                    (Value::Object(_), Value::String(k)) => Ok(obj.get(k).unwrap_or(Value::Undefined)),
                    _ => Err(EvalError::TypeError(format!("cannot index {obj} with {key}"))),
                }
            }
            Expr::StaticFieldGet { owner, field } => Ok(self
                .statics
                .get(&(*owner, field.clone()))
                .cloned()
                .unwrap_or(Value::Undefined)),
            Expr::StaticFieldSet {
                owner,
                field,
                value,
            } => {
                let value = self.eval_in(value, frame)?;
                self.statics.insert((*owner, field.clone()), value);
                Ok(Value::Undefined)
            }
            Expr::StaticInit(owner) => {
                self.static_init(*owner)?;
                Ok(Value::Undefined)
            }
            Expr::Conditional {
                cond,
                then,
                otherwise,
            } => {
                if self.eval_in(cond, frame)?.truthy() {
                    self.eval_in(then, frame)
                } else {
                    self.eval_in(otherwise, frame)
                }
            }
            Expr::Sequence(items) => {
                let mut last = Value::Undefined;
                for item in items {
                    last = self.eval_in(item, frame)?;
                }
                Ok(last)
            }
            Expr::Object(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for (key, value) in fields {
                    values.push((key.clone(), self.eval_in(value, frame)?));
                }
                Ok(Value::object(values))
            }
            Expr::Array(items) => {
                let items = self.eval_all(items, frame)?;
                Ok(Value::Array(Rc::new(RefCell::new(items))))
            }
            Expr::Binary { op, left, right } => match op {
                BinaryOp::And => {
                    let l = self.eval_in(left, frame)?;
                    if l.truthy() { self.eval_in(right, frame) } else { Ok(l) }
                }
                BinaryOp::Or => {
                    let l = self.eval_in(left, frame)?;
                    if l.truthy() { Ok(l) } else { self.eval_in(right, frame) }
                }
                _ => {
                    let l = self.eval_in(left, frame)?;
                    let r = self.eval_in(right, frame)?;
                    binary(*op, &l, &r)
                }
            },
            Expr::Unary { op, operand } => {
                let value = self.eval_in(operand, frame)?;
                match op {
                    UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
                    UnaryOp::Neg => match value {
                        Value::Int(i) => Ok(Value::Int(i.wrapping_neg())),
                        Value::Float(x) => Ok(Value::Float(-x)),
                        other => Err(EvalError::TypeError(format!("cannot negate {other}"))),
                    },
                }
            }
            Expr::Error(message) => Err(EvalError::Placeholder(message.clone())),
        }
    }
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> Result<Value, EvalError> {
    let mismatch = || EvalError::TypeError(format!("cannot apply '{}' to {l} and {r}", op.as_str()));
    match op {
        BinaryOp::StrictEq => Ok(Value::Bool(l.strict_eq(r))),
        BinaryOp::StrictNotEq => Ok(Value::Bool(!l.strict_eq(r))),
        BinaryOp::Eq => Ok(Value::Bool(loose_eq(l, r))),
        BinaryOp::NotEq => Ok(Value::Bool(!loose_eq(l, r))),
        BinaryOp::Add => match (l, r) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_add(*b))),
            (Value::String(_), _) | (_, Value::String(_)) => Ok(Value::String(format!("{l}{r}"))),
            _ => arith(l, r, |a, b| a + b).ok_or_else(mismatch),
        },
        BinaryOp::Sub => match (l, r) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_sub(*b))),
            _ => arith(l, r, |a, b| a - b).ok_or_else(mismatch),
        },
        BinaryOp::Mul => match (l, r) {
            (Value::Int(a), Value::Int(b)) => Ok(Value::Int(a.wrapping_mul(*b))),
            _ => arith(l, r, |a, b| a * b).ok_or_else(mismatch),
        },
        BinaryOp::Div => match (l, r) {
            (Value::Int(a), Value::Int(b)) if *b != 0 && a.wrapping_rem(*b) == 0 => {
                Ok(Value::Int(a.wrapping_div(*b)))
            }
            _ => arith(l, r, |a, b| a / b).ok_or_else(mismatch),
        },
        BinaryOp::Mod => match (l, r) {
            (Value::Int(a), Value::Int(b)) if *b != 0 => Ok(Value::Int(a.wrapping_rem(*b))),
            _ => arith(l, r, |a, b| a % b).ok_or_else(mismatch),
        },
        BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => {
            let ordering = match (l, r) {
                (Value::String(a), Value::String(b)) => a.partial_cmp(b),
                _ => match (l.as_f64(), r.as_f64()) {
                    (Some(a), Some(b)) => a.partial_cmp(&b),
                    _ => return Err(mismatch()),
                },
            };
            let result = ordering.is_some_and(|o| match op {
                BinaryOp::Less => o.is_lt(),
                BinaryOp::LessEq => o.is_le(),
                BinaryOp::Greater => o.is_gt(),
                _ => o.is_ge(),
            });
            Ok(Value::Bool(result))
        }
        BinaryOp::And | BinaryOp::Or => Err(mismatch()),
    }
}

fn arith(l: &Value, r: &Value, f: impl Fn(f64, f64) -> f64) -> Option<Value> {
    Some(Value::Float(f(l.as_f64()?, r.as_f64()?)))
}

fn loose_eq(l: &Value, r: &Value) -> bool {
    (l.is_nullish() && r.is_nullish()) || l.strict_eq(r)
}
