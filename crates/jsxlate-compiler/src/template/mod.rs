//! Code templates of `Inline` and `Direct` members.
//!
//! A template is a single expression over holes:
//!
//! - `$0`, `$1`, ... by position
//! - `$this` for the receiver of an instance member
//! - `$name` for a parameter by name
//!
//! For instance members `$0` is the receiver and parameters start at `$1`.
//! For static members and constructors `$0` is the first parameter. Holes
//! become [`Expr::Hole`] and are substituted with the call site's arguments.

mod cursor;
mod lexer;
mod parser;

use jsxlate_core::{CompileError, Expr, Span};

use lexer::tokenize;
use parser::Parser;

/// A template syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateError {
    pub message: String,
    /// Column within the template text (1-indexed).
    pub column: u32,
}

impl TemplateError {
    pub fn new(message: impl Into<String>, column: u32) -> Self {
        Self {
            message: message.into(),
            column,
        }
    }
}

/// What holes a template may use.
#[derive(Debug, Clone, Copy)]
pub struct TemplateParams<'a> {
    /// No receiver: `$0` is the first parameter.
    pub is_static: bool,
    /// Parameter names in order.
    pub names: &'a [String],
}

impl<'a> TemplateParams<'a> {
    pub fn new(is_static: bool, names: &'a [String]) -> Self {
        Self { is_static, names }
    }

    /// Index of the first parameter.
    fn offset(&self) -> usize {
        if self.is_static { 0 } else { 1 }
    }

    /// Number of holes available.
    pub fn arity(&self) -> usize {
        self.names.len() + self.offset()
    }

    /// Hole index for the text after `$`.
    pub fn resolve(&self, name: &str) -> Result<usize, String> {
        if name == "this" {
            return if self.is_static {
                Err("'$this' is not available in a static member".to_string())
            } else {
                Ok(0)
            };
        }
        if name.bytes().all(|b| b.is_ascii_digit()) {
            let index: usize = name
                .parse()
                .map_err(|_| format!("invalid hole '${name}'"))?;
            if index >= self.arity() {
                return Err(format!(
                    "'${index}' is out of range, the member has {} argument(s)",
                    self.arity()
                ));
            }
            return Ok(index);
        }
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| i + self.offset())
            .ok_or_else(|| format!("unknown parameter '${name}'"))
    }
}

/// Parse template text into an expression with holes.
pub fn parse(code: &str, params: &TemplateParams<'_>) -> Result<Expr, TemplateError> {
    let tokens = tokenize(code)?;
    Parser::new(tokens, params).parse()
}

/// Parse the template of a member, reporting failures as [`CompileError::ParseFailure`].
pub fn parse_member_template(
    code: &str,
    params: &TemplateParams<'_>,
    span: Span,
) -> Result<Expr, CompileError> {
    parse(code, params).map_err(|e| CompileError::ParseFailure {
        template: code.to_string(),
        message: format!("{} (column {})", e.message, e.column),
        span: span.shifted(e.column, 1),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsxlate_core::{BinaryOp, Literal, UnaryOp};

    fn names(ns: &[&str]) -> Vec<String> {
        ns.iter().map(|s| s.to_string()).collect()
    }

    fn instance(code: &str, ps: &[&str]) -> Result<Expr, TemplateError> {
        let ns = names(ps);
        parse(code, &TemplateParams::new(false, &ns))
    }

    fn static_(code: &str, ps: &[&str]) -> Result<Expr, TemplateError> {
        let ns = names(ps);
        parse(code, &TemplateParams::new(true, &ns))
    }

    #[test]
    fn instance_holes() {
        assert_eq!(instance("$this", &[]).unwrap(), Expr::Hole(0));
        assert_eq!(instance("$0", &[]).unwrap(), Expr::Hole(0));
        assert_eq!(instance("$x", &["x"]).unwrap(), Expr::Hole(1));
        assert_eq!(instance("$1", &["x"]).unwrap(), Expr::Hole(1));
    }

    #[test]
    fn static_holes() {
        assert_eq!(static_("$0", &["x"]).unwrap(), Expr::Hole(0));
        assert_eq!(static_("$y", &["x", "y"]).unwrap(), Expr::Hole(1));
        assert!(static_("$this", &["x"]).is_err());
        assert!(static_("$1", &["x"]).is_err());
    }

    #[test]
    fn unknown_hole() {
        let err = instance("$nope", &["x"]).unwrap_err();
        assert!(err.message.contains("unknown parameter"));
        assert_eq!(err.column, 1);
    }

    #[test]
    fn dotted_globals_and_calls() {
        let e = static_("Math.max($0, 1)", &["a"]).unwrap();
        assert_eq!(
            e,
            Expr::apply(Expr::global("Math.max"), vec![Expr::Hole(0), Expr::int(1)])
        );
    }

    #[test]
    fn member_access_on_holes() {
        let e = instance("$this.items.length", &[]).unwrap();
        assert_eq!(e, Expr::field(Expr::field(Expr::Hole(0), "items"), "length"));
    }

    #[test]
    fn indexing_and_method_call() {
        let e = instance("$0[$1].trim()", &["i"]).unwrap();
        assert_eq!(
            e,
            Expr::apply(
                Expr::field(
                    Expr::ItemGet {
                        obj: Box::new(Expr::Hole(0)),
                        key: Box::new(Expr::Hole(1)),
                    },
                    "trim"
                ),
                vec![]
            )
        );
    }

    #[test]
    fn precedence() {
        let e = static_("$0 + $1 * 2 === 7 || !$0", &["a", "b"]).unwrap();
        let mul = Expr::binary(BinaryOp::Mul, Expr::Hole(1), Expr::int(2));
        let add = Expr::binary(BinaryOp::Add, Expr::Hole(0), mul);
        let eq = Expr::binary(BinaryOp::StrictEq, add, Expr::int(7));
        let not = Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::Hole(0)),
        };
        assert_eq!(e, Expr::binary(BinaryOp::Or, eq, not));
    }

    #[test]
    fn left_associative() {
        let e = static_("1 - 2 - 3", &[]).unwrap();
        let inner = Expr::binary(BinaryOp::Sub, Expr::int(1), Expr::int(2));
        assert_eq!(e, Expr::binary(BinaryOp::Sub, inner, Expr::int(3)));
    }

    #[test]
    fn new_expression() {
        let e = static_("new Date.Range($0)", &["a"]).unwrap();
        assert_eq!(
            e,
            Expr::New {
                ctor: Box::new(Expr::global("Date.Range")),
                args: vec![Expr::Hole(0)],
            }
        );
        let bare = static_("new Object", &[]).unwrap();
        assert!(matches!(bare, Expr::New { ref args, .. } if args.is_empty()));
    }

    #[test]
    fn literals() {
        let e = static_("[1, 2.5, 'a', true, null, undefined]", &[]).unwrap();
        assert_eq!(
            e,
            Expr::Array(vec![
                Expr::int(1),
                Expr::Literal(Literal::float(2.5)),
                Expr::string("a"),
                Expr::Literal(Literal::Bool(true)),
                Expr::null(),
                Expr::Undefined,
            ])
        );
    }

    #[test]
    fn object_literal() {
        let e = static_("{name: $0, 'x-y': 1}", &["n"]).unwrap();
        assert_eq!(
            e,
            Expr::Object(vec![
                ("name".into(), Expr::Hole(0)),
                ("x-y".into(), Expr::int(1)),
            ])
        );
        assert_eq!(static_("{}", &[]).unwrap(), Expr::Object(vec![]));
    }

    #[test]
    fn malformed() {
        assert!(static_("", &[]).is_err());
        assert!(static_("1 +", &[]).is_err());
        assert!(static_("(1", &[]).is_err());
        assert!(static_("a b", &[]).is_err());
        assert!(static_("f(1,)", &[]).is_err());
        assert!(static_("{a 1}", &[]).is_err());
    }

    #[test]
    fn parse_failure_carries_template() {
        let ns = names(&[]);
        let err = parse_member_template("1 +", &TemplateParams::new(true, &ns), Span::new(3, 10, 5))
            .unwrap_err();
        match err {
            CompileError::ParseFailure { template, span, .. } => {
                assert_eq!(template, "1 +");
                assert_eq!(span.line, 3);
                assert_eq!(span.col, 13);
            }
            other => panic!("expected parse failure, got {other:?}"),
        }
    }
}
