//! Precedence-climbing parser for code templates.
//!
//! ```text
//! expr    := unary (binop unary)*
//! unary   := ('!' | '-') unary | postfix
//! postfix := primary ('.' ident | '[' expr ']' | '(' args ')')*
//! primary := hole | ident | literal | 'new' member ('(' args ')')?
//!          | '(' expr ')' | '[' elems ']' | '{' fields '}'
//! ```
//!
//! Binary operators, loosest first: `||`, `&&`, equality, relational,
//! additive, multiplicative. All are left associative.

use jsxlate_core::{BinaryOp, Expr, Literal, UnaryOp};

use super::lexer::{Token, TokenKind};
use super::{TemplateError, TemplateParams};

pub struct Parser<'src, 'p> {
    tokens: Vec<Token<'src>>,
    pos: usize,
    params: &'p TemplateParams<'p>,
}

impl<'src, 'p> Parser<'src, 'p> {
    /// `tokens` must end with [`TokenKind::Eof`].
    pub fn new(tokens: Vec<Token<'src>>, params: &'p TemplateParams<'p>) -> Self {
        Self {
            tokens,
            pos: 0,
            params,
        }
    }

    /// Parse the whole template as one expression.
    pub fn parse(mut self) -> Result<Expr, TemplateError> {
        let expr = self.parse_expr(0)?;
        let token = self.peek();
        if token.kind != TokenKind::Eof {
            return Err(self.unexpected("end of template"));
        }
        Ok(expr)
    }

    fn peek(&self) -> &Token<'src> {
        // the last token is always Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> Token<'src> {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind<'_>) -> bool {
        if &self.peek().kind == kind {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind<'_>, what: &str) -> Result<(), TemplateError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.unexpected(what))
        }
    }

    fn unexpected(&self, expected: &str) -> TemplateError {
        let token = self.peek();
        TemplateError::new(
            format!("expected {expected}, found {}", token.kind.describe()),
            token.column,
        )
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn parse_expr(&mut self, min_prec: u8) -> Result<Expr, TemplateError> {
        let mut left = self.parse_unary()?;
        while let Some((op, prec)) = binary_op(&self.peek().kind) {
            if prec < min_prec {
                break;
            }
            self.bump();
            let right = self.parse_expr(prec + 1)?;
            left = Expr::binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, TemplateError> {
        let op = match self.peek().kind {
            TokenKind::Bang => UnaryOp::Not,
            TokenKind::Minus => UnaryOp::Neg,
            _ => {
                let primary = self.parse_primary()?;
                return self.parse_postfix(primary, true);
            }
        };
        self.bump();
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix(&mut self, mut expr: Expr, allow_calls: bool) -> Result<Expr, TemplateError> {
        loop {
            match self.peek().kind {
                TokenKind::Dot => {
                    self.bump();
                    let token = self.bump();
                    let TokenKind::Ident(name) = token.kind else {
                        return Err(TemplateError::new(
                            format!("expected member name, found {}", token.kind.describe()),
                            token.column,
                        ));
                    };
                    expr = match expr {
                        Expr::Global(path) => Expr::Global(format!("{path}.{name}")),
                        obj => Expr::field(obj, name),
                    };
                }
                TokenKind::LBracket => {
                    self.bump();
                    let key = self.parse_expr(0)?;
                    self.expect(TokenKind::RBracket, "']'")?;
                    expr = Expr::ItemGet {
                        obj: Box::new(expr),
                        key: Box::new(key),
                    };
                }
                TokenKind::LParen if allow_calls => {
                    self.bump();
                    let args = self.parse_list(TokenKind::RParen)?;
                    expr = Expr::apply(expr, args);
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, TemplateError> {
        let token = self.bump();
        let expr = match token.kind {
            TokenKind::Hole(name) => {
                let index = self
                    .params
                    .resolve(name)
                    .map_err(|message| TemplateError::new(message, token.column))?;
                Expr::Hole(index)
            }
            TokenKind::Ident(name) => Expr::global(name),
            TokenKind::Int(i) => Expr::int(i),
            TokenKind::Float(x) => Expr::Literal(Literal::float(x)),
            TokenKind::Str(s) => Expr::string(s),
            TokenKind::True => Expr::Literal(Literal::Bool(true)),
            TokenKind::False => Expr::Literal(Literal::Bool(false)),
            TokenKind::Null => Expr::null(),
            TokenKind::Undefined => Expr::Undefined,
            TokenKind::New => {
                let ctor = self.parse_primary()?;
                let ctor = self.parse_postfix(ctor, false)?;
                let args = if self.eat(&TokenKind::LParen) {
                    self.parse_list(TokenKind::RParen)?
                } else {
                    Vec::new()
                };
                Expr::New {
                    ctor: Box::new(ctor),
                    args,
                }
            }
            TokenKind::LParen => {
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::RParen, "')'")?;
                inner
            }
            TokenKind::LBracket => Expr::Array(self.parse_list(TokenKind::RBracket)?),
            TokenKind::LBrace => self.parse_object()?,
            other => {
                return Err(TemplateError::new(
                    format!("expected expression, found {}", other.describe()),
                    token.column,
                ));
            }
        };
        Ok(expr)
    }

    /// Comma-separated expressions up to and including `close`.
    fn parse_list(&mut self, close: TokenKind<'static>) -> Result<Vec<Expr>, TemplateError> {
        let mut items = Vec::new();
        if self.eat(&close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_expr(0)?);
            if self.eat(&close) {
                return Ok(items);
            }
            self.expect(TokenKind::Comma, "',' or closing bracket")?;
        }
    }

    fn parse_object(&mut self) -> Result<Expr, TemplateError> {
        let mut fields = Vec::new();
        if self.eat(&TokenKind::RBrace) {
            return Ok(Expr::Object(fields));
        }
        loop {
            let token = self.bump();
            let key = match token.kind {
                TokenKind::Ident(name) => name.to_string(),
                TokenKind::Str(s) => s,
                other => {
                    return Err(TemplateError::new(
                        format!("expected field name, found {}", other.describe()),
                        token.column,
                    ));
                }
            };
            self.expect(TokenKind::Colon, "':'")?;
            let value = self.parse_expr(0)?;
            fields.push((key, value));
            if self.eat(&TokenKind::RBrace) {
                return Ok(Expr::Object(fields));
            }
            self.expect(TokenKind::Comma, "',' or '}'")?;
        }
    }
}

fn binary_op(kind: &TokenKind<'_>) -> Option<(BinaryOp, u8)> {
    let op = match kind {
        TokenKind::OrOr => (BinaryOp::Or, 1),
        TokenKind::AndAnd => (BinaryOp::And, 2),
        TokenKind::EqEq => (BinaryOp::Eq, 3),
        TokenKind::NotEq => (BinaryOp::NotEq, 3),
        TokenKind::EqEqEq => (BinaryOp::StrictEq, 3),
        TokenKind::NotEqEq => (BinaryOp::StrictNotEq, 3),
        TokenKind::Less => (BinaryOp::Less, 4),
        TokenKind::LessEq => (BinaryOp::LessEq, 4),
        TokenKind::Greater => (BinaryOp::Greater, 4),
        TokenKind::GreaterEq => (BinaryOp::GreaterEq, 4),
        TokenKind::Plus => (BinaryOp::Add, 5),
        TokenKind::Minus => (BinaryOp::Sub, 5),
        TokenKind::Star => (BinaryOp::Mul, 6),
        TokenKind::Slash => (BinaryOp::Div, 6),
        TokenKind::Percent => (BinaryOp::Mod, 6),
        _ => return None,
    };
    Some(op)
}
