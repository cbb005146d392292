//! Lexer for code templates.
//!
//! Converts template text into a vector of [`Token`]s ending in
//! [`TokenKind::Eof`]. Dispatch is on the first character.

use super::TemplateError;
use super::cursor::{Cursor, is_ident_continue, is_ident_start};

/// A template token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'src> {
    pub kind: TokenKind<'src>,
    /// Column of the first character.
    pub column: u32,
}

/// Token kinds, with the payload of literals and names.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'src> {
    // Literals and names
    Ident(&'src str),
    /// `$0`, `$this`, `$name`; the text after `$`.
    Hole(&'src str),
    Int(i64),
    Float(f64),
    /// String with escapes already processed.
    Str(String),

    // Keywords
    True,
    False,
    Null,
    Undefined,
    New,

    // Punctuation
    Dot,
    Comma,
    Colon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    AndAnd,
    OrOr,

    Eof,
}

impl TokenKind<'_> {
    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier '{name}'"),
            TokenKind::Hole(name) => format!("'${name}'"),
            TokenKind::Int(i) => format!("number {i}"),
            TokenKind::Float(x) => format!("number {x}"),
            TokenKind::Str(_) => "string".to_string(),
            TokenKind::Eof => "end of template".to_string(),
            other => format!("'{}'", other.spelling()),
        }
    }

    fn spelling(&self) -> &'static str {
        match self {
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Undefined => "undefined",
            TokenKind::New => "new",
            TokenKind::Dot => ".",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Bang => "!",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::EqEqEq => "===",
            TokenKind::NotEqEq => "!==",
            TokenKind::Less => "<",
            TokenKind::LessEq => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEq => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            _ => "",
        }
    }
}

fn lookup_keyword(ident: &str) -> Option<TokenKind<'static>> {
    match ident {
        "true" => Some(TokenKind::True),
        "false" => Some(TokenKind::False),
        "null" => Some(TokenKind::Null),
        "undefined" => Some(TokenKind::Undefined),
        "new" => Some(TokenKind::New),
        _ => None,
    }
}

/// Tokenize a whole template.
pub fn tokenize(source: &str) -> Result<Vec<Token<'_>>, TemplateError> {
    let mut lexer = Lexer {
        cursor: Cursor::new(source),
    };
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

struct Lexer<'src> {
    cursor: Cursor<'src>,
}

impl<'src> Lexer<'src> {
    fn next_token(&mut self) -> Result<Token<'src>, TemplateError> {
        self.cursor.eat_while(char::is_whitespace);
        let column = self.cursor.column();
        let Some(c) = self.cursor.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                column,
            });
        };

        let kind = match c {
            '$' => self.scan_hole(column)?,
            '"' | '\'' => self.scan_string(c, column)?,
            c if c.is_ascii_digit() => self.scan_number(column)?,
            c if is_ident_start(c) => {
                let ident = self.cursor.eat_while(is_ident_continue);
                lookup_keyword(ident).unwrap_or(TokenKind::Ident(ident))
            }
            _ => self.scan_operator(column)?,
        };
        Ok(Token { kind, column })
    }

    fn scan_hole(&mut self, column: u32) -> Result<TokenKind<'src>, TemplateError> {
        self.cursor.advance();
        let name = self.cursor.eat_while(is_ident_continue);
        if name.is_empty() {
            return Err(TemplateError::new("expected hole name after '$'", column));
        }
        Ok(TokenKind::Hole(name))
    }

    fn scan_string(&mut self, quote: char, column: u32) -> Result<TokenKind<'src>, TemplateError> {
        self.cursor.advance();
        let mut value = String::new();
        loop {
            match self.cursor.advance() {
                None => return Err(TemplateError::new("unterminated string", column)),
                Some(c) if c == quote => return Ok(TokenKind::Str(value)),
                Some('\\') => {
                    let escaped = match self.cursor.advance() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('0') => '\0',
                        Some(c @ ('\\' | '"' | '\'')) => c,
                        Some(c) => {
                            return Err(TemplateError::new(
                                format!("unknown escape '\\{c}'"),
                                self.cursor.column() - 2,
                            ));
                        }
                        None => return Err(TemplateError::new("unterminated string", column)),
                    };
                    value.push(escaped);
                }
                Some(c) => value.push(c),
            }
        }
    }

    fn scan_number(&mut self, column: u32) -> Result<TokenKind<'src>, TemplateError> {
        let start = self.cursor.offset();
        self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut is_float = false;

        if self.cursor.peek() == Some('.') && self.cursor.peek_nth(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            self.cursor.advance();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }
        if self.cursor.check(|c| c == 'e' || c == 'E') {
            is_float = true;
            self.cursor.advance();
            if !self.cursor.eat('+') {
                self.cursor.eat('-');
            }
            if self.cursor.eat_while(|c| c.is_ascii_digit()).is_empty() {
                return Err(TemplateError::new("malformed exponent", column));
            }
        }

        let text = self.cursor.slice_from(start);
        if is_float {
            text.parse::<f64>()
                .map(TokenKind::Float)
                .map_err(|e| TemplateError::new(format!("invalid number '{text}': {e}"), column))
        } else {
            text.parse::<i64>()
                .map(TokenKind::Int)
                .map_err(|e| TemplateError::new(format!("invalid number '{text}': {e}"), column))
        }
    }

    fn scan_operator(&mut self, column: u32) -> Result<TokenKind<'src>, TemplateError> {
        // longest spellings first
        const MULTI: &[(&str, TokenKind<'static>)] = &[
            ("===", TokenKind::EqEqEq),
            ("!==", TokenKind::NotEqEq),
            ("==", TokenKind::EqEq),
            ("!=", TokenKind::NotEq),
            ("<=", TokenKind::LessEq),
            (">=", TokenKind::GreaterEq),
            ("&&", TokenKind::AndAnd),
            ("||", TokenKind::OrOr),
        ];
        for (spelling, kind) in MULTI {
            if self.cursor.eat_str(spelling) {
                return Ok(kind.clone());
            }
        }

        let kind = match self.cursor.advance() {
            Some('.') => TokenKind::Dot,
            Some(',') => TokenKind::Comma,
            Some(':') => TokenKind::Colon,
            Some('(') => TokenKind::LParen,
            Some(')') => TokenKind::RParen,
            Some('[') => TokenKind::LBracket,
            Some(']') => TokenKind::RBracket,
            Some('{') => TokenKind::LBrace,
            Some('}') => TokenKind::RBrace,
            Some('+') => TokenKind::Plus,
            Some('-') => TokenKind::Minus,
            Some('*') => TokenKind::Star,
            Some('/') => TokenKind::Slash,
            Some('%') => TokenKind::Percent,
            Some('!') => TokenKind::Bang,
            Some('<') => TokenKind::Less,
            Some('>') => TokenKind::Greater,
            Some(c) => {
                return Err(TemplateError::new(format!("unexpected character '{c}'"), column));
            }
            None => TokenKind::Eof,
        };
        Ok(kind)
    }
}
