//! Untyped document tree and its recursive-descent parser.
//!
//! The accepted grammar is a restricted JavaScript object literal:
//!
//! ```text
//! document := IDENT '(' object ')' ';'? | object
//! object   := '{' (entry (',' entry)* ','?)? '}'
//! entry    := key ':' value
//! value    := object | array | STRING | '-'? NUMBER | '-'? Infinity | true | false | null
//! array    := '[' (value (',' value)* ','?)? ']'
//! ```
//!
//! Keys are kept in document order, duplicates included; the typed decoder
//! decides what a repeated key means.

use crate::error::{ConfigError, Result};
use crate::lexer::{tokenize, SpannedToken, Token};
use std::ops::Range;

/// Name of the call that may wrap the top-level object.
pub const WRAPPER_FUNCTION: &str = "config";

/// Nesting limit for objects and arrays.
const MAX_DEPTH: usize = 64;

/// Parsed configuration document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub root: Node,
    /// Whether the object was wrapped in `config( ... )`.
    pub wrapped: bool,
}

/// A value together with its byte range in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub value: Value,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Object(Vec<Entry>),
    Array(Vec<Node>),
    String(String),
    /// JavaScript number; `Infinity` is stored as `f64::INFINITY`.
    Number(f64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub key: String,
    pub key_span: Range<usize>,
    pub value: Node,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Object(_) => "object",
            Value::Array(_) => "array",
            Value::String(_) => "string",
            Value::Number(n) if n.is_infinite() => "Infinity",
            Value::Number(_) => "number",
            Value::Bool(_) => "boolean",
            Value::Null => "null",
        }
    }

    pub fn as_object(&self) -> Option<&[Entry]> {
        match self {
            Value::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up the first entry with the given key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value.value)
    }
}

/// Format a number the way JavaScript's `String(n)` does.
///
/// Magnitudes outside `[1e-6, 1e21)` use exponent notation (`1e+21`, `1.5e-7`).
pub fn format_number(n: f64) -> String {
    if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        let exponent_form = format!("{:e}", n);
        match exponent_form.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => exponent_form,
        }
    } else {
        format!("{}", n)
    }
}

/// Parse raw text into an untyped [`Document`].
pub fn parse_document(source: &str) -> Result<Document> {
    let tokens = tokenize(source)?;
    let mut parser = Parser {
        source,
        tokens,
        pos: 0,
    };
    parser.document()
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<SpannedToken>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn document(&mut self) -> Result<Document> {
        let document = match self.peek().map(|t| &t.token) {
            Some(Token::Ident(name)) => {
                if name != WRAPPER_FUNCTION {
                    let message = format!(
                        "unknown function '{}', expected {}({{ ... }})",
                        name, WRAPPER_FUNCTION
                    );
                    return Err(self.error_at_current(message));
                }
                self.advance();
                self.expect(Token::LParen, "'('")?;
                let root = self.object(0)?;
                self.expect(Token::RParen, "')'")?;
                if matches!(self.peek().map(|t| &t.token), Some(Token::Semicolon)) {
                    self.advance();
                }
                Document {
                    root,
                    wrapped: true,
                }
            }
            Some(Token::LBrace) => Document {
                root: self.object(0)?,
                wrapped: false,
            },
            _ => return Err(self.unexpected("'{' or config({ ... })")),
        };

        if self.peek().is_some() {
            return Err(self.unexpected("end of document"));
        }
        Ok(document)
    }

    fn object(&mut self, depth: usize) -> Result<Node> {
        let start = self.expect(Token::LBrace, "'{'")?.start;
        if depth >= MAX_DEPTH {
            return Err(ConfigError::malformed(
                self.source,
                start,
                format!("nesting deeper than {} levels", MAX_DEPTH),
            ));
        }

        let mut entries = Vec::new();
        loop {
            if let Some(end) = self.eat(&Token::RBrace) {
                return Ok(Node {
                    value: Value::Object(entries),
                    span: start..end.end,
                });
            }

            let (key, key_span) = self.key()?;
            self.expect(Token::Colon, "':'")?;
            let value = self.value(depth + 1)?;
            entries.push(Entry {
                key,
                key_span,
                value,
            });

            if self.eat(&Token::Comma).is_some() {
                continue;
            }
            if let Some(end) = self.eat(&Token::RBrace) {
                return Ok(Node {
                    value: Value::Object(entries),
                    span: start..end.end,
                });
            }
            return Err(self.unexpected("',' or '}'"));
        }
    }

    fn array(&mut self, depth: usize) -> Result<Node> {
        let start = self.expect(Token::LBracket, "'['")?.start;
        if depth >= MAX_DEPTH {
            return Err(ConfigError::malformed(
                self.source,
                start,
                format!("nesting deeper than {} levels", MAX_DEPTH),
            ));
        }

        let mut items = Vec::new();
        loop {
            if let Some(end) = self.eat(&Token::RBracket) {
                return Ok(Node {
                    value: Value::Array(items),
                    span: start..end.end,
                });
            }

            items.push(self.value(depth + 1)?);

            if self.eat(&Token::Comma).is_some() {
                continue;
            }
            if let Some(end) = self.eat(&Token::RBracket) {
                return Ok(Node {
                    value: Value::Array(items),
                    span: start..end.end,
                });
            }
            return Err(self.unexpected("',' or ']'"));
        }
    }

    fn key(&mut self) -> Result<(String, Range<usize>)> {
        let Some(current) = self.peek().cloned() else {
            return Err(self.unexpected("a key"));
        };
        let key = match current.token {
            Token::Ident(name) | Token::String(name) => name,
            Token::Number(n) => format_number(n),
            Token::True => "true".to_string(),
            Token::False => "false".to_string(),
            Token::Null => "null".to_string(),
            Token::Infinity => "Infinity".to_string(),
            _ => return Err(self.unexpected("a key")),
        };
        self.advance();
        Ok((key, current.span))
    }

    fn value(&mut self, depth: usize) -> Result<Node> {
        let Some(current) = self.peek().cloned() else {
            return Err(self.unexpected("a value"));
        };

        let scalar = |value: Value| Node {
            value,
            span: current.span.clone(),
        };

        match current.token {
            Token::LBrace => self.object(depth),
            Token::LBracket => self.array(depth),
            Token::String(s) => {
                self.advance();
                Ok(scalar(Value::String(s)))
            }
            Token::Number(n) => {
                self.advance();
                Ok(scalar(Value::Number(n)))
            }
            Token::Infinity => {
                self.advance();
                Ok(scalar(Value::Number(f64::INFINITY)))
            }
            Token::True => {
                self.advance();
                Ok(scalar(Value::Bool(true)))
            }
            Token::False => {
                self.advance();
                Ok(scalar(Value::Bool(false)))
            }
            Token::Null => {
                self.advance();
                Ok(scalar(Value::Null))
            }
            Token::Minus => {
                self.advance();
                let operand = match self.peek().map(|t| t.token.clone()) {
                    Some(Token::Number(n)) => n,
                    Some(Token::Infinity) => f64::INFINITY,
                    _ => return Err(self.unexpected("a number after '-'")),
                };
                let end = self.advance().map_or(current.span.end, |t| t.span.end);
                Ok(Node {
                    value: Value::Number(-operand),
                    span: current.span.start..end,
                })
            }
            Token::Ident(name) => Err(self.error_at_current(format!(
                "unexpected identifier '{}'; only literal values are allowed",
                name
            ))),
            _ => Err(self.unexpected("a value")),
        }
    }

    fn peek(&self) -> Option<&SpannedToken> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&SpannedToken> {
        if self.pos >= self.tokens.len() {
            return None;
        }
        self.pos += 1;
        self.tokens.get(self.pos - 1)
    }

    /// Consume the current token if it equals `token`, returning its span.
    fn eat(&mut self, token: &Token) -> Option<Range<usize>> {
        let span = match self.tokens.get(self.pos) {
            Some(current) if &current.token == token => current.span.clone(),
            _ => return None,
        };
        self.pos += 1;
        Some(span)
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<Range<usize>> {
        self.eat(&token).ok_or_else(|| self.unexpected(expected))
    }

    fn unexpected(&self, expected: &str) -> ConfigError {
        match self.peek() {
            Some(current) => ConfigError::malformed(
                self.source,
                current.span.start,
                format!("expected {}, found {}", expected, current.token),
            ),
            None => ConfigError::malformed(
                self.source,
                self.source.len(),
                format!("expected {}, found end of input", expected),
            ),
        }
    }

    fn error_at_current(&self, message: String) -> ConfigError {
        let offset = self.peek().map_or(self.source.len(), |t| t.span.start);
        ConfigError::malformed(self.source, offset, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(source: &str) -> Value {
        parse_document(source).unwrap().root.value
    }

    #[test]
    fn test_wrapped_and_bare_documents() {
        let wrapped = parse_document("config({ a: 1 });").unwrap();
        assert!(wrapped.wrapped);
        let bare = parse_document("{ a: 1 }").unwrap();
        assert!(!bare.wrapped);
        assert_eq!(wrapped.root.value, bare.root.value);
    }

    #[test]
    fn test_trailing_commas_and_nesting() {
        let value = root("{ a: { b: [1, 2,], }, }");
        let a = value.get("a").unwrap();
        assert_eq!(
            a.get("b"),
            Some(&Value::Array(vec![
                Node {
                    value: Value::Number(1.0),
                    span: 11..12
                },
                Node {
                    value: Value::Number(2.0),
                    span: 14..15
                },
            ]))
        );
    }

    #[test]
    fn test_scalars() {
        let value = root("{ s: 'x', n: 2, i: Infinity, m: -Infinity, neg: -3, t: true, f: false, z: null }");
        assert_eq!(value.get("s"), Some(&Value::String("x".into())));
        assert_eq!(value.get("n"), Some(&Value::Number(2.0)));
        assert_eq!(value.get("i"), Some(&Value::Number(f64::INFINITY)));
        assert_eq!(value.get("m"), Some(&Value::Number(f64::NEG_INFINITY)));
        assert_eq!(value.get("neg"), Some(&Value::Number(-3.0)));
        assert_eq!(value.get("t"), Some(&Value::Bool(true)));
        assert_eq!(value.get("f"), Some(&Value::Bool(false)));
        assert_eq!(value.get("z"), Some(&Value::Null));
    }

    #[test]
    fn test_quoted_and_keyword_keys() {
        let value = root("{ 'ZeroMQSource': {}, \"s 1\": 1, null: 2, 3: 4 }");
        let keys: Vec<_> = value
            .as_object()
            .unwrap()
            .iter()
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(keys, vec!["ZeroMQSource", "s 1", "null", "3"]);
    }

    #[test]
    fn test_duplicate_keys_are_preserved() {
        let value = root("{ a: 1, a: 2 }");
        assert_eq!(value.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_wrapper_function() {
        let err = parse_document("setup({});").unwrap_err();
        assert!(err.to_string().contains("unknown function 'setup'"), "{}", err);
    }

    #[test]
    fn test_missing_colon_reports_position() {
        let err = parse_document("{\n  a 1\n}").unwrap_err();
        match err {
            ConfigError::MalformedDocument { line, column, message } => {
                assert_eq!((line, column), (2, 5));
                assert_eq!(message, "expected ':', found number 1");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_object_reports_end_of_input() {
        let err = parse_document("config({ a: 1").unwrap_err();
        assert!(err.to_string().contains("found end of input"), "{}", err);
    }

    #[test]
    fn test_identifiers_are_not_values() {
        let err = parse_document("{ a: someVariable }").unwrap_err();
        assert!(err.to_string().contains("only literal values"), "{}", err);
    }

    #[test]
    fn test_trailing_garbage() {
        let err = parse_document("{ a: 1 } { b: 2 }").unwrap_err();
        assert!(err.to_string().contains("expected end of document"), "{}", err);
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}{}", "{a:".repeat(200), "}".repeat(200));
        let err = parse_document(&deep).unwrap_err();
        assert!(err.to_string().contains("nesting deeper"), "{}", err);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(0.5), "0.5");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(1500.25), "1500.25");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(1e20), "100000000000000000000");
        assert_eq!(format_number(0.000001), "0.000001");
    }
}
