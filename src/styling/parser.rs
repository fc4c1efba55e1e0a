//! Recursive descent parser for the textual selector form.
//!
//! ```text
//! Window > StackPanel .primary#ok
//! ContentControl /template/ :is(Decorator)
//! ```
//!
//! Type names resolve through a [`TypeRegistry`]. Whitespace between two
//! compounds is the descendant combinator, so adjacency is decided from the
//! token spans.

use indexmap::IndexMap;

use crate::tree::{types, ControlType};

use super::selector::{Selectors, StyleSelector};
use super::tokenizer::{tokenize, Token};

/// Errors from selector parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unexpected token at position {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("unknown control type '{0}'")]
    UnknownType(String),
}

// ---------------------------------------------------------------------------
// TypeRegistry
// ---------------------------------------------------------------------------

/// Maps type names used in selector text to control types.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<&'static str, &'static ControlType>,
}

impl TypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in control type.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for ty in types::BUILTIN {
            registry.register(*ty);
        }
        registry
    }

    /// Register `ty` under its name, replacing any previous entry.
    pub fn register(&mut self, ty: &'static ControlType) {
        self.types.insert(ty.name(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&'static ControlType> {
        self.types.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct PToken {
    token: Token,
    text: String,
    pos: usize,
    byte_start: usize,
    byte_end: usize,
}

fn tokenize_with_spans(input: &str) -> Result<Vec<PToken>, ParseError> {
    let lexemes = tokenize(input).map_err(|err| ParseError::UnexpectedToken {
        position: err.index,
        message: format!("unrecognized input '{}'", &input[err.span]),
    })?;
    Ok(lexemes
        .into_iter()
        .enumerate()
        .map(|(pos, lexeme)| PToken {
            text: input[lexeme.span.clone()].to_string(),
            token: lexeme.token,
            pos,
            byte_start: lexeme.span.start,
            byte_end: lexeme.span.end,
        })
        .collect())
}

/// Parse `input` into a selector chain.
pub fn parse_selector(input: &str, registry: &TypeRegistry) -> Result<StyleSelector, ParseError> {
    let mut parser = Parser {
        tokens: tokenize_with_spans(input)?,
        cursor: 0,
        registry,
    };
    parser.parse_selector()
}

struct Parser<'r> {
    tokens: Vec<PToken>,
    cursor: usize,
    registry: &'r TypeRegistry,
}

/// Append a step to an optional chain, starting a new chain when empty.
fn extend(
    current: Option<StyleSelector>,
    first: impl FnOnce() -> StyleSelector,
    then: impl FnOnce(&StyleSelector) -> StyleSelector,
) -> StyleSelector {
    match current {
        Some(sel) => then(&sel),
        None => first(),
    }
}

impl Parser<'_> {
    fn peek(&self) -> Option<&PToken> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<PToken> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<PToken, ParseError> {
        match self.advance() {
            Some(tok) if tok.token == expected => Ok(tok),
            Some(tok) => Err(ParseError::UnexpectedToken {
                position: tok.pos,
                message: format!("expected {what}, got {:?} '{}'", tok.token, tok.text),
            }),
            None => Err(ParseError::UnexpectedEof(format!("expected {what}"))),
        }
    }

    fn current_pos(&self) -> usize {
        self.peek().map(|t| t.pos).unwrap_or(self.tokens.len())
    }

    /// Whether the current token directly follows the previous one.
    fn is_adjacent(&self) -> bool {
        let Some(prev) = self.cursor.checked_sub(1).and_then(|i| self.tokens.get(i)) else {
            return false;
        };
        self.peek().is_some_and(|curr| curr.byte_start == prev.byte_end)
    }

    fn resolve_type(&self, name: &str) -> Result<&'static ControlType, ParseError> {
        self.registry
            .get(name)
            .ok_or_else(|| ParseError::UnknownType(name.to_string()))
    }

    fn parse_selector(&mut self) -> Result<StyleSelector, ParseError> {
        let mut selector = self.parse_compound(None)?;
        loop {
            match self.peek().map(|t| t.token.clone()) {
                Some(Token::GreaterThan) => {
                    self.advance();
                    selector = self.parse_compound(Some(selector.child()))?;
                }
                Some(Token::Template) => {
                    self.advance();
                    selector = self.parse_compound(Some(selector.template()))?;
                }
                Some(Token::Ident | Token::Dot | Token::Hash | Token::Star | Token::IsOpen) => {
                    selector = self.parse_compound(Some(selector.descendant()))?;
                }
                Some(_) => {
                    return Err(ParseError::UnexpectedToken {
                        position: self.current_pos(),
                        message: "expected combinator or selector".into(),
                    })
                }
                None => return Ok(selector),
            }
        }
    }

    /// Parse one compound (`Type.class#name`, `*`, `:is(Type)`) onto `base`.
    fn parse_compound(&mut self, base: Option<StyleSelector>) -> Result<StyleSelector, ParseError> {
        let mut current = base;
        let mut parts = 0usize;
        loop {
            if parts > 0 && !self.is_adjacent() {
                break;
            }
            let Some(tok) = self.peek().cloned() else {
                break;
            };
            match tok.token {
                Token::Ident if parts == 0 => {
                    self.advance();
                    let ty = self.resolve_type(&tok.text)?;
                    current = Some(extend(current, || Selectors::of_type(ty), |s| s.of_type(ty)));
                }
                Token::Star if parts == 0 => {
                    self.advance();
                    current = Some(extend(current, Selectors::any, |s| s.any()));
                }
                Token::Dot => {
                    self.advance();
                    let name = self.expect(Token::Ident, "class name after '.'")?.text;
                    current = Some(extend(
                        current,
                        || Selectors::class(name.clone()),
                        |s| s.class(name.clone()),
                    ));
                }
                Token::Hash => {
                    self.advance();
                    let name = self.expect(Token::Ident, "control name after '#'")?.text;
                    current = Some(extend(
                        current,
                        || Selectors::name(name.clone()),
                        |s| s.name(name.clone()),
                    ));
                }
                Token::IsOpen => {
                    self.advance();
                    let type_name = self.expect(Token::Ident, "type name in ':is()'")?.text;
                    self.expect(Token::ParenClose, "')'")?;
                    let ty = self.resolve_type(&type_name)?;
                    current = Some(extend(current, || Selectors::is(ty), |s| s.is(ty)));
                }
                _ => break,
            }
            parts += 1;
        }

        match current {
            Some(sel) if parts > 0 => Ok(sel),
            _ => match self.peek() {
                Some(t) => Err(ParseError::UnexpectedToken {
                    position: t.pos,
                    message: format!("expected selector, got {:?} '{}'", t.token, t.text),
                }),
                None => Err(ParseError::UnexpectedEof("expected selector".into())),
            },
        }
    }
}
