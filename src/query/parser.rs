//! Recursive-descent parser producing a request tree
//!
//! Parsing stops at the first malformed token; there is no recovery.

use super::ast::{Literal, Operation, RequestNode};
use super::lexer::{Lexer, Token, TokenKind};
use crate::core::error::SyntaxError;
use indexmap::IndexMap;

/// Deepest selection set accepted; the root selection set has depth 1
pub const MAX_DEPTH: usize = 64;

/// Parse query text into an [`Operation`]
///
/// ```rust,ignore
/// let operation = parse_query(r#"{ user(id: "1") { name } }"#)?;
/// assert_eq!(operation.selections()[0].name, "user");
/// ```
pub fn parse_query(source: &str) -> Result<Operation, SyntaxError> {
    Parser::new(source)?.parse_operation()
}

struct Parser<'a> {
    source: &'a str,
    lexer: Lexer<'a>,
    current: Token,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Result<Self, SyntaxError> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Self {
            source,
            lexer,
            current,
            depth: 0,
        })
    }

    fn parse_operation(mut self) -> Result<Operation, SyntaxError> {
        let mut name = None;

        if self.current.kind == TokenKind::Name {
            if self.current.is_name("query") {
                self.advance()?;
                if self.current.kind == TokenKind::Name {
                    name = self.current.value.clone();
                    self.advance()?;
                }
            } else if self.current.is_name("mutation") || self.current.is_name("subscription") {
                return Err(self.error_at_current(format!(
                    "Unsupported operation type \"{}\", only queries are supported",
                    self.current.value.as_deref().unwrap_or_default()
                )));
            } else {
                return Err(self.unexpected());
            }
        }

        let selections = self.parse_selection_set()?;
        if self.current.kind != TokenKind::Eof {
            return Err(self.error_at_current(format!("Expected <EOF>, found {}", self.current)));
        }

        Ok(Operation {
            name,
            root: RequestNode::root(selections),
        })
    }

    fn parse_selection_set(&mut self) -> Result<Vec<RequestNode>, SyntaxError> {
        if self.depth == MAX_DEPTH {
            return Err(self.error_at_current(format!(
                "Query exceeds maximum nesting depth {}",
                MAX_DEPTH
            )));
        }
        self.expect(TokenKind::BraceL)?;
        self.depth += 1;
        let mut selections = Vec::new();
        loop {
            selections.push(self.parse_field()?);
            if self.skip(TokenKind::BraceR)? {
                self.depth -= 1;
                return Ok(selections);
            }
        }
    }

    fn parse_field(&mut self) -> Result<RequestNode, SyntaxError> {
        let position = self.current.start;
        let first = self.expect_name()?;

        let mut node = if self.skip(TokenKind::Colon)? {
            let mut node = RequestNode::field(self.expect_name()?, position);
            node.alias = Some(first);
            node
        } else {
            RequestNode::field(first, position)
        };

        if self.current.kind == TokenKind::ParenL {
            node.arguments = self.parse_arguments()?;
        }
        if self.current.kind == TokenKind::BraceL {
            node.children = self.parse_selection_set()?;
        }
        Ok(node)
    }

    fn parse_arguments(&mut self) -> Result<IndexMap<String, Literal>, SyntaxError> {
        self.expect(TokenKind::ParenL)?;
        let mut arguments = IndexMap::new();
        loop {
            let position = self.current.start;
            let name = self.expect_name()?;
            if arguments.contains_key(&name) {
                return Err(self.error(position, format!("Duplicate argument \"{}\"", name)));
            }
            self.expect(TokenKind::Colon)?;
            let value = self.parse_literal()?;
            arguments.insert(name, value);
            if self.skip(TokenKind::ParenR)? {
                return Ok(arguments);
            }
        }
    }

    fn parse_literal(&mut self) -> Result<Literal, SyntaxError> {
        let token = self.current.clone();
        let text = token.value.as_deref().unwrap_or_default();
        let literal = match token.kind {
            TokenKind::String => Literal::String(text.to_string()),
            TokenKind::Int => Literal::Int(text.parse::<i64>().map_err(|_| {
                self.error(token.start, format!("Integer {} does not fit in 64 bits", text))
            })?),
            TokenKind::Float => Literal::Float(
                text.parse::<f64>()
                    .map_err(|_| self.error(token.start, format!("Invalid float {}", text)))?,
            ),
            TokenKind::Name => match text {
                "true" => Literal::Boolean(true),
                "false" => Literal::Boolean(false),
                "null" => Literal::Null,
                _ => return Err(self.unexpected()),
            },
            _ => return Err(self.unexpected()),
        };
        self.advance()?;
        Ok(literal)
    }

    fn advance(&mut self) -> Result<(), SyntaxError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    /// Consume the current token if it has the given kind
    fn skip(&mut self, kind: TokenKind) -> Result<bool, SyntaxError> {
        if self.current.kind == kind {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<(), SyntaxError> {
        if self.current.kind == kind {
            return self.advance();
        }
        let expected = Token {
            kind,
            start: 0,
            end: 0,
            value: None,
        };
        Err(self.error_at_current(format!("Expected {}, found {}", expected, self.current)))
    }

    fn expect_name(&mut self) -> Result<String, SyntaxError> {
        if self.current.kind != TokenKind::Name {
            return Err(self.error_at_current(format!("Expected Name, found {}", self.current)));
        }
        let name = self.current.value.clone().unwrap_or_default();
        self.advance()?;
        Ok(name)
    }

    fn unexpected(&self) -> SyntaxError {
        self.error_at_current(format!("Unexpected {}", self.current))
    }

    fn error_at_current(&self, message: String) -> SyntaxError {
        self.error(self.current.start, message)
    }

    fn error(&self, position: usize, message: String) -> SyntaxError {
        SyntaxError::at(self.source, position, message)
    }
}
