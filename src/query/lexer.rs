//! Tokenizer for query text
//!
//! Whitespace, commas, a leading byte-order mark and `#` comments are skipped.
//! Every token records its byte span so syntax errors can point at it.

use crate::core::error::SyntaxError;
use std::fmt;
use std::str::CharIndices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    BraceL,
    BraceR,
    ParenL,
    ParenR,
    Colon,
    Name,
    Int,
    Float,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    /// Text of names and numbers, unescaped content of strings
    pub value: Option<String>,
}

impl Token {
    fn punct(kind: TokenKind, start: usize) -> Self {
        Self {
            kind,
            start,
            end: start + 1,
            value: None,
        }
    }

    fn with_value(kind: TokenKind, start: usize, end: usize, value: String) -> Self {
        Self {
            kind,
            start,
            end,
            value: Some(value),
        }
    }

    pub fn is_name(&self, name: &str) -> bool {
        self.kind == TokenKind::Name && self.value.as_deref() == Some(name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.value.as_deref().unwrap_or_default();
        match self.kind {
            TokenKind::Eof => write!(f, "<EOF>"),
            TokenKind::BraceL => write!(f, "\"{{\""),
            TokenKind::BraceR => write!(f, "\"}}\""),
            TokenKind::ParenL => write!(f, "\"(\""),
            TokenKind::ParenR => write!(f, "\")\""),
            TokenKind::Colon => write!(f, "\":\""),
            TokenKind::Name => write!(f, "Name \"{}\"", value),
            TokenKind::Int => write!(f, "Int \"{}\"", value),
            TokenKind::Float => write!(f, "Float \"{}\"", value),
            TokenKind::String => write!(f, "String \"{}\"", value),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let position = if source.starts_with('\u{feff}') { 3 } else { 0 };
        Self {
            source,
            bytes: source.as_bytes(),
            position,
        }
    }

    /// Read the next token; returns `Eof` repeatedly at the end of input
    pub fn next_token(&mut self) -> Result<Token, SyntaxError> {
        self.skip_ignored();
        let start = self.position;
        let Some(&byte) = self.bytes.get(start) else {
            return Ok(Token {
                kind: TokenKind::Eof,
                start,
                end: start,
                value: None,
            });
        };

        let token = match byte {
            b'{' => Token::punct(TokenKind::BraceL, start),
            b'}' => Token::punct(TokenKind::BraceR, start),
            b'(' => Token::punct(TokenKind::ParenL, start),
            b')' => Token::punct(TokenKind::ParenR, start),
            b':' => Token::punct(TokenKind::Colon, start),
            b'"' => return self.read_string(start),
            b'-' | b'0'..=b'9' => return self.read_number(start),
            b'_' | b'a'..=b'z' | b'A'..=b'Z' => return Ok(self.read_name(start)),
            _ => {
                let ch = self.source[start..].chars().next().unwrap_or('\u{fffd}');
                return Err(self.error(start, format!("Unexpected character {:?}", ch)));
            }
        };
        self.position = token.end;
        Ok(token)
    }

    fn skip_ignored(&mut self) {
        while let Some(&byte) = self.bytes.get(self.position) {
            match byte {
                b' ' | b'\t' | b'\n' | b'\r' | b',' => self.position += 1,
                b'#' => {
                    while let Some(&b) = self.bytes.get(self.position) {
                        if b == b'\n' || b == b'\r' {
                            break;
                        }
                        self.position += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn read_name(&mut self, start: usize) -> Token {
        let mut end = start;
        while let Some(&b) = self.bytes.get(end) {
            if b == b'_' || b.is_ascii_alphanumeric() {
                end += 1;
            } else {
                break;
            }
        }
        self.position = end;
        Token::with_value(TokenKind::Name, start, end, self.source[start..end].to_string())
    }

    fn read_number(&mut self, start: usize) -> Result<Token, SyntaxError> {
        let mut end = start;
        let mut is_float = false;

        if self.bytes.get(end) == Some(&b'-') {
            end += 1;
        }
        match self.bytes.get(end) {
            Some(b'0') => {
                end += 1;
                if let Some(b) = self.bytes.get(end).filter(|b| b.is_ascii_digit()) {
                    return Err(self.error(end, format!("Invalid number, unexpected digit after 0: {:?}", *b as char)));
                }
            }
            Some(b) if b.is_ascii_digit() => end = self.read_digits(end),
            _ => return Err(self.error(end, "Invalid number, expected digit")),
        }

        if self.bytes.get(end) == Some(&b'.') {
            is_float = true;
            end += 1;
            if !self.bytes.get(end).is_some_and(u8::is_ascii_digit) {
                return Err(self.error(end, "Invalid number, expected digit after \".\""));
            }
            end = self.read_digits(end);
        }

        if matches!(self.bytes.get(end), Some(b'e') | Some(b'E')) {
            is_float = true;
            end += 1;
            if matches!(self.bytes.get(end), Some(b'+') | Some(b'-')) {
                end += 1;
            }
            if !self.bytes.get(end).is_some_and(u8::is_ascii_digit) {
                return Err(self.error(end, "Invalid number, expected digit in exponent"));
            }
            end = self.read_digits(end);
        }

        if let Some(&b) = self.bytes.get(end)
            && (b == b'.' || b == b'_' || b.is_ascii_alphabetic())
        {
            return Err(self.error(end, format!("Invalid number, unexpected character {:?}", b as char)));
        }

        self.position = end;
        let kind = if is_float { TokenKind::Float } else { TokenKind::Int };
        Ok(Token::with_value(kind, start, end, self.source[start..end].to_string()))
    }

    fn read_digits(&self, mut end: usize) -> usize {
        while self.bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        end
    }

    fn read_string(&mut self, start: usize) -> Result<Token, SyntaxError> {
        let source = self.source;
        let mut value = String::new();
        let mut chars = source[start + 1..].char_indices();

        while let Some((offset, ch)) = chars.next() {
            let at = start + 1 + offset;
            match ch {
                '"' => {
                    self.position = at + 1;
                    return Ok(Token::with_value(TokenKind::String, start, at + 1, value));
                }
                '\n' | '\r' => break,
                '\\' => {
                    let Some((_, escaped)) = chars.next() else {
                        break;
                    };
                    match escaped {
                        '"' => value.push('"'),
                        '\\' => value.push('\\'),
                        '/' => value.push('/'),
                        'b' => value.push('\u{0008}'),
                        'f' => value.push('\u{000c}'),
                        'n' => value.push('\n'),
                        'r' => value.push('\r'),
                        't' => value.push('\t'),
                        'u' => {
                            let (hex, unit) = read_code_unit(&mut chars);
                            let invalid = |hex: &str| {
                                self.error(at, format!("Invalid unicode escape \"\\u{}\"", hex))
                            };
                            let Some(unit) = unit else {
                                return Err(invalid(&hex));
                            };
                            let decoded = match unit {
                                // A high surrogate only counts when an escaped low surrogate follows
                                0xD800..=0xDBFF => {
                                    let mut rest = chars.clone();
                                    let low = match (rest.next(), rest.next()) {
                                        (Some((_, '\\')), Some((_, 'u'))) => read_code_unit(&mut rest).1,
                                        _ => None,
                                    };
                                    match low {
                                        Some(low @ 0xDC00..=0xDFFF) => {
                                            chars = rest;
                                            char::from_u32(0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00))
                                        }
                                        _ => None,
                                    }
                                }
                                _ => char::from_u32(unit),
                            };
                            value.push(decoded.ok_or_else(|| invalid(&hex))?);
                        }
                        other => {
                            return Err(self.error(at, format!("Invalid escape sequence \"\\{}\"", other)));
                        }
                    }
                }
                c if c < ' ' && c != '\t' => {
                    return Err(self.error(at, format!("Invalid character within string: {:?}", c)));
                }
                c => value.push(c),
            }
        }

        Err(self.error(start, "Unterminated string"))
    }

    fn error(&self, position: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError::at(self.source, position, message)
    }
}

/// Read the four hex digits of a `\u` escape
///
/// Returns the characters consumed, for error messages, and the code unit
/// when all four are hex digits.
fn read_code_unit(chars: &mut CharIndices<'_>) -> (String, Option<u32>) {
    let hex: String = chars.by_ref().take(4).map(|(_, c)| c).collect();
    let unit = if hex.len() == 4 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        u32::from_str_radix(&hex, 16).ok()
    } else {
        None
    };
    (hex, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(source);
        let mut kinds = Vec::new();
        loop {
            let token = lexer.next_token().expect("token");
            kinds.push(token.kind);
            if token.kind == TokenKind::Eof {
                return kinds;
            }
        }
    }

    #[test]
    fn test_punctuation_and_names() {
        assert_eq!(
            kinds("{ user(id: \"1\") { name } }"),
            vec![
                TokenKind::BraceL,
                TokenKind::Name,
                TokenKind::ParenL,
                TokenKind::Name,
                TokenKind::Colon,
                TokenKind::String,
                TokenKind::ParenR,
                TokenKind::BraceL,
                TokenKind::Name,
                TokenKind::BraceR,
                TokenKind::BraceR,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_commas_and_comments_are_ignored() {
        assert_eq!(
            kinds("{id,surname} # trailing comment\n"),
            vec![
                TokenKind::BraceL,
                TokenKind::Name,
                TokenKind::Name,
                TokenKind::BraceR,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let mut lexer = Lexer::new("-12 3.5 1e3 0");
        let first = lexer.next_token().unwrap();
        assert_eq!((first.kind, first.value.as_deref()), (TokenKind::Int, Some("-12")));
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Float);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Float);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Int);
    }

    #[test]
    fn test_leading_zero_is_rejected() {
        let err = Lexer::new("007").next_token().unwrap_err();
        assert_eq!(err.position, 1);
    }

    #[test]
    fn test_string_escapes() {
        let token = Lexer::new(r#""a\"b\n\u0041""#).next_token().unwrap();
        assert_eq!(token.value.as_deref(), Some("a\"b\nA"));
        assert_eq!(token.end, 14);
    }

    #[test]
    fn test_unterminated_string_points_at_opening_quote() {
        let err = Lexer::new("  \"abc").next_token().unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(err.message, "Unterminated string");
    }

    #[test]
    fn test_unexpected_character() {
        let mut lexer = Lexer::new("{ $id }");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::BraceL);
        let err = lexer.next_token().unwrap_err();
        assert_eq!(err.position, 2);
        assert_eq!(err.message, "Unexpected character '$'");
    }

    #[test]
    fn test_multibyte_string_positions() {
        let mut lexer = Lexer::new("\"héllo\" x");
        let token = lexer.next_token().unwrap();
        assert_eq!(token.value.as_deref(), Some("héllo"));
        let name = lexer.next_token().unwrap();
        assert_eq!(name.start, 9);
    }

    #[test]
    fn test_unicode_escape_requires_hex_digits() {
        let err = Lexer::new(r#""\u+12a""#).next_token().unwrap_err();
        assert_eq!(err.message, "Invalid unicode escape \"\\u+12a\"");
        assert!(Lexer::new(r#""\u12""#).next_token().is_err());
    }

    #[test]
    fn test_surrogate_pair_escape() {
        let token = Lexer::new(r#""\uD83D\uDE00!""#).next_token().unwrap();
        assert_eq!(token.value.as_deref(), Some("\u{1F600}!"));
        assert_eq!(token.end, 15);
    }

    #[test]
    fn test_lone_surrogates_are_rejected() {
        assert!(Lexer::new(r#""\uD83D""#).next_token().is_err());
        assert!(Lexer::new(r#""\uD83Dx""#).next_token().is_err());
        assert!(Lexer::new(r#""\uDE00""#).next_token().is_err());
        assert!(Lexer::new(r#""\uD83D\u0041""#).next_token().is_err());
    }
}
