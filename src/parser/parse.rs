//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and core parsing
//! infrastructure: error types, lookahead and expect helpers, and the
//! balanced-skip primitives the declaration grammar is built on.
//!
//! # Parser Architecture
//!
//! The Parser uses a recursive descent approach with the following
//! organization:
//! - This module: Parser struct, helper methods, and coordination
//! - `declarations`: Parsing top-level declarations and types
//! - `members`: Parsing class bodies (access regions) and enumerator lists
//!
//! Parser methods are split across multiple files using `impl Parser`
//! blocks, allowing each module to extend the Parser with related
//! functionality while maintaining access to the shared parser state.
//!
//! Function bodies are never parsed into statements: the parser skips them
//! with balanced-brace scanning and records their text spans. Unrecognized
//! top-level constructs (global variables, macro invocations) are skipped
//! with a log line rather than failing the whole file.

use crate::model::{Directive, FileModel, Language, SourceLocation, Span};
use crate::parser::lexer::{LexError, Lexer, Token, TokenKind};
use rustc_hash::FxHashSet;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Parser error type
#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

impl From<ParseError> for crate::Error {
    fn from(err: ParseError) -> Self {
        crate::Error::Parse {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser over the declaration level of C/C++.
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) source: String,
    pub(crate) language: Language,
    pub(crate) directives: Vec<Directive>,
    pub(crate) file_doc: Option<String>,
    /// Names introduced by typedefs, records, enums, and aliases; used to
    /// recognize user types at the start of a declaration.
    pub(crate) known_types: FxHashSet<String>,
    /// Byte offset of the `template` keyword currently in effect, so a
    /// templated record's span covers its header.
    pub(crate) template_start: usize,
}

impl Parser {
    pub fn new(source: &str, language: Language) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source, language);
        let tokens = lexer.tokenize()?;
        let directives = lexer.take_directives();
        let file_doc = lexer.take_file_doc();
        Ok(Self {
            tokens,
            position: 0,
            source: source.to_string(),
            language,
            directives,
            file_doc,
            known_types: FxHashSet::default(),
            template_start: 0,
        })
    }

    /// Parse the entire translation unit into a [`FileModel`].
    pub fn parse_unit(&mut self, path: impl Into<PathBuf>) -> Result<FileModel, ParseError> {
        let mut unit = FileModel::new(path, self.language, self.source.clone());
        unit.doc = self.file_doc.take();
        unit.directives = std::mem::take(&mut self.directives);

        while !self.is_at_end() {
            self.parse_top_level(&mut unit)?;
        }

        Ok(unit)
    }

    // ===== Helper methods =====

    pub(crate) fn register_type(&mut self, name: &str) {
        self.known_types.insert(name.to_string());
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.peek_kind()) == std::mem::discriminant(kind)
    }

    pub(crate) fn check_ident(&self, name: &str) -> bool {
        matches!(self.peek_kind(), TokenKind::Ident(s) if s == name)
    }

    pub(crate) fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn match_ident(&mut self, name: &str) -> bool {
        if self.check_ident(name) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.position += 1;
        }
        self.previous()
    }

    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.position]
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.tokens[self.position].kind
    }

    pub(crate) fn kind_ahead(&self, n: usize) -> Option<&TokenKind> {
        self.tokens.get(self.position + n).map(|t| &t.kind)
    }

    pub(crate) fn previous(&self) -> &Token {
        &self.tokens[self.position.saturating_sub(1)]
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().location
    }

    /// Doc comment attached to the current token, if any.
    pub(crate) fn peek_doc(&self) -> Option<String> {
        self.peek().doc.clone()
    }

    /// Byte offset where the current token starts.
    pub(crate) fn token_start(&self) -> usize {
        self.peek().span.start
    }

    /// Byte offset where the previous token ends.
    pub(crate) fn prev_end(&self) -> usize {
        self.previous().span.end
    }

    pub(crate) fn slice(&self, span: Span) -> &str {
        span.slice(&self.source)
    }

    pub(crate) fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            location: self.current_location(),
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind, message: &str) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("{}, found {}", message, self.peek_kind())))
        }
    }

    pub(crate) fn expect_lbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect(&TokenKind::LBrace, &format!("Expected '{{' {ctx}"))
    }

    pub(crate) fn expect_rbrace(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect(&TokenKind::RBrace, &format!("Expected '}}' {ctx}"))
    }

    pub(crate) fn expect_rparen(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect(&TokenKind::RParen, &format!("Expected ')' {ctx}"))
    }

    pub(crate) fn expect_semicolon(&mut self, ctx: &str) -> Result<(), ParseError> {
        self.expect(&TokenKind::Semicolon, &format!("Expected ';' {ctx}"))
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<String, ParseError> {
        let name = match self.peek_kind() {
            TokenKind::Ident(name) => name.clone(),
            other => return Err(self.error(format!("Expected identifier, found {}", other))),
        };
        self.advance();
        Ok(name)
    }

    // ===== Balanced skipping =====

    /// Skip a balanced `{ ... }` group; the current token must be `{`.
    /// Returns the byte span covering both braces.
    pub(crate) fn skip_balanced_braces(&mut self) -> Result<Span, ParseError> {
        if !self.check(&TokenKind::LBrace) {
            return Err(self.error(format!("Expected '{{', found {}", self.peek_kind())));
        }
        let open_loc = self.current_location();
        let start = self.token_start();
        let mut depth: usize = 0;

        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        let end = self.peek().span.end;
                        self.advance();
                        return Ok(Span::new(start, end));
                    }
                }
                _ => {}
            }
            self.advance();
        }

        Err(ParseError {
            message: "Unterminated '{'".to_string(),
            location: open_loc,
        })
    }

    /// Skip a balanced `( ... )` group; the current token must be `(`.
    pub(crate) fn skip_balanced_parens(&mut self) -> Result<Span, ParseError> {
        if !self.check(&TokenKind::LParen) {
            return Err(self.error(format!("Expected '(', found {}", self.peek_kind())));
        }
        let open_loc = self.current_location();
        let start = self.token_start();
        let mut depth: usize = 0;

        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        let end = self.peek().span.end;
                        self.advance();
                        return Ok(Span::new(start, end));
                    }
                }
                _ => {}
            }
            self.advance();
        }

        Err(ParseError {
            message: "Unterminated '('".to_string(),
            location: open_loc,
        })
    }

    /// Capture a balanced `< ... >` group; the current token must be `<`.
    /// `>>` closes two levels (C++11 rule), `<<` opens two.
    pub(crate) fn capture_angles(&mut self) -> Result<Span, ParseError> {
        if !self.check(&TokenKind::Lt) {
            return Err(self.error(format!("Expected '<', found {}", self.peek_kind())));
        }
        let open_loc = self.current_location();
        let start = self.token_start();
        let mut depth: i32 = 0;

        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::Lt => depth += 1,
                TokenKind::Shl => depth += 2,
                TokenKind::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        let end = self.peek().span.end;
                        self.advance();
                        return Ok(Span::new(start, end));
                    }
                }
                TokenKind::Shr => {
                    depth -= 2;
                    if depth <= 0 {
                        let end = self.peek().span.end;
                        self.advance();
                        return Ok(Span::new(start, end));
                    }
                }
                TokenKind::Semicolon | TokenKind::LBrace => {
                    return Err(ParseError {
                        message: "Unbalanced '<'".to_string(),
                        location: open_loc,
                    });
                }
                _ => {}
            }
            self.advance();
        }

        Err(ParseError {
            message: "Unbalanced '<'".to_string(),
            location: open_loc,
        })
    }

    /// Skip forward through (and including) the next top-level `;`,
    /// stepping over any balanced brace group on the way. Used for
    /// constructs the model does not record.
    pub(crate) fn skip_to_semicolon(&mut self) -> Result<(), ParseError> {
        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::Semicolon => {
                    self.advance();
                    return Ok(());
                }
                TokenKind::LBrace => {
                    self.skip_balanced_braces()?;
                    // `struct {...} x;` keeps going; a bare `}` ends a
                    // brace-only construct
                    if self.match_kind(&TokenKind::Semicolon) {
                        return Ok(());
                    }
                    if !self.starts_declarator_tail() {
                        return Ok(());
                    }
                }
                _ => {
                    self.advance();
                }
            }
        }
        Ok(())
    }

    fn starts_declarator_tail(&self) -> bool {
        matches!(
            self.peek_kind(),
            TokenKind::Ident(_) | TokenKind::Star | TokenKind::Comma | TokenKind::LBracket
        )
    }

    /// Capture tokens up to (not including) the next `{`, returning their
    /// span. Returns `None` when the group is empty.
    pub(crate) fn capture_until_lbrace(&mut self) -> Result<Option<Span>, ParseError> {
        let mut span: Option<Span> = None;
        while !self.check(&TokenKind::LBrace) {
            if self.is_at_end() || self.check(&TokenKind::Semicolon) {
                return Err(self.error("Expected '{'".to_string()));
            }
            let tok_span = self.peek().span;
            span = Some(match span {
                Some(s) => Span::new(s.start, tok_span.end),
                None => tok_span,
            });
            self.advance();
        }
        Ok(span)
    }

    /// Capture tokens up to (not including) the next top-level `;`.
    pub(crate) fn capture_until_semicolon(&mut self) -> Result<Option<Span>, ParseError> {
        let mut span: Option<Span> = None;
        while !self.check(&TokenKind::Semicolon) {
            if self.is_at_end() {
                return Err(self.error("Expected ';'".to_string()));
            }
            let tok_span = match self.peek_kind() {
                TokenKind::LBrace => self.skip_balanced_braces()?,
                TokenKind::LParen => self.skip_balanced_parens()?,
                _ => {
                    let s = self.peek().span;
                    self.advance();
                    s
                }
            };
            span = Some(match span {
                Some(s) => Span::new(s.start, tok_span.end),
                None => tok_span,
            });
        }
        Ok(span)
    }

    /// Skip an unrecognized top-level construct: everything through the
    /// next `;`, or through a balanced brace group when one comes first.
    pub(crate) fn skip_unrecognized(&mut self) -> Result<(), ParseError> {
        debug!(
            "skipping unrecognized construct at {}",
            self.current_location()
        );
        self.skip_to_semicolon()
    }

    /// Could the current token begin a type?
    pub(crate) fn is_type_start(&self) -> bool {
        match self.peek_kind() {
            TokenKind::Void
            | TokenKind::Bool
            | TokenKind::Char
            | TokenKind::Short
            | TokenKind::Int
            | TokenKind::Long
            | TokenKind::Float
            | TokenKind::Double
            | TokenKind::Signed
            | TokenKind::Unsigned
            | TokenKind::Const
            | TokenKind::Volatile
            | TokenKind::Struct
            | TokenKind::Union
            | TokenKind::Enum
            | TokenKind::Class
            | TokenKind::Typename
            | TokenKind::ColonColon => true,
            TokenKind::Ident(name) => {
                if self.known_types.contains(name) {
                    return true;
                }
                matches!(
                    self.kind_ahead(1),
                    Some(TokenKind::Ident(_))
                        | Some(TokenKind::Star)
                        | Some(TokenKind::Amp)
                        | Some(TokenKind::ColonColon)
                        | Some(TokenKind::Lt)
                )
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Access, RecordKind};

    fn parse(source: &str, language: Language) -> FileModel {
        let mut parser = Parser::new(source, language).unwrap();
        parser.parse_unit("test.src").unwrap()
    }

    #[test]
    fn test_parse_simple_function() {
        let unit = parse("int main() { return 0; }", Language::C);

        assert_eq!(unit.functions.len(), 1);
        let main = &unit.functions[0];
        assert_eq!(main.name, "main");
        assert!(main.has_body);
        assert_eq!(main.signature.params.len(), 0);
        assert_eq!(main.signature.return_type.as_ref().unwrap().name, "int");
    }

    #[test]
    fn test_parse_prototype() {
        let unit = parse("int add_numbers(int a, int b);", Language::C);

        let f = &unit.functions[0];
        assert_eq!(f.name, "add_numbers");
        assert!(!f.has_body);
        assert_eq!(f.signature.params.len(), 2);
        assert_eq!(f.signature.params[0].name.as_deref(), Some("a"));
    }

    #[test]
    fn test_parse_struct() {
        let unit = parse("struct Point { int x; int y; };", Language::C);

        assert_eq!(unit.records.len(), 1);
        let point = &unit.records[0];
        assert_eq!(point.name, "Point");
        assert_eq!(point.kind, RecordKind::Struct);
        let fields: Vec<_> = point.fields().collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "x");
        assert_eq!(fields[1].name, "y");
        assert!(fields.iter().all(|f| f.access == Access::Public));
    }

    #[test]
    fn test_parse_enum() {
        let unit = parse("enum Color { RED, GREEN = 5, BLUE };", Language::C);

        let color = &unit.enums[0];
        assert_eq!(color.name, "Color");
        assert_eq!(color.enumerators.len(), 3);
        assert_eq!(color.enumerators[0].value, Some(0));
        assert_eq!(color.enumerators[1].value, Some(5));
        assert!(color.enumerators[1].is_explicit);
        assert_eq!(color.enumerators[2].value, Some(6));
    }

    #[test]
    fn test_global_variable_is_skipped() {
        let unit = parse("int counter = 0;\nint main() { return 0; }", Language::C);

        assert_eq!(unit.functions.len(), 1);
        assert_eq!(unit.functions[0].name, "main");
    }

    #[test]
    fn test_variadic_prototype() {
        let unit = parse("int printf(const char *fmt, ...);", Language::C);

        let f = &unit.functions[0];
        assert!(f.signature.is_variadic);
        assert_eq!(f.signature.params.len(), 1);
        let fmt = &f.signature.params[0];
        assert_eq!(fmt.ty.name, "char");
        assert!(fmt.ty.is_const);
        assert_eq!(fmt.ty.pointer_depth, 1);
    }

    #[test]
    fn test_struct_return_type_disambiguation() {
        let unit = parse(
            "struct Point { int x; int y; };\nstruct Point origin(void) { }",
            Language::C,
        );

        assert_eq!(unit.records.len(), 1);
        assert_eq!(unit.functions.len(), 1);
        assert_eq!(unit.functions[0].name, "origin");
        assert_eq!(
            unit.functions[0].signature.return_type.as_ref().unwrap().name,
            "struct Point"
        );
    }
}
