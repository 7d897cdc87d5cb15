//! Lexer (tokenizer) for C and C++ source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the
//! declaration parser. Unlike a compiler front end, the lexer keeps only
//! what declaration extraction needs:
//!
//! - every token carries a [`SourceLocation`] and a byte [`Span`] so later
//!   stages can report positions and slice the original text,
//! - `#include` and `#define` lines are captured as [`Directive`]s instead
//!   of being discarded; other preprocessor lines are recorded as
//!   [`DirectiveKind::Other`],
//! - comments are skipped but their cleaned text is attached to the next
//!   token as a doc string,
//! - C++-only keywords (`class`, `namespace`, `template`, ...) lex as plain
//!   identifiers when the input language is C.

use crate::model::{Directive, DirectiveKind, Language, SourceLocation, Span};
use std::fmt;

/// All token kinds produced by the lexer.
///
/// Operator coverage matches what can appear inside skipped regions (bodies,
/// initializers); the declaration grammar itself only consumes a subset.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    IntLiteral(i64),
    FloatLiteral(String),
    CharLiteral(String),
    StringLiteral(String),

    // Identifiers
    Ident(String),

    // Type and qualifier keywords (shared by C and C++)
    Void,
    Bool,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Signed,
    Unsigned,
    Const,
    Volatile,
    Static,
    Extern,
    Inline,
    Struct,
    Union,
    Enum,
    Typedef,

    // C++-only keywords (lexed as Ident in C mode)
    Class,
    Using,
    Namespace,
    Template,
    Typename,
    Public,
    Protected,
    Private,
    Virtual,
    Explicit,
    Operator,
    Friend,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    AndAnd,
    OrOr,
    Bang,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Shl,
    Shr,
    Eq,
    PlusEq,
    MinusEq,
    StarEq,
    SlashEq,
    PercentEq,
    PlusPlus,
    MinusMinus,
    Dot,
    Arrow,
    Ellipsis,
    Question,
    Colon,
    ColonColon,

    // Punctuation
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Semicolon,
    Comma,

    /// Any character the grammar has no use for (only ever inside skipped
    /// regions).
    Other(char),

    // End of file
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::IntLiteral(n) => write!(f, "int literal {}", n),
            TokenKind::FloatLiteral(s) => write!(f, "float literal {}", s),
            TokenKind::CharLiteral(s) => write!(f, "char literal '{}'", s),
            TokenKind::StringLiteral(s) => write!(f, "string literal \"{}\"", s),
            TokenKind::Ident(s) => write!(f, "identifier '{}'", s),
            TokenKind::Void => write!(f, "'void'"),
            TokenKind::Bool => write!(f, "'bool'"),
            TokenKind::Char => write!(f, "'char'"),
            TokenKind::Short => write!(f, "'short'"),
            TokenKind::Int => write!(f, "'int'"),
            TokenKind::Long => write!(f, "'long'"),
            TokenKind::Float => write!(f, "'float'"),
            TokenKind::Double => write!(f, "'double'"),
            TokenKind::Signed => write!(f, "'signed'"),
            TokenKind::Unsigned => write!(f, "'unsigned'"),
            TokenKind::Const => write!(f, "'const'"),
            TokenKind::Volatile => write!(f, "'volatile'"),
            TokenKind::Static => write!(f, "'static'"),
            TokenKind::Extern => write!(f, "'extern'"),
            TokenKind::Inline => write!(f, "'inline'"),
            TokenKind::Struct => write!(f, "'struct'"),
            TokenKind::Union => write!(f, "'union'"),
            TokenKind::Enum => write!(f, "'enum'"),
            TokenKind::Typedef => write!(f, "'typedef'"),
            TokenKind::Class => write!(f, "'class'"),
            TokenKind::Using => write!(f, "'using'"),
            TokenKind::Namespace => write!(f, "'namespace'"),
            TokenKind::Template => write!(f, "'template'"),
            TokenKind::Typename => write!(f, "'typename'"),
            TokenKind::Public => write!(f, "'public'"),
            TokenKind::Protected => write!(f, "'protected'"),
            TokenKind::Private => write!(f, "'private'"),
            TokenKind::Virtual => write!(f, "'virtual'"),
            TokenKind::Explicit => write!(f, "'explicit'"),
            TokenKind::Operator => write!(f, "'operator'"),
            TokenKind::Friend => write!(f, "'friend'"),
            TokenKind::Plus => write!(f, "'+'"),
            TokenKind::Minus => write!(f, "'-'"),
            TokenKind::Star => write!(f, "'*'"),
            TokenKind::Slash => write!(f, "'/'"),
            TokenKind::Percent => write!(f, "'%'"),
            TokenKind::EqEq => write!(f, "'=='"),
            TokenKind::NotEq => write!(f, "'!='"),
            TokenKind::Lt => write!(f, "'<'"),
            TokenKind::Le => write!(f, "'<='"),
            TokenKind::Gt => write!(f, "'>'"),
            TokenKind::Ge => write!(f, "'>='"),
            TokenKind::AndAnd => write!(f, "'&&'"),
            TokenKind::OrOr => write!(f, "'||'"),
            TokenKind::Bang => write!(f, "'!'"),
            TokenKind::Amp => write!(f, "'&'"),
            TokenKind::Pipe => write!(f, "'|'"),
            TokenKind::Caret => write!(f, "'^'"),
            TokenKind::Tilde => write!(f, "'~'"),
            TokenKind::Shl => write!(f, "'<<'"),
            TokenKind::Shr => write!(f, "'>>'"),
            TokenKind::Eq => write!(f, "'='"),
            TokenKind::PlusEq => write!(f, "'+='"),
            TokenKind::MinusEq => write!(f, "'-='"),
            TokenKind::StarEq => write!(f, "'*='"),
            TokenKind::SlashEq => write!(f, "'/='"),
            TokenKind::PercentEq => write!(f, "'%='"),
            TokenKind::PlusPlus => write!(f, "'++'"),
            TokenKind::MinusMinus => write!(f, "'--'"),
            TokenKind::Dot => write!(f, "'.'"),
            TokenKind::Arrow => write!(f, "'->'"),
            TokenKind::Ellipsis => write!(f, "'...'"),
            TokenKind::Question => write!(f, "'?'"),
            TokenKind::Colon => write!(f, "':'"),
            TokenKind::ColonColon => write!(f, "'::'"),
            TokenKind::LParen => write!(f, "'('"),
            TokenKind::RParen => write!(f, "')'"),
            TokenKind::LBrace => write!(f, "'{{'"),
            TokenKind::RBrace => write!(f, "'}}'"),
            TokenKind::LBracket => write!(f, "'['"),
            TokenKind::RBracket => write!(f, "']'"),
            TokenKind::Semicolon => write!(f, "';'"),
            TokenKind::Comma => write!(f, "','"),
            TokenKind::Other(c) => write!(f, "'{}'", c),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// One lexed token with its position, byte span, and any comment text that
/// immediately preceded it.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub location: SourceLocation,
    pub span: Span,
    pub doc: Option<String>,
}

/// Lexer error type
#[derive(Debug)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lexer error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

impl From<LexError> for crate::Error {
    fn from(err: LexError) -> Self {
        crate::Error::Lex {
            message: err.message,
            location: err.location,
        }
    }
}

/// Lexer for C/C++ source code
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    byte_pos: usize,
    line: usize,
    column: usize,
    language: Language,
    pending_doc: Vec<String>,
    directives: Vec<Directive>,
    file_doc: Option<String>,
    emitted_any: bool,
}

impl Lexer {
    /// Create a new lexer for the given source string.
    pub fn new(input: &str, language: Language) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            byte_pos: 0,
            line: 1,
            column: 1,
            language,
            pending_doc: Vec::new(),
            directives: Vec::new(),
            file_doc: None,
            emitted_any: false,
        }
    }

    /// Tokenize the entire input.
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace_and_comments()?;

            if self.is_at_end() {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    location: self.current_location(),
                    span: Span::new(self.byte_pos, self.byte_pos),
                    doc: None,
                });
                break;
            }

            if self.peek() == Some('#') {
                self.capture_directive();
                continue;
            }

            tokens.push(self.next_token()?);
        }

        Ok(tokens)
    }

    /// Preprocessor directives captured so far, in source order.
    pub fn take_directives(&mut self) -> Vec<Directive> {
        std::mem::take(&mut self.directives)
    }

    /// Comment block found before any code or directive, if any.
    pub fn take_file_doc(&mut self) -> Option<String> {
        self.file_doc.take()
    }

    /// Get next token
    fn next_token(&mut self) -> Result<Token, LexError> {
        let loc = self.current_location();
        let start = self.byte_pos;
        let ch = self.advance().ok_or_else(|| LexError {
            message: "Unexpected end of file".to_string(),
            location: loc,
        })?;

        let kind = match ch {
            '"' => self.string_literal()?,
            '\'' => self.char_literal()?,
            '0'..='9' => self.number_literal(ch)?,
            'a'..='z' | 'A'..='Z' | '_' => self.identifier_or_keyword(ch),

            '+' => {
                if self.eat('+') {
                    TokenKind::PlusPlus
                } else if self.eat('=') {
                    TokenKind::PlusEq
                } else {
                    TokenKind::Plus
                }
            }
            '-' => {
                if self.eat('-') {
                    TokenKind::MinusMinus
                } else if self.eat('=') {
                    TokenKind::MinusEq
                } else if self.eat('>') {
                    TokenKind::Arrow
                } else {
                    TokenKind::Minus
                }
            }
            '*' => {
                if self.eat('=') {
                    TokenKind::StarEq
                } else {
                    TokenKind::Star
                }
            }
            '/' => {
                if self.eat('=') {
                    TokenKind::SlashEq
                } else {
                    TokenKind::Slash
                }
            }
            '%' => {
                if self.eat('=') {
                    TokenKind::PercentEq
                } else {
                    TokenKind::Percent
                }
            }
            '=' => {
                if self.eat('=') {
                    TokenKind::EqEq
                } else {
                    TokenKind::Eq
                }
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Bang
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::Le
                } else if self.eat('<') {
                    TokenKind::Shl
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::Ge
                } else if self.eat('>') {
                    TokenKind::Shr
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AndAnd
                } else {
                    TokenKind::Amp
                }
            }
            '|' => {
                if self.eat('|') {
                    TokenKind::OrOr
                } else {
                    TokenKind::Pipe
                }
            }
            ':' => {
                if self.eat(':') {
                    TokenKind::ColonColon
                } else {
                    TokenKind::Colon
                }
            }
            '.' => {
                if self.peek() == Some('.') && self.peek_ahead(1) == Some('.') {
                    self.advance();
                    self.advance();
                    TokenKind::Ellipsis
                } else {
                    TokenKind::Dot
                }
            }
            '^' => TokenKind::Caret,
            '~' => TokenKind::Tilde,
            '?' => TokenKind::Question,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,

            other => TokenKind::Other(other),
        };

        let doc = self.attach_pending_doc();
        Ok(Token {
            kind,
            location: loc,
            span: Span::new(start, self.byte_pos),
            doc,
        })
    }

    /// Join and clear pending comments; comments preceding all code also
    /// become the file doc.
    fn attach_pending_doc(&mut self) -> Option<String> {
        let doc = if self.pending_doc.is_empty() {
            None
        } else {
            Some(self.pending_doc.join("\n"))
        };
        self.pending_doc.clear();
        if !self.emitted_any {
            self.emitted_any = true;
            if self.file_doc.is_none() {
                self.file_doc = doc.clone();
            }
        }
        doc
    }

    /// Capture a preprocessor directive line (with backslash continuations).
    fn capture_directive(&mut self) {
        let loc = self.current_location();
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            if ch == '\\' && self.peek_ahead(1) == Some('\n') {
                self.advance();
                self.advance();
                text.push(' ');
                continue;
            }
            if ch == '\n' {
                break;
            }
            text.push(ch);
            self.advance();
        }

        let body = text.trim_start_matches('#').trim_start();
        let kind = if body.starts_with("include") {
            DirectiveKind::Include
        } else if body.starts_with("define") {
            DirectiveKind::Define
        } else {
            DirectiveKind::Other
        };

        if !self.emitted_any {
            self.emitted_any = true;
            if self.file_doc.is_none() && !self.pending_doc.is_empty() {
                self.file_doc = Some(self.pending_doc.join("\n"));
            }
        }
        self.pending_doc.clear();

        self.directives.push(Directive {
            kind,
            text: text.trim_end().to_string(),
            location: loc,
        });
    }

    /// Lex a string literal, keeping the contents raw (escapes as written).
    fn string_literal(&mut self) -> Result<TokenKind, LexError> {
        let loc = SourceLocation::new(self.line, self.column.saturating_sub(1));
        let mut string = String::new();

        while let Some(ch) = self.peek() {
            if ch == '"' {
                self.advance();
                return Ok(TokenKind::StringLiteral(string));
            }
            if ch == '\\' {
                string.push(ch);
                self.advance();
                if let Some(escaped) = self.advance() {
                    string.push(escaped);
                }
                continue;
            }
            string.push(ch);
            self.advance();
        }

        Err(LexError {
            message: "Unterminated string literal".to_string(),
            location: loc,
        })
    }

    /// Lex a character literal, keeping the contents raw.
    fn char_literal(&mut self) -> Result<TokenKind, LexError> {
        let loc = SourceLocation::new(self.line, self.column.saturating_sub(1));
        let mut text = String::new();

        while let Some(ch) = self.peek() {
            if ch == '\'' {
                self.advance();
                return Ok(TokenKind::CharLiteral(text));
            }
            if ch == '\\' {
                text.push(ch);
                self.advance();
                if let Some(escaped) = self.advance() {
                    text.push(escaped);
                }
                continue;
            }
            text.push(ch);
            self.advance();
        }

        Err(LexError {
            message: "Unterminated character literal".to_string(),
            location: loc,
        })
    }

    /// Lex a numeric literal: decimal/hex integers or a float.
    fn number_literal(&mut self, first_digit: char) -> Result<TokenKind, LexError> {
        let loc = SourceLocation::new(self.line, self.column.saturating_sub(1));
        let mut num_str = String::new();
        num_str.push(first_digit);

        if first_digit == '0' && matches!(self.peek(), Some('x') | Some('X')) {
            self.advance();
            let mut hex = String::new();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_hexdigit() {
                    hex.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
            self.skip_int_suffix();
            let value = i64::from_str_radix(&hex, 16).map_err(|_| LexError {
                message: format!("Invalid hex literal: 0x{}", hex),
                location: loc,
            })?;
            return Ok(TokenKind::IntLiteral(value));
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                num_str.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let mut is_float = false;
        if self.peek() == Some('.') && self.peek_ahead(1).is_some_and(|c| c.is_ascii_digit()) {
            is_float = true;
            num_str.push('.');
            self.advance();
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    num_str.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            is_float = true;
            num_str.push('e');
            self.advance();
            if matches!(self.peek(), Some('+') | Some('-')) {
                if let Some(sign) = self.advance() {
                    num_str.push(sign);
                }
            }
            while let Some(ch) = self.peek() {
                if ch.is_ascii_digit() {
                    num_str.push(ch);
                    self.advance();
                } else {
                    break;
                }
            }
        }

        if is_float {
            while matches!(self.peek(), Some('f') | Some('F') | Some('l') | Some('L')) {
                self.advance();
            }
            return Ok(TokenKind::FloatLiteral(num_str));
        }

        self.skip_int_suffix();
        let value = num_str.parse::<i64>().map_err(|_| LexError {
            message: format!("Invalid integer literal: {}", num_str),
            location: loc,
        })?;
        Ok(TokenKind::IntLiteral(value))
    }

    fn skip_int_suffix(&mut self) {
        while matches!(self.peek(), Some('u') | Some('U') | Some('l') | Some('L')) {
            self.advance();
        }
    }

    /// Lex an identifier or keyword. C++-only keywords stay identifiers in
    /// C mode; `override` and `final` are contextual and always identifiers.
    fn identifier_or_keyword(&mut self, first_char: char) -> TokenKind {
        let mut ident = String::new();
        ident.push(first_char);

        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ident.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if let Some(kind) = shared_keyword(&ident) {
            return kind;
        }
        if self.language == Language::Cpp {
            if let Some(kind) = cpp_keyword(&ident) {
                return kind;
            }
        }
        TokenKind::Ident(ident)
    }

    /// Skip whitespace and comments, accumulating cleaned comment text as
    /// the pending doc for the next token.
    fn skip_whitespace_and_comments(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => {
                    self.advance();
                }
                Some('/') => {
                    if self.peek_ahead(1) == Some('/') {
                        let text = self.read_line_comment();
                        self.pending_doc.push(clean_comment(&text));
                    } else if self.peek_ahead(1) == Some('*') {
                        let text = self.read_block_comment()?;
                        self.pending_doc.push(clean_comment(&text));
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    /// Read a single-line comment (// ...), returning its raw text.
    fn read_line_comment(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch == '\n' {
                self.advance();
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }

    /// Read a multi-line comment (/* ... */), returning its raw text.
    fn read_block_comment(&mut self) -> Result<String, LexError> {
        let start_loc = self.current_location();
        let mut text = String::new();
        text.push(self.advance().unwrap_or('/'));
        text.push(self.advance().unwrap_or('*'));

        while !self.is_at_end() {
            if self.peek() == Some('*') && self.peek_ahead(1) == Some('/') {
                text.push(self.advance().unwrap_or('*'));
                text.push(self.advance().unwrap_or('/'));
                return Ok(text);
            }
            if let Some(ch) = self.advance() {
                text.push(ch);
            }
        }

        Err(LexError {
            message: "Unterminated block comment".to_string(),
            location: start_loc,
        })
    }

    /// Consume the next character if it matches.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Peek at current character without consuming
    fn peek(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    /// Peek ahead n characters
    fn peek_ahead(&self, n: usize) -> Option<char> {
        self.input.get(self.position + n).copied()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.input.get(self.position).copied()?;
        self.position += 1;
        self.byte_pos += ch.len_utf8();

        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }

        Some(ch)
    }

    /// Check if at end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get current source location
    fn current_location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }
}

fn shared_keyword(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "void" => TokenKind::Void,
        "bool" => TokenKind::Bool,
        "char" => TokenKind::Char,
        "short" => TokenKind::Short,
        "int" => TokenKind::Int,
        "long" => TokenKind::Long,
        "float" => TokenKind::Float,
        "double" => TokenKind::Double,
        "signed" => TokenKind::Signed,
        "unsigned" => TokenKind::Unsigned,
        "const" => TokenKind::Const,
        "volatile" => TokenKind::Volatile,
        "static" => TokenKind::Static,
        "extern" => TokenKind::Extern,
        "inline" => TokenKind::Inline,
        "struct" => TokenKind::Struct,
        "union" => TokenKind::Union,
        "enum" => TokenKind::Enum,
        "typedef" => TokenKind::Typedef,
        _ => return None,
    };
    Some(kind)
}

fn cpp_keyword(ident: &str) -> Option<TokenKind> {
    let kind = match ident {
        "class" => TokenKind::Class,
        "using" => TokenKind::Using,
        "namespace" => TokenKind::Namespace,
        "template" => TokenKind::Template,
        "typename" => TokenKind::Typename,
        "public" => TokenKind::Public,
        "protected" => TokenKind::Protected,
        "private" => TokenKind::Private,
        "virtual" => TokenKind::Virtual,
        "explicit" => TokenKind::Explicit,
        "operator" => TokenKind::Operator,
        "friend" => TokenKind::Friend,
        _ => return None,
    };
    Some(kind)
}

/// Strip comment markers and per-line `*` gutters.
fn clean_comment(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(body) = trimmed.strip_prefix("/*") {
        let body = body.strip_suffix("*/").unwrap_or(body);
        body.lines()
            .map(|line| line.trim().trim_start_matches('*').trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        trimmed.trim_start_matches('/').trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source, Language::Cpp).tokenize().unwrap()
    }

    #[test]
    fn test_simple_tokens() {
        let tokens = lex("int main() { return 0; }");

        assert_eq!(tokens[0].kind, TokenKind::Int);
        assert!(matches!(tokens[1].kind, TokenKind::Ident(ref s) if s == "main"));
        assert_eq!(tokens[2].kind, TokenKind::LParen);
        assert_eq!(tokens[3].kind, TokenKind::RParen);
        assert_eq!(tokens[4].kind, TokenKind::LBrace);
        assert!(matches!(tokens[5].kind, TokenKind::Ident(ref s) if s == "return"));
        assert_eq!(tokens[6].kind, TokenKind::IntLiteral(0));
        assert_eq!(tokens[7].kind, TokenKind::Semicolon);
        assert_eq!(tokens[8].kind, TokenKind::RBrace);
        assert_eq!(tokens[9].kind, TokenKind::Eof);
    }

    #[test]
    fn test_operators() {
        let tokens = lex("++ -- += -= == != && || :: -> ...");

        assert_eq!(tokens[0].kind, TokenKind::PlusPlus);
        assert_eq!(tokens[1].kind, TokenKind::MinusMinus);
        assert_eq!(tokens[2].kind, TokenKind::PlusEq);
        assert_eq!(tokens[3].kind, TokenKind::MinusEq);
        assert_eq!(tokens[4].kind, TokenKind::EqEq);
        assert_eq!(tokens[5].kind, TokenKind::NotEq);
        assert_eq!(tokens[6].kind, TokenKind::AndAnd);
        assert_eq!(tokens[7].kind, TokenKind::OrOr);
        assert_eq!(tokens[8].kind, TokenKind::ColonColon);
        assert_eq!(tokens[9].kind, TokenKind::Arrow);
        assert_eq!(tokens[10].kind, TokenKind::Ellipsis);
    }

    #[test]
    fn test_doc_comment_attaches_to_next_token() {
        let tokens = lex("int x;\n/** Public integer data. */\nint public_data;");

        assert_eq!(tokens[0].doc, None);
        assert_eq!(tokens[3].kind, TokenKind::Int);
        assert_eq!(tokens[3].doc.as_deref(), Some("Public integer data."));
    }

    #[test]
    fn test_directive_capture() {
        let mut lexer = Lexer::new(
            "#include <stdio.h>\n#define MAX_SIZE 100\nint x;",
            Language::C,
        );
        let tokens = lexer.tokenize().unwrap();
        let directives = lexer.take_directives();

        assert_eq!(directives.len(), 2);
        assert_eq!(directives[0].kind, DirectiveKind::Include);
        assert_eq!(directives[0].text, "#include <stdio.h>");
        assert_eq!(directives[1].kind, DirectiveKind::Define);
        assert_eq!(directives[1].text, "#define MAX_SIZE 100");
        assert_eq!(tokens[0].kind, TokenKind::Int);
    }

    #[test]
    fn test_cpp_keywords_are_idents_in_c() {
        let tokens = Lexer::new("class template", Language::C)
            .tokenize()
            .unwrap();
        assert!(matches!(tokens[0].kind, TokenKind::Ident(ref s) if s == "class"));
        assert!(matches!(tokens[1].kind, TokenKind::Ident(ref s) if s == "template"));

        let tokens = lex("class template");
        assert_eq!(tokens[0].kind, TokenKind::Class);
        assert_eq!(tokens[1].kind, TokenKind::Template);
    }

    #[test]
    fn test_string_and_char_literals_raw() {
        let tokens = lex(r#""hello\nworld" '\n' 'a'"#);
        assert!(matches!(tokens[0].kind, TokenKind::StringLiteral(ref s) if s == "hello\\nworld"));
        assert!(matches!(tokens[1].kind, TokenKind::CharLiteral(ref s) if s == "\\n"));
        assert!(matches!(tokens[2].kind, TokenKind::CharLiteral(ref s) if s == "a"));
    }

    #[test]
    fn test_float_literal() {
        let tokens = lex("3.14159 5.0f 1e6");
        assert!(matches!(tokens[0].kind, TokenKind::FloatLiteral(ref s) if s == "3.14159"));
        assert!(matches!(tokens[1].kind, TokenKind::FloatLiteral(ref s) if s == "5.0"));
        assert!(matches!(tokens[2].kind, TokenKind::FloatLiteral(ref s) if s == "1e6"));
    }

    #[test]
    fn test_spans_slice_source() {
        let source = "int main()";
        let tokens = lex(source);
        assert_eq!(tokens[1].span.slice(source), "main");
    }

    #[test]
    fn test_comments_skipped() {
        let tokens = lex("int x; // comment\nint y; /* block\ncomment */ int z;");
        let idents: Vec<_> = tokens
            .iter()
            .filter_map(|t| match &t.kind {
                TokenKind::Ident(s) => Some(s.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(idents, vec!["x", "y", "z"]);
    }
}
