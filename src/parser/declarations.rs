//! Top-level declaration parsing
//!
//! This module handles parsing of top-level declarations in C/C++
//! translation units:
//!
//! - Record definitions: `struct Name { ... };`, `class Name : bases { ... };`
//! - Enum definitions: `enum Name { ... };`, `enum class Name { ... };`
//! - Typedefs: `typedef struct { ... } Name;`, `typedef int (*cb)(int);`
//! - Functions: prototypes and definitions, including templates
//! - Namespaces (flattened), `using` aliases, `extern "C"` blocks
//!
//! # Grammar
//!
//! ```text
//! unit        ::= top_level*
//! top_level   ::= record_def | enum_def | typedef | template | namespace
//!               | using | extern_block | function | skipped
//! function    ::= qualifier* type declarator "(" params ")" (";" | body)
//! type        ::= [const] base [*]* [&]
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the
//! [`Parser`] struct.

use crate::model::{
    AliasDecl, AliasKind, Directive, DirectiveKind, EnumDecl, FileModel, FunctionDecl, Param,
    RecordDecl, RecordKind, Signature, Span, TypeRef,
};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use tracing::debug;

impl Parser {
    /// Parse one top-level construct, appending anything it declares to
    /// `unit`.
    pub(crate) fn parse_top_level(&mut self, unit: &mut FileModel) -> Result<(), ParseError> {
        let doc = self.peek_doc();
        match self.peek_kind() {
            TokenKind::Semicolon => {
                self.advance();
                Ok(())
            }
            TokenKind::Typedef => self.parse_typedef(unit, doc),
            TokenKind::Enum => self.parse_enum_or_type_use(unit, doc),
            TokenKind::Struct | TokenKind::Union | TokenKind::Class => {
                self.parse_record_or_type_use(unit, doc, None)
            }
            TokenKind::Template => self.parse_template(unit, doc),
            TokenKind::Namespace => self.parse_namespace(unit),
            TokenKind::Using => self.parse_using(unit, doc),
            TokenKind::Extern
                if matches!(self.kind_ahead(1), Some(TokenKind::StringLiteral(_))) =>
            {
                self.parse_linkage_block(unit)
            }
            TokenKind::Friend => self.skip_to_semicolon(),
            TokenKind::Static | TokenKind::Inline | TokenKind::Extern => {
                let start = self.token_start();
                self.parse_function_like(unit, doc, None, start)
            }
            _ if self.is_type_start() => {
                let start = self.token_start();
                self.parse_function_like(unit, doc, None, start)
            }
            _ => self.skip_unrecognized(),
        }
    }

    /// Disambiguate `struct Name { ... };` from `struct Name f(...)`.
    ///
    /// A record keyword followed by a name and `{` (or a base clause) is a
    /// definition; anything else is an elaborated type use, so the position
    /// is restored and the construct reparsed as a function or variable.
    pub(crate) fn parse_record_or_type_use(
        &mut self,
        unit: &mut FileModel,
        doc: Option<String>,
        template: Option<String>,
    ) -> Result<(), ParseError> {
        let saved = self.position;
        let start = template
            .as_ref()
            .map(|_| self.template_start)
            .unwrap_or_else(|| self.token_start());
        let location = self.current_location();

        let kind = match self.peek_kind() {
            TokenKind::Struct => RecordKind::Struct,
            TokenKind::Class => RecordKind::Class,
            TokenKind::Union => RecordKind::Union,
            other => return Err(self.error(format!("Expected record keyword, found {}", other))),
        };
        self.advance();

        if self.check(&TokenKind::LBrace) {
            // Anonymous record at top level: parse and keep under an empty
            // name (a typedef caller will rename it).
            let mut rec =
                self.parse_record_def(unit, kind, String::new(), doc, template, start, location)?;
            self.skip_to_semicolon()?;
            rec.span.end = self.prev_end();
            unit.records.push(rec);
            return Ok(());
        }

        if matches!(self.peek_kind(), TokenKind::Ident(_)) {
            match self.kind_ahead(1) {
                Some(TokenKind::LBrace) | Some(TokenKind::Colon) => {
                    let name = self.expect_identifier()?;
                    let mut rec = self.parse_record_def(
                        unit,
                        kind,
                        name,
                        doc,
                        template,
                        start,
                        location,
                    )?;
                    self.skip_declarators()?;
                    self.expect_semicolon("after struct definition")?;
                    rec.span.end = self.prev_end();
                    self.register_type(&rec.name);
                    unit.records.push(rec);
                    return Ok(());
                }
                Some(TokenKind::Semicolon) => {
                    // Forward declaration; nothing to record.
                    let name = self.expect_identifier()?;
                    self.advance();
                    debug!("skipping forward declaration of '{}'", name);
                    self.register_type(&name);
                    return Ok(());
                }
                _ => {}
            }
        }

        self.position = saved;
        self.parse_function_like(unit, doc, template, start)
    }

    /// Parse a record definition body. The current token must be the base
    /// clause colon or the opening brace; the closing brace is consumed,
    /// trailing declarators and `;` are left to the caller.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn parse_record_def(
        &mut self,
        unit: &mut FileModel,
        kind: RecordKind,
        name: String,
        doc: Option<String>,
        template: Option<String>,
        start: usize,
        location: crate::model::SourceLocation,
    ) -> Result<RecordDecl, ParseError> {
        let bases = if self.match_kind(&TokenKind::Colon) {
            self.capture_until_lbrace()?
                .map(|s| self.slice(s).to_string())
        } else {
            None
        };
        self.expect_lbrace("after struct name")?;
        let members = self.parse_record_body(unit, &name, kind)?;
        self.expect_rbrace("after struct body")?;

        Ok(RecordDecl {
            name,
            kind,
            bases,
            template,
            members,
            doc,
            location,
            span: Span::new(start, self.prev_end()),
        })
    }

    /// Disambiguate `enum Name { ... };` from an elaborated enum type use.
    pub(crate) fn parse_enum_or_type_use(
        &mut self,
        unit: &mut FileModel,
        doc: Option<String>,
    ) -> Result<(), ParseError> {
        let saved = self.position;
        let start = self.token_start();
        let location = self.current_location();

        self.advance(); // enum
        let is_scoped =
            self.match_kind(&TokenKind::Class) || self.match_kind(&TokenKind::Struct);
        let name = if matches!(self.peek_kind(), TokenKind::Ident(_)) {
            Some(self.expect_identifier()?)
        } else {
            None
        };

        if self.check(&TokenKind::LBrace) || self.check(&TokenKind::Colon) {
            let mut decl = self.parse_enum_def(
                name.unwrap_or_default(),
                is_scoped,
                doc,
                start,
                location,
            )?;
            self.skip_declarators()?;
            self.expect_semicolon("after enum definition")?;
            decl.span.end = self.prev_end();
            self.register_type(&decl.name);
            unit.enums.push(decl);
            return Ok(());
        }

        self.position = saved;
        self.parse_function_like(unit, doc, None, start)
    }

    /// Parse an enum definition body. The current token must be the
    /// underlying-type colon or the opening brace; the closing brace is
    /// consumed.
    pub(crate) fn parse_enum_def(
        &mut self,
        name: String,
        is_scoped: bool,
        doc: Option<String>,
        start: usize,
        location: crate::model::SourceLocation,
    ) -> Result<EnumDecl, ParseError> {
        let underlying = if self.match_kind(&TokenKind::Colon) {
            self.capture_until_lbrace()?
                .map(|s| self.slice(s).to_string())
        } else {
            None
        };
        self.expect_lbrace("after enum name")?;
        let enumerators = self.parse_enumerators()?;
        self.expect_rbrace("after enumerators")?;

        Ok(EnumDecl {
            name,
            is_scoped,
            underlying,
            enumerators,
            doc,
            location,
            span: Span::new(start, self.prev_end()),
        })
    }

    /// Parse a typedef: plain alias, function-pointer alias, or a combined
    /// record/enum definition with an alias name.
    pub(crate) fn parse_typedef(
        &mut self,
        unit: &mut FileModel,
        doc: Option<String>,
    ) -> Result<(), ParseError> {
        let start = self.token_start();
        let location = self.current_location();
        self.advance(); // typedef

        match self.peek_kind() {
            TokenKind::Struct | TokenKind::Union | TokenKind::Class
                if self.record_body_ahead() =>
            {
                let kind = match self.peek_kind() {
                    TokenKind::Struct => RecordKind::Struct,
                    TokenKind::Union => RecordKind::Union,
                    _ => RecordKind::Class,
                };
                self.advance();
                let tag = if matches!(self.peek_kind(), TokenKind::Ident(_)) {
                    Some(self.expect_identifier()?)
                } else {
                    None
                };
                let mut rec = self.parse_record_def(
                    unit,
                    kind,
                    tag.clone().unwrap_or_default(),
                    doc,
                    None,
                    start,
                    location,
                )?;
                while self.match_kind(&TokenKind::Star) {}
                let alias = self.expect_identifier()?;
                self.expect_semicolon("after typedef")?;
                rec.span.end = self.prev_end();
                if rec.name.is_empty() {
                    rec.name = alias.clone();
                }
                self.register_type(&rec.name);
                self.register_type(&alias);
                let alias_link = (rec.name != alias).then(|| AliasDecl {
                    name: alias,
                    target: format!("{} {}", kind.keyword(), rec.name),
                    kind: AliasKind::Typedef,
                    doc: None,
                    location,
                    span: Span::new(start, self.prev_end()),
                });
                unit.records.push(rec);
                if let Some(link) = alias_link {
                    unit.aliases.push(link);
                }
                Ok(())
            }
            TokenKind::Enum if self.enum_body_ahead() => {
                self.advance();
                let is_scoped =
                    self.match_kind(&TokenKind::Class) || self.match_kind(&TokenKind::Struct);
                let tag = if matches!(self.peek_kind(), TokenKind::Ident(_)) {
                    Some(self.expect_identifier()?)
                } else {
                    None
                };
                let mut decl = self.parse_enum_def(
                    tag.clone().unwrap_or_default(),
                    is_scoped,
                    doc,
                    start,
                    location,
                )?;
                let alias = self.expect_identifier()?;
                self.expect_semicolon("after typedef")?;
                decl.span.end = self.prev_end();
                if decl.name.is_empty() {
                    decl.name = alias.clone();
                }
                self.register_type(&decl.name);
                self.register_type(&alias);
                let alias_link = (decl.name != alias).then(|| AliasDecl {
                    name: alias,
                    target: format!("enum {}", decl.name),
                    kind: AliasKind::Typedef,
                    doc: None,
                    location,
                    span: Span::new(start, self.prev_end()),
                });
                unit.enums.push(decl);
                if let Some(link) = alias_link {
                    unit.aliases.push(link);
                }
                Ok(())
            }
            _ => {
                let target_start = self.token_start();
                let ty = self.parse_type()?;
                if self.check(&TokenKind::LParen) {
                    // Function-pointer typedef: typedef int (*cb)(int);
                    let decl_span = self.skip_balanced_parens()?;
                    let name = extract_last_ident(self.slice(decl_span))
                        .ok_or_else(|| self.error("Expected typedef name"))?;
                    if self.check(&TokenKind::LParen) {
                        self.skip_balanced_parens()?;
                    }
                    let target = self.source[target_start..self.prev_end()].to_string();
                    self.expect_semicolon("after typedef")?;
                    self.register_type(&name);
                    unit.aliases.push(AliasDecl {
                        name,
                        target,
                        kind: AliasKind::Typedef,
                        doc,
                        location,
                        span: Span::new(start, self.prev_end()),
                    });
                } else {
                    let mut ty = ty;
                    let name = self.expect_identifier()?;
                    while self.match_kind(&TokenKind::LBracket) {
                        let dim = self.finish_array_dim()?;
                        ty = ty.with_array(dim);
                    }
                    self.expect_semicolon("after typedef")?;
                    self.register_type(&name);
                    unit.aliases.push(AliasDecl {
                        name,
                        target: ty.render(),
                        kind: AliasKind::Typedef,
                        doc,
                        location,
                        span: Span::new(start, self.prev_end()),
                    });
                }
                Ok(())
            }
        }
    }

    /// Does a record body follow the current record keyword (possibly after
    /// a tag name and base clause)?
    pub(crate) fn record_body_ahead(&self) -> bool {
        match self.kind_ahead(1) {
            Some(TokenKind::LBrace) => true,
            Some(TokenKind::Ident(_)) => matches!(
                self.kind_ahead(2),
                Some(TokenKind::LBrace) | Some(TokenKind::Colon)
            ),
            _ => false,
        }
    }

    pub(crate) fn enum_body_ahead(&self) -> bool {
        match self.kind_ahead(1) {
            Some(TokenKind::LBrace) | Some(TokenKind::Class) | Some(TokenKind::Struct) => true,
            Some(TokenKind::Ident(_)) => matches!(
                self.kind_ahead(2),
                Some(TokenKind::LBrace) | Some(TokenKind::Colon)
            ),
            _ => false,
        }
    }

    /// Parse `template <...>` and the declaration it introduces.
    pub(crate) fn parse_template(
        &mut self,
        unit: &mut FileModel,
        doc: Option<String>,
    ) -> Result<(), ParseError> {
        let start = self.token_start();
        self.advance(); // template
        let header = self.capture_angles()?;
        let text = self.source[start..header.end].to_string();
        self.template_start = start;

        match self.peek_kind() {
            TokenKind::Struct | TokenKind::Class | TokenKind::Union => {
                self.parse_record_or_type_use(unit, doc, Some(text))
            }
            TokenKind::Using => {
                // Alias templates are not modeled.
                debug!("skipping alias template at {}", self.current_location());
                self.skip_to_semicolon()
            }
            _ => self.parse_function_like(unit, doc, Some(text), start),
        }
    }

    /// Parse a namespace, flattening its contents into the file model. The
    /// namespace itself is recorded as a directive so the grouping is not
    /// lost.
    pub(crate) fn parse_namespace(&mut self, unit: &mut FileModel) -> Result<(), ParseError> {
        let location = self.current_location();
        self.advance(); // namespace

        let mut name = String::new();
        while matches!(self.peek_kind(), TokenKind::Ident(_)) {
            name.push_str(&self.expect_identifier()?);
            if self.check(&TokenKind::ColonColon)
                && matches!(self.kind_ahead(1), Some(TokenKind::Ident(_)))
            {
                self.advance();
                name.push_str("::");
            } else {
                break;
            }
        }

        if self.check(&TokenKind::LBrace) {
            let text = if name.is_empty() {
                "namespace".to_string()
            } else {
                format!("namespace {}", name)
            };
            unit.directives.push(Directive {
                kind: DirectiveKind::Other,
                text,
                location,
            });
            self.advance();
            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                self.parse_top_level(unit)?;
            }
            self.expect_rbrace("after namespace body")?;
            Ok(())
        } else {
            // Namespace alias
            self.skip_to_semicolon()
        }
    }

    /// Parse `using`: alias form becomes an [`AliasDecl`], directive forms
    /// (`using namespace`, using-declarations) are recorded as directives.
    pub(crate) fn parse_using(
        &mut self,
        unit: &mut FileModel,
        doc: Option<String>,
    ) -> Result<(), ParseError> {
        let start = self.token_start();
        let location = self.current_location();
        self.advance(); // using

        let is_alias = matches!(self.peek_kind(), TokenKind::Ident(_))
            && matches!(self.kind_ahead(1), Some(TokenKind::Eq));

        if is_alias {
            let name = self.expect_identifier()?;
            self.advance(); // =
            let target = self
                .capture_until_semicolon()?
                .map(|s| self.slice(s).to_string())
                .unwrap_or_default();
            self.expect_semicolon("after using alias")?;
            self.register_type(&name);
            unit.aliases.push(AliasDecl {
                name,
                target,
                kind: AliasKind::Using,
                doc,
                location,
                span: Span::new(start, self.prev_end()),
            });
        } else {
            let end = self
                .capture_until_semicolon()?
                .map(|s| s.end)
                .unwrap_or(start);
            self.expect_semicolon("after using declaration")?;
            unit.directives.push(Directive {
                kind: DirectiveKind::Other,
                text: self.source[start..end].to_string(),
                location,
            });
        }
        Ok(())
    }

    /// Parse `extern "C"` followed by a block or a single declaration.
    pub(crate) fn parse_linkage_block(&mut self, unit: &mut FileModel) -> Result<(), ParseError> {
        self.advance(); // extern
        self.advance(); // "C"
        if self.check(&TokenKind::LBrace) {
            self.advance();
            while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
                self.parse_top_level(unit)?;
            }
            self.expect_rbrace("after extern block")?;
            Ok(())
        } else {
            self.parse_top_level(unit)
        }
    }

    /// Parse a function prototype or definition; a declarator that turns
    /// out to be a global variable is skipped.
    pub(crate) fn parse_function_like(
        &mut self,
        unit: &mut FileModel,
        doc: Option<String>,
        template: Option<String>,
        start: usize,
    ) -> Result<(), ParseError> {
        let location = self.current_location();
        let mut is_static = false;
        let mut is_inline = false;
        let mut is_extern = false;
        loop {
            if self.match_kind(&TokenKind::Static) {
                is_static = true;
            } else if self.match_kind(&TokenKind::Inline) {
                is_inline = true;
            } else if self.match_kind(&TokenKind::Extern) {
                is_extern = true;
            } else if self.match_ident("constexpr") {
                // contextual keyword, not modeled
            } else {
                break;
            }
        }

        let return_type = self.parse_type()?;

        if self.match_kind(&TokenKind::Semicolon) {
            // `enum Color;` and friends: a bare elaborated type.
            debug!("skipping bare type declaration at {}", location);
            return Ok(());
        }

        if !matches!(self.peek_kind(), TokenKind::Ident(_)) {
            debug!("skipping non-function declarator at {}", location);
            return self.skip_to_semicolon();
        }

        let mut name = self.expect_identifier()?;
        while self.check(&TokenKind::ColonColon)
            && matches!(self.kind_ahead(1), Some(TokenKind::Ident(_)))
        {
            self.advance();
            name.push_str("::");
            name.push_str(&self.expect_identifier()?);
        }

        if !self.check(&TokenKind::LParen) {
            debug!("skipping global variable '{}'", name);
            return self.skip_to_semicolon();
        }

        self.advance(); // (
        let (params, is_variadic) = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;

        loop {
            if self.match_kind(&TokenKind::Const) {
                continue;
            }
            if self.match_ident("noexcept") {
                if self.check(&TokenKind::LParen) {
                    self.skip_balanced_parens()?;
                }
                continue;
            }
            if self.match_ident("override") || self.match_ident("final") {
                continue;
            }
            break;
        }

        let (has_body, body, end) = if self.check(&TokenKind::LBrace) {
            let span = self.skip_balanced_braces()?;
            (true, Some(self.slice(span).to_string()), span.end)
        } else if self.match_kind(&TokenKind::Semicolon) {
            (false, None, self.prev_end())
        } else if self.check(&TokenKind::Eq) {
            // `= delete` / `= default`
            self.skip_to_semicolon()?;
            (false, None, self.prev_end())
        } else {
            return Err(self.error(format!(
                "Expected ';' or '{{' after function signature, found {}",
                self.peek_kind()
            )));
        };

        unit.functions.push(FunctionDecl {
            name,
            signature: Signature {
                return_type: Some(return_type),
                params,
                is_variadic,
            },
            doc,
            template,
            is_static,
            is_inline,
            is_extern,
            has_body,
            body,
            location,
            span: Span::new(start, end),
        });
        Ok(())
    }

    /// Parse a parameter list; the current token is the one after `(`.
    /// Returns the parameters and the variadic flag.
    pub(crate) fn parse_parameter_list(&mut self) -> Result<(Vec<Param>, bool), ParseError> {
        let mut params = Vec::new();
        let mut variadic = false;

        if self.check(&TokenKind::RParen) {
            return Ok((params, variadic));
        }

        // (void) means no parameters
        if self.check(&TokenKind::Void) && matches!(self.kind_ahead(1), Some(TokenKind::RParen)) {
            self.advance();
            return Ok((params, variadic));
        }

        loop {
            if self.match_kind(&TokenKind::Ellipsis) {
                variadic = true;
                break;
            }

            let param_start = self.token_start();
            let mut ty = self.parse_type()?;
            let mut name = None;

            if self.check(&TokenKind::LParen) {
                // Function-pointer parameter: int (*cb)(int)
                let decl = self.skip_balanced_parens()?;
                name = extract_last_ident(self.slice(decl));
                if self.check(&TokenKind::LParen) {
                    self.skip_balanced_parens()?;
                }
                ty = TypeRef::new(self.source[param_start..self.prev_end()].to_string());
            } else if matches!(self.peek_kind(), TokenKind::Ident(_)) {
                name = Some(self.expect_identifier()?);
            }

            while self.match_kind(&TokenKind::LBracket) {
                let dim = self.finish_array_dim()?;
                ty = ty.with_array(dim);
            }

            if self.match_kind(&TokenKind::Eq) {
                self.skip_default_argument()?;
            }

            params.push(Param { name, ty });

            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }

        Ok((params, variadic))
    }

    /// Finish an array dimension; the `[` has already been consumed.
    /// A plain integer size is recorded, anything else is an unsized/
    /// unevaluated dimension.
    pub(crate) fn finish_array_dim(&mut self) -> Result<Option<usize>, ParseError> {
        let dim = match self.peek_kind() {
            TokenKind::IntLiteral(n)
                if matches!(self.kind_ahead(1), Some(TokenKind::RBracket)) =>
            {
                usize::try_from(*n).ok()
            }
            _ => None,
        };
        while !self.check(&TokenKind::RBracket) && !self.is_at_end() {
            self.advance();
        }
        self.expect(&TokenKind::RBracket, "Expected ']' after array size")?;
        Ok(dim)
    }

    /// Skip a default argument up to a `,` or `)` at the current nesting
    /// level, without consuming the stopper.
    fn skip_default_argument(&mut self) -> Result<(), ParseError> {
        let mut depth: i32 = 0;
        while !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    if depth == 0 {
                        return Ok(());
                    }
                    depth -= 1;
                }
                TokenKind::Comma if depth == 0 => return Ok(()),
                _ => {}
            }
            self.advance();
        }
        Ok(())
    }

    /// Skip trailing declarator names after a record/enum body
    /// (`struct X { ... } a, *b`).
    pub(crate) fn skip_declarators(&mut self) -> Result<(), ParseError> {
        while matches!(
            self.peek_kind(),
            TokenKind::Ident(_) | TokenKind::Star | TokenKind::Comma | TokenKind::Amp
        ) {
            self.advance();
        }
        Ok(())
    }

    /// Parse a type: `[const|volatile]* base [const] [*]* [&]`.
    pub(crate) fn parse_type(&mut self) -> Result<TypeRef, ParseError> {
        let mut is_const = false;
        loop {
            if self.match_kind(&TokenKind::Const) {
                is_const = true;
            } else if self.match_kind(&TokenKind::Volatile) {
                // not modeled
            } else {
                break;
            }
        }

        let name = self.parse_base_name()?;
        if self.match_kind(&TokenKind::Const) {
            is_const = true;
        }

        let mut ty = TypeRef::new(name);
        ty.is_const = is_const;

        loop {
            if self.match_kind(&TokenKind::Star) {
                ty.pointer_depth += 1;
                // const applying to the pointer itself
                self.match_kind(&TokenKind::Const);
            } else if self.match_kind(&TokenKind::Amp) || self.match_kind(&TokenKind::AndAnd) {
                ty.is_reference = true;
            } else {
                break;
            }
        }

        Ok(ty)
    }

    /// Parse the base of a type: a builtin keyword combination
    /// (`unsigned long`), an elaborated name (`struct Point`), or a
    /// possibly qualified path (`std::vector<int>`).
    fn parse_base_name(&mut self) -> Result<String, ParseError> {
        let mut parts: Vec<&'static str> = Vec::new();
        loop {
            let kw = match self.peek_kind() {
                TokenKind::Void => "void",
                TokenKind::Bool => "bool",
                TokenKind::Char => "char",
                TokenKind::Short => "short",
                TokenKind::Int => "int",
                TokenKind::Long => "long",
                TokenKind::Float => "float",
                TokenKind::Double => "double",
                TokenKind::Signed => "signed",
                TokenKind::Unsigned => "unsigned",
                _ => break,
            };
            parts.push(kw);
            self.advance();
        }
        if !parts.is_empty() {
            return Ok(parts.join(" "));
        }

        let elaborated = match self.peek_kind() {
            TokenKind::Struct => Some("struct"),
            TokenKind::Class => Some("class"),
            TokenKind::Union => Some("union"),
            TokenKind::Enum => Some("enum"),
            _ => None,
        };
        if let Some(kw) = elaborated {
            self.advance();
            let path = self.parse_type_path()?;
            return Ok(format!("{} {}", kw, path));
        }
        if self.match_kind(&TokenKind::Typename) {
            return self.parse_type_path();
        }
        if matches!(
            self.peek_kind(),
            TokenKind::Ident(_) | TokenKind::ColonColon
        ) {
            return self.parse_type_path();
        }

        Err(self.error(format!("Expected type, found {}", self.peek_kind())))
    }

    /// Parse a possibly qualified name with template arguments, returning
    /// it as written (`std::vector<int>`).
    fn parse_type_path(&mut self) -> Result<String, ParseError> {
        let mut name = String::new();
        if self.match_kind(&TokenKind::ColonColon) {
            name.push_str("::");
        }
        loop {
            name.push_str(&self.expect_identifier()?);
            if self.check(&TokenKind::Lt) {
                let args = self.capture_angles()?;
                name.push_str(self.slice(args));
            }
            if self.check(&TokenKind::ColonColon)
                && matches!(self.kind_ahead(1), Some(TokenKind::Ident(_)))
            {
                self.advance();
                name.push_str("::");
            } else {
                break;
            }
        }
        Ok(name)
    }
}

/// Last identifier in a token slice, used to pull the name out of
/// function-pointer declarators like `(*callback)`.
fn extract_last_ident(text: &str) -> Option<String> {
    let mut best = None;
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            current.push(ch);
        } else {
            if !current.is_empty() {
                best = Some(std::mem::take(&mut current));
            }
            current.clear();
        }
    }
    if !current.is_empty() {
        best = Some(current);
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Language;

    fn parse(source: &str, language: Language) -> FileModel {
        let mut parser = Parser::new(source, language).unwrap();
        parser.parse_unit("test.src").unwrap()
    }

    #[test]
    fn test_typedef_struct_takes_alias_name() {
        let unit = parse("typedef struct { int x; int y; } Point;", Language::C);

        let point = unit.record("Point").expect("Point not found");
        assert_eq!(point.kind, RecordKind::Struct);
        let fields: Vec<_> = point.fields().collect();
        assert_eq!(fields.len(), 2);
        assert!(unit.aliases.is_empty());
    }

    #[test]
    fn test_typedef_enum() {
        let unit = parse("typedef enum { RED, GREEN, BLUE } Color;", Language::C);

        let color = unit.enumeration("Color").expect("Color not found");
        let names: Vec<_> = color.enumerators.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["RED", "GREEN", "BLUE"]);
        assert_eq!(color.enumerators[2].value, Some(2));
    }

    #[test]
    fn test_typedef_with_tag_records_alias() {
        let unit = parse("typedef struct node { int v; } Node;", Language::C);

        assert!(unit.record("node").is_some());
        assert_eq!(unit.aliases.len(), 1);
        assert_eq!(unit.aliases[0].name, "Node");
        assert_eq!(unit.aliases[0].target, "struct node");
    }

    #[test]
    fn test_plain_typedef() {
        let unit = parse("typedef unsigned long size_type;", Language::C);

        assert_eq!(unit.aliases[0].name, "size_type");
        assert_eq!(unit.aliases[0].target, "unsigned long");
    }

    #[test]
    fn test_function_pointer_typedef() {
        let unit = parse("typedef int (*callback)(int, int);", Language::C);

        assert_eq!(unit.aliases[0].name, "callback");
        assert!(unit.aliases[0].target.contains("(*callback)"));
    }

    #[test]
    fn test_template_function() {
        let unit = parse("template<typename T>\nT max(T a, T b) { return (a > b) ? a : b; }", Language::Cpp);

        let max = unit.function("max").expect("max not found");
        assert!(max.template.as_ref().unwrap().contains("typename T"));
        assert!(max.has_body);
        assert_eq!(max.signature.params.len(), 2);
        assert_eq!(max.signature.return_type.as_ref().unwrap().name, "T");
    }

    #[test]
    fn test_namespace_flattening() {
        let unit = parse(
            "namespace geo {\nstruct Point { double x; double y; };\nint area();\n}",
            Language::Cpp,
        );

        assert!(unit.record("Point").is_some());
        assert!(unit.function("area").is_some());
        assert!(unit
            .directives
            .iter()
            .any(|d| d.text == "namespace geo"));
    }

    #[test]
    fn test_using_alias() {
        let unit = parse("using Meters = double;", Language::Cpp);

        assert_eq!(unit.aliases[0].name, "Meters");
        assert_eq!(unit.aliases[0].target, "double");
        assert_eq!(unit.aliases[0].kind, AliasKind::Using);
    }

    #[test]
    fn test_extern_c_block() {
        let unit = parse(
            "extern \"C\" {\nint add(int a, int b);\n}",
            Language::Cpp,
        );

        assert_eq!(unit.functions.len(), 1);
        assert_eq!(unit.functions[0].name, "add");
    }

    #[test]
    fn test_qualified_member_definition() {
        let unit = parse(
            "double Circle::area() const { return 0.0; }",
            Language::Cpp,
        );

        assert_eq!(unit.functions[0].name, "Circle::area");
        assert!(unit.functions[0].has_body);
    }

    #[test]
    fn test_qualified_type_path() {
        let unit = parse("std::string greeting();", Language::Cpp);

        assert_eq!(
            unit.functions[0].signature.return_type.as_ref().unwrap().name,
            "std::string"
        );
    }

    #[test]
    fn test_template_args_in_type() {
        let unit = parse("std::vector<int> collect();", Language::Cpp);

        assert_eq!(
            unit.functions[0].signature.return_type.as_ref().unwrap().name,
            "std::vector<int>"
        );
    }
}
