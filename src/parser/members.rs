//! Class body and enumerator parsing
//!
//! This module implements the access-region tracking the C++ grammar
//! requires: a class body keeps a current access level, initialized from
//! the record keyword (`class` defaults to private, `struct` and `union`
//! to public) and updated on every `public:`/`protected:`/`private:`
//! label. Each member is stamped with the level in effect where it is
//! declared, so every member belongs to exactly one access region.
//!
//! Member bodies and constructor initializer lists are skipped with
//! balanced scanning, never parsed into statements.

use crate::model::{
    Access, Enumerator, FieldDecl, Member, MethodDecl, MethodKind, RecordKind, Signature, Span,
    TypeRef,
};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};
use tracing::debug;

impl Parser {
    /// Parse the members of a record body; the current token is the first
    /// one after `{`, and parsing stops at the matching `}` without
    /// consuming it. Nested record/enum definitions are flattened into the
    /// file model.
    pub(crate) fn parse_record_body(
        &mut self,
        unit: &mut crate::model::FileModel,
        record_name: &str,
        kind: RecordKind,
    ) -> Result<Vec<Member>, ParseError> {
        let mut members = Vec::new();
        let mut access = kind.default_access();

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            match self.peek_kind() {
                TokenKind::Public => {
                    self.advance();
                    self.expect(&TokenKind::Colon, "Expected ':' after access specifier")?;
                    access = Access::Public;
                }
                TokenKind::Protected => {
                    self.advance();
                    self.expect(&TokenKind::Colon, "Expected ':' after access specifier")?;
                    access = Access::Protected;
                }
                TokenKind::Private => {
                    self.advance();
                    self.expect(&TokenKind::Colon, "Expected ':' after access specifier")?;
                    access = Access::Private;
                }
                TokenKind::Friend => {
                    self.skip_to_semicolon()?;
                }
                TokenKind::Using | TokenKind::Typedef => {
                    debug!("skipping member alias at {}", self.current_location());
                    self.skip_to_semicolon()?;
                }
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::Struct | TokenKind::Class | TokenKind::Union
                    if self.record_body_ahead() =>
                {
                    let doc = self.peek_doc();
                    self.parse_record_or_type_use(unit, doc, None)?;
                }
                TokenKind::Enum if self.enum_body_ahead() => {
                    let doc = self.peek_doc();
                    self.parse_enum_or_type_use(unit, doc)?;
                }
                TokenKind::Template => {
                    debug!("skipping member template at {}", self.current_location());
                    self.advance();
                    self.capture_angles()?;
                    self.skip_to_semicolon()?;
                }
                _ => {
                    let parsed = self.parse_member(record_name, access)?;
                    members.extend(parsed);
                }
            }
        }

        Ok(members)
    }

    /// Parse one member declaration: a constructor, destructor, operator,
    /// method, or one-or-more comma-separated fields.
    fn parse_member(
        &mut self,
        record_name: &str,
        access: Access,
    ) -> Result<Vec<Member>, ParseError> {
        let doc = self.peek_doc();
        let start = self.token_start();
        let location = self.current_location();

        let mut is_virtual = false;
        let mut is_static = false;
        loop {
            if self.match_kind(&TokenKind::Virtual) {
                is_virtual = true;
            } else if self.match_kind(&TokenKind::Static) {
                is_static = true;
            } else if self.match_kind(&TokenKind::Inline) || self.match_kind(&TokenKind::Explicit)
            {
                // not modeled
            } else if self.match_ident("mutable") || self.match_ident("constexpr") {
                // contextual keywords, not modeled
            } else {
                break;
            }
        }

        // Destructor: ~Name()
        if self.match_kind(&TokenKind::Tilde) {
            let ident = self.expect_identifier()?;
            let method = self.finish_method(
                format!("~{}", ident),
                None,
                MethodKind::Destructor,
                access,
                is_virtual,
                is_static,
                doc,
                start,
                location,
            )?;
            return Ok(vec![Member::Method(method)]);
        }

        // Constructor: the record's own name followed by '('
        if self.check_ident(record_name) && matches!(self.kind_ahead(1), Some(TokenKind::LParen))
        {
            let name = self.expect_identifier()?;
            let method = self.finish_method(
                name,
                None,
                MethodKind::Constructor,
                access,
                is_virtual,
                is_static,
                doc,
                start,
                location,
            )?;
            return Ok(vec![Member::Method(method)]);
        }

        // Conversion operator: `operator bool()` carries no leading type
        if self.check(&TokenKind::Operator) {
            let name = self.capture_operator_name()?;
            let method = self.finish_method(
                name,
                None,
                MethodKind::Operator,
                access,
                is_virtual,
                is_static,
                doc,
                start,
                location,
            )?;
            return Ok(vec![Member::Method(method)]);
        }

        let ty = self.parse_type()?;

        if self.check(&TokenKind::Operator) {
            let name = self.capture_operator_name()?;
            let method = self.finish_method(
                name,
                Some(ty),
                MethodKind::Operator,
                access,
                is_virtual,
                is_static,
                doc,
                start,
                location,
            )?;
            return Ok(vec![Member::Method(method)]);
        }

        let name = self.expect_identifier()?;

        if self.check(&TokenKind::LParen) {
            let method = self.finish_method(
                name,
                Some(ty),
                MethodKind::Plain,
                access,
                is_virtual,
                is_static,
                doc,
                start,
                location,
            )?;
            return Ok(vec![Member::Method(method)]);
        }

        // Field declaration, possibly with several declarators:
        // `double width, height;`
        let mut fields: Vec<FieldDecl> = Vec::new();
        let mut current_name = name;
        let mut current_ty = ty.clone();

        loop {
            while self.match_kind(&TokenKind::LBracket) {
                let dim = self.finish_array_dim()?;
                current_ty = current_ty.with_array(dim);
            }
            if self.match_kind(&TokenKind::Colon) {
                // bit-field width
                while !matches!(
                    self.peek_kind(),
                    TokenKind::Comma | TokenKind::Semicolon | TokenKind::Eof
                ) {
                    self.advance();
                }
            }
            if self.match_kind(&TokenKind::Eq) {
                self.skip_member_initializer()?;
            } else if self.check(&TokenKind::LBrace) {
                self.skip_balanced_braces()?;
            }

            fields.push(FieldDecl {
                name: current_name.clone(),
                ty: current_ty.clone(),
                access,
                doc: doc.clone(),
                location,
                span: Span::new(start, start),
            });

            if self.match_kind(&TokenKind::Comma) {
                // later declarators re-derive pointer/reference shape from
                // the shared base type
                let mut next_ty = TypeRef::new(ty.name.clone());
                next_ty.is_const = ty.is_const;
                while self.match_kind(&TokenKind::Star) {
                    next_ty.pointer_depth += 1;
                }
                if self.match_kind(&TokenKind::Amp) {
                    next_ty.is_reference = true;
                }
                current_ty = next_ty;
                current_name = self.expect_identifier()?;
            } else {
                break;
            }
        }

        self.expect_semicolon("after field declaration")?;
        let end = self.prev_end();
        Ok(fields
            .into_iter()
            .map(|mut f| {
                f.span = Span::new(start, end);
                Member::Field(f)
            })
            .collect())
    }

    /// Parse from a member's `(` through its terminating `;` or body.
    #[allow(clippy::too_many_arguments)]
    fn finish_method(
        &mut self,
        name: String,
        return_type: Option<TypeRef>,
        kind: MethodKind,
        access: Access,
        is_virtual: bool,
        is_static: bool,
        doc: Option<String>,
        start: usize,
        location: crate::model::SourceLocation,
    ) -> Result<MethodDecl, ParseError> {
        self.expect(&TokenKind::LParen, "Expected '(' after member name")?;
        let (params, is_variadic) = self.parse_parameter_list()?;
        self.expect_rparen("after parameters")?;

        let mut is_const = false;
        let mut is_override = false;
        let mut is_pure = false;
        loop {
            if self.match_kind(&TokenKind::Const) {
                is_const = true;
            } else if self.match_ident("override") {
                is_override = true;
            } else if self.match_ident("final") {
                // not modeled
            } else if self.match_ident("noexcept") {
                if self.check(&TokenKind::LParen) {
                    self.skip_balanced_parens()?;
                }
            } else {
                break;
            }
        }

        if self.check(&TokenKind::Colon) {
            self.skip_ctor_initializers()?;
        }

        let (has_body, body, end) = if self.check(&TokenKind::LBrace) {
            let span = self.skip_balanced_braces()?;
            (true, Some(self.slice(span).to_string()), span.end)
        } else if self.match_kind(&TokenKind::Semicolon) {
            (false, None, self.prev_end())
        } else if self.match_kind(&TokenKind::Eq) {
            let pure = matches!(self.peek_kind(), TokenKind::IntLiteral(0));
            if pure {
                is_pure = true;
                self.advance();
            } else {
                // `= default` / `= delete`
                while !self.check(&TokenKind::Semicolon) && !self.is_at_end() {
                    self.advance();
                }
            }
            self.expect_semicolon("after member declaration")?;
            (false, None, self.prev_end())
        } else {
            return Err(self.error(format!(
                "Expected ';' or '{{' after member signature, found {}",
                self.peek_kind()
            )));
        };

        Ok(MethodDecl {
            name,
            signature: Signature {
                return_type,
                params,
                is_variadic,
            },
            access,
            kind,
            is_virtual,
            is_override,
            is_pure,
            is_const,
            is_static,
            has_body,
            body,
            doc,
            location,
            span: Span::new(start, end),
        })
    }

    /// Capture an `operator` name through the token before its parameter
    /// list (`operator+`, `operator bool`, `operator()`).
    fn capture_operator_name(&mut self) -> Result<String, ParseError> {
        let start = self.token_start();
        self.advance(); // operator
        if self.check(&TokenKind::LParen) && matches!(self.kind_ahead(1), Some(TokenKind::RParen))
        {
            self.advance();
            self.advance();
        } else {
            while !self.check(&TokenKind::LParen) && !self.is_at_end() {
                self.advance();
            }
        }
        Ok(self.source[start..self.prev_end()].to_string())
    }

    /// Skip a constructor initializer list; the current token is the `:`.
    /// Leaves the position at the body `{`.
    fn skip_ctor_initializers(&mut self) -> Result<(), ParseError> {
        self.advance(); // :
        loop {
            if !matches!(self.peek_kind(), TokenKind::Ident(_)) {
                break;
            }
            self.advance();
            while self.check(&TokenKind::ColonColon)
                && matches!(self.kind_ahead(1), Some(TokenKind::Ident(_)))
            {
                self.advance();
                self.advance();
            }
            if self.check(&TokenKind::Lt) {
                self.capture_angles()?;
            }
            if self.check(&TokenKind::LParen) {
                self.skip_balanced_parens()?;
            } else if self.check(&TokenKind::LBrace) {
                self.skip_balanced_braces()?;
            } else {
                break;
            }
            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }
        Ok(())
    }

    /// Skip a default member initializer up to the `,` or `;` ending the
    /// declarator, without consuming the stopper.
    fn skip_member_initializer(&mut self) -> Result<(), ParseError> {
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
                TokenKind::Comma | TokenKind::Semicolon if depth == 0 => return Ok(()),
                _ => {}
            }
            self.advance();
        }
        Ok(())
    }

    /// Parse an enumerator list; the current token is the first one after
    /// `{`. Effective values follow the C rule: implicit values continue
    /// from the previous enumerator, starting at zero.
    pub(crate) fn parse_enumerators(&mut self) -> Result<Vec<Enumerator>, ParseError> {
        let mut enumerators = Vec::new();
        let mut next_value: Option<i64> = Some(0);

        while !self.check(&TokenKind::RBrace) && !self.is_at_end() {
            let name = self.expect_identifier()?;

            let (value, is_explicit, raw) = if self.match_kind(&TokenKind::Eq) {
                let negative = self.match_kind(&TokenKind::Minus);
                let literal = match self.peek_kind() {
                    TokenKind::IntLiteral(n)
                        if matches!(
                            self.kind_ahead(1),
                            Some(TokenKind::Comma) | Some(TokenKind::RBrace)
                        ) =>
                    {
                        Some(*n)
                    }
                    _ => None,
                };
                match literal {
                    Some(n) => {
                        self.advance();
                        (Some(if negative { -n } else { n }), true, None)
                    }
                    None => {
                        let expr = self.capture_enum_expr(negative)?;
                        (None, true, Some(expr))
                    }
                }
            } else {
                (next_value, false, None)
            };

            next_value = value.map(|v| v + 1);
            enumerators.push(Enumerator {
                name,
                value,
                is_explicit,
                raw,
            });

            if !self.match_kind(&TokenKind::Comma) {
                break;
            }
        }

        Ok(enumerators)
    }

    /// Capture a non-literal enumerator initializer as raw text, up to the
    /// `,` or `}` ending it.
    fn capture_enum_expr(&mut self, negative: bool) -> Result<String, ParseError> {
        let mut span: Option<Span> = None;
        let mut depth: i32 = 0;

        while !self.is_at_end() {
            let stop = match self.peek_kind() {
                TokenKind::LParen => {
                    depth += 1;
                    false
                }
                TokenKind::RParen => {
                    if depth == 0 {
                        true
                    } else {
                        depth -= 1;
                        false
                    }
                }
                TokenKind::Comma | TokenKind::RBrace if depth == 0 => true,
                _ => false,
            };
            if stop {
                break;
            }
            let tok_span = self.peek().span;
            span = Some(match span {
                Some(s) => Span::new(s.start, tok_span.end),
                None => tok_span,
            });
            self.advance();
        }

        let text = span
            .map(|s| self.slice(s).to_string())
            .unwrap_or_default();
        Ok(if negative {
            format!("-{}", text)
        } else {
            text
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{Access, FileModel, Language, Member, MethodKind};
    use crate::parser::parse::Parser;

    fn parse(source: &str) -> FileModel {
        let mut parser = Parser::new(source, Language::Cpp).unwrap();
        parser.parse_unit("test.cpp").unwrap()
    }

    #[test]
    fn test_class_default_access_is_private() {
        let unit = parse("class Widget { int hidden; public: int shown; };");

        let widget = unit.record("Widget").unwrap();
        let fields: Vec<_> = widget.fields().collect();
        assert_eq!(fields[0].name, "hidden");
        assert_eq!(fields[0].access, Access::Private);
        assert_eq!(fields[1].name, "shown");
        assert_eq!(fields[1].access, Access::Public);
    }

    #[test]
    fn test_access_region_applies_until_next_specifier() {
        let unit = parse(
            "class C {\npublic:\n int a;\n int b;\nprotected:\n int c;\nprivate:\n int d;\n};",
        );

        let c = unit.record("C").unwrap();
        let access: Vec<_> = c.fields().map(|f| f.access).collect();
        assert_eq!(
            access,
            vec![
                Access::Public,
                Access::Public,
                Access::Protected,
                Access::Private
            ]
        );
    }

    #[test]
    fn test_constructor_and_destructor() {
        let unit = parse(
            "class Shape {\npublic:\n Shape(int n) : n_(n) {}\n virtual ~Shape() {}\nprivate:\n int n_;\n};",
        );

        let shape = unit.record("Shape").unwrap();
        let methods: Vec<_> = shape.methods().collect();
        assert_eq!(methods[0].kind, MethodKind::Constructor);
        assert!(methods[0].has_body);
        assert!(methods[0].signature.return_type.is_none());
        assert_eq!(methods[1].kind, MethodKind::Destructor);
        assert_eq!(methods[1].name, "~Shape");
        assert!(methods[1].is_virtual);
    }

    #[test]
    fn test_pure_virtual_and_override() {
        let unit = parse(
            "class Shape {\npublic:\n virtual double area() const = 0;\n};\nclass Circle : public Shape {\npublic:\n double area() const override { return 0.0; }\n};",
        );

        let shape = unit.record("Shape").unwrap();
        let area = shape.methods().next().unwrap();
        assert!(area.is_virtual);
        assert!(area.is_pure);
        assert!(area.is_const);
        assert!(!area.has_body);

        let circle = unit.record("Circle").unwrap();
        assert_eq!(circle.bases.as_deref(), Some("public Shape"));
        let area = circle.methods().next().unwrap();
        assert!(area.is_override);
        assert!(area.has_body);
    }

    #[test]
    fn test_comma_separated_declarators() {
        let unit = parse("class Rect { double width, height; };");

        let rect = unit.record("Rect").unwrap();
        let fields: Vec<_> = rect.fields().collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "width");
        assert_eq!(fields[1].name, "height");
        assert_eq!(fields[1].ty.name, "double");
    }

    #[test]
    fn test_member_interleaving_preserved() {
        let unit = parse(
            "class M {\npublic:\n int a;\n void f();\nprivate:\n int b;\n};",
        );

        let m = unit.record("M").unwrap();
        let kinds: Vec<_> = m
            .members
            .iter()
            .map(|mem| match mem {
                Member::Field(f) => format!("field {}", f.name),
                Member::Method(f) => format!("method {}", f.name),
            })
            .collect();
        assert_eq!(kinds, vec!["field a", "method f", "field b"]);
    }

    #[test]
    fn test_static_method_and_field_initializer() {
        let unit = parse("class S {\npublic:\n static int count() { return n; }\n int n = 3;\n};");

        let s = unit.record("S").unwrap();
        let count = s.methods().next().unwrap();
        assert!(count.is_static);
        let n = s.fields().next().unwrap();
        assert_eq!(n.name, "n");
    }

    #[test]
    fn test_scoped_enum_with_underlying_type() {
        let unit = parse("enum class Mode : int { Off, On };");

        let mode = unit.enumeration("Mode").unwrap();
        assert!(mode.is_scoped);
        assert_eq!(mode.underlying.as_deref(), Some("int"));
        assert_eq!(mode.enumerators[1].value, Some(1));
    }

    #[test]
    fn test_enum_expression_initializer() {
        let unit = parse("enum Flags { A = 1, B = A + 1, C };");

        let flags = unit.enumeration("Flags").unwrap();
        assert_eq!(flags.enumerators[0].value, Some(1));
        assert_eq!(flags.enumerators[1].value, None);
        assert_eq!(flags.enumerators[1].raw.as_deref(), Some("A + 1"));
        // value propagation stops after an undetermined enumerator
        assert_eq!(flags.enumerators[2].value, None);
    }
}
