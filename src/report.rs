//! Report emitters
//!
//! Consumes the declaration model and renders it back out. Three modes:
//!
//! - [`ReportMode::Full`]: the complete source text of each file.
//! - [`ReportMode::Signatures`]: every declaration with bodies elided to
//!   `{ ... }`.
//! - [`ReportMode::Public`]: the public interface only (public members and
//!   non-static functions), with bodies elided.
//!
//! JSON output serializes the model itself and is independent of the mode.

use crate::error::Result;
use crate::model::{
    AliasDecl, AliasKind, EnumDecl, FieldDecl, FileModel, FunctionDecl, Member, MethodDecl,
    RecordDecl, TypeRef,
};
use serde::{Deserialize, Serialize};

/// How much of each declaration a report includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportMode {
    /// Complete source text.
    #[default]
    Full,
    /// All declarations, bodies elided.
    Signatures,
    /// Public interface only, bodies elided.
    Public,
}

/// Trait for rendering model nodes as C/C++-flavored outline text.
pub trait Render {
    /// Render this node according to the report mode.
    fn render(&self, mode: ReportMode) -> Result<String>;
}

impl Render for FileModel {
    fn render(&self, mode: ReportMode) -> Result<String> {
        if mode == ReportMode::Full {
            return Ok(self.source.clone());
        }

        let mut sections: Vec<String> = Vec::new();

        if !self.directives.is_empty() {
            let block = self
                .directives
                .iter()
                .map(|d| d.text.clone())
                .collect::<Vec<_>>()
                .join("\n");
            sections.push(block);
        }

        for alias in &self.aliases {
            sections.push(alias.render(mode)?);
        }
        for decl in &self.enums {
            sections.push(decl.render(mode)?);
        }
        for record in &self.records {
            sections.push(record.render(mode)?);
        }
        for function in &self.functions {
            if mode == ReportMode::Public && function.is_static {
                continue;
            }
            sections.push(function.render(mode)?);
        }

        Ok(sections.join("\n\n"))
    }
}

impl Render for FunctionDecl {
    fn render(&self, mode: ReportMode) -> Result<String> {
        let mut out = String::new();
        push_doc(&mut out, self.doc.as_deref(), "");
        if let Some(template) = &self.template {
            out.push_str(template);
            out.push('\n');
        }
        if self.is_static {
            out.push_str("static ");
        }
        if self.is_inline {
            out.push_str("inline ");
        }
        if let Some(ret) = &self.signature.return_type {
            out.push_str(&ret.render());
            out.push(' ');
        }
        out.push_str(&self.name);
        out.push_str(&self.signature.render_params());
        out.push_str(&render_tail(mode, self.has_body, self.body.as_deref()));
        Ok(out)
    }
}

impl Render for RecordDecl {
    fn render(&self, mode: ReportMode) -> Result<String> {
        let mut out = String::new();
        push_doc(&mut out, self.doc.as_deref(), "");
        if let Some(template) = &self.template {
            out.push_str(template);
            out.push('\n');
        }
        out.push_str(self.kind.keyword());
        if !self.name.is_empty() {
            out.push(' ');
            out.push_str(&self.name);
        }
        if let Some(bases) = &self.bases {
            out.push_str(" : ");
            out.push_str(bases);
        }
        out.push_str(" {\n");

        let mut current = self.kind.default_access();
        for member in &self.members {
            if mode == ReportMode::Public && member.access() != crate::model::Access::Public {
                continue;
            }
            if member.access() != current {
                current = member.access();
                out.push_str(&format!("{}:\n", current));
            }
            match member {
                Member::Field(field) => out.push_str(&field.render(mode)?),
                Member::Method(method) => out.push_str(&method.render(mode)?),
            }
            out.push('\n');
        }

        out.push_str("};");
        Ok(out)
    }
}

impl Render for FieldDecl {
    fn render(&self, _mode: ReportMode) -> Result<String> {
        let mut out = String::new();
        push_doc(&mut out, self.doc.as_deref(), "    ");
        out.push_str("    ");
        out.push_str(&declarator(&self.ty, &self.name));
        out.push(';');
        Ok(out)
    }
}

impl Render for MethodDecl {
    fn render(&self, mode: ReportMode) -> Result<String> {
        let mut out = String::new();
        push_doc(&mut out, self.doc.as_deref(), "    ");
        out.push_str("    ");
        if self.is_virtual {
            out.push_str("virtual ");
        }
        if self.is_static {
            out.push_str("static ");
        }
        if let Some(ret) = &self.signature.return_type {
            out.push_str(&ret.render());
            out.push(' ');
        }
        out.push_str(&self.name);
        out.push_str(&self.signature.render_params());
        if self.is_const {
            out.push_str(" const");
        }
        if self.is_override {
            out.push_str(" override");
        }
        if self.is_pure {
            out.push_str(" = 0;");
            return Ok(out);
        }
        out.push_str(&render_tail(mode, self.has_body, self.body.as_deref()));
        Ok(out)
    }
}

impl Render for EnumDecl {
    fn render(&self, _mode: ReportMode) -> Result<String> {
        let mut out = String::new();
        push_doc(&mut out, self.doc.as_deref(), "");
        out.push_str("enum ");
        if self.is_scoped {
            out.push_str("class ");
        }
        if !self.name.is_empty() {
            out.push_str(&self.name);
            out.push(' ');
        }
        if let Some(underlying) = &self.underlying {
            out.push_str(": ");
            out.push_str(underlying);
            out.push(' ');
        }
        out.push_str("{\n");
        for e in &self.enumerators {
            out.push_str("    ");
            out.push_str(&e.name);
            if e.is_explicit {
                match (&e.raw, e.value) {
                    (Some(raw), _) => out.push_str(&format!(" = {}", raw)),
                    (None, Some(v)) => out.push_str(&format!(" = {}", v)),
                    (None, None) => {}
                }
            }
            out.push_str(",\n");
        }
        out.push_str("};");
        Ok(out)
    }
}

impl Render for AliasDecl {
    fn render(&self, _mode: ReportMode) -> Result<String> {
        let mut out = String::new();
        push_doc(&mut out, self.doc.as_deref(), "");
        match self.kind {
            AliasKind::Typedef => {
                // Function-pointer targets already embed the alias name.
                if self.target.contains('(') {
                    out.push_str(&format!("typedef {};", self.target));
                } else {
                    out.push_str(&format!("typedef {} {};", self.target, self.name));
                }
            }
            AliasKind::Using => {
                out.push_str(&format!("using {} = {};", self.name, self.target));
            }
        }
        Ok(out)
    }
}

/// Body suffix for a function or method in the given mode.
fn render_tail(mode: ReportMode, has_body: bool, body: Option<&str>) -> String {
    if !has_body {
        return ";".to_string();
    }
    match mode {
        ReportMode::Full => match body {
            Some(text) => format!(" {}", text),
            None => " { ... }".to_string(),
        },
        ReportMode::Signatures | ReportMode::Public => " { ... }".to_string(),
    }
}

/// Render a declarator with array dimensions after the name, C style.
fn declarator(ty: &TypeRef, name: &str) -> String {
    if ty.array_dims.is_empty() {
        return format!("{} {}", ty.render(), name);
    }
    let mut base = ty.clone();
    let dims = std::mem::take(&mut base.array_dims);
    let mut out = format!("{} {}", base.render(), name);
    for dim in dims {
        match dim {
            Some(n) => out.push_str(&format!("[{}]", n)),
            None => out.push_str("[]"),
        }
    }
    out
}

fn push_doc(out: &mut String, doc: Option<&str>, indent: &str) {
    if let Some(doc) = doc {
        for line in doc.lines() {
            out.push_str(indent);
            out.push_str("// ");
            out.push_str(line);
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Language;
    use crate::parser::parse::Parser;

    fn parse(source: &str, language: Language) -> FileModel {
        let mut parser = Parser::new(source, language).unwrap();
        parser.parse_unit("test.src").unwrap()
    }

    #[test]
    fn test_signatures_elide_bodies() {
        let unit = parse("int add(int a, int b) { return a + b; }", Language::C);
        let out = unit.render(ReportMode::Signatures).unwrap();

        assert!(out.contains("int add(int a, int b) { ... }"));
        assert!(!out.contains("return a + b"));
    }

    #[test]
    fn test_full_mode_is_source() {
        let source = "int add(int a, int b) { return a + b; }";
        let unit = parse(source, Language::C);
        assert_eq!(unit.render(ReportMode::Full).unwrap(), source);
    }

    #[test]
    fn test_prototype_renders_semicolon() {
        let unit = parse("void print_hello(void);", Language::C);
        let out = unit.render(ReportMode::Signatures).unwrap();
        assert!(out.contains("void print_hello();"));
    }

    #[test]
    fn test_public_mode_hides_private_members() {
        let unit = parse(
            "class C {\npublic:\n int a;\nprivate:\n int secret;\n};",
            Language::Cpp,
        );
        let out = unit.render(ReportMode::Public).unwrap();

        assert!(out.contains("int a;"));
        assert!(!out.contains("secret"));
    }

    #[test]
    fn test_public_mode_hides_static_functions() {
        let unit = parse(
            "static int helper() { return 1; }\nint api() { return helper(); }",
            Language::C,
        );
        let out = unit.render(ReportMode::Public).unwrap();

        assert!(out.contains("int api()"));
        assert!(!out.contains("helper"));
    }

    #[test]
    fn test_access_labels_follow_regions() {
        let unit = parse(
            "class C {\npublic:\n int a;\nprivate:\n int b;\n};",
            Language::Cpp,
        );
        let out = unit.render(ReportMode::Signatures).unwrap();

        let public_pos = out.find("public:").unwrap();
        let private_pos = out.find("private:").unwrap();
        assert!(public_pos < private_pos);
    }

    #[test]
    fn test_pure_virtual_renders_eq_zero() {
        let unit = parse(
            "class Shape {\npublic:\n virtual double area() const = 0;\n};",
            Language::Cpp,
        );
        let out = unit.render(ReportMode::Signatures).unwrap();
        assert!(out.contains("virtual double area() const = 0;"));
    }

    #[test]
    fn test_directives_included() {
        let unit = parse("#include <stdio.h>\nint main() { return 0; }", Language::C);
        let out = unit.render(ReportMode::Signatures).unwrap();
        assert!(out.contains("#include <stdio.h>"));
    }

    #[test]
    fn test_enum_rendering() {
        let unit = parse("enum Color { RED, GREEN = 5 };", Language::C);
        let out = unit.render(ReportMode::Signatures).unwrap();
        assert!(out.contains("RED,"));
        assert!(out.contains("GREEN = 5,"));
    }

    #[test]
    fn test_typedef_rendering() {
        let unit = parse("typedef unsigned long size_type;", Language::C);
        let out = unit.render(ReportMode::Signatures).unwrap();
        assert!(out.contains("typedef unsigned long size_type;"));
    }
}
