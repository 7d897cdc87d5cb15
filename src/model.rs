//! Normalized declaration model
//!
//! The output of a parse pass: one [`FileModel`] per translation unit,
//! holding declarations in source order. Everything here is plain data,
//! constructed once by the parser and never mutated afterwards. The whole
//! tree serializes with serde so reports can be emitted as JSON.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Source location (1-based line and column) for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Byte range into the original source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Slice the original source covered by this span.
    pub fn slice<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Input languages the extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    C,
    Cpp,
}

impl Language {
    /// Language tag used for markdown code fences.
    pub fn fence_tag(&self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Cpp => "cpp",
        }
    }
}

/// Access level of a class member.
///
/// Every field or method of a record belongs to exactly one access region,
/// determined by the nearest preceding specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Public => write!(f, "public"),
            Access::Protected => write!(f, "protected"),
            Access::Private => write!(f, "private"),
        }
    }
}

/// Kind of composite type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordKind {
    Struct,
    Class,
    Union,
}

impl RecordKind {
    /// Default member access before any explicit specifier: private for
    /// `class`, public for `struct` and `union`.
    pub fn default_access(&self) -> Access {
        match self {
            RecordKind::Class => Access::Private,
            RecordKind::Struct | RecordKind::Union => Access::Public,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            RecordKind::Struct => "struct",
            RecordKind::Class => "class",
            RecordKind::Union => "union",
        }
    }
}

/// Kind of captured preprocessor directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectiveKind {
    Include,
    Define,
    Other,
}

/// A captured preprocessor line (or a namespace marker, which the parser
/// records here when flattening namespace contents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub text: String,
    pub location: SourceLocation,
}

/// Parsed type reference: a base name plus const/pointer/reference/array
/// shape. The base name is kept as written (`unsigned long`, `std::string`,
/// `struct Point`, `std::vector<int>`).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    pub is_const: bool,
    pub pointer_depth: usize, // 0 = not pointer, 1 = *, 2 = **, etc.
    pub is_reference: bool,
    pub array_dims: Vec<Option<usize>>, // None for an unsized dimension
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        TypeRef {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn with_pointer(mut self) -> Self {
        self.pointer_depth += 1;
        self
    }

    pub fn with_reference(mut self) -> Self {
        self.is_reference = true;
        self
    }

    pub fn with_array(mut self, size: Option<usize>) -> Self {
        self.array_dims.push(size);
        self
    }

    /// Render the type as C/C++ source text, without a declarator name.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.is_const {
            out.push_str("const ");
        }
        out.push_str(&self.name);
        for _ in 0..self.pointer_depth {
            out.push_str(" *");
        }
        if self.is_reference {
            out.push_str(" &");
        }
        for dim in &self.array_dims {
            match dim {
                Some(n) => out.push_str(&format!("[{}]", n)),
                None => out.push_str("[]"),
            }
        }
        out
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Function or method parameter. The name is optional; C and C++ both allow
/// unnamed parameters in declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeRef,
}

/// A function signature: return type, ordered parameters, variadic flag.
///
/// Constructors and destructors have no return type, hence the `Option`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub return_type: Option<TypeRef>,
    pub params: Vec<Param>,
    pub is_variadic: bool,
}

impl Signature {
    /// Render the parameter list, parenthesized.
    pub fn render_params(&self) -> String {
        let mut parts: Vec<String> = self
            .params
            .iter()
            .map(|p| match &p.name {
                Some(name) => format!("{} {}", p.ty.render(), name),
                None => p.ty.render(),
            })
            .collect();
        if self.is_variadic {
            parts.push("...".to_string());
        }
        format!("({})", parts.join(", "))
    }
}

/// A free function: prototype (`has_body == false`) or definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub name: String,
    pub signature: Signature,
    pub doc: Option<String>,
    /// Template header text (`template<typename T>`) when this is a
    /// function template.
    pub template: Option<String>,
    pub is_static: bool,
    pub is_inline: bool,
    pub is_extern: bool,
    pub has_body: bool,
    /// Body text including braces, present only for definitions.
    pub body: Option<String>,
    pub location: SourceLocation,
    pub span: Span,
}

/// A data member of a record, stamped with its access region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeRef,
    pub access: Access,
    pub doc: Option<String>,
    pub location: SourceLocation,
    pub span: Span,
}

/// What kind of member function this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    Plain,
    Constructor,
    Destructor,
    Operator,
}

/// A member function. The owning record is the one containing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub signature: Signature,
    pub access: Access,
    pub kind: MethodKind,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_pure: bool,
    pub is_const: bool,
    pub is_static: bool,
    pub has_body: bool,
    pub body: Option<String>,
    pub doc: Option<String>,
    pub location: SourceLocation,
    pub span: Span,
}

/// One record member, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "member")]
pub enum Member {
    Field(FieldDecl),
    Method(MethodDecl),
}

impl Member {
    pub fn access(&self) -> Access {
        match self {
            Member::Field(f) => f.access,
            Member::Method(m) => m.access,
        }
    }
}

/// A composite type: struct, class, or union.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDecl {
    pub name: String,
    pub kind: RecordKind,
    /// Base-class clause text (`public Shape`), without the leading colon.
    pub bases: Option<String>,
    /// Template header text when this is a class template.
    pub template: Option<String>,
    /// Members in declaration order, each stamped with an access region.
    pub members: Vec<Member>,
    pub doc: Option<String>,
    pub location: SourceLocation,
    pub span: Span,
}

impl RecordDecl {
    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Field(f) => Some(f),
            _ => None,
        })
    }

    /// Member functions in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            Member::Method(f) => Some(f),
            _ => None,
        })
    }

    /// Members of one access region, in declaration order.
    pub fn members_in(&self, access: Access) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(move |m| m.access() == access)
    }
}

/// A single enum constant.
///
/// `value` is the effective value under the C rule (first implicit value is
/// 0, each later implicit value is previous + 1). A non-literal initializer
/// leaves `value` undetermined and keeps the expression in `raw`; implicit
/// values after it stay undetermined until the next literal one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumerator {
    pub name: String,
    pub value: Option<i64>,
    pub is_explicit: bool,
    pub raw: Option<String>,
}

/// An enumeration declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    /// True for C++ `enum class`.
    pub is_scoped: bool,
    /// Underlying type text (`int` in `enum Color : int`).
    pub underlying: Option<String>,
    pub enumerators: Vec<Enumerator>,
    pub doc: Option<String>,
    pub location: SourceLocation,
    pub span: Span,
}

/// How a type alias was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AliasKind {
    Typedef,
    Using,
}

/// A type alias: `typedef` or C++ `using X = Y;`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDecl {
    pub name: String,
    /// The aliased type, as written.
    pub target: String,
    pub kind: AliasKind,
    pub doc: Option<String>,
    pub location: SourceLocation,
    pub span: Span,
}

/// One parsed translation unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileModel {
    pub path: PathBuf,
    pub language: Language,
    /// Comment block at the very start of the file, before any code or
    /// directive.
    pub doc: Option<String>,
    pub directives: Vec<Directive>,
    pub functions: Vec<FunctionDecl>,
    pub records: Vec<RecordDecl>,
    pub enums: Vec<EnumDecl>,
    pub aliases: Vec<AliasDecl>,
    /// Full source text; not serialized, the model is the payload.
    #[serde(skip)]
    pub source: String,
}

impl FileModel {
    pub fn new(path: impl Into<PathBuf>, language: Language, source: String) -> Self {
        FileModel {
            path: path.into(),
            language,
            doc: None,
            directives: Vec::new(),
            functions: Vec::new(),
            records: Vec::new(),
            enums: Vec::new(),
            aliases: Vec::new(),
            source,
        }
    }

    pub fn record(&self, name: &str) -> Option<&RecordDecl> {
        self.records.iter().find(|r| r.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn enumeration(&self, name: &str) -> Option<&EnumDecl> {
        self.enums.iter().find(|e| e.name == name)
    }
}

/// Detect the input language from a file extension.
pub fn language_of(path: &Path) -> Option<Language> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("c") | Some("h") => Some(Language::C),
        Some("cpp") | Some("cc") | Some("cxx") | Some("hpp") | Some("hh") => Some(Language::Cpp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_type_render() {
        let ty = TypeRef::new("char").with_const().with_pointer();
        assert_eq!(ty.render(), "const char *");

        let ty = TypeRef::new("int").with_array(Some(10));
        assert_eq!(ty.render(), "int[10]");

        let ty = TypeRef::new("std::string").with_reference();
        assert_eq!(ty.render(), "std::string &");
    }

    #[test]
    fn test_default_access() {
        assert_eq!(RecordKind::Class.default_access(), Access::Private);
        assert_eq!(RecordKind::Struct.default_access(), Access::Public);
        assert_eq!(RecordKind::Union.default_access(), Access::Public);
    }

    #[test]
    fn test_language_detection() {
        assert_eq!(language_of(&PathBuf::from("test.c")), Some(Language::C));
        assert_eq!(language_of(&PathBuf::from("test.h")), Some(Language::C));
        assert_eq!(language_of(&PathBuf::from("test.cpp")), Some(Language::Cpp));
        assert_eq!(language_of(&PathBuf::from("test.hpp")), Some(Language::Cpp));
        assert_eq!(language_of(&PathBuf::from("test.txt")), None);
        assert_eq!(language_of(&PathBuf::from("test")), None);
    }

    #[test]
    fn test_render_params() {
        let sig = Signature {
            return_type: Some(TypeRef::new("int")),
            params: vec![
                Param {
                    name: Some("fmt".to_string()),
                    ty: TypeRef::new("char").with_const().with_pointer(),
                },
                Param {
                    name: None,
                    ty: TypeRef::new("int"),
                },
            ],
            is_variadic: true,
        };
        assert_eq!(sig.render_params(), "(const char * fmt, int, ...)");
    }
}
