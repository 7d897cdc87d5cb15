//! # Introduction
//!
//! `outliner` extracts a normalized declaration model from C and C++
//! translation units: functions with signatures, structs and classes with
//! their fields and member functions partitioned by access region, enums
//! with computed constant values, and type aliases. It parses the
//! declaration level only; function bodies are captured as opaque text,
//! never executed or analyzed.
//!
//! ## Extraction pipeline
//!
//! ```text
//! Source → Lexer → Tokens → Declaration Parser → FileModel → Report
//! ```
//!
//! 1. [`parser::lexer`] — tokenizes the source, capturing preprocessor
//!    directives and doc comments along the way.
//! 2. [`parser`] — recursive descent over the token stream; recognizes
//!    top-level declarations and class access regions, skipping bodies
//!    with balanced-brace scanning.
//! 3. [`model`] — the immutable declaration tree, one [`model::FileModel`]
//!    per translation unit, serializable with serde.
//! 4. [`report`] — renders models as a markdown outline (full text,
//!    signatures-only, or public-interface-only).
//! 5. [`scan`] — walks a directory, parses every supported file, and
//!    assembles the report.
//!
//! ## Quick start
//!
//! ```
//! use outliner::{CParser, LanguageParser, Result};
//! use std::path::Path;
//!
//! fn main() -> Result<()> {
//!     let parser = CParser::new();
//!     let model = parser.parse_source("int add(int a, int b);", Path::new("add.c"))?;
//!
//!     assert_eq!(model.functions[0].name, "add");
//!     assert!(!model.functions[0].has_body);
//!     Ok(())
//! }
//! ```
//!
//! Directory-level reports go through the [`Outline`] trait:
//!
//! ```no_run
//! use outliner::{Outline, OutlineConfig, Outliner, ReportMode, Result};
//!
//! fn main() -> Result<()> {
//!     let outliner = Outliner::new();
//!     let config = OutlineConfig::new("src", ReportMode::Signatures, vec![]);
//!     let report = outliner.generate(&config)?;
//!     println!("{}", report);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod scan;

pub use error::{Error, Result};
pub use model::{
    Access, AliasDecl, AliasKind, Directive, DirectiveKind, EnumDecl, Enumerator, FieldDecl,
    FileModel, FunctionDecl, Language, Member, MethodDecl, MethodKind, Param, RecordDecl,
    RecordKind, Signature, SourceLocation, Span, TypeRef,
};
pub use parser::{CParser, CppParser, LanguageParser};
pub use report::{Render, ReportMode};
pub use scan::{Outline, OutlineConfig, Outliner, ReportFormat};
