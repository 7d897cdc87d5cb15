//! Directory scanning and the outline facade
//!
//! [`Outliner`] walks a root path, parses every supported C/C++ file, and
//! assembles the per-file models into a single report. Files that fail to
//! parse are logged and skipped so one corrupt file does not abort a whole
//! tree; file order in the report is deterministic (sorted by path).

use crate::error::{Error, Result};
use crate::model::{language_of, FileModel, Language};
use crate::parser::{CParser, CppParser, LanguageParser};
use crate::report::{Render, ReportMode};
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Output format of a generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReportFormat {
    /// Markdown with per-file fenced code blocks.
    #[default]
    Markdown,
    /// The serialized declaration model.
    Json,
}

/// Configuration for generating an outline report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutlineConfig {
    /// Root file or directory to outline.
    pub root: PathBuf,
    /// How much of each declaration the report includes.
    pub mode: ReportMode,
    /// Output format.
    pub format: ReportFormat,
    /// Directory names to skip while walking.
    pub ignore_dirs: Vec<String>,
}

impl OutlineConfig {
    pub fn new(root: impl Into<PathBuf>, mode: ReportMode, ignore_dirs: Vec<String>) -> Self {
        Self {
            root: root.into(),
            mode,
            format: ReportFormat::Markdown,
            ignore_dirs,
        }
    }
}

/// Trait to generate an outline report for a path.
///
/// Implemented by [`Outliner`]; custom generators can implement it to
/// consume the same configuration.
pub trait Outline {
    /// Generate a report for the configured root.
    fn generate(&self, config: &OutlineConfig) -> Result<String>;
}

/// The outline generator: owns one parser per supported language.
#[derive(Debug, Default)]
pub struct Outliner {
    c_parser: CParser,
    cpp_parser: CppParser,
}

impl Outliner {
    pub fn new() -> Self {
        Self {
            c_parser: CParser::new(),
            cpp_parser: CppParser::new(),
        }
    }

    /// Parse a single file with the parser its extension selects. Returns
    /// `Ok(None)` for unsupported extensions.
    pub fn parse_path(&self, path: &Path) -> Result<Option<FileModel>> {
        match language_of(path) {
            Some(Language::C) => self.c_parser.parse_file(path).map(Some),
            Some(Language::Cpp) => self.cpp_parser.parse_file(path).map(Some),
            None => Ok(None),
        }
    }

    /// Collect models for every supported file under the configured root.
    /// A root that is itself a file must be a supported translation unit.
    pub fn collect(&self, config: &OutlineConfig) -> Result<Vec<FileModel>> {
        let root = &config.root;
        if !root.exists() {
            return Err(Error::PathNotFound(root.clone()));
        }

        if root.is_file() {
            return match self.parse_path(root)? {
                Some(model) => Ok(vec![model]),
                None => Err(Error::UnsupportedLanguage(root.display().to_string())),
            };
        }

        let mut models = Vec::new();
        for entry in WalkBuilder::new(root).build().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || self.is_ignored(path, &config.ignore_dirs) {
                continue;
            }
            debug!("parsing {}", path.display());
            match self.parse_path(path) {
                Ok(Some(model)) => models.push(model),
                Ok(None) => {}
                Err(err) => warn!("skipping {}: {}", path.display(), err),
            }
        }

        models.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(models)
    }

    fn is_ignored(&self, path: &Path, ignore_dirs: &[String]) -> bool {
        path.components().any(|c| match c {
            Component::Normal(name) => ignore_dirs
                .iter()
                .any(|dir| name.to_str() == Some(dir.as_str())),
            _ => false,
        })
    }

    fn render_markdown(&self, config: &OutlineConfig, models: &[FileModel]) -> Result<String> {
        let mut output = String::new();
        output.push_str("# Source Outline\n\n");

        for model in models {
            let relative = model
                .path
                .strip_prefix(&config.root)
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| model.path.display().to_string());

            output.push_str(&format!("## {}\n", relative));
            output.push_str(&format!("```{}\n", model.language.fence_tag()));
            let rendered = model.render(config.mode)?;
            output.push_str(&rendered);
            if !rendered.ends_with('\n') {
                output.push('\n');
            }
            output.push_str("```\n\n");
        }

        Ok(output)
    }
}

impl Outline for Outliner {
    fn generate(&self, config: &OutlineConfig) -> Result<String> {
        let models = self.collect(config)?;
        match config.format {
            ReportFormat::Markdown => self.render_markdown(config, &models),
            ReportFormat::Json => Ok(serde_json::to_string_pretty(&models)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root_is_an_error() {
        let outliner = Outliner::new();
        let config = OutlineConfig::new("does-not-exist", ReportMode::Signatures, vec![]);
        assert!(matches!(
            outliner.generate(&config),
            Err(Error::PathNotFound(_))
        ));
    }

    #[test]
    fn test_unsupported_single_file() {
        let outliner = Outliner::new();
        let config = OutlineConfig::new("Cargo.toml", ReportMode::Signatures, vec![]);
        assert!(matches!(
            outliner.generate(&config),
            Err(Error::UnsupportedLanguage(_))
        ));
    }

    #[test]
    fn test_ignore_dirs_filter() {
        let outliner = Outliner::new();
        assert!(outliner.is_ignored(
            Path::new("src/vendor/lib.c"),
            &["vendor".to_string()]
        ));
        assert!(!outliner.is_ignored(Path::new("src/lib.c"), &["vendor".to_string()]));
    }
}
