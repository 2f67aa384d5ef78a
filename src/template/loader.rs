//! Template file loading
//!
//! This module provides `TemplateLoader` - a utility for reading template documents from files
//! or strings (JSON or YAML) and turning them into templates or ready-made builders. Dynamic
//! leaves are written as [directives](super::directives).
//!
//! # Example
//!
//! ```rust,ignore
//! use tidal::template::loader::TemplateLoader;
//! use tidal::Options;
//!
//! let builder = TemplateLoader::from_path("ticker.yaml")?.into_builder(Options::new())?;
//! for snapshot in builder.build().take(5) {
//!     println!("{}", serde_json::to_string(&snapshot)?);
//! }
//! ```

use super::builder::{Builder, Options};
use super::directives::{interpret, DirectiveError};
use super::error::Error;
use super::leaf::Template;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while loading a template document
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON template: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML template: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Directive(#[from] DirectiveError),

    #[error(transparent)]
    Template(#[from] Error),
}

/// Document syntax of a template source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Guess the format from a file extension; anything but `.yaml`/`.yml` is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Format::Yaml
            }
            _ => Format::Json,
        }
    }
}

/// Template source text plus its format
#[derive(Debug, Clone)]
pub struct TemplateLoader {
    source: String,
    format: Format,
}

impl TemplateLoader {
    pub fn from_string(source: impl Into<String>, format: Format) -> Self {
        Self {
            source: source.into(),
            format,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_string(source, Format::from_path(path)))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn format(&self) -> Format {
        self.format
    }

    /// Parse the document and expand its directives
    pub fn load(&self) -> Result<Template, LoadError> {
        let json: serde_json::Value = match self.format {
            Format::Json => serde_json::from_str(&self.source)?,
            Format::Yaml => serde_yaml::from_str(&self.source)?,
        };
        let template = interpret(json)?;
        tracing::debug!(format = ?self.format, generators = template.has_generators(), "loaded template");
        Ok(template)
    }

    /// A builder whose template is this document. The document root must be an object.
    pub fn into_builder(self, options: Options) -> Result<Builder, LoadError> {
        let template = self.load()?;
        let mut builder = Builder::with_options(options);
        builder.add(template)?;
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path(Path::new("a.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.YML")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("noext")), Format::Json);
    }

    #[test]
    fn test_yaml_with_directives() {
        let source = "price:\n  $sequence: [1, 2]\nsymbol: ACME\n";
        let builder = TemplateLoader::from_string(source, Format::Yaml)
            .into_builder(Options::new())
            .unwrap();
        let snapshots: Vec<_> = builder.build().map(|s| s.to_json()).collect();
        assert_eq!(
            snapshots,
            vec![
                json!({"price": 1, "symbol": "ACME"}),
                json!({"price": 2, "symbol": "ACME"}),
            ]
        );
    }

    #[test]
    fn test_non_object_root_is_rejected() {
        let err = TemplateLoader::from_string("[1, 2]", Format::Json)
            .into_builder(Options::new())
            .unwrap_err();
        assert!(matches!(err, LoadError::Template(Error::IllegalArgument { .. })));
    }

    #[test]
    fn test_syntax_errors() {
        let err = TemplateLoader::from_string("{", Format::Json).load().unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
        let err = TemplateLoader::from_string("a: [", Format::Yaml).load().unwrap_err();
        assert!(matches!(err, LoadError::Yaml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = TemplateLoader::from_path("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().starts_with("failed to read /definitely/not/here.json"));
    }
}
