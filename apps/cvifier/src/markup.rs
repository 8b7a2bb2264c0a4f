//! Collaborator seams: the external markup parser and tree renderer.
//!
//! cvifier never parses reStructuredText or renders trees itself. Callers plug a
//! toolkit in through [`MarkupParser`] and [`Renderer`]; collaborator failures
//! are reported as `CvError::External`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::doctree::Document;
use crate::errors::Result;
use crate::sections::SectionMap;

/// Extension of per-writer settings files: `<writer>.cvsettings`.
pub const SETTINGS_EXTENSION: &str = "cvsettings";

// ────────────────────────────────────────────────────────────────────────────
// Writer identifiers
// ────────────────────────────────────────────────────────────────────────────

/// A target output format, keyed by the renderer's writer name.
///
/// Only `Html` and `Latex` get body extraction and the writer-specific special
/// settings; any other writer is passed to the renderer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Writer {
    Html,
    Latex,
    Other(String),
}

impl Writer {
    /// Maps a writer name to a `Writer`. Names are case-insensitive.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "html" => Writer::Html,
            "latex" => Writer::Latex,
            other => Writer::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Writer::Html => "html",
            Writer::Latex => "latex",
            Writer::Other(name) => name,
        }
    }

    /// Default settings file name for this writer, e.g. `latex.cvsettings`.
    pub fn settings_file_name(&self) -> String {
        format!("{}.{SETTINGS_EXTENSION}", self.name())
    }
}

impl fmt::Display for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Writer {
    fn from(name: String) -> Self {
        Writer::from_name(&name)
    }
}

impl From<Writer> for String {
    fn from(writer: Writer) -> Self {
        writer.name().to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Collaborator traits
// ────────────────────────────────────────────────────────────────────────────

/// Markup text → document tree. Implemented by the external toolkit.
pub trait MarkupParser {
    fn parse(&self, text: &str) -> Result<Document>;
}

/// Document tree → writer output.
///
/// `overrides` holds the non-reserved entries of the writer's settings file,
/// in file order, to be applied as the renderer's settings overrides. The
/// returned string is the complete rendered document; cvifier extracts the
/// body itself.
pub trait Renderer {
    fn render(&self, document: &Document, writer: &Writer, overrides: &SectionMap)
        -> Result<String>;
}

impl<T: MarkupParser + ?Sized> MarkupParser for &T {
    fn parse(&self, text: &str) -> Result<Document> {
        (**self).parse(text)
    }
}

impl<T: Renderer + ?Sized> Renderer for &T {
    fn render(
        &self,
        document: &Document,
        writer: &Writer,
        overrides: &SectionMap,
    ) -> Result<String> {
        (**self).render(document, writer, overrides)
    }
}
