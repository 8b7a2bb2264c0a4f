//! CV conversion: orchestrates the full pipeline.
//!
//! Flow: parse → load settings → pop special settings → substitute contact
//!       info → exclude sections → tree pass → render → extract body →
//!       rewrite rules → emit.
//!
//! The parser and renderer are external collaborators; everything between
//! "parsed tree" and "final text" happens here.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::contact::build_contact_markup;
use crate::doctree::{Document, Element, Node};
use crate::errors::Result;
use crate::markup::{MarkupParser, Renderer, Writer};
use crate::sections::parser::read_file;
use crate::sections::{parse_sections, SectionMap, SectionSource};
use crate::special::{
    apply_rewrite_rules, apply_tree_settings, extract_body, rewrite_rules, SpecialSettings,
};

// ────────────────────────────────────────────────────────────────────────────
// Inputs and outputs
// ────────────────────────────────────────────────────────────────────────────

/// The CV to convert. A pre-parsed tree skips the markup parser.
pub enum DocumentSource<'a> {
    Path(&'a Path),
    Reader(&'a mut dyn Read),
    Text(&'a str),
    Tree(Document),
}

/// Where the final text is written, in addition to being returned.
pub enum OutputTarget<'a> {
    Path(&'a Path),
    Writer(&'a mut dyn Write),
}

/// Per-run options.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub writer: Writer,
    /// Explicit settings file. When unset, `<settings_dir>/<writer>.cvsettings`.
    pub settings_path: Option<PathBuf>,
    pub settings_dir: PathBuf,
    /// Comment marker for the settings file.
    pub comment_marker: Option<String>,
}

impl ConvertOptions {
    pub fn new(writer: Writer) -> Self {
        ConvertOptions {
            writer,
            ..ConvertOptions::from_config(&Config::default())
        }
    }

    pub fn from_config(config: &Config) -> Self {
        ConvertOptions {
            writer: config.default_writer.clone(),
            settings_path: None,
            settings_dir: config.settings_dir.clone(),
            comment_marker: config.comment_marker.clone(),
        }
    }

    pub fn with_writer(mut self, writer: Writer) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn with_settings_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings_dir = dir.into();
        self
    }

    /// The settings file this run reads.
    pub fn settings_file(&self) -> PathBuf {
        self.settings_path
            .clone()
            .unwrap_or_else(|| self.settings_dir.join(self.writer.settings_file_name()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Converter
// ────────────────────────────────────────────────────────────────────────────

/// Converts CVs with a pluggable markup parser and renderer.
pub struct Cvifier<P, R> {
    parser: P,
    renderer: R,
}

impl<P: MarkupParser, R: Renderer> Cvifier<P, R> {
    pub fn new(parser: P, renderer: R) -> Self {
        Cvifier { parser, renderer }
    }

    /// Runs the full pipeline and returns the final text.
    ///
    /// Steps:
    /// 1. Parse the CV (or take the given tree)
    /// 2. Load `<writer>.cvsettings` (missing file → no settings)
    /// 3. Pop the reserved keys into `SpecialSettings`
    /// 4. Replace contact sections with the rendered contact template
    /// 5. Drop excluded sections
    /// 6. Tree pass, then render with the remaining settings as overrides
    /// 7. Extract the body and apply the rewrite rules
    /// 8. Write to `output` if given
    pub fn convert(
        &self,
        source: DocumentSource<'_>,
        options: &ConvertOptions,
        output: Option<OutputTarget<'_>>,
    ) -> Result<String> {
        let writer = &options.writer;
        info!("Converting CV with writer {writer}");

        // Step 1: Parse
        let mut document = self.parse_document(source)?;

        // Step 2: Load settings
        let mut settings =
            load_settings(&options.settings_file(), options.comment_marker.as_deref())?;

        // Step 3: Special settings
        let special = SpecialSettings::extract(&mut settings, writer)?;

        // Step 4: Contact info
        if let Some(template) = &special.contact_template {
            let markup = build_contact_markup(
                &mut document,
                template,
                writer,
                &special.contact_block_left,
                &special.contact_block_right,
            )?;
            document.insert(0, Element::raw(writer.name(), markup));
        }

        // Step 5: Section exclusion
        if !special.exclude_sections.is_empty() {
            let removed = exclude_sections(&mut document, &special.exclude_sections);
            info!("Excluded {removed} sections");
        }

        // Step 6: Render
        apply_tree_settings(&mut document, &special, writer);
        debug!("Rendering with {} setting overrides", settings.len());
        let rendered = self.renderer.render(&document, writer, &settings)?;

        // Step 7: Post-process
        let body = extract_body(&rendered, writer)?;
        let result = apply_rewrite_rules(&body, &rewrite_rules(&special))?;

        // Step 8: Emit
        if let Some(target) = output {
            emit(target, &result)?;
        }

        info!("Converted CV: {} bytes of {writer} output", result.len());
        Ok(result)
    }

    /// Renders markup text with `writer` and returns only the body, without any
    /// settings or CV-specific processing.
    pub fn write_content(&self, text: &str, writer: &Writer) -> Result<String> {
        let document = self.parser.parse(text)?;
        let rendered = self.renderer.render(&document, writer, &SectionMap::new())?;
        extract_body(&rendered, writer)
    }

    fn parse_document(&self, source: DocumentSource<'_>) -> Result<Document> {
        match source {
            DocumentSource::Path(path) => {
                let text = read_file(path)?;
                self.parser.parse(&text)
            }
            DocumentSource::Reader(reader) => {
                let mut text = String::new();
                reader.read_to_string(&mut text)?;
                self.parser.parse(&text)
            }
            DocumentSource::Text(text) => self.parser.parse(text),
            DocumentSource::Tree(document) => Ok(document),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline steps
// ────────────────────────────────────────────────────────────────────────────

/// Reads a settings file. A missing file means no settings.
pub fn load_settings(path: &Path, comment: Option<&str>) -> Result<SectionMap> {
    if !path.exists() {
        warn!("Settings file {} not found; using no settings", path.display());
        return Ok(SectionMap::new());
    }
    let settings = parse_sections(SectionSource::Path(path), comment)?;
    info!("Loaded {} settings from {}", settings.len(), path.display());
    Ok(settings)
}

/// Removes every top-level section whose first child (its title) reads as one
/// of `names`. Returns how many were removed.
pub fn exclude_sections<S: AsRef<str>>(document: &mut Document, names: &[S]) -> usize {
    let removed = document.remove_sections_where(|section| {
        section
            .children
            .first()
            .map(Node::astext)
            .is_some_and(|title| names.iter().any(|name| name.as_ref().trim() == title.trim()))
    });
    removed.len()
}

fn emit(target: OutputTarget<'_>, text: &str) -> Result<()> {
    match target {
        OutputTarget::Path(path) => {
            std::fs::write(path, text)?;
            info!("Wrote output to {}", path.display());
        }
        OutputTarget::Writer(out) => {
            out.write_all(text.as_bytes())?;
            out.flush()?;
        }
    }
    Ok(())
}
