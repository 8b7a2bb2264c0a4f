//! cvifier: turns a plain-markup CV into polished HTML or LaTeX.
//!
//! The CV is parsed by an external markup toolkit, reshaped here (contact
//! sections collapsed into a templated header, excluded sections dropped,
//! per-writer tweaks applied) and rendered back by the same toolkit. Per-writer
//! behaviour comes from `<writer>.cvsettings` files in the section format
//! described in [`sections`].

pub mod config;
pub mod contact;
pub mod doctree;
pub mod errors;
pub mod markup;
pub mod pipeline;
pub mod sections;
pub mod special;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use doctree::{Document, Element, Node};
pub use errors::{CvError, Result};
pub use markup::{MarkupParser, Renderer, Writer};
pub use pipeline::{ConvertOptions, Cvifier, DocumentSource, OutputTarget};
pub use sections::{parse_section_text, parse_sections, SectionMap, SectionSource};
pub use special::SpecialSettings;
