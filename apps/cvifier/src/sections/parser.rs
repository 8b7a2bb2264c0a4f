//! Section-format parser.
//!
//! The format is a flat list of `[name]` headers, each followed by free text:
//!
//! ```text
//! [name]
//! content here
//! more content
//!
//! [something:2]
//! morestuff *with rst*
//! ```
//!
//! Text before the first header is discarded, as is text under an empty `[]`
//! header, which closes the open section. With a comment marker configured,
//! everything from the first unescaped marker onward is dropped, and `\<marker>`
//! yields a literal marker.

use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use tracing::debug;

use crate::errors::{CvError, Result};
use crate::sections::map::SectionMap;

/// Where section-format text comes from. Chosen by the caller.
pub enum SectionSource<'a> {
    Path(&'a Path),
    Reader(&'a mut dyn Read),
    Lines(&'a [String]),
    Text(&'a str),
}

/// Parses section-format input into an ordered [`SectionMap`].
///
/// A repeated header keeps the section's original position and keeps appending
/// to the same body.
pub fn parse_sections(source: SectionSource<'_>, comment: Option<&str>) -> Result<SectionMap> {
    let comment = comment.filter(|marker| !marker.is_empty());

    match source {
        SectionSource::Path(path) => {
            let text = read_file(path)?;
            parse_lines(text.lines(), comment)
        }
        SectionSource::Reader(reader) => {
            let mut text = String::new();
            reader.read_to_string(&mut text)?;
            parse_lines(text.lines(), comment)
        }
        SectionSource::Lines(lines) => parse_lines(lines.iter().map(String::as_str), comment),
        SectionSource::Text(text) => parse_lines(text.lines(), comment),
    }
}

/// Shorthand for parsing in-memory text.
pub fn parse_section_text(text: &str, comment: Option<&str>) -> Result<SectionMap> {
    parse_sections(SectionSource::Text(text), comment)
}

pub(crate) fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CvError::MissingFile(path.to_path_buf()));
    }
    Ok(std::fs::read_to_string(path)?)
}

fn parse_lines<'l>(
    lines: impl Iterator<Item = &'l str>,
    comment: Option<&str>,
) -> Result<SectionMap> {
    let mut buffers: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut current: Option<String> = None;

    for (index, raw) in lines.enumerate() {
        let line = match comment {
            Some(marker) => match strip_comment(raw, marker) {
                Some(kept) => kept,
                None => continue,
            },
            None => raw.to_string(),
        };

        match split_header(&line) {
            Some((_, trailing)) if !trailing.trim().is_empty() => {
                return Err(CvError::Format {
                    line_number: index + 1,
                    line: raw.to_string(),
                });
            }
            Some(("", _)) => current = None,
            Some((name, _)) => {
                buffers.entry(name.to_string()).or_default();
                current = Some(name.to_string());
            }
            None => {
                if let Some(name) = &current {
                    buffers.entry(name.clone()).or_default().push(line);
                }
            }
        }
    }

    debug!("Parsed {} sections", buffers.len());

    Ok(buffers
        .into_iter()
        .map(|(name, lines)| (name, lines.join("\n").trim_end().to_string()))
        .collect())
}

/// Splits `[name]trailing` into `(name, trailing)`. The name ends at the first `]`.
fn split_header(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('[')?;
    let close = rest.find(']')?;
    Some((&rest[..close], &rest[close + 1..]))
}

/// Cuts `line` at the first marker not preceded by a backslash and unescapes
/// `\<marker>`. Returns `None` when a comment was cut and nothing is left.
fn strip_comment(line: &str, marker: &str) -> Option<String> {
    let mut search_from = 0;
    let mut cut = None;

    while let Some(offset) = line[search_from..].find(marker) {
        let idx = search_from + offset;
        if line[..idx].ends_with('\\') {
            search_from = idx + marker.len();
            continue;
        }
        cut = Some(idx);
        break;
    }

    let kept = match cut {
        Some(0) => return None,
        Some(idx) => &line[..idx],
        None => line,
    };
    Some(kept.replace(&format!("\\{marker}"), marker))
}
