//! Contact block formatter. Lays contact fields out as a two-column table in
//! writer-native markup.
//!
//! Field specs:
//! - `[address]` → the value alone
//! - `phone`     → `<label>Phone:</label>~<value>` with the label italicised
//!
//! Multi-line values continue on extra rows of the same column; only the first
//! line is labelled. Columns are zipped row by row and the shorter one is padded
//! with empty cells. Only rows are emitted; the table environment itself belongs
//! to the contact template.

use tracing::warn;

use crate::contact::extractor::ContactFields;
use crate::errors::{CvError, Result};
use crate::markup::Writer;

/// Writer-specific pieces of the table markup.
struct BlockTokens {
    label_open: &'static str,
    label_close: &'static str,
    row_open: &'static str,
    cell_separator: &'static str,
    row_close: &'static str,
}

const HTML_TOKENS: BlockTokens = BlockTokens {
    label_open: "<i>",
    label_close: "</i>",
    row_open: "<tr><td>",
    cell_separator: "</td><td>",
    row_close: "</td></tr>",
};

const LATEX_TOKENS: BlockTokens = BlockTokens {
    label_open: "\\textit{",
    label_close: "}",
    row_open: "",
    cell_separator: " & ",
    row_close: " \\\\",
};

/// Non-breaking space between a label and its value.
const LABEL_SEPARATOR: &str = "~";

fn tokens_for(writer: &Writer) -> Result<&'static BlockTokens> {
    match writer {
        Writer::Html => Ok(&HTML_TOKENS),
        Writer::Latex => Ok(&LATEX_TOKENS),
        Writer::Other(name) => Err(CvError::UnsupportedWriter(name.clone())),
    }
}

/// Formats `fields` into table rows for `writer`, with `left` and `right`
/// listing the field specs of each column.
pub fn format_contact_block<S: AsRef<str>>(
    fields: &ContactFields,
    writer: &Writer,
    left: &[S],
    right: &[S],
) -> Result<String> {
    let tokens = tokens_for(writer)?;

    let left_lines = column_lines(fields, left, tokens);
    let right_lines = column_lines(fields, right, tokens);
    let row_count = left_lines.len().max(right_lines.len());

    let rows: Vec<String> = (0..row_count)
        .map(|i| {
            let l = left_lines.get(i).map(String::as_str).unwrap_or("");
            let r = right_lines.get(i).map(String::as_str).unwrap_or("");
            format!(
                "{}{l}{}{r}{}",
                tokens.row_open, tokens.cell_separator, tokens.row_close
            )
        })
        .collect();

    Ok(rows.join("\n"))
}

fn column_lines<S: AsRef<str>>(
    fields: &ContactFields,
    specs: &[S],
    tokens: &BlockTokens,
) -> Vec<String> {
    let mut lines = Vec::new();

    for spec in specs {
        let spec = spec.as_ref().trim();
        let (key, labelled) = match spec.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            Some(inner) => (inner, false),
            None => (spec, true),
        };

        let Some(value) = fields.get(&key.to_lowercase()) else {
            warn!("Contact block references field '{key}' which the CV does not define; skipping");
            continue;
        };

        let mut value_lines = value.lines();
        let first = value_lines.next().unwrap_or("");
        if labelled {
            lines.push(format!(
                "{}{}:{}{LABEL_SEPARATOR}{first}",
                tokens.label_open,
                capitalize(key),
                tokens.label_close
            ));
        } else {
            lines.push(first.to_string());
        }
        lines.extend(value_lines.map(str::to_string));
    }

    lines
}

/// Upper-cases the first character and lower-cases the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
