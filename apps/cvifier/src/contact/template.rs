//! Contact-info templates.
//!
//! Plain syntax follows format-string rules: `{field}` is a placeholder and
//! `{{` / `}}` are literal braces. The escaped syntax suits LaTeX, where braces
//! are everywhere: bare braces are literal and `\{field\}` marks a placeholder.
//!
//! A placeholder may carry the `!s` conversion and a string format spec,
//! `{field!s:[[fill]align][width][.precision][s]}`, e.g. `{name:>20}` or
//! `{email:.10}`. Align is one of `<` (default), `>` or `^`.

use indexmap::IndexMap;
use serde::Serialize;

use crate::errors::{CvError, Result};

/// A contact template, normalised to plain syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContactTemplate {
    source: String,
}

impl ContactTemplate {
    pub fn plain(text: impl Into<String>) -> Self {
        ContactTemplate {
            source: text.into(),
        }
    }

    /// Builds a template from escaped-brace syntax by doubling every brace and
    /// then turning the escaped ones back into placeholder braces.
    pub fn escaped(text: &str) -> Self {
        let source = text
            .replace('{', "{{")
            .replace('}', "}}")
            .replace("\\{{", "{")
            .replace("\\}}", "}");
        ContactTemplate { source }
    }

    /// The template in plain syntax.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of appearance (duplicates included).
    pub fn placeholders(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for segment in self.segments()? {
            if let Segment::Placeholder(field) = segment {
                names.push(field.name.to_string());
            }
        }
        Ok(names)
    }

    /// True when the template uses `{name}` anywhere.
    pub fn references(&self, name: &str) -> Result<bool> {
        Ok(self.placeholders()?.iter().any(|p| p == name))
    }

    /// Substitutes every placeholder. An unknown placeholder is an error.
    pub fn render(&self, values: &IndexMap<String, String>) -> Result<String> {
        let mut out = String::with_capacity(self.source.len());
        for segment in self.segments()? {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Brace(c) => out.push(c),
                Segment::Placeholder(field) => match values.get(field.name) {
                    Some(value) => out.push_str(&apply_spec(value, field.spec)?),
                    None => {
                        return Err(CvError::Template(format!(
                            "template references unknown field '{}'",
                            field.name
                        )))
                    }
                },
            }
        }
        Ok(out)
    }

    fn segments(&self) -> Result<Vec<Segment<'_>>> {
        let src = self.source.as_str();
        let bytes = src.as_bytes();
        let mut segments = Vec::new();
        let mut literal_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'{' | b'}' if bytes.get(i + 1) == Some(&bytes[i]) => {
                    segments.push(Segment::Literal(&src[literal_start..i]));
                    segments.push(Segment::Brace(bytes[i] as char));
                    i += 2;
                    literal_start = i;
                }
                b'{' => {
                    let close = src[i + 1..]
                        .find('}')
                        .map(|offset| i + 1 + offset)
                        .ok_or_else(|| CvError::Template(format!("unclosed '{{' at byte {i}")))?;
                    let field = parse_field(&src[i + 1..close]).ok_or_else(|| {
                        CvError::Template(format!("invalid placeholder '{}'", &src[i..=close]))
                    })?;
                    segments.push(Segment::Literal(&src[literal_start..i]));
                    segments.push(Segment::Placeholder(field));
                    i = close + 1;
                    literal_start = i;
                }
                b'}' => {
                    return Err(CvError::Template(format!(
                        "single '}}' encountered at byte {i}"
                    )))
                }
                _ => i += 1,
            }
        }
        segments.push(Segment::Literal(&src[literal_start..]));
        Ok(segments)
    }
}

enum Segment<'a> {
    Literal(&'a str),
    Brace(char),
    Placeholder(Field<'a>),
}

/// `name[!conversion][:spec]` inside a placeholder.
struct Field<'a> {
    name: &'a str,
    spec: &'a str,
}

fn parse_field(inner: &str) -> Option<Field<'_>> {
    let (head, spec) = match inner.split_once(':') {
        Some((head, spec)) => (head, spec),
        None => (inner, ""),
    };
    let name = match head.split_once('!') {
        Some((name, "s")) => name,
        Some(_) => return None,
        None => head,
    };
    let name = name.trim();
    if name.is_empty() || name.contains('{') || spec.contains('{') {
        return None;
    }
    Some(Field { name, spec })
}

/// Applies a string format spec: fill and alignment, minimum width and a
/// precision that truncates.
fn apply_spec(value: &str, spec: &str) -> Result<String> {
    if spec.is_empty() {
        return Ok(value.to_string());
    }
    let invalid = || CvError::Template(format!("unsupported format spec '{spec}'"));
    let chars: Vec<char> = spec.chars().collect();
    let is_align = |c: &char| matches!(c, '<' | '>' | '^');

    let (fill, align, mut i) = match (chars.first(), chars.get(1)) {
        (Some(&fill), Some(align)) if is_align(align) => (fill, *align, 2),
        (Some(align), _) if is_align(align) => (' ', *align, 1),
        _ => (' ', '<', 0),
    };

    let width_start = i;
    while chars.get(i).is_some_and(char::is_ascii_digit) {
        i += 1;
    }
    let width: usize = if i > width_start {
        let digits: String = chars[width_start..i].iter().collect();
        digits.parse().map_err(|_| invalid())?
    } else {
        0
    };

    let mut precision = None;
    if chars.get(i) == Some(&'.') {
        i += 1;
        let start = i;
        while chars.get(i).is_some_and(char::is_ascii_digit) {
            i += 1;
        }
        if i == start {
            return Err(invalid());
        }
        let digits: String = chars[start..i].iter().collect();
        precision = Some(digits.parse::<usize>().map_err(|_| invalid())?);
    }

    if chars.get(i) == Some(&'s') {
        i += 1;
    }
    if i != chars.len() {
        return Err(invalid());
    }

    let text: String = match precision {
        Some(limit) => value.chars().take(limit).collect(),
        None => value.to_string(),
    };
    let pad = width.saturating_sub(text.chars().count());
    let (left, right) = match align {
        '>' => (pad, 0),
        '^' => (pad / 2, pad - pad / 2),
        _ => (0, pad),
    };
    let fill = fill.to_string();
    Ok(format!("{}{text}{}", fill.repeat(left), fill.repeat(right)))
}
