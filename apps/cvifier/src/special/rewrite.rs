//! Output rewrite rules: string patches on the rendered body for what the
//! renderer's own settings cannot express.
//!
//! Rules run in a fixed order: nobullets, preitemize, nofootnotespace, onlydiv.

use tracing::debug;

use crate::errors::{CvError, Result};
use crate::special::SpecialSettings;

const ITEM: &str = "\\item ";
const ITEM_NO_BULLET: &str = "\\item[] ";
const BEGIN_ENV: &str = "\\begin{";
const END_ENV: &str = "\\end{";
const BEGIN_ITEMIZE: &str = "\\begin{itemize}";
const FOOTNOTE_MARK: &str = "\\DUfootnotemark";
const DOCUMENT_DIV_OPEN: &str = "<div class=\"document\"";
const DIV_OPEN: &str = "<div";
const DIV_CLOSE: &str = "</div>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteRule {
    /// `\item ` directly inside an itemize environment becomes `\item[] `.
    NoBullets,
    /// Inserts the text before every `\begin{itemize}`.
    PreItemize(String),
    /// Removes the space before `\DUfootnotemark`.
    NoFootnoteSpace,
    /// Keeps only the lines inside the outermost document div.
    OnlyDiv,
}

impl RewriteRule {
    pub fn name(&self) -> &'static str {
        match self {
            RewriteRule::NoBullets => "nobullets",
            RewriteRule::PreItemize(_) => "preitemize",
            RewriteRule::NoFootnoteSpace => "nofootnotespace",
            RewriteRule::OnlyDiv => "onlydiv",
        }
    }

    pub fn apply(&self, text: &str) -> Result<String> {
        match self {
            RewriteRule::NoBullets => Ok(suppress_bullets(text)),
            RewriteRule::PreItemize(preamble) => {
                Ok(text.replace(BEGIN_ITEMIZE, &format!("{preamble}{BEGIN_ITEMIZE}")))
            }
            RewriteRule::NoFootnoteSpace => {
                Ok(text.replace(&format!(" {FOOTNOTE_MARK}"), FOOTNOTE_MARK))
            }
            RewriteRule::OnlyDiv => only_document_div(text),
        }
    }
}

/// The rules enabled by `special`, in application order.
pub fn rewrite_rules(special: &SpecialSettings) -> Vec<RewriteRule> {
    let mut rules = Vec::new();
    if special.no_bullets {
        rules.push(RewriteRule::NoBullets);
    }
    if let Some(preamble) = &special.pre_itemize {
        rules.push(RewriteRule::PreItemize(preamble.clone()));
    }
    if special.no_footnote_space {
        rules.push(RewriteRule::NoFootnoteSpace);
    }
    if special.only_div {
        rules.push(RewriteRule::OnlyDiv);
    }
    rules
}

pub fn apply_rewrite_rules(text: &str, rules: &[RewriteRule]) -> Result<String> {
    let mut current = text.to_string();
    for rule in rules {
        debug!("Applying rewrite rule {}", rule.name());
        current = rule.apply(&current)?;
    }
    Ok(current)
}

fn suppress_bullets(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut envs: Vec<&str> = Vec::new();
    let mut rest = text;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if let Some(env) = rest.strip_prefix(BEGIN_ENV).and_then(env_name) {
            envs.push(env);
        } else if let Some(env) = rest.strip_prefix(END_ENV).and_then(env_name) {
            if envs.last().copied() == Some(env) {
                envs.pop();
            }
        } else if rest.starts_with(ITEM) && envs.last().copied() == Some("itemize") {
            out.push_str(ITEM_NO_BULLET);
            rest = &rest[ITEM.len()..];
            continue;
        }

        out.push('\\');
        rest = &rest[1..];
    }

    out.push_str(rest);
    out
}

fn env_name(after_brace: &str) -> Option<&str> {
    after_brace.find('}').map(|end| &after_brace[..end])
}

fn only_document_div(text: &str) -> Result<String> {
    let mut kept = Vec::new();
    let mut depth: Option<i64> = None;

    for line in text.lines() {
        match depth {
            None => {
                if line.contains(DOCUMENT_DIV_OPEN) {
                    let d = div_balance(line);
                    if d <= 0 {
                        return Ok(String::new());
                    }
                    depth = Some(d);
                }
            }
            Some(d) => {
                let d = d + div_balance(line);
                if d <= 0 {
                    return Ok(kept.join("\n"));
                }
                depth = Some(d);
                kept.push(line);
            }
        }
    }

    let missing = if depth.is_none() { DOCUMENT_DIV_OPEN } else { DIV_CLOSE };
    Err(CvError::DelimiterNotFound {
        delimiter: missing.to_string(),
    })
}

fn div_balance(line: &str) -> i64 {
    line.matches(DIV_OPEN).count() as i64 - line.matches(DIV_CLOSE).count() as i64
}
