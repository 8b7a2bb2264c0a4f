//! Special settings: the reserved `.cvsettings` keys cvifier consumes itself
//! instead of passing them to the renderer.
//!
//! Writer-agnostic keys are always popped. Writer-specific keys are popped only
//! for their own writer; for any other writer they stay in the map and reach the
//! renderer untouched.

pub mod body;
pub mod rewrite;
pub mod tree_pass;

pub use body::extract_body;
pub use rewrite::{apply_rewrite_rules, rewrite_rules, RewriteRule};
pub use tree_pass::apply_tree_settings;

use serde::Serialize;
use tracing::{debug, warn};

use crate::contact::{ContactTemplate, DEFAULT_LEFT_COLUMN, DEFAULT_RIGHT_COLUMN};
use crate::errors::{CvError, Result};
use crate::markup::Writer;
use crate::sections::SectionMap;

// ────────────────────────────────────────────────────────────────────────────
// Reserved keys
// ────────────────────────────────────────────────────────────────────────────

pub const CONTACT_TEMPLATE_KEY: &str = "contactinfotemplate";
pub const ESCAPED_CONTACT_TEMPLATE_KEY: &str = "escapedcontactinfotemplate";
pub const EXCLUDE_SECTIONS_KEY: &str = "excludesections";
pub const CONTACT_BLOCK_LEFT_KEY: &str = "contactblockleft";
pub const CONTACT_BLOCK_RIGHT_KEY: &str = "contactblockright";

pub const NO_BULLETS_KEY: &str = "nobullets";
pub const PRE_ITEMIZE_KEY: &str = "preitemize";
pub const POST_SECTION_KEY: &str = "postsection";
pub const NO_FOOTNOTE_SPACE_KEY: &str = "nofootnotespace";

pub const ONLY_DIV_KEY: &str = "onlydiv";

pub const WRITER_AGNOSTIC_KEYS: &[&str] = &[
    CONTACT_TEMPLATE_KEY,
    ESCAPED_CONTACT_TEMPLATE_KEY,
    EXCLUDE_SECTIONS_KEY,
    CONTACT_BLOCK_LEFT_KEY,
    CONTACT_BLOCK_RIGHT_KEY,
];
pub const LATEX_KEYS: &[&str] = &[
    NO_BULLETS_KEY,
    PRE_ITEMIZE_KEY,
    POST_SECTION_KEY,
    NO_FOOTNOTE_SPACE_KEY,
];
pub const HTML_KEYS: &[&str] = &[ONLY_DIV_KEY];

/// Writer-specific reserved keys for `writer`.
pub fn writer_keys(writer: &Writer) -> &'static [&'static str] {
    match writer {
        Writer::Latex => LATEX_KEYS,
        Writer::Html => HTML_KEYS,
        Writer::Other(_) => &[],
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Extracted settings
// ────────────────────────────────────────────────────────────────────────────

/// Reserved settings popped from a writer's settings map.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SpecialSettings {
    pub contact_template: Option<ContactTemplate>,
    pub exclude_sections: Vec<String>,
    pub contact_block_left: Vec<String>,
    pub contact_block_right: Vec<String>,
    /// LaTeX: `\item` inside itemize becomes `\item[]`.
    pub no_bullets: bool,
    /// LaTeX: inserted before every `\begin{itemize}`.
    pub pre_itemize: Option<String>,
    /// Raw markup inserted after each top-level section title.
    pub post_section: Option<String>,
    /// LaTeX: drop the space before footnote marks.
    pub no_footnote_space: bool,
    /// HTML: keep only the inside of the document div.
    pub only_div: bool,
}

impl SpecialSettings {
    /// Pops the reserved keys for `writer` out of `settings`.
    pub fn extract(settings: &mut SectionMap, writer: &Writer) -> Result<Self> {
        let plain = settings.remove(CONTACT_TEMPLATE_KEY);
        let escaped = settings.remove(ESCAPED_CONTACT_TEMPLATE_KEY);
        let contact_template = match (plain, escaped) {
            (Some(plain), Some(_)) => {
                warn!(
                    "Both {CONTACT_TEMPLATE_KEY} and {ESCAPED_CONTACT_TEMPLATE_KEY} set; \
                     using {CONTACT_TEMPLATE_KEY}"
                );
                Some(ContactTemplate::plain(plain))
            }
            (Some(plain), None) => Some(ContactTemplate::plain(plain)),
            (None, Some(escaped)) => Some(ContactTemplate::escaped(&escaped)),
            (None, None) => None,
        };

        let exclude_sections = settings
            .remove(EXCLUDE_SECTIONS_KEY)
            .map(|list| split_list(&list))
            .unwrap_or_default();
        let contact_block_left = settings
            .remove(CONTACT_BLOCK_LEFT_KEY)
            .map(|list| split_list(&list))
            .unwrap_or_else(|| to_owned_list(DEFAULT_LEFT_COLUMN));
        let contact_block_right = settings
            .remove(CONTACT_BLOCK_RIGHT_KEY)
            .map(|list| split_list(&list))
            .unwrap_or_else(|| to_owned_list(DEFAULT_RIGHT_COLUMN));

        let mut special = SpecialSettings {
            contact_template,
            exclude_sections,
            contact_block_left,
            contact_block_right,
            ..Default::default()
        };

        match writer {
            Writer::Latex => {
                special.no_bullets = pop_flag(settings, NO_BULLETS_KEY)?;
                special.pre_itemize = settings.remove(PRE_ITEMIZE_KEY);
                special.post_section = settings.remove(POST_SECTION_KEY);
                special.no_footnote_space = pop_flag(settings, NO_FOOTNOTE_SPACE_KEY)?;
            }
            Writer::Html => {
                special.only_div = pop_flag(settings, ONLY_DIV_KEY)?;
            }
            Writer::Other(_) => {}
        }

        debug!(
            "Special settings for {writer}: {}",
            serde_json::to_string(&special).unwrap_or_default()
        );
        Ok(special)
    }
}

/// Removes `key` and reads it as a flag. An absent key is `false`; a present
/// key with an empty body is `true`.
fn pop_flag(settings: &mut SectionMap, key: &str) -> Result<bool> {
    match settings.remove(key) {
        None => Ok(false),
        Some(value) => parse_flag(key, &value),
    }
}

pub(crate) fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "" | "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(CvError::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
/// A list starting with a bracketed spec must be indented in the settings file,
/// otherwise the line reads as a section header.
fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
