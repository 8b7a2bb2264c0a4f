use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping of section name → section body.
///
/// Keys keep the order in which their headers first appeared. Used both for CV
/// content files and for per-writer `.cvsettings` files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionMap {
    entries: IndexMap<String, String>,
}

impl SectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Inserts or replaces a section. A replaced section keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, body: impl Into<String>) -> Option<String> {
        self.entries.insert(name.into(), body.into())
    }

    /// Removes a section, preserving the order of the remaining ones.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Rebuilds section-format text: one `[name]` header per section followed by
    /// its body, sections separated by a blank line.
    pub fn to_section_text(&self) -> String {
        self.entries
            .iter()
            .map(|(name, body)| {
                if body.is_empty() {
                    format!("[{name}]\n")
                } else {
                    format!("[{name}]\n{body}\n")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SectionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        SectionMap {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for SectionMap {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
