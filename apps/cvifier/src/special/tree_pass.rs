use tracing::debug;

use crate::doctree::{Document, Element};
use crate::markup::Writer;
use crate::special::SpecialSettings;

/// Applies the tree-level special settings before rendering.
///
/// `postsection` puts a raw node right after the title of every top-level
/// section. Sections without a title get it as their first child.
pub fn apply_tree_settings(document: &mut Document, special: &SpecialSettings, writer: &Writer) {
    let Some(markup) = &special.post_section else {
        return;
    };

    let mut count = 0;
    for section in document.sections_mut() {
        let index = section.title_index().map_or(0, |title| title + 1);
        section.insert(index, Element::raw(writer.name(), markup.clone()));
        count += 1;
    }
    debug!("Inserted post-section markup into {count} sections");
}
