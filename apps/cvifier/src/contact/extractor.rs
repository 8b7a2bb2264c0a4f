use indexmap::IndexMap;
use tracing::debug;

use crate::doctree::{Document, Element};

/// Section names treated as contact information.
pub const CONTACT_FIELDS: &[&str] = &["name", "address", "phone", "email", "fax"];

/// Lowercase contact field name → rendered text.
pub type ContactFields = IndexMap<String, String>;

/// Removes every top-level contact section from `document`.
///
/// A section qualifies when any of its names matches [`CONTACT_FIELDS`]
/// (case-insensitive). It is keyed under the first of its own names that
/// matches and removed once. Sections deeper in the tree are left alone.
pub fn extract_contact_info(document: &mut Document) -> IndexMap<String, Element> {
    let mut keys = Vec::new();
    let removed = document.remove_sections_where(|section| match contact_key(section) {
        Some(key) => {
            keys.push(key);
            true
        }
        None => false,
    });

    let extracted: IndexMap<String, Element> = keys.into_iter().zip(removed).collect();
    debug!(
        "Extracted contact sections: {:?}",
        extracted.keys().collect::<Vec<_>>()
    );
    extracted
}

/// Builds the field dict from extracted sections: each field maps to the last
/// text leaf of its section. Sections without any text are omitted.
pub fn contact_fields(extracted: &IndexMap<String, Element>) -> ContactFields {
    extracted
        .iter()
        .filter_map(|(key, section)| {
            section
                .last_text()
                .map(|text| (key.clone(), text.to_string()))
        })
        .collect()
}

fn contact_key(section: &Element) -> Option<String> {
    section
        .names
        .iter()
        .map(|name| name.to_lowercase())
        .find(|name| CONTACT_FIELDS.contains(&name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctree::Node;

    fn cv() -> Document {
        Document::new(vec![
            Element::section("Name", [Element::paragraph("Jane Doe").into()]).into(),
            Element::section("Education", [Element::paragraph("PhD, 2013").into()]).into(),
            Element::section("Phone", [Element::paragraph("555-1234").into()]).into(),
            Element::section(
                "EMAIL",
                [
                    Element::paragraph("old@x.com").into(),
                    Element::paragraph("jane@x.com").into(),
                ],
            )
            .into(),
        ])
    }

    #[test]
    fn test_extracts_and_removes_contact_sections() {
        let mut doc = cv();
        let extracted = extract_contact_info(&mut doc);

        assert_eq!(
            extracted.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["name", "phone", "email"]
        );
        assert_eq!(doc.sections().count(), 1);
        assert_eq!(doc.children[0].as_element().unwrap().names, vec!["education"]);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let mut doc = cv();
        assert_eq!(extract_contact_info(&mut doc).len(), 3);
        assert!(extract_contact_info(&mut doc).is_empty());
        assert_eq!(doc.sections().count(), 1);
    }

    #[test]
    fn test_section_with_multiple_matching_names_keyed_once() {
        let section = Element::new(crate::doctree::SECTION)
            .with_name("Phone")
            .with_name("fax")
            .with_child(Element::title("Phone / Fax"))
            .with_child(Element::paragraph("555-0000"));
        let mut doc = Document::new(vec![section.into()]);

        let extracted = extract_contact_info(&mut doc);
        assert_eq!(extracted.len(), 1);
        assert!(extracted.contains_key("phone"));
        assert!(doc.children.is_empty());
    }

    #[test]
    fn test_nested_sections_are_not_extracted() {
        let inner = Element::section("Email", [Element::paragraph("x@y.z").into()]);
        let outer = Element::section("Contact", [Node::from(inner)]);
        let mut doc = Document::new(vec![outer.into()]);

        assert!(extract_contact_info(&mut doc).is_empty());
        assert_eq!(doc.children.len(), 1);
    }

    #[test]
    fn test_contact_fields_uses_last_text_node() {
        let mut doc = cv();
        let fields = contact_fields(&extract_contact_info(&mut doc));
        assert_eq!(fields.get("name").map(String::as_str), Some("Jane Doe"));
        assert_eq!(fields.get("email").map(String::as_str), Some("jane@x.com"));
    }

    #[test]
    fn test_non_section_nodes_untouched() {
        let mut doc = cv();
        doc.insert(0, Element::paragraph("name"));
        extract_contact_info(&mut doc);
        assert_eq!(doc.children[0].astext(), "name");
    }
}
