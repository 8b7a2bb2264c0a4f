//! Contact information: pulled out of the CV tree, formatted through the
//! user's template and re-inserted as a single raw block.

pub mod block;
pub mod extractor;
pub mod template;

pub use block::format_contact_block;
pub use extractor::{contact_fields, extract_contact_info, ContactFields, CONTACT_FIELDS};
pub use template::ContactTemplate;

use tracing::info;

use crate::doctree::Document;
use crate::errors::Result;
use crate::markup::Writer;

/// Placeholder that expands to the formatted contact table.
pub const CONTACT_BLOCK_PLACEHOLDER: &str = "contactblock";

/// Default contact-table columns when the settings do not name any.
pub const DEFAULT_LEFT_COLUMN: &[&str] = &["[name]", "[address]"];
pub const DEFAULT_RIGHT_COLUMN: &[&str] = &["phone", "email", "fax"];

/// Removes the contact sections from `document` and renders `template` with
/// their values. The contact table is only built when the template asks for
/// `{contactblock}`, so other writers can still use a table-free template.
pub fn build_contact_markup<S: AsRef<str>>(
    document: &mut Document,
    template: &ContactTemplate,
    writer: &Writer,
    left: &[S],
    right: &[S],
) -> Result<String> {
    let extracted = extract_contact_info(document);
    let mut values = contact_fields(&extracted);
    info!("Substituting {} contact fields into template", values.len());

    if template.references(CONTACT_BLOCK_PLACEHOLDER)? {
        let block = format_contact_block(&values, writer, left, right)?;
        values.insert(CONTACT_BLOCK_PLACEHOLDER.to_string(), block);
    }

    template.render(&values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctree::Element;
    use crate::errors::CvError;

    fn cv() -> Document {
        Document::new(vec![
            Element::section("Name", [Element::paragraph("Jane Doe").into()]).into(),
            Element::section("Phone", [Element::paragraph("555-1234").into()]).into(),
            Element::section("Research", [Element::paragraph("Galaxies").into()]).into(),
        ])
    }

    #[test]
    fn test_template_without_block() {
        let mut doc = cv();
        let t = ContactTemplate::plain("<h1>{name}</h1>");
        let out = build_contact_markup(
            &mut doc,
            &t,
            &Writer::Html,
            DEFAULT_LEFT_COLUMN,
            DEFAULT_RIGHT_COLUMN,
        )
        .unwrap();
        assert_eq!(out, "<h1>Jane Doe</h1>");
        assert_eq!(doc.sections().count(), 1);
    }

    #[test]
    fn test_template_with_block() {
        let mut doc = cv();
        let t = ContactTemplate::plain("<table>{contactblock}</table>");
        let out =
            build_contact_markup(&mut doc, &t, &Writer::Html, &["[name]"], &["phone"]).unwrap();
        assert_eq!(
            out,
            "<table><tr><td>Jane Doe</td><td><i>Phone:</i>~555-1234</td></tr></table>"
        );
    }

    #[test]
    fn test_block_not_built_for_other_writer_unless_referenced() {
        let mut doc = cv();
        let t = ContactTemplate::plain("{name}");
        let out = build_contact_markup(
            &mut doc,
            &t,
            &Writer::from_name("man"),
            DEFAULT_LEFT_COLUMN,
            DEFAULT_RIGHT_COLUMN,
        )
        .unwrap();
        assert_eq!(out, "Jane Doe");
    }

    #[test]
    fn test_block_for_other_writer_is_unsupported() {
        let mut doc = cv();
        let t = ContactTemplate::plain("{contactblock}");
        let err = build_contact_markup(
            &mut doc,
            &t,
            &Writer::from_name("man"),
            DEFAULT_LEFT_COLUMN,
            DEFAULT_RIGHT_COLUMN,
        )
        .unwrap_err();
        assert!(matches!(err, CvError::UnsupportedWriter(_)));
    }
}
