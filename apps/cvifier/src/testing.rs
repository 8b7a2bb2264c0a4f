//! Stand-in collaborators for tests: a parser for a tiny markup subset and a
//! renderer producing minimal complete HTML and LaTeX documents.

use std::cell::RefCell;

use tracing_subscriber::EnvFilter;

use crate::doctree::{Document, Element, Node, FORMAT_ATTR, PARAGRAPH, RAW, SECTION, TITLE};
use crate::errors::Result;
use crate::markup::{MarkupParser, Renderer, Writer};
use crate::sections::SectionMap;

const BULLET_LIST: &str = "bullet_list";
const LIST_ITEM: &str = "list_item";

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Blank-line separated blocks. `Title\n=====` opens a top-level section,
/// blocks of `- item` lines become bullet lists, anything else a paragraph.
pub struct FakeParser;

impl MarkupParser for FakeParser {
    fn parse(&self, text: &str) -> Result<Document> {
        let mut document = Document::default();
        let mut current: Option<Element> = None;

        for block in text.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
            let lines: Vec<&str> = block.lines().collect();

            if lines.len() == 2 && !lines[1].is_empty() && lines[1].chars().all(|c| c == '=') {
                if let Some(section) = current.take() {
                    document.children.push(section.into());
                }
                current = Some(Element::section(lines[0], Vec::<Node>::new()));
                continue;
            }

            let node: Node = if lines.iter().all(|line| line.starts_with("- ")) {
                lines
                    .iter()
                    .fold(Element::new(BULLET_LIST), |list, line| {
                        let paragraph = Element::paragraph(&line[2..]);
                        list.with_child(Element::new(LIST_ITEM).with_child(paragraph))
                    })
                    .into()
            } else {
                Element::paragraph(block).into()
            };

            match current.as_mut() {
                Some(section) => section.children.push(node),
                None => document.children.push(node),
            }
        }

        if let Some(section) = current {
            document.children.push(section.into());
        }
        Ok(document)
    }
}

/// Renders the tree and remembers the tree and overrides it was last given.
#[derive(Default)]
pub struct FakeRenderer {
    document: RefCell<Option<Document>>,
    overrides: RefCell<Option<SectionMap>>,
}

impl FakeRenderer {
    pub fn last_document(&self) -> Option<Document> {
        self.document.borrow().clone()
    }

    pub fn last_overrides(&self) -> Option<SectionMap> {
        self.overrides.borrow().clone()
    }
}

impl Renderer for FakeRenderer {
    fn render(
        &self,
        document: &Document,
        writer: &Writer,
        overrides: &SectionMap,
    ) -> Result<String> {
        *self.document.borrow_mut() = Some(document.clone());
        *self.overrides.borrow_mut() = Some(overrides.clone());

        let mut body = String::new();
        for node in &document.children {
            render_node(node, writer, &mut body);
        }

        Ok(match writer {
            Writer::Html => format!(
                "<html>\n<head>\n</head>\n<body>\n<div class=\"document\">\n{body}</div>\n</body>\n</html>\n"
            ),
            Writer::Latex => format!(
                "\\documentclass{{article}}\n\\begin{{document}}\n{body}\\end{{document}}\n"
            ),
            Writer::Other(_) => format!("<document>\n{}\n</document>\n", document.astext()),
        })
    }
}

fn render_node(node: &Node, writer: &Writer, out: &mut String) {
    let element = match node {
        Node::Text(text) => {
            out.push_str(text);
            return;
        }
        Node::Element(element) => element,
    };
    let text = element.astext();
    let html = *writer == Writer::Html;

    match element.tag.as_str() {
        SECTION => {
            if html {
                let id = element.names.first().map(String::as_str).unwrap_or("");
                out.push_str(&format!("<div class=\"section\" id=\"{id}\">\n"));
            }
            for child in &element.children {
                render_node(child, writer, out);
            }
            if html {
                out.push_str("</div>\n");
            }
        }
        TITLE if html => out.push_str(&format!("<h1>{text}</h1>\n")),
        TITLE => out.push_str(&format!("\\section*{{{text}}}\n")),
        PARAGRAPH if html => out.push_str(&format!("<p>{text}</p>\n")),
        PARAGRAPH => out.push_str(&format!("{text}\n\n")),
        RAW => {
            if element.attribute(FORMAT_ATTR) == Some(writer.name()) {
                out.push_str(&format!("{text}\n"));
            }
        }
        BULLET_LIST => {
            let items = element.children.iter().map(Node::astext);
            if html {
                out.push_str("<ul>\n");
                items.for_each(|item| out.push_str(&format!("<li>{item}</li>\n")));
                out.push_str("</ul>\n");
            } else {
                out.push_str("\\begin{itemize}\n");
                items.for_each(|item| out.push_str(&format!("\\item {item}\n")));
                out.push_str("\\end{itemize}\n");
            }
        }
        _ => out.push_str(&text),
    }
}
