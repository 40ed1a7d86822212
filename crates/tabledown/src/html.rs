//! HTML parsing support.
//!
//! Decodes an HTML string into the [`Node`] tree the converter works on. This
//! is the only place html5ever types appear.

use scraper::{ElementRef, Html, Node as ScraperNode};

use crate::node::Node;

/// Parse an HTML fragment into a document-fragment [`Node`].
///
/// Parsing is lenient the way browsers are: `<table><tr>` gains its implied
/// `<tbody>`, unclosed tags are closed.
///
/// # Example
///
/// ```rust
/// use tabledown::{parse_html, NodeType};
///
/// let fragment = parse_html("<h1>Hello <em>World</em></h1>");
/// assert_eq!(fragment.node_type, NodeType::DocumentFragment);
/// assert_eq!(fragment.text_content(), "Hello World");
/// ```
pub fn parse_html(html: &str) -> Node {
    let document = Html::parse_fragment(html);
    // parse_fragment wraps everything in a synthetic <html> root
    convert_children(document.root_element(), Node::document_fragment())
}

fn convert_children(element: ElementRef, mut node: Node) -> Node {
    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => node.add_child(Node::text(&text.text)),
            ScraperNode::Comment(comment) => node.add_child(Node::comment(&comment.comment)),
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    node.add_child(convert_element(child_element));
                }
            }
            _ => {}
        }
    }
    node
}

fn convert_element(element: ElementRef) -> Node {
    let tag = element.value().name();
    let attrs: Vec<(&str, &str)> = element.value().attrs().collect();
    convert_children(element, Node::element_with_attrs(tag, attrs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeType;

    #[test]
    fn test_parse_returns_fragment() {
        let node = parse_html("<p>Hello World</p>");
        assert_eq!(node.node_type, NodeType::DocumentFragment);
        let p = node.element_children().next().unwrap();
        assert!(p.is_tag("p"));
    }

    #[test]
    fn test_parse_keeps_attributes() {
        let node = parse_html(r#"<div class="markdown-preview-section"><div class="mod-header"></div></div>"#);
        assert!(node.find_by_class("markdown-preview-section").is_some());
        assert!(node.find_by_class("mod-header").is_some());
    }

    #[test]
    fn test_parser_inserts_tbody() {
        let node = parse_html("<table><tr><td>x</td></tr></table>");
        let table = node.element_children().next().unwrap();
        assert!(table.element_children().next().unwrap().is_tag("tbody"));
    }

    #[test]
    fn test_turndown_html() {
        let service = crate::TurndownService::new();
        let result = service.turndown_html("<p>Hello <strong>World</strong></p>").unwrap();
        assert_eq!(result, "Hello **World**");
    }

    #[test]
    fn test_empty_html() {
        assert!(!parse_html("").has_content());
        assert!(!parse_html("  \n ").has_content());
    }
}
