//! The table-aware converter: the generic rules plus `robust-table`.

use tracing::{debug, info_span};

use crate::node::Node;
use crate::rules::{table_rule, TABLE_RULE_KEY};
use crate::service::{TurndownOptions, TurndownService};
use crate::{Result, TurndownError};

/// Plugin registering the `robust-table` rule on a service.
pub fn tables(service: &mut TurndownService) {
    service.add_rule(TABLE_RULE_KEY, table_rule());
}

/// Converts rendered markup to Markdown, serializing every `<table>` as a
/// clean single-line-per-row Markdown table.
pub struct TableAwareConverter {
    service: TurndownService,
}

impl TableAwareConverter {
    pub fn new() -> Self {
        Self::with_options(TurndownOptions::default())
    }

    pub fn with_options(options: TurndownOptions) -> Self {
        let mut service = TurndownService::with_options(options);
        service.use_plugin(tables);
        Self { service }
    }

    /// Convert a fragment.
    ///
    /// Returns [`TurndownError::EmptyInput`] when the fragment holds nothing
    /// but whitespace. Callers decide whether that is worth reporting.
    pub fn convert(&self, fragment: &Node) -> Result<String> {
        let _span = info_span!("convert", root = %fragment.node_name).entered();

        if !fragment.has_content() {
            return Err(TurndownError::EmptyInput);
        }

        let markdown = self.service.turndown(fragment)?;
        debug!(bytes = markdown.len(), "fragment converted");
        Ok(markdown)
    }

    /// Parse and convert an HTML string
    #[cfg(feature = "html")]
    pub fn convert_html(&self, html: &str) -> Result<String> {
        self.convert(&crate::html::parse_html(html))
    }

    /// The underlying service, for registering extra rules or filters
    pub fn service_mut(&mut self) -> &mut TurndownService {
        &mut self.service
    }

    pub fn options(&self) -> &TurndownOptions {
        self.service.options()
    }
}

impl Default for TableAwareConverter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::{Filter, Rule};

    fn row(tag: &str, cells: &[&str]) -> Node {
        cells.iter().fold(Node::element("tr"), |tr, text| {
            tr.with_child(Node::element(tag).with_text(text))
        })
    }

    #[test]
    fn test_header_and_escaped_cells() {
        let table = Node::element("table")
            .with_child(row("th", &["Name", "Age"]))
            .with_child(row("td", &["A|B", "3\n0"]));

        let markdown = TableAwareConverter::new().convert(&table).unwrap();
        assert_eq!(markdown, "| Name | Age |\n| --- | --- |\n| A\\|B | 3 0 |");
    }

    #[test]
    fn test_empty_table_converts_to_nothing() {
        let converter = TableAwareConverter::new();
        assert_eq!(converter.convert(&Node::element("table")).unwrap(), "");

        let only_empty_rows = Node::element("table")
            .with_child(Node::element("tr"))
            .with_child(Node::element("tr").with_text("  "));
        assert_eq!(converter.convert(&only_empty_rows).unwrap(), "");
    }

    #[test]
    fn test_rectangular_data_table_shape() {
        let table = Node::element("table")
            .with_child(row("td", &["a", "b", "c"]))
            .with_child(row("td", &["1", "2", "3"]))
            .with_child(row("td", &["4", "5", "6"]));

        let markdown = TableAwareConverter::new().convert(&table).unwrap();
        let lines: Vec<&str> = markdown.lines().collect();
        assert_eq!(lines.len(), 1 + 1 + 2);
        assert_eq!(lines[1], "| --- | --- | --- |");
        assert!(lines.iter().all(|l| l.matches(" | ").count() == 2));
    }

    #[test]
    fn test_inline_formatting_survives_in_cells() {
        let cell = Node::element("td")
            .with_child(Node::element("strong").with_text("bold"))
            .with_text(" and ")
            .with_child(
                Node::element_with_attrs("a", vec![("href", "https://example.com")])
                    .with_text("link"),
            )
            .with_text(" and ")
            .with_child(Node::element("code").with_text("a|b"));
        let table = Node::element("table")
            .with_child(row("th", &["Mixed"]))
            .with_child(Node::element("tr").with_child(cell));

        let markdown = TableAwareConverter::new().convert(&table).unwrap();
        assert_eq!(
            markdown.lines().last().unwrap(),
            "| **bold** and [link](https://example.com) and `a\\|b` |"
        );
    }

    #[test]
    fn test_block_content_in_cells_is_flattened() {
        let cell = Node::element("td")
            .with_child(Node::element("p").with_text("first"))
            .with_child(Node::element("p").with_text("second"))
            .with_child(
                Node::element("ul")
                    .with_child(Node::element("li").with_text("x"))
                    .with_child(Node::element("li").with_text("y")),
            );
        let table = Node::element("table")
            .with_child(row("td", &["Notes"]))
            .with_child(Node::element("tr").with_child(cell));

        let markdown = TableAwareConverter::new().convert(&table).unwrap();
        assert_eq!(markdown.lines().last().unwrap(), "| first second * x * y |");
    }

    #[test]
    fn test_table_between_paragraphs() {
        let fragment = Node::document_fragment()
            .with_child(Node::element("p").with_text("Before"))
            .with_child(
                Node::element("table")
                    .with_child(row("th", &["k", "v"]))
                    .with_child(row("td", &["a", "1"])),
            )
            .with_child(Node::element("p").with_text("After"));

        let markdown = TableAwareConverter::new().convert(&fragment).unwrap();
        assert_eq!(
            markdown,
            "Before\n\n| k | v |\n| --- | --- |\n| a | 1 |\n\nAfter"
        );
    }

    #[test]
    fn test_thead_and_tbody_are_transparent() {
        let table = Node::element("table")
            .with_child(Node::element("thead").with_child(row("th", &["H"])))
            .with_child(
                Node::element("tbody")
                    .with_child(row("td", &["1"]))
                    .with_child(row("td", &["2"])),
            );

        let markdown = TableAwareConverter::new().convert(&table).unwrap();
        assert_eq!(markdown, "| H |\n| --- |\n| 1 |\n| 2 |");
    }

    #[test]
    fn test_empty_fragment_is_reported() {
        let converter = TableAwareConverter::new();
        assert!(matches!(
            converter.convert(&Node::document_fragment()),
            Err(TurndownError::EmptyInput)
        ));
        assert!(matches!(
            converter.convert(&Node::document_fragment().with_text("\n ")),
            Err(TurndownError::EmptyInput)
        ));
    }

    #[test]
    fn test_extra_rules_still_apply() {
        let mut converter = TableAwareConverter::new();
        converter.service_mut().remove(Filter::tag("button"));
        let fragment = Node::document_fragment()
            .with_child(Node::element("button").with_text("Copy"))
            .with_child(Node::element("p").with_text("Kept"));
        assert_eq!(converter.convert(&fragment).unwrap(), "Kept");
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_convert_html_scenario() {
        let html = "<table><tr><th>Name</th><th>Age</th></tr><tr><td>A|B</td><td>3\n0</td></tr></table>";
        let markdown = TableAwareConverter::new().convert_html(html).unwrap();
        assert_eq!(markdown, "| Name | Age |\n| --- | --- |\n| A\\|B | 3 0 |");
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_nested_table_rows_join_the_outer_table() {
        let html = "<table><tr><td><table><tr><td>x</td></tr></table></td></tr></table>";
        let markdown = TableAwareConverter::new().convert_html(html).unwrap();
        assert_eq!(
            markdown,
            "| \\| x \\| \\| --- \\| | x |\n| --- | --- |\n| x |  |"
        );
    }

    #[test]
    fn test_deeply_nested_cells_are_converted_once() {
        let visits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&visits);
        let mut converter = TableAwareConverter::new();
        converter.service_mut().add_rule(
            "count-spans",
            Rule::for_tag("span", move |_, content, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                content.to_string()
            }),
        );

        let mut node = Node::element("span").with_text("x");
        for _ in 0..16 {
            node = Node::element("table").with_child(
                Node::element("tr").with_child(Node::element("td").with_child(node)),
            );
        }

        let markdown = converter.convert(&node).unwrap();
        assert!(markdown.starts_with("| "));
        assert_eq!(visits.load(Ordering::SeqCst), 1);
    }

    #[cfg(feature = "html")]
    #[test]
    fn test_pipe_after_backslash_in_code_span_is_left_alone() {
        let html = r"<table><tr><td><code>C:\|x</code></td></tr></table>";
        let markdown = TableAwareConverter::new().convert_html(html).unwrap();
        assert_eq!(markdown, "| `C:\\|x` |\n| --- |");
    }
}
