//! The `robust-table` rule.

use super::Rule;
use crate::table::table_to_markdown;

/// Key the table rule is registered under
pub const TABLE_RULE_KEY: &str = "robust-table";

/// Replaces every `<table>` with a single-line-per-row Markdown table.
///
/// The children are not converted up front; cells are converted one by one so
/// each can be flattened and escaped on its own.
pub fn table_rule() -> Rule {
    Rule::for_tag("table", |node, _, service| table_to_markdown(node.node, service))
        .ignoring_content()
}
