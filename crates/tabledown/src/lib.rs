//! # tabledown
//!
//! Convert rendered markup to Markdown, with tables that survive the trip.
//!
//! The generic conversion is rule-driven, in the manner of
//! [turndown](https://github.com/mixmark-io/turndown): every element is
//! matched against custom rules first, then the CommonMark rule set.
//! [`TableAwareConverter`] registers one extra rule for `<table>` that emits
//! single-line rows with escaped pipes, whatever the cells contain.
//!
//! ## Example (Node-based)
//!
//! ```rust
//! use tabledown::{Node, TableAwareConverter};
//!
//! let table = Node::element("table")
//!     .with_child(
//!         Node::element("tr")
//!             .with_child(Node::element("th").with_text("Name"))
//!             .with_child(Node::element("th").with_text("Age")),
//!     )
//!     .with_child(
//!         Node::element("tr")
//!             .with_child(Node::element("td").with_text("A|B"))
//!             .with_child(Node::element("td").with_text("3\n0")),
//!     );
//!
//! let markdown = TableAwareConverter::new().convert(&table).unwrap();
//! assert_eq!(markdown, "| Name | Age |\n| --- | --- |\n| A\\|B | 3 0 |");
//! ```
//!
//! ## Example (HTML string)
//!
//! ```rust
//! use tabledown::TableAwareConverter;
//!
//! let converter = TableAwareConverter::new();
//! let markdown = converter
//!     .convert_html("<h2>Stats</h2><table><tr><td>a</td><td>b</td></tr></table>")
//!     .unwrap();
//! assert!(markdown.ends_with("| a | b |\n| --- | --- |"));
//! ```

mod converter;
#[cfg(feature = "html")]
pub mod html;
pub mod node;
mod rules;
mod service;
pub mod table;
mod utilities;

pub use converter::{tables, TableAwareConverter};
#[cfg(feature = "html")]
pub use html::parse_html;
pub use node::{Node, NodeRef, NodeType};
pub use rules::{Filter, Rule, Rules, TABLE_RULE_KEY};
pub use service::{CodeBlockStyle, HeadingStyle, TurndownOptions, TurndownService};
pub use table::{clean_cell, CellKind, TableModel};
pub use utilities::*;

/// Error type for conversion
#[derive(Debug, thiserror::Error)]
pub enum TurndownError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Nothing to convert")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, TurndownError>;
