//! Table decoding and single-line Markdown table output.
//!
//! Rows are every `tr` below the table, cells every `th`/`td` below a row,
//! both in document order. Each cell's inner markup goes through the full
//! converter and then [`clean_cell`], so the emitted table never contains a
//! multi-line or pipe-splitting cell.

use std::cell::RefCell;
use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::node::{Node, NodeType};
use crate::service::TurndownService;

static NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").expect("valid regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

thread_local! {
    /// Cleaned cells of the outermost table being decoded, keyed by address.
    /// Seeded with every cell below that table, which stays borrowed until
    /// the scope ends, so a key can never name some other node.
    static CELLS: RefCell<Option<HashMap<*const Node, Option<String>>>> =
        const { RefCell::new(None) };
}

/// Keeps [`CELLS`] alive while the outermost table is decoded.
///
/// Descendant queries make every nested cell part of each enclosing table,
/// so without sharing, nested tables are converted once per ancestor row.
struct CellScope {
    outermost: bool,
}

impl CellScope {
    fn enter(table: &Node) -> Self {
        CELLS.with(|cells| {
            let mut cells = cells.borrow_mut();
            if cells.is_some() {
                return Self { outermost: false };
            }
            let seeded = table
                .descendants()
                .filter(|n| matches!(TablePart::of(n), TablePart::Cell(_)))
                .map(|n| (n as *const Node, None))
                .collect();
            *cells = Some(seeded);
            Self { outermost: true }
        })
    }
}

impl Drop for CellScope {
    fn drop(&mut self) {
        if self.outermost {
            let _ = CELLS.try_with(|cells| cells.borrow_mut().take());
        }
    }
}

/// Convert and clean one cell, at most once per outermost table.
fn converted_cell(cell: &Node, service: &TurndownService) -> String {
    let key = cell as *const Node;
    let slot = CELLS.with(|cells| {
        cells
            .borrow()
            .as_ref()
            .and_then(|seeded| seeded.get(&key).cloned())
    });
    let cacheable = match slot {
        Some(Some(text)) => return text,
        Some(None) => true,
        None => false,
    };

    let text = clean_cell(&service.turndown_inner(cell));
    if cacheable {
        CELLS.with(|cells| {
            if let Some(seeded) = cells.borrow_mut().as_mut() {
                seeded.insert(key, Some(text.clone()));
            }
        });
    }
    text
}

/// Which element a cell came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    Header,
    Data,
}

/// A node as table traversal sees it, decoded once from the tag name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TablePart<'a> {
    Table,
    Row,
    Cell(CellKind),
    Text(&'a str),
    Other,
}

impl<'a> TablePart<'a> {
    pub fn of(node: &'a Node) -> Self {
        match node.node_type {
            NodeType::Text => TablePart::Text(node.node_value.as_deref().unwrap_or("")),
            NodeType::Element => match node.tag_name().as_str() {
                "table" => TablePart::Table,
                "tr" => TablePart::Row,
                "th" => TablePart::Cell(CellKind::Header),
                "td" => TablePart::Cell(CellKind::Data),
                _ => TablePart::Other,
            },
            _ => TablePart::Other,
        }
    }
}

/// A cleaned cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub kind: CellKind,
    pub text: String,
}

/// Rows of cleaned cells. Never holds an empty row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableModel {
    rows: Vec<Vec<Cell>>,
}

impl TableModel {
    /// Decode `table`, converting each cell's inner markup with `service`.
    pub fn from_table(table: &Node, service: &TurndownService) -> Self {
        let _scope = CellScope::enter(table);
        let rows = table
            .descendants()
            .filter(|n| TablePart::of(n) == TablePart::Row)
            .map(|tr| {
                tr.descendants()
                    .filter_map(|n| match TablePart::of(n) {
                        TablePart::Cell(kind) => Some(Cell {
                            kind,
                            text: converted_cell(n, service),
                        }),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
            });
        Self::from_rows(rows)
    }

    /// Build from already-decoded rows, dropping the empty ones.
    pub fn from_rows(rows: impl IntoIterator<Item = Vec<Cell>>) -> Self {
        Self {
            rows: rows.into_iter().filter(|r| !r.is_empty()).collect(),
        }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether any cell came from a `th`.
    ///
    /// Informational only: the header row is `rows[0]` either way.
    pub fn has_header(&self) -> bool {
        self.rows
            .iter()
            .flatten()
            .any(|cell| cell.kind == CellKind::Header)
    }

    pub fn header(&self) -> Option<&[Cell]> {
        self.rows.first().map(Vec::as_slice)
    }

    pub fn body(&self) -> &[Vec<Cell>] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Width of the header row
    pub fn column_count(&self) -> usize {
        self.header().map_or(0, <[Cell]>::len)
    }

    /// Markdown table lines joined by `\n`, with no surrounding newlines.
    /// Empty for a table without rows.
    pub fn to_markdown(&self) -> String {
        let Some(header) = self.header() else {
            return String::new();
        };
        let col_count = header.len();

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(format_row(header.iter().map(|c| c.text.as_str())));
        lines.push(format_row(std::iter::repeat("---").take(col_count)));

        for row in self.body() {
            let padding = col_count.saturating_sub(row.len());
            lines.push(format_row(
                row.iter()
                    .map(|c| c.text.as_str())
                    .chain(std::iter::repeat("").take(padding)),
            ));
        }

        lines.join("\n")
    }
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    format!("| {} |", cells.collect::<Vec<_>>().join(" | "))
}

/// Render one `<table>` element as a Markdown table wrapped in newlines.
pub fn table_to_markdown(table: &Node, service: &TurndownService) -> String {
    let model = TableModel::from_table(table, service);
    if model.is_empty() {
        debug!("table has no cells, emitting nothing");
        return String::new();
    }

    debug!(
        rows = model.rows().len(),
        columns = model.column_count(),
        has_header = model.has_header(),
        "converted table"
    );
    format!("\n{}\n", model.to_markdown())
}

/// Make converted cell Markdown safe for a single table row.
///
/// Newline runs become a space, whitespace runs become a space, pipes are
/// escaped, and the result is trimmed. Applying it twice changes nothing.
pub fn clean_cell(raw: &str) -> String {
    let flattened = NEWLINES.replace_all(raw, " ");
    let collapsed = WHITESPACE.replace_all(&flattened, " ");
    escape_pipes(&collapsed).trim().to_string()
}

/// Backslash-escape every pipe not already escaped.
///
/// A pipe counts as escaped when an odd number of backslashes precede it.
pub fn escape_pipes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut backslashes = 0usize;

    for c in text.chars() {
        match c {
            '\\' => backslashes += 1,
            '|' => {
                if backslashes % 2 == 0 {
                    out.push('\\');
                }
                backslashes = 0;
            }
            _ => backslashes = 0,
        }
        out.push(c);
    }

    out
}
