//! TurndownService - rule-driven conversion of a [`Node`] tree to Markdown.

use crate::node::{Node, NodeRef, NodeType};
use crate::rules::{Filter, Rule, Rules};
use crate::utilities::{collapse_whitespace, escape_markdown, is_block};
use crate::{Result, TurndownError};

/// Heading style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// Underlined with `=` or `-`; h3-h6 fall back to ATX
    #[default]
    Setext,
    /// Prefixed with `#`
    Atx,
}

/// Code block style options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeBlockStyle {
    /// Indented by 4 spaces
    #[default]
    Indented,
    /// Wrapped in fences
    Fenced,
}

/// Options for TurndownService
#[derive(Debug, Clone, PartialEq)]
pub struct TurndownOptions {
    pub heading_style: HeadingStyle,

    /// Horizontal rule string
    pub hr: String,

    pub bullet_list_marker: char,

    pub code_block_style: CodeBlockStyle,

    /// Fence string for fenced code blocks
    pub fence: String,

    pub em_delimiter: char,

    pub strong_delimiter: String,

    /// Emitted before the newline of a `<br>`
    pub br: String,
}

impl Default for TurndownOptions {
    fn default() -> Self {
        Self {
            heading_style: HeadingStyle::Setext,
            hr: "* * *".to_string(),
            bullet_list_marker: '*',
            code_block_style: CodeBlockStyle::Indented,
            fence: "```".to_string(),
            em_delimiter: '_',
            strong_delimiter: "**".to_string(),
            br: "  ".to_string(),
        }
    }
}

/// Converts node trees to Markdown using the registered rules
pub struct TurndownService {
    options: TurndownOptions,
    rules: Rules,
}

impl TurndownService {
    pub fn new() -> Self {
        Self::with_options(TurndownOptions::default())
    }

    pub fn with_options(options: TurndownOptions) -> Self {
        Self {
            options,
            rules: Rules::new(),
        }
    }

    /// Convert a node tree to Markdown.
    ///
    /// Element roots are converted as elements, so a bare `<table>` goes
    /// through the table rule. Document and fragment roots convert their
    /// children.
    pub fn turndown(&self, node: &Node) -> Result<String> {
        validate(node)?;

        let output = match node.node_type {
            NodeType::Element => self.process_element(&NodeRef::new(node)),
            NodeType::Document | NodeType::DocumentFragment => self.process_children(node),
            NodeType::Text => escape_markdown(&collapse_whitespace(
                node.node_value.as_deref().unwrap_or(""),
            )),
            NodeType::Comment => String::new(),
        };

        Ok(post_process(&output))
    }

    /// Convert only the children of `node` (its inner markup).
    pub fn turndown_inner(&self, node: &Node) -> String {
        post_process(&self.process_children(node))
    }

    /// Parse an HTML string and convert it
    #[cfg(feature = "html")]
    pub fn turndown_html(&self, html: &str) -> Result<String> {
        self.turndown(&crate::html::parse_html(html))
    }

    /// Add a custom rule, consulted before the built-in ones
    pub fn add_rule(&mut self, key: &str, rule: Rule) -> &mut Self {
        self.rules.add(key, rule);
        self
    }

    pub fn has_rule(&self, key: &str) -> bool {
        self.rules.contains(key)
    }

    /// Keep elements matching the filter as HTML
    pub fn keep(&mut self, filter: Filter) -> &mut Self {
        self.rules.keep(filter);
        self
    }

    /// Drop elements matching the filter, content included
    pub fn remove(&mut self, filter: Filter) -> &mut Self {
        self.rules.remove(filter);
        self
    }

    /// Apply a plugin
    pub fn use_plugin<F>(&mut self, plugin: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        plugin(self);
        self
    }

    /// Escape Markdown syntax in a string
    pub fn escape(&self, text: &str) -> String {
        escape_markdown(text)
    }

    pub fn options(&self) -> &TurndownOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut TurndownOptions {
        &mut self.options
    }

    fn process_children(&self, parent: &Node) -> String {
        let children: Vec<&Node> = parent.children().collect();
        let parent_is_block =
            parent.is_container_root() || (parent.is_element() && is_block(&parent.tag_name()));

        let mut output = String::new();
        let mut element_index = 0;

        for (i, child) in children.iter().enumerate() {
            match child.node_type {
                NodeType::Text => {
                    let collapsed = collapse_whitespace(child.node_value.as_deref().unwrap_or(""));
                    let after_block = match i.checked_sub(1) {
                        Some(prev) => is_block_element(children[prev]),
                        None => parent_is_block,
                    };
                    let before_block = match children.get(i + 1) {
                        Some(next) => is_block_element(next),
                        None => parent_is_block,
                    };

                    let mut text = collapsed.as_str();
                    if after_block {
                        text = text.trim_start();
                    }
                    if before_block {
                        text = text.trim_end();
                    }
                    if !text.is_empty() {
                        output = join(output, &escape_markdown(text));
                    }
                }
                NodeType::Element => {
                    let node_ref = NodeRef::child_of(child, parent, element_index);
                    element_index += 1;
                    output = join(output, &self.process_element(&node_ref));
                }
                _ => {}
            }
        }

        output
    }

    fn process_element(&self, node: &NodeRef) -> String {
        if self.rules.should_remove(node, &self.options) {
            return String::new();
        }

        let tag = node.tag_name();

        if self.rules.should_keep(node, &self.options) {
            let html = node.node.outer_html();
            return if is_block(&tag) {
                format!("\n\n{}\n\n", html)
            } else {
                html
            };
        }

        if let Some(rule) = self.rules.for_node(node, &self.options) {
            let content = if rule.uses_content {
                self.process_children(node.node)
            } else {
                String::new()
            };
            return rule.replace(node, &content, self);
        }

        let content = self.process_children(node.node);

        if is_block(&tag) && !content.trim().is_empty() {
            format!("\n\n{}\n\n", content)
        } else {
            content
        }
    }
}

impl Default for TurndownService {
    fn default() -> Self {
        Self::new()
    }
}

fn is_block_element(node: &Node) -> bool {
    node.is_element() && is_block(&node.tag_name())
}

/// Append `addition`, merging the newlines at the seam (at most two survive).
fn join(mut output: String, addition: &str) -> String {
    let trailing = output.len() - output.trim_end_matches('\n').len();
    let body = addition.trim_start_matches('\n');
    let leading = addition.len() - body.len();

    output.truncate(output.len() - trailing);
    let separator = trailing.max(leading).min(2);
    output.push_str(&"\n".repeat(separator));
    output.push_str(body);
    output
}

/// Reject trees a DOM could never produce
fn validate(node: &Node) -> Result<()> {
    std::iter::once(node)
        .chain(node.descendants())
        .try_for_each(|n| match n.node_type {
            NodeType::Element if n.node_name.trim().is_empty() => Err(
                TurndownError::InvalidInput("element without a tag name".to_string()),
            ),
            NodeType::Text if n.node_value.is_none() => Err(TurndownError::InvalidInput(
                "text node without a value".to_string(),
            )),
            _ => Ok(()),
        })
}

fn post_process(output: &str) -> String {
    let result = output
        .trim_start_matches(['\t', '\r', '\n'])
        .trim_end();

    let mut newline_count = 0;
    let mut processed = String::with_capacity(result.len());

    for c in result.chars() {
        if c == '\n' {
            newline_count += 1;
            if newline_count <= 2 {
                processed.push(c);
            }
        } else {
            newline_count = 0;
            processed.push(c);
        }
    }

    processed
}
