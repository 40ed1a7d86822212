//! Markup fragment tree.
//!
//! The converter never touches a live rendering surface. Hosts decode whatever
//! they render (a browser DOM, an html5ever tree, a CDP snapshot) into this
//! structure once, and every rule works against it read-only.

use crate::utilities::is_void;

/// Node types, numbered like DOM `nodeType`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
    DocumentFragment = 11,
}

/// A node of a rendered markup fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub node_type: NodeType,

    /// Uppercase tag name for elements (`"TABLE"`), `#text` for text nodes
    pub node_name: String,

    /// Text content for text and comment nodes
    pub node_value: Option<String>,

    /// Flat `[name, value, name, value, ...]` list, elements only
    pub attributes: Option<Vec<String>>,

    pub children: Option<Vec<Node>>,
}

impl Node {
    /// Create an element node
    pub fn element(tag_name: &str) -> Self {
        Self {
            node_type: NodeType::Element,
            node_name: tag_name.to_uppercase(),
            node_value: None,
            attributes: Some(Vec::new()),
            children: Some(Vec::new()),
        }
    }

    /// Create an element node with attributes
    pub fn element_with_attrs(tag_name: &str, attrs: Vec<(&str, &str)>) -> Self {
        let mut node = Self::element(tag_name);
        node.attributes = Some(
            attrs
                .into_iter()
                .flat_map(|(name, value)| [name.to_string(), value.to_string()])
                .collect(),
        );
        node
    }

    /// Create a text node
    pub fn text(content: &str) -> Self {
        Self {
            node_type: NodeType::Text,
            node_name: "#text".to_string(),
            node_value: Some(content.to_string()),
            attributes: None,
            children: None,
        }
    }

    /// Create a comment node
    pub fn comment(content: &str) -> Self {
        Self {
            node_type: NodeType::Comment,
            node_name: "#comment".to_string(),
            node_value: Some(content.to_string()),
            attributes: None,
            children: None,
        }
    }

    /// Create an empty document fragment
    pub fn document_fragment() -> Self {
        Self {
            node_type: NodeType::DocumentFragment,
            node_name: "#document-fragment".to_string(),
            node_value: None,
            attributes: None,
            children: Some(Vec::new()),
        }
    }

    /// Builder-style child append
    pub fn with_child(mut self, child: Node) -> Self {
        self.add_child(child);
        self
    }

    /// Builder-style text child append
    pub fn with_text(self, text: &str) -> Self {
        self.with_child(Node::text(text))
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Document and fragment roots carry no markup of their own.
    pub fn is_container_root(&self) -> bool {
        matches!(
            self.node_type,
            NodeType::Document | NodeType::DocumentFragment
        )
    }

    /// Lowercase tag name
    pub fn tag_name(&self) -> String {
        self.node_name.to_lowercase()
    }

    /// Case-insensitive tag comparison
    pub fn is_tag(&self, tag: &str) -> bool {
        self.is_element() && self.node_name.eq_ignore_ascii_case(tag)
    }

    /// Get an attribute value by (case-insensitive) name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .as_deref()?
            .chunks_exact(2)
            .find(|pair| pair[0].eq_ignore_ascii_case(name))
            .map(|pair| pair[1].as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Whether the `class` attribute lists `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn children(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().flatten()
    }

    pub fn element_children(&self) -> impl Iterator<Item = &Node> {
        self.children().filter(|n| n.is_element())
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.get_or_insert_with(Vec::new).push(child);
    }

    /// Pre-order walk over every node below this one, excluding itself.
    pub fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Node> = self.children().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// First descendant element carrying `class` (`querySelector(".class")`).
    pub fn find_by_class(&self, class: &str) -> Option<&Node> {
        self.descendants()
            .find(|n| n.is_element() && n.has_class(class))
    }

    /// Detach the first descendant element carrying `class`, in document order.
    pub fn remove_first_by_class(&mut self, class: &str) -> Option<Node> {
        let children = self.children.as_mut()?;
        for i in 0..children.len() {
            if children[i].is_element() && children[i].has_class(class) {
                return Some(children.remove(i));
            }
            if let Some(found) = children[i].remove_first_by_class(class) {
                return Some(found);
            }
        }
        None
    }

    /// A fragment holding copies of this node's children (its inner markup).
    pub fn inner_fragment(&self) -> Node {
        Node {
            children: Some(self.children().cloned().collect()),
            ..Node::document_fragment()
        }
    }

    /// False for fragments that hold nothing but whitespace.
    pub fn has_content(&self) -> bool {
        match self.node_type {
            NodeType::Element => true,
            NodeType::Text => self
                .node_value
                .as_deref()
                .is_some_and(|t| !t.trim().is_empty()),
            NodeType::Comment => false,
            NodeType::Document | NodeType::DocumentFragment => {
                self.children().any(Node::has_content)
            }
        }
    }

    /// Concatenated text of this node and its descendants
    pub fn text_content(&self) -> String {
        match self.node_type {
            NodeType::Text => self.node_value.clone().unwrap_or_default(),
            NodeType::Comment => String::new(),
            _ => self.children().map(Node::text_content).collect(),
        }
    }

    /// Serialize back to HTML (used by keep filters)
    pub fn outer_html(&self) -> String {
        match self.node_type {
            NodeType::Text => escape_html_text(self.node_value.as_deref().unwrap_or("")),
            NodeType::Comment => format!("<!--{}-->", self.node_value.as_deref().unwrap_or("")),
            NodeType::Element => {
                let tag = self.tag_name();
                let attrs = self.attributes_string();
                let open = if attrs.is_empty() {
                    format!("<{}>", tag)
                } else {
                    format!("<{} {}>", tag, attrs)
                };

                if is_void(&tag) {
                    open
                } else {
                    format!("{}{}</{}>", open, self.inner_html(), tag)
                }
            }
            NodeType::Document | NodeType::DocumentFragment => self.inner_html(),
        }
    }

    pub fn inner_html(&self) -> String {
        self.children().map(Node::outer_html).collect()
    }

    fn attributes_string(&self) -> String {
        self.attributes
            .as_deref()
            .unwrap_or_default()
            .chunks_exact(2)
            .map(|pair| {
                if pair[1].is_empty() {
                    pair[0].clone()
                } else {
                    format!("{}=\"{}\"", pair[0], escape_html_attr(&pair[1]))
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Iterator returned by [`Node::descendants`].
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(node.children());
        self.stack[start..].reverse();
        Some(node)
    }
}

fn escape_html_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_html_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A node seen from its position in the tree.
///
/// Rules get the parent and the node's index among the parent's element
/// children, which is all the context list numbering and code detection need.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub node: &'a Node,
    parent: Option<&'a Node>,
    index: usize,
}

impl<'a> NodeRef<'a> {
    /// A root reference with no parent
    pub fn new(node: &'a Node) -> Self {
        Self {
            node,
            parent: None,
            index: 0,
        }
    }

    /// A reference to the `index`-th element child of `parent`
    pub fn child_of(node: &'a Node, parent: &'a Node, index: usize) -> Self {
        Self {
            node,
            parent: Some(parent),
            index,
        }
    }

    pub fn parent(&self) -> Option<&'a Node> {
        self.parent
    }

    /// Lowercase parent tag, if the parent is an element
    pub fn parent_tag(&self) -> Option<String> {
        self.parent.filter(|p| p.is_element()).map(Node::tag_name)
    }

    /// Position among the parent's element children
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tag_name(&self) -> String {
        self.node.tag_name()
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.node.attr(name)
    }

    pub fn element_children(&self) -> impl Iterator<Item = &'a Node> {
        self.node.element_children()
    }

    pub fn text_content(&self) -> String {
        self.node.text_content()
    }
}
