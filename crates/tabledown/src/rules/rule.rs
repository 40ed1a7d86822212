//! Rule and Filter types.

use crate::node::NodeRef;
use crate::service::{TurndownOptions, TurndownService};

/// Replacement callback: the matched node, its already-converted content, and
/// the service running the conversion (so a rule can convert sub-trees itself).
pub type ReplacementFn =
    Box<dyn Fn(&NodeRef, &str, &TurndownService) -> String + Send + Sync>;

/// Predicate callback over the lowercase tag name and the node
pub type PredicateFn = Box<dyn Fn(&str, &NodeRef, &TurndownOptions) -> bool + Send + Sync>;

/// Decides which elements a rule applies to
pub enum Filter {
    TagName(String),
    TagNames(Vec<String>),
    Predicate(PredicateFn),
}

impl Filter {
    pub fn tag(name: &str) -> Self {
        Filter::TagName(name.to_lowercase())
    }

    pub fn tags(names: &[&str]) -> Self {
        Filter::TagNames(names.iter().map(|s| s.to_lowercase()).collect())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str, &NodeRef, &TurndownOptions) -> bool + Send + Sync + 'static,
    {
        Filter::Predicate(Box::new(f))
    }

    /// `tag` must already be lowercase
    pub fn matches(&self, tag: &str, node: &NodeRef, options: &TurndownOptions) -> bool {
        match self {
            Filter::TagName(t) => tag == t,
            Filter::TagNames(tags) => tags.iter().any(|t| t == tag),
            Filter::Predicate(f) => f(tag, node, options),
        }
    }
}

/// How a matched element becomes Markdown
pub struct Rule {
    pub filter: Filter,
    pub replacement: ReplacementFn,
    /// Whether the service converts the children before calling `replacement`
    pub uses_content: bool,
}

impl Rule {
    pub fn new<F>(filter: Filter, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &TurndownService) -> String + Send + Sync + 'static,
    {
        Self {
            filter,
            replacement: Box::new(replacement),
            uses_content: true,
        }
    }

    pub fn for_tag<F>(tag: &str, replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &TurndownService) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tag(tag), replacement)
    }

    pub fn for_tags<F>(tags: &[&str], replacement: F) -> Self
    where
        F: Fn(&NodeRef, &str, &TurndownService) -> String + Send + Sync + 'static,
    {
        Self::new(Filter::tags(tags), replacement)
    }

    /// The replacement receives empty content; for rules that convert the
    /// sub-tree themselves.
    pub fn ignoring_content(mut self) -> Self {
        self.uses_content = false;
        self
    }

    pub fn replace(&self, node: &NodeRef, content: &str, service: &TurndownService) -> String {
        (self.replacement)(node, content, service)
    }
}
