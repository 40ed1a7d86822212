//! Rule registry.
//!
//! Lookup order is custom rules (in insertion order), then the built-in
//! CommonMark rules. Keep and remove filters only apply to elements that no
//! rule claims.

mod commonmark;
mod rule;
mod table;

pub use commonmark::commonmark_rules;
pub use rule::{Filter, PredicateFn, ReplacementFn, Rule};
pub use table::{table_rule, TABLE_RULE_KEY};

use indexmap::IndexMap;

use crate::node::NodeRef;
use crate::service::TurndownOptions;

pub struct Rules {
    custom_rules: IndexMap<String, Rule>,
    keep_rules: Vec<Filter>,
    remove_rules: Vec<Filter>,
    commonmark_rules: Vec<Rule>,
}

impl Rules {
    pub fn new() -> Self {
        Self {
            custom_rules: IndexMap::new(),
            keep_rules: Vec::new(),
            remove_rules: Vec::new(),
            commonmark_rules: commonmark_rules(),
        }
    }

    /// Register a custom rule. Re-using a key replaces the earlier rule in place.
    pub fn add(&mut self, key: &str, rule: Rule) {
        self.custom_rules.insert(key.to_string(), rule);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.custom_rules.contains_key(key)
    }

    pub fn keep(&mut self, filter: Filter) {
        self.keep_rules.push(filter);
    }

    pub fn remove(&mut self, filter: Filter) {
        self.remove_rules.push(filter);
    }

    /// First rule claiming this element
    pub fn for_node<'a>(&'a self, node: &NodeRef, options: &TurndownOptions) -> Option<&'a Rule> {
        let tag = node.tag_name();
        self.custom_rules
            .values()
            .chain(&self.commonmark_rules)
            .find(|rule| rule.filter.matches(&tag, node, options))
    }

    pub fn should_keep(&self, node: &NodeRef, options: &TurndownOptions) -> bool {
        self.unclaimed_match(&self.keep_rules, node, options)
    }

    pub fn should_remove(&self, node: &NodeRef, options: &TurndownOptions) -> bool {
        !self.should_keep(node, options) && self.unclaimed_match(&self.remove_rules, node, options)
    }

    fn unclaimed_match(&self, filters: &[Filter], node: &NodeRef, options: &TurndownOptions) -> bool {
        if self.for_node(node, options).is_some() {
            return false;
        }
        let tag = node.tag_name();
        filters.iter().any(|f| f.matches(&tag, node, options))
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::new()
    }
}
