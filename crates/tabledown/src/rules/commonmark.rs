//! CommonMark rules: the generic conversion every element falls back to.

use super::{Filter, Rule};
use crate::node::NodeRef;
use crate::service::{CodeBlockStyle, HeadingStyle};
use crate::utilities::clean_attribute;

/// All built-in rules, in lookup order
pub fn commonmark_rules() -> Vec<Rule> {
    vec![
        paragraph_rule(),
        line_break_rule(),
        heading_rule(),
        blockquote_rule(),
        list_rule(),
        list_item_rule(),
        indented_code_block_rule(),
        fenced_code_block_rule(),
        horizontal_rule(),
        inline_link_rule(),
        emphasis_rule(),
        strong_rule(),
        code_rule(),
        image_rule(),
    ]
}

fn paragraph_rule() -> Rule {
    Rule::for_tag("p", |_, content, _| format!("\n\n{}\n\n", content.trim()))
}

fn line_break_rule() -> Rule {
    Rule::for_tag("br", |_, _, service| format!("{}\n", service.options().br))
}

fn heading_rule() -> Rule {
    Rule::for_tags(&["h1", "h2", "h3", "h4", "h5", "h6"], |node, content, service| {
        let level: usize = node.tag_name()[1..].parse().unwrap_or(1);
        let content = content.trim();
        if content.is_empty() {
            return String::new();
        }

        match service.options().heading_style {
            HeadingStyle::Setext if level <= 2 => {
                let underline = if level == 1 { "=" } else { "-" };
                format!(
                    "\n\n{}\n{}\n\n",
                    content,
                    underline.repeat(content.chars().count())
                )
            }
            _ => format!("\n\n{} {}\n\n", "#".repeat(level), content),
        }
    })
}

fn blockquote_rule() -> Rule {
    Rule::for_tag("blockquote", |_, content, _| {
        let content = content.trim_matches('\n');
        if content.trim().is_empty() {
            return String::new();
        }
        let quoted: Vec<String> = content.lines().map(|line| format!("> {}", line)).collect();
        format!("\n\n{}\n\n", quoted.join("\n"))
    })
}

fn list_rule() -> Rule {
    Rule::for_tags(&["ul", "ol"], |node, content, _| {
        let content = content.trim_matches('\n');
        if node.parent_tag().as_deref() == Some("li") {
            format!("\n{}", content)
        } else {
            format!("\n\n{}\n\n", content)
        }
    })
}

fn list_item_rule() -> Rule {
    Rule::for_tag("li", |node, content, service| {
        let content = content.trim_matches('\n').replace('\n', "\n    ");

        let prefix = match node.parent() {
            Some(parent) if parent.is_tag("ol") => {
                let start: usize = parent
                    .attr("start")
                    .and_then(|s| s.trim().parse().ok())
                    .unwrap_or(1);
                format!("{}.  ", start.saturating_add(node.index()))
            }
            _ => format!("{}   ", service.options().bullet_list_marker),
        };

        format!("{}{}\n", prefix, content)
    })
}

/// The `<code>` child of a `<pre>`, if this is a code block
fn code_child<'a>(node: &NodeRef<'a>) -> Option<&'a crate::node::Node> {
    node.element_children().find(|c| c.is_tag("code"))
}

fn indented_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            tag == "pre"
                && code_child(node).is_some()
                && options.code_block_style == CodeBlockStyle::Indented
        }),
        |node, _, _| {
            let code = code_child(node).map(|c| c.text_content()).unwrap_or_default();
            let indented: Vec<String> = code
                .trim_end_matches('\n')
                .lines()
                .map(|line| format!("    {}", line))
                .collect();
            format!("\n\n{}\n\n", indented.join("\n"))
        },
    )
}

fn fenced_code_block_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, options| {
            tag == "pre"
                && code_child(node).is_some()
                && options.code_block_style == CodeBlockStyle::Fenced
        }),
        |node, _, service| {
            let Some(code_node) = code_child(node) else {
                return String::new();
            };
            let code = code_node.text_content();

            let language = code_node
                .attr("class")
                .unwrap_or("")
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-"))
                .unwrap_or("");

            let fence = fence_for(&code, &service.options().fence);
            format!(
                "\n\n{}{}\n{}\n{}\n\n",
                fence,
                language,
                code.trim_end_matches('\n'),
                fence
            )
        },
    )
}

/// Lengthen the configured fence until no line of `code` could close it
fn fence_for(code: &str, fence: &str) -> String {
    let Some(fence_char) = fence.chars().next() else {
        return "```".to_string();
    };
    let longest = code
        .lines()
        .map(|line| line.trim_start().chars().take_while(|&c| c == fence_char).count())
        .max()
        .unwrap_or(0);
    let len = fence.chars().count().max(longest + 1);
    fence_char.to_string().repeat(len)
}

fn horizontal_rule() -> Rule {
    Rule::for_tag("hr", |_, _, service| format!("\n\n{}\n\n", service.options().hr))
}

fn inline_link_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| tag == "a" && node.attr("href").is_some()),
        |node, content, _| {
            let href = clean_attribute(node.attr("href"));
            let title = clean_attribute(node.attr("title"));

            if href.is_empty() && title.is_empty() {
                return content.to_string();
            }

            let title_part = if title.is_empty() {
                String::new()
            } else {
                format!(" \"{}\"", title.replace('"', "\\\""))
            };

            format!("[{}]({}{})", content, href, title_part)
        },
    )
}

fn emphasis_rule() -> Rule {
    Rule::for_tags(&["em", "i"], |_, content, service| {
        if content.trim().is_empty() {
            return String::new();
        }
        let delimiter = service.options().em_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

fn strong_rule() -> Rule {
    Rule::for_tags(&["strong", "b"], |_, content, service| {
        if content.trim().is_empty() {
            return String::new();
        }
        let delimiter = &service.options().strong_delimiter;
        format!("{}{}{}", delimiter, content, delimiter)
    })
}

fn code_rule() -> Rule {
    Rule::new(
        Filter::predicate(|tag, node, _| {
            tag == "code" && node.parent_tag().as_deref() != Some("pre")
        }),
        |node, _, _| {
            let content = node.text_content().replace("\r\n", " ").replace(['\r', '\n'], " ");
            if content.is_empty() {
                return String::new();
            }

            // Shortest backtick run that does not occur in the content
            let mut runs: Vec<usize> = Vec::new();
            let mut current = 0;
            for c in content.chars().chain(std::iter::once('\0')) {
                if c == '`' {
                    current += 1;
                } else if current > 0 {
                    runs.push(current);
                    current = 0;
                }
            }
            let mut width = 1;
            while runs.contains(&width) {
                width += 1;
            }
            let delimiter = "`".repeat(width);

            let padded = content.starts_with('`')
                || content.ends_with('`')
                || (content.starts_with(' ')
                    && content.ends_with(' ')
                    && !content.trim().is_empty());
            let space = if padded { " " } else { "" };

            format!("{}{}{}{}{}", delimiter, space, content, space, delimiter)
        },
    )
}

fn image_rule() -> Rule {
    Rule::for_tag("img", |node, _, _| {
        let alt = clean_attribute(node.attr("alt"));
        let src = clean_attribute(node.attr("src"));
        let title = clean_attribute(node.attr("title"));

        if src.is_empty() {
            return String::new();
        }

        let title_part = if title.is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", title.replace('"', "\\\""))
        };

        format!("![{}]({}{})", alt, src, title_part)
    })
}
