use regex::Regex;
use std::sync::OnceLock;

use crate::converter::SemanticRule;
use crate::scanner::{ClassUsage, Document};

/// How a rewritten attribute refers to its generated class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassStyle {
    /// `className={styles.name}` plus a module import.
    Module,
    /// `class="kept name"` plus a stylesheet link where a `<head>` exists.
    Plain,
}

/// Rewrites every class attribute of `document` to reference the rule that
/// covers most of its utility tokens. `stylesheet` is the generated CSS file
/// name, e.g. `Card.module.css`.
pub fn rewrite(
    document: &Document,
    rules: &[SemanticRule],
    style: ClassStyle,
    stylesheet: &str,
) -> String {
    let mut content = document.text.clone();
    // Back to front so earlier spans stay valid.
    for usage in document.usages.iter().rev() {
        let replacement = replace_attribute(usage, rules, style);
        let mut start = usage.span.start;
        if replacement.is_empty() {
            start = trim_preceding_space(&content, start);
        }
        content.replace_range(start..usage.span.end, &replacement);
    }

    match style {
        ClassStyle::Module => add_module_import(&content, stylesheet),
        ClassStyle::Plain => add_stylesheet_link(&content, stylesheet),
    }
}

fn trim_preceding_space(content: &str, start: usize) -> usize {
    match content[..start].chars().next_back() {
        Some(ch) if ch == ' ' || ch == '\t' => start - 1,
        _ => start,
    }
}

/// Rule sharing the most utility tokens with `usage`; same-element rules win
/// ties, then the earlier rule.
fn best_match<'a>(usage: &ClassUsage, rules: &'a [SemanticRule]) -> Option<&'a SemanticRule> {
    let mut best: Option<(&SemanticRule, (usize, bool))> = None;
    for rule in rules {
        let matches = usage
            .tokens
            .iter()
            .filter(|token| rule.original_tokens().any(|original| original == token.as_str()))
            .count();
        if matches == 0 {
            continue;
        }
        let score = (matches, rule.element == usage.element);
        if best.is_none_or(|(_, current)| score > current) {
            best = Some((rule, score));
        }
    }
    best.map(|(rule, _)| rule)
}

pub fn replace_attribute(usage: &ClassUsage, rules: &[SemanticRule], style: ClassStyle) -> String {
    let semantic = best_match(usage, rules).map(|rule| rule.name.as_str());
    let kept = usage.retained.join(" ");
    let attribute = usage.attribute.as_str();

    match style {
        ClassStyle::Plain => {
            let classes: Vec<&str> = usage
                .retained
                .iter()
                .map(String::as_str)
                .chain(semantic)
                .collect();
            if classes.is_empty() {
                String::new()
            } else {
                format!("{}=\"{}\"", attribute, classes.join(" "))
            }
        }
        ClassStyle::Module => match (kept.is_empty(), semantic) {
            (true, None) => String::new(),
            (false, None) => format!("{}=\"{}\"", attribute, kept),
            (true, Some(name)) => format!("{}={{{}}}", attribute, module_reference(name)),
            (false, Some(name)) => format!(
                "{}={{[\"{}\", {}].join(' ')}}",
                attribute,
                kept,
                module_reference(name)
            ),
        },
    }
}

/// `styles.card` or `styles["card-container"]` for names that are not
/// identifiers.
fn module_reference(name: &str) -> String {
    let is_identifier = name
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$')
        && !name.starts_with(|ch: char| ch.is_ascii_digit());
    if is_identifier {
        format!("styles.{}", name)
    } else {
        format!("styles[\"{}\"]", name)
    }
}

fn module_import_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r#"import\s+.*from\s+['"].*\.module\.css['"]"#)
            .expect("module import pattern is valid")
    })
}

/// Adds `import styles from './<stylesheet>';` after the last import, before
/// the first export when there are no imports, else at the top.
pub fn add_module_import(content: &str, stylesheet: &str) -> String {
    if module_import_regex().is_match(content) {
        return content.to_string();
    }
    let statement = format!("import styles from './{}';", stylesheet);
    let mut lines: Vec<&str> = content.split('\n').collect();
    let index = import_insert_position(&lines);
    lines.insert(index, &statement);
    lines.join("\n")
}

fn import_insert_position(lines: &[&str]) -> usize {
    let mut last_import = None;
    for (index, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with("/*") {
            continue;
        }
        if line.starts_with("import ") {
            last_import = Some(index);
        } else if let Some(last) = last_import {
            return last + 1;
        } else if line.starts_with("export ") {
            return index;
        }
    }
    last_import.map(|last| last + 1).unwrap_or(0)
}

/// Links the stylesheet from `<head>` when the document has one.
pub fn add_stylesheet_link(content: &str, stylesheet: &str) -> String {
    let href = format!("./{}", stylesheet);
    if content.contains(&href) {
        return content.to_string();
    }
    match content.find("</head>") {
        Some(index) => {
            let mut out = String::with_capacity(content.len() + href.len() + 40);
            out.push_str(&content[..index]);
            out.push_str(&format!("  <link rel=\"stylesheet\" href=\"{}\">\n", href));
            out.push_str(&content[index..]);
            out
        }
        None => content.to_string(),
    }
}
