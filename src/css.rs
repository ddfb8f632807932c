use crate::converter::SemanticRule;
use crate::mapping::{Declaration, DeclarationKind};

pub const HEADER: &str = "/* Generated CSS Module */\n/* Converted from Tailwind CSS classes */";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CssOptions {
    pub minify: bool,
    pub header: bool,
}

impl Default for CssOptions {
    fn default() -> Self {
        Self {
            minify: false,
            header: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssOutput(String);

impl CssOutput {
    pub fn new(css: String) -> Self {
        Self(css)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(needle)
    }
}

/// Declarations of one rule split by where they are rendered.
#[derive(Debug, Default)]
struct Sections<'a> {
    properties: Vec<&'a Declaration>,
    comments: Vec<(String, &'a str)>,
    hover: Vec<&'a str>,
    media: Vec<(&'a str, &'a str)>,
}

impl<'a> Sections<'a> {
    fn split(declarations: &'a [Declaration]) -> Self {
        let mut sections = Self::default();
        for declaration in declarations {
            match declaration.kind() {
                DeclarationKind::Property => sections.properties.push(declaration),
                DeclarationKind::Comment => sections
                    .comments
                    .push((declaration.name.clone(), declaration.value.as_str())),
                DeclarationKind::PseudoState(_) => sections.hover.push(declaration.value.as_str()),
                DeclarationKind::Media(_) => sections
                    .media
                    .push((declaration.name.as_str(), declaration.value.as_str())),
                DeclarationKind::AtRule => sections
                    .comments
                    .push((format!("/* {} */", declaration.name), declaration.value.as_str())),
            }
        }
        sections
    }
}

pub fn generate(rules: &[SemanticRule], options: CssOptions) -> CssOutput {
    let blocks: Vec<String> = rules
        .iter()
        .map(|semantic| rule(semantic, options))
        .collect();

    let mut css = String::new();
    if options.header && !options.minify {
        css.push_str(HEADER);
        css.push_str("\n\n");
    }
    if options.minify {
        css.push_str(&blocks.concat());
    } else {
        css.push_str(&blocks.join("\n\n"));
        if !blocks.is_empty() {
            css.push('\n');
        }
    }
    CssOutput::new(css)
}

/// Renders one rule: properties, comments, then the `:hover` block and any
/// `@media` blocks.
pub fn rule(semantic: &SemanticRule, options: CssOptions) -> String {
    let selector = semantic.selector();
    let sections = Sections::split(&semantic.declarations);
    if options.minify {
        return minified_rule(&selector, &sections);
    }

    let mut out = format!("{} {{\n", selector);
    for property in &sections.properties {
        out.push_str(&format!("  {}: {};\n", property.name, property.value));
    }
    for (name, value) in &sections.comments {
        if value.is_empty() {
            out.push_str(&format!("  {}\n", name));
        } else {
            out.push_str(&format!("  {} {}\n", name, value));
        }
    }
    out.push('}');

    if !sections.hover.is_empty() {
        out.push_str(&format!("\n\n{}:hover {{\n", selector));
        for value in &sections.hover {
            out.push_str(&format!("  {};\n", value));
        }
        out.push('}');
    }

    for (query, value) in &sections.media {
        out.push_str(&format!(
            "\n\n{} {{\n  {} {{\n    {};\n  }}\n}}",
            query, selector, value
        ));
    }
    out
}

/// Comments are dropped when minifying.
fn minified_rule(selector: &str, sections: &Sections<'_>) -> String {
    let mut out = String::new();
    if !sections.properties.is_empty() {
        let body: String = sections
            .properties
            .iter()
            .map(|property| format!("{}:{};", property.name, property.value))
            .collect();
        out.push_str(&format!("{}{{{}}}", selector, body));
    }
    if !sections.hover.is_empty() {
        let body: String = sections
            .hover
            .iter()
            .map(|value| format!("{};", compact(value)))
            .collect();
        out.push_str(&format!("{}:hover{{{}}}", selector, body));
    }
    for (query, value) in &sections.media {
        out.push_str(&format!("{}{{{}{{{};}}}}", query, selector, compact(value)));
    }
    out
}

fn compact(declaration: &str) -> String {
    declaration.replacen(": ", ":", 1)
}
