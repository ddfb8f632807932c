use std::collections::BTreeMap;

use crate::converter::SemanticRule;
use crate::mapping::{
    Declaration, DeclarationKind, MappingEngine, breakpoint_name, single_property_entries,
    spacing, text_size_entries,
};

pub const APPLY_HEADER: &str =
    "/* Generated CSS using @apply strategy */\n/* This CSS will be compiled to vanilla CSS */\n\n";

const NO_THEME: &str = "/* No theme variables extracted */";

/// Spacing properties and the utility prefix that produces them.
const SPACING_PROPERTIES: [(&str, &str); 17] = [
    ("padding", "p"),
    ("padding-top", "pt"),
    ("padding-right", "pr"),
    ("padding-bottom", "pb"),
    ("padding-left", "pl"),
    ("margin", "m"),
    ("margin-top", "mt"),
    ("margin-right", "mr"),
    ("margin-bottom", "mb"),
    ("margin-left", "ml"),
    ("gap", "gap"),
    ("width", "w"),
    ("height", "h"),
    ("top", "top"),
    ("right", "right"),
    ("bottom", "bottom"),
    ("left", "left"),
];

const COLOR_PROPERTIES: [(&str, &str); 3] = [
    ("background-color", "bg"),
    ("color", "text"),
    ("border-color", "border"),
];

/// Maps generated declarations back to utility tokens for `@apply`.
/// Declarations without a utility equivalent are skipped.
pub fn utilities_for(declarations: &[Declaration], engine: &MappingEngine) -> Vec<String> {
    let mut utilities: Vec<String> = Vec::new();
    for declaration in declarations {
        if let Some(utility) = utility_for(declaration, engine) {
            if !utilities.contains(&utility) {
                utilities.push(utility);
            }
        }
    }
    utilities
}

fn utility_for(declaration: &Declaration, engine: &MappingEngine) -> Option<String> {
    match declaration.kind() {
        DeclarationKind::Property => {
            property_utility(&declaration.name, &declaration.value, engine)
        }
        DeclarationKind::PseudoState(state) => {
            let inner = nested_declaration(&declaration.value)?;
            let utility = property_utility(&inner.name, &inner.value, engine)?;
            Some(format!("{}:{}", state, utility))
        }
        DeclarationKind::Media(query) => {
            let breakpoint = breakpoint_name(query)?;
            let inner = nested_declaration(&declaration.value)?;
            let utility = property_utility(&inner.name, &inner.value, engine)?;
            Some(format!("{}:{}", breakpoint, utility))
        }
        DeclarationKind::Comment | DeclarationKind::AtRule => None,
    }
}

/// `background-color: #1d4ed8` -> declaration.
fn nested_declaration(value: &str) -> Option<Declaration> {
    let (name, value) = value.split_once(':')?;
    Some(Declaration::new(name.trim(), value.trim()))
}

fn property_utility(name: &str, value: &str, engine: &MappingEngine) -> Option<String> {
    if let Some((token, _, _)) = single_property_entries()
        .find(|(_, property, expected)| *property == name && *expected == value)
    {
        return Some(token.to_string());
    }
    if let Some((_, prefix)) = SPACING_PROPERTIES.iter().find(|(property, _)| *property == name) {
        return spacing_units(value).map(|units| format!("{}-{}", prefix, units));
    }
    if let Some((_, prefix)) = COLOR_PROPERTIES.iter().find(|(property, _)| *property == name) {
        return engine
            .color_token(value)
            .map(|color| format!("{}-{}", prefix, color));
    }
    match name {
        "font-size" => text_size_entries()
            .iter()
            .find(|(_, size)| *size == value)
            .map(|(size_name, _)| format!("text-{}", size_name)),
        "opacity" => value
            .parse::<f64>()
            .ok()
            .map(|opacity| format!("opacity-{}", (opacity * 100.0).round())),
        "z-index" => value.parse::<u32>().ok().map(|index| format!("z-{}", index)),
        "border-width" => value
            .strip_suffix("px")
            .and_then(|width| width.parse::<u32>().ok())
            .map(|width| format!("border-{}", width)),
        _ => None,
    }
}

/// `1rem` -> `4`, `0.125rem` -> `0.5`.
fn spacing_units(value: &str) -> Option<String> {
    let rem = value.strip_suffix("rem")?.parse::<f64>().ok()?;
    Some(format!("{}", rem / 0.25))
}

/// One rule per semantic class, each with a single `@apply` line.
pub fn generate_apply_css(rules: &[SemanticRule], engine: &MappingEngine) -> String {
    let mut css = String::from(APPLY_HEADER);
    for rule in rules {
        css.push_str(&format!("{} {{\n", rule.selector()));
        let utilities = utilities_for(&rule.declarations, engine);
        if !utilities.is_empty() {
            css.push_str(&format!("  @apply {};\n", utilities.join(" ")));
        }
        css.push_str("}\n\n");
    }
    css
}

/// `:root` design tokens for the colors, spacing, radii and font sizes the
/// rules use.
pub fn generate_theme_css(
    rules: &[SemanticRule],
    engine: &MappingEngine,
    component: &str,
) -> String {
    let mut variables = BTreeMap::new();
    for rule in rules {
        for utility in utilities_for(&rule.declarations, engine) {
            let base = utility.rsplit(':').next().unwrap_or(utility.as_str());
            if let Some((name, value)) = theme_variable(base, engine) {
                variables.insert(name, value);
            }
        }
    }

    if variables.is_empty() {
        return NO_THEME.to_string();
    }
    let mut css = format!("/* Theme variables for {} component */\n:root {{\n", component);
    for (name, value) in &variables {
        css.push_str(&format!("  {}: {};\n", name, value));
    }
    css.push('}');
    css
}

fn theme_variable(utility: &str, engine: &MappingEngine) -> Option<(String, String)> {
    for (_, prefix) in COLOR_PROPERTIES {
        let Some(color) = utility
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('-'))
        else {
            continue;
        };
        if let Some((family, shade)) = color.rsplit_once('-') {
            if shade.chars().all(|ch| ch.is_ascii_digit()) {
                return Some((format!("--color-{}", color), engine.color(family, shade)));
            }
        }
        if color == "white" || color == "black" {
            let value = engine.resolve(utility).into_iter().next()?.value;
            return Some((format!("--color-{}", color), value));
        }
    }

    if utility == "rounded" || utility.starts_with("rounded-") {
        let value = engine.resolve(utility).into_iter().next()?.value;
        let name = match utility.strip_prefix("rounded-") {
            Some(size) => format!("--border-radius-{}", size),
            None => "--border-radius".to_string(),
        };
        return Some((name, value));
    }

    if let Some(size) = utility.strip_prefix("text-") {
        if text_size_entries().iter().any(|(name, _)| *name == size) {
            let value = engine.resolve(utility).into_iter().next()?.value;
            return Some((format!("--font-size-{}", size), value));
        }
    }

    let (prefix, units) = utility.rsplit_once('-')?;
    let is_spacing = SPACING_PROPERTIES.iter().any(|(_, candidate)| *candidate == prefix);
    if is_spacing && units.parse::<f64>().is_ok() {
        return Some((format!("--spacing-{}", units), spacing(units)));
    }
    None
}
