use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use crate::modern;

/// One CSS property/value pair produced for a utility token.
///
/// Besides plain properties, the name may carry a comment marker (`/* ... */`),
/// a pseudo-state (`:hover`) or an at-rule prelude (`@media (...)`); see
/// [`DeclarationKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Declaration {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind<'a> {
    Property,
    Comment,
    PseudoState(&'a str),
    Media(&'a str),
    AtRule,
}

impl Declaration {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Diagnostic pair rendered as `/* label */ value` in the output.
    pub fn comment(label: &str, value: impl Into<String>) -> Self {
        Self::new(format!("/* {} */", label), value)
    }

    pub fn kind(&self) -> DeclarationKind<'_> {
        let name = self.name.as_str();
        if name.starts_with("/*") {
            DeclarationKind::Comment
        } else if let Some(pseudo) = name.strip_prefix(':') {
            DeclarationKind::PseudoState(pseudo)
        } else if let Some(query) = name.strip_prefix("@media") {
            DeclarationKind::Media(query.trim())
        } else if name.starts_with('@') {
            DeclarationKind::AtRule
        } else {
            DeclarationKind::Property
        }
    }

    /// Key under which two declarations collide when a rule is assembled.
    ///
    /// Comments never collide unless identical; nested declarations collide
    /// on the property they set inside their block.
    pub fn merge_key(&self) -> String {
        match self.kind() {
            DeclarationKind::Property => self.name.clone(),
            DeclarationKind::PseudoState(_) | DeclarationKind::Media(_) => {
                let inner = self
                    .value
                    .split_once(':')
                    .map(|(property, _)| property.trim())
                    .unwrap_or(self.value.as_str());
                format!("{} {}", self.name, inner)
            }
            DeclarationKind::Comment | DeclarationKind::AtRule => {
                format!("{}\u{0}{}", self.name, self.value)
            }
        }
    }
}

type Entry = (&'static str, &'static [(&'static str, &'static str)]);

const DEFAULT_BORDER: &str = "1px solid #e5e7eb";

const STATIC_MAPPINGS: &[Entry] = &[
    // display
    ("flex", &[("display", "flex")]),
    ("inline-flex", &[("display", "inline-flex")]),
    ("grid", &[("display", "grid")]),
    ("block", &[("display", "block")]),
    ("inline", &[("display", "inline")]),
    ("inline-block", &[("display", "inline-block")]),
    ("hidden", &[("display", "none")]),
    // flex direction and wrapping
    ("flex-row", &[("flex-direction", "row")]),
    ("flex-col", &[("flex-direction", "column")]),
    ("flex-row-reverse", &[("flex-direction", "row-reverse")]),
    ("flex-col-reverse", &[("flex-direction", "column-reverse")]),
    ("flex-wrap", &[("flex-wrap", "wrap")]),
    ("flex-1", &[("flex", "1 1 0%")]),
    // alignment
    ("items-start", &[("align-items", "flex-start")]),
    ("items-center", &[("align-items", "center")]),
    ("items-end", &[("align-items", "flex-end")]),
    ("items-stretch", &[("align-items", "stretch")]),
    ("items-baseline", &[("align-items", "baseline")]),
    ("justify-start", &[("justify-content", "flex-start")]),
    ("justify-center", &[("justify-content", "center")]),
    ("justify-end", &[("justify-content", "flex-end")]),
    ("justify-between", &[("justify-content", "space-between")]),
    ("justify-around", &[("justify-content", "space-around")]),
    ("justify-evenly", &[("justify-content", "space-evenly")]),
    // text alignment and decoration
    ("text-left", &[("text-align", "left")]),
    ("text-center", &[("text-align", "center")]),
    ("text-right", &[("text-align", "right")]),
    ("text-justify", &[("text-align", "justify")]),
    ("underline", &[("text-decoration-line", "underline")]),
    ("uppercase", &[("text-transform", "uppercase")]),
    ("lowercase", &[("text-transform", "lowercase")]),
    ("capitalize", &[("text-transform", "capitalize")]),
    ("truncate", &[
        ("overflow", "hidden"),
        ("text-overflow", "ellipsis"),
        ("white-space", "nowrap"),
    ]),
    // font weight
    ("font-thin", &[("font-weight", "100")]),
    ("font-light", &[("font-weight", "300")]),
    ("font-normal", &[("font-weight", "400")]),
    ("font-medium", &[("font-weight", "500")]),
    ("font-semibold", &[("font-weight", "600")]),
    ("font-bold", &[("font-weight", "700")]),
    ("font-extrabold", &[("font-weight", "800")]),
    ("font-black", &[("font-weight", "900")]),
    // position
    ("static", &[("position", "static")]),
    ("relative", &[("position", "relative")]),
    ("absolute", &[("position", "absolute")]),
    ("fixed", &[("position", "fixed")]),
    ("sticky", &[("position", "sticky")]),
    ("inset-0", &[("inset", "0")]),
    // layout
    ("container", &[("max-width", "1200px"), ("margin", "0 auto")]),
    ("mx-auto", &[("margin-left", "auto"), ("margin-right", "auto")]),
    ("w-full", &[("width", "100%")]),
    ("h-full", &[("height", "100%")]),
    ("w-screen", &[("width", "100vw")]),
    ("h-screen", &[("height", "100vh")]),
    ("min-h-screen", &[("min-height", "100vh")]),
    ("max-w-sm", &[("max-width", "24rem")]),
    ("max-w-md", &[("max-width", "28rem")]),
    ("max-w-lg", &[("max-width", "32rem")]),
    ("max-w-xl", &[("max-width", "36rem")]),
    ("max-w-2xl", &[("max-width", "42rem")]),
    ("overflow-hidden", &[("overflow", "hidden")]),
    ("overflow-auto", &[("overflow", "auto")]),
    ("cursor-pointer", &[("cursor", "pointer")]),
    // fixed colors
    ("bg-white", &[("background-color", "#ffffff")]),
    ("bg-black", &[("background-color", "#000000")]),
    ("bg-transparent", &[("background-color", "transparent")]),
    ("text-white", &[("color", "#ffffff")]),
    ("text-black", &[("color", "#000000")]),
    // border
    ("border", &[("border", DEFAULT_BORDER)]),
    ("border-b", &[("border-bottom", DEFAULT_BORDER)]),
    ("border-t", &[("border-top", DEFAULT_BORDER)]),
    ("border-l", &[("border-left", DEFAULT_BORDER)]),
    ("border-r", &[("border-right", DEFAULT_BORDER)]),
    // radius
    ("rounded", &[("border-radius", "0.25rem")]),
    ("rounded-md", &[("border-radius", "0.375rem")]),
    ("rounded-lg", &[("border-radius", "0.5rem")]),
    ("rounded-xl", &[("border-radius", "0.75rem")]),
    ("rounded-2xl", &[("border-radius", "1rem")]),
    ("rounded-full", &[("border-radius", "9999px")]),
    // shadow
    ("shadow", &[(
        "box-shadow",
        "0 1px 3px 0 rgba(0, 0, 0, 0.1), 0 1px 2px 0 rgba(0, 0, 0, 0.06)",
    )]),
    ("shadow-md", &[(
        "box-shadow",
        "0 4px 6px -1px rgba(0, 0, 0, 0.1), 0 2px 4px -1px rgba(0, 0, 0, 0.06)",
    )]),
    ("shadow-lg", &[(
        "box-shadow",
        "0 10px 15px -3px rgba(0, 0, 0, 0.1), 0 4px 6px -2px rgba(0, 0, 0, 0.05)",
    )]),
    ("shadow-none", &[("box-shadow", "none")]),
    // transition
    ("transition", &[("transition", "all 150ms ease-in-out")]),
    ("transition-shadow", &[("transition", "box-shadow 150ms ease-in-out")]),
    ("transition-colors", &[(
        "transition",
        "color, background-color, border-color 150ms ease-in-out",
    )]),
    // grid
    ("grid-cols-1", &[("grid-template-columns", "repeat(1, minmax(0, 1fr))")]),
    ("grid-cols-2", &[("grid-template-columns", "repeat(2, minmax(0, 1fr))")]),
    ("grid-cols-3", &[("grid-template-columns", "repeat(3, minmax(0, 1fr))")]),
    ("grid-cols-4", &[("grid-template-columns", "repeat(4, minmax(0, 1fr))")]),
    // focus presets
    ("focus:outline-none", &[("outline", "none")]),
    ("focus:ring-2", &[("box-shadow", "0 0 0 2px rgba(59, 130, 246, 0.5)")]),
];

const TEXT_SIZES: [(&str, &str); 13] = [
    ("xs", "0.75rem"),
    ("sm", "0.875rem"),
    ("base", "1rem"),
    ("lg", "1.125rem"),
    ("xl", "1.25rem"),
    ("2xl", "1.5rem"),
    ("3xl", "1.875rem"),
    ("4xl", "2.25rem"),
    ("5xl", "3rem"),
    ("6xl", "3.75rem"),
    ("7xl", "4.5rem"),
    ("8xl", "6rem"),
    ("9xl", "8rem"),
];

type Shades = [(&'static str, &'static str); 10];

const PALETTE: [(&str, Shades); 5] = [
    (
        "blue",
        [
            ("50", "#eff6ff"),
            ("100", "#dbeafe"),
            ("200", "#bfdbfe"),
            ("300", "#93c5fd"),
            ("400", "#60a5fa"),
            ("500", "#3b82f6"),
            ("600", "#2563eb"),
            ("700", "#1d4ed8"),
            ("800", "#1e40af"),
            ("900", "#1e3a8a"),
        ],
    ),
    (
        "red",
        [
            ("50", "#fef2f2"),
            ("100", "#fee2e2"),
            ("200", "#fecaca"),
            ("300", "#fca5a5"),
            ("400", "#f87171"),
            ("500", "#ef4444"),
            ("600", "#dc2626"),
            ("700", "#b91c1c"),
            ("800", "#991b1b"),
            ("900", "#7f1d1d"),
        ],
    ),
    (
        "green",
        [
            ("50", "#f0fdf4"),
            ("100", "#dcfce7"),
            ("200", "#bbf7d0"),
            ("300", "#86efac"),
            ("400", "#4ade80"),
            ("500", "#22c55e"),
            ("600", "#16a34a"),
            ("700", "#15803d"),
            ("800", "#166534"),
            ("900", "#14532d"),
        ],
    ),
    (
        "gray",
        [
            ("50", "#f9fafb"),
            ("100", "#f3f4f6"),
            ("200", "#e5e7eb"),
            ("300", "#d1d5db"),
            ("400", "#9ca3af"),
            ("500", "#6b7280"),
            ("600", "#4b5563"),
            ("700", "#374151"),
            ("800", "#1f2937"),
            ("900", "#111827"),
        ],
    ),
    (
        "purple",
        [
            ("50", "#faf5ff"),
            ("100", "#f3e8ff"),
            ("200", "#e9d5ff"),
            ("300", "#d8b4fe"),
            ("400", "#c084fc"),
            ("500", "#a855f7"),
            ("600", "#9333ea"),
            ("700", "#7c3aed"),
            ("800", "#6b21a8"),
            ("900", "#581c87"),
        ],
    ),
];

const FALLBACK_COLOR: &str = "#000000";

const BREAKPOINTS: [(&str, &str); 5] = [
    ("sm", "(min-width: 640px)"),
    ("md", "(min-width: 768px)"),
    ("lg", "(min-width: 1024px)"),
    ("xl", "(min-width: 1280px)"),
    ("2xl", "(min-width: 1536px)"),
];

const FALLBACK_BREAKPOINT: &str = "(min-width: 768px)";

type Convert = fn(&MappingEngine, &Captures<'_>) -> Vec<Declaration>;

struct PatternRule {
    pattern: Regex,
    convert: Convert,
}

/// Pattern rules in registration order; the first match wins.
const PATTERN_SOURCES: &[(&str, Convert)] = &[
    (r"^gap-(\d+(?:\.\d+)?)$", |_, caps| {
        vec![Declaration::new("gap", spacing(&caps[1]))]
    }),
    (r"^p-(\d+(?:\.\d+)?)$", |_, caps| {
        vec![Declaration::new("padding", spacing(&caps[1]))]
    }),
    (r"^p([xytrbl])-(\d+(?:\.\d+)?)$", |_, caps| {
        directional("padding", &caps[1], &spacing(&caps[2]))
    }),
    (r"^m-(\d+(?:\.\d+)?)$", |_, caps| {
        vec![Declaration::new("margin", spacing(&caps[1]))]
    }),
    (r"^m([xytrbl])-(\d+(?:\.\d+)?)$", |_, caps| {
        directional("margin", &caps[1], &spacing(&caps[2]))
    }),
    (r"^w-(\d+(?:\.\d+)?)$", |_, caps| {
        vec![Declaration::new("width", spacing(&caps[1]))]
    }),
    (r"^h-(\d+(?:\.\d+)?)$", |_, caps| {
        vec![Declaration::new("height", spacing(&caps[1]))]
    }),
    (r"^(top|right|bottom|left)-(\d+(?:\.\d+)?)$", |_, caps| {
        vec![Declaration::new(&caps[1], spacing(&caps[2]))]
    }),
    (r"^text-(xs|sm|base|lg|xl|2xl|3xl|4xl|5xl|6xl|7xl|8xl|9xl)$", |_, caps| {
        vec![Declaration::new("font-size", text_size(&caps[1]))]
    }),
    (r"^opacity-(\d+)$", |_, caps| {
        vec![Declaration::new("opacity", percent_fraction(&caps[1]))]
    }),
    (r"^z-(\d+)$", |_, caps| vec![Declaration::new("z-index", &caps[1])]),
    (r"^border-(\d+)$", |_, caps| {
        vec![Declaration::new("border-width", format!("{}px", &caps[1]))]
    }),
    (r"^bg-(\w+)-(\d+)$", |engine, caps| {
        vec![Declaration::new(
            "background-color",
            engine.color(&caps[1], &caps[2]),
        )]
    }),
    (r"^text-(\w+)-(\d+)$", |engine, caps| {
        vec![Declaration::new("color", engine.color(&caps[1], &caps[2]))]
    }),
    (r"^border-(\w+)-(\d+)$", |engine, caps| {
        vec![Declaration::new(
            "border-color",
            engine.color(&caps[1], &caps[2]),
        )]
    }),
    (r"^(sm|md|lg|xl|2xl):grid-cols-(\d+)$", |_, caps| {
        vec![Declaration::new(
            format!("@media {}", media_query(&caps[1])),
            format!("grid-template-columns: repeat({}, minmax(0, 1fr))", &caps[2]),
        )]
    }),
    (r"^hover:(\w+)-(\w+)-(\d+)$", |engine, caps| {
        let property = match &caps[1] {
            "bg" => "background-color",
            "border" => "border-color",
            _ => "color",
        };
        let color = engine.color(&caps[2], &caps[3]);
        vec![Declaration::new(
            ":hover",
            format!("{}: {}", property, color),
        )]
    }),
    (r"^focus:ring-(\w+)-(\d+)$", |engine, caps| {
        vec![Declaration::new(
            "box-shadow",
            format!("0 0 0 2px {}", engine.color(&caps[1], &caps[2])),
        )]
    }),
];

fn static_index() -> &'static HashMap<&'static str, &'static [(&'static str, &'static str)]> {
    static INDEX: OnceLock<HashMap<&'static str, &'static [(&'static str, &'static str)]>> =
        OnceLock::new();
    INDEX.get_or_init(|| STATIC_MAPPINGS.iter().copied().collect())
}

fn pattern_rules() -> &'static [PatternRule] {
    static RULES: OnceLock<Vec<PatternRule>> = OnceLock::new();
    RULES.get_or_init(|| {
        PATTERN_SOURCES
            .iter()
            .filter_map(|(source, convert)| {
                Regex::new(source).ok().map(|pattern| PatternRule {
                    pattern,
                    convert: *convert,
                })
            })
            .collect()
    })
}

/// Resolves utility tokens to declarations.
///
/// The built-in tables are process-wide statics; an engine only adds the
/// palette families supplied by configuration, so it is cheap to clone and
/// safe to share across threads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingEngine {
    extra_colors: BTreeMap<String, BTreeMap<String, String>>,
}

impl MappingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Palette families that take precedence over the built-in five.
    pub fn with_colors(colors: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        Self {
            extra_colors: colors,
        }
    }

    /// Static table, then pattern rules, then the modern-features resolver.
    /// An empty result means the token is unresolved.
    pub fn resolve(&self, token: &str) -> Vec<Declaration> {
        if let Some(declarations) = resolve_static(token) {
            return declarations;
        }
        if let Some(declarations) = self.resolve_pattern(token) {
            return declarations;
        }
        modern::resolve(token)
    }

    /// True when the static table or a pattern rule claims the token.
    pub fn recognizes(&self, token: &str) -> bool {
        static_index().contains_key(token)
            || pattern_rules()
                .iter()
                .any(|rule| rule.pattern.is_match(token))
    }

    fn resolve_pattern(&self, token: &str) -> Option<Vec<Declaration>> {
        pattern_rules().iter().find_map(|rule| {
            rule.pattern
                .captures(token)
                .map(|caps| (rule.convert)(self, &caps))
        })
    }

    /// Reverse palette lookup, configured families first: `#2563eb` -> `blue-600`.
    pub fn color_token(&self, value: &str) -> Option<String> {
        let lowered = value.to_ascii_lowercase();
        self.extra_colors
            .iter()
            .find_map(|(family, shades)| {
                shades
                    .iter()
                    .find(|(_, hex)| hex.to_ascii_lowercase() == lowered)
                    .map(|(shade, _)| format!("{}-{}", family, shade))
            })
            .or_else(|| color_token(&lowered))
    }

    pub fn color(&self, family: &str, shade: &str) -> String {
        if let Some(value) = self
            .extra_colors
            .get(family)
            .and_then(|shades| shades.get(shade))
        {
            return value.clone();
        }
        builtin_color(family, shade)
            .unwrap_or(FALLBACK_COLOR)
            .to_string()
    }
}

/// Convenience for the default engine.
pub fn resolve(token: &str) -> Vec<Declaration> {
    static DEFAULT: OnceLock<MappingEngine> = OnceLock::new();
    DEFAULT.get_or_init(MappingEngine::new).resolve(token)
}

fn resolve_static(token: &str) -> Option<Vec<Declaration>> {
    static_index().get(token).map(|pairs| {
        pairs
            .iter()
            .map(|(name, value)| Declaration::new(*name, *value))
            .collect()
    })
}

/// Static entries that set exactly one property, for reverse lookups.
pub(crate) fn single_property_entries()
-> impl Iterator<Item = (&'static str, &'static str, &'static str)>
{
    STATIC_MAPPINGS.iter().filter_map(|(token, pairs)| match pairs {
        [(name, value)] => Some((*token, *name, *value)),
        _ => None,
    })
}

fn builtin_color(family: &str, shade: &str) -> Option<&'static str> {
    PALETTE
        .iter()
        .find(|(name, _)| *name == family)
        .and_then(|(_, shades)| shades.iter().find(|(key, _)| *key == shade))
        .map(|(_, value)| *value)
}

fn color_token(value: &str) -> Option<String> {
    let value = value.to_ascii_lowercase();
    PALETTE.iter().find_map(|(family, shades)| {
        shades
            .iter()
            .find(|(_, hex)| *hex == value)
            .map(|(shade, _)| format!("{}-{}", family, shade))
    })
}

pub(crate) fn text_size_entries() -> &'static [(&'static str, &'static str)] {
    &TEXT_SIZES
}

/// Spacing scale: one unit is 0.25rem.
pub fn spacing(raw: &str) -> String {
    match raw.parse::<f64>() {
        Ok(value) => format!("{}rem", value * 0.25),
        Err(_) => raw.to_string(),
    }
}

pub fn text_size(size: &str) -> &'static str {
    TEXT_SIZES
        .iter()
        .find(|(name, _)| *name == size)
        .map(|(_, value)| *value)
        .unwrap_or("1rem")
}

/// Breakpoint name for a media query produced by [`media_query`].
pub(crate) fn breakpoint_name(query: &str) -> Option<&'static str> {
    BREAKPOINTS
        .iter()
        .find(|(_, candidate)| *candidate == query)
        .map(|(name, _)| *name)
}

pub fn media_query(breakpoint: &str) -> &'static str {
    BREAKPOINTS
        .iter()
        .find(|(name, _)| *name == breakpoint)
        .map(|(_, query)| *query)
        .unwrap_or(FALLBACK_BREAKPOINT)
}

fn percent_fraction(raw: &str) -> String {
    match raw.parse::<f64>() {
        Ok(value) => format!("{}", value / 100.0),
        Err(_) => raw.to_string(),
    }
}

fn directional(property: &str, direction: &str, value: &str) -> Vec<Declaration> {
    let sides: &[&str] = match direction {
        "x" => &["left", "right"],
        "y" => &["top", "bottom"],
        "t" => &["top"],
        "r" => &["right"],
        "b" => &["bottom"],
        "l" => &["left"],
        _ => &[],
    };
    sides
        .iter()
        .map(|side| Declaration::new(format!("{}-{}", property, side), value))
        .collect()
}
