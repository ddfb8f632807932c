use crate::mapping::{Declaration, spacing};

/// Shape of a token the core tables do not know about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModernKind<'a> {
    ContainerQuery(&'a str),
    CascadeLayer(&'a str),
    CustomProperty(&'a str),
    Variant { variant: &'a str, base: &'a str },
    Utility(&'a str),
}

impl<'a> ModernKind<'a> {
    pub fn detect(token: &'a str) -> Self {
        if token.starts_with("@container") {
            Self::ContainerQuery(token)
        } else if token.starts_with("@layer") {
            Self::CascadeLayer(token)
        } else if token.contains("--") {
            Self::CustomProperty(token)
        } else if let Some((variant, base)) = token.split_once(':') {
            Self::Variant { variant, base }
        } else {
            Self::Utility(token)
        }
    }
}

/// Container queries, cascade layers, custom properties, variant prefixes and
/// the newer utility families. Returns an empty list when nothing applies.
pub fn resolve(token: &str) -> Vec<Declaration> {
    match ModernKind::detect(token) {
        ModernKind::ContainerQuery(token) => container_query(token),
        ModernKind::CascadeLayer(token) => cascade_layer(token),
        ModernKind::CustomProperty(token) => custom_property(token),
        ModernKind::Variant { variant, base } => variant_comment(variant, base),
        ModernKind::Utility(token) => utility(token),
    }
}

fn container_query(token: &str) -> Vec<Declaration> {
    let parts: Vec<&str> = token.split(':').collect();
    if parts.len() < 2 {
        return Vec::new();
    }
    vec![
        Declaration::comment("Container Query", parts[0]),
        Declaration::comment("Applied when", parts[1..].join(":")),
    ]
}

fn cascade_layer(token: &str) -> Vec<Declaration> {
    match token {
        "@layer-base" => vec![Declaration::new("@layer", "base")],
        "@layer-components" => vec![Declaration::new("@layer", "components")],
        "@layer-utilities" => vec![Declaration::new("@layer", "utilities")],
        _ => vec![Declaration::comment("Cascade Layer", token)],
    }
}

fn custom_property(token: &str) -> Vec<Declaration> {
    let parts: Vec<&str> = token.split('-').collect();
    if parts.len() < 3 {
        return Vec::new();
    }
    vec![Declaration::new(
        format!("--{}", parts[2..].join("-")),
        "/* Custom property value */",
    )]
}

fn variant_comment(variant: &str, base: &str) -> Vec<Declaration> {
    let label = match variant {
        "hover" => "On hover".to_string(),
        "focus" => "On focus".to_string(),
        "active" => "When active".to_string(),
        "disabled" => "When disabled".to_string(),
        "group-hover" => "When parent group hovered".to_string(),
        "sm" | "md" | "lg" | "xl" | "2xl" => format!("Responsive: {}", variant),
        peer if peer.starts_with("peer-") => {
            format!("When peer {}", past_tense(&peer["peer-".len()..]))
        }
        other => format!("Unknown variant: {}", other),
    };
    vec![Declaration::comment(&label, base)]
}

fn past_tense(state: &str) -> String {
    match state {
        "focus" => "focused".to_string(),
        "hover" => "hovered".to_string(),
        "checked" => "checked".to_string(),
        other => other.to_string(),
    }
}

fn utility(token: &str) -> Vec<Declaration> {
    if let Some(size) = token.strip_prefix("size-") {
        return match size.parse::<f64>() {
            Ok(_) => {
                let value = spacing(size);
                vec![
                    Declaration::new("width", value.clone()),
                    Declaration::new("height", value),
                ]
            }
            Err(_) => Vec::new(),
        };
    }
    if let Some(count) = token.strip_prefix("grid-cols-") {
        return track_list("grid-template-columns", count);
    }
    if let Some(count) = token.strip_prefix("grid-rows-") {
        return track_list("grid-template-rows", count);
    }
    if let Some(value) = token.strip_prefix("place-content-") {
        return place("place-content", value);
    }
    if let Some(value) = token.strip_prefix("place-items-") {
        return place("place-items", value);
    }
    if let Some(value) = token.strip_prefix("content-") {
        let value = match value {
            "center" => "center",
            "start" => "flex-start",
            "end" => "flex-end",
            "between" => "space-between",
            "around" => "space-around",
            "evenly" => "space-evenly",
            _ => return Vec::new(),
        };
        return vec![Declaration::new("align-content", value)];
    }
    Vec::new()
}

fn track_list(property: &str, count: &str) -> Vec<Declaration> {
    match count.parse::<u32>() {
        Ok(count) => vec![Declaration::new(
            property,
            format!("repeat({}, minmax(0, 1fr))", count),
        )],
        Err(_) => Vec::new(),
    }
}

fn place(property: &str, value: &str) -> Vec<Declaration> {
    match value {
        "center" | "start" | "end" => vec![Declaration::new(property, value)],
        _ => Vec::new(),
    }
}
