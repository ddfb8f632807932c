/// Derives descriptive class names for element groups.
///
/// The counter advances on every call so two otherwise identical fallback
/// names stay distinct within one conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemanticNamer {
    counter: usize,
}

/// Multi-class shapes recognized over the joined token text, in precedence
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiPattern {
    ModalOverlay,
    DropdownMenu,
    Card,
    Toast,
    Hero,
}

const UI_PATTERNS: [UiPattern; 5] = [
    UiPattern::ModalOverlay,
    UiPattern::DropdownMenu,
    UiPattern::Card,
    UiPattern::Toast,
    UiPattern::Hero,
];

impl UiPattern {
    pub fn detect(classes: &str) -> Option<Self> {
        UI_PATTERNS
            .into_iter()
            .find(|pattern| pattern.matches(classes))
    }

    fn matches(self, classes: &str) -> bool {
        let has = |needle: &str| classes.contains(needle);
        match self {
            Self::ModalOverlay => {
                has("fixed") && has("inset-0") && (has("bg-black") || has("bg-gray"))
            }
            Self::DropdownMenu => {
                has("absolute")
                    && (has("top-") || has("bottom-"))
                    && has("shadow")
                    && has("bg-white")
            }
            Self::Card => {
                has("rounded") && has("shadow") && has("bg-white") && (has("p-") || has("px-"))
            }
            Self::Toast => {
                has("fixed")
                    && (has("top-") || has("bottom-"))
                    && ["bg-green", "bg-red", "bg-yellow", "bg-blue"]
                        .iter()
                        .any(|color| has(color))
            }
            Self::Hero => {
                has("min-h-screen") && has("flex") && has("items-center") && has("justify-center")
            }
        }
    }

    pub fn name(self, component: &str) -> String {
        let (suffix, generic) = match self {
            Self::ModalOverlay => ("overlay", "modal-overlay"),
            Self::DropdownMenu => ("menu", "dropdown-menu"),
            Self::Card => ("card", "card-container"),
            Self::Toast => ("toast", "toast-notification"),
            Self::Hero => ("hero", "hero-section"),
        };
        if component.is_empty() {
            generic.to_string()
        } else {
            format!("{}-{}", component, suffix)
        }
    }
}

/// Style signals read off the joined token text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Signals {
    interactive: bool,
    container: bool,
    typography: bool,
    input: bool,
}

impl Signals {
    fn read(classes: &str) -> Self {
        let has = |needle: &str| classes.contains(needle);
        Self {
            interactive: has("hover:") || has("focus:") || has("active:") || has("cursor-pointer"),
            container: has("flex") || has("grid") || has("p-") || has("px-") || has("space-"),
            typography: has("text-") || has("font-"),
            input: has("border-") && (has("w-") || has("h-")),
        }
    }
}

impl SemanticNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self) -> usize {
        self.counter
    }

    /// Names one element group. `filename_context` is the component hint
    /// derived from the source file name, empty when there is none.
    pub fn name(&mut self, element: &str, tokens: &[&str], filename_context: &str) -> String {
        self.counter += 1;

        if let Some(name) = dotted_component_name(element) {
            return name;
        }

        let component = detect_component_context(filename_context, tokens);
        let classes = tokens.join(" ");

        if let Some(pattern) = UiPattern::detect(&classes) {
            return pattern.name(&component);
        }

        let element = element.replace('.', "_").to_lowercase();
        contextual_name(&element, &classes, &component, self.counter)
    }
}

/// `Otp.Root` -> `otp-root`. Segments past the second are dropped.
fn dotted_component_name(element: &str) -> Option<String> {
    let mut parts = element.split('.');
    let component = parts.next()?;
    let part = parts.next()?;
    Some(format!("{}-{}", component.to_lowercase(), part.to_lowercase()))
}

const CONTEXT_KEYWORDS: [(&str, &str); 7] = [
    ("otp", "otp"),
    ("modal", "modal"),
    ("accordion", "accordion"),
    ("dropdown", "dropdown"),
    ("card", "card"),
    ("hero", "hero"),
    ("nav", "navigation"),
];

/// Filename hint first, else the first keyword found in a token.
pub fn detect_component_context(filename_context: &str, tokens: &[&str]) -> String {
    if !filename_context.is_empty() {
        return filename_context.to_string();
    }
    tokens
        .iter()
        .find_map(|token| {
            let token = token.to_lowercase();
            CONTEXT_KEYWORDS
                .iter()
                .find(|(keyword, _)| token.contains(keyword))
                .map(|(_, context)| context.to_string())
        })
        .unwrap_or_default()
}

fn contextual_name(element: &str, classes: &str, component: &str, counter: usize) -> String {
    let signals = Signals::read(classes);
    let scoped = !component.is_empty();

    match element {
        "button" => match (scoped, signals.interactive) {
            (true, true) => format!("{}-button", component),
            (true, false) => format!("{}-trigger", component),
            (false, true) => "button-primary".to_string(),
            (false, false) => "button".to_string(),
        },
        "input" if scoped => format!("{}-input", component),
        "input" => "input-field".to_string(),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" if scoped => format!("{}-heading", component),
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => format!("{}-text", element),
        "p" if scoped => format!("{}-text", component),
        "p" => "p-text".to_string(),
        "div" if scoped => scoped_div_name(classes, signals, component, counter),
        "div" => div_name(classes, signals, counter),
        "form" if scoped => format!("{}-form", component),
        "form" => "form-container".to_string(),
        "nav" => "navigation".to_string(),
        "header" => "header-container".to_string(),
        "section" if scoped => format!("{}-section", component),
        "section" => "section-container".to_string(),
        _ if scoped => format!("{}-{}", component, element),
        _ if signals.interactive => format!("{}-interactive", element),
        _ if signals.container => format!("{}-container", element),
        _ => element.to_string(),
    }
}

fn scoped_div_name(classes: &str, signals: Signals, component: &str, counter: usize) -> String {
    if classes.contains("min-h-screen") || (signals.container && classes.contains("justify-center"))
    {
        format!("{}-root", component)
    } else if signals.container && signals.input {
        format!("{}-input-group", component)
    } else if signals.container && signals.typography {
        format!("{}-content", component)
    } else if signals.container {
        format!("{}-container", component)
    } else if signals.typography {
        format!("{}-text", component)
    } else {
        format!("{}-element-{}", component, counter)
    }
}

fn div_name(classes: &str, signals: Signals, counter: usize) -> String {
    if signals.container && classes.contains("grid-cols") {
        "grid-container".to_string()
    } else if signals.container && signals.typography {
        "content-container".to_string()
    } else if signals.container {
        "layout-container".to_string()
    } else if signals.typography {
        "text-container".to_string()
    } else {
        format!("container-{}", counter)
    }
}

const FRAMEWORK_PREFIXES: [&str; 4] = ["qwik", "react", "vue", "svelte"];

const KNOWN_COMPONENTS: [&str; 33] = [
    "modal",
    "dropdown",
    "accordion",
    "carousel",
    "tooltip",
    "popover",
    "dialog",
    "sidebar",
    "navbar",
    "navigation",
    "header",
    "footer",
    "card",
    "button",
    "input",
    "form",
    "table",
    "grid",
    "list",
    "menu",
    "breadcrumb",
    "pagination",
    "tabs",
    "badge",
    "avatar",
    "spinner",
    "loader",
    "toast",
    "alert",
    "otp",
    "hero",
    "banner",
    "section",
];

/// Component hint from a file name: `qwik-otp.tsx` -> `otp`,
/// `product-card.tsx` -> `card`, `otp_input.tsx` -> `otp`.
pub fn extract_component_from_filename(filename: &str) -> String {
    if filename.is_empty() {
        return String::new();
    }
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let base = match base.rfind('.') {
        Some(dot) => &base[..dot],
        None => base,
    };
    let base = base.to_lowercase();

    let hyphenated: Vec<&str> = base.split('-').collect();
    if hyphenated.len() >= 2 {
        if FRAMEWORK_PREFIXES.contains(&hyphenated[0]) {
            return hyphenated[1..].join("-");
        }
        return hyphenated[hyphenated.len() - 1].to_string();
    }

    if let Some((first, _)) = base.split_once('_') {
        return first.to_string();
    }

    if let Some(known) = KNOWN_COMPONENTS.iter().find(|known| **known == base) {
        return known.to_string();
    }
    if let Some(known) = KNOWN_COMPONENTS.iter().find(|known| base.contains(*known)) {
        return known.to_string();
    }
    base
}
