use std::fmt;

/// Coarse family a utility token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Display,
    Alignment,
    Sizing,
    Spacing,
    Typography,
    Visual,
    Effects,
    Responsive,
    Utility,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Display => "display",
            Self::Alignment => "alignment",
            Self::Sizing => "sizing",
            Self::Spacing => "spacing",
            Self::Typography => "typography",
            Self::Visual => "visual",
            Self::Effects => "effects",
            Self::Responsive => "responsive",
            Self::Utility => "utility",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const DISPLAY_PREFIXES: [&str; 4] = ["flex", "grid", "block", "inline"];
const ALIGNMENT_PREFIXES: [&str; 4] = ["items-", "justify-", "place-", "content-"];
const SIZING_PREFIXES: [&str; 4] = ["w-", "h-", "min-", "max-"];
const SPACING_PREFIXES: [&str; 4] = ["p-", "m-", "space-", "gap-"];
const TYPOGRAPHY_PREFIXES: [&str; 4] = ["text-", "font-", "leading-", "tracking-"];
const VISUAL_PREFIXES: [&str; 4] = ["bg-", "border-", "ring-", "shadow-"];
const EFFECTS_PREFIXES: [&str; 4] = ["rounded", "opacity-", "scale-", "rotate-"];

/// Categorizes a token by prefix. Families are tested in a fixed order, so a
/// token such as `flex-col` is display even though it could read as layout.
pub fn classify(token: &str) -> Category {
    let starts = |prefixes: &[&str]| prefixes.iter().any(|prefix| token.starts_with(prefix));

    if starts(&DISPLAY_PREFIXES) || token == "hidden" {
        Category::Display
    } else if starts(&ALIGNMENT_PREFIXES) {
        Category::Alignment
    } else if starts(&SIZING_PREFIXES) {
        Category::Sizing
    } else if starts(&SPACING_PREFIXES) {
        Category::Spacing
    } else if starts(&TYPOGRAPHY_PREFIXES) {
        Category::Typography
    } else if starts(&VISUAL_PREFIXES) {
        Category::Visual
    } else if starts(&EFFECTS_PREFIXES) {
        Category::Effects
    } else if token.contains(':') {
        Category::Responsive
    } else {
        Category::Utility
    }
}

#[cfg(test)]
mod tests {
    use super::{Category, classify};

    #[test]
    fn classifies_each_family() {
        let cases = [
            ("flex", Category::Display),
            ("inline-block", Category::Display),
            ("hidden", Category::Display),
            ("items-center", Category::Alignment),
            ("content-between", Category::Alignment),
            ("w-12", Category::Sizing),
            ("min-h-screen", Category::Sizing),
            ("p-4", Category::Spacing),
            ("gap-2", Category::Spacing),
            ("text-sm", Category::Typography),
            ("tracking-wide", Category::Typography),
            ("bg-blue-600", Category::Visual),
            ("shadow-md", Category::Visual),
            ("rounded-lg", Category::Effects),
            ("opacity-50", Category::Effects),
            ("hover:bg-blue-700", Category::Responsive),
            ("md:grid-cols-2", Category::Responsive),
            ("fixed", Category::Utility),
            ("px-4", Category::Utility),
        ];
        for (token, expected) in cases {
            assert_eq!(classify(token), expected, "token {token}");
        }
    }

    #[test]
    fn prefix_order_wins_over_variants() {
        // `text-` is tested before the `:` check.
        assert_eq!(classify("text-sm:hover"), Category::Typography);
        // `shadow` without a dash is not visual.
        assert_eq!(classify("shadow"), Category::Utility);
    }

    #[test]
    fn classification_is_stable_across_calls() {
        let tokens = ["grid-cols-3", "focus:ring-2", "unknown-thing", "rounded"];
        let first: Vec<_> = tokens.iter().map(|token| classify(token)).collect();
        let second: Vec<_> = tokens.iter().rev().map(|token| classify(token)).collect();
        let second: Vec<_> = second.into_iter().rev().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn displays_lowercase_names() {
        assert_eq!(Category::Typography.to_string(), "typography");
        assert_eq!(Category::Utility.as_str(), "utility");
    }
}
