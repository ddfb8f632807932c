use std::collections::HashMap;
use std::path::Path;

use crate::ai::UnknownClassResolver;
use crate::extract::{ElementGroup, UtilityToken, extract, group_by_element};
use crate::mapping::{Declaration, MappingEngine};
use crate::namer::{SemanticNamer, extract_component_from_filename};
use crate::scanner::Document;

pub const UNKNOWN_CLASSES: &str = "/* Unknown classes */";

/// One generated class: its name, merged declarations, and the utility
/// tokens it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticRule {
    pub name: String,
    pub element: String,
    pub declarations: Vec<Declaration>,
    pub original_classes: String,
}

impl SemanticRule {
    pub fn selector(&self) -> String {
        format!(".{}", self.name)
    }

    pub fn original_tokens(&self) -> impl Iterator<Item = &str> {
        self.original_classes.split_whitespace()
    }
}

/// Insertion-ordered declaration map; a later write replaces the value but
/// keeps the original position.
#[derive(Debug, Default)]
struct DeclarationSet {
    declarations: Vec<Declaration>,
    index: HashMap<String, usize>,
}

impl DeclarationSet {
    fn insert(&mut self, declaration: Declaration) {
        let key = declaration.merge_key();
        match self.index.get(&key) {
            Some(&position) => self.declarations[position] = declaration,
            None => {
                self.index.insert(key, self.declarations.len());
                self.declarations.push(declaration);
            }
        }
    }

    fn into_vec(self) -> Vec<Declaration> {
        self.declarations
    }
}

pub struct Converter {
    engine: MappingEngine,
    namer: SemanticNamer,
    resolver: Option<Box<dyn UnknownClassResolver>>,
}

impl Converter {
    pub fn new(engine: MappingEngine) -> Self {
        Self {
            engine,
            namer: SemanticNamer::new(),
            resolver: None,
        }
    }

    pub fn with_resolver(mut self, resolver: Box<dyn UnknownClassResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn engine(&self) -> &MappingEngine {
        &self.engine
    }

    pub fn convert(&mut self, tokens: Vec<UtilityToken>) -> Vec<SemanticRule> {
        self.convert_with_context(tokens, "")
    }

    /// Groups `tokens` by element and emits one rule per non-empty group.
    /// `filename` seeds the component context used for naming.
    pub fn convert_with_context(
        &mut self,
        tokens: Vec<UtilityToken>,
        filename: &str,
    ) -> Vec<SemanticRule> {
        let context = extract_component_from_filename(filename);
        let groups = group_by_element(tokens);
        let mut rules = Vec::with_capacity(groups.len());
        for group in groups.values() {
            if let Some(rule) = self.convert_group(group, &context) {
                tracing::debug!("{} -> .{}", group.element, rule.name);
                rules.push(rule);
            }
        }
        rules
    }

    /// Converts one source file. Naming restarts for every document so the
    /// generated names do not depend on which files were converted before.
    pub fn convert_document(&mut self, document: &Document) -> Vec<SemanticRule> {
        self.namer = SemanticNamer::new();
        let filename = document
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("");
        self.convert_with_context(extract(document), filename)
    }

    fn convert_group(&mut self, group: &ElementGroup, context: &str) -> Option<SemanticRule> {
        let texts = group.token_texts();
        let name = self.namer.name(&group.element, &texts, context);
        let declarations = self.assemble(&texts);
        if declarations.is_empty() {
            return None;
        }
        Some(SemanticRule {
            name,
            element: group.element.clone(),
            declarations,
            original_classes: texts.join(" "),
        })
    }

    /// Merges the declarations of `tokens` in order. Unresolved tokens end up
    /// in one trailing `/* Unknown classes */` entry.
    pub fn assemble(&mut self, tokens: &[&str]) -> Vec<Declaration> {
        let mut set = DeclarationSet::default();
        let mut unknown = Vec::new();

        for token in tokens {
            let mut declarations = self.engine.resolve(token);
            if declarations.is_empty() {
                declarations = self.resolve_unknown(token);
            }
            if declarations.is_empty() {
                unknown.push(*token);
                continue;
            }
            for declaration in declarations {
                set.insert(declaration);
            }
        }

        let mut declarations = set.into_vec();
        if !unknown.is_empty() {
            declarations.push(Declaration::new(UNKNOWN_CLASSES, unknown.join(" ")));
        }
        declarations
    }

    fn resolve_unknown(&mut self, token: &str) -> Vec<Declaration> {
        let Some(resolver) = self.resolver.as_mut() else {
            return Vec::new();
        };
        match resolver.resolve_unknown(token) {
            Ok(declarations) => declarations,
            Err(err) => {
                tracing::warn!("could not resolve {}: {}", token, err);
                Vec::new()
            }
        }
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(MappingEngine::new())
    }
}

/// File stem used for generated artifacts: `src/Card.tsx` -> `Card`.
pub fn artifact_stem(path: &Path) -> Option<&str> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
}

#[cfg(test)]
mod tests {
    use super::{Converter, SemanticRule, UNKNOWN_CLASSES, artifact_stem};
    use crate::ai::{AiError, UnknownClassResolver};
    use crate::extract::UtilityToken;
    use crate::mapping::{Declaration, MappingEngine};
    use crate::scanner::{Document, Flavor, parse_content};
    use pretty_assertions::assert_eq;
    use std::path::{Path, PathBuf};

    fn tokens(element: &str, texts: &[&str]) -> Vec<UtilityToken> {
        texts
            .iter()
            .map(|text| UtilityToken::new(*text, element))
            .collect()
    }

    fn names(rules: &[SemanticRule]) -> Vec<&str> {
        rules.iter().map(|rule| rule.name.as_str()).collect()
    }

    struct FakeResolver;

    impl UnknownClassResolver for FakeResolver {
        fn resolve_unknown(&mut self, token: &str) -> Result<Vec<Declaration>, AiError> {
            match token {
                "aspect-video" => Ok(vec![Declaration::new("aspect-ratio", "16 / 9")]),
                "broken" => Err(AiError::EmptyResponse),
                _ => Ok(Vec::new()),
            }
        }
    }

    #[test]
    fn later_tokens_win_on_collision() {
        let mut converter = Converter::default();
        let declarations = converter.assemble(&["p-2", "flex", "p-4"]);
        assert_eq!(
            declarations,
            vec![
                Declaration::new("padding", "1rem"),
                Declaration::new("display", "flex"),
            ]
        );
    }

    #[test]
    fn unknown_tokens_are_aggregated_in_order() {
        let mut converter = Converter::default();
        let declarations = converter.assemble(&["zeta-thing", "flex", "alpha-thing"]);
        assert_eq!(
            declarations,
            vec![
                Declaration::new("display", "flex"),
                Declaration::new(UNKNOWN_CLASSES, "zeta-thing alpha-thing"),
            ]
        );
    }

    #[test]
    fn comments_do_not_collide() {
        let mut converter = Converter::default();
        let declarations =
            converter.assemble(&["md:flex", "lg:block", "hover:bg-blue-700", "hover:text-white"]);
        assert_eq!(
            declarations,
            vec![
                Declaration::new("/* Responsive: md */", "flex"),
                Declaration::new("/* Responsive: lg */", "block"),
                Declaration::new(":hover", "background-color: #1d4ed8"),
                Declaration::new("/* On hover */", "text-white"),
            ]
        );
    }

    #[test]
    fn hover_states_merge_per_inner_property() {
        let mut converter = Converter::default();
        let declarations = converter.assemble(&["hover:bg-blue-700", "hover:bg-red-500"]);
        assert_eq!(
            declarations,
            vec![Declaration::new(":hover", "background-color: #ef4444")]
        );
    }

    #[test]
    fn modal_scenario() {
        let mut converter = Converter::default();
        let rules = converter.convert_with_context(
            tokens("div", &["fixed", "inset-0", "bg-black"]),
            "react-modal.tsx",
        );
        assert_eq!(names(&rules), vec!["modal-overlay"]);
        assert_eq!(
            rules[0].declarations,
            vec![
                Declaration::new("position", "fixed"),
                Declaration::new("inset", "0"),
                Declaration::new("background-color", "#000000"),
            ]
        );
    }

    #[test]
    fn otp_scenario() {
        let mut converter = Converter::default();
        let mut input = tokens("div", &["flex", "min-h-screen", "justify-center"]);
        input.extend(tokens("button", &["bg-blue-600", "hover:bg-blue-700"]));
        let rules = converter.convert_with_context(input, "qwik-otp.tsx");
        assert_eq!(names(&rules), vec!["otp-button", "otp-root"]);
        assert_eq!(rules[1].original_classes, "flex min-h-screen justify-center");
        assert_eq!(rules[1].selector(), ".otp-root");
    }

    #[test]
    fn one_rule_per_group() {
        let mut converter = Converter::default();
        let mut input = tokens("div", &["flex"]);
        input.extend(tokens("span", &["mystery"]));
        input.extend(tokens("p", &["text-sm"]));
        let rules = converter.convert(input);
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[2].declarations, vec![Declaration::new(UNKNOWN_CLASSES, "mystery")]);
    }

    #[test]
    fn resolver_fills_in_unknown_tokens() {
        let mut converter = Converter::default().with_resolver(Box::new(FakeResolver));
        let declarations = converter.assemble(&["aspect-video", "flex", "broken", "nothing"]);
        assert_eq!(
            declarations,
            vec![
                Declaration::new("aspect-ratio", "16 / 9"),
                Declaration::new("display", "flex"),
                Declaration::new(UNKNOWN_CLASSES, "broken nothing"),
            ]
        );
    }

    #[test]
    fn resolver_is_not_asked_about_known_tokens() {
        use std::cell::RefCell;
        use std::rc::Rc;

        struct Recording(Rc<RefCell<Vec<String>>>);
        impl UnknownClassResolver for Recording {
            fn resolve_unknown(&mut self, token: &str) -> Result<Vec<Declaration>, AiError> {
                self.0.borrow_mut().push(token.to_string());
                Ok(Vec::new())
            }
        }

        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut converter =
            Converter::default().with_resolver(Box::new(Recording(Rc::clone(&calls))));
        converter.assemble(&["p-4", "bg-blue-600", "mystery"]);
        assert_eq!(*calls.borrow(), vec!["mystery".to_string()]);
    }

    #[test]
    fn naming_restarts_for_each_document() {
        let engine = MappingEngine::new();
        let document = |path: &str| {
            let text = "<div class=\"relative\">x</div>".to_string();
            Document {
                path: PathBuf::from(path),
                flavor: Flavor::Markup,
                usages: parse_content(&text, &engine),
                text,
            }
        };
        let mut converter = Converter::new(engine.clone());
        let first = converter.convert_document(&document("a.html"));
        let second = converter.convert_document(&document("b.html"));
        assert_eq!(names(&first), vec!["a-element-1"]);
        assert_eq!(names(&second), vec!["b-element-1"]);
    }

    #[test]
    fn artifact_stems() {
        assert_eq!(artifact_stem(Path::new("src/Card.tsx")), Some("Card"));
        assert_eq!(artifact_stem(Path::new("index.html")), Some("index"));
    }
}
