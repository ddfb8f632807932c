use std::collections::{BTreeMap, HashSet};

use crate::classify::{Category, classify};
use crate::scanner::{ClassUsage, Document};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtilityToken {
    pub text: String,
    pub category: Category,
    /// Element the token was first observed on.
    pub context: String,
}

impl UtilityToken {
    pub fn new(text: impl Into<String>, context: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            category: classify(&text),
            text,
            context: context.into(),
        }
    }
}

/// All usages sharing one element identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementGroup {
    pub element: String,
    pub tokens: Vec<UtilityToken>,
}

impl ElementGroup {
    pub fn token_texts(&self) -> Vec<&str> {
        self.tokens.iter().map(|token| token.text.as_str()).collect()
    }
}

pub fn extract(document: &Document) -> Vec<UtilityToken> {
    extract_usages(&document.usages)
}

/// Deduplicates by (text, category), keeping the first element seen, and
/// sorts by token text.
pub fn extract_usages(usages: &[ClassUsage]) -> Vec<UtilityToken> {
    let mut seen = HashSet::new();
    let mut tokens = Vec::new();
    for usage in usages {
        for text in &usage.tokens {
            let token = UtilityToken::new(text.as_str(), usage.element.as_str());
            if seen.insert((token.text.clone(), token.category)) {
                tokens.push(token);
            }
        }
    }
    tokens.sort_by(|left, right| left.text.cmp(&right.text));
    tokens
}

pub fn group_by_element(tokens: Vec<UtilityToken>) -> BTreeMap<String, ElementGroup> {
    let mut groups: BTreeMap<String, ElementGroup> = BTreeMap::new();
    for token in tokens {
        groups
            .entry(token.context.clone())
            .or_insert_with(|| ElementGroup {
                element: token.context.clone(),
                tokens: Vec::new(),
            })
            .tokens
            .push(token);
    }
    groups
}
